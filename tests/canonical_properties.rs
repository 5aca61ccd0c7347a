use smilescanon::{canonical_smiles, parse, renumber_atoms, serialize};

const MOLECULES: &[&str] = &[
    "C",
    "CC",
    "C=C",
    "C#N",
    "O",
    "[H][H]",
    "CCO",
    "CC(C)(C)C",
    "CC(=O)O",
    "C[N+](=O)[O-]",
    "C1CC1",
    "C1CCCCC1",
    "c1ccccc1",
    "c1ccncc1",
    "c1ccoc1",
    "[nH]1cccc1",
    "c1ccc2ccccc2c1",
    "C1CC2CCCC(C1)C2",
    "C1CC1C1CC1",
    "[NH4+]",
    "[Na+].[Cl-]",
    "[13CH3]O",
    "[CH3:1]C(=O)[OH:2]",
    "F[C@H](Cl)Br",
    "[C@](F)(Cl)(Br)I",
    "N[C@@H](C)C(=O)O",
    "C[S@](=O)CC",
    "C[C@H]1CC[C@@H](C)CC1",
    "OC[C@H]1OC(O)[C@H](O)[C@@H](O)[C@@H]1O",
    "F/C=C/F",
    r"F/C=C\F",
    r"Cl/C=C\Br",
    r"F/C=C/C=C/F",
    r"F/C=C/[C@@H](Cl)Br",
    r"CC/C(C)=C(\C)O",
    "c1ccc2c(c1)[nH]cc2",
    "Cn1cnc2c1c(=O)n(C)c(=O)n2C",
];

fn canonical(smiles: &str) -> String {
    let mol = parse(smiles).unwrap_or_else(|e| panic!("parse failed for '{smiles}': {e}"));
    serialize(&mol, true)
}

struct Xorshift64(u64);

impl Xorshift64 {
    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    fn shuffle(&mut self, slice: &mut [usize]) {
        for i in (1..slice.len()).rev() {
            let j = (self.next() % (i as u64 + 1)) as usize;
            slice.swap(i, j);
        }
    }
}

/// Every permutation of `0..n` (Heap's algorithm).
fn all_permutations(n: usize) -> Vec<Vec<usize>> {
    let mut state: Vec<usize> = (0..n).collect();
    let mut result = vec![state.clone()];
    let mut c = vec![0usize; n];
    let mut i = 1;
    while i < n {
        if c[i] < i {
            if i % 2 == 0 {
                state.swap(0, i);
            } else {
                state.swap(c[i], i);
            }
            result.push(state.clone());
            c[i] += 1;
            i = 1;
        } else {
            c[i] = 0;
            i += 1;
        }
    }
    result
}

const EXHAUSTIVE_THRESHOLD: usize = 6;
const RANDOM_SAMPLE_COUNT: usize = 40;

fn permutations_for(n: usize) -> Vec<Vec<usize>> {
    if n <= EXHAUSTIVE_THRESHOLD {
        return all_permutations(n);
    }
    let mut rng = Xorshift64(0x9E37_79B9_7F4A_7C15);
    (0..RANDOM_SAMPLE_COUNT)
        .map(|_| {
            let mut perm: Vec<usize> = (0..n).collect();
            rng.shuffle(&mut perm);
            perm
        })
        .collect()
}

#[test]
fn invariant_to_atom_order() {
    for &smiles in MOLECULES {
        let mol = parse(smiles).unwrap();
        let expected = serialize(&mol, true);
        for perm in permutations_for(mol.atom_count()) {
            let renum = renumber_atoms(&mol, &perm).unwrap();
            let got = serialize(&renum, true);
            assert_eq!(
                expected, got,
                "'{smiles}' with order {perm:?}: expected '{expected}', got '{got}'"
            );
        }
    }
}

#[test]
fn idempotent() {
    for &smiles in MOLECULES {
        let first = canonical_smiles(smiles);
        assert!(!first.is_empty(), "'{smiles}' was rejected");
        let second = canonical_smiles(&first);
        assert_eq!(first, second, "'{smiles}': '{first}' then '{second}'");
    }
}

#[test]
fn deterministic() {
    for &smiles in MOLECULES {
        let mol = parse(smiles).unwrap();
        assert_eq!(serialize(&mol, true), serialize(&mol, true), "{smiles}");
    }
}

#[test]
fn fragment_order_is_canonical() {
    assert_eq!(canonical("[Na+].[Cl-]"), canonical("[Cl-].[Na+]"));
    assert_eq!(canonical("[Na+].[Cl-].O"), canonical("O.[Na+].[Cl-]"));
}

#[test]
fn chirality_stable_across_spellings() {
    let groups: &[&[&str]] = &[
        &["[C@@H](F)(Cl)Br", "F[C@H](Cl)Br", "Cl[C@@H](F)Br", "Br[C@H](F)Cl"],
        &["[C@](F)(Cl)(Br)I", "F[C@](Cl)(Br)I"],
        &["N[C@@H](C)C(=O)O", "[C@H](N)(C)C(=O)O", "C[C@H](N)C(=O)O"],
        &["F[C@H](Cl)Br", "F[C@TH1H](Cl)Br"],
        &["F[C@@H](Cl)Br", "F[C@TH2H](Cl)Br"],
    ];
    for group in groups {
        let expected = canonical(group[0]);
        for smiles in &group[1..] {
            assert_eq!(canonical(smiles), expected, "{smiles} vs {}", group[0]);
        }
    }
}

#[test]
fn double_bond_geometry_survives_renumbering() {
    for smiles in ["F/C=C/F", r"F/C=C\F", "Cl/C=C/Cl", r"F/C=C/[C@@H](Cl)Br"] {
        let mol = parse(smiles).unwrap();
        let reversed: Vec<usize> = (0..mol.atom_count()).rev().collect();
        let renum = renumber_atoms(&mol, &reversed).unwrap();
        assert_eq!(serialize(&mol, true), serialize(&renum, true), "{smiles}");
    }
}

#[test]
fn kekule_and_aromatic_spellings_agree() {
    assert_eq!(
        canonical("CN1C=NC2=C1C(=O)N(C(=O)N2C)C"),
        canonical("Cn1c(=O)c2c(ncn2C)n(C)c1=O")
    );
    assert_eq!(canonical("C1=CC=NC=C1"), canonical("n1ccccc1"));
}

#[test]
fn explicit_hydrogens_fold_away() {
    assert_eq!(canonical("[H]C([H])([H])[H]"), "C");
    assert_eq!(canonical("[H]OC([H])([H])C"), "CCO");
    assert_eq!(canonical("F[C@]([H])(Cl)Br"), canonical("F[C@H](Cl)Br"));
}

#[test]
fn rejected_inputs_give_empty_string() {
    for smiles in ["", "   ", "notasmiles(((", "C1CC", "C(", "[Xx]", "c1cccc1", "C=", "CC)"] {
        assert_eq!(canonical_smiles(smiles), "", "{smiles:?} should be rejected");
    }
}

#[test]
fn accepted_inputs_give_non_empty_output() {
    for &smiles in MOLECULES {
        assert!(!canonical_smiles(smiles).is_empty(), "{smiles}");
    }
}
