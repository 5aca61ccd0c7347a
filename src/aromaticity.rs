use std::collections::{HashMap, HashSet};

use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::mol::Mol;
use crate::rings::RingInfo;
use crate::traits::{HasAtomicNum, HasBondOrder, HasFormalCharge, HasHydrogenCount};

const SP2_CAPABLE: [u8; 9] = [
    5,  // B
    6,  // C
    7,  // N
    8,  // O
    15, // P
    16, // S
    33, // As
    34, // Se
    52, // Te
];

/// Aromatic atoms and bonds found by [`perceive`].
#[derive(Debug, Clone, Default)]
pub struct Aromaticity {
    pub atoms: Vec<bool>,
    pub bonds: HashSet<EdgeIndex>,
}

pub fn find_aromatic_atoms<A, B>(mol: &Mol<A, B>) -> Vec<bool>
where
    A: HasAtomicNum + HasFormalCharge + HasHydrogenCount,
    B: HasBondOrder,
{
    perceive(mol).atoms
}

/// Recomputes every atom and bond aromaticity flag from the Kekulé bonds.
pub fn set_aromaticity(mol: &mut Mol<Atom, Bond>) {
    let found = perceive(mol);
    let atoms: Vec<_> = mol.atoms().collect();
    for idx in atoms {
        mol.atom_mut(idx).is_aromatic = found.atoms[idx.index()];
    }
    let bonds: Vec<_> = mol.bonds().collect();
    for edge in bonds {
        mol.bond_mut(edge).is_aromatic = found.bonds.contains(&edge);
    }
}

/// Hückel perception over the symmetrized SSSR, plus pairs of fused rings
/// whose union is aromatic when neither ring is on its own (azulene).
pub fn perceive<A, B>(mol: &Mol<A, B>) -> Aromaticity
where
    A: HasAtomicNum + HasFormalCharge + HasHydrogenCount,
    B: HasBondOrder,
{
    let n = mol.atom_count();
    let mut result = Aromaticity {
        atoms: vec![false; n],
        bonds: HashSet::new(),
    };

    let ring_info = RingInfo::symmetrized_sssr(mol);
    if ring_info.num_rings() == 0 {
        return result;
    }

    let electrons: Vec<Option<u8>> = mol
        .atoms()
        .map(|idx| {
            if ring_info.is_ring_atom(idx) {
                pi_electrons(mol, &ring_info, idx)
            } else {
                None
            }
        })
        .collect();

    let rings = ring_info.rings();
    let ring_edges: Vec<Vec<EdgeIndex>> = rings.iter().map(|r| ring_bonds(mol, r)).collect();
    let mut ring_aromatic = vec![false; rings.len()];

    for (i, ring) in rings.iter().enumerate() {
        if is_aromatic_atom_set(ring, &electrons) {
            ring_aromatic[i] = true;
            mark(&mut result, ring, &ring_edges[i]);
        }
    }

    for (i, j) in fused_pairs(&ring_edges) {
        if ring_aromatic[i] && ring_aromatic[j] {
            continue;
        }
        let mut union: Vec<NodeIndex> = rings[i].clone();
        for &a in &rings[j] {
            if !union.contains(&a) {
                union.push(a);
            }
        }
        if is_aromatic_atom_set(&union, &electrons) {
            mark(&mut result, &union, &ring_edges[i]);
            mark(&mut result, &[], &ring_edges[j]);
        }
    }

    result
}

/// Index pairs `(i, j)`, `i < j`, of rings sharing at least one bond.
fn fused_pairs(ring_edges: &[Vec<EdgeIndex>]) -> Vec<(usize, usize)> {
    let mut by_edge: HashMap<EdgeIndex, Vec<usize>> = HashMap::new();
    for (i, edges) in ring_edges.iter().enumerate() {
        for &e in edges {
            by_edge.entry(e).or_default().push(i);
        }
    }
    let mut pairs: Vec<(usize, usize)> = by_edge
        .values()
        .flat_map(|ids| {
            ids.iter()
                .enumerate()
                .flat_map(move |(k, &i)| ids[k + 1..].iter().map(move |&j| (i.min(j), i.max(j))))
        })
        .collect();
    pairs.sort_unstable();
    pairs.dedup();
    pairs
}

fn mark(result: &mut Aromaticity, atoms: &[NodeIndex], edges: &[EdgeIndex]) {
    for &a in atoms {
        result.atoms[a.index()] = true;
    }
    result.bonds.extend(edges.iter().copied());
}

fn ring_bonds<A, B>(mol: &Mol<A, B>, ring: &[NodeIndex]) -> Vec<EdgeIndex> {
    let len = ring.len();
    (0..len)
        .filter_map(|i| mol.bond_between(ring[i], ring[(i + 1) % len]))
        .collect()
}

fn is_aromatic_atom_set(atoms: &[NodeIndex], electrons: &[Option<u8>]) -> bool {
    let mut total: u32 = 0;
    for a in atoms {
        match electrons[a.index()] {
            Some(e) => total += e as u32,
            None => return false,
        }
    }
    is_huckel(total)
}

/// Pi electrons a ring atom donates, or `None` if it cannot be aromatic.
fn pi_electrons<A, B>(mol: &Mol<A, B>, rings: &RingInfo, atom_idx: NodeIndex) -> Option<u8>
where
    A: HasAtomicNum + HasFormalCharge + HasHydrogenCount,
    B: HasBondOrder,
{
    let atom = mol.atom(atom_idx);
    let anum = atom.atomic_num();
    if !SP2_CAPABLE.contains(&anum) {
        return None;
    }
    let charge = atom.formal_charge();

    let total_degree = mol.degree(atom_idx) + atom.hydrogen_count() as usize;
    if total_degree > 3 {
        return None;
    }

    let mut ring_double = false;
    let mut exocyclic_double: Option<u8> = None;
    for (nb, edge) in mol.neighbor_bonds(atom_idx) {
        match mol.bond(edge).bond_order() {
            BondOrder::Triple => return None,
            BondOrder::Double => {
                if rings.is_ring_bond(atom_idx, nb) {
                    ring_double = true;
                } else {
                    exocyclic_double = Some(mol.atom(nb).atomic_num());
                }
            }
            BondOrder::Single => {}
        }
    }

    if ring_double {
        return Some(1);
    }

    if let Some(partner) = exocyclic_double {
        // An electronegative partner pulls the pair out of the ring.
        return match (anum, partner) {
            (6, 7 | 8 | 16 | 34) => Some(0),
            _ => None,
        };
    }

    match anum {
        6 => match charge {
            -1 => Some(2),
            1 => Some(0),
            _ => None,
        },
        7 | 15 | 33 => match (charge, total_degree) {
            (0, 3) => Some(2),
            (-1, 2) => Some(2),
            _ => None,
        },
        8 | 16 | 34 | 52 => match (charge, total_degree) {
            (0, 2) => Some(2),
            _ => None,
        },
        5 => match charge {
            0 if total_degree == 3 => Some(0),
            _ => None,
        },
        _ => None,
    }
}

fn is_huckel(pi_electrons: u32) -> bool {
    pi_electrons >= 2 && (pi_electrons - 2) % 4 == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::from_smiles;

    fn aromatic(smi: &str) -> Vec<bool> {
        find_aromatic_atoms(&from_smiles(smi).unwrap())
    }

    #[test]
    fn six_membered_rings_all_aromatic() {
        for smi in ["c1ccccc1", "c1ccncc1", "c1ccc2ccccc2c1", "C1=CC=CC=C1"] {
            assert!(aromatic(smi).iter().all(|&a| a), "{smi}");
        }
    }

    #[test]
    fn five_membered_heterocycles_aromatic() {
        for smi in ["[nH]1cccc1", "o1cccc1", "s1cccc1", "c1c[nH]cn1", "[CH-]1C=CC=C1"] {
            let arom = aromatic(smi);
            assert_eq!(arom.len(), 5);
            assert!(arom.iter().all(|&a| a), "{smi}");
        }
    }

    #[test]
    fn cyclohexane_none_aromatic() {
        assert!(aromatic("C1CCCCC1").iter().all(|&a| !a));
    }

    #[test]
    fn phenol_ring_aromatic_oxygen_not() {
        let arom = aromatic("Oc1ccccc1");
        assert_eq!(arom.len(), 7);
        assert!(!arom[0]);
        assert!(arom[1..].iter().all(|&a| a));
    }

    #[test]
    fn non_huckel_rings_not_aromatic() {
        for smi in ["C1=CCC=C1", "C1=CC=CC=CC=C1", "O=C1C=CC(=O)C=C1", "C=C1C=CC=C1"] {
            assert!(aromatic(smi).iter().all(|&a| !a), "{smi}");
        }
    }

    #[test]
    fn pyridone_is_aromatic() {
        let arom = aromatic("O=C1C=CC=CN1");
        assert!(!arom[0]);
        assert!(arom[1..].iter().all(|&a| a));
    }

    #[test]
    fn azulene_aromatic_as_fused_pair() {
        let mol = from_smiles("C1=CC2=CC=CC=CC2=C1").unwrap();
        let found = perceive(&mol);
        assert!(found.atoms.iter().all(|&a| a));
        assert_eq!(found.bonds.len(), 11);
    }

    #[test]
    fn biphenyl_link_not_aromatic() {
        let mut mol = from_smiles("c1ccccc1-c1ccccc1").unwrap();
        set_aromaticity(&mut mol);
        let link = mol
            .bond_between(NodeIndex::new(5), NodeIndex::new(6))
            .unwrap();
        assert!(!mol.bond(link).is_aromatic);
        assert!(mol.atoms().all(|a| mol.atom(a).is_aromatic));
    }

    #[test]
    fn set_aromaticity_on_kekulized_benzene() {
        let mut mol = Mol::new();
        let atoms: Vec<_> = (0..6)
            .map(|_| {
                mol.add_atom(Atom {
                    atomic_num: 6,
                    hydrogen_count: 1,
                    ..Atom::default()
                })
            })
            .collect();
        for i in 0..6 {
            let order = if i % 2 == 0 {
                BondOrder::Double
            } else {
                BondOrder::Single
            };
            mol.add_bond(
                atoms[i],
                atoms[(i + 1) % 6],
                Bond {
                    order,
                    ..Bond::default()
                },
            );
        }

        set_aromaticity(&mut mol);

        for idx in mol.atoms() {
            assert!(mol.atom(idx).is_aromatic, "atom {}", idx.index());
        }
        for edge in mol.bonds() {
            assert!(mol.bond(edge).is_aromatic);
            assert_ne!(mol.bond(edge).order, BondOrder::Triple);
        }
    }

    #[test]
    fn huckel_rule() {
        assert!(!is_huckel(0));
        assert!(!is_huckel(1));
        assert!(is_huckel(2));
        assert!(!is_huckel(4));
        assert!(is_huckel(6));
        assert!(!is_huckel(8));
        assert!(is_huckel(10));
        assert!(is_huckel(14));
        assert!(is_huckel(18));
    }
}
