use petgraph::graph::NodeIndex;

use crate::*;

/// Formaldehyde plus a detached chloride, built by hand.
fn hand_built() -> (Mol<Atom, Bond>, [NodeIndex; 3]) {
    let mut mol = Mol::new();
    let c = mol.add_atom(Atom {
        atomic_num: 6,
        hydrogen_count: 2,
        ..Atom::default()
    });
    let o = mol.add_atom(Atom {
        atomic_num: 8,
        ..Atom::default()
    });
    let cl = mol.add_atom(Atom {
        atomic_num: 17,
        formal_charge: -1,
        ..Atom::default()
    });
    mol.add_bond(
        c,
        o,
        Bond {
            order: BondOrder::Double,
            ..Bond::default()
        },
    );
    (mol, [c, o, cl])
}

#[test]
fn graph_queries() {
    let (mut mol, [c, o, cl]) = hand_built();
    assert_eq!((mol.atom_count(), mol.bond_count()), (3, 1));
    assert_eq!(mol.graph().node_count(), 3);

    let e = mol.bond_between(o, c).unwrap();
    assert_eq!(mol.bond(e).order, BondOrder::Double);
    assert_eq!(mol.bond_between(c, cl), None);
    let (a, b) = mol.bond_endpoints(e).unwrap();
    assert_eq!([a.min(b), a.max(b)], [c, o]);

    assert_eq!(mol.neighbors(c).collect::<Vec<_>>(), [o]);
    assert_eq!(mol.bonds_of(c).count(), 1);
    assert_eq!(mol.degree(cl), 0);

    mol.atom_mut(cl).formal_charge = 0;
    mol.atom_mut(cl).hydrogen_count = 1;
    assert!(check_valence(&mol).is_ok());
    assert_eq!(serialize(&mol, true), canonical_smiles("Cl.C=O"));
}

#[test]
fn atom_trait_impls() {
    let atom = Atom {
        atomic_num: 6,
        formal_charge: -1,
        isotope: 13,
        hydrogen_count: 3,
        is_aromatic: true,
        atom_class: 4,
    };

    assert_eq!(HasAtomicNum::atomic_num(&atom), 6);
    assert_eq!(HasFormalCharge::formal_charge(&atom), -1);
    assert_eq!(HasIsotope::isotope(&atom), 13);
    assert_eq!(HasHydrogenCount::hydrogen_count(&atom), 3);
    assert!(HasAromaticity::is_aromatic(&atom));
    assert_eq!(HasAtomClass::atom_class(&atom), 4);
}

#[test]
fn bond_trait_impls() {
    let bond = Bond {
        order: BondOrder::Double,
        is_aromatic: true,
    };

    assert_eq!(HasBondOrder::bond_order(&bond), BondOrder::Double);
    assert!(HasBondAromaticity::is_aromatic_bond(&bond));
}

#[test]
fn smiles_bond_reader_contribution() {
    assert_eq!(SmilesBondOrder::Aromatic.valence_contribution(), 1);
    assert_eq!(SmilesBondOrder::Implicit.valence_contribution(), 1);
    assert_eq!(SmilesBondOrder::Triple.valence_contribution(), 3);
    assert_eq!(SmilesBond::default().order, SmilesBondOrder::Implicit);
}

fn four_neighbors() -> (Mol<Atom, Bond>, NodeIndex, [AtomId; 4]) {
    let mut mol = Mol::new();
    let c = mol.add_atom(Atom {
        atomic_num: 6,
        hydrogen_count: 1,
        ..Atom::default()
    });
    let mut ids = [AtomId::Implicit(c); 4];
    for (slot, atomic_num) in [9u8, 17, 35].into_iter().enumerate() {
        let a = mol.add_atom(Atom {
            atomic_num,
            ..Atom::default()
        });
        mol.add_bond(c, a, Bond::default());
        ids[slot + 1] = AtomId::Node(a);
    }
    (mol, c, ids)
}

#[test]
fn tetrahedral_parity() {
    let (_, c, [h, f, cl, br]) = four_neighbors();
    let stereo = TetrahedralStereo {
        center: c,
        neighbors: [h, f, cl, br],
    };

    assert_eq!(stereo.is_anticlockwise(&[h, f, cl, br]), Some(true));
    assert_eq!(stereo.is_anticlockwise(&[h, f, br, cl]), Some(false));
    assert_eq!(stereo.is_anticlockwise(&[f, cl, h, br]), Some(true));
    assert_eq!(stereo.is_anticlockwise(&[f, cl, br]), None);
}

#[test]
fn tetrahedral_records_on_mol() {
    let (mut mol, c, ids) = four_neighbors();
    mol.add_tetrahedral_stereo(TetrahedralStereo {
        center: c,
        neighbors: ids,
    });
    assert_eq!(mol.tetrahedral_stereo().len(), 1);
    assert_eq!(mol.tetrahedral_stereo_for(c).map(|s| s.neighbors), Some(ids));

    mol.remove_tetrahedral_stereo(c);
    assert!(mol.tetrahedral_stereo_for(c).is_none());
}

#[test]
fn double_bond_record_normalized() {
    let (a, b, ra, rb) = (
        NodeIndex::new(2),
        NodeIndex::new(1),
        NodeIndex::new(3),
        NodeIndex::new(0),
    );
    let stereo = DoubleBondStereo::new(a, b, ra, rb, DoubleBondConfig::Cis);
    assert_eq!(stereo.bond, (b, a));
    assert_eq!(stereo.refs, [rb, ra]);
    assert_eq!(stereo.ref_of(a), Some(ra));
    assert_eq!(stereo.ref_of(ra), None);
    assert_eq!(DoubleBondConfig::Cis.flip(), DoubleBondConfig::Trans);
}

#[test]
fn parse_folds_hydrogens_and_perceives_rings() {
    let mol = parse("[H]c1ccccc1").unwrap();
    assert_eq!(mol.atom_count(), 6);
    assert!(mol.atoms().all(|a| mol.atom(a).is_aromatic));
    assert!(mol.atoms().all(|a| mol.atom(a).hydrogen_count == 1));
    assert!(mol.bonds().all(|e| mol.bond(e).is_aromatic));
}

#[test]
fn parse_drops_meaningless_stereo() {
    assert!(parse("C[C@H](C)O").unwrap().tetrahedral_stereo().is_empty());
    assert!(parse("C/C=C(/C)C").unwrap().double_bond_stereo().is_empty());
}

#[test]
fn parse_reports_cause() {
    assert_eq!(parse("").unwrap_err(), SmilesError::EmptyInput);
    assert!(matches!(
        parse("c1cccc1").unwrap_err(),
        SmilesError::Kekulize(_)
    ));
    assert!(matches!(
        parse("CN(C)(C)(C)C").unwrap_err(),
        SmilesError::Valence(_)
    ));
}

#[test]
fn serialize_selects_order() {
    let mol = parse("OCC").unwrap();
    assert_eq!(serialize(&mol, false), "OCC");
    assert_eq!(serialize(&mol, true), "CCO");
}

#[test]
fn canonical_smiles_wrapper() {
    assert_eq!(canonical_smiles("CCO"), "CCO");
    assert_eq!(canonical_smiles("C1=CC=CC=C1"), "c1ccccc1");
    assert_eq!(canonical_smiles("notasmiles((("), "");
    assert_eq!(canonical_smiles(""), "");
}

#[test]
fn defaults() {
    let opts = SmilesWriteOptions::default();
    assert!(opts.canonical && opts.isomeric);
    assert_eq!(BondOrder::default(), BondOrder::Single);
    assert_eq!(Atom::default().atomic_num, 0);
    assert!(Mol::<Atom, Bond>::default().tetrahedral_stereo().is_empty());
}
