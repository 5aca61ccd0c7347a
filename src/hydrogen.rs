use log::trace;
use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::mol::{AtomId, DoubleBondStereo, Mol, TetrahedralStereo};

/// Whether the hydrogen node `idx` can become an implicit count on its
/// neighbour without losing information.
fn is_removable_h(mol: &Mol<Atom, Bond>, idx: NodeIndex) -> bool {
    let atom = mol.atom(idx);
    if atom.atomic_num != 1 || atom.isotope != 0 || atom.formal_charge != 0 {
        return false;
    }
    if atom.hydrogen_count != 0 {
        return false;
    }
    let mut bonds = mol.neighbor_bonds(idx);
    let (Some((heavy, edge)), None) = (bonds.next(), bonds.next()) else {
        return false;
    };
    mol.atom(heavy).atomic_num != 1 && mol.bond(edge).order == BondOrder::Single
}

/// Folds explicit hydrogen nodes into their neighbour's hydrogen count.
///
/// Hydrogens carrying an isotope or a charge, bonded to another hydrogen,
/// or bridging two atoms stay as nodes. Stereo records that named a removed
/// hydrogen are rewritten to the implicit slot (tetrahedral) or to the
/// remaining substituent with the configuration flipped (double bonds).
pub fn remove_hs(mol: &Mol<Atom, Bond>) -> Mol<Atom, Bond> {
    let node_count = mol.atom_count();

    let mut removable = vec![false; node_count];
    let mut extra_h: Vec<u8> = vec![0; node_count];

    for idx in mol.atoms() {
        if !is_removable_h(mol, idx) {
            continue;
        }
        if let Some(heavy) = mol.neighbors(idx).next() {
            removable[idx.index()] = true;
            extra_h[heavy.index()] = extra_h[heavy.index()].saturating_add(1);
        }
    }

    if !removable.iter().any(|&r| r) {
        return mol.clone();
    }

    let mut result = Mol::new();
    let mut index_map: Vec<Option<NodeIndex>> = vec![None; node_count];

    for idx in mol.atoms() {
        if removable[idx.index()] {
            continue;
        }
        let atom = mol.atom(idx);
        let new_idx = result.add_atom(Atom {
            hydrogen_count: atom.hydrogen_count.saturating_add(extra_h[idx.index()]),
            ..atom.clone()
        });
        index_map[idx.index()] = Some(new_idx);
    }

    for edge in mol.bonds() {
        let Some((a, b)) = mol.bond_endpoints(edge) else {
            continue;
        };
        if let (Some(new_a), Some(new_b)) = (index_map[a.index()], index_map[b.index()]) {
            result.add_bond(new_a, new_b, mol.bond(edge).clone());
        }
    }

    let new_stereo: Vec<TetrahedralStereo> = mol
        .tetrahedral_stereo()
        .iter()
        .filter_map(|s| {
            let center = index_map[s.center.index()]?;
            let mut neighbors = [AtomId::Implicit(center); 4];
            for (slot, &aid) in neighbors.iter_mut().zip(s.neighbors.iter()) {
                *slot = match aid {
                    AtomId::Node(idx) if removable[idx.index()] => AtomId::Implicit(center),
                    AtomId::Node(idx) => AtomId::Node(index_map[idx.index()]?),
                    AtomId::Implicit(_) => AtomId::Implicit(center),
                };
            }
            Some(TetrahedralStereo { center, neighbors })
        })
        .collect();
    result.set_tetrahedral_stereo(new_stereo);

    let new_db: Vec<DoubleBondStereo> = mol
        .double_bond_stereo()
        .iter()
        .filter_map(|s| {
            let mut config = s.config;
            let mut refs = s.refs;
            let ends = [s.bond.0, s.bond.1];
            for side in 0..2 {
                if !removable[refs[side].index()] {
                    continue;
                }
                let end = ends[side];
                let other_end = ends[1 - side];
                let Some(replacement) = mol
                    .neighbors(end)
                    .find(|&nb| nb != other_end && nb != refs[side] && !removable[nb.index()])
                else {
                    trace!("dropping double bond stereo referenced only by hydrogens");
                    return None;
                };
                refs[side] = replacement;
                config = config.flip();
            }
            Some(DoubleBondStereo::new(
                index_map[ends[0].index()]?,
                index_map[ends[1].index()]?,
                index_map[refs[0].index()]?,
                index_map[refs[1].index()]?,
                config,
            ))
        })
        .collect();
    result.set_double_bond_stereo(new_db);

    result
}
