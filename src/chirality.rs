use log::debug;
use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::canonical::symmetry_classes;
use crate::mol::{AtomId, DoubleBondStereo, Mol, TetrahedralStereo};
use crate::rings::RingInfo;

/// Double bonds in rings smaller than this cannot be trans, so their
/// geometry is implied by the ring.
const MIN_STEREO_RING_SIZE: usize = 8;

/// Drops stereo records that do not describe a real stereo element.
///
/// Runs until stable, since removing one record can make a neighbouring
/// center symmetric.
pub fn cleanup_stereo(mol: &mut Mol<Atom, Bond>) {
    if mol.tetrahedral_stereo().is_empty() && mol.double_bond_stereo().is_empty() {
        return;
    }
    let rings = RingInfo::sssr(mol);

    loop {
        let classes = symmetry_classes(mol);

        let centers: Vec<NodeIndex> = mol
            .tetrahedral_stereo()
            .iter()
            .filter(|s| !is_stereocenter(mol, s, &classes, &rings))
            .map(|s| s.center)
            .collect();
        let double_bonds: Vec<(NodeIndex, NodeIndex)> = mol
            .double_bond_stereo()
            .iter()
            .filter(|s| !is_stereo_double_bond(mol, s, &classes, &rings))
            .map(|s| s.bond)
            .collect();

        if centers.is_empty() && double_bonds.is_empty() {
            return;
        }
        for center in centers {
            debug!("dropping tetrahedral stereo on atom {}", center.index());
            mol.remove_tetrahedral_stereo(center);
        }
        for (a, b) in double_bonds {
            debug!("dropping double bond stereo on {}={}", a.index(), b.index());
            mol.remove_double_bond_stereo(a, b);
        }
    }
}

/// Elements whose lone pair can stand in for a fourth substituent.
fn has_lone_pair_stereo(atomic_num: u8) -> bool {
    matches!(atomic_num, 15 | 16 | 33 | 34)
}

fn is_stereocenter(
    mol: &Mol<Atom, Bond>,
    stereo: &TetrahedralStereo,
    classes: &[usize],
    rings: &RingInfo,
) -> bool {
    let center = stereo.center;
    let atom = mol.atom(center);
    let implicit = stereo
        .neighbors
        .iter()
        .filter(|n| matches!(n, AtomId::Implicit(_)))
        .count();

    match (implicit, atom.hydrogen_count) {
        (0, 0) | (1, 1) => {}
        (1, 0) if has_lone_pair_stereo(atom.atomic_num) => {}
        _ => return false,
    }
    if mol.degree(center) + implicit != 4 {
        return false;
    }

    let nodes: Vec<NodeIndex> = stereo
        .neighbors
        .iter()
        .filter_map(|n| match n {
            AtomId::Node(idx) => Some(*idx),
            AtomId::Implicit(_) => None,
        })
        .collect();

    let mut tied: Vec<(NodeIndex, NodeIndex)> = Vec::new();
    for (i, &a) in nodes.iter().enumerate() {
        for &b in &nodes[i + 1..] {
            if classes[a.index()] == classes[b.index()] {
                tied.push((a, b));
            }
        }
    }

    match tied.as_slice() {
        [] => true,
        [(a, b)] => is_ring_stereo(mol, center, *a, *b, rings),
        _ => false,
    }
}

/// A center whose only tie is its two ring bonds is still stereogenic when
/// the ring carries another stereocenter (cis/trans ring substitution).
fn is_ring_stereo(
    mol: &Mol<Atom, Bond>,
    center: NodeIndex,
    a: NodeIndex,
    b: NodeIndex,
    rings: &RingInfo,
) -> bool {
    if !rings.is_ring_bond(center, a) || !rings.is_ring_bond(center, b) {
        return false;
    }
    rings.atom_rings(center).iter().any(|ring| {
        mol.tetrahedral_stereo()
            .iter()
            .any(|other| other.center != center && ring.contains(&other.center))
    })
}

fn is_stereo_double_bond(
    mol: &Mol<Atom, Bond>,
    stereo: &DoubleBondStereo,
    classes: &[usize],
    rings: &RingInfo,
) -> bool {
    let (a, b) = stereo.bond;
    let Some(edge) = mol.bond_between(a, b) else {
        return false;
    };
    let bond = mol.bond(edge);
    if bond.order != BondOrder::Double || bond.is_aromatic {
        return false;
    }
    if rings
        .smallest_bond_ring_size(a, b)
        .is_some_and(|size| size < MIN_STEREO_RING_SIZE)
    {
        return false;
    }

    [(a, b), (b, a)].iter().all(|&(end, other)| {
        let subs: Vec<NodeIndex> = mol.neighbors(end).filter(|&nb| nb != other).collect();
        match subs.as_slice() {
            [_] => mol.atom(end).hydrogen_count <= 1,
            [x, y] => classes[x.index()] != classes[y.index()],
            _ => false,
        }
    })
}
