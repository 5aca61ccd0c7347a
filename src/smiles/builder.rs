use log::debug;
use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::atom::Atom;
use crate::bond::{SmilesBond, SmilesBondOrder};
use crate::element::Element;
use crate::mol::{AtomId, DoubleBondConfig, DoubleBondStereo, Mol, TetrahedralStereo};
use crate::rings::bridges;
use crate::smiles::parse_tree::{ParseAtom, ParseTree};
use crate::smiles::tokenizer::{BondToken, ChiralityToken};

pub fn build_mol(tree: &ParseTree) -> Mol<Atom, SmilesBond> {
    let mut mol = Mol::new();
    let mut node_indices: Vec<NodeIndex> = Vec::with_capacity(tree.atoms.len());

    for parse_atom in &tree.atoms {
        let atom = Atom {
            atomic_num: parse_atom.element.map_or(0, Element::atomic_num),
            formal_charge: parse_atom.charge,
            isotope: parse_atom.isotope,
            hydrogen_count: 0,
            is_aromatic: parse_atom.is_aromatic,
            atom_class: parse_atom.atom_class,
        };
        node_indices.push(mol.add_atom(atom));
    }

    let mut implicit_aromatic: Vec<EdgeIndex> = Vec::new();
    for (i, parse_atom) in tree.atoms.iter().enumerate() {
        for neighbor in &parse_atom.neighbors {
            let j = neighbor.atom_idx;
            if j <= i {
                continue;
            }
            let order = resolve_bond_order(
                &neighbor.bond,
                parse_atom.is_aromatic,
                tree.atoms[j].is_aromatic,
            );
            let edge = mol.add_bond(node_indices[i], node_indices[j], SmilesBond { order });
            if neighbor.bond.is_none() && order == SmilesBondOrder::Aromatic {
                implicit_aromatic.push(edge);
            }
        }
    }

    // Two aromatic atoms joined outside any ring, as in biphenyl.
    if !implicit_aromatic.is_empty() {
        let bridge_edges = bridges(&mol);
        for edge in implicit_aromatic {
            if bridge_edges.contains(&edge) {
                mol.bond_mut(edge).order = SmilesBondOrder::Single;
            }
        }
    }

    resolve_hydrogen_counts(&mut mol, tree, &node_indices);
    resolve_chirality(&mut mol, tree, &node_indices);
    resolve_ez_stereo(&mut mol, tree, &node_indices);

    mol
}

fn resolve_bond_order(
    bond_tok: &Option<BondToken>,
    from_aromatic: bool,
    to_aromatic: bool,
) -> SmilesBondOrder {
    match bond_tok {
        Some(BondToken::Single) => SmilesBondOrder::Single,
        Some(BondToken::Double) => SmilesBondOrder::Double,
        Some(BondToken::Triple) => SmilesBondOrder::Triple,
        Some(BondToken::Aromatic) => SmilesBondOrder::Aromatic,
        Some(BondToken::Up) | Some(BondToken::Down) => SmilesBondOrder::Single,
        None => {
            if from_aromatic && to_aromatic {
                SmilesBondOrder::Aromatic
            } else {
                SmilesBondOrder::Implicit
            }
        }
    }
}

fn resolve_chirality(mol: &mut Mol<Atom, SmilesBond>, tree: &ParseTree, indices: &[NodeIndex]) {
    for (i, parse_atom) in tree.atoms.iter().enumerate() {
        if parse_atom.chirality == ChiralityToken::None {
            continue;
        }
        let center = indices[i];

        let mut order: Vec<AtomId> = parse_atom
            .neighbors
            .iter()
            .map(|n| AtomId::Node(indices[n.atom_idx]))
            .collect();

        let h_count = mol.atom(center).hydrogen_count;
        // A lone pair takes the implicit hydrogen's place.
        if h_count == 1 || (h_count == 0 && order.len() == 3) {
            let at = if parse_atom.has_parent { 1 } else { 0 };
            order.insert(at.min(order.len()), AtomId::Implicit(center));
        }

        let Ok(mut neighbors) = <[AtomId; 4]>::try_from(order) else {
            debug!("ignoring chirality on atom {}: not four-coordinate", i);
            continue;
        };
        if parse_atom.chirality == ChiralityToken::Clockwise {
            neighbors.swap(2, 3);
        }
        mol.add_tetrahedral_stereo(TetrahedralStereo { center, neighbors });
    }
}

/// First substituent of `atom` (other than `other_end`) carrying a bond
/// direction, with `true` when it sits above `atom`. `Err` when two
/// substituents claim the same side.
fn substituent_side(
    atom: &ParseAtom,
    other_end: usize,
) -> Result<Option<(usize, bool)>, ()> {
    let mut found: Option<(usize, bool)> = None;
    for neighbor in &atom.neighbors {
        if neighbor.atom_idx == other_end {
            continue;
        }
        let above = match neighbor.bond {
            Some(BondToken::Up) => true,
            Some(BondToken::Down) => false,
            _ => continue,
        };
        match found {
            None => found = Some((neighbor.atom_idx, above)),
            // Two substituents on the same side of one end.
            Some((_, prev)) if prev == above => return Err(()),
            Some(_) => {}
        }
    }
    Ok(found)
}

fn resolve_ez_stereo(mol: &mut Mol<Atom, SmilesBond>, tree: &ParseTree, indices: &[NodeIndex]) {
    for (i, parse_atom) in tree.atoms.iter().enumerate() {
        for neighbor in &parse_atom.neighbors {
            let j = neighbor.atom_idx;
            if i >= j || neighbor.bond != Some(BondToken::Double) {
                continue;
            }

            let (left, right) = match (
                substituent_side(parse_atom, j),
                substituent_side(&tree.atoms[j], i),
            ) {
                (Ok(Some(l)), Ok(Some(r))) => (l, r),
                (Err(()), _) | (_, Err(())) => {
                    debug!("conflicting bond directions around double bond {}={}", i, j);
                    continue;
                }
                _ => continue,
            };

            let config = if left.1 == right.1 {
                DoubleBondConfig::Cis
            } else {
                DoubleBondConfig::Trans
            };
            mol.add_double_bond_stereo(DoubleBondStereo::new(
                indices[i],
                indices[j],
                indices[left.0],
                indices[right.0],
                config,
            ));
        }
    }
}

fn resolve_hydrogen_counts(
    mol: &mut Mol<Atom, SmilesBond>,
    tree: &ParseTree,
    indices: &[NodeIndex],
) {
    for (i, parse_atom) in tree.atoms.iter().enumerate() {
        let h_count = match parse_atom.hcount {
            Some(h) if parse_atom.is_bracket => h,
            _ => implicit_hydrogens(parse_atom, bond_order_sum(mol, indices[i])),
        };
        mol.atom_mut(indices[i]).hydrogen_count = h_count;
    }
}

/// Hydrogens a reader adds to a bare organic-subset atom.
pub(crate) fn implicit_h_count(
    element: Element,
    is_aromatic: bool,
    bond_order_sum: u8,
) -> u8 {
    let Some(target) = element
        .default_valences()
        .iter()
        .copied()
        .find(|&v| v >= bond_order_sum)
    else {
        return 0;
    };
    let h = target - bond_order_sum;
    if is_aromatic && h > 0 {
        h - 1
    } else {
        h
    }
}

fn implicit_hydrogens(parse_atom: &ParseAtom, bos: u8) -> u8 {
    parse_atom
        .element
        .map_or(0, |e| implicit_h_count(e, parse_atom.is_aromatic, bos))
}

fn bond_order_sum(mol: &Mol<Atom, SmilesBond>, node: NodeIndex) -> u8 {
    mol.bonds_of(node)
        .map(|e| mol.bond(e).order.valence_contribution())
        .fold(0u8, u8::saturating_add)
}
