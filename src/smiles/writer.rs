use std::collections::{HashMap, HashSet, VecDeque};

use log::debug;
use petgraph::graph::{EdgeIndex, NodeIndex};

use super::builder::implicit_h_count;
use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::canonical::canonical_ordering;
use crate::element::Element;
use crate::graph_ops::connected_components;
use crate::mol::{AtomId, DoubleBondConfig, DoubleBondStereo, Mol};
use crate::rings::bridges;

/// How [`write_smiles`] lays out its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmilesWriteOptions {
    /// Order atoms by canonical rank instead of by index.
    pub canonical: bool,
    /// Keep isotopes, tetrahedral marks and double-bond directions.
    pub isomeric: bool,
}

impl Default for SmilesWriteOptions {
    fn default() -> Self {
        Self {
            canonical: true,
            isomeric: true,
        }
    }
}

/// Writes `mol` following atom indices.
pub fn to_smiles(mol: &Mol<Atom, Bond>) -> String {
    write_smiles(
        mol,
        &SmilesWriteOptions {
            canonical: false,
            isomeric: true,
        },
    )
}

/// Writes the canonical isomeric SMILES of `mol`.
pub fn to_canonical_smiles(mol: &Mol<Atom, Bond>) -> String {
    write_smiles(mol, &SmilesWriteOptions::default())
}

pub fn write_smiles(mol: &Mol<Atom, Bond>, options: &SmilesWriteOptions) -> String {
    let flat;
    let mol = if options.isomeric {
        mol
    } else {
        flat = without_isomeric_info(mol);
        &flat
    };

    let ranks = if options.canonical {
        canonical_ordering(mol)
    } else {
        (0..mol.atom_count()).collect()
    };

    let mut components = connected_components(mol);
    components.sort_by_key(|atoms| atoms.iter().map(|a| ranks[a.index()]).min());

    components
        .iter()
        .map(|atoms| write_fragment(mol, atoms, &ranks))
        .collect::<Vec<_>>()
        .join(".")
}

fn without_isomeric_info(mol: &Mol<Atom, Bond>) -> Mol<Atom, Bond> {
    let mut flat = mol.clone();
    let atoms: Vec<NodeIndex> = flat.atoms().collect();
    for idx in atoms {
        flat.atom_mut(idx).isotope = 0;
    }
    flat.set_tetrahedral_stereo(Vec::new());
    flat.set_double_bond_stereo(Vec::new());
    flat
}

/// A ring bond, opened at the atom written first.
struct RingBond {
    opener: NodeIndex,
    closer: NodeIndex,
    edge: EdgeIndex,
}

/// The depth-first spanning tree of one component, in output order.
struct Layout {
    order: Vec<NodeIndex>,
    position: Vec<Option<usize>>,
    parent: Vec<Option<NodeIndex>>,
    children: Vec<Vec<NodeIndex>>,
    ring_bonds: Vec<RingBond>,
    /// Ring bonds touching each atom, in the order their digits are written.
    atom_rings: Vec<Vec<usize>>,
    digits: Vec<usize>,
}

impl Layout {
    fn build(mol: &Mol<Atom, Bond>, start: NodeIndex, ranks: &[usize]) -> Self {
        let n = mol.atom_count();
        let mut order = Vec::new();
        let mut position = vec![None; n];
        let mut parent = vec![None; n];
        let mut children: Vec<Vec<NodeIndex>> = vec![Vec::new(); n];
        let mut ring_bonds = Vec::new();
        let mut used = vec![false; mol.graph().edge_count()];

        let bridge_edges = bridges(mol);
        let sorted_neighbors: Vec<Vec<(NodeIndex, EdgeIndex)>> = mol
            .atoms()
            .map(|node| {
                let mut nbs: Vec<(NodeIndex, EdgeIndex)> = mol.neighbor_bonds(node).collect();
                nbs.sort_by_key(|(nb, _)| ranks[nb.index()]);
                multiple_ring_bonds_first(mol, &mut nbs, &bridge_edges);
                nbs
            })
            .collect();

        position[start.index()] = Some(0);
        order.push(start);
        let mut stack: Vec<(NodeIndex, usize)> = vec![(start, 0)];

        while let Some(top) = stack.last_mut() {
            let (node, next) = *top;
            let Some(&(nb, edge)) = sorted_neighbors[node.index()].get(next) else {
                stack.pop();
                continue;
            };
            top.1 += 1;
            if used[edge.index()] {
                continue;
            }
            used[edge.index()] = true;
            if position[nb.index()].is_none() {
                position[nb.index()] = Some(order.len());
                order.push(nb);
                parent[nb.index()] = Some(node);
                children[node.index()].push(nb);
                stack.push((nb, 0));
            } else {
                ring_bonds.push(RingBond {
                    opener: nb,
                    closer: node,
                    edge,
                });
            }
        }

        let mut layout = Self {
            order,
            position,
            parent,
            children,
            ring_bonds,
            atom_rings: vec![Vec::new(); n],
            digits: Vec::new(),
        };
        layout.assign_ring_digits();
        layout
    }

    fn pos(&self, node: NodeIndex) -> usize {
        self.position[node.index()].unwrap_or(usize::MAX)
    }

    /// Lowest free digit for each ring bond. Digits closing at an atom are
    /// written before those opening there and are released after it.
    fn assign_ring_digits(&mut self) {
        let n = self.position.len();
        let mut opening: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut closing: Vec<Vec<usize>> = vec![Vec::new(); n];
        for (i, rb) in self.ring_bonds.iter().enumerate() {
            opening[rb.opener.index()].push(i);
            closing[rb.closer.index()].push(i);
        }

        self.digits = vec![0; self.ring_bonds.len()];
        let mut in_use: Vec<bool> = vec![false];
        for &node in &self.order {
            let i = node.index();
            closing[i].sort_by_key(|&r| self.pos(self.ring_bonds[r].opener));
            opening[i].sort_by_key(|&r| self.pos(self.ring_bonds[r].closer));

            for &r in &opening[i] {
                let digit = match in_use.iter().skip(1).position(|&u| !u) {
                    Some(free) => free + 1,
                    None => {
                        in_use.push(false);
                        in_use.len() - 1
                    }
                };
                in_use[digit] = true;
                self.digits[r] = digit;
            }
            for &r in &closing[i] {
                in_use[self.digits[r]] = false;
            }

            self.atom_rings[i] = closing[i].iter().chain(&opening[i]).copied().collect();
        }
    }

    /// Whether `node` is written before `other`.
    fn is_left(&self, node: NodeIndex, other: NodeIndex) -> bool {
        self.pos(node) < self.pos(other)
    }

    fn ring_partner(&self, node: NodeIndex, ring: usize) -> NodeIndex {
        let rb = &self.ring_bonds[ring];
        if rb.opener == node {
            rb.closer
        } else {
            rb.opener
        }
    }

    /// Neighbours of `node` in the order a reader assigns them: preceding
    /// atom, implicit H or lone pair, ring bonds, then branches.
    fn written_neighbors(&self, node: NodeIndex, has_implicit: bool) -> Vec<AtomId> {
        let mut order = Vec::with_capacity(4);
        if let Some(p) = self.parent[node.index()] {
            order.push(AtomId::Node(p));
        }
        if has_implicit {
            order.push(AtomId::Implicit(node));
        }
        for &r in &self.atom_rings[node.index()] {
            order.push(AtomId::Node(self.ring_partner(node, r)));
        }
        for &child in &self.children[node.index()] {
            order.push(AtomId::Node(child));
        }
        order
    }
}

/// Moves ring neighbours reached by a double or triple bond ahead of ring
/// neighbours reached by a single bond, leaving every other entry in place.
/// The depth-first walk then closes rings on single bonds where it can.
fn multiple_ring_bonds_first(
    mol: &Mol<Atom, Bond>,
    nbs: &mut [(NodeIndex, EdgeIndex)],
    bridge_edges: &HashSet<EdgeIndex>,
) {
    let slots: Vec<usize> = (0..nbs.len())
        .filter(|&i| !bridge_edges.contains(&nbs[i].1))
        .collect();
    let mut ring: Vec<(NodeIndex, EdgeIndex)> = slots.iter().map(|&i| nbs[i]).collect();
    ring.sort_by_key(|&(_, edge)| {
        let bond = mol.bond(edge);
        bond.is_aromatic || bond.order == BondOrder::Single
    });
    for (&slot, entry) in slots.iter().zip(ring) {
        nbs[slot] = entry;
    }
}

/// A stereo double-bond end, the substituent chosen to carry its mark and
/// the bond between them.
type Anchor = (NodeIndex, NodeIndex, EdgeIndex);

/// `/` or `\` for the single bonds that carry double-bond geometry.
///
/// Each marked bond is a boolean (`true` writes `/`). Every stereo double
/// bond relates its two anchor bonds, and two marked bonds on the same end
/// must point opposite ways; the constraints are solved by propagation.
fn assign_bond_directions(mol: &Mol<Atom, Bond>, layout: &Layout) -> HashMap<EdgeIndex, char> {
    let mut sites: Vec<&DoubleBondStereo> = mol
        .double_bond_stereo()
        .iter()
        .filter(|s| layout.position[s.bond.0.index()].is_some())
        .collect();
    sites.sort_by_key(|s| {
        let (a, b) = (layout.pos(s.bond.0), layout.pos(s.bond.1));
        (a.min(b), a.max(b))
    });

    let substituent_bonds = |end: NodeIndex, other: NodeIndex| -> Vec<(NodeIndex, EdgeIndex)> {
        let mut subs: Vec<(NodeIndex, EdgeIndex)> = mol
            .neighbor_bonds(end)
            .filter(|&(nb, e)| {
                let bond = mol.bond(e);
                nb != other && bond.order == BondOrder::Single && !bond.is_aromatic
            })
            .collect();
        subs.sort_by_key(|(nb, _)| layout.pos(*nb));
        subs
    };

    let mut marked: Vec<EdgeIndex> = Vec::new();
    let mut anchors: Vec<(&DoubleBondStereo, [Anchor; 2])> = Vec::new();
    for site in sites {
        let ends = [site.bond.0, site.bond.1];
        let mut chosen = Vec::with_capacity(2);
        for (end, other) in [(ends[0], ends[1]), (ends[1], ends[0])] {
            let subs = substituent_bonds(end, other);
            let pick = subs
                .iter()
                .find(|(_, e)| marked.contains(e))
                .or_else(|| subs.first())
                .copied();
            match pick {
                Some((sub, edge)) => chosen.push((end, sub, edge)),
                None => break,
            }
        }
        let &[a, b] = chosen.as_slice() else {
            debug!(
                "no single bond to carry geometry of {}={}",
                ends[0].index(),
                ends[1].index()
            );
            continue;
        };
        for &(_, _, edge) in &[a, b] {
            if !marked.contains(&edge) {
                marked.push(edge);
            }
        }
        anchors.push((site, [a, b]));
    }

    // side(sub relative to end) = bit XOR (sub is written first)
    let mut constraints: HashMap<EdgeIndex, Vec<(EdgeIndex, bool)>> = HashMap::new();
    let mut relate = |e1: EdgeIndex, e2: EdgeIndex, parity: bool| {
        constraints.entry(e1).or_default().push((e2, parity));
        constraints.entry(e2).or_default().push((e1, parity));
    };
    for (site, ends) in &anchors {
        let mut cis = site.config == DoubleBondConfig::Cis;
        for &(end, sub, _) in ends {
            if site.ref_of(end) != Some(sub) {
                cis = !cis;
            }
        }
        let [(end_a, sub_a, edge_a), (end_b, sub_b, edge_b)] = *ends;
        let left_a = layout.is_left(sub_a, end_a);
        let left_b = layout.is_left(sub_b, end_b);
        relate(edge_a, edge_b, left_a ^ left_b ^ !cis);

        for &(end, sub, edge) in ends {
            let other = if end == end_a { end_b } else { end_a };
            for (sub2, edge2) in substituent_bonds(end, other) {
                if edge2 != edge && marked.contains(&edge2) {
                    let parity = layout.is_left(sub, end) ^ layout.is_left(sub2, end) ^ true;
                    relate(edge, edge2, parity);
                }
            }
        }
    }

    let mut bits: HashMap<EdgeIndex, bool> = HashMap::new();
    for &root in &marked {
        if bits.contains_key(&root) {
            continue;
        }
        bits.insert(root, true);
        let mut queue = VecDeque::from([root]);
        while let Some(e) = queue.pop_front() {
            let bit = bits[&e];
            for &(f, parity) in constraints.get(&e).map(Vec::as_slice).unwrap_or(&[]) {
                let want = bit ^ parity;
                match bits.get(&f) {
                    Some(&have) if have != want => {
                        debug!("conflicting bond directions on bond {}", f.index());
                    }
                    Some(_) => {}
                    None => {
                        bits.insert(f, want);
                        queue.push_back(f);
                    }
                }
            }
        }
    }

    bits.into_iter()
        .map(|(e, bit)| (e, if bit { '/' } else { '\\' }))
        .collect()
}

fn write_fragment(mol: &Mol<Atom, Bond>, atoms: &[NodeIndex], ranks: &[usize]) -> String {
    let Some(&start) = atoms.iter().min_by_key(|a| ranks[a.index()]) else {
        return String::new();
    };
    let layout = Layout::build(mol, start, ranks);
    let directions = assign_bond_directions(mol, &layout);

    let mut out = String::new();
    let mut stack: Vec<Step> = vec![Step::Atom(start)];
    while let Some(step) = stack.pop() {
        match step {
            Step::Atom(node) => {
                write_atom(mol, node, &layout, &mut out);
                for &r in &layout.atom_rings[node.index()] {
                    let rb = &layout.ring_bonds[r];
                    if rb.opener == node {
                        write_bond(mol, rb.edge, &directions, &mut out);
                    }
                    write_ring_digit(layout.digits[r], &mut out);
                }
                let kids = &layout.children[node.index()];
                for (i, &child) in kids.iter().enumerate().rev() {
                    let is_branch = i + 1 < kids.len();
                    if is_branch {
                        stack.push(Step::Text(')'));
                    }
                    stack.push(Step::Atom(child));
                    if let Some(edge) = mol.bond_between(node, child) {
                        stack.push(Step::Bond(edge));
                    }
                    if is_branch {
                        stack.push(Step::Text('('));
                    }
                }
            }
            Step::Bond(edge) => write_bond(mol, edge, &directions, &mut out),
            Step::Text(c) => out.push(c),
        }
    }
    out
}

enum Step {
    Atom(NodeIndex),
    Bond(EdgeIndex),
    Text(char),
}

fn write_bond(
    mol: &Mol<Atom, Bond>,
    edge: EdgeIndex,
    directions: &HashMap<EdgeIndex, char>,
    out: &mut String,
) {
    if let Some(&dir) = directions.get(&edge) {
        out.push(dir);
        return;
    }
    let bond = mol.bond(edge);
    if bond.is_aromatic {
        return;
    }
    match bond.order {
        BondOrder::Single => {
            let both_aromatic = mol
                .bond_endpoints(edge)
                .is_some_and(|(a, b)| mol.atom(a).is_aromatic && mol.atom(b).is_aromatic);
            if both_aromatic {
                out.push('-');
            }
        }
        BondOrder::Double => out.push('='),
        BondOrder::Triple => out.push('#'),
    }
}

fn write_ring_digit(digit: usize, out: &mut String) {
    if digit <= 9 {
        out.push_str(&digit.to_string());
    } else if digit <= 99 {
        out.push_str(&format!("%{digit}"));
    } else {
        out.push_str(&format!("%({digit})"));
    }
}

/// The tetrahedral mark for `node` in its written neighbour order.
fn chirality_mark(
    mol: &Mol<Atom, Bond>,
    node: NodeIndex,
    layout: &Layout,
) -> Option<&'static str> {
    let stereo = mol.tetrahedral_stereo_for(node)?;
    let has_implicit = stereo
        .neighbors
        .iter()
        .any(|n| matches!(n, AtomId::Implicit(_)));
    let written = layout.written_neighbors(node, has_implicit);
    match stereo.is_anticlockwise(&written) {
        Some(true) => Some("@"),
        Some(false) => Some("@@"),
        None => {
            debug!("stereo on atom {} does not match its bonds", node.index());
            None
        }
    }
}

/// Bond-order sum a reader computes for a bare atom: written aromatic bonds
/// count one.
fn reader_bond_order_sum(mol: &Mol<Atom, Bond>, node: NodeIndex) -> u8 {
    mol.bonds_of(node)
        .map(|e| {
            let bond = mol.bond(e);
            if bond.is_aromatic {
                1
            } else {
                bond.order.valence_contribution()
            }
        })
        .fold(0u8, u8::saturating_add)
}

fn can_write_bare(mol: &Mol<Atom, Bond>, node: NodeIndex, elem: Element) -> bool {
    let atom = mol.atom(node);
    if !elem.is_organic_subset() {
        return false;
    }
    if atom.isotope != 0 || atom.formal_charge != 0 || atom.atom_class != 0 {
        return false;
    }
    if atom.is_aromatic && !elem.has_bare_aromatic_symbol() {
        return false;
    }
    let expected_h = implicit_h_count(elem, atom.is_aromatic, reader_bond_order_sum(mol, node));
    atom.hydrogen_count == expected_h
}

fn push_symbol(elem: Element, aromatic: bool, out: &mut String) {
    if aromatic && elem.has_aromatic_symbol() {
        out.push_str(&elem.symbol().to_ascii_lowercase());
    } else {
        out.push_str(elem.symbol());
    }
}

fn write_atom(mol: &Mol<Atom, Bond>, node: NodeIndex, layout: &Layout, out: &mut String) {
    let atom = mol.atom(node);
    let elem = Element::from_atomic_num(atom.atomic_num);
    let chirality = chirality_mark(mol, node, layout);

    let plain = chirality.is_none()
        && atom.isotope == 0
        && atom.formal_charge == 0
        && atom.atom_class == 0;
    match elem {
        Some(e) if chirality.is_none() && can_write_bare(mol, node, e) => {
            push_symbol(e, atom.is_aromatic, out);
            return;
        }
        None if plain && atom.hydrogen_count == 0 => {
            out.push('*');
            return;
        }
        _ => {}
    }

    out.push('[');
    if atom.isotope != 0 {
        out.push_str(&atom.isotope.to_string());
    }
    match elem {
        Some(e) => push_symbol(e, atom.is_aromatic, out),
        None => out.push('*'),
    }
    if let Some(mark) = chirality {
        out.push_str(mark);
    }
    if atom.hydrogen_count > 0 {
        out.push('H');
        if atom.hydrogen_count > 1 {
            out.push_str(&atom.hydrogen_count.to_string());
        }
    }
    if atom.formal_charge > 0 {
        out.push('+');
        if atom.formal_charge > 1 {
            out.push_str(&atom.formal_charge.to_string());
        }
    } else if atom.formal_charge < 0 {
        out.push('-');
        if atom.formal_charge < -1 {
            out.push_str(&atom.formal_charge.unsigned_abs().to_string());
        }
    }
    if atom.atom_class != 0 {
        out.push(':');
        out.push_str(&atom.atom_class.to_string());
    }
    out.push(']');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    fn round_trip(smiles: &str) -> (Mol<Atom, Bond>, Mol<Atom, Bond>, String) {
        let mol1 = parse(smiles).unwrap();
        let written = to_smiles(&mol1);
        let mol2 = parse(&written).unwrap_or_else(|e| {
            panic!("Failed to re-parse '{written}' (from '{smiles}'): {e}");
        });
        (mol1, mol2, written)
    }

    fn assert_same_structure(mol1: &Mol<Atom, Bond>, mol2: &Mol<Atom, Bond>, ctx: &str) {
        assert_eq!(mol1.atom_count(), mol2.atom_count(), "{ctx}: atom count");
        assert_eq!(mol1.bond_count(), mol2.bond_count(), "{ctx}: bond count");

        let mut e1: Vec<(u8, u8)> = mol1
            .atoms()
            .map(|n| (mol1.atom(n).atomic_num, mol1.atom(n).hydrogen_count))
            .collect();
        let mut e2: Vec<(u8, u8)> = mol2
            .atoms()
            .map(|n| (mol2.atom(n).atomic_num, mol2.atom(n).hydrogen_count))
            .collect();
        e1.sort();
        e2.sort();
        assert_eq!(e1, e2, "{ctx}: elements");
    }

    fn canonical(smiles: &str) -> String {
        to_canonical_smiles(&parse(smiles).unwrap())
    }

    fn double_bond_config(mol: &Mol<Atom, Bond>) -> Option<DoubleBondConfig> {
        mol.double_bond_stereo().first().map(|s| s.config)
    }

    #[test]
    fn methane() {
        let (m1, m2, s) = round_trip("C");
        assert_eq!(s, "C");
        assert_same_structure(&m1, &m2, "methane");
    }

    #[test]
    fn follows_input_order() {
        assert_eq!(round_trip("OCC").2, "OCC");
        assert_eq!(round_trip("CC(=O)O").2, "CC(=O)O");
        assert_eq!(round_trip("C#N").2, "C#N");
    }

    #[test]
    fn cyclohexane() {
        let (m1, m2, s) = round_trip("C1CCCCC1");
        assert_eq!(s, "C1CCCCC1");
        assert_same_structure(&m1, &m2, "cyclohexane");
    }

    #[test]
    fn aromatic_atoms_lowercase() {
        assert_eq!(round_trip("C1=CC=CC=C1").2, "c1ccccc1");
        assert_eq!(round_trip("[nH]1cccc1").2, "[nH]1cccc1");
        assert_eq!(round_trip("c1ccncc1").2, "c1ccncc1");
    }

    #[test]
    fn bracket_atoms() {
        assert_eq!(round_trip("[Fe]").2, "[Fe]");
        assert_eq!(round_trip("[NH4+]").2, "[NH4+]");
        assert_eq!(round_trip("[13CH4]").2, "[13CH4]");
        assert_eq!(round_trip("[Fe+2]").2, "[Fe+2]");
        assert_eq!(round_trip("[O-2]").2, "[O-2]");
        assert_eq!(round_trip("[CH3:7]C").2, "[CH3:7]C");
        assert_eq!(round_trip("[CH2]C").2, "[CH2]C");
    }

    #[test]
    fn wildcard_atoms() {
        assert_eq!(round_trip("*").2, "*");
        assert_eq!(round_trip("*CC").2, "*CC");
        assert_eq!(round_trip("[*-]C").2, "[*-]C");
        assert_eq!(round_trip("[*:1]C").2, "[*:1]C");
        assert_eq!(canonical("CC*"), "*CC");
        assert_eq!(canonical("c1ccccc1*"), "*c1ccccc1");
    }

    #[test]
    fn hypervalent_atoms_stay_bare() {
        assert_eq!(round_trip("CS(=O)(=O)C").2, "CS(=O)(=O)C");
        assert_eq!(round_trip("OP(=O)(O)O").2, "OP(=O)(O)O");
    }

    #[test]
    fn single_bond_between_aromatic_rings() {
        let (m1, m2, s) = round_trip("c1ccccc1-c1ccccc1");
        assert_eq!(s, "c1ccccc1-c1ccccc1");
        assert_same_structure(&m1, &m2, "biphenyl");
    }

    #[test]
    fn ring_digits_reused() {
        assert_eq!(round_trip("C1CC1C1CC1").2, "C1CC1C1CC1");
    }

    #[test]
    fn ring_closures_fall_on_single_bonds() {
        assert_eq!(canonical("C=1C=CC1"), "C1=CC=C1");
        assert_eq!(canonical("C1=CC=C1"), "C1=CC=C1");
        assert_eq!(canonical("C=1C=CC=CC=CC1"), "C1=CC=CC=CC=C1");
        assert_eq!(round_trip("C1CC=C1").2, "C1CC=C1");
        let (_, _, s) = round_trip("C1=CCC1");
        assert_eq!(s, "C1=CCC1");
    }

    #[test]
    fn ring_digit_formatting() {
        let mut out = String::new();
        write_ring_digit(3, &mut out);
        write_ring_digit(12, &mut out);
        write_ring_digit(123, &mut out);
        assert_eq!(out, "3%12%(123)");
    }

    #[test]
    fn fragments_joined_with_dots() {
        let (m1, m2, s) = round_trip("[Na+].[Cl-].O");
        assert_eq!(s, "[Na+].[Cl-].O");
        assert_same_structure(&m1, &m2, "three fragments");
    }

    #[test]
    fn empty_mol() {
        let mol = Mol::<Atom, Bond>::new();
        assert_eq!(to_smiles(&mol), "");
        assert_eq!(to_canonical_smiles(&mol), "");
    }

    #[test]
    fn tetrahedral_marks_follow_written_order() {
        assert_eq!(round_trip("F[C@H](Cl)Br").2, "F[C@H](Cl)Br");
        assert_eq!(round_trip("[C@@H](F)(Cl)Br").2, "[C@@H](F)(Cl)Br");
        assert_eq!(round_trip("[C@](F)(Cl)(Br)I").2, "[C@](F)(Cl)(Br)I");
        assert_eq!(round_trip("C[S@](=O)CC").2, "C[S@](=O)CC");
    }

    #[test]
    fn tetrahedral_mark_with_ring_bond() {
        let (_, m2, s) = round_trip("C[C@@H]1CCCO1");
        assert_eq!(s, "C[C@@H]1CCCO1");
        assert_eq!(m2.tetrahedral_stereo().len(), 1);
    }

    #[test]
    fn double_bond_directions() {
        assert_eq!(round_trip("F/C=C/F").2, "F/C=C/F");
        assert_eq!(round_trip(r"F/C=C\F").2, r"F/C=C\F");
        assert_eq!(round_trip(r"F\C=C\F").2, "F/C=C/F");
        assert_eq!(round_trip(r"C(\F)=C/F").2, r"C(/F)=C\F");
    }

    #[test]
    fn conjugated_double_bonds_share_a_direction() {
        let (m1, m2, s) = round_trip(r"C/C=C/C=C/C");
        assert_eq!(s, "C/C=C/C=C/C");
        assert_eq!(m1.double_bond_stereo().len(), 2);
        assert_eq!(m2.double_bond_stereo(), m1.double_bond_stereo());
    }

    #[test]
    fn combined_tetrahedral_and_double_bond() {
        let (m1, m2, s) = round_trip(r"F/C=C/[C@@H](Cl)Br");
        assert_same_structure(&m1, &m2, "combined_stereo");
        assert!(s.contains('@'));
        assert_eq!(double_bond_config(&m2), Some(DoubleBondConfig::Trans));
        assert_eq!(canonical(&s), canonical(r"F/C=C/[C@@H](Cl)Br"));
    }

    #[test]
    fn non_isomeric_output() {
        let flat = SmilesWriteOptions {
            canonical: true,
            isomeric: false,
        };
        let write = |s: &str| write_smiles(&parse(s).unwrap(), &flat);
        assert_eq!(write("F/C=C/F"), "FC=CF");
        assert_eq!(write("[13CH4]"), "C");
        assert_eq!(write("F[C@H](Cl)Br"), "FC(Cl)Br");
    }

    // -- Canonical output --

    #[test]
    fn canonical_golden() {
        assert_eq!(canonical("CCO"), "CCO");
        assert_eq!(canonical("OCC"), "CCO");
        assert_eq!(canonical("C1=CC=CC=C1"), "c1ccccc1");
        assert_eq!(canonical("OC(=O)C"), "CC(=O)O");
        assert_eq!(canonical("c1ccccc1O"), "Oc1ccccc1");
        assert_eq!(canonical("c1ccc(C)cc1"), "Cc1ccccc1");
        assert_eq!(canonical("n1ccccc1"), "c1ccncc1");
        assert_eq!(canonical("O=[N+]([O-])C"), "C[N+]([O-])=O");
    }

    #[test]
    fn canonical_orderings_agree() {
        let groups: &[&[&str]] = &[
            &["CCCO", "OCCC", "C(CC)O"],
            &["C(=O)(O)CC", "CCC(O)=O"],
            &["c1ccc2ccccc2c1", "c1cccc2ccccc12", "C1=CC=C2C=CC=CC2=C1"],
            &["[Na+].[Cl-]", "[Cl-].[Na+]"],
            &["N[C@@H](C)C(=O)O", "C[C@H](N)C(=O)O", "OC(=O)[C@@H](N)C"],
            &["C[C@@H]1CCCO1", "O1CCC[C@H]1C"],
            &["F[C@H](Cl)Br", "Br[C@@H](Cl)F"],
            &["F/C=C/F", r"F\C=C\F", r"C(\F)=C/F"],
        ];
        for group in groups {
            let first = canonical(group[0]);
            for smi in &group[1..] {
                assert_eq!(canonical(smi), first, "{smi} vs {}", group[0]);
            }
        }
    }

    #[test]
    fn canonical_distinguishes_stereoisomers() {
        assert_ne!(canonical("C[C@H](N)C(=O)O"), canonical("C[C@@H](N)C(=O)O"));
        assert_ne!(canonical("F/C=C/F"), canonical(r"F/C=C\F"));
        assert_ne!(
            canonical("C[C@H]1CC[C@@H](C)CC1"),
            canonical("C[C@H]1CC[C@H](C)CC1")
        );
    }

    #[test]
    fn canonical_distinguishes_molecules() {
        assert_ne!(canonical("CCO"), canonical("CO"));
        assert_ne!(canonical("c1ccccc1"), canonical("C1CCCCC1"));
        assert_ne!(canonical("C"), canonical("CC"));
    }

    #[test]
    fn canonical_idempotent() {
        let cases = [
            "CCO",
            "c1ccccc1",
            "CC(=O)O",
            "[Na+].[Cl-]",
            "c1ccncc1",
            "Cn1cnc2c1c(=O)n(c(=O)n2C)C",
            "C1CC2(C1)CCC2",
            "c1ccc2c(c1)[nH]c1ccccc12",
            r"C/C=C/C=C\C",
            "C[C@H]1CC[C@@H](C)CC1",
            "N[C@@H](Cc1ccccc1)C(=O)O",
        ];
        for smiles in &cases {
            let first = canonical(smiles);
            let second = canonical(&first);
            assert_eq!(first, second, "canonical not idempotent for {smiles}");
        }
    }

    #[test]
    fn canonical_keeps_structure() {
        for smiles in ["C#C", "c1ccc2ccccc2c1", "[Fe]", "[13C]", "C[N+](C)(C)C"] {
            let m1 = parse(smiles).unwrap();
            let m2 = parse(&to_canonical_smiles(&m1)).unwrap();
            assert_same_structure(&m1, &m2, smiles);
        }
    }

    #[test]
    fn canonical_keeps_double_bond_geometry() {
        for smiles in ["F/C=C/F", r"F/C=C\F", r"CC/C(C)=C(\C)O", r"C/C=C/C=C\C"] {
            let original = parse(smiles).unwrap();
            let s = canonical(smiles);
            let reparsed = parse(&s).unwrap();
            assert_eq!(
                reparsed.double_bond_stereo().len(),
                original.double_bond_stereo().len(),
                "{smiles} -> {s}"
            );
            assert_eq!(canonical(&s), s, "{smiles}");
        }
    }
}
