//! Kekulization assigns alternating single and double bonds to aromatic ring systems.
//!
//! The input is a `Mol<Atom, SmilesBond>` whose aromatic bonds come from
//! SMILES lowercase atoms (e.g., `c1ccccc1`). The output is a
//! `Mol<Atom, Bond>` with concrete single/double bonds forming a valid
//! Kekulé structure: a perfect matching over the atoms that still need a
//! double bond.
//!
//! Atoms with a single remaining partner are matched first; the rest is
//! resolved by depth-first search. If no valid assignment exists (e.g., an
//! odd-membered ring with the wrong electron count), [`kekulize`] returns a
//! [`KekulizeError`].

use std::collections::HashSet;
use std::fmt;

use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder, SmilesBond, SmilesBondOrder};
use crate::element::Element;
use crate::mol::Mol;

/// Search steps allowed before giving up on a ring system.
const SEARCH_BUDGET: usize = 1_000_000;

/// Error returned when no valid Kekulé structure exists.
///
/// Contains the list of atom indices that could not be matched into
/// alternating single/double bonds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KekulizeError {
    /// The given atoms could not be assigned a double bond.
    Unkekulizable(Vec<NodeIndex>),
}

impl fmt::Display for KekulizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unkekulizable(atoms) => {
                write!(f, "cannot kekulize aromatic system: unmatched atoms [")?;
                for (i, idx) in atoms.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", idx.index())?;
                }
                write!(f, "]")
            }
        }
    }
}

impl std::error::Error for KekulizeError {}

/// Convert a molecule with aromatic bonds into one with explicit Kekulé bonds.
///
/// Aromatic bonds (`SmilesBondOrder::Aromatic`) are replaced with
/// `BondOrder::Single` or `BondOrder::Double` such that every atom that
/// needs a double bond receives exactly one. Other bonds and
/// stereochemistry are carried over unchanged. Aromatic flags are cleared;
/// perception sets them again later.
pub fn kekulize(mol: Mol<Atom, SmilesBond>) -> Result<Mol<Atom, Bond>, KekulizeError> {
    let n = mol.atom_count();

    let mut aromatic_adj: Vec<Vec<(NodeIndex, EdgeIndex)>> = vec![vec![]; n];
    for e in mol.bonds() {
        if mol.bond(e).order != SmilesBondOrder::Aromatic {
            continue;
        }
        if let Some((a, b)) = mol.bond_endpoints(e) {
            aromatic_adj[a.index()].push((b, e));
            aromatic_adj[b.index()].push((a, e));
        }
    }

    let needs_double: Vec<bool> = mol
        .atoms()
        .map(|node| !aromatic_adj[node.index()].is_empty() && needs_double_bond(&mol, node))
        .collect();

    let mut matched_edge: Vec<Option<EdgeIndex>> = vec![None; n];
    for system in aromatic_systems(&aromatic_adj) {
        let mut budget = SEARCH_BUDGET;
        if !solve(&system, &aromatic_adj, &needs_double, &mut matched_edge, &mut budget) {
            let unmatched: Vec<NodeIndex> = system
                .into_iter()
                .filter(|v| needs_double[v.index()] && matched_edge[v.index()].is_none())
                .collect();
            return Err(KekulizeError::Unkekulizable(unmatched));
        }
    }

    let matched_edges: HashSet<EdgeIndex> = matched_edge.iter().filter_map(|e| *e).collect();

    let mut result = Mol::new();
    for node in mol.atoms() {
        result.add_atom(Atom {
            is_aromatic: false,
            ..mol.atom(node).clone()
        });
    }
    for edge in mol.bonds() {
        let Some((a, b)) = mol.bond_endpoints(edge) else {
            continue;
        };
        let order = match mol.bond(edge).order {
            SmilesBondOrder::Aromatic if matched_edges.contains(&edge) => BondOrder::Double,
            SmilesBondOrder::Aromatic | SmilesBondOrder::Implicit | SmilesBondOrder::Single => {
                BondOrder::Single
            }
            SmilesBondOrder::Double => BondOrder::Double,
            SmilesBondOrder::Triple => BondOrder::Triple,
        };
        result.add_bond(a, b, Bond {
            order,
            is_aromatic: false,
        });
    }

    result.set_tetrahedral_stereo(mol.tetrahedral_stereo().to_vec());
    result.set_double_bond_stereo(mol.double_bond_stereo().to_vec());

    Ok(result)
}

/// Whether `node` is one valence unit short once its aromatic bonds count
/// as single.
fn needs_double_bond(mol: &Mol<Atom, SmilesBond>, node: NodeIndex) -> bool {
    let atom = mol.atom(node);
    let Some(elem) = Element::from_atomic_num(atom.atomic_num) else {
        return false;
    };

    let bond_order_sum: u8 = mol
        .bonds_of(node)
        .map(|e| mol.bond(e).order.valence_contribution())
        .fold(0u8, u8::saturating_add);
    let total_used = bond_order_sum.saturating_add(atom.hydrogen_count);

    let Some(target) = elem
        .valences_with_charge(atom.formal_charge)
        .iter()
        .copied()
        .find(|&v| v >= total_used)
    else {
        return false;
    };
    let gap = target - total_used;
    // [n+] with no hydrogen and no substituent still donates one pi bond.
    let is_bare_charged = gap == 2 && atom.hydrogen_count == 0 && atom.formal_charge != 0;
    gap == 1 || is_bare_charged
}

/// Atoms joined by aromatic bonds, one list per connected system.
fn aromatic_systems(aromatic_adj: &[Vec<(NodeIndex, EdgeIndex)>]) -> Vec<Vec<NodeIndex>> {
    let mut seen = vec![false; aromatic_adj.len()];
    let mut systems = Vec::new();
    for start in 0..aromatic_adj.len() {
        if seen[start] || aromatic_adj[start].is_empty() {
            continue;
        }
        seen[start] = true;
        let mut system = Vec::new();
        let mut stack = vec![NodeIndex::new(start)];
        while let Some(u) = stack.pop() {
            system.push(u);
            for &(v, _) in &aromatic_adj[u.index()] {
                if !seen[v.index()] {
                    seen[v.index()] = true;
                    stack.push(v);
                }
            }
        }
        system.sort();
        systems.push(system);
    }
    systems
}

/// One choice point of the search: atom `u` and the partners left to try.
struct Branch {
    u: NodeIndex,
    partners: Vec<(NodeIndex, EdgeIndex)>,
    next: usize,
}

enum Pick {
    Done,
    DeadEnd,
    Branch(Branch),
}

/// Matches every atom of `system` flagged in `needs_double` to exactly one
/// aromatic neighbour that is also flagged.
///
/// Depth-first with an explicit stack. Leaves `matched_edge` untouched for
/// the system on failure.
fn solve(
    system: &[NodeIndex],
    aromatic_adj: &[Vec<(NodeIndex, EdgeIndex)>],
    needs_double: &[bool],
    matched_edge: &mut [Option<EdgeIndex>],
    budget: &mut usize,
) -> bool {
    let mut stack: Vec<Branch> = Vec::new();
    loop {
        if *budget == 0 {
            for frame in &stack {
                if let Some(&(v, _)) = frame.next.checked_sub(1).and_then(|i| frame.partners.get(i)) {
                    matched_edge[frame.u.index()] = None;
                    matched_edge[v.index()] = None;
                }
            }
            return false;
        }
        *budget -= 1;

        match pick(system, aromatic_adj, needs_double, matched_edge) {
            Pick::Done => return true,
            Pick::Branch(branch) => stack.push(branch),
            Pick::DeadEnd => {}
        }

        // Advance the innermost choice point, backtracking past exhausted ones.
        loop {
            let Some(frame) = stack.last_mut() else {
                return false;
            };
            if let Some(&(v, _)) = frame.next.checked_sub(1).and_then(|i| frame.partners.get(i)) {
                matched_edge[frame.u.index()] = None;
                matched_edge[v.index()] = None;
            }
            if let Some(&(v, e)) = frame.partners.get(frame.next) {
                frame.next += 1;
                matched_edge[frame.u.index()] = Some(e);
                matched_edge[v.index()] = Some(e);
                break;
            }
            stack.pop();
        }
    }
}

/// The open atom with the fewest open partners. A forced choice never
/// needs undoing, so it goes first.
fn pick(
    system: &[NodeIndex],
    aromatic_adj: &[Vec<(NodeIndex, EdgeIndex)>],
    needs_double: &[bool],
    matched_edge: &[Option<EdgeIndex>],
) -> Pick {
    let open = |v: NodeIndex| needs_double[v.index()] && matched_edge[v.index()].is_none();

    let mut best: Option<(NodeIndex, usize)> = None;
    for &u in system {
        if !open(u) {
            continue;
        }
        let options = aromatic_adj[u.index()].iter().filter(|(v, _)| open(*v)).count();
        if options == 0 {
            return Pick::DeadEnd;
        }
        if best.map_or(true, |(_, c)| options < c) {
            best = Some((u, options));
        }
    }

    match best {
        None => Pick::Done,
        Some((u, _)) => Pick::Branch(Branch {
            u,
            partners: aromatic_adj[u.index()]
                .iter()
                .copied()
                .filter(|(v, _)| open(*v))
                .collect(),
            next: 0,
        }),
    }
}
