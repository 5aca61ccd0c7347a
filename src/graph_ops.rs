use petgraph::graph::NodeIndex;

use crate::mol::{AtomId, DoubleBondStereo, Mol};

/// Atoms of each connected component, sorted, in order of their lowest atom.
pub fn connected_components<A, B>(mol: &Mol<A, B>) -> Vec<Vec<NodeIndex>> {
    let n = mol.atom_count();
    let mut visited = vec![false; n];
    let mut components = Vec::new();
    for node in mol.atoms() {
        if visited[node.index()] {
            continue;
        }
        let mut component = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if visited[current.index()] {
                continue;
            }
            visited[current.index()] = true;
            component.push(current);
            for neighbor in mol.neighbors(current) {
                if !visited[neighbor.index()] {
                    stack.push(neighbor);
                }
            }
        }
        component.sort();
        components.push(component);
    }
    components
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenumberError {
    LengthMismatch { expected: usize, got: usize },
    InvalidPermutation,
}

impl std::fmt::Display for RenumberError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LengthMismatch { expected, got } => {
                write!(f, "new_order length {got} != atom count {expected}")
            }
            Self::InvalidPermutation => write!(f, "new_order is not a valid permutation"),
        }
    }
}

impl std::error::Error for RenumberError {}

fn validate_permutation(new_order: &[usize], n: usize) -> Result<(), RenumberError> {
    if new_order.len() != n {
        return Err(RenumberError::LengthMismatch {
            expected: n,
            got: new_order.len(),
        });
    }
    let mut seen = vec![false; n];
    for &idx in new_order {
        if idx >= n || seen[idx] {
            return Err(RenumberError::InvalidPermutation);
        }
        seen[idx] = true;
    }
    Ok(())
}

/// Rebuilds `mol` with atom `new_order[i]` placed at index `i`. Bonds and
/// stereo records follow their atoms.
pub fn renumber_atoms<A: Clone, B: Clone>(
    mol: &Mol<A, B>,
    new_order: &[usize],
) -> Result<Mol<A, B>, RenumberError> {
    let n = mol.atom_count();
    validate_permutation(new_order, n)?;

    let mut new_mol = Mol::new();
    for &old_idx in new_order {
        new_mol.add_atom(mol.atom(NodeIndex::new(old_idx)).clone());
    }

    let mut old_to_new = vec![NodeIndex::new(0); n];
    for (new_idx, &old_idx) in new_order.iter().enumerate() {
        old_to_new[old_idx] = NodeIndex::new(new_idx);
    }
    let remap = |idx: NodeIndex| old_to_new[idx.index()];

    for edge in mol.bonds() {
        if let Some((a, b)) = mol.bond_endpoints(edge) {
            new_mol.add_bond(remap(a), remap(b), mol.bond(edge).clone());
        }
    }

    let tetrahedral = mol
        .tetrahedral_stereo()
        .iter()
        .map(|s| {
            s.map(|aid| match aid {
                AtomId::Node(idx) => AtomId::Node(remap(idx)),
                AtomId::Implicit(idx) => AtomId::Implicit(remap(idx)),
            })
        })
        .collect();
    new_mol.set_tetrahedral_stereo(tetrahedral);

    let double_bonds = mol
        .double_bond_stereo()
        .iter()
        .map(|s| {
            DoubleBondStereo::new(
                remap(s.bond.0),
                remap(s.bond.1),
                remap(s.refs[0]),
                remap(s.refs[1]),
                s.config,
            )
        })
        .collect();
    new_mol.set_double_bond_stereo(double_bonds);

    Ok(new_mol)
}
