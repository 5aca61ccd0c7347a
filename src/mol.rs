use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

/// A stereo neighbour: either a real graph node or the implicit hydrogen /
/// lone pair sitting on a center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtomId {
    Node(NodeIndex),
    Implicit(NodeIndex),
}

/// Tetrahedral configuration around `center`.
///
/// Looking from `neighbors[0]` toward the center, `neighbors[1..]` run
/// anticlockwise (the SMILES `@` order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TetrahedralStereo {
    pub center: NodeIndex,
    pub neighbors: [AtomId; 4],
}

impl TetrahedralStereo {
    /// Returns `Some(true)` if `order` describes the same configuration read
    /// as `@`, `Some(false)` if it reads as `@@`, and `None` if `order` is not
    /// a permutation of the stored neighbours.
    pub fn is_anticlockwise(&self, order: &[AtomId]) -> Option<bool> {
        permutation_parity(&self.neighbors, order)
    }

    pub fn map(&self, mut f: impl FnMut(AtomId) -> AtomId) -> Self {
        Self {
            center: match f(AtomId::Node(self.center)) {
                AtomId::Node(idx) | AtomId::Implicit(idx) => idx,
            },
            neighbors: self.neighbors.map(f),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DoubleBondConfig {
    /// `refs` are on the same side.
    Cis,
    /// `refs` are on opposite sides.
    Trans,
}

impl DoubleBondConfig {
    pub fn flip(self) -> Self {
        match self {
            Self::Cis => Self::Trans,
            Self::Trans => Self::Cis,
        }
    }
}

/// Geometry of the double bond `bond`, stored with `bond.0 < bond.1`.
/// `refs[0]` is a substituent of `bond.0`, `refs[1]` one of `bond.1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DoubleBondStereo {
    pub bond: (NodeIndex, NodeIndex),
    pub refs: [NodeIndex; 2],
    pub config: DoubleBondConfig,
}

impl DoubleBondStereo {
    /// Builds a record for the double bond `a=b` with reference `ref_a` on
    /// `a` and `ref_b` on `b`, normalizing the endpoint order.
    pub fn new(
        a: NodeIndex,
        b: NodeIndex,
        ref_a: NodeIndex,
        ref_b: NodeIndex,
        config: DoubleBondConfig,
    ) -> Self {
        if a.index() < b.index() {
            Self {
                bond: (a, b),
                refs: [ref_a, ref_b],
                config,
            }
        } else {
            Self {
                bond: (b, a),
                refs: [ref_b, ref_a],
                config,
            }
        }
    }

    /// The reference substituent on endpoint `end`, if `end` is an endpoint.
    pub fn ref_of(&self, end: NodeIndex) -> Option<NodeIndex> {
        if end == self.bond.0 {
            Some(self.refs[0])
        } else if end == self.bond.1 {
            Some(self.refs[1])
        } else {
            None
        }
    }
}

pub struct Mol<A, B> {
    graph: UnGraph<A, B>,
    tetrahedral_stereo: Vec<TetrahedralStereo>,
    double_bond_stereo: Vec<DoubleBondStereo>,
}

impl<A, B> Mol<A, B> {
    pub fn new() -> Self {
        Self {
            graph: UnGraph::default(),
            tetrahedral_stereo: Vec::new(),
            double_bond_stereo: Vec::new(),
        }
    }

    pub fn graph(&self) -> &UnGraph<A, B> {
        &self.graph
    }

    pub fn atom(&self, idx: NodeIndex) -> &A {
        &self.graph[idx]
    }

    pub fn atom_mut(&mut self, idx: NodeIndex) -> &mut A {
        &mut self.graph[idx]
    }

    pub fn bond(&self, idx: EdgeIndex) -> &B {
        &self.graph[idx]
    }

    pub fn bond_mut(&mut self, idx: EdgeIndex) -> &mut B {
        &mut self.graph[idx]
    }

    pub fn add_atom(&mut self, atom: A) -> NodeIndex {
        self.graph.add_node(atom)
    }

    pub fn add_bond(&mut self, a: NodeIndex, b: NodeIndex, bond: B) -> EdgeIndex {
        self.graph.add_edge(a, b, bond)
    }

    pub fn atom_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn bond_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn degree(&self, idx: NodeIndex) -> usize {
        self.graph.edges(idx).count()
    }

    pub fn neighbors(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors(idx)
    }

    pub fn bonds_of(&self, idx: NodeIndex) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edges(idx).map(|e| e.id())
    }

    /// Incident bonds of `idx` paired with the atom on the far side.
    pub fn neighbor_bonds(
        &self,
        idx: NodeIndex,
    ) -> impl Iterator<Item = (NodeIndex, EdgeIndex)> + '_ {
        self.graph.edges(idx).map(move |e| {
            let other = if e.source() == idx { e.target() } else { e.source() };
            (other, e.id())
        })
    }

    pub fn atoms(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    pub fn bonds(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edge_indices()
    }

    pub fn bond_between(&self, a: NodeIndex, b: NodeIndex) -> Option<EdgeIndex> {
        self.graph.find_edge(a, b)
    }

    pub fn bond_endpoints(&self, idx: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.graph.edge_endpoints(idx)
    }

    pub fn tetrahedral_stereo(&self) -> &[TetrahedralStereo] {
        &self.tetrahedral_stereo
    }

    pub fn set_tetrahedral_stereo(&mut self, stereo: Vec<TetrahedralStereo>) {
        self.tetrahedral_stereo = stereo;
    }

    pub fn tetrahedral_stereo_for(&self, center: NodeIndex) -> Option<&TetrahedralStereo> {
        self.tetrahedral_stereo.iter().find(|s| s.center == center)
    }

    pub fn add_tetrahedral_stereo(&mut self, stereo: TetrahedralStereo) {
        self.remove_tetrahedral_stereo(stereo.center);
        self.tetrahedral_stereo.push(stereo);
    }

    pub fn remove_tetrahedral_stereo(&mut self, center: NodeIndex) {
        self.tetrahedral_stereo.retain(|s| s.center != center);
    }

    pub fn double_bond_stereo(&self) -> &[DoubleBondStereo] {
        &self.double_bond_stereo
    }

    pub fn set_double_bond_stereo(&mut self, stereo: Vec<DoubleBondStereo>) {
        self.double_bond_stereo = stereo;
    }

    pub fn double_bond_stereo_for(&self, a: NodeIndex, b: NodeIndex) -> Option<&DoubleBondStereo> {
        let key = ordered(a, b);
        self.double_bond_stereo.iter().find(|s| s.bond == key)
    }

    pub fn add_double_bond_stereo(&mut self, stereo: DoubleBondStereo) {
        self.remove_double_bond_stereo(stereo.bond.0, stereo.bond.1);
        self.double_bond_stereo.push(stereo);
    }

    pub fn remove_double_bond_stereo(&mut self, a: NodeIndex, b: NodeIndex) {
        let key = ordered(a, b);
        self.double_bond_stereo.retain(|s| s.bond != key);
    }
}

fn ordered(a: NodeIndex, b: NodeIndex) -> (NodeIndex, NodeIndex) {
    if a.index() < b.index() {
        (a, b)
    } else {
        (b, a)
    }
}

impl<A: Clone, B: Clone> Clone for Mol<A, B> {
    fn clone(&self) -> Self {
        Self {
            graph: self.graph.clone(),
            tetrahedral_stereo: self.tetrahedral_stereo.clone(),
            double_bond_stereo: self.double_bond_stereo.clone(),
        }
    }
}

impl<A, B> Default for Mol<A, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: PartialEq, B: PartialEq> PartialEq for Mol<A, B> {
    fn eq(&self, other: &Self) -> bool {
        if self.atom_count() != other.atom_count() || self.bond_count() != other.bond_count() {
            return false;
        }
        if self.atoms().any(|idx| self.atom(idx) != other.atom(idx)) {
            return false;
        }
        for idx in self.bonds() {
            if self.bond(idx) != other.bond(idx)
                || self.bond_endpoints(idx) != other.bond_endpoints(idx)
            {
                return false;
            }
        }
        self.tetrahedral_stereo == other.tetrahedral_stereo
            && self.double_bond_stereo == other.double_bond_stereo
    }
}

impl<A: std::fmt::Debug, B: std::fmt::Debug> std::fmt::Debug for Mol<A, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mol")
            .field("atom_count", &self.atom_count())
            .field("bond_count", &self.bond_count())
            .field("tetrahedral_stereo", &self.tetrahedral_stereo)
            .field("double_bond_stereo", &self.double_bond_stereo)
            .finish()
    }
}

/// Parity of the permutation taking `from` to `to`.
///
/// `Some(true)` for even, `Some(false)` for odd, `None` when `to` is not a
/// rearrangement of `from`.
pub(crate) fn permutation_parity<T: Eq>(from: &[T], to: &[T]) -> Option<bool> {
    let n = from.len();
    if n != to.len() {
        return None;
    }
    let mut perm = Vec::with_capacity(n);
    for f in from {
        perm.push(to.iter().position(|t| t == f)?);
    }
    let mut visited = vec![false; n];
    let mut swaps = 0usize;
    for i in 0..n {
        if visited[i] {
            continue;
        }
        if visited[perm[i]] && perm[i] != i {
            // Two entries of `from` mapped onto the same slot.
            return None;
        }
        let mut j = i;
        let mut cycle_len = 0;
        while !visited[j] {
            visited[j] = true;
            j = perm[j];
            cycle_len += 1;
        }
        if j != i {
            return None;
        }
        swaps += cycle_len - 1;
    }
    Some(swaps % 2 == 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parity_identity_is_even() {
        assert_eq!(permutation_parity(&[1, 2, 3, 4], &[1, 2, 3, 4]), Some(true));
    }

    #[test]
    fn parity_single_swap_is_odd() {
        assert_eq!(permutation_parity(&[1, 2, 3, 4], &[1, 2, 4, 3]), Some(false));
    }

    #[test]
    fn parity_rotation_of_three_is_even() {
        assert_eq!(permutation_parity(&[1, 2, 3, 4], &[1, 3, 4, 2]), Some(true));
    }

    #[test]
    fn parity_rejects_non_permutation() {
        assert_eq!(permutation_parity(&[1, 2, 3, 4], &[1, 2, 3, 5]), None);
        assert_eq!(permutation_parity(&[1, 2, 3], &[1, 2, 3, 4]), None);
        assert_eq!(permutation_parity(&[1, 1, 2], &[1, 2, 2]), None);
    }

    #[test]
    fn double_bond_stereo_normalizes_endpoints() {
        let s = DoubleBondStereo::new(
            NodeIndex::new(3),
            NodeIndex::new(1),
            NodeIndex::new(4),
            NodeIndex::new(0),
            DoubleBondConfig::Trans,
        );
        assert_eq!(s.bond, (NodeIndex::new(1), NodeIndex::new(3)));
        assert_eq!(s.refs, [NodeIndex::new(0), NodeIndex::new(4)]);
        assert_eq!(s.ref_of(NodeIndex::new(3)), Some(NodeIndex::new(4)));
        assert_eq!(s.ref_of(NodeIndex::new(2)), None);
    }
}
