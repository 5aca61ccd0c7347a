use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::mol::Mol;

/// A set of rings, each stored as its atoms in walking order starting at
/// the lowest atom index.
#[derive(Debug, Clone)]
pub struct RingInfo {
    rings: Vec<Vec<NodeIndex>>,
    by_atom: HashMap<NodeIndex, Vec<usize>>,
}

impl RingInfo {
    fn from_rings(mut rings: Vec<Vec<NodeIndex>>) -> Self {
        sort_rings(&mut rings);
        rings.dedup();
        let mut by_atom: HashMap<NodeIndex, Vec<usize>> = HashMap::new();
        for (i, ring) in rings.iter().enumerate() {
            for &atom in ring {
                by_atom.entry(atom).or_default().push(i);
            }
        }
        Self { rings, by_atom }
    }

    /// Smallest set of smallest rings: as many rings as the cyclomatic
    /// number, chosen smallest first among independent cycles.
    pub fn sssr<A, B>(mol: &Mol<A, B>) -> Self {
        let rings = ring_systems(mol)
            .iter()
            .flat_map(|system| {
                let (_, basis) = system.smallest_basis();
                basis.into_iter().map(|c| normalize_ring(&c.atoms))
            })
            .collect();
        Self::from_rings(rings)
    }

    /// The SSSR plus every other short cycle the search finds, so that
    /// symmetry-equivalent rings are all present (all six cubane faces, the
    /// naphthalene perimeter).
    pub fn symmetrized_sssr<A, B>(mol: &Mol<A, B>) -> Self {
        let mut rings = Vec::new();
        for system in ring_systems(mol) {
            let (candidates, basis) = system.smallest_basis();
            let mut kept: Vec<&Cycle> = basis.iter().collect();
            for cycle in &candidates {
                if !kept.iter().any(|k| k.edges == cycle.edges) {
                    kept.push(cycle);
                }
            }
            rings.extend(kept.iter().map(|c| normalize_ring(&c.atoms)));
        }
        Self::from_rings(rings)
    }

    pub fn num_rings(&self) -> usize {
        self.rings.len()
    }

    pub fn rings(&self) -> &[Vec<NodeIndex>] {
        &self.rings
    }

    pub fn is_ring_atom(&self, atom: NodeIndex) -> bool {
        self.by_atom.contains_key(&atom)
    }

    pub fn is_ring_bond(&self, a: NodeIndex, b: NodeIndex) -> bool {
        self.rings_with_bond(a, b).next().is_some()
    }

    /// Size of the smallest ring in this set that contains the bond `a-b`.
    pub fn smallest_bond_ring_size(&self, a: NodeIndex, b: NodeIndex) -> Option<usize> {
        self.rings_with_bond(a, b).map(Vec::len).min()
    }

    pub fn atom_rings(&self, atom: NodeIndex) -> Vec<&Vec<NodeIndex>> {
        self.by_atom
            .get(&atom)
            .map(|ids| ids.iter().map(|&i| &self.rings[i]).collect())
            .unwrap_or_default()
    }

    fn rings_with_bond(&self, a: NodeIndex, b: NodeIndex) -> impl Iterator<Item = &Vec<NodeIndex>> {
        self.by_atom
            .get(&a)
            .into_iter()
            .flatten()
            .map(|&i| &self.rings[i])
            .filter(move |ring| ring_has_bond(ring, a, b))
    }

    /// Bonds minus atoms plus components: the number of independent rings.
    pub fn cyclomatic_number<A, B>(mol: &Mol<A, B>) -> usize {
        let components = petgraph::algo::connected_components(mol.graph());
        (mol.bond_count() + components).saturating_sub(mol.atom_count())
    }
}

fn ring_has_bond(ring: &[NodeIndex], a: NodeIndex, b: NodeIndex) -> bool {
    let len = ring.len();
    (0..len).any(|i| {
        let (x, y) = (ring[i], ring[(i + 1) % len]);
        (x == a && y == b) || (x == b && y == a)
    })
}

fn sort_rings(rings: &mut [Vec<NodeIndex>]) {
    rings.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
}

/// Rotates `ring` to start at its lowest atom and walks toward the lower of
/// that atom's two ring neighbours.
fn normalize_ring(ring: &[NodeIndex]) -> Vec<NodeIndex> {
    let len = ring.len();
    let Some(start) = (0..len).min_by_key(|&i| ring[i]) else {
        return Vec::new();
    };
    let mut out: Vec<NodeIndex> = (0..len).map(|i| ring[(start + i) % len]).collect();
    if len > 2 && out[1] > out[len - 1] {
        out[1..].reverse();
    }
    out
}

/// Bit set over edge indices: the edge vector of a cycle over GF(2).
#[derive(Debug, Clone, PartialEq, Eq)]
struct EdgeSet(Vec<u64>);

impl EdgeSet {
    fn of_ring(system: &RingSystem, ring: &[usize]) -> Self {
        let mut words = vec![0u64; system.edge_count.div_ceil(64)];
        let len = ring.len();
        for i in 0..len {
            if let Some(edge) = system.edge_between(ring[i], ring[(i + 1) % len]) {
                words[edge / 64] |= 1u64 << (edge % 64);
            }
        }
        Self(words)
    }

    fn is_empty(&self) -> bool {
        self.0.iter().all(|&w| w == 0)
    }

    fn contains(&self, bit: usize) -> bool {
        self.0[bit / 64] & (1u64 << (bit % 64)) != 0
    }

    fn lowest(&self) -> Option<usize> {
        self.0
            .iter()
            .enumerate()
            .find(|(_, &w)| w != 0)
            .map(|(i, w)| i * 64 + w.trailing_zeros() as usize)
    }

    fn xor(&mut self, other: &EdgeSet) {
        for (a, b) in self.0.iter_mut().zip(&other.0) {
            *a ^= *b;
        }
    }
}

/// Rows of a GF(2) elimination, used to test cycles for independence.
#[derive(Default)]
struct CycleBasis {
    rows: Vec<(usize, EdgeSet)>,
}

impl CycleBasis {
    /// Adds `edges` if it is independent of the rows so far.
    fn insert(&mut self, edges: &EdgeSet) -> bool {
        let mut v = edges.clone();
        for (pivot, row) in &self.rows {
            if v.contains(*pivot) {
                v.xor(row);
            }
        }
        match v.lowest() {
            Some(pivot) => {
                self.rows.push((pivot, v));
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone)]
struct Cycle {
    atoms: Vec<NodeIndex>,
    edges: EdgeSet,
}

/// A connected piece of the molecule once bridges are cut: every ring lies
/// inside exactly one. Atoms and bonds are renumbered locally.
struct RingSystem {
    atoms: Vec<NodeIndex>,
    adjacency: Vec<Vec<(usize, usize)>>,
    edge_count: usize,
}

/// Ring systems of `mol`, skipping atoms that are in no ring.
fn ring_systems<A, B>(mol: &Mol<A, B>) -> Vec<RingSystem> {
    if RingInfo::cyclomatic_number(mol) == 0 {
        return Vec::new();
    }
    let cut = bridges(mol);
    let ring_edge = |e: EdgeIndex| !cut.contains(&e);

    let mut local = vec![usize::MAX; mol.atom_count()];
    let mut systems = Vec::new();
    for root in mol.atoms() {
        if local[root.index()] != usize::MAX || !mol.bonds_of(root).any(ring_edge) {
            continue;
        }
        let mut atoms = vec![root];
        local[root.index()] = 0;
        let mut head = 0;
        while head < atoms.len() {
            let cur = atoms[head];
            head += 1;
            for (nb, edge) in mol.neighbor_bonds(cur) {
                if ring_edge(edge) && local[nb.index()] == usize::MAX {
                    local[nb.index()] = atoms.len();
                    atoms.push(nb);
                }
            }
        }

        let mut adjacency = vec![Vec::new(); atoms.len()];
        let mut edge_ids: HashMap<EdgeIndex, usize> = HashMap::new();
        for (i, &atom) in atoms.iter().enumerate() {
            for (nb, edge) in mol.neighbor_bonds(atom) {
                if !ring_edge(edge) {
                    continue;
                }
                let next_id = edge_ids.len();
                let id = *edge_ids.entry(edge).or_insert(next_id);
                adjacency[i].push((local[nb.index()], id));
            }
        }
        systems.push(RingSystem {
            atoms,
            adjacency,
            edge_count: edge_ids.len(),
        });
    }
    systems
}

impl RingSystem {
    fn edge_between(&self, a: usize, b: usize) -> Option<usize> {
        self.adjacency[a]
            .iter()
            .find(|&&(nb, _)| nb == b)
            .map(|&(_, e)| e)
    }

    /// Candidate cycles and the smallest independent subset of them.
    fn smallest_basis(&self) -> (Vec<Cycle>, Vec<Cycle>) {
        let needed = (self.edge_count + 1).saturating_sub(self.atoms.len());
        let candidates = self.candidate_cycles();
        let mut reducer = CycleBasis::default();
        let mut basis = Vec::with_capacity(needed);
        for cycle in &candidates {
            if basis.len() == needed {
                break;
            }
            if reducer.insert(&cycle.edges) {
                basis.push(cycle.clone());
            }
        }
        (candidates, basis)
    }

    /// Horton's candidate cycles: for every atom `w` and bond `u-v`, the
    /// shortest paths `w..u` and `w..v` closed by `u-v`, when the two paths
    /// meet only at `w`. Sorted by size, then by atom list.
    fn candidate_cycles(&self) -> Vec<Cycle> {
        let edges: Vec<(usize, usize)> = self
            .adjacency
            .iter()
            .enumerate()
            .flat_map(|(u, adj)| adj.iter().filter(move |&&(v, _)| u < v).map(move |&(v, _)| (u, v)))
            .collect();

        let mut rings: Vec<Vec<usize>> = Vec::new();
        for source in 0..self.atoms.len() {
            let tree = ShortestPaths::search(self, source);
            for &(u, v) in &edges {
                let (Some(path_u), Some(path_v)) = (tree.path_to(u), tree.path_to(v)) else {
                    continue;
                };
                if path_u.len() + path_v.len() < 4 {
                    continue;
                }
                if path_u[1..].iter().any(|a| path_v[1..].contains(a)) {
                    continue;
                }
                let mut ring = path_u;
                ring.extend(path_v[1..].iter().rev());
                rings.push(ring);
            }
        }

        let mut cycles: Vec<Cycle> = rings
            .into_iter()
            .map(|ring| Cycle {
                edges: EdgeSet::of_ring(self, &ring),
                atoms: ring.iter().map(|&i| self.atoms[i]).collect(),
            })
            .filter(|c| !c.edges.is_empty())
            .collect();
        cycles.sort_by(|a, b| a.atoms.len().cmp(&b.atoms.len()).then_with(|| a.atoms.cmp(&b.atoms)));
        cycles.dedup_by(|a, b| a.atoms == b.atoms);
        cycles
    }
}

/// Breadth-first tree from one source atom of a ring system.
struct ShortestPaths {
    source: usize,
    parent: Vec<Option<usize>>,
    reached: Vec<bool>,
}

impl ShortestPaths {
    fn search(system: &RingSystem, source: usize) -> Self {
        let n = system.atoms.len();
        let mut parent = vec![None; n];
        let mut reached = vec![false; n];
        reached[source] = true;
        let mut queue = VecDeque::from([source]);
        while let Some(cur) = queue.pop_front() {
            for &(nb, _) in &system.adjacency[cur] {
                if !reached[nb] {
                    reached[nb] = true;
                    parent[nb] = Some(cur);
                    queue.push_back(nb);
                }
            }
        }
        Self {
            source,
            parent,
            reached,
        }
    }

    /// Atoms from the source to `target`, both included.
    fn path_to(&self, target: usize) -> Option<Vec<usize>> {
        if !self.reached[target] {
            return None;
        }
        let mut path = vec![target];
        let mut cur = target;
        while cur != self.source {
            cur = self.parent[cur]?;
            path.push(cur);
        }
        path.reverse();
        Some(path)
    }
}

/// Bonds whose removal disconnects their component, i.e. bonds in no ring.
///
/// Iterative Tarjan low-link walk, so long chains do not grow the call stack.
pub fn bridges<A, B>(mol: &Mol<A, B>) -> HashSet<EdgeIndex> {
    let n = mol.atom_count();
    let mut disc = vec![usize::MAX; n];
    let mut low = vec![0usize; n];
    let mut timer = 0usize;
    let mut result = HashSet::new();

    for root in mol.atoms() {
        if disc[root.index()] != usize::MAX {
            continue;
        }
        disc[root.index()] = timer;
        low[root.index()] = timer;
        timer += 1;

        // (node, edge used to reach it, remaining incident edges)
        let mut stack: Vec<(NodeIndex, Option<EdgeIndex>, Vec<(NodeIndex, EdgeIndex)>)> =
            vec![(root, None, mol.neighbor_bonds(root).collect())];

        while let Some((node, via, pending)) = stack.last_mut() {
            let node = *node;
            let via = *via;
            if let Some((next, edge)) = pending.pop() {
                if Some(edge) == via {
                    continue;
                }
                if disc[next.index()] == usize::MAX {
                    disc[next.index()] = timer;
                    low[next.index()] = timer;
                    timer += 1;
                    stack.push((next, Some(edge), mol.neighbor_bonds(next).collect()));
                } else {
                    low[node.index()] = low[node.index()].min(disc[next.index()]);
                }
                continue;
            }

            stack.pop();
            if let (Some(edge), Some((parent, _, _))) = (via, stack.last()) {
                let parent = *parent;
                low[parent.index()] = low[parent.index()].min(low[node.index()]);
                if low[node.index()] > disc[parent.index()] {
                    result.insert(edge);
                }
            }
        }
    }

    result
}
