use petgraph::graph::NodeIndex;

use crate::bond::BondOrder;
use crate::mol::{permutation_parity, AtomId, DoubleBondConfig, Mol};
use crate::rings::bridges;
use crate::traits::{
    HasAromaticity, HasAtomClass, HasAtomicNum, HasBondAromaticity, HasBondOrder,
    HasFormalCharge, HasHydrogenCount, HasIsotope,
};

/// Graph-invariant description of an atom. Field order is the sort order, so
/// low-degree atoms of light elements rank first and start the output.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct AtomInvariant {
    degree: usize,
    atomic_num: u8,
    isotope: u16,
    formal_charge: i8,
    hydrogen_count: u8,
    in_ring: bool,
    is_aromatic: bool,
    atom_class: u16,
}

/// Per-atom stereo parity: tetrahedral code plus the codes of every stereo
/// double bond the atom terminates. 0 = unresolved, 1 = even/cis, 2 = odd/trans.
type StereoCode = (u8, Vec<u8>);

type TraceEntry = (usize, AtomInvariant, Vec<(usize, u8)>, StereoCode);

struct DoubleBondSite {
    ends: [usize; 2],
    refs: [usize; 2],
    subs: [Vec<usize>; 2],
    config: DoubleBondConfig,
}

/// Index-based view of a molecule used while ranking.
struct RankGraph {
    invariants: Vec<AtomInvariant>,
    adjacency: Vec<Vec<(usize, u8)>>,
    tetrahedral: Vec<(usize, [Option<usize>; 4])>,
    double_bonds: Vec<DoubleBondSite>,
}

fn bond_class<B: HasBondOrder + HasBondAromaticity>(bond: &B) -> u8 {
    if bond.is_aromatic_bond() {
        return 4;
    }
    match bond.bond_order() {
        BondOrder::Single => 1,
        BondOrder::Double => 2,
        BondOrder::Triple => 3,
    }
}

impl RankGraph {
    fn new<A, B>(mol: &Mol<A, B>) -> Self
    where
        A: HasAtomicNum
            + HasHydrogenCount
            + HasFormalCharge
            + HasAromaticity
            + HasIsotope
            + HasAtomClass,
        B: HasBondOrder + HasBondAromaticity,
    {
        let n = mol.atom_count();
        let bridge_edges = bridges(mol);
        let mut in_ring = vec![false; n];
        for edge in mol.bonds() {
            if bridge_edges.contains(&edge) {
                continue;
            }
            if let Some((a, b)) = mol.bond_endpoints(edge) {
                in_ring[a.index()] = true;
                in_ring[b.index()] = true;
            }
        }

        let invariants = mol
            .atoms()
            .map(|idx| {
                let atom = mol.atom(idx);
                AtomInvariant {
                    degree: mol.degree(idx),
                    atomic_num: atom.atomic_num(),
                    isotope: atom.isotope(),
                    formal_charge: atom.formal_charge(),
                    hydrogen_count: atom.hydrogen_count(),
                    in_ring: in_ring[idx.index()],
                    is_aromatic: atom.is_aromatic(),
                    atom_class: atom.atom_class(),
                }
            })
            .collect();

        let adjacency = mol
            .atoms()
            .map(|idx| {
                mol.neighbor_bonds(idx)
                    .map(|(nb, edge)| (nb.index(), bond_class(mol.bond(edge))))
                    .collect()
            })
            .collect();

        let tetrahedral = mol
            .tetrahedral_stereo()
            .iter()
            .map(|s| {
                let slots = s.neighbors.map(|aid| match aid {
                    AtomId::Node(idx) => Some(idx.index()),
                    AtomId::Implicit(_) => None,
                });
                (s.center.index(), slots)
            })
            .collect();

        let double_bonds = mol
            .double_bond_stereo()
            .iter()
            .map(|s| {
                let ends = [s.bond.0, s.bond.1];
                let subs_of = |end: NodeIndex, other: NodeIndex| -> Vec<usize> {
                    mol.neighbors(end)
                        .filter(|&nb| nb != other)
                        .map(|nb| nb.index())
                        .collect()
                };
                DoubleBondSite {
                    ends: ends.map(|e| e.index()),
                    refs: s.refs.map(|r| r.index()),
                    subs: [subs_of(ends[0], ends[1]), subs_of(ends[1], ends[0])],
                    config: s.config,
                }
            })
            .collect();

        Self {
            invariants,
            adjacency,
            tetrahedral,
            double_bonds,
        }
    }

    fn len(&self) -> usize {
        self.invariants.len()
    }

    fn has_stereo(&self) -> bool {
        !self.tetrahedral.is_empty() || !self.double_bonds.is_empty()
    }

    fn initial_ranks(&self) -> Vec<usize> {
        ranks_from_keys(&self.invariants)
    }

    fn sorted_neighbors(&self, atom: usize, ranks: &[usize]) -> Vec<(usize, u8)> {
        let mut nbs: Vec<(usize, u8)> = self.adjacency[atom]
            .iter()
            .map(|&(nb, class)| (ranks[nb], class))
            .collect();
        nbs.sort_unstable();
        nbs
    }

    /// Splits classes by their sorted neighbour ranks until nothing changes.
    ///
    /// `ranks` must be stable under this refinement apart from the atoms
    /// listed in `moved`, whose neighbours are re-examined first. `None`
    /// examines every atom.
    fn refine_neighbors(&self, ranks: &mut Vec<usize>, moved: Option<&[usize]>) {
        let mut part = Partition::new(ranks);
        let mut dirty: Vec<usize> = match moved {
            None => (0..self.len()).collect(),
            Some(atoms) => self.neighbors_of(atoms),
        };
        let mut in_round = vec![false; self.len()];
        while !dirty.is_empty() {
            dirty.sort_unstable_by_key(|&a| (part.cell_of[a], a));
            dirty.dedup();
            for &a in &dirty {
                in_round[a] = true;
            }

            let mut splits = Vec::new();
            for group in dirty.chunk_by(|&a, &b| part.cell_of[a] == part.cell_of[b]) {
                if let Some(split) = self.split_cell(&part, group, &in_round) {
                    splits.push(split);
                }
            }
            for &a in &dirty {
                in_round[a] = false;
            }

            let mut changed = Vec::new();
            for split in splits {
                part.apply(split, &mut changed);
            }
            dirty = self.neighbors_of(&changed);
        }
        *ranks = part.ranks();
    }

    fn neighbors_of(&self, atoms: &[usize]) -> Vec<usize> {
        atoms
            .iter()
            .flat_map(|&a| self.adjacency[a].iter().map(|&(nb, _)| nb))
            .collect()
    }

    /// Groups the cell holding `dirty` by neighbour key. Members outside
    /// `dirty` share one key, read from a single representative.
    fn split_cell(&self, part: &Partition, dirty: &[usize], in_round: &[bool]) -> Option<Split> {
        let cell = part.cell_of[dirty[0]];
        let members = &part.cells[cell].members;
        if members.len() == 1 {
            return None;
        }
        let mut keyed: Vec<(Vec<(usize, u8)>, usize)> = dirty
            .iter()
            .map(|&a| (self.sorted_neighbors(a, &part.label), a))
            .collect();
        keyed.sort_unstable();

        let mut groups: Vec<(Vec<(usize, u8)>, Vec<usize>)> = Vec::new();
        for (key, atom) in keyed {
            match groups.last_mut() {
                Some((last, atoms)) if *last == key => atoms.push(atom),
                _ => groups.push((key, vec![atom])),
            }
        }

        let rest = members.len() - dirty.len();
        let stay = if rest > 0 {
            let rep = members.iter().copied().find(|&a| !in_round[a])?;
            let key = self.sorted_neighbors(rep, &part.label);
            match groups.binary_search_by(|(k, _)| k.cmp(&key)) {
                Ok(pos) => {
                    let (_, joined) = &mut groups[pos];
                    let count = rest + joined.len();
                    joined.clear();
                    (pos, count)
                }
                Err(pos) => {
                    groups.insert(pos, (key, Vec::new()));
                    (pos, rest)
                }
            }
        } else {
            let pos = (0..groups.len())
                .max_by_key(|&i| (groups[i].1.len(), std::cmp::Reverse(i)))?;
            let count = groups[pos].1.len();
            groups[pos].1.clear();
            (pos, count)
        };
        if groups.len() == 1 {
            return None;
        }
        Some(Split {
            cell,
            stay,
            groups: groups.into_iter().map(|(_, atoms)| atoms).collect(),
        })
    }

    fn tetrahedral_code(&self, slots: &[Option<usize>; 4], ranks: &[usize]) -> u8 {
        let keys: Vec<Option<usize>> = slots.iter().map(|s| s.map(|i| ranks[i])).collect();
        let mut sorted = keys.clone();
        sorted.sort_unstable();
        if sorted.windows(2).any(|w| w[0] == w[1]) {
            return 0;
        }
        match permutation_parity(&keys, &sorted) {
            Some(true) => 1,
            Some(false) => 2,
            None => 0,
        }
    }

    /// Configuration relative to the highest-ranked substituent on each end.
    fn double_bond_code(&self, site: &DoubleBondSite, ranks: &[usize]) -> u8 {
        let mut config = site.config;
        for side in 0..2 {
            let subs = &site.subs[side];
            let Some(&top) = subs.iter().max_by_key(|&&s| ranks[s]) else {
                return 0;
            };
            if subs.iter().filter(|&&s| ranks[s] == ranks[top]).count() > 1 {
                return 0;
            }
            if site.refs[side] != top {
                config = config.flip();
            }
        }
        match config {
            DoubleBondConfig::Cis => 1,
            DoubleBondConfig::Trans => 2,
        }
    }

    fn stereo_codes(&self, ranks: &[usize]) -> Vec<StereoCode> {
        let mut codes: Vec<StereoCode> = vec![(0, Vec::new()); self.len()];
        for (center, slots) in &self.tetrahedral {
            codes[*center].0 = self.tetrahedral_code(slots, ranks);
        }
        for site in &self.double_bonds {
            let code = self.double_bond_code(site, ranks);
            for &end in &site.ends {
                codes[end].1.push(code);
            }
        }
        for code in &mut codes {
            code.1.sort_unstable();
        }
        codes
    }

    /// Neighbour refinement interleaved with stereo parity splits.
    fn refine(&self, ranks: &mut Vec<usize>, mut moved: Option<Vec<usize>>) {
        loop {
            self.refine_neighbors(ranks, moved.as_deref());
            if !self.has_stereo() {
                return;
            }
            let codes = self.stereo_codes(ranks);
            let keys: Vec<(usize, &StereoCode)> =
                (0..self.len()).map(|i| (ranks[i], &codes[i])).collect();
            let next = ranks_from_keys(&keys);
            let split: Vec<usize> = (0..self.len()).filter(|&i| next[i] != ranks[i]).collect();
            if split.is_empty() {
                return;
            }
            *ranks = next;
            moved = Some(split);
        }
    }

    /// Order-independent summary of a ranking, compared between tie-break
    /// candidates.
    fn trace(&self, ranks: &[usize]) -> Vec<TraceEntry> {
        let codes = self.stereo_codes(ranks);
        let mut entries: Vec<TraceEntry> = codes
            .into_iter()
            .enumerate()
            .map(|(i, code)| {
                (
                    ranks[i],
                    self.invariants[i].clone(),
                    self.sorted_neighbors(i, ranks),
                    code,
                )
            })
            .collect();
        entries.sort();
        entries
    }

    /// Splits the lowest tied class until every rank is distinct. Without
    /// stereo records the lowest-numbered member is promoted directly;
    /// otherwise every member is tried and the smallest trace wins.
    fn break_ties(&self, ranks: &mut Vec<usize>) {
        while let Some(tied_rank) = lowest_tied_rank(ranks) {
            let tied: Vec<usize> = (0..self.len())
                .filter(|&i| ranks[i] == tied_rank)
                .collect();

            if !self.has_stereo() {
                let others = promote(ranks, &tied, tied[0], tied_rank);
                self.refine(ranks, Some(others));
                continue;
            }

            let mut best: Option<(Vec<TraceEntry>, Vec<usize>)> = None;
            for &candidate in &tied {
                let mut trial = ranks.clone();
                let others = promote(&mut trial, &tied, candidate, tied_rank);
                self.refine(&mut trial, Some(others));
                let trace = self.trace(&trial);
                if best.as_ref().is_none_or(|(best_trace, _)| trace < *best_trace) {
                    best = Some((trace, trial));
                }
            }

            match best {
                Some((_, trial)) => *ranks = trial,
                None => return,
            }
        }
    }
}

/// Moves every tied atom except `candidate` one rank up and returns them.
fn promote(ranks: &mut [usize], tied: &[usize], candidate: usize, tied_rank: usize) -> Vec<usize> {
    let others: Vec<usize> = tied.iter().copied().filter(|&a| a != candidate).collect();
    for &other in &others {
        ranks[other] = tied_rank + 1;
    }
    others
}

struct Cell {
    start: usize,
    label: usize,
    members: Vec<usize>,
}

/// Pieces of one cell in key order. The piece at `stay.0` holds `stay.1`
/// atoms that remain in the old cell, so its atom list is empty.
struct Split {
    cell: usize,
    stay: (usize, usize),
    groups: Vec<Vec<usize>>,
}

/// Ordered partition of the atoms into cells of equal rank.
///
/// A cell covers ranks `start..start + members.len()` and is labelled with a
/// value inside that range. Labels therefore order cells the same way ranks
/// do, and a cell that sheds a few members usually keeps its label.
struct Partition {
    cells: Vec<Cell>,
    cell_of: Vec<usize>,
    slot: Vec<usize>,
    label: Vec<usize>,
}

fn midpoint(start: usize, len: usize) -> usize {
    start + len.saturating_sub(1) / 2
}

impl Partition {
    /// `ranks` must count strictly smaller atoms, as [`ranks_from_keys`] does.
    fn new(ranks: &[usize]) -> Self {
        let n = ranks.len();
        let mut by_rank: Vec<Vec<usize>> = vec![Vec::new(); n];
        for (atom, &rank) in ranks.iter().enumerate() {
            by_rank[rank].push(atom);
        }
        let mut part = Partition {
            cells: Vec::new(),
            cell_of: vec![0; n],
            slot: vec![0; n],
            label: vec![0; n],
        };
        for (start, members) in by_rank.into_iter().enumerate() {
            if !members.is_empty() {
                part.add_cell(start, members);
            }
        }
        part
    }

    fn add_cell(&mut self, start: usize, members: Vec<usize>) {
        let id = self.cells.len();
        let label = midpoint(start, members.len());
        for (slot, &atom) in members.iter().enumerate() {
            self.cell_of[atom] = id;
            self.slot[atom] = slot;
            self.label[atom] = label;
        }
        self.cells.push(Cell {
            start,
            label,
            members,
        });
    }

    fn remove(&mut self, cell: usize, atom: usize) {
        let slot = self.slot[atom];
        let members = &mut self.cells[cell].members;
        members.swap_remove(slot);
        if let Some(&moved) = members.get(slot) {
            self.slot[moved] = slot;
        }
    }

    /// Carves the split pieces out of their cell, recording every atom
    /// whose label changes.
    fn apply(&mut self, split: Split, changed: &mut Vec<usize>) {
        let Split {
            cell,
            stay: (stay_pos, stay_len),
            groups,
        } = split;
        let mut start = self.cells[cell].start;
        let mut stay_start = start;
        for (pos, atoms) in groups.into_iter().enumerate() {
            if pos == stay_pos {
                stay_start = start;
                start += stay_len;
                continue;
            }
            for &atom in &atoms {
                self.remove(cell, atom);
            }
            let len = atoms.len();
            changed.extend_from_slice(&atoms);
            self.add_cell(start, atoms);
            start += len;
        }

        let kept = &mut self.cells[cell];
        kept.start = stay_start;
        if !(stay_start..stay_start + stay_len).contains(&kept.label) {
            kept.label = midpoint(stay_start, stay_len);
            for &atom in &kept.members {
                self.label[atom] = kept.label;
                changed.push(atom);
            }
        }
    }

    fn ranks(&self) -> Vec<usize> {
        let mut ranks = vec![0; self.cell_of.len()];
        for cell in &self.cells {
            for &atom in &cell.members {
                ranks[atom] = cell.start;
            }
        }
        ranks
    }
}

/// Rank of each key: the number of keys strictly smaller than it.
fn ranks_from_keys<K: Ord>(keys: &[K]) -> Vec<usize> {
    let n = keys.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| keys[a].cmp(&keys[b]));
    let mut ranks = vec![0usize; n];
    for pos in 1..n {
        let (prev, cur) = (order[pos - 1], order[pos]);
        ranks[cur] = if keys[cur] == keys[prev] {
            ranks[prev]
        } else {
            pos
        };
    }
    ranks
}

fn lowest_tied_rank(ranks: &[usize]) -> Option<usize> {
    let mut counts = vec![0usize; ranks.len()];
    for &rank in ranks {
        counts[rank] += 1;
    }
    counts.iter().position(|&c| c > 1)
}

/// Canonical rank of every atom: a permutation of `0..atom_count` that
/// depends only on the molecule, not on its input atom order.
pub fn canonical_ordering<A, B>(mol: &Mol<A, B>) -> Vec<usize>
where
    A: HasAtomicNum + HasHydrogenCount + HasFormalCharge + HasAromaticity + HasIsotope + HasAtomClass,
    B: HasBondOrder + HasBondAromaticity,
{
    if mol.atom_count() == 0 {
        return Vec::new();
    }
    let graph = RankGraph::new(mol);
    let mut ranks = graph.initial_ranks();
    graph.refine(&mut ranks, None);
    graph.break_ties(&mut ranks);
    ranks_from_keys(&ranks)
}

/// Equivalence classes under refinement alone. Atoms sharing a value are
/// topologically (and stereochemically) indistinguishable.
pub fn symmetry_classes<A, B>(mol: &Mol<A, B>) -> Vec<usize>
where
    A: HasAtomicNum + HasHydrogenCount + HasFormalCharge + HasAromaticity + HasIsotope + HasAtomClass,
    B: HasBondOrder + HasBondAromaticity,
{
    let graph = RankGraph::new(mol);
    let mut ranks = graph.initial_ranks();
    graph.refine(&mut ranks, None);
    ranks
}
