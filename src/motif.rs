use std::collections::HashMap;
use std::time::Instant;

use log::{debug, info};
use rayon::prelude::*;

use crate::csr::GraphStore;
use crate::error::{Error, Result};
use crate::variation::VariationTable;

/// Per-node motif counts: `features[node][motif_class] = count`.
pub type Features = Vec<HashMap<u32, u32>>;

/// The six orderings of three elements, used to build a directed group
/// signature independent of discovery order.
const PERMUTATIONS_3: [[usize; 3]; 6] = [
    [0, 1, 2],
    [0, 2, 1],
    [1, 0, 2],
    [1, 2, 0],
    [2, 0, 1],
    [2, 1, 0],
];

/// Tunable knobs for a motif census: only the enumeration level. Validity of
/// `level` (must be 3 or 4) is checked once, at construction.
#[derive(Debug, Clone, Copy)]
pub struct MotifConfig {
    pub level: u8,
}

impl MotifConfig {
    pub fn new(level: u8) -> Result<Self> {
        if level == 3 || level == 4 {
            Ok(MotifConfig { level })
        } else {
            Err(Error::InvalidLevel { level })
        }
    }
}

struct Bound<'g> {
    graph: &'g GraphStore,
    sorted_nodes: Vec<u32>,
    removal_index: Vec<u32>,
    all_motifs: Vec<u32>,
    features: Features,
}

enum State<'g> {
    Configured,
    Bound(Bound<'g>),
    Completed(Bound<'g>),
}

/// Enumerates connected 3- or 4-node induced subgraphs rooted at each node in
/// degree order, classifies each via a [`VariationTable`], and credits every
/// member node with one count of the matched motif class.
///
/// Moves through three states: *Configured* (level and table set, no graph),
/// *Bound* (a graph is attached and the degree-ordered indices are built),
/// *Completed* (`calculate` has run). Binding a new graph from any state
/// returns to Configured before transitioning back to Bound.
pub struct MotifEngine<'g> {
    config: MotifConfig,
    directed: bool,
    table: VariationTable,
    state: State<'g>,
}

impl<'g> MotifEngine<'g> {
    pub fn new(config: MotifConfig, directed: bool, table: VariationTable) -> Self {
        MotifEngine {
            config,
            directed,
            table,
            state: State::Configured,
        }
    }

    /// Attaches a graph, builds the degree-ascending permutation and its
    /// inverse, and zeroes out feature counters for every tracked motif
    /// class. Always returns to Configured first, so re-binding is safe from
    /// any prior state.
    pub fn bind(&mut self, graph: &'g GraphStore) {
        let sorted_nodes = graph.sorted_nodes_by_degree();
        let mut removal_index = vec![0u32; graph.node_count() as usize];
        for (index, &node) in sorted_nodes.iter().enumerate() {
            removal_index[node as usize] = index as u32;
        }

        let all_motifs = self.table.all_motifs();
        let mut features = Vec::with_capacity(graph.node_count() as usize);
        for _ in 0..graph.node_count() {
            let counters = all_motifs.iter().map(|&motif| (motif, 0u32)).collect();
            features.push(counters);
        }

        self.state = State::Bound(Bound {
            graph,
            sorted_nodes,
            removal_index,
            all_motifs,
            features,
        });
    }

    /// Runs the census sequentially, root by root in degree order, and
    /// returns the per-node feature mapping. Requires a Bound engine;
    /// transitions to Completed.
    pub fn calculate(&mut self) -> Result<&Features> {
        let start = Instant::now();

        let mut bound = match std::mem::replace(&mut self.state, State::Configured) {
            State::Bound(bound) => bound,
            other => {
                self.state = other;
                return Err(Error::EngineNotBound {
                    operation: "calculate()",
                });
            }
        };

        for node_index in 0..bound.sorted_nodes.len() {
            let root = bound.sorted_nodes[node_index];
            let groups = self.enumerate(root, &bound);
            debug!("root {root} ({node_index}/{}): {} candidate groups", bound.sorted_nodes.len(), groups.len());
            for group in groups {
                self.credit(&group, bound.graph, &mut bound.features);
            }
        }

        info!(
            "Computed motif census (level {}) over {} roots in {:?}",
            self.config.level,
            bound.sorted_nodes.len(),
            start.elapsed()
        );

        self.state = State::Completed(bound);
        match &self.state {
            State::Completed(bound) => Ok(&bound.features),
            _ => unreachable!(),
        }
    }

    /// Parallel variant of [`Self::calculate`]: independent per-root
    /// enumeration work is spread across a rayon thread pool and the
    /// per-node-per-class increments are reduced afterwards. Motif counts
    /// are deterministic regardless of root processing order because every
    /// triple (or quadruple) is credited exactly once by construction.
    pub fn calculate_parallel(&mut self) -> Result<&Features> {
        let start = Instant::now();

        let mut bound = match std::mem::replace(&mut self.state, State::Configured) {
            State::Bound(bound) => bound,
            other => {
                self.state = other;
                return Err(Error::EngineNotBound {
                    operation: "calculate_parallel()",
                });
            }
        };

        let increments: Vec<(u32, u32)> = bound
            .sorted_nodes
            .par_iter()
            .flat_map_iter(|&root| {
                let groups = self.enumerate(root, &bound);
                debug!("root {root}: {} candidate groups", groups.len());
                groups
                    .into_iter()
                    .filter_map(|group| {
                        let signature = self.group_signature(&group, bound.graph);
                        self.table.classify(signature).map(|class| (group, class))
                    })
                    .flat_map(|(group, class)| group.into_iter().map(move |node| (node, class)))
                    .collect::<Vec<_>>()
            })
            .collect();

        for (node, class) in increments {
            *bound.features[node as usize].entry(class).or_insert(0) += 1;
        }

        info!(
            "Computed motif census (level {}) over {} roots in {:?}",
            self.config.level,
            bound.sorted_nodes.len(),
            start.elapsed()
        );

        self.state = State::Completed(bound);
        match &self.state {
            State::Completed(bound) => Ok(&bound.features),
            _ => unreachable!(),
        }
    }

    fn credit(&self, group: &MotifGroup, graph: &GraphStore, features: &mut Features) {
        let signature = self.group_signature(group, graph);
        if let Some(class) = self.table.classify(signature) {
            for &node in group.as_slice() {
                *features[node as usize].entry(class).or_insert(0) += 1;
            }
        }
    }

    fn enumerate(&self, root: u32, bound: &Bound<'g>) -> Vec<MotifGroup> {
        match self.config.level {
            3 => enumerate_level3(root, bound.graph, &bound.removal_index)
                .into_iter()
                .map(MotifGroup::Triple)
                .collect(),
            _ => enumerate_level4(root, bound.graph, &bound.removal_index)
                .into_iter()
                .map(MotifGroup::Quad)
                .collect(),
        }
    }

    /// Builds the group signature for a candidate subgraph: for 3-node
    /// groups, every permutation's three ordered pairs (the §4.3
    /// convention, matched against an externally generated table); for
    /// 4-node groups, the 12 ordered (directed) or 6 unordered (undirected)
    /// pairs in natural discovery order, since no such external convention
    /// exists for level 4.
    fn group_signature(&self, group: &MotifGroup, graph: &GraphStore) -> u32 {
        match group {
            MotifGroup::Triple(nodes) => self.signature_triple(*nodes, graph),
            MotifGroup::Quad(nodes) => self.signature_quad(*nodes, graph),
        }
    }

    fn signature_triple(&self, nodes: [u32; 3], graph: &GraphStore) -> u32 {
        let mut bit = 0u32;
        let mut signature = 0u32;

        if self.directed {
            for perm in PERMUTATIONS_3 {
                let p = perm.map(|i| nodes[i]);
                for &(a, b) in &[(0, 1), (0, 2), (1, 2)] {
                    if graph.are_neighbors(p[a], p[b]) {
                        signature |= 1 << bit;
                    }
                    bit += 1;
                }
            }
        } else {
            for &(a, b) in &[(0, 1), (0, 2), (1, 2)] {
                if graph.are_neighbors(nodes[a], nodes[b]) {
                    signature |= 1 << bit;
                }
                bit += 1;
            }
        }

        signature
    }

    fn signature_quad(&self, nodes: [u32; 4], graph: &GraphStore) -> u32 {
        let mut bit = 0u32;
        let mut signature = 0u32;

        let pairs: &[(usize, usize)] = if self.directed {
            &[
                (0, 1),
                (0, 2),
                (0, 3),
                (1, 0),
                (1, 2),
                (1, 3),
                (2, 0),
                (2, 1),
                (2, 3),
                (3, 0),
                (3, 1),
                (3, 2),
            ]
        } else {
            &[(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]
        };

        for &(a, b) in pairs {
            if graph.are_neighbors(nodes[a], nodes[b]) {
                signature |= 1 << bit;
            }
            bit += 1;
        }

        signature
    }
}

#[derive(Debug, Clone, Copy)]
enum MotifGroup {
    Triple([u32; 3]),
    Quad([u32; 4]),
}

impl MotifGroup {
    fn as_slice(&self) -> &[u32] {
        match self {
            MotifGroup::Triple(nodes) => nodes,
            MotifGroup::Quad(nodes) => nodes,
        }
    }

    fn into_iter(self) -> std::vec::IntoIter<u32> {
        match self {
            MotifGroup::Triple(nodes) => nodes.to_vec().into_iter(),
            MotifGroup::Quad(nodes) => nodes.to_vec().into_iter(),
        }
    }
}

/// For each out-neighbor `n1` of `root` that is eligible (removal index ≥
/// root's), and each out-neighbor `n2` of `n1` reached that way, plus every
/// eligible co-neighbor pair of `root` with no mutual edge — every connected
/// triple containing `root` as canonical root, emitted exactly once.
fn enumerate_level3(root: u32, graph: &GraphStore, removal_index: &[u32]) -> Vec<[u32; 3]> {
    let idx_root = removal_index[root as usize];
    let eligible = |x: u32| removal_index[x as usize] >= idx_root;

    let mut visited: HashMap<u32, u32> = HashMap::new();
    visited.insert(root, 0);
    let mut next = 1u32;
    let mut triples = Vec::new();

    for &n1 in graph.neighbors(root) {
        if eligible(n1) {
            visited.entry(n1).or_insert_with(|| {
                let rank = next;
                next += 1;
                rank
            });
        }
    }

    for &n1 in graph.neighbors(root) {
        if !eligible(n1) {
            continue;
        }
        let v1 = visited[&n1];
        for &n2 in graph.neighbors(n1) {
            if !eligible(n2) {
                continue;
            }
            match visited.get(&n2) {
                Some(&v2) => {
                    if v1 < v2 {
                        triples.push([root, n1, n2]);
                    }
                }
                None => {
                    visited.insert(n2, next);
                    next += 1;
                    triples.push([root, n1, n2]);
                }
            }
        }
    }

    let first_neighbors: Vec<u32> = graph
        .neighbors(root)
        .iter()
        .copied()
        .filter(|&x| eligible(x))
        .collect();

    for i in 0..first_neighbors.len() {
        for j in (i + 1)..first_neighbors.len() {
            let n1 = first_neighbors[i];
            let n2 = first_neighbors[j];
            let v1 = visited[&n1];
            let v2 = visited[&n2];
            if v1 < v2 && !graph.are_neighbors(n1, n2) && !graph.are_neighbors(n2, n1) {
                triples.push([root, n1, n2]);
            }
        }
    }

    triples
}

/// Extends every level-3 triple through `root` with a fourth eligible node
/// drawn from the neighborhoods of all three existing members. A quadruple
/// is only emitted from the one triple whose omitted member has the highest
/// discovery rank, so each connected 4-set is produced exactly once.
fn enumerate_level4(root: u32, graph: &GraphStore, removal_index: &[u32]) -> Vec<[u32; 4]> {
    let idx_root = removal_index[root as usize];
    let eligible = |x: u32| removal_index[x as usize] >= idx_root;

    let triples = enumerate_level3(root, graph, removal_index);

    // Rebuild the same `visited` discovery order enumerate_level3 used, so
    // the canonical-rank comparison below lines up with the triples above.
    let mut visited: HashMap<u32, u32> = HashMap::new();
    visited.insert(root, 0);
    let mut next = 1u32;
    for &n1 in graph.neighbors(root) {
        if eligible(n1) {
            visited.entry(n1).or_insert_with(|| {
                let rank = next;
                next += 1;
                rank
            });
        }
    }
    for &n1 in graph.neighbors(root) {
        if !eligible(n1) {
            continue;
        }
        for &n2 in graph.neighbors(n1) {
            if !eligible(n2) || visited.contains_key(&n2) {
                continue;
            }
            visited.insert(n2, next);
            next += 1;
        }
    }

    let mut quads = Vec::new();
    for [r, n1, n2] in triples {
        let v1 = visited[&n1];
        let v2 = visited[&n2];
        let vmax = v1.max(v2);

        let mut candidates: Vec<u32> = graph
            .neighbors(r)
            .iter()
            .chain(graph.neighbors(n1).iter())
            .chain(graph.neighbors(n2).iter())
            .copied()
            .filter(|&x| x != r && x != n1 && x != n2 && eligible(x))
            .collect();
        candidates.sort_unstable();
        candidates.dedup();

        for n3 in candidates {
            let v3 = *visited.entry(n3).or_insert_with(|| {
                let rank = next;
                next += 1;
                rank
            });
            if v3 > vmax {
                quads.push([r, n1, n2, n3]);
            }
        }
    }

    quads
}
