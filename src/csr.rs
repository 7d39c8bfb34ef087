use byte_slice_cast::{AsByteSlice, AsMutByteSlice};
use log::info;
use rand::seq::SliceRandom;
use std::io::{Read, Write};
use std::path::Path;
use std::time::Instant;

use crate::error::{Error, Result};

/// A sentinel shell value marking a node that has not yet been assigned to a
/// k-core shell.
const UNSET_SHELL: u16 = u16::MAX;

/// Tunable knobs for [`GraphStore::page_rank`].
#[derive(Debug, Copy, Clone)]
pub struct PageRankConfig {
    /// Probability a random surfer keeps following edges rather than
    /// restarting.
    pub damping: f32,
    /// Number of Gauss-Seidel sweeps over all nodes.
    pub iterations: usize,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping: 0.85,
            iterations: 20,
        }
    }
}

impl PageRankConfig {
    pub fn new(damping: f32, iterations: usize) -> Self {
        Self { damping, iterations }
    }
}

/// A cache-aware, immutable Compressed-Sparse-Row graph.
///
/// `offsets` has `n + 1` entries; `offsets[u]..offsets[u + 1]` indexes the
/// (ascending, gap-free) neighbor slice of node `u` within `adjacency`. The
/// array lengths and the monotonicity of `offsets` are invariants enforced at
/// construction time — nothing downstream re-checks them.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphStore {
    n: u32,
    m: u64,
    offsets: Box<[i64]>,
    adjacency: Box<[u32]>,
    weights: Option<Box<[f64]>>,
    directed: bool,
    weighted: bool,
}

impl GraphStore {
    /// Builds a graph from a pre-sorted offset/adjacency pair, optionally with
    /// per-edge weights. `offsets` must have exactly `adjacency.len() + 1` as
    /// its last entry and be non-decreasing; neighbor lists within a node's
    /// slice must already be sorted ascending. Violating either is undefined
    /// behavior for every other operation on the resulting store, so we check
    /// what's cheap to check here and trust the rest.
    pub fn assign(
        offsets: Vec<i64>,
        adjacency: Vec<u32>,
        weights: Option<Vec<f64>>,
        directed: bool,
    ) -> Result<Self> {
        let start = Instant::now();

        let n = offsets.len().saturating_sub(1) as u32;
        let m = *offsets.last().unwrap_or(&0) as u64;

        if adjacency.len() as u64 != m {
            return Err(Error::MismatchedAdjacencyLength {
                adjacency_len: adjacency.len(),
                m,
            });
        }

        let weighted = weights.is_some();
        let weights = match weights {
            Some(w) if w.len() != adjacency.len() => {
                return Err(Error::MismatchedWeightsLength {
                    weights_len: w.len(),
                    adjacency_len: adjacency.len(),
                })
            }
            Some(w) => Some(w.into_boxed_slice()),
            None => None,
        };

        let store = GraphStore {
            n,
            m,
            offsets: offsets.into_boxed_slice(),
            adjacency: adjacency.into_boxed_slice(),
            weights,
            directed,
            weighted,
        };

        info!(
            "Assigned graph (n = {}, m = {}) in {:?}",
            store.n,
            store.m,
            start.elapsed()
        );

        Ok(store)
    }

    pub fn node_count(&self) -> u32 {
        self.n
    }

    pub fn edge_count(&self) -> u64 {
        self.m
    }

    pub fn directed(&self) -> bool {
        self.directed
    }

    pub fn weighted(&self) -> bool {
        self.weighted
    }

    pub fn weights(&self) -> Option<&[f64]> {
        self.weights.as_deref()
    }

    /// Out-degree of `u`.
    pub fn degree(&self, u: u32) -> u32 {
        (self.offsets[u as usize + 1] - self.offsets[u as usize]) as u32
    }

    /// The out-neighbor slice of `u`, in ascending order.
    pub fn neighbors(&self, u: u32) -> &[u32] {
        let from = self.offsets[u as usize] as usize;
        let to = self.offsets[u as usize + 1] as usize;
        &self.adjacency[from..to]
    }

    pub fn compute_node_degrees(&self) -> Vec<u32> {
        (0..self.n).map(|u| self.degree(u)).collect()
    }

    /// Whether there is an edge `p -> q`. Binary search over `p`'s sorted
    /// neighbor list.
    pub fn are_neighbors(&self, p: u32, q: u32) -> bool {
        self.neighbors(p).binary_search(&q).is_ok()
    }

    /// Builds the graph with every edge reversed: `(a, b)` becomes `(b, a)`.
    pub fn inverse(&self) -> GraphStore {
        let start = Instant::now();

        let n = self.n as usize;
        let m = self.m as usize;

        let mut in_degrees = vec![0u32; n];
        for &target in self.adjacency.iter() {
            in_degrees[target as usize] += 1;
        }

        let mut offsets = vec![0i64; n + 1];
        for i in 0..n {
            offsets[i + 1] = offsets[i] + in_degrees[i] as i64;
        }

        let mut cursor = offsets.clone();
        let mut adjacency = vec![0u32; m];
        for node in 0..self.n {
            let from = self.offsets[node as usize] as usize;
            let to = self.offsets[node as usize + 1] as usize;
            for &peer in &self.adjacency[from..to] {
                let pos = cursor[peer as usize] as usize;
                adjacency[pos] = node;
                cursor[peer as usize] += 1;
            }
        }

        info!("Inverted graph in {:?}", start.elapsed());

        GraphStore {
            n: self.n,
            m: self.m,
            offsets: offsets.into_boxed_slice(),
            adjacency: adjacency.into_boxed_slice(),
            weights: None,
            directed: self.directed,
            weighted: false,
        }
    }

    /// Builds the undirected version of this graph by merging it with its
    /// own inverse: for each node, the union (with de-duplication where the
    /// same neighbor id appears in both lists) of its out-neighbors and its
    /// in-neighbors.
    pub fn undirected(&self, inverse: &GraphStore) -> GraphStore {
        let start = Instant::now();

        let mut merged = Vec::with_capacity(self.adjacency.len() + inverse.adjacency.len());
        let mut offsets = vec![0i64; self.n as usize + 1];

        for node in 0..self.n {
            let mut p1 = &self.neighbors(node)[..];
            let mut p2 = &inverse.neighbors(node)[..];

            while !p1.is_empty() && !p2.is_empty() {
                match p1[0].cmp(&p2[0]) {
                    std::cmp::Ordering::Equal => {
                        merged.push(p1[0]);
                        p1 = &p1[1..];
                        p2 = &p2[1..];
                    }
                    std::cmp::Ordering::Less => {
                        merged.push(p1[0]);
                        p1 = &p1[1..];
                    }
                    std::cmp::Ordering::Greater => {
                        merged.push(p2[0]);
                        p2 = &p2[1..];
                    }
                }
            }
            merged.extend_from_slice(p1);
            merged.extend_from_slice(p2);

            offsets[node as usize + 1] = merged.len() as i64;
        }

        info!("Built undirected graph in {:?}", start.elapsed());

        let m = merged.len() as u64;
        GraphStore {
            n: self.n,
            m,
            offsets: offsets.into_boxed_slice(),
            adjacency: merged.into_boxed_slice(),
            weights: None,
            directed: false,
            weighted: false,
        }
    }

    /// Gauss-Seidel PageRank: each iteration visits all nodes in a freshly
    /// shuffled order and updates the running score vector in place, so later
    /// nodes in the same iteration already see their predecessors' updated
    /// scores. This is deliberately sequential — parallelizing this loop
    /// would turn it into a Jacobi iteration and change the numbers.
    pub fn page_rank(&self, config: PageRankConfig) -> Vec<f32> {
        let start = Instant::now();

        let PageRankConfig { damping, iterations } = config;

        let n = self.n as usize;
        let mut scores = vec![1.0 - damping; n];
        let mut rng = rand::thread_rng();
        let mut order: Vec<u32> = (0..self.n).collect();

        for _ in 0..iterations {
            order.shuffle(&mut rng);
            for &node in &order {
                let mut contribution = 0.0f32;
                for &peer in self.neighbors(node) {
                    let out_degree = self.degree(peer);
                    if out_degree > 0 {
                        contribution += scores[peer as usize] / out_degree as f32;
                    }
                }
                scores[node as usize] = (1.0 - damping) + damping * contribution;
            }
        }

        info!(
            "Computed PageRank ({} iterations) in {:?}",
            iterations,
            start.elapsed()
        );

        scores
    }

    /// Shell index of every node via naive k-core peeling: nodes with
    /// current degree `<= shell` are assigned to `shell`, which lowers the
    /// effective degree of their still-unassigned neighbors, repeated to a
    /// fixed point before advancing to the next shell.
    pub fn k_core(&self) -> Vec<u16> {
        let start = Instant::now();

        let n = self.n as usize;
        let mut shell = vec![UNSET_SHELL; n];
        let mut degrees = self.compute_node_degrees();

        for node in 0..self.n {
            if degrees[node as usize] == 0 {
                shell[node as usize] = 0;
            }
        }

        let mut current_shell: u16 = 1;
        loop {
            let mut nodes_in_shell = false;
            loop {
                let mut any_degree_changed = false;
                for node in 0..self.n {
                    let idx = node as usize;
                    if shell[idx] == UNSET_SHELL && degrees[idx] <= current_shell as u32 {
                        shell[idx] = current_shell;
                        nodes_in_shell = true;
                        for &peer in self.neighbors(node) {
                            if shell[peer as usize] == UNSET_SHELL {
                                degrees[peer as usize] -= 1;
                                any_degree_changed = true;
                            }
                        }
                    }
                }
                if !any_degree_changed {
                    break;
                }
            }
            if !nodes_in_shell {
                break;
            }
            current_shell += 1;
        }

        info!("Computed k-core decomposition in {:?}", start.elapsed());

        shell
    }

    /// Nodes ordered ascending by degree, ties broken by ascending node id
    /// (a stable sort on `(degree, node_id)` gives exactly this).
    pub fn sorted_nodes_by_degree(&self) -> Vec<u32> {
        let degrees = self.compute_node_degrees();
        let mut nodes: Vec<u32> = (0..self.n).collect();
        nodes.sort_by_key(|&node| degrees[node as usize]);
        nodes
    }

    /// Writes the binary layout documented for this crate: `n`, `m`,
    /// `offsets`, `adjacency`, `weighted`, `weights` (zero-filled when
    /// `weighted` is false, so the layout never depends on the flag to know
    /// how many bytes follow), `directed`.
    pub fn serialize<W: Write>(&self, output: &mut W) -> Result<()> {
        output.write_all(&self.n.to_le_bytes())?;
        output.write_all(&self.m.to_le_bytes())?;
        output.write_all(self.offsets.as_byte_slice())?;
        output.write_all(self.adjacency.as_byte_slice())?;
        output.write_all(&[self.weighted as u8])?;

        match &self.weights {
            Some(weights) => output.write_all(weights.as_byte_slice())?,
            None => {
                let zeros = vec![0.0f64; self.adjacency.len()];
                output.write_all(zeros.as_byte_slice())?;
            }
        }

        output.write_all(&[self.directed as u8])?;
        Ok(())
    }

    pub fn deserialize<R: Read>(input: &mut R) -> Result<Self> {
        let mut n_buf = [0u8; 4];
        input.read_exact(&mut n_buf)?;
        let n = u32::from_le_bytes(n_buf);

        let mut m_buf = [0u8; 8];
        input.read_exact(&mut m_buf)?;
        let m = u64::from_le_bytes(m_buf);

        let mut offsets = vec![0i64; n as usize + 1];
        input.read_exact(offsets.as_mut_byte_slice())?;

        let mut adjacency = vec![0u32; m as usize];
        input.read_exact(adjacency.as_mut_byte_slice())?;

        let mut weighted_buf = [0u8; 1];
        input.read_exact(&mut weighted_buf)?;
        let weighted = weighted_buf[0] != 0;

        let mut weights = vec![0.0f64; m as usize];
        input.read_exact(weights.as_mut_byte_slice())?;

        let mut directed_buf = [0u8; 1];
        input.read_exact(&mut directed_buf)?;
        let directed = directed_buf[0] != 0;

        if offsets.first() != Some(&0) {
            return Err(Error::InvalidGraphFile {
                reason: "offsets[0] must be 0".to_string(),
            });
        }
        if offsets.last() != Some(&(m as i64)) {
            return Err(Error::InvalidGraphFile {
                reason: "offsets[n] must equal m".to_string(),
            });
        }

        Ok(GraphStore {
            n,
            m,
            offsets: offsets.into_boxed_slice(),
            adjacency: adjacency.into_boxed_slice(),
            weights: if weighted {
                Some(weights.into_boxed_slice())
            } else {
                None
            },
            directed,
            weighted,
        })
    }

    /// Loads `{dir}{base}_00.bin`, following the filename convention used to
    /// snapshot a graph to a directory.
    pub fn load_from_dir(dir: &str, base: &str) -> Result<Self> {
        let path = Self::file_name(dir, base);
        let mut file = std::fs::File::open(&path)?;
        Self::deserialize(&mut file)
    }

    pub fn save_to_dir(&self, dir: &str, base: &str) -> Result<()> {
        let path = Self::file_name(dir, base);
        let mut file = std::fs::File::create(&path)?;
        self.serialize(&mut file)
    }

    fn file_name(dir: &str, base: &str) -> std::path::PathBuf {
        Path::new(dir).join(format!("{base}_00.bin"))
    }
}
