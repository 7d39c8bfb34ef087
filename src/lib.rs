//! A cache-aware, immutable Compressed-Sparse-Row graph store paired with a
//! degree-ordered motif census engine.
//!
//! [`GraphStore`] owns a CSR representation (`offsets` + `adjacency`,
//! optionally per-edge `weights`) and exposes the handful of read-only
//! graph algorithms it is built around: degree queries, neighbor-membership
//! tests, inversion, symmetrization, PageRank, and k-core decomposition.
//! [`MotifEngine`] consumes a bound `GraphStore` and a [`VariationTable`] to
//! count 3- or 4-node connected subgraph patterns per node, crediting each
//! pattern to the canonical root that discovers it so every occurrence is
//! counted exactly once.
//!
//! ```
//! use graph_census::{GraphStore, MotifConfig, MotifEngine, VariationTable};
//!
//! // A directed 3-cycle: 0 -> 1 -> 2 -> 0.
//! let graph = GraphStore::assign(vec![0, 1, 2, 3], vec![1, 2, 0], None, true).unwrap();
//! assert_eq!(graph.degree(0), 1);
//!
//! let table = VariationTable::from_entries(std::iter::empty());
//! let mut engine = MotifEngine::new(MotifConfig::new(3).unwrap(), true, table);
//! engine.bind(&graph);
//! let features = engine.calculate().unwrap();
//! assert_eq!(features.len(), 3);
//! ```

pub mod csr;
pub mod dump;
pub mod error;
pub mod motif;
pub mod variation;

pub use csr::{GraphStore, PageRankConfig};
pub use dump::dump_values;
pub use error::{Error, Result};
pub use motif::{Features, MotifConfig, MotifEngine};
pub use variation::VariationTable;
