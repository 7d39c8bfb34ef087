use thiserror::Error;

/// Errors surfaced by [`crate::GraphStore`], [`crate::VariationTable`] and
/// [`crate::MotifEngine`].
///
/// Mirrors the failure table in the design docs: configuration errors fail
/// fast at construction time, I/O errors are wrapped verbatim, and
/// structural problems detected lazily are reported with enough context to
/// name the offending value.
#[derive(Error, Debug)]
pub enum Error {
    #[error("error while reading or writing graph data")]
    Io(#[from] std::io::Error),

    #[error("motif level must be 3 or 4, got {level}")]
    InvalidLevel { level: u8 },

    #[error("malformed graph file: {reason}")]
    InvalidGraphFile { reason: String },

    #[error("motif engine must be bound to a graph before {operation}")]
    EngineNotBound { operation: &'static str },

    #[error("adjacency length {adjacency_len} does not match offsets[n]={m}")]
    MismatchedAdjacencyLength { adjacency_len: usize, m: u64 },

    #[error("weights length {weights_len} does not match adjacency length {adjacency_len}")]
    MismatchedWeightsLength {
        weights_len: usize,
        adjacency_len: usize,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
