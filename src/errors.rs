//! error type shared by all modules of the crate.
//! The binary wraps these in anyhow with context.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoreError {
    /// bad or missing input configuration (query table, file discovery, parameters)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// a fasta record could not be parsed, the resume cursor cannot stay aligned
    #[error("bad fasta record in {path:?}, record num {record}: {msg}")]
    Fasta {
        path: PathBuf,
        record: u64,
        msg: String,
    },

    #[error("corrupt checkpoint {path:?}: {msg}")]
    CorruptCheckpoint { path: PathBuf, msg: String },

    #[error("empty sequence: {0}")]
    EmptySequence(String),

    /// input ended before the number of reads recorded in the checkpoint
    #[error("input exhausted after {found} reads, checkpoint expects {expected} already processed")]
    ShortInput { expected: u64, found: u64 },
}

pub type Result<T> = std::result::Result<T, ScoreError>;
