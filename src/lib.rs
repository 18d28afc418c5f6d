//! Scores a set of short query sequences against every read of a collection of fasta files
//! with a windowed local alignment, and accumulates for each query an histogram of scores.
//!
//! Progress is dumped periodically in a json checkpoint so that an interrupted run
//! can be resumed exactly where it stopped.

pub mod aligner;
pub mod dna;
pub mod errors;
pub mod report;
pub mod scorerun;
pub mod utils;

pub use aligner::WindowAligner;
pub use dna::queries::{Query, QuerySet};
pub use dna::readsource::{FastaSource, MemorySource, ReadRecord, SequenceSource};
pub use errors::{Result, ScoreError};
pub use scorerun::ScoreRun;
pub use utils::dumpload::{ProgressSnapshot, ProgressStore};
pub use utils::parameters::{RunParams, ScoringParams};
