//! structures related to processing parameters

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::files::FileSelection;

/// Scores used by the local alignment.
/// A gap of length k costs gap_open + k * gap_extend.
/// The values are dumped in checkpoints: histograms computed with different scores cannot be merged.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringParams {
    pub match_score: i32,
    pub mismatch_score: i32,
    pub gap_open: i32,
    pub gap_extend: i32,
}

impl Default for ScoringParams {
    /// +1 for a match, 0 for a mismatch, 10 for each gap position
    fn default() -> Self {
        ScoringParams {
            match_score: 1,
            mismatch_score: 0,
            gap_open: 0,
            gap_extend: -10,
        }
    }
} // end of default for ScoringParams

//===========================================================

/// Gathers everything a run needs to know.
#[derive(Clone, Debug)]
pub struct RunParams {
    /// table with name and seq columns, read only when no checkpoint exists
    pub query_file: PathBuf,
    /// delimiter of query table
    pub delimiter: u8,
    /// directory holding the reads
    pub read_dir: PathBuf,
    /// which files of read_dir are fasta files
    pub selection: FileSelection,
    /// checkpoint file
    pub progress_file: PathBuf,
    /// nb of query bases aligned between two checkpoints
    pub work_per_checkpoint: usize,
    pub scoring: ScoringParams,
}

impl Default for RunParams {
    fn default() -> Self {
        RunParams {
            query_file: PathBuf::from("query_sequences.csv"),
            delimiter: b',',
            read_dir: PathBuf::from("."),
            selection: FileSelection::default(),
            progress_file: PathBuf::from("progress.json"),
            work_per_checkpoint: 100_000,
            scoring: ScoringParams::default(),
        }
    }
} // end of default for RunParams

impl RunParams {
    /// nb reads between two checkpoints, so that each interval aligns about work_per_checkpoint query bases.
    /// Never less than 1.
    pub fn checkpoint_interval(&self, total_query_len: usize) -> u64 {
        if total_query_len == 0 {
            return 1;
        }
        ((self.work_per_checkpoint / total_query_len) as u64).max(1)
    }
} // end of impl RunParams
