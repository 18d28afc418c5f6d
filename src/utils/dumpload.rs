//! a small module dedicated to dump/reload of progress (queries and their histograms).
//!
//! The checkpoint is a json document:
//! ```json
//! { "num_reads_processed": 12,
//!   "scoring": { "match_score": 1, "mismatch_score": 0, "gap_open": 0, "gap_extend": -10 },
//!   "queries": [ { "name": "Q1", "seq": "ATCG", "score_frequencies": { "4": 12 } } ] }
//! ```
//! Json object keys are strings, so scores are written as text and parsed back to integers at reload.
//! A bare list of queries (older format, without cursor nor scoring) is also accepted at reload.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::dna::queries::{Histogram, Query, QuerySet};
use crate::errors::{Result, ScoreError};
use crate::utils::parameters::ScoringParams;

/// a query as it is serialized, histogram keys are text
#[derive(Serialize, Deserialize)]
struct CheckpointQuery {
    name: String,
    seq: String,
    score_frequencies: BTreeMap<String, u64>,
}

#[derive(Serialize, Deserialize)]
struct CheckpointDoc {
    num_reads_processed: u64,
    scoring: ScoringParams,
    queries: Vec<CheckpointQuery>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CheckpointFile {
    Current(CheckpointDoc),
    Legacy(Vec<CheckpointQuery>),
}

impl CheckpointQuery {
    fn from_query(query: &Query) -> Self {
        let score_frequencies = query
            .get_histogram()
            .iter()
            .map(|(score, count)| (score.to_string(), *count))
            .collect();
        CheckpointQuery {
            name: query.get_name().to_string(),
            seq: query.get_seq().to_string(),
            score_frequencies,
        }
    }

    fn into_query(self) -> std::result::Result<Query, String> {
        let mut histogram = Histogram::new();
        for (key, count) in self.score_frequencies {
            let score = key
                .trim()
                .parse::<u32>()
                .map_err(|_| format!("query {} : score key {:?} is not a non negative integer", self.name, key))?;
            if histogram.insert(score, count).is_some() {
                return Err(format!("query {} : score {} appears twice", self.name, score));
            }
        }
        if !self.seq.bytes().all(|c| matches!(c, b'A' | b'C' | b'G' | b'T')) {
            return Err(format!("query {} : sequence has non ACGT characters", self.name));
        }
        Ok(Query::with_histogram(self.name, self.seq, histogram))
    }
} // end of impl CheckpointQuery

//=======================================================================

/// What a checkpoint restores
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgressSnapshot {
    /// nb of reads already scored against every query
    pub nb_reads_processed: u64,
    pub scoring: ScoringParams,
    pub queries: QuerySet,
}

/// dump and reload of progress at a fixed path
#[derive(Clone, Debug)]
pub struct ProgressStore {
    path: PathBuf,
}

impl ProgressStore {
    pub fn new(path: &Path) -> Self {
        ProgressStore {
            path: path.to_path_buf(),
        }
    }

    pub fn get_path(&self) -> &Path {
        &self.path
    }

    /// a checkpoint is present : we resume
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn corrupt(&self, msg: String) -> ScoreError {
        ScoreError::CorruptCheckpoint {
            path: self.path.clone(),
            msg,
        }
    }

    // temporary file in the same directory, so that rename stays on one file system
    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|f| f.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// dumps queries with their histograms.
    /// The dump goes to a temporary file which replaces the previous checkpoint once synced.
    pub fn save(&self, queries: &QuerySet, nb_reads_processed: u64, scoring: &ScoringParams) -> Result<()> {
        debug_assert_eq!(queries.nb_scored(), Ok(nb_reads_processed));
        log::debug!("dumping progress in {:?}, nb reads processed : {}", self.path, nb_reads_processed);
        //
        let doc = CheckpointDoc {
            num_reads_processed: nb_reads_processed,
            scoring: *scoring,
            queries: queries.get_queries().iter().map(CheckpointQuery::from_query).collect(),
        };
        let tmp_path = self.tmp_path();
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&tmp_path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &doc)?;
        writer.flush()?;
        let file: File = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        drop(file);
        fs::rename(&tmp_path, &self.path)?;
        //
        Ok(())
    } // end of save

    /// reload from a dump. Every query must have scored the same number of reads.
    pub fn load(&self) -> Result<ProgressSnapshot> {
        log::info!("reloading progress from {:?}", self.path);
        //
        let file = OpenOptions::new().read(true).open(&self.path)?;
        let reader = BufReader::new(file);
        let content: CheckpointFile = serde_json::from_reader(reader).map_err(|e| self.corrupt(e.to_string()))?;
        //
        let (cursor, scoring, records) = match content {
            CheckpointFile::Current(doc) => (Some(doc.num_reads_processed), doc.scoring, doc.queries),
            CheckpointFile::Legacy(records) => {
                log::info!("checkpoint without cursor, assuming default scoring");
                (None, ScoringParams::default(), records)
            }
        };
        let queries = records
            .into_iter()
            .map(|r| r.into_query())
            .collect::<std::result::Result<Vec<Query>, String>>()
            .map_err(|msg| self.corrupt(msg))?;
        let queries = QuerySet::new(queries).map_err(|e| self.corrupt(e.to_string()))?;
        // all histograms must agree with cursor
        let nb_scored = queries
            .nb_scored()
            .map_err(|(a, b)| self.corrupt(format!("queries disagree on nb of reads scored : {} and {}", a, b)))?;
        let nb_reads_processed = match cursor {
            Some(n) if n != nb_scored => {
                return Err(self.corrupt(format!(
                    "cursor says {} reads processed, histograms count {}",
                    n, nb_scored
                )));
            }
            Some(n) => n,
            None => nb_scored,
        };
        log::info!(
            "reloaded {} queries, nb reads processed : {}",
            queries.len(),
            nb_reads_processed
        );
        //
        Ok(ProgressSnapshot {
            nb_reads_processed,
            scoring,
            queries,
        })
    } // end of load
} // end of impl ProgressStore
