//! The queries to score reads against, each one with its histogram of scores.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::errors::{Result, ScoreError};
use crate::utils::files::clean_sequence;

/// Histogram of scores : score -> nb of reads that got this score
pub type Histogram = BTreeMap<u32, u64>;

/// a row of the query table. Other columns are ignored.
#[derive(Deserialize)]
struct QueryRow {
    name: String,
    seq: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Query {
    name: String,
    /// only A,C,G,T, uppercase
    seq: String,
    histogram: Histogram,
}

impl Query {
    /// a fresh query. The sequence is cleaned, the histogram empty.
    pub fn new(name: &str, raw_seq: &str) -> Self {
        Query {
            name: name.to_string(),
            seq: clean_sequence(raw_seq),
            histogram: Histogram::new(),
        }
    }

    /// a query as reloaded from a checkpoint, sequence is already clean
    pub(crate) fn with_histogram(name: String, seq: String, histogram: Histogram) -> Self {
        Query {
            name,
            seq,
            histogram,
        }
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_seq(&self) -> &str {
        &self.seq
    }

    pub fn len(&self) -> usize {
        self.seq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    pub fn get_histogram(&self) -> &Histogram {
        &self.histogram
    }

    /// one more read got this score
    pub fn record(&mut self, score: u32) {
        *self.histogram.entry(score).or_insert(0) += 1;
    }

    /// nb of reads scored against this query
    pub fn nb_scored(&self) -> u64 {
        self.histogram.values().sum()
    }

    /// largest score seen for this query
    pub fn max_score(&self) -> Option<u32> {
        self.histogram.keys().next_back().copied()
    }
} // end of impl Query

//==========================================================================

/// The set of queries, sorted by increasing sequence length.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuerySet {
    queries: Vec<Query>,
}

impl QuerySet {
    /// sorts queries by length. The sort is stable, queries of same length keep their order.
    pub fn new(mut queries: Vec<Query>) -> Result<Self> {
        if queries.is_empty() {
            return Err(ScoreError::Config(String::from("no query to score")));
        }
        if let Some(q) = queries.iter().find(|q| q.is_empty()) {
            return Err(ScoreError::EmptySequence(format!(
                "query {} has no A,C,G,T base",
                q.name
            )));
        }
        queries.sort_by_key(|q| q.len());
        Ok(QuerySet { queries })
    } // end of new

    /// loads a delimited table with at least a column name and a column seq.
    pub fn from_table(path: &Path, delimiter: u8) -> Result<Self> {
        log::info!("loading queries from {:?}", path);
        //
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .from_path(path)
            .map_err(|e| ScoreError::Config(format!("cannot open query table {:?} : {}", path, e)))?;
        let mut queries = Vec::<Query>::new();
        for (rank, row) in reader.deserialize::<QueryRow>().enumerate() {
            let row = row.map_err(|e| {
                ScoreError::Config(format!("query table {:?}, row {} : {}", path, rank + 1, e))
            })?;
            let query = Query::new(&row.name, &row.seq);
            log::debug!("query {}, raw len {}, clean len {}", query.name, row.seq.len(), query.len());
            queries.push(query);
        }
        log::info!("loaded {} queries", queries.len());
        //
        QuerySet::new(queries)
    } // end of from_table

    pub fn get_queries(&self) -> &[Query] {
        &self.queries
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Query> {
        self.queries.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    /// sum of query lengths, i.e. nb of query bases aligned per read
    pub fn total_len(&self) -> usize {
        self.queries.iter().map(|q| q.len()).sum()
    }

    /// largest score of all histograms, 0 if none
    pub fn max_score(&self) -> u32 {
        self.queries.iter().filter_map(|q| q.max_score()).max().unwrap_or(0)
    }

    /// nb of reads scored, checked to be the same for every query.
    /// Returns the pair of disagreeing counts as error value.
    pub fn nb_scored(&self) -> std::result::Result<u64, (u64, u64)> {
        let first = self.queries.first().map(|q| q.nb_scored()).unwrap_or(0);
        match self.queries.iter().map(|q| q.nb_scored()).find(|n| *n != first) {
            Some(other) => Err((first, other)),
            None => Ok(first),
        }
    }
} // end of impl QuerySet
