//! dna side : queries to score and reads to score them against

pub mod queries;
pub mod readsource;
