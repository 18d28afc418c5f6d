//! The scoring loop.
//!
//! Each read is scored against every query (by increasing query length) before going to the next read,
//! so all histograms always total the same number of reads. Progress is dumped every
//! `work_per_checkpoint / total query length` reads and once more at end of input.
//! If a checkpoint exists at start, queries and histograms are reloaded from it and the reads
//! already scored are skipped.

use std::io::Write;
use std::time::SystemTime;

use cpu_time::ProcessTime;

use crate::aligner::WindowAligner;
use crate::dna::queries::QuerySet;
use crate::dna::readsource::{FastaSource, ReadRecord, SequenceSource};
use crate::errors::{Result, ScoreError};
use crate::utils::dumpload::ProgressStore;
use crate::utils::files::collect_fasta_files;
use crate::utils::parameters::RunParams;

pub struct ScoreRun {
    params: RunParams,
    queries: QuerySet,
    aligner: WindowAligner,
    store: ProgressStore,
    /// true if queries were reloaded from a checkpoint
    resumed: bool,
    /// nb of reads scored, including those of previous runs
    nb_processed: u64,
    /// nb of reads between two checkpoints
    interval: u64,
    start_t: SystemTime,
    cpu_start: ProcessTime,
}

impl ScoreRun {
    /// reloads the checkpoint if there is one, else loads the query table
    pub fn new(params: RunParams) -> Result<Self> {
        let store = ProgressStore::new(&params.progress_file);
        if store.exists() {
            let snapshot = store.load()?;
            if snapshot.scoring != params.scoring {
                return Err(ScoreError::Config(format!(
                    "checkpoint {:?} was computed with scoring {:?}, asked for {:?}",
                    store.get_path(),
                    snapshot.scoring,
                    params.scoring
                )));
            }
            let mut run = ScoreRun::build(params, snapshot.queries, store, snapshot.nb_reads_processed);
            run.resumed = true;
            // best score record restarts from histograms
            let best = run.queries.max_score();
            run.aligner.set_best_score(best);
            log::info!(
                "resuming after {} reads, best score so far : {}",
                run.nb_processed,
                best
            );
            Ok(run)
        } else {
            log::info!("no checkpoint at {:?}, fresh start", store.get_path());
            let queries = QuerySet::from_table(&params.query_file, params.delimiter)?;
            Ok(ScoreRun::build(params, queries, store, 0))
        }
    } // end of new

    /// a fresh run on queries already loaded, the query table is not read.
    /// An existing checkpoint would be overwritten at first dump.
    pub fn with_queries(params: RunParams, queries: QuerySet) -> Self {
        let store = ProgressStore::new(&params.progress_file);
        ScoreRun::build(params, queries, store, 0)
    }

    fn build(params: RunParams, queries: QuerySet, store: ProgressStore, nb_processed: u64) -> Self {
        let aligner = WindowAligner::new(params.scoring);
        let interval = params.checkpoint_interval(queries.total_len());
        log::info!(
            "nb queries : {}, total query length : {}, checkpoint every {} reads",
            queries.len(),
            queries.total_len(),
            interval
        );
        ScoreRun {
            params,
            queries,
            aligner,
            store,
            resumed: false,
            nb_processed,
            interval,
            start_t: SystemTime::now(),
            cpu_start: ProcessTime::now(),
        }
    } // end of build

    pub fn is_resumed(&self) -> bool {
        self.resumed
    }

    pub fn get_queries(&self) -> &QuerySet {
        &self.queries
    }

    pub fn get_aligner(&self) -> &WindowAligner {
        &self.aligner
    }

    /// switch on/off log of new best alignments
    pub fn set_trace(&mut self, trace: bool) {
        self.aligner.set_trace(trace);
    }

    pub fn get_nb_processed(&self) -> u64 {
        self.nb_processed
    }

    pub fn get_interval(&self) -> u64 {
        self.interval
    }

    /// scores one read against every query
    pub fn score_read(&mut self, read: &ReadRecord) -> Result<()> {
        if read.seq.is_empty() {
            return Err(ScoreError::EmptySequence(format!(
                "read {} (rank {})",
                read.id, self.nb_processed
            )));
        }
        for query in self.queries.iter_mut() {
            let score = self.aligner.score(&read.seq, query.get_seq().as_bytes())?;
            query.record(score);
        }
        self.nb_processed += 1;
        Ok(())
    } // end of score_read

    /// progress line, histogram table, then dump. The interval is recomputed from current queries.
    pub fn checkpoint<W: Write>(&mut self, out: &mut W) -> Result<()> {
        let elapsed = self.start_t.elapsed().map(|d| d.as_secs_f64()).unwrap_or(0.);
        writeln!(
            out,
            "\n{} reads checked in {:.0} seconds ({})",
            self.nb_processed,
            elapsed,
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        )?;
        log::debug!(
            "nb reads : {}, cpu time (s) : {:.1}",
            self.nb_processed,
            self.cpu_start.elapsed().as_secs_f64()
        );
        crate::report::render_histograms(&self.queries, out)?;
        out.flush()?;
        self.store.save(&self.queries, self.nb_processed, &self.params.scoring)?;
        self.interval = self.params.checkpoint_interval(self.queries.total_len());
        Ok(())
    } // end of checkpoint

    /// scores all reads of source not yet scored. Returns nb of reads scored in this call.
    /// A source at its beginning is advanced past the reads of previous runs.
    pub fn run<S: SequenceSource, W: Write>(&mut self, source: &mut S, out: &mut W) -> Result<u64> {
        let position = source.position();
        if position > self.nb_processed {
            return Err(ScoreError::Config(format!(
                "source is at read {} but only {} reads were scored",
                position, self.nb_processed
            )));
        }
        source.skip_reads(self.nb_processed - position)?;
        //
        let first = self.nb_processed;
        while let Some(read) = source.next_read()? {
            self.score_read(&read)?;
            if self.nb_processed % self.interval == 0 {
                self.checkpoint(out)?;
            }
        }
        self.checkpoint(out)?;
        //
        let nb_done = self.nb_processed - first;
        log::info!(
            "end of input, scored {} reads in this run, {} in total, sys time(s) {:.1}",
            nb_done,
            self.nb_processed,
            self.start_t.elapsed().map(|d| d.as_secs_f64()).unwrap_or(0.)
        );
        Ok(nb_done)
    } // end of run
} // end of impl ScoreRun

/// the whole job : queries (or checkpoint), fasta files of params.read_dir, scoring loop
pub fn run_dir<W: Write>(params: RunParams, out: &mut W) -> Result<u64> {
    let files = collect_fasta_files(&params.read_dir, &params.selection)?;
    let mut run = ScoreRun::new(params)?;
    let mut source = FastaSource::new(files);
    run.run(&mut source, out)
} // end of run_dir

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dna::queries::Query;
    use crate::dna::readsource::MemorySource;

    fn params_in(dir: &std::path::Path) -> RunParams {
        RunParams {
            progress_file: dir.join("progress.json"),
            query_file: dir.join("query_sequences.csv"),
            read_dir: dir.to_path_buf(),
            ..RunParams::default()
        }
    }

    fn quiet(mut run: ScoreRun) -> ScoreRun {
        run.set_trace(false);
        run
    }

    #[test]
    fn single_read_example() {
        let dir = tempfile::tempdir().unwrap();
        let queries = QuerySet::new(vec![Query::new("Q1", "ATCGATCG")]).unwrap();
        let mut run = quiet(ScoreRun::with_queries(params_in(dir.path()), queries));
        let mut source = MemorySource::from_seqs(&["ATCGATCGATCGATCG"]);
        let mut out = Vec::<u8>::new();
        assert_eq!(run.run(&mut source, &mut out).unwrap(), 1);
        let hist = run.get_queries().get_queries()[0].get_histogram();
        assert_eq!(hist.len(), 1);
        assert_eq!(hist.get(&8), Some(&1));
        assert_eq!(run.get_aligner().get_best_score(), 8);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("1 reads checked in"));
    }

    #[test]
    fn histograms_total_nb_reads() {
        let dir = tempfile::tempdir().unwrap();
        let queries = QuerySet::new(vec![Query::new("a", "ACGTAC"), Query::new("b", "GGT")]).unwrap();
        let mut params = params_in(dir.path());
        params.work_per_checkpoint = 20;
        let mut run = quiet(ScoreRun::with_queries(params, queries));
        assert_eq!(run.get_interval(), 2);
        let reads = ["ACGTACGGT", "TTTT", "GGTACGTACCC", "A", "CCCGGGTTTAAA"];
        let mut source = MemorySource::from_seqs(&reads);
        run.run(&mut source, &mut std::io::sink()).unwrap();
        for q in run.get_queries().get_queries() {
            assert_eq!(q.nb_scored(), reads.len() as u64);
        }
        let reloaded = ProgressStore::new(&dir.path().join("progress.json")).load().unwrap();
        assert_eq!(reloaded.nb_reads_processed, 5);
        assert_eq!(&reloaded.queries, run.get_queries());
    }

    #[test]
    fn empty_read_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let queries = QuerySet::new(vec![Query::new("a", "ACGT")]).unwrap();
        let mut run = quiet(ScoreRun::with_queries(params_in(dir.path()), queries));
        let mut source = MemorySource::from_seqs(&["ACGT", ""]);
        let res = run.run(&mut source, &mut std::io::sink());
        assert!(matches!(res, Err(ScoreError::EmptySequence(_))));
    }

    #[test]
    fn resume_with_other_scoring_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let params = params_in(dir.path());
        let queries = QuerySet::new(vec![Query::new("a", "ACGT")]).unwrap();
        ProgressStore::new(&params.progress_file)
            .save(&queries, 0, &params.scoring)
            .unwrap();
        let mut other = params.clone();
        other.scoring.match_score = 2;
        assert!(matches!(ScoreRun::new(other), Err(ScoreError::Config(_))));
        assert!(ScoreRun::new(params).unwrap().is_resumed());
    }

    #[test]
    fn source_ahead_of_checkpoint_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let queries = QuerySet::new(vec![Query::new("a", "ACGT")]).unwrap();
        let mut run = quiet(ScoreRun::with_queries(params_in(dir.path()), queries));
        let mut source = MemorySource::from_seqs(&["ACGT", "ACGT"]);
        source.skip_reads(1).unwrap();
        assert!(matches!(
            run.run(&mut source, &mut std::io::sink()),
            Err(ScoreError::Config(_))
        ));
    }
}
