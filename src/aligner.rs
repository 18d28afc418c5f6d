//! Windowed local similarity between a short sequence and a long one.
//!
//! The shorter sequence is the pattern. The longer one is scanned by strides of the pattern length,
//! and at each stride the pattern is locally aligned (Smith-Waterman) against a window of twice the
//! pattern length, so that windows overlap by one stride and an alignment straddling a stride boundary
//! is not missed. The score of the pair is the best window score.

use bio::alignment::pairwise::{Aligner, MatchParams, Scoring};

use crate::errors::{Result, ScoreError};
use crate::utils::parameters::ScoringParams;

/// width of alignment trace lines
const TRACE_WIDTH: usize = 100;

pub struct WindowAligner {
    params: ScoringParams,
    aligner: Aligner<MatchParams>,
    /// best score seen since creation (or since set_best_score)
    best_score: u32,
    /// do we log the alignment each time best_score grows
    trace: bool,
}

impl WindowAligner {
    pub fn new(params: ScoringParams) -> Self {
        let scoring = Scoring::from_scores(
            params.gap_open,
            params.gap_extend,
            params.match_score,
            params.mismatch_score,
        );
        WindowAligner {
            params,
            aligner: Aligner::with_scoring(scoring),
            best_score: 0,
            trace: true,
        }
    }

    pub fn get_params(&self) -> &ScoringParams {
        &self.params
    }

    /// switch on/off the log of new best alignments
    pub fn set_trace(&mut self, trace: bool) {
        self.trace = trace;
    }

    pub fn get_best_score(&self) -> u32 {
        self.best_score
    }

    /// restore the record when resuming. The record never decreases.
    pub fn set_best_score(&mut self, score: u32) {
        self.best_score = self.best_score.max(score);
    }

    /// local similarity of a and b. Argument order does not matter.
    pub fn score(&mut self, a: &[u8], b: &[u8]) -> Result<u32> {
        if a.is_empty() || b.is_empty() {
            return Err(ScoreError::EmptySequence(String::from(
                "cannot align an empty sequence",
            )));
        }
        // equal lengths : lexicographic order decides, so that the pair is always split the same way
        let (short, long) = if (a.len(), a) <= (b.len(), b) { (a, b) } else { (b, a) };
        let window_len = short.len();
        //
        let mut score: u32 = 0;
        for start in (0..long.len()).step_by(window_len) {
            let end = long.len().min(start + 2 * window_len);
            let window = &long[start..end];
            let alignment = self.aligner.local(short, window);
            // a local alignment score is never negative
            let new_score = alignment.score.max(0) as u32;
            if new_score > score {
                score = new_score;
                if score > self.best_score {
                    self.best_score = score;
                    if self.trace && log::log_enabled!(log::Level::Info) {
                        log::info!(
                            "new best alignment, score {} (window at {}) :\n{}",
                            score,
                            start,
                            alignment.pretty(short, window, TRACE_WIDTH)
                        );
                    }
                }
            }
        }
        log::trace!("score {} for lengths ({}, {})", score, short.len(), long.len());
        //
        Ok(score)
    } // end of score
} // end of impl WindowAligner

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn aligner() -> WindowAligner {
        let mut aligner = WindowAligner::new(ScoringParams::default());
        aligner.set_trace(false);
        aligner
    }

    #[test]
    fn exact_repeat() {
        let mut aligner = aligner();
        assert_eq!(aligner.score(b"ATCGATCGATCGATCG", b"ATCGATCG").unwrap(), 8);
        assert_eq!(aligner.get_best_score(), 8);
    }

    #[test]
    fn mismatch_scores_zero() {
        let mut aligner = aligner();
        // one substitution in the middle : 3 + 0 + 4 with +1/0 scoring
        assert_eq!(aligner.score(b"ACGTTACG", b"ACGAACGG").unwrap(), 7);
        assert_eq!(aligner.score(b"AAAA", b"CCCCCCCC").unwrap(), 0);
    }

    #[test]
    fn gap_costs_ten() {
        let mut aligner = aligner();
        // an insertion in the read would cost 10, cheaper to keep the longest ungapped part
        assert_eq!(aligner.score(b"ACGTACGTAC", b"ACGTAGGGGGGCGTAC").unwrap(), 6);
    }

    #[test]
    fn match_in_second_half_of_window() {
        let mut aligner = aligner();
        // pattern sits across the boundary between stride 0 and stride 1
        let read = b"TTTTTACGTATTTTTTTTTTTTTT";
        assert_eq!(aligner.score(b"ACGTA", read).unwrap(), 5);
    }

    #[test]
    fn empty_is_an_error() {
        let mut aligner = aligner();
        assert!(matches!(aligner.score(b"", b"ACGT"), Err(ScoreError::EmptySequence(_))));
        assert!(matches!(aligner.score(b"ACGT", b""), Err(ScoreError::EmptySequence(_))));
    }

    #[test]
    fn best_score_is_monotone() {
        let mut aligner = aligner();
        let pairs: [(&[u8], &[u8]); 4] = [
            (b"ACGT", b"ACGTACGT"),
            (b"AAAA", b"CCCC"),
            (b"ACGTACGTAA", b"ACGTACGTAA"),
            (b"ACG", b"TTACGTT"),
        ];
        let mut max_seen = 0;
        for (a, b) in pairs {
            let before = aligner.get_best_score();
            let s = aligner.score(a, b).unwrap();
            max_seen = max_seen.max(s);
            assert!(aligner.get_best_score() >= before);
            assert_eq!(aligner.get_best_score(), max_seen);
        }
        aligner.set_best_score(3);
        assert_eq!(aligner.get_best_score(), 10);
    }

    proptest! {
        #[test]
        fn score_is_symmetric(a in "[ACGT]{1,30}", b in "[ACGT]{1,60}") {
            let mut aligner = aligner();
            let ab = aligner.score(a.as_bytes(), b.as_bytes()).unwrap();
            let ba = aligner.score(b.as_bytes(), a.as_bytes()).unwrap();
            prop_assert_eq!(ab, ba);
            prop_assert!(ab as usize <= a.len().min(b.len()));
        }
    }
}
