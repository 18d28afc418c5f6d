//! This file contains directory exploration, fasta file selection and sequence cleaning

use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{Result, ScoreError};

/// a structure describing which files of a directory hold reads
#[derive(Clone, Debug)]
pub struct FileSelection {
    /// file name suffixes accepted, ".fas" by default
    pub suffixes: Vec<String>,
    /// do we descend into sub directories
    pub recursive: bool,
} // end of struct FileSelection

impl Default for FileSelection {
    fn default() -> Self {
        FileSelection {
            suffixes: vec![String::from(".fas")],
            recursive: false,
        }
    }
}

impl FileSelection {
    pub fn new(suffixes: Vec<String>, recursive: bool) -> Self {
        FileSelection {
            suffixes,
            recursive,
        }
    }

    /// returns true if file name ends with one of our suffixes
    pub fn is_fasta_file(&self, path: &Path) -> bool {
        match path.file_name().and_then(|f| f.to_str()) {
            Some(filename) => self.suffixes.iter().any(|s| filename.ends_with(s.as_str())),
            None => false,
        }
    }
} // end of impl FileSelection

/// scan directory (recursively if asked for) and collect fasta files.
/// The list is sorted so that a run and its resumption see files in the same order.
pub fn collect_fasta_files(dir: &Path, selection: &FileSelection) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(ScoreError::Config(format!("not a directory : {:?}", dir)));
    }
    let mut files = Vec::<PathBuf>::new();
    visit_dir(dir, selection, &mut files)?;
    files.sort();
    //
    if files.is_empty() {
        return Err(ScoreError::Config(format!(
            "no file with suffix {:?} in {:?}",
            selection.suffixes, dir
        )));
    }
    log::info!("found {} fasta files in {:?}", files.len(), dir);
    if log::log_enabled!(log::Level::Debug) {
        for f in &files {
            log::debug!("  {:?}", f);
        }
    }
    Ok(files)
} // end of collect_fasta_files

fn visit_dir(dir: &Path, selection: &FileSelection, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            if selection.recursive {
                visit_dir(&path, selection, files)?;
            }
        } else if selection.is_fasta_file(&path) {
            files.push(path);
        }
    }
    Ok(())
} // end of visit_dir

#[inline]
/// clones the sequence uppercasing it and filtering out non ATCG
pub fn filter_out_n(seq: &[u8]) -> Vec<u8> {
    let mut filtered = Vec::<u8>::with_capacity(seq.len());

    for c in seq {
        let ch_up = c.to_ascii_uppercase();
        if [b'A', b'C', b'T', b'G'].contains(&ch_up) {
            filtered.push(ch_up);
        }
    }

    if log::log_enabled!(log::Level::Trace) && filtered.len() < seq.len() {
        let nb_n = seq.len() - filtered.len();
        log::trace!(
            "filtered nb non ACTG {}, fraction  {:1.3e}",
            nb_n,
            nb_n as f32 / seq.len() as f32
        );
    }
    filtered
} // end of filter_out_n

/// string version of [filter_out_n], used for query ingestion
pub fn clean_sequence(seq: &str) -> String {
    // only ascii A,C,G,T survive, so this cannot fail
    filter_out_n(seq.as_bytes()).into_iter().map(char::from).collect()
}

//=======================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn clean_keeps_only_acgt() {
        assert_eq!(clean_sequence("acg-tN nATCGx"), "ACGTATCG");
        assert_eq!(clean_sequence(""), "");
        assert_eq!(clean_sequence("NNNN"), "");
    }

    #[test]
    fn selection_by_suffix() {
        let selection = FileSelection::new(vec![".fas".into(), ".fasta.gz".into()], false);
        assert!(selection.is_fasta_file(Path::new("/tmp/reads.fas")));
        assert!(selection.is_fasta_file(Path::new("reads.fasta.gz")));
        assert!(!selection.is_fasta_file(Path::new("reads.fasta")));
        assert!(!selection.is_fasta_file(Path::new("query_sequences.csv")));
    }

    #[test]
    fn collect_is_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.fas", "a.fas", "c.txt"] {
            fs::write(dir.path().join(name), ">r\nACGT\n").unwrap();
        }
        let sub = dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("d.fas"), ">r\nACGT\n").unwrap();
        //
        let flat = collect_fasta_files(dir.path(), &FileSelection::default()).unwrap();
        let names: Vec<_> = flat
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.fas", "b.fas"]);
        //
        let deep = collect_fasta_files(dir.path(), &FileSelection::new(vec![".fas".into()], true)).unwrap();
        assert_eq!(deep.len(), 3);
    }

    #[test]
    fn collect_without_match_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let res = collect_fasta_files(dir.path(), &FileSelection::default());
        assert!(matches!(res, Err(ScoreError::Config(_))));
    }

    proptest! {
        #[test]
        fn clean_is_idempotent(s in "\\PC*") {
            let once = clean_sequence(&s);
            prop_assert!(once.chars().all(|c| "ACGT".contains(c)));
            prop_assert_eq!(clean_sequence(&once), once);
        }
    }
}
