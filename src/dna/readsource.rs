//! Sources of reads.
//!
//! A source is a forward only stream of reads. Resuming after a checkpoint
//! is done by reopening the source and skipping the reads already scored.

use std::collections::VecDeque;
use std::path::PathBuf;

use needletail::errors::ParseErrorKind;
use needletail::FastxReader;

use crate::errors::{Result, ScoreError};

/// a read : its fasta id and its sequence as found in file
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReadRecord {
    pub id: String,
    pub seq: Vec<u8>,
}

impl ReadRecord {
    pub fn new(id: &str, seq: &[u8]) -> Self {
        ReadRecord {
            id: id.to_string(),
            seq: seq.to_vec(),
        }
    }
}

/// A forward only stream of reads.
pub trait SequenceSource {
    /// next read, None at end of stream
    fn next_read(&mut self) -> Result<Option<ReadRecord>>;

    /// nb of reads delivered (or skipped) since the beginning of stream
    fn position(&self) -> u64;

    /// consume and drop nb reads. Fails if the stream ends before.
    fn skip_reads(&mut self, nb: u64) -> Result<()> {
        log::info!("skipping {} reads", nb);
        for _ in 0..nb {
            if self.next_read()?.is_none() {
                return Err(ScoreError::ShortInput {
                    expected: nb,
                    found: self.position(),
                });
            }
        }
        Ok(())
    } // end of skip_reads
}

//==========================================================================

/// Reads of a list of fasta files (possibly gzipped), file after file, record after record.
pub struct FastaSource {
    files: Vec<PathBuf>,
    /// rank of next file to open
    next_file: usize,
    current: Option<(PathBuf, Box<dyn FastxReader>)>,
    /// rank of record in current file
    record_in_file: u64,
    nb_read: u64,
}

impl FastaSource {
    /// no file is opened before the first read is asked for
    pub fn new(files: Vec<PathBuf>) -> Self {
        FastaSource {
            files,
            next_file: 0,
            current: None,
            record_in_file: 0,
            nb_read: 0,
        }
    }

    /// a new source on the same files, positioned on the first read
    pub fn reopen(&self) -> Self {
        FastaSource::new(self.files.clone())
    }

    /// a new source positioned after nb reads
    pub fn open_at(files: Vec<PathBuf>, nb: u64) -> Result<Self> {
        let mut source = FastaSource::new(files);
        source.skip_reads(nb)?;
        Ok(source)
    }

    pub fn get_files(&self) -> &[PathBuf] {
        &self.files
    }

    // opens next file, returns false when all files are done
    fn open_next_file(&mut self) -> Result<bool> {
        while self.next_file < self.files.len() {
            let path = self.files[self.next_file].clone();
            self.next_file += 1;
            log::debug!("opening {:?}", path);
            match needletail::parse_fastx_file(&path) {
                Ok(reader) => {
                    self.current = Some((path, reader));
                    self.record_in_file = 0;
                    return Ok(true);
                }
                Err(e) if matches!(e.kind, ParseErrorKind::EmptyFile) => {
                    log::warn!("empty file {:?}, no read", path);
                }
                Err(e) if matches!(e.kind, ParseErrorKind::Io) => {
                    return Err(ScoreError::Io(std::io::Error::new(
                        std::io::ErrorKind::Other,
                        format!("cannot open {:?} : {}", path, e),
                    )));
                }
                Err(e) => {
                    return Err(ScoreError::Fasta {
                        path,
                        record: 0,
                        msg: e.to_string(),
                    });
                }
            }
        }
        Ok(false)
    } // end of open_next_file
} // end of impl FastaSource

impl SequenceSource for FastaSource {
    fn next_read(&mut self) -> Result<Option<ReadRecord>> {
        loop {
            if self.current.is_none() && !self.open_next_file()? {
                return Ok(None);
            }
            if let Some((path, reader)) = self.current.as_mut() {
                match reader.next() {
                    Some(Ok(seqrec)) => {
                        let read = ReadRecord {
                            id: String::from_utf8_lossy(seqrec.id()).into_owned(),
                            seq: seqrec.seq().into_owned(),
                        };
                        self.record_in_file += 1;
                        self.nb_read += 1;
                        return Ok(Some(read));
                    }
                    Some(Err(e)) => {
                        log::error!("got bad record in file {:?}", path);
                        return Err(ScoreError::Fasta {
                            path: path.clone(),
                            record: self.record_in_file,
                            msg: e.to_string(),
                        });
                    }
                    None => {
                        log::debug!("end of {:?}, nb records {}", path, self.record_in_file);
                        self.current = None;
                    }
                }
            }
        }
    } // end of next_read

    fn position(&self) -> u64 {
        self.nb_read
    }
} // end of impl SequenceSource for FastaSource

//==========================================================================

/// Reads held in memory
pub struct MemorySource {
    reads: VecDeque<ReadRecord>,
    nb_read: u64,
}

impl MemorySource {
    pub fn new(reads: Vec<ReadRecord>) -> Self {
        MemorySource {
            reads: reads.into(),
            nb_read: 0,
        }
    }

    /// reads given as bare sequences, ids are their rank
    pub fn from_seqs<S: AsRef<[u8]>>(seqs: &[S]) -> Self {
        let reads = seqs
            .iter()
            .enumerate()
            .map(|(i, s)| ReadRecord::new(&format!("read_{}", i), s.as_ref()))
            .collect();
        MemorySource::new(reads)
    }
}

impl SequenceSource for MemorySource {
    fn next_read(&mut self) -> Result<Option<ReadRecord>> {
        let read = self.reads.pop_front();
        if read.is_some() {
            self.nb_read += 1;
        }
        Ok(read)
    }

    fn position(&self) -> u64 {
        self.nb_read
    }
}
