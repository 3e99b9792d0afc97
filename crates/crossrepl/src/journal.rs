//! Append-only state journal
//!
//! The journal is the only record of what a provisioning run may have
//! created. Each bucket record is appended once, before any remote call
//! touches it, as one JSON object per line. Teardown replays it.
//!
//! Single writer, single process: there is no locking.

use crate::error::{Error, Result};
use crate::record::BucketRecord;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default journal file name, relative to the working directory
pub const DEFAULT_JOURNAL_PATH: &str = "setup_state.json";

/// Lazy iterator over journal records in write order
pub type Records<'a> = Box<dyn Iterator<Item = Result<BucketRecord>> + 'a>;

/// Durable append-only log of bucket records.
pub trait Journal {
    /// Durably append one record.
    fn append(&self, record: &BucketRecord) -> Result<()>;

    /// Read every record in write order. Each call starts from the beginning.
    fn records(&self) -> Result<Records<'_>>;

    /// Whether a journal from an earlier run is present
    fn exists(&self) -> bool;

    /// Remove the journal once everything it lists has been cleaned up
    fn discard(&self) -> Result<()>;

    /// Where the journal lives, for logs and operator-facing errors
    fn path(&self) -> &Path;
}

/// Journal stored as newline-delimited JSON in a single file
#[derive(Debug, Clone)]
pub struct FileJournal {
    path: PathBuf,
}

impl FileJournal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn io_error(&self, source: std::io::Error) -> Error {
        Error::JournalIo {
            path: self.path.clone(),
            source,
        }
    }
}

impl Journal for FileJournal {
    fn append(&self, record: &BucketRecord) -> Result<()> {
        let mut line = serde_json::to_string(record)
            .map_err(|e| self.io_error(std::io::Error::from(e)))?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        file.write_all(line.as_bytes())
            .and_then(|()| file.sync_data())
            .map_err(|e| self.io_error(e))?;

        debug!(path = %self.path.display(), bucket = %record.name(), "Journaled bucket record");
        Ok(())
    }

    fn records(&self) -> Result<Records<'_>> {
        let file = File::open(&self.path).map_err(|e| self.io_error(e))?;
        let lines = BufReader::new(file).lines().enumerate();

        Ok(Box::new(lines.filter_map(move |(index, line)| {
            let line = match line {
                Ok(line) => line,
                Err(e) => return Some(Err(self.io_error(e))),
            };
            let line_text = line.trim_end_matches('\r');
            if line_text.trim().is_empty() {
                return None;
            }
            Some(
                serde_json::from_str(line_text).map_err(|source| Error::JournalCorrupt {
                    path: self.path.clone(),
                    line: index + 1,
                    source,
                }),
            )
        })))
    }

    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn discard(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "Removed journal");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}
