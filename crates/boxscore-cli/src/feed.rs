//! Newline-delimited JSON feed reader.
//!
//! One tick per line. Blank lines are ignored; anything else that is not a
//! tick record is fatal, because the fold cannot skip a tick without
//! corrupting every later diff.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use boxscore_types::Tick;

/// Errors that can occur when reading the feed.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// The archive could not be opened.
    #[error("failed to open feed {}: {source}", path.display())]
    Open {
        /// Path of the archive.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A line could not be read.
    #[error("failed to read feed line {line}: {source}")]
    Read {
        /// 1-based line number.
        line: u64,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A line is not a valid tick record.
    #[error("invalid tick on feed line {line}: {source}")]
    Parse {
        /// 1-based line number.
        line: u64,
        /// The underlying JSON error.
        source: serde_json::Error,
    },
}

/// Iterator over the ticks of a newline-delimited JSON archive.
#[derive(Debug)]
pub struct FeedReader<R> {
    lines: Lines<R>,
    line: u64,
}

impl FeedReader<BufReader<File>> {
    /// Open the archive at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Open`] if the file cannot be opened.
    pub fn open(path: &Path) -> Result<Self, FeedError> {
        let file = File::open(path).map_err(|source| FeedError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> FeedReader<R> {
    /// Read ticks from any buffered reader.
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line: 0,
        }
    }

    /// Number of lines consumed so far.
    pub const fn lines_read(&self) -> u64 {
        self.line
    }
}

impl<R: BufRead> Iterator for FeedReader<R> {
    type Item = Result<Tick, FeedError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let next = self.lines.next()?;
            self.line = self.line.saturating_add(1);
            let line = self.line;

            let text = match next {
                Ok(text) => text,
                Err(source) => return Some(Err(FeedError::Read { line, source })),
            };
            if text.trim().is_empty() {
                continue;
            }
            return Some(
                serde_json::from_str(&text).map_err(|source| FeedError::Parse { line, source }),
            );
        }
    }
}
