//! Replay of recorded traffic traces.
//!
//! A trace is a JSON-lines file with one [`TrafficFrame`] per line. Blank
//! lines and lines starting with `//` are skipped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use aerolog_core::runner::{FrameSource, SourceError};
use aerolog_types::TrafficFrame;
use tracing::info;

/// A [`FrameSource`] reading frames from a JSON-lines trace.
#[derive(Debug)]
pub struct ReplaySource<R> {
    reader: R,
    line: u64,
    buf: String,
}

impl ReplaySource<BufReader<File>> {
    /// Open a trace file.
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path)?;
        info!(path = %path.display(), "Replay trace opened");
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> ReplaySource<R> {
    /// Read frames from any buffered reader.
    pub const fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: String::new(),
        }
    }
}

impl<R: BufRead + Send> FrameSource for ReplaySource<R> {
    fn next_frame(&mut self) -> Result<Option<TrafficFrame>, SourceError> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line = self.line.saturating_add(1);

            let text = self.buf.trim();
            if text.is_empty() || text.starts_with("//") {
                continue;
            }
            let frame = serde_json::from_str(text).map_err(|source| SourceError::Decode {
                line: self.line,
                source,
            })?;
            return Ok(Some(frame));
        }
    }
}
