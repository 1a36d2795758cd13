//! File-backed log sink.
//!
//! A [`FileLog`] creates its file the first time it is enabled:
//!
//! ```text
//! <output_dir>/<LOGGER_NAME>_<YYYYmmdd_HHMMSS>.log
//! ```
//!
//! The header block is written once as `#`-prefixed lines, followed by one
//! comma-separated row per logged record. Disabling the sink flushes and
//! closes the file; enabling it again starts a new file.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write as _};
use std::path::{Path, PathBuf};

use aerolog_types::{Field, LogKind};
use tracing::{debug, info, warn};

use crate::error::SinkError;
use crate::sink::{LogSink, format_row};

/// A log sink appending rows to a file on disk.
#[derive(Debug)]
pub struct FileLog {
    kind: LogKind,
    output_dir: PathBuf,
    writer: Option<BufWriter<File>>,
    path: Option<PathBuf>,
    rows: u64,
}

impl FileLog {
    /// Create a disabled file log that will write into `output_dir`.
    pub fn new(kind: LogKind, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            output_dir: output_dir.into(),
            writer: None,
            path: None,
            rows: 0,
        }
    }

    /// Path of the most recently opened file, if the sink was ever enabled.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of rows written since the sink was created.
    pub const fn rows_written(&self) -> u64 {
        self.rows
    }

    fn open(&mut self) -> Result<(), SinkError> {
        std::fs::create_dir_all(&self.output_dir).map_err(|source| SinkError::CreateDir {
            path: self.output_dir.clone(),
            source,
        })?;

        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let path = self
            .output_dir
            .join(format!("{}_{stamp}.log", self.kind.name()));

        // Re-enabling within the same second reuses the file instead of
        // truncating it.
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| SinkError::Open {
                path: path.clone(),
                source,
            })?;
        let is_new = file.metadata().map(|m| m.len() == 0).unwrap_or(true);

        let mut writer = BufWriter::new(file);
        if is_new {
            for line in self.kind.header().lines() {
                writeln!(writer, "# {line}").map_err(|source| self.write_error(source))?;
            }
        }

        info!(logger = self.kind.name(), path = %path.display(), "Log file opened");
        self.writer = Some(writer);
        self.path = Some(path);
        Ok(())
    }

    fn write_error(&self, source: std::io::Error) -> SinkError {
        SinkError::Write {
            logger: self.kind.name(),
            source,
        }
    }
}

impl LogSink for FileLog {
    fn kind(&self) -> LogKind {
        self.kind
    }

    fn is_enabled(&self) -> bool {
        self.writer.is_some()
    }

    fn set_enabled(&mut self, enabled: bool) -> Result<(), SinkError> {
        match (enabled, self.writer.is_some()) {
            (true, false) => self.open(),
            (false, true) => {
                self.flush()?;
                self.writer = None;
                debug!(logger = self.kind.name(), "Log file closed");
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn write_row(&mut self, sim_time: f64, fields: &[Field]) -> Result<bool, SinkError> {
        let Some(writer) = self.writer.as_mut() else {
            return Ok(false);
        };
        let row = format_row(sim_time, fields);
        if let Err(source) = writeln!(writer, "{row}") {
            return Err(self.write_error(source));
        }
        self.rows = self.rows.saturating_add(1);
        Ok(true)
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        let Some(writer) = self.writer.as_mut() else {
            return Ok(());
        };
        if let Err(source) = writer.flush() {
            return Err(self.write_error(source));
        }
        Ok(())
    }
}

impl Drop for FileLog {
    fn drop(&mut self) {
        if let Err(err) = self.flush() {
            warn!(logger = self.kind.name(), %err, "Failed to flush log on drop");
        }
    }
}
