//! Incremental persistence of coupling records.
//!
//! The destination is opened on the first write (truncating any previous
//! file) and written one record at a time; nothing is buffered beyond the
//! underlying writer. A sink has a single owner and is not shared.
use crate::error::PersistenceError;
use crate::record::{CouplingRecord, COUPLING_RECORD_COLUMNS};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Output encoding, fixed when the sink is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    /// Comma-separated values with a header row.
    Csv,
    /// One JSON object per line (`.jsonl`).
    JsonLines,
}

impl RecordFormat {
    /// A destination whose name ends in `csv` (case-sensitive) gets CSV;
    /// everything else gets JSON lines.
    pub fn for_path(path: &Path) -> Self {
        if path.to_string_lossy().ends_with("csv") {
            RecordFormat::Csv
        } else {
            RecordFormat::JsonLines
        }
    }
}

enum FormatWriter {
    Csv(csv::Writer<BufWriter<File>>),
    JsonLines(BufWriter<File>),
}

/// Append-only writer for coupling records.
///
/// `close` consumes the sink, so writing after close does not compile.
pub struct RecordSink {
    path: PathBuf,
    format: RecordFormat,
    /// `None` until the first write opens the destination.
    writer: Option<FormatWriter>,
    written: usize,
}

impl RecordSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = RecordFormat::for_path(&path);
        Self {
            path,
            format,
            writer: None,
            written: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> RecordFormat {
        self.format
    }

    pub fn records_written(&self) -> usize {
        self.written
    }

    /// Append one record, opening the destination on the first call.
    pub fn write(&mut self, record: &CouplingRecord) -> Result<(), PersistenceError> {
        let writer = match &mut self.writer {
            Some(writer) => writer,
            slot @ None => slot.insert(open_writer(&self.path, self.format)?),
        };
        match writer {
            FormatWriter::Csv(writer) => {
                writer
                    .serialize(record)
                    .map_err(|source| PersistenceError::Csv {
                        path: self.path.clone(),
                        source,
                    })?;
            }
            FormatWriter::JsonLines(writer) => {
                serde_json::to_writer(&mut *writer, record).map_err(|source| {
                    PersistenceError::Encode {
                        path: self.path.clone(),
                        source,
                    }
                })?;
                writer
                    .write_all(b"\n")
                    .map_err(|source| PersistenceError::Write {
                        path: self.path.clone(),
                        source,
                    })?;
            }
        }
        self.written += 1;
        Ok(())
    }

    /// Flush and release the destination.
    ///
    /// Returns `false` when nothing was ever written, in which case no file
    /// was created.
    pub fn close(self) -> Result<bool, PersistenceError> {
        let path = self.path;
        let Some(writer) = self.writer else {
            return Ok(false);
        };
        let close_err = |source| PersistenceError::Close {
            path: path.clone(),
            source,
        };
        let mut file = match writer {
            FormatWriter::Csv(writer) => writer
                .into_inner()
                .map_err(|err| close_err(err.into_error()))?,
            FormatWriter::JsonLines(writer) => writer,
        };
        file.flush().map_err(close_err)?;
        tracing::debug!(path = %path.display(), records = self.written, "closed record sink");
        Ok(true)
    }
}

fn open_writer(path: &Path, format: RecordFormat) -> Result<FormatWriter, PersistenceError> {
    let open_err = |source| PersistenceError::Open {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(open_err)?;
    }
    let file = File::create(path).map_err(open_err)?;
    let buffered = BufWriter::new(file);
    tracing::debug!(path = %path.display(), format = ?format, "opened record sink");
    match format {
        RecordFormat::JsonLines => Ok(FormatWriter::JsonLines(buffered)),
        RecordFormat::Csv => {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(buffered);
            writer
                .write_record(COUPLING_RECORD_COLUMNS)
                .map_err(|source| PersistenceError::Csv {
                    path: path.to_path_buf(),
                    source,
                })?;
            Ok(FormatWriter::Csv(writer))
        }
    }
}

#[cfg(test)]
#[path = "sink_tests.rs"]
mod tests;
