//! Hash stream destinations.
//!
//! A [`HashSink`] accepts ordered text lines — one fingerprint per line —
//! and flushes them on [`finish`](HashSink::finish). [`FileSink`] writes to
//! a buffered file; [`StdoutSink`] streams to standard output for piping
//! into downstream tools.

use std::fs::File;
use std::io::{BufWriter, Stdout, Write, stdout};
use std::path::{Path, PathBuf};

use crate::error::VhashError;

/// Destination for the line-oriented hash stream.
///
/// The contract is minimal: append a line, flush on finish. Each line is
/// written independently of every other line.
pub trait HashSink {
    /// Append `line` followed by a newline.
    fn write_line(&mut self, line: &str) -> Result<(), VhashError>;

    /// Flush buffered output. Called once at the end of a run, on both the
    /// success and the error path.
    fn finish(&mut self) -> Result<(), VhashError>;
}

impl<K: HashSink + ?Sized> HashSink for Box<K> {
    fn write_line(&mut self, line: &str) -> Result<(), VhashError> {
        (**self).write_line(line)
    }

    fn finish(&mut self) -> Result<(), VhashError> {
        (**self).finish()
    }
}

/// Buffered file sink.
///
/// # Example
///
/// ```no_run
/// use vhash::{FileSink, HashSink};
///
/// let mut sink = FileSink::create("hashes.txt")?;
/// sink.write_line("0f0f0f0f0f0f0f0f")?;
/// sink.finish()?;
/// # Ok::<(), vhash::VhashError>(())
/// ```
pub struct FileSink {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl FileSink {
    /// Create (or truncate) the destination file.
    ///
    /// # Errors
    ///
    /// Returns [`VhashError::SinkOpen`] if the file cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, VhashError> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|error| VhashError::SinkOpen {
            path: path.clone(),
            reason: error.to_string(),
        })?;
        Ok(Self {
            writer: BufWriter::new(file),
            path,
        })
    }

    /// Path of the destination file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HashSink for FileSink {
    fn write_line(&mut self, line: &str) -> Result<(), VhashError> {
        writeln!(self.writer, "{line}")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), VhashError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Sink that streams hash lines to standard output.
pub struct StdoutSink {
    writer: Stdout,
}

impl StdoutSink {
    /// Create a sink over the process's standard output.
    pub fn new() -> Self {
        Self { writer: stdout() }
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

impl HashSink for StdoutSink {
    fn write_line(&mut self, line: &str) -> Result<(), VhashError> {
        writeln!(self.writer, "{line}")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), VhashError> {
        self.writer.flush()?;
        Ok(())
    }
}
