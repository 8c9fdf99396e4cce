//! Per-step progress records and the sinks that consume them.

use crate::errors::Result;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Wall-clock time of one engine advance, attributed to its step index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    /// `steps * outer_index + inner_index`
    pub global_step_index: u64,
    pub elapsed_seconds: f64,
}

/// Receives progress records in step order.
pub trait ProgressSink {
    fn record(&mut self, record: &ProgressRecord) -> Result<()>;

    /// Called once after the last record.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

impl ProgressSink for Vec<ProgressRecord> {
    fn record(&mut self, record: &ProgressRecord) -> Result<()> {
        self.push(*record);
        Ok(())
    }
}

impl<S: ProgressSink + ?Sized> ProgressSink for &mut S {
    fn record(&mut self, record: &ProgressRecord) -> Result<()> {
        (**self).record(record)
    }

    fn finish(&mut self) -> Result<()> {
        (**self).finish()
    }
}

impl<A: ProgressSink, B: ProgressSink> ProgressSink for (A, B) {
    fn record(&mut self, record: &ProgressRecord) -> Result<()> {
        self.0.record(record)?;
        self.1.record(record)
    }

    fn finish(&mut self) -> Result<()> {
        self.0.finish()?;
        self.1.finish()
    }
}

impl<S: ProgressSink> ProgressSink for Option<S> {
    fn record(&mut self, record: &ProgressRecord) -> Result<()> {
        match self {
            Some(sink) => sink.record(record),
            None => Ok(()),
        }
    }

    fn finish(&mut self) -> Result<()> {
        match self {
            Some(sink) => sink.finish(),
            None => Ok(()),
        }
    }
}

/// Logs every step at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgressSink;

impl ProgressSink for LogProgressSink {
    fn record(&mut self, record: &ProgressRecord) -> Result<()> {
        log::info!(
            "[step {}] Complete cycle in: {:.3}s",
            record.global_step_index,
            record.elapsed_seconds
        );
        Ok(())
    }
}

/// Appends one JSON object per record to a JSONL file.
pub struct JsonlProgressWriter {
    writer: BufWriter<File>,
}

impl JsonlProgressWriter {
    /// Opens `path` for appending, creating it if needed.
    pub fn append(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl ProgressSink for JsonlProgressWriter {
    fn record(&mut self, record: &ProgressRecord) -> Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
