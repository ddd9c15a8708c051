//! Rollout recording.
//!
//! One [`StepRecord`] per environment step, written as JSON lines.
//! Observations are deliberately left out: at image sizes they dwarf
//! everything else, and the replayable part of a run is the action
//! outcome, not the pixels.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Outcome of a single environment step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub episode: u32,
    pub step: u32,
    pub reward: f32,
    pub terminated: bool,
    pub truncated: bool,
    /// Primitive executed this step, in primitive mode.
    pub primitive: Option<String>,
}

/// Appends step records to a JSONL file.
pub struct EpisodeRecorder {
    writer: BufWriter<File>,
    records: u64,
}

impl EpisodeRecorder {
    /// Create (or truncate) the record file.
    pub fn create(path: &Path) -> io::Result<Self> {
        Ok(Self {
            writer: BufWriter::new(File::create(path)?),
            records: 0,
        })
    }

    /// Append one record as a JSON line.
    pub fn record(&mut self, record: &StepRecord) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.records += 1;
        Ok(())
    }

    /// Number of records written so far.
    #[must_use]
    pub const fn records(&self) -> u64 {
        self.records
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
