//! Append-only CSV sink for frame-major dataset rows.
//!
//! # Record layout
//!
//! One comma-separated, newline-terminated record per agent per accepted
//! batch, in a fixed column order:
//!
//! | column | content |
//! |---|---|
//! | 1 | frame index (shared by all rows of a batch) |
//! | 2 | agent id, 1-based |
//! | 3–4 | normalized position, y then x |
//! | 5–6 | velocity x, y |
//! | 7–8 | quaternion z, w |
//! | 9–10 | goal x, y (ego rows only; neighbors carry 0, 0) |
//!
//! Write order equals emission order; records are never rewritten. The file
//! name encodes the configured target size and flip index, e.g.
//! `pedsim_pos_1002.csv` for 100 rows under flip profile 2.
//!
//! # Example
//!
//! ```rust,no_run
//! use pedtrace_dataset::DatasetWriter;
//! use pedtrace_types::DatasetRow;
//!
//! let mut writer = DatasetWriter::create("pedsim_pos", 100, 1).unwrap();
//! writer.append(&DatasetRow {
//!     frame_index: 0, agent_id: 1,
//!     pos_y: -0.8, pos_x: -0.8,
//!     vel_x: 0.4, vel_y: 0.0,
//!     quat_z: 0.0, quat_w: 1.0,
//!     goal_x: -0.8, goal_y: -0.8,
//! }).unwrap();
//! let path = writer.finish().unwrap();
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use pedtrace_types::DatasetRow;
use tracing::info;

use crate::DatasetError;

/// Build the sink path from the configured prefix, target row count, and
/// flip index: `<prefix>_<size><flip>.csv`.
pub fn dataset_path(prefix: &str, size: u64, flip_index: u8) -> PathBuf {
    PathBuf::from(format!("{prefix}_{size}{flip_index}.csv"))
}

/// Append-only writer over a buffered file sink.
///
/// Opened once at startup, closed exactly once via [`DatasetWriter::finish`]
/// (or on drop, which flushes through [`BufWriter`]'s own drop). An
/// unwritable sink is fatal for the run.
#[derive(Debug)]
pub struct DatasetWriter {
    sink: BufWriter<File>,
    path: PathBuf,
    rows_written: u64,
}

impl DatasetWriter {
    /// Create (truncating) the sink at the path derived from `prefix`,
    /// `size`, and `flip_index`.
    pub fn create(prefix: &str, size: u64, flip_index: u8) -> Result<Self, DatasetError> {
        Self::create_at(dataset_path(prefix, size, flip_index))
    }

    /// Create (truncating) the sink at an explicit path.
    pub fn create_at(path: PathBuf) -> Result<Self, DatasetError> {
        let file = File::create(&path)?;
        info!(path = %path.display(), "dataset sink opened");
        Ok(Self {
            sink: BufWriter::new(file),
            path,
            rows_written: 0,
        })
    }

    /// Append one row as a single delimited record.
    pub fn append(&mut self, row: &DatasetRow) -> Result<(), DatasetError> {
        writeln!(
            self.sink,
            "{},{},{},{},{},{},{},{},{},{}",
            row.frame_index,
            row.agent_id,
            row.pos_y,
            row.pos_x,
            row.vel_x,
            row.vel_y,
            row.quat_z,
            row.quat_w,
            row.goal_x,
            row.goal_y,
        )?;
        self.rows_written += 1;
        Ok(())
    }

    /// Rows appended so far.
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// The sink path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush and close the sink, returning the path for the transpose stage.
    ///
    /// Consumes the writer so no row can be appended after the handoff.
    pub fn finish(mut self) -> Result<PathBuf, DatasetError> {
        self.sink.flush()?;
        info!(
            path = %self.path.display(),
            rows = self.rows_written,
            "dataset sink closed"
        );
        Ok(self.path)
    }
}
