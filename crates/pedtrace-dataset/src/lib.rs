//! `pedtrace-dataset` – persistence for the recorded dataset.
//!
//! Two sequential stages with a hard handoff:
//!
//! - [`writer`] – [`DatasetWriter`][writer::DatasetWriter]: append-only
//!   buffered CSV sink collecting frame-major rows during the run.
//! - [`transpose`] – [`transpose_dataset`][transpose::transpose_dataset]:
//!   one-shot post-collection pass reshaping the closed frame-major file
//!   into the wide per-agent layout downstream trainers index.
//!
//! The handoff is enforced at the type level:
//! [`DatasetWriter::finish`][writer::DatasetWriter::finish] consumes the
//! writer, flushes, and returns the path that the transposer accepts.

use thiserror::Error;

pub mod transpose;
pub mod writer;

pub use transpose::transpose_dataset;
pub use writer::{DatasetWriter, dataset_path};

/// Errors arising from dataset persistence.
#[derive(Error, Debug)]
pub enum DatasetError {
    /// The sink could not be created, written, or flushed. Fatal for the
    /// run; there is no partial-write recovery.
    #[error("dataset I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A record in the completed frame-major file had a different field
    /// count than the first record. Surfaced to the operator; the input
    /// file is left untouched.
    #[error("inconsistent record width at line {line}: expected {expected} fields, found {found}")]
    InconsistentWidth {
        line: usize,
        expected: usize,
        found: usize,
    },
}
