//! `pedtrace-runtime` – the collection engine.
//!
//! # Modules
//!
//! - [`recorder`] – [`Recorder`][recorder::Recorder]: the single-task
//!   collection loop. Selects over the bus lanes (observation batches, goal
//!   updates) and a periodic wake used only to check the row-count
//!   termination threshold, then performs the one-shot transpose handoff
//!   once the sink is flushed and closed.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: initialises
//!   the global `tracing` subscriber (env-filter, optional JSON output).

pub mod recorder;
pub mod telemetry;

pub use recorder::{Recorder, RecorderConfig, RecorderError, RecorderReport};
pub use telemetry::init_tracing;
