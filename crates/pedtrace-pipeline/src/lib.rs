//! `pedtrace-pipeline` – the per-frame transformation core.
//!
//! Turns raw world-frame tracking observations into the normalized,
//! augmented, frame-indexed rows the dataset format requires.
//!
//! # Modules
//!
//! - [`normalize`] – [`Extents`][normalize::Extents]: maps world-frame
//!   coordinates into an approximately `[-1, 1]` range.
//! - [`flip`] – [`FlipProfile`][flip::FlipProfile]: one of four fixed
//!   geometric augmentations applied uniformly to every ego row of a run.
//! - [`zone`] – [`LocalZone`][zone::LocalZone]: box-shaped catchment area
//!   around the robot deciding which neighbors are worth recording.
//! - [`frame`] – [`FrameProcessor`][frame::FrameProcessor]: orchestrates one
//!   observation batch end to end (ego extraction, goal gating, velocity
//!   correction, neighbor filtering, frame indexing, row emission).

pub mod flip;
pub mod frame;
pub mod normalize;
pub mod zone;

pub use flip::{EgoState, FlipProfile};
pub use frame::FrameProcessor;
pub use normalize::{Extents, normalize};
pub use zone::LocalZone;
