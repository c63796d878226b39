//! `pedtrace-middleware` – observation delivery.
//!
//! Routes tracking traffic from whatever produces it (a live tracker bridge,
//! a simulator) to the recorder without caring where it came from.
//!
//! # Modules
//!
//! - [`bus`] – [`TrackBus`][bus::TrackBus]: typed, lane-based
//!   publish/subscribe bus built on Tokio broadcast channels.
//! - [`source`] – [`ObservationSource`][source::ObservationSource]: the
//!   adapter trait every upstream producer implements, plus
//!   [`pump`][source::pump] to forward a source into the bus.
//! - [`sim`] – [`SimSource`][sim::SimSource]: a scripted crossing scenario
//!   so the full stack runs headless in tests and CI.

pub mod bus;
pub mod sim;
pub mod source;

pub use bus::{Lane, LaneSubscriber, TrackBus};
pub use sim::SimSource;
pub use source::{ObservationSource, pump};
