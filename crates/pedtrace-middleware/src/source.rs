//! The source adapter seam.
//!
//! The recorder never speaks to a tracker protocol directly. It subscribes
//! to the [`TrackBus`]; sources implement [`ObservationSource`] and are
//! forwarded onto the bus by [`pump`]. Swapping a live tracker bridge for
//! the scripted [`SimSource`][crate::sim::SimSource] is then a wiring
//! change, not a recorder change.

use async_trait::async_trait;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use pedtrace_types::{TrackEvent, TrackPayload};
use tracing::debug;

use crate::bus::{Lane, TrackBus};

/// Every upstream observation producer implements this trait.
///
/// # Contract
///
/// `track_stream` yields [`TrackPayload`] values in delivery order:
/// observation batches (robot first) interleaved with goal updates. The
/// stream ends when the source has nothing more to deliver.
#[async_trait]
pub trait ObservationSource: Send + Sync {
    /// Label stamped into the `source` field of every forwarded event.
    fn label(&self) -> &str;

    /// The live payload stream.
    async fn track_stream(&self) -> BoxStream<'static, TrackPayload>;
}

/// Forward every payload of `source` onto the bus, routed by variant.
///
/// Returns the number of events forwarded. Stops early (without error) once
/// the destination lane has no subscribers left – the recorder has finished
/// and torn down its subscriptions.
pub async fn pump(source: &dyn ObservationSource, bus: &TrackBus) -> u64 {
    let mut stream = source.track_stream().await;
    let mut forwarded = 0u64;

    while let Some(payload) = stream.next().await {
        let lane = match payload {
            TrackPayload::Observations(_) => Lane::Observations,
            TrackPayload::Goal(_) => Lane::Goals,
        };
        let event = TrackEvent::new(source.label(), payload);
        if bus.publish_to(lane, event).is_err() {
            debug!(lane = ?lane, "no subscribers left; stopping pump");
            break;
        }
        forwarded += 1;
    }

    debug!(source = source.label(), forwarded, "source drained");
    forwarded
}
