//! Typed, lane-based publish/subscribe bus for tracking traffic.
//!
//! Uses [`tokio::sync::broadcast`] channels under the hood so every
//! subscriber receives every event without any single subscriber blocking
//! the others.
//!
//! Traffic is partitioned into two [`Lane`]s so the recorder can select over
//! exactly the inputs it cares about:
//!
//! | Lane | Typical traffic |
//! |---|---|
//! | [`Lane::Observations`] | High-frequency observation batches from the tracker |
//! | [`Lane::Goals`] | Sparse robot goal updates |

use pedtrace_types::{TrackError, TrackEvent};
use tokio::sync::broadcast;
use tracing::warn;

/// Default channel capacity (events buffered before old ones are dropped
/// for slow subscribers).
const DEFAULT_CAPACITY: usize = 256;

/// The two first-class routing lanes on the track bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lane {
    /// Observation batches: one set of simultaneous agent states, robot first.
    Observations,
    /// Robot goal updates, delivered independently and asynchronously.
    Goals,
}

/// Shared track bus. Clone it cheaply – all clones share the same underlying
/// broadcast channels.
#[derive(Clone, Debug)]
pub struct TrackBus {
    observations: broadcast::Sender<TrackEvent>,
    goals: broadcast::Sender<TrackEvent>,
}

impl TrackBus {
    /// Create a new bus with the given per-lane channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (observations, _) = broadcast::channel(capacity);
        let (goals, _) = broadcast::channel(capacity);
        Self {
            observations,
            goals,
        }
    }

    /// Publish `event` to the given [`Lane`].
    ///
    /// Returns the number of active receivers that were handed the event.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::Channel`] when the lane currently has no
    /// subscribers (broadcast send fails without receivers).
    pub fn publish_to(&self, lane: Lane, event: TrackEvent) -> Result<usize, TrackError> {
        self.lane_sender(lane)
            .send(event)
            .map_err(|e| TrackError::Channel(format!("{lane:?} lane send failed: {e}")))
    }

    /// Subscribe to the given [`Lane`].
    pub fn subscribe_to(&self, lane: Lane) -> LaneSubscriber {
        LaneSubscriber {
            lane,
            receiver: self.lane_sender(lane).subscribe(),
        }
    }

    /// Number of active subscribers on a lane.
    pub fn receiver_count(&self, lane: Lane) -> usize {
        self.lane_sender(lane).receiver_count()
    }

    fn lane_sender(&self, lane: Lane) -> &broadcast::Sender<TrackEvent> {
        match lane {
            Lane::Observations => &self.observations,
            Lane::Goals => &self.goals,
        }
    }
}

impl Default for TrackBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// A subscription handle for one [`Lane`].
pub struct LaneSubscriber {
    lane: Lane,
    receiver: broadcast::Receiver<TrackEvent>,
}

impl LaneSubscriber {
    /// Wait for the next event on this lane.
    ///
    /// A lagged subscriber (channel buffer overrun) logs a warning and keeps
    /// receiving from the oldest retained event. Returns `None` once the bus
    /// is closed and no further events will arrive.
    pub async fn recv(&mut self) -> Option<TrackEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(lane = ?self.lane, lagged_by = n, "lane subscriber lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// The lane this subscriber listens on.
    pub fn lane(&self) -> Lane {
        self.lane
    }
}
