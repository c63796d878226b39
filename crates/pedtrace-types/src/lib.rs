//! `pedtrace-types` – shared vocabulary of the recording stack.
//!
//! Every crate in the workspace speaks these types: raw observations as the
//! tracker delivers them, the bus envelope they travel in, the persisted
//! dataset row, and the workspace-wide error enum.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// One tracked agent as delivered by the upstream tracker.
///
/// The robot is always the first observation of a batch; everyone else is a
/// pedestrian. Positions are world-frame metres, velocities m/s, orientation
/// the planar (z, w) components of a unit quaternion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentObservation {
    /// Track identifier assigned by the upstream tracker (0-based).
    pub id: u64,
    pub position_x: f64,
    pub position_y: f64,
    pub velocity_x: f64,
    pub velocity_y: f64,
    /// Quaternion z component of the agent's orientation.
    pub quat_z: f64,
    /// Quaternion w component of the agent's orientation.
    pub quat_w: f64,
}

/// One delivered set of simultaneous agent observations, robot first.
///
/// Ephemeral: nothing of a batch is retained past its processing except the
/// robot's position, which the frame processor caches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationBatch {
    pub observations: Vec<AgentObservation>,
}

impl ObservationBatch {
    pub fn new(observations: Vec<AgentObservation>) -> Self {
        Self { observations }
    }

    /// The ego (robot) observation, if the batch is non-empty.
    pub fn ego(&self) -> Option<&AgentObservation> {
        self.observations.first()
    }

    /// All non-ego observations.
    pub fn neighbors(&self) -> &[AgentObservation] {
        self.observations.get(1..).unwrap_or(&[])
    }
}

/// A navigation goal for the robot, delivered independently of observation
/// batches. Updates the cached goal only; never produces dataset rows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalUpdate {
    pub x: f64,
    pub y: f64,
}

/// One persisted dataset record.
///
/// Column order is fixed by the downstream trainers:
/// `frame_index, agent_id, pos_y, pos_x, vel_x, vel_y, quat_z, quat_w, goal_x, goal_y`.
///
/// `agent_id` is 1-based (tracker id + 1); id 0 is reserved downstream for
/// the robot/unassigned. Neighbor rows always carry goal (0, 0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DatasetRow {
    pub frame_index: u64,
    pub agent_id: u64,
    pub pos_y: f64,
    pub pos_x: f64,
    pub vel_x: f64,
    pub vel_y: f64,
    pub quat_z: f64,
    pub quat_w: f64,
    pub goal_x: f64,
    pub goal_y: f64,
}

/// Envelope for everything routed over the track bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackEvent {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// e.g. "pedtrace-middleware::sim"
    pub source: String,
    pub payload: TrackPayload,
}

impl TrackEvent {
    /// Wrap a payload with a fresh UUID and the current UTC timestamp.
    pub fn new(source: impl Into<String>, payload: TrackPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            source: source.into(),
            payload,
        }
    }
}

/// Variants of data that can be routed over the track bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TrackPayload {
    Observations(ObservationBatch),
    Goal(GoalUpdate),
}

/// Workspace-wide error type for the recording pipeline.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TrackError {
    /// A delivered batch contained no observations. Ego extraction is
    /// undefined, so this is an upstream contract violation, not retried.
    #[error("observation batch is empty; ego extraction is undefined")]
    EmptyBatch,

    /// The configured flip index is outside 1..=4.
    #[error("invalid flip profile index {0} (expected 1-4)")]
    InvalidFlipProfile(u8),

    /// A normalization extent was zero or non-finite. Fatal at startup.
    #[error("invalid {name} extent {value}: must be finite and non-zero")]
    InvalidExtent { name: String, value: f64 },

    /// A bus channel was closed or had no receivers.
    #[error("track bus channel error: {0}")]
    Channel(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(id: u64, x: f64, y: f64) -> AgentObservation {
        AgentObservation {
            id,
            position_x: x,
            position_y: y,
            velocity_x: 0.5,
            velocity_y: -0.2,
            quat_z: 0.0,
            quat_w: 1.0,
        }
    }

    #[test]
    fn batch_ego_is_first_observation() {
        let batch = ObservationBatch::new(vec![obs(0, 1.0, 2.0), obs(1, 3.0, 4.0)]);
        assert_eq!(batch.ego().unwrap().id, 0);
        assert_eq!(batch.neighbors().len(), 1);
        assert_eq!(batch.neighbors()[0].id, 1);
    }

    #[test]
    fn empty_batch_has_no_ego_and_no_neighbors() {
        let batch = ObservationBatch::new(vec![]);
        assert!(batch.ego().is_none());
        assert!(batch.neighbors().is_empty());
    }

    #[test]
    fn observation_serialization_roundtrip() {
        let o = obs(7, 12.5, -3.25);
        let json = serde_json::to_string(&o).unwrap();
        let back: AgentObservation = serde_json::from_str(&json).unwrap();
        assert_eq!(o, back);
    }

    #[test]
    fn track_event_roundtrip() {
        let event = TrackEvent::new(
            "pedtrace-middleware::sim",
            TrackPayload::Goal(GoalUpdate { x: 5.0, y: 5.0 }),
        );
        let json = serde_json::to_string(&event).unwrap();
        let back: TrackEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event.id, back.id);
        assert_eq!(event.source, back.source);
        match back.payload {
            TrackPayload::Goal(g) => {
                assert!((g.x - 5.0).abs() < f64::EPSILON);
                assert!((g.y - 5.0).abs() < f64::EPSILON);
            }
            _ => panic!("unexpected variant"),
        }
    }

    #[test]
    fn track_error_display() {
        let err = TrackError::InvalidFlipProfile(9);
        assert!(err.to_string().contains("flip profile index 9"));

        let err2 = TrackError::InvalidExtent {
            name: "global_width".to_string(),
            value: 0.0,
        };
        assert!(err2.to_string().contains("global_width"));
    }
}
