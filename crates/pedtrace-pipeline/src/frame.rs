//! [`FrameProcessor`] – per-batch orchestrator.
//!
//! Drives one delivered observation batch through the whole transformation:
//!
//! 1. **Extract** – the first observation is the ego (robot); its position is
//!    cached for the local-zone test.
//! 2. **Gate** – until a real goal has been received, batches are silently
//!    dropped (no rows, no frame-index advance).
//! 3. **Ego row** – normalize position/velocity/goal, correct runaway
//!    velocity components, apply the run's [`FlipProfile`], emit one row.
//! 4. **Neighbor rows** – normalize and velocity-correct each remaining
//!    observation, keep it only if it lies inside the [`LocalZone`] around
//!    the cached robot position, emit with goal forced to (0, 0) and no flip.
//! 5. **Advance** – increment the frame counter exactly once.
//!
//! All rows of one batch share the same frame index, so a batch either fully
//! emits or emits nothing.
//!
//! State is explicit and owned here: the cached robot position, the cached
//! goal, and the running frame counter. Callers mutate it only through
//! [`FrameProcessor::process_batch`] and [`FrameProcessor::update_goal`].

use pedtrace_types::{DatasetRow, GoalUpdate, ObservationBatch, TrackError};
use tracing::{debug, trace};

use crate::flip::{EgoState, FlipProfile};
use crate::normalize::Extents;
use crate::zone::LocalZone;

// ────────────────────────────────────────────────────────────────────────────
// Constants
// ────────────────────────────────────────────────────────────────────────────

/// A batch produces output only while the normalized goal is away from the
/// (-1, -1) corner, i.e. a real goal update has arrived at least once.
const GOAL_GATE: f64 = -0.99;

/// Velocity components beyond this magnitude are treated as a known
/// upstream unit/encoding artifact and rescaled.
const VELOCITY_LIMIT: f64 = 10.0;
const VELOCITY_SCALE: f64 = 1000.0;

/// Rescale a runaway velocity component. `12.0` becomes `0.012`; `9.9`
/// passes through. Applied per component, to ego and neighbors alike.
fn correct_velocity(v: f64) -> f64 {
    if v.abs() > VELOCITY_LIMIT { v / VELOCITY_SCALE } else { v }
}

// ────────────────────────────────────────────────────────────────────────────
// FrameProcessor
// ────────────────────────────────────────────────────────────────────────────

/// Converts observation batches into dataset rows.
///
/// # Example
///
/// ```rust
/// use pedtrace_pipeline::{Extents, FlipProfile, FrameProcessor, LocalZone};
/// use pedtrace_types::{AgentObservation, GoalUpdate, ObservationBatch};
///
/// let extents = Extents::try_new(50.0, 50.0).unwrap();
/// let mut processor =
///     FrameProcessor::new(extents, LocalZone::new(12.0, 12.0), FlipProfile::Identity);
///
/// processor.update_goal(GoalUpdate { x: 5.0, y: 5.0 });
///
/// let batch = ObservationBatch::new(vec![AgentObservation {
///     id: 0,
///     position_x: 1.0,
///     position_y: 1.0,
///     velocity_x: 0.4,
///     velocity_y: 0.0,
///     quat_z: 0.0,
///     quat_w: 1.0,
/// }]);
/// let rows = processor.process_batch(&batch).unwrap();
/// assert_eq!(rows.len(), 1);
/// assert_eq!(rows[0].frame_index, 0);
/// ```
#[derive(Debug)]
pub struct FrameProcessor {
    extents: Extents,
    zone: LocalZone,
    flip: FlipProfile,
    /// Last known ego position, world frame. Overwritten each batch.
    robot_position: (f64, f64),
    /// Last received goal, world frame. (0, 0) until the first update,
    /// which normalizes to (-1, -1) and keeps the gate shut.
    goal: (f64, f64),
    /// Per-batch sequence number shared by all rows of a batch. Advances
    /// only for accepted batches.
    frame_counter: u64,
    dropped_batches: u64,
}

impl FrameProcessor {
    pub fn new(extents: Extents, zone: LocalZone, flip: FlipProfile) -> Self {
        Self {
            extents,
            zone,
            flip,
            robot_position: (0.0, 0.0),
            goal: (0.0, 0.0),
            frame_counter: 0,
            dropped_batches: 0,
        }
    }

    /// Cache a new goal. Takes effect from the next processed batch on;
    /// never emits rows or advances the frame counter by itself.
    pub fn update_goal(&mut self, goal: GoalUpdate) {
        self.goal = (goal.x, goal.y);
        trace!(goal_x = goal.x, goal_y = goal.y, "goal updated");
    }

    /// Number of accepted batches so far (== the next frame index).
    pub fn frame_count(&self) -> u64 {
        self.frame_counter
    }

    /// Number of batches dropped by the goal gate.
    pub fn dropped_batches(&self) -> u64 {
        self.dropped_batches
    }

    /// Process one batch into zero or more dataset rows.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::EmptyBatch`] for a batch with no observations;
    /// ego extraction is undefined and the upstream contract is broken, so
    /// the caller should treat this as fatal.
    pub fn process_batch(
        &mut self,
        batch: &ObservationBatch,
    ) -> Result<Vec<DatasetRow>, TrackError> {
        let ego = batch.ego().ok_or(TrackError::EmptyBatch)?;
        self.robot_position = (ego.position_x, ego.position_y);

        let goal_x = self.extents.norm_x(self.goal.0);
        let goal_y = self.extents.norm_y(self.goal.1);
        if goal_x <= GOAL_GATE && goal_y <= GOAL_GATE {
            self.dropped_batches += 1;
            debug!(
                dropped = self.dropped_batches,
                "no goal received yet; dropping batch"
            );
            return Ok(Vec::new());
        }

        let mut rows = Vec::with_capacity(batch.observations.len());

        let ego_state = self.flip.apply(EgoState {
            pos_x: self.extents.norm_x(ego.position_x),
            pos_y: self.extents.norm_y(ego.position_y),
            vel_x: correct_velocity(ego.velocity_x),
            vel_y: correct_velocity(ego.velocity_y),
            goal_x,
            goal_y,
            quat_z: ego.quat_z,
            quat_w: ego.quat_w,
        });
        rows.push(DatasetRow {
            frame_index: self.frame_counter,
            agent_id: ego.id + 1,
            pos_y: ego_state.pos_y,
            pos_x: ego_state.pos_x,
            vel_x: ego_state.vel_x,
            vel_y: ego_state.vel_y,
            quat_z: ego_state.quat_z,
            quat_w: ego_state.quat_w,
            goal_x: ego_state.goal_x,
            goal_y: ego_state.goal_y,
        });

        for neighbor in batch.neighbors() {
            let inside = self
                .zone
                .contains(self.robot_position, (neighbor.position_x, neighbor.position_y));
            if !inside {
                continue;
            }
            rows.push(DatasetRow {
                frame_index: self.frame_counter,
                agent_id: neighbor.id + 1,
                pos_y: self.extents.norm_y(neighbor.position_y),
                pos_x: self.extents.norm_x(neighbor.position_x),
                vel_x: correct_velocity(neighbor.velocity_x),
                vel_y: correct_velocity(neighbor.velocity_y),
                quat_z: neighbor.quat_z,
                quat_w: neighbor.quat_w,
                goal_x: 0.0,
                goal_y: 0.0,
            });
        }

        trace!(
            frame = self.frame_counter,
            rows = rows.len(),
            agents = batch.observations.len(),
            "batch accepted"
        );
        self.frame_counter += 1;
        Ok(rows)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
