//! Scripted observation source for headless runs.
//!
//! [`SimSource`] replays a deterministic crossing scenario: the robot walks
//! diagonally across the world toward its goal while a handful of
//! pedestrians cross its path. This lets the full recording stack run in
//! tests and CI without a live tracker.
//!
//! The script deliberately delivers one observation batch BEFORE the goal
//! update, exercising the recorder's goal gate the way a real startup does.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use futures_util::stream::{self, BoxStream};
use pedtrace_types::{AgentObservation, GoalUpdate, ObservationBatch, TrackPayload};

use crate::source::ObservationSource;

/// Deterministic crossing scenario.
#[derive(Debug, Clone)]
pub struct SimSource {
    width: f64,
    height: f64,
    frames: u32,
    pedestrians: u32,
    step: Duration,
}

impl SimSource {
    /// Create a scenario for a world of the given extents.
    ///
    /// Defaults: 64 frames, 3 pedestrians, 400 ms between deliveries
    /// (matching a 2.5 Hz tracker).
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            frames: 64,
            pedestrians: 3,
            step: Duration::from_millis(400),
        }
    }

    pub fn with_frames(mut self, frames: u32) -> Self {
        self.frames = frames;
        self
    }

    pub fn with_pedestrians(mut self, pedestrians: u32) -> Self {
        self.pedestrians = pedestrians;
        self
    }

    pub fn with_step(mut self, step: Duration) -> Self {
        self.step = step;
        self
    }

    /// The robot's goal: the far corner of the world.
    pub fn goal(&self) -> GoalUpdate {
        GoalUpdate {
            x: 0.9 * self.width,
            y: 0.9 * self.height,
        }
    }

    /// Precompute the whole delivery script.
    fn scripted_payloads(&self) -> Vec<TrackPayload> {
        let frames = self.frames.max(1);
        let mut payloads = Vec::with_capacity(frames as usize + 1);

        // One pre-goal batch, then the goal, then the remaining batches.
        payloads.push(self.batch_at(0));
        payloads.push(TrackPayload::Goal(self.goal()));
        for frame in 1..frames {
            payloads.push(self.batch_at(frame));
        }
        payloads
    }

    fn batch_at(&self, frame: u32) -> TrackPayload {
        let frames = self.frames.max(1) as f64;
        let progress = frame as f64 / frames;

        let start = (0.1 * self.width, 0.1 * self.height);
        let goal = self.goal();
        let heading = (goal.y - start.1).atan2(goal.x - start.0);

        let mut observations = Vec::with_capacity(self.pedestrians as usize + 1);
        // Robot first, walking start -> goal at 1.2 m/s.
        observations.push(AgentObservation {
            id: 0,
            position_x: start.0 + (goal.x - start.0) * progress,
            position_y: start.1 + (goal.y - start.1) * progress,
            velocity_x: 1.2 * heading.cos(),
            velocity_y: 1.2 * heading.sin(),
            quat_z: (heading / 2.0).sin(),
            quat_w: (heading / 2.0).cos(),
        });

        // Pedestrians cross top-to-bottom at 1.0 m/s, staggered across x.
        for k in 0..self.pedestrians {
            let x = (0.2 + 0.15 * k as f64) * self.width;
            let y = 0.8 * self.height - 0.6 * self.height * progress;
            observations.push(AgentObservation {
                id: (k + 1) as u64,
                position_x: x,
                position_y: y,
                velocity_x: 0.0,
                velocity_y: -1.0,
                quat_z: (-std::f64::consts::FRAC_PI_4).sin(),
                quat_w: (-std::f64::consts::FRAC_PI_4).cos(),
            });
        }

        TrackPayload::Observations(ObservationBatch::new(observations))
    }
}

#[async_trait]
impl ObservationSource for SimSource {
    fn label(&self) -> &str {
        "pedtrace-middleware::sim"
    }

    async fn track_stream(&self) -> BoxStream<'static, TrackPayload> {
        let step = self.step;
        Box::pin(
            stream::iter(self.scripted_payloads()).then(move |payload| async move {
                tokio::time::sleep(step).await;
                payload
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_starts_with_a_pre_goal_batch() {
        let sim = SimSource::new(50.0, 50.0).with_frames(4);
        let script = sim.scripted_payloads();
        assert!(matches!(script[0], TrackPayload::Observations(_)));
        assert!(matches!(script[1], TrackPayload::Goal(_)));
    }

    #[test]
    fn script_contains_exactly_one_goal() {
        let sim = SimSource::new(50.0, 50.0).with_frames(8);
        let script = sim.scripted_payloads();
        let goals = script
            .iter()
            .filter(|p| matches!(p, TrackPayload::Goal(_)))
            .count();
        assert_eq!(goals, 1);
        assert_eq!(script.len(), 9); // 8 batches + 1 goal
    }

    #[test]
    fn every_batch_has_the_robot_first() {
        let sim = SimSource::new(50.0, 50.0).with_frames(6).with_pedestrians(2);
        for payload in sim.scripted_payloads() {
            if let TrackPayload::Observations(batch) = payload {
                assert_eq!(batch.ego().expect("non-empty").id, 0);
                assert_eq!(batch.observations.len(), 3);
                assert_eq!(batch.neighbors()[0].id, 1);
                assert_eq!(batch.neighbors()[1].id, 2);
            }
        }
    }

    #[test]
    fn robot_ends_near_its_goal() {
        let sim = SimSource::new(50.0, 50.0).with_frames(10);
        let script = sim.scripted_payloads();
        let last = script.last().expect("non-empty script");
        let TrackPayload::Observations(batch) = last else {
            panic!("last payload must be a batch");
        };
        let ego = batch.ego().expect("robot");
        // Final frame is at progress 9/10 of the start->goal segment.
        let goal = sim.goal();
        assert!((ego.position_x - goal.x).abs() < 5.0);
        assert!((ego.position_y - goal.y).abs() < 5.0);
    }

    #[tokio::test]
    async fn stream_yields_the_full_script() {
        let sim = SimSource::new(50.0, 50.0)
            .with_frames(4)
            .with_step(Duration::from_millis(1));
        let collected: Vec<TrackPayload> = sim.track_stream().await.collect().await;
        assert_eq!(collected.len(), 5);
    }
}
