//! [`Recorder`] – the collection loop.
//!
//! One logical task drives the whole run, so the frame processor's state
//! (cached robot position, cached goal, frame counter) is mutated from a
//! single context and needs no locking. Each iteration selects over:
//!
//! 1. the observation lane – a delivered batch is processed into rows and
//!    appended to the sink before anything else happens, so a batch either
//!    fully commits or (when the goal gate is shut) emits nothing;
//! 2. the goal lane – updates the cached goal only;
//! 3. a periodic wake – the ONLY place the row-count threshold and the
//!    shutdown flag are checked, mirroring the source system's sampling
//!    loop.
//!
//! When collection stops the writer is flushed and closed, and only the
//! path it returns is handed to the transpose stage – the two phases cannot
//! overlap.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use pedtrace_dataset::{DatasetError, DatasetWriter, transpose_dataset};
use pedtrace_middleware::{Lane, LaneSubscriber, TrackBus};
use pedtrace_pipeline::FrameProcessor;
use pedtrace_types::{TrackError, TrackPayload};
use thiserror::Error;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that end a recording run.
#[derive(Error, Debug)]
pub enum RecorderError {
    #[error(transparent)]
    Track(#[from] TrackError),
    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration & report
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration bundle for [`Recorder`].
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Collection stops once this many rows have been written.
    pub target_rows: u64,
    /// Frequency of the termination-check wake (Hz). Not a per-batch gate;
    /// batches are processed as they arrive.
    pub sample_rate_hz: f64,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            target_rows: 100,
            sample_rate_hz: 2.5,
        }
    }
}

/// What a completed run produced.
#[derive(Debug)]
pub struct RecorderReport {
    /// The closed frame-major dataset file.
    pub dataset_path: PathBuf,
    /// The wide per-agent layout produced by the transpose stage.
    pub transposed_path: PathBuf,
    /// Rows written to the frame-major file.
    pub rows: u64,
    /// Accepted batches (== frames in the dataset).
    pub frames: u64,
    /// Batches dropped by the goal gate.
    pub dropped_batches: u64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Recorder
// ─────────────────────────────────────────────────────────────────────────────

/// Owns the frame processor, the dataset sink, and the bus subscriptions
/// for one recording run.
pub struct Recorder {
    processor: FrameProcessor,
    writer: DatasetWriter,
    config: RecorderConfig,
    batches: LaneSubscriber,
    goals: LaneSubscriber,
}

impl Recorder {
    /// Wire a recorder to the bus.
    ///
    /// Subscribes to both lanes immediately, so a source pumped after
    /// construction cannot race past the recorder.
    pub fn new(
        processor: FrameProcessor,
        writer: DatasetWriter,
        config: RecorderConfig,
        bus: &TrackBus,
    ) -> Self {
        Self {
            processor,
            writer,
            config,
            batches: bus.subscribe_to(Lane::Observations),
            goals: bus.subscribe_to(Lane::Goals),
        }
    }

    /// Run collection until the row-count threshold is reached, the
    /// observation lane closes, or `shutdown` is set; then flush, close,
    /// and transpose.
    ///
    /// # Errors
    ///
    /// An empty batch ([`TrackError::EmptyBatch`]) or any sink failure is
    /// fatal and aborts the run without reaching the transpose stage.
    pub async fn run(mut self, shutdown: Arc<AtomicBool>) -> Result<RecorderReport, RecorderError> {
        let period = Duration::from_secs_f64(1.0 / self.config.sample_rate_hz.max(1e-3));
        let mut wake = tokio::time::interval(period);
        wake.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut goals_open = true;

        info!(
            target_rows = self.config.target_rows,
            wake_period_ms = period.as_millis() as u64,
            "collection started"
        );

        loop {
            tokio::select! {
                delivered = self.batches.recv() => match delivered {
                    Some(event) => {
                        if let TrackPayload::Observations(batch) = event.payload {
                            let rows = self.processor.process_batch(&batch)?;
                            for row in &rows {
                                self.writer.append(row)?;
                            }
                        } else {
                            warn!(source = %event.source, "non-batch event on observation lane; ignoring");
                        }
                    }
                    None => {
                        info!("observation lane closed; stopping collection");
                        break;
                    }
                },
                delivered = self.goals.recv(), if goals_open => match delivered {
                    Some(event) => {
                        if let TrackPayload::Goal(goal) = event.payload {
                            self.processor.update_goal(goal);
                        } else {
                            warn!(source = %event.source, "non-goal event on goal lane; ignoring");
                        }
                    }
                    None => {
                        // Collection can continue with the last cached goal.
                        debug!("goal lane closed");
                        goals_open = false;
                    }
                },
                _ = wake.tick() => {
                    if shutdown.load(Ordering::SeqCst) {
                        info!("shutdown requested; stopping collection");
                        break;
                    }
                    if self.writer.rows_written() >= self.config.target_rows {
                        info!(rows = self.writer.rows_written(), "row-count threshold reached");
                        break;
                    }
                }
            }
        }

        let frames = self.processor.frame_count();
        let dropped_batches = self.processor.dropped_batches();
        let rows = self.writer.rows_written();

        // Phase two: transpose only ever sees the flushed, closed file.
        let dataset_path = self.writer.finish()?;
        let transposed_path = transpose_dataset(&dataset_path)?;

        info!(
            rows,
            frames,
            dropped_batches,
            dataset = %dataset_path.display(),
            transposed = %transposed_path.display(),
            "collection finished"
        );

        Ok(RecorderReport {
            dataset_path,
            transposed_path,
            rows,
            frames,
            dropped_batches,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pedtrace_pipeline::{Extents, FlipProfile, LocalZone};
    use pedtrace_types::{
        AgentObservation, GoalUpdate, ObservationBatch, TrackEvent, TrackPayload,
    };

    fn obs(id: u64, x: f64, y: f64) -> AgentObservation {
        AgentObservation {
            id,
            position_x: x,
            position_y: y,
            velocity_x: 0.5,
            velocity_y: 0.0,
            quat_z: 0.0,
            quat_w: 1.0,
        }
    }

    fn batch_event(observations: Vec<AgentObservation>) -> TrackEvent {
        TrackEvent::new(
            "test::tracker",
            TrackPayload::Observations(ObservationBatch::new(observations)),
        )
    }

    fn goal_event(x: f64, y: f64) -> TrackEvent {
        TrackEvent::new("test::goals", TrackPayload::Goal(GoalUpdate { x, y }))
    }

    fn recorder(bus: &TrackBus, dir: &tempfile::TempDir, target_rows: u64) -> Recorder {
        let processor = FrameProcessor::new(
            Extents::try_new(50.0, 50.0).unwrap(),
            LocalZone::new(12.0, 12.0),
            FlipProfile::Identity,
        );
        let writer = DatasetWriter::create_at(dir.path().join("run.csv")).unwrap();
        Recorder::new(
            processor,
            writer,
            RecorderConfig {
                target_rows,
                sample_rate_hz: 100.0,
            },
            bus,
        )
    }

    #[tokio::test]
    async fn records_until_threshold_then_transposes() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let bus = TrackBus::default();
        let recorder = recorder(&bus, &dir, 4);

        // Script: one pre-goal batch (dropped), a goal, two accepted batches
        // of two rows each. Paced so the recorder consumes each event before
        // the next lane delivers (select order between ready lanes is
        // arbitrary).
        let feeder_bus = bus.clone();
        let feeder = tokio::spawn(async move {
            let pause = Duration::from_millis(5);
            feeder_bus
                .publish_to(
                    Lane::Observations,
                    batch_event(vec![obs(0, 1.0, 1.0), obs(1, 2.0, 2.0)]),
                )
                .unwrap();
            tokio::time::sleep(pause).await;
            feeder_bus
                .publish_to(Lane::Goals, goal_event(3.0, 3.0))
                .unwrap();
            tokio::time::sleep(pause).await;
            feeder_bus
                .publish_to(
                    Lane::Observations,
                    batch_event(vec![obs(0, 1.0, 1.0), obs(1, 2.0, 2.0)]),
                )
                .unwrap();
            tokio::time::sleep(pause).await;
            feeder_bus
                .publish_to(
                    Lane::Observations,
                    batch_event(vec![obs(0, 1.0, 1.0), obs(1, 2.0, 2.0)]),
                )
                .unwrap();
        });

        let report = recorder
            .run(Arc::new(AtomicBool::new(false)))
            .await
            .expect("run");
        feeder.await.expect("feeder");

        assert_eq!(report.rows, 4);
        assert_eq!(report.frames, 2);
        assert_eq!(report.dropped_batches, 1);

        let frame_major = std::fs::read_to_string(&report.dataset_path).expect("dataset");
        assert_eq!(frame_major.lines().count(), 4);

        // 10 columns in -> 10 wide records out, each 4 fields long.
        let wide = std::fs::read_to_string(&report.transposed_path).expect("transposed");
        assert_eq!(wide.lines().count(), 10);
        assert!(wide.lines().all(|l| l.split(',').count() == 4));
        // First wide record is the frame-index trajectory.
        assert_eq!(wide.lines().next().unwrap(), "0,0,1,1");
    }

    #[tokio::test]
    async fn stops_when_observation_lane_closes() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let bus = TrackBus::default();
        let recorder = recorder(&bus, &dir, 1_000);

        let feeder_bus = bus.clone();
        // The recorder subscribed at construction; no other bus handle may
        // outlive the feeder or the lanes never close.
        drop(bus);
        let feeder = tokio::spawn(async move {
            feeder_bus
                .publish_to(Lane::Goals, goal_event(25.0, 25.0))
                .unwrap();
            tokio::time::sleep(Duration::from_millis(5)).await;
            feeder_bus
                .publish_to(Lane::Observations, batch_event(vec![obs(0, 5.0, 5.0)]))
                .unwrap();
            // feeder_bus drops here, closing both lanes.
        });

        let report = recorder
            .run(Arc::new(AtomicBool::new(false)))
            .await
            .expect("run");
        feeder.await.expect("feeder");
        assert_eq!(report.rows, 1);
        assert_eq!(report.frames, 1);
    }

    #[tokio::test]
    async fn shutdown_flag_stops_an_idle_run() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let bus = TrackBus::default();
        let recorder = recorder(&bus, &dir, 1_000);

        let shutdown = Arc::new(AtomicBool::new(true));
        let report = recorder.run(shutdown).await.expect("run");
        assert_eq!(report.rows, 0);
        assert_eq!(report.frames, 0);
        // Empty run still completes the two-phase handoff.
        assert!(report.transposed_path.exists());
    }

    #[tokio::test]
    async fn empty_batch_aborts_the_run() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let bus = TrackBus::default();
        let recorder = recorder(&bus, &dir, 10);

        bus.publish_to(Lane::Observations, batch_event(vec![]))
            .unwrap();

        let err = recorder
            .run(Arc::new(AtomicBool::new(false)))
            .await
            .expect_err("empty batch must be fatal");
        assert!(matches!(
            err,
            RecorderError::Track(TrackError::EmptyBatch)
        ));
    }
}
