//! Flip augmentation.
//!
//! One of four fixed geometric transforms, chosen once per run, is applied to
//! every normalized ego state to multiply training data via symmetry. The
//! transform acts identically on the position, velocity, and goal pairs, and
//! recomputes the planar quaternion `(z, w)` from the rotated heading so the
//! stored orientation stays consistent with the rotated frame.
//!
//! Neighbor rows are never flip-augmented; this asymmetry is a property of
//! the dataset format being reproduced, not an omission.
//!
//! # Example
//!
//! ```rust
//! use pedtrace_pipeline::flip::{EgoState, FlipProfile};
//!
//! let state = EgoState {
//!     pos_x: 0.2, pos_y: 0.4,
//!     vel_x: 0.5, vel_y: 0.1,
//!     goal_x: 0.8, goal_y: 0.6,
//!     quat_z: 0.0, quat_w: 1.0,
//! };
//! let flipped = FlipProfile::Rotate90.apply(state);
//! assert!((flipped.pos_x - 0.4).abs() < 1e-12);   // (x, y) -> (y, 1 - x)
//! assert!((flipped.pos_y - 0.8).abs() < 1e-12);
//! ```

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use pedtrace_types::TrackError;

// ────────────────────────────────────────────────────────────────────────────
// EgoState
// ────────────────────────────────────────────────────────────────────────────

/// The normalized ego tuple a flip acts on: position, velocity, and goal
/// pairs plus the planar quaternion components.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EgoState {
    pub pos_x: f64,
    pub pos_y: f64,
    pub vel_x: f64,
    pub vel_y: f64,
    pub goal_x: f64,
    pub goal_y: f64,
    pub quat_z: f64,
    pub quat_w: f64,
}

// ────────────────────────────────────────────────────────────────────────────
// FlipProfile
// ────────────────────────────────────────────────────────────────────────────

/// The four flip variants, indexed 1–4 in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlipProfile {
    #[default]
    Identity,
    Rotate90,
    Rotate180,
    Rotate270,
}

impl FlipProfile {
    /// The 1-based configuration index of this profile (also encoded into
    /// the dataset file name).
    pub fn index(self) -> u8 {
        match self {
            FlipProfile::Identity => 1,
            FlipProfile::Rotate90 => 2,
            FlipProfile::Rotate180 => 3,
            FlipProfile::Rotate270 => 4,
        }
    }

    /// Apply this profile to a normalized ego state.
    ///
    /// The heading is taken as `atan2(quat_z, quat_w)`; the rotated heading
    /// is re-encoded as `quat_z = sin`, `quat_w = cos`.
    pub fn apply(self, state: EgoState) -> EgoState {
        let angle = state.quat_z.atan2(state.quat_w);
        match self {
            FlipProfile::Identity => state,
            FlipProfile::Rotate90 => {
                let (pos_x, pos_y) = rotate_quarter(state.pos_x, state.pos_y);
                let (vel_x, vel_y) = rotate_quarter(state.vel_x, state.vel_y);
                let (goal_x, goal_y) = rotate_quarter(state.goal_x, state.goal_y);
                let heading = angle + FRAC_PI_4;
                EgoState {
                    pos_x,
                    pos_y,
                    vel_x,
                    vel_y,
                    goal_x,
                    goal_y,
                    quat_z: heading.sin(),
                    quat_w: heading.cos(),
                }
            }
            FlipProfile::Rotate180 => {
                let (pos_x, pos_y) = rotate_half(state.pos_x, state.pos_y);
                let (vel_x, vel_y) = rotate_half(state.vel_x, state.vel_y);
                let (goal_x, goal_y) = rotate_half(state.goal_x, state.goal_y);
                let heading = angle + FRAC_PI_2;
                EgoState {
                    pos_x,
                    pos_y,
                    vel_x,
                    vel_y,
                    goal_x,
                    goal_y,
                    quat_z: heading.sin(),
                    quat_w: heading.cos(),
                }
            }
            FlipProfile::Rotate270 => {
                let (pos_x, pos_y) = rotate_three_quarter(state.pos_x, state.pos_y);
                let (vel_x, vel_y) = rotate_three_quarter(state.vel_x, state.vel_y);
                let (goal_x, goal_y) = rotate_three_quarter(state.goal_x, state.goal_y);
                let heading = angle - FRAC_PI_4;
                EgoState {
                    pos_x,
                    pos_y,
                    vel_x,
                    vel_y,
                    goal_x,
                    goal_y,
                    quat_z: heading.sin(),
                    quat_w: heading.cos(),
                }
            }
        }
    }
}

impl TryFrom<u8> for FlipProfile {
    type Error = TrackError;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        match index {
            1 => Ok(FlipProfile::Identity),
            2 => Ok(FlipProfile::Rotate90),
            3 => Ok(FlipProfile::Rotate180),
            4 => Ok(FlipProfile::Rotate270),
            other => Err(TrackError::InvalidFlipProfile(other)),
        }
    }
}

impl std::fmt::Display for FlipProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlipProfile::Identity => write!(f, "identity"),
            FlipProfile::Rotate90 => write!(f, "rotate-90"),
            FlipProfile::Rotate180 => write!(f, "rotate-180"),
            FlipProfile::Rotate270 => write!(f, "rotate-270"),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pair transforms
// ────────────────────────────────────────────────────────────────────────────

/// Quarter turn in the normalized square: `(x, y) -> (y, 1 - x)`.
fn rotate_quarter(x: f64, y: f64) -> (f64, f64) {
    (y, 1.0 - x)
}

/// Half turn: `(x, y) -> (1 - x, 1 - y)`.
fn rotate_half(x: f64, y: f64) -> (f64, f64) {
    (1.0 - x, 1.0 - y)
}

/// Three-quarter turn: `(x, y) -> (1 - y, x)`.
fn rotate_three_quarter(x: f64, y: f64) -> (f64, f64) {
    (1.0 - y, x)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
