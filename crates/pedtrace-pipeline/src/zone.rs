//! Local sensing zone.
//!
//! A box-shaped catchment area centred on the robot's last known position.
//! Only neighbors inside the zone are worth recording; everyone else is
//! outside the robot's local costmap and is dropped.
//!
//! The inclusion test uses a small NEGATIVE epsilon with a `<=` comparison,
//! so a point sitting exactly on a half-extent boundary is excluded: the
//! effective zone is strictly inside the configured box, very slightly
//! contracted rather than expanded.
//!
//! # Example
//!
//! ```rust
//! use pedtrace_pipeline::zone::LocalZone;
//!
//! let zone = LocalZone::new(12.0, 12.0);
//! assert!(zone.contains((0.0, 0.0), (5.0, 5.0)));
//! assert!(!zone.contains((0.0, 0.0), (6.0, 6.0))); // on the boundary
//! ```

/// Inclusion threshold. Negative, so the boundary itself is excluded.
const ZONE_EPSILON: f64 = -1e-5;

/// Box-shaped local zone around the robot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalZone {
    width: f64,
    height: f64,
}

impl LocalZone {
    /// Create a zone with the given full width and height in metres.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Whether `point` lies strictly inside the zone centred on `robot`.
    ///
    /// Computes the Chebyshev-style excess
    /// `max(|rx - px| - width/2, |ry - py| - height/2)` and includes the
    /// point iff that excess is at most [`ZONE_EPSILON`].
    pub fn contains(&self, robot: (f64, f64), point: (f64, f64)) -> bool {
        let diff_width = (robot.0 - point.0).abs() - self.width / 2.0;
        let diff_height = (robot.1 - point.1).abs() - self.height / 2.0;
        let dist = diff_width.max(diff_height);
        dist <= ZONE_EPSILON
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }
}
