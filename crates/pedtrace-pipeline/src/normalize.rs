//! Coordinate normalization.
//!
//! World-frame positions are mapped into an approximately `[-1, 1]` range via
//! `2 * value / extent - 1`, with distinct horizontal and vertical extents.
//! `normalize(0, e) = -1` and `normalize(e, e) = 1` for any extent `e > 0`.
//!
//! # Example
//!
//! ```rust
//! use pedtrace_pipeline::normalize::Extents;
//!
//! let extents = Extents::try_new(50.0, 50.0).unwrap();
//! assert!((extents.norm_x(25.0)).abs() < 1e-9);   // centre maps to 0
//! assert!((extents.norm_y(50.0) - 1.0).abs() < 1e-9);
//! ```

use pedtrace_types::TrackError;

/// Map `value` from `[0, extent]` onto `[-1, 1]`.
///
/// Pure; the caller guarantees `extent != 0` (extents are validated at
/// configuration time, see [`Extents::try_new`]).
pub fn normalize(value: f64, extent: f64) -> f64 {
    2.0 * value / extent - 1.0
}

/// Validated global normalization extents (world width and height in metres).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extents {
    width: f64,
    height: f64,
}

impl Extents {
    /// Create validated extents.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::InvalidExtent`] when either extent is zero or
    /// non-finite. Division by zero downstream would silently corrupt every
    /// row, so this is a fatal configuration error.
    pub fn try_new(width: f64, height: f64) -> Result<Self, TrackError> {
        if width == 0.0 || !width.is_finite() {
            return Err(TrackError::InvalidExtent {
                name: "global_width".to_string(),
                value: width,
            });
        }
        if height == 0.0 || !height.is_finite() {
            return Err(TrackError::InvalidExtent {
                name: "global_height".to_string(),
                value: height,
            });
        }
        Ok(Self { width, height })
    }

    /// Normalize a horizontal world coordinate.
    pub fn norm_x(&self, value: f64) -> f64 {
        normalize(value, self.width)
    }

    /// Normalize a vertical world coordinate.
    pub fn norm_y(&self, value: f64) -> f64 {
        normalize(value, self.height)
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_maps_to_minus_one() {
        assert!((normalize(0.0, 50.0) - (-1.0)).abs() < 1e-12);
    }

    #[test]
    fn extent_maps_to_plus_one() {
        assert!((normalize(50.0, 50.0) - 1.0).abs() < 1e-12);
        assert!((normalize(12.0, 12.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn midpoint_maps_to_zero() {
        assert!(normalize(25.0, 50.0).abs() < 1e-12);
    }

    #[test]
    fn formula_is_affine() {
        // normalize(p, e) = 2p/e - 1 for arbitrary p, including out-of-range.
        assert!((normalize(5.0, 50.0) - (-0.8)).abs() < 1e-12);
        assert!((normalize(75.0, 50.0) - 2.0).abs() < 1e-12);
        assert!((normalize(-25.0, 50.0) - (-2.0)).abs() < 1e-12);
    }

    #[test]
    fn distinct_axis_extents_are_honored() {
        let e = Extents::try_new(40.0, 20.0).unwrap();
        assert!((e.norm_x(10.0) - (-0.5)).abs() < 1e-12);
        assert!((e.norm_y(10.0) - 0.0).abs() < 1e-12);
    }

    #[test]
    fn zero_extent_is_rejected() {
        let err = Extents::try_new(0.0, 50.0).unwrap_err();
        assert!(matches!(err, TrackError::InvalidExtent { ref name, .. } if name == "global_width"));

        let err = Extents::try_new(50.0, 0.0).unwrap_err();
        assert!(matches!(err, TrackError::InvalidExtent { ref name, .. } if name == "global_height"));
    }

    #[test]
    fn non_finite_extent_is_rejected() {
        assert!(Extents::try_new(f64::NAN, 50.0).is_err());
        assert!(Extents::try_new(50.0, f64::INFINITY).is_err());
    }

    #[test]
    fn negative_extent_is_accepted() {
        // A negative extent mirrors the axis; only zero/non-finite are fatal.
        let e = Extents::try_new(-50.0, 50.0).unwrap();
        assert!((e.norm_x(25.0) - (-2.0)).abs() < 1e-12);
    }
}
