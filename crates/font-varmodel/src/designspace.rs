//! Axis definitions and location normalization.

use font_types::Tag;

use crate::{
    error::{Error, Result},
    location::{NormalizedLocation, UserLocation},
};

/// A variation axis of the font being painted.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    /// Four-character axis tag (e.g., "wght", "wdth")
    pub tag: Tag,
    /// Human-readable axis name
    pub name: String,
    /// Minimum value on this axis
    pub minimum: f64,
    /// Default value on this axis
    pub default: f64,
    /// Maximum value on this axis
    pub maximum: f64,
}

impl Axis {
    /// Create a new axis, validating the tag and the ordering of its bounds.
    pub fn new(tag: &str, name: &str, minimum: f64, default: f64, maximum: f64) -> Result<Self> {
        let parsed = Tag::new_checked(tag.as_bytes())
            .map_err(|source| Error::InvalidTag { tag: tag.to_string(), source })?;
        if !(minimum <= default && default <= maximum) {
            return Err(Error::InvalidAxisRange {
                tag: tag.to_string(),
                min: minimum,
                default,
                max: maximum,
            });
        }
        Ok(Self {
            tag: parsed,
            name: name.to_string(),
            minimum,
            default,
            maximum,
        })
    }

    /// Normalize a user-space value to the range [-1, 1].
    ///
    /// Out-of-range input is clamped to the axis bounds first.
    pub fn normalize(&self, value: f64) -> f64 {
        normalize_value(value, self)
    }

    /// Map a normalized value back to user-space.
    pub fn denormalize(&self, value: f64) -> f64 {
        if value > 0.0 {
            value * (self.maximum - self.default) + self.default
        } else {
            value * (self.default - self.minimum) + self.default
        }
    }
}

/// Normalize a user-space value against an axis.
///
/// Values below the default map to [-1, 0], values above it to [0, 1].
pub fn normalize_value(value: f64, axis: &Axis) -> f64 {
    let value = value.clamp(axis.minimum, axis.maximum);
    if value < axis.default {
        (value - axis.default) / (axis.default - axis.minimum)
    } else if value > axis.default {
        (value - axis.default) / (axis.maximum - axis.default)
    } else {
        0.0
    }
}

/// Normalize a user-space location against a set of axes.
///
/// Every known axis appears in the result; axes missing from the input sit at
/// their default. Coordinates for unknown axes are dropped.
pub fn normalize_location(location: &UserLocation, axes: &[Axis]) -> NormalizedLocation {
    axes.iter()
        .map(|axis| {
            let value = location.get(axis.tag).unwrap_or(axis.default);
            (axis.tag, normalize_value(value, axis))
        })
        .collect()
}

/// The all-default location over a set of axes.
pub fn default_location(axes: &[Axis]) -> NormalizedLocation {
    axes.iter().map(|axis| (axis.tag, 0.0)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weight() -> Axis {
        Axis::new("wght", "Weight", 100.0, 400.0, 900.0).unwrap()
    }

    #[test]
    fn axis_normalize() {
        let axis = weight();

        assert_eq!(axis.normalize(400.0), 0.0);
        assert_eq!(axis.normalize(100.0), -1.0);
        assert_eq!(axis.normalize(900.0), 1.0);
        assert!((axis.normalize(250.0) - (-0.5)).abs() < 1e-9);
        assert!((axis.normalize(650.0) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn axis_normalize_clamps() {
        let axis = weight();

        assert_eq!(axis.normalize(0.0), -1.0);
        assert_eq!(axis.normalize(1200.0), 1.0);
    }

    #[test]
    fn axis_normalize_default_at_minimum() {
        // Italic axis: 0-1 with default 0
        let axis = Axis::new("ital", "Italic", 0.0, 0.0, 1.0).unwrap();

        assert_eq!(axis.normalize(-1.0), 0.0);
        assert_eq!(axis.normalize(0.0), 0.0);
        assert_eq!(axis.normalize(0.5), 0.5);
    }

    #[test]
    fn axis_denormalize() {
        let axis = weight();

        assert_eq!(axis.denormalize(0.0), 400.0);
        assert_eq!(axis.denormalize(-1.0), 100.0);
        assert_eq!(axis.denormalize(0.5), 650.0);
    }

    #[test]
    fn axis_rejects_bad_input() {
        assert!(matches!(
            Axis::new("wght", "Weight", 500.0, 400.0, 900.0),
            Err(Error::InvalidAxisRange { .. })
        ));
        assert!(matches!(
            Axis::new("weight", "Weight", 100.0, 400.0, 900.0),
            Err(Error::InvalidTag { .. })
        ));
    }

    #[test]
    fn location_fills_missing_axes() {
        let axes = vec![weight(), Axis::new("wdth", "Width", 50.0, 100.0, 200.0).unwrap()];
        let user = UserLocation::new().with(Tag::new(b"wght"), 900.0);
        let normalized = normalize_location(&user, &axes);

        assert_eq!(normalized.len(), 2);
        assert_eq!(normalized.get(Tag::new(b"wght")), Some(1.0));
        assert_eq!(normalized.get(Tag::new(b"wdth")), Some(0.0));
    }

    #[test]
    fn default_location_is_all_zero() {
        let loc = default_location(&[weight()]);
        assert_eq!(loc.key(), "wght:0");
    }
}
