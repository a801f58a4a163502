//! Pure validation rules applied before any store mutation.

use std::fmt;

use crate::errors::ServiceError;

/// Coordinate axis of a location pin, used to name the failing axis
/// in range violations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "X"),
            Axis::Y => write!(f, "Y"),
        }
    }
}

/// Checks that a fractional coordinate lies in the closed unit interval.
///
/// Coordinates are fractions of the map image's bounding box, independent
/// of its pixel resolution, so any finite value in `[0, 1]` is acceptable.
pub fn check_coordinate(axis: Axis, value: f64) -> Result<(), ServiceError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ServiceError::CoordinateRange { axis, value })
    }
}

/// Rejects absent or blank required text fields.
pub fn require_field(name: &str, value: &str) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        Err(ServiceError::MissingField(name.to_string()))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0)]
    #[case(1.0)]
    #[case(0.5)]
    #[case(0.000_001)]
    #[case(0.999_999)]
    fn accepts_coordinates_inside_unit_interval(#[case] value: f64) {
        assert!(check_coordinate(Axis::X, value).is_ok());
        assert!(check_coordinate(Axis::Y, value).is_ok());
    }

    #[rstest]
    #[case(-0.000_001)]
    #[case(1.000_001)]
    #[case(1.5)]
    #[case(-3.0)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    #[case(f64::NEG_INFINITY)]
    fn rejects_coordinates_outside_unit_interval(#[case] value: f64) {
        let err = check_coordinate(Axis::X, value).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::CoordinateRange { axis: Axis::X, .. }
        ));
    }

    #[test]
    fn violation_names_the_failing_axis() {
        let err = check_coordinate(Axis::Y, 2.0).unwrap_err();
        assert!(err.to_string().starts_with("Y coordinate"));
    }

    #[test]
    fn require_field_rejects_empty_and_blank() {
        assert!(require_field("name", "").is_err());
        assert!(require_field("name", "   ").is_err());
        assert!(require_field("name", "HQ").is_ok());

        let err = require_field("floor", "").unwrap_err();
        assert_eq!(err.to_string(), "Missing required field: floor");
    }
}
