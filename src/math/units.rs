//! A small unit-conversion map covering the fixed, closed set of units the
//! rest of this crate needs (general-purpose unit-conversion scaffolding for
//! a host application is out of scope).
//!
//! No unit-conversion crate is in the dependency stack, so this follows the
//! same shape as other small enum-keyed lookup tables elsewhere in this
//! crate (e.g. `TrimCondition`/`WindConfig` match tables): a closed enum
//! plus a conversion function, rather than a string-keyed graph, since the
//! unit set in scope is fixed and small.

use crate::error::FlightCoreError;

/// Units in the conversion map's closed vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    Meter,
    Meter2,
    Foot,
    Foot2,
    Inch,
    Pound,
    Kilogram,
    SlugFoot2,
    KilogramMeter2,
    Radian,
    Degree,
    PoundPerFoot,
    PoundPerFootPerSecond,
}

impl Unit {
    /// Dimension family; a conversion edge only exists between units of the
    /// same family.
    fn family(self) -> UnitFamily {
        use Unit::*;
        match self {
            Meter | Foot | Inch => UnitFamily::Length,
            Meter2 | Foot2 => UnitFamily::Area,
            Pound | Kilogram => UnitFamily::Mass,
            SlugFoot2 | KilogramMeter2 => UnitFamily::MomentOfInertia,
            Radian | Degree => UnitFamily::Angle,
            PoundPerFoot => UnitFamily::Stiffness,
            PoundPerFootPerSecond => UnitFamily::Damping,
        }
    }

    /// Factor to convert a value in this unit into the family's base unit
    /// (meter, square meter, kilogram, kg·m², radian, N/m, N·s/m).
    fn to_base(self) -> f64 {
        use Unit::*;
        match self {
            Meter => 1.0,
            Foot => 0.3048,
            Inch => 0.0254,
            Meter2 => 1.0,
            Foot2 => 0.3048 * 0.3048,
            Pound => 0.453_592_37,
            Kilogram => 1.0,
            SlugFoot2 => 1.355_817_96,
            KilogramMeter2 => 1.0,
            Radian => 1.0,
            Degree => std::f64::consts::PI / 180.0,
            PoundPerFoot => 14.593_902_9,
            PoundPerFootPerSecond => 14.593_902_9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UnitFamily {
    Length,
    Area,
    Mass,
    MomentOfInertia,
    Angle,
    Stiffness,
    Damping,
}

/// Converts `value` from `from` to `to`. Fails with [`FlightCoreError::UnknownUnit`]
/// when either unit has no conversion edge to the other (i.e. different
/// dimension families).
pub fn convert(value: f64, from: Unit, to: Unit) -> Result<f64, FlightCoreError> {
    if from.family() != to.family() {
        return Err(FlightCoreError::UnknownUnit(format!(
            "no conversion edge between {from:?} and {to:?}"
        )));
    }
    Ok(value * from.to_base() / to.to_base())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn feet_to_meters() {
        let v = convert(1.0, Unit::Foot, Unit::Meter).unwrap();
        assert_relative_eq!(v, 0.3048);
    }

    #[test]
    fn round_trip_identity() {
        let v = convert(100.0, Unit::Foot, Unit::Meter).unwrap();
        let back = convert(v, Unit::Meter, Unit::Foot).unwrap();
        assert_relative_eq!(back, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn mismatched_family_fails() {
        let err = convert(1.0, Unit::Foot, Unit::Degree).unwrap_err();
        assert!(matches!(err, FlightCoreError::UnknownUnit(_)));
    }

    #[test]
    fn degrees_radians() {
        let v = convert(180.0, Unit::Degree, Unit::Radian).unwrap();
        assert_relative_eq!(v, std::f64::consts::PI, epsilon = 1e-12);
    }
}
