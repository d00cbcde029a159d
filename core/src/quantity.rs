use crate::dimension::PhysicalDimension;
use crate::error::ContourError;
use crate::units::{UnitRegistry, UnitSpec};

/// A finite magnitude paired with a resolved unit.
///
/// Axis bounds and steps go through this type on the way to base units, so
/// a value that overflows on conversion is rejected rather than sampled.
#[derive(Debug, Clone, PartialEq)]
pub struct Quantity {
    magnitude: f64,
    unit: UnitSpec,
}

impl Quantity {
    pub fn new(magnitude: f64, unit: &str, registry: &UnitRegistry) -> Result<Self, ContourError> {
        Self::from_spec(magnitude, registry.resolve(unit)?)
    }

    pub fn from_spec(magnitude: f64, unit: UnitSpec) -> Result<Self, ContourError> {
        if !magnitude.is_finite() {
            return Err(ContourError::config(format!(
                "quantity magnitude must be finite, got {} {}",
                magnitude,
                unit.display_name()
            )));
        }
        Ok(Self { magnitude, unit })
    }

    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    pub fn unit(&self) -> &UnitSpec {
        &self.unit
    }

    pub fn dimension(&self) -> PhysicalDimension {
        self.unit.dimension
    }

    /// The same quantity expressed in the base unit of its dimension.
    ///
    /// Fails when the converted magnitude overflows.
    pub fn to_base(&self) -> Result<Quantity, ContourError> {
        Quantity::from_spec(
            self.unit.to_base(self.magnitude),
            UnitSpec::base(self.unit.dimension),
        )
    }

    /// Converts to `target`, which must share this quantity's dimension.
    pub fn to_unit(&self, target: &UnitSpec) -> Result<Quantity, ContourError> {
        if target.dimension != self.unit.dimension {
            return Err(ContourError::Dimensionality {
                stage: "unit conversion",
                actual: self.unit.dimension,
                expected: target.dimension,
            });
        }
        Quantity::from_spec(
            target.from_base(self.unit.to_base(self.magnitude)),
            target.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> &'static UnitRegistry {
        UnitRegistry::global()
    }

    fn rel_close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol * a.abs().max(b.abs())
    }

    #[test]
    fn base_round_trip_recovers_magnitude() {
        for (magnitude, unit) in [
            (3.7, "inch"),
            (12.0, "minutes"),
            (0.25, "mile/hour"),
            (1e-7, "mg"),
            (42.0, "kWh"),
            (9.81, "m/s**2"),
        ] {
            let q = Quantity::new(magnitude, unit, registry()).expect(unit);
            let back = q.to_base().expect("base").to_unit(q.unit()).expect("back");
            assert!(
                rel_close(back.magnitude(), magnitude, 1e-9),
                "{} {} -> {}",
                magnitude,
                unit,
                back.magnitude()
            );
        }
    }

    #[test]
    fn conversion_between_units_of_same_dimension() {
        let q = Quantity::new(36.0, "kph", registry()).expect("kph");
        let mps = registry().resolve("m/s").expect("m/s");
        let converted = q.to_unit(&mps).expect("convert");
        assert!(rel_close(converted.magnitude(), 10.0, 1e-12));
    }

    #[test]
    fn conversion_across_dimensions_fails() {
        let q = Quantity::new(1.0, "m", registry()).expect("m");
        let second = registry().resolve("s").expect("s");
        let err = q.to_unit(&second).expect_err("mismatch");
        assert_eq!(err.code(), "E_DIMENSIONALITY");
    }

    #[test]
    fn non_finite_magnitude_is_rejected() {
        assert!(Quantity::new(f64::NAN, "m", registry()).is_err());
        assert!(Quantity::new(f64::INFINITY, "m", registry()).is_err());
    }

    #[test]
    fn overflowing_base_conversion_is_rejected() {
        let q = Quantity::new(1e306, "km", registry()).expect("km");
        assert_eq!(q.to_base().expect_err("overflow").code(), "E_CONFIG");
    }

    #[test]
    fn unresolvable_unit_fails_construction() {
        let err = Quantity::new(1.0, "furlongs_per_fortnight", registry()).expect_err("unit");
        assert_eq!(err.code(), "E_UNIT_UNDEFINED");
    }
}
