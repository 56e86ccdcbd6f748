use serde::{Deserialize, Serialize};

use stockpack_core::ValueObject;

/// Product quantity in the product's unit of measure.
///
/// Comparisons go through [`Quantity::ROUNDING`] so that values accumulated
/// from several moves still compare equal to the demand they add up to.
#[derive(Debug, Copy, Clone, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(f64);

impl ValueObject for Quantity {}

impl Quantity {
    /// Smallest difference treated as significant.
    pub const ROUNDING: f64 = 1e-6;

    pub const ZERO: Quantity = Quantity(0.0);

    pub fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0.abs() < Self::ROUNDING
    }

    /// `self >= other` within rounding.
    pub fn covers(self, other: Quantity) -> bool {
        self.0 - other.0 > -Self::ROUNDING
    }

    pub fn min(self, other: Quantity) -> Quantity {
        if self.0 <= other.0 { self } else { other }
    }

    /// Difference clamped at zero.
    pub fn saturating_sub(self, other: Quantity) -> Quantity {
        Quantity((self.0 - other.0).max(0.0))
    }
}

impl core::ops::Add for Quantity {
    type Output = Quantity;

    fn add(self, rhs: Quantity) -> Quantity {
        Quantity(self.0 + rhs.0)
    }
}

impl core::ops::AddAssign for Quantity {
    fn add_assign(&mut self, rhs: Quantity) {
        self.0 += rhs.0;
    }
}

impl From<f64> for Quantity {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl core::fmt::Display for Quantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covers_tolerates_accumulated_rounding() {
        let sum = Quantity::new(0.1) + Quantity::new(0.2);
        assert!(sum.covers(Quantity::new(0.3)));
        assert!(!Quantity::new(2.0).covers(Quantity::new(2.5)));
    }

    #[test]
    fn saturating_sub_never_goes_negative() {
        assert_eq!(Quantity::new(3.0).saturating_sub(Quantity::new(5.0)), Quantity::ZERO);
        assert_eq!(Quantity::new(5.0).saturating_sub(Quantity::new(3.0)), Quantity::new(2.0));
    }
}
