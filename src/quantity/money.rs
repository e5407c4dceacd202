use std::fmt::{Display, Formatter};

use rust_decimal::Decimal;

use crate::quantity::Quantity;

/// Pounds sterling.
///
/// Backed by a fixed-precision decimal, so equality and ordering of costs are
/// exact and never subject to binary floating point rounding.
pub type Gbp = Quantity<Decimal, 0, 1>;

impl Gbp {
    pub const ONE_PENNY: Self = Self(Decimal::from_parts(1, 0, 0, false, 2));

    /// Round to whole pence, half-up.
    #[must_use]
    pub fn round_to_pence(self) -> Self {
        Self(self.0.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero))
    }
}

impl Display for Gbp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "£{:.2}", self.round_to_pence().0)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::dec;

    use super::*;

    #[test]
    fn test_round_to_pence() {
        assert_eq!(Gbp::from(dec!(1.004)).round_to_pence(), Gbp::from(dec!(1.00)));
        assert_eq!(Gbp::from(dec!(1.005)).round_to_pence(), Gbp::from(dec!(1.01)));
    }

    #[test]
    fn test_display() {
        assert_eq!(Gbp::from(dec!(1.5)).to_string(), "£1.50");
        assert_eq!(Gbp::from(dec!(-0.125)).to_string(), "£-0.13");
    }

    #[test]
    fn test_one_penny() {
        assert_eq!(Gbp::ONE_PENNY, Gbp::from(dec!(0.01)));
    }
}
