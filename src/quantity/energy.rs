use std::{
    fmt::{Display, Formatter},
    ops::Mul,
};

use rust_decimal::Decimal;

use crate::{
    error::{Error, Result},
    quantity::{Quantity, money::Gbp, rate::ElectricityRate},
};

/// Kilowatt-hours.
///
/// Energy is non-negative by contract: the checked constructor rejects negative
/// values, and the simulator only ever subtracts through [`Kwh::saturating_sub`]
/// or after comparing the operands.
pub type Kwh = Quantity<Decimal, 1, 0>;

impl Kwh {
    pub fn new(value: Decimal) -> Result<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(Error::InvalidInput(format!("energy must be non-negative, got {value} kWh")));
        }
        Ok(Self(value))
    }

    /// Subtraction clamped at zero.
    #[must_use]
    pub fn saturating_sub(self, rhs: Self) -> Self {
        if rhs >= self { Self::ZERO } else { Self(self.0 - rhs.0) }
    }
}

impl Mul<ElectricityRate> for Kwh {
    type Output = Gbp;

    fn mul(self, rhs: ElectricityRate) -> Self::Output {
        Gbp::from(self.0 * rhs.0)
    }
}

impl Display for Kwh {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} kWh", self.0)
    }
}
