use std::{
    fmt::{Display, Formatter},
    ops::Mul,
};

use rust_decimal::Decimal;

use crate::{
    error::{Error, Result},
    quantity::{Quantity, energy::Kwh, money::Gbp},
};

/// Pounds sterling per kilowatt-hour.
///
/// Tariffs are non-negative; the checked constructor is the gate for rates
/// arriving from a tariff port.
pub type ElectricityRate = Quantity<Decimal, -1, 1>;

impl ElectricityRate {
    pub fn new(value: Decimal) -> Result<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(Error::InvalidInput(format!("tariff must be non-negative, got {value} £/kWh")));
        }
        Ok(Self(value))
    }
}

impl Mul<Kwh> for ElectricityRate {
    type Output = Gbp;

    fn mul(self, rhs: Kwh) -> Self::Output {
        Gbp::from(self.0 * rhs.0)
    }
}

impl Display for ElectricityRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "£{}/kWh", self.0)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::dec;

    use super::*;

    #[test]
    fn test_negative_rate_is_rejected() {
        assert!(ElectricityRate::new(dec!(-1)).is_err());
        assert!(ElectricityRate::new(dec!(0.3)).is_ok());
    }

    #[test]
    fn test_rate_times_energy_is_money() {
        assert_eq!(ElectricityRate::from(dec!(4)) * Kwh::from(dec!(1.5)), Gbp::from(dec!(6)));
    }

    #[test]
    fn test_rate_scales_by_dimensionless() {
        assert_eq!(ElectricityRate::from(dec!(4)) * dec!(0.5), ElectricityRate::from(dec!(2)));
    }
}
