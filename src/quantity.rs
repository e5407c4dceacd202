pub mod energy;
pub mod money;
pub mod rate;

use std::ops::{Div, Mul};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Dimensional carrier for the value types.
///
/// `ENERGY` and `COST` are the exponents of the kilowatt-hour and pound-sterling
/// dimensions, so mismatched quantities simply do not type-check. The crate only
/// ever instantiates it through the [`energy::Kwh`], [`money::Gbp`] and
/// [`rate::ElectricityRate`] aliases.
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Eq,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    derive_more::Add,
    derive_more::AddAssign,
    derive_more::From,
    derive_more::FromStr,
    derive_more::Neg,
    derive_more::Sub,
    derive_more::SubAssign,
    derive_more::Sum,
)]
pub struct Quantity<T, const ENERGY: isize, const COST: isize>(pub T);

impl<T, const ENERGY: isize, const COST: isize> Quantity<T, ENERGY, COST>
where
    Self: PartialOrd,
{
    pub fn min(mut self, rhs: Self) -> Self {
        if rhs < self {
            self = rhs;
        }
        self
    }

    pub fn max(mut self, rhs: Self) -> Self {
        if rhs > self {
            self = rhs;
        }
        self
    }

    pub fn clamp(mut self, min: Self, max: Self) -> Self {
        if self < min {
            self = min;
        }
        if self > max {
            self = max;
        }
        self
    }
}

impl<const ENERGY: isize, const COST: isize> Quantity<Decimal, ENERGY, COST> {
    pub const ZERO: Self = Self(Decimal::ZERO);
    pub const ONE: Self = Self(Decimal::ONE);

    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }
}

impl<T, const ENERGY: isize, const COST: isize> Mul<T> for Quantity<T, ENERGY, COST>
where
    T: Mul<T>,
{
    type Output = Quantity<T::Output, ENERGY, COST>;

    fn mul(self, rhs: T) -> Self::Output {
        Quantity(self.0 * rhs)
    }
}

impl<T, const ENERGY: isize, const COST: isize> Div<T> for Quantity<T, ENERGY, COST>
where
    T: Div<T>,
{
    type Output = Quantity<T::Output, ENERGY, COST>;

    fn div(self, rhs: T) -> Self::Output {
        Quantity(self.0 / rhs)
    }
}
