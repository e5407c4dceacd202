use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{
    quantity::{energy::Kwh, rate::ElectricityRate},
    segment::HalfHourSegment,
};

/// Predicted solar yield for one segment of a day.
///
/// Implementations are read-only services backed by whatever model the caller
/// runs; their errors are surfaced through the planner unchanged.
#[async_trait]
pub trait SolarForecast: Send + Sync {
    async fn solar(&self, day_of_year: u32, segment: HalfHourSegment) -> anyhow::Result<Kwh>;
}

/// Predicted household consumption for one segment of a day.
#[async_trait]
pub trait LoadForecast: Send + Sync {
    async fn load(&self, day_of_year: u32, segment: HalfHourSegment) -> anyhow::Result<Kwh>;
}

/// Grid tariff for one segment of a calendar date.
#[async_trait]
pub trait TariffSchedule: Send + Sync {
    async fn price(&self, date: NaiveDate, segment: HalfHourSegment)
    -> anyhow::Result<ElectricityRate>;
}

/// Result of offering energy to the battery for one segment.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ChargeOutcome {
    /// State of charge after the segment, clamped to the capacity.
    pub end_soc: Kwh,

    /// Energy offered but not accepted because the battery was full.
    pub wastage: Kwh,
}

/// The battery as the simulator sees it.
///
/// [`predict`](Self::predict) must be pure: the simulator carries the state of
/// charge itself and is the sole caller. A lossy model can be substituted here
/// without touching the simulator's contract.
pub trait BatteryModel: Send + Sync {
    /// Usable capacity, constant for a planning run.
    fn capacity(&self) -> Kwh;

    /// Maximum energy accepted from the grid during one segment in a
    /// grid-charging mode.
    fn grid_charge_per_segment(&self) -> Kwh;

    /// Accumulate `available` on top of `start_soc`, clamping at the capacity
    /// and reporting the overflow as wastage.
    fn predict(&self, start_soc: Kwh, available: Kwh) -> ChargeOutcome;
}
