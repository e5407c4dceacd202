use bon::Builder;
use chrono::NaiveDate;
use tokio_util::sync::CancellationToken;

use crate::{
    forecast::{BatteryModel, LoadForecast, SolarForecast, TariffSchedule},
    optimizer::Optimizer,
    plan::{Plan, TimeSegment},
    prelude::*,
    quantity::{energy::Kwh, rate::ElectricityRate},
    segment::{DAY_SEGMENTS, SEGMENTS_PER_DAY, day_of_year},
    simulator::{SegmentConditions, Simulator},
};

/// The plan builder: owns the forecast ports, the battery model and the chosen
/// optimiser, and turns a date plus an initial state of charge into a fully
/// annotated daily plan.
///
/// A planning run is strictly ordered: read all forecasts, optimise, simulate.
/// The run itself is synchronous CPU work; only the forecast lookups await.
#[derive(Builder)]
pub struct Planner<S, L, T, B> {
    solar: S,
    load: L,
    tariffs: T,
    battery: B,
    #[builder(default)]
    optimizer: Optimizer,
}

impl<S, L, T, B> Planner<S, L, T, B>
where
    S: SolarForecast,
    L: LoadForecast,
    T: TariffSchedule,
    B: BatteryModel,
{
    pub async fn create_plan(&self, date: NaiveDate, initial_soc: Kwh) -> Result<Plan> {
        self.create_plan_with_cancellation(date, initial_soc, &CancellationToken::new()).await
    }

    /// Build the plan, stopping at the next optimiser boundary if the token is
    /// cancelled. A cancelled run discards its partial plan.
    #[instrument(skip_all, fields(%date, %initial_soc))]
    pub async fn create_plan_with_cancellation(
        &self,
        date: NaiveDate,
        initial_soc: Kwh,
        cancel: &CancellationToken,
    ) -> Result<Plan> {
        let capacity = self.battery.capacity();
        if initial_soc < Kwh::ZERO || initial_soc > capacity {
            return Err(Error::InvalidInput(format!(
                "initial state of charge {initial_soc} outside [0, {capacity}]",
            )));
        }

        let conditions = self.read_forecasts(date).await?;
        debug!(segments = conditions.len(), "materialised the forecasts");
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let modes = self.optimizer.optimize(&conditions, initial_soc, &self.battery, cancel)?;

        let simulator = Simulator::new(&self.battery);
        let outcomes = simulator.run(&conditions, &modes, initial_soc)?;

        let mut segments = Vec::with_capacity(SEGMENTS_PER_DAY);
        let mut soc = initial_soc;
        for (index, segment) in DAY_SEGMENTS.iter().enumerate() {
            let outcome = outcomes[index];
            segments.push(TimeSegment {
                segment: *segment,
                mode: modes[index],
                expected_solar: conditions[index].solar,
                expected_load: conditions[index].load,
                grid_price: conditions[index].price,
                start_soc: soc,
                end_soc: outcome.end_soc,
                actual_grid_usage: outcome.grid_usage,
                wasted_solar: outcome.wasted_solar,
            });
            soc = outcome.end_soc;
        }

        let plan = Plan { date, initial_soc, segments };
        plan.validate(capacity)?;
        info!(
            total_cost = %plan.total_cost(),
            wasted_solar = %plan.total_wasted_solar(),
            "planned the day",
        );
        Ok(plan)
    }

    /// Await every forecast for the day before any optimisation starts.
    async fn read_forecasts(&self, date: NaiveDate) -> Result<Vec<SegmentConditions>> {
        let day = day_of_year(date);
        let mut conditions = Vec::with_capacity(SEGMENTS_PER_DAY);
        for &segment in &DAY_SEGMENTS {
            let solar = self.solar.solar(day, segment).await?;
            let load = self.load.load(day, segment).await?;
            let price = self.tariffs.price(date, segment).await?;
            if solar < Kwh::ZERO {
                return Err(Error::InvalidInput(format!(
                    "solar forecast for {segment} is negative: {solar}",
                )));
            }
            if load < Kwh::ZERO {
                return Err(Error::InvalidInput(format!(
                    "load forecast for {segment} is negative: {load}",
                )));
            }
            if price < ElectricityRate::ZERO {
                return Err(Error::InvalidInput(format!(
                    "tariff for {segment} is negative: {price}",
                )));
            }
            conditions.push(SegmentConditions { solar, load, price });
        }
        Ok(conditions)
    }
}
