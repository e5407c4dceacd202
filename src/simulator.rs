use rust_decimal::Decimal;

use crate::{
    forecast::BatteryModel,
    mode::Mode,
    prelude::*,
    quantity::{energy::Kwh, rate::ElectricityRate},
    segment::{HalfHourSegment, SEGMENTS_PER_DAY},
};

/// Per-segment inputs gathered from the forecast ports.
#[derive(Clone, Copy, Debug)]
pub struct SegmentConditions {
    pub solar: Kwh,
    pub load: Kwh,
    pub price: ElectricityRate,
}

/// Outcome of running one segment.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StepOutcome {
    pub end_soc: Kwh,
    pub grid_usage: Kwh,
    pub wasted_solar: Kwh,
}

/// Deterministic house energy balance.
///
/// A single left-to-right pass over the day: each segment's outcome is a pure
/// function of the mode, the forecasts and the state of charge carried over
/// from the previous segment, so re-simulating an annotated plan reproduces it
/// bit for bit.
pub struct Simulator<'a> {
    battery: &'a dyn BatteryModel,
}

impl<'a> Simulator<'a> {
    #[must_use]
    pub const fn new(battery: &'a dyn BatteryModel) -> Self {
        Self { battery }
    }

    /// Run one segment in the given mode.
    #[must_use]
    pub fn step(&self, mode: Mode, start_soc: Kwh, conditions: SegmentConditions) -> StepOutcome {
        match mode {
            Mode::ChargeSolarOnly => {
                let charge = self.battery.predict(start_soc, conditions.solar);
                StepOutcome {
                    end_soc: charge.end_soc,
                    grid_usage: conditions.load,
                    wasted_solar: charge.wastage,
                }
            }
            Mode::ChargeFromGridAndSolar => {
                let allowance = self.battery.grid_charge_per_segment();
                let charge = self.battery.predict(start_soc, conditions.solar + allowance);
                // The overshoot is attributed 50/50 to wasted solar and unused
                // grid. The unused-grid half cannot exceed the allowance; the
                // remainder stays on the solar side so the balance closes.
                let half = charge.wastage / Decimal::TWO;
                let unused_grid = half.min(allowance);
                let effective_grid_charge = allowance.saturating_sub(unused_grid);
                StepOutcome {
                    end_soc: charge.end_soc,
                    grid_usage: conditions.load + effective_grid_charge,
                    wasted_solar: charge.wastage.saturating_sub(unused_grid),
                }
            }
            Mode::Discharge => {
                if conditions.solar >= conditions.load {
                    let surplus = conditions.solar.saturating_sub(conditions.load);
                    let charge = self.battery.predict(start_soc, surplus);
                    StepOutcome {
                        end_soc: charge.end_soc,
                        grid_usage: Kwh::ZERO,
                        wasted_solar: charge.wastage,
                    }
                } else {
                    let deficit = conditions.load.saturating_sub(conditions.solar);
                    let from_battery = start_soc.min(deficit);
                    StepOutcome {
                        end_soc: start_soc.saturating_sub(from_battery),
                        grid_usage: deficit.saturating_sub(from_battery),
                        wasted_solar: Kwh::ZERO,
                    }
                }
            }
        }
    }

    /// Simulate a sequence of segments, carrying the state of charge forward.
    ///
    /// Enforces the per-segment invariants: the state of charge stays within
    /// `[0, capacity]`, flows are non-negative, and the accounting identity
    /// `solar + grid + (start − end) == load + wasted` holds exactly.
    pub fn run(
        &self,
        conditions: &[SegmentConditions],
        modes: &[Mode],
        initial_soc: Kwh,
    ) -> Result<Vec<StepOutcome>> {
        if conditions.len() != modes.len() {
            return Err(Error::InvalidInput(format!(
                "{} segments of conditions but {} modes",
                conditions.len(),
                modes.len(),
            )));
        }
        if conditions.len() > SEGMENTS_PER_DAY {
            return Err(Error::InvalidInput(format!(
                "a plan covers at most {SEGMENTS_PER_DAY} segments, got {}",
                conditions.len(),
            )));
        }

        let mut soc = initial_soc;
        let mut outcomes = Vec::with_capacity(conditions.len());
        for (index, (&mode, &segment_conditions)) in modes.iter().zip(conditions).enumerate() {
            let outcome = self.step(mode, soc, segment_conditions);
            self.check_step(index, soc, segment_conditions, outcome)?;
            trace!(
                segment = index,
                %mode,
                end_soc = %outcome.end_soc,
                grid_usage = %outcome.grid_usage,
                "simulated segment",
            );
            soc = outcome.end_soc;
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    fn check_step(
        &self,
        index: usize,
        start_soc: Kwh,
        conditions: SegmentConditions,
        outcome: StepOutcome,
    ) -> Result {
        let segment = HalfHourSegment::at(index);
        let capacity = self.battery.capacity();
        if outcome.end_soc < Kwh::ZERO || outcome.end_soc > capacity {
            return Err(Error::InvariantViolation {
                segment,
                detail: format!("state of charge {} outside [0, {capacity}]", outcome.end_soc),
            });
        }
        if outcome.grid_usage < Kwh::ZERO {
            return Err(Error::InvariantViolation {
                segment,
                detail: format!("negative grid usage {}", outcome.grid_usage),
            });
        }
        if outcome.wasted_solar < Kwh::ZERO {
            return Err(Error::InvariantViolation {
                segment,
                detail: format!("negative wasted solar {}", outcome.wasted_solar),
            });
        }
        let balance = conditions.solar.0 + outcome.grid_usage.0 + start_soc.0
            - outcome.end_soc.0
            - conditions.load.0
            - outcome.wasted_solar.0;
        if !balance.is_zero() {
            return Err(Error::InvariantViolation {
                segment,
                detail: format!("energy balance off by {balance} kWh"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::dec;

    use super::*;
    use crate::battery::{BatteryParameters, SimpleBattery};

    fn battery() -> SimpleBattery {
        SimpleBattery::new(
            BatteryParameters::builder()
                .capacity(Kwh::from(dec!(10)))
                .grid_charge_per_segment(Kwh::from(dec!(2)))
                .build(),
        )
    }

    fn conditions(solar: Decimal, load: Decimal, price: Decimal) -> SegmentConditions {
        SegmentConditions {
            solar: Kwh::from(solar),
            load: Kwh::from(load),
            price: ElectricityRate::from(price),
        }
    }

    #[test]
    fn test_charge_solar_only_feeds_the_battery_and_grids_the_load() {
        let battery = battery();
        let outcome = Simulator::new(&battery).step(
            Mode::ChargeSolarOnly,
            Kwh::from(dec!(1)),
            conditions(dec!(3), dec!(2), dec!(4)),
        );
        assert_eq!(outcome.end_soc, Kwh::from(dec!(4)));
        assert_eq!(outcome.grid_usage, Kwh::from(dec!(2)));
        assert_eq!(outcome.wasted_solar, Kwh::ZERO);
    }

    #[test]
    fn test_charge_from_grid_and_solar_within_capacity() {
        let battery = battery();
        let outcome = Simulator::new(&battery).step(
            Mode::ChargeFromGridAndSolar,
            Kwh::from(dec!(1)),
            conditions(dec!(3), dec!(2), dec!(4)),
        );
        // Battery takes 3 solar + 2 grid; the load and the grid charge both
        // come off the grid.
        assert_eq!(outcome.end_soc, Kwh::from(dec!(6)));
        assert_eq!(outcome.grid_usage, Kwh::from(dec!(4)));
        assert_eq!(outcome.wasted_solar, Kwh::ZERO);
    }

    #[test]
    fn test_charge_from_grid_and_solar_splits_the_overshoot() {
        let battery = battery();
        let outcome = Simulator::new(&battery).step(
            Mode::ChargeFromGridAndSolar,
            Kwh::from(dec!(9)),
            conditions(dec!(2), dec!(1), dec!(4)),
        );
        // Offered 2 solar + 2 grid on top of 9: overshoot 3, split 1.5/1.5.
        assert_eq!(outcome.end_soc, Kwh::from(dec!(10)));
        assert_eq!(outcome.wasted_solar, Kwh::from(dec!(1.5)));
        assert_eq!(outcome.grid_usage, Kwh::from(dec!(1.5)));
    }

    #[test]
    fn test_charge_overshoot_beyond_the_allowance_stays_on_the_solar_side() {
        let battery = battery();
        let outcome = Simulator::new(&battery).step(
            Mode::ChargeFromGridAndSolar,
            Kwh::from(dec!(8)),
            conditions(dec!(8), dec!(0), dec!(4)),
        );
        // Offered 8 solar + 2 grid on top of 8: overshoot 8; half exceeds the
        // grid allowance, so the grid contributes nothing and 6 solar is lost.
        assert_eq!(outcome.end_soc, Kwh::from(dec!(10)));
        assert_eq!(outcome.grid_usage, Kwh::ZERO);
        assert_eq!(outcome.wasted_solar, Kwh::from(dec!(6)));
    }

    #[test]
    fn test_discharge_with_surplus_charges_the_battery() {
        let battery = battery();
        let outcome = Simulator::new(&battery).step(
            Mode::Discharge,
            Kwh::from(dec!(9)),
            conditions(dec!(5), dec!(2), dec!(4)),
        );
        assert_eq!(outcome.end_soc, Kwh::from(dec!(10)));
        assert_eq!(outcome.grid_usage, Kwh::ZERO);
        assert_eq!(outcome.wasted_solar, Kwh::from(dec!(2)));
    }

    #[test]
    fn test_discharge_with_deficit_drains_the_battery_then_the_grid() {
        let battery = battery();
        let outcome = Simulator::new(&battery).step(
            Mode::Discharge,
            Kwh::from(dec!(1.5)),
            conditions(dec!(1), dec!(5), dec!(4)),
        );
        assert_eq!(outcome.end_soc, Kwh::ZERO);
        assert_eq!(outcome.grid_usage, Kwh::from(dec!(2.5)));
        assert_eq!(outcome.wasted_solar, Kwh::ZERO);
    }

    #[test]
    fn test_run_carries_the_state_of_charge_forward() {
        let battery = battery();
        let simulator = Simulator::new(&battery);
        let day = [conditions(dec!(4), dec!(1), dec!(2)); 3];
        let modes = [Mode::ChargeSolarOnly, Mode::ChargeSolarOnly, Mode::Discharge];
        let outcomes = simulator.run(&day, &modes, Kwh::ZERO).unwrap();
        assert_eq!(outcomes[0].end_soc, Kwh::from(dec!(4)));
        assert_eq!(outcomes[1].end_soc, Kwh::from(dec!(8)));
        // Surplus 3 tops the battery up to 10 and wastes 1.
        assert_eq!(outcomes[2].end_soc, Kwh::from(dec!(10)));
        assert_eq!(outcomes[2].wasted_solar, Kwh::from(dec!(1)));
        assert_eq!(outcomes[2].grid_usage, Kwh::ZERO);
    }

    #[test]
    fn test_an_idle_segment_is_free_unless_grid_charging() {
        let battery = battery();
        let simulator = Simulator::new(&battery);
        let idle = conditions(dec!(0), dec!(0), dec!(4));
        for mode in [Mode::Discharge, Mode::ChargeSolarOnly] {
            let outcome = simulator.step(mode, Kwh::from(dec!(3)), idle);
            assert_eq!(outcome.grid_usage, Kwh::ZERO);
            assert_eq!(outcome.end_soc, Kwh::from(dec!(3)));
            assert_eq!(outcome.wasted_solar, Kwh::ZERO);
        }
        // Grid charging still buys energy for the battery.
        let outcome = simulator.step(Mode::ChargeFromGridAndSolar, Kwh::from(dec!(3)), idle);
        assert_eq!(outcome.grid_usage, Kwh::from(dec!(2)));
        assert_eq!(outcome.end_soc, Kwh::from(dec!(5)));
    }

    #[test]
    fn test_run_is_idempotent() {
        let battery = battery();
        let simulator = Simulator::new(&battery);
        let day = [
            conditions(dec!(0), dec!(1), dec!(2)),
            conditions(dec!(3), dec!(1), dec!(7)),
            conditions(dec!(1), dec!(2), dec!(7)),
        ];
        let modes = [Mode::ChargeFromGridAndSolar, Mode::Discharge, Mode::Discharge];
        let first = simulator.run(&day, &modes, Kwh::from(dec!(1))).unwrap();
        let second = simulator.run(&day, &modes, Kwh::from(dec!(1))).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_run_rejects_mismatched_lengths() {
        let battery = battery();
        let simulator = Simulator::new(&battery);
        let day = [conditions(dec!(0), dec!(1), dec!(2)); 2];
        assert!(matches!(
            simulator.run(&day, &[Mode::Discharge], Kwh::ZERO),
            Err(Error::InvalidInput(_)),
        ));
    }
}
