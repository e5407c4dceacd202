use chrono::NaiveDate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    mode::Mode,
    prelude::*,
    quantity::{energy::Kwh, money::Gbp, rate::ElectricityRate},
    segment::{HalfHourSegment, SEGMENTS_PER_DAY},
};

/// One half-hour row of the daily plan: the forecast inputs, the chosen mode
/// and the simulated outputs.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TimeSegment {
    pub segment: HalfHourSegment,
    pub mode: Mode,

    pub expected_solar: Kwh,
    pub expected_load: Kwh,
    pub grid_price: ElectricityRate,

    pub start_soc: Kwh,
    pub end_soc: Kwh,
    pub actual_grid_usage: Kwh,
    pub wasted_solar: Kwh,
}

impl TimeSegment {
    /// Money paid to the grid over this segment. Wasted solar is not monetised.
    #[must_use]
    pub fn cost(&self) -> Gbp {
        self.actual_grid_usage * self.grid_price
    }
}

/// The annotated daily plan: exactly one row per half-hour segment.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Plan {
    pub date: NaiveDate,
    pub initial_soc: Kwh,
    pub segments: Vec<TimeSegment>,
}

impl Plan {
    #[must_use]
    pub fn total_cost(&self) -> Gbp {
        self.segments.iter().map(TimeSegment::cost).sum()
    }

    #[must_use]
    pub fn total_wasted_solar(&self) -> Kwh {
        self.segments.iter().map(|row| row.wasted_solar).sum()
    }

    #[must_use]
    pub fn total_grid_usage(&self) -> Kwh {
        self.segments.iter().map(|row| row.actual_grid_usage).sum()
    }

    /// Post-simulation validation.
    ///
    /// Checks the row count, the initial state of charge, the per-row bounds
    /// and the state-of-charge continuity between neighbouring rows. Any
    /// violation is fatal and names the offending segment.
    pub fn validate(&self, capacity: Kwh) -> Result {
        if self.segments.len() != SEGMENTS_PER_DAY {
            return Err(Error::InvalidInput(format!(
                "a plan must cover {SEGMENTS_PER_DAY} segments, got {}",
                self.segments.len(),
            )));
        }
        let first = &self.segments[0];
        if first.start_soc != self.initial_soc {
            return Err(Error::InvariantViolation {
                segment: first.segment,
                detail: format!(
                    "plan starts at {} but the initial state of charge is {}",
                    first.start_soc, self.initial_soc,
                ),
            });
        }
        for row in &self.segments {
            for (name, soc) in [("start", row.start_soc), ("end", row.end_soc)] {
                if soc < Kwh::ZERO || soc > capacity {
                    return Err(Error::InvariantViolation {
                        segment: row.segment,
                        detail: format!("{name} state of charge {soc} outside [0, {capacity}]"),
                    });
                }
            }
            if row.actual_grid_usage < Kwh::ZERO {
                return Err(Error::InvariantViolation {
                    segment: row.segment,
                    detail: format!("negative grid usage {}", row.actual_grid_usage),
                });
            }
            if row.wasted_solar < Kwh::ZERO {
                return Err(Error::InvariantViolation {
                    segment: row.segment,
                    detail: format!("negative wasted solar {}", row.wasted_solar),
                });
            }
        }
        for (previous, next) in self.segments.iter().tuple_windows() {
            if previous.end_soc != next.start_soc {
                return Err(Error::InvariantViolation {
                    segment: next.segment,
                    detail: format!(
                        "state of charge jumps from {} to {}",
                        previous.end_soc, next.start_soc,
                    ),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::{Decimal, dec};

    use super::*;
    use crate::segment::DAY_SEGMENTS;

    fn flat_plan() -> Plan {
        let segments = DAY_SEGMENTS
            .iter()
            .map(|&segment| TimeSegment {
                segment,
                mode: Mode::Discharge,
                expected_solar: Kwh::ZERO,
                expected_load: Kwh::from(dec!(1)),
                grid_price: ElectricityRate::from(dec!(0.25)),
                start_soc: Kwh::ZERO,
                end_soc: Kwh::ZERO,
                actual_grid_usage: Kwh::from(dec!(1)),
                wasted_solar: Kwh::ZERO,
            })
            .collect();
        Plan {
            date: NaiveDate::from_ymd_opt(2025, 6, 21).unwrap(),
            initial_soc: Kwh::ZERO,
            segments,
        }
    }

    #[test]
    fn test_total_cost_is_the_sum_of_segment_costs() {
        let plan = flat_plan();
        let by_hand: Gbp = plan.segments.iter().map(|row| row.grid_price * row.actual_grid_usage).sum();
        assert_eq!(plan.total_cost(), by_hand);
        assert_eq!(plan.total_cost(), Gbp::from(dec!(12)));
    }

    #[test]
    fn test_zero_price_means_zero_cost() {
        let mut plan = flat_plan();
        for row in &mut plan.segments {
            row.grid_price = ElectricityRate::ZERO;
        }
        assert_eq!(plan.total_cost(), Gbp::ZERO);
    }

    #[test]
    fn test_validate_accepts_a_well_formed_plan() {
        assert!(flat_plan().validate(Kwh::from(dec!(10))).is_ok());
    }

    #[test]
    fn test_validate_names_the_segment_with_a_broken_chain() {
        let mut plan = flat_plan();
        plan.segments[7].start_soc = Kwh::from(dec!(1));
        plan.segments[7].end_soc = Kwh::from(dec!(1));
        let error = plan.validate(Kwh::from(dec!(10))).unwrap_err();
        match error {
            Error::InvariantViolation { segment, .. } => {
                assert_eq!(segment, DAY_SEGMENTS[7]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_validate_rejects_an_over_capacity_state_of_charge() {
        let mut plan = flat_plan();
        plan.segments[3].end_soc = Kwh::from(Decimal::from(11));
        plan.segments[4].start_soc = Kwh::from(Decimal::from(11));
        assert!(matches!(
            plan.validate(Kwh::from(dec!(10))),
            Err(Error::InvariantViolation { .. }),
        ));
    }

    #[test]
    fn test_validate_rejects_a_short_plan() {
        let mut plan = flat_plan();
        plan.segments.truncate(12);
        assert!(matches!(plan.validate(Kwh::from(dec!(10))), Err(Error::InvalidInput(_))));
    }
}
