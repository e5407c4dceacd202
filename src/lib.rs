#![doc = include_str!("../README.md")]

pub mod battery;
pub mod error;
pub mod forecast;
pub mod mode;
pub mod optimizer;
pub mod plan;
pub mod planner;
mod prelude;
pub mod quantity;
pub mod render;
pub mod segment;
pub mod simulator;

pub use crate::{
    battery::{BatteryParameters, SimpleBattery},
    error::{Error, Result},
    forecast::{BatteryModel, ChargeOutcome, LoadForecast, SolarForecast, TariffSchedule},
    mode::Mode,
    optimizer::{DpParams, GeneticParams, GraphParams, Optimizer},
    plan::{Plan, TimeSegment},
    planner::Planner,
    quantity::{energy::Kwh, money::Gbp, rate::ElectricityRate},
    segment::{DAY_SEGMENTS, HalfHourSegment, SEGMENTS_PER_DAY, day_of_year, in_hours},
    simulator::{SegmentConditions, Simulator, StepOutcome},
};
