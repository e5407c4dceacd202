use bon::Builder;
use enumset::EnumSet;
use rust_decimal::dec;
use tokio_util::sync::CancellationToken;

use crate::{
    forecast::BatteryModel,
    mode::Mode,
    optimizer::{Lattice, ensure_some_mode, modes_in_order, objective},
    prelude::*,
    quantity::{energy::Kwh, money::Gbp, rate::ElectricityRate},
    simulator::{SegmentConditions, Simulator},
};

/// Parameters of the backward value iteration.
#[derive(Builder, Clone, Copy, Debug)]
pub struct DpParams {
    /// Number of state-of-charge steps; the lattice has `soc_steps + 1` levels.
    #[builder(default = 20)]
    pub soc_steps: usize,

    /// Objective-only surcharge per kilowatt-hour of spilled solar.
    #[builder(default = ElectricityRate::from(dec!(5)))]
    pub waste_penalty: ElectricityRate,

    #[builder(default = EnumSet::all())]
    pub allowed_modes: EnumSet<Mode>,
}

impl Default for DpParams {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Cheapest mode sequence by stage-indexed value iteration.
///
/// Works backwards from the terminal stage, where the remaining cost is zero,
/// keeping only the next stage's values; the policy table is then read forward
/// from the initial state. Ties keep the earliest-ranked mode, matching the
/// shortest-path search on the same lattice.
pub(super) fn optimize(
    params: &DpParams,
    conditions: &[SegmentConditions],
    initial_soc: Kwh,
    battery: &dyn BatteryModel,
    cancel: &CancellationToken,
) -> Result<Vec<Mode>> {
    ensure_some_mode(params.allowed_modes)?;
    let lattice = Lattice::try_new(battery.capacity(), params.soc_steps)?;
    let simulator = Simulator::new(battery);

    let mut value_next: Vec<Gbp> = vec![Gbp::ZERO; lattice.levels()];
    let mut policy: Vec<Vec<Mode>> = Vec::with_capacity(conditions.len());
    for &segment_conditions in conditions.iter().rev() {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let mut value_here = Vec::with_capacity(lattice.levels());
        let mut policy_here = Vec::with_capacity(lattice.levels());
        for level in 0..lattice.levels() {
            let mut best: Option<(Gbp, Mode)> = None;
            for mode in modes_in_order(params.allowed_modes) {
                let outcome = simulator.step(mode, lattice.soc_of(level), segment_conditions);
                let remaining = objective(&outcome, segment_conditions.price, params.waste_penalty)
                    + value_next[lattice.level_of(outcome.end_soc)];
                if best.is_none_or(|(incumbent, _)| remaining < incumbent) {
                    best = Some((remaining, mode));
                }
            }
            let (value, mode) = best
                .ok_or_else(|| Error::InvalidInput("at least one working mode must be allowed".to_string()))?;
            value_here.push(value);
            policy_here.push(mode);
        }
        value_next = value_here;
        policy.push(policy_here);
    }
    policy.reverse();

    let initial_level = lattice.level_of(initial_soc);
    debug!(objective_total = %value_next[initial_level], "evaluated the value function");

    // Read the policy forward, re-simulating each step to follow the same
    // transitions the backward pass evaluated.
    let mut modes = Vec::with_capacity(conditions.len());
    let mut level = initial_level;
    for (policy_here, &segment_conditions) in policy.iter().zip(conditions) {
        let mode = policy_here[level];
        let outcome = simulator.step(mode, lattice.soc_of(level), segment_conditions);
        level = lattice.level_of(outcome.end_soc);
        modes.push(mode);
    }
    Ok(modes)
}
