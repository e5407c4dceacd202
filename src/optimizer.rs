mod dp;
mod genetic;
mod graph;

pub use self::{dp::DpParams, genetic::GeneticParams, graph::GraphParams};

use enumset::EnumSet;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use tokio_util::sync::CancellationToken;

use crate::{
    forecast::BatteryModel,
    mode::Mode,
    prelude::*,
    quantity::{energy::Kwh, money::Gbp, rate::ElectricityRate},
    simulator::{SegmentConditions, StepOutcome},
};

/// The sealed set of search strategies behind a single capability: conditions
/// in, working-mode sequence out. The plan builder owns the chosen variant.
#[derive(Clone, Copy, Debug)]
pub enum Optimizer {
    /// Shortest path over a layered state-of-charge lattice.
    Graph(GraphParams),

    /// Backward value iteration over the same lattice.
    DynamicProgramming(DpParams),

    /// Seeded genetic search over mode sequences.
    Genetic(GeneticParams),
}

impl Default for Optimizer {
    fn default() -> Self {
        Self::DynamicProgramming(DpParams::default())
    }
}

impl Optimizer {
    /// Produce a mode sequence for the given conditions.
    ///
    /// Stateless between invocations; cancellation is honoured at segment and
    /// generation boundaries and discards any partial result.
    #[instrument(skip_all, fields(segments = conditions.len()))]
    pub fn optimize(
        &self,
        conditions: &[SegmentConditions],
        initial_soc: Kwh,
        battery: &dyn BatteryModel,
        cancel: &CancellationToken,
    ) -> Result<Vec<Mode>> {
        match self {
            Self::Graph(params) => graph::optimize(params, conditions, initial_soc, battery, cancel),
            Self::DynamicProgramming(params) => {
                dp::optimize(params, conditions, initial_soc, battery, cancel)
            }
            Self::Genetic(params) => {
                genetic::optimize(params, conditions, initial_soc, battery, cancel)
            }
        }
    }
}

/// Objective contribution of one simulated segment: the money paid to the grid
/// plus the waste penalty. The penalty steers the search away from spilling
/// solar but never appears in a reported plan cost.
pub(crate) fn objective(
    outcome: &StepOutcome,
    price: ElectricityRate,
    waste_penalty: ElectricityRate,
) -> Gbp {
    outcome.grid_usage * price + outcome.wasted_solar * waste_penalty
}

/// Allowed modes in tie-break order.
pub(crate) fn modes_in_order(allowed: EnumSet<Mode>) -> impl Iterator<Item = Mode> {
    Mode::ALL.into_iter().filter(move |mode| allowed.contains(*mode))
}

pub(crate) fn ensure_some_mode(allowed: EnumSet<Mode>) -> Result {
    if allowed.is_empty() {
        return Err(Error::InvalidInput("at least one working mode must be allowed".to_string()));
    }
    Ok(())
}

/// Discretisation of the battery state of charge into `soc_steps + 1` evenly
/// spaced levels. Rounding a successor state to the nearest level is the only
/// approximation the lattice searches make.
pub(crate) struct Lattice {
    step: Kwh,
    soc_steps: usize,
}

impl Lattice {
    pub(crate) fn try_new(capacity: Kwh, soc_steps: usize) -> Result<Self> {
        if soc_steps < 1 {
            return Err(Error::InvalidInput(
                "the state-of-charge lattice needs at least one step".to_string(),
            ));
        }
        if capacity <= Kwh::ZERO {
            return Err(Error::InvalidInput("battery capacity must be positive".to_string()));
        }
        Ok(Self { step: capacity / Decimal::from(soc_steps), soc_steps })
    }

    pub(crate) const fn levels(&self) -> usize {
        self.soc_steps + 1
    }

    pub(crate) fn soc_of(&self, level: usize) -> Kwh {
        self.step * Decimal::from(level)
    }

    pub(crate) fn level_of(&self, soc: Kwh) -> usize {
        (soc.0 / self.step.0)
            .round()
            .to_usize()
            .map_or(self.soc_steps, |level| level.min(self.soc_steps))
    }
}
