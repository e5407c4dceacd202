use bon::Builder;
use enumset::EnumSet;
use rust_decimal::dec;
use tokio_util::sync::CancellationToken;

use crate::{
    forecast::BatteryModel,
    mode::Mode,
    optimizer::{ensure_some_mode, modes_in_order, objective},
    prelude::*,
    quantity::{energy::Kwh, money::Gbp, rate::ElectricityRate},
    simulator::{SegmentConditions, Simulator},
};

/// Parameters of the genetic search.
#[derive(Builder, Clone, Copy, Debug)]
pub struct GeneticParams {
    #[builder(default = 100)]
    pub population: usize,

    #[builder(default = 200)]
    pub generations: usize,

    #[builder(default = 5)]
    pub tournament: usize,

    /// Probability of producing a child by single-point crossover rather than
    /// cloning the first parent.
    #[builder(default = 0.8)]
    pub crossover_rate: f64,

    /// Per-gene mutation probability.
    #[builder(default = 1.0 / 48.0)]
    pub mutation_rate: f64,

    /// Candidates carried over unchanged into the next generation.
    #[builder(default = 2)]
    pub elitism: usize,

    /// All randomness flows from this seed.
    #[builder(default = 0)]
    pub seed: u64,

    /// Objective-only surcharge per kilowatt-hour of spilled solar.
    #[builder(default = ElectricityRate::from(dec!(5)))]
    pub waste_penalty: ElectricityRate,

    #[builder(default = EnumSet::all())]
    pub allowed_modes: EnumSet<Mode>,
}

impl Default for GeneticParams {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl GeneticParams {
    fn validate(&self) -> Result {
        ensure_some_mode(self.allowed_modes)?;
        if self.population < 1 {
            return Err(Error::InvalidInput("population must be at least 1".to_string()));
        }
        if self.generations < 1 {
            return Err(Error::InvalidInput("generations must be at least 1".to_string()));
        }
        if self.tournament < 1 {
            return Err(Error::InvalidInput("tournament size must be at least 1".to_string()));
        }
        for (name, rate) in [("crossover", self.crossover_rate), ("mutation", self.mutation_rate)] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(Error::InvalidInput(format!("{name} rate must be within [0, 1], got {rate}")));
            }
        }
        Ok(())
    }
}

#[derive(Clone)]
struct Candidate {
    genome: Vec<Mode>,
    loss: Gbp,
}

/// Evolve mode sequences against the waste-penalised cost.
///
/// Tournament selection, single-point crossover, per-gene mutation and a small
/// elite carried over unchanged. The population is kept sorted by loss with a
/// stable sort, so a fixed seed reproduces the exact same plan.
pub(super) fn optimize(
    params: &GeneticParams,
    conditions: &[SegmentConditions],
    initial_soc: Kwh,
    battery: &dyn BatteryModel,
    cancel: &CancellationToken,
) -> Result<Vec<Mode>> {
    params.validate()?;
    let simulator = Simulator::new(battery);
    let alphabet: Vec<Mode> = modes_in_order(params.allowed_modes).collect();
    let mut rng = fastrand::Rng::with_seed(params.seed);

    let loss_of = |genome: &[Mode]| -> Result<Gbp> {
        let outcomes = simulator.run(conditions, genome, initial_soc)?;
        Ok(outcomes
            .iter()
            .zip(conditions)
            .map(|(outcome, segment)| objective(outcome, segment.price, params.waste_penalty))
            .sum())
    };

    let mut population = Vec::with_capacity(params.population);
    for _ in 0..params.population {
        let genome: Vec<Mode> =
            (0..conditions.len()).map(|_| alphabet[rng.usize(0..alphabet.len())]).collect();
        let loss = loss_of(&genome)?;
        population.push(Candidate { genome, loss });
    }
    population.sort_by(|a, b| a.loss.cmp(&b.loss));

    for generation in 0..params.generations {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let mut next = Vec::with_capacity(params.population);
        next.extend(population.iter().take(params.elitism).cloned());
        while next.len() < params.population {
            let first = tournament(&population, params.tournament, &mut rng);
            let second = tournament(&population, params.tournament, &mut rng);
            let mut genome = if conditions.len() > 1 && rng.f64() < params.crossover_rate {
                let point = rng.usize(1..conditions.len());
                let mut child = first.genome[..point].to_vec();
                child.extend_from_slice(&second.genome[point..]);
                child
            } else {
                first.genome.clone()
            };
            for gene in &mut genome {
                if rng.f64() < params.mutation_rate {
                    *gene = alphabet[rng.usize(0..alphabet.len())];
                }
            }
            let loss = loss_of(&genome)?;
            next.push(Candidate { genome, loss });
        }
        next.sort_by(|a, b| a.loss.cmp(&b.loss));
        population = next;
        if generation % 50 == 0 {
            debug!(generation, best = %population[0].loss, "evolving");
        }
    }

    Ok(population.into_iter().next().map(|candidate| candidate.genome).unwrap_or_default())
}

fn tournament<'a>(
    population: &'a [Candidate],
    size: usize,
    rng: &mut fastrand::Rng,
) -> &'a Candidate {
    let mut best = &population[rng.usize(0..population.len())];
    for _ in 1..size {
        let contender = &population[rng.usize(0..population.len())];
        if contender.loss < best.loss {
            best = contender;
        }
    }
    best
}
