use bon::Builder;
use enumset::EnumSet;
use petgraph::{
    graph::{DiGraph, NodeIndex},
    visit::EdgeRef,
};
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

/// Parameters of the layered shortest-path search.
#[derive(Builder, Clone, Copy, Debug)]
pub struct GraphParams {
    /// Number of state-of-charge steps; the lattice has `soc_steps + 1` levels.
    #[builder(default = 20)]
    pub soc_steps: usize,

    /// Objective-only surcharge per kilowatt-hour of spilled solar.
    #[builder(default = ElectricityRate::from(dec!(5)))]
    pub waste_penalty: ElectricityRate,

    #[builder(default = EnumSet::all())]
    pub allowed_modes: EnumSet<Mode>,
}

impl Default for GraphParams {
    fn default() -> Self {
        Self::builder().build()
    }
}

struct SocNode {
    layer: usize,
    #[allow(dead_code)]
    level: usize,
}

struct ModeEdge {
    mode: Mode,
    weight: Gbp,
}

/// Cheapest mode sequence by shortest path over the layered lattice DAG.
///
/// Nodes are `(segment, level)` pairs reachable from the initial state; every
/// node carries one edge per allowed mode, weighted by the waste-penalised
/// segment objective. Relaxation runs in topological (creation) order, so the
/// whole search is a single forward sweep; ties keep the earliest-ranked mode.
pub(super) fn optimize(
    params: &GraphParams,
    conditions: &[SegmentConditions],
    initial_soc: Kwh,
    battery: &dyn BatteryModel,
    cancel: &CancellationToken,
) -> Result<Vec<Mode>> {
    ensure_some_mode(params.allowed_modes)?;
    let lattice = Lattice::try_new(battery.capacity(), params.soc_steps)?;
    let simulator = Simulator::new(battery);

    let mut graph = DiGraph::<SocNode, ModeEdge>::new();
    let initial_level = lattice.level_of(initial_soc);
    let source = graph.add_node(SocNode { layer: 0, level: initial_level });
    let mut current_layer: Vec<Option<NodeIndex>> = vec![None; lattice.levels()];
    current_layer[initial_level] = Some(source);

    for (layer, &segment_conditions) in conditions.iter().enumerate() {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let mut next_layer: Vec<Option<NodeIndex>> = vec![None; lattice.levels()];
        for level in 0..lattice.levels() {
            let Some(node) = current_layer[level] else {
                continue;
            };
            for mode in modes_in_order(params.allowed_modes) {
                let outcome = simulator.step(mode, lattice.soc_of(level), segment_conditions);
                let next_level = lattice.level_of(outcome.end_soc);
                let target = *next_layer[next_level].get_or_insert_with(|| {
                    graph.add_node(SocNode { layer: layer + 1, level: next_level })
                });
                let weight = objective(&outcome, segment_conditions.price, params.waste_penalty);
                graph.add_edge(node, target, ModeEdge { mode, weight });
            }
        }
        current_layer = next_layer;
    }

    // Node indices were handed out layer by layer, so index order is a
    // topological order of the DAG.
    let mut best: Vec<Option<Gbp>> = vec![None; graph.node_count()];
    let mut arrival: Vec<Option<(NodeIndex, Mode)>> = vec![None; graph.node_count()];
    best[source.index()] = Some(Gbp::ZERO);
    for node in graph.node_indices() {
        let Some(cost_here) = best[node.index()] else {
            continue;
        };
        let mut outgoing: Vec<_> = graph.edges(node).collect();
        outgoing.sort_by_key(|edge| edge.weight().mode.rank());
        for edge in outgoing {
            let candidate = cost_here + edge.weight().weight;
            let target = edge.target().index();
            if best[target].is_none_or(|incumbent| candidate < incumbent) {
                best[target] = Some(candidate);
                arrival[target] = Some((node, edge.weight().mode));
            }
        }
    }

    // Any terminal level is accepted; the first-created node wins ties.
    let mut cheapest: Option<(Gbp, NodeIndex)> = None;
    for node in graph.node_indices() {
        if graph[node].layer != conditions.len() {
            continue;
        }
        let Some(cost) = best[node.index()] else {
            continue;
        };
        if cheapest.is_none_or(|(incumbent, _)| cost < incumbent) {
            cheapest = Some((cost, node));
        }
    }
    let (objective_total, mut node) = cheapest
        .ok_or_else(|| Error::InvalidInput("no reachable terminal state".to_string()))?;
    debug!(%objective_total, nodes = graph.node_count(), "relaxed the lattice");

    let mut modes = Vec::with_capacity(conditions.len());
    while let Some((previous, mode)) = arrival[node.index()] {
        modes.push(mode);
        node = previous;
    }
    modes.reverse();
    Ok(modes)
}
