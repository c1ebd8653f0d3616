//! Engine configuration.

use serde::{Deserialize, Serialize};

/// What to do when a network cannot be routed during assembly.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnUnroutable {
    /// Leave the network without a bus and continue.
    Skip,
    /// Abort the whole run.
    #[default]
    Abort,
}

impl std::str::FromStr for OnUnroutable {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "skip" => Ok(OnUnroutable::Skip),
            "abort" => Ok(OnUnroutable::Abort),
            other => Err(format!("unknown unroutable policy: {other}")),
        }
    }
}

/// Knobs for the synthesis pipeline.
///
/// Every engine receives its configuration explicitly; there is no global
/// state. All defaults are deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    /// The seed for all randomized search.
    pub seed: u64,
    /// Placement annealing: starting temperature `T0`.
    pub initial_temperature: f64,
    /// Placement annealing: exponential cooling factor.
    pub alpha: f64,
    /// Placement annealing: proposals per run.
    pub max_steps: usize,
    /// Independent placement searches; seeds `seed..seed + workers`, the
    /// best result wins.
    pub workers: u64,
    /// Edge length of the placement bounding cube. All instances must fit
    /// inside `[0, bound)^3`.
    pub bound: i32,
    /// Rejection-sampling attempts before the initial placement fails with
    /// `Infeasible`.
    pub max_place_attempts: usize,
    /// Retries of the placement neighbor operator before returning the
    /// state unchanged.
    pub neighbor_retries: usize,
    /// Extra routing cost for each change of wire direction.
    pub turn_penalty: u32,
    /// Router heuristic penalty per remaining sink (Steiner approximation).
    pub sink_penalty: u32,
    /// Voxels of slack around the placement when bounding the routing
    /// search volume.
    pub route_slack: i32,
    /// Score placements with the collision-relaxed router instead of wire
    /// length alone.
    pub use_routing_energy: bool,
    /// A* expansion/frontier budget.
    pub max_explored: usize,
    /// Optional cap on a single wire's routing cost.
    pub max_route_cost: Option<u32>,
    /// Policy for networks the router gives up on.
    pub on_unroutable: OnUnroutable,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            initial_temperature: 8.0,
            alpha: 0.995,
            max_steps: 2_000,
            workers: 1,
            bound: 24,
            max_place_attempts: 40,
            neighbor_retries: 16,
            turn_penalty: 1,
            sink_penalty: 2,
            route_slack: 6,
            use_routing_energy: false,
            max_explored: 1 << 20,
            max_route_cost: None,
            on_unroutable: OnUnroutable::Abort,
        }
    }
}

impl SynthConfig {
    /// The annealing schedule implied by this configuration.
    pub fn schedule(&self) -> pathfind::Schedule {
        pathfind::Schedule {
            initial_temperature: self.initial_temperature,
            alpha: self.alpha,
            max_steps: self.max_steps,
        }
    }
}
