//! A generic simulated-annealing engine.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// A local-search problem solvable by [`anneal`].
pub trait AnnealProblem {
    /// A candidate solution.
    type State: Clone;

    /// Produces the starting solution.
    fn initial(&self, rng: &mut StdRng) -> Self::State;

    /// Proposes a local mutation of `state`.
    ///
    /// Implementations should always return a feasible state; the engine
    /// never filters proposals.
    fn neighbor(&self, state: &Self::State, rng: &mut StdRng) -> Self::State;

    /// Scores `state`. Lower is better.
    fn energy(&self, state: &Self::State) -> f64;
}

/// An exponential cooling schedule: `T(k) = T0 * alpha^k`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Schedule {
    /// The starting temperature `T0`.
    pub initial_temperature: f64,
    /// The per-step cooling factor, in `(0, 1)`.
    pub alpha: f64,
    /// The number of proposals to evaluate.
    pub max_steps: usize,
}

impl Schedule {
    /// Returns the temperature at step `step`.
    pub fn temperature(&self, step: usize) -> f64 {
        self.initial_temperature * self.alpha.powi(step as i32)
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            initial_temperature: 10.0,
            alpha: 0.999,
            max_steps: 2_000,
        }
    }
}

/// The result of an [`anneal`] run.
#[derive(Debug, Clone)]
pub struct Annealed<S> {
    /// The best state seen over the whole run (not the final state).
    pub state: S,
    /// The energy of the best state.
    pub energy: f64,
    /// The seed the run was started with.
    pub seed: u64,
}

/// Minimizes `problem`'s energy by simulated annealing.
///
/// Strictly-improving proposals are always accepted; worsening proposals
/// are accepted with probability `exp(-delta / T)`. The sequence of
/// proposals and acceptance decisions is a pure function of `seed`.
pub fn anneal<P: AnnealProblem>(problem: &P, schedule: &Schedule, seed: u64) -> Annealed<P::State> {
    let mut rng = StdRng::seed_from_u64(seed);

    let mut current = problem.initial(&mut rng);
    let mut current_energy = problem.energy(&current);
    let mut best = current.clone();
    let mut best_energy = current_energy;

    for step in 0..schedule.max_steps {
        let candidate = problem.neighbor(&current, &mut rng);
        let candidate_energy = problem.energy(&candidate);
        let delta = candidate_energy - current_energy;

        let accept = if delta < 0.0 {
            true
        } else {
            let temperature = schedule.temperature(step);
            rng.gen::<f64>() < (-delta / temperature).exp()
        };

        if accept {
            current = candidate;
            current_energy = candidate_energy;
            if current_energy < best_energy {
                debug!(step, energy = current_energy, "new best state");
                best = current.clone();
                best_energy = current_energy;
            }
        }
    }

    Annealed {
        state: best,
        energy: best_energy,
        seed,
    }
}
