//! A generic A* search engine.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::hash::{BuildHasherDefault, Hash};

use indexmap::map::Entry;
use indexmap::IndexMap;
use num::Zero;
use rustc_hash::FxHasher;

type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;

/// A shortest-path problem solvable by [`astar`].
///
/// The heuristic must be admissible (never overestimate the remaining
/// cost); if it is also monotone, every state is expanded at most once.
pub trait SearchProblem {
    /// A search state. States are deduplicated by equality and hash.
    type State: Eq + Hash + Clone;
    /// The cost measure. Step costs must be non-negative.
    type Cost: Zero + Ord + Copy;

    /// Returns the initial state.
    fn start(&self) -> Self::State;

    /// Returns `true` if `state` satisfies the goal.
    fn is_goal(&self, state: &Self::State) -> bool;

    /// Returns the states reachable from `state` in one step, with step
    /// costs.
    fn neighbors(&self, state: &Self::State) -> Vec<(Self::State, Self::Cost)>;

    /// Returns a lower bound on the cost from `state` to any goal.
    fn heuristic(&self, state: &Self::State) -> Self::Cost;
}

/// Budget caps for an [`astar`] run.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SearchLimits<C> {
    /// Abandon the search once the best reachable total cost exceeds this.
    pub max_cost: Option<C>,
    /// Fail with [`SearchError::OverBudget`] after this many expansions,
    /// or once the frontier grows past this size.
    pub max_explored: usize,
}

impl<C> Default for SearchLimits<C> {
    fn default() -> Self {
        Self {
            max_cost: None,
            max_explored: 1 << 20,
        }
    }
}

/// A solution found by [`astar`]: the state sequence from start to goal,
/// and its total cost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route<S, C> {
    /// The states along the path, starting state first, goal state last.
    pub states: Vec<S>,
    /// The total path cost.
    pub cost: C,
}

/// Reasons an [`astar`] run can fail.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// The goal is unreachable within the cost cap.
    #[error("no path to a goal state")]
    NoPath,
    /// The search exceeded its expansion or frontier budget.
    #[error("search exceeded its exploration budget")]
    OverBudget,
}

/// A frontier entry. Ordered so that the smallest `f` pops first, with ties
/// broken FIFO by insertion sequence number.
struct FrontierEntry<C> {
    f: C,
    seq: u64,
    index: usize,
    g: C,
}

impl<C: Ord> PartialEq for FrontierEntry<C> {
    fn eq(&self, other: &Self) -> bool {
        self.f == other.f && self.seq == other.seq
    }
}

impl<C: Ord> Eq for FrontierEntry<C> {}

impl<C: Ord> PartialOrd for FrontierEntry<C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<C: Ord> Ord for FrontierEntry<C> {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse both keys.
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Runs A* on `problem` and returns the cheapest route to a goal state.
///
/// Ties on `g + h` resolve in insertion order, so results are fully
/// deterministic for a given problem.
pub fn astar<P: SearchProblem>(
    problem: &P,
    limits: &SearchLimits<P::Cost>,
) -> Result<Route<P::State, P::Cost>, SearchError> {
    // Parent table in insertion order; states are addressed by index so the
    // heap stores no clones.
    let mut parents: FxIndexMap<P::State, (usize, P::Cost)> = FxIndexMap::default();
    let mut frontier = BinaryHeap::new();
    let mut seq = 0u64;

    let start = problem.start();
    let h0 = problem.heuristic(&start);
    parents.insert(start, (usize::MAX, P::Cost::zero()));
    frontier.push(FrontierEntry {
        f: h0,
        seq,
        index: 0,
        g: P::Cost::zero(),
    });

    let mut expansions = 0usize;
    while let Some(FrontierEntry { f, index, g, .. }) = frontier.pop() {
        if let Some(max_cost) = limits.max_cost {
            if f > max_cost {
                return Err(SearchError::NoPath);
            }
        }
        let (state, &(_, best_g)) = parents
            .get_index(index)
            .expect("frontier entries index the parent table");
        if g > best_g {
            // A cheaper route to this state was already expanded.
            continue;
        }
        if problem.is_goal(state) {
            return Ok(Route {
                states: reconstruct(&parents, index),
                cost: g,
            });
        }

        expansions += 1;
        if expansions > limits.max_explored {
            return Err(SearchError::OverBudget);
        }

        for (successor, step_cost) in problem.neighbors(&state.clone()) {
            let next_g = g + step_cost;
            let h = problem.heuristic(&successor);
            let next_index = match parents.entry(successor) {
                Entry::Vacant(e) => {
                    let i = e.index();
                    e.insert((index, next_g));
                    i
                }
                Entry::Occupied(mut e) => {
                    if e.get().1 > next_g {
                        let i = e.index();
                        e.insert((index, next_g));
                        i
                    } else {
                        continue;
                    }
                }
            };
            seq += 1;
            frontier.push(FrontierEntry {
                f: next_g + h,
                seq,
                index: next_index,
                g: next_g,
            });
        }

        if frontier.len() > limits.max_explored {
            return Err(SearchError::OverBudget);
        }
    }

    Err(SearchError::NoPath)
}

fn reconstruct<S: Clone, C>(parents: &FxIndexMap<S, (usize, C)>, goal: usize) -> Vec<S> {
    let mut index = goal;
    let mut states = Vec::new();
    loop {
        let (state, &(parent, _)) = parents
            .get_index(index)
            .expect("parent indices stay in bounds");
        states.push(state.clone());
        if parent == usize::MAX {
            break;
        }
        index = parent;
    }
    states.reverse();
    states
}
