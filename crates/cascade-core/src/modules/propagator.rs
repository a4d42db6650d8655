//! Fixed-point propagation of relative occupation through a level graph.
//!
//! Each round visits every level in list order. A level holding occupation
//! with at least one daughter is drained and its occupation split over the
//! daughters' destination levels in proportion to their rates. Rounds repeat
//! until one moves nothing; occupation then rests on terminal levels only.

use super::traits::TransitionSource;
use crate::common::config::{PropagationMode, PropagationOptions};
use crate::common::constants::CONSERVATION_RELATIVE_TOLERANCE;
use crate::domain::{CascadeError, CascadeResult, Level, LevelList};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropagationSummary {
    pub mode: PropagationMode,
    /// Rounds run, including the final round that moved nothing.
    pub rounds: usize,
    pub moved_per_round: Vec<f64>,
    pub total_before: f64,
    pub total_after: f64,
}

impl PropagationSummary {
    /// Occupation moved over all rounds; zero for an already settled graph.
    pub fn total_moved(&self) -> f64 {
        self.moved_per_round.iter().sum()
    }

    pub fn is_conserved(&self) -> bool {
        let scale = self.total_before.abs().max(1.0);
        (self.total_after - self.total_before).abs() <= CONSERVATION_RELATIVE_TOLERANCE * scale
    }
}

/// Runs propagation rounds on `levels` until a round moves no occupation.
///
/// Fails with `LevelNotFound` when a daughter's destination is not in the
/// graph, with `ZeroBranchingRate` when a populated level's daughters carry
/// no rate, and with `RUN.PROPAGATION_ROUND_LIMIT` when the graph does not
/// settle within the round guard (cyclic input).
pub fn propagate_probability<S>(
    levels: &mut LevelList,
    source: &S,
    options: &PropagationOptions,
) -> CascadeResult<PropagationSummary>
where
    S: TransitionSource + ?Sized,
{
    let round_limit = options.round_limit(levels.len())?;
    let total_before = levels.total_occupation();
    let mut moved_per_round = Vec::new();

    loop {
        if moved_per_round.len() >= round_limit {
            return Err(CascadeError::computation(
                "RUN.PROPAGATION_ROUND_LIMIT",
                format!(
                    "occupation still moving after {} rounds over {} levels; cyclic graph",
                    round_limit,
                    levels.len()
                ),
            ));
        }

        let moved = propagation_round(levels, source, options.mode)?;
        moved_per_round.push(moved);
        tracing::debug!(round = moved_per_round.len(), moved, "propagation round");
        if moved == 0.0 {
            break;
        }
    }

    let summary = PropagationSummary {
        mode: options.mode,
        rounds: moved_per_round.len(),
        moved_per_round,
        total_before,
        total_after: levels.total_occupation(),
    };
    if !summary.is_conserved() {
        tracing::warn!(
            total_before = summary.total_before,
            total_after = summary.total_after,
            "relative occupation drifted during propagation"
        );
    }
    tracing::info!(
        mode = %summary.mode,
        rounds = summary.rounds,
        levels = levels.len(),
        "propagation converged"
    );
    Ok(summary)
}

/// Runs a single round and returns the total occupation it moved.
pub fn propagation_round<S>(
    levels: &mut LevelList,
    source: &S,
    mode: PropagationMode,
) -> CascadeResult<f64>
where
    S: TransitionSource + ?Sized,
{
    match mode {
        PropagationMode::Sequential => sequential_round(levels, source),
        PropagationMode::Buffered => buffered_round(levels, source),
    }
}

/// Shares land as soon as a level drains, so a level later in the list
/// forwards what it received within the same round.
fn sequential_round<S>(levels: &mut LevelList, source: &S) -> CascadeResult<f64>
where
    S: TransitionSource + ?Sized,
{
    let mut moved = 0.0;
    let mut branches = Vec::new();

    for position in 0..levels.len() {
        let Some(level) = levels.get_index(position) else {
            continue;
        };
        if level.relative_occ <= 0.0 || level.is_terminal() {
            continue;
        }

        let probability = level.relative_occ;
        let total_rate = collect_branches(levels, level, source, &mut branches)?;
        moved += probability;
        drain(levels, position);
        for &(destination, rate) in &branches {
            deposit(levels, destination, probability * rate / total_rate);
        }
    }

    Ok(moved)
}

/// Every populated level is resolved against the occupations the round
/// started with, and nothing is written until all of them resolved.
fn buffered_round<S>(levels: &mut LevelList, source: &S) -> CascadeResult<f64>
where
    S: TransitionSource + ?Sized,
{
    let mut moved = 0.0;
    let mut branches = Vec::new();
    let mut drained = Vec::new();
    let mut pending = vec![0.0; levels.len()];

    for (position, level) in levels.iter().enumerate() {
        if level.relative_occ <= 0.0 || level.is_terminal() {
            continue;
        }

        let probability = level.relative_occ;
        let total_rate = collect_branches(levels, level, source, &mut branches)?;
        moved += probability;
        drained.push(position);
        for &(destination, rate) in &branches {
            pending[destination] += probability * rate / total_rate;
        }
    }

    for position in drained {
        drain(levels, position);
    }
    for (position, share) in pending.into_iter().enumerate() {
        deposit(levels, position, share);
    }

    Ok(moved)
}

/// Resolves every daughter of `level` to `(destination position, rate)` and
/// returns the summed rate. Nothing is mutated, so a failure leaves the
/// graph as it was.
fn collect_branches<S>(
    levels: &LevelList,
    level: &Level,
    source: &S,
    branches: &mut Vec<(usize, f64)>,
) -> CascadeResult<f64>
where
    S: TransitionSource + ?Sized,
{
    branches.clear();
    let mut total_rate = 0.0;
    for line in &level.daughters {
        let record = source.transition(*line)?;
        let rate = record.rate.branching_weight();
        let destination = levels.position_of(&record.final_level.key())?;
        total_rate += rate;
        branches.push((destination, rate));
    }

    if total_rate > 0.0 {
        Ok(total_rate)
    } else {
        Err(CascadeError::zero_branching_rate(*level.key()))
    }
}

fn drain(levels: &mut LevelList, position: usize) {
    if let Some(level) = levels.level_at_mut(position) {
        level.relative_occ = 0.0;
    }
}

fn deposit(levels: &mut LevelList, position: usize, share: f64) {
    if let Some(level) = levels.level_at_mut(position) {
        level.relative_occ += share;
    }
}
