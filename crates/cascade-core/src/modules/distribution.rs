//! Population summaries derived from a converged level list.

use crate::common::constants::HARTREE_EV;
use crate::domain::{Level, LevelList, Parity};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IonPopulation {
    pub electron_count: u32,
    pub population: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelPopulation {
    /// 1-based position in the level list.
    pub position: usize,
    pub energy: f64,
    pub energy_ev: f64,
    #[serde(rename = "twoJ")]
    pub two_j: u32,
    pub j: String,
    pub parity: Parity,
    pub electron_count: u32,
    pub relative_occ: f64,
    pub terminal: bool,
}

impl LevelPopulation {
    fn from_level(position: usize, level: &Level) -> Self {
        Self {
            position,
            energy: level.energy(),
            energy_ev: level.energy() * HARTREE_EV,
            two_j: level.angular_momentum().twice(),
            j: level.angular_momentum().to_string(),
            parity: level.parity(),
            electron_count: level.electron_count(),
            relative_occ: level.relative_occ,
            terminal: level.is_terminal(),
        }
    }
}

/// Occupation summed per electron count, most electrons first. Every charge
/// state present in the graph is listed, populated or not.
pub fn ion_distribution(levels: &LevelList) -> Vec<IonPopulation> {
    let mut populations: BTreeMap<u32, f64> = BTreeMap::new();
    for level in levels.iter() {
        *populations.entry(level.electron_count()).or_default() += level.relative_occ;
    }

    populations
        .into_iter()
        .rev()
        .map(|(electron_count, population)| IonPopulation {
            electron_count,
            population,
        })
        .collect()
}

/// Levels holding non-zero occupation, in list order.
pub fn level_distribution(levels: &LevelList) -> Vec<LevelPopulation> {
    level_listing(levels)
        .into_iter()
        .filter(|entry| entry.relative_occ != 0.0)
        .collect()
}

/// Every level in list order with its 1-based position.
pub fn level_listing(levels: &LevelList) -> Vec<LevelPopulation> {
    levels
        .iter()
        .enumerate()
        .map(|(index, level)| LevelPopulation::from_level(index + 1, level))
        .collect()
}
