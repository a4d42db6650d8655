//! End-to-end cascade run: dataset selection, graph building and merging,
//! ordering with initial occupations, and propagation.

use super::builder::extract_levels;
use super::distribution::{IonPopulation, LevelPopulation, ion_distribution, level_distribution};
use super::merger::{MergeReport, merge_all};
use super::orderer::{bind_occupations_by_key, sort_by_energy};
use super::propagator::{PropagationSummary, propagate_probability};
use crate::common::config::CascadeSettings;
use crate::domain::{CascadeError, CascadeResult, DatasetId, LevelList, LineArena, Process};

#[derive(Debug, Clone, PartialEq)]
pub struct CascadeGraph {
    pub datasets: Vec<DatasetId>,
    pub levels: LevelList,
    pub merge_reports: Vec<MergeReport>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CascadeOutcome {
    pub datasets: Vec<DatasetId>,
    pub levels: LevelList,
    pub merge_reports: Vec<MergeReport>,
    pub propagation: PropagationSummary,
}

impl CascadeOutcome {
    pub fn ion_distribution(&self) -> Vec<IonPopulation> {
        ion_distribution(&self.levels)
    }

    pub fn level_distribution(&self) -> Vec<LevelPopulation> {
        level_distribution(&self.levels)
    }
}

/// Datasets taking part in a run, in arena order.
///
/// Unkeyed datasets always take part. For every process with keyed datasets
/// exactly the one matching `settings.selection_key` is added.
pub fn selected_datasets(
    arena: &LineArena,
    settings: &CascadeSettings,
) -> CascadeResult<Vec<DatasetId>> {
    let mut selected: Vec<DatasetId> = arena
        .datasets()
        .filter(|(_, dataset)| dataset.selection_key().is_none())
        .map(|(id, _)| id)
        .collect();

    let keyed_processes: Vec<Process> = Process::ALL
        .into_iter()
        .filter(|process| arena.has_keyed_datasets(*process))
        .collect();

    match settings.selection_key {
        Some(key) if keyed_processes.is_empty() => {
            return Err(CascadeError::missing_dataset(Process::Photo, key));
        }
        Some(key) => {
            for process in keyed_processes {
                selected.push(arena.select(process, key)?);
            }
        }
        None if !keyed_processes.is_empty() => {
            return Err(CascadeError::input_validation(
                "INPUT.SELECTION_KEY_REQUIRED",
                format!(
                    "{} datasets are keyed by incident energy; a selection key is required",
                    keyed_processes
                        .iter()
                        .map(|process| process.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            ));
        }
        None => {}
    }

    selected.sort();
    Ok(selected)
}

/// Builds the merged, ordered cascade graph with initial occupations bound.
pub fn build_cascade_graph(
    arena: &LineArena,
    settings: &CascadeSettings,
) -> CascadeResult<CascadeGraph> {
    let datasets = selected_datasets(arena, settings)?;
    let graphs = datasets
        .iter()
        .map(|id| extract_levels(arena, *id))
        .collect::<CascadeResult<Vec<_>>>()?;

    let (merged, merge_reports) = merge_all(graphs);
    let mut levels = sort_by_energy(merged, &settings.initial_occupations)?;
    bind_occupations_by_key(&mut levels, &settings.keyed_occupations)?;

    Ok(CascadeGraph {
        datasets,
        levels,
        merge_reports,
    })
}

/// Runs the whole cascade and returns the converged level list.
pub fn run_cascade(arena: &LineArena, settings: &CascadeSettings) -> CascadeResult<CascadeOutcome> {
    let CascadeGraph {
        datasets,
        mut levels,
        merge_reports,
    } = build_cascade_graph(arena, settings)?;

    let propagation = propagate_probability(&mut levels, arena, &settings.propagation_options())?;
    tracing::info!(
        datasets = datasets.len(),
        levels = levels.len(),
        rounds = propagation.rounds,
        "cascade run completed"
    );

    Ok(CascadeOutcome {
        datasets,
        levels,
        merge_reports,
        propagation,
    })
}

#[cfg(test)]
mod tests {
    use super::{build_cascade_graph, run_cascade, selected_datasets};
    use crate::common::config::CascadeSettings;
    use crate::domain::{CascadeFault, LineArena, LineDataset, Process};
    use crate::modules::fixtures::{line, push_dataset, state};

    fn photo_family(arena: &mut LineArena) {
        for (energy, final_energy) in [(100.0, 3.0), (200.0, 4.0)] {
            let ground = state(0.0, 4);
            let lines = vec![line(Process::Photo, ground, state(final_energy, 3), 1.0)];
            arena.push_dataset(LineDataset::keyed(Process::Photo, energy, lines).unwrap());
        }
    }

    #[test]
    fn selection_keeps_unkeyed_and_matching_keyed_datasets() {
        let mut arena = LineArena::new();
        photo_family(&mut arena);
        let auger = push_dataset(
            &mut arena,
            Process::Auger,
            &[(state(4.0, 3), state(1.0, 2), 1.0)],
        );

        let settings = CascadeSettings {
            selection_key: Some(200.0),
            ..CascadeSettings::default()
        };
        let selected = selected_datasets(&arena, &settings).unwrap();
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[1], auger);
        let photo = arena.dataset(selected[0]).unwrap();
        assert_eq!(photo.selection_key(), Some(200.0));
    }

    #[test]
    fn keyed_family_without_key_is_rejected() {
        let mut arena = LineArena::new();
        photo_family(&mut arena);

        let error = selected_datasets(&arena, &CascadeSettings::default())
            .expect_err("key is required");
        assert_eq!(error.placeholder(), "INPUT.SELECTION_KEY_REQUIRED");
    }

    #[test]
    fn key_without_keyed_datasets_is_missing_dataset() {
        let mut arena = LineArena::new();
        push_dataset(
            &mut arena,
            Process::Auger,
            &[(state(4.0, 3), state(1.0, 2), 1.0)],
        );
        let settings = CascadeSettings {
            selection_key: Some(50.0),
            ..CascadeSettings::default()
        };

        let error = selected_datasets(&arena, &settings).expect_err("nothing is keyed");
        assert!(matches!(error.fault(), Some(CascadeFault::MissingDataset { .. })));
    }

    #[test]
    fn photoionization_then_auger_cascade_ends_on_lower_charge_states() {
        let mut arena = LineArena::new();
        photo_family(&mut arena);
        push_dataset(
            &mut arena,
            Process::Auger,
            &[
                (state(4.0, 3), state(1.0, 2), 3.0),
                (state(4.0, 3), state(-1.0, 2), 1.0),
            ],
        );
        let settings = CascadeSettings {
            selection_key: Some(200.0),
            initial_occupations: vec![(3, 1.0)],
            ..CascadeSettings::default()
        };

        let graph = build_cascade_graph(&arena, &settings).unwrap();
        let energies: Vec<f64> = graph.levels.iter().map(|level| level.energy()).collect();
        assert_eq!(energies, vec![4.0, 1.0, 0.0, -1.0]);
        assert_eq!(graph.merge_reports.len(), 2);
        assert_eq!(graph.merge_reports[1].modified, 1);

        let outcome = run_cascade(&arena, &settings).unwrap();
        let ions: Vec<(u32, f64)> = outcome
            .ion_distribution()
            .iter()
            .map(|ion| (ion.electron_count, ion.population))
            .collect();
        assert_eq!(ions, vec![(4, 0.0), (3, 0.0), (2, 1.0)]);
        assert_eq!(outcome.level_distribution().len(), 2);
        assert!(outcome.propagation.is_conserved());
    }
}
