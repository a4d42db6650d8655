//! Level-graph extraction from a single line dataset.

use crate::domain::{CascadeResult, DatasetId, Level, LevelList, LineArena, LineRef, Process};

/// Pushes both endpoints of every transition in dataset `id` onto `levels`.
///
/// The initial level of a transition records it as a daughter and the final
/// level records it as a parent. Endpoints sharing an identity key are
/// unified; the first occurrence keeps its tabulated occupation. Returns the
/// number of levels created.
pub fn push_levels(
    levels: &mut LevelList,
    arena: &LineArena,
    id: DatasetId,
) -> CascadeResult<usize> {
    let dataset = arena.dataset(id)?;
    let process = dataset.process();
    let mut created = 0;

    for (index, line) in dataset.lines().iter().enumerate() {
        let line_ref = LineRef::new(id, process, index);

        let mut upper = Level::new(line.initial_level.key(), line.initial_level.relative_occ);
        upper.daughters.push(line_ref);
        let mut lower = Level::new(line.final_level.key(), line.final_level.relative_occ);
        lower.parents.push(line_ref);

        created += usize::from(levels.push_level(upper));
        created += usize::from(levels.push_level(lower));
    }

    Ok(created)
}

/// Builds the deduplicated level graph of one dataset, sorted by energy
/// from highest to lowest.
pub fn extract_levels(arena: &LineArena, id: DatasetId) -> CascadeResult<LevelList> {
    let dataset = arena.dataset(id)?;
    let mut levels = LevelList::with_capacity(dataset.len() * 2);
    push_levels(&mut levels, arena, id)?;
    levels.sort_by_energy_descending();

    tracing::debug!(
        dataset = id.index(),
        process = %dataset.process(),
        lines = dataset.len(),
        levels = levels.len(),
        "extracted cascade levels"
    );
    Ok(levels)
}

/// Selects the `process` dataset tabulated for `key` and extracts its levels.
pub fn extract_selected_levels(
    arena: &LineArena,
    process: Process,
    key: f64,
) -> CascadeResult<LevelList> {
    let id = arena.select(process, key)?;
    extract_levels(arena, id)
}

#[cfg(test)]
mod tests {
    use super::{extract_levels, extract_selected_levels, push_levels};
    use crate::domain::{CascadeFault, LevelList, LineArena, LineDataset, LineRef, Process};
    use crate::modules::fixtures::{key, line, push_dataset, state};

    #[test]
    fn extraction_deduplicates_endpoints_and_counts_edges() {
        let mut arena = LineArena::new();
        // Four transitions over three distinct levels.
        let id = push_dataset(
            &mut arena,
            Process::Radiative,
            &[
                (state(10.0, 3), state(5.0, 3), 2.0),
                (state(10.0, 3), state(2.0, 3), 1.0),
                (state(5.0, 3), state(2.0, 3), 4.0),
                (state(10.0, 3), state(5.0, 3), 0.5),
            ],
        );

        let levels = extract_levels(&arena, id).expect("extraction should succeed");

        assert_eq!(levels.len(), 3);
        let top = levels.find(&key(10.0, 3)).unwrap();
        assert_eq!(top.daughters.len(), 3);
        assert!(top.parents.is_empty());
        let middle = levels.find(&key(5.0, 3)).unwrap();
        assert_eq!((middle.parents.len(), middle.daughters.len()), (2, 1));
        let bottom = levels.find(&key(2.0, 3)).unwrap();
        assert_eq!((bottom.parents.len(), bottom.daughters.len()), (2, 0));
        assert!(bottom.is_terminal());
        assert_eq!(top.daughters[0], LineRef::new(id, Process::Radiative, 0));
    }

    #[test]
    fn extraction_sorts_by_descending_energy() {
        let mut arena = LineArena::new();
        let id = push_dataset(
            &mut arena,
            Process::Auger,
            &[
                (state(-1.0, 5), state(-7.0, 4), 1.0),
                (state(3.0, 5), state(-1.0, 5), 1.0),
            ],
        );

        let levels = extract_levels(&arena, id).unwrap();
        let energies: Vec<f64> = levels.iter().map(|level| level.energy()).collect();
        assert_eq!(energies, vec![3.0, -1.0, -7.0]);
    }

    #[test]
    fn first_endpoint_keeps_tabulated_occupation() {
        let mut arena = LineArena::new();
        let first = state(4.0, 2).with_occupation(1.0);
        let second = state(4.0, 2).with_occupation(0.2);
        let lines = vec![
            line(Process::Radiative, first, state(1.0, 2), 1.0),
            line(Process::Radiative, second, state(0.0, 2), 1.0),
        ];
        let id = arena.push_dataset(LineDataset::new(Process::Radiative, lines).unwrap());

        let levels = extract_levels(&arena, id).unwrap();
        assert_eq!(levels.find(&key(4.0, 2)).unwrap().relative_occ, 1.0);
        assert_eq!(levels.total_occupation(), 1.0);
    }

    #[test]
    fn push_levels_extends_an_existing_graph() {
        let mut arena = LineArena::new();
        let first = push_dataset(
            &mut arena,
            Process::Photo,
            &[(state(0.0, 4), state(9.0, 3), 1.0)],
        );
        let second = push_dataset(
            &mut arena,
            Process::Auger,
            &[(state(9.0, 3), state(1.0, 2), 1.0)],
        );

        let mut levels = LevelList::new();
        assert_eq!(push_levels(&mut levels, &arena, first).unwrap(), 2);
        assert_eq!(push_levels(&mut levels, &arena, second).unwrap(), 1);

        let shared = levels.find(&key(9.0, 3)).unwrap();
        assert_eq!(shared.parents.len(), 1);
        assert_eq!(shared.daughters.len(), 1);
    }

    #[test]
    fn selected_extraction_reports_missing_dataset() {
        let mut arena = LineArena::new();
        let lines = vec![line(Process::Photo, state(0.0, 4), state(9.0, 3), 1.0)];
        arena.push_dataset(LineDataset::keyed(Process::Photo, 50.0, lines).unwrap());

        let selected = extract_selected_levels(&arena, Process::Photo, 50.0).unwrap();
        assert_eq!(selected.len(), 2);
        let error = extract_selected_levels(&arena, Process::Photo, 60.0)
            .expect_err("no dataset for 60");
        let Some(CascadeFault::MissingDataset { process, .. }) = error.fault() else {
            panic!("expected a missing dataset fault, got {error:?}");
        };
        assert_eq!(*process, Process::Photo);
    }
}
