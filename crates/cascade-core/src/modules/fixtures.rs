use crate::domain::{
    AngularMomentum, DatasetId, LevelKey, LevelState, LineArena, LineDataset, LineRate, LineRecord,
    Parity, Process,
};

pub(crate) fn state(energy: f64, electron_count: u32) -> LevelState {
    LevelState::new(
        energy,
        AngularMomentum::from_twice(1),
        Parity::Even,
        electron_count,
    )
}

pub(crate) fn key(energy: f64, electron_count: u32) -> LevelKey {
    state(energy, electron_count).key()
}

pub(crate) fn line(
    process: Process,
    upper: LevelState,
    lower: LevelState,
    rate: f64,
) -> LineRecord {
    LineRecord::new(upper, lower, LineRate::for_process(process, rate))
}

/// Pushes one dataset of `process` built from `(upper, lower, rate)` triples.
pub(crate) fn push_dataset(
    arena: &mut LineArena,
    process: Process,
    transitions: &[(LevelState, LevelState, f64)],
) -> DatasetId {
    let lines = transitions
        .iter()
        .map(|(upper, lower, rate)| line(process, *upper, *lower, *rate))
        .collect();
    let dataset = LineDataset::new(process, lines).expect("fixture dataset should be valid");
    arena.push_dataset(dataset)
}
