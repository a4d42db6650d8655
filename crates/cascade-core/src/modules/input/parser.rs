use super::model::{RawDataset, RawDeck, RawLevelState, RawLine};
use crate::domain::{
    AngularMomentum, CascadeError, LevelState, LineArena, LineDataset, LineRate, LineRecord,
    ParserResult, Process,
};
use std::fs;
use std::path::Path;

pub(super) fn read_deck_source(path: &Path) -> ParserResult<String> {
    fs::read_to_string(path).map_err(|source| {
        CascadeError::io_system(
            "IO.DECK_READ",
            format!("failed to read input deck '{}': {}", path.display(), source),
        )
    })
}

pub(super) fn parse_raw_deck(source: &str) -> ParserResult<RawDeck> {
    serde_json::from_str(source).map_err(|error| {
        CascadeError::input_validation(
            "INPUT.DECK_SYNTAX",
            format!("input deck is not a valid cascade deck: {}", error),
        )
    })
}

pub(super) fn build_arena(datasets: Vec<RawDataset>) -> ParserResult<LineArena> {
    let mut arena = LineArena::new();
    for (position, raw) in datasets.into_iter().enumerate() {
        let dataset = build_dataset(raw)
            .map_err(|error| error.with_context(format!("dataset {}", position + 1)))?;
        arena.push_dataset(dataset);
    }
    Ok(arena)
}

fn build_dataset(raw: RawDataset) -> ParserResult<LineDataset> {
    let process = Process::from_tag(&raw.process)?;
    let lines = raw
        .lines
        .into_iter()
        .map(|line| build_line(process, line))
        .collect();

    match raw.selection_key {
        Some(key) => LineDataset::keyed(process, key, lines),
        None => LineDataset::new(process, lines),
    }
}

fn build_line(process: Process, raw: RawLine) -> LineRecord {
    LineRecord::new(
        build_state(raw.initial),
        build_state(raw.final_level),
        LineRate::for_process(process, raw.rate),
    )
}

fn build_state(raw: RawLevelState) -> LevelState {
    LevelState::new(
        raw.energy,
        AngularMomentum::from_twice(raw.two_j),
        raw.parity,
        raw.electron_count,
    )
    .with_occupation(raw.relative_occ)
}
