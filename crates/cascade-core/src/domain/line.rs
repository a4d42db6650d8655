use super::errors::{CascadeError, CascadeResult};
use super::level::{AngularMomentum, LevelKey, Parity};
use crate::common::constants::SELECTION_KEY_RELATIVE_TOLERANCE;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Process {
    Radiative,
    Auger,
    Photo,
}

impl Process {
    pub const ALL: [Process; 3] = [Self::Radiative, Self::Auger, Self::Photo];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Radiative => "Radiative",
            Self::Auger => "Auger",
            Self::Photo => "Photo",
        }
    }

    /// Parses a process tag as it appears in line datasets.
    pub fn from_tag(tag: &str) -> CascadeResult<Self> {
        let normalized = tag.trim();
        Self::ALL
            .into_iter()
            .find(|process| process.as_str().eq_ignore_ascii_case(normalized))
            .ok_or_else(|| CascadeError::unknown_process(normalized))
    }
}

impl Display for Process {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

/// One endpoint of a transition as tabulated by the line producer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelState {
    pub energy: f64,
    pub angular_momentum: AngularMomentum,
    pub parity: Parity,
    pub electron_count: u32,
    pub relative_occ: f64,
}

impl LevelState {
    pub fn new(
        energy: f64,
        angular_momentum: AngularMomentum,
        parity: Parity,
        electron_count: u32,
    ) -> Self {
        Self {
            energy,
            angular_momentum,
            parity,
            electron_count,
            relative_occ: 0.0,
        }
    }

    pub fn with_occupation(mut self, relative_occ: f64) -> Self {
        self.relative_occ = relative_occ;
        self
    }

    pub fn key(&self) -> LevelKey {
        LevelKey::new(
            self.energy,
            self.angular_momentum,
            self.parity,
            self.electron_count,
        )
    }
}

/// The single rate-like scalar a transition carries; which one depends on
/// the process that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineRate {
    Radiative { photon_rate: f64 },
    Auger { total_rate: f64 },
    Photo { cross_section: f64 },
}

impl LineRate {
    pub fn for_process(process: Process, value: f64) -> Self {
        match process {
            Process::Radiative => Self::Radiative { photon_rate: value },
            Process::Auger => Self::Auger { total_rate: value },
            Process::Photo => Self::Photo {
                cross_section: value,
            },
        }
    }

    pub const fn process(&self) -> Process {
        match self {
            Self::Radiative { .. } => Process::Radiative,
            Self::Auger { .. } => Process::Auger,
            Self::Photo { .. } => Process::Photo,
        }
    }

    /// Weight used for branching ratios. Photoionization cross-sections are
    /// treated as rates.
    pub const fn branching_weight(&self) -> f64 {
        match *self {
            Self::Radiative { photon_rate } => photon_rate,
            Self::Auger { total_rate } => total_rate,
            Self::Photo { cross_section } => cross_section,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineRecord {
    pub initial_level: LevelState,
    pub final_level: LevelState,
    pub rate: LineRate,
}

impl LineRecord {
    pub fn new(initial_level: LevelState, final_level: LevelState, rate: LineRate) -> Self {
        Self {
            initial_level,
            final_level,
            rate,
        }
    }

    pub const fn process(&self) -> Process {
        self.rate.process()
    }
}

/// A homogeneous set of transitions produced by one process, optionally
/// keyed by a scalar such as the incident photon energy.
#[derive(Debug, Clone, PartialEq)]
pub struct LineDataset {
    process: Process,
    selection_key: Option<f64>,
    lines: Vec<LineRecord>,
}

impl LineDataset {
    pub fn new(process: Process, lines: Vec<LineRecord>) -> CascadeResult<Self> {
        for (index, line) in lines.iter().enumerate() {
            validate_line(process, index, line)?;
        }
        Ok(Self {
            process,
            selection_key: None,
            lines,
        })
    }

    pub fn keyed(
        process: Process,
        selection_key: f64,
        lines: Vec<LineRecord>,
    ) -> CascadeResult<Self> {
        if !selection_key.is_finite() {
            return Err(CascadeError::input_validation(
                "INPUT.SELECTION_KEY",
                format!("{process} dataset selection key must be finite, got {selection_key}"),
            ));
        }
        let mut dataset = Self::new(process, lines)?;
        dataset.selection_key = Some(selection_key);
        Ok(dataset)
    }

    pub const fn process(&self) -> Process {
        self.process
    }

    pub const fn selection_key(&self) -> Option<f64> {
        self.selection_key
    }

    pub fn lines(&self) -> &[LineRecord] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn matches_key(&self, key: f64) -> bool {
        self.selection_key.is_some_and(|candidate| {
            (candidate - key).abs() <= SELECTION_KEY_RELATIVE_TOLERANCE * key.abs().max(1.0)
        })
    }
}

fn validate_line(process: Process, index: usize, line: &LineRecord) -> CascadeResult<()> {
    if line.process() != process {
        return Err(CascadeError::input_validation(
            "INPUT.MIXED_PROCESS",
            format!(
                "{} dataset contains a {} transition at index {}",
                process,
                line.process(),
                index
            ),
        ));
    }

    for (label, state) in [
        ("initial", &line.initial_level),
        ("final", &line.final_level),
    ] {
        if !state.energy.is_finite() {
            return Err(CascadeError::input_validation(
                "INPUT.LEVEL_ENERGY",
                format!(
                    "{} transition {} has a non-finite {} level energy",
                    process, index, label
                ),
            ));
        }
        if !(0.0..=1.0).contains(&state.relative_occ) {
            return Err(CascadeError::input_validation(
                "INPUT.OCCUPATION_VALUE",
                format!(
                    "{} transition {} has {} level occupation {} outside [0, 1]",
                    process, index, label, state.relative_occ
                ),
            ));
        }
    }

    let weight = line.rate.branching_weight();
    if !weight.is_finite() || weight < 0.0 {
        return Err(CascadeError::input_validation(
            "INPUT.LINE_RATE",
            format!(
                "{} transition {} has invalid rate {}; rates must be finite and non-negative",
                process, index, weight
            ),
        ));
    }

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DatasetId(usize);

impl DatasetId {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }
}

/// Lookup key for a transition stored in a [`LineArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineRef {
    pub dataset: DatasetId,
    pub process: Process,
    pub index: usize,
}

impl LineRef {
    pub const fn new(dataset: DatasetId, process: Process, index: usize) -> Self {
        Self {
            dataset,
            process,
            index,
        }
    }
}

/// Owner of every line dataset of a cascade run. Datasets are immutable once
/// pushed, so [`LineRef`]s handed out stay valid for the arena's lifetime.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineArena {
    datasets: Vec<LineDataset>,
}

impl LineArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_dataset(&mut self, dataset: LineDataset) -> DatasetId {
        self.datasets.push(dataset);
        DatasetId(self.datasets.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    pub fn dataset(&self, id: DatasetId) -> CascadeResult<&LineDataset> {
        self.datasets.get(id.0).ok_or_else(|| {
            CascadeError::internal(
                "SYS.DATASET_HANDLE",
                format!(
                    "dataset handle {} is outside the arena ({} datasets)",
                    id.0,
                    self.datasets.len()
                ),
            )
        })
    }

    pub fn datasets(&self) -> impl Iterator<Item = (DatasetId, &LineDataset)> {
        self.datasets
            .iter()
            .enumerate()
            .map(|(index, dataset)| (DatasetId(index), dataset))
    }

    pub fn line(&self, line: LineRef) -> CascadeResult<&LineRecord> {
        let dataset = self.dataset(line.dataset)?;
        if dataset.process != line.process {
            return Err(CascadeError::internal(
                "SYS.LINE_REF",
                format!(
                    "line reference expects a {} dataset but handle {} holds {} lines",
                    line.process, line.dataset.0, dataset.process
                ),
            ));
        }
        dataset.lines.get(line.index).ok_or_else(|| {
            CascadeError::internal(
                "SYS.LINE_REF",
                format!(
                    "line index {} is outside {} dataset {} ({} lines)",
                    line.index,
                    line.process,
                    line.dataset.0,
                    dataset.lines.len()
                ),
            )
        })
    }

    pub fn has_keyed_datasets(&self, process: Process) -> bool {
        self.datasets
            .iter()
            .any(|dataset| dataset.process == process && dataset.selection_key.is_some())
    }

    /// Picks the keyed dataset of `process` whose selection key matches.
    pub fn select(&self, process: Process, key: f64) -> CascadeResult<DatasetId> {
        let selected = self
            .datasets()
            .find(|(_, dataset)| dataset.process == process && dataset.matches_key(key))
            .map(|(id, _)| id)
            .ok_or_else(|| CascadeError::missing_dataset(process, key))?;
        tracing::trace!(%process, key, dataset = selected.0, "selected keyed line dataset");
        Ok(selected)
    }
}
