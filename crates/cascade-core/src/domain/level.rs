use super::errors::{CascadeError, CascadeResult};
use super::line::LineRef;
use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Parity {
    #[serde(rename = "+", alias = "even")]
    Even,
    #[serde(rename = "-", alias = "odd")]
    Odd,
}

impl Parity {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Even => "+",
            Self::Odd => "-",
        }
    }
}

impl Display for Parity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

/// Total angular momentum J, stored as 2J so half-integers stay exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AngularMomentum(u32);

impl AngularMomentum {
    pub const fn from_twice(twice_j: u32) -> Self {
        Self(twice_j)
    }

    pub const fn twice(self) -> u32 {
        self.0
    }

    pub fn value(self) -> f64 {
        f64::from(self.0) / 2.0
    }
}

impl Display for AngularMomentum {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.0.is_multiple_of(2) {
            write!(f, "{}", self.0 / 2)
        } else {
            write!(f, "{}/2", self.0)
        }
    }
}

/// Identity of a level. Energies compare by bit pattern after folding `-0.0`
/// onto `0.0`, so two keys are equal exactly when all four quantum labels
/// are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LevelKey {
    energy_bits: u64,
    angular_momentum: AngularMomentum,
    parity: Parity,
    electron_count: u32,
}

impl LevelKey {
    pub fn new(
        energy: f64,
        angular_momentum: AngularMomentum,
        parity: Parity,
        electron_count: u32,
    ) -> Self {
        let energy = if energy == 0.0 { 0.0 } else { energy };
        Self {
            energy_bits: energy.to_bits(),
            angular_momentum,
            parity,
            electron_count,
        }
    }

    pub fn energy(&self) -> f64 {
        f64::from_bits(self.energy_bits)
    }

    pub const fn angular_momentum(&self) -> AngularMomentum {
        self.angular_momentum
    }

    pub const fn parity(&self) -> Parity {
        self.parity
    }

    pub const fn electron_count(&self) -> u32 {
        self.electron_count
    }
}

impl Display for LevelKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} a.u. {}{} ({} electrons)",
            self.energy(),
            self.angular_momentum,
            self.parity,
            self.electron_count
        )
    }
}

/// A node of the cascade graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    key: LevelKey,
    pub relative_occ: f64,
    pub parents: Vec<LineRef>,
    pub daughters: Vec<LineRef>,
}

impl Level {
    pub fn new(key: LevelKey, relative_occ: f64) -> Self {
        Self {
            key,
            relative_occ,
            parents: Vec::new(),
            daughters: Vec::new(),
        }
    }

    pub const fn key(&self) -> &LevelKey {
        &self.key
    }

    pub fn energy(&self) -> f64 {
        self.key.energy()
    }

    pub const fn angular_momentum(&self) -> AngularMomentum {
        self.key.angular_momentum
    }

    pub const fn parity(&self) -> Parity {
        self.key.parity
    }

    pub const fn electron_count(&self) -> u32 {
        self.key.electron_count
    }

    pub fn is_terminal(&self) -> bool {
        self.daughters.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.parents.len() + self.daughters.len()
    }

    /// Adds every edge of `other` that this level does not reference yet.
    pub(crate) fn union_edges(&mut self, other: &Level) {
        for line in &other.parents {
            if !self.parents.contains(line) {
                self.parents.push(*line);
            }
        }
        for line in &other.daughters {
            if !self.daughters.contains(line) {
                self.daughters.push(*line);
            }
        }
    }
}

/// Ordered, key-indexed collection of levels. Iteration order is the order
/// the propagator visits levels in and the order positional occupations are
/// addressed against.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevelList {
    levels: IndexMap<LevelKey, Level>,
}

impl LevelList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            levels: IndexMap::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Level> {
        self.levels.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &LevelKey> {
        self.levels.keys()
    }

    pub fn get_index(&self, position: usize) -> Option<&Level> {
        self.levels.get_index(position).map(|(_, level)| level)
    }

    pub fn index_of(&self, key: &LevelKey) -> Option<usize> {
        self.levels.get_index_of(key)
    }

    pub fn find(&self, key: &LevelKey) -> CascadeResult<&Level> {
        self.levels
            .get(key)
            .ok_or_else(|| CascadeError::level_not_found(*key))
    }

    pub fn position_of(&self, key: &LevelKey) -> CascadeResult<usize> {
        self.levels
            .get_index_of(key)
            .ok_or_else(|| CascadeError::level_not_found(*key))
    }

    pub fn total_occupation(&self) -> f64 {
        self.levels.values().map(|level| level.relative_occ).sum()
    }

    /// Inserts `level`, or appends its edges onto the level already stored
    /// under the same key. Returns `true` when a new entry was created.
    pub fn push_level(&mut self, level: Level) -> bool {
        match self.levels.entry(level.key) {
            Entry::Occupied(mut entry) => {
                let existing = entry.get_mut();
                existing.parents.extend(level.parents);
                existing.daughters.extend(level.daughters);
                false
            }
            Entry::Vacant(entry) => {
                entry.insert(level);
                true
            }
        }
    }

    /// Stable sort by energy, highest first.
    pub fn sort_by_energy_descending(&mut self) {
        self.levels
            .sort_by(|left, _, right, _| right.energy().total_cmp(&left.energy()));
    }

    pub fn set_occupation(&mut self, key: &LevelKey, occupation: f64) -> CascadeResult<()> {
        let level = self
            .levels
            .get_mut(key)
            .ok_or_else(|| CascadeError::level_not_found(*key))?;
        level.relative_occ = occupation;
        Ok(())
    }

    pub(crate) fn level_at_mut(&mut self, position: usize) -> Option<&mut Level> {
        self.levels.get_index_mut(position).map(|(_, level)| level)
    }

    pub(crate) fn reset_occupations(&mut self) {
        for level in self.levels.values_mut() {
            level.relative_occ = 0.0;
        }
    }

    pub fn into_levels(self) -> Vec<Level> {
        self.levels.into_values().collect()
    }
}

impl FromIterator<Level> for LevelList {
    fn from_iter<I: IntoIterator<Item = Level>>(iter: I) -> Self {
        let mut list = Self::new();
        for level in iter {
            list.push_level(level);
        }
        list
    }
}
