//! Run settings passed explicitly into every pipeline call.
//!
//! Settings are deserialized from the `settings` block of an input deck and
//! can be overridden piecewise by callers (the CLI does so from flags).

use crate::domain::{AngularMomentum, CascadeError, CascadeResult, LevelKey, Parity};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// How a propagation round applies the transfers it computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropagationMode {
    /// Transfers land immediately, so a level visited later in the same round
    /// forwards what it just received. Results depend on level order.
    #[default]
    Sequential,
    /// Transfers are buffered and applied after the full pass. Results are
    /// independent of level order.
    Buffered,
}

impl PropagationMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::Buffered => "buffered",
        }
    }
}

impl Display for PropagationMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

impl FromStr for PropagationMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(Self::Sequential),
            "buffered" => Ok(Self::Buffered),
            other => Err(format!(
                "unknown propagation mode '{other}'; expected 'sequential' or 'buffered'"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PropagationOptions {
    pub mode: PropagationMode,
    /// Round guard; `None` uses the level count plus one.
    pub max_rounds: Option<usize>,
}

impl PropagationOptions {
    /// Rounds a graph of `level_count` levels may run, the final zero round
    /// included.
    pub fn round_limit(&self, level_count: usize) -> CascadeResult<usize> {
        match self.max_rounds {
            Some(0) => Err(CascadeError::input_validation(
                "INPUT.MAX_ROUNDS",
                "maxRounds must be at least 1; the settling round counts too",
            )),
            Some(limit) => Ok(limit),
            None => Ok(level_count + 1),
        }
    }
}

/// Initial occupation addressed by identity key instead of sorted position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyedOccupation {
    pub energy: f64,
    #[serde(rename = "twoJ")]
    pub two_j: AngularMomentum,
    pub parity: Parity,
    pub electron_count: u32,
    pub occupation: f64,
}

impl KeyedOccupation {
    pub fn key(&self) -> LevelKey {
        LevelKey::new(self.energy, self.two_j, self.parity, self.electron_count)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CascadeSettings {
    /// `(position, occupation)` pairs; positions are 1-based into the
    /// energy-descending level order.
    #[serde(default)]
    pub initial_occupations: Vec<(usize, f64)>,
    #[serde(default)]
    pub keyed_occupations: Vec<KeyedOccupation>,
    #[serde(default)]
    pub selection_key: Option<f64>,
    #[serde(default)]
    pub propagation: PropagationMode,
    #[serde(default)]
    pub max_rounds: Option<usize>,
}

impl CascadeSettings {
    pub fn propagation_options(&self) -> PropagationOptions {
        PropagationOptions {
            mode: self.propagation,
            max_rounds: self.max_rounds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CascadeSettings, PropagationMode, PropagationOptions};
    use crate::domain::{AngularMomentum, LevelKey, Parity};

    #[test]
    fn settings_deserialize_with_defaults() {
        let settings: CascadeSettings = serde_json::from_str("{}").expect("defaults");
        assert_eq!(settings, CascadeSettings::default());
        assert_eq!(settings.propagation, PropagationMode::Sequential);
    }

    #[test]
    fn settings_parse_positional_and_keyed_occupations() {
        let settings: CascadeSettings = serde_json::from_str(
            r#"
            {
              "initialOccupations": [[1, 0.75], [3, 0.25]],
              "keyedOccupations": [
                { "energy": -2.5, "twoJ": 3, "parity": "-", "electronCount": 4, "occupation": 1.0 }
              ],
              "selectionKey": 12.0,
              "propagation": "buffered",
              "maxRounds": 40
            }
            "#,
        )
        .expect("settings should parse");

        assert_eq!(settings.initial_occupations, vec![(1, 0.75), (3, 0.25)]);
        assert_eq!(
            settings.keyed_occupations[0].key(),
            LevelKey::new(-2.5, AngularMomentum::from_twice(3), Parity::Odd, 4)
        );
        assert_eq!(settings.selection_key, Some(12.0));
        let options = settings.propagation_options();
        assert_eq!(options.mode, PropagationMode::Buffered);
        assert_eq!(options.max_rounds, Some(40));
    }

    #[test]
    fn settings_reject_unknown_fields() {
        let error = serde_json::from_str::<CascadeSettings>(r#"{ "initialOccupation": [] }"#)
            .expect_err("misspelled field should be rejected");
        assert!(error.to_string().contains("initialOccupation"));
    }

    #[test]
    fn propagation_mode_parses_from_flags() {
        assert_eq!(
            "Buffered".parse::<PropagationMode>(),
            Ok(PropagationMode::Buffered)
        );
        assert_eq!(
            " sequential ".parse::<PropagationMode>(),
            Ok(PropagationMode::Sequential)
        );
        assert!("jacobi".parse::<PropagationMode>().is_err());
        assert_eq!(PropagationMode::Buffered.to_string(), "buffered");
    }

    #[test]
    fn round_limit_defaults_to_level_count_and_rejects_zero() {
        let default = PropagationOptions::default();
        assert_eq!(default.round_limit(4).expect("default guard"), 5);

        let explicit = PropagationOptions {
            max_rounds: Some(3),
            ..default
        };
        assert_eq!(explicit.round_limit(40).expect("explicit guard"), 3);

        let zero = PropagationOptions {
            max_rounds: Some(0),
            ..default
        };
        let error = zero.round_limit(4).expect_err("zero rounds");
        assert_eq!(error.placeholder(), "INPUT.MAX_ROUNDS");
        assert_eq!(error.exit_code(), 2);
    }
}
