use crate::common::config::CascadeSettings;
use crate::domain::Parity;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct RawDeck {
    pub(super) datasets: Vec<RawDataset>,
    #[serde(default)]
    pub(super) settings: CascadeSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(super) struct RawDataset {
    pub(super) process: String,
    #[serde(default)]
    pub(super) selection_key: Option<f64>,
    #[serde(default)]
    pub(super) lines: Vec<RawLine>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct RawLine {
    pub(super) initial: RawLevelState,
    #[serde(rename = "final")]
    pub(super) final_level: RawLevelState,
    pub(super) rate: f64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(super) struct RawLevelState {
    pub(super) energy: f64,
    #[serde(rename = "twoJ")]
    pub(super) two_j: u32,
    pub(super) parity: Parity,
    pub(super) electron_count: u32,
    #[serde(default)]
    pub(super) relative_occ: f64,
}
