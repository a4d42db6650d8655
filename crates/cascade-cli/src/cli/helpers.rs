use super::CliError;
use anyhow::Context;
use cascade_core::common::config::{CascadeSettings, PropagationMode};
use cascade_core::modules::{
    CascadeDeck, CascadeGraph, CascadeOutcome, IonPopulation, LevelPopulation, MergeReport,
    PropagationSummary, level_listing, load_deck,
};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Settings given on the command line; each one present replaces the deck's.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(super) struct DeckOverrides {
    pub(super) selection_key: Option<f64>,
    pub(super) mode: Option<PropagationMode>,
    pub(super) max_rounds: Option<usize>,
}

impl DeckOverrides {
    pub(super) fn apply(&self, settings: &mut CascadeSettings) {
        if let Some(selection_key) = self.selection_key {
            settings.selection_key = Some(selection_key);
        }
        if let Some(mode) = self.mode {
            settings.propagation = mode;
        }
        if let Some(max_rounds) = self.max_rounds {
            settings.max_rounds = Some(max_rounds);
        }
    }
}

pub(super) fn load_deck_with_overrides(
    path: &Path,
    overrides: &DeckOverrides,
) -> Result<CascadeDeck, CliError> {
    let mut deck = load_deck(path).map_err(CliError::Compute)?;
    overrides.apply(&mut deck.settings);
    tracing::debug!(?overrides, "applied command-line overrides");
    Ok(deck)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RunReport<'a> {
    datasets: usize,
    level_count: usize,
    merge_reports: &'a [MergeReport],
    propagation: &'a PropagationSummary,
    ion_distribution: Vec<IonPopulation>,
    level_distribution: Vec<LevelPopulation>,
}

impl<'a> RunReport<'a> {
    pub(super) fn from_outcome(outcome: &'a CascadeOutcome) -> Self {
        Self {
            datasets: outcome.datasets.len(),
            level_count: outcome.levels.len(),
            merge_reports: &outcome.merge_reports,
            propagation: &outcome.propagation,
            ion_distribution: outcome.ion_distribution(),
            level_distribution: outcome.level_distribution(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct LevelsReport<'a> {
    datasets: usize,
    merge_reports: &'a [MergeReport],
    levels: Vec<LevelPopulation>,
}

impl<'a> LevelsReport<'a> {
    pub(super) fn from_graph(graph: &'a CascadeGraph) -> Self {
        Self {
            datasets: graph.datasets.len(),
            merge_reports: &graph.merge_reports,
            levels: level_listing(&graph.levels),
        }
    }
}

pub(super) fn render_json<T: Serialize>(report: &T) -> Result<String, CliError> {
    let rendered = serde_json::to_string_pretty(report).context("failed to serialize report")?;
    Ok(rendered)
}

pub(super) fn write_report(path: &Path, rendered: &str) -> Result<(), CliError> {
    let parent = path.parent().unwrap_or(Path::new(""));
    if !parent.as_os_str().is_empty() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create report directory '{}'", parent.display()))?;
    }
    fs::write(path, rendered)
        .with_context(|| format!("failed to write report '{}'", path.display()))?;
    Ok(())
}
