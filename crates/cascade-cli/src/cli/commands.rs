use super::CliError;
use super::helpers::*;
use cascade_core::common::config::PropagationMode;
use cascade_core::modules::{build_cascade_graph, run_cascade};
use std::path::PathBuf;

#[derive(clap::Args)]
pub(super) struct RunArgs {
    /// Input deck (JSON)
    #[arg(long)]
    input: PathBuf,

    /// Incident energy selecting one dataset of every keyed family
    #[arg(long)]
    selection_key: Option<f64>,

    /// Propagation mode: sequential or buffered
    #[arg(long)]
    mode: Option<PropagationMode>,

    /// Round guard for cyclic input
    #[arg(long)]
    max_rounds: Option<usize>,

    /// Also write the JSON report to this path
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(clap::Args)]
pub(super) struct LevelsArgs {
    /// Input deck (JSON)
    #[arg(long)]
    input: PathBuf,

    /// Incident energy selecting one dataset of every keyed family
    #[arg(long)]
    selection_key: Option<f64>,
}

pub(super) fn run_cascade_command(args: RunArgs) -> Result<i32, CliError> {
    let overrides = DeckOverrides {
        selection_key: args.selection_key,
        mode: args.mode,
        max_rounds: args.max_rounds,
    };
    let deck = load_deck_with_overrides(&args.input, &overrides)?;
    let outcome = run_cascade(&deck.arena, &deck.settings).map_err(CliError::Compute)?;

    let rendered = render_json(&RunReport::from_outcome(&outcome))?;
    if let Some(path) = &args.report {
        write_report(path, &rendered)?;
        tracing::info!(path = %path.display(), "wrote cascade report");
    }
    println!("{}", rendered);
    Ok(0)
}

/// Lists the graph with deck occupations ignored, so the listing stays
/// available while the occupations themselves are being written.
pub(super) fn run_levels_command(args: LevelsArgs) -> Result<i32, CliError> {
    let overrides = DeckOverrides {
        selection_key: args.selection_key,
        ..DeckOverrides::default()
    };
    let mut deck = load_deck_with_overrides(&args.input, &overrides)?;
    deck.settings.initial_occupations.clear();
    deck.settings.keyed_occupations.clear();

    let graph = build_cascade_graph(&deck.arena, &deck.settings).map_err(CliError::Compute)?;
    println!("{}", render_json(&LevelsReport::from_graph(&graph))?);
    Ok(0)
}
