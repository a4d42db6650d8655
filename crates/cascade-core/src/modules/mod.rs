pub mod builder;
pub mod distribution;
pub mod input;
pub mod merger;
pub mod orderer;
pub mod pipeline;
pub mod propagator;

mod traits;

#[cfg(test)]
mod fixtures;

pub use builder::{extract_levels, extract_selected_levels, push_levels};
pub use distribution::{
    IonPopulation, LevelPopulation, ion_distribution, level_distribution, level_listing,
};
pub use input::{CascadeDeck, load_deck, parse_deck};
pub use merger::{MergeReport, merge_all, merge_levels};
pub use orderer::{bind_occupations_by_key, sort_by_energy};
pub use pipeline::{
    CascadeGraph, CascadeOutcome, build_cascade_graph, run_cascade, selected_datasets,
};
pub use propagator::{PropagationSummary, propagate_probability, propagation_round};
pub use traits::TransitionSource;
