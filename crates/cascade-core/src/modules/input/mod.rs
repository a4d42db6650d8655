//! JSON input decks: line datasets plus run settings.
//!
//! ```json
//! {
//!   "datasets": [
//!     { "process": "Auger", "lines": [
//!       { "initial": { "energy": 4.0, "twoJ": 1, "parity": "+", "electronCount": 3 },
//!         "final":   { "energy": 1.0, "twoJ": 1, "parity": "+", "electronCount": 2 },
//!         "rate": 0.25 } ] }
//!   ],
//!   "settings": { "initialOccupations": [[1, 1.0]] }
//! }
//! ```

mod model;
mod parser;

use crate::common::config::CascadeSettings;
use crate::domain::{LineArena, ParserResult};
use std::path::Path;

use parser::{build_arena, parse_raw_deck, read_deck_source};

#[derive(Debug, Clone, PartialEq)]
pub struct CascadeDeck {
    pub arena: LineArena,
    pub settings: CascadeSettings,
}

pub fn parse_deck(source: &str) -> ParserResult<CascadeDeck> {
    let raw = parse_raw_deck(source)?;
    Ok(CascadeDeck {
        arena: build_arena(raw.datasets)?,
        settings: raw.settings,
    })
}

pub fn load_deck(path: &Path) -> ParserResult<CascadeDeck> {
    let source = read_deck_source(path)?;
    let deck = parse_deck(&source)?;
    tracing::debug!(
        path = %path.display(),
        datasets = deck.arena.len(),
        "loaded cascade input deck"
    );
    Ok(deck)
}
