//! Merging of level graphs built independently, e.g. one per ionization
//! stage or per incident photon energy.

use crate::domain::LevelList;
use serde::Serialize;

/// Telemetry of one merge; not consulted by later stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeReport {
    pub total_before: usize,
    pub newly_added: usize,
    pub modified: usize,
}

/// Merges `incoming` into `existing`.
///
/// Levels are matched by their full identity key. A matched level keeps its
/// position from `existing` and gains every edge of its `incoming` twin it
/// did not hold yet; unmatched `incoming` levels are appended in their own
/// order. Every output level has zero occupation.
pub fn merge_levels(existing: LevelList, incoming: LevelList) -> (LevelList, MergeReport) {
    let total_before = existing.len();
    let mut consumed = vec![false; incoming.len()];
    let mut modified = 0;
    let mut merged = LevelList::with_capacity(existing.len() + incoming.len());

    for mut level in existing.into_levels() {
        if let Some(position) = incoming.index_of(level.key()) {
            if let Some(twin) = incoming.get_index(position) {
                let edges_before = level.edge_count();
                level.union_edges(twin);
                if level.edge_count() > edges_before {
                    modified += 1;
                }
            }
            consumed[position] = true;
        }
        merged.push_level(level);
    }

    let newly_added = consumed.iter().filter(|taken| !**taken).count();
    for (level, taken) in incoming.into_levels().into_iter().zip(consumed) {
        if !taken {
            merged.push_level(level);
        }
    }
    merged.reset_occupations();

    let report = MergeReport {
        total_before,
        newly_added,
        modified,
    };
    tracing::debug!(
        total_before = report.total_before,
        newly_added = report.newly_added,
        modified = report.modified,
        "merged level graphs"
    );
    (merged, report)
}

/// Folds `graphs` left to right with [`merge_levels`].
pub fn merge_all<I>(graphs: I) -> (LevelList, Vec<MergeReport>)
where
    I: IntoIterator<Item = LevelList>,
{
    let mut reports = Vec::new();
    let mut graphs = graphs.into_iter();
    let Some(first) = graphs.next() else {
        return (LevelList::new(), reports);
    };

    let (mut merged, report) = merge_levels(LevelList::new(), first);
    reports.push(report);
    for graph in graphs {
        let (next, report) = merge_levels(merged, graph);
        merged = next;
        reports.push(report);
    }
    (merged, reports)
}
