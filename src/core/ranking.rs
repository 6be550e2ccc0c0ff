use std::collections::BTreeMap;

use crate::core::error::SimulationError;
use crate::models::{PreferenceList, ScoredView, Side, Stage};

/// Order one viewer's scored candidates into a strict preference list.
///
/// Candidates sort by observed score descending; exact ties break by
/// ascending viewee id, so repeated runs over identical scores reproduce
/// identical lists. An empty candidate set yields an empty list when
/// `allow_empty` is set and an `EmptyCandidateSet` error otherwise.
pub fn rank(
    viewer: Side,
    viewer_id: u32,
    stage: Stage,
    candidate_scores: &[(u32, f64)],
    allow_empty: bool,
) -> Result<PreferenceList, SimulationError> {
    if candidate_scores.is_empty() && !allow_empty {
        return Err(SimulationError::EmptyCandidateSet {
            viewer,
            viewer_id,
            stage,
        });
    }

    let mut scored: Vec<(u32, f64)> = candidate_scores.to_vec();
    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });

    Ok(PreferenceList {
        viewer,
        viewer_id,
        stage,
        ranked: scored.into_iter().map(|(id, _)| id).collect(),
    })
}

/// Rank every viewer on both sides for one stage.
///
/// `applicant_ids` and `program_ids` are the full viewer rosters; a roster
/// member with no scored views at this stage is ranked over the empty set,
/// subject to the `allow_empty` policy. Output is ordered applicants
/// first, then programs, each ascending by viewer id.
pub fn rank_stage(
    views: &[ScoredView],
    stage: Stage,
    applicant_ids: &[u32],
    program_ids: &[u32],
    allow_empty: bool,
) -> Result<Vec<PreferenceList>, SimulationError> {
    let mut by_viewer: BTreeMap<(Side, u32), Vec<(u32, f64)>> = BTreeMap::new();
    for view in views.iter().filter(|v| v.stage == stage) {
        by_viewer
            .entry((view.viewer, view.viewer_id))
            .or_default()
            .push((view.viewee_id, view.observed_score));
    }

    let empty: Vec<(u32, f64)> = Vec::new();
    let mut lists = Vec::with_capacity(applicant_ids.len() + program_ids.len());
    for (side, roster) in [(Side::Applicant, applicant_ids), (Side::Program, program_ids)] {
        for &viewer_id in roster {
            let scores = by_viewer.get(&(side, viewer_id)).unwrap_or(&empty);
            lists.push(rank(side, viewer_id, stage, scores, allow_empty)?);
        }
    }

    Ok(lists)
}
