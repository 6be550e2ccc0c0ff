use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::core::error::SimulationError;
use crate::models::{ApplicantId, MatchOutcome, PreferenceList, ProgramId, Side};

/// Run capacity-constrained deferred acceptance (applicant-proposing
/// Gale-Shapley) over the final preference lists.
///
/// Each free applicant proposes to the best program that has not yet
/// rejected them; each program tentatively holds its best `capacity`
/// proposals and rejects the rest, bumping a held applicant when a
/// better-ranked proposal arrives. An applicant a program never ranked is
/// rejected outright. The fixed point is stable and applicant-optimal
/// among stable matchings for these lists.
///
/// Applicants or programs with empty lists simply end unmatched/unfilled.
pub fn run_match(
    applicant_prefs: &[PreferenceList],
    program_prefs: &[PreferenceList],
    capacities: &BTreeMap<ProgramId, u32>,
) -> Result<MatchOutcome, SimulationError> {
    let applicant_lists = collect_lists(applicant_prefs, Side::Applicant)?;
    let program_lists = collect_lists(program_prefs, Side::Program)?;

    let applicant_roster: BTreeSet<ApplicantId> = applicant_lists.keys().copied().collect();
    let program_roster: BTreeSet<ProgramId> = program_lists.keys().copied().collect();

    for (&applicant_id, ranked) in &applicant_lists {
        validate_entries(Side::Applicant, applicant_id, ranked, &program_roster)?;
    }
    for (&program_id, ranked) in &program_lists {
        validate_entries(Side::Program, program_id, ranked, &applicant_roster)?;
    }
    for &program_id in &program_roster {
        if !capacities.contains_key(&program_id) {
            return Err(SimulationError::InvalidConfig(format!(
                "no capacity configured for program {}",
                program_id
            )));
        }
    }

    // Program-side rank lookup: lower rank = more preferred.
    let rank_of: BTreeMap<ProgramId, BTreeMap<ApplicantId, usize>> = program_lists
        .iter()
        .map(|(&program_id, ranked)| {
            let ranks = ranked.iter().enumerate().map(|(i, &a)| (a, i)).collect();
            (program_id, ranks)
        })
        .collect();

    // Tentatively held proposals per program, as (program rank, applicant).
    let mut held: BTreeMap<ProgramId, Vec<(usize, ApplicantId)>> = BTreeMap::new();
    let mut next_choice: BTreeMap<ApplicantId, usize> =
        applicant_roster.iter().map(|&a| (a, 0)).collect();
    let mut free: VecDeque<ApplicantId> = applicant_roster.iter().copied().collect();

    while let Some(applicant_id) = free.pop_front() {
        let prefs = &applicant_lists[&applicant_id];
        let choice = next_choice[&applicant_id];
        if choice >= prefs.len() {
            // List exhausted: permanently unmatched.
            continue;
        }
        if let Some(c) = next_choice.get_mut(&applicant_id) {
            *c += 1;
        }

        let program_id = prefs[choice];
        let capacity = capacities[&program_id] as usize;
        let rank = match rank_of[&program_id].get(&applicant_id) {
            Some(&rank) => rank,
            None => {
                // The program did not rank this applicant.
                free.push_back(applicant_id);
                continue;
            }
        };

        if capacity == 0 {
            free.push_back(applicant_id);
            continue;
        }

        let held_here = held.entry(program_id).or_default();
        if held_here.len() < capacity {
            held_here.push((rank, applicant_id));
        } else if let Some(worst_index) = index_of_worst(held_here) {
            let (worst_rank, worst_applicant) = held_here[worst_index];
            if rank < worst_rank {
                held_here[worst_index] = (rank, applicant_id);
                free.push_back(worst_applicant);
            } else {
                free.push_back(applicant_id);
            }
        }
    }

    let mut by_applicant = BTreeMap::new();
    let mut by_program = BTreeMap::new();
    for (&program_id, held_here) in &held {
        let mut assigned: Vec<ApplicantId> = held_here.iter().map(|&(_, a)| a).collect();
        assigned.sort_unstable();
        for &applicant_id in &assigned {
            by_applicant.insert(applicant_id, program_id);
        }
        by_program.insert(program_id, assigned);
    }
    for &program_id in &program_roster {
        by_program.entry(program_id).or_default();
    }
    let unmatched_applicants: BTreeSet<ApplicantId> = applicant_roster
        .iter()
        .copied()
        .filter(|a| !by_applicant.contains_key(a))
        .collect();

    Ok(MatchOutcome {
        by_applicant,
        by_program,
        unmatched_applicants,
    })
}

/// Search a match outcome for a blocking pair: an applicant and program
/// that both strictly prefer each other over their assignment. Returns
/// `None` when the outcome is stable.
pub fn find_blocking_pair(
    outcome: &MatchOutcome,
    applicant_prefs: &[PreferenceList],
    program_prefs: &[PreferenceList],
    capacities: &BTreeMap<ProgramId, u32>,
) -> Option<(ApplicantId, ProgramId)> {
    let program_rank: BTreeMap<ProgramId, BTreeMap<ApplicantId, usize>> = program_prefs
        .iter()
        .map(|list| {
            let ranks = list.ranked.iter().enumerate().map(|(i, &a)| (a, i)).collect();
            (list.viewer_id, ranks)
        })
        .collect();

    for list in applicant_prefs {
        let applicant_id = list.viewer_id;
        let current = outcome.program_of(applicant_id);

        for &program_id in &list.ranked {
            // Stop once we reach the applicant's current assignment:
            // nothing below it is preferred.
            if current == Some(program_id) {
                break;
            }

            let Some(ranks) = program_rank.get(&program_id) else { continue };
            let Some(&rank) = ranks.get(&applicant_id) else { continue };

            let capacity = capacities.get(&program_id).copied().unwrap_or(0) as usize;
            let assigned = outcome
                .by_program
                .get(&program_id)
                .map(|v| v.as_slice())
                .unwrap_or(&[]);

            if capacity > 0 && assigned.len() < capacity {
                return Some((applicant_id, program_id));
            }
            let prefers_over_worst = assigned
                .iter()
                .filter_map(|a| ranks.get(a))
                .max()
                .is_some_and(|&worst| rank < worst);
            if prefers_over_worst {
                return Some((applicant_id, program_id));
            }
        }
    }

    None
}

fn collect_lists(
    lists: &[PreferenceList],
    expected_side: Side,
) -> Result<BTreeMap<u32, Vec<u32>>, SimulationError> {
    let mut out = BTreeMap::new();
    for list in lists {
        if list.viewer != expected_side {
            return Err(SimulationError::InvalidPreferenceList {
                viewer: list.viewer,
                viewer_id: list.viewer_id,
                reason: format!("expected a {:?}-side list", expected_side),
            });
        }
        if out.insert(list.viewer_id, list.ranked.clone()).is_some() {
            return Err(SimulationError::InvalidPreferenceList {
                viewer: list.viewer,
                viewer_id: list.viewer_id,
                reason: "duplicate preference list for viewer".to_string(),
            });
        }
    }
    Ok(out)
}

fn validate_entries(
    viewer: Side,
    viewer_id: u32,
    ranked: &[u32],
    opposite_roster: &BTreeSet<u32>,
) -> Result<(), SimulationError> {
    let mut seen = BTreeSet::new();
    for &viewee_id in ranked {
        if !opposite_roster.contains(&viewee_id) {
            return Err(SimulationError::InvalidPreferenceList {
                viewer,
                viewer_id,
                reason: format!("references unknown participant {}", viewee_id),
            });
        }
        if !seen.insert(viewee_id) {
            return Err(SimulationError::InvalidPreferenceList {
                viewer,
                viewer_id,
                reason: format!("references participant {} twice", viewee_id),
            });
        }
    }
    Ok(())
}

fn index_of_worst(held: &[(usize, ApplicantId)]) -> Option<usize> {
    held.iter()
        .enumerate()
        .max_by_key(|(_, &(rank, _))| rank)
        .map(|(i, _)| i)
}
