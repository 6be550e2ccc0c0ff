use std::collections::{BTreeMap, BTreeSet};

use crate::models::{ApplicantId, CandidatePair, InterviewStatus, PreferenceList, ProgramId};

/// Tracks the interview lifecycle of every candidate pair in a run.
///
/// The only mutable run-scoped state besides the match result. Transitions
/// are forward-only; an invalid transition leaves the pair untouched and
/// reports `false`.
#[derive(Debug, Clone)]
pub struct InterviewLedger {
    statuses: BTreeMap<CandidatePair, InterviewStatus>,
}

impl InterviewLedger {
    /// Start every pair at Uninvited.
    pub fn new(pairs: &[CandidatePair]) -> Self {
        Self {
            statuses: pairs
                .iter()
                .map(|p| (*p, InterviewStatus::Uninvited))
                .collect(),
        }
    }

    pub fn status(&self, pair: &CandidatePair) -> Option<InterviewStatus> {
        self.statuses.get(pair).copied()
    }

    /// Uninvited -> Invited.
    pub fn invite(&mut self, pair: &CandidatePair) -> bool {
        self.transition(pair, InterviewStatus::Uninvited, InterviewStatus::Invited)
    }

    /// Invited -> Declined (terminal).
    pub fn decline(&mut self, pair: &CandidatePair) -> bool {
        self.transition(pair, InterviewStatus::Invited, InterviewStatus::Declined)
    }

    /// Invited -> Interviewed.
    pub fn mark_interviewed(&mut self, pair: &CandidatePair) -> bool {
        self.transition(pair, InterviewStatus::Invited, InterviewStatus::Interviewed)
    }

    fn transition(
        &mut self,
        pair: &CandidatePair,
        from: InterviewStatus,
        to: InterviewStatus,
    ) -> bool {
        match self.statuses.get_mut(pair) {
            Some(status) if *status == from => {
                *status = to;
                true
            }
            _ => false,
        }
    }

    pub fn pairs_with_status(&self, status: InterviewStatus) -> Vec<CandidatePair> {
        self.statuses
            .iter()
            .filter(|(_, s)| **s == status)
            .map(|(p, _)| *p)
            .collect()
    }

    /// Pairs that completed an interview, in (applicant, program) order.
    pub fn interviewed_pairs(&self) -> Vec<CandidatePair> {
        self.pairs_with_status(InterviewStatus::Interviewed)
    }

    pub fn count_with_status(&self, status: InterviewStatus) -> usize {
        self.statuses.values().filter(|s| **s == status).count()
    }
}

/// Truncate a program's pre-interview ranking to its invitation list.
///
/// A limit of zero invites no one; a limit past the end of the visible
/// candidates invites everyone. When `applied` is given, only applicants
/// who applied to this program are eligible.
pub fn select_invitees(
    program_id: ProgramId,
    pre_ranking: &PreferenceList,
    interview_limit: usize,
    applied: Option<&BTreeSet<(ApplicantId, ProgramId)>>,
) -> Vec<ApplicantId> {
    pre_ranking
        .ranked
        .iter()
        .copied()
        .filter(|&applicant_id| match applied {
            Some(applied) => applied.contains(&(applicant_id, program_id)),
            None => true,
        })
        .take(interview_limit)
        .collect()
}

/// Per-program interview limits with a simulation-wide default.
#[derive(Debug, Clone)]
pub struct InterviewLimits {
    default: usize,
    per_program: BTreeMap<ProgramId, usize>,
}

impl InterviewLimits {
    pub fn uniform(default: usize) -> Self {
        Self {
            default,
            per_program: BTreeMap::new(),
        }
    }

    pub fn with_override(mut self, program_id: ProgramId, limit: usize) -> Self {
        self.per_program.insert(program_id, limit);
        self
    }

    pub fn limit_for(&self, program_id: ProgramId) -> usize {
        self.per_program.get(&program_id).copied().unwrap_or(self.default)
    }
}

/// Run invitation selection for every program ranking and record the
/// Uninvited -> Invited transitions in the ledger.
///
/// Returns the invited pairs in (applicant, program) order. Reciprocal
/// acceptance is not decided here; declines arrive as a later transition.
pub fn select_invitations(
    program_rankings: &[PreferenceList],
    limits: &InterviewLimits,
    applied: Option<&BTreeSet<(ApplicantId, ProgramId)>>,
    ledger: &mut InterviewLedger,
) -> Vec<CandidatePair> {
    let mut invited = Vec::new();
    for ranking in program_rankings {
        let program_id = ranking.viewer_id;
        for applicant_id in select_invitees(
            program_id,
            ranking,
            limits.limit_for(program_id),
            applied,
        ) {
            let pair = CandidatePair {
                applicant_id,
                program_id,
            };
            if ledger.invite(&pair) {
                invited.push(pair);
            }
        }
    }
    invited.sort();
    invited
}
