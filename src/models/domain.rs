use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Identifier for an applicant, unique within a simulation run.
pub type ApplicantId = u32;
/// Identifier for a program, unique within a simulation run.
pub type ProgramId = u32;

/// Scoring/ranking phase of a simulation run.
///
/// Each stage carries its own independently configured noise magnitude;
/// final-stage noise is typically smaller than pre-interview noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Pre,
    Final,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Pre => write!(f, "pre"),
            Stage::Final => write!(f, "final"),
        }
    }
}

/// Which population the viewer of a scored pair belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Applicant,
    Program,
}

/// Synthetic applicant record.
///
/// `meta_scores` are the applicant's own attribute values (what programs
/// observe); `meta_preferences` are the weights the applicant applies to
/// program attributes when forming their own ratings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Applicant {
    pub id: ApplicantId,
    pub name: String,
    pub base_score: f64,
    #[serde(default)]
    pub meta_scores: BTreeMap<String, f64>,
    #[serde(default)]
    pub meta_preferences: BTreeMap<String, f64>,
}

/// Synthetic residency program record with a positive slot capacity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    pub id: ProgramId,
    pub name: String,
    pub base_score: f64,
    pub capacity: u32,
    #[serde(default)]
    pub meta_scores: BTreeMap<String, f64>,
    #[serde(default)]
    pub meta_preferences: BTreeMap<String, f64>,
}

/// One applicant/program pairing from the full cross-product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CandidatePair {
    pub applicant_id: ApplicantId,
    pub program_id: ProgramId,
}

/// One side's noisy perception of the other for a pair at a stage.
///
/// Exactly one ScoredView exists per (viewer, viewee, stage); recomputing
/// a stage replaces the prior view rather than accumulating.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredView {
    pub viewer: Side,
    pub viewer_id: u32,
    pub viewee_id: u32,
    pub stage: Stage,
    pub observed_score: f64,
}

/// A viewer's strict preference ordering over the candidates visible to
/// them at a stage. Entries are viewee ids, best first, no duplicates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferenceList {
    pub viewer: Side,
    pub viewer_id: u32,
    pub stage: Stage,
    pub ranked: Vec<u32>,
}

impl PreferenceList {
    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }
}

/// Interview lifecycle of a candidate pair.
///
/// Transitions are forward-only: Uninvited -> Invited -> Interviewed,
/// with Declined terminal from Invited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterviewStatus {
    Uninvited,
    Invited,
    Interviewed,
    Declined,
}

/// Final assignment produced by the stable-matching engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchOutcome {
    /// Applicant -> matched program. Unmatched applicants are absent here
    /// and listed in `unmatched_applicants` instead.
    pub by_applicant: BTreeMap<ApplicantId, ProgramId>,
    /// Program -> held applicants, ascending by id, never exceeding capacity.
    pub by_program: BTreeMap<ProgramId, Vec<ApplicantId>>,
    pub unmatched_applicants: BTreeSet<ApplicantId>,
}

impl MatchOutcome {
    /// Number of matched applicants.
    pub fn matched_count(&self) -> usize {
        self.by_applicant.len()
    }

    /// Program assignment for one applicant, if matched.
    pub fn program_of(&self, applicant_id: ApplicantId) -> Option<ProgramId> {
        self.by_applicant.get(&applicant_id).copied()
    }
}

/// Summary of one complete simulation run, emitted as JSON by the binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    pub seed: u64,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub elapsed_ms: u64,
    pub applicant_count: usize,
    pub program_count: usize,
    pub total_capacity: u64,
    pub candidate_pairs: usize,
    pub applications: usize,
    pub invitations: usize,
    pub declines: usize,
    pub interviews: usize,
    pub matched: usize,
    pub match_rate: f64,
    pub outcome: MatchOutcome,
}
