// Model exports
pub mod domain;

pub use domain::{
    Applicant, ApplicantId, CandidatePair, InterviewStatus, MatchOutcome, PreferenceList, Program,
    ProgramId, ScoredView, Side, SimulationReport, Stage,
};
