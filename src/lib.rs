//! Match Sim - deterministic simulation engine for the medical residency match
//!
//! This library simulates a two-sided matching market: synthetic applicant
//! and program populations are sampled, scored with configurable noise,
//! paired for interviews, ranked by mutual preference, and matched with
//! capacity-constrained deferred acceptance.

pub mod config;
pub mod core;
pub mod models;

// Re-export commonly used types
pub use config::Settings;
pub use core::{SimulationEngine, SimulationError};
pub use models::{
    Applicant, CandidatePair, InterviewStatus, MatchOutcome, PreferenceList, Program, ScoredView,
    Side, SimulationReport, Stage,
};
