use thiserror::Error;

use crate::models::{Side, Stage};

/// Errors raised synchronously by the simulation engine.
///
/// None of these are retried internally; a failed operation leaves
/// interview statuses and match results untouched.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Malformed sampling or noise parameters (negative stddev,
    /// non-positive counts, out-of-range probabilities).
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Ranking requested for a viewer with no visible candidates while
    /// empty rankings are disallowed by configuration.
    #[error("{viewer:?} {viewer_id} has no visible candidates at stage {stage}")]
    EmptyCandidateSet {
        viewer: Side,
        viewer_id: u32,
        stage: Stage,
    },

    /// A final preference list fed to the matcher references an unknown
    /// participant or repeats an entry.
    #[error("invalid preference list for {viewer:?} {viewer_id}: {reason}")]
    InvalidPreferenceList {
        viewer: Side,
        viewer_id: u32,
        reason: String,
    },
}
