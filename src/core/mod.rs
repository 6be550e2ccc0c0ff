// Core algorithm exports
pub mod engine;
pub mod error;
pub mod invitations;
pub mod matching;
pub mod pairing;
pub mod ranking;
pub mod sampler;
pub mod scoring;

pub use engine::SimulationEngine;
pub use error::SimulationError;
pub use invitations::{select_invitations, select_invitees, InterviewLedger, InterviewLimits};
pub use matching::{find_blocking_pair, run_match};
pub use pairing::build_candidate_pairs;
pub use ranking::{rank, rank_stage};
pub use sampler::generate_population;
pub use scoring::{observed_score, pair_rng, score_stage};
