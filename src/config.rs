use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::models::{Side, Stage};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub population: PopulationSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub interview: InterviewSettings,
    #[serde(default)]
    pub ranking: RankingSettings,
    #[serde(default)]
    pub run: RunSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Mean/standard-deviation pair for one Gaussian dimension.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GaussianParams {
    pub mean: f64,
    pub stddev: f64,
}

/// One named attribute dimension of a population.
///
/// `score` parameterizes the attribute value sampled onto each member of
/// the owning population; `weight` parameterizes how much each member of
/// the opposite population cares about it.
#[derive(Debug, Clone, Deserialize)]
pub struct AttributeSettings {
    pub name: String,
    pub score: GaussianParams,
    pub weight: GaussianParams,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PopulationSettings {
    #[serde(default = "default_applicant_count")]
    pub applicants: usize,
    #[serde(default = "default_program_count")]
    pub programs: usize,
    #[serde(default = "default_score_params")]
    pub applicant_score: GaussianParams,
    #[serde(default = "default_score_params")]
    pub program_score: GaussianParams,
    #[serde(default = "default_capacity_params")]
    pub program_capacity: GaussianParams,
    /// Attributes carried by applicants and weighed by programs.
    #[serde(default)]
    pub applicant_attributes: Vec<AttributeSettings>,
    /// Attributes carried by programs and weighed by applicants.
    #[serde(default)]
    pub program_attributes: Vec<AttributeSettings>,
}

impl Default for PopulationSettings {
    fn default() -> Self {
        Self {
            applicants: default_applicant_count(),
            programs: default_program_count(),
            applicant_score: default_score_params(),
            program_score: default_score_params(),
            program_capacity: default_capacity_params(),
            applicant_attributes: Vec::new(),
            program_attributes: Vec::new(),
        }
    }
}

fn default_applicant_count() -> usize { 100 }
fn default_program_count() -> usize { 20 }
fn default_score_params() -> GaussianParams {
    GaussianParams { mean: 0.0, stddev: 25.0 }
}
fn default_capacity_params() -> GaussianParams {
    GaussianParams { mean: 20.0, stddev: 10.0 }
}

/// Per-stage, per-side magnitude of the Gaussian rating error added to
/// every observed score.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ScoringSettings {
    #[serde(default = "default_pre_error")]
    pub applicant_pre_rating_error: f64,
    #[serde(default = "default_pre_error")]
    pub program_pre_rating_error: f64,
    #[serde(default = "default_final_error")]
    pub applicant_final_rating_error: f64,
    #[serde(default = "default_final_error")]
    pub program_final_rating_error: f64,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            applicant_pre_rating_error: default_pre_error(),
            program_pre_rating_error: default_pre_error(),
            applicant_final_rating_error: default_final_error(),
            program_final_rating_error: default_final_error(),
        }
    }
}

impl ScoringSettings {
    /// Noise sigma applied when `viewer` rates the other side at `stage`.
    pub fn sigma(&self, viewer: Side, stage: Stage) -> f64 {
        match (viewer, stage) {
            (Side::Applicant, Stage::Pre) => self.applicant_pre_rating_error,
            (Side::Program, Stage::Pre) => self.program_pre_rating_error,
            (Side::Applicant, Stage::Final) => self.applicant_final_rating_error,
            (Side::Program, Stage::Final) => self.program_final_rating_error,
        }
    }
}

fn default_pre_error() -> f64 { 10.0 }
fn default_final_error() -> f64 { 5.0 }

#[derive(Debug, Clone, Deserialize)]
pub struct InterviewSettings {
    /// How many programs each applicant applies to from their pre-interview
    /// ranking. `None` means applicants apply everywhere.
    #[serde(default = "default_application_limit")]
    pub application_limit: Option<usize>,
    /// How many applicants each program invites to interview.
    #[serde(default = "default_interview_limit")]
    pub interview_limit: usize,
    /// Probability that an invited applicant declines the interview.
    #[serde(default)]
    pub decline_probability: f64,
}

impl Default for InterviewSettings {
    fn default() -> Self {
        Self {
            application_limit: default_application_limit(),
            interview_limit: default_interview_limit(),
            decline_probability: 0.0,
        }
    }
}

fn default_application_limit() -> Option<usize> { Some(5) }
fn default_interview_limit() -> usize { 10 }

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RankingSettings {
    /// Whether a viewer with zero visible candidates gets an empty
    /// preference list instead of an EmptyCandidateSet error.
    #[serde(default = "default_true")]
    pub allow_empty: bool,
}

impl Default for RankingSettings {
    fn default() -> Self {
        Self { allow_empty: default_true() }
    }
}

fn default_true() -> bool { true }

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RunSettings {
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self { seed: default_seed() }
    }
}

fn default_seed() -> u64 { 42 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with MATCHSIM_)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            // Add default config file
            .add_source(File::with_name("config/default").required(false))
            // Add local config file (for development overrides)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables (prefixed with MATCHSIM_)
            // e.g., MATCHSIM_RUN__SEED -> run.seed
            .add_source(
                Environment::with_prefix("MATCHSIM")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("MATCHSIM")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            population: PopulationSettings::default(),
            scoring: ScoringSettings::default(),
            interview: InterviewSettings::default(),
            ranking: RankingSettings::default(),
            run: RunSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_population() {
        let pop = PopulationSettings::default();
        assert_eq!(pop.applicants, 100);
        assert_eq!(pop.programs, 20);
        assert_eq!(pop.applicant_score.stddev, 25.0);
        assert_eq!(pop.program_capacity.mean, 20.0);
    }

    #[test]
    fn test_sigma_selection() {
        let scoring = ScoringSettings::default();
        assert_eq!(scoring.sigma(Side::Applicant, Stage::Pre), 10.0);
        assert_eq!(scoring.sigma(Side::Program, Stage::Final), 5.0);
        assert!(
            scoring.sigma(Side::Applicant, Stage::Final)
                < scoring.sigma(Side::Applicant, Stage::Pre)
        );
    }

    #[test]
    fn test_default_interview_policy() {
        let interview = InterviewSettings::default();
        assert_eq!(interview.application_limit, Some(5));
        assert_eq!(interview.interview_limit, 10);
        assert_eq!(interview.decline_probability, 0.0);
    }

    #[test]
    fn test_default_logging() {
        let level = default_log_level();
        let format = default_log_format();
        assert_eq!(level, "info");
        assert_eq!(format, "json");
    }
}
