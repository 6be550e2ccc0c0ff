use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;
use tracing::{debug, info};

use crate::config::Settings;
use crate::core::error::SimulationError;
use crate::core::invitations::{select_invitations, InterviewLedger, InterviewLimits};
use crate::core::matching::run_match;
use crate::core::pairing::build_candidate_pairs;
use crate::core::ranking::rank_stage;
use crate::core::sampler::generate_population;
use crate::core::scoring::score_stage;
use crate::models::{
    ApplicantId, CandidatePair, PreferenceList, ProgramId, Side, SimulationReport, Stage,
};

// Salt mixed into the master seed for decline draws, so they never collide
// with a scoring sub-stream.
const DECLINE_STREAM_SALT: u64 = 0xDEC1_1E5;

/// Runs a complete simulation: sample, pair, score, rank, invite,
/// interview, re-score, re-rank, match.
///
/// One logical pass per run, deterministic for a fixed seed. The stage
/// order is fixed; interview statuses and the match outcome are the only
/// state mutated along the way.
#[derive(Debug, Clone)]
pub struct SimulationEngine {
    settings: Settings,
}

impl SimulationEngine {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn run(&self) -> Result<SimulationReport, SimulationError> {
        let seed = self.settings.run.seed;
        let started_at = chrono::Utc::now();
        let start = Instant::now();

        let decline_probability = self.settings.interview.decline_probability;
        if !(0.0..=1.0).contains(&decline_probability) {
            return Err(SimulationError::InvalidConfig(format!(
                "decline probability must be within [0, 1], got {}",
                decline_probability
            )));
        }

        let (applicants, programs) = generate_population(&self.settings.population, seed)?;
        let applicant_ids: Vec<ApplicantId> = applicants.iter().map(|a| a.id).collect();
        let program_ids: Vec<ProgramId> = programs.iter().map(|p| p.id).collect();
        let total_capacity: u64 = programs.iter().map(|p| p.capacity as u64).sum();
        info!(
            applicants = applicants.len(),
            programs = programs.len(),
            total_capacity,
            seed,
            "population sampled"
        );

        let pairs = build_candidate_pairs(&applicants, &programs);
        debug!(pairs = pairs.len(), "candidate universe built");

        let pre_views = score_stage(
            &pairs,
            &applicants,
            &programs,
            Stage::Pre,
            &self.settings.scoring,
            seed,
        )?;
        let pre_rankings = rank_stage(
            &pre_views,
            Stage::Pre,
            &applicant_ids,
            &program_ids,
            self.settings.ranking.allow_empty,
        )?;
        info!(views = pre_views.len(), "pre-interview scoring and ranking done");

        // Applicants apply to their top choices; programs only see those
        // applications when a limit is configured.
        let applied = self.collect_applications(&pre_rankings);
        let application_count = applied
            .as_ref()
            .map(|set| set.len())
            .unwrap_or(pairs.len());

        let mut ledger = InterviewLedger::new(&pairs);
        let program_pre_rankings: Vec<PreferenceList> = pre_rankings
            .iter()
            .filter(|list| list.viewer == Side::Program)
            .cloned()
            .collect();
        let limits = InterviewLimits::uniform(self.settings.interview.interview_limit);
        let invited = select_invitations(
            &program_pre_rankings,
            &limits,
            applied.as_ref(),
            &mut ledger,
        );
        info!(invitations = invited.len(), "interview invitations issued");

        let declines = self.apply_declines(&invited, &mut ledger, seed, decline_probability);
        let interviewed = ledger.interviewed_pairs();
        info!(
            declines,
            interviews = interviewed.len(),
            "interviews completed"
        );

        // Fresh noise draws for the post-interview perception of the same
        // pairs; pre-stage scores are replaced, not accumulated.
        let final_views = score_stage(
            &interviewed,
            &applicants,
            &programs,
            Stage::Final,
            &self.settings.scoring,
            seed,
        )?;
        let final_rankings = rank_stage(
            &final_views,
            Stage::Final,
            &applicant_ids,
            &program_ids,
            self.settings.ranking.allow_empty,
        )?;

        let (applicant_prefs, program_prefs): (Vec<_>, Vec<_>) = final_rankings
            .into_iter()
            .partition(|list| list.viewer == Side::Applicant);
        let capacities: BTreeMap<ProgramId, u32> =
            programs.iter().map(|p| (p.id, p.capacity)).collect();

        let outcome = run_match(&applicant_prefs, &program_prefs, &capacities)?;
        let matched = outcome.matched_count();
        let match_rate = if applicants.is_empty() {
            0.0
        } else {
            matched as f64 / applicants.len() as f64
        };
        info!(
            matched,
            unmatched = outcome.unmatched_applicants.len(),
            match_rate,
            "match complete"
        );

        Ok(SimulationReport {
            seed,
            started_at,
            elapsed_ms: start.elapsed().as_millis() as u64,
            applicant_count: applicants.len(),
            program_count: programs.len(),
            total_capacity,
            candidate_pairs: pairs.len(),
            applications: application_count,
            invitations: invited.len(),
            declines,
            interviews: interviewed.len(),
            matched,
            match_rate,
            outcome,
        })
    }

    /// Each applicant applies to the top `application_limit` programs of
    /// their pre-interview ranking. `None` when unbounded: every pair
    /// counts as applied.
    fn collect_applications(
        &self,
        pre_rankings: &[PreferenceList],
    ) -> Option<BTreeSet<(ApplicantId, ProgramId)>> {
        let limit = self.settings.interview.application_limit?;
        let mut applied = BTreeSet::new();
        for list in pre_rankings.iter().filter(|l| l.viewer == Side::Applicant) {
            for &program_id in list.ranked.iter().take(limit) {
                applied.insert((list.viewer_id, program_id));
            }
        }
        Some(applied)
    }

    /// Resolve each invitation: a sub-seeded Bernoulli draw per pair
    /// decides Declined, everything else becomes Interviewed.
    fn apply_declines(
        &self,
        invited: &[CandidatePair],
        ledger: &mut InterviewLedger,
        seed: u64,
        decline_probability: f64,
    ) -> usize {
        let mut declines = 0;
        for pair in invited {
            let declined = if decline_probability > 0.0 {
                let stream = (seed ^ DECLINE_STREAM_SALT)
                    .wrapping_add((pair.applicant_id as u64) << 32 | pair.program_id as u64);
                let mut rng = ChaCha8Rng::seed_from_u64(stream);
                rng.gen_bool(decline_probability)
            } else {
                false
            };
            if declined {
                ledger.decline(pair);
                declines += 1;
            } else {
                ledger.mark_interviewed(pair);
            }
        }
        declines
    }
}
