use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use std::collections::BTreeMap;

use crate::config::ScoringSettings;
use crate::core::error::SimulationError;
use crate::models::{Applicant, CandidatePair, Program, ScoredView, Side, Stage};

fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Derive the noise generator for one (viewer, viewee, stage) triple.
///
/// Each triple gets its own sub-seeded generator off the master seed, so
/// scores are reproducible no matter which order pairs are visited in —
/// the property that keeps future parallel scoring deterministic.
pub fn pair_rng(
    master_seed: u64,
    viewer: Side,
    viewer_id: u32,
    viewee_id: u32,
    stage: Stage,
) -> ChaCha8Rng {
    let tag = ((viewer as u64) << 1) | stage as u64;
    let mut s = splitmix64(master_seed ^ tag);
    s = splitmix64(s ^ (((viewer_id as u64) << 32) | viewee_id as u64));
    ChaCha8Rng::seed_from_u64(s)
}

/// Compute one viewer's noisy perception of a viewee:
///
/// observed = viewee.base_score
///          + sum(viewer.meta_preferences[attr] * viewee.meta_scores[attr])
///          + Normal(0, sigma)
///
/// Attributes the viewer weighs but the viewee does not carry contribute
/// zero. Consumes exactly one draw from `rng`.
pub fn observed_score(
    viewer_preferences: &BTreeMap<String, f64>,
    viewee_base_score: f64,
    viewee_meta_scores: &BTreeMap<String, f64>,
    sigma: f64,
    rng: &mut impl Rng,
) -> Result<f64, SimulationError> {
    let noise_dist = Normal::new(0.0, sigma).map_err(|e| {
        SimulationError::InvalidConfig(format!("bad rating error sigma {}: {}", sigma, e))
    })?;

    let weighted: f64 = viewer_preferences
        .iter()
        .map(|(attr, weight)| weight * viewee_meta_scores.get(attr).copied().unwrap_or(0.0))
        .sum();

    Ok(viewee_base_score + weighted + noise_dist.sample(rng))
}

/// Score every pair in `pairs` at `stage`, in both directions.
///
/// Produces one ScoredView for the applicant-viewing-program direction and
/// one for the program-viewing-applicant direction per pair. Noise draws
/// are sub-seeded per pair, so the output does not depend on the order of
/// `pairs`.
pub fn score_stage(
    pairs: &[CandidatePair],
    applicants: &[Applicant],
    programs: &[Program],
    stage: Stage,
    noise: &ScoringSettings,
    seed: u64,
) -> Result<Vec<ScoredView>, SimulationError> {
    for side in [Side::Applicant, Side::Program] {
        let sigma = noise.sigma(side, stage);
        if !sigma.is_finite() || sigma < 0.0 {
            return Err(SimulationError::InvalidConfig(format!(
                "rating error for {:?} at stage {} must be non-negative, got {}",
                side, stage, sigma
            )));
        }
    }

    let applicant_by_id: BTreeMap<u32, &Applicant> = applicants.iter().map(|a| (a.id, a)).collect();
    let program_by_id: BTreeMap<u32, &Program> = programs.iter().map(|p| (p.id, p)).collect();

    let applicant_sigma = noise.sigma(Side::Applicant, stage);
    let program_sigma = noise.sigma(Side::Program, stage);

    let mut views = Vec::with_capacity(pairs.len() * 2);
    for pair in pairs {
        let applicant = applicant_by_id.get(&pair.applicant_id).ok_or_else(|| {
            SimulationError::InvalidConfig(format!(
                "pair references unknown applicant {}",
                pair.applicant_id
            ))
        })?;
        let program = program_by_id.get(&pair.program_id).ok_or_else(|| {
            SimulationError::InvalidConfig(format!(
                "pair references unknown program {}",
                pair.program_id
            ))
        })?;

        let mut rng = pair_rng(seed, Side::Applicant, applicant.id, program.id, stage);
        views.push(ScoredView {
            viewer: Side::Applicant,
            viewer_id: applicant.id,
            viewee_id: program.id,
            stage,
            observed_score: observed_score(
                &applicant.meta_preferences,
                program.base_score,
                &program.meta_scores,
                applicant_sigma,
                &mut rng,
            )?,
        });

        let mut rng = pair_rng(seed, Side::Program, program.id, applicant.id, stage);
        views.push(ScoredView {
            viewer: Side::Program,
            viewer_id: program.id,
            viewee_id: applicant.id,
            stage,
            observed_score: observed_score(
                &program.meta_preferences,
                applicant.base_score,
                &applicant.meta_scores,
                program_sigma,
                &mut rng,
            )?,
        });
    }

    Ok(views)
}
