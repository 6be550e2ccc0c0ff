use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use std::collections::BTreeMap;

use crate::config::{AttributeSettings, GaussianParams, PopulationSettings};
use crate::core::error::SimulationError;
use crate::models::{Applicant, Program};

/// Draw fully populated applicant and program records from the configured
/// Gaussian distributions.
///
/// Sampling order is fixed (applicants ascending, then programs ascending;
/// per participant: base score, capacity for programs, then each attribute
/// in configured order), so a given seed and configuration reproduce the
/// population bit-for-bit.
pub fn generate_population(
    settings: &PopulationSettings,
    seed: u64,
) -> Result<(Vec<Applicant>, Vec<Program>), SimulationError> {
    validate(settings)?;

    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let applicant_score = normal(&settings.applicant_score)?;
    let program_score = normal(&settings.program_score)?;
    let program_capacity = normal(&settings.program_capacity)?;

    let mut applicants = Vec::with_capacity(settings.applicants);
    for i in 0..settings.applicants {
        let id = i as u32 + 1;
        let base_score = applicant_score.sample(&mut rng);
        let meta_scores = sample_attribute_scores(&settings.applicant_attributes, &mut rng)?;
        let meta_preferences = sample_attribute_weights(&settings.program_attributes, &mut rng)?;
        applicants.push(Applicant {
            id,
            name: format!("applicant-{}", id),
            base_score,
            meta_scores,
            meta_preferences,
        });
    }

    let mut programs = Vec::with_capacity(settings.programs);
    for i in 0..settings.programs {
        let id = i as u32 + 1;
        let base_score = program_score.sample(&mut rng);
        // Capacities are positive integers: round and clamp to at least one slot.
        let capacity = program_capacity.sample(&mut rng).round().max(1.0) as u32;
        let meta_scores = sample_attribute_scores(&settings.program_attributes, &mut rng)?;
        let meta_preferences = sample_attribute_weights(&settings.applicant_attributes, &mut rng)?;
        programs.push(Program {
            id,
            name: format!("program-{}", id),
            base_score,
            capacity,
            meta_scores,
            meta_preferences,
        });
    }

    Ok((applicants, programs))
}

fn sample_attribute_scores(
    attributes: &[AttributeSettings],
    rng: &mut ChaCha8Rng,
) -> Result<BTreeMap<String, f64>, SimulationError> {
    let mut out = BTreeMap::new();
    for attr in attributes {
        out.insert(attr.name.clone(), normal(&attr.score)?.sample(rng));
    }
    Ok(out)
}

fn sample_attribute_weights(
    attributes: &[AttributeSettings],
    rng: &mut ChaCha8Rng,
) -> Result<BTreeMap<String, f64>, SimulationError> {
    let mut out = BTreeMap::new();
    for attr in attributes {
        out.insert(attr.name.clone(), normal(&attr.weight)?.sample(rng));
    }
    Ok(out)
}

fn normal(params: &GaussianParams) -> Result<Normal<f64>, SimulationError> {
    Normal::new(params.mean, params.stddev).map_err(|e| {
        SimulationError::InvalidConfig(format!(
            "bad gaussian (mean {}, stddev {}): {}",
            params.mean, params.stddev, e
        ))
    })
}

fn validate(settings: &PopulationSettings) -> Result<(), SimulationError> {
    if settings.applicants == 0 {
        return Err(SimulationError::InvalidConfig(
            "applicant count must be positive".to_string(),
        ));
    }
    if settings.programs == 0 {
        return Err(SimulationError::InvalidConfig(
            "program count must be positive".to_string(),
        ));
    }

    let mut dims: Vec<(&str, &GaussianParams)> = vec![
        ("applicant_score", &settings.applicant_score),
        ("program_score", &settings.program_score),
        ("program_capacity", &settings.program_capacity),
    ];
    for attr in &settings.applicant_attributes {
        dims.push((attr.name.as_str(), &attr.score));
        dims.push((attr.name.as_str(), &attr.weight));
    }
    for attr in &settings.program_attributes {
        dims.push((attr.name.as_str(), &attr.score));
        dims.push((attr.name.as_str(), &attr.weight));
    }
    for (name, params) in dims {
        if !params.stddev.is_finite() || params.stddev < 0.0 {
            return Err(SimulationError::InvalidConfig(format!(
                "{}: standard deviation must be non-negative, got {}",
                name, params.stddev
            )));
        }
        if !params.mean.is_finite() {
            return Err(SimulationError::InvalidConfig(format!(
                "{}: mean must be finite, got {}",
                name, params.mean
            )));
        }
    }

    Ok(())
}
