// Integration tests for match-sim: full pipeline runs through the public API

use match_sim::config::{AttributeSettings, GaussianParams, PopulationSettings, Settings};
use match_sim::core::{
    build_candidate_pairs, find_blocking_pair, generate_population, rank_stage, score_stage,
    select_invitations, InterviewLedger, InterviewLimits, SimulationEngine,
};
use match_sim::models::{PreferenceList, Side, SimulationReport, Stage};
use std::collections::{BTreeMap, BTreeSet};

fn test_settings(seed: u64) -> Settings {
    let attribute = |name: &str, score_mean: f64, weight_mean: f64| AttributeSettings {
        name: name.to_string(),
        score: GaussianParams { mean: score_mean, stddev: 10.0 },
        weight: GaussianParams { mean: weight_mean, stddev: 0.2 },
    };

    let mut settings = Settings::default();
    settings.population = PopulationSettings {
        applicants: 40,
        programs: 8,
        program_capacity: GaussianParams { mean: 4.0, stddev: 2.0 },
        applicant_attributes: vec![
            attribute("board_scores", 230.0, 0.2),
            attribute("research", 3.0, 1.0),
        ],
        program_attributes: vec![attribute("prestige", 50.0, 0.5)],
        ..PopulationSettings::default()
    };
    settings.interview.application_limit = Some(5);
    settings.interview.interview_limit = 12;
    settings.run.seed = seed;
    settings
}

#[test]
fn test_full_run_is_reproducible() {
    let first = SimulationEngine::new(test_settings(101)).run().unwrap();
    let second = SimulationEngine::new(test_settings(101)).run().unwrap();

    assert_eq!(first.outcome.by_applicant, second.outcome.by_applicant);
    assert_eq!(first.outcome.by_program, second.outcome.by_program);
    assert_eq!(first.invitations, second.invitations);
}

#[test]
fn test_full_run_report_accounting() {
    let report = SimulationEngine::new(test_settings(7)).run().unwrap();

    assert_eq!(report.applicant_count, 40);
    assert_eq!(report.program_count, 8);
    assert_eq!(report.candidate_pairs, 320);
    // Applicants apply to at most 5 programs each.
    assert!(report.applications <= 40 * 5);
    assert!(report.invitations <= report.applications);
    assert_eq!(report.interviews + report.declines, report.invitations);
    assert_eq!(
        report.matched + report.outcome.unmatched_applicants.len(),
        report.applicant_count
    );
    assert!(report.match_rate >= 0.0 && report.match_rate <= 1.0);
    assert!(report.matched as u64 <= report.total_capacity);
}

#[test]
fn test_end_to_end_outcome_is_stable() {
    // Rebuild the final preference lists exactly as the engine does (no
    // declines configured) and verify the reported match has no blocking
    // pair among interviewed participants.
    let settings = test_settings(23);
    let seed = settings.run.seed;

    let (applicants, programs) = generate_population(&settings.population, seed).unwrap();
    let applicant_ids: Vec<u32> = applicants.iter().map(|a| a.id).collect();
    let program_ids: Vec<u32> = programs.iter().map(|p| p.id).collect();
    let pairs = build_candidate_pairs(&applicants, &programs);

    let pre_views =
        score_stage(&pairs, &applicants, &programs, Stage::Pre, &settings.scoring, seed).unwrap();
    let pre_rankings =
        rank_stage(&pre_views, Stage::Pre, &applicant_ids, &program_ids, true).unwrap();

    let mut applied: BTreeSet<(u32, u32)> = BTreeSet::new();
    let limit = settings.interview.application_limit.unwrap();
    for list in pre_rankings.iter().filter(|l| l.viewer == Side::Applicant) {
        for &program_id in list.ranked.iter().take(limit) {
            applied.insert((list.viewer_id, program_id));
        }
    }

    let program_pre: Vec<PreferenceList> = pre_rankings
        .iter()
        .filter(|l| l.viewer == Side::Program)
        .cloned()
        .collect();
    let mut ledger = InterviewLedger::new(&pairs);
    let invited = select_invitations(
        &program_pre,
        &InterviewLimits::uniform(settings.interview.interview_limit),
        Some(&applied),
        &mut ledger,
    );
    for pair in &invited {
        ledger.mark_interviewed(pair);
    }

    let interviewed = ledger.interviewed_pairs();
    let final_views = score_stage(
        &interviewed,
        &applicants,
        &programs,
        Stage::Final,
        &settings.scoring,
        seed,
    )
    .unwrap();
    let final_rankings =
        rank_stage(&final_views, Stage::Final, &applicant_ids, &program_ids, true).unwrap();
    let (applicant_prefs, program_prefs): (Vec<_>, Vec<_>) = final_rankings
        .into_iter()
        .partition(|l| l.viewer == Side::Applicant);
    let capacities: BTreeMap<u32, u32> = programs.iter().map(|p| (p.id, p.capacity)).collect();

    let report = SimulationEngine::new(settings).run().unwrap();

    assert!(find_blocking_pair(
        &report.outcome,
        &applicant_prefs,
        &program_prefs,
        &capacities
    )
    .is_none());

    for (program_id, assigned) in &report.outcome.by_program {
        assert!(assigned.len() <= capacities[program_id] as usize);
    }
}

#[test]
fn test_report_serializes_to_json() {
    let report = SimulationEngine::new(test_settings(55)).run().unwrap();

    let json = serde_json::to_string(&report).unwrap();
    let parsed: SimulationReport = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed.seed, report.seed);
    assert_eq!(parsed.outcome.by_applicant, report.outcome.by_applicant);
}

#[test]
fn test_settings_load_from_default_file() {
    let settings = Settings::load_from("config/default.toml").unwrap();

    assert_eq!(settings.population.applicants, 100);
    assert_eq!(settings.population.programs, 20);
    assert_eq!(settings.interview.application_limit, Some(5));
    assert_eq!(settings.scoring.applicant_pre_rating_error, 10.0);
    assert_eq!(settings.population.applicant_attributes.len(), 2);
}

#[test]
fn test_default_config_end_to_end() {
    let mut settings = Settings::load_from("config/default.toml").unwrap();
    // Keep the run small but structurally identical to the shipped config.
    settings.population.applicants = 25;
    settings.population.programs = 5;

    let report = SimulationEngine::new(settings).run().unwrap();

    assert!(report.matched > 0);
    assert_eq!(
        report.matched + report.outcome.unmatched_applicants.len(),
        25
    );
}
