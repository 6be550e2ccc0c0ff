// Unit tests for match-sim

use match_sim::config::{
    AttributeSettings, GaussianParams, PopulationSettings, ScoringSettings,
};
use match_sim::core::{
    build_candidate_pairs, generate_population, rank, rank_stage, run_match, score_stage,
    select_invitees, InterviewLedger, InterviewLimits, SimulationError,
};
use match_sim::models::{InterviewStatus, PreferenceList, Side, Stage};
use std::collections::{BTreeMap, BTreeSet};

fn attribute(name: &str, score_mean: f64, weight_mean: f64) -> AttributeSettings {
    AttributeSettings {
        name: name.to_string(),
        score: GaussianParams { mean: score_mean, stddev: 5.0 },
        weight: GaussianParams { mean: weight_mean, stddev: 0.1 },
    }
}

fn population() -> PopulationSettings {
    PopulationSettings {
        applicants: 10,
        programs: 4,
        program_capacity: GaussianParams { mean: 3.0, stddev: 1.0 },
        applicant_attributes: vec![attribute("board_scores", 230.0, 0.2)],
        program_attributes: vec![attribute("prestige", 50.0, 0.5)],
        ..PopulationSettings::default()
    }
}

#[test]
fn test_resampling_with_same_seed_is_identical() {
    let (a1, p1) = generate_population(&population(), 5).unwrap();
    let (a2, p2) = generate_population(&population(), 5).unwrap();

    let dump = |a: &match_sim::models::Applicant| (a.base_score, a.meta_scores.clone());
    assert_eq!(a1.iter().map(dump).collect::<Vec<_>>(), a2.iter().map(dump).collect::<Vec<_>>());
    assert_eq!(
        p1.iter().map(|p| p.capacity).collect::<Vec<_>>(),
        p2.iter().map(|p| p.capacity).collect::<Vec<_>>()
    );
}

#[test]
fn test_sampled_values_near_distribution_support() {
    // With stddev 5 around mean 230, all draws land within 6 sigma with
    // overwhelming probability.
    let (applicants, _) = generate_population(&population(), 11).unwrap();

    for applicant in &applicants {
        let board = applicant.meta_scores["board_scores"];
        assert!((board - 230.0).abs() < 30.0, "draw {} outside support", board);
    }
}

#[test]
fn test_cross_product_feeds_scoring() {
    let (applicants, programs) = generate_population(&population(), 3).unwrap();
    let pairs = build_candidate_pairs(&applicants, &programs);
    assert_eq!(pairs.len(), 40);

    let views = score_stage(
        &pairs,
        &applicants,
        &programs,
        Stage::Pre,
        &ScoringSettings::default(),
        3,
    )
    .unwrap();
    assert_eq!(views.len(), 80);
}

#[test]
fn test_score_then_rank_is_idempotent() {
    let (applicants, programs) = generate_population(&population(), 8).unwrap();
    let pairs = build_candidate_pairs(&applicants, &programs);
    let applicant_ids: Vec<u32> = applicants.iter().map(|a| a.id).collect();
    let program_ids: Vec<u32> = programs.iter().map(|p| p.id).collect();
    let noise = ScoringSettings::default();

    let run = || {
        let views = score_stage(&pairs, &applicants, &programs, Stage::Pre, &noise, 8).unwrap();
        rank_stage(&views, Stage::Pre, &applicant_ids, &program_ids, true).unwrap()
    };

    let first = run();
    let second = run();
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.viewer_id, b.viewer_id);
        assert_eq!(a.ranked, b.ranked);
    }
}

#[test]
fn test_rankings_are_permutations_of_visible_set() {
    let (applicants, programs) = generate_population(&population(), 4).unwrap();
    let pairs = build_candidate_pairs(&applicants, &programs);
    let applicant_ids: Vec<u32> = applicants.iter().map(|a| a.id).collect();
    let program_ids: Vec<u32> = programs.iter().map(|p| p.id).collect();

    let views = score_stage(
        &pairs,
        &applicants,
        &programs,
        Stage::Pre,
        &ScoringSettings::default(),
        4,
    )
    .unwrap();
    let rankings = rank_stage(&views, Stage::Pre, &applicant_ids, &program_ids, true).unwrap();

    for list in &rankings {
        let expected: BTreeSet<u32> = match list.viewer {
            Side::Applicant => program_ids.iter().copied().collect(),
            Side::Program => applicant_ids.iter().copied().collect(),
        };
        let actual: BTreeSet<u32> = list.ranked.iter().copied().collect();
        assert_eq!(actual, expected);
        assert_eq!(list.ranked.len(), expected.len());
    }
}

#[test]
fn test_tie_break_is_deterministic() {
    let scores = vec![(7, 1.0), (3, 1.0), (5, 1.0)];
    let list = rank(Side::Applicant, 1, Stage::Pre, &scores, false).unwrap();
    assert_eq!(list.ranked, vec![3, 5, 7]);
}

#[test]
fn test_zero_interview_limit_then_empty_final_ranking() {
    let pre_ranking = PreferenceList {
        viewer: Side::Program,
        viewer_id: 1,
        stage: Stage::Pre,
        ranked: vec![4, 2, 9],
    };

    let invited = select_invitees(1, &pre_ranking, 0, None);
    assert!(invited.is_empty());

    // Final-stage ranking over the empty candidate set is valid under the
    // configured policy, not an error.
    let final_list = rank(Side::Program, 1, Stage::Final, &[], true).unwrap();
    assert!(final_list.is_empty());
}

#[test]
fn test_ledger_round_trip() {
    let (applicants, programs) = generate_population(&population(), 2).unwrap();
    let pairs = build_candidate_pairs(&applicants, &programs);
    let mut ledger = InterviewLedger::new(&pairs);

    assert_eq!(ledger.count_with_status(InterviewStatus::Uninvited), pairs.len());
    assert!(ledger.invite(&pairs[0]));
    assert!(ledger.mark_interviewed(&pairs[0]));
    assert_eq!(ledger.interviewed_pairs(), vec![pairs[0]]);
}

#[test]
fn test_interview_limits_defaulting() {
    let limits = InterviewLimits::uniform(3).with_override(2, 0);
    assert_eq!(limits.limit_for(1), 3);
    assert_eq!(limits.limit_for(2), 0);
}

#[test]
fn test_match_rejects_malformed_lists() {
    let applicant = PreferenceList {
        viewer: Side::Applicant,
        viewer_id: 1,
        stage: Stage::Final,
        ranked: vec![1, 2, 1],
    };
    let program = PreferenceList {
        viewer: Side::Program,
        viewer_id: 1,
        stage: Stage::Final,
        ranked: vec![1],
    };
    let other_program = PreferenceList {
        viewer: Side::Program,
        viewer_id: 2,
        stage: Stage::Final,
        ranked: vec![1],
    };
    let capacities: BTreeMap<u32, u32> = [(1, 1), (2, 1)].into_iter().collect();

    let err = run_match(&[applicant], &[program, other_program], &capacities).unwrap_err();
    assert!(matches!(err, SimulationError::InvalidPreferenceList { .. }));
}

#[test]
fn test_empty_candidate_set_error_carries_context() {
    let err = rank(Side::Program, 9, Stage::Final, &[], false).unwrap_err();
    match err {
        SimulationError::EmptyCandidateSet { viewer, viewer_id, stage } => {
            assert_eq!(viewer, Side::Program);
            assert_eq!(viewer_id, 9);
            assert_eq!(stage, Stage::Final);
        }
        other => panic!("unexpected error: {}", other),
    }
}
