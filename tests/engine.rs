use std::collections::BTreeMap;
use tempfile::TempDir;

use wvw_counterpick::analysis::confidence::ConfidenceCategory;
use wvw_counterpick::roles::Role;
use wvw_counterpick::{
    Composition, Config, CounterEngine, EngineError, FightContext, FightData, Outcome,
    PlayerRecord,
};

fn test_engine(dir: &TempDir) -> CounterEngine {
    let config = Config {
        data_dir: dir.path().to_path_buf(),
        feedback_weight: 0.35,
        fingerprint_retention_days: 7,
        squad_size: 10,
    };
    CounterEngine::new(config).unwrap()
}

fn player(account: &str, spec: &str, role: Role) -> PlayerRecord {
    PlayerRecord {
        name: account.split('.').next().unwrap().to_string(),
        account: account.to_string(),
        spec: spec.to_string(),
        role,
        group: 1,
        dps: 2_500.0,
        healing: if role == Role::Healer { 150_000.0 } else { 0.0 },
        cleanses: if role == Role::Healer { 40.0 } else { 2.0 },
        boon_strips: if role == Role::DpsStrip { 15.0 } else { 0.0 },
        down_contrib: 30_000.0,
        deaths: 0,
        boon_gen: BTreeMap::new(),
    }
}

fn comp(pairs: &[(&str, u32)]) -> Composition {
    pairs.iter().map(|(s, c)| (s.to_string(), *c)).collect()
}

fn fight(damage: u64, outcome: Outcome, enemy: &[(&str, u32)]) -> FightData {
    FightData {
        source_name: "20260823-evening.zevtc".to_string(),
        duration_sec: 145.0,
        allies: vec![
            player("Ryn.1234", "Firebrand", Role::Stab),
            player("Kaela.5678", "Scrapper", Role::Healer),
            player("Vex.9012", "Scourge", Role::DpsStrip),
            player("Moro.3456", "Scourge", Role::DpsStrip),
            player("Tann.7890", "Spellbreaker", Role::DpsStrip),
            player("Isla.2345", "Herald", Role::Boon),
        ],
        enemy_composition: comp(enemy),
        outcome: Some(outcome),
        ally_kills: 7,
        ally_deaths: 2,
        total_ally_damage: damage,
    }
}

#[test]
fn recording_the_same_fight_twice_yields_one_record_and_one_error() {
    let dir = TempDir::new().unwrap();
    let engine = test_engine(&dir);
    let data = fight(800_000, Outcome::Victory, &[("Firebrand", 3), ("Scourge", 4)]);

    engine.record_fight(&data, None).unwrap();
    let err = engine.record_fight(&data, None).unwrap_err();
    assert!(matches!(err, EngineError::DuplicateFight(_)));
    assert_eq!(engine.status().total_fights, 1);
}

#[test]
fn short_and_invalid_fights_are_rejected_before_analysis() {
    let dir = TempDir::new().unwrap();
    let engine = test_engine(&dir);

    let mut short = fight(500_000, Outcome::Victory, &[("Firebrand", 3)]);
    short.duration_sec = 45.0;
    assert!(matches!(
        engine.record_fight(&short, None),
        Err(EngineError::ShortFight(_))
    ));

    let mut no_enemy = fight(500_000, Outcome::Victory, &[]);
    no_enemy.enemy_composition = Composition::default();
    assert!(matches!(
        engine.record_fight(&no_enemy, None),
        Err(EngineError::InvalidComposition(_))
    ));

    assert_eq!(engine.status().total_fights, 0);
}

#[test]
fn counter_pipeline_end_to_end() {
    let dir = TempDir::new().unwrap();
    let engine = test_engine(&dir);

    let enemy = &[("Firebrand", 3), ("Scourge", 4), ("Spellbreaker", 2)];
    // Distinct damage totals keep the fingerprints apart.
    let mut ids = Vec::new();
    for (i, outcome) in [Outcome::Victory, Outcome::Victory, Outcome::Defeat]
        .into_iter()
        .enumerate()
    {
        let data = fight(700_000 + i as u64 * 120_000, outcome, enemy);
        ids.push(engine.record_fight(&data, Some(FightContext::Zerg)).unwrap());
    }
    // All three land within the same second yet mint distinct ids.
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 3);

    let recommendation = engine
        .generate_counter(&comp(enemy), Some(FightContext::Zerg))
        .unwrap();

    assert_eq!(recommendation.similar_fights, 3);
    assert!(!recommendation.entries.is_empty());
    let total_slots: u32 = recommendation.entries.iter().map(|e| e.count).sum();
    assert!(total_slots <= 10);
    assert!((0.0..=100.0).contains(&recommendation.confidence.score));
    // Evidence-backed: allied builds from the wins surface with win rates.
    assert!(recommendation.entries.iter().any(|e| e.win_rate > 0.0));
}

#[test]
fn generate_counter_is_idempotent_without_intervening_writes() {
    let dir = TempDir::new().unwrap();
    let engine = test_engine(&dir);
    let enemy = &[("Firebrand", 3), ("Scourge", 4)];
    engine
        .record_fight(&fight(800_000, Outcome::Victory, enemy), None)
        .unwrap();

    let first = engine.generate_counter(&comp(enemy), None).unwrap();
    let second = engine.generate_counter(&comp(enemy), None).unwrap();
    assert_eq!(first, second);
}

#[test]
fn zero_evidence_still_produces_a_low_confidence_recommendation() {
    let dir = TempDir::new().unwrap();
    let engine = test_engine(&dir);

    let recommendation = engine
        .generate_counter(&comp(&[("Reaper", 8), ("Catalyst", 4)]), None)
        .unwrap();

    assert_eq!(recommendation.similar_fights, 0);
    assert_eq!(recommendation.confidence.category, ConfidenceCategory::Low);
    assert!(!recommendation.entries.is_empty());
    assert!(recommendation.entries.iter().all(|e| e.win_rate == 0.0));
}

#[test]
fn feedback_bends_win_rates_for_the_same_composition() {
    let dir = TempDir::new().unwrap();
    let engine = test_engine(&dir);
    let enemy = &[("Firebrand", 3), ("Scourge", 4)];

    engine
        .record_fight(&fight(800_000, Outcome::Victory, enemy), None)
        .unwrap();
    engine
        .record_fight(&fight(950_000, Outcome::Defeat, enemy), None)
        .unwrap();

    let before = engine.generate_counter(&comp(enemy), None).unwrap();

    for _ in 0..3 {
        engine
            .submit_feedback(&comp(enemy), true, FightContext::Zerg)
            .unwrap();
    }
    let after = engine.generate_counter(&comp(enemy), None).unwrap();

    let rate_of = |rec: &wvw_counterpick::Recommendation| {
        rec.entries
            .iter()
            .map(|e| e.win_rate)
            .fold(0.0f64, f64::max)
    };
    // Unanimous positive feedback (rate 1.0) scales win rates up by 17.5%.
    assert!(rate_of(&after) > rate_of(&before));

    let summary = engine.feedback_summary();
    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0].total, 3);
}

#[test]
fn status_reflects_recorded_history() {
    let dir = TempDir::new().unwrap();
    let engine = test_engine(&dir);
    let enemy = &[("Firebrand", 2), ("Reaper", 5)];

    engine
        .record_fight(&fight(600_000, Outcome::Victory, enemy), None)
        .unwrap();
    engine
        .record_fight(&fight(760_000, Outcome::Defeat, enemy), None)
        .unwrap();

    let status = engine.status();
    assert_eq!(status.total_fights, 2);
    assert_eq!(status.global_win_rate, 50.0);
    assert_eq!(status.unique_players, 6);
    assert_eq!(status.engine, "stats_engine");
}
