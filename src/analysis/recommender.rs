//! Recommendation orchestrator: needs analysis, retrieval, ranking, slot
//! allocation, confidence, and meta tags composed into one pure pipeline.

use crate::analysis::builder::{self, SlotAllocation};
use crate::analysis::confidence::{self, Confidence};
use crate::analysis::needs::{self, NeedsProfile};
use crate::analysis::ranker::{self, RankedBuild};
use crate::analysis::retrieval;
use crate::composition::Composition;
use crate::error::EngineError;
use crate::model::{FightContext, FightRecord};
use crate::roles;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    /// Ranked slot allocation for the counter squad.
    pub entries: Vec<SlotAllocation>,
    pub confidence: Confidence,
    /// Human-readable reads on the enemy composition.
    pub tags: Vec<String>,
    pub needs: NeedsProfile,
    /// How many historical fights backed this recommendation.
    pub similar_fights: usize,
    pub context: Option<FightContext>,
}

/// Builds a counter-recommendation for the observed enemy composition.
///
/// Every stage is pure given its inputs: calling this twice against the same
/// store snapshot yields an identical recommendation. Zero retrieved fights
/// is not an error; the pipeline completes on needs coverage alone with an
/// honestly low confidence score.
pub fn recommend(
    fights: &[FightRecord],
    enemy: &Composition,
    context: Option<FightContext>,
    feedback_rate: Option<f64>,
    feedback_weight: f64,
    squad_size: usize,
    now: DateTime<Utc>,
) -> Result<Recommendation, EngineError> {
    let enemy = enemy.clone().validated()?;

    let needs = needs::analyze(&enemy);
    let similar = retrieval::find_similar(fights, &enemy, context, now);
    let mut ranked = ranker::rank(&similar, feedback_rate, feedback_weight);
    if ranked.is_empty() {
        ranked = fallback_candidates();
    }
    let entries = builder::build(&ranked, &needs, squad_size);

    let win_rates: Vec<f64> = entries.iter().map(|e| e.win_rate).collect();
    let min_fights_played = entries
        .iter()
        .filter_map(|e| {
            ranked
                .iter()
                .find(|b| b.spec == e.spec && b.role == e.role)
                .map(|b| b.fights_played)
        })
        .min()
        .unwrap_or(0);
    let confidence = confidence::estimate(
        similar.len(),
        &win_rates,
        min_fights_played,
        retrieval::recent_ratio(&similar, now),
    );

    Ok(Recommendation {
        entries,
        confidence,
        tags: meta_tags(&enemy, &needs),
        needs,
        similar_fights: similar.len(),
        context,
    })
}

/// With no historical evidence the builder still needs candidates: the known
/// meta roster in its default roles, scored purely on needs coverage.
fn fallback_candidates() -> Vec<RankedBuild> {
    roles::KNOWN_SPECS
        .iter()
        .map(|spec| RankedBuild {
            spec: spec.to_string(),
            role: roles::default_role(spec),
            win_rate: 0.0,
            avg_score: 0.0,
            avg_dps: 0.0,
            avg_healing: 0.0,
            avg_strips: 0.0,
            avg_cleanses: 0.0,
            fights_played: 0,
            recommended_count: 1,
        })
        .collect()
}

/// Threshold reads on the needs profile plus squad-scale tags.
fn meta_tags(enemy: &Composition, needs: &NeedsProfile) -> Vec<String> {
    let mut tags = Vec::new();
    if needs.strip > 0.7 {
        tags.push("heavy boon pressure".to_string());
    }
    if needs.heal > 0.7 {
        tags.push("heavy condition pressure".to_string());
    }
    if needs.burst > 0.7 {
        tags.push("support-heavy".to_string());
    }
    let total = enemy.total();
    if total <= 10 {
        tags.push("small group".to_string());
    } else if total >= 30 {
        tags.push("large blob".to_string());
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::confidence::ConfidenceCategory;
    use crate::composition::tally;
    use crate::model::{BuildPerformanceEntry, Outcome};
    use crate::roles::Role;
    use chrono::Duration;

    fn comp(pairs: &[(&str, u32)]) -> Composition {
        pairs.iter().map(|(s, c)| (s.to_string(), *c)).collect()
    }

    fn entry(fight_id: &str, spec: &str, role: Role) -> BuildPerformanceEntry {
        BuildPerformanceEntry {
            fight_id: fight_id.to_string(),
            spec: spec.to_string(),
            role,
            score: 5_000.0,
            dps: 2_000.0,
            healing: 0.0,
            cleanses: 0.0,
            boon_strips: 5.0,
            deaths: 0,
            won: true,
        }
    }

    fn record(id: &str, enemy: Composition, age_days: i64) -> FightRecord {
        FightRecord {
            fight_id: id.to_string(),
            timestamp: Utc::now() - Duration::days(age_days),
            source_name: String::new(),
            enemy_composition: enemy,
            ally_composition: tally(["Spellbreaker", "Scourge", "Firebrand"]),
            ally_accounts: vec![],
            builds: vec![
                entry(id, "Spellbreaker", Role::DpsStrip),
                entry(id, "Scourge", Role::DpsStrip),
                entry(id, "Firebrand", Role::Stab),
            ],
            outcome: Outcome::Victory,
            duration_sec: 150.0,
            ally_kills: 6,
            ally_deaths: 1,
            total_ally_damage: 900_000,
            context_detected: FightContext::Zerg,
            context_confirmed: None,
            fingerprint: id.to_string(),
        }
    }

    #[test]
    fn empty_enemy_composition_is_rejected() {
        let err = recommend(
            &[],
            &Composition::default(),
            None,
            None,
            0.35,
            10,
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidComposition(_)));
    }

    #[test]
    fn zero_evidence_degrades_to_low_confidence_coverage() {
        let enemy = comp(&[("Firebrand", 3), ("Scourge", 4)]);
        let rec = recommend(&[], &enemy, None, None, 0.35, 10, Utc::now()).unwrap();
        assert_eq!(rec.similar_fights, 0);
        assert_eq!(rec.confidence.category, ConfidenceCategory::Low);
        assert!(!rec.entries.is_empty());
        assert!(rec.entries.iter().all(|e| e.win_rate == 0.0));
    }

    #[test]
    fn evidence_backed_recommendation_carries_win_rates() {
        let enemy = comp(&[("Firebrand", 3), ("Scourge", 4)]);
        let fights = vec![
            record("f1", enemy.clone(), 1),
            record("f2", comp(&[("Firebrand", 2), ("Scourge", 5)]), 3),
        ];
        let rec = recommend(&fights, &enemy, None, None, 0.35, 10, Utc::now()).unwrap();
        assert_eq!(rec.similar_fights, 2);
        assert!(rec.entries.iter().any(|e| e.win_rate > 0.0));
        let total: u32 = rec.entries.iter().map(|e| e.count).sum();
        assert!(total <= 10);
    }

    #[test]
    fn identical_inputs_yield_identical_recommendations() {
        let enemy = comp(&[("Firebrand", 3), ("Scourge", 4)]);
        let fights = vec![record("f1", enemy.clone(), 1)];
        let now = Utc::now();
        let a = recommend(&fights, &enemy, None, None, 0.35, 10, now).unwrap();
        let b = recommend(&fights, &enemy, None, None, 0.35, 10, now).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn meta_tags_follow_needs_thresholds() {
        // 5 FB + 5 Scrapper in 10: support-heavy, small group, boon pressure.
        let enemy = comp(&[("Firebrand", 5), ("Scrapper", 5)]);
        let rec = recommend(&[], &enemy, None, None, 0.35, 10, Utc::now()).unwrap();
        assert!(rec.tags.contains(&"heavy boon pressure".to_string()));
        assert!(rec.tags.contains(&"support-heavy".to_string()));
        assert!(rec.tags.contains(&"small group".to_string()));

        let blob = comp(&[("Scourge", 20), ("Berserker", 15)]);
        let rec = recommend(&[], &blob, None, None, 0.35, 10, Utc::now()).unwrap();
        assert!(rec.tags.contains(&"large blob".to_string()));
        assert!(rec.tags.contains(&"heavy condition pressure".to_string()));
    }
}
