//! Similar-fight retrieval: similarity filtering plus recency decay over the
//! historical store.

use crate::composition::Composition;
use crate::model::{FightContext, FightRecord};
use chrono::{DateTime, Utc};

/// Both filters use the same floor: fights below it carry no usable signal.
pub const SIMILARITY_FLOOR: f64 = 0.3;

/// Retrieval is capped so ranking stays bounded as the store grows.
pub const MAX_SIMILAR_FIGHTS: usize = 30;

#[derive(Debug, Clone)]
pub struct SimilarFight {
    pub fight: FightRecord,
    pub similarity: f64,
    pub recency_weight: f64,
    pub final_score: f64,
}

/// Discount applied to older evidence.
pub fn recency_weight(elapsed_days: i64) -> f64 {
    match elapsed_days {
        d if d <= 7 => 1.0,
        d if d <= 30 => 0.9,
        d if d <= 60 => 0.7,
        d if d <= 90 => 0.5,
        _ => 0.3,
    }
}

/// Finds past fights resembling the target enemy composition.
///
/// Order of gates: optional context filter, cheap Jaccard pre-filter on the
/// spec sets, weighted similarity, then recency decay. Returns descending by
/// `similarity * recency_weight`; an empty result is a valid zero-evidence
/// answer, not an error.
pub fn find_similar(
    fights: &[FightRecord],
    enemy: &Composition,
    context: Option<FightContext>,
    now: DateTime<Utc>,
) -> Vec<SimilarFight> {
    let mut scored: Vec<SimilarFight> = fights
        .iter()
        .filter(|fight| context.map_or(true, |c| fight.context() == c))
        .filter_map(|fight| {
            if enemy.jaccard(&fight.enemy_composition) < SIMILARITY_FLOOR {
                return None;
            }
            let similarity = enemy.similarity(&fight.enemy_composition);
            if similarity < SIMILARITY_FLOOR {
                return None;
            }
            let elapsed_days = now.signed_duration_since(fight.timestamp).num_days();
            let recency = recency_weight(elapsed_days);
            Some(SimilarFight {
                fight: fight.clone(),
                similarity,
                recency_weight: recency,
                final_score: similarity * recency,
            })
        })
        .collect();

    scored.sort_by(|a, b| {
        b.final_score
            .partial_cmp(&a.final_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored.truncate(MAX_SIMILAR_FIGHTS);
    scored
}

/// Fraction of the retrieved fights recorded within the last 30 days; feeds
/// the recency factor of the confidence estimate.
pub fn recent_ratio(similar: &[SimilarFight], now: DateTime<Utc>) -> f64 {
    if similar.is_empty() {
        return 0.0;
    }
    let recent = similar
        .iter()
        .filter(|sf| now.signed_duration_since(sf.fight.timestamp).num_days() <= 30)
        .count();
    recent as f64 / similar.len() as f64
}
