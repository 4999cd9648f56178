//! Build ranking: aggregates per-(spec, role) performance over retrieved
//! similar fights into win rates, adjusted by user feedback.

use crate::analysis::retrieval::SimilarFight;
use crate::model::Outcome;
use crate::roles::Role;
use std::collections::HashMap;

/// Builds seen fewer times than this across the similar-fight set carry too
/// little signal to rank.
const MIN_SAMPLES: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct RankedBuild {
    pub spec: String,
    pub role: Role,
    /// Win percentage in [0, 100] after feedback adjustment.
    pub win_rate: f64,
    pub avg_score: f64,
    pub avg_dps: f64,
    pub avg_healing: f64,
    pub avg_strips: f64,
    pub avg_cleanses: f64,
    pub fights_played: usize,
    /// How many slots of this build winning squads typically fielded.
    pub recommended_count: u32,
}

#[derive(Default)]
struct Accumulator {
    wins: usize,
    total: usize,
    score_sum: f64,
    dps_sum: f64,
    healing_sum: f64,
    strips_sum: f64,
    cleanses_sum: f64,
    counts_in_wins: Vec<u32>,
}

/// Feedback bends the empirical win rate toward the community's experience:
/// a 50% success rate is neutral, better pulls up, worse pulls down. The
/// result is clamped to [0, 100] regardless of feedback magnitude.
pub fn adjusted_win_rate(win_rate: f64, feedback_rate: Option<f64>, feedback_weight: f64) -> f64 {
    match feedback_rate {
        Some(rate) if feedback_weight > 0.0 => {
            let factor = 1.0 + feedback_weight * (rate - 0.5);
            (win_rate * factor).clamp(0.0, 100.0)
        }
        _ => win_rate.clamp(0.0, 100.0),
    }
}

/// Aggregates every build-performance entry within every retrieved fight.
pub fn rank(
    similar: &[SimilarFight],
    feedback_rate: Option<f64>,
    feedback_weight: f64,
) -> Vec<RankedBuild> {
    let mut stats: HashMap<(String, Role), Accumulator> = HashMap::new();

    for sf in similar {
        let won = sf.fight.outcome == Outcome::Victory;
        let mut per_fight: HashMap<(String, Role), u32> = HashMap::new();
        for entry in &sf.fight.builds {
            let key = (entry.spec.clone(), entry.role);
            let acc = stats.entry(key.clone()).or_default();
            acc.total += 1;
            acc.score_sum += entry.score;
            acc.dps_sum += entry.dps;
            acc.healing_sum += entry.healing;
            acc.strips_sum += entry.boon_strips;
            acc.cleanses_sum += entry.cleanses;
            if won {
                acc.wins += 1;
                *per_fight.entry(key).or_insert(0) += 1;
            }
        }
        for (key, count) in per_fight {
            if let Some(acc) = stats.get_mut(&key) {
                acc.counts_in_wins.push(count);
            }
        }
    }

    let mut ranked: Vec<RankedBuild> = stats
        .into_iter()
        .filter(|(_, acc)| acc.total >= MIN_SAMPLES)
        .map(|((spec, role), acc)| {
            let n = acc.total as f64;
            let win_rate = acc.wins as f64 / n * 100.0;
            let recommended_count = if acc.counts_in_wins.is_empty() {
                1
            } else {
                let mean = acc.counts_in_wins.iter().sum::<u32>() as f64
                    / acc.counts_in_wins.len() as f64;
                (mean.round() as u32).max(1)
            };
            RankedBuild {
                spec,
                role,
                win_rate: adjusted_win_rate(win_rate, feedback_rate, feedback_weight),
                avg_score: acc.score_sum / n,
                avg_dps: acc.dps_sum / n,
                avg_healing: acc.healing_sum / n,
                avg_strips: acc.strips_sum / n,
                avg_cleanses: acc.cleanses_sum / n,
                fights_played: acc.total,
                recommended_count,
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.win_rate
            .partial_cmp(&a.win_rate)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                b.avg_score
                    .partial_cmp(&a.avg_score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| a.spec.cmp(&b.spec))
    });
    ranked
}
