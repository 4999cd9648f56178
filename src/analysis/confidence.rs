//! Confidence estimation for a produced recommendation, from four
//! independent evidence-quality signals.

use serde::Serialize;
use std::fmt;

const QUANTITY_WEIGHT: f64 = 0.35;
const QUALITY_WEIGHT: f64 = 0.25;
const CONSISTENCY_WEIGHT: f64 = 0.25;
const RECENCY_WEIGHT: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConfidenceCategory {
    High,
    Medium,
    Low,
}

impl fmt::Display for ConfidenceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfidenceCategory::High => write!(f, "High"),
            ConfidenceCategory::Medium => write!(f, "Medium"),
            ConfidenceCategory::Low => write!(f, "Low"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Confidence {
    /// Composite reliability score in [0, 100].
    pub score: f64,
    pub category: ConfidenceCategory,
}

/// Step function of how many similar fights back the recommendation.
fn data_quantity(similar_fights: usize) -> f64 {
    match similar_fights {
        n if n >= 20 => 1.0,
        n if n >= 10 => 0.8,
        n if n >= 5 => 0.6,
        n if n >= 2 => 0.35,
        _ => 0.1,
    }
}

/// Inverse of the win-rate variance across the recommended builds: evidence
/// that agrees with itself is worth more than scattered results.
fn data_quality(win_rates: &[f64]) -> f64 {
    if win_rates.len() < 2 {
        return 0.5;
    }
    let n = win_rates.len() as f64;
    let mean = win_rates.iter().sum::<f64>() / n;
    let variance = win_rates.iter().map(|w| (w - mean).powi(2)).sum::<f64>() / n;
    1.0 / (1.0 + variance / 250.0)
}

/// Step function of the thinnest sample among the recommended builds.
fn consistency(min_fights_played: usize) -> f64 {
    match min_fights_played {
        n if n >= 5 => 1.0,
        n if n >= 3 => 0.7,
        _ => 0.3,
    }
}

/// Combines the four normalized factors with fixed weights into a
/// percentage; ≥80 High, ≥60 Medium, else Low.
pub fn estimate(
    similar_fights: usize,
    top_win_rates: &[f64],
    min_fights_played: usize,
    recent_ratio: f64,
) -> Confidence {
    let overall = QUANTITY_WEIGHT * data_quantity(similar_fights)
        + QUALITY_WEIGHT * data_quality(top_win_rates)
        + CONSISTENCY_WEIGHT * consistency(min_fights_played)
        + RECENCY_WEIGHT * recent_ratio.clamp(0.0, 1.0);

    let score = (overall * 100.0).clamp(0.0, 100.0);
    let category = if score >= 80.0 {
        ConfidenceCategory::High
    } else if score >= 60.0 {
        ConfidenceCategory::Medium
    } else {
        ConfidenceCategory::Low
    };
    Confidence { score, category }
}
