//! Composition value type: a multiset of specializations fielded by one side.
//!
//! Construct-once value object; both similarity metrics are pure so every
//! pipeline stage downstream stays independently testable.

use crate::error::EngineError;
use crate::roles;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Composition {
    counts: BTreeMap<String, u32>,
}

impl Composition {
    pub fn new(counts: BTreeMap<String, u32>) -> Self {
        Composition { counts }
    }

    /// Validates the shape expected at the engine boundary: at least one
    /// specialization, no blank names, no zero counts.
    pub fn validated(self) -> Result<Self, EngineError> {
        if self.counts.is_empty() {
            return Err(EngineError::InvalidComposition(
                "composition is empty".to_string(),
            ));
        }
        for (spec, count) in &self.counts {
            if spec.trim().is_empty() {
                return Err(EngineError::InvalidComposition(
                    "blank specialization name".to_string(),
                ));
            }
            if *count == 0 {
                return Err(EngineError::InvalidComposition(format!(
                    "zero count for {}",
                    spec
                )));
            }
        }
        Ok(self)
    }

    pub fn count(&self, spec: &str) -> u32 {
        self.counts.get(spec).copied().unwrap_or(0)
    }

    pub fn counts(&self) -> &BTreeMap<String, u32> {
        &self.counts
    }

    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn specs(&self) -> BTreeSet<&str> {
        self.counts.keys().map(String::as_str).collect()
    }

    /// Deterministic signature used as the feedback lookup key, e.g.
    /// `Firebrand:3-Scourge:4`.
    pub fn signature(&self) -> String {
        self.counts
            .iter()
            .map(|(spec, count)| format!("{}:{}", spec, count))
            .collect::<Vec<_>>()
            .join("-")
    }

    /// Weighted Manhattan similarity in [0, 1].
    ///
    /// `D = Σ |a - b| * w(spec)`, `W = Σ max(a, b) * w(spec)`,
    /// `similarity = 1 - D / (2W)`. Two empty compositions have no
    /// information to compare and score 0.
    pub fn similarity(&self, other: &Composition) -> f64 {
        let specs: BTreeSet<&str> = self.specs().union(&other.specs()).copied().collect();

        let mut distance = 0.0;
        let mut normalizer = 0.0;
        for spec in specs {
            let a = self.count(spec) as f64;
            let b = other.count(spec) as f64;
            let w = roles::weight(spec);
            distance += (a - b).abs() * w;
            normalizer += a.max(b) * w;
        }

        if normalizer == 0.0 {
            return 0.0;
        }
        (1.0 - distance / (2.0 * normalizer)).clamp(0.0, 1.0)
    }

    /// Jaccard similarity over the *set* of specializations present,
    /// ignoring counts. Cheap pre-filter before the weighted metric.
    pub fn jaccard(&self, other: &Composition) -> f64 {
        let a = self.specs();
        let b = other.specs();
        let union = a.union(&b).count();
        if union == 0 {
            return 0.0;
        }
        let intersection = a.intersection(&b).count();
        intersection as f64 / union as f64
    }
}

impl fmt::Display for Composition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sorted: Vec<_> = self.counts.iter().collect();
        sorted.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        let parts: Vec<String> = sorted
            .iter()
            .map(|(spec, count)| format!("{} {}", count, spec))
            .collect();
        write!(f, "{}", parts.join(" + "))
    }
}

impl FromStr for Composition {
    type Err = EngineError;

    /// Parses `Firebrand:3,Scourge:4` style composition strings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut counts = BTreeMap::new();
        for part in s.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let (spec, count) = part.split_once(':').ok_or_else(|| {
                EngineError::InvalidComposition(format!("expected Spec:count, got {}", part))
            })?;
            let count: u32 = count.trim().parse().map_err(|_| {
                EngineError::InvalidComposition(format!("invalid count in {}", part))
            })?;
            *counts.entry(spec.trim().to_string()).or_insert(0) += count;
        }
        Composition::new(counts).validated()
    }
}

impl FromIterator<(String, u32)> for Composition {
    fn from_iter<I: IntoIterator<Item = (String, u32)>>(iter: I) -> Self {
        let mut counts = BTreeMap::new();
        for (spec, count) in iter {
            *counts.entry(spec).or_insert(0) += count;
        }
        Composition { counts }
    }
}

/// Builds a composition by tallying one entry per player spec.
pub fn tally<'a, I: IntoIterator<Item = &'a str>>(specs: I) -> Composition {
    specs
        .into_iter()
        .map(|s| (s.to_string(), 1))
        .collect()
}
