//! Squad slot allocation over ranked builds.
//!
//! Greedy heuristic, not an optimal assignment solver: support and boon
//! slots are reserved first, the remainder goes to the highest-scoring dps
//! builds. Known approximation, kept as an isolated policy so a real
//! optimizer can replace it later.

use crate::analysis::needs::NeedsProfile;
use crate::analysis::ranker::RankedBuild;
use crate::roles::{self, Role, RoleClass};
use serde::Serialize;

const SUPPORT_SLOTS: u32 = 3;
const BOON_SLOTS: u32 = 2;
const DPS_SLOTS: u32 = 4;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotAllocation {
    pub spec: String,
    pub role: Role,
    pub count: u32,
    pub win_rate: f64,
}

fn stab_capable(build: &RankedBuild) -> bool {
    build.role == Role::Stab || roles::classify(&build.spec) == RoleClass::Stability
}

fn heal_capable(build: &RankedBuild) -> bool {
    build.role == Role::Healer || roles::classify(&build.spec) == RoleClass::Healer
}

fn boon_capable(build: &RankedBuild) -> bool {
    build.role == Role::Boon || roles::classify(&build.spec) == RoleClass::BoonSupport
}

fn strip_capable(build: &RankedBuild) -> bool {
    build.role == Role::DpsStrip || roles::classify(&build.spec) == RoleClass::StripDps
}

/// Blended slot score: 60% empirical win rate, 40% tactical coverage of the
/// inferred needs.
pub fn final_score(build: &RankedBuild, needs: &NeedsProfile) -> f64 {
    let base = build.win_rate / 100.0;
    let mut coverage = 0.0;
    if stab_capable(build) {
        coverage += 0.3 * needs.stab;
    }
    if heal_capable(build) {
        coverage += 0.3 * needs.heal;
    }
    if boon_capable(build) {
        coverage += 0.25 * needs.boon;
    }
    if strip_capable(build) {
        coverage += 0.25 * needs.strip;
    }
    if roles::is_burst(&build.spec) {
        coverage += 0.2 * needs.burst;
    }
    0.6 * base + 0.4 * coverage
}

/// Allocates `squad_size` slots across the ranked builds.
pub fn build(ranked: &[RankedBuild], needs: &NeedsProfile, squad_size: usize) -> Vec<SlotAllocation> {
    let mut scored: Vec<(&RankedBuild, f64)> = ranked
        .iter()
        .map(|b| (b, final_score(b, needs)))
        .collect();
    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.spec.cmp(&b.0.spec))
    });

    let mut allocations: Vec<SlotAllocation> = Vec::new();
    let mut remaining = squad_size as u32;

    // Support line first (stability + heal), then boon coverage, then dps.
    fill(
        &scored,
        |b| stab_capable(b) || heal_capable(b),
        SUPPORT_SLOTS,
        &mut remaining,
        &mut allocations,
    );
    fill(&scored, boon_capable, BOON_SLOTS, &mut remaining, &mut allocations);
    fill(
        &scored,
        |b| !stab_capable(b) && !heal_capable(b) && !boon_capable(b),
        DPS_SLOTS,
        &mut remaining,
        &mut allocations,
    );

    allocations
}

fn fill(
    scored: &[(&RankedBuild, f64)],
    pool: impl Fn(&RankedBuild) -> bool,
    bucket: u32,
    remaining: &mut u32,
    allocations: &mut Vec<SlotAllocation>,
) {
    let mut bucket_left = bucket.min(*remaining);
    for (build, _) in scored {
        if bucket_left == 0 {
            break;
        }
        if !pool(build) {
            continue;
        }
        if allocations
            .iter()
            .any(|a| a.spec == build.spec && a.role == build.role)
        {
            continue;
        }
        let count = build.recommended_count.min(bucket_left);
        if count == 0 {
            continue;
        }
        bucket_left -= count;
        *remaining -= count;
        allocations.push(SlotAllocation {
            spec: build.spec.clone(),
            role: build.role,
            count,
            win_rate: build.win_rate,
        });
    }
}
