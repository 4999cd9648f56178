//! Specialization role classification and similarity weights.
//!
//! Every elite specialization maps to one role class. The class drives both
//! the weighted composition distance (scarce support roles weigh more than
//! dps substitutions) and the tactical-coverage scoring of the composition
//! builder.

use serde::{Deserialize, Serialize};

/// Role a player actually filled in a recorded fight, as detected by the
/// external log parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Healer,
    Stab,
    Boon,
    DpsStrip,
    #[default]
    Dps,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::Healer => "healer",
            Role::Stab => "stab",
            Role::Boon => "boon",
            Role::DpsStrip => "dps_strip",
            Role::Dps => "dps",
        }
    }
}

/// Role class inferred from a specialization name alone, used when no
/// per-player stats are available (enemy rosters).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleClass {
    Stability,
    Healer,
    BoonSupport,
    StripDps,
    GenericDps,
}

const STAB_SPECS: &[&str] = &["Firebrand", "Luminary"];

const HEALER_SPECS: &[&str] = &[
    "Druid",
    "Troubadour",
    "Specter",
    "Vindicator",
    "Tempest",
    "Scrapper",
];

const BOON_SPECS: &[&str] = &["Herald", "Renegade", "Chronomancer", "Paragon"];

const STRIP_DPS_SPECS: &[&str] = &["Spellbreaker", "Reaper", "Harbinger", "Scourge", "Ritualist"];

/// Specs whose damage output is condition pressure, forcing cleanse and
/// stability needs on the other side.
const CONDI_PRESSURE_SPECS: &[&str] = &["Scourge", "Harbinger", "Reaper", "Mirage"];

/// High-mobility burst specs that punish support-heavy enemy lines.
const BURST_SPECS: &[&str] = &["Willbender", "Vindicator", "Soulbeast", "Daredevil", "Deadeye"];

/// Default roster considered when no historical evidence exists: the
/// recommendation then falls back to pure needs coverage over these specs.
pub const KNOWN_SPECS: &[&str] = &[
    "Firebrand",
    "Scrapper",
    "Druid",
    "Tempest",
    "Herald",
    "Chronomancer",
    "Scourge",
    "Spellbreaker",
    "Reaper",
    "Harbinger",
    "Willbender",
    "Vindicator",
    "Soulbeast",
    "Catalyst",
    "Berserker",
];

pub fn classify(spec: &str) -> RoleClass {
    if STAB_SPECS.contains(&spec) {
        RoleClass::Stability
    } else if HEALER_SPECS.contains(&spec) {
        RoleClass::Healer
    } else if BOON_SPECS.contains(&spec) {
        RoleClass::BoonSupport
    } else if STRIP_DPS_SPECS.contains(&spec) {
        RoleClass::StripDps
    } else {
        RoleClass::GenericDps
    }
}

/// Distance weight for a specialization: mismatches in scarce, high-impact
/// roles matter more than dps substitutions of equal count difference.
pub fn weight(spec: &str) -> f64 {
    match classify(spec) {
        RoleClass::Stability => 2.0,
        RoleClass::Healer => 1.8,
        RoleClass::BoonSupport => 1.5,
        RoleClass::StripDps => 1.3,
        RoleClass::GenericDps => 1.0,
    }
}

pub fn is_condi_pressure(spec: &str) -> bool {
    CONDI_PRESSURE_SPECS.contains(&spec)
}

pub fn is_burst(spec: &str) -> bool {
    BURST_SPECS.contains(&spec)
}

/// Default role a spec plays when only its name is known.
pub fn default_role(spec: &str) -> Role {
    match classify(spec) {
        RoleClass::Stability => Role::Stab,
        RoleClass::Healer => Role::Healer,
        RoleClass::BoonSupport => Role::Boon,
        RoleClass::StripDps => Role::DpsStrip,
        RoleClass::GenericDps => Role::Dps,
    }
}
