//! Fight data model: parsed input records, stored fight records, and the
//! per-build performance entries the ranker aggregates over.

use crate::composition::Composition;
use crate::roles::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Victory,
    Defeat,
    Draw,
}

/// Type of WvW combat - affects retrieval filtering and recommendations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FightContext {
    Zerg,
    GuildRaid,
    Roam,
    Unknown,
}

impl FightContext {
    /// Lenient parse: `auto`, empty, or anything unrecognized maps to Unknown.
    pub fn from_string(value: &str) -> FightContext {
        match value.to_ascii_lowercase().as_str() {
            "zerg" => FightContext::Zerg,
            "guild_raid" => FightContext::GuildRaid,
            "roam" => FightContext::Roam,
            _ => FightContext::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FightContext::Zerg => "zerg",
            FightContext::GuildRaid => "guild_raid",
            FightContext::Roam => "roam",
            FightContext::Unknown => "unknown",
        }
    }
}

/// Auto-detect fight context from squad sizes.
///
/// 10-25 allies against 20+ enemies is ambiguous between zerg and guild
/// raid; the tie deliberately breaks to Zerg and is covered by tests - do
/// not "fix" the boundary without updating them.
pub fn guess_fight_context(
    ally_count: usize,
    enemy_count: usize,
    subgroup_count: usize,
) -> FightContext {
    if ally_count <= 10 && enemy_count <= 12 {
        return FightContext::Roam;
    }
    if ally_count >= 25 || enemy_count >= 30 {
        return FightContext::Zerg;
    }
    if (10..=25).contains(&ally_count) {
        if subgroup_count >= 2 {
            return FightContext::GuildRaid;
        }
        if enemy_count >= 20 {
            return FightContext::Zerg;
        }
    }
    FightContext::Unknown
}

/// One ally's parsed combat record, as produced by the external log parser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub name: String,
    pub account: String,
    pub spec: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub group: u32,
    #[serde(default)]
    pub dps: f64,
    #[serde(default)]
    pub healing: f64,
    #[serde(default)]
    pub cleanses: f64,
    #[serde(default)]
    pub boon_strips: f64,
    #[serde(default)]
    pub down_contrib: f64,
    #[serde(default)]
    pub deaths: u32,
    #[serde(default)]
    pub boon_gen: BTreeMap<String, f64>,
}

impl PlayerRecord {
    /// Role-specific performance score, computed once at recording time.
    /// Deaths carry a flat 5000-point penalty each, floored at zero.
    pub fn role_score(&self) -> f64 {
        let base = match self.role {
            Role::Healer => self.healing + 10.0 * self.cleanses,
            Role::Stab => 100.0 * self.boon_gen.values().sum::<f64>(),
            Role::DpsStrip => self.dps + 50.0 * self.boon_strips,
            Role::Boon | Role::Dps => self.dps + 2.0 * self.down_contrib,
        };
        (base - 5000.0 * self.deaths as f64).max(0.0)
    }
}

/// Engine input for one completed encounter.
#[derive(Debug, Clone, Deserialize)]
pub struct FightData {
    #[serde(default)]
    pub source_name: String,
    pub duration_sec: f64,
    pub allies: Vec<PlayerRecord>,
    pub enemy_composition: Composition,
    #[serde(default)]
    pub outcome: Option<Outcome>,
    #[serde(default)]
    pub ally_kills: u32,
    #[serde(default)]
    pub ally_deaths: u32,
    #[serde(default)]
    pub total_ally_damage: u64,
}

impl FightData {
    /// Outcome supplied by the parser, or the K/D heuristic when absent:
    /// positive K/D reads as victory, heavy losses as defeat, else draw.
    pub fn resolved_outcome(&self) -> Outcome {
        if let Some(outcome) = self.outcome {
            return outcome;
        }
        let kills = self.ally_kills;
        let deaths = self.ally_deaths;
        if kills > 0 && deaths == 0 {
            Outcome::Victory
        } else if kills > deaths {
            Outcome::Victory
        } else if deaths > kills * 2 && deaths >= 3 {
            Outcome::Defeat
        } else if deaths > kills && deaths >= 5 {
            Outcome::Defeat
        } else {
            Outcome::Draw
        }
    }

    pub fn subgroup_count(&self) -> usize {
        let groups: std::collections::BTreeSet<u32> = self
            .allies
            .iter()
            .map(|a| a.group)
            .filter(|g| *g > 0)
            .collect();
        groups.len().max(1)
    }
}

/// One (specialization, role) observation within a fight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildPerformanceEntry {
    pub fight_id: String,
    pub spec: String,
    pub role: Role,
    pub score: f64,
    pub dps: f64,
    pub healing: f64,
    pub cleanses: f64,
    pub boon_strips: f64,
    pub deaths: u32,
    pub won: bool,
}

impl BuildPerformanceEntry {
    /// The fight id is assigned by the store at insert time.
    pub fn from_player(player: &PlayerRecord, won: bool) -> Self {
        BuildPerformanceEntry {
            fight_id: String::new(),
            spec: player.spec.clone(),
            role: player.role,
            score: player.role_score(),
            dps: player.dps,
            healing: player.healing,
            cleanses: player.cleanses,
            boon_strips: player.boon_strips,
            deaths: player.deaths,
            won,
        }
    }
}

/// One completed encounter, immutable once stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FightRecord {
    pub fight_id: String,
    pub timestamp: DateTime<Utc>,
    pub source_name: String,
    pub enemy_composition: Composition,
    pub ally_composition: Composition,
    pub ally_accounts: Vec<String>,
    pub builds: Vec<BuildPerformanceEntry>,
    pub outcome: Outcome,
    pub duration_sec: f64,
    pub ally_kills: u32,
    pub ally_deaths: u32,
    pub total_ally_damage: u64,
    pub context_detected: FightContext,
    pub context_confirmed: Option<FightContext>,
    pub fingerprint: String,
}

impl FightRecord {
    /// Confirmed context if the uploader set one, otherwise the detected one.
    pub fn context(&self) -> FightContext {
        self.context_confirmed.unwrap_or(self.context_detected)
    }
}
