//! Engine facade: the in-process contract consumed by whatever presentation
//! layer is built around the recommendation core.

use crate::analysis::recommender::{self, Recommendation};
use crate::composition::{self, Composition};
use crate::config::Config;
use crate::error::EngineError;
use crate::fingerprint;
use crate::model::{
    guess_fight_context, BuildPerformanceEntry, FightContext, FightData, FightRecord, Outcome,
};
use crate::store::{FeedbackSummary, FightStore};
use chrono::Utc;
use serde::Serialize;

/// Fights shorter than this carry no meaningful composition signal.
const MIN_FIGHT_DURATION_SECS: f64 = 60.0;

#[derive(Debug, Clone, Serialize)]
pub struct EngineStatus {
    pub total_fights: usize,
    pub global_win_rate: f64,
    pub unique_players: usize,
    pub engine: &'static str,
}

pub struct CounterEngine {
    store: FightStore,
    config: Config,
}

impl CounterEngine {
    pub fn new(config: Config) -> Result<Self, EngineError> {
        let store = FightStore::open(&config.data_dir.join("fights.json"))?;
        Ok(CounterEngine { store, config })
    }

    /// Ingests one parsed encounter. Returns the assigned fight id, or
    /// DuplicateFight when the dedup index already knows this encounter.
    pub fn record_fight(
        &self,
        data: &FightData,
        context: Option<FightContext>,
    ) -> Result<String, EngineError> {
        if data.allies.is_empty() {
            return Err(EngineError::InvalidComposition(
                "fight has no ally records".to_string(),
            ));
        }
        let enemy_composition = data.enemy_composition.clone().validated()?;
        if data.duration_sec < MIN_FIGHT_DURATION_SECS {
            return Err(EngineError::ShortFight(data.duration_sec));
        }

        let ally_accounts: Vec<String> =
            data.allies.iter().map(|a| a.account.clone()).collect();
        let ally_specs: Vec<String> = data.allies.iter().map(|a| a.spec.clone()).collect();
        let fingerprint = fingerprint::fingerprint(
            data.duration_sec,
            &ally_accounts,
            &ally_specs,
            data.total_ally_damage,
        );

        let now = Utc::now();
        let outcome = data.resolved_outcome();
        let context_detected = guess_fight_context(
            data.allies.len(),
            enemy_composition.total() as usize,
            data.subgroup_count(),
        );

        let builds: Vec<BuildPerformanceEntry> = data
            .allies
            .iter()
            .map(|p| BuildPerformanceEntry::from_player(p, outcome == Outcome::Victory))
            .collect();

        // The store assigns the fight id under its insert lock.
        let record = FightRecord {
            fight_id: String::new(),
            timestamp: now,
            source_name: data.source_name.clone(),
            enemy_composition,
            ally_composition: composition::tally(data.allies.iter().map(|a| a.spec.as_str())),
            ally_accounts,
            builds,
            outcome,
            duration_sec: data.duration_sec,
            ally_kills: data.ally_kills,
            ally_deaths: data.ally_deaths,
            total_ally_damage: data.total_ally_damage,
            context_detected,
            context_confirmed: context,
            fingerprint,
        };

        self.store.insert_fight(record)
    }

    /// Produces a counter-recommendation for an observed enemy composition.
    pub fn generate_counter(
        &self,
        enemy: &Composition,
        context: Option<FightContext>,
    ) -> Result<Recommendation, EngineError> {
        let fights = self.store.fights();
        let feedback_rate = self.store.feedback_rate(&enemy.signature());
        recommender::recommend(
            &fights,
            enemy,
            context,
            feedback_rate,
            self.config.feedback_weight,
            self.config.squad_size,
            Utc::now(),
        )
    }

    /// Records whether a previously recommended counter worked out.
    pub fn submit_feedback(
        &self,
        enemy: &Composition,
        worked: bool,
        context: FightContext,
    ) -> Result<(), EngineError> {
        let enemy = enemy.clone().validated()?;
        self.store.record_feedback(&enemy, worked, context)
    }

    pub fn status(&self) -> EngineStatus {
        EngineStatus {
            total_fights: self.store.total_fights(),
            global_win_rate: self.store.global_win_rate(),
            unique_players: self.store.unique_players(),
            engine: "stats_engine",
        }
    }

    pub fn feedback_summary(&self) -> Vec<FeedbackSummary> {
        self.store.feedback_summary()
    }

    /// Maintenance: prunes dedup-index entries past the retention window.
    pub fn cleanup_fingerprints(&self) -> Result<usize, EngineError> {
        self.store
            .cleanup_fingerprints(self.config.fingerprint_retention_days)
    }
}
