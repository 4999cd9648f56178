//! Historical fight store: append-only fight records, the fingerprint dedup
//! index, and user feedback rows, persisted as one pretty-printed JSON
//! document.
//!
//! The fingerprint check-then-insert sequence runs under a single mutex so
//! two concurrent uploads of the same encounter cannot both pass the
//! duplicate check. Reads take a snapshot and never hold the lock during
//! scoring.

use crate::composition::Composition;
use crate::error::EngineError;
use crate::model::{FightContext, FightRecord, Outcome};
use chrono::{DateTime, Duration, Utc};
use log::{debug, info};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FingerprintEntry {
    pub fingerprint: String,
    pub fight_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub signature: String,
    pub worked: bool,
    pub context: FightContext,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackSummary {
    pub signature: String,
    pub total: usize,
    pub worked: usize,
    pub success_rate: f64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDocument {
    fights: Vec<FightRecord>,
    fingerprints: Vec<FingerprintEntry>,
    feedback: Vec<FeedbackEntry>,
}

pub struct FightStore {
    path: PathBuf,
    inner: Mutex<StoreDocument>,
}

impl FightStore {
    /// Opens the store at `path`, loading existing state (fingerprint index
    /// included) or starting empty when the file does not exist yet.
    pub fn open(path: &Path) -> Result<Self, EngineError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let doc = match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => StoreDocument::default(),
            Err(e) => return Err(EngineError::IoError(e)),
        };
        Ok(FightStore {
            path: path.to_path_buf(),
            inner: Mutex::new(doc),
        })
    }

    fn save(&self, doc: &StoreDocument) -> Result<(), EngineError> {
        let json = serde_json::to_string_pretty(doc)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// Dedup-gated append. The fingerprint check, fight-id minting, and both
    /// inserts happen under one lock; a second record with the same
    /// fingerprint fails with DuplicateFight and changes nothing. Minting the
    /// id here keeps the index unique even when two inserts land within the
    /// same wall-clock second. Returns the assigned fight id.
    pub fn insert_fight(&self, mut record: FightRecord) -> Result<String, EngineError> {
        let mut doc = self.inner.lock();
        if doc
            .fingerprints
            .iter()
            .any(|e| e.fingerprint == record.fingerprint)
        {
            debug!("Skipping duplicate fight (fingerprint: {})", record.fingerprint);
            return Err(EngineError::DuplicateFight(record.fingerprint));
        }
        let fight_id = format!(
            "fight_{}_{}",
            record.timestamp.format("%Y%m%d_%H%M%S"),
            doc.fights.len()
        );
        record.fight_id = fight_id.clone();
        for build in &mut record.builds {
            build.fight_id = fight_id.clone();
        }
        doc.fingerprints.push(FingerprintEntry {
            fingerprint: record.fingerprint.clone(),
            fight_id: fight_id.clone(),
            created_at: record.timestamp,
        });
        info!(
            "Recorded fight {}: {:?} [{}] vs {} ({} builds)",
            fight_id,
            record.outcome,
            record.context().label(),
            record.enemy_composition,
            record.builds.len()
        );
        doc.fights.push(record);
        self.save(&doc)?;
        Ok(fight_id)
    }

    /// Snapshot of all fights for retrieval and ranking.
    pub fn fights(&self) -> Vec<FightRecord> {
        self.inner.lock().fights.clone()
    }

    pub fn total_fights(&self) -> usize {
        self.inner.lock().fights.len()
    }

    /// Global win rate as a percentage over all stored fights.
    pub fn global_win_rate(&self) -> f64 {
        let doc = self.inner.lock();
        if doc.fights.is_empty() {
            return 0.0;
        }
        let victories = doc
            .fights
            .iter()
            .filter(|f| f.outcome == Outcome::Victory)
            .count();
        victories as f64 / doc.fights.len() as f64 * 100.0
    }

    /// Distinct ally accounts seen across all recorded fights.
    pub fn unique_players(&self) -> usize {
        let doc = self.inner.lock();
        let accounts: HashSet<&str> = doc
            .fights
            .iter()
            .flat_map(|f| f.ally_accounts.iter())
            .filter(|a| !a.is_empty())
            .map(String::as_str)
            .collect();
        accounts.len()
    }

    pub fn record_feedback(
        &self,
        enemy: &Composition,
        worked: bool,
        context: FightContext,
    ) -> Result<(), EngineError> {
        let mut doc = self.inner.lock();
        doc.feedback.push(FeedbackEntry {
            signature: enemy.signature(),
            worked,
            context,
            timestamp: Utc::now(),
        });
        self.save(&doc)
    }

    /// Success rate of past feedback for this exact composition signature,
    /// or None when no feedback exists.
    pub fn feedback_rate(&self, signature: &str) -> Option<f64> {
        let doc = self.inner.lock();
        let rows: Vec<&FeedbackEntry> = doc
            .feedback
            .iter()
            .filter(|e| e.signature == signature)
            .collect();
        if rows.is_empty() {
            return None;
        }
        let worked = rows.iter().filter(|e| e.worked).count();
        Some(worked as f64 / rows.len() as f64)
    }

    /// Per-signature aggregation of all feedback rows.
    pub fn feedback_summary(&self) -> Vec<FeedbackSummary> {
        let doc = self.inner.lock();
        let mut by_signature: std::collections::BTreeMap<&str, (usize, usize)> = Default::default();
        for row in &doc.feedback {
            let slot = by_signature.entry(row.signature.as_str()).or_insert((0, 0));
            slot.0 += 1;
            if row.worked {
                slot.1 += 1;
            }
        }
        by_signature
            .into_iter()
            .map(|(signature, (total, worked))| FeedbackSummary {
                signature: signature.to_string(),
                total,
                worked,
                success_rate: worked as f64 / total as f64,
            })
            .collect()
    }

    /// Prunes fingerprint index entries strictly older than the retention
    /// window. Fight records themselves are retained; a pruned-fingerprint
    /// fight can therefore be re-submitted and accepted again, which is the
    /// intended trade for a bounded index.
    pub fn cleanup_fingerprints(&self, retention_days: i64) -> Result<usize, EngineError> {
        let cutoff = Utc::now() - Duration::days(retention_days);
        let mut doc = self.inner.lock();
        let before = doc.fingerprints.len();
        doc.fingerprints.retain(|e| e.created_at >= cutoff);
        let removed = before - doc.fingerprints.len();
        if removed > 0 {
            info!("Cleaned up {} old fingerprints", removed);
            self.save(&doc)?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::tally;
    use crate::model::BuildPerformanceEntry;
    use crate::roles::Role;
    use tempfile::TempDir;

    fn record(fingerprint: &str, age_days: i64) -> FightRecord {
        FightRecord {
            fight_id: String::new(),
            timestamp: Utc::now() - Duration::days(age_days),
            source_name: "log.zevtc".to_string(),
            enemy_composition: tally(["Firebrand", "Scourge"]),
            ally_composition: tally(["Spellbreaker", "Scourge"]),
            ally_accounts: vec!["Ryn.1234".to_string(), "Kaela.5678".to_string()],
            builds: vec![],
            outcome: Outcome::Victory,
            duration_sec: 120.0,
            ally_kills: 5,
            ally_deaths: 1,
            total_ally_damage: 800_000,
            context_detected: FightContext::Zerg,
            context_confirmed: None,
            fingerprint: fingerprint.to_string(),
        }
    }

    fn open_store(dir: &TempDir) -> FightStore {
        FightStore::open(&dir.path().join("fights.json")).unwrap()
    }

    #[test]
    fn second_identical_fingerprint_is_rejected() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        store.insert_fight(record("abcd1234abcd1234", 0)).unwrap();
        let err = store
            .insert_fight(record("abcd1234abcd1234", 0))
            .unwrap_err();
        assert!(matches!(err, EngineError::DuplicateFight(_)));
        assert_eq!(store.total_fights(), 1);
    }

    #[test]
    fn same_second_inserts_mint_distinct_ids() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        let mut with_builds = record("aaaa", 0);
        with_builds.builds = vec![BuildPerformanceEntry {
            fight_id: String::new(),
            spec: "Scourge".to_string(),
            role: Role::DpsStrip,
            score: 5_000.0,
            dps: 2_500.0,
            healing: 0.0,
            cleanses: 0.0,
            boon_strips: 12.0,
            deaths: 0,
            won: true,
        }];
        let first = store.insert_fight(with_builds).unwrap();
        let second = store.insert_fight(record("bbbb", 0)).unwrap();
        assert_ne!(first, second);

        let fights = store.fights();
        assert_eq!(fights[0].fight_id, first);
        assert_eq!(fights[1].fight_id, second);
        // Build rows carry the minted id, not the placeholder.
        assert!(fights[0].builds.iter().all(|b| b.fight_id == first));
    }

    #[test]
    fn concurrent_inserts_never_share_an_id() {
        let dir = TempDir::new().unwrap();
        let store = std::sync::Arc::new(open_store(&dir));

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || store.insert_fight(record(&format!("fp{}", i), 0)).unwrap())
            })
            .collect();
        let mut ids: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 4);
        assert_eq!(store.total_fights(), 4);
    }

    #[test]
    fn state_survives_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let store = open_store(&dir);
            store.insert_fight(record("aaaa", 0)).unwrap();
        }
        let store = open_store(&dir);
        assert_eq!(store.total_fights(), 1);
        // Dedup index reloaded too.
        assert!(store.insert_fight(record("aaaa", 0)).is_err());
    }

    #[test]
    fn unreadable_store_file_is_an_error_not_an_empty_store() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fights.json");
        // A directory at the store path makes the read fail with something
        // other than NotFound; opening must surface that instead of starting
        // an empty store that would overwrite history on the next save.
        fs::create_dir(&path).unwrap();
        assert!(matches!(
            FightStore::open(&path),
            Err(EngineError::IoError(_))
        ));
    }

    #[test]
    fn cleanup_prunes_only_expired_fingerprints() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        store.insert_fight(record("old", 8)).unwrap();
        store.insert_fight(record("new", 2)).unwrap();

        let removed = store.cleanup_fingerprints(7).unwrap();
        assert_eq!(removed, 1);
        // The old fight record itself stays.
        assert_eq!(store.total_fights(), 2);
        // Its fingerprint is gone, so the same encounter would be re-admitted.
        assert!(store.insert_fight(record("old", 0)).is_ok());
        // The fresh fingerprint still blocks.
        assert!(store.insert_fight(record("new", 0)).is_err());
    }

    #[test]
    fn feedback_rate_is_per_signature() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        let enemy = tally(["Firebrand", "Scourge"]);
        store.record_feedback(&enemy, true, FightContext::Zerg).unwrap();
        store.record_feedback(&enemy, true, FightContext::Zerg).unwrap();
        store.record_feedback(&enemy, false, FightContext::Zerg).unwrap();

        let rate = store.feedback_rate(&enemy.signature()).unwrap();
        assert!((rate - 2.0 / 3.0).abs() < 1e-9);
        assert!(store.feedback_rate("Reaper:5").is_none());

        let summary = store.feedback_summary();
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].total, 3);
        assert_eq!(summary[0].worked, 2);
    }

    #[test]
    fn status_counters() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        store.insert_fight(record("a", 0)).unwrap();
        let mut loss = record("b", 0);
        loss.outcome = Outcome::Defeat;
        loss.ally_accounts = vec!["Ryn.1234".to_string(), "Vex.9012".to_string()];
        store.insert_fight(loss).unwrap();

        assert_eq!(store.total_fights(), 2);
        assert_eq!(store.global_win_rate(), 50.0);
        assert_eq!(store.unique_players(), 3);
    }
}
