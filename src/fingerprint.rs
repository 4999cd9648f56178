//! Encounter fingerprinting for deduplication.
//!
//! The fingerprint captures one side's *perspective* of a fight: the same
//! squad uploading the same encounter twice collides, while an allied or
//! enemy squad uploading their own log of it does not (their account list
//! and damage totals differ). Near-duplicate encounters differing only in
//! untracked fields may collide; that false-positive dedup is accepted.

use sha2::{Digest, Sha256};

const DURATION_BUCKET_SECS: u64 = 5;
const DAMAGE_BUCKET: u64 = 50_000;
const MAX_ACCOUNTS: usize = 10;
const ACCOUNT_PREFIX_LEN: usize = 20;

/// Derives the 16-hex-char dedup key for a fight.
///
/// Deterministic in the bucketed duration, the first ten ally accounts
/// (sorted), the sorted ally spec list, and the bucketed ally damage.
pub fn fingerprint(
    duration_sec: f64,
    ally_accounts: &[String],
    ally_specs: &[String],
    total_ally_damage: u64,
) -> String {
    let duration_bucket = (duration_sec.max(0.0) as u64 / DURATION_BUCKET_SECS) * DURATION_BUCKET_SECS;

    let mut accounts: Vec<String> = ally_accounts
        .iter()
        .map(|a| a.chars().take(ACCOUNT_PREFIX_LEN).collect())
        .collect();
    accounts.sort();
    accounts.truncate(MAX_ACCOUNTS);

    let mut specs: Vec<&str> = ally_specs.iter().map(String::as_str).collect();
    specs.sort();

    let damage_bucket = (total_ally_damage / DAMAGE_BUCKET) * DAMAGE_BUCKET;

    let material = format!(
        "{}|{}|{}|{}",
        duration_bucket,
        accounts.join("_"),
        specs.join("_"),
        damage_bucket
    );

    let digest = Sha256::digest(material.as_bytes());
    hex::encode(digest)[..16].to_string()
}
