use crate::storage::{ClientStorage, SUBMITTED_CONTENT_HASHES, TARGET_SUBMISSIONS};
use crate::Result;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Sliding-window length for both the dedup cache and per-target limits.
pub const WINDOW_SECS: u64 = 3600;

/// Submissions allowed per target key inside one window.
pub const MAX_PER_TARGET: usize = 10;

/// One successful submission, remembered for duplicate suppression.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubmissionRecord {
    pub hash: String,
    pub timestamp: u64,
}

/// Fast non-cryptographic hash of note content: the classic
/// 31-multiplier string hash over utf-16 code units, rendered as a
/// signed decimal so stored records stay comparable across versions.
pub fn content_hash(content: &str) -> String {
    let mut hash: i32 = 0;
    for unit in content.encode_utf16() {
        hash = hash.wrapping_shl(5).wrapping_sub(hash).wrapping_add(unit as i32);
    }
    hash.to_string()
}

fn window_start(now: u64) -> u64 {
    now.saturating_sub(WINDOW_SECS)
}

/// True when `content` has not been submitted inside the window.
/// Read-only: recording happens separately, after confirmed delivery.
pub fn check_duplicate(storage: &ClientStorage, content: &str, now: u64) -> bool {
    let hash = content_hash(content);
    let records: Vec<SubmissionRecord> = storage.get(SUBMITTED_CONTENT_HASHES).unwrap_or_default();
    let cutoff = window_start(now);

    !records
        .iter()
        .any(|record| record.timestamp > cutoff && record.hash == hash)
}

/// Remember a delivered submission's content hash, pruning expired
/// records while we are here.
pub fn record_submission(storage: &ClientStorage, content: &str, now: u64) -> Result<()> {
    let hash = content_hash(content);
    let cutoff = window_start(now);

    storage.update::<Vec<SubmissionRecord>, _, _>(SUBMITTED_CONTENT_HASHES, |mut records| {
        records.retain(|record| record.timestamp > cutoff);
        records.push(SubmissionRecord {
            hash,
            timestamp: now,
        });
        (records, ())
    })
}

/// Pre-flight pass over every target key of an action. Returns the
/// first blocked key, or `None` when all fit in their windows. Never
/// mutates state, so an abort here consumes no quota for any target.
///
/// Repeated keys inside one action count against the window the same
/// way the later commit will record them.
pub fn check_rate_limits(storage: &ClientStorage, targets: &[String], now: u64) -> Option<String> {
    let windows: HashMap<String, Vec<u64>> = storage.get(TARGET_SUBMISSIONS).unwrap_or_default();
    let cutoff = window_start(now);
    let mut pending: HashMap<&str, usize> = HashMap::new();

    for target in targets {
        if target.is_empty() {
            continue;
        }

        let in_window = windows
            .get(target)
            .map(|stamps| stamps.iter().filter(|t| **t > cutoff).count())
            .unwrap_or(0);
        let queued = pending.entry(target.as_str()).or_insert(0);

        if in_window + *queued >= MAX_PER_TARGET {
            return Some(target.clone());
        }
        *queued += 1;
    }

    None
}

/// Consume one window slot per target occurrence. Call only after
/// [`check_rate_limits`] cleared every key.
pub fn commit_rate_limits(storage: &ClientStorage, targets: &[String], now: u64) -> Result<()> {
    if targets.iter().all(|t| t.is_empty()) {
        return Ok(());
    }
    let cutoff = window_start(now);

    storage.update::<HashMap<String, Vec<u64>>, _, _>(TARGET_SUBMISSIONS, |mut windows| {
        for target in targets {
            if target.is_empty() {
                continue;
            }
            let stamps = windows.entry(target.clone()).or_default();
            stamps.retain(|t| *t > cutoff);
            stamps.push(now);
        }
        (windows, ())
    })
}

/// Single-target check-then-consume. The orchestrator uses the split
/// pre-flight/commit pair instead so multi-target actions stay
/// all-or-nothing; this form suits callers throttling one key.
pub fn check_and_consume_rate_limit(
    storage: &ClientStorage,
    target: &str,
    now: u64,
) -> Result<bool> {
    if target.is_empty() {
        return Ok(true);
    }

    let targets = [target.to_owned()];
    if check_rate_limits(storage, &targets, now).is_some() {
        return Ok(false);
    }
    commit_rate_limits(storage, &targets, now)?;
    Ok(true)
}
