//! Duplicate detection by `(tier, wave, real time)` composite key.
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::run::RunRecord;

/// `tier|wave|realTimeSeconds` identity of a run
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompositeKey(String);

impl CompositeKey {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Composite key of a run.
///
/// Real time is already whole seconds, so the spelling of the source
/// duration text never affects the key.
#[must_use]
pub fn generate_composite_key(run: &RunRecord) -> CompositeKey {
    CompositeKey(format!("{}|{}|{}", run.tier, run.wave, run.real_time))
}

#[must_use]
pub fn generate_composite_keys_set(runs: &[RunRecord]) -> HashSet<CompositeKey> {
    runs.iter().map(generate_composite_key).collect()
}

/// Result of checking one run against a collection
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateCheck {
    pub is_duplicate: bool,
    pub existing_run: Option<RunRecord>,
    pub composite_key: CompositeKey,
}

fn find_by_key<'a>(existing: &'a [RunRecord], key: &CompositeKey) -> Option<&'a RunRecord> {
    existing.iter().find(|run| generate_composite_key(run) == *key)
}

/// Check `run` against `existing_keys`, locating the matching run only on a hit.
#[must_use]
pub fn detect_duplicate(
    run: &RunRecord,
    existing_keys: &HashSet<CompositeKey>,
    existing_runs: &[RunRecord],
) -> DuplicateCheck {
    let composite_key = generate_composite_key(run);
    if !existing_keys.contains(&composite_key) {
        return DuplicateCheck {
            is_duplicate: false,
            existing_run: None,
            composite_key,
        };
    }
    DuplicateCheck {
        is_duplicate: true,
        existing_run: find_by_key(existing_runs, &composite_key).cloned(),
        composite_key,
    }
}

/// An incoming run paired with the stored run it collides with
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicatePair {
    pub new_run: RunRecord,
    pub existing_run: RunRecord,
}

#[derive(Debug, Clone, Default)]
pub struct BatchDuplicateResult {
    pub new_runs: Vec<RunRecord>,
    pub duplicates: Vec<DuplicatePair>,
    /// `existing_keys` plus the keys of every accepted new run
    pub composite_keys: HashSet<CompositeKey>,
}

/// Split a batch into new runs and duplicates of existing runs.
///
/// Runs are processed in input order. The first occurrence of a key inside
/// the batch is new; later occurrences of that key are dropped without being
/// reported. Keys already in `existing_keys` are reported with the matching
/// existing run. The inputs are left untouched.
#[must_use]
pub fn detect_batch_duplicates(
    new_runs: &[RunRecord],
    existing_keys: &HashSet<CompositeKey>,
    existing_runs: &[RunRecord],
) -> BatchDuplicateResult {
    let mut result = BatchDuplicateResult {
        composite_keys: existing_keys.clone(),
        ..BatchDuplicateResult::default()
    };

    for run in new_runs {
        let key = generate_composite_key(run);
        if result.composite_keys.insert(key.clone()) {
            result.new_runs.push(run.clone());
            continue;
        }
        match find_by_key(existing_runs, &key) {
            Some(existing) => result.duplicates.push(DuplicatePair {
                new_run: run.clone(),
                existing_run: existing.clone(),
            }),
            None => log::debug!("dropping repeated run {key} within import batch"),
        }
    }

    result
}

/// What to do with incoming runs that collide with stored ones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateResolution {
    /// Keep the stored run and discard the incoming one
    #[default]
    Skip,
    /// Replace the stored run's data, keeping its id
    Overwrite,
}

/// Collection produced by merging an import batch
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    pub runs: Vec<RunRecord>,
    pub added: usize,
    pub overwritten: usize,
    pub skipped: usize,
}

/// Merge `batch` into a copy of `existing` under `resolution`.
///
/// New runs are appended in batch order after the existing runs.
#[must_use]
pub fn merge_import(
    existing: &[RunRecord],
    batch: &[RunRecord],
    resolution: DuplicateResolution,
) -> MergeOutcome {
    let keys = generate_composite_keys_set(existing);
    let detected = detect_batch_duplicates(batch, &keys, existing);
    let mut runs = existing.to_vec();
    let mut outcome = MergeOutcome::default();

    match resolution {
        DuplicateResolution::Skip => outcome.skipped = detected.duplicates.len(),
        DuplicateResolution::Overwrite => {
            for pair in &detected.duplicates {
                if let Some(slot) = runs.iter_mut().find(|r| r.id == pair.existing_run.id) {
                    *slot = RunRecord {
                        id: pair.existing_run.id.clone(),
                        ..pair.new_run.clone()
                    };
                    outcome.overwritten += 1;
                }
            }
        }
    }

    outcome.added = detected.new_runs.len();
    runs.extend(detected.new_runs);
    outcome.runs = runs;
    log::debug!(
        "merged import: {} added, {} overwritten, {} skipped",
        outcome.added,
        outcome.overwritten,
        outcome.skipped
    );
    outcome
}
