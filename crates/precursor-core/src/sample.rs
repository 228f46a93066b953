//! Deterministic down-sampling of large record sets.
//!
//! Sampling keeps graph construction tractable. Failure-labeled records are
//! drawn first (up to half of the budget, at least one) so a capped run never
//! loses its failure states to sampling alone. Normal records fill the rest,
//! and failures backfill any budget the normal records cannot use.

use rand::{SeedableRng as _, seq::index};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

use crate::record::HistoricalRecord;

/// What sampling kept out of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleSummary {
    pub total_records: usize,
    pub total_failures: usize,
    pub kept_records: usize,
    pub kept_failures: usize,
}

/// Selects at most `max_records` records, preserving input order.
///
/// Returns every record and `None` when the input already fits. The same
/// `seed` and input always select the same records.
#[must_use]
pub fn sample_records(
    records: &[HistoricalRecord],
    max_records: usize,
    seed: u64,
) -> (Vec<&HistoricalRecord>, Option<SampleSummary>) {
    if records.len() <= max_records {
        return (records.iter().collect(), None);
    }

    let (failures, normals): (Vec<usize>, Vec<usize>) =
        (0..records.len()).partition(|&i| records[i].failure);

    let failure_quota = if failures.is_empty() {
        0
    } else {
        (max_records / 2)
            .max(1)
            .min(failures.len())
            .min(max_records)
    };
    let normal_quota = (max_records - failure_quota).min(normals.len());
    let failure_quota = (max_records - normal_quota).min(failures.len());

    let mut rng = Pcg64::seed_from_u64(seed);
    let mut kept = index::sample(&mut rng, failures.len(), failure_quota)
        .into_iter()
        .map(|i| failures[i])
        .chain(
            index::sample(&mut rng, normals.len(), normal_quota)
                .into_iter()
                .map(|i| normals[i]),
        )
        .collect::<Vec<_>>();
    kept.sort_unstable();

    let summary = SampleSummary {
        total_records: records.len(),
        total_failures: failures.len(),
        kept_records: kept.len(),
        kept_failures: failure_quota,
    };
    (
        kept.into_iter().map(|i| &records[i]).collect(),
        Some(summary),
    )
}
