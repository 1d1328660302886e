//! Translation completion ratios.
//!
//! Ratios are rounded to two decimals with round-half-up applied to the exact
//! fraction. A snapshot without slots has no progress (`None`), never `0/0`.

use std::collections::BTreeMap;

use serde::Serialize;

use super::snapshot::Snapshot;

/// Progress of one project, as listed for an organization or a user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectProgress {
    pub project_id: String,
    /// `None` when the current snapshot has no slots.
    pub progress: Option<f64>,
}

/// `numerator / denominator` rounded half-up to hundredths.
///
/// Returns `None` for a zero denominator.
#[must_use]
#[allow(clippy::float_arithmetic)]
pub fn rounded_ratio(numerator: usize, denominator: usize) -> Option<f64> {
    if denominator == 0 {
        return None;
    }
    let numerator = numerator.min(denominator);
    // floor((n / d) * 100 + 1/2) without leaving integer arithmetic
    let hundredths = (numerator * 200 + denominator) / (denominator * 2);
    let hundredths = u32::try_from(hundredths).unwrap_or(100);

    Some(f64::from(hundredths) / 100.0)
}

/// Share of translated slots over the full `(locale, key)` grid.
#[must_use]
pub fn project_progress(snapshot: &Snapshot) -> Option<f64> {
    rounded_ratio(snapshot.translated_slots(), snapshot.total_slots())
}

/// Share of translated keys per listed locale.
///
/// `None` when the snapshot lists no locale or no key.
#[must_use]
pub fn locale_progress(snapshot: &Snapshot) -> Option<BTreeMap<String, f64>> {
    let total_keys = snapshot.keys.len();
    let progress: BTreeMap<String, f64> = snapshot
        .locales
        .iter()
        .filter_map(|locale| {
            rounded_ratio(snapshot.translated_keys_in(locale), total_keys)
                .map(|ratio| (locale.clone(), ratio))
        })
        .collect();

    if progress.is_empty() { None } else { Some(progress) }
}
