// ABOUTME: Optimal-window selector returning every minimum-intensity sample
// ABOUTME: Ties are kept in input order so callers can take the first element
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Carbon Aware Contributors

use crate::models::EmissionsData;

/// Every sample whose rating equals the series minimum, in input order
///
/// Returns an empty vector for an empty series.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn select_optimal(series: &[EmissionsData]) -> Vec<EmissionsData> {
    let Some(minimum) = series
        .iter()
        .map(|sample| sample.rating)
        .reduce(f64::min)
    else {
        return Vec::new();
    };

    series
        .iter()
        .filter(|sample| sample.rating == minimum)
        .cloned()
        .collect()
}
