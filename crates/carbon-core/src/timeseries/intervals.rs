// ABOUTME: Interval math over emissions series: boundary clipping, rolling windows, period averages
// ABOUTME: Duration-weighted averaging with partial credit for samples straddling a boundary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Carbon Aware Contributors

//! # Interval & Windowing Engine
//!
//! Every function here is pure and operates on an in-memory series. Samples are
//! half-open intervals `[time, time + duration)`.
//!
//! - [`filter_by_duration`] keeps samples overlapping a range
//! - [`rolling_average`] resamples a series onto a regular grid of windows
//! - [`average_over_period`] reduces a continuous series to one weighted mean

use chrono::{DateTime, Duration, Utc};

use crate::errors::{CarbonAwareError, CarbonAwareResult};
use crate::models::EmissionsData;

/// Keep samples whose interval has non-zero overlap with `[start, end)`
///
/// When `start == end` the range is treated as an instant and the samples whose
/// interval contains it are kept. An inverted range keeps nothing.
#[must_use]
pub fn filter_by_duration(
    series: &[EmissionsData],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<EmissionsData> {
    if start == end {
        return series
            .iter()
            .filter(|sample| sample.time <= start && start < sample.end())
            .cloned()
            .collect();
    }

    series
        .iter()
        .filter(|sample| sample.time < end && sample.end() > start)
        .cloned()
        .collect()
}

/// Widen `[start, end]` by `window` on both sides, saturating at the
/// bounds of `DateTime<Utc>`
#[must_use]
pub fn extend_time_by_window(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    window: Duration,
) -> (DateTime<Utc>, DateTime<Utc>) {
    (
        start.checked_sub_signed(window).unwrap_or(DateTime::<Utc>::MIN_UTC),
        end.checked_add_signed(window).unwrap_or(DateTime::<Utc>::MAX_UTC),
    )
}

/// Length of the overlap between a sample and `[start, end)`, zero if disjoint
#[must_use]
pub fn overlap(sample: &EmissionsData, start: DateTime<Utc>, end: DateTime<Utc>) -> Duration {
    let from = sample.time.max(start);
    let to = sample.end().min(end);
    if to > from {
        to - from
    } else {
        Duration::zero()
    }
}

/// Resample `series` into windows of `window_size`, one every `tick_size`
///
/// - `window_size <= 0` returns the input unchanged
/// - `tick_size` defaults to the first sample's duration when absent or non-positive
/// - the first window starts at `start`, never before the first sample
/// - a window is emitted only while it ends at or before both `end` and the
///   end of the data; windows no sample overlaps are skipped
///
/// Each output rating is the mean of the overlapping ratings weighted by the
/// length of each overlap. Output samples carry `duration = window_size` and
/// the location of the last contributing sample.
///
/// # Errors
///
/// Returns [`CarbonAwareError::InvalidSeries`] when no positive tick size can
/// be determined or when the first window ends past the representable range
/// of `DateTime<Utc>`.
pub fn rolling_average(
    series: &[EmissionsData],
    window_size: Duration,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    tick_size: Option<Duration>,
) -> CarbonAwareResult<Vec<EmissionsData>> {
    if window_size <= Duration::zero() {
        return Ok(series.to_vec());
    }

    let mut ordered = series.to_vec();
    ordered.sort_by_key(|sample| sample.time);

    let Some(first) = ordered.first() else {
        return Ok(Vec::new());
    };

    let tick = match tick_size {
        Some(tick) if tick > Duration::zero() => tick,
        _ => first.duration,
    };
    if tick <= Duration::zero() {
        return Err(CarbonAwareError::InvalidSeries {
            reason: format!(
                "cannot derive a tick size from a sample of duration {}s at {}",
                first.duration.num_seconds(),
                first.time
            ),
        });
    }

    let data_end = ordered
        .iter()
        .map(EmissionsData::end)
        .max()
        .unwrap_or(first.time);
    let limit = end.map_or(data_end, |end| end.min(data_end));

    let mut window_start = start.map_or(first.time, |start| start.max(first.time));
    let mut windows = Vec::new();

    let Some(mut window_end) = window_start.checked_add_signed(window_size) else {
        return Err(CarbonAwareError::InvalidSeries {
            reason: format!(
                "a window of {}s starting at {window_start} ends past the supported time range",
                window_size.num_seconds()
            ),
        });
    };

    while window_end <= limit {
        if let Some(sample) = average_window(&ordered, window_start, window_end) {
            windows.push(sample);
        }
        let next = window_start
            .checked_add_signed(tick)
            .and_then(|next| Some((next, next.checked_add_signed(window_size)?)));
        let Some((next_start, next_end)) = next else {
            break;
        };
        window_start = next_start;
        window_end = next_end;
    }

    Ok(windows)
}

fn average_window(
    ordered: &[EmissionsData],
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Option<EmissionsData> {
    let mut weighted = 0.0;
    let mut covered_ms = 0_i64;
    let mut location = None;

    for sample in ordered {
        let part = overlap(sample, window_start, window_end).num_milliseconds();
        if part > 0 {
            weighted += sample.rating * part as f64;
            covered_ms += part;
            location = Some(&sample.location);
        }
    }

    let location = location?;
    Some(EmissionsData::new(
        location.clone(),
        window_start,
        window_end - window_start,
        weighted / covered_ms as f64,
    ))
}

/// Duration-weighted mean rating over `[start, end]`
///
/// The series may be in forward or reverse chronological order; the direction
/// is taken from the first two samples and every adjacent pair must abut in
/// that direction. Boundary samples contribute in proportion to their overlap.
/// The sum is always accumulated in chronological order, so reversing the
/// input cannot change the result.
///
/// An empty series yields `0.0`. A zero-length period yields the rating of the
/// sample containing that instant.
///
/// # Errors
///
/// - [`CarbonAwareError::InvalidSeries`] for a sample with non-positive duration
/// - [`CarbonAwareError::DiscontinuousData`] for a gap, overlap or duplicate
/// - [`CarbonAwareError::PeriodOutOfRange`] when the period is not covered
pub fn average_over_period(
    series: &[EmissionsData],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> CarbonAwareResult<f64> {
    if series.is_empty() {
        return Ok(0.0);
    }

    if let Some(sample) = series.iter().find(|s| s.duration <= Duration::zero()) {
        return Err(CarbonAwareError::InvalidSeries {
            reason: format!("sample at {} has a non-positive duration", sample.time),
        });
    }

    let reversed = series.len() > 1 && series[1].time < series[0].time;
    check_continuity(series, reversed)?;

    let (data_start, data_end) = if reversed {
        (series[series.len() - 1].time, series[0].end())
    } else {
        (series[0].time, series[series.len() - 1].end())
    };

    if start < data_start || end > data_end || start > end || start >= data_end {
        return Err(CarbonAwareError::PeriodOutOfRange {
            start,
            end,
            data_start,
            data_end,
        });
    }

    let mut chronological: Box<dyn Iterator<Item = &EmissionsData>> = if reversed {
        Box::new(series.iter().rev())
    } else {
        Box::new(series.iter())
    };

    if start == end {
        let rating = chronological
            .find(|sample| sample.time <= start && start < sample.end())
            .map_or(0.0, |sample| sample.rating);
        return Ok(rating);
    }

    let total_ms = (end - start).num_milliseconds() as f64;
    let average = chronological
        .map(|sample| sample.rating * overlap(sample, start, end).num_milliseconds() as f64 / total_ms)
        .sum();

    Ok(average)
}

fn check_continuity(series: &[EmissionsData], reversed: bool) -> CarbonAwareResult<()> {
    for pair in series.windows(2) {
        let (previous, current) = (&pair[0], &pair[1]);
        let abuts = if reversed {
            current.end() == previous.time
        } else {
            current.time == previous.end()
        };
        if !abuts {
            return Err(CarbonAwareError::DiscontinuousData {
                previous_start: previous.time,
                previous_end: previous.end(),
                current_start: current.time,
                current_end: current.end(),
            });
        }
    }
    Ok(())
}
