// ABOUTME: Pure time-series transforms over emissions samples
// ABOUTME: Clipping, resampling, period averaging and optimal-point selection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Carbon Aware Contributors

/// Boundary clipping, rolling windows and period averages
pub mod intervals;
/// Minimum-intensity selection
pub mod optimal;

pub use intervals::{
    average_over_period, extend_time_by_window, filter_by_duration, overlap, rolling_average,
};
pub use optimal::select_optimal;
