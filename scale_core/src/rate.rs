//! Per-path rates from pairs of counter snapshots.
//!
//! The caller takes both snapshots and waits between them; nothing here sleeps or reads a clock.
//! Counters are assumed not to reset between the two snapshots. If they do, the rate comes out negative
//! and is left that way so verification flags it.

use std::collections::HashMap;
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::SampleErr;

/// Fraction of sent traffic that must be received for [traffic_passes] to hold.
pub const DEFAULT_DELIVERY_THRESHOLD: f64 = 0.99;

/// Monotonic in/out counters of one path (e.g. an interface) at one instant.
///
/// `timestamp` is measured from any reference point, as long as both snapshots of a path share it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterSnapshot {
    pub path: String,
    pub timestamp: Duration,
    pub in_count: u64,
    pub out_count: u64,
}
impl CounterSnapshot {
    pub fn new(path: impl Into<String>, timestamp: Duration, in_count: u64, out_count: u64) -> Self {
        Self {
            path: path.into(),
            timestamp,
            in_count,
            out_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSample {
    path: String,
    interval_secs: f64,
    in_rate: f64,
    out_rate: f64,
}
impl RateSample {
    pub fn path(&self) -> &str {
        &self.path
    }
    pub fn interval_secs(&self) -> f64 {
        self.interval_secs
    }
    pub fn in_rate(&self) -> f64 {
        self.in_rate
    }
    pub fn out_rate(&self) -> f64 {
        self.out_rate
    }
}

fn delta(first: u64, second: u64) -> f64 {
    (second as i128 - first as i128) as f64
}

fn check_paths(first: &CounterSnapshot, second: &CounterSnapshot) -> Result<(), SampleErr> {
    if first.path != second.path {
        return Err(SampleErr::PathMismatch {
            first: first.path.clone(),
            second: second.path.clone(),
        });
    }
    Ok(())
}

fn rate_over(first: &CounterSnapshot, second: &CounterSnapshot, interval: Duration) -> RateSample {
    let secs = interval.as_secs_f64();
    RateSample {
        path: first.path.clone(),
        interval_secs: secs,
        in_rate: delta(first.in_count, second.in_count) / secs,
        out_rate: delta(first.out_count, second.out_count) / secs,
    }
}

/// Rate of both counters between two snapshots of the same path, over the time between them.
///
/// ```
/// # use std::time::Duration;
/// # use scale_core::rate::{sample_rate, CounterSnapshot};
/// let t0 = CounterSnapshot::new("p1", Duration::ZERO, 1000, 0);
/// let t1 = CounterSnapshot::new("p1", Duration::from_secs(10), 2000, 500);
/// let rate = sample_rate(&t0, &t1).unwrap();
/// assert_eq!(rate.in_rate(), 100.0);
/// assert_eq!(rate.out_rate(), 50.0);
/// ```
pub fn sample_rate(first: &CounterSnapshot, second: &CounterSnapshot) -> Result<RateSample, SampleErr> {
    check_paths(first, second)?;
    let elapsed = second
        .timestamp
        .checked_sub(first.timestamp)
        .filter(|elapsed| !elapsed.is_zero())
        .ok_or_else(|| SampleErr::NonPositiveInterval(first.path.clone()))?;
    Ok(rate_over(first, second, elapsed))
}

/// Like [sample_rate], but divides by a caller-supplied sampling interval instead of the timestamp difference.
pub fn sample_rate_over(
    first: &CounterSnapshot,
    second: &CounterSnapshot,
    interval: Duration,
) -> Result<RateSample, SampleErr> {
    check_paths(first, second)?;
    if interval.is_zero() {
        return Err(SampleErr::NonPositiveInterval(first.path.clone()));
    }
    Ok(rate_over(first, second, interval))
}

fn index_by_path(snapshots: &[CounterSnapshot]) -> Result<HashMap<&str, &CounterSnapshot>, SampleErr> {
    let mut by_path = HashMap::with_capacity(snapshots.len());
    for snapshot in snapshots {
        if by_path.insert(snapshot.path.as_str(), snapshot).is_some() {
            return Err(SampleErr::DuplicatePath(snapshot.path.clone()));
        }
    }
    Ok(by_path)
}

/// Pair two sets of snapshots by path and compute a rate for each, in the order of `first`.
///
/// Every path must appear exactly once in each set.
pub fn sample_rates(first: &[CounterSnapshot], second: &[CounterSnapshot]) -> Result<Vec<RateSample>, SampleErr> {
    index_by_path(first)?;
    let by_path = index_by_path(second)?;
    if let Some(orphan) = second
        .iter()
        .find(|s| !first.iter().any(|f| f.path == s.path))
    {
        return Err(SampleErr::MissingPath(orphan.path.clone()));
    }
    first
        .iter()
        .map(|snapshot| {
            let partner = by_path
                .get(snapshot.path.as_str())
                .ok_or_else(|| SampleErr::MissingPath(snapshot.path.clone()))?;
            sample_rate(snapshot, partner)
        })
        .collect()
}

pub fn in_rates(samples: &[RateSample]) -> Vec<f64> {
    samples.iter().map(|s| s.in_rate).collect()
}

pub fn out_rates(samples: &[RateSample]) -> Vec<f64> {
    samples.iter().map(|s| s.out_rate).collect()
}

/// Paths sending more than they receive by over `slack` units per second.
pub fn lossy_paths(samples: &[RateSample], slack: f64) -> Vec<&str> {
    samples
        .iter()
        .filter(|s| s.out_rate - s.in_rate > slack)
        .map(|s| s.path.as_str())
        .collect()
}

/// Total received rate over total sent rate across every path, or None if nothing was sent.
pub fn delivery_ratio(samples: &[RateSample]) -> Option<f64> {
    let total_in: f64 = samples.iter().map(|s| s.in_rate).sum();
    let total_out: f64 = samples.iter().map(|s| s.out_rate).sum();
    if total_out == 0.0 {
        None
    } else {
        Some(total_in / total_out)
    }
}

/// Whether at least `threshold` of the sent traffic was received. Fails if nothing was sent.
pub fn traffic_passes(samples: &[RateSample], threshold: f64) -> bool {
    match delivery_ratio(samples) {
        Some(ratio) => {
            if ratio < threshold {
                debug!("Delivery ratio {ratio} below threshold {threshold}");
            }
            ratio >= threshold
        }
        None => false,
    }
}
