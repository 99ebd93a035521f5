//! Checks that observed rates are spread across paths in the expected proportions.

use log::{debug, warn};
use serde::Serialize;

use crate::{config::DEFAULT_TOLERANCE, error::VerifyErr};

/// Allowed relative deviation between an observed and an expected value, in [0, 1].
///
/// ```
/// # use scale_core::distribution::Tolerance;
/// assert_eq!(Tolerance::new(0.05).unwrap().value(), 0.05);
/// assert!(Tolerance::new(1.01).is_err());
/// assert!(Tolerance::new(f64::NAN).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct Tolerance(f64);
impl Tolerance {
    pub const DEFAULT: Self = Self(DEFAULT_TOLERANCE);

    pub fn new(value: f64) -> Result<Self, VerifyErr> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(VerifyErr::InvalidTolerance(value))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}
impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}
impl TryFrom<f64> for Tolerance {
    type Error = VerifyErr;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Fractions of a total, one per path, summing to 1 (or all zero if the total was zero).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution(Vec<f64>);
impl Distribution {
    pub fn fractions(&self) -> &[f64] {
        &self.0
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn into_vec(self) -> Vec<f64> {
        self.0
    }
}

/// ```
/// # use scale_core::distribution::normalize;
/// assert_eq!(normalize(&[1.0, 1.0, 2.0]).fractions(), &[0.25, 0.25, 0.5]);
/// assert_eq!(normalize(&[0.0, 0.0, 0.0]).fractions(), &[0.0, 0.0, 0.0]);
/// ```
pub fn normalize(values: &[f64]) -> Distribution {
    let total: f64 = values.iter().sum();
    if total == 0.0 {
        return Distribution(vec![0.0; values.len()]);
    }
    Distribution(values.iter().map(|v| v / total).collect())
}

/// Normalize raw counters, also returning their total.
pub fn normalize_counts(counts: &[u64]) -> (Distribution, u128) {
    let total: u128 = counts.iter().map(|c| *c as u128).sum();
    if total == 0 {
        return (Distribution(vec![0.0; counts.len()]), 0);
    }
    let fractions = counts.iter().map(|c| *c as f64 / total as f64).collect();
    (Distribution(fractions), total)
}

/// How far an observed value is from its expected value, in percent of the expected value.
///
/// A zero expected value has no meaningful percentage unless the observed value is also zero,
/// that case is [PercentError::Undefined] and must not be folded into averages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum PercentError {
    Defined(f64),
    Undefined,
}
impl PercentError {
    fn between(actual: f64, expected: f64) -> Self {
        if expected != 0.0 {
            Self::Defined(100.0 * (actual - expected).abs() / expected)
        } else if actual == 0.0 {
            Self::Defined(0.0)
        } else {
            Self::Undefined
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Self::Defined(v) => Some(v),
            Self::Undefined => None,
        }
    }

    pub fn is_defined(self) -> bool {
        matches!(self, Self::Defined(_))
    }
}
impl core::fmt::Display for PercentError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PercentError::Defined(v) => write!(f, "{v:.2}%"),
            PercentError::Undefined => write!(f, "undefined"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EntryVerdict {
    pub actual: f64,
    pub expected: f64,
    pub passed: bool,
    pub percent_error: PercentError,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    entries: Vec<EntryVerdict>,
}
impl Verdict {
    pub fn entries(&self) -> &[EntryVerdict] {
        &self.entries
    }
    pub fn passes(&self) -> Vec<bool> {
        self.entries.iter().map(|e| e.passed).collect()
    }
    pub fn percent_errors(&self) -> Vec<PercentError> {
        self.entries.iter().map(|e| e.percent_error).collect()
    }
    pub fn all_passed(&self) -> bool {
        self.entries.iter().all(|e| e.passed)
    }
    pub fn failures(&self) -> impl Iterator<Item = (usize, &EntryVerdict)> {
        self.entries.iter().enumerate().filter(|(_, e)| !e.passed)
    }

    /// Mean of the defined percent errors, and how many undefined ones were left out.
    pub fn mean_percent_error(&self) -> (Option<f64>, usize) {
        let defined: Vec<f64> = self.entries.iter().filter_map(|e| e.percent_error.value()).collect();
        let undefined = self.entries.len() - defined.len();
        if defined.is_empty() {
            (None, undefined)
        } else {
            (Some(defined.iter().sum::<f64>() / defined.len() as f64), undefined)
        }
    }
}

fn check_lengths(actual: usize, expected: usize) -> Result<(), VerifyErr> {
    if actual == 0 || expected == 0 {
        return Err(VerifyErr::EmptyInput);
    }
    if actual != expected {
        return Err(VerifyErr::LengthMismatch { actual, expected });
    }
    Ok(())
}

fn verdict_by(actual: &[f64], expected: &[f64], within: impl Fn(f64, f64) -> bool) -> Verdict {
    let entries: Vec<EntryVerdict> = actual
        .iter()
        .zip(expected)
        .map(|(&a, &e)| EntryVerdict {
            actual: a,
            expected: e,
            passed: within(a, e),
            percent_error: PercentError::between(a, e),
        })
        .collect();
    for (i, entry) in entries.iter().enumerate().filter(|(_, e)| !e.passed) {
        debug!(
            "Entry {i} out of tolerance: got {} want {} ({})",
            entry.actual, entry.expected, entry.percent_error
        );
    }
    Verdict { entries }
}

/// Compare each observed value against its expected value: entry `i` passes if
/// `|actual[i] - expected[i]| <= tolerance * expected[i]`.
///
/// ```
/// # use scale_core::distribution::{check_rates, PercentError, Tolerance};
/// let verdict = check_rates(&[90.0], &[100.0], Tolerance::new(0.05).unwrap()).unwrap();
/// assert_eq!(verdict.passes(), [false]);
/// assert_eq!(verdict.percent_errors(), [PercentError::Defined(10.0)]);
/// ```
pub fn check_rates(actual: &[f64], expected: &[f64], tolerance: Tolerance) -> Result<Verdict, VerifyErr> {
    check_lengths(actual.len(), expected.len())?;
    let tol = tolerance.value();
    Ok(verdict_by(actual, expected, |a, e| (a - e).abs() <= tol * e))
}

/// Allowed slack when checking that weight percentages add up to 100.
const WEIGHT_TOTAL_EPSILON: f64 = 1e-6;

/// The total of `weight_percents` if it is not 100.
fn off_hundred(weight_percents: &[f64]) -> Option<f64> {
    let total: f64 = weight_percents.iter().sum();
    ((total - 100.0).abs() > WEIGHT_TOTAL_EPSILON).then_some(total)
}

/// Compare observed values against weights given as percentages of the observed total.
///
/// Weights are meant to add up to 100. Other totals are accepted but logged.
pub fn check_rates_against_weights(
    actual: &[f64],
    weight_percents: &[f64],
    tolerance: Tolerance,
) -> Result<Verdict, VerifyErr> {
    check_lengths(actual.len(), weight_percents.len())?;
    if let Some((index, &weight)) = weight_percents
        .iter()
        .enumerate()
        .find(|(_, w)| !w.is_finite() || **w < 0.0)
    {
        return Err(VerifyErr::InvalidWeight { index, weight });
    }
    if let Some(weight_total) = off_hundred(weight_percents) {
        warn!("Weights sum to {weight_total}%, not 100%, expected rates will not add up to the observed total");
    }
    let total: f64 = actual.iter().sum();
    let expected: Vec<f64> = weight_percents.iter().map(|w| total * w / 100.0).collect();
    check_rates(actual, &expected, tolerance)
}

/// Check that every path carries an equal share of the observed total.
///
/// ```
/// # use scale_core::distribution::{check_equal_rates, Tolerance};
/// assert!(check_equal_rates(&[50.0, 50.0, 50.0], Tolerance::default()).unwrap().all_passed());
/// assert!(!check_equal_rates(&[10.0, 90.0], Tolerance::default()).unwrap().all_passed());
/// ```
pub fn check_equal_rates(actual: &[f64], tolerance: Tolerance) -> Result<Verdict, VerifyErr> {
    if actual.is_empty() {
        return Err(VerifyErr::EmptyInput);
    }
    let weights = vec![100.0 / actual.len() as f64; actual.len()];
    check_rates_against_weights(actual, &weights, tolerance)
}

/// Compare two distributions entry by entry with an absolute margin, `|actual[i] - expected[i]| <= margin`.
pub fn check_distribution(
    actual: &Distribution,
    expected: &Distribution,
    margin: Tolerance,
) -> Result<Verdict, VerifyErr> {
    check_lengths(actual.len(), expected.len())?;
    let margin = margin.value();
    Ok(verdict_by(actual.fractions(), expected.fractions(), |a, e| (a - e).abs() <= margin))
}

#[cfg(test)]
mod test {
    use crate::{
        distribution::{
            check_distribution, check_equal_rates, check_rates, check_rates_against_weights, normalize,
            normalize_counts, off_hundred, PercentError, Tolerance,
        },
        error::VerifyErr,
    };

    fn tol(v: f64) -> Tolerance {
        Tolerance::new(v).unwrap()
    }

    #[test]
    fn normalizes_counts() {
        let (dist, total) = normalize_counts(&[1, 2, 3, 4]);
        assert_eq!(total, 10);
        assert_eq!(dist.fractions(), &[0.1, 0.2, 0.3, 0.4]);
        let (dist, total) = normalize_counts(&[0, 0]);
        assert_eq!((dist.into_vec(), total), (vec![0.0, 0.0], 0));
        assert!(normalize(&[]).is_empty());
    }

    #[test]
    fn exact_match_passes_with_zero_error() {
        let verdict = check_rates(&[100.0], &[100.0], tol(0.01)).unwrap();
        assert_eq!(verdict.passes(), [true]);
        assert_eq!(verdict.percent_errors(), [PercentError::Defined(0.0)]);
        assert!(verdict.all_passed());
    }

    #[test]
    fn tolerance_boundary_is_inclusive() {
        let verdict = check_rates(&[95.0, 105.0, 94.0], &[100.0, 100.0, 100.0], tol(0.05)).unwrap();
        assert_eq!(verdict.passes(), [true, true, false]);
        assert_eq!(verdict.failures().map(|(i, _)| i).collect::<Vec<_>>(), [2]);
    }

    #[test]
    fn zero_expected_values() {
        let verdict = check_rates(&[0.0, 5.0], &[0.0, 0.0], tol(0.01)).unwrap();
        assert_eq!(verdict.passes(), [true, false]);
        assert_eq!(verdict.percent_errors(), [PercentError::Defined(0.0), PercentError::Undefined]);
        assert_eq!(verdict.percent_errors()[1].to_string(), "undefined");
        // The undefined entry is skipped, not averaged in
        assert_eq!(verdict.mean_percent_error(), (Some(0.0), 1));
    }

    #[test]
    fn negative_rates_fail() {
        let verdict = check_equal_rates(&[-1000.0, 1000.0, 1000.0], tol(0.1)).unwrap();
        assert!(!verdict.all_passed());
    }

    #[test]
    fn equal_rates() {
        let verdict = check_equal_rates(&[50.0, 50.0, 50.0], Tolerance::default()).unwrap();
        assert!(verdict.all_passed());
        for err in verdict.percent_errors() {
            assert!(err.value().unwrap() < 1e-9);
        }

        let verdict = check_equal_rates(&[10.0, 90.0], Tolerance::default()).unwrap();
        assert_eq!(verdict.passes(), [false, false]);
        assert_eq!(verdict.percent_errors(), [PercentError::Defined(80.0), PercentError::Defined(80.0)]);
    }

    #[test]
    fn weighted_rates() {
        // 20/40/40 split of a total of 1000
        let verdict = check_rates_against_weights(&[205.0, 395.0, 400.0], &[20.0, 40.0, 40.0], tol(0.03)).unwrap();
        assert!(verdict.all_passed());
        assert_eq!(verdict.entries()[0].expected, 200.0);
        let verdict = check_rates_against_weights(&[300.0, 300.0, 400.0], &[20.0, 40.0, 40.0], tol(0.03)).unwrap();
        assert_eq!(verdict.passes(), [false, false, true]);
    }

    #[test]
    fn weight_totals_other_than_100_are_flagged() {
        assert_eq!(off_hundred(&[20.0, 40.0, 40.0]), None);
        assert_eq!(off_hundred(&[100.0 / 3.0; 3]), None);
        assert_eq!(off_hundred(&[100.0 / 7.0; 7]), None);
        assert_eq!(off_hundred(&[50.0, 60.0]), Some(110.0));
        assert_eq!(off_hundred(&[1.0, 1.0]), Some(2.0));

        // Still checked against the observed total
        let verdict = check_rates_against_weights(&[100.0, 100.0], &[50.0, 60.0], tol(0.01)).unwrap();
        assert_eq!(verdict.entries()[1].expected, 120.0);
        assert_eq!(verdict.passes(), [true, false]);
    }

    #[test]
    fn configuration_errors() {
        assert_eq!(check_rates(&[], &[], tol(0.01)), Err(VerifyErr::EmptyInput));
        assert_eq!(check_equal_rates(&[], tol(0.01)), Err(VerifyErr::EmptyInput));
        assert_eq!(
            check_rates(&[1.0, 2.0], &[1.0], tol(0.01)),
            Err(VerifyErr::LengthMismatch { actual: 2, expected: 1 })
        );
        assert_eq!(
            check_rates_against_weights(&[1.0, 2.0], &[50.0, -50.0], tol(0.01)),
            Err(VerifyErr::InvalidWeight { index: 1, weight: -50.0 })
        );
        assert_eq!(Tolerance::new(-0.1), Err(VerifyErr::InvalidTolerance(-0.1)));
        assert_eq!(Tolerance::try_from(0.5), Ok(tol(0.5)));
    }

    #[test]
    fn distributions_with_absolute_margin() {
        let got = normalize(&[330.0, 340.0, 330.0]);
        let want = normalize(&[1.0, 1.0, 1.0]);
        assert!(check_distribution(&got, &want, tol(0.01)).unwrap().all_passed());
        let got = normalize(&[200.0, 400.0, 400.0]);
        assert_eq!(check_distribution(&got, &want, tol(0.1)).unwrap().passes(), [false, true, true]);
    }
}
