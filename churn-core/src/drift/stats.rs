//! Statistical tests used by drift detection.
//!
//! - Two-sample Kolmogorov-Smirnov (numeric columns)
//! - Chi-square test of homogeneity (categorical columns)
//! - Binomial test on the drifted-column count (dataset level)

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use statrs::distribution::{Binomial, ChiSquared, ContinuousCDF, DiscreteCDF};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub statistic: f64,
    pub p_value: f64,
}

impl TestResult {
    /// No evidence of any difference.
    pub const NO_DIFFERENCE: TestResult = TestResult { statistic: 0.0, p_value: 1.0 };
}

// ============================================================================
// KOLMOGOROV-SMIRNOV
// ============================================================================

/// Two-sample KS test with the asymptotic Kolmogorov p-value.
pub fn ks_two_sample(reference: &[f64], current: &[f64]) -> TestResult {
    if reference.is_empty() || current.is_empty() {
        return TestResult::NO_DIFFERENCE;
    }

    let mut a = reference.to_vec();
    let mut b = current.to_vec();
    a.sort_by(f64::total_cmp);
    b.sort_by(f64::total_cmp);

    let (n1, n2) = (a.len() as f64, b.len() as f64);
    let (mut i, mut j) = (0, 0);
    let mut d: f64 = 0.0;

    while i < a.len() && j < b.len() {
        let x = a[i].min(b[j]);
        // Step past every copy of x in both samples before comparing CDFs
        while i < a.len() && a[i] <= x {
            i += 1;
        }
        while j < b.len() && b[j] <= x {
            j += 1;
        }
        d = d.max((i as f64 / n1 - j as f64 / n2).abs());
    }

    let en = (n1 * n2 / (n1 + n2)).sqrt();
    let lambda = (en + 0.12 + 0.11 / en) * d;

    TestResult { statistic: d, p_value: kolmogorov_sf(lambda) }
}

/// `P(K > lambda)` for the Kolmogorov distribution.
fn kolmogorov_sf(lambda: f64) -> f64 {
    const EPS1: f64 = 1e-6;
    const EPS2: f64 = 1e-16;

    let a2 = -2.0 * lambda * lambda;
    let mut sign = 2.0;
    let mut sum = 0.0;
    let mut previous: f64 = 0.0;

    for j in 1..=100 {
        let term = sign * (a2 * (j * j) as f64).exp();
        sum += term;
        if term.abs() <= EPS1 * previous || term.abs() <= EPS2 * sum {
            return sum.clamp(0.0, 1.0);
        }
        sign = -sign;
        previous = term.abs();
    }

    // Series does not converge for tiny lambda: no detectable difference
    1.0
}

// ============================================================================
// CHI-SQUARE
// ============================================================================

/// Chi-square test of homogeneity over a 2 x k contingency table of
/// reference vs current category counts.
pub fn chi_square_homogeneity(
    reference: &BTreeMap<String, usize>,
    current: &BTreeMap<String, usize>,
) -> TestResult {
    let n_ref: usize = reference.values().sum();
    let n_cur: usize = current.values().sum();
    if n_ref == 0 || n_cur == 0 {
        return TestResult::NO_DIFFERENCE;
    }

    let mut categories: Vec<&String> = reference.keys().chain(current.keys()).collect();
    categories.sort();
    categories.dedup();

    if categories.len() < 2 {
        return TestResult::NO_DIFFERENCE;
    }

    let total = (n_ref + n_cur) as f64;
    let mut statistic = 0.0;

    for category in &categories {
        let observed_ref = reference.get(*category).copied().unwrap_or(0) as f64;
        let observed_cur = current.get(*category).copied().unwrap_or(0) as f64;
        let column_total = observed_ref + observed_cur;

        for (observed, row_total) in [(observed_ref, n_ref), (observed_cur, n_cur)] {
            let expected = row_total as f64 * column_total / total;
            statistic += (observed - expected).powi(2) / expected;
        }
    }

    let df = (categories.len() - 1) as f64;
    TestResult { statistic, p_value: chi_square_sf(statistic, df) }
}

/// Survival function of the chi-square distribution.
pub fn chi_square_sf(statistic: f64, df: f64) -> f64 {
    if statistic.is_nan() || statistic <= 0.0 {
        return 1.0;
    }
    ChiSquared::new(df)
        .map(|dist| dist.sf(statistic).clamp(0.0, 1.0))
        .unwrap_or(1.0)
}

// ============================================================================
// DATASET
// ============================================================================

/// One-sided binomial test on the number of drifted columns: how likely is
/// seeing at least `drifted` of `columns` flagged when each is flagged with
/// probability `alpha` under no drift.
pub fn drifted_columns_test(drifted: usize, columns: usize, alpha: f64) -> TestResult {
    if drifted == 0 || columns == 0 {
        return TestResult::NO_DIFFERENCE;
    }

    let p_value = Binomial::new(alpha.clamp(0.0, 1.0), columns as u64)
        .map(|dist| dist.sf(drifted as u64 - 1).clamp(0.0, 1.0))
        .unwrap_or(1.0);

    TestResult { statistic: drifted as f64, p_value }
}
