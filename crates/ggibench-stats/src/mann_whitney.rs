//! Two-sided Mann-Whitney U test.
//!
//! Matches the conventions of the usual scientific stacks: the statistic is
//! `U₁` of the first sample, the p-value is `min(1, 2·P(U ≥ max(U₁, U₂)))`.
//! The exact null distribution is used for tie-free data unless both groups
//! exceed 8 samples; otherwise the normal approximation with tie correction
//! and a 0.5 continuity correction.

use ggibench_common::config::MannWhitneyMethod;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::ranks::average_ranks;

/// Above this size in *both* groups `Auto` switches to the normal approximation.
const EXACT_MAX_GROUP: usize = 8;

/// Which computation produced a p-value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolvedMethod {
    Exact,
    Asymptotic,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MannWhitneyResult {
    /// U statistic of the first sample
    pub statistic: f64,
    /// Two-sided p-value
    pub p_value: f64,
    pub method: ResolvedMethod,
}

/// Test whether `x` and `y` come from the same distribution.
///
/// Returns `None` when the test is undefined: either sample is empty, or
/// every value is tied so the rank statistic has no variance.
pub fn mann_whitney_u(x: &[f64], y: &[f64], method: MannWhitneyMethod) -> Option<MannWhitneyResult> {
    let (n1, n2) = (x.len(), y.len());
    if n1 == 0 || n2 == 0 {
        return None;
    }

    let combined: Vec<f64> = x.iter().chain(y.iter()).copied().collect();
    let (ranks, tie_term) = average_ranks(&combined);

    let r1: f64 = ranks[..n1].iter().sum();
    let n1f = n1 as f64;
    let n2f = n2 as f64;
    let u1 = r1 - n1f * (n1f + 1.0) / 2.0;
    let u = u1.max(n1f * n2f - u1);

    let has_ties = tie_term > 0.0;
    let want_exact = match method {
        MannWhitneyMethod::Auto => n1 <= EXACT_MAX_GROUP || n2 <= EXACT_MAX_GROUP,
        MannWhitneyMethod::Exact => true,
        MannWhitneyMethod::Asymptotic => false,
    };

    if want_exact && !has_ties {
        if let Some(p) = exact_p_value(n1, n2, u) {
            return Some(MannWhitneyResult { statistic: u1, p_value: p, method: ResolvedMethod::Exact });
        }
        tracing::debug!(n1, n2, "exact U distribution overflowed, using normal approximation");
    }

    asymptotic_p_value(n1, n2, u, tie_term).map(|p| MannWhitneyResult {
        statistic: u1,
        p_value: p,
        method: ResolvedMethod::Asymptotic,
    })
}

/// Normal approximation with tie and continuity correction.
fn asymptotic_p_value(n1: usize, n2: usize, u: f64, tie_term: f64) -> Option<f64> {
    let n1 = n1 as f64;
    let n2 = n2 as f64;
    let n = n1 + n2;
    let mu = n1 * n2 / 2.0;
    let variance = n1 * n2 / 12.0 * ((n + 1.0) - tie_term / (n * (n - 1.0)));
    if !(variance > 0.0) || !variance.is_finite() {
        return None;
    }

    let z = (u - mu - 0.5) / variance.sqrt();
    let normal = Normal::new(0.0, 1.0).ok()?;
    Some((2.0 * normal.sf(z)).min(1.0))
}

/// Exact two-sided p-value for a tie-free sample.
///
/// `None` when the counts overflow `i128`.
fn exact_p_value(n1: usize, n2: usize, u: f64) -> Option<f64> {
    let freq = u_frequencies(n1.min(n2), n1.max(n2))?;
    let total: i128 = freq.iter().sum();
    let start = (u.round() as usize).min(freq.len());
    let upper: i128 = freq[start..].iter().sum();
    Some((2.0 * upper as f64 / total as f64).min(1.0))
}

/// Number of arrangements giving each value of U for group sizes `m ≤ k`.
///
/// These are the coefficients of the Gaussian binomial `[m + k choose m]_q`,
/// built as `Π_{i=1..m} (1 − q^{k+i}) / (1 − q^i)` in exact integer arithmetic.
fn u_frequencies(m: usize, k: usize) -> Option<Vec<i128>> {
    let mut poly: Vec<i128> = vec![1];
    for i in 1..=m {
        // × (1 − q^(k+i))
        let shift = k + i;
        let mut product = poly.clone();
        product.resize(poly.len() + shift, 0);
        for (j, &c) in poly.iter().enumerate() {
            product[j + shift] = product[j + shift].checked_sub(c)?;
        }

        // ÷ (1 − q^i), exact since every factor divides the running product
        let mut quotient = vec![0i128; product.len() - i];
        for j in 0..quotient.len() {
            let carried = if j >= i { quotient[j - i] } else { 0 };
            quotient[j] = product[j].checked_add(carried)?;
        }
        poly = quotient;
    }
    Some(poly)
}
