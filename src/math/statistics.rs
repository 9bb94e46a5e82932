//! Two-sample comparisons of case and control changes
//!
//! Both tests report a two-sided p-value and an effect size. Welch's t-test
//! compares means without assuming equal variances; the Mann-Whitney U test
//! compares ranks and uses the normal approximation with tie correction.

use crate::io::error::{PipelineError, Result, computation_error};
use crate::math::probability::{two_sided_normal_p, two_sided_t_p};
use std::collections::BTreeMap;

/// Smallest sample size either test accepts
pub const MIN_SAMPLE_SIZE: usize = 2;

/// Which test produced an outcome
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TestMethod {
    /// Welch's unequal-variance t-test, effect size Cohen's d
    WelchT,
    /// Mann-Whitney U test, effect size rank-biserial correlation
    MannWhitneyU,
}

impl TestMethod {
    /// Metric prefix used when flattening outcomes
    pub const fn key(self) -> &'static str {
        match self {
            Self::WelchT => "welch_t",
            Self::MannWhitneyU => "mann_whitney_u",
        }
    }
}

/// Result of comparing the case sample with the control sample
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TestOutcome {
    /// Test that produced the outcome
    pub method: TestMethod,
    /// Test statistic (t, or U of the case sample)
    pub statistic: f64,
    /// Two-sided p-value
    pub p_value: f64,
    /// Effect size, positive when the case sample is larger
    pub effect_size: f64,
    /// Case sample size
    pub case_n: usize,
    /// Control sample size
    pub control_n: usize,
}

impl TestOutcome {
    /// Insert `<method>.statistic`, `.p_value` and `.effect_size` into `metrics`
    pub fn write_metrics(&self, metrics: &mut BTreeMap<String, f64>) {
        let prefix = self.method.key();
        metrics.insert(format!("{prefix}.statistic"), self.statistic);
        metrics.insert(format!("{prefix}.p_value"), self.p_value);
        metrics.insert(format!("{prefix}.effect_size"), self.effect_size);
    }
}

/// Arithmetic mean, `None` for an empty sample
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Unbiased sample variance, `None` below two values
pub fn variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let squares: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some(squares / (values.len() - 1) as f64)
}

fn check_sizes(test: &'static str, case: &[f64], control: &[f64]) -> Result<()> {
    let smallest = case.len().min(control.len());
    if smallest < MIN_SAMPLE_SIZE {
        return Err(PipelineError::InsufficientSamples {
            test,
            required: MIN_SAMPLE_SIZE,
            actual: smallest,
        });
    }
    if case.iter().chain(control).any(|v| !v.is_finite()) {
        return Err(computation_error(test, &"samples contain non-finite values"));
    }
    Ok(())
}

/// Welch's t-test of case against control
///
/// # Errors
///
/// Returns an error if:
/// - Either sample has fewer than two values or a non-finite value
/// - Both samples are constant but their means differ
pub fn welch_t_test(case: &[f64], control: &[f64]) -> Result<TestOutcome> {
    const TEST: &str = "welch_t_test";
    check_sizes(TEST, case, control)?;

    let (n1, n2) = (case.len() as f64, control.len() as f64);
    let (m1, m2) = match (mean(case), mean(control)) {
        (Some(m1), Some(m2)) => (m1, m2),
        _ => return Err(computation_error(TEST, &"empty sample")),
    };
    let (v1, v2) = match (variance(case), variance(control)) {
        (Some(v1), Some(v2)) => (v1, v2),
        _ => return Err(computation_error(TEST, &"variance undefined")),
    };

    let (se1, se2) = (v1 / n1, v2 / n2);
    let standard_error = (se1 + se2).sqrt();

    let pooled_sd = (((n1 - 1.0) * v1 + (n2 - 1.0) * v2) / (n1 + n2 - 2.0)).sqrt();

    if standard_error == 0.0 {
        if (m1 - m2).abs() > 0.0 {
            return Err(computation_error(
                TEST,
                &"both samples are constant with different means",
            ));
        }
        return Ok(TestOutcome {
            method: TestMethod::WelchT,
            statistic: 0.0,
            p_value: 1.0,
            effect_size: 0.0,
            case_n: case.len(),
            control_n: control.len(),
        });
    }

    let t = (m1 - m2) / standard_error;
    // Welch-Satterthwaite
    let df = (se1 + se2).powi(2) / (se1.powi(2) / (n1 - 1.0) + se2.powi(2) / (n2 - 1.0));
    let p_value = two_sided_t_p(t, df)?;
    let effect_size = if pooled_sd > 0.0 {
        (m1 - m2) / pooled_sd
    } else {
        0.0
    };

    Ok(TestOutcome {
        method: TestMethod::WelchT,
        statistic: t,
        p_value,
        effect_size,
        case_n: case.len(),
        control_n: control.len(),
    })
}

/// Average ranks (1-based) of `values`, ties share the mean of their ranks
///
/// Also returns the tie correction term `sum(t^3 - t)` over tie groups.
pub fn average_ranks(values: &[f64]) -> (Vec<f64>, f64) {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| {
        let x = values.get(a).copied().unwrap_or(f64::NAN);
        let y = values.get(b).copied().unwrap_or(f64::NAN);
        x.total_cmp(&y)
    });

    let mut ranks = vec![0.0; values.len()];
    let mut tie_term = 0.0;
    let mut start = 0;
    while start < order.len() {
        let value_at = |k: usize| {
            order.get(k).and_then(|&index| values.get(index)).copied()
        };
        let mut end = start + 1;
        while end < order.len() && value_at(end) == value_at(start) {
            end += 1;
        }

        let rank = (start + end + 1) as f64 / 2.0;
        for k in start..end {
            if let Some(slot) = order.get(k).and_then(|&index| ranks.get_mut(index)) {
                *slot = rank;
            }
        }
        let tied = (end - start) as f64;
        tie_term += tied.powi(3) - tied;
        start = end;
    }

    (ranks, tie_term)
}

/// Mann-Whitney U test of case against control
///
/// # Errors
///
/// Returns an error if either sample has fewer than two values or a non-finite
/// value
pub fn mann_whitney_u(case: &[f64], control: &[f64]) -> Result<TestOutcome> {
    const TEST: &str = "mann_whitney_u";
    check_sizes(TEST, case, control)?;

    let (n1, n2) = (case.len() as f64, control.len() as f64);
    let combined: Vec<f64> = case.iter().chain(control).copied().collect();
    let (ranks, tie_term) = average_ranks(&combined);

    let case_rank_sum: f64 = ranks.iter().take(case.len()).sum();
    let u = n1.mul_add(-(n1 + 1.0) / 2.0, case_rank_sum);

    let n = n1 + n2;
    let mean_u = n1 * n2 / 2.0;
    let variance_u = n1 * n2 / 12.0 * ((n + 1.0) - tie_term / (n * (n - 1.0)));

    let p_value = if variance_u > 0.0 {
        two_sided_normal_p((u - mean_u) / variance_u.sqrt())?
    } else {
        1.0
    };

    Ok(TestOutcome {
        method: TestMethod::MannWhitneyU,
        statistic: u,
        p_value,
        effect_size: 2.0 * u / (n1 * n2) - 1.0,
        case_n: case.len(),
        control_n: control.len(),
    })
}
