//! Two-sided tail probabilities of the reference distributions

use crate::io::error::{Result, computation_error};
use statrs::distribution::{ContinuousCDF, Normal, StudentsT};

/// Two-sided p-value of a standard normal statistic
///
/// # Errors
///
/// Returns an error if the statistic isn't finite
pub fn two_sided_normal_p(z: f64) -> Result<f64> {
    if !z.is_finite() {
        return Err(computation_error("normal tail", &format!("statistic {z}")));
    }
    let normal = Normal::new(0.0, 1.0).map_err(|e| computation_error("normal tail", &e))?;
    Ok((2.0 * normal.sf(z.abs())).min(1.0))
}

/// Two-sided p-value of a Student t statistic with `df` degrees of freedom
///
/// # Errors
///
/// Returns an error if the statistic isn't finite or `df` isn't positive
pub fn two_sided_t_p(t: f64, df: f64) -> Result<f64> {
    if !t.is_finite() {
        return Err(computation_error("t tail", &format!("statistic {t}")));
    }
    let dist = StudentsT::new(0.0, 1.0, df).map_err(|e| computation_error("t tail", &e))?;
    Ok((2.0 * dist.sf(t.abs())).min(1.0))
}
