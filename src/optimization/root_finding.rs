//! Bracketed scalar root finding.
//!
//! Brent's method combines bisection, secant and inverse quadratic
//! interpolation. It keeps a sign-changing bracket at every step, so it
//! converges for any continuous function whose endpoint values differ in
//! sign, and usually does so superlinearly.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stopping rules for [`brent`].
///
/// The bracket is accepted once its half-width falls below
/// `(xtol + rtol * |x|) / 2`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrentSettings {
    pub xtol: f64,
    pub rtol: f64,
    pub max_iterations: usize,
}

impl Default for BrentSettings {
    fn default() -> Self {
        Self {
            xtol: 2e-12,
            rtol: 4.0 * f64::EPSILON,
            max_iterations: 100,
        }
    }
}

/// A converged root.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RootEstimate {
    pub root: f64,
    /// Function value at `root`.
    pub value: f64,
    pub iterations: usize,
    pub evaluations: usize,
}

#[derive(Debug, Error)]
pub enum RootFindError<E> {
    #[error(
        "no sign change on [{lower}, {upper}]: f(lower) = {f_lower}, f(upper) = {f_upper}"
    )]
    NoSignChange {
        lower: f64,
        upper: f64,
        f_lower: f64,
        f_upper: f64,
    },

    #[error("function is not a number at x = {x}")]
    NotANumber { x: f64 },

    #[error("no convergence after {iterations} iterations (last x = {last})")]
    NotConverged { iterations: usize, last: f64 },

    #[error("function evaluation failed: {0}")]
    Evaluation(E),
}

fn evaluate<F, E>(f: &mut F, x: f64, evaluations: &mut usize) -> Result<f64, RootFindError<E>>
where
    F: FnMut(f64) -> Result<f64, E>,
{
    *evaluations += 1;
    let value = f(x).map_err(RootFindError::Evaluation)?;
    if value.is_nan() {
        return Err(RootFindError::NotANumber { x });
    }
    Ok(value)
}

/// Find a root of `f` inside `[lower, upper]`.
///
/// `f(lower)` and `f(upper)` must differ in sign; an exact zero at either
/// endpoint is returned immediately. Infinite function values are allowed
/// and carry their sign; interpolation is skipped whenever it would involve
/// them.
///
/// # Examples
///
/// ```
/// use olg_equilibrium::optimization::root_finding::{brent, BrentSettings};
/// use std::convert::Infallible;
///
/// let root = brent(
///     |x| Ok::<_, Infallible>(x * x - 2.0),
///     0.0,
///     2.0,
///     &BrentSettings::default(),
/// )
/// .unwrap();
/// assert!((root.root - 2f64.sqrt()).abs() < 1e-11);
/// ```
pub fn brent<F, E>(
    mut f: F,
    lower: f64,
    upper: f64,
    settings: &BrentSettings,
) -> Result<RootEstimate, RootFindError<E>>
where
    F: FnMut(f64) -> Result<f64, E>,
{
    let mut evaluations = 0;
    let mut xpre = lower;
    let mut xcur = upper;
    let mut fpre = evaluate(&mut f, xpre, &mut evaluations)?;
    let mut fcur = evaluate(&mut f, xcur, &mut evaluations)?;

    if fpre == 0.0 {
        return Ok(RootEstimate {
            root: xpre,
            value: fpre,
            iterations: 0,
            evaluations,
        });
    }
    if fcur == 0.0 {
        return Ok(RootEstimate {
            root: xcur,
            value: fcur,
            iterations: 0,
            evaluations,
        });
    }
    if fpre.signum() == fcur.signum() {
        return Err(RootFindError::NoSignChange {
            lower,
            upper,
            f_lower: fpre,
            f_upper: fcur,
        });
    }

    // Contrapoint: opposite sign to xcur
    let mut xblk = xpre;
    let mut fblk = fpre;
    let mut spre = 0.0;
    let mut scur = 0.0;

    for iteration in 1..=settings.max_iterations {
        if fpre != 0.0 && fcur != 0.0 && fpre.signum() != fcur.signum() {
            xblk = xpre;
            fblk = fpre;
            spre = xcur - xpre;
            scur = spre;
        }
        if fblk.abs() < fcur.abs() {
            xpre = xcur;
            xcur = xblk;
            xblk = xpre;
            fpre = fcur;
            fcur = fblk;
            fblk = fpre;
        }

        let tol = (settings.xtol + settings.rtol * xcur.abs()) / 2.0;
        let sbis = (xblk - xcur) / 2.0;
        if fcur == 0.0 || sbis.abs() < tol {
            return Ok(RootEstimate {
                root: xcur,
                value: fcur,
                iterations: iteration,
                evaluations,
            });
        }

        let interpolate =
            spre.abs() > tol && fcur.abs() < fpre.abs() && fpre.is_finite() && fblk.is_finite();
        let step = if interpolate {
            let stry = if xpre == xblk {
                // secant
                -fcur * (xcur - xpre) / (fcur - fpre)
            } else {
                // inverse quadratic interpolation
                let dpre = (fpre - fcur) / (xpre - xcur);
                let dblk = (fblk - fcur) / (xblk - xcur);
                -fcur * (fblk * dblk - fpre * dpre) / (dblk * dpre * (fblk - fpre))
            };
            if stry.is_finite() && 2.0 * stry.abs() < spre.abs().min(3.0 * sbis.abs() - tol) {
                Some(stry)
            } else {
                None
            }
        } else {
            None
        };

        match step {
            Some(stry) => {
                spre = scur;
                scur = stry;
            }
            None => {
                spre = sbis;
                scur = sbis;
            }
        }

        xpre = xcur;
        fpre = fcur;
        if scur.abs() > tol {
            xcur += scur;
        } else {
            xcur += if sbis > 0.0 { tol } else { -tol };
        }
        fcur = evaluate(&mut f, xcur, &mut evaluations)?;
    }

    Err(RootFindError::NotConverged {
        iterations: settings.max_iterations,
        last: xcur,
    })
}
