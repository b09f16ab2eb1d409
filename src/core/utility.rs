use crate::core::error::{check_positive, ModelError};

/// Lifetime utility over a (young, old) consumption pair.
///
/// Implementations must be strictly increasing in both arguments on the
/// feasible domain `c_young > 0, c_old > 0`. Values outside that domain
/// are never requested by the solver.
///
/// Any thread-safe closure `Fn(f64, f64) -> f64` is a utility function:
///
/// ```
/// use olg_equilibrium::core::utility::UtilityFunction;
///
/// let beta = 0.96;
/// let u = move |c_y: f64, c_o: f64| c_y.ln() + beta * c_o.ln();
/// assert!(u.evaluate(2.0, 2.0) > u.evaluate(1.0, 2.0));
/// ```
pub trait UtilityFunction: Send + Sync {
    fn evaluate(&self, c_young: f64, c_old: f64) -> f64;
}

impl<F> UtilityFunction for F
where
    F: Fn(f64, f64) -> f64 + Send + Sync,
{
    fn evaluate(&self, c_young: f64, c_old: f64) -> f64 {
        self(c_young, c_old)
    }
}

/// Time-separable log utility: `ln(c_y) + beta * ln(c_o)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogUtility {
    beta: f64,
}

impl LogUtility {
    pub fn new(beta: f64) -> Result<Self, ModelError> {
        if !check_positive(beta) {
            return Err(ModelError::InvalidDiscountFactor(beta));
        }
        Ok(Self { beta })
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }
}

impl UtilityFunction for LogUtility {
    fn evaluate(&self, c_young: f64, c_old: f64) -> f64 {
        c_young.ln() + self.beta * c_old.ln()
    }
}

/// Constant relative risk aversion utility.
///
/// `u(c) = c^(1 - sigma) / (1 - sigma)` per period, discounted by `beta`.
/// The intertemporal elasticity of substitution is `1 / sigma`; `sigma == 1`
/// is the log limit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrraUtility {
    beta: f64,
    sigma: f64,
}

impl CrraUtility {
    pub fn new(beta: f64, sigma: f64) -> Result<Self, ModelError> {
        if !check_positive(beta) {
            return Err(ModelError::InvalidDiscountFactor(beta));
        }
        if !check_positive(sigma) {
            return Err(ModelError::InvalidRiskAversion(sigma));
        }
        Ok(Self { beta, sigma })
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Intertemporal elasticity of substitution.
    pub fn elasticity(&self) -> f64 {
        1.0 / self.sigma
    }

    fn period(&self, c: f64) -> f64 {
        if self.sigma == 1.0 {
            c.ln()
        } else {
            let exponent = 1.0 - self.sigma;
            c.powf(exponent) / exponent
        }
    }
}

impl UtilityFunction for CrraUtility {
    fn evaluate(&self, c_young: f64, c_old: f64) -> f64 {
        self.period(c_young) + self.beta * self.period(c_old)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_log_utility_value() {
        let u = LogUtility::new(0.96).unwrap();
        assert_relative_eq!(u.evaluate(1.0, 1.0), 0.0);
        assert_relative_eq!(u.evaluate(std::f64::consts::E, 1.0), 1.0);
        assert_relative_eq!(u.evaluate(1.0, std::f64::consts::E), 0.96);
    }

    #[test]
    fn test_crra_matches_log_at_unit_sigma() {
        let crra = CrraUtility::new(0.96, 1.0).unwrap();
        let log = LogUtility::new(0.96).unwrap();
        assert_relative_eq!(crra.evaluate(3.0, 7.0), log.evaluate(3.0, 7.0));
    }

    #[test]
    fn test_crra_is_increasing() {
        for sigma in [0.5, 2.0, 4.0] {
            let u = CrraUtility::new(0.96, sigma).unwrap();
            assert!(u.evaluate(2.0, 3.0) > u.evaluate(1.5, 3.0));
            assert!(u.evaluate(2.0, 3.0) > u.evaluate(2.0, 2.5));
        }
    }

    #[test]
    fn test_crra_elasticity() {
        let u = CrraUtility::new(0.96, 4.0).unwrap();
        assert_relative_eq!(u.elasticity(), 0.25);
    }

    #[test]
    fn test_invalid_parameters() {
        assert_eq!(
            LogUtility::new(0.0),
            Err(ModelError::InvalidDiscountFactor(0.0))
        );
        assert_eq!(
            CrraUtility::new(0.96, -2.0),
            Err(ModelError::InvalidRiskAversion(-2.0))
        );
    }

    #[test]
    fn test_closure_is_utility() {
        let u = |c_y: f64, c_o: f64| c_y.sqrt() + c_o.sqrt();
        assert_relative_eq!(u.evaluate(4.0, 9.0), 5.0);
    }
}
