use thiserror::Error;

/// Invalid model inputs, rejected when a model component is constructed.
///
/// Every numeric parameter of the economy is checked up front so that bad
/// inputs never surface later as a NaN inside the optimizer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("{field} endowment must be positive and finite, got {value}")]
    InvalidEndowment { field: &'static str, value: f64 },

    #[error("population share for {agent} must be non-negative and finite, got {share}")]
    InvalidShare { agent: String, share: f64 },

    #[error("population shares must sum to 1, got {sum}")]
    SharesDoNotSumToOne { sum: f64 },

    #[error("population must contain at least one agent type")]
    EmptyPopulation,

    #[error("growth rate must be finite and greater than -1, got {0}")]
    InvalidGrowthRate(f64),

    #[error("total factor productivity must be positive and finite, got {0}")]
    InvalidProductivity(f64),

    #[error("capital share must lie strictly between 0 and 1, got {0}")]
    CapitalShareOutOfRange(f64),

    #[error("depreciation rate must be non-negative and finite, got {0}")]
    InvalidDepreciation(f64),

    #[error("{field} tax rate must lie in [0, 1), got {value}")]
    TaxRateOutOfRange { field: &'static str, value: f64 },

    #[error("government consumption must be non-negative and finite, got {0}")]
    InvalidGovernmentConsumption(f64),

    #[error("transfer payment must be non-negative and finite, got {0}")]
    InvalidTransfer(f64),

    #[error("discount factor must be positive and finite, got {0}")]
    InvalidDiscountFactor(f64),

    #[error("relative risk aversion must be positive and finite, got {0}")]
    InvalidRiskAversion(f64),

    #[error("gross interest rate must be positive and finite, got {0}")]
    InvalidInterestRate(f64),

    #[error("invalid bracket [{r_min}, {r_max}]: need 0 < r_min < r_max")]
    InvalidBracket { r_min: f64, r_max: f64 },
}

pub(crate) fn check_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

pub(crate) fn check_non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

/// Validate a gross interest rate `R = 1 + r`.
pub fn validate_gross_rate(rate: f64) -> Result<(), ModelError> {
    if check_positive(rate) {
        Ok(())
    } else {
        Err(ModelError::InvalidInterestRate(rate))
    }
}

/// Validate a net growth rate `g`; the endowment scaling factor is `1 + g`.
pub fn validate_growth_rate(g: f64) -> Result<(), ModelError> {
    if g.is_finite() && g > -1.0 {
        Ok(())
    } else {
        Err(ModelError::InvalidGrowthRate(g))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gross_rate_validation() {
        assert!(validate_gross_rate(1.05).is_ok());
        assert_eq!(
            validate_gross_rate(0.0),
            Err(ModelError::InvalidInterestRate(0.0))
        );
        assert!(validate_gross_rate(-1.0).is_err());
        assert!(validate_gross_rate(f64::NAN).is_err());
        assert!(validate_gross_rate(f64::INFINITY).is_err());
    }

    #[test]
    fn test_growth_rate_validation() {
        assert!(validate_growth_rate(0.0).is_ok());
        assert!(validate_growth_rate(-0.5).is_ok());
        assert!(validate_growth_rate(-1.0).is_err());
    }

    #[test]
    fn test_error_messages() {
        let err = ModelError::SharesDoNotSumToOne { sum: 0.75 };
        assert_eq!(err.to_string(), "population shares must sum to 1, got 0.75");
    }
}
