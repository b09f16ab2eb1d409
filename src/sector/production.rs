use crate::core::error::{check_non_negative, check_positive, ModelError};
use serde::{Deserialize, Serialize};

/// Cobb-Douglas production technology: `Y = A * K^alpha * L^(1 - alpha)`.
///
/// The firm's problem has a closed form, so no numerical optimization is
/// needed: the first-order condition for capital pins down the
/// capital/labor ratio at a given rental cost, and labor is normalized to
/// one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProductionTechnology {
    /// Total factor productivity `A`.
    tfp: f64,
    /// Output elasticity of capital `alpha`.
    capital_share: f64,
    /// Depreciation rate `delta`.
    depreciation: f64,
}

/// The firm's optimal choices at given prices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FirmDecision {
    /// Rental cost of capital, `r + delta`.
    pub user_cost: f64,
    /// Equilibrium wage: marginal product of labor.
    pub wage: f64,
    pub capital_demand: f64,
    pub labor_demand: f64,
    pub output: f64,
    pub profit: f64,
}

impl FirmDecision {
    /// Capital is free or subsidized; demand is unbounded.
    fn unbounded(user_cost: f64) -> Self {
        Self {
            user_cost,
            wage: f64::INFINITY,
            capital_demand: f64::INFINITY,
            labor_demand: 1.0,
            output: f64::INFINITY,
            profit: f64::NAN,
        }
    }

    /// True when the rental cost is non-positive and capital demand has no
    /// finite solution.
    pub fn is_unbounded(&self) -> bool {
        self.capital_demand.is_infinite()
    }
}

impl ProductionTechnology {
    pub fn new(tfp: f64, capital_share: f64, depreciation: f64) -> Result<Self, ModelError> {
        if !check_positive(tfp) {
            return Err(ModelError::InvalidProductivity(tfp));
        }
        if !(capital_share > 0.0 && capital_share < 1.0) {
            return Err(ModelError::CapitalShareOutOfRange(capital_share));
        }
        if !check_non_negative(depreciation) {
            return Err(ModelError::InvalidDepreciation(depreciation));
        }
        Ok(Self {
            tfp,
            capital_share,
            depreciation,
        })
    }

    pub fn tfp(&self) -> f64 {
        self.tfp
    }

    pub fn capital_share(&self) -> f64 {
        self.capital_share
    }

    pub fn depreciation(&self) -> f64 {
        self.depreciation
    }

    /// Solve the firm's profit maximization at net interest rate `r`.
    ///
    /// If `r + delta <= 0` the demand for capital is unbounded and the
    /// returned decision carries infinite capital, output and wage.
    pub fn solve(&self, net_rate: f64) -> FirmDecision {
        let user_cost = net_rate + self.depreciation;
        if user_cost <= 0.0 {
            return FirmDecision::unbounded(user_cost);
        }

        let alpha = self.capital_share;
        // MPK = r + delta
        let capital_labor_ratio = (self.tfp * alpha / user_cost).powf(1.0 / (1.0 - alpha));

        let labor_demand = 1.0;
        let capital_demand = capital_labor_ratio * labor_demand;
        let output = self.tfp * capital_demand.powf(alpha) * labor_demand.powf(1.0 - alpha);
        let wage = (1.0 - alpha) * self.tfp * capital_labor_ratio.powf(alpha);
        let profit = output - user_cost * capital_demand - wage * labor_demand;

        FirmDecision {
            user_cost,
            wage,
            capital_demand,
            labor_demand,
            output,
            profit,
        }
    }
}
