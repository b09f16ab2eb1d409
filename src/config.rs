//! JSON model configuration.
//!
//! A [`ModelConfig`] describes the two-type baseline economy: a saver and a
//! borrower sharing one set of preferences, with optional firm and
//! government sections. Every field has a default, so `{}` is the baseline
//! pure-exchange economy.

use crate::core::agent::Agent;
use crate::core::error::ModelError;
use crate::core::population::Population;
use crate::core::utility::{CrraUtility, LogUtility, UtilityFunction};
use crate::market::economy::{
    AgentFailurePolicy, Economy, PRODUCTION_BRACKET, PURE_EXCHANGE_BRACKET,
};
use crate::optimization::agent_solver::OptimizerSettings;
use crate::sector::fiscal::FiscalPolicy;
use crate::sector::production::ProductionTechnology;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config from {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid model: {0}")]
    Model(#[from] ModelError),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EndowmentConfig {
    pub young: f64,
    pub old: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EndowmentsConfig {
    #[serde(default = "default_saver")]
    pub saver: EndowmentConfig,
    #[serde(default = "default_borrower")]
    pub borrower: EndowmentConfig,
}

impl Default for EndowmentsConfig {
    fn default() -> Self {
        Self {
            saver: default_saver(),
            borrower: default_borrower(),
        }
    }
}

fn default_saver() -> EndowmentConfig {
    EndowmentConfig {
        young: 10.0,
        old: 3.0,
    }
}

fn default_borrower() -> EndowmentConfig {
    EndowmentConfig {
        young: 3.0,
        old: 10.0,
    }
}

/// Cobb-Douglas firm parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FirmConfig {
    #[serde(rename = "A", default = "default_tfp")]
    pub tfp: f64,
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    #[serde(default = "default_delta")]
    pub delta: f64,
}

impl Default for FirmConfig {
    fn default() -> Self {
        Self {
            tfp: default_tfp(),
            alpha: default_alpha(),
            delta: default_delta(),
        }
    }
}

fn default_tfp() -> f64 {
    1.0
}

fn default_alpha() -> f64 {
    0.33
}

fn default_delta() -> f64 {
    0.05
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GovernmentConfig {
    #[serde(default)]
    pub tax_rate_young: f64,
    #[serde(default)]
    pub tax_rate_old: f64,
    #[serde(rename = "G", default)]
    pub government_consumption: f64,
    /// Ignored when `balanced_budget` is set.
    #[serde(default)]
    pub transfer_payment: f64,
    /// Pay the whole surplus of revenue over `G` to the old as a pension.
    #[serde(default)]
    pub balanced_budget: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub beta: f64,
    /// CRRA coefficient; log utility when absent.
    pub sigma: Option<f64>,
    /// Population share of the saver type.
    pub phi: f64,
    pub g: f64,
    pub endowments: EndowmentsConfig,
    pub firm: Option<FirmConfig>,
    pub government: Option<GovernmentConfig>,
    pub bracket: Option<[f64; 2]>,
    pub failure_policy: AgentFailurePolicy,
    pub optimizer: OptimizerSettings,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            beta: 0.96,
            sigma: None,
            phi: 0.5,
            g: 0.02,
            endowments: EndowmentsConfig::default(),
            firm: None,
            government: None,
            bracket: None,
            failure_policy: AgentFailurePolicy::default(),
            optimizer: OptimizerSettings::default(),
        }
    }
}

impl ModelConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load config from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build the economy described by this config, validating every
    /// parameter.
    pub fn build_economy(&self) -> Result<Economy, ConfigError> {
        let utility: Arc<dyn UtilityFunction> = match self.sigma {
            Some(sigma) => Arc::new(CrraUtility::new(self.beta, sigma)?),
            None => Arc::new(LogUtility::new(self.beta)?),
        };

        let saver = Agent::new(
            "saver",
            utility.clone(),
            self.endowments.saver.young,
            self.endowments.saver.old,
        )?;
        let borrower = Agent::new(
            "borrower",
            utility,
            self.endowments.borrower.young,
            self.endowments.borrower.old,
        )?;
        let population = Population::two_type(saver, borrower, self.phi)?;

        let fiscal = match &self.government {
            Some(gov) if gov.balanced_budget => Some(FiscalPolicy::balanced_budget(
                gov.tax_rate_young,
                gov.tax_rate_old,
                gov.government_consumption,
                &population,
            )?),
            Some(gov) => Some(FiscalPolicy::new(
                gov.tax_rate_young,
                gov.tax_rate_old,
                gov.government_consumption,
                gov.transfer_payment,
            )?),
            None => None,
        };

        let mut economy = Economy::new(population, self.g)?
            .with_failure_policy(self.failure_policy)
            .with_optimizer_settings(self.optimizer);
        if let Some(firm) = &self.firm {
            economy =
                economy.with_technology(ProductionTechnology::new(firm.tfp, firm.alpha, firm.delta)?);
        }
        if let Some(fiscal) = fiscal {
            economy = economy.with_fiscal_policy(fiscal);
        }
        Ok(economy)
    }

    /// Configured search bracket, or the default for this economy type.
    pub fn bracket(&self) -> (f64, f64) {
        match (self.bracket, self.firm) {
            (Some([r_min, r_max]), _) => (r_min, r_max),
            (None, Some(_)) => PRODUCTION_BRACKET,
            (None, None) => PURE_EXCHANGE_BRACKET,
        }
    }
}
