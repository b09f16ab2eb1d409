use crate::core::error::{check_non_negative, ModelError};
use crate::core::population::{AggregateEndowments, Population};
use serde::Serialize;

/// Linear tax-and-transfer rule of the government.
///
/// Endowments are taxed proportionally in each period of life, the
/// government buys `government_consumption`, and every old agent receives
/// the lump-sum `transfer_payment`. The default policy is a no-op.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FiscalPolicy {
    tax_rate_young: f64,
    tax_rate_old: f64,
    government_consumption: f64,
    transfer_payment: f64,
}

impl FiscalPolicy {
    pub fn new(
        tax_rate_young: f64,
        tax_rate_old: f64,
        government_consumption: f64,
        transfer_payment: f64,
    ) -> Result<Self, ModelError> {
        validate_tax_rate("young", tax_rate_young)?;
        validate_tax_rate("old", tax_rate_old)?;
        if !check_non_negative(government_consumption) {
            return Err(ModelError::InvalidGovernmentConsumption(
                government_consumption,
            ));
        }
        if !check_non_negative(transfer_payment) {
            return Err(ModelError::InvalidTransfer(transfer_payment));
        }
        Ok(Self {
            tax_rate_young,
            tax_rate_old,
            government_consumption,
            transfer_payment,
        })
    }

    /// A tax on the young only, with no spending and no transfers.
    pub fn youth_tax(tax_rate_young: f64) -> Result<Self, ModelError> {
        Self::new(tax_rate_young, 0.0, 0.0, 0.0)
    }

    /// Balanced-budget rule: whatever revenue is left after government
    /// consumption is paid out to the old as a lump-sum transfer.
    ///
    /// With only a tax on the young this is a pay-as-you-go pension. Revenue
    /// is computed from the population's aggregate endowments, so public
    /// savings are zero as long as every agent's problem solves.
    pub fn balanced_budget(
        tax_rate_young: f64,
        tax_rate_old: f64,
        government_consumption: f64,
        population: &Population,
    ) -> Result<Self, ModelError> {
        let unfunded = Self::new(tax_rate_young, tax_rate_old, government_consumption, 0.0)?;
        let revenue = unfunded.tax_revenue(population.aggregate_endowments());
        Self::new(
            tax_rate_young,
            tax_rate_old,
            government_consumption,
            revenue - government_consumption,
        )
    }

    pub fn tax_rate_young(&self) -> f64 {
        self.tax_rate_young
    }

    pub fn tax_rate_old(&self) -> f64 {
        self.tax_rate_old
    }

    pub fn government_consumption(&self) -> f64 {
        self.government_consumption
    }

    pub fn transfer_payment(&self) -> f64 {
        self.transfer_payment
    }

    /// After-tax young-period income.
    pub fn net_young(&self, endowment_young: f64) -> f64 {
        endowment_young * (1.0 - self.tax_rate_young)
    }

    /// After-tax old-period income plus transfer, before growth scaling.
    pub fn net_old(&self, endowment_old: f64) -> f64 {
        endowment_old * (1.0 - self.tax_rate_old) + self.transfer_payment
    }

    /// Tax revenue levied on share-weighted gross endowments.
    pub fn tax_revenue(&self, endowments: AggregateEndowments) -> f64 {
        self.tax_rate_young * endowments.young + self.tax_rate_old * endowments.old
    }

    /// Government surplus: revenue minus spending and transfers.
    pub fn public_savings(&self, tax_revenue: f64) -> f64 {
        tax_revenue - self.government_consumption - self.transfer_payment
    }

    pub fn is_neutral(&self) -> bool {
        *self == Self::default()
    }
}

fn validate_tax_rate(field: &'static str, value: f64) -> Result<(), ModelError> {
    if value.is_finite() && (0.0..1.0).contains(&value) {
        Ok(())
    } else {
        Err(ModelError::TaxRateOutOfRange { field, value })
    }
}
