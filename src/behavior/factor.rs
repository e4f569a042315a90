//! Weighted geometric mean of the behavioral multipliers

use log::debug;
use serde::{Deserialize, Serialize};

use super::BehavioralVariable;
use crate::error::{Result, SimulationError};

fn neutral() -> f64 {
    1.0
}

/// The nine behavioral multipliers, each defaulting to 1.0 (neutral)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BehavioralProfile {
    #[serde(default = "neutral")]
    pub income_expectation: f64,
    #[serde(default = "neutral")]
    pub interest_rate_expectation: f64,
    #[serde(default = "neutral")]
    pub inflation_expectation: f64,
    #[serde(default = "neutral")]
    pub time_preference: f64,
    /// Inverse: high literacy is a value below 1.0
    #[serde(default = "neutral")]
    pub financial_literacy: f64,
    #[serde(default = "neutral")]
    pub unemployment_risk: f64,
    #[serde(default = "neutral")]
    pub family_burden: f64,
    #[serde(default = "neutral")]
    pub health_expenses: f64,
    /// Inverse: a stable job is a value below 1.0
    #[serde(default = "neutral")]
    pub job_stability: f64,
}

impl Default for BehavioralProfile {
    fn default() -> Self {
        Self::neutral()
    }
}

impl BehavioralProfile {
    /// Every multiplier at 1.0
    pub fn neutral() -> Self {
        Self {
            income_expectation: 1.0,
            interest_rate_expectation: 1.0,
            inflation_expectation: 1.0,
            time_preference: 1.0,
            financial_literacy: 1.0,
            unemployment_risk: 1.0,
            family_burden: 1.0,
            health_expenses: 1.0,
            job_stability: 1.0,
        }
    }

    pub fn get(&self, variable: BehavioralVariable) -> f64 {
        match variable {
            BehavioralVariable::IncomeExpectation => self.income_expectation,
            BehavioralVariable::InterestRateExpectation => self.interest_rate_expectation,
            BehavioralVariable::InflationExpectation => self.inflation_expectation,
            BehavioralVariable::TimePreference => self.time_preference,
            BehavioralVariable::FinancialLiteracy => self.financial_literacy,
            BehavioralVariable::UnemploymentRisk => self.unemployment_risk,
            BehavioralVariable::FamilyBurden => self.family_burden,
            BehavioralVariable::HealthExpenses => self.health_expenses,
            BehavioralVariable::JobStability => self.job_stability,
        }
    }

    pub fn set(&mut self, variable: BehavioralVariable, value: f64) {
        let slot = match variable {
            BehavioralVariable::IncomeExpectation => &mut self.income_expectation,
            BehavioralVariable::InterestRateExpectation => &mut self.interest_rate_expectation,
            BehavioralVariable::InflationExpectation => &mut self.inflation_expectation,
            BehavioralVariable::TimePreference => &mut self.time_preference,
            BehavioralVariable::FinancialLiteracy => &mut self.financial_literacy,
            BehavioralVariable::UnemploymentRisk => &mut self.unemployment_risk,
            BehavioralVariable::FamilyBurden => &mut self.family_burden,
            BehavioralVariable::HealthExpenses => &mut self.health_expenses,
            BehavioralVariable::JobStability => &mut self.job_stability,
        };
        *slot = value;
    }

    /// Builder-style setter
    pub fn with(mut self, variable: BehavioralVariable, value: f64) -> Self {
        self.set(variable, value);
        self
    }

    /// Select a named preset level, e.g. `("family_burden", "single_parent")`
    pub fn with_preset(self, variable: BehavioralVariable, label: &str) -> Result<Self> {
        let value = variable.preset_value(label).ok_or_else(|| {
            SimulationError::invalid(
                "behavioral preset",
                format!("`{}` is not a level of {}", label, variable),
            )
        })?;
        Ok(self.with(variable, value))
    }

    /// (variable, multiplier) pairs in weighting order
    pub fn iter(&self) -> impl Iterator<Item = (BehavioralVariable, f64)> + '_ {
        BehavioralVariable::ALL.into_iter().map(move |v| (v, self.get(v)))
    }

    /// Reject non-positive or non-finite multipliers
    pub fn validate(&self) -> Result<()> {
        for (variable, value) in self.iter() {
            if !value.is_finite() || value <= 0.0 {
                return Err(SimulationError::invalid(
                    variable.key(),
                    format!("behavioral multiplier must be a positive number, got {}", value),
                ));
            }
        }
        Ok(())
    }
}

/// Scalar that divides the savings inflow of the ODE model.
/// 1.0 is neutral; below 1.0 amplifies savings, above 1.0 dampens them.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdjustmentFactor(f64);

impl AdjustmentFactor {
    pub const NEUTRAL: AdjustmentFactor = AdjustmentFactor(1.0);

    /// Compute `Π v_i^{w_i}` over the nine multipliers
    pub fn from_profile(profile: &BehavioralProfile) -> Result<Self> {
        profile.validate()?;

        let factor = profile
            .iter()
            .map(|(variable, value)| value.powf(variable.weight()))
            .product::<f64>();

        debug!("adjustment factor {:.6} from {:?}", factor, profile);
        Ok(AdjustmentFactor(factor))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn is_neutral(&self) -> bool {
        self.0 == 1.0
    }
}

impl Default for AdjustmentFactor {
    fn default() -> Self {
        Self::NEUTRAL
    }
}
