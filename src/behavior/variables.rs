//! The nine behavioral variables, their weights and preset levels

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SimulationError;

/// A named answer offered for a behavioral variable
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PresetLevel {
    /// Machine-friendly label, e.g. `very_optimistic`
    pub label: &'static str,
    /// Multiplier applied when this level is selected
    pub value: f64,
}

const fn level(label: &'static str, value: f64) -> PresetLevel {
    PresetLevel { label, value }
}

const INCOME_EXPECTATION_LEVELS: &[PresetLevel] = &[
    level("very_optimistic", 0.90),
    level("optimistic", 0.95),
    level("neutral", 1.00),
    level("pessimistic", 1.05),
    level("very_pessimistic", 1.10),
];

const INTEREST_RATE_LEVELS: &[PresetLevel] = &[
    level("very_low", 0.90),
    level("low", 0.95),
    level("normal", 1.00),
    level("high", 1.05),
    level("very_high", 1.10),
];

// Bands are annual inflation: <2%, 2-4%, 4-6%, 6-10%, >10%
const INFLATION_LEVELS: &[PresetLevel] = &[
    level("very_low", 0.95),
    level("low", 1.00),
    level("moderate", 1.05),
    level("high", 1.10),
    level("very_high", 1.15),
];

const TIME_PREFERENCE_LEVELS: &[PresetLevel] = &[
    level("strongly_future", 0.90),
    level("future", 0.95),
    level("balanced", 1.00),
    level("present", 1.10),
    level("strongly_present", 1.15),
];

const FINANCIAL_LITERACY_LEVELS: &[PresetLevel] = &[
    level("very_high", 0.90),
    level("high", 0.95),
    level("medium", 1.00),
    level("low", 1.10),
    level("very_low", 1.15),
];

const UNEMPLOYMENT_RISK_LEVELS: &[PresetLevel] = &[
    level("very_low", 0.90),
    level("low", 0.95),
    level("moderate", 1.00),
    level("high", 1.10),
    level("very_high", 1.20),
];

const FAMILY_BURDEN_LEVELS: &[PresetLevel] = &[
    level("single_no_children", 0.90),
    level("couple_no_children", 1.00),
    level("couple_one_child", 1.10),
    level("couple_two_children", 1.20),
    level("single_parent", 1.25),
    level("couple_three_plus_children", 1.30),
];

const HEALTH_EXPENSE_LEVELS: &[PresetLevel] = &[
    level("very_low", 0.90),
    level("low", 0.95),
    level("average", 1.00),
    level("high", 1.10),
    level("very_high", 1.20),
];

const JOB_STABILITY_LEVELS: &[PresetLevel] = &[
    level("very_stable", 0.90),
    level("stable", 0.95),
    level("moderate", 1.00),
    level("unstable", 1.10),
    level("very_unstable", 1.20),
];

/// One of the nine behavioral inputs feeding the adjustment factor
///
/// Financial literacy and job stability are inverse variables: a *high*
/// literacy or a *stable* job maps to a multiplier below 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehavioralVariable {
    IncomeExpectation,
    InterestRateExpectation,
    InflationExpectation,
    TimePreference,
    FinancialLiteracy,
    UnemploymentRisk,
    FamilyBurden,
    HealthExpenses,
    JobStability,
}

impl BehavioralVariable {
    /// All variables, in weighting order
    pub const ALL: [BehavioralVariable; 9] = [
        BehavioralVariable::IncomeExpectation,
        BehavioralVariable::InterestRateExpectation,
        BehavioralVariable::InflationExpectation,
        BehavioralVariable::TimePreference,
        BehavioralVariable::FinancialLiteracy,
        BehavioralVariable::UnemploymentRisk,
        BehavioralVariable::FamilyBurden,
        BehavioralVariable::HealthExpenses,
        BehavioralVariable::JobStability,
    ];

    /// Exponent of this variable in the weighted geometric mean.
    /// Weights across all nine variables sum to 1.0.
    pub fn weight(&self) -> f64 {
        match self {
            BehavioralVariable::IncomeExpectation => 0.15,
            BehavioralVariable::InterestRateExpectation => 0.10,
            BehavioralVariable::InflationExpectation => 0.20,
            BehavioralVariable::TimePreference => 0.15,
            BehavioralVariable::FinancialLiteracy => 0.10,
            BehavioralVariable::UnemploymentRisk => 0.10,
            BehavioralVariable::FamilyBurden => 0.10,
            BehavioralVariable::HealthExpenses => 0.05,
            BehavioralVariable::JobStability => 0.05,
        }
    }

    /// Snake-case key used in CSV profiles and on the command line
    pub fn key(&self) -> &'static str {
        match self {
            BehavioralVariable::IncomeExpectation => "income_expectation",
            BehavioralVariable::InterestRateExpectation => "interest_rate_expectation",
            BehavioralVariable::InflationExpectation => "inflation_expectation",
            BehavioralVariable::TimePreference => "time_preference",
            BehavioralVariable::FinancialLiteracy => "financial_literacy",
            BehavioralVariable::UnemploymentRisk => "unemployment_risk",
            BehavioralVariable::FamilyBurden => "family_burden",
            BehavioralVariable::HealthExpenses => "health_expenses",
            BehavioralVariable::JobStability => "job_stability",
        }
    }

    /// Named answers for this variable, ordered from most to least favourable
    pub fn presets(&self) -> &'static [PresetLevel] {
        match self {
            BehavioralVariable::IncomeExpectation => INCOME_EXPECTATION_LEVELS,
            BehavioralVariable::InterestRateExpectation => INTEREST_RATE_LEVELS,
            BehavioralVariable::InflationExpectation => INFLATION_LEVELS,
            BehavioralVariable::TimePreference => TIME_PREFERENCE_LEVELS,
            BehavioralVariable::FinancialLiteracy => FINANCIAL_LITERACY_LEVELS,
            BehavioralVariable::UnemploymentRisk => UNEMPLOYMENT_RISK_LEVELS,
            BehavioralVariable::FamilyBurden => FAMILY_BURDEN_LEVELS,
            BehavioralVariable::HealthExpenses => HEALTH_EXPENSE_LEVELS,
            BehavioralVariable::JobStability => JOB_STABILITY_LEVELS,
        }
    }

    /// Look up the multiplier for a preset label
    pub fn preset_value(&self, label: &str) -> Option<f64> {
        self.presets()
            .iter()
            .find(|p| p.label.eq_ignore_ascii_case(label))
            .map(|p| p.value)
    }
}

impl fmt::Display for BehavioralVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for BehavioralVariable {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        BehavioralVariable::ALL
            .iter()
            .copied()
            .find(|v| v.key() == normalized)
            .ok_or_else(|| SimulationError::UnknownVariable(s.trim().to_string()))
    }
}
