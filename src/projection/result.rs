//! Projection output structures

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{AnnuityValues, InterestRegime};
use crate::behavior::AdjustmentFactor;
use crate::params::{IncomeBreakdown, SimulationParameters};

/// Reported in place of an ODE terminal value when the savings base is
/// negative. This is a signal, not a currency amount.
pub const DEFICIT_SENTINEL: f64 = -1.0;

/// Non-fatal conditions raised while building a projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProjectionWarning {
    /// Expense met or exceeded net income and was replaced
    ExpenseExceedsIncome { supplied: f64, clamped_to: f64 },
    /// The savings base is negative; ODE terminal values carry
    /// [`DEFICIT_SENTINEL`]
    DeficitProjection { savings_base: f64 },
}

impl fmt::Display for ProjectionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectionWarning::ExpenseExceedsIncome { supplied, clamped_to } => write!(
                f,
                "monthly expense {:.2} is not below net income; {:.2} was used instead",
                supplied, clamped_to
            ),
            ProjectionWarning::DeficitProjection { savings_base } => write!(
                f,
                "expenses exceed income by {:.2} per month; differential-equation projections are not reported",
                -savings_base
            ),
        }
    }
}

/// Everything computed for one interest regime
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegimeProjection {
    pub regime: InterestRegime,

    /// Regime rate per month (excluding the passive baseline)
    pub monthly_rate: f64,

    /// ODE balance at each point of the result's time grid
    pub trajectory: Vec<f64>,

    /// Last trajectory value, or [`DEFICIT_SENTINEL`] in a deficit
    pub terminal: f64,

    /// Closed-form compound annuity at each whole month `0..=horizon`
    pub compound_series: Vec<f64>,

    /// Discrete growing-payment recurrence at each whole month `0..=horizon`
    pub discrete_series: Vec<f64>,
}

/// The five headline outcomes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOutcomes {
    pub simple_0: f64,
    pub simple_3: f64,
    pub simple_7: f64,
    pub ode_3: f64,
    pub ode_7: f64,
}

impl ScenarioOutcomes {
    pub fn new(annuities: AnnuityValues, ode_3: f64, ode_7: f64) -> Self {
        Self {
            simple_0: annuities.simple_0,
            simple_3: annuities.simple_3,
            simple_7: annuities.simple_7,
            ode_3,
            ode_7,
        }
    }

    /// (label, value) pairs in reporting order
    pub fn labelled(&self) -> [(&'static str, f64); 5] {
        [
            ("0% simple", self.simple_0),
            ("3% simple", self.simple_3),
            ("7% simple", self.simple_7),
            ("3% ODE", self.ode_3),
            ("7% ODE", self.ode_7),
        ]
    }
}

/// Complete, immutable result of one projection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionResult {
    /// Normalized inputs, including the income breakdown
    pub parameters: SimulationParameters,

    pub adjustment_factor: AdjustmentFactor,

    /// `horizon` evenly spaced months from 0 to `horizon`
    pub time_grid: Vec<f64>,

    pub outcomes: ScenarioOutcomes,

    /// Uninvested accumulation at each whole month `0..=horizon`
    pub simple_series: Vec<f64>,

    pub three_percent: RegimeProjection,
    pub seven_percent: RegimeProjection,

    /// Clamp and deficit conditions, for reporting
    pub warnings: Vec<ProjectionWarning>,
}

impl ProjectionResult {
    pub fn income(&self) -> &IncomeBreakdown {
        &self.parameters.income
    }

    pub fn net_income(&self) -> f64 {
        self.parameters.income.net_income
    }

    pub fn savings_base(&self) -> f64 {
        self.parameters.income.savings_base
    }

    pub fn regime(&self, regime: InterestRegime) -> &RegimeProjection {
        match regime {
            InterestRegime::ThreePercent => &self.three_percent,
            InterestRegime::SevenPercent => &self.seven_percent,
        }
    }

    /// ODE terminal values are sentinels rather than amounts
    pub fn is_infeasible(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, ProjectionWarning::DeficitProjection { .. }))
    }

    pub fn expense_clamped(&self) -> bool {
        self.parameters.expense_clamped
    }

    /// Highest outcome, skipping sentinel ODE values
    pub fn best_outcome(&self) -> Option<(&'static str, f64)> {
        let infeasible = self.is_infeasible();
        self.outcomes
            .labelled()
            .into_iter()
            .filter(|(label, _)| !(infeasible && label.ends_with("ODE")))
            .fold(None, |best: Option<(&'static str, f64)>, (label, value)| match best {
                Some((_, v)) if v >= value => best,
                _ => Some((label, value)),
            })
    }

    pub fn summary(&self) -> ProjectionSummary {
        let best = self.best_outcome();
        ProjectionSummary {
            horizon_months: self.parameters.horizon_months,
            net_income: self.net_income(),
            savings_base: self.savings_base(),
            adjustment_factor: self.adjustment_factor.value(),
            outcomes: self.outcomes,
            best_label: best.map(|(label, _)| label.to_string()),
            best_value: best.map(|(_, value)| value),
            infeasible: self.is_infeasible(),
            warning_count: self.warnings.len(),
        }
    }
}

/// Condensed view for UI summaries and reports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub horizon_months: u32,
    pub net_income: f64,
    pub savings_base: f64,
    pub adjustment_factor: f64,
    pub outcomes: ScenarioOutcomes,
    pub best_label: Option<String>,
    pub best_value: Option<f64>,
    pub infeasible: bool,
    pub warning_count: usize,
}
