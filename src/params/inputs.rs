//! Parameter normalization
//!
//! Validates raw caller inputs, derives net income after the AFP pension
//! deduction and the monthly savings base that drives every projection.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::behavior::BehavioralProfile;
use crate::error::{Result, SimulationError};
use crate::projection::{ProjectionConfig, ProjectionWarning};

/// Statutory AFP pension contribution deducted from gross salary
pub const AFP_RATE: f64 = 0.1271;

/// Share of net income assumed as expense when the supplied expense
/// meets or exceeds net income
pub const EXPENSE_CLAMP_RATIO: f64 = 0.8;

/// Inputs as received from a form, CLI or file reader
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawInputs {
    /// Gross monthly salary
    pub salary: f64,

    /// Number of months to project
    pub horizon_months: i64,

    /// Annual salary growth in percent (2.0 = 2%); missing means 0
    #[serde(default)]
    pub annual_growth_pct: Option<f64>,

    /// Pre-aggregated total monthly expense; missing or negative means 0
    #[serde(default)]
    pub expense_total: Option<f64>,

    /// Behavioral multipliers
    #[serde(default)]
    pub behavior: BehavioralProfile,
}

impl RawInputs {
    /// Inputs with no expense, no growth and a neutral behavioral profile
    pub fn new(salary: f64, horizon_months: i64) -> Self {
        Self {
            salary,
            horizon_months,
            annual_growth_pct: None,
            expense_total: None,
            behavior: BehavioralProfile::neutral(),
        }
    }

    pub fn with_growth(mut self, annual_growth_pct: f64) -> Self {
        self.annual_growth_pct = Some(annual_growth_pct);
        self
    }

    pub fn with_expense(mut self, expense_total: f64) -> Self {
        self.expense_total = Some(expense_total);
        self
    }

    pub fn with_behavior(mut self, behavior: BehavioralProfile) -> Self {
        self.behavior = behavior;
        self
    }
}

/// Monthly income and expense figures derived from the inputs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IncomeBreakdown {
    pub gross_salary: f64,
    /// Amount withheld for the AFP contribution
    pub afp_deduction: f64,
    pub net_income: f64,
    /// Expense as supplied (after treating missing/negative as 0)
    pub expense_supplied: f64,
    /// Expense actually used, possibly clamped
    pub expense_effective: f64,
    /// `net_income - expense_effective`
    pub savings_base: f64,
}

/// Validated, canonical parameter set for one projection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationParameters {
    pub horizon_months: u32,
    pub annual_growth_pct: f64,
    pub behavior: BehavioralProfile,
    pub income: IncomeBreakdown,

    /// Expense was replaced by a share of net income
    pub expense_clamped: bool,

    /// Non-fatal conditions raised during normalization
    pub warnings: Vec<ProjectionWarning>,
}

impl SimulationParameters {
    /// Validate and canonicalize raw inputs using the default constants
    pub fn normalize(raw: &RawInputs) -> Result<Self> {
        Self::normalize_with(raw, &ProjectionConfig::default())
    }

    /// Validate and canonicalize raw inputs
    ///
    /// Fails on a non-positive salary or horizon and on non-positive
    /// behavioral multipliers. An expense at or above net income is clamped
    /// (when the config enables it) and reported as a warning; a negative
    /// savings base is reported, not rejected.
    pub fn normalize_with(raw: &RawInputs, config: &ProjectionConfig) -> Result<Self> {
        config.validate()?;

        if !raw.salary.is_finite() || raw.salary <= 0.0 {
            return Err(SimulationError::invalid(
                "salary",
                format!("must be a positive number, got {}", raw.salary),
            ));
        }

        if raw.horizon_months <= 0 {
            return Err(SimulationError::invalid(
                "horizon_months",
                format!("must be at least one month, got {}", raw.horizon_months),
            ));
        }
        let horizon_months = u32::try_from(raw.horizon_months).map_err(|_| {
            SimulationError::invalid(
                "horizon_months",
                format!("{} months is out of range", raw.horizon_months),
            )
        })?;

        let annual_growth_pct = match raw.annual_growth_pct {
            Some(g) if !g.is_finite() => {
                return Err(SimulationError::invalid("annual_growth_pct", "must be finite"));
            }
            Some(g) => g,
            None => 0.0,
        };

        let expense_supplied = match raw.expense_total {
            Some(e) if e.is_nan() || e.is_infinite() => {
                return Err(SimulationError::invalid("expense_total", "must be finite"));
            }
            Some(e) if e > 0.0 => e,
            _ => 0.0,
        };

        raw.behavior.validate()?;

        let gross_salary = raw.salary;
        let net_income = gross_salary * (1.0 - config.afp_rate);
        let afp_deduction = gross_salary - net_income;

        let mut warnings = Vec::new();
        let mut expense_effective = expense_supplied;
        let mut expense_clamped = false;

        if let Some(ratio) = config.expense_clamp_ratio {
            if expense_supplied >= net_income {
                expense_effective = ratio * net_income;
                expense_clamped = true;
                warn!(
                    "expense {:.2} meets or exceeds net income {:.2}; clamped to {:.2}",
                    expense_supplied, net_income, expense_effective
                );
                warnings.push(ProjectionWarning::ExpenseExceedsIncome {
                    supplied: expense_supplied,
                    clamped_to: expense_effective,
                });
            }
        }

        let savings_base = net_income - expense_effective;
        if savings_base < 0.0 {
            warn!(
                "savings base is negative ({:.2}); ODE terminal values will carry the deficit sentinel",
                savings_base
            );
            warnings.push(ProjectionWarning::DeficitProjection { savings_base });
        }

        Ok(Self {
            horizon_months,
            annual_growth_pct,
            behavior: raw.behavior,
            income: IncomeBreakdown {
                gross_salary,
                afp_deduction,
                net_income,
                expense_supplied,
                expense_effective,
                savings_base,
            },
            expense_clamped,
            warnings,
        })
    }

    pub fn savings_base(&self) -> f64 {
        self.income.savings_base
    }

    pub fn net_income(&self) -> f64 {
        self.income.net_income
    }

    /// Salary growth as a continuous monthly rate (`g / 100 / 12`)
    pub fn monthly_growth_rate(&self) -> f64 {
        self.annual_growth_pct / 100.0 / 12.0
    }

    /// Expenses exceed income even after any clamp
    pub fn in_deficit(&self) -> bool {
        self.income.savings_base < 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::BehavioralVariable;
    use approx::assert_relative_eq;

    #[test]
    fn test_net_income_after_afp() {
        let params = SimulationParameters::normalize(&RawInputs::new(2750.0, 120)).unwrap();
        assert_relative_eq!(params.net_income(), 2750.0 * 0.8729, max_relative = 1e-12);
        assert_relative_eq!(params.income.afp_deduction, 2750.0 * 0.1271, max_relative = 1e-9);
        assert_relative_eq!(params.savings_base(), params.net_income(), max_relative = 1e-12);
        assert!(params.warnings.is_empty());
    }

    #[test]
    fn test_rejects_non_positive_salary() {
        for salary in [0.0, -100.0, f64::NAN] {
            let err = SimulationParameters::normalize(&RawInputs::new(salary, 12)).unwrap_err();
            assert!(matches!(err, SimulationError::InvalidInput { field: "salary", .. }));
        }
    }

    #[test]
    fn test_rejects_non_positive_horizon() {
        for months in [0, -12] {
            let err = SimulationParameters::normalize(&RawInputs::new(1000.0, months)).unwrap_err();
            assert!(matches!(err, SimulationError::InvalidInput { field: "horizon_months", .. }));
        }
    }

    #[test]
    fn test_rejects_bad_multiplier() {
        let raw = RawInputs::new(1000.0, 12)
            .with_behavior(BehavioralProfile::neutral().with(BehavioralVariable::HealthExpenses, 0.0));
        assert!(SimulationParameters::normalize(&raw).is_err());
    }

    #[test]
    fn test_missing_and_negative_values_default_to_zero() {
        let mut raw = RawInputs::new(1000.0, 12);
        raw.expense_total = Some(-50.0);
        let params = SimulationParameters::normalize(&raw).unwrap();
        assert_eq!(params.annual_growth_pct, 0.0);
        assert_eq!(params.income.expense_supplied, 0.0);
        assert_eq!(params.monthly_growth_rate(), 0.0);
    }

    #[test]
    fn test_expense_clamped_at_net_income() {
        let raw = RawInputs::new(100.0, 12).with_expense(200.0);
        let params = SimulationParameters::normalize(&raw).unwrap();
        let net = 100.0 * (1.0 - AFP_RATE);

        assert!(params.expense_clamped);
        assert_relative_eq!(params.income.expense_effective, 0.8 * net, max_relative = 1e-12);
        assert_relative_eq!(params.savings_base(), 0.2 * net, max_relative = 1e-9);
        assert!(!params.in_deficit());
        assert!(matches!(
            params.warnings.as_slice(),
            [ProjectionWarning::ExpenseExceedsIncome { .. }]
        ));
    }

    #[test]
    fn test_expense_equal_to_net_is_clamped() {
        let net = 1000.0 * (1.0 - AFP_RATE);
        let params = SimulationParameters::normalize(&RawInputs::new(1000.0, 6).with_expense(net)).unwrap();
        assert!(params.expense_clamped);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = ProjectionConfig {
            afp_rate: -0.2,
            ..ProjectionConfig::default()
        };
        let err = SimulationParameters::normalize_with(&RawInputs::new(1000.0, 12), &config).unwrap_err();
        assert!(matches!(err, SimulationError::InvalidInput { field: "afp_rate", .. }));
    }

    #[test]
    fn test_deficit_flagged_when_clamp_disabled() {
        let config = ProjectionConfig {
            expense_clamp_ratio: None,
            ..ProjectionConfig::default()
        };
        let raw = RawInputs::new(100.0, 12).with_expense(200.0);
        let params = SimulationParameters::normalize_with(&raw, &config).unwrap();

        assert!(!params.expense_clamped);
        assert!(params.in_deficit());
        assert!(matches!(
            params.warnings.as_slice(),
            [ProjectionWarning::DeficitProjection { .. }]
        ));
    }
}
