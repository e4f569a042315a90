//! Continuous-time savings model
//!
//! `dA/dt = (savings_base / factor) * exp(gI * t) + (baseline + r) * A`
//!
//! The inflow term is real income growing continuously at the monthly
//! salary growth rate `gI`, divided by the behavioral adjustment factor.
//! The balance term is the regime's monthly rate `r` plus a fixed passive
//! return.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::behavior::AdjustmentFactor;
use crate::params::SimulationParameters;

/// Passive monthly return added to every regime's rate
pub const BASELINE_RETURN: f64 = 0.01;

/// Annual interest regime, compounded monthly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterestRegime {
    /// 3% annual
    ThreePercent,
    /// 7% annual
    SevenPercent,
}

impl InterestRegime {
    /// Both regimes are evaluated for every projection
    pub const ALL: [InterestRegime; 2] = [InterestRegime::ThreePercent, InterestRegime::SevenPercent];

    pub fn annual_rate(&self) -> f64 {
        match self {
            InterestRegime::ThreePercent => 0.03,
            InterestRegime::SevenPercent => 0.07,
        }
    }

    pub fn monthly_rate(&self) -> f64 {
        self.annual_rate() / 12.0
    }

    pub fn label(&self) -> &'static str {
        match self {
            InterestRegime::ThreePercent => "3%",
            InterestRegime::SevenPercent => "7%",
        }
    }
}

impl fmt::Display for InterestRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Rate function `f(A, t)` for one interest regime
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SavingsModel {
    /// Inflow at t = 0: `savings_base / factor`
    initial_inflow: f64,
    /// Continuous monthly growth of the inflow
    growth_rate: f64,
    /// `baseline + r`, applied to the accumulated balance
    balance_rate: f64,
}

impl SavingsModel {
    pub fn new(
        savings_base: f64,
        monthly_growth_rate: f64,
        regime_rate: f64,
        factor: AdjustmentFactor,
        baseline_return: f64,
    ) -> Self {
        Self {
            initial_inflow: savings_base / factor.value(),
            growth_rate: monthly_growth_rate,
            balance_rate: baseline_return + regime_rate,
        }
    }

    /// Build the model for a regime from normalized parameters
    pub fn for_regime(
        params: &SimulationParameters,
        factor: AdjustmentFactor,
        regime: InterestRegime,
        baseline_return: f64,
    ) -> Self {
        Self::new(
            params.savings_base(),
            params.monthly_growth_rate(),
            regime.monthly_rate(),
            factor,
            baseline_return,
        )
    }

    /// Instantaneous change of the balance
    pub fn rate(&self, balance: f64, t: f64) -> f64 {
        self.inflow_at(t) + self.balance_rate * balance
    }

    /// Savings inflow at time `t` (months)
    pub fn inflow_at(&self, t: f64) -> f64 {
        self.initial_inflow * (self.growth_rate * t).exp()
    }

    pub fn initial_inflow(&self) -> f64 {
        self.initial_inflow
    }

    pub fn balance_rate(&self) -> f64 {
        self.balance_rate
    }

    /// Exact balance at time `t` starting from zero.
    ///
    /// The model is linear, so
    /// `A(t) = c (e^{g t} - e^{k t}) / (g - k)`, or `c t e^{k t}` when `g == k`.
    pub fn exact_balance(&self, t: f64) -> f64 {
        let c = self.initial_inflow;
        let g = self.growth_rate;
        let k = self.balance_rate;

        if (g - k).abs() < 1e-12 {
            c * t * (k * t).exp()
        } else {
            c * ((g * t).exp() - (k * t).exp()) / (g - k)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_regime_rates() {
        assert_relative_eq!(InterestRegime::ThreePercent.monthly_rate(), 0.0025);
        assert_relative_eq!(InterestRegime::SevenPercent.monthly_rate(), 0.07 / 12.0);
        assert_eq!(InterestRegime::SevenPercent.to_string(), "7%");
    }

    #[test]
    fn test_rate_at_origin_is_scaled_inflow() {
        let factor = AdjustmentFactor::from_profile(
            &crate::behavior::BehavioralProfile::neutral()
                .with(crate::behavior::BehavioralVariable::FamilyBurden, 1.3),
        )
        .unwrap();
        let model = SavingsModel::new(1000.0, 0.0, 0.0025, factor, BASELINE_RETURN);

        assert_relative_eq!(model.rate(0.0, 0.0), 1000.0 / factor.value());
        assert!(model.rate(0.0, 0.0) < 1000.0);
    }

    #[test]
    fn test_balance_term() {
        let model = SavingsModel::new(0.0, 0.0, 0.005, AdjustmentFactor::NEUTRAL, BASELINE_RETURN);
        assert_relative_eq!(model.balance_rate(), 0.015);
        assert_relative_eq!(model.rate(200.0, 3.0), 200.0 * 0.015);
    }

    #[test]
    fn test_inflow_grows_with_salary() {
        let model = SavingsModel::new(500.0, 0.02 / 12.0, 0.0025, AdjustmentFactor::NEUTRAL, BASELINE_RETURN);
        assert!(model.inflow_at(12.0) > model.inflow_at(0.0));
        assert_relative_eq!(model.inflow_at(12.0), 500.0 * 0.02_f64.exp(), max_relative = 1e-12);
    }

    #[test]
    fn test_exact_balance_satisfies_ode() {
        let model = SavingsModel::new(800.0, 0.001, 0.0025, AdjustmentFactor::NEUTRAL, BASELINE_RETURN);
        let t = 30.0;
        let h = 1e-4;
        let derivative = (model.exact_balance(t + h) - model.exact_balance(t - h)) / (2.0 * h);

        assert_eq!(model.exact_balance(0.0), 0.0);
        assert_relative_eq!(derivative, model.rate(model.exact_balance(t), t), max_relative = 1e-6);
    }
}
