//! Core projection engine: normalization, both interest regimes and
//! aggregation into a single result

use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::annuity::{self, AnnuityValues};
use super::integrator::{self, SolverMethod};
use super::model::{InterestRegime, SavingsModel, BASELINE_RETURN};
use super::result::{ProjectionResult, RegimeProjection, ScenarioOutcomes, DEFICIT_SENTINEL};
use crate::behavior::AdjustmentFactor;
use crate::error::{Result, SimulationError};
use crate::params::{RawInputs, SimulationParameters, AFP_RATE, EXPENSE_CLAMP_RATIO};

/// Configuration for a projection run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// AFP pension deduction applied to gross salary
    pub afp_rate: f64,

    /// Passive monthly return added to each regime's rate in the ODE
    pub baseline_return: f64,

    /// Share of net income used when the expense is not below it.
    /// `None` disables the clamp, so deficits reach the result.
    pub expense_clamp_ratio: Option<f64>,

    /// ODE integration scheme
    pub solver: SolverMethod,

    /// Integrate the two regimes concurrently
    pub parallel_regimes: bool,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            afp_rate: AFP_RATE,
            baseline_return: BASELINE_RETURN,
            expense_clamp_ratio: Some(EXPENSE_CLAMP_RATIO),
            solver: SolverMethod::default(),
            parallel_regimes: true,
        }
    }
}

impl ProjectionConfig {
    /// Parse a JSON configuration; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file
    pub fn from_json_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.afp_rate) {
            return Err(SimulationError::invalid(
                "afp_rate",
                format!("must be in [0, 1), got {}", self.afp_rate),
            ));
        }
        if !self.baseline_return.is_finite() {
            return Err(SimulationError::invalid("baseline_return", "must be finite"));
        }
        if let Some(ratio) = self.expense_clamp_ratio {
            if !(0.0..=1.0).contains(&ratio) {
                return Err(SimulationError::invalid(
                    "expense_clamp_ratio",
                    format!("must be in [0, 1], got {}", ratio),
                ));
            }
        }
        match self.solver {
            SolverMethod::DormandPrince { rtol, atol, max_steps } => {
                if !(rtol > 0.0 && atol > 0.0) || max_steps == 0 {
                    return Err(SimulationError::invalid(
                        "solver",
                        "tolerances and step budget must be positive",
                    ));
                }
            }
            SolverMethod::RungeKutta4 { substeps } => {
                if substeps == 0 {
                    return Err(SimulationError::invalid("solver", "substeps must be positive"));
                }
            }
        }
        Ok(())
    }
}

/// Main projection engine. Stateless between calls.
#[derive(Debug, Clone, Default)]
pub struct ProjectionEngine {
    config: ProjectionConfig,
}

impl ProjectionEngine {
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Normalize raw inputs and run the projection.
    /// An invalid configuration fails before any computation.
    pub fn project(&self, raw: &RawInputs) -> Result<ProjectionResult> {
        let params = SimulationParameters::normalize_with(raw, &self.config)?;
        self.project_parameters(params)
    }

    /// Run the projection for already-normalized parameters
    pub fn project_parameters(&self, params: SimulationParameters) -> Result<ProjectionResult> {
        self.config.validate()?;
        let factor = AdjustmentFactor::from_profile(&params.behavior)?;
        let horizon = params.horizon_months;
        let grid = integrator::time_grid(horizon as f64, horizon as usize);

        let (three, seven) = if self.config.parallel_regimes {
            rayon::join(
                || self.project_regime(&params, factor, &grid, InterestRegime::ThreePercent),
                || self.project_regime(&params, factor, &grid, InterestRegime::SevenPercent),
            )
        } else {
            (
                self.project_regime(&params, factor, &grid, InterestRegime::ThreePercent),
                self.project_regime(&params, factor, &grid, InterestRegime::SevenPercent),
            )
        };
        let three_percent = three?;
        let seven_percent = seven?;

        let annuities = AnnuityValues::compute(params.savings_base(), horizon);
        let outcomes = ScenarioOutcomes::new(annuities, three_percent.terminal, seven_percent.terminal);
        debug!(
            "projection over {} months: simple {:.2}/{:.2}/{:.2}, ode {:.2}/{:.2}",
            horizon, outcomes.simple_0, outcomes.simple_3, outcomes.simple_7, outcomes.ode_3, outcomes.ode_7
        );

        let warnings = params.warnings.clone();
        Ok(ProjectionResult {
            simple_series: (0..=horizon)
                .map(|t| annuity::simple_value(params.savings_base(), t))
                .collect(),
            parameters: params,
            adjustment_factor: factor,
            time_grid: grid,
            outcomes,
            three_percent,
            seven_percent,
            warnings,
        })
    }

    /// Integrate the ODE and build the closed-form series for one regime
    fn project_regime(
        &self,
        params: &SimulationParameters,
        factor: AdjustmentFactor,
        grid: &[f64],
        regime: InterestRegime,
    ) -> Result<RegimeProjection> {
        let model = SavingsModel::for_regime(params, factor, regime, self.config.baseline_return);

        let trajectory = integrator::integrate(|a, t| model.rate(a, t), 0.0, grid, self.config.solver)
            .map_err(|failure| SimulationError::IntegrationFailed {
                regime: regime.to_string(),
                time: failure.time,
                reason: failure.reason,
            })?;

        // Deficit terminals are replaced, trajectories are kept as computed
        let terminal = if params.in_deficit() {
            DEFICIT_SENTINEL
        } else {
            trajectory.last().copied().unwrap_or(0.0)
        };
        debug!("{} regime terminal balance {:.2}", regime, terminal);

        let horizon = params.horizon_months;
        let monthly_rate = regime.monthly_rate();
        Ok(RegimeProjection {
            regime,
            monthly_rate,
            terminal,
            compound_series: annuity::compound_series(params.savings_base(), horizon, monthly_rate),
            discrete_series: annuity::growing_payment_series(
                model.initial_inflow(),
                params.monthly_growth_rate(),
                monthly_rate,
                horizon,
            ),
            trajectory,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::{BehavioralProfile, BehavioralVariable};
    use crate::projection::ProjectionWarning;
    use approx::assert_relative_eq;

    fn reference_inputs() -> RawInputs {
        RawInputs::new(2750.0, 120).with_expense(0.0).with_growth(2.0)
    }

    #[test]
    fn test_reference_scenario() {
        let engine = ProjectionEngine::default();
        let result = engine.project(&reference_inputs()).unwrap();

        assert_relative_eq!(result.net_income(), 2400.475, max_relative = 1e-12);
        assert_relative_eq!(result.savings_base(), 2400.475, max_relative = 1e-12);
        assert_eq!(result.adjustment_factor.value(), 1.0);

        let o = result.outcomes;
        assert_relative_eq!(o.simple_0, 288_057.0, max_relative = 1e-9);
        assert_relative_eq!(
            o.simple_3,
            2400.475 * (1.0025_f64.powi(120) - 1.0) / 0.0025,
            max_relative = 1e-9
        );
        let r7: f64 = 0.07 / 12.0;
        assert_relative_eq!(o.simple_7, 2400.475 * ((1.0 + r7).powi(120) - 1.0) / r7, max_relative = 1e-9);
        assert!(o.simple_3 > o.simple_0 * 1.1);
        assert!(o.simple_7 > o.simple_3);

        // The passive baseline return puts the ODE above the closed form
        assert!(o.ode_3 > o.simple_3);
        assert!(o.ode_7 > o.ode_3);
        assert!(result.warnings.is_empty());
        assert!(!result.is_infeasible());

        let summary = result.summary();
        assert_eq!(summary.horizon_months, 120);
        assert_eq!(summary.best_label.as_deref(), Some("7% ODE"));
        assert_eq!(summary.best_value, Some(o.ode_7));
        assert!(!summary.infeasible);
    }

    #[test]
    fn test_trajectory_shape() {
        let result = ProjectionEngine::default().project(&reference_inputs()).unwrap();

        for regime in InterestRegime::ALL {
            let projection = result.regime(regime);
            assert_eq!(projection.trajectory.len(), 120);
            assert_eq!(projection.trajectory[0], 0.0);
            assert!(projection.trajectory.windows(2).all(|w| w[1] > w[0]));
            assert_eq!(projection.terminal, *projection.trajectory.last().unwrap());
            assert_eq!(projection.compound_series.len(), 121);
            assert_eq!(projection.discrete_series.len(), 121);
        }
        assert_eq!(result.time_grid.len(), 120);
        assert_eq!(result.simple_series.len(), 121);
        assert_relative_eq!(*result.simple_series.last().unwrap(), result.outcomes.simple_0);
    }

    #[test]
    fn test_ode_matches_exact_solution() {
        let engine = ProjectionEngine::default();
        let raw = reference_inputs();
        let result = engine.project(&raw).unwrap();
        let params = &result.parameters;

        for regime in InterestRegime::ALL {
            let model = SavingsModel::for_regime(params, result.adjustment_factor, regime, BASELINE_RETURN);
            let projection = result.regime(regime);
            for (t, a) in result.time_grid.iter().zip(&projection.trajectory).skip(1) {
                assert_relative_eq!(*a, model.exact_balance(*t), max_relative = 1e-6);
            }
        }
    }

    #[test]
    fn test_ode_consistent_with_annuity_without_baseline() {
        // No growth, neutral factor, no passive return: continuous and
        // discrete accumulation differ only by payment timing
        let config = ProjectionConfig {
            baseline_return: 0.0,
            ..ProjectionConfig::default()
        };
        let result = ProjectionEngine::new(config)
            .project(&RawInputs::new(2750.0, 120))
            .unwrap();

        assert_relative_eq!(result.outcomes.ode_3, result.outcomes.simple_3, max_relative = 1e-2);
        assert_relative_eq!(result.outcomes.ode_7, result.outcomes.simple_7, max_relative = 1e-2);
    }

    #[test]
    fn test_behavior_dampens_ode_only() {
        let engine = ProjectionEngine::default();
        let neutral = engine.project(&reference_inputs()).unwrap();

        let burdened = BehavioralProfile::neutral()
            .with(BehavioralVariable::FamilyBurden, 1.3)
            .with(BehavioralVariable::UnemploymentRisk, 1.2);
        let adjusted = engine.project(&reference_inputs().with_behavior(burdened)).unwrap();

        assert!(adjusted.adjustment_factor.value() > 1.0);
        assert!(adjusted.outcomes.ode_7 < neutral.outcomes.ode_7);
        assert_eq!(adjusted.outcomes.simple_7, neutral.outcomes.simple_7);
    }

    #[test]
    fn test_expense_clamp_scenario() {
        let raw = RawInputs::new(100.0, 12).with_expense(200.0);
        let result = ProjectionEngine::default().project(&raw).unwrap();
        let net = 100.0 * (1.0 - AFP_RATE);

        assert!(result.expense_clamped());
        assert_relative_eq!(result.income().expense_effective, 0.8 * net, max_relative = 1e-12);
        assert!(result.savings_base() > 0.0);
        assert!(result.outcomes.ode_3 > 0.0);
        assert!(result.outcomes.ode_7 > 0.0);
        assert_ne!(result.outcomes.ode_3, DEFICIT_SENTINEL);
        assert!(matches!(
            result.warnings.as_slice(),
            [ProjectionWarning::ExpenseExceedsIncome { .. }]
        ));
    }

    #[test]
    fn test_deficit_uses_sentinel() {
        let config = ProjectionConfig {
            expense_clamp_ratio: None,
            ..ProjectionConfig::default()
        };
        let raw = RawInputs::new(100.0, 12).with_expense(200.0);
        let result = ProjectionEngine::new(config).project(&raw).unwrap();

        assert!(result.is_infeasible());
        assert_eq!(result.outcomes.ode_3, DEFICIT_SENTINEL);
        assert_eq!(result.outcomes.ode_7, DEFICIT_SENTINEL);

        // Closed-form values keep their true negative amounts
        let base = 100.0 * (1.0 - AFP_RATE) - 200.0;
        assert_relative_eq!(result.outcomes.simple_0, base * 12.0, max_relative = 1e-12);
        assert!(result.outcomes.simple_3 < result.outcomes.simple_0);

        // Trajectories are reported as integrated
        assert!(*result.three_percent.trajectory.last().unwrap() < 0.0);

        let (label, _) = result.best_outcome().unwrap();
        assert_eq!(label, "0% simple");
    }

    #[test]
    fn test_single_month_horizon() {
        let result = ProjectionEngine::default().project(&RawInputs::new(1000.0, 1)).unwrap();
        assert_eq!(result.time_grid, vec![0.0]);
        assert_eq!(result.three_percent.trajectory, vec![0.0]);
        assert_eq!(result.outcomes.ode_3, 0.0);
        assert_relative_eq!(result.outcomes.simple_0, 1000.0 * (1.0 - AFP_RATE));
    }

    #[test]
    fn test_idempotent_and_parallel_agnostic() {
        let raw = reference_inputs();
        let parallel = ProjectionEngine::default();
        let sequential = ProjectionEngine::new(ProjectionConfig {
            parallel_regimes: false,
            ..ProjectionConfig::default()
        });

        let a = parallel.project(&raw).unwrap();
        let b = parallel.project(&raw).unwrap();
        let c = sequential.project(&raw).unwrap();

        assert_eq!(a.outcomes, b.outcomes);
        assert_eq!(a.seven_percent.trajectory, b.seven_percent.trajectory);
        assert_eq!(a.outcomes, c.outcomes);
        assert_eq!(a.three_percent.trajectory, c.three_percent.trajectory);
    }

    #[test]
    fn test_rk4_solver_close_to_adaptive() {
        let rk4 = ProjectionEngine::new(ProjectionConfig {
            solver: SolverMethod::RungeKutta4 { substeps: 8 },
            ..ProjectionConfig::default()
        });
        let adaptive = ProjectionEngine::default().project(&reference_inputs()).unwrap();
        let fixed = rk4.project(&reference_inputs()).unwrap();

        assert_relative_eq!(fixed.outcomes.ode_7, adaptive.outcomes.ode_7, max_relative = 1e-7);
    }

    #[test]
    fn test_invalid_inputs_fail_fast() {
        let engine = ProjectionEngine::default();
        assert!(engine.project(&RawInputs::new(0.0, 12)).is_err());
        assert!(engine.project(&RawInputs::new(1000.0, 0)).is_err());
    }

    #[test]
    fn test_invalid_config_rejected_before_projection() {
        let raw = RawInputs::new(1000.0, 12);

        let bad_rates = ProjectionEngine::new(ProjectionConfig {
            afp_rate: 1.5,
            expense_clamp_ratio: Some(3.0),
            ..ProjectionConfig::default()
        });
        assert!(matches!(
            bad_rates.project(&raw),
            Err(SimulationError::InvalidInput { field: "afp_rate", .. })
        ));

        let bad_clamp = ProjectionEngine::new(ProjectionConfig {
            expense_clamp_ratio: Some(3.0),
            ..ProjectionConfig::default()
        });
        assert!(matches!(
            bad_clamp.project(&raw),
            Err(SimulationError::InvalidInput { field: "expense_clamp_ratio", .. })
        ));

        let bad_solver = ProjectionEngine::new(ProjectionConfig {
            solver: SolverMethod::DormandPrince {
                rtol: -1.0,
                atol: -1.0,
                max_steps: 100,
            },
            ..ProjectionConfig::default()
        });
        assert!(matches!(
            bad_solver.project(&raw),
            Err(SimulationError::InvalidInput { field: "solver", .. })
        ));

        // Already-normalized parameters go through the same check
        let params = SimulationParameters::normalize(&raw).unwrap();
        assert!(bad_solver.project_parameters(params).is_err());
    }

    #[test]
    fn test_config_from_json() {
        let config = ProjectionConfig::from_json_str(
            r#"{ "baseline_return": 0.0, "solver": { "method": "runge_kutta4", "substeps": 4 } }"#,
        )
        .unwrap();
        assert_eq!(config.baseline_return, 0.0);
        assert_eq!(config.solver, SolverMethod::RungeKutta4 { substeps: 4 });
        assert_eq!(config.afp_rate, AFP_RATE);
        assert_eq!(config.expense_clamp_ratio, Some(0.8));

        let disabled = ProjectionConfig::from_json_str(r#"{ "expense_clamp_ratio": null }"#).unwrap();
        assert_eq!(disabled.expense_clamp_ratio, None);

        assert!(matches!(
            ProjectionConfig::from_json_str(r#"{ "afp_rate": 1.5 }"#),
            Err(SimulationError::InvalidInput { field: "afp_rate", .. })
        ));
        assert!(matches!(
            ProjectionConfig::from_json_str("not json"),
            Err(SimulationError::Config(_))
        ));
    }
}
