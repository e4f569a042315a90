//! Savings Projection CLI
//!
//! Command-line interface for running a single savings projection

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use savings_projection::params::load_profile;
use savings_projection::{
    BehavioralProfile, BehavioralVariable, InterestRegime, ProjectionConfig, ProjectionEngine, RawInputs,
};

#[derive(Debug, Parser)]
#[command(name = "savings-projection", version, about = "Project monthly savings under 0%, 3% and 7% interest")]
struct Args {
    /// Gross monthly salary
    #[arg(long, default_value_t = 2750.0)]
    salary: f64,

    /// Number of months to project
    #[arg(long, default_value_t = 120, allow_negative_numbers = true)]
    months: i64,

    /// Annual salary growth in percent
    #[arg(long)]
    growth: Option<f64>,

    /// Total monthly expense
    #[arg(long)]
    expense: Option<f64>,

    /// Behavioral profile CSV (Variable,Value)
    #[arg(long)]
    profile: Option<PathBuf>,

    #[command(flatten)]
    behavior: BehaviorArgs,

    /// Override one behavioral multiplier, e.g. `family_burden=1.2` or
    /// `family_burden=single_parent`. May be repeated.
    #[arg(long = "set", value_name = "VARIABLE=VALUE")]
    overrides: Vec<String>,

    /// Projection configuration JSON
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the full result as JSON
    #[arg(long)]
    json: bool,

    /// Print the monthly trajectory table
    #[arg(long)]
    trajectory: bool,
}

/// One flag per behavioral variable; each takes a multiplier or a preset label
#[derive(Debug, Default, clap::Args)]
struct BehaviorArgs {
    /// Income expectation (e.g. 0.95 or `optimistic`)
    #[arg(long, value_name = "VALUE")]
    income_expectation: Option<String>,

    /// Interest-rate expectation (e.g. `high`)
    #[arg(long, value_name = "VALUE")]
    interest_rate_expectation: Option<String>,

    /// Inflation expectation (e.g. `moderate`)
    #[arg(long, value_name = "VALUE")]
    inflation_expectation: Option<String>,

    /// Time preference (e.g. `present`)
    #[arg(long, value_name = "VALUE")]
    time_preference: Option<String>,

    /// Financial literacy, inverse (e.g. `very_high` = 0.90)
    #[arg(long, value_name = "VALUE")]
    financial_literacy: Option<String>,

    /// Unemployment risk (e.g. `low`)
    #[arg(long, value_name = "VALUE")]
    unemployment_risk: Option<String>,

    /// Family burden (e.g. `couple_one_child`)
    #[arg(long, value_name = "VALUE")]
    family_burden: Option<String>,

    /// Health expenses (e.g. `average`)
    #[arg(long, value_name = "VALUE")]
    health_expenses: Option<String>,

    /// Job stability, inverse (e.g. `stable` = 0.95)
    #[arg(long, value_name = "VALUE")]
    job_stability: Option<String>,
}

impl BehaviorArgs {
    fn values(&self) -> [(BehavioralVariable, Option<&str>); 9] {
        [
            (BehavioralVariable::IncomeExpectation, self.income_expectation.as_deref()),
            (BehavioralVariable::InterestRateExpectation, self.interest_rate_expectation.as_deref()),
            (BehavioralVariable::InflationExpectation, self.inflation_expectation.as_deref()),
            (BehavioralVariable::TimePreference, self.time_preference.as_deref()),
            (BehavioralVariable::FinancialLiteracy, self.financial_literacy.as_deref()),
            (BehavioralVariable::UnemploymentRisk, self.unemployment_risk.as_deref()),
            (BehavioralVariable::FamilyBurden, self.family_burden.as_deref()),
            (BehavioralVariable::HealthExpenses, self.health_expenses.as_deref()),
            (BehavioralVariable::JobStability, self.job_stability.as_deref()),
        ]
    }

    /// Apply every flag that was given on top of `profile`
    fn apply(&self, mut profile: BehavioralProfile) -> Result<BehavioralProfile> {
        for (variable, value) in self.values() {
            if let Some(value) = value {
                profile = apply_value(profile, variable, value)?;
            }
        }
        Ok(profile)
    }
}

fn apply_value(profile: BehavioralProfile, variable: BehavioralVariable, value: &str) -> Result<BehavioralProfile> {
    let value = value.trim();
    match value.parse::<f64>() {
        Ok(v) => Ok(profile.with(variable, v)),
        Err(_) => Ok(profile.with_preset(variable, value)?),
    }
}

fn apply_override(profile: BehavioralProfile, spec: &str) -> Result<BehavioralProfile> {
    let (name, value) = spec
        .split_once('=')
        .with_context(|| format!("expected VARIABLE=VALUE, got `{}`", spec))?;
    let variable: BehavioralVariable = name.parse()?;
    apply_value(profile, variable, value)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ProjectionConfig::from_json_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ProjectionConfig::default(),
    };

    let mut behavior = match &args.profile {
        Some(path) => load_profile(path).with_context(|| format!("loading profile {}", path.display()))?,
        None => BehavioralProfile::neutral(),
    };
    behavior = args.behavior.apply(behavior)?;
    for spec in &args.overrides {
        behavior = apply_override(behavior, spec)?;
    }

    let raw = RawInputs {
        salary: args.salary,
        horizon_months: args.months,
        annual_growth_pct: args.growth,
        expense_total: args.expense,
        behavior,
    };

    let engine = ProjectionEngine::new(config);
    let result = engine.project(&raw).context("projection failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let income = result.income();
    println!("Savings Projection v{}", env!("CARGO_PKG_VERSION"));
    println!("======================\n");
    println!("Inputs:");
    println!("  Gross salary:      {:>14.2}", income.gross_salary);
    println!("  AFP deduction:     {:>14.2}", income.afp_deduction);
    println!("  Net income:        {:>14.2}", income.net_income);
    println!("  Monthly expense:   {:>14.2}", income.expense_effective);
    println!("  Savings base:      {:>14.2}", income.savings_base);
    println!("  Growth (% annual): {:>14.2}", result.parameters.annual_growth_pct);
    println!("  Months:            {:>14}", result.parameters.horizon_months);
    println!("  Adjustment factor: {:>14.4}", result.adjustment_factor.value());
    println!();

    println!("Closed-form future value:");
    for (label, value) in result.outcomes.labelled().iter().take(3) {
        println!("  {:<10} {:>16.2}", label, value);
    }
    println!("Differential-equation model:");
    for regime in InterestRegime::ALL {
        let terminal = result.regime(regime).terminal;
        if result.is_infeasible() {
            println!("  {:<10} {:>16}", format!("{} ODE", regime), "n/a (deficit)");
        } else {
            println!("  {:<10} {:>16.2}", format!("{} ODE", regime), terminal);
        }
    }

    let summary = result.summary();
    if let (Some(label), Some(value)) = (&summary.best_label, summary.best_value) {
        println!("\nBest scenario: {} ({:.2})", label, value);
    }

    if !result.warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &result.warnings {
            println!("  - {}", warning);
        }
    }

    if args.trajectory {
        println!("\n{:>8} {:>16} {:>16}", "Month", "ODE 3%", "ODE 7%");
        println!("{}", "-".repeat(42));
        for (i, t) in result.time_grid.iter().enumerate() {
            println!(
                "{:>8.2} {:>16.2} {:>16.2}",
                t, result.three_percent.trajectory[i], result.seven_percent.trajectory[i]
            );
        }
    }

    Ok(())
}
