//! Sweep every behavioral variable over its preset levels
//!
//! Shows how each answer moves the adjustment factor and the ODE terminal
//! balances, holding all other variables neutral.

use anyhow::Result;
use clap::Parser;
use std::time::Instant;

use savings_projection::{BehavioralVariable, RawInputs, ScenarioRunner};

#[derive(Debug, Parser)]
#[command(about = "Behavioral preset sensitivity table")]
struct Args {
    #[arg(long, default_value_t = 2750.0)]
    salary: f64,

    #[arg(long, default_value_t = 120)]
    months: i64,

    #[arg(long, default_value_t = 2.0)]
    growth: f64,

    #[arg(long, default_value_t = 0.0)]
    expense: f64,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let start = Instant::now();
    let runner = ScenarioRunner::new();
    let base = RawInputs::new(args.salary, args.months)
        .with_growth(args.growth)
        .with_expense(args.expense);

    println!(
        "{:<26} {:<28} {:>7} {:>9} {:>16} {:>16}",
        "Variable", "Level", "Value", "Factor", "ODE 3%", "ODE 7%"
    );
    println!("{}", "-".repeat(107));

    for variable in BehavioralVariable::ALL {
        for (level, result) in runner.sweep_variable(&base, variable)? {
            println!(
                "{:<26} {:<28} {:>7.2} {:>9.4} {:>16.2} {:>16.2}",
                variable.key(),
                level.label,
                level.value,
                result.adjustment_factor.value(),
                result.outcomes.ode_3,
                result.outcomes.ode_7,
            );
        }
    }

    println!("\nTotal time: {:?}", start.elapsed());
    Ok(())
}
