//! Closed-form annuity values and their discrete month-by-month series

use serde::{Deserialize, Serialize};

use super::InterestRegime;

/// Accumulated savings with no interest: `payment * months`
pub fn simple_value(payment: f64, months: u32) -> f64 {
    payment * months as f64
}

/// Future value of an ordinary annuity: `payment * ((1+r)^n - 1) / r`.
/// A zero rate falls back to [`simple_value`].
pub fn compound_value(payment: f64, months: u32, monthly_rate: f64) -> f64 {
    if monthly_rate.abs() < 1e-10 {
        return simple_value(payment, months);
    }
    payment * ((1.0 + monthly_rate).powf(months as f64) - 1.0) / monthly_rate
}

/// [`compound_value`] at every whole month `0..=months`
pub fn compound_series(payment: f64, months: u32, monthly_rate: f64) -> Vec<f64> {
    (0..=months)
        .map(|t| compound_value(payment, t, monthly_rate))
        .collect()
}

/// Month-by-month accumulation with a growing payment
///
/// `s_0 = 0`, `s_i = s_{i-1} (1 + r) + payment (1 + g)^i`. This is the
/// discrete counterpart of the continuous savings model, without the
/// passive baseline return.
pub fn growing_payment_series(payment: f64, monthly_growth: f64, monthly_rate: f64, months: u32) -> Vec<f64> {
    let mut series = Vec::with_capacity(months as usize + 1);
    let mut balance = 0.0;
    series.push(balance);

    for i in 1..=months {
        let payment_i = payment * (1.0 + monthly_growth).powf(i as f64);
        balance = balance * (1.0 + monthly_rate) + payment_i;
        series.push(balance);
    }

    series
}

/// The three closed-form outcomes reported for every projection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnuityValues {
    /// No interest
    pub simple_0: f64,
    /// Compounded at 3% annual
    pub simple_3: f64,
    /// Compounded at 7% annual
    pub simple_7: f64,
}

impl AnnuityValues {
    pub fn compute(savings_base: f64, months: u32) -> Self {
        Self {
            simple_0: simple_value(savings_base, months),
            simple_3: compound_value(savings_base, months, InterestRegime::ThreePercent.monthly_rate()),
            simple_7: compound_value(savings_base, months, InterestRegime::SevenPercent.monthly_rate()),
        }
    }

    /// Closed-form value for a regime
    pub fn for_regime(&self, regime: InterestRegime) -> f64 {
        match regime {
            InterestRegime::ThreePercent => self.simple_3,
            InterestRegime::SevenPercent => self.simple_7,
        }
    }
}
