//! Numerical integration of scalar ODEs `dy/dt = f(y, t)`
//!
//! The default method is the adaptive Dormand–Prince 5(4) pair with local
//! extrapolation and FSAL reuse. Output is reported exactly at each grid
//! point; steps are clipped to land on them. A fixed-step classic RK4 is
//! available for comparison.

use log::trace;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default relative and absolute tolerance for the adaptive solver
pub const DEFAULT_TOLERANCE: f64 = 1.49012e-8;

/// Integration scheme and its settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum SolverMethod {
    /// Adaptive Dormand–Prince 5(4)
    DormandPrince {
        rtol: f64,
        atol: f64,
        /// Step budget between two consecutive grid points
        max_steps: u32,
    },
    /// Classic fourth-order Runge–Kutta with a fixed number of sub-steps
    /// per grid interval
    RungeKutta4 { substeps: u32 },
}

impl Default for SolverMethod {
    fn default() -> Self {
        SolverMethod::DormandPrince {
            rtol: DEFAULT_TOLERANCE,
            atol: DEFAULT_TOLERANCE,
            max_steps: 100_000,
        }
    }
}

/// Why the solver stopped before reaching the end of the grid
#[derive(Debug, Clone, PartialEq)]
pub struct StepFailure {
    /// Time reached when the solver gave up
    pub time: f64,
    pub reason: String,
}

impl fmt::Display for StepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at t = {}", self.reason, self.time)
    }
}

/// `points` evenly spaced values from 0 to `end`, both inclusive.
/// A single point is `[0.0]`.
pub fn time_grid(end: f64, points: usize) -> Vec<f64> {
    match points {
        0 => Vec::new(),
        1 => vec![0.0],
        n => {
            let step = end / (n - 1) as f64;
            let mut grid: Vec<f64> = (0..n).map(|i| i as f64 * step).collect();
            grid[n - 1] = end;
            grid
        }
    }
}

/// Integrate `rate` from `initial` over `grid`, returning the state at
/// every grid point. The first value is `initial`.
pub fn integrate<F>(
    rate: F,
    initial: f64,
    grid: &[f64],
    method: SolverMethod,
) -> Result<Vec<f64>, StepFailure>
where
    F: Fn(f64, f64) -> f64,
{
    if grid.is_empty() {
        return Ok(Vec::new());
    }

    let mut output = Vec::with_capacity(grid.len());
    output.push(initial);

    match method {
        SolverMethod::DormandPrince { rtol, atol, max_steps } => {
            let mut solver = DormandPrince::new(&rate, rtol, atol, max_steps);
            let mut y = initial;
            for window in grid.windows(2) {
                y = solver.advance(y, window[0], window[1])?;
                output.push(y);
            }
        }
        SolverMethod::RungeKutta4 { substeps } => {
            let substeps = substeps.max(1);
            let mut y = initial;
            for window in grid.windows(2) {
                y = rk4_interval(&rate, y, window[0], window[1], substeps)?;
                output.push(y);
            }
        }
    }

    Ok(output)
}

fn rk4_interval<F>(rate: &F, mut y: f64, t0: f64, t1: f64, substeps: u32) -> Result<f64, StepFailure>
where
    F: Fn(f64, f64) -> f64,
{
    let h = (t1 - t0) / substeps as f64;
    for i in 0..substeps {
        let t = t0 + i as f64 * h;
        let k1 = rate(y, t);
        let k2 = rate(y + 0.5 * h * k1, t + 0.5 * h);
        let k3 = rate(y + 0.5 * h * k2, t + 0.5 * h);
        let k4 = rate(y + h * k3, t + h);
        y += h / 6.0 * (k1 + 2.0 * k2 + 2.0 * k3 + k4);

        if !y.is_finite() {
            return Err(StepFailure {
                time: t + h,
                reason: "non-finite state".to_string(),
            });
        }
    }
    Ok(y)
}

// Dormand–Prince 5(4) tableau
const C2: f64 = 1.0 / 5.0;
const C3: f64 = 3.0 / 10.0;
const C4: f64 = 4.0 / 5.0;
const C5: f64 = 8.0 / 9.0;

const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;

// Fifth-order weights (also row 7 of the tableau)
const B1: f64 = 35.0 / 384.0;
const B3: f64 = 500.0 / 1113.0;
const B4: f64 = 125.0 / 192.0;
const B5: f64 = -2187.0 / 6784.0;
const B6: f64 = 11.0 / 84.0;

// Fifth minus fourth order weights
const E1: f64 = 71.0 / 57600.0;
const E3: f64 = -71.0 / 16695.0;
const E4: f64 = 71.0 / 1920.0;
const E5: f64 = -17253.0 / 339200.0;
const E6: f64 = 22.0 / 525.0;
const E7: f64 = -1.0 / 40.0;

const SAFETY: f64 = 0.9;
const MIN_SCALE: f64 = 0.2;
const MAX_SCALE: f64 = 10.0;

/// Adaptive solver state carried across grid intervals
struct DormandPrince<'a, F> {
    rate: &'a F,
    rtol: f64,
    atol: f64,
    max_steps: u32,
    /// Proposed next step size; `None` until the first step is sized
    step: Option<f64>,
    /// Derivative at the current point (FSAL)
    last_derivative: Option<(f64, f64, f64)>,
}

impl<'a, F> DormandPrince<'a, F>
where
    F: Fn(f64, f64) -> f64,
{
    fn new(rate: &'a F, rtol: f64, atol: f64, max_steps: u32) -> Self {
        Self {
            rate,
            rtol,
            atol,
            max_steps,
            step: None,
            last_derivative: None,
        }
    }

    /// Derivative at `(y, t)`, reusing the FSAL stage when it matches
    fn derivative(&self, y: f64, t: f64) -> f64 {
        match self.last_derivative {
            Some((ly, lt, k)) if ly == y && lt == t => k,
            _ => (self.rate)(y, t),
        }
    }

    fn initial_step(&self, y: f64, t0: f64, t1: f64, k1: f64) -> f64 {
        let scale = self.atol + self.rtol * y.abs();
        let d0 = y.abs() / scale;
        let d1 = k1.abs() / scale;
        let span = (t1 - t0).abs();

        let h = if d0 < 1e-5 || d1 < 1e-5 { 1e-6 } else { 0.01 * d0 / d1 };
        h.min(span)
    }

    /// Advance from `(y, t0)` to `t1`
    fn advance(&mut self, mut y: f64, t0: f64, t1: f64) -> Result<f64, StepFailure> {
        let mut t = t0;
        let mut k1 = self.derivative(y, t);
        let mut h = match self.step {
            Some(h) => h,
            None => self.initial_step(y, t0, t1, k1),
        };
        let mut steps = 0u32;

        while t < t1 {
            steps += 1;
            if steps > self.max_steps {
                return Err(StepFailure {
                    time: t,
                    reason: format!("exceeded {} steps in one grid interval", self.max_steps),
                });
            }

            let min_step = 1e-12 * t.abs().max(1.0);
            if h < min_step {
                return Err(StepFailure {
                    time: t,
                    reason: "step size underflow".to_string(),
                });
            }

            let remaining = t1 - t;
            let last = h >= remaining;
            let dt = if last { remaining } else { h };

            let rate = self.rate;
            let k2 = rate(y + dt * A21 * k1, t + C2 * dt);
            let k3 = rate(y + dt * (A31 * k1 + A32 * k2), t + C3 * dt);
            let k4 = rate(y + dt * (A41 * k1 + A42 * k2 + A43 * k3), t + C4 * dt);
            let k5 = rate(y + dt * (A51 * k1 + A52 * k2 + A53 * k3 + A54 * k4), t + C5 * dt);
            let k6 = rate(
                y + dt * (A61 * k1 + A62 * k2 + A63 * k3 + A64 * k4 + A65 * k5),
                t + dt,
            );
            let y_new = y + dt * (B1 * k1 + B3 * k3 + B4 * k4 + B5 * k5 + B6 * k6);
            let t_new = if last { t1 } else { t + dt };
            let k7 = rate(y_new, t_new);

            if !y_new.is_finite() {
                return Err(StepFailure {
                    time: t,
                    reason: "non-finite state".to_string(),
                });
            }

            let error_estimate = dt * (E1 * k1 + E3 * k3 + E4 * k4 + E5 * k5 + E6 * k6 + E7 * k7);
            let scale = self.atol + self.rtol * y.abs().max(y_new.abs());
            let error = (error_estimate / scale).abs();

            if error <= 1.0 {
                y = y_new;
                t = t_new;
                k1 = k7;

                let growth = if error == 0.0 {
                    MAX_SCALE
                } else {
                    (SAFETY * error.powf(-0.2)).clamp(MIN_SCALE, MAX_SCALE)
                };
                // A step clipped to the grid point does not shrink the next proposal
                h = if last { h.max(dt * growth) } else { dt * growth };
            } else {
                let shrink = (SAFETY * error.powf(-0.2)).max(MIN_SCALE);
                trace!("rejected step dt = {:e} at t = {} (error {:.3})", dt, t, error);
                h = dt * shrink;
            }
        }

        self.step = Some(h);
        self.last_derivative = Some((y, t, k1));
        Ok(y)
    }
}
