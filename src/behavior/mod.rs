//! Behavioral inputs and the savings adjustment factor
//!
//! Nine qualitative life-situation answers are expressed as multipliers
//! (1.0 neutral, below 1.0 favourable to saving, above 1.0 unfavourable)
//! and combined into a single [`AdjustmentFactor`].

mod variables;
mod factor;

pub use variables::{BehavioralVariable, PresetLevel};
pub use factor::{AdjustmentFactor, BehavioralProfile};
