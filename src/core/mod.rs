//! Macro-nutrient logic: resolving raw food records, scaling, aggregating,
//! evaluating targets and body metrics. Nothing in here performs I/O.

pub mod aggregate;
pub mod health;
pub mod macros;
pub mod nutrients;
pub mod targets;

pub use aggregate::{daily_totals, range_totals, DayTotals};
pub use health::{bmi, body_fat_estimate, BmiCategory, Gender, HealthSummary};
pub use macros::{scale, CanonicalMacros};
pub use nutrients::resolve;
pub use targets::{compare, derive_targets, MacroSplit, MacroTargets, TargetComparison};
