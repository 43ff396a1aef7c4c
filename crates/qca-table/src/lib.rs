//! Truth-table construction
//!
//! Groups calibrated cases into condition configurations and summarizes each
//! group with an outcome, a consistency score and a coverage share. Crisp
//! mode discretizes memberships at the configured threshold; fuzzy mode
//! preserves exact values (rounded to 3 decimals only to keep grouping keys
//! stable against floating noise). Coverage is computed in a second pass
//! because each row's share depends on a global aggregate that only exists
//! once all rows do.

pub mod builder;

pub use builder::TruthTableBuilder;
