//! Restricted expression sublanguage for calibration and outcome rules
//!
//! Researchers supply small formulas in two places: fuzzy calibration
//! functions over the variable `count`, and outcome combination rules over
//! condition ids. Those used to be handed to a general-purpose interpreter;
//! this crate replaces that with a minimal, explicitly-scoped evaluator.
//!
//! Supported: f64 literals, named variables, `+ - * /`, unary minus,
//! comparisons (`< <= > >= == !=`, yielding 1.0 or 0.0), parentheses, and
//! the functions `min`/`max`. Nothing else parses, so a formula can never
//! reach the filesystem, the network, or arbitrary code.
//!
//! Callers treat every [`ExprError`] the same way: fall back to 0.0 and
//! record the error text. That policy lives with the callers; this crate
//! only reports.

pub mod error;
pub mod eval;
pub mod parser;

pub use error::ExprError;
pub use eval::evaluate;
pub use parser::Expr;
