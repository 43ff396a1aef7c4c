//! Expression errors

use thiserror::Error;

/// Errors from parsing or evaluating a restricted expression
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    /// Tokenizer or parser failure
    #[error("parse error at position {position}: {message}")]
    Parse {
        /// Byte offset into the source
        position: usize,
        /// What went wrong
        message: String,
    },

    /// Identifier not bound in the evaluation scope
    #[error("unknown variable '{0}'")]
    UnknownVariable(String),

    /// Only min/max are callable
    #[error("unknown function '{0}' (only min and max are available)")]
    UnknownFunction(String),

    /// min/max need at least two arguments
    #[error("function '{function}' needs at least 2 arguments, got {got}")]
    WrongArity {
        /// The function that was called
        function: String,
        /// How many arguments were supplied
        got: usize,
    },

    /// Division by zero is an error, not infinity
    #[error("division by zero")]
    DivisionByZero,
}
