//! Evaluation of parsed expressions against a variable scope

use crate::error::ExprError;
use crate::parser::{BinOp, Expr};
use std::collections::BTreeMap;

/// Parse and evaluate in one step
///
/// Convenience for callers that evaluate a formula once; repeated evaluation
/// over many cases should parse once and call [`Expr::evaluate`].
pub fn evaluate(source: &str, variables: &BTreeMap<String, f64>) -> Result<f64, ExprError> {
    Expr::parse(source)?.evaluate(variables)
}

impl Expr {
    /// Evaluate against the given variable bindings
    ///
    /// Comparisons yield 1.0 or 0.0. Division by zero and unbound variables
    /// are errors; callers fall back to 0.0 and record the message.
    pub fn evaluate(&self, variables: &BTreeMap<String, f64>) -> Result<f64, ExprError> {
        match self {
            Expr::Number(value) => Ok(*value),
            Expr::Variable(name) => variables
                .get(name)
                .copied()
                .ok_or_else(|| ExprError::UnknownVariable(name.clone())),
            Expr::Neg(inner) => Ok(-inner.evaluate(variables)?),
            Expr::Binary { op, lhs, rhs } => {
                let l = lhs.evaluate(variables)?;
                let r = rhs.evaluate(variables)?;
                match op {
                    BinOp::Add => Ok(l + r),
                    BinOp::Sub => Ok(l - r),
                    BinOp::Mul => Ok(l * r),
                    BinOp::Div => {
                        if r == 0.0 {
                            Err(ExprError::DivisionByZero)
                        } else {
                            Ok(l / r)
                        }
                    }
                    BinOp::Lt => Ok(bool_to_f64(l < r)),
                    BinOp::Le => Ok(bool_to_f64(l <= r)),
                    BinOp::Gt => Ok(bool_to_f64(l > r)),
                    BinOp::Ge => Ok(bool_to_f64(l >= r)),
                    BinOp::Eq => Ok(bool_to_f64(l == r)),
                    BinOp::Ne => Ok(bool_to_f64(l != r)),
                }
            }
            Expr::Call { function, args } => {
                let fold = match function.as_str() {
                    "min" => f64::min as fn(f64, f64) -> f64,
                    "max" => f64::max as fn(f64, f64) -> f64,
                    other => return Err(ExprError::UnknownFunction(other.to_string())),
                };
                if args.len() < 2 {
                    return Err(ExprError::WrongArity {
                        function: function.clone(),
                        got: args.len(),
                    });
                }
                let mut acc = args[0].evaluate(variables)?;
                for arg in &args[1..] {
                    acc = fold(acc, arg.evaluate(variables)?);
                }
                Ok(acc)
            }
        }
    }
}

fn bool_to_f64(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect()
    }

    #[test]
    fn test_arithmetic_precedence() {
        assert_eq!(evaluate("1 + 2 * 3", &BTreeMap::new()).unwrap(), 7.0);
        assert_eq!(evaluate("(1 + 2) * 3", &BTreeMap::new()).unwrap(), 9.0);
    }

    #[test]
    fn test_variable_binding() {
        let v = vars(&[("count", 4.0)]);
        assert_eq!(evaluate("count / 8", &v).unwrap(), 0.5);
    }

    #[test]
    fn test_unknown_variable() {
        let err = evaluate("missing + 1", &BTreeMap::new()).unwrap_err();
        assert_eq!(err, ExprError::UnknownVariable("missing".to_string()));
    }

    #[test]
    fn test_min_max() {
        let v = vars(&[("a", 0.3), ("b", 0.7)]);
        assert_eq!(evaluate("min(a, b)", &v).unwrap(), 0.3);
        assert_eq!(evaluate("max(a, b)", &v).unwrap(), 0.7);
        assert_eq!(evaluate("max(a, b, 0.9)", &v).unwrap(), 0.9);
    }

    #[test]
    fn test_only_min_max_callable() {
        let err = evaluate("sqrt(4)", &BTreeMap::new()).unwrap_err();
        assert_eq!(err, ExprError::UnknownFunction("sqrt".to_string()));
    }

    #[test]
    fn test_arity_enforced() {
        let err = evaluate("min(1)", &BTreeMap::new()).unwrap_err();
        assert!(matches!(err, ExprError::WrongArity { got: 1, .. }));
    }

    #[test]
    fn test_comparison_yields_unit_values() {
        let v = vars(&[("count", 5.0)]);
        assert_eq!(evaluate("count >= 3", &v).unwrap(), 1.0);
        assert_eq!(evaluate("count < 3", &v).unwrap(), 0.0);
    }

    #[test]
    fn test_division_by_zero_is_error() {
        let err = evaluate("1 / 0", &BTreeMap::new()).unwrap_err();
        assert_eq!(err, ExprError::DivisionByZero);
    }

    #[test]
    fn test_unary_minus() {
        assert_eq!(evaluate("-2 + 5", &BTreeMap::new()).unwrap(), 3.0);
    }

    #[test]
    fn test_typical_fuzzy_function() {
        // The shape researchers actually write: a saturating ratio.
        let v = vars(&[("count", 12.0)]);
        assert_eq!(evaluate("min(count / 10, 1)", &v).unwrap(), 1.0);
        let v = vars(&[("count", 4.0)]);
        assert!((evaluate("min(count / 10, 1)", &v).unwrap() - 0.4).abs() < 1e-12);
    }
}
