//! Numeric evaluation mirroring FFmpeg's semantics.

use super::{BinOp, Expr, Func, Var};
use std::collections::HashMap;

/// Errors raised while evaluating an expression tree.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("Unbound variable '{}'", .0.symbol())]
    Unbound(Var),
    #[error("'{0}' called with {1} arguments")]
    Arity(&'static str, usize),
}

/// Variable bindings for [`Expr::eval`].
///
/// Pixel lookups (`p(X,Y)` and friends) all return the same `sample` value.
#[derive(Debug, Clone, Default)]
pub struct Env {
    values: HashMap<Var, f64>,
    sample: f64,
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, var: Var, value: f64) -> Self {
        self.values.insert(var, value);
        self
    }

    pub fn with_sample(mut self, value: f64) -> Self {
        self.sample = value;
        self
    }

    pub fn get(&self, var: Var) -> Result<f64, EvalError> {
        if var == Var::Pi {
            return Ok(std::f64::consts::PI);
        }
        self.values.get(&var).copied().ok_or(EvalError::Unbound(var))
    }
}

fn truth(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

impl Expr {
    /// Evaluate with the given bindings.
    pub fn eval(&self, env: &Env) -> Result<f64, EvalError> {
        match self {
            Self::Num(value) => Ok(*value),
            Self::Var(var) => env.get(*var),
            Self::Neg(inner) => Ok(-inner.eval(env)?),
            Self::Binary(op, left, right) => {
                let (a, b) = (left.eval(env)?, right.eval(env)?);
                Ok(match op {
                    BinOp::Add => a + b,
                    BinOp::Sub => a - b,
                    BinOp::Mul => a * b,
                    BinOp::Div => a / b,
                })
            }
            Self::Call(Func::If, args) => match args.as_slice() {
                // Only the taken branch is evaluated.
                [cond, then, otherwise] => {
                    if cond.eval(env)? != 0.0 {
                        then.eval(env)
                    } else {
                        otherwise.eval(env)
                    }
                }
                _ => Err(EvalError::Arity(Func::If.name(), args.len())),
            },
            Self::Call(func, args) => {
                let values = args.iter().map(|arg| arg.eval(env)).collect::<Result<Vec<_>, _>>()?;
                apply(*func, &values, env)
            }
        }
    }
}

fn apply(func: Func, values: &[f64], env: &Env) -> Result<f64, EvalError> {
    let result = match (func, values) {
        (Func::Lt, [a, b]) => truth(a < b),
        (Func::Lte, [a, b]) => truth(a <= b),
        (Func::Gt, [a, b]) => truth(a > b),
        (Func::Gte, [a, b]) => truth(a >= b),
        (Func::Eq, [a, b]) => truth(a == b),
        (Func::Not, [a]) => truth(*a == 0.0),
        (Func::Between, [x, lo, hi]) => truth(lo <= x && x <= hi),
        (Func::Clip, [x, lo, hi]) => x.max(*lo).min(*hi),
        (Func::Min, [a, b]) => a.min(*b),
        (Func::Max, [a, b]) => a.max(*b),
        (Func::Abs, [a]) => a.abs(),
        (Func::Sin, [a]) => a.sin(),
        (Func::Cos, [a]) => a.cos(),
        (Func::Sqrt, [a]) => a.sqrt(),
        (Func::Pow, [a, b]) => a.powf(*b),
        (Func::Sample(_), [_, _]) => env.sample,
        _ => return Err(EvalError::Arity(func.name(), values.len())),
    };
    Ok(result)
}
