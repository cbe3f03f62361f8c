//! Expression trees for FFmpeg's expression evaluator.
//!
//! Animations describe their timing and pixel math as an [`Expr`] and print
//! it last. `Display` writes FFmpeg expression syntax, and [`Expr::eval`]
//! computes the same tree numerically so curves can be checked without
//! running FFmpeg.
//!
//! ```
//! use lyric_video::expr::{clip, var, Var};
//!
//! let progress = clip((var(Var::Time) - 10.0) / 0.5, 0.0, 1.0);
//! assert_eq!(progress.to_string(), "clip((t-10)/0.5,0,1)");
//! ```

mod eval;
mod print;

pub use eval::{Env, EvalError};

use std::ops::{Add, Div, Mul, Neg, Sub};

/// Named values provided by the evaluating filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Var {
    /// Timestamp in seconds, spelled `t` by drawtext and rotate.
    Time,
    /// Timestamp in seconds, spelled `T` by geq.
    PixelTime,
    /// Pixel column in geq.
    X,
    /// Pixel row in geq.
    Y,
    /// Width of the frame being filtered (`W`).
    Width,
    /// Height of the frame being filtered (`H`).
    Height,
    /// Rendered width of the current drawtext string.
    TextWidth,
    /// Width of the overlaid stream in overlay (`w`).
    OverlayWidth,
    /// Height of the overlaid stream in overlay (`h`).
    OverlayHeight,
    Pi,
}

impl Var {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Time => "t",
            Self::PixelTime => "T",
            Self::X => "X",
            Self::Y => "Y",
            Self::Width => "W",
            Self::Height => "H",
            Self::TextWidth => "text_w",
            Self::OverlayWidth => "w",
            Self::OverlayHeight => "h",
            Self::Pi => "PI",
        }
    }
}

/// Arithmetic operators printed infix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinOp {
    pub fn symbol(&self) -> char {
        match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Div => '/',
        }
    }
}

/// Plane sampled by a geq pixel lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// The plane currently being computed (`p`).
    Plane,
    Red,
    Green,
    Blue,
}

/// Functions understood by the evaluator, printed as `name(arg,...)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func {
    If,
    Lt,
    Lte,
    Gt,
    Gte,
    Eq,
    Not,
    Between,
    Clip,
    Min,
    Max,
    Abs,
    Sin,
    Cos,
    Sqrt,
    Pow,
    Sample(Channel),
}

impl Func {
    pub fn name(&self) -> &'static str {
        match self {
            Self::If => "if",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Eq => "eq",
            Self::Not => "not",
            Self::Between => "between",
            Self::Clip => "clip",
            Self::Min => "min",
            Self::Max => "max",
            Self::Abs => "abs",
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Sqrt => "sqrt",
            Self::Pow => "pow",
            Self::Sample(Channel::Plane) => "p",
            Self::Sample(Channel::Red) => "r",
            Self::Sample(Channel::Green) => "g",
            Self::Sample(Channel::Blue) => "b",
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            Self::Not | Self::Abs | Self::Sin | Self::Cos | Self::Sqrt => 1,
            Self::If | Self::Between | Self::Clip => 3,
            _ => 2,
        }
    }
}

/// Expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Num(f64),
    Var(Var),
    Neg(Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Call(Func, Vec<Expr>),
}

impl Expr {
    fn binary(op: BinOp, left: Expr, right: Expr) -> Self {
        Self::Binary(op, Box::new(left), Box::new(right))
    }

    fn call(func: Func, args: Vec<Expr>) -> Self {
        debug_assert_eq!(args.len(), func.arity(), "wrong arity for {}", func.name());
        Self::Call(func, args)
    }

    /// Number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        match self {
            Self::Num(_) | Self::Var(_) => 1,
            Self::Neg(inner) => 1 + inner.node_count(),
            Self::Binary(_, left, right) => 1 + left.node_count() + right.node_count(),
            Self::Call(_, args) => 1 + args.iter().map(Expr::node_count).sum::<usize>(),
        }
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Self::Num(value)
    }
}

impl From<u32> for Expr {
    fn from(value: u32) -> Self {
        Self::Num(value as f64)
    }
}

impl From<usize> for Expr {
    fn from(value: usize) -> Self {
        Self::Num(value as f64)
    }
}

impl From<Var> for Expr {
    fn from(value: Var) -> Self {
        Self::Var(value)
    }
}

macro_rules! impl_arith {
    ($trait:ident, $method:ident, $op:expr) => {
        impl<R: Into<Expr>> $trait<R> for Expr {
            type Output = Expr;

            fn $method(self, rhs: R) -> Expr {
                Expr::binary($op, self, rhs.into())
            }
        }

        impl $trait<Expr> for f64 {
            type Output = Expr;

            fn $method(self, rhs: Expr) -> Expr {
                Expr::binary($op, Expr::Num(self), rhs)
            }
        }
    };
}

impl_arith!(Add, add, BinOp::Add);
impl_arith!(Sub, sub, BinOp::Sub);
impl_arith!(Mul, mul, BinOp::Mul);
impl_arith!(Div, div, BinOp::Div);

impl Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        match self {
            Expr::Num(value) => Expr::Num(-value),
            other => Expr::Neg(Box::new(other)),
        }
    }
}

pub fn num(value: f64) -> Expr {
    Expr::Num(value)
}

pub fn var(var: Var) -> Expr {
    Expr::Var(var)
}

/// `then` when `cond` is non-zero, else `otherwise`.
pub fn if_else(cond: Expr, then: impl Into<Expr>, otherwise: impl Into<Expr>) -> Expr {
    Expr::call(Func::If, vec![cond, then.into(), otherwise.into()])
}

pub fn lt(a: impl Into<Expr>, b: impl Into<Expr>) -> Expr {
    Expr::call(Func::Lt, vec![a.into(), b.into()])
}

pub fn lte(a: impl Into<Expr>, b: impl Into<Expr>) -> Expr {
    Expr::call(Func::Lte, vec![a.into(), b.into()])
}

pub fn gt(a: impl Into<Expr>, b: impl Into<Expr>) -> Expr {
    Expr::call(Func::Gt, vec![a.into(), b.into()])
}

pub fn gte(a: impl Into<Expr>, b: impl Into<Expr>) -> Expr {
    Expr::call(Func::Gte, vec![a.into(), b.into()])
}

pub fn eq(a: impl Into<Expr>, b: impl Into<Expr>) -> Expr {
    Expr::call(Func::Eq, vec![a.into(), b.into()])
}

pub fn not(a: Expr) -> Expr {
    Expr::call(Func::Not, vec![a])
}

/// 1 when `min <= x <= max`.
pub fn between(x: impl Into<Expr>, min: impl Into<Expr>, max: impl Into<Expr>) -> Expr {
    Expr::call(Func::Between, vec![x.into(), min.into(), max.into()])
}

pub fn clip(x: impl Into<Expr>, min: impl Into<Expr>, max: impl Into<Expr>) -> Expr {
    Expr::call(Func::Clip, vec![x.into(), min.into(), max.into()])
}

pub fn min(a: impl Into<Expr>, b: impl Into<Expr>) -> Expr {
    Expr::call(Func::Min, vec![a.into(), b.into()])
}

pub fn max(a: impl Into<Expr>, b: impl Into<Expr>) -> Expr {
    Expr::call(Func::Max, vec![a.into(), b.into()])
}

pub fn abs(x: Expr) -> Expr {
    Expr::call(Func::Abs, vec![x])
}

pub fn sin(x: Expr) -> Expr {
    Expr::call(Func::Sin, vec![x])
}

pub fn cos(x: Expr) -> Expr {
    Expr::call(Func::Cos, vec![x])
}

pub fn sqrt(x: Expr) -> Expr {
    Expr::call(Func::Sqrt, vec![x])
}

pub fn pow(base: Expr, exponent: impl Into<Expr>) -> Expr {
    Expr::call(Func::Pow, vec![base, exponent.into()])
}

/// geq pixel lookup of `channel` at `(x, y)`.
pub fn sample(channel: Channel, x: impl Into<Expr>, y: impl Into<Expr>) -> Expr {
    Expr::call(Func::Sample(channel), vec![x.into(), y.into()])
}

/// Cosine ease-in-out: `(1 - cos(PI * clip(progress, 0, 1))) / 2`.
///
/// Maps 0 to 0 and 1 to 1 without overshoot.
pub fn ease_in_out(progress: Expr) -> Expr {
    (1.0 - cos(var(Var::Pi) * clip(progress, 0.0, 1.0))) / 2.0
}

/// Linear interpolation from `from` to `to` by `weight`.
pub fn lerp(from: Expr, to: Expr, weight: Expr) -> Expr {
    from.clone() + (to - from) * weight
}
