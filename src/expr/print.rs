//! FFmpeg expression syntax.

use super::{BinOp, Expr};
use std::fmt;

const PREC_ADD: u8 = 1;
const PREC_MUL: u8 = 2;
const PREC_UNARY: u8 = 3;
const PREC_ATOM: u8 = 4;

impl BinOp {
    fn precedence(&self) -> u8 {
        match self {
            Self::Add | Self::Sub => PREC_ADD,
            Self::Mul | Self::Div => PREC_MUL,
        }
    }

    /// `a-(b-c)` and `a/(b/c)` need the parentheses kept.
    fn right_precedence(&self) -> u8 {
        match self {
            Self::Add | Self::Mul => self.precedence(),
            Self::Sub | Self::Div => self.precedence() + 1,
        }
    }
}

impl Expr {
    fn precedence(&self) -> u8 {
        match self {
            Self::Binary(op, _, _) => op.precedence(),
            Self::Neg(_) => PREC_UNARY,
            Self::Num(value) if *value < 0.0 => PREC_UNARY,
            _ => PREC_ATOM,
        }
    }
}

fn write_number(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    if value == 0.0 {
        // Avoids printing `-0`.
        f.write_str("0")
    } else {
        write!(f, "{value}")
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, operand: &Expr, min_precedence: u8) -> fmt::Result {
    // Signed literals are always wrapped so `a-(-1)` never prints as `a--1`.
    let signed_literal = matches!(operand, Expr::Num(v) if *v < 0.0);
    if signed_literal || operand.precedence() < min_precedence {
        write!(f, "({operand})")
    } else {
        write!(f, "{operand}")
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(value) => write_number(f, *value),
            Self::Var(var) => f.write_str(var.symbol()),
            Self::Neg(inner) => {
                f.write_str("-")?;
                write_operand(f, inner, PREC_ATOM)
            }
            Self::Binary(op, left, right) => {
                write_operand(f, left, op.precedence())?;
                write!(f, "{}", op.symbol())?;
                write_operand(f, right, op.right_precedence())
            }
            Self::Call(func, args) => {
                write!(f, "{}(", func.name())?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::expr::*;

    #[test]
    fn test_precedence_parentheses() {
        let t = || var(Var::Time);
        assert_eq!(((t() + 1.0) * 2.0).to_string(), "(t+1)*2");
        assert_eq!((t() + 1.0 * num(2.0)).to_string(), "t+1*2");
        assert_eq!((t() - (t() - 1.0)).to_string(), "t-(t-1)");
        assert_eq!((t() / (t() * 2.0)).to_string(), "t/(t*2)");
        assert_eq!((t() - (t() * 2.0)).to_string(), "t-t*2");
    }

    #[test]
    fn test_negative_literals_are_wrapped() {
        assert_eq!((var(Var::X) - num(-1.5)).to_string(), "X-(-1.5)");
        assert_eq!(num(-3.0).to_string(), "-3");
        assert_eq!((-(var(Var::X) + 1.0)).to_string(), "-(X+1)");
    }

    #[test]
    fn test_calls_and_symbols() {
        let e = if_else(lt(var(Var::Time), 2.5), var(Var::TextWidth), num(0.0));
        assert_eq!(e.to_string(), "if(lt(t,2.5),text_w,0)");
        let p = sample(Channel::Plane, var(Var::X), var(Var::Y) + 3.0);
        assert_eq!(p.to_string(), "p(X,Y+3)");
    }

    #[test]
    fn test_negative_zero_prints_as_zero() {
        assert_eq!(num(-0.0).to_string(), "0");
    }
}
