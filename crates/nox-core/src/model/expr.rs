//! Operands of `noexcept(...)` and their constant evaluation.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A compile-time value an operand can fold to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConstValue {
    Bool(bool),
    Int(i64),
}

impl ConstValue {
    /// Contextual conversion to `bool`.
    pub fn truthy(self) -> bool {
        match self {
            ConstValue::Bool(value) => value,
            ConstValue::Int(value) => value != 0,
        }
    }

    /// Integral promotion; `true` is 1.
    pub fn as_int(self) -> i64 {
        match self {
            ConstValue::Bool(value) => i64::from(value),
            ConstValue::Int(value) => value,
        }
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Bool(value) => write!(f, "{}", value),
            ConstValue::Int(value) => write!(f, "{}", value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnaryOp {
    Not,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BinaryOp {
    And,
    Or,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
        }
    }
}

/// The operand of a `noexcept(...)` specifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SpecExpr {
    Bool {
        value: bool,
    },
    Int {
        value: i64,
    },
    /// A (possibly qualified) name looked up in the unit's constants.
    Name {
        name: String,
    },
    /// Anything that needs template arguments or semantic information
    /// nox does not have, kept as its source spelling.
    Dependent {
        text: String,
    },
    Unary {
        op: UnaryOp,
        operand: Box<SpecExpr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<SpecExpr>,
        rhs: Box<SpecExpr>,
    },
    Conditional {
        condition: Box<SpecExpr>,
        then: Box<SpecExpr>,
        otherwise: Box<SpecExpr>,
    },
}

/// Why an operand could not be folded to a constant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("value of '{0}' is not known")]
    UnknownName(String),

    #[error("'{0}' depends on a template parameter")]
    Dependent(String),

    #[error("integer overflow in '{0}'")]
    Overflow(&'static str),

    #[error("division by zero")]
    DivisionByZero,
}

impl SpecExpr {
    pub fn boolean(value: bool) -> Self {
        SpecExpr::Bool { value }
    }

    pub fn name(name: impl Into<String>) -> Self {
        SpecExpr::Name { name: name.into() }
    }

    pub fn dependent(text: impl Into<String>) -> Self {
        SpecExpr::Dependent { text: text.into() }
    }

    pub fn not(operand: SpecExpr) -> Self {
        SpecExpr::Unary {
            op: UnaryOp::Not,
            operand: Box::new(operand),
        }
    }

    pub fn binary(op: BinaryOp, lhs: SpecExpr, rhs: SpecExpr) -> Self {
        SpecExpr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Fold the operand to a constant.
    ///
    /// `&&`, `||` and `?:` short-circuit, so `false && T::value` folds even
    /// though `T::value` does not.
    pub fn evaluate(&self, constants: &FxHashMap<String, ConstValue>) -> Result<ConstValue, EvalError> {
        match self {
            SpecExpr::Bool { value } => Ok(ConstValue::Bool(*value)),
            SpecExpr::Int { value } => Ok(ConstValue::Int(*value)),
            SpecExpr::Name { name } => constants
                .get(name)
                .copied()
                .ok_or_else(|| EvalError::UnknownName(name.clone())),
            SpecExpr::Dependent { text } => Err(EvalError::Dependent(text.clone())),
            SpecExpr::Unary { op, operand } => {
                let value = operand.evaluate(constants)?;
                match op {
                    UnaryOp::Not => Ok(ConstValue::Bool(!value.truthy())),
                    UnaryOp::Neg => value
                        .as_int()
                        .checked_neg()
                        .map(ConstValue::Int)
                        .ok_or(EvalError::Overflow("-")),
                }
            }
            SpecExpr::Binary { op, lhs, rhs } => match op {
                BinaryOp::And => {
                    if !lhs.evaluate(constants)?.truthy() {
                        return Ok(ConstValue::Bool(false));
                    }
                    Ok(ConstValue::Bool(rhs.evaluate(constants)?.truthy()))
                }
                BinaryOp::Or => {
                    if lhs.evaluate(constants)?.truthy() {
                        return Ok(ConstValue::Bool(true));
                    }
                    Ok(ConstValue::Bool(rhs.evaluate(constants)?.truthy()))
                }
                _ => {
                    let left = lhs.evaluate(constants)?.as_int();
                    let right = rhs.evaluate(constants)?.as_int();
                    fold_arithmetic(*op, left, right)
                }
            },
            SpecExpr::Conditional {
                condition,
                then,
                otherwise,
            } => {
                if condition.evaluate(constants)?.truthy() {
                    then.evaluate(constants)
                } else {
                    otherwise.evaluate(constants)
                }
            }
        }
    }
}

fn fold_arithmetic(op: BinaryOp, left: i64, right: i64) -> Result<ConstValue, EvalError> {
    let overflow = || EvalError::Overflow(op.symbol());
    let value = match op {
        BinaryOp::Eq => return Ok(ConstValue::Bool(left == right)),
        BinaryOp::Ne => return Ok(ConstValue::Bool(left != right)),
        BinaryOp::Lt => return Ok(ConstValue::Bool(left < right)),
        BinaryOp::Le => return Ok(ConstValue::Bool(left <= right)),
        BinaryOp::Gt => return Ok(ConstValue::Bool(left > right)),
        BinaryOp::Ge => return Ok(ConstValue::Bool(left >= right)),
        BinaryOp::Add => left.checked_add(right).ok_or_else(overflow)?,
        BinaryOp::Sub => left.checked_sub(right).ok_or_else(overflow)?,
        BinaryOp::Mul => left.checked_mul(right).ok_or_else(overflow)?,
        BinaryOp::Div | BinaryOp::Rem if right == 0 => return Err(EvalError::DivisionByZero),
        BinaryOp::Div => left.checked_div(right).ok_or_else(overflow)?,
        BinaryOp::Rem => left.checked_rem(right).ok_or_else(overflow)?,
        BinaryOp::And | BinaryOp::Or => unreachable!("logical operators short-circuit before folding"),
    };
    Ok(ConstValue::Int(value))
}
