//! Built-in expression evaluator
//!
//! A small JavaScript-flavoured language: literals, variable lookup, member
//! access, arithmetic, comparison, logic and `name = expr` assignment.

use std::collections::BTreeMap;

use super::ast::{BinaryOp, Expr, Stmt, UnaryOp};
use super::parser::parse_program;
use super::{EvalError, Evaluator, Scope, Val};

#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinEvaluator;

impl Evaluator for BuiltinEvaluator {
    fn evaluate(&self, expr: &str, scope: &mut Scope) -> Result<Val, EvalError> {
        let program = parse_program(expr)?;
        let mut last = Val::Null;
        for stmt in &program {
            last = exec_stmt(stmt, scope)?;
        }
        Ok(last)
    }
}

fn exec_stmt(stmt: &Stmt, scope: &mut Scope) -> Result<Val, EvalError> {
    match stmt {
        Stmt::Assign { name, expr } => {
            let value = eval_expr(expr, scope)?;
            scope.set(name.clone(), value.clone());
            Ok(value)
        }
        Stmt::Expr { expr } => eval_expr(expr, scope),
    }
}

/* ===================== Expressions ===================== */

pub fn eval_expr(expr: &Expr, scope: &Scope) -> Result<Val, EvalError> {
    match expr {
        Expr::LitNull => Ok(Val::Null),
        Expr::LitBool { v } => Ok(Val::Bool(*v)),
        Expr::LitNum { v } => Ok(Val::Num(*v)),
        Expr::LitStr { v } => Ok(Val::Str(v.clone())),
        Expr::LitList { items } => items
            .iter()
            .map(|item| eval_expr(item, scope))
            .collect::<Result<Vec<_>, _>>()
            .map(Val::List),
        Expr::LitObj { entries } => {
            let mut obj = BTreeMap::new();
            for (key, value) in entries {
                obj.insert(key.clone(), eval_expr(value, scope)?);
            }
            Ok(Val::Obj(obj))
        }
        Expr::Ident { name } => scope
            .get(name)
            .cloned()
            .ok_or_else(|| EvalError::Undefined(name.clone())),
        Expr::Member { object, property } => {
            let object = eval_expr(object, scope)?;
            member(&object, property)
        }
        Expr::Index { object, index } => {
            let object = eval_expr(object, scope)?;
            let index = eval_expr(index, scope)?;
            match (&object, &index) {
                (Val::List(items), Val::Num(n)) => Ok(list_index(items, *n)),
                (Val::Str(s), Val::Num(n)) => Ok(string_index(s, *n)),
                (_, Val::Str(key)) => member(&object, key),
                _ => Err(EvalError::Type(format!(
                    "cannot index {} with {}",
                    object.type_name(),
                    index.type_name()
                ))),
            }
        }
        Expr::Unary { op, operand } => {
            let value = eval_expr(operand, scope)?;
            match op {
                UnaryOp::Not => Ok(Val::Bool(!value.is_truthy())),
                UnaryOp::Neg => Ok(Val::Num(-as_number(&value)?)),
            }
        }
        Expr::Binary { op, left, right } => eval_binary(*op, left, right, scope),
    }
}

fn eval_binary(op: BinaryOp, left: &Expr, right: &Expr, scope: &Scope) -> Result<Val, EvalError> {
    let lhs = eval_expr(left, scope)?;
    match op {
        BinaryOp::Or => eval_logical(lhs.is_truthy(), lhs, right, scope),
        BinaryOp::And => eval_logical(!lhs.is_truthy(), lhs, right, scope),
        _ => {
            let rhs = eval_expr(right, scope)?;
            eval_arith(op, lhs, rhs)
        }
    }
}

/// Short-circuit operators return an operand, not a bool
fn eval_logical(short: bool, lhs: Val, right: &Expr, scope: &Scope) -> Result<Val, EvalError> {
    if short {
        Ok(lhs)
    } else {
        eval_expr(right, scope)
    }
}

fn eval_arith(op: BinaryOp, lhs: Val, rhs: Val) -> Result<Val, EvalError> {
    match op {
        BinaryOp::Eq => Ok(Val::Bool(lhs == rhs)),
        BinaryOp::Ne => Ok(Val::Bool(lhs != rhs)),
        BinaryOp::Add => match (&lhs, &rhs) {
            (Val::Str(_), _) | (_, Val::Str(_)) => Ok(Val::Str(format!("{}{}", lhs, rhs))),
            _ => Ok(Val::Num(as_number(&lhs)? + as_number(&rhs)?)),
        },
        BinaryOp::Sub => Ok(Val::Num(as_number(&lhs)? - as_number(&rhs)?)),
        BinaryOp::Mul => Ok(Val::Num(as_number(&lhs)? * as_number(&rhs)?)),
        BinaryOp::Div => {
            let divisor = as_number(&rhs)?;
            if divisor == 0.0 {
                return Err(EvalError::Type("division by zero".to_string()));
            }
            Ok(Val::Num(as_number(&lhs)? / divisor))
        }
        BinaryOp::Mod => {
            let divisor = as_number(&rhs)?;
            if divisor == 0.0 {
                return Err(EvalError::Type("modulo by zero".to_string()));
            }
            Ok(Val::Num(as_number(&lhs)? % divisor))
        }
        BinaryOp::Lt | BinaryOp::Lte | BinaryOp::Gt | BinaryOp::Gte => compare(op, &lhs, &rhs),
        BinaryOp::Or | BinaryOp::And => Err(EvalError::Type(format!(
            "{:?} is not an arithmetic operator",
            op
        ))),
    }
}

fn compare(op: BinaryOp, lhs: &Val, rhs: &Val) -> Result<Val, EvalError> {
    let ordering = match (lhs, rhs) {
        (Val::Str(a), Val::Str(b)) => a.partial_cmp(b),
        _ => as_number(lhs)?.partial_cmp(&as_number(rhs)?),
    };
    let Some(ordering) = ordering else {
        return Ok(Val::Bool(false));
    };
    Ok(Val::Bool(match op {
        BinaryOp::Lt => ordering.is_lt(),
        BinaryOp::Lte => ordering.is_le(),
        BinaryOp::Gt => ordering.is_gt(),
        _ => ordering.is_ge(),
    }))
}

/* ===================== Helpers ===================== */

fn member(object: &Val, property: &str) -> Result<Val, EvalError> {
    match (object, property) {
        (Val::List(items), "length") => Ok(Val::Num(items.len() as f64)),
        (Val::Str(s), "length") => Ok(Val::Num(s.chars().count() as f64)),
        (Val::Obj(map), key) => Ok(map.get(key).cloned().unwrap_or(Val::Null)),
        (Val::Null, key) => Err(EvalError::Type(format!(
            "cannot read property '{}' of null",
            key
        ))),
        (_, _) => Ok(Val::Null),
    }
}

fn list_index(items: &[Val], n: f64) -> Val {
    if n < 0.0 || n.fract() != 0.0 {
        return Val::Null;
    }
    items.get(n as usize).cloned().unwrap_or(Val::Null)
}

fn string_index(s: &str, n: f64) -> Val {
    if n < 0.0 || n.fract() != 0.0 {
        return Val::Null;
    }
    s.chars()
        .nth(n as usize)
        .map(|c| Val::Str(c.to_string()))
        .unwrap_or(Val::Null)
}

fn as_number(value: &Val) -> Result<f64, EvalError> {
    match value {
        Val::Num(n) => Ok(*n),
        Val::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Val::Null => Ok(0.0),
        Val::Str(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| EvalError::Type(format!("'{}' is not a number", s))),
        other => Err(EvalError::Type(format!(
            "expected number, got {}",
            other.type_name()
        ))),
    }
}
