//! PEST-based parser for the built-in expression language
//!
//! Produces the statement list evaluated by [`super::eval::BuiltinEvaluator`].

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use super::ast::{BinaryOp, Expr, Stmt, UnaryOp};
use super::EvalError;

/* ===================== PEST Parser ===================== */

#[derive(Parser)]
#[grammar = "expr/expr.pest"]
struct ExprParser;

pub type ParseResult<T> = Result<T, EvalError>;

impl From<pest::error::Error<Rule>> for EvalError {
    fn from(err: pest::error::Error<Rule>) -> Self {
        EvalError::Syntax(err.to_string())
    }
}

fn build_error(message: impl Into<String>) -> EvalError {
    EvalError::Syntax(message.into())
}

/* ===================== Public API ===================== */

/// Parse expression source into its statements
///
/// `a = 1; a + 1` yields two statements; the value of the last one is the
/// value of the whole program.
pub fn parse_program(source: &str) -> ParseResult<Vec<Stmt>> {
    let program = ExprParser::parse(Rule::program, source)?
        .next()
        .ok_or_else(|| build_error("empty program"))?;

    program
        .into_inner()
        .filter(|pair| pair.as_rule() == Rule::statement)
        .map(build_statement)
        .collect()
}

/* ===================== AST Builder ===================== */

fn build_statement(pair: Pair<Rule>) -> ParseResult<Stmt> {
    let inner = first_inner(pair)?;
    match inner.as_rule() {
        Rule::assignment => {
            let mut parts = inner.into_inner();
            let name = next_pair(&mut parts, "assignment target")?
                .as_str()
                .to_string();
            let expr = build_expression(next_pair(&mut parts, "assignment value")?)?;
            Ok(Stmt::Assign { name, expr })
        }
        Rule::expression => Ok(Stmt::Expr {
            expr: build_expression(inner)?,
        }),
        other => Err(build_error(format!("unexpected statement: {:?}", other))),
    }
}

fn build_expression(pair: Pair<Rule>) -> ParseResult<Expr> {
    match pair.as_rule() {
        Rule::expression => build_expression(first_inner(pair)?),
        Rule::logical_or
        | Rule::logical_and
        | Rule::equality
        | Rule::comparison
        | Rule::additive
        | Rule::multiplicative => build_binary_expr(pair),
        Rule::unary => build_unary_expr(pair),
        Rule::postfix => build_postfix_expr(pair),
        Rule::identifier => Ok(Expr::Ident {
            name: pair.as_str().to_string(),
        }),
        Rule::number => pair
            .as_str()
            .parse::<f64>()
            .map(|v| Expr::LitNum { v })
            .map_err(|e| build_error(format!("bad number '{}': {}", pair.as_str(), e))),
        Rule::string => Ok(Expr::LitStr {
            v: build_string(pair)?,
        }),
        Rule::boolean => Ok(Expr::LitBool {
            v: pair.as_str() == "true",
        }),
        Rule::null => Ok(Expr::LitNull),
        Rule::array => {
            let items = pair
                .into_inner()
                .map(build_expression)
                .collect::<ParseResult<Vec<_>>>()?;
            Ok(Expr::LitList { items })
        }
        Rule::object => {
            let mut entries = Vec::new();
            for entry in pair.into_inner() {
                let mut parts = entry.into_inner();
                let key_pair = next_pair(&mut parts, "object key")?;
                let key = match key_pair.as_rule() {
                    Rule::string => build_string(key_pair)?,
                    _ => key_pair.as_str().to_string(),
                };
                let value = build_expression(next_pair(&mut parts, "object value")?)?;
                entries.push((key, value));
            }
            Ok(Expr::LitObj { entries })
        }
        other => Err(build_error(format!("unexpected expression: {:?}", other))),
    }
}

fn build_binary_expr(pair: Pair<Rule>) -> ParseResult<Expr> {
    let mut inner = pair.into_inner();
    let mut left = build_expression(next_pair(&mut inner, "left operand")?)?;

    while let Some(op_pair) = inner.next() {
        let op = match op_pair.as_rule() {
            Rule::op_or => BinaryOp::Or,
            Rule::op_and => BinaryOp::And,
            Rule::op_eq => BinaryOp::Eq,
            Rule::op_ne => BinaryOp::Ne,
            Rule::op_lt => BinaryOp::Lt,
            Rule::op_lte => BinaryOp::Lte,
            Rule::op_gt => BinaryOp::Gt,
            Rule::op_gte => BinaryOp::Gte,
            Rule::op_add => BinaryOp::Add,
            Rule::op_sub => BinaryOp::Sub,
            Rule::op_mul => BinaryOp::Mul,
            Rule::op_div => BinaryOp::Div,
            Rule::op_mod => BinaryOp::Mod,
            other => return Err(build_error(format!("expected operator, got {:?}", other))),
        };
        let right = build_expression(next_pair(&mut inner, "right operand")?)?;
        left = Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        };
    }

    Ok(left)
}

fn build_unary_expr(pair: Pair<Rule>) -> ParseResult<Expr> {
    let mut ops = Vec::new();
    let mut operand = None;
    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::op_not => ops.push(UnaryOp::Not),
            Rule::op_neg => ops.push(UnaryOp::Neg),
            _ => operand = Some(build_expression(part)?),
        }
    }

    let mut expr = operand.ok_or_else(|| build_error("missing unary operand"))?;
    // Innermost operator applies first
    for op in ops.into_iter().rev() {
        expr = Expr::Unary {
            op,
            operand: Box::new(expr),
        };
    }
    Ok(expr)
}

fn build_postfix_expr(pair: Pair<Rule>) -> ParseResult<Expr> {
    let mut inner = pair.into_inner();
    let mut expr = build_expression(next_pair(&mut inner, "primary")?)?;

    for suffix in inner {
        expr = match suffix.as_rule() {
            Rule::member => Expr::Member {
                object: Box::new(expr),
                property: first_inner(suffix)?.as_str().to_string(),
            },
            Rule::index => Expr::Index {
                object: Box::new(expr),
                index: Box::new(build_expression(first_inner(suffix)?)?),
            },
            other => return Err(build_error(format!("unexpected suffix: {:?}", other))),
        };
    }

    Ok(expr)
}

fn build_string(pair: Pair<Rule>) -> ParseResult<String> {
    let raw = first_inner(pair)?.as_str();
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => return Err(build_error("dangling escape in string")),
        }
    }
    Ok(out)
}

/* ===================== Pair Helpers ===================== */

fn first_inner(pair: Pair<Rule>) -> ParseResult<Pair<Rule>> {
    let rule = pair.as_rule();
    pair.into_inner()
        .next()
        .ok_or_else(|| build_error(format!("empty {:?}", rule)))
}

fn next_pair<'i>(
    pairs: &mut pest::iterators::Pairs<'i, Rule>,
    what: &str,
) -> ParseResult<Pair<'i, Rule>> {
    pairs
        .next()
        .ok_or_else(|| build_error(format!("missing {}", what)))
}
