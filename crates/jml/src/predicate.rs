//! Conditional predicates: `[lhs op rhs]` and existence tests `[operand]`.
//!
//! An operand is a *path* when it is `.`, starts with `./`, contains `@` or ends in
//! `text()`; it is evaluated relative to the candidate and contributes its first result
//! (or `""`). Any other operand is a string literal with surrounding quotes removed, so
//! `.5` and `2020-01-01` compare as written.
//!
//! Ordering operators compare numerically when both sides parse as finite numbers, so
//! `9 < 10` holds even though `"9" > "10"` as strings.
use core::cmp::Ordering;
use core::fmt;

use pest::iterators::Pair;

use crate::error::{JmlError, Result};
use crate::evaluator::Walker;
use crate::namespace::NamespaceScope;
use crate::model::Fragment;
use crate::parser::{Rule, Step, parse_rule, relative_steps};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl ComparisonOp {
    pub fn as_str(self) -> &'static str {
        match self {
            ComparisonOp::Eq => "=",
            ComparisonOp::Ne => "!=",
            ComparisonOp::Lt => "<",
            ComparisonOp::Le => "<=",
            ComparisonOp::Gt => ">",
            ComparisonOp::Ge => ">=",
        }
    }

    fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "=" => Some(ComparisonOp::Eq),
            "!=" => Some(ComparisonOp::Ne),
            "<" => Some(ComparisonOp::Lt),
            "<=" => Some(ComparisonOp::Le),
            ">" => Some(ComparisonOp::Gt),
            ">=" => Some(ComparisonOp::Ge),
            _ => None,
        }
    }

    /// Applies the operator to two operand strings.
    ///
    /// ```
    /// use jml::predicate::ComparisonOp;
    ///
    /// assert!(ComparisonOp::Lt.compare("9", "10"));
    /// assert!(!ComparisonOp::Lt.compare("b", "a"));
    /// assert!(ComparisonOp::Ne.compare("1", "1.0"));
    /// ```
    pub fn compare(self, lhs: &str, rhs: &str) -> bool {
        let ordering = || match (parse_number(lhs), parse_number(rhs)) {
            (Some(l), Some(r)) => l.partial_cmp(&r),
            _ => Some(lhs.cmp(rhs)),
        };
        match self {
            ComparisonOp::Eq => lhs == rhs,
            ComparisonOp::Ne => lhs != rhs,
            ComparisonOp::Lt => ordering() == Some(Ordering::Less),
            ComparisonOp::Le => matches!(ordering(), Some(Ordering::Less | Ordering::Equal)),
            ComparisonOp::Gt => ordering() == Some(Ordering::Greater),
            ComparisonOp::Ge => matches!(ordering(), Some(Ordering::Greater | Ordering::Equal)),
        }
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Path(Vec<Step>),
    Literal(String),
}

impl Operand {
    fn from_pair(pair: Pair<'_, Rule>, path: &str) -> Result<Self> {
        match pair.as_rule() {
            Rule::string_literal => {
                let content = pair.into_inner().next().map(|inner| inner.as_str()).unwrap_or_default();
                Ok(Operand::Literal(content.to_string()))
            }
            Rule::path_operand if is_path(pair.as_str()) => relative_steps(pair.into_inner(), path).map(Operand::Path),
            _ => Ok(Operand::Literal(pair.as_str().trim().to_string())),
        }
    }

    /// String value of the operand for `context`.
    fn value(&self, walker: &Walker<'_>, context: &Fragment, scope: &NamespaceScope) -> Result<String> {
        match self {
            Operand::Literal(literal) => Ok(literal.clone()),
            Operand::Path(steps) => {
                let first = walker.walk_relative(steps, context, scope)?.into_iter().next();
                Ok(first.map(|m| m.string_value()).unwrap_or_default())
            }
        }
    }
}

fn is_path(operand: &str) -> bool {
    operand == "." || operand.starts_with("./") || operand.contains('@') || operand.ends_with("text()")
}

#[derive(Debug, Clone, PartialEq)]
enum ConditionKind {
    Compare { lhs: Operand, op: ComparisonOp, rhs: Operand },
    Exists(Vec<Step>),
}

/// A parsed conditional predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    source: String,
    kind: ConditionKind,
}

impl Condition {
    /// Parses predicate content (without brackets). `path` is only used for error messages.
    pub fn parse(content: &str, path: &str) -> Result<Self> {
        let root = parse_rule(Rule::condition_expr, content, path)?;
        match root.into_inner().find(|pair| pair.as_rule() == Rule::condition) {
            Some(condition) => Self::from_pair(condition, path),
            None => Err(JmlError::syntax(path, "empty predicate")),
        }
    }

    pub(crate) fn from_pair(pair: Pair<'_, Rule>, path: &str) -> Result<Self> {
        let source = pair.as_str().to_string();
        let mut inner = pair.into_inner();
        let Some(lhs) = inner.next() else {
            return Err(JmlError::syntax(path, "empty predicate"));
        };
        let kind = match (inner.next(), inner.next()) {
            (Some(op), Some(rhs)) => {
                let Some(op) = ComparisonOp::from_symbol(op.as_str()) else {
                    return Err(JmlError::syntax(path, format!("unknown operator {:?}", op.as_str())));
                };
                ConditionKind::Compare { lhs: Operand::from_pair(lhs, path)?, op, rhs: Operand::from_pair(rhs, path)? }
            }
            _ if lhs.as_rule() == Rule::path_operand => ConditionKind::Exists(relative_steps(lhs.into_inner(), path)?),
            _ => return Err(JmlError::syntax(path, format!("{:?} is neither a comparison nor a relative path", lhs.as_str()))),
        };
        Ok(Self { source, kind })
    }

    /// The predicate text as written.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub(crate) fn matches(&self, walker: &Walker<'_>, context: &Fragment, scope: &NamespaceScope) -> Result<bool> {
        match &self.kind {
            ConditionKind::Compare { lhs, op, rhs } => {
                let left = lhs.value(walker, context, scope)?;
                let right = rhs.value(walker, context, scope)?;
                Ok(op.compare(&left, &right))
            }
            ConditionKind::Exists(steps) => {
                Ok(!walker.walk_relative(steps, context, scope)?.is_empty())
            }
        }
    }
}
