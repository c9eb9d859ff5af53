//! Path parser: turns `/a//ns:b[@id="1"][2]/@attr` into canonical [`Step`]s.
//!
//! The grammar lives in `path.pest`. Parsing happens in two passes: pest checks the
//! syntax, then the pairs are folded into steps (`/@name` joins the step before it,
//! `.` disappears) and the rules the grammar cannot express are checked here.
use core::fmt;

use pest::Parser;
use pest::error::{Error, LineColLocation};
use pest::iterators::{Pair, Pairs};
use smallvec::SmallVec;

use crate::error::{JmlError, Result};
use crate::predicate::Condition;

#[derive(pest_derive::Parser)]
#[grammar = "path.pest"]
pub struct PathParser;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameTest {
    /// The context fragment itself (`.`, or an attribute read on the context).
    Context,
    /// `*`: any element.
    AnyElement,
    /// `text()`: text nodes.
    Text,
    /// `*:local`: any element with that local name, namespace ignored.
    AnyNamespace(String),
    /// A literal, optionally prefixed, element name.
    Name(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `[N]`, 1-based.
    Position(usize),
    Condition(Condition),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// Reached through `//`: matches at any depth below the context.
    pub descendant: bool,
    pub name_test: NameTest,
    /// `/@name` folded into this step: the step yields that attribute's value.
    pub attribute: Option<String>,
    /// Predicates in source order.
    pub predicates: SmallVec<[Predicate; 2]>,
}

impl Step {
    fn new(descendant: bool, name_test: NameTest) -> Self {
        Self { descendant, name_test, attribute: None, predicates: SmallVec::new() }
    }

    pub fn position(&self) -> Option<usize> {
        self.predicates.iter().find_map(|p| match p {
            Predicate::Position(n) => Some(*n),
            Predicate::Condition(_) => None,
        })
    }

    pub fn conditions(&self) -> impl Iterator<Item = &Condition> {
        self.predicates.iter().filter_map(|p| match p {
            Predicate::Condition(c) => Some(c),
            Predicate::Position(_) => None,
        })
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.descendant {
            f.write_str("/")?;
        }
        match &self.name_test {
            NameTest::Context => f.write_str(".")?,
            NameTest::AnyElement => f.write_str("*")?,
            NameTest::Text => f.write_str("text()")?,
            NameTest::AnyNamespace(local) => write!(f, "*:{local}")?,
            NameTest::Name(name) => f.write_str(name)?,
        }
        for predicate in &self.predicates {
            match predicate {
                Predicate::Position(n) => write!(f, "[{n}]")?,
                Predicate::Condition(c) => write!(f, "[{}]", c.source())?,
            }
        }
        if let Some(attribute) = &self.attribute {
            write!(f, "/@{attribute}")?;
        }
        Ok(())
    }
}

/// Parses an absolute path (must start with `/`, must not be `/` alone).
///
/// ```
/// use jml::parser::{parse_path, NameTest};
///
/// let steps = parse_path("/persons//person[2]/@birth").unwrap();
/// assert_eq!(steps.len(), 2);
/// assert!(steps[1].descendant);
/// assert_eq!(steps[1].name_test, NameTest::Name("person".into()));
/// assert_eq!(steps[1].position(), Some(2));
/// assert_eq!(steps[1].attribute.as_deref(), Some("birth"));
/// ```
pub fn parse_path(path: &str) -> Result<Vec<Step>> {
    let root = parse_rule(Rule::path, path, path)?;
    let steps = build_steps(root.into_inner(), path)?;
    if steps.is_empty() {
        return Err(JmlError::syntax(path, "the path selects no step"));
    }
    Ok(steps)
}

/// Parses a path relative to a context fragment, as used inside predicates
/// (`@id`, `text()`, `./name/text()`, `.//last`).
pub fn parse_relative(expr: &str, path: &str) -> Result<Vec<Step>> {
    let root = parse_rule(Rule::relative, expr.trim(), path)?;
    relative_steps(root.into_inner(), path)
}

/// Like `build_steps`, but a path of only `.` selects the context itself.
pub(crate) fn relative_steps(pairs: Pairs<'_, Rule>, path: &str) -> Result<Vec<Step>> {
    let steps = build_steps(pairs, path)?;
    if steps.is_empty() { Ok(vec![Step::new(false, NameTest::Context)]) } else { Ok(steps) }
}

/// Runs the grammar from `rule` and returns its single root pair. `path` names the whole
/// expression in errors.
pub(crate) fn parse_rule<'i>(rule: Rule, input: &'i str, path: &str) -> Result<Pair<'i, Rule>> {
    let mut pairs = PathParser::parse(rule, input).map_err(|err| syntax_error(path, err))?;
    pairs.next().ok_or_else(|| JmlError::syntax(path, "nothing to parse"))
}

fn syntax_error(path: &str, err: Error<Rule>) -> JmlError {
    let (LineColLocation::Pos((_, column)) | LineColLocation::Span((_, column), _)) = err.line_col;
    let err = err.renamed_rules(describe_rule);
    JmlError::syntax(path, format!("{} at column {column}", err.variant.message()))
}

fn describe_rule(rule: &Rule) -> String {
    let name = match rule {
        Rule::EOI => "end of input",
        Rule::descendant | Rule::child => "'/'",
        Rule::attribute => "attribute",
        Rule::self_step => "'.'",
        Rule::step | Rule::qname | Rule::ncname => "name",
        Rule::text_test => "text()",
        Rule::any_element | Rule::any_namespace => "wildcard",
        Rule::predicate => "'['",
        Rule::position => "position",
        Rule::comparison => "comparison operator",
        Rule::condition | Rule::path_operand | Rule::number | Rule::bare_literal | Rule::string_literal => {
            "operand"
        }
        _ => return format!("{rule:?}"),
    };
    name.to_string()
}

/// Folds separator and segment pairs into steps.
fn build_steps(pairs: Pairs<'_, Rule>, path: &str) -> Result<Vec<Step>> {
    let mut steps: Vec<Step> = Vec::new();
    let mut descendant = false;
    for pair in pairs {
        let rule = pair.as_rule();
        if matches!(rule, Rule::attribute | Rule::self_step | Rule::step) && steps.last().is_some_and(|s| s.attribute.is_some()) {
            return Err(JmlError::syntax(path, "an attribute step must be the last step"));
        }
        match rule {
            Rule::descendant => descendant = true,
            Rule::attribute => {
                let attribute = pair.as_str()[1..].to_string();
                match steps.last_mut() {
                    Some(last) if !descendant => last.attribute = Some(attribute),
                    _ => {
                        let name_test = if descendant { NameTest::AnyElement } else { NameTest::Context };
                        let mut step = Step::new(descendant, name_test);
                        step.attribute = Some(attribute);
                        steps.push(step);
                    }
                }
                descendant = false;
            }
            Rule::step => {
                steps.push(build_step(pair, descendant, path)?);
                descendant = false;
            }
            _ => {}
        }
    }
    Ok(steps)
}

fn build_step(pair: Pair<'_, Rule>, descendant: bool, path: &str) -> Result<Step> {
    let mut inner = pair.into_inner();
    let name_test = match inner.next() {
        Some(test) => build_name_test(&test, path)?,
        None => return Err(JmlError::syntax(path, "empty step")),
    };
    let mut step = Step::new(descendant, name_test);
    for predicate in inner {
        let predicate = build_predicate(predicate, path)?;
        if matches!(predicate, Predicate::Position(_)) && step.position().is_some() {
            return Err(JmlError::syntax(path, "a step takes at most one positional predicate"));
        }
        step.predicates.push(predicate);
    }
    Ok(step)
}

fn build_name_test(pair: &Pair<'_, Rule>, path: &str) -> Result<NameTest> {
    match pair.as_rule() {
        Rule::text_test => Ok(NameTest::Text),
        Rule::any_element => Ok(NameTest::AnyElement),
        Rule::any_namespace => Ok(NameTest::AnyNamespace(pair.as_str()[2..].to_string())),
        Rule::qname => Ok(NameTest::Name(pair.as_str().to_string())),
        _ => Err(JmlError::syntax(path, format!("invalid name test {:?}", pair.as_str()))),
    }
}

fn build_predicate(pair: Pair<'_, Rule>, path: &str) -> Result<Predicate> {
    let Some(content) = pair.into_inner().next() else {
        return Err(JmlError::syntax(path, "empty predicate"));
    };
    match content.as_rule() {
        Rule::position => {
            let digits = content.as_str();
            let n = digits.parse().map_err(|_| JmlError::syntax(path, format!("position {digits} out of range")))?;
            Ok(Predicate::Position(n))
        }
        _ => Condition::from_pair(content, path).map(Predicate::Condition),
    }
}
