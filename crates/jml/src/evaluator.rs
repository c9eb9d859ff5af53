//! Tree walker and the `evaluate` entry point.
//!
//! A path is evaluated step by step over a list of candidate fragments. A step first
//! collects every candidate that passes its name test and conditions (for `//` steps,
//! also every matching descendant, a candidate's own match preceding its descendants'),
//! then applies its positional predicate to that collection. The remaining steps run
//! on the children of each survivor.
use std::slice;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::Result;
use crate::model::{Element, Fragment, NamespaceDecl, Tree};
use crate::namespace::{NamespaceScope, matches_qualified_name};
use crate::parser::{NameTest, Step, parse_path};
use crate::result::{QueryResult, wrap_matches};

/// Query options.
///
/// ```
/// use jml::evaluator::EvaluateOptions;
///
/// let options = EvaluateOptions::new().with_namespace("ns1", "http://example.com/ns/1");
/// assert_eq!(options.namespaces().len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluateOptions {
    /// Prefixes the path uses for qualified names, by URI.
    #[serde(default)]
    namespaces: Vec<NamespaceDecl>,
}

impl EvaluateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespace(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.namespaces.push(NamespaceDecl::prefixed(prefix, uri));
        self
    }

    /// Declares `uri` without a prefix. Elements in that namespace cannot be named by a path
    /// and matching them by name fails with
    /// [`UnresolvedNamespacePrefix`](crate::JmlError::UnresolvedNamespacePrefix).
    pub fn with_default_namespace(mut self, uri: impl Into<String>) -> Self {
        self.namespaces.push(NamespaceDecl::default_namespace(uri));
        self
    }

    pub fn with_namespaces(mut self, namespaces: impl IntoIterator<Item = NamespaceDecl>) -> Self {
        self.namespaces.extend(namespaces);
        self
    }

    pub fn namespaces(&self) -> &[NamespaceDecl] {
        &self.namespaces
    }
}

/// A fragment-level match, before wrapping.
#[derive(Debug, Clone)]
pub(crate) enum RawMatch<'t> {
    /// An element together with the namespaces in scope at it.
    Element { element: &'t Element, scope: NamespaceScope },
    Text(&'t str),
    Attribute(&'t str),
}

impl RawMatch<'_> {
    pub(crate) fn string_value(&self) -> String {
        match self {
            RawMatch::Element { element, .. } => element.children.iter().map(Fragment::string_value).collect(),
            RawMatch::Text(text) | RawMatch::Attribute(text) => (*text).to_string(),
        }
    }
}

pub(crate) struct Walker<'o> {
    declared: &'o [NamespaceDecl],
}

impl<'o> Walker<'o> {
    pub(crate) fn new(declared: &'o [NamespaceDecl]) -> Self {
        Self { declared }
    }

    /// Evaluates a relative path against `context`, which is in `parent_scope`.
    ///
    /// A leading `.` step (or an attribute read on `.`) addresses `context` itself, every
    /// other first step addresses its children.
    pub(crate) fn walk_relative<'t>(
        &self,
        steps: &[Step],
        context: &'t Fragment,
        parent_scope: &NamespaceScope,
    ) -> Result<Vec<RawMatch<'t>>> {
        match steps.first() {
            Some(step) if step.name_test == NameTest::Context && !step.descendant => {
                self.walk(steps, slice::from_ref(context), parent_scope)
            }
            _ => self.walk(steps, context.children(), &parent_scope.enter(context)),
        }
    }

    fn walk<'t>(&self, steps: &[Step], candidates: &'t [Fragment], scope: &NamespaceScope) -> Result<Vec<RawMatch<'t>>> {
        let Some((step, rest)) = steps.split_first() else {
            return Ok(Vec::new());
        };
        let mut selected = Vec::new();
        self.select(step, candidates, scope, &mut selected)?;
        trace!(step = %step, candidates = candidates.len(), selected = selected.len(), "step evaluated");
        if let Some(position) = step.position() {
            selected = position.checked_sub(1).and_then(|i| selected.into_iter().nth(i)).into_iter().collect();
        }
        let mut matches = Vec::new();
        for (fragment, here) in selected {
            if rest.is_empty() {
                matches.extend(extract(step, fragment, &here));
            } else {
                matches.extend(self.walk(rest, fragment.children(), &here)?);
            }
        }
        Ok(matches)
    }

    /// Collects the candidates `step` matches, each with its own scope, in document order.
    fn select<'t>(
        &self,
        step: &Step,
        candidates: &'t [Fragment],
        scope: &NamespaceScope,
        out: &mut Vec<(&'t Fragment, NamespaceScope)>,
    ) -> Result<()> {
        for candidate in candidates {
            let here = scope.enter(candidate);
            if self.is_match(step, candidate, scope, &here)? {
                out.push((candidate, (*here).clone()));
            }
            if step.descendant {
                self.select(step, candidate.children(), &here, out)?;
            }
        }
        Ok(())
    }

    fn is_match(&self, step: &Step, candidate: &Fragment, scope: &NamespaceScope, here: &NamespaceScope) -> Result<bool> {
        let name_matches = match (&step.name_test, candidate) {
            (NameTest::Context, _) => true,
            (NameTest::Text, Fragment::Text(_)) => true,
            (NameTest::AnyElement, Fragment::Element(_)) => true,
            (NameTest::AnyNamespace(local), Fragment::Element(element)) => element.local_name() == local,
            (NameTest::Name(name), Fragment::Element(element)) => {
                matches_qualified_name(name, element, here, self.declared)?
            }
            _ => false,
        };
        if !name_matches {
            return Ok(false);
        }
        for condition in step.conditions() {
            if !condition.matches(self, candidate, scope)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

fn extract<'t>(step: &Step, candidate: &'t Fragment, here: &NamespaceScope) -> Option<RawMatch<'t>> {
    match (&step.attribute, candidate) {
        (Some(name), Fragment::Element(element)) => element.attribute(name).map(RawMatch::Attribute),
        (Some(_), Fragment::Text(_)) => None,
        (None, Fragment::Element(element)) => Some(RawMatch::Element { element, scope: here.clone() }),
        (None, Fragment::Text(text)) => Some(RawMatch::Text(&text.text)),
    }
}

/// A parsed path, reusable across trees.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledPath {
    source: String,
    /// `None` for the empty path, which yields the tree itself.
    steps: Option<Vec<Step>>,
}

impl CompiledPath {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn steps(&self) -> &[Step] {
        self.steps.as_deref().unwrap_or_default()
    }

    pub fn evaluate(&self, tree: &Tree, options: &EvaluateOptions) -> Result<Vec<QueryResult>> {
        let Some(root) = tree.root() else {
            debug!(path = %self.source, "empty tree");
            return Ok(Vec::new());
        };
        let Some(steps) = &self.steps else {
            return Ok(vec![QueryResult::Tree(tree.clone())]);
        };
        let walker = Walker::new(options.namespaces());
        let matches = walker.walk_relative(steps, root, &NamespaceScope::default())?;
        let results = wrap_matches(matches);
        debug!(path = %self.source, results = results.len(), "path evaluated");
        Ok(results)
    }
}

/// Parses `path` once for repeated evaluation. The empty path is accepted and selects the
/// whole tree.
pub fn compile_path(path: &str) -> Result<CompiledPath> {
    let steps = if path.is_empty() { None } else { Some(parse_path(path)?) };
    Ok(CompiledPath { source: path.to_string(), steps })
}

/// Evaluates `path` against `tree`.
///
/// Results are in document order: element matches as standalone [`Tree`]s carrying their
/// in-scope namespace declarations, attribute and text matches as plain strings. Syntax
/// errors are reported even for an empty tree.
///
/// ```
/// use jml::{EvaluateOptions, QueryResult, create, evaluate};
/// use jml::create::CreateData;
///
/// let person = create("person", CreateData::new().with_attribute("birth", "1946-09-05"))?;
/// let tree = create("persons", CreateData::new().with_content(person))?;
/// let births = evaluate("/person/@birth", &tree, &EvaluateOptions::default())?;
/// assert_eq!(births, vec![QueryResult::Value("1946-09-05".into())]);
/// # Ok::<(), jml::JmlError>(())
/// ```
pub fn evaluate(path: &str, tree: &Tree, options: &EvaluateOptions) -> Result<Vec<QueryResult>> {
    compile_path(path)?.evaluate(tree, options)
}
