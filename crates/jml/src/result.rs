//! Query results.
use serde::{Deserialize, Serialize};

use crate::evaluator::RawMatch;
use crate::model::{Element, Tree};

/// One result of [`evaluate`](crate::evaluate).
///
/// Serializes untagged: a tree as its JML object, a value as a JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryResult {
    /// A matched element, re-rooted as a standalone tree.
    Tree(Tree),
    /// An attribute value or a text node's content.
    Value(String),
}

impl QueryResult {
    pub fn as_tree(&self) -> Option<&Tree> {
        match self {
            QueryResult::Tree(tree) => Some(tree),
            QueryResult::Value(_) => None,
        }
    }

    pub fn as_value(&self) -> Option<&str> {
        match self {
            QueryResult::Value(value) => Some(value),
            QueryResult::Tree(_) => None,
        }
    }

    pub fn into_tree(self) -> Option<Tree> {
        match self {
            QueryResult::Tree(tree) => Some(tree),
            QueryResult::Value(_) => None,
        }
    }

    /// The root element of a tree result.
    pub fn element(&self) -> Option<&Element> {
        self.as_tree().and_then(Tree::root_element)
    }
}

impl From<Tree> for QueryResult {
    fn from(tree: Tree) -> Self {
        QueryResult::Tree(tree)
    }
}

impl From<String> for QueryResult {
    fn from(value: String) -> Self {
        QueryResult::Value(value)
    }
}

impl From<&str> for QueryResult {
    fn from(value: &str) -> Self {
        QueryResult::Value(value.to_string())
    }
}

/// Turns raw matches into results, preserving order.
///
/// An element is copied and re-declares every namespace in scope at its original position,
/// so its names resolve the same way when the result is queried again. Its own
/// declarations take precedence.
pub(crate) fn wrap_matches(matches: Vec<RawMatch<'_>>) -> Vec<QueryResult> {
    matches.into_iter().map(wrap).collect()
}

fn wrap(raw: RawMatch<'_>) -> QueryResult {
    match raw {
        RawMatch::Element { element, scope } => {
            let mut element = element.clone();
            for (name, uri) in scope.attribute_entries() {
                element.attributes.entry(name).or_insert(uri);
            }
            QueryResult::Tree(Tree::new(element))
        }
        RawMatch::Text(value) | RawMatch::Attribute(value) => QueryResult::Value(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::NamespaceScope;

    #[test]
    fn element_inherits_scope_without_overriding_own_declarations() {
        let outer = Element::new("root").with_attribute("xmlns:a", "urn:a").with_attribute("xmlns:b", "urn:outer");
        let scope = NamespaceScope::default().extend(&outer.attributes).into_owned();
        let inner = Element::new("a:x").with_attribute("xmlns:b", "urn:inner");
        let scope = scope.extend(&inner.attributes).into_owned();

        let wrapped = wrap(RawMatch::Element { element: &inner, scope });
        let element = wrapped.element().unwrap();
        assert_eq!(element.attribute("xmlns:a"), Some("urn:a"));
        assert_eq!(element.attribute("xmlns:b"), Some("urn:inner"));
    }

    #[test]
    fn values_stay_strings() {
        assert_eq!(wrap(RawMatch::Attribute("1")), QueryResult::Value("1".into()));
        assert_eq!(wrap(RawMatch::Text("")), QueryResult::Value(String::new()));
    }
}
