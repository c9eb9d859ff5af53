//! In-scope namespace tracking and qualified-name matching.
//!
//! Names in a path are interpreted through the caller's declared namespaces, names in the
//! tree through the declarations in scope at each element. Two names match when they
//! resolve to the same URI and local name:
//!
//! ```
//! use jml::model::{Element, NamespaceDecl};
//! use jml::namespace::{NamespaceScope, matches_qualified_name};
//!
//! let root = Element::new("root").with_attribute("xmlns:a", "urn:u");
//! let base = NamespaceScope::default();
//! let scope = base.extend(&root.attributes);
//! let declared = [NamespaceDecl::prefixed("b", "urn:u")];
//! // `a:x` in the document is `b:x` from the caller's point of view.
//! assert!(matches_qualified_name("b:x", &Element::new("a:x"), &scope, &declared).unwrap());
//! ```
use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::error::{JmlError, Result};
use crate::model::{Attributes, Element, Fragment, NamespaceDecl, XMLNS, XMLNS_PREFIX, split_qualified_name};

/// Namespace declarations visible at a point of the tree.
///
/// Built by folding each element's own declarations over its parent's scope; the
/// nearer declaration wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceScope {
    default: Option<String>,
    prefixes: BTreeMap<String, String>,
}

impl NamespaceScope {
    pub fn from_decls<'a>(decls: impl IntoIterator<Item = &'a NamespaceDecl>) -> Self {
        let mut scope = Self::default();
        for decl in decls {
            scope.bind(decl.prefix.as_deref(), &decl.uri);
        }
        scope
    }

    /// Scope of an element whose parent has scope `self`.
    ///
    /// Borrows `self` when the element declares nothing.
    pub fn extend(&self, attributes: &Attributes) -> Cow<'_, NamespaceScope> {
        if !attributes.keys().any(|k| is_namespace_attribute(k)) {
            return Cow::Borrowed(self);
        }
        let mut scope = self.clone();
        for (name, value) in attributes {
            if name == XMLNS {
                scope.bind(None, value);
            } else if let Some(prefix) = name.strip_prefix(XMLNS_PREFIX) {
                scope.bind(Some(prefix), value);
            }
        }
        Cow::Owned(scope)
    }

    /// Scope inside `fragment`, which sits in `self`. Text nodes declare nothing.
    pub fn enter(&self, fragment: &Fragment) -> Cow<'_, NamespaceScope> {
        match fragment {
            Fragment::Element(element) => self.extend(&element.attributes),
            Fragment::Text(_) => Cow::Borrowed(self),
        }
    }

    fn bind(&mut self, prefix: Option<&str>, uri: &str) {
        match prefix {
            // xmlns="" undeclares the default namespace
            None if uri.is_empty() => self.default = None,
            None => self.default = Some(uri.to_string()),
            Some(prefix) => {
                self.prefixes.insert(prefix.to_string(), uri.to_string());
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.default.is_none() && self.prefixes.is_empty()
    }

    pub fn default_uri(&self) -> Option<&str> {
        self.default.as_deref()
    }

    pub fn lookup(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(String::as_str)
    }

    /// Namespace URI of an element name (`prefix:local` or unprefixed) in this scope.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        match split_qualified_name(name).0 {
            Some(prefix) => self.lookup(prefix),
            None => self.default_uri(),
        }
    }

    /// The scope as a list of declarations, default namespace first.
    pub fn to_decls(&self) -> Vec<NamespaceDecl> {
        let default = self.default.iter().map(NamespaceDecl::default_namespace);
        let prefixed = self.prefixes.iter().map(|(p, uri)| NamespaceDecl::prefixed(p.clone(), uri.clone()));
        default.chain(prefixed).collect()
    }

    /// The scope as `xmlns` / `xmlns:<prefix>` attribute entries.
    pub fn attribute_entries(&self) -> impl Iterator<Item = (String, String)> + '_ {
        let default = self.default.iter().map(|uri| (XMLNS.to_string(), uri.clone()));
        let prefixed = self.prefixes.iter().map(|(p, uri)| (format!("{XMLNS_PREFIX}{p}"), uri.clone()));
        default.chain(prefixed)
    }
}

pub fn is_namespace_attribute(name: &str) -> bool {
    name == XMLNS || name.starts_with(XMLNS_PREFIX)
}

/// Finds the caller's declaration for `uri`.
pub fn find_by_uri<'a>(declared: &'a [NamespaceDecl], uri: &str) -> Option<&'a NamespaceDecl> {
    declared.iter().find(|d| d.uri == uri)
}

pub fn find_by_prefix<'a>(declared: &'a [NamespaceDecl], prefix: &str) -> Option<&'a NamespaceDecl> {
    declared.iter().find(|d| d.prefix.as_deref() == Some(prefix))
}

/// Tests whether `element` (in `scope`) carries the qualified name `name` as written by a caller
/// who declared `declared`.
///
/// # Errors
///
/// [`JmlError::UnresolvedNamespacePrefix`] when the element lives in a namespace the caller cannot
/// name: either the caller declared that URI without a prefix, or the URI is undeclared and
/// `name` uses a prefix the caller never declared.
pub fn matches_qualified_name(
    name: &str,
    element: &Element,
    scope: &NamespaceScope,
    declared: &[NamespaceDecl],
) -> Result<bool> {
    let (prefix, local) = split_qualified_name(&element.name);
    if scope.is_empty() || (scope.default_uri().is_none() && prefix.is_none()) {
        return Ok(element.name == name);
    }
    let Some(uri) = scope.resolve(&element.name) else {
        // prefix without declaration: only a literal match is possible
        return Ok(element.name == name);
    };
    match find_by_uri(declared, uri) {
        Some(NamespaceDecl { prefix: Some(caller_prefix), .. }) => {
            Ok(name.strip_prefix(caller_prefix.as_str()).and_then(|rest| rest.strip_prefix(':')) == Some(local))
        }
        Some(NamespaceDecl { prefix: None, .. }) => {
            Err(JmlError::UnresolvedNamespacePrefix { uri: uri.to_string(), name: name.to_string() })
        }
        None => match split_qualified_name(name).0 {
            Some(test_prefix) if find_by_prefix(declared, test_prefix).is_none() => {
                Err(JmlError::UnresolvedNamespacePrefix { uri: uri.to_string(), name: name.to_string() })
            }
            _ => Ok(false),
        },
    }
}
