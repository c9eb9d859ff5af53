//! JML data model: a JSON encoding of an XML element tree.
//!
//! The wire shape is the non-compact xml-js layout:
//!
//! ```json
//! {"elements": [{
//!     "type": "element",
//!     "name": "root",
//!     "attributes": {"xmlns:ns1": "http://example.com/ns/1"},
//!     "elements": [{"type": "text", "text": "Hello"}]
//! }]}
//! ```
//!
//! Example:
//! ```
//! use jml::model::{Element, Fragment, Tree};
//!
//! let tree = Tree::new(Element::new("root").with_child(Fragment::text("Hello")));
//! let json = tree.to_value().unwrap();
//! assert_eq!(json["elements"][0]["name"], "root");
//! assert_eq!(Tree::from_value(json).unwrap(), tree);
//! ```
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Attribute name → value. Ordered so that output is deterministic.
pub type Attributes = BTreeMap<String, String>;

/// Attribute key of a default namespace declaration.
pub const XMLNS: &str = "xmlns";
/// Key prefix of a prefixed namespace declaration (`xmlns:<prefix>`).
pub const XMLNS_PREFIX: &str = "xmlns:";

/// A namespace binding, either caller-declared or found in a tree.
///
/// `prefix == None` marks the default namespace of its scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamespaceDecl {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    pub uri: String,
}

impl NamespaceDecl {
    pub fn prefixed(prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        Self { prefix: Some(prefix.into()), uri: uri.into() }
    }

    pub fn default_namespace(uri: impl Into<String>) -> Self {
        Self { prefix: None, uri: uri.into() }
    }

    /// The attribute key this declaration is stored under (`xmlns` or `xmlns:p`).
    pub fn attribute_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{XMLNS_PREFIX}{prefix}"),
            None => XMLNS.to_string(),
        }
    }

    /// Reads a declaration from an attribute entry, if it is one.
    pub fn from_attribute(name: &str, value: &str) -> Option<Self> {
        if name == XMLNS {
            Some(Self::default_namespace(value))
        } else {
            name.strip_prefix(XMLNS_PREFIX).map(|prefix| Self::prefixed(prefix, value))
        }
    }
}

/// All namespace declarations found in an attribute map.
pub fn extract_namespaces(attributes: &Attributes) -> Vec<NamespaceDecl> {
    attributes.iter().filter_map(|(name, value)| NamespaceDecl::from_attribute(name, value)).collect()
}

/// Splits `prefix:local` into its parts. Unprefixed names yield `(None, name)`.
pub fn split_qualified_name(name: &str) -> (Option<&str>, &str) {
    match name.split_once(':') {
        Some((prefix, local)) if !prefix.is_empty() => (Some(prefix), local),
        _ => (None, name),
    }
}

/// A node of the tree: an element or a run of text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Fragment {
    Element(Element),
    Text(Text),
}

impl Fragment {
    pub fn text(value: impl Into<String>) -> Self {
        Fragment::Text(Text { text: value.into() })
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Fragment::Element(element) => Some(element),
            Fragment::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Fragment::Text(text) => Some(&text.text),
            Fragment::Element(_) => None,
        }
    }

    /// Child fragments; text nodes have none.
    pub fn children(&self) -> &[Fragment] {
        match self {
            Fragment::Element(element) => &element.children,
            Fragment::Text(_) => &[],
        }
    }

    /// Concatenated text of this fragment and all its descendants.
    pub fn string_value(&self) -> String {
        fn collect(fragment: &Fragment, out: &mut String) {
            match fragment {
                Fragment::Text(text) => out.push_str(&text.text),
                Fragment::Element(element) => element.children.iter().for_each(|c| collect(c, out)),
            }
        }
        let mut out = String::new();
        collect(self, &mut out);
        out
    }
}

impl From<Element> for Fragment {
    fn from(element: Element) -> Self {
        Fragment::Element(element)
    }
}

impl From<Text> for Fragment {
    fn from(text: Text) -> Self {
        Fragment::Text(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Text {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Element {
    /// Tag name including its prefix, if any (`ns1:person`).
    pub name: String,
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,
    #[serde(default, rename = "elements", skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Fragment>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_namespace(mut self, namespace: &NamespaceDecl) -> Self {
        self.attributes.insert(namespace.attribute_name(), namespace.uri.clone());
        self
    }

    pub fn with_child(mut self, child: impl Into<Fragment>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_child(Fragment::text(text))
    }

    pub fn prefix(&self) -> Option<&str> {
        split_qualified_name(&self.name).0
    }

    pub fn local_name(&self) -> &str {
        split_qualified_name(&self.name).1
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Namespace declarations made on this element itself.
    pub fn namespaces(&self) -> Vec<NamespaceDecl> {
        extract_namespaces(&self.attributes)
    }
}

/// A single-rooted JML object. The root may be absent (an empty tree).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "RawTree", into = "RawTree")]
pub struct Tree {
    root: Option<Fragment>,
}

/// Serialized form: `{"elements": [root]}`.
#[derive(Serialize, Deserialize)]
struct RawTree {
    #[serde(default)]
    elements: Vec<Fragment>,
}

impl From<RawTree> for Tree {
    fn from(raw: RawTree) -> Self {
        Tree { root: raw.elements.into_iter().next() }
    }
}

impl From<Tree> for RawTree {
    fn from(tree: Tree) -> Self {
        RawTree { elements: tree.root.into_iter().collect() }
    }
}

impl Tree {
    pub fn new(root: impl Into<Fragment>) -> Self {
        Self { root: Some(root.into()) }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// A tree whose root is a single text node.
    pub fn text(value: impl Into<String>) -> Self {
        Self::new(Fragment::text(value))
    }

    pub fn root(&self) -> Option<&Fragment> {
        self.root.as_ref()
    }

    pub fn root_element(&self) -> Option<&Element> {
        self.root.as_ref().and_then(Fragment::as_element)
    }

    pub fn into_root(self) -> Option<Fragment> {
        self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a tree from a JSON value. Objects without an `elements` array yield the empty tree.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        if !value.get("elements").is_some_and(serde_json::Value::is_array) {
            return Ok(Self::empty());
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
