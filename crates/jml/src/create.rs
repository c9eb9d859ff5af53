//! Building trees from a name, attributes and content.
//!
//! ```
//! use jml::create::{CreateData, create};
//!
//! let tree = create(
//!     "ns1:person",
//!     CreateData::new()
//!         .with_namespace("ns1", "http://example.com/ns/1")
//!         .with_attribute("birth", "1946-09-05")
//!         .with_content("Freddie Mercury"),
//! )?;
//! let root = tree.root_element().unwrap();
//! assert_eq!(root.attribute("xmlns:ns1"), Some("http://example.com/ns/1"));
//! assert_eq!(root.children[0].as_text(), Some("Freddie Mercury"));
//! # Ok::<(), jml::JmlError>(())
//! ```
use serde_json::{Map, Value};

use crate::error::{JmlError, Result};
use crate::model::{Element, Fragment, NamespaceDecl, Tree};

/// One piece of child content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// Becomes a text node. Empty text is skipped.
    Text(String),
    /// Its root becomes a child. Empty trees are skipped.
    Tree(Tree),
}

impl Content {
    fn into_fragment(self) -> Option<Fragment> {
        match self {
            Content::Text(text) if text.is_empty() => None,
            Content::Text(text) => Some(Fragment::text(text)),
            Content::Tree(tree) => tree.into_root(),
        }
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Content::Text(text.to_string())
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Content::Text(text)
    }
}

impl From<Tree> for Content {
    fn from(tree: Tree) -> Self {
        Content::Tree(tree)
    }
}

impl From<Element> for Content {
    fn from(element: Element) -> Self {
        Content::Tree(Tree::new(element))
    }
}

/// Attributes, namespaces and content of an element to create.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateData {
    attributes: Map<String, Value>,
    namespaces: Vec<NamespaceDecl>,
    content: Vec<Content>,
}

impl CreateData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an attribute. Values other than JSON strings are stored in their JSON encoding.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_attributes(mut self, attributes: Map<String, Value>) -> Self {
        self.attributes.extend(attributes);
        self
    }

    pub fn with_namespace(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.namespaces.push(NamespaceDecl::prefixed(prefix, uri));
        self
    }

    pub fn with_default_namespace(mut self, uri: impl Into<String>) -> Self {
        self.namespaces.push(NamespaceDecl::default_namespace(uri));
        self
    }

    pub fn with_namespaces(mut self, namespaces: impl IntoIterator<Item = NamespaceDecl>) -> Self {
        self.namespaces.extend(namespaces);
        self
    }

    pub fn with_content(mut self, content: impl Into<Content>) -> Self {
        self.content.push(content.into());
        self
    }

    pub fn with_contents<C: Into<Content>>(mut self, content: impl IntoIterator<Item = C>) -> Self {
        self.content.extend(content.into_iter().map(Into::into));
        self
    }
}

/// Creates a single-rooted tree.
///
/// Namespace declarations become `xmlns`/`xmlns:<prefix>` attributes; explicit
/// attributes of the same name take precedence.
///
/// # Errors
///
/// [`JmlError::InvalidElementName`] when `name` is empty or only whitespace.
pub fn create(name: &str, data: CreateData) -> Result<Tree> {
    if name.trim().is_empty() {
        return Err(JmlError::InvalidElementName(name.to_string()));
    }
    let CreateData { attributes, namespaces, content } = data;
    let mut element = Element::new(name);
    for namespace in &namespaces {
        element = element.with_namespace(namespace);
    }
    for (key, value) in attributes {
        let value = match value {
            Value::String(text) => text,
            other => other.to_string(),
        };
        element.attributes.insert(key, value);
    }
    element.children = content.into_iter().filter_map(Content::into_fragment).collect();
    Ok(Tree::new(element))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn name_only_creates_bare_element() {
        let tree = create("empty", CreateData::new()).unwrap();
        assert_eq!(tree.to_value().unwrap(), json!({"elements": [{"type": "element", "name": "empty"}]}));
    }

    #[test]
    fn empty_content_is_skipped() {
        let tree = create("empty", CreateData::new().with_content("").with_content(Tree::empty())).unwrap();
        assert!(tree.root_element().unwrap().children.is_empty());
    }

    #[test]
    fn non_string_attributes_are_json_encoded() {
        let tree = create(
            "item",
            CreateData::new().with_attribute("count", 3).with_attribute("flag", true).with_attribute("tags", json!(["a"])),
        )
        .unwrap();
        let root = tree.root_element().unwrap();
        assert_eq!(root.attribute("count"), Some("3"));
        assert_eq!(root.attribute("flag"), Some("true"));
        assert_eq!(root.attribute("tags"), Some(r#"["a"]"#));
    }

    #[test]
    fn explicit_attribute_overrides_namespace_declaration() {
        let tree = create(
            "root",
            CreateData::new().with_default_namespace("urn:a").with_attribute("xmlns", "urn:b"),
        )
        .unwrap();
        assert_eq!(tree.root_element().unwrap().attribute("xmlns"), Some("urn:b"));
    }

    #[test]
    fn blank_name_is_rejected() {
        assert!(matches!(create("  ", CreateData::new()), Err(JmlError::InvalidElementName(_))));
    }
}
