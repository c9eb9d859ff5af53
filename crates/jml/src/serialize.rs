//! Serializing a tree to text through per-tag mappings.
//!
//! The tree is serialized bottom-up: an element's content is the concatenation of its text
//! children and its serialized child elements, which is then handed to the element's
//! mapping. Elements without a mapping contribute their content unwrapped.
//!
//! ```
//! use jml::create::{CreateData, create};
//! use jml::serialize::{MappingTable, SerializeOptions, serialize};
//!
//! let bold = create("bold", CreateData::new().with_content("a"))?;
//! let tree = create("paragraph", CreateData::new().with_content("This is ").with_content(bold))?;
//! let mapping = MappingTable::new().with_tag("paragraph", "p").with_tag("bold", "strong");
//! let html = serialize(&tree, &mapping.into(), &SerializeOptions::default())?;
//! assert_eq!(html, "<p>This is <strong>a</strong></p>");
//! # Ok::<(), jml::JmlError>(())
//! ```
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::{JmlError, Result};
use crate::model::{Attributes, Element, Fragment, NamespaceDecl, Tree, split_qualified_name};
use crate::namespace::{NamespaceScope, find_by_prefix, find_by_uri};

/// Table key matching every element without an entry of its own.
pub const WILDCARD: &str = "*";

static NO_ATTRIBUTES: Attributes = BTreeMap::new();

/// What a mapping callback sees of a node.
#[derive(Debug, Clone, Copy)]
pub struct Payload<'a> {
    /// The already serialized content, or the text of a text node.
    pub content: &'a str,
    /// The element's own attributes; empty for text.
    pub attributes: &'a Attributes,
    /// The element's name as written in the tree; `None` for text.
    pub name: Option<&'a str>,
}

pub type MapFn = Arc<dyn Fn(&Payload<'_>) -> String + Send + Sync>;

#[derive(Clone)]
pub enum MappingEntry {
    /// Wraps the content in `<tag>…</tag>`.
    Tag(String),
    Callback(MapFn),
}

impl fmt::Debug for MappingEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingEntry::Tag(tag) => f.debug_tuple("Tag").field(tag).finish(),
            MappingEntry::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

/// Mappings keyed by element name. Names in a namespace are keyed as `prefix:local`,
/// with `prefix` declared in [`SerializeOptions`].
#[derive(Debug, Clone, Default)]
pub struct MappingTable {
    entries: BTreeMap<String, MappingEntry>,
}

impl MappingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tag(mut self, name: impl Into<String>, tag: impl Into<String>) -> Self {
        self.entries.insert(name.into(), MappingEntry::Tag(tag.into()));
        self
    }

    pub fn with_callback(
        mut self,
        name: impl Into<String>,
        callback: impl Fn(&Payload<'_>) -> String + Send + Sync + 'static,
    ) -> Self {
        self.entries.insert(name.into(), MappingEntry::Callback(Arc::new(callback)));
        self
    }

    pub fn get(&self, name: &str) -> Option<&MappingEntry> {
        self.entries.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

#[derive(Clone)]
pub enum Mapping {
    /// Applied to every element and to a text root. Text children are not passed
    /// to it; they reach it as part of their parent's `content`.
    Callback(MapFn),
    Table(MappingTable),
}

impl Mapping {
    pub fn callback(callback: impl Fn(&Payload<'_>) -> String + Send + Sync + 'static) -> Self {
        Mapping::Callback(Arc::new(callback))
    }
}

impl fmt::Debug for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mapping::Callback(_) => f.write_str("Callback(..)"),
            Mapping::Table(table) => f.debug_tuple("Table").field(table).finish(),
        }
    }
}

impl From<MappingTable> for Mapping {
    fn from(table: MappingTable) -> Self {
        Mapping::Table(table)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SerializeOptions {
    namespaces: Vec<NamespaceDecl>,
    skip_empty: bool,
}

impl SerializeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespace(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.namespaces.push(NamespaceDecl::prefixed(prefix, uri));
        self
    }

    pub fn with_namespaces(mut self, namespaces: impl IntoIterator<Item = NamespaceDecl>) -> Self {
        self.namespaces.extend(namespaces);
        self
    }

    /// Mapped elements with empty content produce nothing instead of an empty wrapper.
    pub fn skip_empty(mut self, skip_empty: bool) -> Self {
        self.skip_empty = skip_empty;
        self
    }

    pub fn namespaces(&self) -> &[NamespaceDecl] {
        &self.namespaces
    }
}

/// Serializes `tree` with `mapping`.
///
/// An empty tree or an empty table yields `""`.
///
/// # Errors
///
/// [`JmlError::InvalidNamespaceDeclaration`] when a declared namespace has no prefix, or a
/// table key uses a prefix that is not declared.
pub fn serialize(tree: &Tree, mapping: &Mapping, options: &SerializeOptions) -> Result<String> {
    validate(mapping, options)?;
    let Some(root) = tree.root() else {
        return Ok(String::new());
    };
    if matches!(mapping, Mapping::Table(table) if table.is_empty()) {
        return Ok(String::new());
    }
    let serializer = Serializer { mapping, options };
    let output = match root {
        Fragment::Element(element) => serializer.element(element, &NamespaceScope::default()),
        Fragment::Text(text) => serializer.text_root(&text.text),
    };
    debug!(bytes = output.len(), "tree serialized");
    Ok(output)
}

fn validate(mapping: &Mapping, options: &SerializeOptions) -> Result<()> {
    if let Some(decl) = options.namespaces.iter().find(|d| d.prefix.is_none()) {
        return Err(JmlError::InvalidNamespaceDeclaration(format!(
            "namespace '{}' doesn't have a prefix",
            decl.uri
        )));
    }
    if let Mapping::Table(table) = mapping {
        for key in table.keys() {
            if let (Some(prefix), _) = split_qualified_name(key)
                && find_by_prefix(&options.namespaces, prefix).is_none()
            {
                return Err(JmlError::InvalidNamespaceDeclaration(format!(
                    "no namespace declared for prefix '{prefix}'"
                )));
            }
        }
    }
    Ok(())
}

struct Serializer<'m> {
    mapping: &'m Mapping,
    options: &'m SerializeOptions,
}

impl Serializer<'_> {
    fn element(&self, element: &Element, parent_scope: &NamespaceScope) -> String {
        let scope = parent_scope.extend(&element.attributes);
        let mut content = String::new();
        for child in &element.children {
            match child {
                Fragment::Text(text) => content.push_str(&text.text),
                Fragment::Element(child) => content.push_str(&self.element(child, &scope)),
            }
        }
        let payload = Payload { content: &content, attributes: &element.attributes, name: Some(&element.name) };
        match self.mapping {
            Mapping::Callback(callback) => callback(&payload),
            Mapping::Table(table) => match self.find_entry(table, &element.name, &scope) {
                None => content,
                Some(_) if self.options.skip_empty && content.is_empty() => content,
                Some(MappingEntry::Tag(tag)) => format!("<{tag}>{content}</{tag}>"),
                Some(MappingEntry::Callback(callback)) => callback(&payload),
            },
        }
    }

    fn text_root(&self, text: &str) -> String {
        match self.mapping {
            Mapping::Callback(callback) => {
                callback(&Payload { content: text, attributes: &NO_ATTRIBUTES, name: None })
            }
            Mapping::Table(_) => text.to_string(),
        }
    }

    /// The entry for `name` in `scope`: looked up literally outside namespaces, otherwise
    /// as `prefix:local` with the prefix the options declare for the element's URI.
    fn find_entry<'t>(&self, table: &'t MappingTable, name: &str, scope: &NamespaceScope) -> Option<&'t MappingEntry> {
        let (prefix, local) = split_qualified_name(name);
        let entry = if scope.is_empty() || (scope.default_uri().is_none() && prefix.is_none()) {
            table.get(name)
        } else {
            match scope.resolve(name) {
                None => table.get(name),
                Some(uri) => find_by_uri(&self.options.namespaces, uri)
                    .and_then(|decl| decl.prefix.as_deref())
                    .and_then(|mapped| table.get(&format!("{mapped}:{local}"))),
            }
        };
        entry.or_else(|| table.get(WILDCARD))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(name: &str, text: &str) -> Element {
        Element::new(name).with_text(text)
    }

    #[test]
    fn wildcard_maps_unlisted_elements() {
        let tree = Tree::new(Element::new("list").with_child(leaf("a", "1")).with_child(leaf("b", "2")));
        let mapping = MappingTable::new().with_tag("list", "ul").with_tag("*", "li").into();
        let out = serialize(&tree, &mapping, &SerializeOptions::default()).unwrap();
        assert_eq!(out, "<ul><li>1</li><li>2</li></ul>");
    }

    #[test]
    fn skip_empty_drops_empty_wrappers() {
        let tree = Tree::new(Element::new("list").with_child(leaf("a", "1")).with_child(Element::new("a")));
        let mapping: Mapping = MappingTable::new().with_tag("list", "ul").with_tag("a", "li").into();
        let kept = serialize(&tree, &mapping, &SerializeOptions::default()).unwrap();
        assert_eq!(kept, "<ul><li>1</li><li></li></ul>");
        let skipped = serialize(&tree, &mapping, &SerializeOptions::new().skip_empty(true)).unwrap();
        assert_eq!(skipped, "<ul><li>1</li></ul>");
    }

    #[test]
    fn empty_table_or_tree_yields_empty_string() {
        let tree = Tree::new(leaf("a", "1"));
        assert_eq!(serialize(&tree, &MappingTable::new().into(), &SerializeOptions::default()).unwrap(), "");
        let mapping = MappingTable::new().with_tag("a", "b").into();
        assert_eq!(serialize(&Tree::empty(), &mapping, &SerializeOptions::default()).unwrap(), "");
    }

    #[test]
    fn text_root_is_passed_to_callback() {
        let mapping = Mapping::callback(|p| format!("[{}:{}]", p.name.unwrap_or("#text"), p.content));
        assert_eq!(serialize(&Tree::text("hi"), &mapping, &SerializeOptions::default()).unwrap(), "[#text:hi]");
    }

    #[test]
    fn text_children_reach_callback_only_through_parent_content() {
        let mapping = Mapping::callback(|p| format!("[{}:{}]", p.name.unwrap_or("#text"), p.content));
        let tree = Tree::new(Element::new("p").with_text("a").with_child(leaf("b", "c")));
        assert_eq!(serialize(&tree, &mapping, &SerializeOptions::default()).unwrap(), "[p:a[b:c]]");
    }

    #[test]
    fn options_validation_runs_before_empty_checks() {
        let mapping = MappingTable::new().with_tag("ns:a", "b").into();
        let err = serialize(&Tree::empty(), &mapping, &SerializeOptions::default()).unwrap_err();
        assert!(matches!(err, JmlError::InvalidNamespaceDeclaration(_)));
    }
}
