//! Visiting and splitting trees.
use crate::model::{Fragment, NamespaceDecl, Tree};
use crate::namespace::NamespaceScope;

/// A node handed to a [`walk_tree`] visitor.
#[derive(Debug, Clone, Copy)]
pub struct Visit<'a> {
    pub fragment: &'a Fragment,
    /// Namespaces in scope at the fragment, its own declarations included.
    pub scope: &'a NamespaceScope,
    pub parent: Option<ParentVisit<'a>>,
}

#[derive(Debug, Clone, Copy)]
pub struct ParentVisit<'a> {
    pub fragment: &'a Fragment,
    pub scope: &'a NamespaceScope,
}

impl Visit<'_> {
    pub fn namespaces(&self) -> Vec<NamespaceDecl> {
        self.scope.to_decls()
    }
}

/// Calls `visitor` for every fragment of `tree`, children before their parent.
///
/// ```
/// use jml::model::{Element, Tree};
/// use jml::walk::walk_tree;
///
/// let tree = Tree::new(Element::new("a").with_child(Element::new("b").with_text("x")));
/// let mut order = Vec::new();
/// walk_tree(&tree, |visit| {
///     order.push(visit.fragment.as_element().map_or("#text", |e| e.name.as_str()).to_string())
/// });
/// assert_eq!(order, ["#text", "b", "a"]);
/// ```
pub fn walk_tree<F>(tree: &Tree, mut visitor: F)
where
    F: FnMut(Visit<'_>),
{
    if let Some(root) = tree.root() {
        visit(root, None, &NamespaceScope::default(), &mut visitor);
    }
}

fn visit<F>(fragment: &Fragment, parent: Option<ParentVisit<'_>>, parent_scope: &NamespaceScope, visitor: &mut F)
where
    F: FnMut(Visit<'_>),
{
    let scope = parent_scope.enter(fragment);
    for child in fragment.children() {
        visit(child, Some(ParentVisit { fragment, scope: &scope }), &scope, visitor);
    }
    visitor(Visit { fragment, scope: &scope, parent });
}

/// The root's children, each as a standalone tree.
pub fn child_trees(tree: &Tree) -> Vec<Tree> {
    tree.root().map(Fragment::children).unwrap_or_default().iter().cloned().map(Tree::new).collect()
}

/// Namespace declarations made on the root element itself.
pub fn namespaces_of(tree: &Tree) -> Vec<NamespaceDecl> {
    tree.root_element().map(|root| root.namespaces()).unwrap_or_default()
}
