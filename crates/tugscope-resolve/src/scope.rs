//! The lexical scope tree.
//!
//! Scopes live in a flat arena owned by [`ScopeTree`] and refer to each other
//! by [`ScopeId`]. A scope's parent is an index, so upward search is a loop
//! over indices and never needs a back-pointer.
//!
//! Each scope records, per name:
//!
//! - at most one declaration (a later declaration in the same scope
//!   overwrites the earlier one), and
//! - every site in discovery order. A declaration is also a site.
//!
//! Sites inside a child scope belong to the child only.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tugscope_core::patch::Span;
use tugscope_core::types::{Position, SourceId};
use tugscope_cst::ScopeKind;

/// Index of a scope within its [`ScopeTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScopeId(pub u32);

impl ScopeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scope_{}", self.0)
    }
}

/// One lexical scope.
#[derive(Debug, Clone)]
pub struct Scope {
    pub id: ScopeId,
    pub kind: ScopeKind,
    /// Byte span of the construct that opened the scope.
    pub span: Span,
    /// Enclosing scope; `None` only for the root.
    pub parent: Option<ScopeId>,
    /// Child scopes in creation order.
    pub children: Vec<ScopeId>,
    /// Nesting depth; the root is 0.
    pub depth: u32,
    declarations: HashMap<String, Position>,
    sites: HashMap<String, Vec<Position>>,
}

impl Scope {
    fn new(id: ScopeId, kind: ScopeKind, span: Span, parent: Option<ScopeId>, depth: u32) -> Self {
        Scope {
            id,
            kind,
            span,
            parent,
            children: Vec::new(),
            depth,
            declarations: HashMap::new(),
            sites: HashMap::new(),
        }
    }

    /// Append an occurrence of `name`.
    pub fn add_site(&mut self, name: &str, position: Position) {
        self.sites.entry(name.to_string()).or_default().push(position);
    }

    /// Declare `name` at `position`, replacing any earlier declaration.
    ///
    /// The declaration is recorded as a site too.
    pub fn add_declaration(&mut self, name: &str, position: Position) {
        self.declarations.insert(name.to_string(), position);
        self.add_site(name, position);
    }

    /// Occurrences of `name` recorded in this scope, in discovery order.
    pub fn get_sites(&self, name: &str) -> &[Position] {
        self.sites.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_declaration(&self, name: &str) -> bool {
        self.declarations.contains_key(name)
    }

    pub fn get_declaration(&self, name: &str) -> Option<&Position> {
        self.declarations.get(name)
    }

    /// Names with at least one site in this scope.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sites.keys().map(String::as_str)
    }

    /// Every site in this scope, grouped by name.
    pub fn sites(&self) -> impl Iterator<Item = (&str, &[Position])> {
        self.sites
            .iter()
            .map(|(name, positions)| (name.as_str(), positions.as_slice()))
    }

    /// The site covering `(row, column)`, if any.
    ///
    /// Identifiers never overlap, so at most one site matches.
    pub fn site_at(&self, row: u32, column: u32) -> Option<(&str, &Position)> {
        self.sites.iter().find_map(|(name, positions)| {
            positions
                .iter()
                .find(|p| p.contains(row, column))
                .map(|p| (name.as_str(), p))
        })
    }
}

/// Arena of scopes for one source file.
#[derive(Debug, Clone)]
pub struct ScopeTree {
    source: SourceId,
    scopes: Vec<Scope>,
}

impl ScopeTree {
    /// Create a tree holding only its root scope.
    pub fn new(source: SourceId, kind: ScopeKind, span: Span) -> Self {
        ScopeTree {
            source,
            scopes: vec![Scope::new(ScopeId(0), kind, span, None, 0)],
        }
    }

    pub fn source(&self) -> SourceId {
        self.source
    }

    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Look up a scope. Ids come from this tree, so this only fails for ids
    /// taken from another tree.
    pub fn get(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id.index())
    }

    /// Like [`ScopeTree::get`], for ids known to come from this tree.
    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.index()]
    }

    /// Allocate a child of `parent` and link it.
    pub fn create_child(&mut self, parent: ScopeId, kind: ScopeKind, span: Span) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        let depth = self.scope(parent).depth + 1;
        self.scopes.push(Scope::new(id, kind, span, Some(parent), depth));
        self.scope_mut(parent).children.push(id);
        id
    }

    pub fn add_site(&mut self, scope: ScopeId, name: &str, position: Position) {
        self.scope_mut(scope).add_site(name, position);
    }

    pub fn add_declaration(&mut self, scope: ScopeId, name: &str, position: Position) {
        self.scope_mut(scope).add_declaration(name, position);
    }

    /// `scope` and its ancestors, innermost first.
    pub fn ancestors(&self, scope: ScopeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: Some(scope),
        }
    }

    /// The nearest scope from `scope` upward (inclusive) declaring `name`.
    pub fn declaring_scope(&self, scope: ScopeId, name: &str) -> Option<ScopeId> {
        self.ancestors(scope)
            .find(|s| s.has_declaration(name))
            .map(|s| s.id)
    }

    /// The innermost scope whose span contains `offset`.
    pub fn scope_at_offset(&self, offset: u64) -> ScopeId {
        let mut current = self.root();
        'descend: loop {
            for &child in &self.scope(current).children {
                if self.scope(child).span.contains_offset(offset) {
                    current = child;
                    continue 'descend;
                }
            }
            return current;
        }
    }

    /// Scopes in creation order, which is pre-order.
    pub fn iter(&self) -> impl Iterator<Item = &Scope> {
        self.scopes.iter()
    }

    /// Scopes of the subtree rooted at `scope`, depth-first, children in
    /// creation order.
    pub fn descendants(&self, scope: ScopeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            stack: vec![scope],
        }
    }

    /// True when `scope` is `ancestor` or nested inside it.
    pub fn is_within(&self, scope: ScopeId, ancestor: ScopeId) -> bool {
        self.ancestors(scope).any(|s| s.id == ancestor)
    }
}

/// Iterator from a scope up to the root.
pub struct Ancestors<'t> {
    tree: &'t ScopeTree,
    next: Option<ScopeId>,
}

impl<'t> Iterator for Ancestors<'t> {
    type Item = &'t Scope;

    fn next(&mut self) -> Option<Self::Item> {
        let scope = self.tree.get(self.next?)?;
        self.next = scope.parent;
        Some(scope)
    }
}

/// Depth-first iterator over a subtree.
pub struct Descendants<'t> {
    tree: &'t ScopeTree,
    stack: Vec<ScopeId>,
}

impl<'t> Iterator for Descendants<'t> {
    type Item = &'t Scope;

    fn next(&mut self) -> Option<Self::Item> {
        let scope = self.tree.get(self.stack.pop()?)?;
        self.stack.extend(scope.children.iter().rev());
        Some(scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(line: u32, column: u32, start: u64, len: u64) -> Position {
        Position::new(SourceId(0), line, column, Span::new(start, start + len))
    }

    fn sample() -> (ScopeTree, ScopeId, ScopeId, ScopeId) {
        let mut tree = ScopeTree::new(SourceId(0), ScopeKind::File, Span::new(0, 100));
        let a = tree.create_child(tree.root(), ScopeKind::Block, Span::new(0, 40));
        let inner = tree.create_child(a, ScopeKind::Block, Span::new(10, 30));
        let b = tree.create_child(tree.root(), ScopeKind::Block, Span::new(50, 90));
        (tree, a, inner, b)
    }

    #[test]
    fn declaration_is_also_a_site() {
        let mut scope = Scope::new(ScopeId(0), ScopeKind::Block, Span::new(0, 10), None, 0);
        scope.add_declaration("a", pos(1, 1, 0, 1));
        scope.add_site("a", pos(2, 1, 5, 1));
        assert!(scope.has_declaration("a"));
        assert_eq!(scope.get_sites("a").len(), 2);
        assert_eq!(scope.get_declaration("a"), Some(&pos(1, 1, 0, 1)));
        assert!(scope.get_sites("missing").is_empty());
    }

    #[test]
    fn redeclaration_overwrites() {
        let mut scope = Scope::new(ScopeId(0), ScopeKind::Block, Span::new(0, 20), None, 0);
        scope.add_declaration("a", pos(1, 1, 0, 1));
        scope.add_declaration("a", pos(2, 1, 10, 1));
        assert_eq!(scope.get_declaration("a"), Some(&pos(2, 1, 10, 1)));
        assert_eq!(scope.get_sites("a").len(), 2);
    }

    #[test]
    fn children_are_linked_in_creation_order() {
        let (tree, a, inner, b) = sample();
        assert_eq!(tree.scope(tree.root()).children, vec![a, b]);
        assert_eq!(tree.scope(inner).parent, Some(a));
        assert_eq!(tree.scope(inner).depth, 2);
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn declaring_scope_is_nearest_inclusive() {
        let (mut tree, a, inner, b) = sample();
        tree.add_declaration(tree.root(), "x", pos(1, 1, 95, 1));
        tree.add_declaration(a, "x", pos(1, 2, 2, 1));
        assert_eq!(tree.declaring_scope(inner, "x"), Some(a));
        assert_eq!(tree.declaring_scope(a, "x"), Some(a));
        assert_eq!(tree.declaring_scope(b, "x"), Some(tree.root()));
        assert_eq!(tree.declaring_scope(b, "y"), None);
    }

    #[test]
    fn ancestors_run_to_the_root() {
        let (tree, a, inner, _) = sample();
        let ids: Vec<_> = tree.ancestors(inner).map(|s| s.id).collect();
        assert_eq!(ids, vec![inner, a, tree.root()]);
        assert!(tree.is_within(inner, a));
        assert!(!tree.is_within(a, inner));
    }

    #[test]
    fn scope_at_offset_finds_innermost() {
        let (tree, a, inner, b) = sample();
        assert_eq!(tree.scope_at_offset(5), a);
        assert_eq!(tree.scope_at_offset(15), inner);
        assert_eq!(tree.scope_at_offset(60), b);
        assert_eq!(tree.scope_at_offset(45), tree.root());
    }

    #[test]
    fn descendants_are_depth_first() {
        let (tree, a, inner, b) = sample();
        let ids: Vec<_> = tree.descendants(tree.root()).map(|s| s.id).collect();
        assert_eq!(ids, vec![tree.root(), a, inner, b]);
    }

    #[test]
    fn site_at_matches_half_open_span() {
        let mut scope = Scope::new(ScopeId(0), ScopeKind::File, Span::new(0, 30), None, 0);
        scope.add_declaration("myString", pos(1, 5, 4, 8));
        assert_eq!(scope.site_at(1, 5).map(|(n, _)| n), Some("myString"));
        assert_eq!(scope.site_at(1, 12).map(|(n, _)| n), Some("myString"));
        assert_eq!(scope.site_at(1, 13), None);
        assert_eq!(scope.site_at(1, 3), None);
        assert_eq!(scope.site_at(2, 5), None);
    }
}
