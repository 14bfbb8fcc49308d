//! Position-based queries over a completed scope tree.
//!
//! [`SymbolLocator`] answers three questions about the identifier at a
//! `(row, column)`:
//!
//! - [`get_symbol_at`](SymbolLocator::get_symbol_at): which name is it, and
//!   which scope recorded it?
//! - [`positions_for_symbol_at`](SymbolLocator::positions_for_symbol_at):
//!   where else does it occur, scope by scope, from its own scope up to its
//!   declaring scope?
//! - [`binding_occurrences_at`](SymbolLocator::binding_occurrences_at):
//!   every occurrence bound to the same declaration, which is exactly what a
//!   rename rewrites.
//!
//! A position that matches no identifier yields `None`, not an error.

use tracing::debug;
use tugscope_core::config::UnboundPolicy;
use tugscope_core::types::Position;
use tugscope_cst::SourceFile;

use crate::builder::ScopeBuilder;
use crate::error::{ResolveError, ResolveResult};
use crate::scope::{ScopeId, ScopeTree};
use crate::symbol::{Resolution, Resolved, SiteGroup, Symbol};

/// Query layer over the scope tree of one file.
#[derive(Debug, Clone)]
pub struct SymbolLocator {
    tree: ScopeTree,
    policy: UnboundPolicy,
}

/// Grouped occurrences for a symbol, innermost scope first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolPositions {
    pub resolved: Resolved,
    pub groups: Vec<SiteGroup>,
}

impl SymbolPositions {
    /// All positions, innermost group first.
    pub fn flatten(&self) -> Vec<Position> {
        self.groups
            .iter()
            .flat_map(|g| g.positions.iter().copied())
            .collect()
    }
}

/// Every occurrence bound to one declaration, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub resolved: Resolved,
    pub occurrences: Vec<Position>,
}

impl SymbolLocator {
    /// Build the scope tree for `file`.
    pub fn new(file: &SourceFile) -> ResolveResult<Self> {
        Self::with_policy(file, UnboundPolicy::default())
    }

    pub fn with_policy(file: &SourceFile, policy: UnboundPolicy) -> ResolveResult<Self> {
        let tree = ScopeBuilder::new(file).with_policy(policy).build()?;
        Ok(SymbolLocator { tree, policy })
    }

    pub fn tree(&self) -> &ScopeTree {
        &self.tree
    }

    /// The identifier covering `(row, column)`.
    ///
    /// Scopes are searched depth-first, a scope's own sites before its
    /// children, children in creation order.
    pub fn get_symbol_at(&self, row: u32, column: u32) -> Option<Symbol> {
        self.tree
            .descendants(self.tree.root())
            .find_map(|scope| {
                scope.site_at(row, column).map(|(name, position)| Symbol {
                    name: name.to_string(),
                    position: *position,
                    scope: scope.id,
                })
            })
    }

    /// Resolve the identifier at `(row, column)` to its declaring scope.
    pub fn resolve_at(&self, row: u32, column: u32) -> ResolveResult<Option<Resolved>> {
        let Some(symbol) = self.get_symbol_at(row, column) else {
            return Ok(None);
        };
        self.resolve(symbol).map(Some)
    }

    fn resolve(&self, symbol: Symbol) -> ResolveResult<Resolved> {
        let (declaring_scope, resolution) =
            match self.tree.declaring_scope(symbol.scope, &symbol.name) {
                Some(scope) => (scope, Resolution::Bound),
                None => match self.policy {
                    UnboundPolicy::ImplicitRoot => (self.tree.root(), Resolution::Free),
                    UnboundPolicy::Reject => {
                        return Err(ResolveError::UnboundDeclaringScope {
                            name: symbol.name,
                            position: symbol.position,
                        })
                    }
                },
            };
        Ok(Resolved {
            declaring_kind: self.tree.scope(declaring_scope).kind,
            symbol,
            declaring_scope,
            resolution,
        })
    }

    /// Lazily walk the chain of the identifier at `(row, column)`.
    pub fn groups_at(&self, row: u32, column: u32) -> ResolveResult<Option<ScopeChainGroups<'_>>> {
        Ok(self
            .resolve_at(row, column)?
            .map(|resolved| ScopeChainGroups::new(&self.tree, &resolved)))
    }

    /// Occurrences of the identifier at `(row, column)`, grouped by the
    /// scope they were recorded in, from its own scope up to and including
    /// its declaring scope.
    pub fn positions_for_symbol_at(
        &self,
        row: u32,
        column: u32,
    ) -> ResolveResult<Option<SymbolPositions>> {
        let Some(resolved) = self.resolve_at(row, column)? else {
            return Ok(None);
        };
        let groups: Vec<_> = ScopeChainGroups::new(&self.tree, &resolved).collect();
        debug!(
            name = %resolved.symbol.name,
            groups = groups.len(),
            "positions for symbol"
        );
        Ok(Some(SymbolPositions { resolved, groups }))
    }

    /// Every occurrence bound to the same declaration as the identifier at
    /// `(row, column)`: the sites of the name anywhere under the declaring
    /// scope, except under nested scopes that declare the name again.
    pub fn binding_occurrences_at(&self, row: u32, column: u32) -> ResolveResult<Option<Binding>> {
        let Some(resolved) = self.resolve_at(row, column)? else {
            return Ok(None);
        };
        let name = resolved.symbol.name.as_str();
        let mut occurrences = Vec::new();
        let mut stack = vec![resolved.declaring_scope];
        while let Some(id) = stack.pop() {
            let scope = self.tree.scope(id);
            if id != resolved.declaring_scope && scope.has_declaration(name) {
                continue;
            }
            occurrences.extend_from_slice(scope.get_sites(name));
            stack.extend(scope.children.iter().copied());
        }
        occurrences.sort();
        Ok(Some(Binding {
            resolved,
            occurrences,
        }))
    }
}

/// Lazy iterator over the groups of a scope chain, innermost first.
///
/// Yields one group per scope from the symbol's scope up to and including
/// its declaring scope. Scopes in the chain without sites of the name yield
/// empty groups, so group depth always steps by one.
pub struct ScopeChainGroups<'t> {
    tree: &'t ScopeTree,
    name: String,
    next: Option<ScopeId>,
    last: ScopeId,
}

impl<'t> ScopeChainGroups<'t> {
    pub fn new(tree: &'t ScopeTree, resolved: &Resolved) -> Self {
        ScopeChainGroups {
            tree,
            name: resolved.symbol.name.clone(),
            next: Some(resolved.symbol.scope),
            last: resolved.declaring_scope,
        }
    }
}

impl Iterator for ScopeChainGroups<'_> {
    type Item = SiteGroup;

    fn next(&mut self) -> Option<SiteGroup> {
        let scope = self.tree.get(self.next?)?;
        self.next = if scope.id == self.last {
            None
        } else {
            scope.parent
        };
        Some(SiteGroup {
            name: self.name.clone(),
            scope: scope.id,
            kind: scope.kind,
            depth: scope.depth,
            positions: scope.get_sites(&self.name).to_vec(),
        })
    }
}
