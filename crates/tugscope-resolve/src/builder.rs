//! Scope tree construction in a single traversal.
//!
//! The builder is a [`Visitor`]: the walk functions decide where scopes open
//! and which identifiers declare or reference a name, and the builder records
//! them into a [`ScopeTree`].
//!
//! # Queries while building
//!
//! With a target position set, the builder also answers "where else does the
//! identifier at this position occur within its scope chain?". The chain runs
//! from the scope holding the hit up to its declaring scope. A scope's group
//! is handed to the [`GroupSink`] when that scope closes, so:
//!
//! - every group is complete when it is delivered, although later parts of
//!   the tree have not been walked yet;
//! - groups arrive innermost first;
//! - the declaring scope is the first closed scope of the chain that
//!   declares the name, and no group is delivered past it.
//!
//! A sink can stop the walk after any group. The tree is then partial and
//! [`BuildOutcome::completed`] is false.

use tracing::{debug, warn};
use tugscope_core::config::UnboundPolicy;
use tugscope_core::patch::Span;
use tugscope_cst::visitor::{walk_source_file, VisitResult, Visitor};
use tugscope_cst::{Ident, IdentRole, ScopeKind, SourceFile};

use crate::error::{ResolveError, ResolveResult};
use crate::scope::{ScopeId, ScopeTree};
use crate::symbol::{Resolution, Resolved, SiteGroup, Symbol};

/// Receiver for groups produced while building.
pub trait GroupSink {
    /// Accept one complete group. Returning `Stop` ends the walk.
    fn accept(&mut self, group: SiteGroup) -> VisitResult;

    /// Polled between nodes; `true` ends the walk.
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl GroupSink for Vec<SiteGroup> {
    fn accept(&mut self, group: SiteGroup) -> VisitResult {
        self.push(group);
        VisitResult::Continue
    }
}

/// Result of a builder run.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub tree: ScopeTree,
    /// The resolved query, when a target was set, hit, and resolved before
    /// the walk ended.
    pub query: Option<Resolved>,
    /// False when a sink stopped the walk early.
    pub completed: bool,
}

/// Builds a [`ScopeTree`] for one source file.
pub struct ScopeBuilder<'f> {
    file: &'f SourceFile,
    target: Option<(u32, u32)>,
    policy: UnboundPolicy,
}

impl<'f> ScopeBuilder<'f> {
    pub fn new(file: &'f SourceFile) -> Self {
        ScopeBuilder {
            file,
            target: None,
            policy: UnboundPolicy::default(),
        }
    }

    /// Resolve the identifier at `(row, column)` while building.
    pub fn with_target(mut self, row: u32, column: u32) -> Self {
        self.target = Some((row, column));
        self
    }

    /// Set the policy for names nothing declares.
    pub fn with_policy(mut self, policy: UnboundPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Build the whole tree, discarding any query groups.
    pub fn build(self) -> ResolveResult<ScopeTree> {
        let mut groups = Vec::new();
        self.run(&mut groups).map(|outcome| outcome.tree)
    }

    /// Build the tree, delivering query groups to `sink` as scopes close.
    pub fn run(self, sink: &mut dyn GroupSink) -> ResolveResult<BuildOutcome> {
        let mut visitor = BuildVisitor {
            file: self.file,
            tree: ScopeTree::new(self.file.source_id, ScopeKind::File, self.file.span),
            stack: Vec::new(),
            target: self.target,
            policy: self.policy,
            sink,
            query: None,
            stopped: false,
            error: None,
        };
        let result = walk_source_file(&mut visitor, self.file);
        let completed = result != VisitResult::Stop;

        if let Some(err) = visitor.error {
            return Err(err);
        }
        let query = visitor.query.and_then(|q| q.resolved);
        debug!(
            source = %self.file.source_id,
            scopes = visitor.tree.len(),
            completed,
            hit = query.as_ref().map(|q| q.symbol.name.as_str()),
            "built scope tree"
        );
        Ok(BuildOutcome {
            tree: visitor.tree,
            query,
            completed,
        })
    }
}

/// Progress of a query once its identifier has been seen.
struct QueryState {
    symbol: Symbol,
    /// Chain scopes still open, root first; the last one closes next.
    open: Vec<ScopeId>,
    resolved: Option<Resolved>,
}

struct BuildVisitor<'f, 's> {
    file: &'f SourceFile,
    tree: ScopeTree,
    stack: Vec<ScopeId>,
    target: Option<(u32, u32)>,
    policy: UnboundPolicy,
    sink: &'s mut dyn GroupSink,
    query: Option<QueryState>,
    stopped: bool,
    error: Option<ResolveError>,
}

impl BuildVisitor<'_, '_> {
    fn halted(&mut self) -> bool {
        if !self.stopped && self.sink.is_cancelled() {
            debug!("scope walk cancelled");
            self.stopped = true;
        }
        self.stopped
    }

    fn deliver(&mut self, group: SiteGroup) {
        if self.sink.accept(group) == VisitResult::Stop {
            self.stopped = true;
        }
    }

    /// Called as `scope` closes; emits its group if it is on the query chain.
    fn close_chain_scope(&mut self, scope: ScopeId) {
        if self.stopped {
            return;
        }
        let Some(query) = &mut self.query else {
            return;
        };
        if query.resolved.is_some() || query.open.last() != Some(&scope) {
            return;
        }
        query.open.pop();

        let name = query.symbol.name.clone();
        let closing = self.tree.scope(scope);
        let declares = closing.has_declaration(&name);
        let at_root = closing.parent.is_none();

        let resolution = if declares {
            Some(Resolution::Bound)
        } else if at_root {
            match self.policy {
                UnboundPolicy::ImplicitRoot => {
                    warn!(
                        name = %name,
                        position = %query.symbol.position,
                        "name has no declaring scope; resolving to the root"
                    );
                    Some(Resolution::Free)
                }
                UnboundPolicy::Reject => {
                    self.error = Some(ResolveError::UnboundDeclaringScope {
                        name,
                        position: query.symbol.position,
                    });
                    return;
                }
            }
        } else {
            None
        };

        let group = SiteGroup {
            name: name.clone(),
            scope,
            kind: closing.kind,
            depth: closing.depth,
            positions: closing.get_sites(&name).to_vec(),
        };
        if let Some(resolution) = resolution {
            query.resolved = Some(Resolved {
                symbol: query.symbol.clone(),
                declaring_scope: scope,
                declaring_kind: closing.kind,
                resolution,
            });
        }
        self.deliver(group);
    }
}

impl Visitor for BuildVisitor<'_, '_> {
    fn enter_scope(&mut self, kind: ScopeKind, span: Span) -> VisitResult {
        if self.halted() {
            return VisitResult::Stop;
        }
        let id = match self.stack.last() {
            Some(&parent) => self.tree.create_child(parent, kind, span),
            None => self.tree.root(),
        };
        self.stack.push(id);
        VisitResult::Continue
    }

    fn leave_scope(&mut self, _kind: ScopeKind, _span: Span) {
        if let Some(scope) = self.stack.pop() {
            self.close_chain_scope(scope);
        }
    }

    fn visit_ident(&mut self, ident: &Ident, role: IdentRole) -> VisitResult {
        if self.halted() {
            return VisitResult::Stop;
        }
        if !role.is_lexical() || ident.is_blank() {
            return VisitResult::Continue;
        }
        let Some(&scope) = self.stack.last() else {
            return VisitResult::Continue;
        };
        let position = self.file.position_of(ident);
        match role {
            IdentRole::Declaration => self.tree.add_declaration(scope, &ident.name, position),
            _ => self.tree.add_site(scope, &ident.name, position),
        }

        if let Some((row, column)) = self.target {
            if self.query.is_none() && position.contains(row, column) {
                debug!(name = %ident.name, %position, %scope, "query hit");
                self.query = Some(QueryState {
                    symbol: Symbol {
                        name: ident.name.clone(),
                        position,
                        scope,
                    },
                    open: self.stack.clone(),
                    resolved: None,
                });
            }
        }
        VisitResult::Continue
    }
}
