//! Scope-bounded in-place renaming.
//!
//! [`RenameTransformer`] renames the binding anchored at a position and
//! nothing else. It runs in two passes over the tree:
//!
//! 1. A read-only walk keeps one frame per open scope. Each frame buffers the
//!    ids of target-name identifiers recorded in it, whether the scope
//!    declares the name, and whether the anchor was seen in it. When a frame
//!    closes:
//!
//!    | triggered | declares or root | action |
//!    |-----------|------------------|--------|
//!    | yes | yes | commit the buffer |
//!    | yes | no | promote the buffer, trigger the parent |
//!    | no | yes | discard (a different binding) |
//!    | no | no | promote the buffer undecided |
//!
//! 2. A mutable walk rewrites the committed identifiers by id.
//!
//! The frames use the same scope boundaries as the scope builder, so the
//! identifiers renamed are exactly the binding occurrences the locator
//! reports for the anchor.

use std::collections::HashSet;

use tracing::{debug, trace};
use tugscope_core::config::UnboundPolicy;
use tugscope_core::patch::Span;
use tugscope_core::types::Position;
use tugscope_cst::parser::is_keyword;
use tugscope_cst::visitor::{transform_source_file, walk_source_file, VisitResult, Visitor};
use tugscope_cst::{Ident, IdentRole, NodeId, ScopeKind, SourceFile};

use crate::error::{ResolveError, ResolveResult};
use crate::symbol::Resolution;

/// Result of a successful rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameOutcome {
    pub old_name: String,
    pub new_name: String,
    /// Original positions of the renamed identifiers, in source order.
    pub renamed: Vec<Position>,
    pub resolution: Resolution,
}

/// Renames one binding of a name, anchored at a position.
#[derive(Debug, Clone)]
pub struct RenameTransformer {
    target: String,
    new_name: String,
    row: u32,
    column: u32,
    policy: UnboundPolicy,
}

impl RenameTransformer {
    /// Rename the `target` occurrence covering `(row, column)`, and every
    /// occurrence bound to the same declaration, to `new_name`.
    pub fn new(
        target: impl Into<String>,
        new_name: impl Into<String>,
        row: u32,
        column: u32,
    ) -> Self {
        RenameTransformer {
            target: target.into(),
            new_name: new_name.into(),
            row,
            column,
            policy: UnboundPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: UnboundPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Rename in place.
    ///
    /// The tree is left untouched on error.
    pub fn apply(&self, file: &mut SourceFile) -> ResolveResult<RenameOutcome> {
        validate_identifier(&self.new_name)?;

        let mut collector = RenameCollector {
            file,
            target: &self.target,
            row: self.row,
            column: self.column,
            frames: Vec::new(),
            committed: Vec::new(),
            free: false,
        };
        walk_source_file(&mut collector, file);
        let free = collector.free;
        let mut committed = collector.committed;

        if committed.is_empty() {
            return Err(ResolveError::RenameTargetNotFound {
                name: self.target.clone(),
                line: self.row,
                column: self.column,
            });
        }
        if free && self.policy == UnboundPolicy::Reject {
            let position = committed
                .iter()
                .map(|(_, p)| *p)
                .find(|p| p.contains(self.row, self.column))
                .unwrap_or(committed[0].1);
            return Err(ResolveError::UnboundDeclaringScope {
                name: self.target.clone(),
                position,
            });
        }

        committed.sort_by_key(|(_, p)| *p);
        let ids: HashSet<NodeId> = committed.iter().map(|(id, _)| *id).collect();
        let mut rewritten = 0usize;
        transform_source_file(
            &mut |ident: &mut Ident| {
                if ids.contains(&ident.id) {
                    ident.name.clone_from(&self.new_name);
                    rewritten += 1;
                }
            },
            file,
        );
        debug!(
            from = %self.target,
            to = %self.new_name,
            renamed = rewritten,
            free,
            "renamed binding"
        );

        Ok(RenameOutcome {
            old_name: self.target.clone(),
            new_name: self.new_name.clone(),
            renamed: committed.into_iter().map(|(_, p)| p).collect(),
            resolution: if free {
                Resolution::Free
            } else {
                Resolution::Bound
            },
        })
    }
}

/// Check that `name` can replace an identifier.
pub fn validate_identifier(name: &str) -> ResolveResult<()> {
    let invalid = |reason: &str| {
        Err(ResolveError::InvalidIdentifier {
            name: name.to_string(),
            reason: reason.to_string(),
        })
    };
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return invalid("empty name");
    };
    if !(first.is_alphabetic() || first == '_') {
        return invalid("must start with a letter or underscore");
    }
    if !chars.all(|c| c.is_alphanumeric() || c == '_') {
        return invalid("may only contain letters, digits and underscores");
    }
    if name == "_" {
        return invalid("the blank identifier cannot be a rename target");
    }
    if is_keyword(name) {
        return invalid("reserved keyword");
    }
    Ok(())
}

/// Per-scope state of the collecting pass.
#[derive(Debug)]
struct Frame {
    kind: ScopeKind,
    ids: Vec<(NodeId, Position)>,
    declares: bool,
    triggered: bool,
}

struct RenameCollector<'a> {
    file: &'a SourceFile,
    target: &'a str,
    row: u32,
    column: u32,
    frames: Vec<Frame>,
    committed: Vec<(NodeId, Position)>,
    free: bool,
}

impl Visitor for RenameCollector<'_> {
    fn enter_scope(&mut self, kind: ScopeKind, _span: Span) -> VisitResult {
        self.frames.push(Frame {
            kind,
            ids: Vec::new(),
            declares: false,
            triggered: false,
        });
        VisitResult::Continue
    }

    fn leave_scope(&mut self, _kind: ScopeKind, _span: Span) {
        let Some(frame) = self.frames.pop() else {
            return;
        };
        let parent = self.frames.last_mut();
        let owner = frame.declares || parent.is_none();
        trace!(
            kind = %frame.kind,
            buffered = frame.ids.len(),
            declares = frame.declares,
            triggered = frame.triggered,
            "closing rename frame"
        );
        match (frame.triggered, owner, parent) {
            (true, true, _) => {
                self.free = !frame.declares;
                self.committed.extend(frame.ids);
            }
            (true, false, Some(parent)) => {
                parent.triggered = true;
                parent.ids.extend(frame.ids);
            }
            (false, false, Some(parent)) => parent.ids.extend(frame.ids),
            // A separate binding, or nothing at the root.
            _ => {}
        }
    }

    fn visit_ident(&mut self, ident: &Ident, role: IdentRole) -> VisitResult {
        if !role.is_lexical() || ident.is_blank() || ident.name != self.target {
            return VisitResult::Continue;
        }
        let position = self.file.position_of(ident);
        let Some(frame) = self.frames.last_mut() else {
            return VisitResult::Continue;
        };
        frame.ids.push((ident.id, position));
        if role == IdentRole::Declaration {
            frame.declares = true;
        }
        if position.contains(self.row, self.column) {
            frame.triggered = true;
        }
        VisitResult::Continue
    }
}
