// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Visitor and transformer trait definitions for tree traversal.

use crate::nodes::{
    Block, Expr, ForStmt, FuncDecl, FuncLit, Ident, IdentRole, IfStmt, ScopeKind, SourceFile,
    Span, Stmt, TypeExpr,
};

/// Result of visiting a node - controls traversal behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VisitResult {
    /// Continue traversal into children.
    ///
    /// After visiting children, `leave_*` will be called for this node.
    #[default]
    Continue,

    /// Skip children, continue with siblings.
    ///
    /// The walker will not descend into this node's children, but `leave_*`
    /// will still be called for this node.
    SkipChildren,

    /// Stop traversal entirely.
    ///
    /// No further `visit_*` or `leave_*` methods will be called. The walk
    /// function will return immediately.
    Stop,
}

/// Macro to generate visitor trait method signatures.
///
/// This macro generates pairs of `visit_*` and `leave_*` methods with default
/// implementations that return `VisitResult::Continue` and do nothing, respectively.
macro_rules! visitor_methods {
    (
        $(
            $(#[$meta:meta])*
            $base_name:ident : $node_type:ty
        ),* $(,)?
    ) => {
        paste::paste! {
            $(
                $(#[$meta])*
                #[doc = concat!("Visit a [`", stringify!($node_type), "`] node.")]
                #[doc = ""]
                #[doc = "Called before descending into children. Return `VisitResult` to control traversal."]
                #[allow(unused_variables)]
                fn [<visit_ $base_name>](&mut self, node: &$node_type) -> VisitResult {
                    VisitResult::Continue
                }

                $(#[$meta])*
                #[doc = concat!("Leave a [`", stringify!($node_type), "`] node.")]
                #[doc = ""]
                #[doc = "Called after all children have been visited. Called even if `SkipChildren` was returned."]
                #[allow(unused_variables)]
                fn [<leave_ $base_name>](&mut self, node: &$node_type) {}
            )*
        }
    };
}

/// Immutable visitor for tree traversal.
///
/// # Traversal Order
///
/// - `visit_*` is called in **pre-order** (before children)
/// - `leave_*` is called in **post-order** (after children)
/// - Children are visited in source order
///
/// # Identifiers and scopes
///
/// Identifiers are leaves: [`Visitor::visit_ident`] receives the
/// [`IdentRole`] the walk functions assigned. Scope boundaries are reported
/// through [`Visitor::enter_scope`] / [`Visitor::leave_scope`], independent of
/// the node hooks, so every consumer sees the same scope granularity.
///
/// # Example
///
/// ```
/// use tugscope_cst::visitor::{walk_source_file, VisitResult, Visitor};
/// use tugscope_cst::{parse_source, Ident, IdentRole};
/// use tugscope_core::types::SourceId;
///
/// struct DeclCounter(usize);
///
/// impl Visitor for DeclCounter {
///     fn visit_ident(&mut self, _ident: &Ident, role: IdentRole) -> VisitResult {
///         if role == IdentRole::Declaration {
///             self.0 += 1;
///         }
///         VisitResult::Continue
///     }
/// }
///
/// let file = parse_source("{\na := 0\nb := a\n}", SourceId(0)).unwrap();
/// let mut counter = DeclCounter(0);
/// walk_source_file(&mut counter, &file);
/// assert_eq!(counter.0, 2);
/// ```
pub trait Visitor {
    visitor_methods! {
        source_file: SourceFile,
        func_decl: FuncDecl,
        func_lit: FuncLit,
        block: Block,
        stmt: Stmt,
        if_stmt: IfStmt,
        for_stmt: ForStmt,
        expr: Expr,
        type_expr: TypeExpr,
    }

    /// Visit an identifier occurrence.
    ///
    /// `SkipChildren` behaves like `Continue`; identifiers have no children.
    #[allow(unused_variables)]
    fn visit_ident(&mut self, ident: &Ident, role: IdentRole) -> VisitResult {
        VisitResult::Continue
    }

    /// Enter a lexical scope covering `span`.
    ///
    /// `SkipChildren` skips the scope's contents; `leave_scope` is still called.
    #[allow(unused_variables)]
    fn enter_scope(&mut self, kind: ScopeKind, span: Span) -> VisitResult {
        VisitResult::Continue
    }

    /// Leave the innermost open scope.
    #[allow(unused_variables)]
    fn leave_scope(&mut self, kind: ScopeKind, span: Span) {}
}

/// Mutable transformer over identifiers.
///
/// The tree's only mutable state is identifier names, so this is the whole
/// transformation surface. Closures taking `&mut Ident` implement it.
pub trait Transformer {
    /// Transform an identifier in place.
    fn transform_ident(&mut self, ident: &mut Ident);
}

impl<F: FnMut(&mut Ident)> Transformer for F {
    fn transform_ident(&mut self, ident: &mut Ident) {
        self(ident)
    }
}
