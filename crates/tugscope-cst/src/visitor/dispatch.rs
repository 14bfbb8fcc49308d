// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Walk functions for tree traversal.
//!
//! The walk functions are where identifier roles and scope boundaries are
//! decided:
//!
//! | Construct | Scope | Identifier roles |
//! |-----------|-------|------------------|
//! | compilation unit | `File` | package name: `Package`; import alias: `Declaration` |
//! | `func F(...)` | `Function` (receiver, params, results, body top level) | `F`: `Declaration` in the enclosing scope; method names: `Member` |
//! | `func(...) {}` literal | `Function` | params/results: `Declaration` |
//! | `{ ... }` | `Block` | |
//! | `if` | `If` around init, condition, branches | |
//! | `for` | `For` around header and body | `k, v :=` in range: `Declaration` |
//! | `var`, `const`, `type`, `:=` | | left-hand names: `Declaration` |
//! | `x.f`, struct fields | | `f`: `Member` |
//! | `break L` | | `L`: `Label` |
//!
//! Every other identifier in expression or type position is a `Reference`.
//! Parameter names inside function *types* do not bind and are `Member`.
//! The blank identifier is reported like any other; consumers decide to
//! ignore it.
//!
//! # Control Flow
//!
//! - `VisitResult::Continue` - traverse into children
//! - `VisitResult::SkipChildren` - skip children but still call `leave_*`
//! - `VisitResult::Stop` - halt traversal immediately (no `leave_*` called)

use super::traits::{VisitResult, Visitor};
use crate::nodes::{
    Block, ElseBranch, Expr, ForHeader, ForStmt, FuncDecl, FuncLit, Ident, IdentRole, IfStmt,
    Item, ParamList, RangeVars, ScopeKind, Signature, SourceFile, Span, Stmt, TypeExpr, TypeKind,
};

/// Return early when a nested walk stopped.
macro_rules! try_walk {
    ($walk:expr) => {
        if $walk == VisitResult::Stop {
            return VisitResult::Stop;
        }
    };
}

/// Walk a [`SourceFile`].
pub fn walk_source_file<V: Visitor>(visitor: &mut V, node: &SourceFile) -> VisitResult {
    match visitor.visit_source_file(node) {
        VisitResult::Stop => return VisitResult::Stop,
        VisitResult::SkipChildren => {}
        VisitResult::Continue => {
            try_walk!(walk_scope(visitor, ScopeKind::File, node.span, |v| {
                if let Some(package) = &node.package {
                    try_walk!(walk_ident(v, &package.name, IdentRole::Package));
                }
                for import in &node.imports {
                    for spec in &import.specs {
                        if let Some(alias) = &spec.alias {
                            try_walk!(walk_ident(v, alias, IdentRole::Declaration));
                        }
                    }
                }
                for item in &node.items {
                    let result = match item {
                        Item::Func(func) => walk_func_decl(v, func),
                        Item::Stmt(stmt) => walk_stmt(v, stmt),
                    };
                    try_walk!(result);
                }
                VisitResult::Continue
            }));
        }
    }
    visitor.leave_source_file(node);
    VisitResult::Continue
}

/// Open a scope around `body`.
fn walk_scope<V, F>(visitor: &mut V, kind: ScopeKind, span: Span, body: F) -> VisitResult
where
    V: Visitor,
    F: FnOnce(&mut V) -> VisitResult,
{
    match visitor.enter_scope(kind, span) {
        VisitResult::Stop => return VisitResult::Stop,
        VisitResult::SkipChildren => {}
        VisitResult::Continue => try_walk!(body(visitor)),
    }
    visitor.leave_scope(kind, span);
    VisitResult::Continue
}

/// Report an identifier with its role.
pub fn walk_ident<V: Visitor>(visitor: &mut V, ident: &Ident, role: IdentRole) -> VisitResult {
    match visitor.visit_ident(ident, role) {
        VisitResult::Stop => VisitResult::Stop,
        _ => VisitResult::Continue,
    }
}

/// Walk a [`FuncDecl`].
pub fn walk_func_decl<V: Visitor>(visitor: &mut V, node: &FuncDecl) -> VisitResult {
    match visitor.visit_func_decl(node) {
        VisitResult::Stop => return VisitResult::Stop,
        VisitResult::SkipChildren => {}
        VisitResult::Continue => {
            let name_role = if node.is_method() {
                IdentRole::Member
            } else {
                IdentRole::Declaration
            };
            // Receiver precedes the name, but the name binds outside the function.
            try_walk!(walk_ident(visitor, &node.name, name_role));
            try_walk!(walk_scope(visitor, ScopeKind::Function, node.scope_span(), |v| {
                if let Some(receiver) = &node.receiver {
                    try_walk!(walk_param_list(v, receiver, IdentRole::Declaration));
                }
                try_walk!(walk_signature(v, &node.signature, IdentRole::Declaration));
                if let Some(body) = &node.body {
                    try_walk!(walk_block_contents(v, body));
                }
                VisitResult::Continue
            }));
        }
    }
    visitor.leave_func_decl(node);
    VisitResult::Continue
}

/// Walk a [`FuncLit`].
pub fn walk_func_lit<V: Visitor>(visitor: &mut V, node: &FuncLit) -> VisitResult {
    match visitor.visit_func_lit(node) {
        VisitResult::Stop => return VisitResult::Stop,
        VisitResult::SkipChildren => {}
        VisitResult::Continue => {
            try_walk!(walk_scope(visitor, ScopeKind::Function, node.span, |v| {
                try_walk!(walk_signature(v, &node.signature, IdentRole::Declaration));
                walk_block_contents(v, &node.body)
            }));
        }
    }
    visitor.leave_func_lit(node);
    VisitResult::Continue
}

fn walk_signature<V: Visitor>(
    visitor: &mut V,
    node: &Signature,
    name_role: IdentRole,
) -> VisitResult {
    try_walk!(walk_param_list(visitor, &node.params, name_role));
    if let Some(results) = &node.results {
        try_walk!(walk_param_list(visitor, results, name_role));
    }
    VisitResult::Continue
}

fn walk_param_list<V: Visitor>(
    visitor: &mut V,
    node: &ParamList,
    name_role: IdentRole,
) -> VisitResult {
    for group in &node.groups {
        for name in &group.names {
            try_walk!(walk_ident(visitor, name, name_role));
        }
        try_walk!(walk_type_expr(visitor, &group.ty));
    }
    VisitResult::Continue
}

/// Walk a [`Block`] that opens its own scope.
pub fn walk_block<V: Visitor>(visitor: &mut V, node: &Block) -> VisitResult {
    match visitor.visit_block(node) {
        VisitResult::Stop => return VisitResult::Stop,
        VisitResult::SkipChildren => {}
        VisitResult::Continue => {
            try_walk!(walk_scope(visitor, ScopeKind::Block, node.span, |v| {
                walk_stmts(v, &node.stmts)
            }));
        }
    }
    visitor.leave_block(node);
    VisitResult::Continue
}

/// Walk a function body, whose top level shares the function scope.
fn walk_block_contents<V: Visitor>(visitor: &mut V, node: &Block) -> VisitResult {
    match visitor.visit_block(node) {
        VisitResult::Stop => return VisitResult::Stop,
        VisitResult::SkipChildren => {}
        VisitResult::Continue => try_walk!(walk_stmts(visitor, &node.stmts)),
    }
    visitor.leave_block(node);
    VisitResult::Continue
}

fn walk_stmts<V: Visitor>(visitor: &mut V, stmts: &[Stmt]) -> VisitResult {
    for stmt in stmts {
        try_walk!(walk_stmt(visitor, stmt));
    }
    VisitResult::Continue
}

fn walk_exprs<V: Visitor>(visitor: &mut V, exprs: &[Expr]) -> VisitResult {
    for expr in exprs {
        try_walk!(walk_expr(visitor, expr));
    }
    VisitResult::Continue
}

fn walk_declared<V: Visitor>(visitor: &mut V, names: &[Ident]) -> VisitResult {
    for name in names {
        try_walk!(walk_ident(visitor, name, IdentRole::Declaration));
    }
    VisitResult::Continue
}

/// Walk a [`Stmt`].
pub fn walk_stmt<V: Visitor>(visitor: &mut V, node: &Stmt) -> VisitResult {
    match visitor.visit_stmt(node) {
        VisitResult::Stop => return VisitResult::Stop,
        VisitResult::SkipChildren => {}
        VisitResult::Continue => {
            let result = match node {
                Stmt::VarDecl(decl) => {
                    for spec in &decl.specs {
                        try_walk!(walk_declared(visitor, &spec.names));
                        if let Some(ty) = &spec.ty {
                            try_walk!(walk_type_expr(visitor, ty));
                        }
                        try_walk!(walk_exprs(visitor, &spec.values));
                    }
                    VisitResult::Continue
                }
                Stmt::TypeDecl(decl) => {
                    for spec in &decl.specs {
                        try_walk!(walk_ident(visitor, &spec.name, IdentRole::Declaration));
                        try_walk!(walk_type_expr(visitor, &spec.ty));
                    }
                    VisitResult::Continue
                }
                Stmt::ShortVarDecl(decl) => {
                    try_walk!(walk_declared(visitor, &decl.names));
                    walk_exprs(visitor, &decl.values)
                }
                Stmt::Assign(assign) => {
                    try_walk!(walk_exprs(visitor, &assign.targets));
                    walk_exprs(visitor, &assign.values)
                }
                Stmt::IncDec(stmt) => walk_expr(visitor, &stmt.target),
                Stmt::Send(stmt) => {
                    try_walk!(walk_expr(visitor, &stmt.channel));
                    walk_expr(visitor, &stmt.value)
                }
                Stmt::Expr(stmt) => walk_expr(visitor, &stmt.expr),
                Stmt::Block(block) => walk_block(visitor, block),
                Stmt::If(stmt) => walk_if(visitor, stmt),
                Stmt::For(stmt) => walk_for(visitor, stmt),
                Stmt::Return(stmt) => walk_exprs(visitor, &stmt.values),
                Stmt::Go(stmt) | Stmt::Defer(stmt) => walk_expr(visitor, &stmt.expr),
                Stmt::Branch(stmt) => match &stmt.label {
                    Some(label) => walk_ident(visitor, label, IdentRole::Label),
                    None => VisitResult::Continue,
                },
            };
            try_walk!(result);
        }
    }
    visitor.leave_stmt(node);
    VisitResult::Continue
}

/// Walk an [`IfStmt`].
pub fn walk_if<V: Visitor>(visitor: &mut V, node: &IfStmt) -> VisitResult {
    match visitor.visit_if_stmt(node) {
        VisitResult::Stop => return VisitResult::Stop,
        VisitResult::SkipChildren => {}
        VisitResult::Continue => {
            try_walk!(walk_scope(visitor, ScopeKind::If, node.span, |v| {
                if let Some(init) = &node.init {
                    try_walk!(walk_stmt(v, init));
                }
                try_walk!(walk_expr(v, &node.cond));
                try_walk!(walk_block(v, &node.then_block));
                match &node.else_branch {
                    Some(ElseBranch::If(nested)) => walk_if(v, nested),
                    Some(ElseBranch::Block(block)) => walk_block(v, block),
                    None => VisitResult::Continue,
                }
            }));
        }
    }
    visitor.leave_if_stmt(node);
    VisitResult::Continue
}

/// Walk a [`ForStmt`].
pub fn walk_for<V: Visitor>(visitor: &mut V, node: &ForStmt) -> VisitResult {
    match visitor.visit_for_stmt(node) {
        VisitResult::Stop => return VisitResult::Stop,
        VisitResult::SkipChildren => {}
        VisitResult::Continue => {
            try_walk!(walk_scope(visitor, ScopeKind::For, node.span, |v| {
                match &node.header {
                    ForHeader::Infinite => {}
                    ForHeader::Cond(cond) => try_walk!(walk_expr(v, cond)),
                    ForHeader::Clause { init, cond, post } => {
                        if let Some(init) = init {
                            try_walk!(walk_stmt(v, init));
                        }
                        if let Some(cond) = cond {
                            try_walk!(walk_expr(v, cond));
                        }
                        if let Some(post) = post {
                            try_walk!(walk_stmt(v, post));
                        }
                    }
                    ForHeader::Range(range) => {
                        match &range.vars {
                            RangeVars::None => {}
                            RangeVars::Define(names) => try_walk!(walk_declared(v, names)),
                            RangeVars::Assign(targets) => try_walk!(walk_exprs(v, targets)),
                        }
                        try_walk!(walk_expr(v, &range.expr));
                    }
                }
                walk_block(v, &node.body)
            }));
        }
    }
    visitor.leave_for_stmt(node);
    VisitResult::Continue
}

/// Walk an [`Expr`].
pub fn walk_expr<V: Visitor>(visitor: &mut V, node: &Expr) -> VisitResult {
    match visitor.visit_expr(node) {
        VisitResult::Stop => return VisitResult::Stop,
        VisitResult::SkipChildren => {}
        VisitResult::Continue => {
            let result = match node {
                Expr::Ident(ident) => walk_ident(visitor, ident, IdentRole::Reference),
                Expr::BasicLit(_) => VisitResult::Continue,
                Expr::FuncLit(lit) => walk_func_lit(visitor, lit),
                Expr::Paren(paren) => walk_expr(visitor, &paren.inner),
                Expr::Selector(sel) => {
                    try_walk!(walk_expr(visitor, &sel.operand));
                    walk_ident(visitor, &sel.field, IdentRole::Member)
                }
                Expr::TypeAssert(assert) => {
                    try_walk!(walk_expr(visitor, &assert.operand));
                    walk_type_expr(visitor, &assert.ty)
                }
                Expr::Index(index) => {
                    try_walk!(walk_expr(visitor, &index.operand));
                    walk_expr(visitor, &index.index)
                }
                Expr::Slice(slice) => {
                    try_walk!(walk_expr(visitor, &slice.operand));
                    if let Some(low) = &slice.low {
                        try_walk!(walk_expr(visitor, low));
                    }
                    if let Some(high) = &slice.high {
                        try_walk!(walk_expr(visitor, high));
                    }
                    VisitResult::Continue
                }
                Expr::Call(call) => {
                    try_walk!(walk_expr(visitor, &call.func));
                    walk_exprs(visitor, &call.args)
                }
                Expr::Unary(unary) => walk_expr(visitor, &unary.operand),
                Expr::Binary(binary) => {
                    try_walk!(walk_expr(visitor, &binary.left));
                    walk_expr(visitor, &binary.right)
                }
                Expr::Type(ty) => walk_type_expr(visitor, ty),
            };
            try_walk!(result);
        }
    }
    visitor.leave_expr(node);
    VisitResult::Continue
}

/// Walk a [`TypeExpr`].
pub fn walk_type_expr<V: Visitor>(visitor: &mut V, node: &TypeExpr) -> VisitResult {
    match visitor.visit_type_expr(node) {
        VisitResult::Stop => return VisitResult::Stop,
        VisitResult::SkipChildren => {}
        VisitResult::Continue => {
            let result = match &node.kind {
                TypeKind::Name(name) => walk_ident(visitor, name, IdentRole::Reference),
                TypeKind::Qualified { package, name } => {
                    try_walk!(walk_ident(visitor, package, IdentRole::Reference));
                    walk_ident(visitor, name, IdentRole::Member)
                }
                TypeKind::Pointer(elem) | TypeKind::Slice(elem) => walk_type_expr(visitor, elem),
                TypeKind::Array { len, elem } => {
                    try_walk!(walk_expr(visitor, len));
                    walk_type_expr(visitor, elem)
                }
                TypeKind::Map { key, value } => {
                    try_walk!(walk_type_expr(visitor, key));
                    walk_type_expr(visitor, value)
                }
                TypeKind::Chan { elem, .. } => walk_type_expr(visitor, elem),
                TypeKind::Func(signature) => {
                    walk_signature(visitor, signature, IdentRole::Member)
                }
                TypeKind::Struct(fields) => {
                    for field in fields {
                        for name in &field.names {
                            try_walk!(walk_ident(visitor, name, IdentRole::Member));
                        }
                        try_walk!(walk_type_expr(visitor, &field.ty));
                    }
                    VisitResult::Continue
                }
                TypeKind::Interface => VisitResult::Continue,
            };
            try_walk!(result);
        }
    }
    visitor.leave_type_expr(node);
    VisitResult::Continue
}
