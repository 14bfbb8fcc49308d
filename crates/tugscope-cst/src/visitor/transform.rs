// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Mutable traversal that hands every identifier to a [`Transformer`].
//!
//! Identifiers are visited in the same source order as the walk functions,
//! including blank and non-lexical ones. No roles or scopes are reported;
//! consumers that need them collect [`NodeId`](crate::NodeId)s with a
//! [`Visitor`](super::Visitor) first and match on `ident.id` here.

use super::traits::Transformer;
use crate::nodes::{
    Block, ElseBranch, Expr, ForHeader, FuncDecl, IfStmt, Item, ParamList, RangeVars, Signature,
    SourceFile, Stmt, TypeExpr, TypeKind,
};

/// Transform every identifier in `file`.
pub fn transform_source_file<T: Transformer>(transformer: &mut T, file: &mut SourceFile) {
    if let Some(package) = &mut file.package {
        transformer.transform_ident(&mut package.name);
    }
    for import in &mut file.imports {
        for spec in &mut import.specs {
            if let Some(alias) = &mut spec.alias {
                transformer.transform_ident(alias);
            }
        }
    }
    for item in &mut file.items {
        match item {
            Item::Func(func) => transform_func_decl(transformer, func),
            Item::Stmt(stmt) => transform_stmt(transformer, stmt),
        }
    }
}

fn transform_func_decl<T: Transformer>(t: &mut T, func: &mut FuncDecl) {
    // The name comes before the receiver, matching the walk order.
    t.transform_ident(&mut func.name);
    if let Some(receiver) = &mut func.receiver {
        transform_param_list(t, receiver);
    }
    transform_signature(t, &mut func.signature);
    if let Some(body) = &mut func.body {
        transform_block(t, body);
    }
}

fn transform_signature<T: Transformer>(t: &mut T, signature: &mut Signature) {
    transform_param_list(t, &mut signature.params);
    if let Some(results) = &mut signature.results {
        transform_param_list(t, results);
    }
}

fn transform_param_list<T: Transformer>(t: &mut T, list: &mut ParamList) {
    for group in &mut list.groups {
        for name in &mut group.names {
            t.transform_ident(name);
        }
        transform_type_expr(t, &mut group.ty);
    }
}

fn transform_block<T: Transformer>(t: &mut T, block: &mut Block) {
    for stmt in &mut block.stmts {
        transform_stmt(t, stmt);
    }
}

fn transform_exprs<T: Transformer>(t: &mut T, exprs: &mut [Expr]) {
    for expr in exprs {
        transform_expr(t, expr);
    }
}

fn transform_stmt<T: Transformer>(t: &mut T, stmt: &mut Stmt) {
    match stmt {
        Stmt::VarDecl(decl) => {
            for spec in &mut decl.specs {
                for name in &mut spec.names {
                    t.transform_ident(name);
                }
                if let Some(ty) = &mut spec.ty {
                    transform_type_expr(t, ty);
                }
                transform_exprs(t, &mut spec.values);
            }
        }
        Stmt::TypeDecl(decl) => {
            for spec in &mut decl.specs {
                t.transform_ident(&mut spec.name);
                transform_type_expr(t, &mut spec.ty);
            }
        }
        Stmt::ShortVarDecl(decl) => {
            for name in &mut decl.names {
                t.transform_ident(name);
            }
            transform_exprs(t, &mut decl.values);
        }
        Stmt::Assign(assign) => {
            transform_exprs(t, &mut assign.targets);
            transform_exprs(t, &mut assign.values);
        }
        Stmt::IncDec(stmt) => transform_expr(t, &mut stmt.target),
        Stmt::Send(stmt) => {
            transform_expr(t, &mut stmt.channel);
            transform_expr(t, &mut stmt.value);
        }
        Stmt::Expr(stmt) => transform_expr(t, &mut stmt.expr),
        Stmt::Block(block) => transform_block(t, block),
        Stmt::If(stmt) => transform_if(t, stmt),
        Stmt::For(stmt) => {
            match &mut stmt.header {
                ForHeader::Infinite => {}
                ForHeader::Cond(cond) => transform_expr(t, cond),
                ForHeader::Clause { init, cond, post } => {
                    if let Some(init) = init {
                        transform_stmt(t, init);
                    }
                    if let Some(cond) = cond {
                        transform_expr(t, cond);
                    }
                    if let Some(post) = post {
                        transform_stmt(t, post);
                    }
                }
                ForHeader::Range(range) => {
                    match &mut range.vars {
                        RangeVars::None => {}
                        RangeVars::Define(names) => {
                            for name in names {
                                t.transform_ident(name);
                            }
                        }
                        RangeVars::Assign(targets) => transform_exprs(t, targets),
                    }
                    transform_expr(t, &mut range.expr);
                }
            }
            transform_block(t, &mut stmt.body);
        }
        Stmt::Return(stmt) => transform_exprs(t, &mut stmt.values),
        Stmt::Go(stmt) | Stmt::Defer(stmt) => transform_expr(t, &mut stmt.expr),
        Stmt::Branch(stmt) => {
            if let Some(label) = &mut stmt.label {
                t.transform_ident(label);
            }
        }
    }
}

fn transform_if<T: Transformer>(t: &mut T, stmt: &mut IfStmt) {
    if let Some(init) = &mut stmt.init {
        transform_stmt(t, init);
    }
    transform_expr(t, &mut stmt.cond);
    transform_block(t, &mut stmt.then_block);
    match &mut stmt.else_branch {
        Some(ElseBranch::If(nested)) => transform_if(t, nested),
        Some(ElseBranch::Block(block)) => transform_block(t, block),
        None => {}
    }
}

fn transform_expr<T: Transformer>(t: &mut T, expr: &mut Expr) {
    match expr {
        Expr::Ident(ident) => t.transform_ident(ident),
        Expr::BasicLit(_) => {}
        Expr::FuncLit(lit) => {
            transform_signature(t, &mut lit.signature);
            transform_block(t, &mut lit.body);
        }
        Expr::Paren(paren) => transform_expr(t, &mut paren.inner),
        Expr::Selector(sel) => {
            transform_expr(t, &mut sel.operand);
            t.transform_ident(&mut sel.field);
        }
        Expr::TypeAssert(assert) => {
            transform_expr(t, &mut assert.operand);
            transform_type_expr(t, &mut assert.ty);
        }
        Expr::Index(index) => {
            transform_expr(t, &mut index.operand);
            transform_expr(t, &mut index.index);
        }
        Expr::Slice(slice) => {
            transform_expr(t, &mut slice.operand);
            if let Some(low) = &mut slice.low {
                transform_expr(t, low);
            }
            if let Some(high) = &mut slice.high {
                transform_expr(t, high);
            }
        }
        Expr::Call(call) => {
            transform_expr(t, &mut call.func);
            transform_exprs(t, &mut call.args);
        }
        Expr::Unary(unary) => transform_expr(t, &mut unary.operand),
        Expr::Binary(binary) => {
            transform_expr(t, &mut binary.left);
            transform_expr(t, &mut binary.right);
        }
        Expr::Type(ty) => transform_type_expr(t, ty),
    }
}

fn transform_type_expr<T: Transformer>(t: &mut T, ty: &mut TypeExpr) {
    match &mut ty.kind {
        TypeKind::Name(name) => t.transform_ident(name),
        TypeKind::Qualified { package, name } => {
            t.transform_ident(package);
            t.transform_ident(name);
        }
        TypeKind::Pointer(elem) | TypeKind::Slice(elem) => transform_type_expr(t, elem),
        TypeKind::Array { len, elem } => {
            transform_expr(t, len);
            transform_type_expr(t, elem);
        }
        TypeKind::Map { key, value } => {
            transform_type_expr(t, key);
            transform_type_expr(t, value);
        }
        TypeKind::Chan { elem, .. } => transform_type_expr(t, elem),
        TypeKind::Func(signature) => transform_signature(t, signature),
        TypeKind::Struct(fields) => {
            for field in fields {
                for name in &mut field.names {
                    t.transform_ident(name);
                }
                transform_type_expr(t, &mut field.ty);
            }
        }
        TypeKind::Interface => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_source;
    use crate::visitor::{walk_source_file, VisitResult, Visitor};
    use crate::{Ident, IdentRole};
    use tugscope_core::types::SourceId;

    struct Names(Vec<String>);

    impl Visitor for Names {
        fn visit_ident(&mut self, ident: &Ident, _role: IdentRole) -> VisitResult {
            self.0.push(ident.name.clone());
            VisitResult::Continue
        }
    }

    #[test]
    fn visits_identifiers_in_walk_order() {
        let text = "package p\nimport f \"fmt\"\nfunc (r *R) M(a, b int) (c []T) {\nfor i, _ := range a {\nif x := i; x > b {\nf.P(func(z int) {}(x))\n}\n}\nreturn m[k:n]\n}";
        let mut file = parse_source(text, SourceId(0)).unwrap();

        let mut walked = Names(Vec::new());
        walk_source_file(&mut walked, &file);

        let mut transformed = Vec::new();
        transform_source_file(
            &mut |ident: &mut Ident| transformed.push(ident.name.clone()),
            &mut file,
        );
        assert_eq!(transformed, walked.0);
    }

    #[test]
    fn closure_renames_in_place() {
        let mut file = parse_source("a := 1\nb := a", SourceId(0)).unwrap();
        transform_source_file(
            &mut |ident: &mut Ident| {
                if ident.name == "a" {
                    ident.name = "z".to_string();
                }
            },
            &mut file,
        );
        let mut names = Names(Vec::new());
        walk_source_file(&mut names, &file);
        assert_eq!(names.0, vec!["z", "b", "z"]);
    }
}
