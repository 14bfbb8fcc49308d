// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! PEG grammar for the supported Go subset.
//!
//! # Whitespace
//!
//! Two whitespace rules implement a simplified form of Go's semicolon
//! insertion:
//!
//! - `ws()` skips spaces, newlines and comments. It is used where Go allows a
//!   line break: after an opening bracket, after a comma, after a binary
//!   operator.
//! - `hs()` skips horizontal whitespace and single-line block comments only.
//!   It is used before binary operators, call parentheses, index brackets and
//!   selectors, so an expression never continues onto the next line.
//!
//! A statement ends at `;`, a newline, a closing `}` or end of input.
//!
//! # Top level
//!
//! A compilation unit is an optional package clause, imports, then any mix
//! of function declarations and statements, so snippets such as
//! `{ a := 0 }` parse without a surrounding function.

use thiserror::Error;
use tugscope_core::text::LineIndex;

use crate::nodes::*;

/// A syntax error. Fatal: no partial tree is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parse error at {line}:{column}: expected {expected}")]
pub struct ParseError {
    /// Line of the failure (1-indexed).
    pub line: u32,
    /// Column of the failure (1-indexed, bytes).
    pub column: u32,
    /// Byte offset of the failure.
    pub offset: usize,
    /// What the grammar expected at this point.
    pub expected: String,
}

/// Parse `text` into a [`FileBody`], allocating identifier ids from `ids`.
pub fn parse_file_body(text: &str, ids: &NodeIdGen) -> Result<FileBody, ParseError> {
    go_grammar::source_file(text, ids).map_err(|err| {
        let (line, column) = LineIndex::new(text).position(err.location.offset);
        ParseError {
            line,
            column,
            offset: err.location.offset,
            expected: err.expected.to_string(),
        }
    })
}

// ============================================================================
// Grammar helpers
// ============================================================================

const KEYWORDS: &[&str] = &[
    "break",
    "case",
    "chan",
    "const",
    "continue",
    "default",
    "defer",
    "else",
    "fallthrough",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "return",
    "select",
    "struct",
    "switch",
    "type",
    "var",
];

/// True for Go's reserved words.
pub fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

fn span(start: usize, end: usize) -> Span {
    Span::from_offsets(start, end)
}

fn is_float(lit: &str) -> bool {
    let hex = lit.starts_with("0x") || lit.starts_with("0X");
    !hex && (lit.contains('.') || lit.contains(['e', 'E']))
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    let span = left.span().cover(&right.span());
    Expr::Binary(Box::new(BinaryExpr {
        op,
        left,
        right,
        span,
    }))
}

fn make_type(start: usize, end: usize, kind: TypeKind) -> TypeExpr {
    TypeExpr {
        kind,
        span: span(start, end),
    }
}

/// A postfix operation, with the end offset of the whole expression.
enum Suffix {
    Selector(Ident),
    TypeAssert(TypeExpr, usize),
    Call(Vec<Expr>, bool, usize),
    Index(Expr, usize),
    Slice(Option<Expr>, Option<Expr>, usize),
}

fn apply_suffix(operand: Expr, suffix: Suffix) -> Expr {
    let start = operand.span().start as usize;
    match suffix {
        Suffix::Selector(field) => {
            let span = span(start, field.span.end as usize);
            Expr::Selector(Box::new(SelectorExpr {
                operand,
                field,
                span,
            }))
        }
        Suffix::TypeAssert(ty, end) => Expr::TypeAssert(Box::new(TypeAssertExpr {
            operand,
            ty,
            span: span(start, end),
        })),
        Suffix::Call(args, spread, end) => Expr::Call(Box::new(CallExpr {
            func: operand,
            args,
            spread,
            span: span(start, end),
        })),
        Suffix::Index(index, end) => Expr::Index(Box::new(IndexExpr {
            operand,
            index,
            span: span(start, end),
        })),
        Suffix::Slice(low, high, end) => Expr::Slice(Box::new(SliceExpr {
            operand,
            low,
            high,
            span: span(start, end),
        })),
    }
}

/// What follows the left side of a simple statement.
enum SimpleTail {
    Assign(AssignOp, Vec<Expr>),
    IncDec(bool),
    Send(Expr),
    Expr,
}

fn finish_simple_stmt(
    mut lhs: Vec<Expr>,
    tail: SimpleTail,
    span: Span,
) -> Result<Stmt, &'static str> {
    if let SimpleTail::Assign(op, values) = tail {
        return Ok(Stmt::Assign(Box::new(AssignStmt {
            targets: lhs,
            op,
            values,
            span,
        })));
    }
    let single = match (lhs.pop(), lhs.is_empty()) {
        (Some(expr), true) => expr,
        _ => return Err("assignment operator"),
    };
    Ok(match tail {
        SimpleTail::IncDec(increment) => Stmt::IncDec(Box::new(IncDecStmt {
            target: single,
            increment,
            span,
        })),
        SimpleTail::Send(value) => Stmt::Send(Box::new(SendStmt {
            channel: single,
            value,
            span,
        })),
        _ => Stmt::Expr(Box::new(ExprStmt { expr: single, span })),
    })
}

fn unnamed_results(ty: TypeExpr) -> ParamList {
    let span = ty.span;
    ParamList {
        groups: vec![ParamGroup {
            names: Vec::new(),
            variadic: false,
            ty,
            span,
        }],
        span,
    }
}

peg::parser! {
    grammar go_grammar(ids: &NodeIdGen) for str {

        // --------------------------------------------------------------------
        // Whitespace and termination
        // --------------------------------------------------------------------

        rule line_comment() = "//" (!"\n" [_])*
        rule block_comment() = "/*" (!"*/" [_])* "*/"
        rule inline_comment() = "/*" (!("*/" / "\n") [_])* "*/"

        rule ws() = quiet!{ ([' ' | '\t' | '\r' | '\n'] / line_comment() / block_comment())* }
        rule hs() = quiet!{ ([' ' | '\t' | '\r'] / inline_comment())* }
        rule eof() = ![_]

        rule term() = quiet!{
            hs() (";" / line_comment()? "\n" / line_comment()? eof() / &"}")
        } / expected!("end of statement")

        rule group_term() = quiet!{
            hs() (";" / line_comment()? "\n" / &")")
        } / expected!("end of declaration")

        // --------------------------------------------------------------------
        // Tokens
        // --------------------------------------------------------------------

        rule ident_start() = ['a'..='z' | 'A'..='Z' | '_' | '\u{80}'..='\u{10FFFF}']
        rule ident_char() = ['a'..='z' | 'A'..='Z' | '0'..='9' | '_' | '\u{80}'..='\u{10FFFF}']

        rule kw(k: &'static str) -> ()
            = s:$(ident_start() ident_char()*) {? if s == k { Ok(()) } else { Err(k) } }

        rule ident() -> Ident
            = quiet!{
                p:position!() s:$(ident_start() ident_char()*) e:position!() {?
                    if is_keyword(s) {
                        Err("identifier")
                    } else {
                        Ok(Ident::new(ids.next_id(), s, span(p, e)))
                    }
                }
            } / expected!("identifier")

        rule ident_list() -> Vec<Ident> = ident() ++ (hs() "," ws())

        rule basic_lit() -> BasicLit
            = quiet!{
                p:position!() kind:lit_kind() e:position!() {
                    BasicLit { kind, span: span(p, e) }
                }
            } / expected!("literal")

        rule lit_kind() -> LitKind
            = "`" [^'`']* "`" { LitKind::RawString }
            / "\"" ("\\" [_] / [^'"' | '\\' | '\n'])* "\"" { LitKind::String }
            / "'" ("\\" [_] (!"'" [_])* / [^'\'' | '\\' | '\n']) "'" { LitKind::Char }
            / n:$(['0'..='9'] (['e' | 'E' | 'p' | 'P'] ['+' | '-'] / ['0'..='9' | 'a'..='z' | 'A'..='Z' | '_' | '.'])*) {
                if is_float(n) { LitKind::Float } else { LitKind::Int }
            }

        rule string_lit() -> BasicLit
            = l:basic_lit() {?
                match l.kind {
                    LitKind::String | LitKind::RawString => Ok(l),
                    _ => Err("import path"),
                }
            }

        // --------------------------------------------------------------------
        // Source file
        // --------------------------------------------------------------------

        pub rule source_file() -> FileBody
            = p:position!() ws()
              package:(c:package_clause() term() ws() { c })?
              imports:(i:import_decl() term() ws() { i })*
              items:top_item()*
              e:position!() eof()
            {
                FileBody {
                    package,
                    imports,
                    items: items.into_iter().flatten().collect(),
                    span: span(p, e),
                }
            }

        rule package_clause() -> PackageClause
            = p:position!() kw("package") hs() name:ident() e:position!() {
                PackageClause { name, span: span(p, e) }
            }

        rule import_decl() -> ImportDecl
            = p:position!() kw("import") ws()
              specs:(
                  "(" ws() specs:(s:import_spec() group_term() ws() { s })* ")" { specs }
                  / s:import_spec() { vec![s] }
              )
              e:position!()
            {
                ImportDecl { specs, span: span(p, e) }
            }

        rule import_spec() -> ImportSpec
            = p:position!() alias:(a:ident() hs() { a })? path:string_lit() e:position!() {
                ImportSpec { alias, path, span: span(p, e) }
            }

        rule top_item() -> Option<Item>
            = f:func_decl() term() ws() { Some(Item::Func(Box::new(f))) }
            / s:stmt() term() ws() { Some(Item::Stmt(Box::new(s))) }
            / ";" ws() { None }

        // --------------------------------------------------------------------
        // Functions
        // --------------------------------------------------------------------

        rule func_decl() -> FuncDecl
            = p:position!() kw("func") hs()
              receiver:(r:param_list() hs() { r })?
              name:ident() hs()
              signature:signature()
              body:(hs() b:block() { b })?
              e:position!()
            {
                FuncDecl { receiver, name, signature, body, span: span(p, e) }
            }

        rule func_lit() -> FuncLit
            = p:position!() kw("func") hs() signature:signature() hs() body:block() e:position!() {
                FuncLit { signature, body, span: span(p, e) }
            }

        rule signature() -> Signature
            = p:position!() params:param_list() results:(hs() r:results() { r })? e:position!() {
                Signature { params, results, span: span(p, e) }
            }

        rule results() -> ParamList
            = param_list()
            / t:type_expr() { unnamed_results(t) }

        rule param_list() -> ParamList
            = p:position!() "(" ws()
              groups:(named_group() ++ (ws() "," ws())) ws() ("," ws())?
              ")" e:position!()
            {
                ParamList { groups, span: span(p, e) }
            }
            / p:position!() "(" ws()
              groups:(unnamed_group() ++ (ws() "," ws())) ws() ("," ws())?
              ")" e:position!()
            {
                ParamList { groups, span: span(p, e) }
            }
            / p:position!() "(" ws() ")" e:position!() {
                ParamList { groups: Vec::new(), span: span(p, e) }
            }

        rule named_group() -> ParamGroup
            = p:position!() names:(ident() ++ (ws() "," ws())) hs()
              variadic:("..." ws())? ty:type_expr() e:position!()
            {
                ParamGroup { names, variadic: variadic.is_some(), ty, span: span(p, e) }
            }

        rule unnamed_group() -> ParamGroup
            = p:position!() variadic:("..." ws())? ty:type_expr() e:position!() {
                ParamGroup { names: Vec::new(), variadic: variadic.is_some(), ty, span: span(p, e) }
            }

        // --------------------------------------------------------------------
        // Statements
        // --------------------------------------------------------------------

        rule block() -> Block
            = p:position!() "{" ws() items:block_item()* "}" e:position!() {
                Block { stmts: items.into_iter().flatten().collect(), span: span(p, e) }
            }

        rule block_item() -> Option<Stmt>
            = s:stmt() term() ws() { Some(s) }
            / ";" ws() { None }

        rule stmt() -> Stmt
            = d:var_decl() { Stmt::VarDecl(Box::new(d)) }
            / d:type_decl() { Stmt::TypeDecl(Box::new(d)) }
            / s:if_stmt() { Stmt::If(Box::new(s)) }
            / s:for_stmt() { Stmt::For(Box::new(s)) }
            / s:return_stmt() { Stmt::Return(Box::new(s)) }
            / p:position!() kw("go") ws() expr:expr() e:position!() {
                Stmt::Go(Box::new(CallLikeStmt { expr, span: span(p, e) }))
            }
            / p:position!() kw("defer") ws() expr:expr() e:position!() {
                Stmt::Defer(Box::new(CallLikeStmt { expr, span: span(p, e) }))
            }
            / s:branch_stmt() { Stmt::Branch(Box::new(s)) }
            / b:block() { Stmt::Block(Box::new(b)) }
            / simple_stmt()

        // The left side is parsed once; what follows it picks the statement.
        rule simple_stmt() -> Stmt
            = p:position!() names:ident_list() hs() ":=" ws() values:expr_list() e:position!() {
                Stmt::ShortVarDecl(Box::new(ShortVarDecl { names, values, span: span(p, e) }))
            }
            / p:position!() lhs:expr_list() tail:simple_tail() e:position!() {?
                finish_simple_stmt(lhs, tail, span(p, e))
            }

        rule simple_tail() -> SimpleTail
            = hs() op:assign_op() ws() values:expr_list() { SimpleTail::Assign(op, values) }
            / hs() "++" { SimpleTail::IncDec(true) }
            / hs() "--" { SimpleTail::IncDec(false) }
            / hs() "<-" ws() value:expr() { SimpleTail::Send(value) }
            / "" { SimpleTail::Expr }

        rule assign_op() -> AssignOp
            = "=" !"=" { AssignOp::Assign }
            / "+=" { AssignOp::Add }
            / "-=" { AssignOp::Sub }
            / "*=" { AssignOp::Mul }
            / "/=" { AssignOp::Quo }
            / "%=" { AssignOp::Rem }
            / "&^=" { AssignOp::AndNot }
            / "&=" { AssignOp::And }
            / "|=" { AssignOp::Or }
            / "^=" { AssignOp::Xor }
            / "<<=" { AssignOp::Shl }
            / ">>=" { AssignOp::Shr }

        rule var_decl() -> VarDecl
            = p:position!() keyword:decl_keyword() ws()
              specs:(
                  "(" ws() specs:(s:var_spec() group_term() ws() { s })* ")" { specs }
                  / s:var_spec() { vec![s] }
              )
              e:position!()
            {
                VarDecl { keyword, specs, span: span(p, e) }
            }

        rule decl_keyword() -> DeclKeyword
            = kw("var") { DeclKeyword::Var }
            / kw("const") { DeclKeyword::Const }

        rule var_spec() -> VarSpec
            = p:position!() names:ident_list()
              ty:(hs() t:type_expr() { t })?
              values:(hs() "=" !"=" ws() v:expr_list() { v })?
              e:position!()
            {
                VarSpec { names, ty, values: values.unwrap_or_default(), span: span(p, e) }
            }

        rule type_decl() -> TypeDecl
            = p:position!() kw("type") ws()
              specs:(
                  "(" ws() specs:(s:type_spec() group_term() ws() { s })* ")" { specs }
                  / s:type_spec() { vec![s] }
              )
              e:position!()
            {
                TypeDecl { specs, span: span(p, e) }
            }

        rule type_spec() -> TypeSpec
            = p:position!() name:ident() hs() alias:("=" ws())? ty:type_expr() e:position!() {
                TypeSpec { name, alias: alias.is_some(), ty, span: span(p, e) }
            }

        rule if_stmt() -> IfStmt
            = p:position!() kw("if") ws()
              init:(s:simple_stmt() hs() ";" ws() { s })?
              cond:expr() ws()
              then_block:block()
              else_branch:(hs() kw("else") ws() b:else_branch() { b })?
              e:position!()
            {
                IfStmt { init, cond, then_block, else_branch, span: span(p, e) }
            }

        rule else_branch() -> ElseBranch
            = s:if_stmt() { ElseBranch::If(Box::new(s)) }
            / b:block() { ElseBranch::Block(Box::new(b)) }

        rule for_stmt() -> ForStmt
            = p:position!() kw("for") ws() header:for_header() ws() body:block() e:position!() {
                ForStmt { header, body, span: span(p, e) }
            }

        rule for_header() -> ForHeader
            = r:range_clause() { ForHeader::Range(Box::new(r)) }
            / init:simple_stmt()? hs() ";" ws() cond:expr()? hs() ";" ws() post:simple_stmt()? {
                ForHeader::Clause {
                    init: init.map(Box::new),
                    cond,
                    post: post.map(Box::new),
                }
            }
            / c:expr() { ForHeader::Cond(c) }
            / &"{" { ForHeader::Infinite }

        rule range_clause() -> RangeClause
            = p:position!() vars:range_vars() kw("range") ws() expr:expr() e:position!() {
                RangeClause { vars, expr, span: span(p, e) }
            }

        rule range_vars() -> RangeVars
            = names:ident_list() hs() ":=" ws() { RangeVars::Define(names) }
            / targets:expr_list() hs() "=" !"=" ws() { RangeVars::Assign(targets) }
            / "" { RangeVars::None }

        rule return_stmt() -> ReturnStmt
            = p:position!() kw("return") values:(hs() v:expr_list() { v })? e:position!() {
                ReturnStmt { values: values.unwrap_or_default(), span: span(p, e) }
            }

        rule branch_stmt() -> BranchStmt
            = p:position!()
              kind:(kw("break") { BranchKind::Break } / kw("continue") { BranchKind::Continue })
              label:(hs() l:ident() { l })?
              e:position!()
            {
                BranchStmt { kind, label, span: span(p, e) }
            }

        // --------------------------------------------------------------------
        // Expressions
        // --------------------------------------------------------------------

        rule expr_list() -> Vec<Expr> = expr() ++ (hs() "," ws())

        #[cache]
        rule expr() -> Expr = precedence!{
            x:(@) hs() "||" ws() y:@ { binary(BinaryOp::LogOr, x, y) }
            --
            x:(@) hs() "&&" ws() y:@ { binary(BinaryOp::LogAnd, x, y) }
            --
            x:(@) hs() op:rel_op() ws() y:@ { binary(op, x, y) }
            --
            x:(@) hs() op:add_op() ws() y:@ { binary(op, x, y) }
            --
            x:(@) hs() op:mul_op() ws() y:@ { binary(op, x, y) }
            --
            u:unary_expr() { u }
        }

        rule rel_op() -> BinaryOp
            = "==" { BinaryOp::Eq }
            / "!=" { BinaryOp::Ne }
            / "<=" { BinaryOp::Le }
            / ">=" { BinaryOp::Ge }
            / "<" !['<' | '-'] { BinaryOp::Lt }
            / ">" !['>'] { BinaryOp::Gt }

        rule add_op() -> BinaryOp
            = "+" !['+' | '='] { BinaryOp::Add }
            / "-" !['-' | '='] { BinaryOp::Sub }
            / "|" !['|' | '='] { BinaryOp::Or }
            / "^" !"=" { BinaryOp::Xor }

        rule mul_op() -> BinaryOp
            = "*" !"=" { BinaryOp::Mul }
            / "/" !['=' | '/' | '*'] { BinaryOp::Quo }
            / "%" !"=" { BinaryOp::Rem }
            / "<<" !"=" { BinaryOp::Shl }
            / ">>" !"=" { BinaryOp::Shr }
            / "&^" !"=" { BinaryOp::AndNot }
            / "&" !['&' | '=' | '^'] { BinaryOp::And }

        rule unary_expr() -> Expr
            = p:position!() op:unary_op() ws() operand:unary_expr() {
                let end = operand.span().end as usize;
                Expr::Unary(Box::new(UnaryExpr { op, operand, span: span(p, end) }))
            }
            / primary_expr()

        rule unary_op() -> UnaryOp
            = "<-" { UnaryOp::Recv }
            / "+" { UnaryOp::Plus }
            / "-" { UnaryOp::Neg }
            / "!" { UnaryOp::Not }
            / "^" { UnaryOp::Xor }
            / "*" { UnaryOp::Deref }
            / "&" { UnaryOp::Addr }

        rule primary_expr() -> Expr
            = base:operand() suffixes:(hs() s:suffix() { s })* {
                suffixes.into_iter().fold(base, apply_suffix)
            }

        rule suffix() -> Suffix
            = "." ws() "(" ws() t:type_expr() ws() ")" e:position!() { Suffix::TypeAssert(t, e) }
            / "." ws() f:ident() { Suffix::Selector(f) }
            / "(" ws() args:(arg() ** (ws() "," ws())) ws() spread:("..." ws())? ("," ws())? ")" e:position!() {
                Suffix::Call(args, spread.is_some(), e)
            }
            / "[" ws() low:expr()? ws() ":" ws() high:expr()? ws() "]" e:position!() {
                Suffix::Slice(low, high, e)
            }
            / "[" ws() index:expr() ws() "]" e:position!() { Suffix::Index(index, e) }

        rule arg() -> Expr
            = expr()
            / t:type_expr() { Expr::Type(Box::new(t)) }

        rule operand() -> Expr
            = l:basic_lit() { Expr::BasicLit(Box::new(l)) }
            / f:func_lit() { Expr::FuncLit(Box::new(f)) }
            / p:position!() "(" ws() inner:expr() ws() ")" e:position!() {
                Expr::Paren(Box::new(ParenExpr { inner, span: span(p, e) }))
            }
            / i:ident() { Expr::Ident(Box::new(i)) }

        // --------------------------------------------------------------------
        // Types
        // --------------------------------------------------------------------

        rule type_expr() -> TypeExpr
            = p:position!() "*" ws() t:type_expr() e:position!() {
                make_type(p, e, TypeKind::Pointer(Box::new(t)))
            }
            / p:position!() "[" ws() "]" ws() t:type_expr() e:position!() {
                make_type(p, e, TypeKind::Slice(Box::new(t)))
            }
            / p:position!() "[" ws() len:expr() ws() "]" ws() t:type_expr() e:position!() {
                make_type(p, e, TypeKind::Array { len: Box::new(len), elem: Box::new(t) })
            }
            / p:position!() kw("map") ws() "[" ws() k:type_expr() ws() "]" ws() v:type_expr() e:position!() {
                make_type(p, e, TypeKind::Map { key: Box::new(k), value: Box::new(v) })
            }
            / p:position!() "<-" ws() kw("chan") ws() t:type_expr() e:position!() {
                make_type(p, e, TypeKind::Chan { dir: ChanDir::Recv, elem: Box::new(t) })
            }
            / p:position!() kw("chan") ws() "<-" ws() t:type_expr() e:position!() {
                make_type(p, e, TypeKind::Chan { dir: ChanDir::Send, elem: Box::new(t) })
            }
            / p:position!() kw("chan") ws() t:type_expr() e:position!() {
                make_type(p, e, TypeKind::Chan { dir: ChanDir::Both, elem: Box::new(t) })
            }
            / p:position!() kw("func") hs() s:signature() e:position!() {
                make_type(p, e, TypeKind::Func(Box::new(s)))
            }
            / p:position!() kw("struct") ws() "{" ws() fields:(f:field_decl() term() ws() { f })* "}" e:position!() {
                make_type(p, e, TypeKind::Struct(fields))
            }
            / p:position!() kw("interface") ws() "{" ws() "}" e:position!() {
                make_type(p, e, TypeKind::Interface)
            }
            / "(" ws() t:type_expr() ws() ")" { t }
            / p:position!() package:ident() "." name:ident() e:position!() {
                make_type(p, e, TypeKind::Qualified { package, name })
            }
            / p:position!() name:ident() e:position!() {
                make_type(p, e, TypeKind::Name(name))
            }

        rule field_decl() -> FieldDecl
            = p:position!() names:ident_list() hs() ty:type_expr() tag:(hs() l:string_lit() { l })? e:position!() {
                FieldDecl { names, ty, tag, span: span(p, e) }
            }
            / p:position!() ty:type_expr() tag:(hs() l:string_lit() { l })? e:position!() {
                FieldDecl { names: Vec::new(), ty, tag, span: span(p, e) }
            }
    }
}
