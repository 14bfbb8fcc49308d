// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Syntax tree node types for the supported Go subset.
//!
//! Every node carries a half-open byte [`Span`] into the parsed text. Every
//! identifier additionally carries a [`NodeId`] that is unique within one
//! tree, so consumers can refer to identifiers without holding borrows.
//!
//! Node kinds are closed enums: adding a construct means adding a variant and
//! handling it in the walk functions, which the compiler enforces.

use std::cell::Cell;
use std::fmt;

use serde::{Deserialize, Serialize};
pub use tugscope_core::patch::Span;
use tugscope_core::text::LineIndex;
use tugscope_core::types::{Position, SourceId};

// ============================================================================
// Identifiers
// ============================================================================

/// Identifier of a node within one tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node_{}", self.0)
    }
}

/// Allocator for [`NodeId`]s, threaded through the grammar.
///
/// Backtracking may allocate ids for nodes that are later discarded, so ids
/// are unique but not dense.
#[derive(Debug, Default)]
pub struct NodeIdGen {
    next: Cell<u32>,
}

impl NodeIdGen {
    /// Create an allocator starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next id.
    pub fn next_id(&self) -> NodeId {
        let id = self.next.get();
        self.next.set(id + 1);
        NodeId(id)
    }
}

/// An identifier occurrence.
///
/// `name` is the only mutable part of the tree: renames rewrite it in place
/// and the printer splices the new text over `span`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub id: NodeId,
    pub name: String,
    /// Span of the original text.
    pub span: Span,
}

impl Ident {
    pub fn new(id: NodeId, name: impl Into<String>, span: Span) -> Self {
        Ident {
            id,
            name: name.into(),
            span,
        }
    }

    /// True for the blank identifier `_`, which never binds.
    pub fn is_blank(&self) -> bool {
        self.name == "_"
    }
}

/// How an identifier occurrence participates in name resolution.
///
/// Decided once by the walk functions, so every consumer classifies
/// identifiers the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentRole {
    /// Introduces a binding in the current scope.
    Declaration,
    /// Uses a binding resolved through the scope chain.
    Reference,
    /// Selector field, struct field or method name. Not lexical.
    Member,
    /// Branch label. Not lexical.
    Label,
    /// Package clause name. Not lexical.
    Package,
}

impl IdentRole {
    /// True for roles recorded as scope sites.
    pub fn is_lexical(&self) -> bool {
        matches!(self, IdentRole::Declaration | IdentRole::Reference)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IdentRole::Declaration => "declaration",
            IdentRole::Reference => "reference",
            IdentRole::Member => "member",
            IdentRole::Label => "label",
            IdentRole::Package => "package",
        }
    }
}

/// The kind of lexical scope a construct opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
    /// The compilation unit.
    File,
    /// Function declaration or literal: receiver, parameters, results and
    /// the body's top level share this one scope.
    Function,
    /// A `{ ... }` block statement, or the body of an `if`/`for`.
    Block,
    /// Implicit scope of an `if` statement (init statement, else chain).
    If,
    /// Implicit scope of a `for` statement (init and range variables).
    For,
}

impl ScopeKind {
    /// Returns the string representation used in output.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeKind::File => "file",
            ScopeKind::Function => "function",
            ScopeKind::Block => "block",
            ScopeKind::If => "if",
            ScopeKind::For => "for",
        }
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Source file
// ============================================================================

/// A parsed compilation unit.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub source_id: SourceId,
    /// The text this tree was parsed from.
    pub text: String,
    pub line_index: LineIndex,
    pub package: Option<PackageClause>,
    pub imports: Vec<ImportDecl>,
    pub items: Vec<Item>,
    pub span: Span,
}

impl SourceFile {
    /// Position of an identifier in this file, using its original span.
    pub fn position_of(&self, ident: &Ident) -> Position {
        let (line, column) = self.line_index.position(ident.span.start as usize);
        Position::new(self.source_id, line, column, ident.span)
    }
}

/// The body of a compilation unit as produced by the grammar.
#[derive(Debug, Clone)]
pub struct FileBody {
    pub package: Option<PackageClause>,
    pub imports: Vec<ImportDecl>,
    pub items: Vec<Item>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct PackageClause {
    pub name: Ident,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ImportDecl {
    pub specs: Vec<ImportSpec>,
    pub span: Span,
}

/// `import alias "path"`.
#[derive(Debug, Clone)]
pub struct ImportSpec {
    /// Explicit package name; `_` is kept but never binds.
    pub alias: Option<Ident>,
    pub path: BasicLit,
    pub span: Span,
}

/// A top-level item.
#[derive(Debug, Clone)]
pub enum Item {
    Func(Box<FuncDecl>),
    Stmt(Box<Stmt>),
}

impl Item {
    pub fn span(&self) -> Span {
        match self {
            Item::Func(f) => f.span,
            Item::Stmt(s) => s.span(),
        }
    }
}

// ============================================================================
// Functions
// ============================================================================

#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub receiver: Option<ParamList>,
    pub name: Ident,
    pub signature: Signature,
    pub body: Option<Block>,
    pub span: Span,
}

impl FuncDecl {
    /// True for methods; their names live in a method set, not a scope.
    pub fn is_method(&self) -> bool {
        self.receiver.is_some()
    }

    /// Span of the function scope: receiver or signature through body.
    ///
    /// A plain function's name sits outside it, since it binds in the
    /// enclosing scope. A method name falls inside but is not lexical.
    pub fn scope_span(&self) -> Span {
        let start = match &self.receiver {
            Some(receiver) => receiver.span,
            None => self.signature.span,
        };
        let end = match &self.body {
            Some(body) => body.span,
            None => self.signature.span,
        };
        start.cover(&end)
    }
}

#[derive(Debug, Clone)]
pub struct FuncLit {
    pub signature: Signature,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Signature {
    pub params: ParamList,
    pub results: Option<ParamList>,
    pub span: Span,
}

/// A parenthesised parameter list, or a single unnamed result type.
#[derive(Debug, Clone)]
pub struct ParamList {
    pub groups: Vec<ParamGroup>,
    pub span: Span,
}

/// `a, b int` or an unnamed `int`.
#[derive(Debug, Clone)]
pub struct ParamGroup {
    pub names: Vec<Ident>,
    pub variadic: bool,
    pub ty: TypeExpr,
    pub span: Span,
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    VarDecl(Box<VarDecl>),
    TypeDecl(Box<TypeDecl>),
    ShortVarDecl(Box<ShortVarDecl>),
    Assign(Box<AssignStmt>),
    IncDec(Box<IncDecStmt>),
    Send(Box<SendStmt>),
    Expr(Box<ExprStmt>),
    Block(Box<Block>),
    If(Box<IfStmt>),
    For(Box<ForStmt>),
    Return(Box<ReturnStmt>),
    Go(Box<CallLikeStmt>),
    Defer(Box<CallLikeStmt>),
    Branch(Box<BranchStmt>),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::VarDecl(s) => s.span,
            Stmt::TypeDecl(s) => s.span,
            Stmt::ShortVarDecl(s) => s.span,
            Stmt::Assign(s) => s.span,
            Stmt::IncDec(s) => s.span,
            Stmt::Send(s) => s.span,
            Stmt::Expr(s) => s.span,
            Stmt::Block(s) => s.span,
            Stmt::If(s) => s.span,
            Stmt::For(s) => s.span,
            Stmt::Return(s) => s.span,
            Stmt::Go(s) | Stmt::Defer(s) => s.span,
            Stmt::Branch(s) => s.span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKeyword {
    Var,
    Const,
}

/// `var`/`const` declaration, single or grouped.
#[derive(Debug, Clone)]
pub struct VarDecl {
    pub keyword: DeclKeyword,
    pub specs: Vec<VarSpec>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct VarSpec {
    pub names: Vec<Ident>,
    pub ty: Option<TypeExpr>,
    pub values: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub specs: Vec<TypeSpec>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct TypeSpec {
    pub name: Ident,
    /// `type A = B`
    pub alias: bool,
    pub ty: TypeExpr,
    pub span: Span,
}

/// `a, b := x, y`
#[derive(Debug, Clone)]
pub struct ShortVarDecl {
    pub names: Vec<Ident>,
    pub values: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Quo,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    AndNot,
}

impl AssignOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Quo => "/=",
            AssignOp::Rem => "%=",
            AssignOp::And => "&=",
            AssignOp::Or => "|=",
            AssignOp::Xor => "^=",
            AssignOp::Shl => "<<=",
            AssignOp::Shr => ">>=",
            AssignOp::AndNot => "&^=",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AssignStmt {
    pub targets: Vec<Expr>,
    pub op: AssignOp,
    pub values: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct IncDecStmt {
    pub target: Expr,
    pub increment: bool,
    pub span: Span,
}

/// `ch <- v`
#[derive(Debug, Clone)]
pub struct SendStmt {
    pub channel: Expr,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ExprStmt {
    pub expr: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct IfStmt {
    pub init: Option<Stmt>,
    pub cond: Expr,
    pub then_block: Block,
    pub else_branch: Option<ElseBranch>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum ElseBranch {
    If(Box<IfStmt>),
    Block(Box<Block>),
}

#[derive(Debug, Clone)]
pub struct ForStmt {
    pub header: ForHeader,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum ForHeader {
    /// `for { }`
    Infinite,
    /// `for cond { }`
    Cond(Expr),
    /// `for init; cond; post { }`
    Clause {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        post: Option<Box<Stmt>>,
    },
    /// `for k, v := range x { }`
    Range(Box<RangeClause>),
}

#[derive(Debug, Clone)]
pub struct RangeClause {
    pub vars: RangeVars,
    pub expr: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum RangeVars {
    /// `for range x`
    None,
    /// `k, v :=` declares in the loop scope.
    Define(Vec<Ident>),
    /// `k, v =` assigns existing variables.
    Assign(Vec<Expr>),
}

#[derive(Debug, Clone)]
pub struct ReturnStmt {
    pub values: Vec<Expr>,
    pub span: Span,
}

/// `go f()` or `defer f()`.
#[derive(Debug, Clone)]
pub struct CallLikeStmt {
    pub expr: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchKind {
    Break,
    Continue,
}

#[derive(Debug, Clone)]
pub struct BranchStmt {
    pub kind: BranchKind,
    pub label: Option<Ident>,
    pub span: Span,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone)]
pub enum Expr {
    Ident(Box<Ident>),
    BasicLit(Box<BasicLit>),
    FuncLit(Box<FuncLit>),
    Paren(Box<ParenExpr>),
    Selector(Box<SelectorExpr>),
    TypeAssert(Box<TypeAssertExpr>),
    Index(Box<IndexExpr>),
    Slice(Box<SliceExpr>),
    Call(Box<CallExpr>),
    Unary(Box<UnaryExpr>),
    Binary(Box<BinaryExpr>),
    /// A type in expression position, e.g. the first argument of `make`.
    Type(Box<TypeExpr>),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Ident(e) => e.span,
            Expr::BasicLit(e) => e.span,
            Expr::FuncLit(e) => e.span,
            Expr::Paren(e) => e.span,
            Expr::Selector(e) => e.span,
            Expr::TypeAssert(e) => e.span,
            Expr::Index(e) => e.span,
            Expr::Slice(e) => e.span,
            Expr::Call(e) => e.span,
            Expr::Unary(e) => e.span,
            Expr::Binary(e) => e.span,
            Expr::Type(e) => e.span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LitKind {
    Int,
    Float,
    Char,
    String,
    RawString,
}

#[derive(Debug, Clone)]
pub struct BasicLit {
    pub kind: LitKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ParenExpr {
    pub inner: Expr,
    pub span: Span,
}

/// `x.f`
#[derive(Debug, Clone)]
pub struct SelectorExpr {
    pub operand: Expr,
    pub field: Ident,
    pub span: Span,
}

/// `x.(T)`
#[derive(Debug, Clone)]
pub struct TypeAssertExpr {
    pub operand: Expr,
    pub ty: TypeExpr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct IndexExpr {
    pub operand: Expr,
    pub index: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct SliceExpr {
    pub operand: Expr,
    pub low: Option<Expr>,
    pub high: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct CallExpr {
    pub func: Expr,
    pub args: Vec<Expr>,
    /// `f(xs...)`
    pub spread: bool,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Neg,
    Not,
    Xor,
    Deref,
    Addr,
    Recv,
}

#[derive(Debug, Clone)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub operand: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    LogOr,
    LogAnd,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Or,
    Xor,
    Mul,
    Quo,
    Rem,
    Shl,
    Shr,
    And,
    AndNot,
}

#[derive(Debug, Clone)]
pub struct BinaryExpr {
    pub op: BinaryOp,
    pub left: Expr,
    pub right: Expr,
    pub span: Span,
}

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Clone)]
pub struct TypeExpr {
    pub kind: TypeKind,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

#[derive(Debug, Clone)]
pub enum TypeKind {
    /// `T`
    Name(Ident),
    /// `pkg.T`; the package is a reference, `T` a member.
    Qualified { package: Ident, name: Ident },
    Pointer(Box<TypeExpr>),
    Slice(Box<TypeExpr>),
    Array { len: Box<Expr>, elem: Box<TypeExpr> },
    Map { key: Box<TypeExpr>, value: Box<TypeExpr> },
    Chan { dir: ChanDir, elem: Box<TypeExpr> },
    Func(Box<Signature>),
    Struct(Vec<FieldDecl>),
    /// Method-less `interface{}`.
    Interface,
}

/// Struct field; `names` is empty for embedded fields.
#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub names: Vec<Ident>,
    pub ty: TypeExpr,
    pub tag: Option<BasicLit>,
    pub span: Span,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_ids_are_unique() {
        let ids = NodeIdGen::new();
        let a = ids.next_id();
        let b = ids.next_id();
        assert_ne!(a, b);
        assert_eq!(b, NodeId(1));
    }

    #[test]
    fn only_declarations_and_references_are_lexical() {
        assert!(IdentRole::Declaration.is_lexical());
        assert!(IdentRole::Reference.is_lexical());
        assert!(!IdentRole::Member.is_lexical());
        assert!(!IdentRole::Label.is_lexical());
        assert!(!IdentRole::Package.is_lexical());
    }

    #[test]
    fn scope_kind_names() {
        assert_eq!(ScopeKind::Function.to_string(), "function");
        assert_eq!(ScopeKind::For.as_str(), "for");
    }
}
