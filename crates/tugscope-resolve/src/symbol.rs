//! Query result types shared by the builder, the locator and the stream.

use serde::Serialize;
use tugscope_core::types::Position;
use tugscope_cst::ScopeKind;

use crate::scope::ScopeId;

/// An identifier found at a queried position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Symbol {
    pub name: String,
    pub position: Position,
    /// The scope the occurrence was recorded in.
    pub scope: ScopeId,
}

/// Whether a name resolved to a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// A scope in the chain declares the name.
    Bound,
    /// Nothing declares it; the root stands in as the declaring scope.
    Free,
}

impl Resolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Bound => "bound",
            Resolution::Free => "free",
        }
    }
}

/// A symbol together with the scope that declares it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolved {
    pub symbol: Symbol,
    pub declaring_scope: ScopeId,
    pub declaring_kind: ScopeKind,
    pub resolution: Resolution,
}

/// The occurrences of one name recorded in one scope of a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteGroup {
    pub name: String,
    pub scope: ScopeId,
    pub kind: ScopeKind,
    /// Nesting depth of the scope; the root is 0.
    pub depth: u32,
    /// Positions in discovery order.
    pub positions: Vec<Position>,
}
