//! Scope resolution and scope-bounded renaming.
//!
//! This crate turns a parsed [`SourceFile`](tugscope_cst::SourceFile) into a
//! tree of lexical scopes and answers position queries against it:
//!
//! - [`ScopeTree`] / [`Scope`]: the arena of scopes with their declarations
//!   and sites.
//! - [`ScopeBuilder`]: builds the tree in one walk, optionally resolving a
//!   target position as it goes.
//! - [`SymbolLocator`]: queries over a completed tree.
//! - [`PositionStream`]: the builder's query groups delivered over a bounded
//!   channel, with cancellation.
//! - [`RenameTransformer`]: renames one binding in place.
//!
//! # Example
//!
//! ```
//! use tugscope_core::types::SourceId;
//! use tugscope_cst::{codegen, parse_source};
//! use tugscope_resolve::RenameTransformer;
//!
//! let mut file = parse_source("{\na := 0\na++\n}\n{\na := 2\n}", SourceId(0)).unwrap();
//! RenameTransformer::new("a", "b", 2, 1).apply(&mut file).unwrap();
//! assert_eq!(codegen::render(&file).unwrap(), "{\nb := 0\nb++\n}\n{\na := 2\n}");
//! ```

pub mod builder;
pub mod error;
pub mod locator;
pub mod rename;
pub mod scope;
pub mod stream;
pub mod symbol;

pub use builder::{BuildOutcome, GroupSink, ScopeBuilder};
pub use error::{ResolveError, ResolveResult};
pub use locator::{Binding, ScopeChainGroups, SymbolLocator, SymbolPositions};
pub use rename::{validate_identifier, RenameOutcome, RenameTransformer};
pub use scope::{Scope, ScopeId, ScopeTree};
pub use stream::{PositionStream, StreamEvent, StreamOptions};
pub use symbol::{Resolution, Resolved, SiteGroup, Symbol};
