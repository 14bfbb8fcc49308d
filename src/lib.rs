//! tugscope: scope-aware symbol lookup and rename for Go source.
//!
//! The engine parses one file, builds its lexical scope tree and answers
//! two questions about the identifier at a `line:col` position: which
//! occurrences share its binding, and what the file looks like with that
//! binding renamed. Shadowing declarations in nested scopes are respected
//! and selector fields are never touched.
//!
//! ```
//! use tugscope::config::UnboundPolicy;
//! use tugscope::ops::{rename, SourceDocument};
//!
//! let doc = SourceDocument::new("main.go", "{\nvar fld int = 0\n{\nfld += 5\n}\n}");
//! let plan = rename(&doc, 4, 1, "newFld", UnboundPolicy::default()).unwrap();
//! assert_eq!(plan.rendered, "{\nvar newFld int = 0\n{\nnewFld += 5\n}\n}");
//! ```

// Core infrastructure - re-exported from tugscope-core
pub use tugscope_core::config;
pub use tugscope_core::error;
pub use tugscope_core::output;
pub use tugscope_core::patch;
pub use tugscope_core::text;
pub use tugscope_core::types;

// Parser and resolver
pub use tugscope_cst as cst;
pub use tugscope_resolve as resolve;

// Operations and the CLI front door
pub mod cli;
pub mod ops;

// Error bridges - attaches file paths to resolver errors
mod error_bridges;
