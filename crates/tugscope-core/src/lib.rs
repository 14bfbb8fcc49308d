//! Core infrastructure for tugscope.
//!
//! This crate provides language-agnostic infrastructure:
//! - Byte spans and span edits (the splice layer under the printer)
//! - Text position conversions (byte offset <-> line:column)
//! - Source positions and output locations
//! - Error types and error codes
//! - JSON output types for CLI responses
//! - Configuration loading

pub mod config;
pub mod error;
pub mod output;
pub mod patch;
pub mod text;
pub mod types;
