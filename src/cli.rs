//! CLI front door.
//!
//! Command executors behind the `tugscope` binary. Each one parses the
//! `--at` location, runs an operation from [`crate::ops`] and writes JSON
//! to the given writer:
//! - `lookup` - grouped occurrences of the identifier at a position
//! - `rename` - rename preview, or the rewritten file with `--apply`
//! - `stream` - one compact JSON line per group, as groups are found
//!
//! ## Error Handling
//!
//! All executors return `Result<(), RefactorError>`. The binary turns an
//! error into an `ErrorResponse` on stdout and exits with its code.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;
use tugscope_core::config::{Config, UnboundPolicy};
use tugscope_core::error::RefactorError;
use tugscope_core::output::{emit_response, emit_response_compact, StreamGroupLine};
use tugscope_core::types::Location;
use tugscope_resolve::{PositionStream, StreamEvent, StreamOptions};

use crate::error_bridges::resolve_error;
use crate::ops::{self, position_group, SourceDocument};

/// Settings shared by every command, after flags are merged over the
/// configuration file.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub config: Config,
}

impl Settings {
    /// Load settings from an explicit file, or discover
    /// `.tugscope/config.toml` upward from `cwd`.
    pub fn load(explicit: Option<&Path>, cwd: &Path) -> Result<Self, RefactorError> {
        let config = match explicit {
            Some(path) => Config::load(path)?,
            None => Config::discover(cwd)?,
        };
        debug!(?config, "loaded configuration");
        Ok(Settings { config })
    }

    pub fn policy(&self) -> UnboundPolicy {
        self.config.resolve.unbound
    }

    fn emit<T: Serialize>(&self, response: &T, out: &mut impl Write) -> Result<(), RefactorError> {
        let written = if self.config.output.pretty {
            emit_response(response, out)
        } else {
            emit_response_compact(response, out)
        };
        written.map_err(|e| RefactorError::internal(format!("failed to write output: {e}")))
    }
}

/// Parse a `path:line:col` argument.
pub fn parse_at(at: &str) -> Result<Location, RefactorError> {
    Location::parse(at).ok_or_else(|| {
        RefactorError::invalid_args(format!(
            "invalid location format '{}', expected path:line:col",
            at
        ))
    })
}

/// Execute `lookup`.
pub fn run_lookup(settings: &Settings, at: &str, out: &mut impl Write) -> Result<(), RefactorError> {
    let location = parse_at(at)?;
    let doc = SourceDocument::read(&location.file)?;
    let response = ops::lookup(&doc, location.line, location.col, settings.policy())?;
    settings.emit(&response, out)
}

/// Execute `rename`. The file is written only when `apply` is set.
pub fn run_rename(
    settings: &Settings,
    at: &str,
    to: &str,
    apply: bool,
    out: &mut impl Write,
) -> Result<(), RefactorError> {
    let location = parse_at(at)?;
    let doc = SourceDocument::read(&location.file)?;
    let plan = ops::rename(&doc, location.line, location.col, to, settings.policy())?;
    if apply {
        plan.write(&doc.path)?;
        settings.emit(&plan.response.applied(), out)
    } else {
        settings.emit(&plan.response, out)
    }
}

/// Execute `stream`: groups are written as they arrive.
pub async fn run_stream(
    settings: &Settings,
    at: &str,
    out: &mut impl Write,
) -> Result<(), RefactorError> {
    let location = parse_at(at)?;
    let doc = SourceDocument::read(&location.file)?;
    let file = doc.parse()?;
    doc.offset_of(&file, location.line, location.col)?;
    let file = Arc::new(file);
    let options = StreamOptions {
        capacity: settings.config.stream.capacity,
        policy: settings.policy(),
    };
    let mut stream = PositionStream::spawn(file, location.line, location.col, options);

    let mut groups = 0usize;
    while let Some(event) = stream.next().await {
        match event.map_err(|err| resolve_error(&doc.path, err))? {
            StreamEvent::Group(group) => {
                let line = StreamGroupLine::new(&group.name, position_group(&doc.path, &group));
                emit_response_compact(&line, out)
                    .map_err(|e| RefactorError::internal(format!("failed to write output: {e}")))?;
                groups += 1;
            }
            StreamEvent::Resolved(resolved) => {
                debug!(
                    name = %resolved.symbol.name,
                    resolution = resolved.resolution.as_str(),
                    "stream resolved"
                );
            }
        }
    }
    stream
        .close()
        .await
        .map_err(|err| resolve_error(&doc.path, err))?;

    if groups == 0 {
        return Err(RefactorError::symbol_not_found(
            &doc.path,
            location.line,
            location.col,
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_must_have_three_parts() {
        assert!(parse_at("main.go:3:4").is_ok());
        for bad in ["main.go", "main.go:3", "main.go:0:1", ":1:1"] {
            let err = parse_at(bad).unwrap_err();
            assert_eq!(err.error_code().code(), 2, "{bad}");
        }
    }

    #[test]
    fn compact_output_is_one_line() {
        let mut settings = Settings::default();
        settings.config.output.pretty = false;
        let mut out = Vec::new();
        settings
            .emit(&serde_json::json!({"status": "ok", "n": [1, 2]}), &mut out)
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 1);
    }
}
