//! Unwrapping of multi-file source envelopes returned by explorers.

use serde_json::Value;
use tracing::{debug, warn};

/// Substituted when an envelope parses but does not describe source files.
pub const UNSUPPORTED_FORMAT_PLACEHOLDER: &str =
    "Contract source code format not supported for detailed analysis";

/// Turn an explorer `SourceCode` field into source text.
///
/// Fields starting with `{` are read as a JSON envelope and the first file of
/// its `sources` mapping is selected, in the order the explorer returned them.
/// Only one file is analyzed. Anything that fails to parse is passed through
/// unchanged.
pub fn unwrap_source(raw: &str) -> String {
    if !raw.starts_with('{') {
        return raw.to_string();
    }

    let parsed: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "Failed to parse multi-file contract JSON, using raw source");
            return raw.to_string();
        }
    };

    let Some(sources) = parsed.get("sources").and_then(Value::as_object) else {
        debug!("Contract JSON has no sources mapping");
        return UNSUPPORTED_FORMAT_PLACEHOLDER.to_string();
    };

    match sources.iter().next() {
        Some((file, entry)) => match entry.get("content").and_then(Value::as_str) {
            Some(content) => {
                debug!(
                    file = file.as_str(),
                    total_files = sources.len(),
                    "Selected first file from multi-file contract"
                );
                content.to_string()
            }
            None => {
                warn!(file = file.as_str(), "First source file has no content");
                UNSUPPORTED_FORMAT_PLACEHOLDER.to_string()
            }
        },
        None => {
            warn!("Contract JSON has an empty sources mapping");
            UNSUPPORTED_FORMAT_PLACEHOLDER.to_string()
        }
    }
}
