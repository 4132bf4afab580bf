//! Symbolic object paths: `objects["<stable id>"]`.

use crate::error::{Result, SnapshotError};

const PREFIX: &str = "objects[\"";
const SUFFIX: &str = "\"]";

/// Format the path of the object carrying `id`.
pub fn format_path(id: &str) -> String {
    format!(
        "{PREFIX}{}{SUFFIX}",
        id.replace('\\', "\\\\").replace('"', "\\\"")
    )
}

/// Extract the stable identifier from a path.
///
/// Anything other than the single allow-listed `objects[...]` container
/// with a non-empty, correctly escaped identifier is rejected.
pub fn parse_path(path: &str) -> Result<String> {
    let malformed = || SnapshotError::MalformedPath(path.to_string());
    let inner = path
        .strip_prefix(PREFIX)
        .and_then(|rest| rest.strip_suffix(SUFFIX))
        .ok_or_else(malformed)?;

    let mut id = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(escaped @ ('\\' | '"')) => id.push(escaped),
                _ => return Err(malformed()),
            },
            '"' => return Err(malformed()),
            _ => id.push(c),
        }
    }

    if id.is_empty() {
        return Err(malformed());
    }
    Ok(id)
}
