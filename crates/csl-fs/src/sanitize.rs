//! Logical folder to physical directory mapping
//!
//! A logical folder is whatever grouping the schema author typed, so it may
//! contain characters no filesystem accepts. Sanitization strips those
//! characters instead of escaping them. The mapping is lossy: `Sa|les` and
//! `Sales` land in the same directory. Every caller that turns a folder into
//! a path must use [`sanitize_folder`] so that writes and cleanup scans agree.

use crate::constants::DEFINITION_EXTENSION;
use crate::{Error, Result};

/// Characters rejected inside a single path component on at least one
/// supported host. Path separators are handled separately as segment breaks.
const INVALID_COMPONENT_CHARS: &[char] = &['<', '>', ':', '"', '|', '?', '*'];

fn is_invalid_component_char(c: char) -> bool {
    c.is_ascii_control() || INVALID_COMPONENT_CHARS.contains(&c)
}

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// Convert a logical folder into a relative directory path.
///
/// `/` and `\` separate segments. Invalid characters are removed from each
/// segment; segments that end up empty, `.` or `..` are dropped. The result
/// uses `/` between segments and is empty when nothing survives.
///
/// `Sales/EU` -> `Sales/EU`, `Sa<le>s` -> `Sales`, `../x` -> `x`
pub fn sanitize_folder(folder: &str) -> String {
    let mut segments: Vec<String> = Vec::new();

    for raw in folder.split(is_separator) {
        let cleaned: String = raw.chars().filter(|c| !is_invalid_component_char(*c)).collect();
        if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
            continue;
        }
        segments.push(cleaned);
    }

    segments.join("/")
}

/// Validate that an object name can be used as a file stem.
///
/// Names are used verbatim (no sanitization), so anything that would
/// change the file's location, hide the file, or be rejected by the host is
/// an error.
pub fn validate_object_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        Some("name is empty")
    } else if name.trim().is_empty() {
        Some("name is whitespace only")
    } else if name == "." || name == ".." {
        Some("name is a relative path component")
    } else if name.starts_with('.') {
        // Dot files are skipped when the tree is loaded
        Some("name starts with a dot")
    } else if name.chars().any(is_separator) {
        Some("name contains a path separator")
    } else if name.chars().any(is_invalid_component_char) {
        Some("name contains characters invalid in a file name")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(Error::InvalidIdentifier {
            name: name.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

/// File name of the definition for `name`, e.g. `Orders.csl`.
pub fn definition_file_name(name: &str) -> String {
    format!("{}.{}", name, DEFINITION_EXTENSION)
}
