//! Titanium project detection.

use std::fs;
use std::path::Path;

use crate::catalog::PROJECT_MARKER;

/// A directory is a Titanium project iff it contains `tiapp.xml`.
pub fn is_titanium_project(dir: &Path) -> bool {
    dir.join(PROJECT_MARKER).is_file()
}

/// SDK version declared in `tiapp.xml`, if any.
///
/// A plain textual scan for the `<sdk-version>` element; tiapp.xml is
/// machine-generated and carries the element on one line.
pub fn detect_sdk_version(dir: &Path) -> Option<String> {
    let text = fs::read_to_string(dir.join(PROJECT_MARKER)).ok()?;
    let start = text.find("<sdk-version>")? + "<sdk-version>".len();
    let end = text[start..].find("</sdk-version>")? + start;
    let version = text[start..end].trim();
    if version.is_empty() {
        None
    } else {
        Some(version.to_string())
    }
}
