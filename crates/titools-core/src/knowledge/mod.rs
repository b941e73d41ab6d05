//! Managed knowledge block maintenance inside instruction files.
//!
//! A file owns everything outside the marker-delimited block; titools
//! owns everything inside it. Edits must preserve the outside bytes
//! exactly, and repeated add/remove cycles must not accumulate blank
//! lines.

use std::fs;
use std::ops::Range;
use std::path::Path;

use anyhow::Context;

use crate::catalog::{self, BLOCK_END, BLOCK_START};
use crate::types::ArtifactFilter;

/// Whether `path` contains both marker lines in order.
///
/// A missing file is simply "no block".
pub fn block_exists(path: &Path) -> bool {
    match fs::read_to_string(path) {
        Ok(text) => find_block(&text).is_some(),
        Err(_) => false,
    }
}

/// Insert or replace the managed block so the file carries exactly one
/// block with the given body.
///
/// A missing file is created. When no block exists yet the new block is
/// appended, separated from non-blank trailing content by a single blank
/// line. When a block exists, the marker-to-marker range is replaced in
/// place and all surrounding bytes are left untouched.
///
/// File-system errors propagate so the caller can report a per-file
/// failure without aborting its siblings.
pub fn add_or_update_block(path: &Path, body: &str) -> anyhow::Result<()> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(err) => {
            return Err(err).with_context(|| format!("Failed to read {}", path.display()));
        }
    };

    let block = render_delimited(body);
    let updated = match find_block(&text) {
        Some(range) => {
            let mut out = String::with_capacity(text.len() + block.len());
            out.push_str(&text[..range.start]);
            out.push_str(&block);
            out.push_str(&text[range.end..]);
            out
        }
        None => {
            let mut out = text;
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            if !out.trim().is_empty() && !out.ends_with("\n\n") {
                out.push('\n');
            }
            out.push_str(&block);
            out.push('\n');
            out
        }
    };

    fs::write(path, updated).with_context(|| format!("Failed to write {}", path.display()))
}

/// Delete the managed block, collapsing the blank lines around it so the
/// file reads as it did before the block was inserted.
///
/// No-op when the file or the block does not exist.
pub fn remove_old_block(path: &Path) -> anyhow::Result<()> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(err) => {
            return Err(err).with_context(|| format!("Failed to read {}", path.display()));
        }
    };

    let Some(range) = find_block(&text) else {
        return Ok(());
    };

    // Consume the newline that terminated the end-marker line.
    let mut end = range.end;
    if text[end..].starts_with('\n') {
        end += 1;
    }

    let before = &text[..range.start];
    let after = &text[end..];

    let body = before.trim_end_matches('\n');
    let before_newlines = before.len() - body.len();
    let after_trimmed = after.trim_start_matches('\n');
    let after_newlines = after.len() - after_trimmed.len();

    let mut out = String::with_capacity(body.len() + after_trimmed.len() + 2);
    out.push_str(body);
    if after_trimmed.is_empty() {
        if !out.is_empty() {
            out.push('\n');
        }
    } else {
        let separators = if out.is_empty() {
            0
        } else {
            (before_newlines + after_newlines).clamp(1, 2)
        };
        for _ in 0..separators {
            out.push('\n');
        }
    }
    out.push_str(after_trimmed);

    fs::write(path, out).with_context(|| format!("Failed to write {}", path.display()))
}

/// Generated block body: a versioned index of the installed skill
/// bundles under `skills_root`.
pub fn render_block(skills_root: &str) -> String {
    let mut body = format!(
        "## Titanium SDK Knowledge ({})\n\nSkill bundles for this project are installed under `{skills_root}`:\n\n",
        catalog::knowledge_version()
    );
    for skill in catalog::skills(ArtifactFilter::CurrentOnly) {
        body.push_str(&format!("- `{skills_root}/{skill}`\n"));
    }
    body.push_str(
        "\nConsult the relevant bundle before answering Titanium SDK, Alloy, or PurgeTSS questions.\n\
         This block is regenerated by `titools sync`; manual edits will be overwritten.",
    );
    body
}

fn render_delimited(body: &str) -> String {
    format!(
        "{BLOCK_START}\n{}\n{BLOCK_END}",
        body.trim_end_matches('\n')
    )
}

/// Byte range from the start of the start-marker line through the end of
/// the end-marker line, excluding the terminating newline.
fn find_block(text: &str) -> Option<Range<usize>> {
    let start = marker_line_start(text, BLOCK_START, 0)?;
    let end_line = marker_line_start(text, BLOCK_END, start)?;
    let end = match text[end_line..].find('\n') {
        Some(offset) => end_line + offset,
        None => text.len(),
    };
    Some(start..end)
}

/// Offset of the first line at or after `from` whose content is exactly
/// `marker` (allowing a trailing carriage return).
fn marker_line_start(text: &str, marker: &str, from: usize) -> Option<usize> {
    let mut pos = from;
    loop {
        let line_end = match text[pos..].find('\n') {
            Some(offset) => pos + offset,
            None => text.len(),
        };
        if text[pos..line_end].trim_end_matches('\r') == marker {
            return Some(pos);
        }
        if line_end == text.len() {
            return None;
        }
        pos = line_end + 1;
    }
}
