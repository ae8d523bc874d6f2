use crate::error::{Error, Result};

/// Normalize a repository-relative path: strip leading/trailing slashes,
/// collapse repeated slashes and `.` segments, reject `..`.
///
/// An empty input returns an empty string (root).
///
/// # Errors
/// Returns [`Error::InvalidPath`] if the path contains `..` segments or
/// collapses to nothing while containing non-slash content.
pub fn normalize_path(path: &str) -> Result<String> {
    if path.is_empty() {
        return Ok(String::new());
    }

    let mut segments: Vec<&str> = Vec::new();
    for seg in path.split('/') {
        if seg.is_empty() {
            // skip empty segments (from leading/trailing/double slashes)
            continue;
        }
        if seg == ".." {
            return Err(Error::invalid_path(format!(
                "path segment '{}' is not allowed",
                seg,
            )));
        }
        if seg == "." {
            continue; // collapse current-directory markers
        }
        segments.push(seg);
    }

    if segments.is_empty() {
        // Only-slash paths like "///" mean root (empty string).
        // Paths with actual content that collapsed away (e.g. ".") are errors.
        if path.bytes().all(|b| b == b'/') {
            return Ok(String::new());
        }
        return Err(Error::invalid_path("path must not be empty"));
    }

    Ok(segments.join("/"))
}

/// Returns `true` when the path refers to the root of the tree
/// (empty string or only slashes).
pub fn is_root_path(path: &str) -> bool {
    path.is_empty() || path.chars().all(|c| c == '/')
}

/// Collapse a run of trailing slashes down to one: `"v1.0///"` → `"v1.0/"`.
///
/// A prefix of only slashes collapses to `"/"`. Prefixes not ending in a
/// slash are returned unchanged.
pub fn collapse_trailing_slashes(prefix: &str) -> &str {
    if !prefix.ends_with('/') {
        return prefix;
    }
    let mut len = prefix.len();
    while len > 1 && prefix.as_bytes()[len - 2] == b'/' {
        len -= 1;
    }
    &prefix[..len]
}

/// Join a path prefix and an entry name with a single slash.
pub fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", prefix, name)
    }
}
