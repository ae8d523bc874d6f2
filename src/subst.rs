//! `$Format:...$` keyword substitution.
//!
//! Content marked `export-subst` is scanned for spans of the form
//! `$Format:<spec>$`; each span is replaced by the output of a
//! [`CommitFormatter`] applied to the archive's commit. The scan is
//! byte-oriented: content may contain NULs or arbitrary non-UTF-8 bytes,
//! only the ASCII marker bytes themselves are interpreted.

use chrono::{DateTime, Utc};

use crate::types::CommitInfo;

const MARKER: &[u8] = b"$Format:";

/// Renders a format spec against a commit. The spec language is opaque to
/// the scanner; this crate's default implementation is
/// [`PlaceholderFormatter`].
pub trait CommitFormatter {
    fn format(&self, commit: &CommitInfo, spec: &str) -> String;
}

/// Expand every `$Format:<spec>$` token in `content`.
///
/// Scanning resumes strictly after each consumed closing `$`, so expansion
/// is non-recursive: a `$Format:` produced by the formatter itself is never
/// re-scanned. A trailing `$Format:` with no closing `$` is copied through
/// untouched.
pub fn expand(content: &[u8], commit: &CommitInfo, formatter: &dyn CommitFormatter) -> Vec<u8> {
    let mut out = Vec::with_capacity(content.len());
    let mut rest = content;

    loop {
        let Some(start) = find(rest, MARKER) else {
            break;
        };
        let after_marker = &rest[start + MARKER.len()..];
        let Some(end) = after_marker.iter().position(|&b| b == b'$') else {
            break;
        };

        out.extend_from_slice(&rest[..start]);
        let spec = String::from_utf8_lossy(&after_marker[..end]);
        out.extend_from_slice(formatter.format(commit, &spec).as_bytes());
        rest = &after_marker[end + 1..];
    }

    out.extend_from_slice(rest);
    out
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

// ---------------------------------------------------------------------------
// PlaceholderFormatter
// ---------------------------------------------------------------------------

/// Default formatter supporting a fixed placeholder subset:
/// `%H %h %T %t %an %ae %ad %at %cn %ce %cd %ct %s %%`.
///
/// Unrecognized placeholders and stray `%` pass through verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderFormatter;

impl CommitFormatter for PlaceholderFormatter {
    fn format(&self, commit: &CommitInfo, spec: &str) -> String {
        let mut out = String::with_capacity(spec.len());
        let mut chars = spec.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '%' {
                out.push(c);
                continue;
            }
            match chars.peek().copied() {
                Some('H') => {
                    chars.next();
                    out.push_str(&commit.id.to_string());
                }
                Some('h') => {
                    chars.next();
                    out.push_str(&short_hex(&commit.id));
                }
                Some('T') => {
                    chars.next();
                    out.push_str(&commit.tree.to_string());
                }
                Some('t') => {
                    chars.next();
                    out.push_str(&short_hex(&commit.tree));
                }
                Some('s') => {
                    chars.next();
                    out.push_str(commit.summary());
                }
                Some('%') => {
                    chars.next();
                    out.push('%');
                }
                Some(who @ ('a' | 'c')) => {
                    chars.next();
                    let ident = if who == 'a' {
                        &commit.author
                    } else {
                        &commit.committer
                    };
                    match chars.peek().copied() {
                        Some('n') => {
                            chars.next();
                            out.push_str(&ident.name);
                        }
                        Some('e') => {
                            chars.next();
                            out.push_str(&ident.email);
                        }
                        Some('t') => {
                            chars.next();
                            out.push_str(&commit.time.to_string());
                        }
                        Some('d') => {
                            chars.next();
                            out.push_str(&format_date(commit.time));
                        }
                        _ => {
                            out.push('%');
                            out.push(who);
                        }
                    }
                }
                _ => out.push('%'),
            }
        }
        out
    }
}

fn short_hex(id: &gix::ObjectId) -> String {
    let hex = id.to_string();
    hex[..hex.len().min(7)].to_string()
}

fn format_date(seconds: i64) -> String {
    match DateTime::<Utc>::from_timestamp(seconds, 0) {
        Some(dt) => dt.format("%a %b %-d %H:%M:%S %Y +0000").to_string(),
        None => seconds.to_string(),
    }
}
