//! Route pattern decomposition.
//!
//! # Syntax
//! - `/literal` static text, matched byte for byte
//! - `:name` parameter, captures one non-empty path segment
//! - `*` or `*name` wildcard, captures the rest of the path (may be empty)
//!
//! Parameters and wildcards must start a segment. Anything after the first
//! wildcard is ignored for matching.

use std::borrow::Cow;
use std::sync::Arc;

use crate::routing::error::{RouteError, RouteResult};

/// Capture key used for an unnamed `*` wildcard.
pub const WILDCARD_KEY: &str = "*";

/// One token of a decomposed pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Static(&'a str),
    Param(&'a str),
    Wildcard(&'a str),
}

/// A pattern split into tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPattern<'a> {
    pub segments: Vec<Segment<'a>>,
    /// True when tokens followed the first wildcard and were dropped.
    pub truncated: bool,
}

impl ParsedPattern<'_> {
    /// Capture names in left-to-right order.
    pub fn param_names(&self) -> Vec<Arc<str>> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Param(name) | Segment::Wildcard(name) => Some(Arc::from(*name)),
                Segment::Static(_) => None,
            })
            .collect()
    }

    pub fn has_wildcard(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::Wildcard(_)))
    }
}

/// Ensure a pattern starts with `/`. The empty pattern is the root.
pub fn normalize(pattern: &str) -> Cow<'_, str> {
    if pattern.starts_with('/') {
        Cow::Borrowed(pattern)
    } else {
        Cow::Owned(format!("/{}", pattern))
    }
}

/// Decompose a normalized pattern.
pub fn parse(pattern: &str) -> RouteResult<ParsedPattern<'_>> {
    if !pattern.starts_with('/') {
        return Err(invalid(pattern, "pattern must start with '/'"));
    }

    let bytes = pattern.as_bytes();
    let mut segments = Vec::new();
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let segment_start = i > 0 && bytes[i - 1] == b'/';
        if !segment_start || (bytes[i] != b':' && bytes[i] != b'*') {
            i += 1;
            continue;
        }

        if literal_start < i {
            segments.push(Segment::Static(&pattern[literal_start..i]));
        }
        let end = segment_end(pattern, i);
        let name = &pattern[i + 1..end];

        if bytes[i] == b':' {
            if name.is_empty() {
                return Err(invalid(pattern, "parameter name is empty"));
            }
            segments.push(Segment::Param(name));
            i = end;
            literal_start = end;
        } else {
            let name = if name.is_empty() { WILDCARD_KEY } else { name };
            segments.push(Segment::Wildcard(name));
            return Ok(ParsedPattern {
                segments,
                truncated: end < pattern.len(),
            });
        }
    }

    if literal_start < bytes.len() {
        segments.push(Segment::Static(&pattern[literal_start..]));
    }
    Ok(ParsedPattern {
        segments,
        truncated: false,
    })
}

/// Join a prefix and a sub-path with exactly one `/` between them.
pub fn join(prefix: &str, path: &str) -> String {
    if path.is_empty() {
        return if prefix.is_empty() {
            "/".to_string()
        } else {
            normalize(prefix).into_owned()
        };
    }
    format!(
        "{}/{}",
        prefix.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn segment_end(pattern: &str, from: usize) -> usize {
    pattern[from..]
        .find('/')
        .map(|offset| from + offset)
        .unwrap_or(pattern.len())
}

fn invalid(pattern: &str, reason: &'static str) -> RouteError {
    RouteError::InvalidPattern {
        pattern: pattern.to_string(),
        reason,
    }
}
