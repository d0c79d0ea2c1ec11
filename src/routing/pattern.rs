//! Pre-parsed path patterns.
//!
//! # Responsibilities
//! - Split a registered path into segments once, at registration time
//! - Tag each segment as literal or named placeholder
//! - Locate the scope placeholder (`:repo`), if any
//!
//! # Design Decisions
//! - The raw pattern string is kept for verbatim comparison and listing
//! - Only the first `:repo` segment is the scope; later ones are plain
//!   placeholders
//! - A segment is a placeholder when it contains `:`; the name is the text
//!   between the first and second `:` (`v:name` binds `name`)

use std::fmt;

/// Name under which the scope identifier is reported in [`PathParams`](super::PathParams).
pub const SCOPE_PARAM: &str = "repo";

/// The path segment marking where the scope identifier sits.
pub const SCOPE_PLACEHOLDER: &str = ":repo";

/// One non-scope segment of a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Must equal the URL segment byte for byte.
    Literal(String),
    /// Binds the URL segment under this name.
    Param(String),
}

impl Segment {
    fn parse(raw: &str) -> Self {
        match raw.split(':').nth(1) {
            Some(name) => Segment::Param(name.to_string()),
            None => Segment::Literal(raw.to_string()),
        }
    }
}

/// A path pattern split into tagged segments.
///
/// Segments come from splitting on `/`, so `/a/b` yields `["", "a", "b"]`;
/// the leading empty segment lines up with the leading empty segment of
/// every request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
    scope_at: Option<usize>,
}

impl PathPattern {
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let mut segments = Vec::new();
        let mut scope_at = None;

        for part in raw.split('/') {
            if scope_at.is_none() && part == SCOPE_PLACEHOLDER {
                scope_at = Some(segments.len());
                continue;
            }
            segments.push(Segment::parse(part));
        }

        Self {
            raw,
            segments,
            scope_at,
        }
    }

    /// The pattern exactly as registered.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Segments with the scope placeholder removed.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Index (into [`segments`](Self::segments)) at which the scope
    /// placeholder was removed.
    pub fn scope_at(&self) -> Option<usize> {
        self.scope_at
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for PathPattern {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<String> for PathPattern {
    fn from(raw: String) -> Self {
        Self::parse(raw)
    }
}
