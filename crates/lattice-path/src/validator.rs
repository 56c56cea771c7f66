//! Allow-list grammar for property paths.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Full path grammar: an identifier followed by `.identifier` or `[index]` segments.
static PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*(?:\.[A-Za-z_$][A-Za-z0-9_$]*|\[[0-9]+\])*$")
        .expect("Invalid path regex")
});

/// One segment of an already-validated path.
static SEGMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z_$][A-Za-z0-9_$]*)|\[([0-9]+)\]").expect("Invalid segment regex")
});

/// Check whether a string is an allowed property path.
///
/// Accepts `name`, `name.other`, `name[0]` and any chain of those. Rejects the
/// empty string, whitespace, calls, template literals, operators, quoted
/// bracket keys, negative indices and identifiers starting with a digit.
pub fn is_valid(path: &str) -> bool {
    PATH_RE.is_match(path)
}

/// A single step in a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Property name: `title`
    Key(String),
    /// Sequence index: `[0]`
    Index(usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => f.write_str(key),
            Segment::Index(index) => write!(f, "[{index}]"),
        }
    }
}

/// A path that passed the grammar, split into segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    source: String,
    segments: Vec<Segment>,
}

impl Path {
    /// Parse and validate a path expression.
    pub fn parse(source: &str) -> Result<Self, PathError> {
        if source.is_empty() {
            return Err(PathError::Empty);
        }
        if !is_valid(source) {
            return Err(PathError::Rejected(source.to_string()));
        }

        let mut segments = Vec::new();
        for caps in SEGMENT_RE.captures_iter(source) {
            if let Some(key) = caps.get(1) {
                segments.push(Segment::Key(key.as_str().to_string()));
            } else if let Some(index) = caps.get(2) {
                let index = index
                    .as_str()
                    .parse::<usize>()
                    .map_err(|_| PathError::IndexOverflow(source.to_string()))?;
                segments.push(Segment::Index(index));
            }
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// The original expression.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Segments in traversal order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Reasons a path is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("Empty path")]
    Empty,

    #[error("Path rejected by grammar: {0:?}")]
    Rejected(String),

    #[error("Path index out of range: {0:?}")]
    IndexOverflow(String),
}
