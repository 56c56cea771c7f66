//! Directive markers and their parsing.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use lattice_markup::{is_event_handler, Fragment};
use lattice_path::Path;

/// Attribute carrying a text directive.
pub const TEXT_ATTR: &str = "field";
/// Attribute carrying an attribute-map directive.
pub const ATTR_MAP_ATTR: &str = "field-attr";
/// Attribute carrying a markup directive.
pub const MARKUP_ATTR: &str = "field-html";
/// Attribute carrying a show-if directive.
pub const SHOW_IF_ATTR: &str = "field-if";
/// Attribute carrying a show-unless directive.
pub const SHOW_UNLESS_ATTR: &str = "field-unless";

/// Attribute names allowed as attribute-map targets.
static ATTR_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_:][A-Za-z0-9_:.\-]*$").expect("Invalid attribute name regex")
});

/// The five directive kinds, in application order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    Text,
    AttrMap,
    Markup,
    ShowIf,
    ShowUnless,
}

impl DirectiveKind {
    /// Every kind, in the order a binder applies them.
    pub const ALL: [DirectiveKind; 5] = [
        DirectiveKind::Text,
        DirectiveKind::AttrMap,
        DirectiveKind::Markup,
        DirectiveKind::ShowIf,
        DirectiveKind::ShowUnless,
    ];

    /// The marker attribute for this kind.
    pub fn attribute(self) -> &'static str {
        match self {
            DirectiveKind::Text => TEXT_ATTR,
            DirectiveKind::AttrMap => ATTR_MAP_ATTR,
            DirectiveKind::Markup => MARKUP_ATTR,
            DirectiveKind::ShowIf => SHOW_IF_ATTR,
            DirectiveKind::ShowUnless => SHOW_UNLESS_ATTR,
        }
    }
}

impl fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.attribute())
    }
}

/// One `attribute: path` pair from an attribute-map directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrBinding {
    pub attribute: String,
    pub path: String,
}

/// Problems found in directive markers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectiveIssue {
    #[error("{kind} has invalid path {path:?}")]
    InvalidPath { kind: DirectiveKind, path: String },

    #[error("field-attr segment {0:?} is missing a colon")]
    MissingColon(String),

    #[error("field-attr segment {0:?} has an invalid attribute name")]
    InvalidName(String),

    #[error("field-attr refuses event-handler attribute {0:?}")]
    EventHandler(String),
}

/// Parse a comma-separated `attribute: path` list.
///
/// Each segment yields either a binding or the reason it was refused. Empty
/// segments (a trailing comma, say) are skipped.
pub fn parse_attr_map(list: &str) -> Vec<Result<AttrBinding, DirectiveIssue>> {
    list.split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(parse_attr_segment)
        .collect()
}

fn parse_attr_segment(segment: &str) -> Result<AttrBinding, DirectiveIssue> {
    let (name, path) = segment
        .split_once(':')
        .ok_or_else(|| DirectiveIssue::MissingColon(segment.to_string()))?;
    let (name, path) = (name.trim(), path.trim());

    if !ATTR_NAME_RE.is_match(name) {
        return Err(DirectiveIssue::InvalidName(segment.to_string()));
    }
    if is_event_handler(name) {
        return Err(DirectiveIssue::EventHandler(name.to_string()));
    }
    if Path::parse(path).is_err() {
        return Err(DirectiveIssue::InvalidPath {
            kind: DirectiveKind::AttrMap,
            path: path.to_string(),
        });
    }

    Ok(AttrBinding {
        attribute: name.to_ascii_lowercase(),
        path: path.to_string(),
    })
}

/// Report every malformed directive in a blueprint fragment.
pub fn lint_fragment(fragment: &Fragment) -> Vec<DirectiveIssue> {
    let mut issues = Vec::new();

    for element in fragment.elements() {
        for kind in DirectiveKind::ALL {
            let Some(value) = element.attr(kind.attribute()) else {
                continue;
            };
            match kind {
                DirectiveKind::AttrMap => {
                    issues.extend(parse_attr_map(value).into_iter().filter_map(Result::err));
                }
                _ => {
                    if Path::parse(value).is_err() {
                        issues.push(DirectiveIssue::InvalidPath {
                            kind,
                            path: value.to_string(),
                        });
                    }
                }
            }
        }
    }

    issues
}
