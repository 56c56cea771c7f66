//! Owned markup tree.

use std::sync::LazyLock;

use regex::Regex;

use crate::parser::{parse_fragment, MarkupError};
use crate::serializer::to_html;

/// Elements that never have children or an end tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Elements whose content is raw text rather than markup.
pub const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Check whether a tag name is a void element.
pub fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

/// Check whether a tag name holds raw text.
pub fn is_raw_text(name: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&name)
}

/// Lowercase element names, with an optional namespace prefix.
static ELEMENT_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z][a-z0-9._-]*(:[a-z0-9._-]+)?$").expect("Invalid element name regex")
});

/// Check whether a lowercase tag name is safe to emit as an element.
pub fn is_valid_element_name(name: &str) -> bool {
    ELEMENT_NAME_RE.is_match(name)
}

/// Check whether an attribute name can be emitted without ending the tag
/// or starting another attribute.
pub fn is_valid_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && !name.chars().any(|c| {
            c.is_whitespace()
                || c.is_control()
                || matches!(c, '"' | '\'' | '>' | '<' | '/' | '=')
        })
}

/// A node in a markup tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
    Doctype(String),
}

impl Node {
    /// Create a text node.
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    /// Get as an element if this node is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

/// A single attribute. Names are stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// Controls descent during a mutable walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    /// Visit this element's children
    Descend,
    /// Do not visit this element's children
    Skip,
}

/// An element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    /// Lowercase tag name
    pub name: String,

    /// Attributes in source order
    pub attrs: Vec<Attribute>,

    /// Child nodes
    pub children: Vec<Node>,
}

impl Element {
    /// Create an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_lowercase(),
            ..Default::default()
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder-style child append.
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Look up an attribute value (case-insensitive name).
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value.as_str())
    }

    /// Check if an attribute is present.
    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .attrs
            .iter_mut()
            .find(|a| a.name.eq_ignore_ascii_case(name))
        {
            Some(existing) => existing.value = value,
            None => self.attrs.push(Attribute {
                name: name.to_ascii_lowercase(),
                value,
            }),
        }
    }

    /// Remove an attribute, returning its value.
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let pos = self
            .attrs
            .iter()
            .position(|a| a.name.eq_ignore_ascii_case(name))?;
        Some(self.attrs.remove(pos).value)
    }

    /// Replace all children with a single text node.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.children.clear();
        if !text.is_empty() {
            self.children.push(Node::Text(text));
        }
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    /// First direct child element with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children
            .iter()
            .filter_map(Node::as_element)
            .find(|e| e.name == name)
    }
}

/// An ordered list of top-level nodes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Fragment {
    pub nodes: Vec<Node>,
}

impl Fragment {
    /// Create a fragment from nodes.
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Parse markup into a fragment.
    pub fn parse(source: &str) -> Result<Self, MarkupError> {
        parse_fragment(source)
    }

    /// Serialize back to markup.
    pub fn to_html(&self) -> String {
        to_html(&self.nodes)
    }

    /// Concatenated text of all text nodes.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.nodes, &mut out);
        out
    }

    /// Every element in document order.
    pub fn elements(&self) -> Vec<&Element> {
        let mut found = Vec::new();
        collect_elements(&self.nodes, &mut found);
        found
    }

    /// All elements with the given name, in document order.
    pub fn find_all(&self, name: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        collect_named(&self.nodes, name, &mut found);
        found
    }

    /// First element with the given name, in document order.
    pub fn find_first(&self, name: &str) -> Option<&Element> {
        self.find_all(name).into_iter().next()
    }

    /// Visit every element mutably, parents before children.
    pub fn walk_mut(&mut self, visit: &mut impl FnMut(&mut Element) -> Walk) {
        walk_nodes_mut(&mut self.nodes, visit);
    }

    /// Remove every element for which `keep` returns false, along with its subtree.
    ///
    /// Children of elements for which `descend` returns false are left alone.
    pub fn retain_elements(
        &mut self,
        keep: &mut impl FnMut(&Element) -> bool,
        descend: &impl Fn(&Element) -> bool,
    ) {
        retain_nodes(&mut self.nodes, keep, descend);
    }
}

impl From<Vec<Node>> for Fragment {
    fn from(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(t) => out.push_str(t),
            Node::Element(e) => collect_text(&e.children, out),
            Node::Comment(_) | Node::Doctype(_) => {}
        }
    }
}

fn collect_elements<'a>(nodes: &'a [Node], found: &mut Vec<&'a Element>) {
    for node in nodes {
        if let Node::Element(e) = node {
            found.push(e);
            collect_elements(&e.children, found);
        }
    }
}

fn collect_named<'a>(nodes: &'a [Node], name: &str, found: &mut Vec<&'a Element>) {
    for node in nodes {
        if let Node::Element(e) = node {
            if e.name == name {
                found.push(e);
            }
            collect_named(&e.children, name, found);
        }
    }
}

fn walk_nodes_mut(nodes: &mut [Node], visit: &mut impl FnMut(&mut Element) -> Walk) {
    for node in nodes {
        if let Node::Element(e) = node {
            if visit(e) == Walk::Descend {
                walk_nodes_mut(&mut e.children, visit);
            }
        }
    }
}

fn retain_nodes(
    nodes: &mut Vec<Node>,
    keep: &mut impl FnMut(&Element) -> bool,
    descend: &impl Fn(&Element) -> bool,
) {
    nodes.retain_mut(|node| match node {
        Node::Element(e) => {
            if !keep(e) {
                return false;
            }
            if descend(e) {
                retain_nodes(&mut e.children, keep, descend);
            }
            true
        }
        _ => true,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attributes_are_case_insensitive() {
        let mut el = Element::new("A").with_attr("HREF", "/a");

        assert_eq!(el.name, "a");
        assert_eq!(el.attr("href"), Some("/a"));

        el.set_attr("Href", "/b");
        assert_eq!(el.attrs.len(), 1);
        assert_eq!(el.attr("href"), Some("/b"));

        assert_eq!(el.remove_attr("href"), Some("/b".to_string()));
        assert!(!el.has_attr("href"));
    }

    #[test]
    fn validates_names() {
        assert!(is_valid_element_name("data-list"));
        assert!(is_valid_element_name("svg:rect"));
        assert!(!is_valid_element_name("svg/onload=alert(1)"));
        assert!(!is_valid_element_name("1p"));

        assert!(is_valid_attribute_name("xlink:href"));
        assert!(is_valid_attribute_name("data-x"));
        assert!(!is_valid_attribute_name("x'><svg/onload"));
        assert!(!is_valid_attribute_name("a b"));
    }

    #[test]
    fn set_text_replaces_children() {
        let mut el = Element::new("p")
            .with_child(Element::new("b").with_child(Node::text("old")))
            .with_child(Node::text(" tail"));

        el.set_text("new");

        assert_eq!(el.children, vec![Node::text("new")]);
        assert_eq!(el.text_content(), "new");
    }

    #[test]
    fn retain_removes_subtrees() {
        let mut fragment = Fragment::new(vec![Node::Element(
            Element::new("div")
                .with_child(Element::new("span").with_attr("drop", ""))
                .with_child(Element::new("em")),
        )]);

        fragment.retain_elements(&mut |e: &Element| !e.has_attr("drop"), &|_: &Element| true);

        assert!(fragment.find_first("span").is_none());
        assert!(fragment.find_first("em").is_some());
    }

    #[test]
    fn walk_can_skip_children() {
        let mut fragment = Fragment::new(vec![Node::Element(
            Element::new("section").with_child(Element::new("p")),
        )]);

        let mut seen = Vec::new();
        fragment.walk_mut(&mut |e: &mut Element| {
            seen.push(e.name.clone());
            Walk::Skip
        });

        assert_eq!(seen, vec!["section"]);
    }
}
