//! HTML-tolerant fragment parser.
//!
//! quick-xml does the tokenizing; this module adds the HTML rules it does not
//! know about: void elements, raw-text elements, case-insensitive names,
//! valueless attributes, and recovery from unclosed or stray end tags.
//!
//! quick-xml only ends a tag name at whitespace, so `<svg/onload=x()>` comes
//! through as one odd name. Tags whose names fail validation are kept as
//! text, and attributes with unsafe names are dropped.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::entities::{decode_entities, decode_entity};
use crate::node::{
    is_raw_text, is_valid_attribute_name, is_valid_element_name, is_void, Attribute, Element,
    Fragment, Node,
};

/// Errors that can occur when parsing markup.
#[derive(Debug, thiserror::Error)]
pub enum MarkupError {
    #[error("Malformed markup: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// Parse a markup fragment into an owned tree.
pub fn parse_fragment(source: &str) -> Result<Fragment, MarkupError> {
    let mut tree = TreeBuilder::default();
    let mut offset = 0;

    // Raw-text elements are cut out of the source by hand, and tokenizing
    // resumes with a fresh reader after their end tag.
    'segments: while offset < source.len() {
        let mut reader = new_reader(&source[offset..]);

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let Some(mut element) = decode_element(&e) else {
                        tree.append_text(&format!("<{}>", String::from_utf8_lossy(&e)));
                        continue;
                    };
                    if is_void(&element.name) {
                        tree.append(Node::Element(element));
                    } else if is_raw_text(&element.name) {
                        let content_start = offset + reader.buffer_position() as usize;
                        let (raw, resume) = split_raw_text(source, content_start, &element.name);
                        if !raw.is_empty() {
                            element.children.push(Node::Text(raw.to_string()));
                        }
                        tree.append(Node::Element(element));
                        offset = resume;
                        continue 'segments;
                    } else {
                        tree.open(element);
                    }
                }
                Event::Empty(e) => match decode_element(&e) {
                    Some(element) => tree.append(Node::Element(element)),
                    None => tree.append_text(&format!("<{}/>", String::from_utf8_lossy(&e))),
                },
                Event::End(e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).to_ascii_lowercase();
                    tree.close(&name);
                }
                Event::Text(e) => {
                    tree.append_text(&String::from_utf8_lossy(&e));
                }
                Event::GeneralRef(e) => {
                    tree.append_text(&decode_entity(&String::from_utf8_lossy(&e)));
                }
                Event::CData(e) => {
                    tree.append_text(&String::from_utf8_lossy(&e));
                }
                Event::Comment(e) => {
                    tree.append(Node::Comment(String::from_utf8_lossy(&e).into_owned()));
                }
                Event::DocType(e) => {
                    tree.append(Node::Doctype(String::from_utf8_lossy(&e).trim().to_string()));
                }
                Event::Eof => break 'segments,
                // Declarations and processing instructions are dropped
                _ => {}
            }
        }
    }

    Ok(tree.finish())
}

fn new_reader(source: &str) -> Reader<&[u8]> {
    let mut reader = Reader::from_str(source);
    let config = reader.config_mut();
    config.trim_text(false);
    config.check_end_names = false;
    config.check_comments = false;
    config.allow_unmatched_ends = true;
    config.allow_dangling_amp = true;
    reader
}

/// Build an element from a start tag, lowercasing names and decoding values.
///
/// Returns `None` when the tag name is not a valid element name.
fn decode_element(e: &BytesStart) -> Option<Element> {
    let name = String::from_utf8_lossy(e.name().as_ref()).to_ascii_lowercase();
    if !is_valid_element_name(&name) {
        tracing::debug!("Keeping malformed tag <{}> as text", name);
        return None;
    }
    let mut attrs: Vec<Attribute> = Vec::new();

    for attr in e.html_attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_ascii_lowercase();
        if !is_valid_attribute_name(&key) {
            tracing::debug!("Dropping attribute {:?} on <{}>", key, name);
            continue;
        }

        // First occurrence wins
        if attrs.iter().any(|a| a.name == key) {
            continue;
        }

        let value = decode_entities(&String::from_utf8_lossy(&attr.value));
        attrs.push(Attribute { name: key, value });
    }

    Some(Element {
        name,
        attrs,
        children: Vec::new(),
    })
}

/// Split raw-text content starting at `content_start`.
///
/// Returns the content and the offset just past the end tag. A missing end
/// tag takes the rest of the input.
fn split_raw_text<'a>(source: &'a str, content_start: usize, name: &str) -> (&'a str, usize) {
    let rest = source.get(content_start..).unwrap_or("");
    let Some(relative) = find_end_tag(rest, name) else {
        return (rest, source.len());
    };

    let close_start = content_start + relative;
    let resume = source[close_start..]
        .find('>')
        .map_or(source.len(), |i| close_start + i + 1);

    (&source[content_start..close_start], resume)
}

/// Byte offset of `</name` in `haystack`, ignoring ASCII case.
fn find_end_tag(haystack: &str, name: &str) -> Option<usize> {
    let needle = format!("</{name}");
    let bytes = haystack.as_bytes();
    let needle = needle.as_bytes();

    bytes
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
}

/// Stack-based tree assembly with HTML-style recovery.
#[derive(Default)]
struct TreeBuilder {
    root: Vec<Node>,
    open: Vec<Element>,
}

impl TreeBuilder {
    fn append(&mut self, node: Node) {
        match self.open.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.root.push(node),
        }
    }

    fn append_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let siblings = match self.open.last_mut() {
            Some(parent) => &mut parent.children,
            None => &mut self.root,
        };
        match siblings.last_mut() {
            Some(Node::Text(existing)) => existing.push_str(text),
            _ => siblings.push(Node::Text(text.to_string())),
        }
    }

    fn open(&mut self, element: Element) {
        self.open.push(element);
    }

    /// Close the innermost open element with this name, closing anything
    /// opened inside it. Stray end tags are ignored.
    fn close(&mut self, name: &str) {
        let Some(pos) = self.open.iter().rposition(|e| e.name == name) else {
            return;
        };
        while self.open.len() > pos {
            let Some(element) = self.open.pop() else {
                break;
            };
            self.append(Node::Element(element));
        }
    }

    fn finish(mut self) -> Fragment {
        while let Some(element) = self.open.pop() {
            self.append(Node::Element(element));
        }
        Fragment::new(self.root)
    }
}
