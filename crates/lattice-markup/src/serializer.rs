//! Markup serialization.

use std::fmt::Write;

use crate::node::{
    is_raw_text, is_valid_attribute_name, is_valid_element_name, is_void, Element, Node,
};

/// Serialize nodes to HTML.
pub fn to_html(nodes: &[Node]) -> String {
    let mut out = String::with_capacity(256);
    for node in nodes {
        write_node(node, &mut out);
    }
    out
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Element(element) => write_element(element, out),
        Node::Text(text) => out.push_str(&escape_text(text)),
        Node::Comment(text) => {
            out.push_str("<!--");
            out.push_str(&text.replace("-->", "--&gt;"));
            out.push_str("-->");
        }
        Node::Doctype(text) => {
            let _ = write!(out, "<!DOCTYPE {text}>");
        }
    }
}

fn write_element(element: &Element, out: &mut String) {
    // A name that is not a plain tag name would be read back as different markup
    if !is_valid_element_name(&element.name) {
        for child in &element.children {
            write_node(child, out);
        }
        return;
    }

    out.push('<');
    out.push_str(&element.name);

    for attr in element.attrs.iter().filter(|a| is_valid_attribute_name(&a.name)) {
        let _ = write!(out, r#" {}="{}""#, attr.name, escape_attr(&attr.value));
    }
    out.push('>');

    if is_void(&element.name) {
        return;
    }

    if is_raw_text(&element.name) {
        for child in &element.children {
            match child {
                Node::Text(text) => out.push_str(&escape_raw_text(text)),
                other => write_node(other, out),
            }
        }
    } else {
        for child in &element.children {
            write_node(child, out);
        }
    }

    let _ = write!(out, "</{}>", element.name);
}

/// Escape HTML special characters in text content.
pub fn escape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            _ => result.push(ch),
        }
    }
    result
}

/// Escape HTML special characters in a double-quoted attribute value.
pub fn escape_attr(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => result.push_str("&amp;"),
            '"' => result.push_str("&quot;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            _ => result.push(ch),
        }
    }
    result
}

/// Raw text may not contain anything that closes its element early.
fn escape_raw_text(s: &str) -> String {
    s.replace("</", "<\\/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Fragment;
    use pretty_assertions::assert_eq;

    #[test]
    fn serializes_elements() {
        let html = "<p class=\"lead\">Hello <b>world</b></p>";
        let fragment = Fragment::parse(html).unwrap();

        assert_eq!(fragment.to_html(), html);
    }

    #[test]
    fn writes_void_elements_without_end_tag() {
        let fragment = Fragment::parse("<p>a<br/>b<img src=x></p>").unwrap();

        assert_eq!(fragment.to_html(), r#"<p>a<br>b<img src="x"></p>"#);
    }

    #[test]
    fn escapes_text_and_attributes() {
        let element = Element::new("a")
            .with_attr("title", r#"say "hi" & <go>"#)
            .with_child(Node::text("1 < 2 & 3 > 2"));

        assert_eq!(
            to_html(&[Node::Element(element)]),
            r#"<a title="say &quot;hi&quot; &amp; &lt;go&gt;">1 &lt; 2 &amp; 3 &gt; 2</a>"#
        );
    }

    #[test]
    fn raw_text_cannot_close_early() {
        let element = Element::new("style").with_child(Node::text("p{}</style><script>x()</script>"));

        let html = to_html(&[Node::Element(element)]);

        assert_eq!(html, r"<style>p{}<\/style><script>x()<\/script></style>");
    }

    #[test]
    fn never_writes_unsafe_names() {
        let element = Element {
            name: "svg/onload=alert(1)".to_string(),
            attrs: Vec::new(),
            children: vec![Node::Element(Element {
                name: "b".to_string(),
                attrs: vec![crate::node::Attribute {
                    name: "x onclick".to_string(),
                    value: "y".to_string(),
                }],
                children: vec![Node::text("t")],
            })],
        };

        assert_eq!(to_html(&[Node::Element(element)]), "<b>t</b>");
    }

    #[test]
    fn round_trips_documents() {
        let html = "<!DOCTYPE html><html><head><title>T</title></head><body><!-- c --><p>x</p></body></html>";
        let fragment = Fragment::parse(html).unwrap();

        assert_eq!(fragment.to_html(), html);
    }
}
