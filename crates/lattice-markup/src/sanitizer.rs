//! Markup sanitizer for untrusted fragments.
//!
//! Removes elements that can run code or submit data, event-handler
//! attributes, and link-like attributes pointing at an executable scheme.
//! Everything else is kept as parsed.

use crate::node::{Element, Fragment, Node};
use crate::parser::parse_fragment;

/// Elements removed together with their subtree.
///
/// `style` content is raw text to this parser but markup to a browser
/// inside `svg` or `math`.
pub const DENIED_ELEMENTS: &[&str] = &[
    "script", "noscript", "style", "iframe", "frame", "frameset", "object", "embed", "applet",
    "form", "base", "meta", "link",
];

/// Attributes that are followed as URLs.
pub const URL_ATTRIBUTES: &[&str] = &[
    "href",
    "src",
    "action",
    "formaction",
    "xlink:href",
    "data",
    "poster",
    "background",
    "srcset",
    "cite",
];

/// Schemes that execute when followed.
const EXECUTABLE_SCHEMES: &[&str] = &["javascript:", "vbscript:", "data:text/html"];

/// Sanitize a markup string and return the cleaned serialization.
pub fn sanitize(markup: &str) -> String {
    clean(markup).to_html()
}

/// Parse and sanitize a markup string into a tree.
///
/// Markup that cannot be parsed at all becomes a single text node, so it is
/// escaped on output rather than inserted as structure.
pub fn clean(markup: &str) -> Fragment {
    match parse_fragment(markup) {
        Ok(fragment) => sanitize_fragment(fragment),
        Err(e) => {
            tracing::debug!("Inserting unparseable markup as text: {}", e);
            Fragment::new(vec![Node::text(markup)])
        }
    }
}

/// Sanitize an already-parsed fragment.
pub fn sanitize_fragment(mut fragment: Fragment) -> Fragment {
    clean_nodes(&mut fragment.nodes);
    fragment
}

fn clean_nodes(nodes: &mut Vec<Node>) {
    nodes.retain_mut(|node| match node {
        Node::Element(element) => {
            if is_denied(&element.name) {
                return false;
            }
            clean_attributes(element);
            clean_nodes(&mut element.children);
            true
        }
        Node::Text(_) => true,
        Node::Comment(_) | Node::Doctype(_) => false,
    });
}

fn clean_attributes(element: &mut Element) {
    element.attrs.retain(|attr| {
        if is_event_handler(&attr.name) {
            return false;
        }
        !(is_url_attribute(&attr.name) && is_executable_url(&attr.value))
    });
}

fn is_denied(name: &str) -> bool {
    DENIED_ELEMENTS.iter().any(|d| d.eq_ignore_ascii_case(name))
}

/// Check whether an attribute name is an event handler (`onclick`, `ONLOAD`, ...).
pub fn is_event_handler(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() > 2 && bytes[..2].eq_ignore_ascii_case(b"on")
}

/// Check whether an attribute is followed as a URL.
pub fn is_url_attribute(name: &str) -> bool {
    URL_ATTRIBUTES.iter().any(|a| a.eq_ignore_ascii_case(name))
}

/// Check whether a URL value uses a scheme that executes code.
///
/// Whitespace and control characters are ignored, matching how browsers
/// read a scheme like `java\tscript:`.
pub fn is_executable_url(value: &str) -> bool {
    let normalized: String = value
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_control())
        .take(32)
        .collect::<String>()
        .to_ascii_lowercase();

    EXECUTABLE_SCHEMES
        .iter()
        .any(|scheme| normalized.starts_with(scheme))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Output must read back with no denied element and no handler attribute.
    fn assert_inert(output: &str) {
        let reparsed = Fragment::parse(output).unwrap();
        for element in reparsed.elements() {
            assert!(!is_denied(&element.name), "denied <{}> in {output}", element.name);
            assert!(
                !element.attrs.iter().any(|a| is_event_handler(&a.name)),
                "handler on <{}> in {output}",
                element.name
            );
        }
    }

    #[test]
    fn removes_script_and_handlers() {
        let dirty = r#"<p onclick="steal()">Hello</p><script>alert(1)</script><em>bye</em>"#;

        assert_eq!(sanitize(dirty), "<p>Hello</p><em>bye</em>");
    }

    #[test]
    fn removes_denied_elements_with_subtree() {
        let dirty = concat!(
            "<div>",
            "<iframe src=\"https://evil\"></iframe>",
            "<object data=\"x.swf\"><param name=a></object>",
            "<embed src=\"x.swf\">",
            "<form action=\"/steal\"><input name=pw></form>",
            "<span>kept</span>",
            "</div>"
        );

        assert_eq!(sanitize(dirty), "<div><span>kept</span></div>");
    }

    #[test]
    fn denied_names_are_case_insensitive() {
        assert_eq!(sanitize("<SCRIPT>x()</SCRIPT><b>ok</b>"), "<b>ok</b>");
        assert_eq!(sanitize(r#"<img src="a.png" OnError="x()">"#), r#"<img src="a.png">"#);
    }

    #[test]
    fn strips_executable_links() {
        let dirty = concat!(
            r#"<a href="javascript:alert(1)">one</a>"#,
            r#"<a href=" JaVaScRiPt:alert(1)">two</a>"#,
            r#"<a href="java&#x09;script:alert(1)">three</a>"#,
            r#"<a href="/safe" title="javascript:is fine here">four</a>"#,
        );

        assert_eq!(
            sanitize(dirty),
            concat!(
                "<a>one</a>",
                "<a>two</a>",
                "<a>three</a>",
                r#"<a href="/safe" title="javascript:is fine here">four</a>"#,
            )
        );
    }

    #[test]
    fn strips_nested_svg_script_links() {
        let dirty = r#"<svg><a xlink:href="javascript:x()"><text>t</text></a><script>x()</script></svg>"#;

        assert_eq!(sanitize(dirty), "<svg><a><text>t</text></a></svg>");
    }

    #[test]
    fn slash_separated_tags_become_text() {
        let cases = [
            ("<svg/onload=alert(1)>", "&lt;svg/onload=alert(1)&gt;"),
            ("<script/x>alert(1)</script>", "&lt;script/x&gt;alert(1)"),
            ("<img/src=x/onerror=alert(1)>", "&lt;img/src=x/onerror=alert(1)&gt;"),
        ];

        for (dirty, expected) in cases {
            let output = sanitize(dirty);
            assert_eq!(output, expected);
            assert_inert(&output);
        }
    }

    #[test]
    fn quotes_in_attribute_names_cannot_break_out() {
        let output = sanitize(r#"<p x'><svg/onload=alert(2)//'>y</p>"#);

        assert_eq!(output, "<p>y</p>");
        assert_inert(&output);
    }

    #[test]
    fn unterminated_tags_stay_inert() {
        for dirty in [
            "<img src=x onerror=alert(1)",
            "<p>ok</p><svg onload=alert(1)",
            "<a href='javascript:alert(1)",
        ] {
            assert_inert(&sanitize(dirty));
        }
    }

    #[test]
    fn foreign_content_style_is_removed() {
        let dirty = "<svg><style><img src=x onerror=alert(1)></style></svg>";

        assert_eq!(sanitize(dirty), "<svg></svg>");
        assert_eq!(
            sanitize("<math><mtext><style><img src=x onerror=alert(1)></style></mtext></math>"),
            "<math><mtext></mtext></math>"
        );
        assert_eq!(sanitize("<style>p{}</style><p>x</p>"), "<p>x</p>");
    }

    #[test]
    fn drops_comments() {
        assert_eq!(sanitize("<p>a<!-- hidden -->b</p>"), "<p>ab</p>");
    }

    #[test]
    fn preserves_benign_structure() {
        let html = r#"<ul class="list"><li><a href="/a">A</a></li><li><strong>B</strong></li></ul>"#;

        assert_eq!(sanitize(html), html);
    }

    #[test]
    fn detects_executable_schemes() {
        assert!(is_executable_url("javascript:void(0)"));
        assert!(is_executable_url("\n vbscript:msgbox"));
        assert!(is_executable_url("DATA:text/html;base64,xx"));
        assert!(!is_executable_url("data:image/png;base64,xx"));
        assert!(!is_executable_url("https://example.com/javascript:"));
        assert!(!is_executable_url("/path"));
    }

    #[test]
    fn event_handler_prefix() {
        assert!(is_event_handler("onclick"));
        assert!(is_event_handler("ONLOAD"));
        assert!(!is_event_handler("on"));
        assert!(!is_event_handler("class"));
    }
}
