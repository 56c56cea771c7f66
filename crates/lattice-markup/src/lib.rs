//! Markup fragments for lattice.
//!
//! This crate provides a small owned element tree, an HTML-tolerant parser
//! built on quick-xml, a serializer, and the sanitizer applied to untrusted
//! markup before it is inserted into a rendered instance.

pub mod entities;
pub mod node;
pub mod parser;
pub mod sanitizer;
pub mod serializer;

pub use node::{Attribute, Element, Fragment, Node, Walk};
pub use parser::{parse_fragment, MarkupError};
pub use sanitizer::{
    clean, is_event_handler, is_executable_url, is_url_attribute, sanitize, sanitize_fragment,
};
pub use serializer::{escape_attr, escape_text, to_html};
