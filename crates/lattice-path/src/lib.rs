//! Restricted property paths over JSON records.
//!
//! A path is a chain of identifiers and non-negative indices such as
//! `user.address.city` or `items[0].title`. Paths are checked against an
//! allow-list grammar and resolved by plain data lookup; nothing is ever
//! evaluated.

pub mod resolver;
pub mod validator;
pub mod value;

pub use resolver::{lookup, resolve, try_resolve};
pub use validator::{is_valid, Path, PathError, Segment};
pub use value::{display_text, is_present, is_truthy};
