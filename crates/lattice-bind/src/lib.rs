//! Directive binding and render lifecycle for lattice list hosts.
//!
//! A host element holds a `<template>` blueprint and a data source. Mounting
//! it yields a [`RenderController`] which turns items into instances by
//! copying the blueprint and applying its directives:
//!
//! | Attribute      | Effect                                        |
//! |----------------|-----------------------------------------------|
//! | `field`        | Text content from a path                      |
//! | `field-attr`   | `name: path` pairs set as attributes          |
//! | `field-html`   | Sanitized markup from a path                  |
//! | `field-if`     | Element removed when the value is falsy       |
//! | `field-unless` | Element removed when the value is truthy      |

pub mod binder;
pub mod blueprint;
pub mod controller;
pub mod data;
pub mod directive;
pub mod events;
pub mod fetch;
pub mod host;

pub use binder::bind;
pub use blueprint::{lint_blueprint, Blueprint, Instance};
pub use controller::{Acquisition, Completion, RenderController, RenderState, Source};
pub use data::{decode_items, identity_of, DataError, Item};
pub use directive::{lint_fragment, parse_attr_map, AttrBinding, DirectiveIssue, DirectiveKind};
pub use events::{RenderEvent, RenderHub};
pub use fetch::{AcquisitionError, FileFetcher, Fetcher, HttpFetcher, SourceFetcher};
pub use host::{mount, project, source_of, HostOptions, MountError};
