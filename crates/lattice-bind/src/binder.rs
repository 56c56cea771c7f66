//! Applies directive markers in one instance against one item.
//!
//! Passes run in a fixed order over the whole instance: text, attribute maps,
//! markup, then the two removal passes. Removal runs last so bindings never
//! need to care whether their element survives. Nothing here fails: a bad or
//! unresolved path leaves the element as it was, apart from text and markup
//! directives which fall back to empty content.

use serde_json::Value;

use lattice_markup::{clean, is_executable_url, is_url_attribute, Element, Fragment, Walk};
use lattice_path::{display_text, is_truthy, try_resolve};

use crate::directive::{parse_attr_map, DirectiveIssue, DirectiveKind, MARKUP_ATTR};

/// Apply every directive in `fragment` against `item`.
pub fn bind(fragment: &mut Fragment, item: &Value) {
    fragment.walk_mut(&mut |element: &mut Element| {
        apply_text(element, item);
        Walk::Descend
    });

    fragment.walk_mut(&mut |element: &mut Element| {
        apply_attr_map(element, item);
        Walk::Descend
    });

    // Injected markup is data, not blueprint; it is never scanned for directives.
    fragment.walk_mut(&mut |element: &mut Element| {
        if apply_markup(element, item) {
            Walk::Skip
        } else {
            Walk::Descend
        }
    });

    let descend = |element: &Element| !element.has_attr(MARKUP_ATTR);
    fragment.retain_elements(
        &mut |element: &Element| keep(element, item, DirectiveKind::ShowIf),
        &descend,
    );
    fragment.retain_elements(
        &mut |element: &Element| keep(element, item, DirectiveKind::ShowUnless),
        &descend,
    );
}

/// Resolve a directive path, logging rejected paths.
fn lookup<'a>(item: &'a Value, kind: DirectiveKind, path: &str) -> Option<&'a Value> {
    match try_resolve(item, path) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!("Ignoring {} directive: {}", kind, e);
            None
        }
    }
}

fn apply_text(element: &mut Element, item: &Value) {
    let Some(path) = element.attr(DirectiveKind::Text.attribute()) else {
        return;
    };
    let text = lookup(item, DirectiveKind::Text, path)
        .map(display_text)
        .unwrap_or_default();
    element.set_text(text);
}

fn apply_attr_map(element: &mut Element, item: &Value) {
    let Some(list) = element.attr(DirectiveKind::AttrMap.attribute()) else {
        return;
    };

    for binding in parse_attr_map(list) {
        let binding = match binding {
            Ok(binding) => binding,
            Err(issue @ DirectiveIssue::EventHandler(_)) => {
                tracing::warn!("Refusing binding on <{}>: {}", element.name, issue);
                continue;
            }
            Err(issue) => {
                tracing::debug!("Skipping binding on <{}>: {}", element.name, issue);
                continue;
            }
        };

        // Absent values leave the attribute unset
        let Some(value) = lookup(item, DirectiveKind::AttrMap, &binding.path) else {
            continue;
        };
        let value = display_text(value);

        if is_url_attribute(&binding.attribute) && is_executable_url(&value) {
            tracing::warn!(
                "Refusing executable URL for {} on <{}>",
                binding.attribute,
                element.name
            );
            continue;
        }

        element.set_attr(&binding.attribute, value);
    }
}

/// Returns true when the element carried a markup directive.
fn apply_markup(element: &mut Element, item: &Value) -> bool {
    let Some(path) = element.attr(MARKUP_ATTR) else {
        return false;
    };
    let markup = lookup(item, DirectiveKind::Markup, path)
        .map(display_text)
        .unwrap_or_default();
    element.children = clean(&markup).nodes;
    true
}

fn keep(element: &Element, item: &Value, kind: DirectiveKind) -> bool {
    let Some(path) = element.attr(kind.attribute()) else {
        return true;
    };
    let truthy = is_truthy(lookup(item, kind, path));
    match kind {
        DirectiveKind::ShowIf => truthy,
        DirectiveKind::ShowUnless => !truthy,
        _ => true,
    }
}
