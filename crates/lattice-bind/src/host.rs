//! Mounting controllers from host elements and projecting them back.

use lattice_markup::{Element, Fragment, Node};

use crate::blueprint::Blueprint;
use crate::controller::{RenderController, RenderState, Source};

/// Host attribute holding a remote locator.
pub const SRC_ATTR: &str = "src";
/// Host attribute holding inline JSON.
pub const DATA_ATTR: &str = "data";
/// Host attribute naming the identity-key field.
pub const KEY_ATTR: &str = "key";
/// Indicator present while loading.
pub const LOADING_ATTR: &str = "loading";
/// Indicator present while errored, carrying the message.
pub const ERROR_ATTR: &str = "error";
/// Child element holding the blueprint.
pub const TEMPLATE_TAG: &str = "template";
/// Identity key used when neither host nor config names one.
pub const DEFAULT_IDENTITY_KEY: &str = "id";

/// Defaults applied when mounting hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostOptions {
    pub identity_key: String,
}

impl Default for HostOptions {
    fn default() -> Self {
        Self {
            identity_key: DEFAULT_IDENTITY_KEY.to_string(),
        }
    }
}

/// Errors that can occur when mounting a host.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MountError {
    #[error("<{0}> has no <template> child")]
    MissingTemplate(String),
}

/// Build a controller from a host element.
///
/// Returns the controller together with the source the host declares, if
/// any. Inline `data` wins over `src` when both are present. The controller
/// is left idle; configuring it is up to the caller.
pub fn mount(
    host: &Element,
    options: &HostOptions,
) -> Result<(RenderController, Option<Source>), MountError> {
    let template = host
        .child(TEMPLATE_TAG)
        .ok_or_else(|| MountError::MissingTemplate(host.name.clone()))?;
    let blueprint = Blueprint::new(Fragment::new(template.children.clone()));

    let identity_key = host
        .attr(KEY_ATTR)
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .unwrap_or(&options.identity_key);

    let controller = RenderController::new(blueprint).with_identity_key(identity_key);

    Ok((controller, source_of(host)))
}

/// The source declared on a host element.
pub fn source_of(host: &Element) -> Option<Source> {
    if let Some(data) = host.attr(DATA_ATTR) {
        return Some(Source::Inline(data.to_string()));
    }
    host.attr(SRC_ATTR)
        .map(str::trim)
        .filter(|src| !src.is_empty())
        .map(|src| Source::Remote(src.to_string()))
}

/// Render a host element reflecting the controller's current state.
///
/// Until the first render pass the host keeps its own children, so fallback
/// content stays visible while loading or after a failed first load. After
/// that the template is kept as the first child, followed by every instance.
pub fn project(host: &Element, controller: &RenderController) -> Element {
    let mut projected = Element {
        name: host.name.clone(),
        attrs: host.attrs.clone(),
        children: Vec::new(),
    };

    if !controller.has_rendered() {
        projected.children = host.children.clone();
    } else {
        if let Some(template) = host.child(TEMPLATE_TAG) {
            projected.children.push(Node::Element(template.clone()));
        }
        for instance in controller.instances() {
            projected.children.extend(instance.nodes().iter().cloned());
        }
    }

    match controller.state() {
        RenderState::Loading => projected.set_attr(LOADING_ATTR, ""),
        _ => {
            projected.remove_attr(LOADING_ATTR);
        }
    }
    match (controller.state(), controller.error()) {
        (RenderState::Errored, Some(message)) => projected.set_attr(ERROR_ATTR, message),
        _ => {
            projected.remove_attr(ERROR_ATTR);
        }
    }

    projected
}
