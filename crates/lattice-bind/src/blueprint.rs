//! Blueprints and the instances stamped from them.

use std::sync::Arc;

use lattice_markup::{to_html, Fragment, MarkupError, Node};

use crate::binder::bind;
use crate::data::{identity_of, Item};
use crate::directive::{lint_fragment, DirectiveIssue};

/// Read-only markup instantiated once per item.
///
/// Cloning a blueprint shares the underlying tree; instantiation always
/// works on a structural copy.
#[derive(Debug, Clone, PartialEq)]
pub struct Blueprint {
    fragment: Arc<Fragment>,
}

impl Blueprint {
    /// Create a blueprint from an already-parsed fragment.
    pub fn new(fragment: Fragment) -> Self {
        Self {
            fragment: Arc::new(fragment),
        }
    }

    /// Parse a blueprint from markup.
    pub fn parse(markup: &str) -> Result<Self, MarkupError> {
        Ok(Self::new(Fragment::parse(markup)?))
    }

    /// The canonical tree.
    pub fn fragment(&self) -> &Fragment {
        &self.fragment
    }

    /// Copy the blueprint and bind the copy to an item.
    pub fn instantiate(&self, item: &Item, identity_key: &str) -> Instance {
        let mut fragment = Fragment::clone(&self.fragment);
        bind(&mut fragment, item);

        Instance {
            nodes: fragment.nodes,
            key: identity_of(item, identity_key),
        }
    }

    /// Malformed directives in this blueprint.
    pub fn lint(&self) -> Vec<DirectiveIssue> {
        lint_fragment(&self.fragment)
    }
}

/// Parse blueprint markup and report its malformed directives.
pub fn lint_blueprint(markup: &str) -> Result<Vec<DirectiveIssue>, MarkupError> {
    Ok(Blueprint::parse(markup)?.lint())
}

/// One rendered copy of a blueprint, bound to one item.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    nodes: Vec<Node>,
    key: Option<String>,
}

impl Instance {
    /// Rendered nodes.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Identity of the bound item, when it has one.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Rendered markup.
    pub fn to_html(&self) -> String {
        to_html(&self.nodes)
    }
}
