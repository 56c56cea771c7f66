//! Render controller: the state machine between a source and rendered instances.
//!
//! Remote acquisition is split into three steps so the controller itself never
//! awaits while holding state:
//!
//! 1. [`RenderController::configure`] makes the synchronous transition and, for
//!    a remote source, hands back an [`Acquisition`] carrying a request token.
//! 2. [`Acquisition::run`] performs the fetch.
//! 3. [`RenderController::complete`] applies the result, unless a later
//!    configuration has already superseded that token.
//!
//! [`RenderController::load`] runs all three in sequence.

use std::collections::HashSet;

use crate::blueprint::{Blueprint, Instance};
use crate::data::{decode_items, Item};
use crate::events::{RenderEvent, RenderHub};
use crate::fetch::{AcquisitionError, Fetcher};
use crate::host::DEFAULT_IDENTITY_KEY;

/// Lifecycle state of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderState {
    /// Nothing configured yet
    #[default]
    Idle,
    /// Waiting on a remote acquisition
    Loading,
    /// Instances reflect the current items
    Rendered,
    /// The last acquisition or inline parse failed
    Errored,
}

/// Where a controller's items come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// JSON text supplied directly
    Inline(String),
    /// Locator fetched asynchronously
    Remote(String),
}

/// A pending remote fetch, tagged with the token current when it started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acquisition {
    token: u64,
    locator: String,
}

impl Acquisition {
    /// Request token.
    pub fn token(&self) -> u64 {
        self.token
    }

    /// Locator to fetch.
    pub fn locator(&self) -> &str {
        &self.locator
    }

    /// Fetch the body and package it for [`RenderController::complete`].
    pub async fn run<F: Fetcher>(self, fetcher: &F) -> Completion {
        let result = fetcher.fetch(&self.locator).await;
        Completion {
            token: self.token,
            locator: self.locator,
            result,
        }
    }
}

/// Outcome of an [`Acquisition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub token: u64,
    pub locator: String,
    pub result: Result<String, AcquisitionError>,
}

/// Owns a blueprint, the current items, and the instances rendered from them.
#[derive(Debug)]
pub struct RenderController {
    blueprint: Blueprint,
    identity_key: String,
    items: Vec<Item>,
    instances: Vec<Instance>,
    state: RenderState,
    error: Option<String>,
    token: u64,
    has_rendered: bool,
    hub: RenderHub,
}

impl RenderController {
    /// Create an idle controller for a blueprint.
    pub fn new(blueprint: Blueprint) -> Self {
        Self {
            blueprint,
            identity_key: DEFAULT_IDENTITY_KEY.to_string(),
            items: Vec::new(),
            instances: Vec::new(),
            state: RenderState::Idle,
            error: None,
            token: 0,
            has_rendered: false,
            hub: RenderHub::new(),
        }
    }

    /// Use a different identity-key field.
    pub fn with_identity_key(mut self, key: impl Into<String>) -> Self {
        self.identity_key = key.into();
        self
    }

    /// Publish events on an existing hub.
    pub fn with_hub(mut self, hub: RenderHub) -> Self {
        self.hub = hub;
        self
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    /// Failure message while errored.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.state == RenderState::Loading
    }

    /// Whether any render pass has run yet.
    pub fn has_rendered(&self) -> bool {
        self.has_rendered
    }

    pub fn blueprint(&self) -> &Blueprint {
        &self.blueprint
    }

    pub fn identity_key(&self) -> &str {
        &self.identity_key
    }

    /// A copy of the current items.
    pub fn get_items(&self) -> Vec<Item> {
        self.items.clone()
    }

    /// Instances from the last render pass.
    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    /// Subscribe to lifecycle events.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<RenderEvent> {
        self.hub.subscribe()
    }

    pub fn hub(&self) -> &RenderHub {
        &self.hub
    }

    /// Point the controller at a new source.
    ///
    /// Inline data renders immediately. A remote locator moves to `Loading`
    /// and returns the acquisition to run. Either way, any acquisition
    /// already in flight is superseded.
    pub fn configure(&mut self, source: Source) -> Option<Acquisition> {
        self.token += 1;

        match source {
            Source::Inline(json) => {
                match decode_items(&json) {
                    Ok(items) => self.replace_items(items),
                    Err(e) => self.fail(format!("Invalid inline data: {e}")),
                }
                None
            }
            Source::Remote(locator) => {
                self.state = RenderState::Loading;
                self.error = None;
                tracing::debug!("Loading {} (request {})", locator, self.token);
                self.hub.send(RenderEvent::Loading {
                    src: locator.clone(),
                });
                Some(Acquisition {
                    token: self.token,
                    locator,
                })
            }
        }
    }

    /// Apply a finished acquisition.
    ///
    /// Returns false when the completion was stale and discarded.
    pub fn complete(&mut self, completion: Completion) -> bool {
        if completion.token != self.token {
            tracing::debug!(
                "Discarding stale response from {} (request {}, current {})",
                completion.locator,
                completion.token,
                self.token
            );
            return false;
        }

        let items = completion.result.and_then(|body| {
            decode_items(&body).map_err(|e| AcquisitionError::Payload(e.to_string()))
        });

        match items {
            Ok(items) => self.replace_items(items),
            Err(e) => self.fail(format!("Failed to load {}: {}", completion.locator, e)),
        }
        true
    }

    /// Configure a source and, if remote, fetch and apply it.
    pub async fn load<F: Fetcher>(&mut self, source: Source, fetcher: &F) {
        if let Some(acquisition) = self.configure(source) {
            let completion = acquisition.run(fetcher).await;
            self.complete(completion);
        }
    }

    /// Replace all items with a copy of `items` and render.
    pub fn set_items(&mut self, items: &[Item]) {
        self.token += 1;
        self.replace_items(items.to_vec());
    }

    fn replace_items(&mut self, items: Vec<Item>) {
        self.items = items;
        self.error = None;
        self.render();
        self.state = RenderState::Rendered;
    }

    /// Enter `Errored` without touching rendered instances.
    fn fail(&mut self, message: String) {
        tracing::warn!("{}", message);
        self.state = RenderState::Errored;
        self.hub.send(RenderEvent::Errored {
            message: message.clone(),
        });
        self.error = Some(message);
    }

    fn render(&mut self) {
        self.instances.clear();
        self.has_rendered = true;

        let mut seen = HashSet::new();
        for item in &self.items {
            let instance = self.blueprint.instantiate(item, &self.identity_key);
            if let Some(key) = instance.key() {
                if !seen.insert(key.to_string()) {
                    tracing::debug!("Duplicate {} {:?} in items", self.identity_key, key);
                }
            }
            self.instances.push(instance);
        }

        self.hub.send(RenderEvent::Rendered {
            count: self.instances.len(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::HashMap;

    /// Serves canned responses by locator.
    #[derive(Default)]
    struct MockFetcher {
        responses: HashMap<String, Result<String, AcquisitionError>>,
    }

    impl MockFetcher {
        fn with(mut self, locator: &str, response: Result<&str, AcquisitionError>) -> Self {
            self.responses
                .insert(locator.to_string(), response.map(str::to_string));
            self
        }
    }

    impl Fetcher for MockFetcher {
        async fn fetch(&self, locator: &str) -> Result<String, AcquisitionError> {
            self.responses
                .get(locator)
                .cloned()
                .unwrap_or_else(|| Err(AcquisitionError::Status {
                    url: locator.to_string(),
                    status: 404,
                }))
        }
    }

    fn controller(blueprint: &str) -> RenderController {
        RenderController::new(Blueprint::parse(blueprint).unwrap())
    }

    fn rendered(controller: &RenderController) -> Vec<String> {
        controller.instances().iter().map(Instance::to_html).collect()
    }

    #[test]
    fn starts_idle() {
        let controller = controller("<li></li>");

        assert_eq!(controller.state(), RenderState::Idle);
        assert!(controller.instances().is_empty());
        assert!(!controller.has_rendered());
        assert_eq!(controller.identity_key(), "id");
    }

    #[test]
    fn inline_data_renders_immediately() {
        let mut controller = controller(r#"<li field="title"></li>"#);
        let mut events = controller.subscribe();

        let acquisition = controller.configure(Source::Inline(r#"[{"id":1,"title":"First"}]"#.into()));

        assert!(acquisition.is_none());
        assert_eq!(controller.state(), RenderState::Rendered);
        assert_eq!(rendered(&controller), vec![r#"<li field="title">First</li>"#]);
        assert_eq!(events.try_recv().unwrap(), RenderEvent::Rendered { count: 1 });
    }

    #[test]
    fn show_if_false_removes_element() {
        let mut controller = controller(r#"<li><b field-if="active">on</b>row</li>"#);

        controller.configure(Source::Inline(r#"[{"id":1,"active":false}]"#.into()));

        assert_eq!(rendered(&controller), vec!["<li>row</li>"]);
    }

    #[test]
    fn malformed_inline_data_keeps_instances() {
        let mut controller = controller(r#"<li field="title"></li>"#);
        controller.configure(Source::Inline(r#"[{"title":"Kept"}]"#.into()));

        controller.configure(Source::Inline("[{oops".into()));

        assert_eq!(controller.state(), RenderState::Errored);
        assert!(controller.error().is_some());
        assert_eq!(rendered(&controller), vec![r#"<li field="title">Kept</li>"#]);
        assert_eq!(controller.get_items(), vec![json!({ "title": "Kept" })]);
    }

    #[tokio::test]
    async fn remote_success_renders() {
        let fetcher = MockFetcher::default().with("/items.json", Ok(r#"{"items":[{"id":1},{"id":2}]}"#));
        let mut controller = controller(r#"<li field="id"></li>"#);
        let mut events = controller.subscribe();

        controller.load(Source::Remote("/items.json".into()), &fetcher).await;

        assert_eq!(controller.state(), RenderState::Rendered);
        assert_eq!(controller.instances().len(), 2);
        assert_eq!(
            events.try_recv().unwrap(),
            RenderEvent::Loading {
                src: "/items.json".to_string()
            }
        );
        assert_eq!(events.try_recv().unwrap(), RenderEvent::Rendered { count: 2 });
    }

    #[tokio::test]
    async fn loading_is_visible_before_completion() {
        let fetcher = MockFetcher::default().with("/items.json", Ok("[]"));
        let mut controller = controller("<li></li>");

        let acquisition = controller
            .configure(Source::Remote("/items.json".into()))
            .unwrap();
        assert!(controller.is_loading());

        let completion = acquisition.run(&fetcher).await;
        assert!(controller.complete(completion));
        assert_eq!(controller.state(), RenderState::Rendered);
    }

    #[tokio::test]
    async fn failed_status_keeps_prior_instances() {
        let fetcher = MockFetcher::default()
            .with("/ok.json", Ok(r#"[{"id":1,"title":"Old"}]"#))
            .with(
                "/broken.json",
                Err(AcquisitionError::Status {
                    url: "/broken.json".to_string(),
                    status: 500,
                }),
            );
        let mut controller = controller(r#"<li field="title"></li>"#);
        controller.load(Source::Remote("/ok.json".into()), &fetcher).await;
        let before = rendered(&controller);

        controller.load(Source::Remote("/broken.json".into()), &fetcher).await;

        assert_eq!(controller.state(), RenderState::Errored);
        assert!(controller.error().unwrap().contains("500"));
        assert_eq!(rendered(&controller), before);
    }

    #[tokio::test]
    async fn unexpected_payload_is_an_error() {
        let fetcher = MockFetcher::default().with("/odd.json", Ok(r#"{"rows":[]}"#));
        let mut controller = controller("<li></li>");

        controller.load(Source::Remote("/odd.json".into()), &fetcher).await;

        assert_eq!(controller.state(), RenderState::Errored);
        assert!(controller.instances().is_empty());
        assert!(!controller.has_rendered());
    }

    #[tokio::test]
    async fn stale_responses_are_discarded() {
        let fetcher = MockFetcher::default()
            .with("/first.json", Ok(r#"[{"title":"first"}]"#))
            .with("/second.json", Ok(r#"[{"title":"second"}]"#));
        let mut controller = controller(r#"<li field="title"></li>"#);

        let first = controller
            .configure(Source::Remote("/first.json".into()))
            .unwrap();
        let second = controller
            .configure(Source::Remote("/second.json".into()))
            .unwrap();

        let second = second.run(&fetcher).await;
        let first = first.run(&fetcher).await;

        assert!(controller.complete(second));
        assert!(!controller.complete(first));
        assert_eq!(rendered(&controller), vec![r#"<li field="title">second</li>"#]);
    }

    #[tokio::test]
    async fn set_items_supersedes_pending_fetch() {
        let fetcher = MockFetcher::default().with("/items.json", Ok(r#"[{"title":"remote"}]"#));
        let mut controller = controller(r#"<li field="title"></li>"#);

        let pending = controller
            .configure(Source::Remote("/items.json".into()))
            .unwrap();
        controller.set_items(&[json!({ "title": "local" })]);

        let completion = pending.run(&fetcher).await;
        assert!(!controller.complete(completion));
        assert_eq!(rendered(&controller), vec![r#"<li field="title">local</li>"#]);
    }

    #[test]
    fn items_are_copied_both_ways() {
        let mut controller = controller(r#"<li field="title"></li>"#);
        let mut items = vec![json!({ "title": "a" })];

        controller.set_items(&items);
        items[0]["title"] = json!("mutated");

        let mut copy = controller.get_items();
        copy.push(json!({ "title": "extra" }));

        assert_eq!(controller.get_items(), vec![json!({ "title": "a" })]);
        assert_eq!(controller.instances().len(), 1);
    }

    #[test]
    fn render_replaces_previous_instances() {
        let mut controller = controller(r#"<li field="id"></li>"#).with_identity_key("id");

        controller.set_items(&[json!({ "id": 1 }), json!({ "id": 2 })]);
        controller.set_items(&[json!({ "id": 3 })]);

        assert_eq!(controller.instances().len(), 1);
        assert_eq!(controller.instances()[0].key(), Some("3"));
    }
}
