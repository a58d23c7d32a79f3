#![forbid(unsafe_code)]

//! Tour steps.
//!
//! A [`Step`] names a target (selector, data key, or class), an optional
//! route, its display content, and behavior overrides. Steps arrive as an
//! ordered sequence that stays immutable for the session; order defines
//! the default advancement order.

use std::fmt;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::event::NodeHandle;
use crate::options::{Labels, ModalOptions, Options};

// ---------------------------------------------------------------------------
// Renderable
// ---------------------------------------------------------------------------

/// Display content handed to the presenter.
///
/// On the wire a renderable is either a plain string or `{"node": <id>}`
/// referring to a host-rendered tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RenderableRepr", into = "RenderableRepr")]
pub enum Renderable {
    Text(String),
    Node(NodeHandle),
}

impl Renderable {
    /// The text payload, if this is a text renderable.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Node(_) => None,
        }
    }
}

impl From<&str> for Renderable {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for Renderable {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<NodeHandle> for Renderable {
    fn from(node: NodeHandle) -> Self {
        Self::Node(node)
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RenderableRepr {
    Text(String),
    Node { node: u64 },
}

impl From<RenderableRepr> for Renderable {
    fn from(repr: RenderableRepr) -> Self {
        match repr {
            RenderableRepr::Text(text) => Self::Text(text),
            RenderableRepr::Node { node } => Self::Node(NodeHandle(node)),
        }
    }
}

impl From<Renderable> for RenderableRepr {
    fn from(renderable: Renderable) -> Self {
        match renderable {
            Renderable::Text(text) => Self::Text(text),
            Renderable::Node(NodeHandle(node)) => Self::Node { node },
        }
    }
}

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

/// The route a step lives on.
///
/// `Exact` routes can be navigated to; `Pattern` routes only match.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RouteRepr", into = "RouteRepr")]
pub enum RoutePattern {
    Exact(String),
    Pattern(Regex),
}

impl RoutePattern {
    /// Compile a pattern route.
    pub fn pattern(source: &str) -> Result<Self, regex_lite::Error> {
        Regex::new(source).map(Self::Pattern)
    }

    /// Whether `path` satisfies this route.
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Exact(route) => route == path,
            Self::Pattern(regex) => regex.is_match(path),
        }
    }

    /// The concrete path to navigate to, when there is one.
    pub fn concrete_path(&self) -> Option<&str> {
        match self {
            Self::Exact(route) => Some(route),
            Self::Pattern(_) => None,
        }
    }
}

impl PartialEq for RoutePattern {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Exact(a), Self::Exact(b)) => a == b,
            (Self::Pattern(a), Self::Pattern(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(route) => f.write_str(route),
            Self::Pattern(regex) => write!(f, "/{}/", regex.as_str()),
        }
    }
}

impl From<&str> for RoutePattern {
    fn from(route: &str) -> Self {
        Self::Exact(route.to_owned())
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RouteRepr {
    Exact(String),
    Pattern { pattern: String },
}

impl TryFrom<RouteRepr> for RoutePattern {
    type Error = regex_lite::Error;

    fn try_from(repr: RouteRepr) -> Result<Self, Self::Error> {
        match repr {
            RouteRepr::Exact(route) => Ok(Self::Exact(route)),
            RouteRepr::Pattern { pattern } => Self::pattern(&pattern),
        }
    }
}

impl From<RoutePattern> for RouteRepr {
    fn from(route: RoutePattern) -> Self {
        match route {
            RoutePattern::Exact(route) => Self::Exact(route),
            RoutePattern::Pattern(regex) => Self::Pattern {
                pattern: regex.as_str().to_owned(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Advance and missing-target behavior
// ---------------------------------------------------------------------------

/// How the tour leaves a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AdvanceBy {
    /// Only through `next()` or the rendered controls.
    #[default]
    Manual,
    /// A click on the resolved target advances.
    ClickTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdvanceSpec {
    pub by: AdvanceBy,
}

/// Recovery policy when a step's target never appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MissingBehavior {
    /// Advance to the following step.
    Skip,
    /// Stay and render without an anchor or spotlight.
    #[default]
    Halt,
    /// Try `fallback_selector`, then halt.
    FallbackSelector,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OnMissing {
    pub behavior: MissingBehavior,
    pub fallback_selector: Option<String>,
}

impl OnMissing {
    pub fn skip() -> Self {
        Self {
            behavior: MissingBehavior::Skip,
            fallback_selector: None,
        }
    }

    pub fn halt() -> Self {
        Self::default()
    }

    pub fn fallback(selector: impl Into<String>) -> Self {
        Self {
            behavior: MissingBehavior::FallbackSelector,
            fallback_selector: Some(selector.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Step
// ---------------------------------------------------------------------------

/// One unit of the tour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<RoutePattern>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(default, alias = "dataTour", skip_serializing_if = "Option::is_none")]
    pub data_tour_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    pub content: Renderable,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Renderable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<Renderable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advance: Option<AdvanceSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_missing: Option<OnMissing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Labels>,
    /// Per-step option overrides (`tooltip`, `spotlight`, `modal`, ...).
    #[serde(flatten)]
    pub overrides: Options,
}

impl Step {
    /// Create a step with an id and content.
    pub fn new(id: impl Into<String>, content: impl Into<Renderable>) -> Self {
        Self {
            id: id.into(),
            route: None,
            selector: None,
            data_tour_key: None,
            class_name: None,
            content: content.into(),
            title: None,
            footer: None,
            advance: None,
            on_missing: None,
            labels: None,
            overrides: Options::default(),
        }
    }

    /// Parse an ordered step list from JSON.
    pub fn list_from_json_str(s: &str) -> Result<Vec<Self>, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    #[must_use]
    pub fn route(mut self, route: impl Into<RoutePattern>) -> Self {
        self.route = Some(route.into());
        self
    }

    #[must_use]
    pub fn selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    #[must_use]
    pub fn data_tour(mut self, key: impl Into<String>) -> Self {
        self.data_tour_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<Renderable>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn footer(mut self, footer: impl Into<Renderable>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    #[must_use]
    pub fn advance_on_click(mut self) -> Self {
        self.advance = Some(AdvanceSpec {
            by: AdvanceBy::ClickTarget,
        });
        self
    }

    #[must_use]
    pub fn on_missing(mut self, on_missing: OnMissing) -> Self {
        self.on_missing = Some(on_missing);
        self
    }

    #[must_use]
    pub fn labels(mut self, labels: Labels) -> Self {
        self.labels = Some(labels);
        self
    }

    /// Render this step as a centered modal.
    #[must_use]
    pub fn modal(mut self) -> Self {
        self.overrides
            .modal
            .get_or_insert_with(ModalOptions::default)
            .enabled = Some(true);
        self
    }

    #[must_use]
    pub fn overrides(mut self, overrides: Options) -> Self {
        self.overrides = overrides;
        self
    }

    /// Whether a click on the target should advance the tour.
    pub fn advances_on_click(&self) -> bool {
        matches!(
            self.advance,
            Some(AdvanceSpec {
                by: AdvanceBy::ClickTarget
            })
        )
    }

    /// The configured recovery policy (defaults to halt).
    pub fn missing_behavior(&self) -> MissingBehavior {
        self.on_missing
            .as_ref()
            .map(|m| m.behavior)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Placement;

    #[test]
    fn parses_camel_case_step() {
        let steps = Step::list_from_json_str(
            r#"[
                { "id": "s1", "route": "/", "dataTour": "clickme", "content": "First",
                  "advance": { "by": "clickTarget" } },
                { "id": "s2", "route": { "pattern": "^/products/\\d+$" }, "className": "row",
                  "content": { "node": 7 },
                  "onMissing": { "behavior": "fallbackSelector", "fallbackSelector": ".alt" },
                  "tooltip": { "placement": "right" } }
            ]"#,
        )
        .unwrap();

        assert_eq!(steps[0].data_tour_key.as_deref(), Some("clickme"));
        assert!(steps[0].advances_on_click());
        assert_eq!(steps[0].route, Some(RoutePattern::Exact("/".into())));

        assert_eq!(steps[1].content, Renderable::Node(NodeHandle(7)));
        assert!(steps[1].route.as_ref().unwrap().matches("/products/42"));
        assert!(!steps[1].route.as_ref().unwrap().matches("/products/x"));
        assert_eq!(
            steps[1].missing_behavior(),
            MissingBehavior::FallbackSelector
        );
        assert_eq!(
            steps[1].overrides.tooltip.as_ref().unwrap().placement,
            Some(Placement::Right)
        );
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let err = Step::list_from_json_str(r#"[{ "id": "s", "route": { "pattern": "(" }, "content": "x" }]"#);
        assert!(err.is_err());
    }

    #[test]
    fn pattern_routes_have_no_concrete_path() {
        let route = RoutePattern::pattern("^/a").unwrap();
        assert_eq!(route.concrete_path(), None);
        assert_eq!(RoutePattern::from("/a").concrete_path(), Some("/a"));
    }

    #[test]
    fn default_missing_behavior_is_halt() {
        assert_eq!(Step::new("s", "x").missing_behavior(), MissingBehavior::Halt);
    }

    #[test]
    fn renderable_round_trips_through_json() {
        let step = Step::new("s", NodeHandle(3)).title("Hello").modal();
        let json = serde_json::to_string(&step).unwrap();
        let back: Step = serde_json::from_str(&json).unwrap();
        assert_eq!(back, step);
        assert_eq!(back.overrides.modal.unwrap().enabled, Some(true));
    }
}
