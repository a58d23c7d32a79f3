#![forbid(unsafe_code)]

//! Tour options as data.
//!
//! [`Options`] is the caller-owned configuration object. Every group and
//! every field is optional so that the same type doubles as the per-step
//! override layer (a [`Step`](crate::step::Step) flattens an `Options` into
//! itself). Defaults are applied only when an
//! [`EffectiveConfig`](crate::config::EffectiveConfig) is resolved.
//!
//! # Loading
//!
//! ```
//! use orbit_core::options::{Options, Placement};
//!
//! let options = Options::from_json_str(
//!     r#"{ "tooltip": { "width": 320, "placement": "bottom" }, "resumeOnLoad": false }"#,
//! )
//! .unwrap();
//! assert_eq!(options.tooltip.unwrap().placement, Some(Placement::Bottom));
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ConfigError;
use crate::step::Renderable;

// ---------------------------------------------------------------------------
// Top-level Options
// ---------------------------------------------------------------------------

/// Global tour options, also used as the per-step override layer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Options {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_on_load: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub i18n: Option<I18nOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<TooltipOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spotlight: Option<SpotlightOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backdrop: Option<BackdropOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controls: Option<ControlsOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modal: Option<ModalOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait: Option<WaitOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub navigation: Option<NavigationOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_names: Option<BTreeMap<String, String>>,
}

impl Options {
    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Serialize to a JSON string.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        serde_json::to_string(self).map_err(ConfigError::Json)
    }

    #[must_use]
    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage.get_or_insert_with(Default::default).key = Some(key.into());
        self
    }

    #[must_use]
    pub fn user_key(mut self, user_key: impl Into<String>) -> Self {
        self.storage.get_or_insert_with(Default::default).user_key = Some(user_key.into());
        self
    }

    #[must_use]
    pub fn resume_on_load(mut self, resume: bool) -> Self {
        self.resume_on_load = Some(resume);
        self
    }

    #[must_use]
    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.i18n.get_or_insert_with(Default::default).locale = Some(locale.into());
        self
    }

    #[must_use]
    pub fn wait(mut self, timeout_ms: u64, interval_ms: u64) -> Self {
        let wait = self.wait.get_or_insert_with(Default::default);
        wait.timeout_ms = Some(timeout_ms);
        wait.interval_ms = Some(interval_ms);
        self
    }
}

// ---------------------------------------------------------------------------
// Groups
// ---------------------------------------------------------------------------

/// Persistence key configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageOptions {
    pub key: Option<String>,
    pub user_key: Option<String>,
}

/// Locale selection and message overrides (`locale -> key -> text`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct I18nOptions {
    pub locale: Option<String>,
    pub messages: Option<BTreeMap<String, BTreeMap<String, String>>>,
}

/// Button label overrides.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Labels {
    pub next: Option<String>,
    pub prev: Option<String>,
    pub close: Option<String>,
}

/// Tooltip side preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    #[default]
    Auto,
    Top,
    Right,
    Bottom,
    Left,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TooltipOptions {
    pub width: Option<f64>,
    pub placement: Option<Placement>,
    pub offset: Option<f64>,
    pub labels: Option<Labels>,
}

/// Spotlight hole shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpotlightShape {
    #[default]
    Rounded,
    Circle,
    Pill,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpotlightOptions {
    pub padding: Option<f64>,
    pub border_radius: Option<f64>,
    pub shape: Option<SpotlightShape>,
    pub blur: Option<f64>,
    pub dim_opacity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackdropOptions {
    pub blur: Option<f64>,
    pub opacity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ControlsOptions {
    pub hide_prev_on_first: Option<bool>,
    pub show_prev: Option<bool>,
    pub show_close: Option<bool>,
}

/// Where a modal surface sits in the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ModalStyle {
    #[default]
    Center,
    CenterOffset {
        x: f64,
        y: f64,
    },
    TopCenter {
        margin: f64,
    },
    Fixed {
        top: f64,
        left: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModalOptions {
    pub enabled: Option<bool>,
    pub style: Option<ModalStyle>,
    pub title: Option<Renderable>,
    pub footer: Option<Renderable>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WaitOptions {
    pub timeout_ms: Option<u64>,
    pub interval_ms: Option<u64>,
    pub scroll: Option<bool>,
}

/// Key lists accept either a single key or an array of keys.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Keybinds {
    #[serde(deserialize_with = "one_or_many", skip_serializing_if = "Option::is_none")]
    pub next: Option<Vec<String>>,
    #[serde(deserialize_with = "one_or_many", skip_serializing_if = "Option::is_none")]
    pub prev: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NavigationOptions {
    pub esc_to_close: Option<bool>,
    pub keybinds: Option<Keybinds>,
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(
        Option::<OneOrMany>::deserialize(deserializer)?.map(|keys| match keys {
            OneOrMany::One(key) => vec![key],
            OneOrMany::Many(keys) => keys,
        }),
    )
}

// ---------------------------------------------------------------------------
// Deep merge
// ---------------------------------------------------------------------------

/// Key-by-key overlay of a plain configuration record.
///
/// `over` wins at every leaf it sets; unset leaves keep the base value.
/// Nested plain records recurse. Renderables and lists are leaves.
pub trait DeepMerge {
    fn deep_merge(&mut self, over: &Self);
}

/// Replace `base` when `over` is set.
pub(crate) fn overlay<T: Clone>(base: &mut Option<T>, over: &Option<T>) {
    if over.is_some() {
        base.clone_from(over);
    }
}

/// Merge `over` into `base`, recursing when both sides are present.
pub(crate) fn overlay_nested<T: DeepMerge + Clone>(base: &mut Option<T>, over: &Option<T>) {
    match (base.as_mut(), over) {
        (Some(base), Some(over)) => base.deep_merge(over),
        (None, Some(over)) => *base = Some(over.clone()),
        _ => {}
    }
}

impl DeepMerge for Labels {
    fn deep_merge(&mut self, over: &Self) {
        overlay(&mut self.next, &over.next);
        overlay(&mut self.prev, &over.prev);
        overlay(&mut self.close, &over.close);
    }
}

impl DeepMerge for TooltipOptions {
    fn deep_merge(&mut self, over: &Self) {
        overlay(&mut self.width, &over.width);
        overlay(&mut self.placement, &over.placement);
        overlay(&mut self.offset, &over.offset);
        overlay_nested(&mut self.labels, &over.labels);
    }
}

impl DeepMerge for SpotlightOptions {
    fn deep_merge(&mut self, over: &Self) {
        overlay(&mut self.padding, &over.padding);
        overlay(&mut self.border_radius, &over.border_radius);
        overlay(&mut self.shape, &over.shape);
        overlay(&mut self.blur, &over.blur);
        overlay(&mut self.dim_opacity, &over.dim_opacity);
    }
}

impl DeepMerge for BackdropOptions {
    fn deep_merge(&mut self, over: &Self) {
        overlay(&mut self.blur, &over.blur);
        overlay(&mut self.opacity, &over.opacity);
    }
}

impl DeepMerge for ControlsOptions {
    fn deep_merge(&mut self, over: &Self) {
        overlay(&mut self.hide_prev_on_first, &over.hide_prev_on_first);
        overlay(&mut self.show_prev, &over.show_prev);
        overlay(&mut self.show_close, &over.show_close);
    }
}

impl DeepMerge for ModalOptions {
    fn deep_merge(&mut self, over: &Self) {
        overlay(&mut self.enabled, &over.enabled);
        overlay(&mut self.style, &over.style);
        // Renderables are opaque leaves.
        overlay(&mut self.title, &over.title);
        overlay(&mut self.footer, &over.footer);
    }
}

impl DeepMerge for WaitOptions {
    fn deep_merge(&mut self, over: &Self) {
        overlay(&mut self.timeout_ms, &over.timeout_ms);
        overlay(&mut self.interval_ms, &over.interval_ms);
        overlay(&mut self.scroll, &over.scroll);
    }
}

impl DeepMerge for Keybinds {
    fn deep_merge(&mut self, over: &Self) {
        overlay(&mut self.next, &over.next);
        overlay(&mut self.prev, &over.prev);
    }
}

impl DeepMerge for NavigationOptions {
    fn deep_merge(&mut self, over: &Self) {
        overlay(&mut self.esc_to_close, &over.esc_to_close);
        overlay_nested(&mut self.keybinds, &over.keybinds);
    }
}

impl DeepMerge for BTreeMap<String, String> {
    fn deep_merge(&mut self, over: &Self) {
        for (key, value) in over {
            self.insert(key.clone(), value.clone());
        }
    }
}
