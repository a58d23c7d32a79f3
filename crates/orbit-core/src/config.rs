#![forbid(unsafe_code)]

//! Config merger and effective per-step configuration.
//!
//! [`merge`] overlays a step's overrides onto the global [`Options`]:
//!
//! - The deep-mergeable groups (`tooltip`, `spotlight`, `backdrop`,
//!   `controls`, `modal`, `wait`, `navigation`, `classNames`) merge
//!   key-by-key, recursing into nested plain records, step leaves winning.
//! - Every other group (`storage`, `i18n`, `resumeOnLoad`) is replaced
//!   wholesale when the step sets it.
//!
//! Renderables are typed leaves, so merging can never reach into a content
//! tree. The result is resolved against defaults into an
//! [`EffectiveConfig`], which is ephemeral and never persisted.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::options::{
    I18nOptions, Labels, ModalStyle, Options, Placement, SpotlightShape, overlay, overlay_nested,
};
use crate::step::{Renderable, Step};

/// Storage key used when the caller does not name one.
pub const DEFAULT_STORAGE_KEY: &str = "ctrlcan:orbit:v1";

pub const DEFAULT_TOOLTIP_WIDTH: f64 = 360.0;
pub const DEFAULT_TOOLTIP_OFFSET: f64 = 10.0;
pub const DEFAULT_SPOTLIGHT_PADDING: f64 = 10.0;
pub const DEFAULT_SPOTLIGHT_RADIUS: f64 = 12.0;
pub const DEFAULT_BACKDROP_BLUR: f64 = 6.0;
pub const DEFAULT_BACKDROP_OPACITY: f64 = 0.45;
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 8000;
pub const DEFAULT_WAIT_INTERVAL_MS: u64 = 120;
pub const DEFAULT_NEXT_KEY: &str = "ArrowRight";
pub const DEFAULT_PREV_KEY: &str = "ArrowLeft";

/// Overlay `step` onto `options` without resolving defaults.
pub fn merge_layers(options: &Options, step: &Options) -> Options {
    let mut merged = options.clone();

    overlay_nested(&mut merged.tooltip, &step.tooltip);
    overlay_nested(&mut merged.spotlight, &step.spotlight);
    overlay_nested(&mut merged.backdrop, &step.backdrop);
    overlay_nested(&mut merged.controls, &step.controls);
    overlay_nested(&mut merged.modal, &step.modal);
    overlay_nested(&mut merged.wait, &step.wait);
    overlay_nested(&mut merged.navigation, &step.navigation);
    overlay_nested(&mut merged.class_names, &step.class_names);

    overlay(&mut merged.storage, &step.storage);
    overlay(&mut merged.i18n, &step.i18n);
    overlay(&mut merged.resume_on_load, &step.resume_on_load);

    merged
}

/// Compute the effective configuration for `step`.
pub fn merge(options: &Options, step: &Step) -> EffectiveConfig {
    EffectiveConfig::resolve(&merge_layers(options, &step.overrides))
}

// ---------------------------------------------------------------------------
// Resolved groups
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub key: String,
    pub user_key: Option<String>,
}

impl StorageConfig {
    /// `(userKey ? userKey + ":" : "") + key`
    pub fn composite_key(&self) -> String {
        match self.user_key.as_deref() {
            Some(user) if !user.is_empty() => format!("{user}:{}", self.key),
            _ => self.key.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TooltipConfig {
    pub width: f64,
    pub placement: Placement,
    pub offset: f64,
    pub labels: Labels,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotlightConfig {
    pub padding: f64,
    pub border_radius: f64,
    pub shape: SpotlightShape,
    /// Blur layer radius; `0` disables the layer.
    pub blur: f64,
    /// Dim layer opacity; `0` disables the layer.
    pub dim_opacity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackdropConfig {
    pub blur: f64,
    pub opacity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlsConfig {
    pub hide_prev_on_first: bool,
    pub show_prev: bool,
    pub show_close: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModalConfig {
    pub enabled: bool,
    pub style: ModalStyle,
    pub title: Option<Renderable>,
    pub footer: Option<Renderable>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitConfig {
    pub timeout: Duration,
    pub interval: Duration,
    pub scroll: bool,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_WAIT_TIMEOUT_MS),
            interval: Duration::from_millis(DEFAULT_WAIT_INTERVAL_MS),
            scroll: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationConfig {
    pub esc_to_close: bool,
    pub next_keys: Vec<String>,
    pub prev_keys: Vec<String>,
}

/// Fully resolved configuration for one step.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveConfig {
    pub storage: StorageConfig,
    pub resume_on_load: bool,
    pub i18n: I18nOptions,
    pub tooltip: TooltipConfig,
    pub spotlight: SpotlightConfig,
    pub backdrop: BackdropConfig,
    pub controls: ControlsConfig,
    pub modal: ModalConfig,
    pub wait: WaitConfig,
    pub navigation: NavigationConfig,
    pub class_names: BTreeMap<String, String>,
}

impl EffectiveConfig {
    /// Apply defaults to a (possibly merged) options layer.
    pub fn resolve(layer: &Options) -> Self {
        let storage = layer.storage.clone().unwrap_or_default();
        let tooltip = layer.tooltip.clone().unwrap_or_default();
        let spotlight = layer.spotlight.clone().unwrap_or_default();
        let backdrop = layer.backdrop.clone().unwrap_or_default();
        let controls = layer.controls.clone().unwrap_or_default();
        let modal = layer.modal.clone().unwrap_or_default();
        let wait = layer.wait.clone().unwrap_or_default();
        let navigation = layer.navigation.clone().unwrap_or_default();
        let keybinds = navigation.keybinds.unwrap_or_default();

        let backdrop = BackdropConfig {
            blur: backdrop.blur.unwrap_or(DEFAULT_BACKDROP_BLUR),
            opacity: backdrop.opacity.unwrap_or(DEFAULT_BACKDROP_OPACITY),
        };

        Self {
            storage: StorageConfig {
                key: storage
                    .key
                    .unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_owned()),
                user_key: storage.user_key,
            },
            resume_on_load: layer.resume_on_load.unwrap_or(true),
            i18n: layer.i18n.clone().unwrap_or_default(),
            tooltip: TooltipConfig {
                width: tooltip.width.unwrap_or(DEFAULT_TOOLTIP_WIDTH),
                placement: tooltip.placement.unwrap_or_default(),
                offset: tooltip.offset.unwrap_or(DEFAULT_TOOLTIP_OFFSET),
                labels: tooltip.labels.unwrap_or_default(),
            },
            spotlight: SpotlightConfig {
                padding: spotlight.padding.unwrap_or(DEFAULT_SPOTLIGHT_PADDING),
                border_radius: spotlight.border_radius.unwrap_or(DEFAULT_SPOTLIGHT_RADIUS),
                shape: spotlight.shape.unwrap_or_default(),
                blur: spotlight.blur.unwrap_or(backdrop.blur),
                dim_opacity: spotlight.dim_opacity.unwrap_or(backdrop.opacity),
            },
            backdrop,
            controls: ControlsConfig {
                hide_prev_on_first: controls.hide_prev_on_first.unwrap_or(true),
                show_prev: controls.show_prev.unwrap_or(true),
                show_close: controls.show_close.unwrap_or(true),
            },
            modal: ModalConfig {
                enabled: modal.enabled.unwrap_or(false),
                style: modal.style.unwrap_or_default(),
                title: modal.title,
                footer: modal.footer,
            },
            wait: WaitConfig {
                timeout: Duration::from_millis(wait.timeout_ms.unwrap_or(DEFAULT_WAIT_TIMEOUT_MS)),
                interval: Duration::from_millis(
                    wait.interval_ms.unwrap_or(DEFAULT_WAIT_INTERVAL_MS).max(1),
                ),
                scroll: wait.scroll.unwrap_or(true),
            },
            navigation: NavigationConfig {
                esc_to_close: navigation.esc_to_close.unwrap_or(true),
                next_keys: keybinds
                    .next
                    .unwrap_or_else(|| vec![DEFAULT_NEXT_KEY.to_owned()]),
                prev_keys: keybinds
                    .prev
                    .unwrap_or_else(|| vec![DEFAULT_PREV_KEY.to_owned()]),
            },
            class_names: layer.class_names.clone().unwrap_or_default(),
        }
    }

    /// Effective configuration of the options alone (no step overrides).
    pub fn from_options(options: &Options) -> Self {
        Self::resolve(options)
    }
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        Self::resolve(&Options::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{StorageOptions, TooltipOptions, WaitOptions};
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        let cfg = EffectiveConfig::default();
        assert_eq!(cfg.storage.composite_key(), DEFAULT_STORAGE_KEY);
        assert!(cfg.resume_on_load);
        assert_eq!(cfg.tooltip.width, 360.0);
        assert_eq!(cfg.tooltip.placement, Placement::Auto);
        assert_eq!(cfg.spotlight.blur, DEFAULT_BACKDROP_BLUR);
        assert_eq!(cfg.spotlight.dim_opacity, DEFAULT_BACKDROP_OPACITY);
        assert_eq!(cfg.wait, WaitConfig::default());
        assert_eq!(cfg.navigation.next_keys, vec!["ArrowRight".to_string()]);
        assert!(!cfg.modal.enabled);
    }

    #[test]
    fn composite_key_prefixes_user_key() {
        let storage = StorageConfig {
            key: "tour".into(),
            user_key: Some("USER-1".into()),
        };
        assert_eq!(storage.composite_key(), "USER-1:tour");
        let empty_user = StorageConfig {
            key: "tour".into(),
            user_key: Some(String::new()),
        };
        assert_eq!(empty_user.composite_key(), "tour");
    }

    #[test]
    fn tooltip_group_deep_merges() {
        let options = Options {
            tooltip: Some(TooltipOptions {
                width: Some(360.0),
                placement: Some(Placement::Auto),
                ..Default::default()
            }),
            ..Default::default()
        };
        let step = Step::new("s", "x").overrides(Options {
            tooltip: Some(TooltipOptions {
                placement: Some(Placement::Right),
                ..Default::default()
            }),
            ..Default::default()
        });

        let merged = merge_layers(&options, &step.overrides);
        assert_eq!(
            merged.tooltip,
            Some(TooltipOptions {
                width: Some(360.0),
                placement: Some(Placement::Right),
                ..Default::default()
            })
        );
        let cfg = merge(&options, &step);
        assert_eq!(cfg.tooltip.width, 360.0);
        assert_eq!(cfg.tooltip.placement, Placement::Right);
    }

    #[test]
    fn non_whitelisted_group_is_replaced() {
        let options = Options {
            i18n: Some(I18nOptions {
                locale: Some("de".into()),
                messages: Some(BTreeMap::from([(
                    "de".to_string(),
                    BTreeMap::from([("next".to_string(), "Los".to_string())]),
                )])),
            }),
            storage: Some(StorageOptions {
                key: Some("a".into()),
                user_key: Some("u".into()),
            }),
            ..Default::default()
        };
        let step = Options {
            i18n: Some(I18nOptions {
                locale: Some("fr".into()),
                messages: None,
            }),
            storage: Some(StorageOptions {
                key: Some("b".into()),
                user_key: None,
            }),
            ..Default::default()
        };

        let merged = merge_layers(&options, &step);
        assert_eq!(
            merged.i18n,
            Some(I18nOptions {
                locale: Some("fr".into()),
                messages: None,
            })
        );
        assert_eq!(merged.storage.unwrap().user_key, None);
    }

    #[test]
    fn modal_renderables_are_replaced_not_merged() {
        let options = Options::from_json_str(r#"{ "modal": { "title": { "node": 1 }, "style": { "kind": "center" } } }"#).unwrap();
        let step = Options::from_json_str(r#"{ "modal": { "title": "Plain", "enabled": true } }"#).unwrap();
        let merged = merge_layers(&options, &step).modal.unwrap();
        assert_eq!(merged.title, Some(Renderable::Text("Plain".into())));
        assert_eq!(merged.style, Some(ModalStyle::Center));
        assert_eq!(merged.enabled, Some(true));
    }

    #[test]
    fn class_names_merge_key_wise() {
        let options = Options::from_json_str(r#"{ "classNames": { "tooltip": "a", "modal": "m" } }"#).unwrap();
        let step = Options::from_json_str(r#"{ "classNames": { "tooltip": "b" } }"#).unwrap();
        let merged = merge_layers(&options, &step).class_names.unwrap();
        assert_eq!(merged["tooltip"], "b");
        assert_eq!(merged["modal"], "m");
    }

    #[test]
    fn wait_interval_never_zero() {
        let options = Options {
            wait: Some(WaitOptions {
                interval_ms: Some(0),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(
            EffectiveConfig::from_options(&options).wait.interval,
            Duration::from_millis(1)
        );
    }

    #[test]
    fn spotlight_falls_back_to_backdrop() {
        let options = Options::from_json_str(r#"{ "backdrop": { "blur": 0, "opacity": 0.8 } }"#).unwrap();
        let cfg = EffectiveConfig::from_options(&options);
        assert_eq!(cfg.spotlight.blur, 0.0);
        assert_eq!(cfg.spotlight.dim_opacity, 0.8);
    }
}
