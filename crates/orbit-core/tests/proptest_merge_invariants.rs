//! Property-based invariant tests for the config merger.
//!
//! 1. Merging an empty step layer is the identity
//! 2. A leaf set on the step always wins
//! 3. A leaf left unset on the step keeps the options value
//! 4. Merging the same step layer twice equals merging it once
//! 5. Replaced groups never inherit options-side fields

use orbit_core::config::merge_layers;
use orbit_core::options::{
    I18nOptions, Options, Placement, SpotlightOptions, TooltipOptions, WaitOptions,
};
use proptest::prelude::*;

fn placement() -> impl Strategy<Value = Placement> {
    prop_oneof![
        Just(Placement::Auto),
        Just(Placement::Top),
        Just(Placement::Right),
        Just(Placement::Bottom),
        Just(Placement::Left),
    ]
}

fn tooltip() -> impl Strategy<Value = Option<TooltipOptions>> {
    proptest::option::of(
        (
            proptest::option::of(1.0f64..1000.0),
            proptest::option::of(placement()),
            proptest::option::of(0.0f64..50.0),
        )
            .prop_map(|(width, placement, offset)| TooltipOptions {
                width,
                placement,
                offset,
                labels: None,
            }),
    )
}

fn spotlight() -> impl Strategy<Value = Option<SpotlightOptions>> {
    proptest::option::of(
        (
            proptest::option::of(0.0f64..40.0),
            proptest::option::of(0.0f64..40.0),
        )
            .prop_map(|(padding, border_radius)| SpotlightOptions {
                padding,
                border_radius,
                ..Default::default()
            }),
    )
}

fn wait() -> impl Strategy<Value = Option<WaitOptions>> {
    proptest::option::of(
        (
            proptest::option::of(0u64..20_000),
            proptest::option::of(1u64..1_000),
            proptest::option::of(any::<bool>()),
        )
            .prop_map(|(timeout_ms, interval_ms, scroll)| WaitOptions {
                timeout_ms,
                interval_ms,
                scroll,
            }),
    )
}

fn i18n() -> impl Strategy<Value = Option<I18nOptions>> {
    proptest::option::of(proptest::option::of("[a-z]{2}").prop_map(|locale| I18nOptions {
        locale,
        messages: None,
    }))
}

fn layer() -> impl Strategy<Value = Options> {
    (tooltip(), spotlight(), wait(), i18n()).prop_map(|(tooltip, spotlight, wait, i18n)| {
        Options {
            tooltip,
            spotlight,
            wait,
            i18n,
            ..Default::default()
        }
    })
}

proptest! {
    #[test]
    fn empty_step_layer_is_identity(options in layer()) {
        prop_assert_eq!(merge_layers(&options, &Options::default()), options);
    }

    #[test]
    fn step_leaf_wins(options in layer(), step in layer()) {
        let merged = merge_layers(&options, &step);
        if let Some(width) = step.tooltip.as_ref().and_then(|t| t.width) {
            prop_assert_eq!(merged.tooltip.as_ref().and_then(|t| t.width), Some(width));
        }
        if let Some(timeout) = step.wait.as_ref().and_then(|w| w.timeout_ms) {
            prop_assert_eq!(merged.wait.as_ref().and_then(|w| w.timeout_ms), Some(timeout));
        }
    }

    #[test]
    fn unset_step_leaf_keeps_option(options in layer(), step in layer()) {
        let merged = merge_layers(&options, &step);
        let step_width = step.tooltip.as_ref().and_then(|t| t.width);
        if step_width.is_none() {
            prop_assert_eq!(
                merged.tooltip.as_ref().and_then(|t| t.width),
                options.tooltip.as_ref().and_then(|t| t.width)
            );
        }
        let step_padding = step.spotlight.as_ref().and_then(|s| s.padding);
        if step_padding.is_none() {
            prop_assert_eq!(
                merged.spotlight.as_ref().and_then(|s| s.padding),
                options.spotlight.as_ref().and_then(|s| s.padding)
            );
        }
    }

    #[test]
    fn merge_is_idempotent(options in layer(), step in layer()) {
        let once = merge_layers(&options, &step);
        let twice = merge_layers(&once, &step);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn replaced_group_is_step_value(options in layer(), step in layer()) {
        let merged = merge_layers(&options, &step);
        if step.i18n.is_some() {
            prop_assert_eq!(merged.i18n, step.i18n);
        } else {
            prop_assert_eq!(merged.i18n, options.i18n);
        }
    }
}
