#![forbid(unsafe_code)]

//! Internationalization (i18n) for Orbit.
//!
//! Provides the built-in button-label catalogs, locale detection from a
//! host language tag, and the [`Translate`] lookup the runtime uses to
//! resolve default labels.
//!
//! # Role in Orbit
//! The runtime only ever calls `t(key, fallback)`. Hosts may plug in their
//! own [`Translate`] implementation; [`Translator`] is the default, built
//! from the tour's `i18n` options.

pub mod catalog;

pub use catalog::{FALLBACK_LOCALE, LocaleStrings, StringCatalog};

use orbit_core::options::I18nOptions;

/// Translation lookup consumed by the runtime.
pub trait Translate {
    /// Resolve `key`, falling back to `fallback`, then to `key` itself.
    fn t(&self, key: &str, fallback: Option<&str>) -> String;
}

impl<F> Translate for F
where
    F: Fn(&str, Option<&str>) -> String,
{
    fn t(&self, key: &str, fallback: Option<&str>) -> String {
        self(key, fallback)
    }
}

/// Reduce a BCP 47 tag (`"de-AT"`) to a known base locale.
///
/// Returns [`FALLBACK_LOCALE`] when the tag is absent or its base language
/// has no table in `catalog`.
pub fn detect_locale(language_tag: Option<&str>, catalog: &StringCatalog) -> String {
    let Some(tag) = language_tag else {
        return FALLBACK_LOCALE.to_owned();
    };
    let lowered = tag.to_ascii_lowercase();
    let base = lowered
        .split(['-', '_'])
        .next()
        .unwrap_or(FALLBACK_LOCALE);
    if catalog.has_locale(base) {
        base.to_owned()
    } else {
        FALLBACK_LOCALE.to_owned()
    }
}

/// Catalog-backed translator for one locale.
#[derive(Debug, Clone)]
pub struct Translator {
    locale: String,
    catalog: StringCatalog,
}

impl Translator {
    /// Build from tour options.
    ///
    /// `host_language` is the host's preferred language tag (for example
    /// `navigator.language`), consulted only when the options name no locale.
    pub fn from_options(options: &I18nOptions, host_language: Option<&str>) -> Self {
        let mut catalog = StringCatalog::builtin();
        if let Some(messages) = &options.messages {
            catalog = catalog.with_overrides(messages);
        }
        let locale = match options.locale.as_deref() {
            Some(locale) if !locale.is_empty() => locale.to_owned(),
            _ => detect_locale(host_language, &catalog),
        };
        Self { locale, catalog }
    }

    /// English translator with the built-in catalog.
    pub fn english() -> Self {
        Self {
            locale: FALLBACK_LOCALE.to_owned(),
            catalog: StringCatalog::builtin(),
        }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    fn table_locale(&self) -> &str {
        if self.catalog.has_locale(&self.locale) {
            &self.locale
        } else {
            FALLBACK_LOCALE
        }
    }
}

impl Default for Translator {
    fn default() -> Self {
        Self::english()
    }
}

impl Translate for Translator {
    fn t(&self, key: &str, fallback: Option<&str>) -> String {
        self.catalog
            .get(self.table_locale(), key)
            .or(fallback)
            .unwrap_or(key)
            .to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn explicit_locale_wins() {
        let t = Translator::from_options(
            &I18nOptions {
                locale: Some("de".into()),
                messages: None,
            },
            Some("fr-FR"),
        );
        assert_eq!(t.locale(), "de");
        assert_eq!(t.t("next", None), "Weiter");
        assert_eq!(t.t("prev", None), "Zurück");
        assert_eq!(t.t("close", None), "Schließen");
    }

    #[test]
    fn detects_from_host_tag() {
        let t = Translator::from_options(&I18nOptions::default(), Some("tr-TR"));
        assert_eq!(t.locale(), "tr");
        assert_eq!(t.t("next", None), "İleri");
    }

    #[test]
    fn unknown_locale_uses_english_table() {
        let t = Translator::from_options(
            &I18nOptions {
                locale: Some("xx".into()),
                messages: None,
            },
            None,
        );
        assert_eq!(t.t("close", None), "Close");
    }

    #[test]
    fn missing_key_falls_back_then_echoes() {
        let t = Translator::english();
        assert_eq!(t.t("nope", Some("Fallback")), "Fallback");
        assert_eq!(t.t("nope", None), "nope");
    }

    #[test]
    fn custom_messages_add_locales() {
        let t = Translator::from_options(
            &I18nOptions {
                locale: Some("es".into()),
                messages: Some(BTreeMap::from([(
                    "es".to_string(),
                    BTreeMap::from([("next".to_string(), "Siguiente".to_string())]),
                )])),
            },
            None,
        );
        assert_eq!(t.t("next", None), "Siguiente");
        assert_eq!(t.t("prev", Some("Atrás")), "Atrás");
    }

    #[test]
    fn closures_translate() {
        let upper = |key: &str, _fallback: Option<&str>| key.to_uppercase();
        assert_eq!(upper.t("next", None), "NEXT");
    }

    #[test]
    fn detect_locale_defaults() {
        let catalog = StringCatalog::builtin();
        assert_eq!(detect_locale(None, &catalog), "en");
        assert_eq!(detect_locale(Some("DE_ch"), &catalog), "de");
        assert_eq!(detect_locale(Some("ja-JP"), &catalog), "en");
    }
}
