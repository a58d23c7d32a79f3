#![forbid(unsafe_code)]

//! Built-in label catalogs and locale-keyed string tables.

use std::collections::BTreeMap;

/// Locale used when detection fails or a locale has no table.
pub const FALLBACK_LOCALE: &str = "en";

const EN: &[(&str, &str)] = &[
    ("next", "Next"),
    ("prev", "Back"),
    ("close", "Close"),
    ("ok", "OK"),
    ("cancel", "Cancel"),
    ("title", "Tour"),
];

const TR: &[(&str, &str)] = &[
    ("next", "İleri"),
    ("prev", "Geri"),
    ("close", "Kapat"),
    ("ok", "Tamam"),
    ("cancel", "İptal"),
    ("title", "Tur"),
];

const DE: &[(&str, &str)] = &[
    ("next", "Weiter"),
    ("prev", "Zurück"),
    ("close", "Schließen"),
    ("ok", "OK"),
    ("cancel", "Abbrechen"),
    ("title", "Tour"),
];

const FR: &[(&str, &str)] = &[
    ("next", "Suivant"),
    ("prev", "Précédent"),
    ("close", "Fermer"),
    ("ok", "OK"),
    ("cancel", "Annuler"),
    ("title", "Visite"),
];

/// Strings for one locale.
pub type LocaleStrings = BTreeMap<String, String>;

/// All locale tables known to a translator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StringCatalog {
    locales: BTreeMap<String, LocaleStrings>,
}

impl StringCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// The catalog shipped with Orbit (`en`, `tr`, `de`, `fr`).
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for (locale, table) in [("en", EN), ("tr", TR), ("de", DE), ("fr", FR)] {
            catalog.insert_locale(
                locale,
                table
                    .iter()
                    .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                    .collect(),
            );
        }
        catalog
    }

    /// Add or replace a whole locale table.
    pub fn insert_locale(&mut self, locale: impl Into<String>, strings: LocaleStrings) {
        self.locales.insert(locale.into(), strings);
    }

    /// Overlay tables locale-by-locale: a supplied locale replaces the
    /// built-in table of the same name entirely.
    pub fn with_overrides(mut self, overrides: &BTreeMap<String, LocaleStrings>) -> Self {
        for (locale, strings) in overrides {
            self.insert_locale(locale.clone(), strings.clone());
        }
        self
    }

    pub fn has_locale(&self, locale: &str) -> bool {
        self.locales.contains_key(locale)
    }

    pub fn locale(&self, locale: &str) -> Option<&LocaleStrings> {
        self.locales.get(locale)
    }

    /// Look up `key` in `locale`.
    pub fn get(&self, locale: &str, key: &str) -> Option<&str> {
        self.locales
            .get(locale)
            .and_then(|strings| strings.get(key))
            .map(String::as_str)
    }

    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.locales.keys().map(String::as_str)
    }
}
