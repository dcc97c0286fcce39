//! Localized strings for notification emails.
//!
//! Catalogs are flat JSON objects embedded at build time. Values may contain
//! `{{placeholders}}` that are filled by handlebars without HTML escaping.

use handlebars::Handlebars;
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;
use tracing::warn;

const CATALOGS: &[(&str, &str)] = &[
    ("en", include_str!("locales/en.json")),
    ("es", include_str!("locales/es.json")),
    ("ca", include_str!("locales/ca.json")),
];

#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Invalid catalog for {language}: {details}")]
    InvalidCatalog { language: String, details: String },
}

/// Every available catalog, loaded once.
pub struct I18n {
    catalogs: HashMap<String, HashMap<String, String>>,
    engine: Handlebars<'static>,
}

impl I18n {
    /// Load the embedded catalogs.
    pub fn new() -> Result<Self, TranslationError> {
        let mut catalogs = HashMap::new();
        for (language, raw) in CATALOGS {
            let catalog: HashMap<String, String> =
                serde_json::from_str(raw).map_err(|e| TranslationError::InvalidCatalog {
                    language: language.to_string(),
                    details: e.to_string(),
                })?;
            catalogs.insert(language.to_string(), catalog);
        }

        let mut engine = Handlebars::new();
        engine.register_escape_fn(handlebars::no_escape);

        Ok(Self { catalogs, engine })
    }

    /// Languages with a catalog.
    pub fn languages(&self) -> Vec<&str> {
        let mut languages: Vec<&str> = self.catalogs.keys().map(String::as_str).collect();
        languages.sort_unstable();
        languages
    }

    /// Translator for `tag`, falling back from a regional tag to its primary subtag.
    pub fn translator(&self, tag: &str) -> Result<Translator<'_>, TranslationError> {
        let primary = tag.split('-').next().unwrap_or(tag);

        [tag, primary]
            .into_iter()
            .find_map(|candidate| {
                self.catalogs
                    .get_key_value(candidate)
                    .or_else(|| {
                        self.catalogs
                            .iter()
                            .find(|(language, _)| language.eq_ignore_ascii_case(candidate))
                    })
            })
            .map(|(language, messages)| Translator {
                language: language.as_str(),
                messages,
                engine: &self.engine,
            })
            .ok_or_else(|| TranslationError::UnsupportedLanguage(tag.to_string()))
    }
}

/// Key lookup bound to one language.
pub struct Translator<'a> {
    language: &'a str,
    messages: &'a HashMap<String, String>,
    engine: &'a Handlebars<'static>,
}

impl Translator<'_> {
    pub fn language(&self) -> &str {
        self.language
    }

    /// Look up `key`. Missing keys render as the key itself.
    pub fn t(&self, key: &str) -> String {
        self.messages
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    /// Look up `key` and fill its placeholders from `args`.
    pub fn t_with<T: Serialize>(&self, key: &str, args: &T) -> String {
        let Some(template) = self.messages.get(key) else {
            return key.to_string();
        };

        self.engine
            .render_template(template, args)
            .unwrap_or_else(|e| {
                warn!(
                    key = %key,
                    language = %self.language,
                    error = %e,
                    "Failed to interpolate message"
                );
                template.clone()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_catalogs_load() {
        let i18n = I18n::new().unwrap();
        assert_eq!(i18n.languages(), vec!["ca", "en", "es"]);
    }

    #[test]
    fn test_catalogs_share_keys() {
        let i18n = I18n::new().unwrap();
        let en = &i18n.catalogs["en"];
        for language in ["es", "ca"] {
            let catalog = &i18n.catalogs[language];
            for key in en.keys() {
                assert!(catalog.contains_key(key), "{language} is missing {key}");
            }
        }
    }

    #[test]
    fn test_exact_and_primary_subtag() {
        let i18n = I18n::new().unwrap();
        assert_eq!(i18n.translator("es").unwrap().language(), "es");
        assert_eq!(i18n.translator("es-AR").unwrap().language(), "es");
        assert_eq!(i18n.translator("CA").unwrap().language(), "ca");
    }

    #[test]
    fn test_unsupported_language() {
        let i18n = I18n::new().unwrap();
        let err = i18n.translator("fr").err().unwrap();
        assert!(matches!(err, TranslationError::UnsupportedLanguage(ref tag) if tag == "fr"));
    }

    #[test]
    fn test_interpolation_is_not_escaped() {
        let i18n = I18n::new().unwrap();
        let t = i18n.translator("en").unwrap();
        assert_eq!(
            t.t_with("hello_name", &json!({ "name": "Ann & Bob" })),
            "Hello Ann & Bob,"
        );
    }

    #[test]
    fn test_missing_key_renders_as_key() {
        let i18n = I18n::new().unwrap();
        let t = i18n.translator("en").unwrap();
        assert_eq!(t.t("no_such_key"), "no_such_key");
        assert_eq!(t.t_with("no_such_key", &json!({})), "no_such_key");
    }
}
