//! Localized error messages
//!
//! Errors describe themselves as a [`MessageTemplate`]: a stable English key
//! and positional `%s` parameters. A [`Translation`] maps those keys to
//! another language and substitutes the parameters.
//!
//! Built-in languages: `en` and `pt-BR`.
//!
//! # Examples
//!
//! ```rust
//! use acton_upload::error::MessageTemplate;
//! use acton_upload::translation::Translation;
//!
//! let pt = Translation::new("pt-BR").unwrap();
//! assert_eq!(pt.message("File already exists", &[] as &[&str]), "Arquivo já existe");
//!
//! let template = MessageTemplate::with_params(
//!     "Cannot find uploaded file(s) identified by key: %s",
//!     ["avatar"],
//! );
//! assert_eq!(
//!     pt.render(&template),
//!     "Não foi possível encontrar o(s) arquivo(s) enviado(s) com a chave: avatar"
//! );
//! ```

mod messages;

use crate::error::{substitute, MessageTemplate};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use thiserror::Error;

type Table = HashMap<&'static str, &'static str>;

static TABLES: Lazy<Vec<(&'static str, Table)>> = Lazy::new(|| {
    vec![
        ("en", messages::EN.iter().copied().collect()),
        ("pt-BR", messages::PT_BR.iter().copied().collect()),
    ]
});

/// Errors raised while loading a translation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TranslationError {
    /// No built-in table for the requested language
    #[error("Cannot find translation file for language: {0}")]
    UnknownLanguage(String),
}

/// A message table for one language
#[derive(Debug, Clone)]
pub struct Translation {
    language: &'static str,
    messages: &'static Table,
}

impl Translation {
    /// Loads the built-in table for `language`
    ///
    /// Language tags match case-insensitively and `_` may stand in for `-`.
    ///
    /// # Errors
    ///
    /// Returns [`TranslationError::UnknownLanguage`] if no table exists.
    pub fn new(language: &str) -> Result<Self, TranslationError> {
        let wanted = language.replace('_', "-");
        TABLES
            .iter()
            .find(|(tag, _)| tag.eq_ignore_ascii_case(&wanted))
            .map(|(tag, messages)| Self {
                language: *tag,
                messages,
            })
            .ok_or_else(|| TranslationError::UnknownLanguage(language.to_string()))
    }

    /// Languages with a built-in table
    pub fn languages() -> impl Iterator<Item = &'static str> {
        TABLES.iter().map(|(tag, _)| *tag)
    }

    /// Canonical tag of the loaded language
    #[must_use]
    pub const fn language(&self) -> &'static str {
        self.language
    }

    /// Looks up `key` and substitutes `params`
    ///
    /// An unknown key is used as its own translation.
    #[must_use]
    pub fn message<P: AsRef<str>>(&self, key: &str, params: &[P]) -> String {
        let localized = self.messages.get(key).copied().unwrap_or(key);
        substitute(localized, params)
    }

    /// Renders `template` in this language
    #[must_use]
    pub fn render(&self, template: &MessageTemplate) -> String {
        self.message(template.key(), template.params())
    }
}

impl Default for Translation {
    fn default() -> Self {
        Self {
            language: TABLES[0].0,
            messages: &TABLES[0].1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InputError;
    use crate::intake::UploadErrorCode;
    use crate::storage::StorageError;
    use crate::validation::ValidationError;

    const NO_PARAMS: &[&str] = &[];

    #[test]
    fn test_unknown_language() {
        let err = Translation::new("xx").unwrap_err();
        assert_eq!(err, TranslationError::UnknownLanguage("xx".to_string()));
        assert_eq!(err.to_string(), "Cannot find translation file for language: xx");
    }

    #[test]
    fn test_language_tags() {
        assert_eq!(Translation::new("pt_br").unwrap().language(), "pt-BR");
        assert_eq!(Translation::new("EN").unwrap().language(), "en");
        assert_eq!(Translation::default().language(), "en");
        assert_eq!(Translation::languages().collect::<Vec<_>>(), ["en", "pt-BR"]);
    }

    #[test]
    fn test_english_is_identity() {
        let en = Translation::new("en").unwrap();
        let templates = vec![
            InputError::MissingField("docs".to_string()).template(),
            ValidationError::TooLarge { size: 9, max: 5 }.template(),
            ValidationError::UploadChannel(UploadErrorCode::Partial).template(),
            StorageError::EmptyName.template(),
        ];

        for template in templates {
            assert_eq!(en.render(&template), template.render());
        }
    }

    #[test]
    fn test_every_english_key_is_translated() {
        let pt = Translation::new("pt-BR").unwrap();
        for (key, _) in messages::EN {
            assert!(pt.messages.contains_key(key), "missing pt-BR message for {key:?}");
        }
        assert_eq!(messages::EN.len(), messages::PT_BR.len());
    }

    #[test]
    fn test_placeholders_survive_translation() {
        for (key, localized) in messages::PT_BR {
            assert_eq!(
                key.matches("%s").count(),
                localized.matches("%s").count(),
                "placeholder count differs for {key:?}"
            );
        }
    }

    #[test]
    fn test_portuguese_with_params() {
        let pt = Translation::new("pt-BR").unwrap();
        let template = ValidationError::WidthMismatch {
            actual: 10,
            expected: 20,
        }
        .template();

        assert_eq!(
            pt.render(&template),
            "Largura da imagem (10px) não corresponde à largura exigida (20px)"
        );
        assert_eq!(pt.message("No file was uploaded", NO_PARAMS), "Nenhum arquivo enviado");
    }

    #[test]
    fn test_unknown_key_is_returned_unchanged() {
        let pt = Translation::new("pt-BR").unwrap();
        assert_eq!(pt.message("Bucket %s is full", &["avatars"]), "Bucket avatars is full");
        assert_eq!(pt.message("Something else", NO_PARAMS), "Something else");
    }
}
