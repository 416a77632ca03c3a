//! Translation backend trait and utilities
//!
//! This module defines the `Translate` trait that every pluggable backend
//! implements, so the coordinator can switch between providers (Google
//! Translate, mock, ...) without coupling to any of them.
//!
//! # Example
//!
//! ```ignore
//! use transwitch::{LanguagePair, MockMode, MockTranslator, Translate};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = MockTranslator::new(MockMode::Suffix);
//!     let pair = LanguagePair::new("en", "fr");
//!
//!     let result = backend.translate("Hello", &pair).await?;
//!     println!("{}", result); // "Hello_fr"
//!     Ok(())
//! }
//! ```

use crate::error::{MtError, MtResult};
use async_trait::async_trait;

/// Source language used when neither the request nor the defaults name one
pub const AUTO_LOCALE: &str = "auto";

/// Resolved language options handed to a backend
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LanguagePair {
    pub from: String,
    pub to: String,
}

impl LanguagePair {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Whether the source language is left to the backend to detect
    pub fn is_auto(&self) -> bool {
        self.from.eq_ignore_ascii_case(AUTO_LOCALE)
    }
}

/// Per-request options; missing fields fall back to the manager's defaults
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslateOptions {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl TranslateOptions {
    /// Options targeting `to`, with the source language left to the defaults
    pub fn to(to: impl Into<String>) -> Self {
        Self {
            from: None,
            to: Some(to.into()),
        }
    }

    pub fn from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Fill missing fields from `defaults`
    pub fn resolve(&self, defaults: &LanguagePair) -> LanguagePair {
        LanguagePair {
            from: self
                .from
                .clone()
                .filter(|f| !f.is_empty())
                .unwrap_or_else(|| defaults.from.clone()),
            to: self
                .to
                .clone()
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| defaults.to.clone()),
        }
    }
}

/// Generic trait for translation backends
///
/// Implementations handle the actual translation work, whether through an
/// API (Google Translate) or deterministic logic (Mock). The coordinator
/// treats a backend as opaque and stateless.
#[async_trait]
pub trait Translate: Send + Sync {
    /// Translate a single text from `pair.from` to `pair.to`
    ///
    /// The coordinator never sends more than `max_len()` characters per call,
    /// except for a single line that is itself longer than the limit.
    async fn translate(&self, text: &str, pair: &LanguagePair) -> MtResult<String>;

    /// Build a link (usually a URL) showing the translation of `text`
    fn link(&self, text: &str, pair: &LanguagePair) -> MtResult<String>;

    /// Whether the backend can translate from `source_locale`
    fn is_supported(&self, _source_locale: &str) -> bool {
        true
    }

    /// Largest text length (in characters) accepted per call
    ///
    /// `None` or `Some(0)` lets the coordinator pick its fallback length.
    fn max_len(&self) -> Option<usize> {
        None
    }

    /// Get the name of this translation provider
    ///
    /// Used for logging and debugging.
    fn provider_name(&self) -> &str;
}

/// Normalize a locale code by stripping region information
///
/// Converts locale codes from BCP 47 format to ISO 639-1 format:
/// - `en-US` → `en`
/// - `zh-Hans` → `zh`
/// - `en` → `en` (unchanged)
pub fn normalize_locale(locale: &str) -> String {
    locale.split('-').next().unwrap_or(locale).to_lowercase()
}

/// Validate that a locale code is in acceptable format
///
/// Checks that the locale code contains only alphanumeric characters,
/// hyphens, and underscores.
pub fn validate_locale(locale: &str) -> MtResult<()> {
    if locale.is_empty() {
        return Err(MtError::InvalidLocale("Locale code is empty".to_string()));
    }

    if !locale
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(MtError::InvalidLocale(format!(
            "Invalid characters in locale code: {}",
            locale
        )));
    }

    Ok(())
}
