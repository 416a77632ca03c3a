//! Google Translate API provider
//!
//! This module integrates with Google Translate API v2 as a `Translate`
//! backend for the coordinator.
//!
//! # Authentication
//!
//! The provider loads the API key from the `GOOGLE_TRANSLATE_API_KEY`
//! environment variable. Obtain a key from:
//! https://console.cloud.google.com/
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use transwitch::{MemoryStorage, TranslateManager, TranslateOptions};
//! use transwitch_mt::GoogleTranslateProvider;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = TranslateManager::new(Arc::new(MemoryStorage::new()));
//!     manager.register("google", GoogleTranslateProvider::from_env)?;
//!     manager.set_source("google")?;
//!
//!     let result = manager.translate("Hello, world!", &TranslateOptions::to("fr")).await?;
//!     println!("{}", result);
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use reqwest::Url;
use serde_json::json;
use transwitch::{
    LanguagePair, MtError, MtResult, Translate, normalize_locale, validate_locale,
};

const API_URL: &str = "https://translation.googleapis.com/language/translate/v2";
const WEB_URL: &str = "https://translate.google.com/";

/// Google Translate API v2 provider
#[derive(Clone)]
pub struct GoogleTranslateProvider {
    /// API key for authentication
    api_key: String,
    client: reqwest::Client,
    base_url: String,
}

impl GoogleTranslateProvider {
    /// Maximum characters sent per request
    ///
    /// The API accepts more, but smaller requests keep latency predictable;
    /// the coordinator chunks longer documents to this size.
    pub const MAX_CHARS_PER_REQUEST: usize = 5000;

    /// Create a new GoogleTranslateProvider with an explicit API key
    ///
    /// # Returns
    ///
    /// * `Ok(Self)` - New provider instance
    /// * `Err(MtError)` - If API key is empty or HTTP client creation fails
    pub fn new(api_key: String) -> MtResult<Self> {
        if api_key.trim().is_empty() {
            return Err(MtError::ConfigError("API key cannot be empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| MtError::NetworkError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            client,
            base_url: API_URL.to_string(),
        })
    }

    /// Create a GoogleTranslateProvider from the `GOOGLE_TRANSLATE_API_KEY` environment variable
    pub fn from_env() -> MtResult<Self> {
        let api_key = std::env::var("GOOGLE_TRANSLATE_API_KEY").map_err(|_| {
            MtError::BackendInit(
                "GOOGLE_TRANSLATE_API_KEY environment variable not set".to_string(),
            )
        })?;

        Self::new(api_key)
    }

    /// Create a provider that can only build links
    ///
    /// `link` needs no credentials; `translate` fails with a `ConfigError`.
    pub fn link_only() -> Self {
        Self {
            api_key: String::new(),
            client: reqwest::Client::new(),
            base_url: API_URL.to_string(),
        }
    }

    /// Point the provider at a different endpoint (proxies, test servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Request body for a single text; `auto` lets the API detect the source
    fn request_body(text: &str, pair: &LanguagePair) -> serde_json::Value {
        let mut body = json!({
            "q": [text],
            "target": google_locale(&pair.to),
            "format": "text"
        });
        if !pair.is_auto() {
            body["source"] = json!(google_locale(&pair.from));
        }
        body
    }

    /// Extract the translated text from an API response
    fn parse_response(json: &serde_json::Value) -> MtResult<String> {
        let translations = json["data"]["translations"].as_array().ok_or_else(|| {
            MtError::TranslationError(
                "Invalid API response: missing 'data.translations' array".to_string(),
            )
        })?;

        translations
            .first()
            .and_then(|t| t["translatedText"].as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| {
                MtError::TranslationError(
                    "Invalid API response: missing 'translatedText' field".to_string(),
                )
            })
    }

    async fn request(&self, text: &str, pair: &LanguagePair) -> MtResult<String> {
        if self.api_key.is_empty() {
            return Err(MtError::ConfigError(
                "GOOGLE_TRANSLATE_API_KEY is required to translate".to_string(),
            ));
        }
        let url = format!("{}?key={}", self.base_url, self.api_key);

        let response = self
            .client
            .post(&url)
            .json(&Self::request_body(text, pair))
            .send()
            .await
            .map_err(|e| MtError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            return Err(if status.is_client_error() {
                MtError::ConfigError(format!("API client error ({}): {}", status, error_text))
            } else {
                MtError::TranslationError(format!("API server error ({}): {}", status, error_text))
            });
        }

        let json: serde_json::Value = response.json().await.map_err(|e| {
            MtError::TranslationError(format!("Failed to parse API response: {}", e))
        })?;

        Self::parse_response(&json)
    }
}

/// Map a locale onto the code Google Translate expects
///
/// Chinese keeps its script: `zh-TW`, `zh-HK` and `zh-Hant` map to `zh-TW`,
/// every other `zh` variant to `zh-CN`. Other locales drop their region.
fn google_locale(locale: &str) -> String {
    let lower = locale.replace('_', "-").to_lowercase();
    let mut parts = lower.split('-');
    if parts.next() != Some("zh") {
        return normalize_locale(&lower);
    }
    if parts.any(|p| matches!(p, "tw" | "hk" | "mo" | "hant")) {
        "zh-TW".to_string()
    } else {
        "zh-CN".to_string()
    }
}

impl std::fmt::Debug for GoogleTranslateProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleTranslateProvider")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl Translate for GoogleTranslateProvider {
    async fn translate(&self, text: &str, pair: &LanguagePair) -> MtResult<String> {
        validate_locale(&pair.from)?;
        validate_locale(&pair.to)?;

        if text.is_empty() {
            return Ok(String::new());
        }

        if text.chars().count() > Self::MAX_CHARS_PER_REQUEST {
            return Err(MtError::TranslationError(format!(
                "Text exceeds maximum length of {} characters",
                Self::MAX_CHARS_PER_REQUEST
            )));
        }

        self.request(text, pair).await
    }

    fn link(&self, text: &str, pair: &LanguagePair) -> MtResult<String> {
        validate_locale(&pair.from)?;
        validate_locale(&pair.to)?;

        let source = if pair.is_auto() {
            "auto".to_string()
        } else {
            google_locale(&pair.from)
        };
        let target = google_locale(&pair.to);

        Url::parse_with_params(
            WEB_URL,
            &[
                ("sl", source.as_str()),
                ("tl", target.as_str()),
                ("text", text),
                ("op", "translate"),
            ],
        )
        .map(|url| url.to_string())
        .map_err(|e| MtError::LinkError(format!("Failed to build link: {}", e)))
    }

    fn is_supported(&self, source_locale: &str) -> bool {
        validate_locale(source_locale).is_ok()
    }

    fn max_len(&self) -> Option<usize> {
        Some(Self::MAX_CHARS_PER_REQUEST)
    }

    fn provider_name(&self) -> &str {
        "Google Translate"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> GoogleTranslateProvider {
        GoogleTranslateProvider::new("test-key".to_string()).unwrap()
    }

    // ========== Initialization Tests ==========

    #[test]
    fn test_new_with_valid_key() {
        let provider = GoogleTranslateProvider::new("test-api-key".to_string());
        assert!(provider.is_ok());
        assert_eq!(provider.unwrap().provider_name(), "Google Translate");
    }

    #[test]
    fn test_new_with_empty_key() {
        match GoogleTranslateProvider::new("   ".to_string()) {
            Err(MtError::ConfigError(msg)) => assert!(msg.contains("empty")),
            other => panic!("Expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_from_env_without_key() {
        unsafe {
            std::env::remove_var("GOOGLE_TRANSLATE_API_KEY");
        }
        match GoogleTranslateProvider::from_env() {
            Err(MtError::BackendInit(msg)) => assert!(msg.contains("not set")),
            other => panic!("Expected BackendInit, got {:?}", other),
        }
    }

    // ========== Request/Response Tests ==========

    #[test]
    fn test_request_body_omits_auto_source() {
        let body = GoogleTranslateProvider::request_body("hi", &LanguagePair::new("auto", "zh-CN"));
        assert_eq!(body["target"], "zh-CN");
        assert_eq!(body["q"][0], "hi");
        assert!(body.get("source").is_none());
    }

    #[test]
    fn test_request_body_with_source() {
        let body = GoogleTranslateProvider::request_body("hi", &LanguagePair::new("en-US", "fr"));
        assert_eq!(body["source"], "en");
        assert_eq!(body["format"], "text");
    }

    #[test]
    fn test_request_body_keeps_traditional_chinese() {
        let body = GoogleTranslateProvider::request_body("hi", &LanguagePair::new("zh-cn", "zh-TW"));
        assert_eq!(body["target"], "zh-TW");
        assert_eq!(body["source"], "zh-CN");
    }

    #[test]
    fn test_google_locale() {
        assert_eq!(google_locale("zh"), "zh-CN");
        assert_eq!(google_locale("zh-Hans"), "zh-CN");
        assert_eq!(google_locale("zh_TW"), "zh-TW");
        assert_eq!(google_locale("zh-Hant-HK"), "zh-TW");
        assert_eq!(google_locale("en-GB"), "en");
        assert_eq!(google_locale("fr"), "fr");
    }

    #[test]
    fn test_parse_response() {
        let json = json!({"data": {"translations": [{"translatedText": "Bonjour"}]}});
        assert_eq!(GoogleTranslateProvider::parse_response(&json).unwrap(), "Bonjour");
    }

    #[test]
    fn test_parse_response_missing_fields() {
        let json = json!({"data": {}});
        assert!(GoogleTranslateProvider::parse_response(&json).is_err());

        let json = json!({"data": {"translations": [{}]}});
        match GoogleTranslateProvider::parse_response(&json) {
            Err(MtError::TranslationError(msg)) => assert!(msg.contains("translatedText")),
            other => panic!("Expected TranslationError, got {:?}", other),
        }
    }

    // ========== Validation Tests ==========

    #[tokio::test]
    async fn test_translate_empty_text() {
        let result = provider()
            .translate("", &LanguagePair::new("en", "fr"))
            .await
            .unwrap();
        assert_eq!(result, "");
    }

    #[tokio::test]
    async fn test_translate_invalid_locale() {
        let result = provider()
            .translate("hello", &LanguagePair::new("en", "invalid#code"))
            .await;
        assert!(matches!(result, Err(MtError::InvalidLocale(_))));
    }

    #[tokio::test]
    async fn test_translate_text_too_long() {
        let long_text = "x".repeat(GoogleTranslateProvider::MAX_CHARS_PER_REQUEST + 1);
        match provider()
            .translate(&long_text, &LanguagePair::new("en", "fr"))
            .await
        {
            Err(MtError::TranslationError(msg)) => assert!(msg.contains("exceeds maximum")),
            other => panic!("Expected TranslationError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_error() {
        let provider = provider().with_base_url("http://127.0.0.1:9/translate");
        let result = provider
            .translate("hello", &LanguagePair::new("en", "fr"))
            .await;
        assert!(matches!(result, Err(MtError::NetworkError(_))));
    }

    // ========== Link Tests ==========

    #[test]
    fn test_link_encodes_text() {
        let link = provider()
            .link("hello world & more", &LanguagePair::new("auto", "zh-CN"))
            .unwrap();
        assert!(link.starts_with("https://translate.google.com/?"));
        assert!(link.contains("sl=auto"));
        assert!(link.contains("tl=zh-CN"));
        assert!(link.contains("text=hello+world+%26+more"));
    }

    #[test]
    fn test_link_keeps_traditional_chinese() {
        let link = provider()
            .link("hello", &LanguagePair::new("en", "zh-TW"))
            .unwrap();
        assert!(link.contains("sl=en"));
        assert!(link.contains("tl=zh-TW"));
    }

    #[tokio::test]
    async fn test_link_only_provider() {
        let provider = GoogleTranslateProvider::link_only();
        let link = provider
            .link("hello", &LanguagePair::new("auto", "fr"))
            .unwrap();
        assert!(link.contains("tl=fr"));

        match provider
            .translate("hello", &LanguagePair::new("en", "fr"))
            .await
        {
            Err(MtError::ConfigError(msg)) => assert!(msg.contains("GOOGLE_TRANSLATE_API_KEY")),
            other => panic!("Expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_link_invalid_locale() {
        assert!(provider().link("hi", &LanguagePair::new("en", "")).is_err());
    }

    // ========== Capability Tests ==========

    #[test]
    fn test_capabilities() {
        let provider = provider();
        assert_eq!(provider.max_len(), Some(5000));
        assert!(provider.is_supported("en"));
        assert!(!provider.is_supported("en@bad"));
    }

    #[test]
    fn test_debug_output() {
        let debug_str = format!("{:?}", provider());
        assert!(debug_str.contains("***"));
        assert!(!debug_str.contains("test-key"));
    }

    // ========== Integration Tests (require real API key) ==========

    #[tokio::test]
    #[ignore] // Run with: cargo test --ignored
    async fn test_real_api_single_translation() {
        if std::env::var("GOOGLE_TRANSLATE_API_KEY").is_err() {
            eprintln!("Skipping: GOOGLE_TRANSLATE_API_KEY not set");
            return;
        }

        let provider = GoogleTranslateProvider::from_env().unwrap();
        let result = provider
            .translate("Hello", &LanguagePair::new("en", "fr"))
            .await
            .unwrap();
        println!("Translation: {} → {}", "Hello", result);
        assert!(!result.is_empty());
    }

    #[tokio::test]
    #[ignore] // Run with: cargo test --ignored
    async fn test_real_api_auto_detect() {
        if std::env::var("GOOGLE_TRANSLATE_API_KEY").is_err() {
            eprintln!("Skipping: GOOGLE_TRANSLATE_API_KEY not set");
            return;
        }

        let provider = GoogleTranslateProvider::from_env().unwrap();
        let result = provider
            .translate("Guten Morgen", &LanguagePair::new("auto", "en"))
            .await
            .unwrap();
        assert!(!result.is_empty());
    }

    #[tokio::test]
    #[ignore] // Run with: cargo test --ignored
    async fn test_real_api_invalid_key() {
        let provider = GoogleTranslateProvider::new("invalid-key-xyz".to_string()).unwrap();
        let result = provider
            .translate("hello", &LanguagePair::new("en", "fr"))
            .await;

        match result {
            Err(MtError::ConfigError(_)) | Err(MtError::TranslationError(_)) => {}
            other => panic!("Expected error from invalid API key, got {:?}", other),
        }
    }
}
