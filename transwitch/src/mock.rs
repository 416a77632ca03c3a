//! Mock translation backend for testing
//!
//! This module provides a deterministic, API-free backend for exercising the
//! coordinator without API keys or network access.
//!
//! # Example
//!
//! ```ignore
//! use transwitch::{LanguagePair, MockMode, MockTranslator, Translate};
//!
//! #[tokio::test]
//! async fn test_translation() {
//!     let mock = MockTranslator::new(MockMode::Suffix);
//!     let result = mock.translate("hello", &LanguagePair::new("en", "fr")).await.unwrap();
//!     assert_eq!(result, "hello_fr");
//! }
//! ```

use crate::error::{MtError, MtResult};
use crate::translator::{LanguagePair, Translate};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock translation modes for testing different scenarios
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Append locale suffix: "hello" → "hello_fr"
    Suffix,

    /// Replace every line with the given text, keeping the line count
    PerLine(String),

    /// Fail every call with the given message
    Error(String),

    /// Fail calls whose text contains the given marker, `Suffix` otherwise
    FailOn(String),

    /// No-op: return input unchanged
    NoOp,
}

/// Shared record of the calls made to one or more mock instances
///
/// Factories build a fresh backend on each source switch, so tests hand the
/// same log to every instance they create.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<AtomicUsize>,
    inputs: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `translate` calls
    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Texts passed to `translate`, in call order
    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn record(&self, text: &str) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inputs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(text.to_string());
    }
}

/// Mock backend that simulates various translation scenarios
#[derive(Debug, Clone)]
pub struct MockTranslator {
    mode: MockMode,
    /// Optional simulated network delay (in milliseconds)
    delay_ms: u64,
    max_len: Option<usize>,
    log: CallLog,
}

impl MockTranslator {
    pub fn new(mode: MockMode) -> Self {
        Self {
            mode,
            delay_ms: 0,
            max_len: None,
            log: CallLog::default(),
        }
    }

    /// Create a MockTranslator with simulated network delay
    pub fn with_delay(mode: MockMode, delay_ms: u64) -> Self {
        Self {
            delay_ms,
            ..Self::new(mode)
        }
    }

    /// Advertise `max_len` as the per-call limit
    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len);
        self
    }

    /// Record calls into `log` instead of a private one
    pub fn with_call_log(mut self, log: CallLog) -> Self {
        self.log = log;
        self
    }

    async fn apply_delay(&self) {
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }
    }

    fn apply_translation(&self, text: &str, pair: &LanguagePair) -> MtResult<String> {
        let target = pair.to.as_str();
        match &self.mode {
            MockMode::Suffix => Ok(format!("{}_{}", text, target)),
            MockMode::PerLine(line) => Ok(text
                .split('\n')
                .map(|_| line.as_str())
                .collect::<Vec<_>>()
                .join("\n")),
            MockMode::Error(msg) => Err(MtError::TranslationError(msg.clone())),
            MockMode::FailOn(marker) if text.contains(marker.as_str()) => Err(
                MtError::TranslationError(format!("refused text containing '{}'", marker)),
            ),
            MockMode::FailOn(_) => Ok(format!("{}_{}", text, target)),
            MockMode::NoOp => Ok(text.to_string()),
        }
    }
}

#[async_trait]
impl Translate for MockTranslator {
    async fn translate(&self, text: &str, pair: &LanguagePair) -> MtResult<String> {
        self.log.record(text);
        self.apply_delay().await;
        self.apply_translation(text, pair)
    }

    fn link(&self, text: &str, pair: &LanguagePair) -> MtResult<String> {
        if let MockMode::Error(msg) = &self.mode {
            return Err(MtError::LinkError(msg.clone()));
        }
        Ok(format!("mock://translate/{}/{}/{}", pair.from, pair.to, text))
    }

    fn max_len(&self) -> Option<usize> {
        self.max_len
    }

    fn provider_name(&self) -> &str {
        "Mock Translator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn en_fr() -> LanguagePair {
        LanguagePair::new("en", "fr")
    }

    #[tokio::test]
    async fn test_suffix_translation() {
        let mock = MockTranslator::new(MockMode::Suffix);
        assert_eq!(mock.translate("hello", &en_fr()).await.unwrap(), "hello_fr");
    }

    #[tokio::test]
    async fn test_per_line_keeps_line_count() {
        let mock = MockTranslator::new(MockMode::PerLine("你好".to_string()));
        let result = mock.translate("a\nb\n\nc", &en_fr()).await.unwrap();
        assert_eq!(result, "你好\n你好\n你好\n你好");
    }

    #[tokio::test]
    async fn test_error_mode() {
        let mock = MockTranslator::new(MockMode::Error("API unavailable".to_string()));
        match mock.translate("hello", &en_fr()).await {
            Err(MtError::TranslationError(msg)) => assert_eq!(msg, "API unavailable"),
            other => panic!("Expected TranslationError, got {:?}", other),
        }
        assert!(matches!(mock.link("hello", &en_fr()), Err(MtError::LinkError(_))));
    }

    #[tokio::test]
    async fn test_fail_on_marker() {
        let mock = MockTranslator::new(MockMode::FailOn("BAD".to_string()));
        assert_eq!(mock.translate("fine", &en_fr()).await.unwrap(), "fine_fr");
        assert!(mock.translate("this is BAD", &en_fr()).await.is_err());
    }

    #[tokio::test]
    async fn test_noop_returns_unchanged() {
        let mock = MockTranslator::new(MockMode::NoOp);
        assert_eq!(mock.translate("Hello world", &en_fr()).await.unwrap(), "Hello world");
    }

    #[tokio::test]
    async fn test_call_log_is_shared_between_instances() {
        let log = CallLog::new();
        let a = MockTranslator::new(MockMode::Suffix).with_call_log(log.clone());
        let b = MockTranslator::new(MockMode::Suffix).with_call_log(log.clone());

        a.translate("one", &en_fr()).await.unwrap();
        b.translate("two", &en_fr()).await.unwrap();

        assert_eq!(log.count(), 2);
        assert_eq!(log.inputs(), vec!["one", "two"]);
    }

    #[tokio::test]
    async fn test_delay_adds_latency() {
        let mock = MockTranslator::with_delay(MockMode::Suffix, 50);
        let start = std::time::Instant::now();
        mock.translate("hello", &en_fr()).await.unwrap();
        assert!(start.elapsed().as_millis() >= 50);
    }

    #[test]
    fn test_link_and_metadata() {
        let mock = MockTranslator::new(MockMode::Suffix).with_max_len(1000);
        assert_eq!(
            mock.link("hi", &en_fr()).unwrap(),
            "mock://translate/en/fr/hi"
        );
        assert_eq!(mock.max_len(), Some(1000));
        assert!(mock.is_supported("de"));
        assert_eq!(mock.provider_name(), "Mock Translator");
    }
}
