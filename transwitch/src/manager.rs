//! Translation source coordinator
//!
//! `TranslateManager` keeps a registry of backend factories, owns the active
//! backend, and routes every request through the same pipeline:
//!
//! 1. **Length guard** - texts over the ceiling get a refusal message
//! 2. **Cache lookup** - whole-text hits return without touching the backend
//! 3. **Chunking** - text is split into line-preserving, backend-sized pieces
//! 4. **Dispatch** - one deduplicated backend call per chunk, all concurrent
//! 5. **Reassembly** - results are joined with `\n` in the original order
//! 6. **Cache write** - detached, never awaited by the caller
//!
//! Progress and failures are reported as plain-string notifications. Backend
//! failures never surface as errors from `translate`/`link`: they resolve to
//! an empty string and the details go to the notification channel.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use transwitch::{MemoryStorage, MockMode, MockTranslator, TranslateManager, TranslateOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = TranslateManager::new(Arc::new(MemoryStorage::new()));
//!     manager.register("mock", || Ok(MockTranslator::new(MockMode::Suffix)))?;
//!     manager.set_source("mock")?;
//!
//!     let _sub = manager.on_translate(|tip| eprintln!("{}", tip));
//!     let result = manager.translate("Hello", &TranslateOptions::to("fr")).await?;
//!     println!("{}", result); // "Hello_fr"
//!     Ok(())
//! }
//! ```

use crate::config::ManagerConfig;
use crate::error::{MtError, MtResult};
use crate::events::{Subscription, TranslateEvents};
use crate::splitter::split_text;
use crate::storage::Storage;
use crate::translator::{LanguagePair, Translate, TranslateOptions};
use futures::future::{BoxFuture, FutureExt, Shared, try_join_all};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Builds a fresh backend each time its source is selected
pub type TranslatorFactory = Arc<dyn Fn() -> MtResult<Arc<dyn Translate>> + Send + Sync>;

type PendingTranslation = Shared<BoxFuture<'static, MtResult<String>>>;
type InFlightMap = Mutex<HashMap<String, InFlight>>;

struct InFlight {
    ticket: u64,
    pending: PendingTranslation,
}

#[derive(Default)]
struct ActiveSource {
    name: String,
    translator: Option<Arc<dyn Translate>>,
    /// Bumped on every switch so in-flight calls never cross backend instances
    epoch: u64,
}

/// Refusal returned (as a successful result) for texts over the ceiling
pub fn oversize_message(max_len: usize) -> String {
    format!(
        "There are more than {} characters with translation, please reduce the translation content.",
        max_len
    )
}

/// Cache key for a whole-text translation
///
/// Text containing the delimiter sequence can in theory collide with another
/// key; that risk is accepted.
pub fn cache_key(source: &str, pair: &LanguagePair, text: &str) -> String {
    format!("{}-from[{}]to[{}]-{}", source, pair.from, pair.to, text)
}

fn in_flight_key(source: &str, epoch: u64, pair: &LanguagePair, text: &str) -> String {
    format!("{}#{}-from[{}]to[{}]-{}", source, epoch, pair.from, pair.to, text)
}

pub struct TranslateManager {
    storage: Arc<dyn Storage>,
    registry: RwLock<Vec<(String, TranslatorFactory)>>,
    active: RwLock<ActiveSource>,
    in_flight: Arc<InFlightMap>,
    events: Arc<TranslateEvents>,
    max_len: AtomicUsize,
    options: RwLock<LanguagePair>,
    fallback_chunk_len: usize,
    request_timeout: Option<Duration>,
    next_ticket: AtomicU64,
}

impl TranslateManager {
    /// Create a manager with the default configuration
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self::with_config(storage, ManagerConfig::default())
    }

    pub fn with_config(storage: Arc<dyn Storage>, config: ManagerConfig) -> Self {
        Self {
            storage,
            registry: RwLock::new(Vec::new()),
            active: RwLock::new(ActiveSource::default()),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            events: Arc::new(TranslateEvents::new()),
            max_len: AtomicUsize::new(config.max_len),
            options: RwLock::new(config.default_options()),
            fallback_chunk_len: config.fallback_chunk_len.max(1),
            request_timeout: config.request_timeout(),
            next_ticket: AtomicU64::new(0),
        }
    }

    // ========== Registry ==========

    /// Register a backend factory under `name`
    ///
    /// Re-registering a name replaces its factory in place; an already active
    /// instance of that name is not affected. Returns all source names in
    /// registration order.
    pub fn register<F, T>(&self, name: &str, factory: F) -> MtResult<Vec<String>>
    where
        F: Fn() -> MtResult<T> + Send + Sync + 'static,
        T: Translate + 'static,
    {
        let factory: TranslatorFactory =
            Arc::new(move || factory().map(|t| Arc::new(t) as Arc<dyn Translate>));
        self.register_factory(name, factory)
    }

    pub fn register_factory(&self, name: &str, factory: TranslatorFactory) -> MtResult<Vec<String>> {
        if name.is_empty() {
            return Err(MtError::InvalidSource(
                "Source name cannot be empty".to_string(),
            ));
        }

        {
            let mut registry = self.registry.write().unwrap_or_else(|e| e.into_inner());
            match registry.iter_mut().find(|(n, _)| n == name) {
                Some(entry) => entry.1 = factory,
                None => registry.push((name.to_string(), factory)),
            }
        }
        debug!(source = name, "registered translation source");

        Ok(self.list_sources())
    }

    pub fn has_source(&self, name: &str) -> bool {
        self.registry
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .any(|(n, _)| n == name)
    }

    /// All registered source names, in registration order
    pub fn list_sources(&self) -> Vec<String> {
        self.registry
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(n, _)| n.clone())
            .collect()
    }

    fn factory(&self, name: &str) -> Option<TranslatorFactory> {
        self.registry
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, f)| Arc::clone(f))
    }

    // ========== Active source ==========

    /// Select the active source
    ///
    /// Selecting the current name again returns the existing instance without
    /// rebuilding it. An unregistered name is recorded and leaves no active
    /// backend (`Ok(None)`). A failing factory returns its error and leaves the
    /// previous selection in place.
    pub fn set_source(&self, name: &str) -> MtResult<Option<Arc<dyn Translate>>> {
        {
            let active = self.active.read().unwrap_or_else(|e| e.into_inner());
            if active.name == name {
                return Ok(active.translator.clone());
            }
        }

        let translator = match self.factory(name) {
            Some(factory) => Some(factory()?),
            None => None,
        };

        let mut active = self.active.write().unwrap_or_else(|e| e.into_inner());
        active.name = name.to_string();
        active.translator = translator.clone();
        active.epoch += 1;

        match &translator {
            Some(t) => info!(
                source = name,
                provider = t.provider_name(),
                "switched translation source"
            ),
            None => warn!(source = name, "selected unregistered translation source"),
        }

        Ok(translator)
    }

    /// The active backend
    pub fn translator(&self) -> MtResult<Arc<dyn Translate>> {
        self.active
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .translator
            .clone()
            .ok_or(MtError::NoActiveBackend)
    }

    /// Name of the selected source (empty when none was selected)
    pub fn current_source(&self) -> String {
        self.active
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .name
            .clone()
    }

    /// Whether the active backend can translate from `source_locale`
    pub fn supports_language(&self, source_locale: &str) -> bool {
        self.translator()
            .map(|t| t.is_supported(source_locale))
            .unwrap_or(false)
    }

    fn snapshot(&self) -> (String, Option<Arc<dyn Translate>>, u64) {
        let active = self.active.read().unwrap_or_else(|e| e.into_inner());
        (active.name.clone(), active.translator.clone(), active.epoch)
    }

    // ========== Settings ==========

    /// Longest text `translate` accepts, in characters
    pub fn max_len(&self) -> usize {
        self.max_len.load(Ordering::Relaxed)
    }

    pub fn set_max_len(&self, max_len: usize) {
        self.max_len.store(max_len, Ordering::Relaxed);
    }

    /// Default from/to used for fields a request leaves empty
    pub fn options(&self) -> LanguagePair {
        self.options
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn set_options(&self, options: LanguagePair) {
        *self.options.write().unwrap_or_else(|e| e.into_inner()) = options;
    }

    // ========== Notifications ==========

    /// Subscribe to progress and error tips
    pub fn on_translate<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.events.subscribe(listener)
    }

    /// Number of backend calls currently in flight
    pub fn pending_requests(&self) -> usize {
        self.in_flight.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    // ========== Translation ==========

    /// Translate `text` with the active backend
    ///
    /// Returns `Err` only for [`MtError::NoActiveBackend`]. Oversized input
    /// yields the refusal message; backend failures yield an empty string.
    /// Must be called from within a Tokio runtime.
    pub async fn translate(&self, text: &str, options: &TranslateOptions) -> MtResult<String> {
        let max_len = self.max_len();
        if text.chars().count() > max_len {
            debug!(max_len, "refusing oversized translation request");
            return Ok(oversize_message(max_len));
        }

        let pair = options.resolve(&self.options());
        let (source, translator, epoch) = self.snapshot();
        let key = cache_key(&source, &pair, text);

        if let Some(cached) = self.storage.get(&key).filter(|c| !c.is_empty()) {
            debug!(source = %source, "translation cache hit");
            return Ok(cached);
        }

        let translator = translator.ok_or(MtError::NoActiveBackend)?;
        let chunk_len = translator
            .max_len()
            .filter(|&n| n > 0)
            .unwrap_or(self.fallback_chunk_len);
        let chunks = split_text(text, chunk_len);
        debug!(
            source = %source,
            chunks = chunks.len(),
            chunk_len,
            "dispatching translation"
        );

        self.events.fire(&format!(
            "\n[Start translate]: Use '{}' translate source",
            source
        ));

        let pending: Vec<PendingTranslation> = chunks
            .into_iter()
            .map(|chunk| self.dispatch(&translator, &source, epoch, chunk, &pair))
            .collect();

        match try_join_all(pending).await {
            Ok(parts) => {
                let translated = parts.join("\n");
                self.events.fire(&format!(
                    "\n[{}]:\n{}\n[<============================>]:\n{}\n",
                    source, text, translated
                ));
                self.write_cache(key, translated.clone());
                Ok(translated)
            }
            Err(e) => {
                warn!(source = %source, error = %e, "translation failed");
                self.events.fire(&diagnostic(&e));
                Ok(String::new())
            }
        }
    }

    /// Build a link for `text` with the active backend
    ///
    /// Returns `Err` only for [`MtError::NoActiveBackend`]; a failing backend
    /// yields an empty string and a diagnostic notification.
    pub fn link(&self, text: &str, options: &TranslateOptions) -> MtResult<String> {
        let translator = self.translator()?;
        let pair = options.resolve(&self.options());

        match translator.link(text, &pair) {
            Ok(link) => Ok(link),
            Err(e) => {
                warn!(provider = translator.provider_name(), error = %e, "link failed");
                self.events.fire(&diagnostic(&e));
                Ok(String::new())
            }
        }
    }

    /// Start (or join) the backend call for one chunk
    fn dispatch(
        &self,
        translator: &Arc<dyn Translate>,
        source: &str,
        epoch: u64,
        text: String,
        pair: &LanguagePair,
    ) -> PendingTranslation {
        let key = in_flight_key(source, epoch, pair, &text);
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(entry) = in_flight.get(&key) {
            debug!(source, "joining in-flight request");
            return entry.pending.clone();
        }

        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
        let call = BackendCall {
            translator: Arc::clone(translator),
            text,
            pair: pair.clone(),
            source: source.to_string(),
            timeout: self.request_timeout,
            events: Arc::clone(&self.events),
            guard: InFlightGuard {
                map: Arc::clone(&self.in_flight),
                key: key.clone(),
                ticket,
            },
        };
        // The task runs to completion even if every caller stops waiting
        let task = tokio::spawn(call.run());
        let pending = async move {
            task.await
                .unwrap_or_else(|e| Err(MtError::Other(format!("translation task failed: {}", e))))
        }
        .boxed()
        .shared();

        in_flight.insert(
            key,
            InFlight {
                ticket,
                pending: pending.clone(),
            },
        );
        pending
    }

    fn write_cache(&self, key: String, value: String) {
        let storage = Arc::clone(&self.storage);
        tokio::spawn(async move {
            if let Err(e) = storage.update(&key, value).await {
                warn!(error = %e, "failed to write translation cache");
            }
        });
    }
}

impl std::fmt::Debug for TranslateManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslateManager")
            .field("sources", &self.list_sources())
            .field("current_source", &self.current_source())
            .field("max_len", &self.max_len())
            .field("options", &self.options())
            .field("pending_requests", &self.pending_requests())
            .finish()
    }
}

fn diagnostic(error: &MtError) -> String {
    serde_json::to_string(error).unwrap_or_else(|_| error.to_string())
}

/// One backend call, run as its own task
struct BackendCall {
    translator: Arc<dyn Translate>,
    text: String,
    pair: LanguagePair,
    source: String,
    timeout: Option<Duration>,
    events: Arc<TranslateEvents>,
    guard: InFlightGuard,
}

/// `Timeout` for `limit`, saturating at `u64::MAX` milliseconds
fn timeout_error(limit: Duration) -> MtError {
    MtError::Timeout(u64::try_from(limit.as_millis()).unwrap_or(u64::MAX))
}

impl BackendCall {
    async fn run(self) -> MtResult<String> {
        let call = self.translator.translate(&self.text, &self.pair);
        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .unwrap_or_else(|_| Err(timeout_error(limit))),
            None => call.await,
        };

        drop(self.guard);

        if let Err(e) = &result {
            warn!(source = %self.source, error = %e, "backend request failed");
            self.events.fire(&format!(
                "\n[{}]: request error:\n {} \n Try again later or change translate source.",
                self.source, e
            ));
        }
        result
    }
}

/// Removes its in-flight entry when dropped, including on panic
struct InFlightGuard {
    map: Arc<InFlightMap>,
    key: String,
    ticket: u64,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut map = self.map.lock().unwrap_or_else(|e| e.into_inner());
        if map.get(&self.key).is_some_and(|entry| entry.ticket == self.ticket) {
            map.remove(&self.key);
        }
    }
}
