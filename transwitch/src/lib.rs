//! Coordinator for switchable translation backends
//!
//! A host registers any number of translation backends by name, switches the
//! active one at runtime, and sends `translate`/`link` requests through a
//! single [`TranslateManager`], which adds:
//!
//! - whole-text caching through a pluggable [`Storage`]
//! - deduplication of identical concurrent backend calls
//! - line-preserving chunking for length-limited backends ([`split_text`])
//! - progress and error notifications ([`TranslateEvents`])
//!
//! Backends implement the [`Translate`] trait. [`MockTranslator`] is a
//! deterministic backend for tests; network providers live in `transwitch-mt`.

pub mod config;
pub mod error;
pub mod events;
pub mod manager;
pub mod mock;
pub mod splitter;
pub mod storage;
pub mod translator;


pub use config::ManagerConfig;
pub use error::{MtError, MtResult};
pub use events::{Subscription, TranslateEvents};
pub use manager::{TranslateManager, TranslatorFactory, cache_key, oversize_message};
pub use mock::{CallLog, MockMode, MockTranslator};
pub use splitter::split_text;
pub use storage::{MemoryStorage, Storage};
pub use translator::{
    AUTO_LOCALE, LanguagePair, Translate, TranslateOptions, normalize_locale, validate_locale,
};
