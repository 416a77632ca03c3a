//! Machine translation providers for transwitch
//!
//! This crate plugs network backends into the `transwitch` coordinator and
//! ships the `transwitch` command line tool.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use transwitch_mt::{GoogleTranslateProvider, MemoryStorage, TranslateManager, TranslateOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = TranslateManager::new(Arc::new(MemoryStorage::new()));
//!     manager.register("google", GoogleTranslateProvider::from_env)?;
//!     manager.set_source("google")?;
//!
//!     let _sub = manager.on_translate(|tip| eprintln!("{}", tip));
//!     println!("{}", manager.translate("Hello", &TranslateOptions::to("fr")).await?);
//!     Ok(())
//! }
//! ```

pub mod google_translate;

pub use google_translate::GoogleTranslateProvider;
pub use transwitch::{
    LanguagePair, ManagerConfig, MemoryStorage, MockMode, MockTranslator, MtError, MtResult,
    Translate, TranslateManager, TranslateOptions,
};
