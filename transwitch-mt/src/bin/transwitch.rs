use clap::{Arg, Command};
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::debug;
use transwitch_mt::{
    GoogleTranslateProvider, ManagerConfig, MemoryStorage, MockMode, MockTranslator,
    TranslateManager, TranslateOptions,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("warn".parse()?),
        )
        .init();

    let matches = Command::new("transwitch")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Translate text through a switchable translation source")
        .arg(
            Arg::new("text")
                .help("Text to translate, or '-' to read from stdin")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("target-locale")
                .help("Target language code (default: from config, usually en)")
                .index(2),
        )
        .arg(
            Arg::new("from")
                .long("from")
                .short('f')
                .help("Source language code (default: auto)"),
        )
        .arg(
            Arg::new("source")
                .long("source")
                .short('s')
                .help("Translation source to use")
                .value_parser(["google", "mock"])
                .default_value("google"),
        )
        .arg(
            Arg::new("max-len")
                .long("max-len")
                .help("Refuse texts longer than this many characters")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("JSON configuration file"),
        )
        .arg(
            Arg::new("link")
                .long("link")
                .short('l')
                .help("Print a link to the translation instead of translating (no API key needed)")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Show translation progress")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let mut config = match matches.get_one::<String>("config") {
        Some(path) => ManagerConfig::from_file(path)?,
        None => ManagerConfig::default(),
    }
    .with_env_overrides()?;
    if let Some(max_len) = matches.get_one::<usize>("max-len") {
        config.max_len = *max_len;
    }
    debug!(?config, "loaded configuration");

    let manager = TranslateManager::with_config(Arc::new(MemoryStorage::new()), config);
    let link_mode = matches.get_flag("link");
    if link_mode {
        // Links need no API key
        manager.register("google", || {
            Ok(GoogleTranslateProvider::from_env()
                .unwrap_or_else(|_| GoogleTranslateProvider::link_only()))
        })?;
    } else {
        manager.register("google", GoogleTranslateProvider::from_env)?;
    }
    manager.register("mock", || Ok(MockTranslator::new(MockMode::Suffix)))?;

    let source = matches
        .get_one::<String>("source")
        .map(|s| s.as_str())
        .unwrap_or("google");
    if manager.set_source(source)?.is_none() {
        return Err(format!(
            "Unknown translation source '{}' (available: {})",
            source,
            manager.list_sources().join(", ")
        )
        .into());
    }

    let _subscription = matches
        .get_flag("verbose")
        .then(|| manager.on_translate(|tip| eprintln!("{}", tip)));

    let text = match matches.get_one::<String>("text").map(|s| s.as_str()) {
        Some("-") | None => {
            let mut buffer = String::new();
            tokio::io::stdin().read_to_string(&mut buffer).await?;
            buffer
        }
        Some(text) => text.to_string(),
    };

    let options = TranslateOptions {
        from: matches.get_one::<String>("from").cloned(),
        to: matches.get_one::<String>("target-locale").cloned(),
    };

    if link_mode {
        let link = manager.link(&text, &options)?;
        if link.is_empty() {
            return Err("Failed to build link (run with --verbose for details)".into());
        }
        println!("{}", link);
        return Ok(());
    }

    let translated = manager.translate(&text, &options).await?;
    if translated.is_empty() && !text.is_empty() {
        return Err("Translation failed (run with --verbose for details)".into());
    }
    println!("{}", translated);

    Ok(())
}
