//! Bookline intent classifier — operator smoke CLI.
//!
//! Classifies messages given as arguments, or stdin lines when none are
//! given, and prints each ClassificationResult as pretty JSON. An optional
//! leading `.toml` argument is loaded as the engine config; otherwise the
//! environment defaults apply.

use std::io::BufRead;

use tracing_subscriber::EnvFilter;

use bl_classifier::{Classifier, EngineConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "bl-classify starting");

    // ── Load config ─────────────────────────────────────────────
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let config = if args.first().is_some_and(|a| a.ends_with(".toml")) {
        let path = args.remove(0);
        let config = EngineConfig::from_file(&path)?;
        tracing::info!(path = %path, "config loaded");
        config
    } else {
        EngineConfig::from_env()
    };

    // ── Build the engine ────────────────────────────────────────
    let classifier = Classifier::from_config(config)?;

    // ── Classify ────────────────────────────────────────────────
    if args.is_empty() {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            print_result(&classifier, &line).await?;
        }
    } else {
        for message in &args {
            print_result(&classifier, message).await?;
        }
    }

    Ok(())
}

async fn print_result(classifier: &Classifier, text: &str) -> anyhow::Result<()> {
    let result = classifier.classify(text).await;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
