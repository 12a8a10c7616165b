//! Command handlers for CLI operations

use anyhow::Result;
use console::{Term, style};
use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Arc;
use tokio::fs as async_fs;
use tokio::io::{AsyncBufReadExt as _, AsyncReadExt as _, BufReader, stdin};
use tokio::sync::mpsc::unbounded_channel;
use tracing::{debug, info, warn};
use tracing_subscriber::{
    EnvFilter, Registry, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _,
};
use tutorlens_cli::{
    AdvisoryChoice, ConsolePresenter, TranscriptSource, wait_for_target, watch_transcript,
};
use tutorlens_core::{Classifier, RuleCategory, TutorlensConfig};
use tutorlens_watch::{
    AdvisoryChannel, AdvisoryTrigger, ChangeGate, GateDriver, HostSignal, UsageStore,
};

const DEFAULT_FILTER: &str = "tutorlens_core=info,tutorlens_watch=info,tutorlens_cli=info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into())
}

/// Install the tracing subscriber, logging to stderr or to
/// `~/.tutorlens/debug.log`
///
/// # Errors
/// Returns an error if the log file cannot be created
pub async fn init_logging(log_file: bool) -> Result<()> {
    if !log_file {
        Registry::default()
            .with(env_filter())
            .with(fmt::layer().with_writer(io::stderr).with_target(true))
            .init();
        return Ok(());
    }

    let log_dir = TutorlensConfig::config_dir()?;
    async_fs::create_dir_all(&log_dir).await?;

    let debug_log = log_dir.join("debug.log");
    if async_fs::try_exists(&debug_log).await.unwrap_or(false) {
        async_fs::remove_file(&debug_log).await?;
    }

    // Open log file synchronously for tracing writer (needs sync File)
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&debug_log)?;

    Registry::default()
        .with(env_filter())
        .with(
            fmt::layer()
                .with_writer(Arc::new(file))
                .with_ansi(false)
                .with_target(true)
                .with_level(true),
        )
        .init();
    Ok(())
}

/// Load the configuration from `path`, or from `~/.tutorlens/config.toml`
///
/// An explicit file must load. The default file falls back to defaults when
/// unreadable, unless its rules fail to compile.
///
/// # Errors
/// Returns an error if an explicit config is invalid or a rule is malformed
pub fn load_config(path: Option<&Path>) -> Result<TutorlensConfig> {
    if let Some(path) = path {
        return Ok(TutorlensConfig::load_from_file(path)?);
    }

    match TutorlensConfig::load_or_create() {
        Ok(config) => Ok(config),
        Err(error) if error.is_rule_error() => Err(error.into()),
        Err(error) => {
            warn!("Failed to load config from ~/.tutorlens/config.toml: {error}");
            warn!("Using default configuration");
            Ok(TutorlensConfig::default())
        }
    }
}

/// Classify `text`, or all of stdin, and print the analysis as JSON
///
/// # Errors
/// Returns an error if the rules fail to compile or stdin cannot be read
pub async fn handle_classify(config: &TutorlensConfig, text: Option<String>) -> Result<()> {
    let classifier = Classifier::new(config.rule_set()?);

    let text = match text {
        Some(text) => text,
        None => {
            let mut buffer = String::new();
            stdin().read_to_string(&mut buffer).await?;
            buffer
        }
    };

    let result = classifier.classify(&text);
    Term::stdout().write_line(&serde_json::to_string_pretty(&result)?)?;
    Ok(())
}

/// Print the active rule set
///
/// # Errors
/// Returns an error if the rules fail to compile
pub fn handle_rules(config: &TutorlensConfig) -> Result<()> {
    let rules = config.rule_set()?;
    let term = Term::stdout();

    let source = if config.rules.is_some() {
        "configured"
    } else {
        "built-in"
    };
    term.write_line(&format!(
        "{} {} rules",
        style(rules.len()).bold(),
        source
    ))?;

    for rule in rules.iter() {
        let kind = rule.category().pattern_kind();
        let label = match rule.category() {
            RuleCategory::Executive { .. } => style(format!("{}/{kind}", kind.category())).red(),
            RuleCategory::Adaptive { .. } => style(format!("{}/{kind}", kind.category())).green(),
        };
        term.write_line(&format!("\n{label}"))?;
        term.write_line(&format!("  pattern:    {}", rule.pattern()))?;
        term.write_line(&format!("  message:    {}", rule.message()))?;
        if let Some(suggestion) = rule.suggestion() {
            term.write_line(&format!("  suggestion: {suggestion}"))?;
        }
    }
    Ok(())
}

/// Print the effective configuration as TOML
///
/// # Errors
/// Returns an error if serialization fails
pub fn handle_config(config: &TutorlensConfig) -> Result<()> {
    Term::stdout().write_str(&config.to_toml()?)?;
    Ok(())
}

/// Watch a transcript and show advisories until stdin closes
///
/// # Errors
/// Returns an error if the rules fail to compile, the watcher cannot start
/// or the console cannot be written
pub async fn handle_watch(config: &TutorlensConfig, transcript: &Path) -> Result<()> {
    let classifier = Classifier::new(config.rule_set()?);
    let (channel, mut events) = AdvisoryChannel::new();
    let mut trigger = AdvisoryTrigger::new(channel);
    if config.usage.enabled {
        let store = Arc::new(UsageStore::new(config.usage.resolved_path()?));
        info!(path = %store.path().display(), "recording usage counts");
        trigger = trigger.with_usage_store(store);
    }

    let source = TranscriptSource::new(transcript);
    info!(path = %source.path().display(), "watching transcript");
    let gate = ChangeGate::new(source, classifier, trigger, &config.gate);
    let (signals, receiver) = unbounded_channel();
    let driver = tokio::spawn(GateDriver::new(gate).run(receiver));

    wait_for_target(transcript, config.host.retry_interval()).await;
    let watcher = watch_transcript(transcript, signals.clone())?;
    // The transcript may already hold a prompt
    signals.send(HostSignal::ContentChanged)?;

    let suggestion_path = TutorlensConfig::config_dir()?.join("suggested_prompt.txt");
    let mut presenter = ConsolePresenter::new(Term::stdout(), suggestion_path);
    let mut lines = BufReader::new(stdin()).lines();

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => presenter.render(event)?,
                None => break,
            },
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match AdvisoryChoice::parse(&line) {
                    Some(choice) => {
                        if presenter.resolve(choice)? {
                            signals.send(HostSignal::AdvisoryDismissed)?;
                        }
                    }
                    None if line.trim().is_empty() => {}
                    None => debug!(
                        input = %line,
                        advisory_pending = presenter.pending().is_some(),
                        "unrecognised input"
                    ),
                }
            }
        }
    }

    drop(watcher);
    drop(signals);
    let gate = driver.await?;
    info!(
        advisory_active = gate.state().advisory_active(),
        "stopped watching transcript"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn temp_dir() -> TempDir {
        match TempDir::new() {
            Ok(temp) => temp,
            Err(error) => panic!("temp dir: {error}"),
        }
    }

    #[test]
    fn test_explicit_config_is_loaded() {
        let temp = temp_dir();
        let path = temp.path().join("config.toml");
        if let Err(error) = fs::write(&path, "[gate]\nquiescence_ms = 250\n") {
            panic!("write failed: {error}");
        }
        match load_config(Some(&path)) {
            Ok(config) => {
                assert_eq!(config.gate.quiescence_ms, 250);
                assert_eq!(config.gate.min_prompt_chars, 15);
            }
            Err(error) => panic!("load failed: {error}"),
        }
    }

    #[test]
    fn test_explicit_config_errors_propagate() {
        let temp = temp_dir();
        assert!(load_config(Some(&temp.path().join("missing.toml"))).is_err());

        let path = temp.path().join("bad.toml");
        if let Err(error) = fs::write(&path, "[gate]\nquiescence_ms = 0\n") {
            panic!("write failed: {error}");
        }
        assert!(load_config(Some(&path)).is_err());
    }

    #[test]
    fn test_rules_and_config_print() {
        let config = TutorlensConfig::default();
        assert!(handle_rules(&config).is_ok());
        assert!(handle_config(&config).is_ok());
    }
}
