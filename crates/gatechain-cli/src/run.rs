//! Pipeline execution for the binary: configuration, input, output.
//!
//! Stdout carries only user-facing text (the confirmation or the rejection
//! notice). Prompts, failures and logs go to stderr.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tracing::{error, info};

use gatechain_core::{PipelineConfig, PipelineDriver, PipelineError, PipelineOutcome, build_driver};

use crate::Cli;

/// Environment variable naming a config file when `--config` is absent.
pub const CONFIG_ENV: &str = "GATECHAIN_CONFIG";

/// Shown before reading input.
pub const INPUT_PROMPT: &str = "What is your desired physical outcome? ";

/// Printed for every gate rejection.
pub const REJECTION_NOTICE: &str = "This doesn't appear to be a desired physical outcome.";

const EXIT_UPSTREAM: u8 = 1;
const EXIT_CONFIG: u8 = 2;

/// Run the binary: build the driver, then process `--message`, one stdin
/// line, or an interactive session.
pub async fn execute(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref(), cli.model.as_deref(), cli.threshold)?;
    info!(model = %config.model, threshold = config.threshold, "initializing pipeline");

    let driver = build_driver(&config)?;
    let mut stdout = std::io::stdout();

    if let Some(message) = cli.message.as_deref() {
        return run_once(&driver, message, &mut stdout).await;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    if cli.interactive {
        return run_interactive(&driver, &mut lines, &mut stdout).await;
    }

    prompt();
    let line = lines
        .next_line()
        .await
        .context("failed to read stdin")?
        .unwrap_or_default();
    run_once(&driver, &line, &mut stdout).await
}

/// Load the config file (if any) and apply command-line overrides.
///
/// Validation is left to [`build_driver`] so an out-of-range override is
/// reported the same way as an out-of-range file value.
fn load_config(
    path: Option<&Path>,
    model: Option<&str>,
    threshold: Option<f64>,
) -> anyhow::Result<PipelineConfig> {
    let path = path
        .map(PathBuf::from)
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

    let mut config = match path {
        Some(path) => {
            info!(path = %path.display(), "loading config");
            PipelineConfig::from_file(&path)?
        }
        None => PipelineConfig::default(),
    };

    if let Some(model) = model {
        config.model = model.to_owned();
    }
    if let Some(threshold) = threshold {
        config.threshold = threshold;
    }
    Ok(config)
}

async fn run_once<W: Write>(
    driver: &PipelineDriver,
    text: &str,
    out: &mut W,
) -> anyhow::Result<()> {
    let outcome = driver.run(text.trim()).await?;
    writeln!(out, "{}", render(&outcome))?;
    Ok(())
}

/// One independent pipeline run per line until EOF or `/exit`.
///
/// A failed run is reported and the session continues.
async fn run_interactive<R, W>(
    driver: &PipelineDriver,
    lines: &mut Lines<R>,
    out: &mut W,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    loop {
        prompt();
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();

        match input {
            "" => continue,
            "/exit" | "/quit" => break,
            _ => {}
        }

        match driver.run(input).await {
            Ok(outcome) => writeln!(out, "{}", render(&outcome))?,
            Err(e) => {
                error!(error = %e, "pipeline run failed");
                eprintln!("{}", describe(&e));
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

fn prompt() {
    eprint!("{INPUT_PROMPT}");
    // Flush so the prompt appears before blocking on read.
    std::io::stderr().flush().ok();
}

/// User-facing text for an outcome.
pub fn render(outcome: &PipelineOutcome) -> String {
    match outcome {
        PipelineOutcome::Accepted(confirmation) => {
            match confirmation.supplementary_link.as_deref().map(str::trim) {
                Some(link) if !link.is_empty() => {
                    format!("Confirmation: {}\nMore: {link}", confirmation.message)
                }
                _ => format!("Confirmation: {}", confirmation.message),
            }
        }
        PipelineOutcome::Rejected { .. } => REJECTION_NOTICE.to_string(),
    }
}

fn describe(err: &PipelineError) -> String {
    match err {
        PipelineError::Upstream { .. } => {
            format!("Sorry, the request could not be completed right now ({err}).")
        }
        PipelineError::Configuration(_) => format!("error: {err}"),
    }
}

/// Message printed to stderr when [`execute`] fails.
pub fn failure_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<PipelineError>() {
        Some(e) => describe(e),
        None => format!("error: {err:#}"),
    }
}

/// Process exit status for a failed [`execute`]: model-call failures are
/// distinguished from configuration and usage errors.
pub fn failure_code(err: &anyhow::Error) -> std::process::ExitCode {
    std::process::ExitCode::from(failure_status(err))
}

fn failure_status(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<PipelineError>() {
        Some(PipelineError::Upstream { .. }) => EXIT_UPSTREAM,
        _ => EXIT_CONFIG,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use gatechain_core::pipeline::traits::{Classifier, DetailResolver, ResponseSynthesizer};
    use gatechain_core::{ClassificationResult, ConfirmationResult, DetailRecord, Gate, Stage};
    use gatechain_llm::ProviderError;

    // ── Output ──────────────────────────────────────────────────────

    fn accepted(link: Option<&str>) -> PipelineOutcome {
        PipelineOutcome::Accepted(ConfirmationResult {
            message: "Do 3 sets of 12 push-ups.".into(),
            supplementary_link: link.map(String::from),
        })
    }

    #[test]
    fn render_accepted_without_link() {
        assert_eq!(render(&accepted(None)), "Confirmation: Do 3 sets of 12 push-ups.");
        assert_eq!(
            render(&accepted(Some(" "))),
            "Confirmation: Do 3 sets of 12 push-ups."
        );
    }

    #[test]
    fn render_accepted_with_link() {
        assert_eq!(
            render(&accepted(Some("https://example.com/push-up"))),
            "Confirmation: Do 3 sets of 12 push-ups.\nMore: https://example.com/push-up"
        );
    }

    #[test]
    fn render_rejected_is_fixed_notice() {
        let outcome = PipelineOutcome::Rejected {
            reason: "gate check failed".into(),
            category_flag: false,
            confidence: 0.95,
        };
        assert_eq!(render(&outcome), REJECTION_NOTICE);
    }

    #[test]
    fn upstream_failure_exits_one() {
        let err: anyhow::Error = PipelineError::Upstream {
            stage: Stage::Classify,
            source: ProviderError::Timeout,
        }
        .into();
        assert_eq!(failure_status(&err), 1);
        assert!(failure_message(&err).contains("could not be completed"));
    }

    #[test]
    fn configuration_failure_exits_two() {
        let err: anyhow::Error =
            PipelineError::Configuration("set OPENAI_API_KEY env var".into()).into();
        assert_eq!(failure_status(&err), 2);
        assert!(failure_message(&err).starts_with("error: configuration error"));

        let usage = anyhow::anyhow!("failed to read stdin");
        assert_eq!(failure_status(&usage), 2);
    }

    // ── Config ──────────────────────────────────────────────────────

    #[test]
    fn defaults_without_file() {
        temp_env::with_var_unset(CONFIG_ENV, || {
            let config = load_config(None, None, None).unwrap();
            assert_eq!(config, PipelineConfig::default());
        });
    }

    #[test]
    fn overrides_apply_over_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"model": "groq/llama-3.1-8b-instant", "threshold": 0.5}}"#).unwrap();

        let config = load_config(Some(file.path()), None, Some(0.9)).unwrap();
        assert_eq!(config.model, "groq/llama-3.1-8b-instant");
        assert!((config.threshold - 0.9).abs() < f64::EPSILON);

        let config = load_config(Some(file.path()), Some("openai/gpt-4o-mini"), None).unwrap();
        assert_eq!(config.model, "openai/gpt-4o-mini");
        assert!((config.threshold - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn config_path_from_env() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"threshold": 0.4}}"#).unwrap();

        temp_env::with_var(CONFIG_ENV, Some(file.path()), || {
            let config = load_config(None, None, None).unwrap();
            assert!((config.threshold - 0.4).abs() < f64::EPSILON);
        });
    }

    #[test]
    fn missing_config_file_is_configuration_error() {
        let err = load_config(Some(Path::new("/nonexistent/gatechain.json")), None, None)
            .unwrap_err();
        assert_eq!(failure_status(&err), 2);
    }

    // ── Sessions ────────────────────────────────────────────────────

    /// Accepts any input containing "arms", fails on "boom", rejects the rest.
    struct KeywordClassifier {
        calls: Arc<AtomicU32>,
    }

    #[async_trait]
    impl Classifier for KeywordClassifier {
        async fn classify(&self, raw_text: &str) -> gatechain_core::Result<ClassificationResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if raw_text.contains("boom") {
                return Err(PipelineError::Upstream {
                    stage: Stage::Classify,
                    source: ProviderError::Timeout,
                });
            }
            Ok(ClassificationResult {
                description: raw_text.into(),
                category_flag: raw_text.contains("arms"),
                confidence: 0.9,
            })
        }
    }

    struct PushUps;

    #[async_trait]
    impl DetailResolver for PushUps {
        async fn resolve(&self, _description: &str) -> gatechain_core::Result<DetailRecord> {
            Ok(DetailRecord {
                name: "push-up".into(),
                detail: "3 sets of 12".into(),
            })
        }
    }

    struct Echo;

    #[async_trait]
    impl ResponseSynthesizer for Echo {
        async fn synthesize(
            &self,
            record: &DetailRecord,
        ) -> gatechain_core::Result<ConfirmationResult> {
            Ok(ConfirmationResult {
                message: format!("{} {}", record.detail, record.name),
                supplementary_link: None,
            })
        }
    }

    fn driver(calls: Arc<AtomicU32>) -> PipelineDriver {
        PipelineDriver::new(
            Arc::new(KeywordClassifier { calls }),
            Arc::new(PushUps),
            Arc::new(Echo),
            Gate::default(),
        )
    }

    #[tokio::test]
    async fn single_run_prints_confirmation() {
        let driver = driver(Arc::new(AtomicU32::new(0)));
        let mut out = Vec::new();

        run_once(&driver, "  stronger arms\n", &mut out).await.unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Confirmation: 3 sets of 12 push-up\n");
    }

    #[tokio::test]
    async fn single_run_rejects_quietly() {
        let driver = driver(Arc::new(AtomicU32::new(0)));
        let mut out = Vec::new();

        run_once(&driver, "capital of France", &mut out).await.unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), format!("{REJECTION_NOTICE}\n"));
    }

    #[tokio::test]
    async fn single_run_blank_input_goes_to_classifier() {
        let calls = Arc::new(AtomicU32::new(0));
        let driver = driver(calls.clone());
        let mut out = Vec::new();

        run_once(&driver, "   ", &mut out).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(String::from_utf8(out).unwrap(), format!("{REJECTION_NOTICE}\n"));
    }

    #[tokio::test]
    async fn single_run_upstream_failure_propagates() {
        let driver = driver(Arc::new(AtomicU32::new(0)));
        let mut out = Vec::new();

        let err = run_once(&driver, "boom", &mut out).await.unwrap_err();
        assert_eq!(failure_status(&err), 1);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn interactive_runs_each_line_until_exit() {
        let calls = Arc::new(AtomicU32::new(0));
        let driver = driver(calls.clone());
        let input: &[u8] = b"stronger arms\n\ncapital of France\n/exit\nbigger arms\n";
        let mut lines = input.lines();
        let mut out = Vec::new();

        run_interactive(&driver, &mut lines, &mut out).await.unwrap();

        let printed = String::from_utf8(out).unwrap();
        assert_eq!(
            printed,
            format!("Confirmation: 3 sets of 12 push-up\n\n{REJECTION_NOTICE}\n\n")
        );
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn interactive_continues_after_failure() {
        let calls = Arc::new(AtomicU32::new(0));
        let driver = driver(calls.clone());
        let input: &[u8] = b"boom\nstronger arms";
        let mut lines = input.lines();
        let mut out = Vec::new();

        run_interactive(&driver, &mut lines, &mut out).await.unwrap();

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.ends_with("Confirmation: 3 sets of 12 push-up\n\n"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
