//! Non-interactive driver for the workflow.
//!
//! Runs the same controller as the TUI on the real clock and writes progress
//! to a writer, either as readable lines or as one JSON event per line.

use anyhow::{bail, Context, Result};
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use crate::config::Config;
use crate::otp;
use crate::reveal::Typewriter;
use crate::workflow::catalog::default_steps;
use crate::workflow::{Clock, StepKind, WorkflowController, WorkflowEvent};

/// Where the gated step gets its confirmation code from
pub trait ConfirmationSource {
    /// Next candidate code, `None` once the source has nothing more to offer
    fn next_code(&mut self) -> Result<Option<String>>;
}

/// A single code supplied up front (e.g. `--otp`)
pub struct FixedCode(Option<String>);

impl FixedCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(Some(code.into()))
    }
}

impl ConfirmationSource for FixedCode {
    fn next_code(&mut self) -> Result<Option<String>> {
        Ok(self.0.take())
    }
}

/// Prompt on stderr and read codes from stdin
pub struct StdinPrompt;

impl ConfirmationSource for StdinPrompt {
    fn next_code(&mut self) -> Result<Option<String>> {
        eprint!("Security Verification Required. Enter the 6-digit OTP: ");
        io::stderr().flush()?;

        let mut input = String::new();
        let read = io::stdin()
            .lock()
            .read_line(&mut input)
            .context("Failed to read confirmation code")?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(input))
    }
}

/// Output style for the headless runner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Plain,
    Json,
}

fn emit<W: Write>(out: &mut W, event: &WorkflowEvent, mode: OutputMode) -> Result<()> {
    match mode {
        OutputMode::Plain => match event {
            // The response text itself is streamed by the typewriter
            WorkflowEvent::ResponseReady { .. } => writeln!(out, "{}:", event.summary())?,
            _ => writeln!(out, "{}", event.summary())?,
        },
        OutputMode::Json => {
            let line = serde_json::to_string(event).context("Failed to serialize event")?;
            writeln!(out, "{}", line)?;
        }
    }
    Ok(())
}

/// Ask the source until it yields a valid code
fn obtain_code<W: Write>(
    source: &mut dyn ConfirmationSource,
    out: &mut W,
    mode: OutputMode,
) -> Result<String> {
    loop {
        let Some(raw) = source.next_code()? else {
            bail!("No confirmation code provided for security verification");
        };
        let code = otp::sanitize(&raw);
        if otp::is_valid_code(&code) {
            return Ok(code);
        }
        tracing::debug!("Rejected confirmation input, {} digits", code.len());
        if mode == OutputMode::Plain {
            writeln!(out, "Code must be {} digits", otp::CODE_LENGTH)?;
        }
    }
}

/// Drive one complete run, returning once it settles
pub async fn run_workflow<W: Write>(
    config: &Config,
    clock: Arc<dyn Clock>,
    source: &mut dyn ConfirmationSource,
    out: &mut W,
    mode: OutputMode,
) -> Result<()> {
    let mut controller = WorkflowController::new(clock.clone(), config.workflow.timings());
    let mut typewriter = Typewriter::new(config.reveal.interval());
    let mut printed = 0;
    let mut text_finished = false;

    controller.start()?;

    loop {
        controller.poll();
        let now = clock.now();

        if mode == OutputMode::Plain && !text_finished {
            if let Some(text) = controller.response() {
                typewriter.set_source(text, now);
                typewriter.set_revealing(controller.is_revealing(), now);
                typewriter.poll(now);

                let shown = typewriter.displayed();
                if shown.len() > printed {
                    write!(out, "{}", &shown[printed..])?;
                    printed = shown.len();
                    out.flush()?;
                }
                if printed == typewriter.source().len() && !typewriter.shows_cursor() {
                    writeln!(out)?;
                    text_finished = true;
                }
            }
        }

        let mut settled = false;
        for event in controller.drain_events() {
            settled |= matches!(event, WorkflowEvent::Settled { .. });
            emit(out, &event, mode)?;
        }
        if settled {
            return Ok(());
        }

        if controller.pending_confirmation() {
            let code = obtain_code(source, out, mode)?;
            if mode == OutputMode::Plain {
                writeln!(out, "Verifying...")?;
            }
            tokio::time::sleep(config.otp.verify_delay()).await;
            controller.confirm(&code)?;
            continue;
        }

        let mut wake = controller.next_deadline();
        if mode == OutputMode::Plain && typewriter.shows_cursor() {
            let tick = now + config.reveal.interval();
            wake = Some(wake.map_or(tick, |w| w.min(tick)));
        }
        let Some(wake) = wake else {
            bail!("Workflow stalled with nothing scheduled");
        };
        tokio::time::sleep(wake.saturating_sub(now)).await;
    }
}

/// Print the step catalog with the configured delays
pub fn print_steps<W: Write>(config: &Config, out: &mut W) -> Result<()> {
    let steps = default_steps(&config.workflow.timings());

    writeln!(out, "Workflow Steps ({})", steps.len())?;
    writeln!(out, "{}", "─".repeat(60))?;
    for (i, step) in steps.iter().enumerate() {
        let timing = match step.kind {
            StepKind::Timed(delay) => format!("{} ms", delay.as_millis()),
            StepKind::Gated => "awaits OTP".to_string(),
        };
        writeln!(out, "{}. {:<24} {}", i + 1, step.title, timing)?;
        if let Some(ref description) = step.description {
            writeln!(out, "   {}", description)?;
        }
        for sub in &step.sub_steps {
            writeln!(out, "   • {}", sub)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::{TokioClock, RESPONSE_TEXT};

    struct Codes(Vec<&'static str>);

    impl ConfirmationSource for Codes {
        fn next_code(&mut self) -> Result<Option<String>> {
            if self.0.is_empty() {
                Ok(None)
            } else {
                Ok(Some(self.0.remove(0).to_string()))
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_plain_run_prints_progress_and_response() {
        let config = Config::default();
        let mut out = Vec::new();
        let mut source = FixedCode::new("123456");

        run_workflow(
            &config,
            Arc::new(TokioClock::new()),
            &mut source,
            &mut out,
            OutputMode::Plain,
        )
        .await
        .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("[3] Waiting for security verification"));
        assert!(text.contains("Verifying..."));
        assert!(text.contains("OTP Verified"));
        assert!(text.contains(RESPONSE_TEXT));
        assert!(text.trim_end().ends_with("Workflow idle"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_json_run_emits_one_event_per_line() {
        let config = Config::default();
        let mut out = Vec::new();
        let mut source = FixedCode::new("999999");

        run_workflow(
            &config,
            Arc::new(TokioClock::new()),
            &mut source,
            &mut out,
            OutputMode::Json,
        )
        .await
        .unwrap();

        let text = String::from_utf8(out).unwrap();
        let events: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(events.first().unwrap()["event"], "workflow.started");
        assert_eq!(events.last().unwrap()["event"], "workflow.settled");
        assert!(events
            .iter()
            .any(|e| e["event"] == "response.ready" && e["data"]["text"] == RESPONSE_TEXT));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_input_is_retried() {
        let config = Config::default();
        let mut out = Vec::new();
        let mut source = Codes(vec!["12", "ab-cd", "12 34 56"]);

        run_workflow(
            &config,
            Arc::new(TokioClock::new()),
            &mut source,
            &mut out,
            OutputMode::Plain,
        )
        .await
        .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("Code must be 6 digits").count(), 2);
        assert!(source.0.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_source_is_an_error() {
        let config = Config::default();
        let mut out = Vec::new();
        let mut source = Codes(vec!["123"]);

        let err = run_workflow(
            &config,
            Arc::new(TokioClock::new()),
            &mut source,
            &mut out,
            OutputMode::Json,
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("No confirmation code"));
    }

    #[test]
    fn test_print_steps_lists_catalog() {
        let mut out = Vec::new();
        print_steps(&Config::default(), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Workflow Steps (5)"));
        assert!(text.contains("Authentication Check"));
        assert!(text.contains("2000 ms"));
        assert!(text.contains("awaits OTP"));
        assert!(text.contains("• Executing commands"));
    }
}
