//! Handles all user-facing output for suite runs.
//!
//! The reporter never talks to the console directly; it writes lines to an
//! injected [`OutputSink`], so callers can capture reports programmatically
//! or route them anywhere else.

use difference::{Changeset, Difference};

use crate::errors::HarnessError;
use crate::runner::run;
use crate::suite::Suite;

// ============================================================================
// OUTPUT SINKS: OutputBuffer and StdoutSink implementations
// ============================================================================

/// Line-oriented destination for report text.
pub trait OutputSink {
    fn emit(&mut self, text: &str);
}

/// OutputBuffer: collects output into a String for testing or programmatic
/// capture.
pub struct OutputBuffer {
    pub buffer: String,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputSink for OutputBuffer {
    fn emit(&mut self, text: &str) {
        if !self.buffer.is_empty() {
            self.buffer.push('\n');
        }
        self.buffer.push_str(text);
    }
}

/// StdoutSink: writes output to stdout for CLI and default runner use.
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn emit(&mut self, text: &str) {
        println!("{}", text);
    }
}

// ============================================================================
// REPORT RENDERING
// ============================================================================

// Color constants for terminal output
const RESET: &str = "\x1b[0m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";

/// Configuration for report rendering.
pub struct ReportConfig {
    pub use_colors: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            use_colors: atty::is(atty::Stream::Stdout),
        }
    }
}

impl ReportConfig {
    /// A config with colorization off, for buffer-backed sinks.
    pub fn plain() -> Self {
        Self { use_colors: false }
    }

    /// Apply color formatting to text if colors are enabled.
    pub fn colorize(&self, text: &str, color: &str) -> String {
        if self.use_colors {
            format!("{}{}{}", color, text, RESET)
        } else {
            text.to_string()
        }
    }
}

/// Runs `suite` and renders the report to stdout with default settings.
/// Resolves to `true` iff every test passed.
pub async fn report(suite: &Suite) -> Result<bool, HarnessError> {
    report_with(suite, &mut StdoutSink, &ReportConfig::default()).await
}

/// Runs `suite` and renders one line per test plus a summary line to `sink`.
///
/// Resolves to `Ok(true)` iff zero tests failed. If the run itself fails (a
/// lifecycle hook error), the error is rendered to the sink and returned;
/// no boolean is produced.
pub async fn report_with(
    suite: &Suite,
    sink: &mut dyn OutputSink,
    config: &ReportConfig,
) -> Result<bool, HarnessError> {
    let results = match run(suite).await {
        Ok(results) => results,
        Err(error) => {
            sink.emit(&format!("{}: {}", config.colorize("ERROR", RED), error));
            return Err(error);
        }
    };

    if let Some(label) = results.name() {
        sink.emit(label);
    }

    let mut succeeded = 0usize;
    let mut failed = 0usize;
    for name in suite.test_names() {
        let Some(outcome) = results.outcome(name) else {
            continue;
        };
        match outcome.error() {
            None => {
                sink.emit(&format!("{}: {}", config.colorize("Success", GREEN), name));
                succeeded += 1;
            }
            Some(error) => {
                sink.emit(&format!(
                    "{}: {}, {}",
                    config.colorize("FAILED", RED),
                    name,
                    error
                ));
                if let HarnessError::Assertion {
                    expected, actual, ..
                } = error
                {
                    emit_mismatch(sink, config, expected, actual);
                }
                failed += 1;
            }
        }
    }

    let total = succeeded + failed;
    let summary = if failed > 0 {
        format!("{}/{} passed, {} FAILED.", succeeded, total, failed)
    } else {
        format!("{}/{} passed.", succeeded, total)
    };
    sink.emit(&summary);

    Ok(failed == 0)
}

/// Renders the operands of a failed assertion, with a line diff when either
/// side spans multiple lines.
fn emit_mismatch(sink: &mut dyn OutputSink, config: &ReportConfig, expected: &str, actual: &str) {
    sink.emit(&format!("  Expected: {}", expected));
    sink.emit(&format!("  Actual:   {}", actual));
    if expected.contains('\n') || actual.contains('\n') {
        let changeset = Changeset::new(expected, actual, "\n");
        for diff in &changeset.diffs {
            match diff {
                Difference::Same(text) => sink.emit(&format!("    {}", text)),
                Difference::Add(text) => {
                    sink.emit(&format!("  + {}", config.colorize(text, RED)))
                }
                Difference::Rem(text) => {
                    sink.emit(&format!("  - {}", config.colorize(text, GREEN)))
                }
            }
        }
    }
}
