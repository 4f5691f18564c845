pub use crate::compare::{equals, expect, expect_with};
pub use crate::errors::HarnessError;
pub use crate::report::{report, report_with, OutputBuffer, OutputSink, ReportConfig, StdoutSink};
pub use crate::runner::{run, run_observed, SuiteReport, TestOutcome};
pub use crate::suite::{CallbackFn, Completion, Suite, TestFn, TestReturn, DEFAULT_TIMEOUT};
pub use crate::value::{NativeFn, Value, ValueKind};

pub mod compare;
pub mod errors;
pub mod report;
pub mod runner;
pub mod suite;
pub mod value;
