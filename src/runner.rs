//! Test execution protocol and suite orchestration.
//!
//! The protocol runs exactly one test body and resolves exactly one outcome,
//! whatever shape the body hands back:
//!
//! 1. **Invocation**: the body runs inside a failure boundary. An `Err`
//!    return or a panic is an immediate failure.
//! 2. **Dispatch** on the returned [`TestReturn`]: `Done` succeeds with no
//!    waiting; `Callback` hands the continuation a completion handle and
//!    awaits whichever settlement it produces; `Async` races the future
//!    against the suite's timeout, and whichever side loses the race is
//!    dropped, so the timer can never fire late against a settled test.
//! 3. **Settlement** happens exactly once per invocation: completion handles
//!    are consumed by settling and the race has a single winner, so a second
//!    terminal event is unrepresentable.
//!
//! Orchestration is a strict three-phase barrier: the `initialize` hook
//! settles before any test starts, all tests run concurrently (interleaved
//! on the polling task, settlement order unspecified), and the `cleanup`
//! hook runs only after every test has settled. Hook outcomes gate the run
//! but are never recorded as test results.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use serde::Serialize;

use crate::errors::HarnessError;
use crate::suite::{Completion, Suite, TestFn, TestReturn, CLEANUP, INITIALIZE};

// =============================================================================
// CORE TYPES
// =============================================================================

/// The settled result of one test. Success and failure are mutually
/// exclusive by construction: an outcome is failed iff it carries an error.
#[derive(Debug, Clone, Serialize)]
pub struct TestOutcome {
    name: String,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<HarnessError>,
}

impl TestOutcome {
    fn passed(name: &str) -> Self {
        Self {
            name: name.to_string(),
            success: true,
            error: None,
        }
    }

    fn failed(name: &str, error: HarnessError) -> Self {
        Self {
            name: name.to_string(),
            success: false,
            error: Some(error),
        }
    }

    /// The test's registered name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True if the test passed.
    pub fn success(&self) -> bool {
        self.success
    }

    /// The failure, if the test failed.
    pub fn error(&self) -> Option<&HarnessError> {
        self.error.as_ref()
    }
}

/// Aggregate result of one suite run: a mapping from test name to outcome,
/// plus the suite's label when it has one. Hook outcomes never appear here.
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    outcomes: HashMap<String, TestOutcome>,
}

impl SuiteReport {
    fn new(name: Option<String>) -> Self {
        Self {
            name,
            outcomes: HashMap::new(),
        }
    }

    fn record(&mut self, outcome: TestOutcome) {
        debug_assert!(
            !self.outcomes.contains_key(outcome.name()),
            "second settlement recorded for test '{}'",
            outcome.name()
        );
        self.outcomes.insert(outcome.name().to_string(), outcome);
    }

    /// The label copied from the suite, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The outcome recorded for `name`.
    pub fn outcome(&self, name: &str) -> Option<&TestOutcome> {
        self.outcomes.get(name)
    }

    /// Number of recorded outcomes.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// True if no outcomes were recorded.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// All recorded outcomes, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &TestOutcome> {
        self.outcomes.values()
    }

    /// Number of passed tests.
    pub fn passed_count(&self) -> usize {
        self.iter().filter(|outcome| outcome.success()).count()
    }

    /// Number of failed tests.
    pub fn failed_count(&self) -> usize {
        self.iter().filter(|outcome| !outcome.success()).count()
    }

    /// True if every recorded test passed.
    pub fn all_passed(&self) -> bool {
        self.failed_count() == 0
    }
}

// =============================================================================
// TEST EXECUTION PROTOCOL
// =============================================================================

/// Runs one test body to a single outcome.
async fn execute(name: &str, body: &TestFn, limit: Duration) -> TestOutcome {
    let returned = match catch_unwind(AssertUnwindSafe(|| body())) {
        Ok(Ok(returned)) => returned,
        Ok(Err(error)) => return TestOutcome::failed(name, error),
        Err(payload) => return TestOutcome::failed(name, HarnessError::panicked(payload)),
    };
    match returned {
        TestReturn::Done => TestOutcome::passed(name),
        TestReturn::Callback(continuation) => {
            let (completion, settled) = Completion::new();
            if let Err(payload) = catch_unwind(AssertUnwindSafe(move || continuation(completion)))
            {
                return TestOutcome::failed(name, HarnessError::panicked(payload));
            }
            // No timeout on this shape: a continuation that holds its handle
            // forever stalls the run. A dropped handle settles as a failure.
            match settled.await {
                Ok(Ok(())) => TestOutcome::passed(name),
                Ok(Err(error)) => TestOutcome::failed(name, error),
                Err(_) => TestOutcome::failed(
                    name,
                    HarnessError::continuation(
                        "continuation dropped its completion handle without settling",
                    ),
                ),
            }
        }
        TestReturn::Async(fut) => {
            match tokio::time::timeout(limit, AssertUnwindSafe(fut).catch_unwind()).await {
                Err(_) => TestOutcome::failed(name, HarnessError::timeout(limit)),
                Ok(Err(payload)) => TestOutcome::failed(name, HarnessError::panicked(payload)),
                Ok(Ok(Ok(()))) => TestOutcome::passed(name),
                Ok(Ok(Err(error))) => TestOutcome::failed(name, error),
            }
        }
    }
}

// =============================================================================
// SUITE ORCHESTRATION
// =============================================================================

/// Runs every eligible test in `suite` and resolves the aggregate report.
///
/// Phases are a strict barrier sequence: the `initialize` hook settles
/// first, then all tests run concurrently, then the `cleanup` hook runs. A
/// failing `initialize` skips the tests, still runs `cleanup`, and rejects
/// the run with the initialize error; a failing `cleanup` rejects the run
/// with its error. Individual test failures never abort siblings and land in
/// the report instead.
pub async fn run(suite: &Suite) -> Result<SuiteReport, HarnessError> {
    run_observed(suite, |_outcome: &TestOutcome| {}).await
}

/// Like [`run`], but forwards each outcome to `observer` as it settles.
/// Settlement order across concurrent tests is unspecified.
pub async fn run_observed<F>(suite: &Suite, mut observer: F) -> Result<SuiteReport, HarnessError>
where
    F: FnMut(&TestOutcome),
{
    let limit = suite.limit();
    let mut results = SuiteReport::new(suite.name().map(str::to_string));

    if let Some(init) = suite.init_hook() {
        let outcome = execute(INITIALIZE, init, limit).await;
        if let Some(error) = outcome.error() {
            let error = error.clone();
            // Best-effort cleanup; the initialize error is the one reported.
            if let Some(cleanup) = suite.cleanup_hook() {
                let _ = execute(CLEANUP, cleanup, limit).await;
            }
            return Err(error);
        }
    }

    let mut in_flight: FuturesUnordered<_> = suite
        .cases()
        .map(|case| execute(&case.name, &case.body, limit))
        .collect();
    while let Some(outcome) = in_flight.next().await {
        observer(&outcome);
        results.record(outcome);
    }

    if let Some(cleanup) = suite.cleanup_hook() {
        let outcome = execute(CLEANUP, cleanup, limit).await;
        if let Some(error) = outcome.error() {
            return Err(error.clone());
        }
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome_pair() -> (TestOutcome, TestOutcome) {
        (
            TestOutcome::passed("a"),
            TestOutcome::failed("b", HarnessError::failure("broke")),
        )
    }

    #[test]
    fn outcomes_are_exclusive_by_construction() {
        let (pass, fail) = outcome_pair();
        assert!(pass.success() && pass.error().is_none());
        assert!(!fail.success() && fail.error().is_some());
    }

    #[test]
    fn report_counts_partition_outcomes() {
        let (pass, fail) = outcome_pair();
        let mut report = SuiteReport::new(Some("demo".to_string()));
        report.record(pass);
        report.record(fail);
        assert_eq!(report.len(), 2);
        assert_eq!(report.passed_count(), 1);
        assert_eq!(report.failed_count(), 1);
        assert!(!report.all_passed());
        assert_eq!(report.name(), Some("demo"));
        assert!(report.outcome("a").is_some());
        assert!(report.outcome("missing").is_none());
    }
}
