//! The suite model: named test registrations, lifecycle hooks, and the
//! result shapes a test body can hand back.
//!
//! A suite is plain data. Registration order is preserved, `initialize` and
//! `cleanup` are reserved names that land in dedicated hook slots instead of
//! the test list, and re-registering an existing name replaces the earlier
//! body. Nothing here executes anything; see [`crate::runner`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::sync::oneshot;

use crate::errors::HarnessError;

/// Per-test bound applied when a suite does not set its own.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

pub(crate) const INITIALIZE: &str = "initialize";
pub(crate) const CLEANUP: &str = "cleanup";

/// A registered test body. Invoked with no arguments; an `Err` is an
/// immediate failure, an `Ok` carries what, if anything, to wait on.
pub type TestFn = Arc<dyn Fn() -> Result<TestReturn, HarnessError> + Send + Sync>;

/// Continuation shape: a function handed a [`Completion`] it must settle.
pub type CallbackFn = Box<dyn FnOnce(Completion) + Send>;

/// What a test body returned, and therefore how its outcome is resolved.
///
/// The three variants are the three result shapes the execution protocol
/// normalizes: an already-finished body, a callback-style continuation, and
/// a future to await under the suite's timeout.
pub enum TestReturn {
    /// The body finished synchronously; the test passes with no waiting.
    Done,
    /// The body handed back a continuation; the outcome is whatever the
    /// continuation settles its [`Completion`] with.
    Callback(CallbackFn),
    /// The body handed back a future; the outcome is its result, raced
    /// against the suite's timeout.
    Async(BoxFuture<'static, Result<(), HarnessError>>),
}

impl TestReturn {
    /// Wraps `fut` as the future-shaped result of a test body.
    pub fn from_future(
        fut: impl Future<Output = Result<(), HarnessError>> + Send + 'static,
    ) -> Self {
        TestReturn::Async(Box::pin(fut))
    }

    /// Wraps `continuation` as the callback-shaped result of a test body.
    pub fn from_callback(continuation: impl FnOnce(Completion) + Send + 'static) -> Self {
        TestReturn::Callback(Box::new(continuation))
    }
}

/// One-shot completion handle for callback-shaped tests.
///
/// Settling consumes the handle, so a second settlement is unrepresentable.
/// Dropping the handle without settling fails the test rather than stalling
/// the suite.
pub struct Completion {
    tx: oneshot::Sender<Result<(), HarnessError>>,
}

impl Completion {
    pub(crate) fn new() -> (Self, oneshot::Receiver<Result<(), HarnessError>>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    /// Settles the test as passed.
    pub fn done(self) {
        let _ = self.tx.send(Ok(()));
    }

    /// Settles the test as failed with `error`.
    pub fn fail(self, error: HarnessError) {
        let _ = self.tx.send(Err(error));
    }
}

pub(crate) struct TestCase {
    pub(crate) name: String,
    pub(crate) body: TestFn,
}

/// A named collection of test functions plus optional lifecycle hooks.
///
/// # Examples
///
/// ```rust,no_run
/// use attest::{Suite, TestReturn};
///
/// let suite = Suite::named("demo")
///     .test("passes", || Ok(TestReturn::Done))
///     .test("async", || {
///         Ok(TestReturn::from_future(async { Ok(()) }))
///     });
/// ```
pub struct Suite {
    name: Option<String>,
    limit: Duration,
    tests: Vec<TestCase>,
    init: Option<TestFn>,
    cleanup: Option<TestFn>,
}

impl Suite {
    /// An unnamed suite with the default timeout.
    pub fn new() -> Self {
        Self {
            name: None,
            limit: DEFAULT_TIMEOUT,
            tests: Vec::new(),
            init: None,
            cleanup: None,
        }
    }

    /// A suite carrying `label`, copied into every report of its runs.
    pub fn named(label: impl Into<String>) -> Self {
        let mut suite = Self::new();
        suite.name = Some(label.into());
        suite
    }

    /// Sets the per-test bound applied to every test in the suite.
    pub fn timeout(mut self, limit: Duration) -> Self {
        self.limit = limit;
        self
    }

    /// Registers a test under `name`.
    ///
    /// The reserved names `initialize` and `cleanup` route to the hook slots
    /// instead of the test list. Registering an existing name replaces the
    /// earlier body.
    pub fn test<F>(mut self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn() -> Result<TestReturn, HarnessError> + Send + Sync + 'static,
    {
        let name = name.into();
        let body: TestFn = Arc::new(body);
        match name.as_str() {
            INITIALIZE => self.init = Some(body),
            CLEANUP => self.cleanup = Some(body),
            _ => {
                if let Some(existing) = self.tests.iter_mut().find(|case| case.name == name) {
                    existing.body = body;
                } else {
                    self.tests.push(TestCase { name, body });
                }
            }
        }
        self
    }

    /// Sets the hook executed before any test runs. Its failure skips the
    /// main phase.
    pub fn initialize<F>(mut self, body: F) -> Self
    where
        F: Fn() -> Result<TestReturn, HarnessError> + Send + Sync + 'static,
    {
        self.init = Some(Arc::new(body));
        self
    }

    /// Sets the hook executed after every test has settled.
    pub fn cleanup<F>(mut self, body: F) -> Self
    where
        F: Fn() -> Result<TestReturn, HarnessError> + Send + Sync + 'static,
    {
        self.cleanup = Some(Arc::new(body));
        self
    }

    /// The suite's label, if one was given.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Names of the tests a run would execute, in registration order.
    pub fn test_names(&self) -> impl Iterator<Item = &str> {
        self.cases().map(|case| case.name.as_str())
    }

    pub(crate) fn limit(&self) -> Duration {
        self.limit
    }

    pub(crate) fn init_hook(&self) -> Option<&TestFn> {
        self.init.as_ref()
    }

    pub(crate) fn cleanup_hook(&self) -> Option<&TestFn> {
        self.cleanup.as_ref()
    }

    /// Eligible tests in registration order. A name that is exactly the
    /// decimal rendering of its own position is treated as an array-like
    /// index, not a test name, and skipped.
    pub(crate) fn cases(&self) -> impl Iterator<Item = &TestCase> {
        self.tests
            .iter()
            .enumerate()
            .filter(|(index, case)| case.name != index.to_string())
            .map(|(_, case)| case)
    }
}

impl Default for Suite {
    fn default() -> Self {
        Self::new()
    }
}
