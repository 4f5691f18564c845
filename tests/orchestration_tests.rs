//! Exercises suite orchestration: the three-phase barrier, concurrent test
//! execution, hook failure policy, and the progress observer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use attest::{run, run_observed, HarnessError, Suite, TestOutcome, TestReturn};

#[tokio::test]
async fn every_registered_test_yields_exactly_one_outcome() {
    let suite = Suite::new()
        .test("a", || Ok(TestReturn::Done))
        .test("b", || Err(HarnessError::failure("broken")))
        .test("c", || Ok(TestReturn::from_future(async { Ok(()) })));
    let results = run(&suite).await.unwrap();
    assert_eq!(results.len(), 3);
    assert!(results.outcome("a").unwrap().success());
    assert!(!results.outcome("b").unwrap().success());
    assert!(results.outcome("c").unwrap().success());
    assert_eq!(results.passed_count(), 2);
    assert_eq!(results.failed_count(), 1);
}

#[tokio::test]
async fn tests_run_concurrently_not_sequentially() {
    // The slow test is registered first; under sequential execution it would
    // also settle first. Concurrent execution settles the fast one first.
    let suite = Suite::new()
        .test("slow", || {
            Ok(TestReturn::from_future(async {
                tokio::time::sleep(Duration::from_millis(80)).await;
                Ok(())
            }))
        })
        .test("fast", || {
            Ok(TestReturn::from_future(async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                Ok(())
            }))
        });
    let mut settled = Vec::new();
    let results = run_observed(&suite, |outcome: &TestOutcome| {
        settled.push(outcome.name().to_string());
    })
    .await
    .unwrap();
    assert_eq!(settled, vec!["fast", "slow"]);
    assert_eq!(results.len(), 2);
}

#[tokio::test]
async fn observer_sees_each_outcome_as_it_settles() {
    let suite = Suite::new()
        .test("pass", || Ok(TestReturn::Done))
        .test("fail", || Err(HarnessError::failure("nope")));
    let mut seen = Vec::new();
    run_observed(&suite, |outcome: &TestOutcome| {
        seen.push((outcome.name().to_string(), outcome.success()));
    })
    .await
    .unwrap();
    seen.sort();
    assert_eq!(
        seen,
        vec![("fail".to_string(), false), ("pass".to_string(), true)]
    );
}

#[tokio::test]
async fn initialize_settles_before_any_test_starts() {
    let ready = Arc::new(AtomicBool::new(false));
    let flag = ready.clone();
    let probe = ready.clone();
    let suite = Suite::new()
        .initialize(move || {
            let flag = flag.clone();
            Ok(TestReturn::from_future(async move {
                tokio::time::sleep(Duration::from_millis(30)).await;
                flag.store(true, Ordering::SeqCst);
                Ok(())
            }))
        })
        .test("observes initialization", move || {
            if probe.load(Ordering::SeqCst) {
                Ok(TestReturn::Done)
            } else {
                Err(HarnessError::failure("test started before initialize settled"))
            }
        });
    let results = run(&suite).await.unwrap();
    assert!(results.outcome("observes initialization").unwrap().success());
}

#[tokio::test]
async fn cleanup_runs_after_every_test_has_settled() {
    let tests_done = Arc::new(AtomicBool::new(false));
    let mark = tests_done.clone();
    let check = tests_done.clone();
    let ordered = Arc::new(AtomicBool::new(false));
    let verdict = ordered.clone();
    let suite = Suite::new()
        .test("slowish", move || {
            let mark = mark.clone();
            Ok(TestReturn::from_future(async move {
                tokio::time::sleep(Duration::from_millis(40)).await;
                mark.store(true, Ordering::SeqCst);
                Ok(())
            }))
        })
        .cleanup(move || {
            verdict.store(check.load(Ordering::SeqCst), Ordering::SeqCst);
            Ok(TestReturn::Done)
        });
    run(&suite).await.unwrap();
    assert!(ordered.load(Ordering::SeqCst));
}

#[tokio::test]
async fn failing_initialize_rejects_the_run_and_still_cleans_up() {
    let cleaned = Arc::new(AtomicBool::new(false));
    let tests_ran = Arc::new(AtomicBool::new(false));
    let cleaned_mark = cleaned.clone();
    let tests_mark = tests_ran.clone();
    let suite = Suite::new()
        .initialize(|| Err(HarnessError::failure("setup broke")))
        .test("t", move || {
            tests_mark.store(true, Ordering::SeqCst);
            Ok(TestReturn::Done)
        })
        .cleanup(move || {
            cleaned_mark.store(true, Ordering::SeqCst);
            Ok(TestReturn::Done)
        });
    let error = run(&suite).await.unwrap_err();
    assert_eq!(error.to_string(), "setup broke");
    assert!(cleaned.load(Ordering::SeqCst));
    assert!(!tests_ran.load(Ordering::SeqCst));
}

#[tokio::test]
async fn failing_cleanup_rejects_the_run() {
    let suite = Suite::new()
        .test("t", || Ok(TestReturn::Done))
        .cleanup(|| Err(HarnessError::failure("teardown broke")));
    let error = run(&suite).await.unwrap_err();
    assert_eq!(error.to_string(), "teardown broke");
}

#[tokio::test]
async fn hook_outcomes_never_appear_in_the_report() {
    let suite = Suite::new()
        .initialize(|| Ok(TestReturn::Done))
        .test("only", || Ok(TestReturn::Done))
        .cleanup(|| Ok(TestReturn::Done));
    let results = run(&suite).await.unwrap();
    assert_eq!(results.len(), 1);
    assert!(results.outcome("initialize").is_none());
    assert!(results.outcome("cleanup").is_none());
}

#[tokio::test]
async fn suite_label_is_copied_into_the_report() {
    let suite = Suite::named("labelled").test("t", || Ok(TestReturn::Done));
    let results = run(&suite).await.unwrap();
    assert_eq!(results.name(), Some("labelled"));

    let unnamed = Suite::new().test("t", || Ok(TestReturn::Done));
    let results = run(&unnamed).await.unwrap();
    assert_eq!(results.name(), None);
}

#[tokio::test]
async fn index_like_names_are_not_run() {
    let ran = Arc::new(AtomicBool::new(false));
    let mark = ran.clone();
    let suite = Suite::new()
        .test("0", move || {
            mark.store(true, Ordering::SeqCst);
            Ok(TestReturn::Done)
        })
        .test("real", || Ok(TestReturn::Done));
    let results = run(&suite).await.unwrap();
    assert_eq!(results.len(), 1);
    assert!(results.outcome("0").is_none());
    assert!(!ran.load(Ordering::SeqCst));
}

#[tokio::test]
async fn a_suite_can_be_run_repeatedly() {
    let suite = Suite::new().test("t", || Ok(TestReturn::Done));
    let first = run(&suite).await.unwrap();
    let second = run(&suite).await.unwrap();
    assert!(first.outcome("t").unwrap().success());
    assert!(second.outcome("t").unwrap().success());
}
