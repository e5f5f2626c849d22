// Copyright (c) The instrument-junit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The listener that records test lifecycles into an [`OutcomeModel`].

use crate::{
    cleanup::PostTestHook,
    context::set_context_loader,
    host::{Test, TestListener, Throwable},
    model::{OutcomeModel, test_key},
    runner::LOG_TAG,
    stopwatch::{StopwatchStart, stopwatch},
};
use std::{cell::RefCell, sync::Arc, thread, time::Duration};
use thread_local::ThreadLocal;
use tracing::{debug, warn};

/// The minimum time a test takes, from `start_test` to the return of `end_test`.
///
/// Some devices' inter-process call layers misbehave when tests transition too quickly, so
/// shorter tests are padded out with a sleep.
pub const MINIMUM_TEST_DURATION: Duration = Duration::from_millis(100);

/// Records the time, error, and failure of each test case into an [`OutcomeModel`].
#[derive(Debug)]
pub struct JunitTestListener {
    model: Arc<OutcomeModel>,
    hook: Arc<dyn PostTestHook>,
    minimum_duration: Duration,
    // The harness may fan tests out over worker threads, so each thread has its own start time.
    starts: ThreadLocal<RefCell<Option<StopwatchStart>>>,
}

impl JunitTestListener {
    /// Creates a new listener that records into `model` and runs `hook` after each test.
    pub fn new(model: Arc<OutcomeModel>, hook: Arc<dyn PostTestHook>) -> Self {
        Self {
            model,
            hook,
            minimum_duration: MINIMUM_TEST_DURATION,
            starts: ThreadLocal::new(),
        }
    }

    /// Returns the model this listener records into.
    pub fn model(&self) -> &Arc<OutcomeModel> {
        &self.model
    }
}

impl TestListener for JunitTestListener {
    fn start_test(&self, test: &dyn Test) {
        let Some(test_case) = test.as_test_case() else {
            return;
        };
        if let Some(loader) = test_case.class().loader() {
            set_context_loader(loader.clone());
        }
        *self.starts.get_or_default().borrow_mut() = Some(stopwatch());
    }

    fn end_test(&self, test: &dyn Test) {
        debug!(target: LOG_TAG, "ending test {test:?}");
        let Some(test_case) = test.as_test_case() else {
            debug!(target: LOG_TAG, "ended test {test:?}");
            return;
        };

        let elapsed = match self.starts.get().and_then(|start| start.borrow_mut().take()) {
            Some(start) => {
                let snapshot = start.snapshot();
                debug!(
                    target: LOG_TAG,
                    "{} started at {}, took {:?}",
                    test_key(test_case),
                    snapshot.start_time.format("%H:%M:%S%.3f"),
                    snapshot.duration,
                );
                snapshot.duration
            }
            None => {
                warn!(
                    target: LOG_TAG,
                    "{} ended without a matching start on this thread, recording zero time",
                    test_key(test_case),
                );
                Duration::ZERO
            }
        };

        self.model.record(test_case, |outcome| {
            outcome.set_time(elapsed);
        });
        self.hook.after_test(test_case);

        if let Some(remaining) = self.minimum_duration.checked_sub(elapsed) {
            // Sleeping can't be interrupted here, so the guard always runs to completion.
            thread::sleep(remaining);
        }
        debug!(target: LOG_TAG, "ended test {test:?}");
    }

    fn add_error(&self, test: &dyn Test, error: &Throwable) {
        if let Some(test_case) = test.as_test_case() {
            self.model.record(test_case, |outcome| {
                outcome.set_error(error.clone());
            });
        }
    }

    fn add_failure(&self, test: &dyn Test, failure: &Throwable) {
        if let Some(test_case) = test.as_test_case() {
            self.model.record(test_case, |outcome| {
                outcome.set_failure(failure.clone());
            });
        }
    }
}
