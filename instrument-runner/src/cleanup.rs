// Copyright (c) The instrument-junit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hooks that run after each test ends.
//!
//! Some harnesses keep every executed test instance alive until the run finishes. Clearing the
//! instance's reference fields lets whatever they point to be reclaimed early, which matters on
//! memory-constrained devices. Hosts without that retention behavior can use [`NoCleanup`].

use crate::{errors::DisplayErrorChain, host::TestCase, model::test_key, runner::LOG_TAG};
use std::fmt;
use tracing::{debug, trace};

/// Runs after every test case ends, before the minimum-duration guard.
pub trait PostTestHook: fmt::Debug + Send + Sync {
    /// Performs cleanup on a finished test case.
    fn after_test(&self, test: &dyn TestCase);
}

/// Clears every non-static reference field declared by the test's class hierarchy.
///
/// The walk starts at the concrete class and stops before the framework's base test-case class.
/// A field that can't be cleared is skipped.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReleaseFixtures;

impl PostTestHook for ReleaseFixtures {
    fn after_test(&self, test: &dyn TestCase) {
        let key = test_key(test);
        debug!(target: LOG_TAG, "cleaning up: {key}");

        let mut released = 0usize;
        let mut class = Some(test.class());
        while let Some(current) = class {
            if current.is_framework_base() {
                break;
            }
            for field in test.declared_fields(current) {
                if !field.is_releasable() {
                    continue;
                }
                match test.clear_field(current, &field) {
                    Ok(()) => released += 1,
                    Err(error) => {
                        trace!(target: LOG_TAG, "{}", DisplayErrorChain::new(error));
                    }
                }
            }
            class = current.superclass();
        }

        debug!(target: LOG_TAG, "cleaned up: {key} ({released} fields released)");
    }
}

/// Does nothing after each test.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCleanup;

impl PostTestHook for NoCleanup {
    fn after_test(&self, _test: &dyn TestCase) {}
}
