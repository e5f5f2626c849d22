// Copyright (c) The instrument-junit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The outcome model shared between listener callbacks and report writing.

use crate::host::TestCase;
use instrument_junit::{OutcomeTree, TestKey, TestOutcome};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Collects outcomes for a single run.
///
/// All access goes through one mutex, which covers both the lookup and the insertion of new
/// groups, so insertion order matches the order in which tests were first observed.
#[derive(Debug, Default)]
pub struct OutcomeModel {
    tree: Mutex<OutcomeTree>,
}

impl OutcomeModel {
    /// Creates a new, empty `OutcomeModel`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets or creates the outcome for `test`, then passes it to `f`.
    pub fn record<T>(&self, test: &dyn TestCase, f: impl FnOnce(&mut TestOutcome) -> T) -> T {
        let mut tree = self.lock();
        f(tree.outcome_mut(test_key(test)))
    }

    /// Passes the current tree to `f` for reading.
    pub fn with_tree<T>(&self, f: impl FnOnce(&OutcomeTree) -> T) -> T {
        f(&self.lock())
    }

    /// Returns a copy of the current tree.
    pub fn snapshot(&self) -> OutcomeTree {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, OutcomeTree> {
        // A panic while holding the lock leaves the tree structurally intact.
        self.tree.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub(crate) fn test_key(test: &dyn TestCase) -> TestKey<'_> {
    let class = test.class();
    TestKey::new(class.namespace(), class.name(), test.name())
}
