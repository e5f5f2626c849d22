// Copyright (c) The instrument-junit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Serialize a `NamespaceGroup` as standard JUnit XML.
//!
//! Standard consumers expect singular `error` and `failure` elements carrying a single status per
//! testcase, so this path goes through `quick-junit` rather than the legacy writer.

use crate::{NamespaceGroup, SerializeError, SuiteClock, TestClassGroup, TestOutcome, Throwable};
use quick_junit::{NonSuccessKind, Report, TestCase, TestCaseStatus, TestSuite};
use std::{io, time::Duration};

pub(crate) fn serialize_namespace_strict(
    namespace: &NamespaceGroup,
    clock: &SuiteClock,
    writer: impl io::Write,
) -> Result<(), SerializeError> {
    let mut report = Report::new(namespace.file_stem());
    report.add_test_suites(namespace.classes().map(|class| testsuite_for(class, clock)));
    report.serialize(writer)?;
    Ok(())
}

fn testsuite_for(class: &TestClassGroup, clock: &SuiteClock) -> TestSuite {
    let mut testsuite = TestSuite::new(class.class_name());
    testsuite
        .set_timestamp(clock.now())
        .set_time(Duration::from_millis(class.total_millis()));
    testsuite
        .extra
        .insert("package".into(), class.namespace().unwrap_or("").into());

    for outcome in class.outcomes() {
        let mut testcase = TestCase::new(outcome.name(), status_for(outcome));
        testcase
            .set_classname(outcome.class_name())
            .set_time(Duration::from_millis(outcome.millis()));
        testsuite.add_test_case(testcase);
    }

    testsuite
}

// An error takes precedence over a failure. If both are present, the failure's trace follows the
// error's in the description.
fn status_for(outcome: &TestOutcome) -> TestCaseStatus {
    match (&outcome.error, &outcome.failure) {
        (None, None) => TestCaseStatus::success(),
        (Some(error), None) => non_success(NonSuccessKind::Error, error, None),
        (None, Some(failure)) => non_success(NonSuccessKind::Failure, failure, None),
        (Some(error), Some(failure)) => non_success(NonSuccessKind::Error, error, Some(failure)),
    }
}

fn non_success(
    kind: NonSuccessKind,
    throwable: &Throwable,
    also: Option<&Throwable>,
) -> TestCaseStatus {
    let mut status = TestCaseStatus::non_success(kind);
    if let Some(message) = &throwable.message {
        status.set_message(message.as_str());
    }
    if let Some(ty) = &throwable.ty {
        status.set_type(ty.as_str());
    }
    match also {
        Some(also) => {
            status.set_description(format!("{}\n{}", throwable.stack_trace, also.stack_trace));
        }
        None => {
            status.set_description(throwable.stack_trace.as_str());
        }
    }
    status
}
