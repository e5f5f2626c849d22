// Copyright (c) The instrument-junit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    errors::SerializeError,
    serialize::serialize_namespace,
    strict::serialize_namespace_strict,
};
use chrono::{DateTime, FixedOffset, Local};
use indexmap::map::IndexMap;
use std::{fmt, io, time::Duration};

/// The file-name stem used for tests that don't belong to any namespace.
pub static NO_PACKAGE: &str = "NO_PACKAGE";

/// Identifies a single test method within the outcome tree.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct TestKey<'a> {
    /// The namespace the test class belongs to, if any.
    pub namespace: Option<&'a str>,

    /// The fully qualified name of the test class.
    pub class_name: &'a str,

    /// The name of the test method.
    pub name: &'a str,
}

impl<'a> TestKey<'a> {
    /// Creates a new `TestKey`.
    pub fn new(namespace: Option<&'a str>, class_name: &'a str, name: &'a str) -> Self {
        Self {
            namespace,
            class_name,
            name,
        }
    }
}

impl fmt::Display for TestKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.class_name, self.name)
    }
}

/// An error or failure raised by a test, as rendered by the host platform.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Throwable {
    /// The type of the throwable, e.g. `java.lang.IllegalStateException`.
    pub ty: Option<String>,

    /// The short message carried by the throwable.
    pub message: Option<String>,

    /// The full multi-line stack trace, as printed by the platform's standard trace printer.
    pub stack_trace: String,
}

impl Throwable {
    /// Creates a new `Throwable` from its rendered stack trace.
    pub fn new(stack_trace: impl Into<String>) -> Self {
        Self {
            ty: None,
            message: None,
            stack_trace: stack_trace.into(),
        }
    }

    /// Sets the type of the throwable.
    pub fn set_type(&mut self, ty: impl Into<String>) -> &mut Self {
        self.ty = Some(ty.into());
        self
    }

    /// Sets the message of the throwable.
    pub fn set_message(&mut self, message: impl Into<String>) -> &mut Self {
        self.message = Some(message.into());
        self
    }
}

/// The recorded result of a single test method.
#[derive(Clone, Debug)]
pub struct TestOutcome {
    namespace: Option<String>,
    class_name: String,
    name: String,

    /// The wall-clock time the test took, from start to end.
    pub time: Duration,

    /// An unexpected throwable raised while the test ran.
    pub error: Option<Throwable>,

    /// An assertion violation raised while the test ran.
    pub failure: Option<Throwable>,
}

impl TestOutcome {
    fn new(key: TestKey<'_>) -> Self {
        Self {
            namespace: key.namespace.map(str::to_owned),
            class_name: key.class_name.to_owned(),
            name: key.name.to_owned(),
            time: Duration::ZERO,
            error: None,
            failure: None,
        }
    }

    /// Returns the namespace of the owning test class.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Returns the fully qualified name of the owning test class.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Returns the name of the test method.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the recorded time in whole milliseconds.
    pub fn millis(&self) -> u64 {
        u64::try_from(self.time.as_millis()).unwrap_or(u64::MAX)
    }

    /// Sets the time taken by this test.
    pub fn set_time(&mut self, time: Duration) -> &mut Self {
        self.time = time;
        self
    }

    /// Records an unexpected throwable.
    pub fn set_error(&mut self, error: Throwable) -> &mut Self {
        self.error = Some(error);
        self
    }

    /// Records an assertion failure.
    pub fn set_failure(&mut self, failure: Throwable) -> &mut Self {
        self.failure = Some(failure);
        self
    }
}

/// All the outcomes observed for one test class, in first-seen order.
#[derive(Clone, Debug)]
pub struct TestClassGroup {
    class_name: String,
    namespace: Option<String>,
    outcomes: IndexMap<String, TestOutcome>,
}

impl TestClassGroup {
    fn new(namespace: Option<&str>, class_name: &str) -> Self {
        Self {
            class_name: class_name.to_owned(),
            namespace: namespace.map(str::to_owned),
            outcomes: IndexMap::new(),
        }
    }

    /// Returns the fully qualified name of this test class.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Returns the namespace of this test class.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Iterates over the outcomes in this group, in the order the tests were first seen.
    pub fn outcomes(&self) -> impl ExactSizeIterator<Item = &TestOutcome> {
        self.outcomes.values()
    }

    /// Returns the outcome for the given method name.
    pub fn get(&self, name: &str) -> Option<&TestOutcome> {
        self.outcomes.get(name)
    }

    /// Returns the number of outcomes in this group.
    pub fn tests(&self) -> usize {
        self.outcomes.len()
    }

    /// Returns the number of outcomes that recorded an error.
    pub fn errors(&self) -> usize {
        self.outcomes().filter(|o| o.error.is_some()).count()
    }

    /// Returns the number of outcomes that recorded a failure.
    pub fn failures(&self) -> usize {
        self.outcomes().filter(|o| o.failure.is_some()).count()
    }

    /// Returns the sum of outcome times, in whole milliseconds.
    ///
    /// Each outcome is truncated to milliseconds before summing.
    pub fn total_millis(&self) -> u64 {
        self.outcomes()
            .fold(0u64, |acc, outcome| acc.saturating_add(outcome.millis()))
    }
}

/// All the test classes observed within one namespace, in first-seen order.
#[derive(Clone, Debug)]
pub struct NamespaceGroup {
    namespace: Option<String>,
    classes: IndexMap<String, TestClassGroup>,
}

impl NamespaceGroup {
    fn new(namespace: Option<&str>) -> Self {
        Self {
            namespace: namespace.map(str::to_owned),
            classes: IndexMap::new(),
        }
    }

    /// Returns the namespace identifier, or `None` for tests without one.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Returns the stem used to name this namespace's report file.
    ///
    /// This is [`NO_PACKAGE`] if the namespace is absent.
    pub fn file_stem(&self) -> &str {
        self.namespace().unwrap_or(NO_PACKAGE)
    }

    /// Iterates over the test classes in this namespace, in the order they were first seen.
    pub fn classes(&self) -> impl ExactSizeIterator<Item = &TestClassGroup> {
        self.classes.values()
    }

    /// Returns the group for the given test class.
    pub fn get(&self, class_name: &str) -> Option<&TestClassGroup> {
        self.classes.get(class_name)
    }

    /// Returns the total number of outcomes across all classes in this namespace.
    pub fn tests(&self) -> usize {
        self.classes().map(TestClassGroup::tests).sum()
    }

    /// Serializes this namespace as a legacy instrumentation report.
    pub fn serialize(
        &self,
        clock: &SuiteClock,
        writer: impl io::Write,
    ) -> Result<(), SerializeError> {
        serialize_namespace(self, clock, writer)
    }

    /// Serializes this namespace with the requested element style.
    pub fn serialize_with(
        &self,
        style: ElementStyle,
        clock: &SuiteClock,
        writer: impl io::Write,
    ) -> Result<(), SerializeError> {
        match style {
            ElementStyle::Legacy => serialize_namespace(self, clock, writer),
            ElementStyle::Strict => serialize_namespace_strict(self, clock, writer),
        }
    }

    /// Serializes this namespace to a string.
    pub fn to_string_with(
        &self,
        style: ElementStyle,
        clock: &SuiteClock,
    ) -> Result<String, SerializeError> {
        let mut buf: Vec<u8> = vec![];
        self.serialize_with(style, clock, &mut buf)?;
        String::from_utf8(buf).map_err(SerializeError::from)
    }
}

/// The tree of every outcome observed during a run: namespace, then class, then method.
///
/// Iteration at every level follows insertion order.
#[derive(Clone, Debug, Default)]
pub struct OutcomeTree {
    namespaces: IndexMap<Option<String>, NamespaceGroup>,
}

impl OutcomeTree {
    /// Creates a new, empty `OutcomeTree`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the outcome for `key`, creating it and any missing groups on first reference.
    ///
    /// A second call with the same key returns the existing outcome rather than a fresh one. A
    /// re-run under the same name replaces only the fields it sets: an error or failure recorded
    /// by an earlier run survives a passing re-run.
    pub fn outcome_mut(&mut self, key: TestKey<'_>) -> &mut TestOutcome {
        let namespace = self
            .namespaces
            .entry(key.namespace.map(str::to_owned))
            .or_insert_with(|| NamespaceGroup::new(key.namespace));
        let class = namespace
            .classes
            .entry(key.class_name.to_owned())
            .or_insert_with(|| TestClassGroup::new(key.namespace, key.class_name));
        class
            .outcomes
            .entry(key.name.to_owned())
            .or_insert_with(|| TestOutcome::new(key))
    }

    /// Returns the outcome for `key` if it was recorded.
    pub fn get(&self, key: TestKey<'_>) -> Option<&TestOutcome> {
        self.namespaces
            .get(&key.namespace.map(str::to_owned))?
            .get(key.class_name)?
            .get(key.name)
    }

    /// Iterates over namespaces in the order they were first seen.
    pub fn namespaces(&self) -> impl ExactSizeIterator<Item = &NamespaceGroup> {
        self.namespaces.values()
    }

    /// Returns the group for the given namespace.
    pub fn namespace(&self, namespace: Option<&str>) -> Option<&NamespaceGroup> {
        self.namespaces.get(&namespace.map(str::to_owned))
    }

    /// Returns the total number of outcomes in the tree.
    pub fn len(&self) -> usize {
        self.namespaces().map(NamespaceGroup::tests).sum()
    }

    /// Returns true if no outcomes have been recorded.
    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }
}

/// The element style used when serializing reports.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ElementStyle {
    /// The legacy instrumentation layout, with plural `errors` and `failures` payload elements.
    #[default]
    Legacy,

    /// Standard JUnit XML, with singular `error` and `failure` elements.
    Strict,
}

/// The source of `testsuite/@timestamp` values.
#[derive(Clone, Debug, Default)]
pub enum SuiteClock {
    /// The current local time, read when each suite is emitted.
    #[default]
    System,

    /// A fixed time, used for every suite.
    Fixed(DateTime<FixedOffset>),
}

impl SuiteClock {
    /// Returns the time to stamp on the next suite.
    pub fn now(&self) -> DateTime<FixedOffset> {
        match self {
            SuiteClock::System => Local::now().fixed_offset(),
            SuiteClock::Fixed(time) => *time,
        }
    }
}
