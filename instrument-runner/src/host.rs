// Copyright (c) The instrument-junit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The contract between this crate and the instrumentation harness that hosts it.
//!
//! The harness discovers and executes tests; this crate only observes them. Tests reach the
//! listener as [`Test`] objects, and the runner adapter drives an [`InstrumentationHost`].

use crate::{config::ArgumentBundle, errors::FieldAccessError};
use camino::Utf8PathBuf;
pub use instrument_junit::Throwable;
use std::{fmt, sync::Arc};

/// Any object the harness runs.
pub trait Test: fmt::Debug + Send + Sync {
    /// Returns this object as a standard test case, if it is one.
    ///
    /// Objects that aren't test cases, such as suites, are ignored by the listener.
    fn as_test_case(&self) -> Option<&dyn TestCase> {
        None
    }
}

/// A single test method bound to an instance of its test class.
pub trait TestCase: Send + Sync {
    /// Returns the name of the test method.
    fn name(&self) -> &str;

    /// Returns the concrete class of this test instance.
    fn class(&self) -> &TestClass;

    /// Returns the instance fields declared directly by `class`, one level of the hierarchy.
    fn declared_fields(&self, class: &TestClass) -> Vec<FieldDescriptor> {
        let _ = class;
        Vec::new()
    }

    /// Assigns the empty value to `field` on this instance.
    fn clear_field(
        &self,
        class: &TestClass,
        field: &FieldDescriptor,
    ) -> Result<(), FieldAccessError> {
        Err(FieldAccessError::new(
            class.name(),
            field.name(),
            "field access is not supported by this test case",
        ))
    }
}

/// Describes a test class and its position in the class hierarchy.
#[derive(Clone, Debug)]
pub struct TestClass {
    name: String,
    namespace: Option<String>,
    loader: Option<ClassLoader>,
    superclass: Option<Arc<TestClass>>,
    framework_base: bool,
}

impl TestClass {
    /// Creates a new `TestClass` from its fully qualified name.
    ///
    /// The namespace is everything before the last `.`, or absent if the name has no `.`.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let namespace = name
            .rsplit_once('.')
            .map(|(namespace, _)| namespace.to_owned());
        Self {
            name,
            namespace,
            loader: None,
            superclass: None,
            framework_base: false,
        }
    }

    /// Creates the framework's base test-case class, where hierarchy walks stop.
    pub fn framework_base(name: impl Into<String>) -> Self {
        Self {
            framework_base: true,
            ..Self::new(name)
        }
    }

    /// Overrides the namespace derived from the class name.
    pub fn with_namespace(mut self, namespace: Option<impl Into<String>>) -> Self {
        self.namespace = namespace.map(Into::into);
        self
    }

    /// Sets the loader that defined this class.
    pub fn with_loader(mut self, loader: ClassLoader) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Sets the superclass of this class.
    pub fn with_superclass(mut self, superclass: Arc<TestClass>) -> Self {
        self.superclass = Some(superclass);
        self
    }

    /// Returns the fully qualified name of this class.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the namespace of this class, if any.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Returns the loader that defined this class, if known.
    pub fn loader(&self) -> Option<&ClassLoader> {
        self.loader.as_ref()
    }

    /// Returns the superclass of this class, if any.
    pub fn superclass(&self) -> Option<&TestClass> {
        self.superclass.as_deref()
    }

    /// Returns true if this is the framework's base test-case class.
    pub fn is_framework_base(&self) -> bool {
        self.framework_base
    }
}

/// An opaque handle to the loader that defined a test class.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ClassLoader(Arc<str>);

impl ClassLoader {
    /// Creates a new `ClassLoader` handle with the given identity.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().into())
    }

    /// Returns the identity of this loader.
    pub fn name(&self) -> &str {
        &self.0
    }
}

/// A field declared on a test class.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldDescriptor {
    name: String,
    kind: FieldKind,
    is_static: bool,
}

impl FieldDescriptor {
    /// Creates a new instance field.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            is_static: false,
        }
    }

    /// Marks this field as static.
    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    /// Returns the name of the field.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the kind of value the field holds.
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Returns true if the field is static.
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Returns true if clearing this field can release memory held by the instance.
    pub fn is_releasable(&self) -> bool {
        self.kind == FieldKind::Reference && !self.is_static
    }
}

/// The kind of value held by a [`FieldDescriptor`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FieldKind {
    /// A primitive value stored inline.
    Primitive,

    /// A reference to another object.
    Reference,
}

/// Receives lifecycle callbacks for every test the harness runs.
///
/// For a given test, callbacks arrive as `start_test`, then at most one `add_error` and at most
/// one `add_failure`, then `end_test`, all on one thread. Different tests may run on different
/// threads.
pub trait TestListener: Send + Sync {
    /// Called before the test runs.
    fn start_test(&self, test: &dyn Test);

    /// Called after the test has finished, whatever its result.
    fn end_test(&self, test: &dyn Test);

    /// Called when the test raised an unexpected throwable.
    fn add_error(&self, test: &dyn Test, error: &Throwable);

    /// Called when the test violated an assertion.
    fn add_failure(&self, test: &dyn Test, failure: &Throwable);
}

/// The harness's test runner object, as handed out during runner acquisition.
pub trait TestRunnerHandle {
    /// Registers a listener for test lifecycle callbacks.
    fn add_test_listener(&mut self, listener: Arc<dyn TestListener>);
}

/// The platform instrumentation runner that [`JunitInstrumentationRunner`] extends.
///
/// Each method here is the base implementation the adapter delegates to.
///
/// [`JunitInstrumentationRunner`]: crate::runner::JunitInstrumentationRunner
pub trait InstrumentationHost {
    /// The test runner object handed out by [`test_runner`](Self::test_runner).
    type Runner: TestRunnerHandle;

    /// Initializes the host with the instrumentation arguments.
    fn on_create(&mut self, arguments: Option<&ArgumentBundle>);

    /// Returns the host's test runner object.
    fn test_runner(&mut self) -> &mut Self::Runner;

    /// Returns the per-application private files directory.
    fn files_dir(&self) -> Utf8PathBuf;

    /// Completes the run and reports results to the instrumentation framework.
    fn finish(&mut self, result_code: i32, results: &ArgumentBundle);
}
