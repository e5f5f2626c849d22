// Copyright (c) The instrument-junit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The runner adapter that wires JUnit reporting into an instrumentation host.

use crate::{
    cleanup::{PostTestHook, ReleaseFixtures},
    config::{ArgumentBundle, RunnerArgs},
    errors::DisplayErrorChain,
    host::{InstrumentationHost, TestRunnerHandle},
    listener::JunitTestListener,
    model::OutcomeModel,
    output::{OutputLayout, ReportSummary, ReportWriter},
};
use debug_ignore::DebugIgnore;
use derive_where::derive_where;
use instrument_junit::SuiteClock;
use std::sync::Arc;
use tracing::{debug, warn};

/// The log target for every message emitted by this crate.
pub(crate) const LOG_TAG: &str = "JunitInstrumentationRunner";

/// An instrumentation runner that writes a JUnit XML report per namespace when the run finishes.
///
/// The host calls [`on_create`](Self::on_create), then [`test_runner`](Self::test_runner), runs
/// the tests, and finally calls [`finish`](Self::finish). Each of these delegates to the
/// corresponding [`InstrumentationHost`] method.
#[derive_where(Debug)]
pub struct JunitInstrumentationRunner<H> {
    host: DebugIgnore<H>,
    args: RunnerArgs,
    layout: Option<OutputLayout>,
    model: Arc<OutcomeModel>,
    hook: Arc<dyn PostTestHook>,
    clock: SuiteClock,
    output_enabled: bool,
    listener_attached: bool,
}

impl<H: InstrumentationHost> JunitInstrumentationRunner<H> {
    /// Creates a new runner on top of `host`.
    pub fn new(host: H) -> Self {
        Self {
            host: DebugIgnore(host),
            args: RunnerArgs::default(),
            layout: None,
            model: Arc::new(OutcomeModel::new()),
            hook: Arc::new(ReleaseFixtures),
            clock: SuiteClock::System,
            output_enabled: false,
            listener_attached: false,
        }
    }

    /// Sets the hook run after each test. Defaults to [`ReleaseFixtures`].
    pub fn set_post_test_hook(&mut self, hook: impl PostTestHook + 'static) -> &mut Self {
        self.hook = Arc::new(hook);
        self
    }

    /// Sets the clock used for suite timestamps. Defaults to [`SuiteClock::System`].
    pub fn set_suite_clock(&mut self, clock: SuiteClock) -> &mut Self {
        self.clock = clock;
        self
    }

    /// Reads arguments, resolves the output location, deletes stale reports, and then
    /// initializes the host.
    ///
    /// Stale reports are deleted even if reports are disabled for this run.
    pub fn on_create(&mut self, arguments: Option<&ArgumentBundle>) {
        debug!(
            target: LOG_TAG,
            "creating the test runner with arguments: {:?}",
            arguments.map(|args| args.keys().collect::<Vec<_>>()),
        );

        self.args = RunnerArgs::from_bundle(arguments);
        let host = &self.host;
        let layout = OutputLayout::resolve(&self.args, || host.files_dir());
        match layout.purge_stale_reports() {
            Ok(removed) => {
                debug!(
                    target: LOG_TAG,
                    "deleted {removed} stale reports from {}",
                    layout.directory()
                );
            }
            Err(err) => {
                warn!(target: LOG_TAG, "{}", DisplayErrorChain::new(&err));
            }
        }
        self.layout = Some(layout);

        self.host.on_create(arguments);
    }

    /// Acquires the host's test runner, attaching the JUnit listener if reports are enabled.
    ///
    /// Reports are enabled if `junitXmlOutput` is true and the harness isn't in `count` or `log`
    /// mode. The listener is attached at most once.
    pub fn test_runner(&mut self) -> &mut H::Runner {
        debug!(target: LOG_TAG, "getting test runner");

        let enabled = self.args.reports_enabled();
        let runner = self.host.test_runner();
        if enabled {
            debug!(target: LOG_TAG, "JUnit test output enabled");
            if !self.listener_attached {
                runner.add_test_listener(Arc::new(JunitTestListener::new(
                    self.model.clone(),
                    self.hook.clone(),
                )));
                self.listener_attached = true;
            }
        } else {
            debug!(target: LOG_TAG, "JUnit test output disabled");
        }
        self.output_enabled = enabled;

        runner
    }

    /// Writes one report per namespace if reports are enabled, then finishes the host.
    ///
    /// Report failures are logged and counted in the returned summary; the host is finished
    /// regardless.
    pub fn finish(&mut self, result_code: i32, results: &ArgumentBundle) -> ReportSummary {
        debug!(target: LOG_TAG, "finishing test run");

        let summary = match (&self.layout, self.output_enabled) {
            (Some(layout), true) => {
                let writer = ReportWriter::new(layout, self.args.element_style, self.clock.clone());
                self.model.with_tree(|tree| writer.write_all(tree))
            }
            (None, true) => {
                warn!(target: LOG_TAG, "output location was never resolved, skipping reports");
                ReportSummary::default()
            }
            (_, false) => ReportSummary::default(),
        };

        self.host.finish(result_code, results);
        summary
    }

    /// Returns the arguments read during [`on_create`](Self::on_create).
    pub fn args(&self) -> &RunnerArgs {
        &self.args
    }

    /// Returns the resolved output layout, once [`on_create`](Self::on_create) has run.
    pub fn layout(&self) -> Option<&OutputLayout> {
        self.layout.as_ref()
    }

    /// Returns true if the listener was attached for this run.
    pub fn is_output_enabled(&self) -> bool {
        self.output_enabled
    }

    /// Returns the model outcomes are recorded into.
    pub fn model(&self) -> &Arc<OutcomeModel> {
        &self.model
    }

    /// Returns the underlying host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Returns the underlying host, mutably.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}
