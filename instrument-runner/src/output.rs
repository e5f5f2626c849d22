// Copyright (c) The instrument-junit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Where reports go, and writing them there.

use crate::{
    config::RunnerArgs,
    errors::{DisplayErrorChain, PurgeError, WriteReportError},
    runner::LOG_TAG,
};
use camino::{Utf8Path, Utf8PathBuf};
use instrument_junit::{ElementStyle, NO_PACKAGE, NamespaceGroup, OutcomeTree, SuiteClock};
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
};
use tracing::{debug, error};

/// The report file name suffix used when none is configured.
pub static DEFAULT_FILE_SUFFIX: &str = "-TEST.xml";

/// The directory and file name suffix for reports.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OutputLayout {
    directory: Utf8PathBuf,
    suffix: String,
}

impl OutputLayout {
    /// Creates a new `OutputLayout`.
    pub fn new(directory: impl Into<Utf8PathBuf>, suffix: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            suffix: suffix.into(),
        }
    }

    /// Resolves the layout from runner arguments, falling back to `files_dir` and
    /// [`DEFAULT_FILE_SUFFIX`].
    ///
    /// `files_dir` is only called if no directory was configured.
    pub fn resolve(args: &RunnerArgs, files_dir: impl FnOnce() -> Utf8PathBuf) -> Self {
        let directory = args.output_directory.clone().unwrap_or_else(files_dir);
        let suffix = args
            .file_suffix
            .clone()
            .unwrap_or_else(|| DEFAULT_FILE_SUFFIX.to_owned());
        Self { directory, suffix }
    }

    /// Returns the report directory.
    pub fn directory(&self) -> &Utf8Path {
        &self.directory
    }

    /// Returns the report file name suffix.
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Returns the report path for `namespace`: the namespace, or [`NO_PACKAGE`] if absent,
    /// followed by the suffix.
    pub fn report_path(&self, namespace: Option<&str>) -> Utf8PathBuf {
        self.directory.join(format!(
            "{}{}",
            namespace.unwrap_or(NO_PACKAGE),
            self.suffix
        ))
    }

    /// Deletes every file in the report directory whose name ends with the suffix.
    ///
    /// The directory is created first if it doesn't exist. Failures to create the directory or to
    /// delete an individual file are logged and skipped. Returns the number of files deleted.
    pub fn purge_stale_reports(&self) -> Result<usize, PurgeError> {
        if let Err(error) = fs::create_dir_all(&self.directory) {
            debug!(
                target: LOG_TAG,
                "unable to create output directory {}: {error}", self.directory
            );
        }

        let entries = self
            .directory
            .read_dir_utf8()
            .map_err(|error| PurgeError::new(&self.directory, error))?;

        let mut removed = 0;
        for entry in entries {
            // Non-UTF-8 names can't end with the suffix.
            let Ok(entry) = entry else {
                continue;
            };
            if !entry.file_name().ends_with(&self.suffix) {
                continue;
            }
            if entry.file_type().is_ok_and(|ty| ty.is_dir()) {
                continue;
            }
            match fs::remove_file(entry.path()) {
                Ok(()) => {
                    debug!(target: LOG_TAG, "deleted stale report {}", entry.path());
                    removed += 1;
                }
                Err(error) => {
                    debug!(
                        target: LOG_TAG,
                        "unable to delete stale report {}: {error}",
                        entry.path()
                    );
                }
            }
        }

        Ok(removed)
    }
}

/// The result of writing every namespace's report.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ReportSummary {
    /// The reports that were written, in namespace order.
    pub written: Vec<Utf8PathBuf>,

    /// The number of namespaces whose report could not be written.
    pub failed: usize,
}

/// Writes one report file per namespace.
#[derive(Clone, Debug)]
pub struct ReportWriter<'a> {
    layout: &'a OutputLayout,
    style: ElementStyle,
    clock: SuiteClock,
}

impl<'a> ReportWriter<'a> {
    /// Creates a new `ReportWriter`.
    pub fn new(layout: &'a OutputLayout, style: ElementStyle, clock: SuiteClock) -> Self {
        Self {
            layout,
            style,
            clock,
        }
    }

    /// Writes a report for every namespace in `tree`, in the order namespaces were first seen.
    ///
    /// A failure on one namespace is logged and doesn't stop the others.
    pub fn write_all(&self, tree: &OutcomeTree) -> ReportSummary {
        debug!(target: LOG_TAG, "namespaces: {}", tree.namespaces().len());

        let mut summary = ReportSummary::default();
        for namespace in tree.namespaces() {
            debug!(target: LOG_TAG, "processing namespace {}", namespace.file_stem());
            match self.write_namespace(namespace) {
                Ok(path) => summary.written.push(path),
                Err(err) => {
                    error!(target: LOG_TAG, "{}", DisplayErrorChain::new(&err));
                    summary.failed += 1;
                }
            }
        }
        summary
    }

    /// Writes the report for a single namespace, returning its path.
    ///
    /// The file is closed before this returns, whether or not writing succeeded.
    pub fn write_namespace(
        &self,
        namespace: &NamespaceGroup,
    ) -> Result<Utf8PathBuf, WriteReportError> {
        let path = self.layout.report_path(namespace.namespace());
        debug!(target: LOG_TAG, "writing to file {path}");

        let f = File::create(&path).map_err(|error| WriteReportError::Fs {
            file: path.clone(),
            error,
        })?;
        let mut writer = BufWriter::new(f);
        namespace
            .serialize_with(self.style, &self.clock, &mut writer)
            .map_err(|error| WriteReportError::Junit {
                file: path.clone(),
                error,
            })?;
        writer.flush().map_err(|error| WriteReportError::Fs {
            file: path.clone(),
            error,
        })?;

        Ok(path)
    }
}
