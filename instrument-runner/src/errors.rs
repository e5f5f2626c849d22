// Copyright (c) The instrument-junit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by the instrumentation runner.
//!
//! None of these are returned to the host: the runner logs them and carries on.

use camino::Utf8PathBuf;
use instrument_junit::SerializeError;
use std::{error::Error, fmt};
use thiserror::Error;

/// An error that occurred while writing a single namespace's report.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WriteReportError {
    /// An error occurred while operating on the file system.
    #[error("error operating on path {file}")]
    Fs {
        /// The file being operated on.
        file: Utf8PathBuf,

        /// The underlying IO error.
        #[source]
        error: std::io::Error,
    },

    /// An error occurred while producing JUnit XML.
    #[error("error writing JUnit output to {file}")]
    Junit {
        /// The output file.
        file: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: SerializeError,
    },
}

/// An error that occurred while listing the output directory for stale reports.
#[derive(Debug, Error)]
#[error("error reading output directory {dir}")]
pub struct PurgeError {
    dir: Utf8PathBuf,
    #[source]
    error: std::io::Error,
}

impl PurgeError {
    pub(crate) fn new(dir: impl Into<Utf8PathBuf>, error: std::io::Error) -> Self {
        Self {
            dir: dir.into(),
            error,
        }
    }
}

/// An error that occurred while clearing a field on a test instance.
#[derive(Clone, Debug, Error)]
#[error("cannot clear field `{field}` on `{class}`: {reason}")]
pub struct FieldAccessError {
    class: String,
    field: String,
    reason: String,
}

impl FieldAccessError {
    /// Creates a new `FieldAccessError`.
    pub fn new(
        class: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            class: class.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Displays an error along with every error in its source chain.
pub struct DisplayErrorChain<E> {
    error: E,
}

impl<E: Error> DisplayErrorChain<E> {
    /// Creates a new `DisplayErrorChain`.
    pub fn new(error: E) -> Self {
        Self { error }
    }
}

impl<E: Error> fmt::Display for DisplayErrorChain<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        let Some(mut cause) = self.error.source() else {
            return Ok(());
        };
        write!(f, "\n  caused by:")?;
        loop {
            write!(f, "\n  - {cause}")?;
            match cause.source() {
                Some(next) => cause = next,
                None => return Ok(()),
            }
        }
    }
}
