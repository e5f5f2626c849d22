// Copyright (c) The instrument-junit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! An instrumentation runner extension that writes a JUnit XML report per test namespace.
//!
//! [`JunitInstrumentationRunner`](runner::JunitInstrumentationRunner) wraps an
//! [`InstrumentationHost`](host::InstrumentationHost). When the host hands out its test runner, a
//! [`JunitTestListener`](listener::JunitTestListener) is attached that times each test, records
//! errors and failures, and runs a post-test hook. When the run finishes, the recorded outcomes
//! are written out through [`instrument_junit`].

pub mod cleanup;
pub mod config;
pub mod context;
pub mod errors;
pub mod host;
pub mod listener;
pub mod model;
pub mod output;
pub mod runner;
mod stopwatch;
