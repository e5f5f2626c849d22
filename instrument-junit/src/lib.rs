// Copyright (c) The instrument-junit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Record instrumentation test outcomes and write them out as JUnit XML.
//!
//! Outcomes are kept in an [`OutcomeTree`] keyed by namespace, then test class, then test method.
//! Each [`NamespaceGroup`] serializes to one XML document containing a `testsuite` per test class.

mod errors;
mod report;
mod serialize;
mod strict;

pub use errors::*;
pub use report::*;
