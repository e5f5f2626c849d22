// Copyright (c) The instrument-junit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::{io, string::FromUtf8Error};
use thiserror::Error;

/// An error that occurs while serializing a [`NamespaceGroup`](crate::NamespaceGroup).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SerializeError {
    /// Writing to the underlying output failed.
    #[error("error writing JUnit report")]
    Io(#[from] io::Error),

    /// The XML writer reported an error.
    #[error("error producing JUnit XML")]
    Xml(#[from] quick_xml::Error),

    /// Rendering a strict JUnit report failed.
    #[error("error serializing strict JUnit report")]
    Strict(#[from] quick_junit::SerializeError),

    /// The serialized report was not valid UTF-8.
    #[error("serialized JUnit report is not valid UTF-8")]
    Utf8(#[from] FromUtf8Error),
}
