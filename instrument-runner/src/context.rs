// Copyright (c) The instrument-junit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-thread context loader.
//!
//! When a test starts, the loader that defined its class is installed here so that resource
//! lookups made on the test's thread resolve against the test's own loader.

use crate::host::ClassLoader;
use std::cell::RefCell;

thread_local! {
    static CONTEXT_LOADER: RefCell<Option<ClassLoader>> = const { RefCell::new(None) };
}

/// Returns the context loader installed on the current thread.
pub fn context_loader() -> Option<ClassLoader> {
    CONTEXT_LOADER.with(|loader| loader.borrow().clone())
}

/// Installs `loader` as the current thread's context loader, returning the previous one.
pub fn set_context_loader(loader: ClassLoader) -> Option<ClassLoader> {
    CONTEXT_LOADER.with(|current| current.borrow_mut().replace(loader))
}
