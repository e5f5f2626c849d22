// Copyright (c) The instrument-junit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Serialize a `NamespaceGroup` in the legacy instrumentation layout.

use crate::{NamespaceGroup, SerializeError, SuiteClock, TestClassGroup, TestOutcome, Throwable};
use quick_xml::{
    Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};
use std::{
    borrow::Cow,
    io::{self, Write},
};

static TESTSUITES_TAG: &str = "testsuites";
static TESTSUITE_TAG: &str = "testsuite";
static TESTCASE_TAG: &str = "testcase";
// Downstream parsers of this layout expect the plural names for payload elements too.
static ERRORS_TAG: &str = "errors";
static FAILURES_TAG: &str = "failures";
static PROPERTIES_TAG: &str = "properties";
static SYSTEM_OUT_TAG: &str = "system-out";
static SYSTEM_ERR_TAG: &str = "system-err";

static TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub(crate) fn serialize_namespace(
    namespace: &NamespaceGroup,
    clock: &SuiteClock,
    writer: impl io::Write,
) -> Result<(), SerializeError> {
    let mut writer = Writer::new_with_indent(writer, b' ', 4);

    let decl = BytesDecl::new("1.0", Some("UTF-8"), None);
    writer.write_event(Event::Decl(decl))?;

    serialize_start_tag(TESTSUITES_TAG, &mut writer)?;
    for class in namespace.classes() {
        serialize_testsuite(class, clock, &mut writer)?;
    }
    serialize_end_tag(TESTSUITES_TAG, &mut writer)?;

    // Add a trailing newline.
    let mut inner = writer.into_inner();
    inner.write_all(b"\n")?;
    inner.flush()?;

    Ok(())
}

fn serialize_testsuite(
    class: &TestClassGroup,
    clock: &SuiteClock,
    writer: &mut Writer<impl io::Write>,
) -> Result<(), SerializeError> {
    let timestamp = clock.now().format(TIMESTAMP_FORMAT).to_string();
    let name = sanitize_text(class.class_name());
    let package = sanitize_text(class.namespace().unwrap_or(""));

    let mut testsuite_tag = BytesStart::new(TESTSUITE_TAG);
    testsuite_tag.extend_attributes([
        ("errors", class.errors().to_string().as_str()),
        ("failures", class.failures().to_string().as_str()),
        ("name", &*name),
        ("package", &*package),
        ("tests", class.tests().to_string().as_str()),
        ("time", serialize_millis(class.total_millis()).as_str()),
        ("timestamp", timestamp.as_str()),
    ]);
    writer.write_event(Event::Start(testsuite_tag))?;

    for outcome in class.outcomes() {
        serialize_testcase(outcome, writer)?;
    }

    // These are always present, even when empty.
    for tag_name in [PROPERTIES_TAG, SYSTEM_OUT_TAG, SYSTEM_ERR_TAG] {
        writer.write_event(Event::Empty(BytesStart::new(tag_name)))?;
    }

    serialize_end_tag(TESTSUITE_TAG, writer)
}

fn serialize_testcase(
    outcome: &TestOutcome,
    writer: &mut Writer<impl io::Write>,
) -> Result<(), SerializeError> {
    let classname = sanitize_text(outcome.class_name());
    let name = sanitize_text(outcome.name());

    let mut testcase_tag = BytesStart::new(TESTCASE_TAG);
    testcase_tag.extend_attributes([
        ("classname", &*classname),
        ("name", &*name),
        ("time", serialize_millis(outcome.millis()).as_str()),
    ]);

    if outcome.error.is_none() && outcome.failure.is_none() {
        writer.write_event(Event::Empty(testcase_tag))?;
        return Ok(());
    }

    writer.write_event(Event::Start(testcase_tag))?;
    if let Some(error) = &outcome.error {
        serialize_payload(error, ERRORS_TAG, writer)?;
    }
    if let Some(failure) = &outcome.failure {
        serialize_payload(failure, FAILURES_TAG, writer)?;
    }
    serialize_end_tag(TESTCASE_TAG, writer)
}

fn serialize_payload(
    throwable: &Throwable,
    tag_name: &'static str,
    writer: &mut Writer<impl io::Write>,
) -> Result<(), SerializeError> {
    let stack_trace = sanitize_text(&throwable.stack_trace);
    serialize_start_tag(tag_name, writer)?;
    writer.write_event(Event::Text(BytesText::new(&stack_trace)))?;
    serialize_end_tag(tag_name, writer)
}

fn serialize_start_tag(
    tag_name: &'static str,
    writer: &mut Writer<impl io::Write>,
) -> Result<(), SerializeError> {
    writer.write_event(Event::Start(BytesStart::new(tag_name)))?;
    Ok(())
}

fn serialize_end_tag(
    tag_name: &'static str,
    writer: &mut Writer<impl io::Write>,
) -> Result<(), SerializeError> {
    writer.write_event(Event::End(BytesEnd::new(tag_name)))?;
    Ok(())
}

/// Removes ANSI escape sequences and characters that XML 1.0 doesn't allow.
///
/// Tabs and line breaks are kept, since stack traces are indented with tabs.
pub(crate) fn sanitize_text(text: &str) -> Cow<'_, str> {
    if !text.chars().any(is_disallowed) {
        return Cow::Borrowed(text);
    }

    let mut sanitized = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\u{1b}' {
            // A CSI sequence: ESC, '[', parameter and intermediate bytes, then one final byte.
            if chars.next_if_eq(&'[').is_some() {
                while chars.next_if(|c| ('\u{20}'..='\u{3f}').contains(c)).is_some() {}
                chars.next_if(|c| ('\u{40}'..='\u{7e}').contains(c));
            }
            continue;
        }
        if !is_disallowed(c) {
            sanitized.push(c);
        }
    }
    Cow::Owned(sanitized)
}

fn is_disallowed(c: char) -> bool {
    matches!(
        c,
        '\u{0}'..='\u{8}' | '\u{b}' | '\u{c}' | '\u{e}'..='\u{1f}' | '\u{fffe}' | '\u{ffff}'
    )
}

/// Renders a millisecond count as seconds.
///
/// This is the shortest decimal that round-trips, and always has a fractional part: `0.15`,
/// `0.04`, `1.0`.
pub(crate) fn serialize_millis(millis: u64) -> String {
    format!("{:?}", millis as f64 / 1000.0)
}
