// Copyright (c) The instrument-junit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{FixedOffset, TimeZone};
use color_eyre::eyre::{Result, WrapErr, bail};
use instrument_junit::SuiteClock;
use instrument_runner::{
    config::ArgumentBundle,
    host::{
        InstrumentationHost, Test, TestCase, TestClass, TestListener, TestRunnerHandle, Throwable,
    },
};
use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};
use std::{collections::BTreeMap, sync::Arc, thread, time::Duration};
use tracing_subscriber::filter::LevelFilter;

pub(crate) fn test_init() {
    // Multiple tests may call this; only the first one wins.
    let _ = tracing_subscriber::fmt()
        .with_max_level(LevelFilter::DEBUG)
        .with_test_writer()
        .try_init();
}

pub(crate) fn fixed_clock() -> SuiteClock {
    let offset = FixedOffset::east_opt(0).expect("valid offset");
    SuiteClock::Fixed(
        offset
            .with_ymd_and_hms(2024, 3, 9, 14, 5, 7)
            .single()
            .expect("unambiguous time"),
    )
}

/// What a scripted test reports besides starting and ending.
#[derive(Clone, Debug)]
pub(crate) enum Script {
    Pass,
    Error(&'static str),
    Failure(&'static str),
    ErrorAndFailure(&'static str, &'static str),
}

#[derive(Debug)]
pub(crate) struct FakeTest {
    class: TestClass,
    name: String,
    body: Duration,
    script: Script,
}

impl FakeTest {
    pub(crate) fn new(class: &str, name: &str) -> Self {
        Self {
            class: TestClass::new(class),
            name: name.to_owned(),
            body: Duration::ZERO,
            script: Script::Pass,
        }
    }

    pub(crate) fn with_class(mut self, class: TestClass) -> Self {
        self.class = class;
        self
    }

    pub(crate) fn taking(mut self, millis: u64) -> Self {
        self.body = Duration::from_millis(millis);
        self
    }

    pub(crate) fn scripted(mut self, script: Script) -> Self {
        self.script = script;
        self
    }
}

impl Test for FakeTest {
    fn as_test_case(&self) -> Option<&dyn TestCase> {
        Some(self)
    }
}

impl TestCase for FakeTest {
    fn name(&self) -> &str {
        &self.name
    }

    fn class(&self) -> &TestClass {
        &self.class
    }
}

/// A test runner that drives every attached listener through scripted tests.
#[derive(Default)]
pub(crate) struct FakeRunner {
    listeners: Vec<Arc<dyn TestListener>>,
}

impl FakeRunner {
    pub(crate) fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub(crate) fn run(&self, test: &FakeTest) {
        for listener in &self.listeners {
            listener.start_test(test);
        }
        thread::sleep(test.body);
        match &test.script {
            Script::Pass => {}
            Script::Error(trace) => {
                self.each(|l| l.add_error(test, &Throwable::new(*trace)));
            }
            Script::Failure(trace) => {
                self.each(|l| l.add_failure(test, &Throwable::new(*trace)));
            }
            Script::ErrorAndFailure(error, failure) => {
                self.each(|l| l.add_error(test, &Throwable::new(*error)));
                self.each(|l| l.add_failure(test, &Throwable::new(*failure)));
            }
        }
        for listener in &self.listeners {
            listener.end_test(test);
        }
    }

    pub(crate) fn run_all(&self, tests: &[FakeTest]) {
        for test in tests {
            self.run(test);
        }
    }

    fn each(&self, f: impl Fn(&dyn TestListener)) {
        for listener in &self.listeners {
            f(listener.as_ref());
        }
    }
}

impl TestRunnerHandle for FakeRunner {
    fn add_test_listener(&mut self, listener: Arc<dyn TestListener>) {
        self.listeners.push(listener);
    }
}

pub(crate) struct FakeHost {
    pub(crate) runner: FakeRunner,
    pub(crate) files_dir: Utf8PathBuf,
    pub(crate) created_with: Option<Option<ArgumentBundle>>,
    pub(crate) finished_with: Option<i32>,
}

impl FakeHost {
    pub(crate) fn new(files_dir: &Utf8Path) -> Self {
        Self {
            runner: FakeRunner::default(),
            files_dir: files_dir.to_owned(),
            created_with: None,
            finished_with: None,
        }
    }
}

impl InstrumentationHost for FakeHost {
    type Runner = FakeRunner;

    fn on_create(&mut self, arguments: Option<&ArgumentBundle>) {
        self.created_with = Some(arguments.cloned());
    }

    fn test_runner(&mut self) -> &mut FakeRunner {
        &mut self.runner
    }

    fn files_dir(&self) -> Utf8PathBuf {
        self.files_dir.clone()
    }

    fn finish(&mut self, result_code: i32, _results: &ArgumentBundle) {
        self.finished_with = Some(result_code);
    }
}

#[derive(Debug, Default)]
pub(crate) struct ParsedSuite {
    pub(crate) attrs: BTreeMap<String, String>,
    pub(crate) cases: Vec<ParsedCase>,
}

#[derive(Debug, Default)]
pub(crate) struct ParsedCase {
    pub(crate) attrs: BTreeMap<String, String>,
    /// Payload elements as (element name, text) pairs.
    pub(crate) payloads: Vec<(String, String)>,
}

impl ParsedSuite {
    pub(crate) fn attr(&self, name: &str) -> &str {
        self.attrs.get(name).map_or("", String::as_str)
    }

    pub(crate) fn case(&self, name: &str) -> Option<&ParsedCase> {
        self.cases.iter().find(|case| case.attr("name") == name)
    }
}

impl ParsedCase {
    pub(crate) fn attr(&self, name: &str) -> &str {
        self.attrs.get(name).map_or("", String::as_str)
    }
}

/// Reads a report back into its suites and cases.
pub(crate) fn read_report(path: &Utf8Path) -> Result<Vec<ParsedSuite>> {
    let xml = std::fs::read_to_string(path).wrap_err_with(|| format!("reading {path}"))?;
    parse_report(&xml)
}

pub(crate) fn parse_report(xml: &str) -> Result<Vec<ParsedSuite>> {
    // Text isn't trimmed, so payloads are compared byte for byte.
    let mut reader = Reader::from_str(xml);

    let mut suites: Vec<ParsedSuite> = Vec::new();
    let mut in_payload = false;
    loop {
        match reader.read_event()? {
            Event::Start(e) => in_payload = open_element(&mut suites, &e)?,
            Event::Empty(e) => {
                open_element(&mut suites, &e)?;
            }
            Event::Text(text) if in_payload => {
                if let Some((_, body)) = suites
                    .last_mut()
                    .and_then(|s| s.cases.last_mut())
                    .and_then(|c| c.payloads.last_mut())
                {
                    body.push_str(&text.unescape()?);
                }
            }
            Event::End(_) => in_payload = false,
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(suites)
}

// Returns true if the element is a payload whose text should be collected.
fn open_element(suites: &mut Vec<ParsedSuite>, e: &BytesStart<'_>) -> Result<bool> {
    let mut attrs = BTreeMap::new();
    for attr in e.attributes() {
        let attr = attr?;
        attrs.insert(
            String::from_utf8(attr.key.as_ref().to_vec())?,
            attr.unescape_value()?.into_owned(),
        );
    }

    match e.name().as_ref() {
        b"testsuite" => {
            suites.push(ParsedSuite {
                attrs,
                cases: Vec::new(),
            });
            Ok(false)
        }
        b"testcase" => {
            let Some(suite) = suites.last_mut() else {
                bail!("testcase outside a testsuite");
            };
            suite.cases.push(ParsedCase {
                attrs,
                payloads: Vec::new(),
            });
            Ok(false)
        }
        name @ (b"error" | b"failure" | b"errors" | b"failures") => {
            let Some(case) = suites.last_mut().and_then(|s| s.cases.last_mut()) else {
                bail!("payload outside a testcase");
            };
            case.payloads
                .push((String::from_utf8(name.to_vec())?, String::new()));
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Lists the file names in `dir`, sorted.
pub(crate) fn file_names(dir: &Utf8Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in dir.read_dir_utf8()? {
        names.push(entry?.file_name().to_owned());
    }
    names.sort();
    Ok(names)
}
