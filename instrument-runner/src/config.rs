// Copyright (c) The instrument-junit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Instrumentation arguments recognized by the runner.

use camino::Utf8PathBuf;
use indexmap::IndexMap;
use instrument_junit::ElementStyle;

/// Enables XML report generation. Defaults to true.
pub static JUNIT_XML_OUTPUT: &str = "junitXmlOutput";

/// The directory reports are written to. Defaults to the host's private files directory.
pub static JUNIT_OUTPUT_DIRECTORY: &str = "junitOutputDirectory";

/// The suffix appended to each report's file name. Defaults to `-TEST.xml`.
pub static JUNIT_OUTPUT_FILE_POSTFIX: &str = "junitOutputFilePostFix";

/// Emits standard JUnit XML with singular `error` and `failure` elements. Defaults to false.
pub static JUNIT_STRICT_ELEMENTS: &str = "junitStrictElements";

/// Harness mode that only counts tests. Suppresses reports.
pub static COUNT: &str = "count";

/// Harness mode that only logs tests without running them. Suppresses reports.
pub static LOG: &str = "log";

/// The key-value arguments passed to the instrumentation.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ArgumentBundle {
    values: IndexMap<String, String>,
}

impl ArgumentBundle {
    /// Creates a new, empty `ArgumentBundle`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an argument, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Returns the value of an argument.
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Returns a boolean argument, or `default` if it is absent.
    ///
    /// Only `true`, in any case, parses as true.
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get_string(key).map_or(default, parse_bool)
    }

    /// Iterates over the argument names, in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Returns the number of arguments.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if there are no arguments.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ArgumentBundle {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Parses a boolean the way the instrumentation framework does.
pub fn parse_bool(value: &str) -> bool {
    value.eq_ignore_ascii_case("true")
}

/// Runner settings read from an [`ArgumentBundle`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RunnerArgs {
    /// Whether XML reports are enabled.
    pub junit_xml_output: bool,

    /// The report directory, if overridden.
    pub output_directory: Option<Utf8PathBuf>,

    /// The report file name suffix, if overridden.
    pub file_suffix: Option<String>,

    /// Whether the harness is only counting tests.
    pub count_only: bool,

    /// Whether the harness is only logging tests.
    pub log_only: bool,

    /// The element style used for reports.
    pub element_style: ElementStyle,
}

impl Default for RunnerArgs {
    fn default() -> Self {
        Self {
            junit_xml_output: true,
            output_directory: None,
            file_suffix: None,
            count_only: false,
            log_only: false,
            element_style: ElementStyle::Legacy,
        }
    }
}

impl RunnerArgs {
    /// Reads settings from `arguments`. A missing bundle leaves every setting at its default.
    pub fn from_bundle(arguments: Option<&ArgumentBundle>) -> Self {
        let Some(arguments) = arguments else {
            return Self::default();
        };
        let element_style = if arguments.get_bool(JUNIT_STRICT_ELEMENTS, false) {
            ElementStyle::Strict
        } else {
            ElementStyle::Legacy
        };

        Self {
            junit_xml_output: arguments.get_bool(JUNIT_XML_OUTPUT, true),
            output_directory: arguments
                .get_string(JUNIT_OUTPUT_DIRECTORY)
                .map(Utf8PathBuf::from),
            file_suffix: arguments
                .get_string(JUNIT_OUTPUT_FILE_POSTFIX)
                .map(str::to_owned),
            count_only: arguments.get_bool(COUNT, false),
            log_only: arguments.get_bool(LOG, false),
            element_style,
        }
    }

    /// Returns true if the harness intends to execute tests and reports are enabled.
    pub fn reports_enabled(&self) -> bool {
        self.junit_xml_output && !self.count_only && !self.log_only
    }
}
