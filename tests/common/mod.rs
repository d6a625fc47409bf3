// Shared test helpers for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

/// Path of the fixture executable built alongside the tests.
pub fn test_app() -> &'static str {
    env!("CARGO_BIN_EXE_binding_test_app")
}

/// Builds a command line running the fixture executable with `args`.
pub fn command_line(args: &[&str]) -> String {
    let program = shlex::try_quote(test_app()).expect("fixture path contains a NUL byte");
    let mut line = program.into_owned();
    for arg in args {
        line.push(' ');
        line.push_str(&shlex::try_quote(arg).expect("argument contains a NUL byte"));
    }
    line
}

/// One `<test>` element of a generated suite configuration.
pub struct TestSpec<'a> {
    pub name: &'a str,
    pub max_test_time_s: Option<u64>,
    pub command_line: String,
}

impl<'a> TestSpec<'a> {
    pub fn new(name: &'a str, args: &[&str]) -> Self {
        Self {
            name,
            max_test_time_s: None,
            command_line: command_line(args),
        }
    }

    pub fn with_deadline(mut self, seconds: u64) -> Self {
        self.max_test_time_s = Some(seconds);
        self
    }
}

fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Renders a suite configuration document.
pub fn suite_xml(suite: &str, tests: &[TestSpec<'_>]) -> String {
    let mut xml = format!("<testSuite name=\"{}\">\n", xml_escape(suite));
    for test in tests {
        let deadline = test
            .max_test_time_s
            .map(|s| format!(" maxTestTime_s=\"{s}\""))
            .unwrap_or_default();
        xml.push_str(&format!(
            "  <test name=\"{}\" description=\"generated\" testType=\"localProcess\"{deadline}>\n    <testOptions>\n      <executable>{}</executable>\n    </testOptions>\n  </test>\n",
            xml_escape(test.name),
            xml_escape(&test.command_line),
        ));
    }
    xml.push_str("</testSuite>\n");
    xml
}

/// Creates a temporary directory holding `config.xml` for the given suite.
pub fn write_config(suite: &str, tests: &[TestSpec<'_>]) -> (TempDir, PathBuf) {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let path = temp_dir.path().join("config.xml");
    fs::write(&path, suite_xml(suite, tests)).expect("Failed to write config.xml");
    (temp_dir, path)
}

/// Writes arbitrary content as a configuration file in `dir`.
pub fn write_raw_config(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("config.xml");
    fs::write(&path, content).expect("Failed to write config.xml");
    path
}
