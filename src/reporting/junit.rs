//! # JUnit Reporting Module / JUnit 报告模块
//!
//! Serializes a [`SuiteReport`] into a JUnit-style XML document that CI
//! servers understand.
//!
//! 将 [`SuiteReport`] 序列化为 CI 服务器可以理解的 JUnit 风格 XML 文档。
//!
//! ```xml
//! <testsuite name="suite" tests="2" errors="1" failures="0" time="2.13" timestamp="2024-05-01T12:00:00">
//!     <testcase classname="suite" name="a" time="0.13"/>
//!     <testcase classname="suite" name="b" time="2.00">
//!         <error type="timeout" message="timeout after 2 seconds"/>
//!     </testcase>
//! </testsuite>
//! ```

use quick_xml::{
    escape::escape,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
    Writer,
};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::core::models::{format_seconds, Outcome, ReportEntry, SuiteReport};
use crate::infra::fs::ensure_parent_dir;

/// Format of the suite `timestamp` attribute: local time, second precision.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write report '{path}': {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("failed to serialize report: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("report is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Writes the report to `path`, creating missing parent directories.
pub fn write_junit_report(report: &SuiteReport, path: &Path) -> Result<(), ReportError> {
    let file_error = |source| ReportError::File {
        path: path.display().to_string(),
        source,
    };

    ensure_parent_dir(path).map_err(file_error)?;
    let file = File::create(path).map_err(file_error)?;
    let mut out = BufWriter::new(file);
    render_junit(report, &mut out)?;
    out.flush().map_err(file_error)?;

    debug!(path = %path.display(), "test results saved");
    Ok(())
}

/// Renders the report into a string.
pub fn junit_to_string(report: &SuiteReport) -> Result<String, ReportError> {
    let mut buffer = Vec::new();
    render_junit(report, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Renders the report into any writer.
pub fn render_junit<W: Write>(report: &SuiteReport, out: W) -> Result<(), ReportError> {
    let mut writer = Writer::new_with_indent(out, b' ', 4);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut suite_tag = BytesStart::new("testsuite");
    suite_tag.extend_attributes([
        ("name", report.name.as_str()),
        ("tests", report.tests().to_string().as_str()),
        ("errors", report.errors().to_string().as_str()),
        ("failures", report.failures().to_string().as_str()),
        ("time", format_seconds(report.elapsed).as_str()),
        (
            "timestamp",
            report.timestamp.format(TIMESTAMP_FORMAT).to_string().as_str(),
        ),
    ]);

    if report.entries.is_empty() {
        writer.write_event(Event::Empty(suite_tag))?;
    } else {
        writer.write_event(Event::Start(suite_tag))?;
        for entry in &report.entries {
            serialize_test_case(&report.name, entry, &mut writer)?;
        }
        writer.write_event(Event::End(BytesEnd::new("testsuite")))?;
    }

    writer.get_mut().write_all(b"\n")?;
    Ok(())
}

fn serialize_test_case<W: Write>(
    classname: &str,
    entry: &ReportEntry,
    writer: &mut Writer<W>,
) -> Result<(), ReportError> {
    let mut case_tag = BytesStart::new("testcase");
    case_tag.extend_attributes([
        ("classname", classname),
        ("name", entry.name.as_str()),
        ("time", format_seconds(entry.elapsed).as_str()),
    ]);

    let has_children =
        !entry.outcome.is_pass() || !entry.output.stdout.is_empty() || !entry.output.stderr.is_empty();
    if !has_children {
        writer.write_event(Event::Empty(case_tag))?;
        return Ok(());
    }

    writer.write_event(Event::Start(case_tag))?;

    let result_node = match &entry.outcome {
        Outcome::Pass => None,
        Outcome::Failure(diagnostic) => Some(("failure", diagnostic)),
        Outcome::Error(diagnostic) => Some(("error", diagnostic)),
    };
    if let Some((tag, diagnostic)) = result_node {
        let mut node = BytesStart::new(tag);
        node.extend_attributes([
            ("type", diagnostic.kind.as_str()),
            ("message", diagnostic.message.as_str()),
        ]);
        writer.write_event(Event::Empty(node))?;
    }

    serialize_text_node("system-out", &entry.output.stdout, writer)?;
    serialize_text_node("system-err", &entry.output.stderr, writer)?;

    writer.write_event(Event::End(BytesEnd::new("testcase")))?;
    Ok(())
}

/// Writes `<tag>text</tag>`, or nothing when `text` is empty. Carriage
/// returns are written as `&#13;` so the stream reads back byte for byte.
fn serialize_text_node<W: Write>(
    tag: &str,
    text: &str,
    writer: &mut Writer<W>,
) -> Result<(), ReportError> {
    if text.is_empty() {
        return Ok(());
    }
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    // XML readers fold a raw CR into LF; the character reference survives.
    let escaped = escape(text).replace('\r', "&#13;");
    writer.write_event(Event::Text(BytesText::from_escaped(escaped)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}
