//! # JUnit Reporting Unit Tests / JUnit 报告单元测试
//!
//! Tests for the XML layout of the JUnit report.
//!
//! 测试 JUnit 报告的 XML 结构。

use chrono::{Local, TimeZone};
use mputf::models::{
    CapturedOutput, Diagnostic, DiagnosticKind, Outcome, ReportEntry, SuiteReport,
};
use mputf::reporting::{junit_to_string, write_junit_report};
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

fn entry(name: &str, outcome: Outcome, millis: u64, stdout: &str, stderr: &str) -> ReportEntry {
    ReportEntry {
        name: name.to_string(),
        outcome,
        elapsed: Duration::from_millis(millis),
        output: CapturedOutput {
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        },
    }
}

fn sample_report() -> SuiteReport {
    SuiteReport {
        name: "suite".to_string(),
        entries: vec![
            entry("a", Outcome::Pass, 130, "", ""),
            entry(
                "b",
                Outcome::Error(Diagnostic::new(
                    DiagnosticKind::Timeout,
                    "timeout after 2 seconds",
                )),
                2000,
                "partial",
                "",
            ),
            entry(
                "c",
                Outcome::Failure(Diagnostic::new(
                    DiagnosticKind::Assertion,
                    "foo.c:42 - x < y & z",
                )),
                5,
                "",
                "\r\n**assert**\r\n",
            ),
        ],
        elapsed: Duration::from_millis(2130),
        timestamp: Local.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
    }
}

#[test]
fn test_suite_attributes() {
    let xml = junit_to_string(&sample_report()).unwrap();

    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"), "{xml}");
    assert!(
        xml.contains(
            "<testsuite name=\"suite\" tests=\"3\" errors=\"1\" failures=\"1\" time=\"2.13\" timestamp=\"2024-05-01T12:00:00\">"
        ),
        "{xml}"
    );
    assert!(xml.trim_end().ends_with("</testsuite>"));
}

#[test]
fn test_passing_case_without_output_is_empty_element() {
    let xml = junit_to_string(&sample_report()).unwrap();
    assert!(
        xml.contains("<testcase classname=\"suite\" name=\"a\" time=\"0.13\"/>"),
        "{xml}"
    );
}

#[test]
fn test_error_case_carries_type_message_and_output() {
    let xml = junit_to_string(&sample_report()).unwrap();
    assert!(xml.contains("<testcase classname=\"suite\" name=\"b\" time=\"2.00\">"), "{xml}");
    assert!(
        xml.contains("<error type=\"timeout\" message=\"timeout after 2 seconds\"/>"),
        "{xml}"
    );
    assert!(xml.contains("<system-out>partial</system-out>"), "{xml}");
}

#[test]
fn test_failure_message_is_escaped() {
    let xml = junit_to_string(&sample_report()).unwrap();
    assert!(
        xml.contains("<failure type=\"assertion\" message=\"foo.c:42 - x &lt; y &amp; z\"/>"),
        "{xml}"
    );
    assert!(xml.contains("<system-err>"), "{xml}");
}

#[test]
fn test_empty_streams_are_omitted() {
    let report = SuiteReport {
        entries: vec![entry(
            "err",
            Outcome::Error(Diagnostic::new(DiagnosticKind::LaunchFailure, "missing")),
            0,
            "",
            "",
        )],
        ..sample_report()
    };
    let xml = junit_to_string(&report).unwrap();
    assert!(!xml.contains("system-out"));
    assert!(!xml.contains("system-err"));
    assert!(xml.contains("type=\"launchFailure\""));
    assert!(xml.contains("time=\"0.00\""));
}

#[test]
fn test_one_result_node_per_case() {
    let xml = junit_to_string(&sample_report()).unwrap();
    assert_eq!(xml.matches("<testcase ").count(), 3);
    assert_eq!(xml.matches("<error ").count(), 1);
    assert_eq!(xml.matches("<failure ").count(), 1);
}

#[test]
fn test_report_file_creates_parent_directories() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("deeper").join("results.xml");

    write_junit_report(&sample_report(), &path).unwrap();

    let written = fs::read_to_string(&path).unwrap();
    assert_eq!(written, junit_to_string(&sample_report()).unwrap());
}

#[test]
fn test_unwritable_path_is_reported() {
    let dir = tempdir().unwrap();
    // A directory cannot be overwritten by a report file.
    let err = write_junit_report(&sample_report(), dir.path()).unwrap_err();
    assert!(err.to_string().contains("failed to write report"), "{err}");
}

#[test]
fn test_carriage_returns_survive_a_read_back() {
    use quick_xml::events::Event;
    use quick_xml::Reader;

    let report = SuiteReport {
        entries: vec![entry(
            "crlf",
            Outcome::Error(Diagnostic::new(DiagnosticKind::UnknownExitCode, "code")),
            0,
            "",
            "a\r\nb",
        )],
        ..sample_report()
    };
    let xml = junit_to_string(&report).unwrap();
    assert!(xml.contains("<system-err>a&#13;\nb</system-err>"), "{xml}");
    assert!(!xml.contains('\r'));

    let mut reader = Reader::from_str(&xml);
    let mut in_system_err = false;
    let mut text = None;
    loop {
        match reader.read_event().unwrap() {
            Event::Start(e) => in_system_err = e.name().as_ref() == b"system-err",
            Event::Text(e) if in_system_err => {
                text = Some(e.unescape().unwrap().into_owned());
                break;
            }
            Event::Eof => break,
            _ => {}
        }
    }
    assert_eq!(text.as_deref(), Some("a\r\nb"));
}
