//! # Suite Integration Tests / 套件集成测试
//!
//! Runs whole suites through the library, from configuration file to JUnit
//! report, using `binding_test_app` as the program under test.
//!
//! 通过库运行完整的套件，从配置文件到 JUnit 报告，
//! 使用 `binding_test_app` 作为被测程序。

mod common;

use common::TestSpec;
use mputf::config::load_suite_config;
use mputf::core::suite::{SuiteEvent, TestSuite};
use mputf::models::DiagnosticKind;
use mputf::reporting::{junit_to_string, write_junit_report};
use std::fs;

#[tokio::test]
async fn test_mixed_suite_counts_every_outcome() {
    let (dir, config_path) = common::write_config(
        "mixed",
        &[
            TestSpec::new("assert_simple", &["--assert-simple"]),
            TestSpec::new("assert_line", &["--assert-line"]),
            TestSpec::new("assert_message", &["--assert-message"]),
            TestSpec::new("pass", &["--pass"]),
            TestSpec::new("hang", &["--hang"]).with_deadline(2),
            TestSpec::new("unknown_code", &["--exit-code", "7"]),
        ],
    );

    let suite = TestSuite::from_config(load_suite_config(&config_path).unwrap());
    assert_eq!(suite.len(), 6);

    let mut started = Vec::new();
    let mut finished = Vec::new();
    let report = suite
        .run_all(|event| match event {
            SuiteEvent::TestStarted(definition) => started.push(definition.name.clone()),
            SuiteEvent::TestFinished(entry) => finished.push(entry.name.clone()),
        })
        .await
        .unwrap();

    assert_eq!(started, finished);
    assert_eq!(report.tests(), 6);
    assert_eq!(report.failures(), 3);
    assert_eq!(report.errors(), 2);
    assert_eq!(report.passes(), 1);
    assert_eq!(
        report.errors() + report.failures() + report.passes(),
        report.tests()
    );

    let names: Vec<_> = report.entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(
        names,
        ["assert_simple", "assert_line", "assert_message", "pass", "hang", "unknown_code"]
    );

    let hang = &report.entries[4];
    assert!(hang.is_timeout());

    let report_path = dir.path().join("out").join("testResults.xml");
    write_junit_report(&report, &report_path).unwrap();
    let xml = fs::read_to_string(&report_path).unwrap();

    assert!(xml.contains("name=\"mixed\" tests=\"6\" errors=\"2\" failures=\"3\""), "{xml}");
    assert!(xml.contains("<testcase classname=\"mixed\" name=\"hang\" time=\"2.00\">"), "{xml}");
    assert!(xml.contains("<error type=\"timeout\" message=\"timeout after 2 seconds\"/>"));
    assert!(xml.contains("<failure type=\"assertion\" message=\"assert\"/>"));
    assert!(xml.contains("binding_test_app.rs:"));
    assert!(xml.contains(" - binding test message\"/>"));
    assert!(xml.contains("message=\"process exited with unknown exit code [7]\""));
}

#[tokio::test]
async fn test_missing_executable_does_not_stop_the_suite() {
    let mut missing = TestSpec::new("missing", &[]);
    missing.command_line = "/definitely/not/a/real/program".to_string();
    let (_dir, config_path) = common::write_config(
        "launch",
        &[missing, TestSpec::new("after", &["--pass"])],
    );

    let suite = TestSuite::from_config(load_suite_config(&config_path).unwrap());
    let report = suite.run_all(|_| {}).await.unwrap();

    assert_eq!(report.tests(), 2);
    let first = report.entries[0].outcome.diagnostic().unwrap();
    assert_eq!(first.kind, DiagnosticKind::LaunchFailure);
    assert!(report.entries[1].outcome.is_pass());

    let xml = junit_to_string(&report).unwrap();
    assert!(xml.contains("type=\"launchFailure\""));
    assert!(!xml.contains("<system-out>"));
}

#[tokio::test]
async fn test_flooding_test_is_captured_and_passes() {
    let (_dir, config_path) = common::write_config(
        "flood",
        &[TestSpec::new("flood", &["--flood", "262144", "--pass"]).with_deadline(30)],
    );

    let suite = TestSuite::from_config(load_suite_config(&config_path).unwrap());
    let report = suite.run_all(|_| {}).await.unwrap();

    let entry = &report.entries[0];
    assert!(entry.outcome.is_pass());
    assert_eq!(entry.output.stdout.len(), 262144);
    assert_eq!(entry.output.stderr.len(), 262144);
}

#[tokio::test]
async fn test_empty_suite_produces_empty_report() {
    let (_dir, config_path) = common::write_config("empty", &[]);
    let suite = TestSuite::from_config(load_suite_config(&config_path).unwrap());
    assert!(suite.is_empty());

    let report = suite.run_all(|_| {}).await.unwrap();
    assert_eq!(report.tests(), 0);

    let xml = junit_to_string(&report).unwrap();
    assert!(xml.contains("tests=\"0\" errors=\"0\" failures=\"0\""), "{xml}");
}
