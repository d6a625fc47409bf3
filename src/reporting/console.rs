//! # Console Reporting Module / 控制台报告模块
//!
//! This module prints per-test progress and the final summary to the console.
//! Output is colored and localized; it never influences the JUnit report.
//!
//! 此模块在控制台打印每个测试的进度和最终摘要。
//! 输出带有颜色并已本地化；它不会影响 JUnit 报告。

use colored::*;

use crate::core::config::TestDefinition;
use crate::core::models::{format_seconds, Outcome, ReportEntry, SuiteReport};
use crate::core::suite::SuiteEvent;
use crate::infra::t;

/// Prints progress for a suite event. Meant to be passed as the observer of
/// `TestSuite::run_all`.
pub fn print_event(event: SuiteEvent<'_>, locale: &str) {
    match event {
        SuiteEvent::TestStarted(definition) => print_test_started(definition, locale),
        SuiteEvent::TestFinished(entry) => print_test_finished(entry, locale),
    }
}

fn print_test_started(definition: &TestDefinition, locale: &str) {
    println!(
        "{}",
        t!("run.running_test", locale = locale, name = &definition.name).blue()
    );
}

fn print_test_finished(entry: &ReportEntry, locale: &str) {
    let duration = format_seconds(entry.elapsed);
    match &entry.outcome {
        Outcome::Pass => println!(
            "{}",
            t!("run.test_passed", locale = locale, name = &entry.name, duration = &duration)
                .green()
        ),
        Outcome::Failure(diagnostic) => println!(
            "{}",
            t!(
                "run.test_failed",
                locale = locale,
                name = &entry.name,
                duration = &duration,
                message = &diagnostic.message
            )
            .red()
        ),
        Outcome::Error(diagnostic) => println!(
            "{}",
            t!(
                "run.test_error",
                locale = locale,
                name = &entry.name,
                duration = &duration,
                message = &diagnostic.message
            )
            .yellow()
        ),
    }
}

/// Prints a formatted summary of the suite to the console.
/// Displays a table with test status, name and duration, using color coding
/// to highlight different statuses.
///
/// 在控制台打印格式化的套件摘要。
/// 显示一个包含测试状态、名称和持续时间的表格，使用颜色编码突出显示不同的状态。
///
/// # Output Format / 输出格式
/// ```text
/// --- Test Summary ---
///   - Passed   | assert_pass                              |       0.01s
///   - Failure  | assert_message                           |       0.02s  file.rs:12 - message
///   - Error    | hangs                                    |       2.00s  timeout after 2 seconds
/// ```
pub fn print_summary(report: &SuiteReport, locale: &str) {
    println!("\n{}", t!("test_summary_banner", locale = locale).bold());

    for entry in &report.entries {
        let status_str = entry.status_str(locale);
        let status_colored = match entry.outcome {
            Outcome::Pass => status_str.green(),
            Outcome::Failure(_) => status_str.red(),
            Outcome::Error(_) => status_str.yellow(),
        };
        let detail = entry
            .outcome
            .diagnostic()
            .map(|d| d.message.as_str())
            .unwrap_or_default();

        println!(
            "  - {:<10} | {:<40} | {:>10}s  {}",
            status_colored,
            entry.name,
            format_seconds(entry.elapsed),
            detail.dimmed()
        );
    }

    let totals = t!(
        "summary_totals",
        locale = locale,
        tests = report.tests(),
        passes = report.passes(),
        failures = report.failures(),
        errors = report.errors(),
        time = format_seconds(report.elapsed)
    );
    if report.errors() == 0 && report.failures() == 0 {
        println!("\n{}", totals.green().bold());
    } else {
        println!("\n{}", totals.red().bold());
    }
}
