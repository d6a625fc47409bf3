//! # Run Command Module / 运行命令模块
//!
//! This module implements the default command of the mputf CLI: load the
//! suite configuration, run every test in order, write the JUnit report and
//! print a summary.
//!
//! 此模块实现 mputf CLI 的默认命令：加载套件配置，按顺序运行每个测试，
//! 写入 JUnit 报告并打印摘要。

use anyhow::{Context, Result};
use colored::*;
use std::path::Path;
use tracing::info;

use crate::{
    cli::RunOptions,
    core::{config::load_suite_config, models::SuiteReport, suite::TestSuite},
    infra::{fs::display_path, t},
    reporting::{print_event, print_summary, write_junit_report},
};

/// Executes the run command with the provided options.
///
/// Individual test outcomes never make this fail; only an unreadable or
/// invalid configuration, or a report that cannot be written, do.
///
/// # Arguments
/// * `options` - Config and report paths plus log verbosity
/// * `locale` - Language of console messages
pub async fn execute(options: RunOptions, locale: &str) -> Result<()> {
    let report = run_suite(&options.config, locale).await?;

    write_junit_report(&report, &options.output)
        .with_context(|| format!("unable to save test results for suite '{}'", report.name))?;

    print_summary(&report, locale);
    println!(
        "\n{}",
        t!(
            "report_written",
            locale = locale,
            path = display_path(&options.output).display()
        )
    );
    Ok(())
}

/// Loads the suite at `config` and runs it, printing progress as it goes.
pub async fn run_suite(config: &Path, locale: &str) -> Result<SuiteReport> {
    println!(
        "{}",
        t!("loading_config", locale = locale, path = config.display())
    );
    let suite_config = load_suite_config(config)
        .with_context(|| format!("unable to load test suite from '{}'", config.display()))?;

    let suite = TestSuite::from_config(suite_config);
    info!(suite = %suite.name(), tests = suite.len(), "suite loaded");
    println!(
        "{}",
        t!(
            "running_suite",
            locale = locale,
            name = suite.name(),
            count = suite.len()
        )
        .bold()
    );

    let report = suite
        .run_all(|event| print_event(event, locale))
        .await
        .context("test suite aborted")?;
    Ok(report)
}
