//! # Data Models Module / 数据模型模块
//!
//! This module defines the core data structures used throughout mputf.
//! It includes the raw execution result of a child process, the classified
//! outcome of a test, the report entry handed to the reporters and the
//! aggregated suite report.
//!
//! 此模块定义了整个 mputf 中使用的核心数据结构。
//! 它包括子进程的原始执行结果、测试的分类结果、交给报告器的报告条目以及汇总的套件报告。

use crate::infra::t;
use chrono::{DateTime, Local};
use std::fmt;
use std::time::Duration;

/// The text captured from a child's standard streams.
/// 从子进程标准流中捕获的文本。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    /// Everything read from stdout / 从 stdout 读取的全部内容
    pub stdout: String,
    /// Everything read from stderr / 从 stderr 读取的全部内容
    pub stderr: String,
}

impl CapturedOutput {
    /// Decodes raw stream bytes. Invalid UTF-8 is replaced, line endings are
    /// kept untouched because the assertion protocol depends on them.
    pub fn from_bytes(stdout: &[u8], stderr: &[u8]) -> Self {
        Self {
            stdout: String::from_utf8_lossy(stdout).into_owned(),
            stderr: String::from_utf8_lossy(stderr).into_owned(),
        }
    }
}

/// The raw result of running one child process to completion.
/// Exactly one variant is produced per run.
///
/// 运行一个子进程直至结束的原始结果。每次运行只会产生一个变体。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionResult {
    /// The process ran and exited on its own.
    /// 进程已运行并自行退出。
    NormalExit {
        /// The exit code; signal deaths map to `128 + signal` on Unix.
        exit_code: i32,
        /// Captured stdout and stderr / 捕获的 stdout 和 stderr
        output: CapturedOutput,
    },
    /// The process could not be started (bad path, permissions, unparsable
    /// command line). No output exists.
    /// 进程无法启动（路径错误、权限问题、无法解析的命令行）。没有任何输出。
    LaunchFailure {
        /// Human readable cause / 可读的原因
        cause: String,
    },
}

impl ExecutionResult {
    pub fn output(&self) -> Option<&CapturedOutput> {
        match self {
            ExecutionResult::NormalExit { output, .. } => Some(output),
            ExecutionResult::LaunchFailure { .. } => None,
        }
    }
}

/// Categorizes why a test did not pass. The `type` attribute of the JUnit
/// report is derived from it.
///
/// 对测试未通过的原因进行分类。JUnit 报告中的 `type` 属性由其派生。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// The executable could not be launched / 无法启动可执行文件
    LaunchFailure,
    /// The deadline expired and the process was stopped / 超时，进程被停止
    Timeout,
    /// Sentinel exit code without a parsable assertion / 退出码为哨兵值但无法解析断言
    PossibleAssertion,
    /// A controlled assertion failure / 受控的断言失败
    Assertion,
    /// Any exit code other than 0 and the sentinel / 除 0 和哨兵值以外的任何退出码
    UnknownExitCode,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::LaunchFailure => "launchFailure",
            DiagnosticKind::Timeout => "timeout",
            DiagnosticKind::PossibleAssertion => "possibleAssertion",
            DiagnosticKind::Assertion => "assertion",
            DiagnosticKind::UnknownExitCode => "unknownRetCode",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A diagnostic attached to every non-passing outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// The tri-state classification of a finished test.
/// 已完成测试的三态分类。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Exit code 0 / 退出码为 0
    Pass,
    /// A parsable assertion was reported / 报告了可解析的断言
    Failure(Diagnostic),
    /// Anything else that went wrong / 其他任何错误
    Error(Diagnostic),
}

impl Outcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, Outcome::Pass)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Error(_))
    }

    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            Outcome::Pass => None,
            Outcome::Failure(diagnostic) | Outcome::Error(diagnostic) => Some(diagnostic),
        }
    }
}

/// Lifecycle of a test case. `Completed`, `TimedOut` and `Errored` are terminal.
/// 测试用例的生命周期。`Completed`、`TimedOut` 和 `Errored` 是终止状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestState {
    Created,
    Running,
    /// The process terminated on its own / 进程自行终止
    Completed,
    /// The deadline expired / 超过截止时间
    TimedOut,
    /// The process could not be launched / 进程无法启动
    Errored,
}

impl TestState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TestState::Completed | TestState::TimedOut | TestState::Errored
        )
    }
}

/// Represents the final, reportable result of a single test case.
/// 表示单个测试用例的最终可报告结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    /// Name of the test as configured / 配置中的测试名称
    pub name: String,
    /// The classified outcome / 分类后的结果
    pub outcome: Outcome,
    /// Elapsed time; equals the deadline exactly for timed out tests.
    /// 耗时；对于超时的测试，恰好等于截止时间。
    pub elapsed: Duration,
    /// Captured streams, possibly empty / 捕获的输出流，可能为空
    pub output: CapturedOutput,
}

impl ReportEntry {
    /// Gets the status of the entry as a localized string for display.
    /// 以本地化字符串形式获取条目状态以供显示。
    pub fn status_str(&self, locale: &str) -> String {
        match self.outcome {
            Outcome::Pass => t!("report.status_pass", locale = locale).to_string(),
            Outcome::Failure(_) => t!("report.status_failure", locale = locale).to_string(),
            Outcome::Error(_) => t!("report.status_error", locale = locale).to_string(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(&self.outcome, Outcome::Error(d) if d.kind == DiagnosticKind::Timeout)
    }
}

/// The aggregated result of running a whole suite.
/// 运行整个套件的汇总结果。
#[derive(Debug, Clone)]
pub struct SuiteReport {
    /// Suite name from the configuration / 配置中的套件名称
    pub name: String,
    /// One entry per test, in configuration order / 每个测试一个条目，按配置顺序
    pub entries: Vec<ReportEntry>,
    /// Wall time of the whole run / 整个运行的墙钟时间
    pub elapsed: Duration,
    /// Local time at which the run finished / 运行结束时的本地时间
    pub timestamp: DateTime<Local>,
}

impl SuiteReport {
    pub fn tests(&self) -> usize {
        self.entries.len()
    }

    pub fn errors(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_error()).count()
    }

    pub fn failures(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_failure()).count()
    }

    pub fn passes(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_pass()).count()
    }
}

/// Formats a duration as seconds with exactly two decimals ("2.00").
/// Rust's float formatting never consults the process locale.
pub fn format_seconds(duration: Duration) -> String {
    format!("{:.2}", duration.as_secs_f64())
}
