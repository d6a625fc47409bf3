//! # Test Execution Engine Module / 测试执行引擎模块
//!
//! This module drives a single test through its lifecycle: it starts the
//! process, waits for it within the configured deadline, stops it when the
//! deadline expires and classifies the outcome.
//!
//! 此模块驱动单个测试完成其生命周期：启动进程，在配置的截止时间内等待它，
//! 超时时停止它，并对结果进行分类。

use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info_span, trace, Instrument};

use crate::{
    core::{
        assertion::{parse_assertion, ASSERT_EXIT_CODE},
        config::TestDefinition,
        models::{
            CapturedOutput, Diagnostic, DiagnosticKind, ExecutionResult, Outcome, ReportEntry,
            TestState,
        },
    },
    infra::command::ProcessExecutor,
};

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("test '{name}' has already been run (state: {state:?})")]
    AlreadyRun { name: String, state: TestState },
}

/// A test definition together with its lifecycle state.
/// 测试定义及其生命周期状态。
#[derive(Debug)]
pub struct TestCase {
    definition: TestDefinition,
    state: TestState,
}

impl TestCase {
    pub fn new(definition: TestDefinition) -> Self {
        Self {
            definition,
            state: TestState::Created,
        }
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn definition(&self) -> &TestDefinition {
        &self.definition
    }

    pub fn state(&self) -> TestState {
        self.state
    }

    /// Runs the test to completion and returns its report entry.
    /// A test case runs at most once; further calls fail with
    /// [`ExecutionError::AlreadyRun`].
    ///
    /// 运行测试直至完成并返回其报告条目。测试用例最多运行一次。
    ///
    /// # Returns
    /// A `ReportEntry` whose elapsed time equals the deadline exactly when the
    /// test timed out.
    pub async fn run(&mut self) -> Result<ReportEntry, ExecutionError> {
        if self.state != TestState::Created {
            return Err(ExecutionError::AlreadyRun {
                name: self.definition.name.clone(),
                state: self.state,
            });
        }

        self.state = TestState::Running;
        let span = info_span!("test", name = %self.definition.name);
        let (entry, state) = run_definition(&self.definition).instrument(span).await;
        self.state = state;
        Ok(entry)
    }
}

async fn run_definition(definition: &TestDefinition) -> (ReportEntry, TestState) {
    let mut executor = ProcessExecutor::new(definition.command_line.as_str());
    let started = Instant::now();

    trace!(command = %definition.command_line, "starting test");
    executor.start();

    let finished = match definition.deadline() {
        Some(deadline) => tokio::time::timeout(deadline, executor.wait()).await.is_ok(),
        None => {
            executor.wait().await;
            true
        }
    };

    if !finished {
        // Only reachable with a deadline configured.
        let deadline = definition.deadline().unwrap_or_default();
        debug!(?deadline, "test timed out, terminating");
        executor.stop().await;

        let entry = ReportEntry {
            name: definition.name.clone(),
            outcome: timeout_outcome(deadline),
            elapsed: deadline,
            output: executor.captured_output().cloned().unwrap_or_default(),
        };
        return (entry, TestState::TimedOut);
    }

    let elapsed = started.elapsed();
    let result = executor.result().cloned().unwrap_or_else(|| {
        ExecutionResult::LaunchFailure {
            cause: "process finished without a result".to_string(),
        }
    });
    trace!(?elapsed, "test finished of its own volition");

    let outcome = classify(&result);
    let state = match result {
        ExecutionResult::LaunchFailure { .. } => TestState::Errored,
        ExecutionResult::NormalExit { .. } => TestState::Completed,
    };
    let output = match result {
        ExecutionResult::NormalExit { output, .. } => output,
        ExecutionResult::LaunchFailure { .. } => CapturedOutput::default(),
    };

    (
        ReportEntry {
            name: definition.name.clone(),
            outcome,
            elapsed,
            output,
        },
        state,
    )
}

/// Classifies the result of a process that terminated on its own.
/// Pure: the same result always yields the same outcome.
///
/// 对自行终止的进程结果进行分类。纯函数：相同的结果总是产生相同的分类。
pub fn classify(result: &ExecutionResult) -> Outcome {
    match result {
        ExecutionResult::LaunchFailure { cause } => {
            Outcome::Error(Diagnostic::new(DiagnosticKind::LaunchFailure, cause.as_str()))
        }
        ExecutionResult::NormalExit { exit_code: 0, .. } => Outcome::Pass,
        ExecutionResult::NormalExit {
            exit_code: ASSERT_EXIT_CODE,
            output,
        } => match parse_assertion(&output.stderr) {
            Some(assertion) => Outcome::Failure(Diagnostic::new(
                DiagnosticKind::Assertion,
                assertion.to_string(),
            )),
            None => Outcome::Error(Diagnostic::new(
                DiagnosticKind::PossibleAssertion,
                "exit code matches assertion, but unable to parse assertion output",
            )),
        },
        ExecutionResult::NormalExit { exit_code, .. } => Outcome::Error(Diagnostic::new(
            DiagnosticKind::UnknownExitCode,
            format!("process exited with unknown exit code [{exit_code}]"),
        )),
    }
}

/// The outcome recorded for a test stopped at its deadline.
pub fn timeout_outcome(deadline: Duration) -> Outcome {
    Outcome::Error(Diagnostic::new(
        DiagnosticKind::Timeout,
        format!("timeout after {} seconds", deadline.as_secs()),
    ))
}
