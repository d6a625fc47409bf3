//! # Suite Driver Module / 套件驱动模块
//!
//! Runs the tests of one suite strictly one after another and aggregates
//! their entries, counts and timing into a [`SuiteReport`].
//!
//! 严格按顺序逐个运行一个套件中的测试，并将其条目、计数和耗时汇总为 [`SuiteReport`]。

use chrono::Local;
use std::time::Instant;
use tracing::{debug, info};

use crate::core::{
    config::{SuiteConfig, TestDefinition},
    execution::{ExecutionError, TestCase},
    models::{ReportEntry, SuiteReport},
};

/// Progress notifications emitted while a suite runs.
/// Callers pass an observer to [`TestSuite::run_all`] instead of registering
/// listeners globally.
#[derive(Debug, Clone, Copy)]
pub enum SuiteEvent<'a> {
    /// A test is about to start / 测试即将开始
    TestStarted(&'a TestDefinition),
    /// A test reached a terminal state / 测试已到达终止状态
    TestFinished(&'a ReportEntry),
}

/// A named, ordered collection of test cases.
/// 一个有名称、有顺序的测试用例集合。
#[derive(Debug)]
pub struct TestSuite {
    name: String,
    tests: Vec<TestCase>,
}

impl TestSuite {
    pub fn new(name: impl Into<String>, tests: Vec<TestDefinition>) -> Self {
        Self {
            name: name.into(),
            tests: tests.into_iter().map(TestCase::new).collect(),
        }
    }

    pub fn from_config(config: SuiteConfig) -> Self {
        Self::new(config.name, config.tests)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    /// Runs every test in order. A test never starts before the previous one
    /// reached a terminal state. Per-test problems are recorded in the
    /// entries and never abort the run.
    ///
    /// 按顺序运行每个测试。在前一个测试到达终止状态之前，不会启动下一个测试。
    /// 单个测试的问题会记录在条目中，绝不会中止整个运行。
    pub async fn run_all<F>(self, mut observer: F) -> Result<SuiteReport, ExecutionError>
    where
        F: FnMut(SuiteEvent<'_>),
    {
        let TestSuite { name, mut tests } = self;
        info!(suite = %name, tests = tests.len(), "starting suite");

        let started = Instant::now();
        let mut entries = Vec::with_capacity(tests.len());

        for test in tests.iter_mut() {
            observer(SuiteEvent::TestStarted(test.definition()));
            let entry = test.run().await?;
            debug!(
                test = %entry.name,
                state = ?test.state(),
                outcome = ?entry.outcome,
                "test complete"
            );
            observer(SuiteEvent::TestFinished(&entry));
            entries.push(entry);
        }

        let report = SuiteReport {
            name,
            entries,
            elapsed: started.elapsed(),
            timestamp: Local::now(),
        };
        info!(
            suite = %report.name,
            errors = report.errors(),
            failures = report.failures(),
            "suite complete"
        );
        Ok(report)
    }
}
