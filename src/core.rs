//! # Core Module / 核心模块
//!
//! This module contains the core functionality of mputf,
//! including data models, configuration, the assertion protocol
//! and the test execution logic.
//!
//! 此模块包含 mputf 的核心功能，
//! 包括数据模型、配置、断言协议和测试执行逻辑。

pub mod assertion;
pub mod config;
pub mod execution;
pub mod models;
pub mod suite;

// Re-exports
pub use assertion::{parse_assertion, Assertion};
pub use config::{load_suite_config, SuiteConfig, TestDefinition};
pub use execution::{classify, TestCase};
pub use models::{ExecutionResult, Outcome, ReportEntry, SuiteReport};
pub use suite::TestSuite;
