//! # Reporting Module / 报告模块
//!
//! This module turns a finished [`SuiteReport`](crate::core::models::SuiteReport)
//! into output: a JUnit XML document for CI servers and a colorful,
//! localized summary for the console.
//!
//! 此模块将完成的套件报告转换为输出：供 CI 服务器使用的 JUnit XML 文档，
//! 以及在控制台打印的彩色本地化摘要。

pub mod console;
pub mod junit;

// Re-export common reporting functions
pub use console::{print_event, print_summary};
pub use junit::{junit_to_string, write_junit_report, ReportError};
