//! # mputf Library / mputf 库
//!
//! This library provides the core functionality of mputf, a black-box test
//! harness: it launches executables, watches their exit codes and stderr for
//! assertion records, enforces per-test deadlines and writes a JUnit report.
//!
//! 此库提供 mputf 的核心功能。mputf 是一个黑盒测试框架：它启动可执行文件，
//! 检查退出码和 stderr 中的断言记录，强制执行每个测试的时限，并写入 JUnit 报告。
//!
//! ## Modules / 模块
//!
//! - `core` - Data models, configuration, assertion protocol and the test engine
//! - `infra` - Process execution, file system helpers, logging
//! - `reporting` - JUnit and console reporting
//! - `cli` - Command-line interface
//! - `bindings` - Helpers for programs under test to emit assertion records
//!
//! - `core` - 数据模型、配置、断言协议和测试引擎
//! - `infra` - 进程执行、文件系统辅助、日志
//! - `reporting` - JUnit 和控制台报告
//! - `cli` - 命令行接口
//! - `bindings` - 供被测程序输出断言记录的辅助工具

pub mod bindings;
pub mod cli;
pub mod core;
pub mod infra;
pub mod reporting;

// Re-export commonly used items
pub use core::assertion;
pub use core::config;
pub use core::execution;
pub use core::models;

/// Resolves and activates the console language.
///
/// An explicit `requested` language wins; otherwise the system locale is used.
/// The full locale (e.g. "zh-CN") is tried first, then the language part
/// (e.g. "en" from "en-US"), and finally the default language ("en").
/// Returns the locale that was activated.
pub fn init_locale(requested: Option<&str>) -> String {
    let locale = requested
        .map(str::to_string)
        .or_else(sys_locale::get_locale)
        .unwrap_or_else(|| "en".to_string());
    let available_locales = rust_i18n::available_locales!();

    let lang = if available_locales.contains(&locale.as_str()) {
        locale.as_str()
    } else {
        locale
            .split(['-', '_'])
            .next()
            .filter(|lang_code| available_locales.contains(lang_code))
            .unwrap_or("en")
    };

    rust_i18n::set_locale(lang);
    lang.to_string()
}

// Initialize i18n
rust_i18n::i18n!("locales", fallback = "en");
