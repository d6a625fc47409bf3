//! # Logging Module / 日志模块
//!
//! Structured diagnostics go through `tracing` and are written to stderr.
//! User-facing progress is printed separately by the console reporter.
//!
//! 结构化诊断信息通过 `tracing` 输出到 stderr。面向用户的进度由控制台报告器单独打印。

use tracing_subscriber::EnvFilter;

/// Environment variable that overrides the log filter, e.g. `MPUTF_LOG=mputf=trace`.
pub const LOG_ENV: &str = "MPUTF_LOG";

/// Maps the number of `-v` flags to a default filter directive.
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Installs the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
