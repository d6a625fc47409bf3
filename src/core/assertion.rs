//! # Assertion Protocol Module / 断言协议模块
//!
//! This module understands the tiny text protocol a test executable writes to
//! its error stream when it fails in a controlled way. It provides the
//! protocol constants, the `Assertion` model and the parser that extracts
//! an assertion from captured stderr.
//!
//! 此模块理解测试可执行文件在受控失败时写入错误流的简单文本协议。
//! 它提供协议常量、`Assertion` 模型以及从捕获的 stderr 中提取断言的解析器。
//!
//! ## Wire format / 传输格式
//!
//! ```text
//! \r\n**assert**\r\n
//! loc: <file>:<line>\r\n
//! msg: <message>\r\n
//! ```
//!
//! Both the `loc:` and the `msg:` line are optional.

use std::fmt;

/// Exit code a test executable uses to report a controlled assertion failure.
pub const ASSERT_EXIT_CODE: i32 = 84;
/// Marker token announcing an assertion on the error stream.
pub const ASSERT_MARKER: &str = "**assert**";
/// Prefix of the optional location line.
pub const LOCATION_PREFIX: &str = "loc: ";
/// Prefix of the optional message line.
pub const MESSAGE_PREFIX: &str = "msg: ";
/// Line ending used by the protocol, independent of the host platform.
pub const LINE_ENDING: &str = "\r\n";

/// An assertion reported by a test executable.
/// Every field is optional: a bare marker produces an `Assertion` with all
/// fields set to `None`, which is still different from "no marker at all".
///
/// 测试可执行文件报告的断言。
/// 每个字段都是可选的：仅有标记时会产生所有字段均为 `None` 的 `Assertion`，
/// 这与"完全没有标记"不同。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assertion {
    /// The source file in which the assertion fired / 断言发生的源文件
    pub file: Option<String>,
    /// The line number at which the assertion fired / 断言发生的行号
    pub line: Option<u32>,
    /// The user supplied message / 用户提供的消息
    pub message: Option<String>,
}

impl Assertion {
    pub fn new(file: Option<String>, line: Option<u32>, message: Option<String>) -> Self {
        Self {
            file,
            line,
            message,
        }
    }

    /// Returns `true` when none of file, line or message were reported.
    pub fn is_bare(&self) -> bool {
        self.file.is_none() && self.line.is_none() && self.message.is_none()
    }

    /// The `file[:line]` part of the rendering, if a file is known.
    /// A line number without a file is never rendered.
    pub fn location(&self) -> Option<String> {
        let file = self.file.as_deref()?;
        Some(match self.line {
            Some(line) => format!("{file}:{line}"),
            None => file.to_string(),
        })
    }
}

impl fmt::Display for Assertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.location(), self.message.as_deref()) {
            (None, None) => f.write_str("assert"),
            (Some(location), None) => f.write_str(&location),
            (None, Some(message)) => f.write_str(message),
            (Some(location), Some(message)) => write!(f, "{location} - {message}"),
        }
    }
}

/// Parses the first assertion found in the captured error output.
///
/// Scanning starts right after the marker (and its line ending). Location and
/// message lines are consumed in any order; the first line that is neither
/// stops the scan. A message is the content of its own line only.
///
/// 解析捕获的错误输出中的第一个断言。
/// 扫描从标记（及其换行符）之后开始。位置行和消息行可以任意顺序出现；
/// 遇到第一个既不是位置行也不是消息行的行时停止扫描。
///
/// # Returns
/// `None` if the marker does not occur in `stderr`.
pub fn parse_assertion(stderr: &str) -> Option<Assertion> {
    let marker_at = stderr.find(ASSERT_MARKER)?;
    let rest = &stderr[marker_at + ASSERT_MARKER.len()..];
    let rest = rest.strip_prefix(LINE_ENDING).unwrap_or(rest);

    let mut assertion = Assertion::default();

    for line in rest.split(LINE_ENDING) {
        if let Some(location) = line.strip_prefix(LOCATION_PREFIX) {
            let (file, line_number) = parse_location(location);
            assertion.file = Some(file.to_string());
            // A later location line without a usable number resets the line,
            // so file and line always describe the same location.
            assertion.line = line_number;
        } else if let Some(message) = line.strip_prefix(MESSAGE_PREFIX) {
            assertion.message = Some(message.to_string());
        } else {
            break;
        }
    }

    Some(assertion)
}

/// Splits `file:line` on the last colon, so paths such as `C:\src\a.c:12`
/// keep their drive prefix. A missing or non-numeric suffix yields no line.
fn parse_location(location: &str) -> (&str, Option<u32>) {
    match location.rsplit_once(':') {
        Some((file, line)) => (file, line.parse().ok()),
        None => (location, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_splits_on_last_colon() {
        assert_eq!(parse_location("C:\\src\\a.c:12"), ("C:\\src\\a.c", Some(12)));
        assert_eq!(parse_location("a.c:"), ("a.c", None));
        assert_eq!(parse_location("a.c:x1"), ("a.c", None));
        assert_eq!(parse_location("a.c"), ("a.c", None));
    }

    #[test]
    fn test_line_without_file_is_not_rendered() {
        let assertion = Assertion::new(None, Some(7), None);
        assert_eq!(assertion.location(), None);
        assert_eq!(assertion.to_string(), "assert");
    }
}
