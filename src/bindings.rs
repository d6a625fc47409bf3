//! # Bindings Module / 绑定模块
//!
//! Helpers for programs under test that want to report a controlled failure
//! to mputf. A failing check writes an assertion record to stderr and exits
//! with [`ASSERT_EXIT_CODE`].
//!
//! 供被测程序向 mputf 报告受控失败的辅助工具。检查失败时，
//! 会向 stderr 写入断言记录并以 [`ASSERT_EXIT_CODE`] 退出。
//!
//! ```no_run
//! use mputf::bindings::AssertContext;
//! use mputf::mputf_assert_msg;
//!
//! let mut ctx = AssertContext::new();
//! ctx.on_assert(|a| eprintln!("cleaning up after {a}"));
//! let items = vec![1, 2, 3];
//! mputf_assert_msg!(ctx, items.len() == 3, "expected 3 items, got {}", items.len());
//! ```

use std::io::{self, Write};
use std::process;

pub use crate::core::assertion::{Assertion, ASSERT_EXIT_CODE};
use crate::core::assertion::{ASSERT_MARKER, LINE_ENDING, LOCATION_PREFIX, MESSAGE_PREFIX};

/// Writes the protocol record for `assertion`.
///
/// The location line is only written when a file is known, the message line
/// only when a message is present.
pub fn write_assertion<W: Write>(mut writer: W, assertion: &Assertion) -> io::Result<()> {
    write!(writer, "{LINE_ENDING}{ASSERT_MARKER}{LINE_ENDING}")?;
    if let Some(location) = assertion.location() {
        write!(writer, "{LOCATION_PREFIX}{location}{LINE_ENDING}")?;
    }
    if let Some(message) = &assertion.message {
        write!(writer, "{MESSAGE_PREFIX}{message}{LINE_ENDING}")?;
    }
    writer.flush()
}

type Listener = Box<dyn Fn(&Assertion) + Send + Sync>;

/// Caller-owned set of assertion listeners.
///
/// Listeners run, in registration order, right before a failing check
/// terminates the process.
#[derive(Default)]
pub struct AssertContext {
    listeners: Vec<Listener>,
}

impl AssertContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback invoked for every failing check.
    pub fn on_assert<F>(&mut self, listener: F)
    where
        F: Fn(&Assertion) + Send + Sync + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Fails without location or message when `cond` is false.
    pub fn assert_simple(&self, cond: bool) {
        if !cond {
            self.fail(Assertion::default());
        }
    }

    /// Fails with a location when `cond` is false.
    pub fn assert_line(&self, cond: bool, file: &str, line: u32) {
        if !cond {
            self.fail(Assertion::new(Some(file.to_string()), Some(line), None));
        }
    }

    /// Fails with a location and a message when `cond` is false.
    pub fn assert_msg(&self, cond: bool, file: &str, line: u32, msg: impl Into<String>) {
        if !cond {
            self.fail(Assertion::new(
                Some(file.to_string()),
                Some(line),
                Some(msg.into()),
            ));
        }
    }

    /// Notifies the listeners and writes the record to `writer`, without
    /// exiting. [`AssertContext::fail`] is this plus the exit.
    pub fn report<W: Write>(&self, assertion: &Assertion, writer: W) -> io::Result<()> {
        for listener in &self.listeners {
            listener(assertion);
        }
        write_assertion(writer, assertion)
    }

    /// Reports `assertion` on stderr and exits with [`ASSERT_EXIT_CODE`].
    pub fn fail(&self, assertion: Assertion) -> ! {
        // Nothing sensible is left to do when stderr itself is gone.
        let _ = self.report(&assertion, io::stderr().lock());
        process::exit(ASSERT_EXIT_CODE)
    }
}

impl std::fmt::Debug for AssertContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssertContext")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Fails through `$ctx` when `$cond` is false, without location or message.
#[macro_export]
macro_rules! mputf_assert {
    ($ctx:expr, $cond:expr $(,)?) => {
        $ctx.assert_simple($cond)
    };
}

/// Fails through `$ctx` when `$cond` is false, recording the caller's
/// `file!()` and `line!()`.
#[macro_export]
macro_rules! mputf_assert_line {
    ($ctx:expr, $cond:expr $(,)?) => {
        $ctx.assert_line($cond, file!(), line!())
    };
}

/// Like [`mputf_assert_line!`] with a `format!`-style message.
#[macro_export]
macro_rules! mputf_assert_msg {
    ($ctx:expr, $cond:expr, $($msg:tt)+) => {
        $ctx.assert_msg($cond, file!(), line!(), format!($($msg)+))
    };
}
