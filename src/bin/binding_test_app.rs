//! Test executable that produces every outcome mputf can observe.
//! 可产生 mputf 能观察到的每种结果的测试程序。

use clap::{ArgGroup, Parser};
use mputf::bindings::AssertContext;
use mputf::{mputf_assert, mputf_assert_line, mputf_assert_msg};
use std::io::{self, Write};
use std::process;
use std::time::Duration;

/// Message used by `--assert-message`.
const ASSERT_MESSAGE: &str = "binding test message";
/// Printed on stdout by the registered listener before an assertion exits.
const LISTENER_NOTICE: &str = "assert listener notified";

#[derive(Debug, Parser)]
#[command(name = "binding_test_app", about = "Simulates test executable outcomes")]
#[command(group(ArgGroup::new("action").args([
    "assert_simple", "assert_line", "assert_message", "pass", "hang", "panic", "exit_code",
])))]
struct Args {
    /// Fail with a bare assertion
    #[arg(long)]
    assert_simple: bool,
    /// Fail with an assertion carrying file and line
    #[arg(long)]
    assert_line: bool,
    /// Fail with an assertion carrying file, line and message
    #[arg(long)]
    assert_message: bool,
    /// Exit with 0
    #[arg(long)]
    pass: bool,
    /// Never terminate
    #[arg(long)]
    hang: bool,
    /// Panic
    #[arg(long)]
    panic: bool,
    /// Exit with the given code
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    exit_code: Option<i32>,
    /// Text written to stdout before acting
    #[arg(long, value_name = "TEXT")]
    stdout: Option<String>,
    /// Text written to stderr before acting
    #[arg(long, value_name = "TEXT")]
    stderr: Option<String>,
    /// Number of bytes written to both streams before acting
    #[arg(long, value_name = "BYTES")]
    flood: Option<usize>,
}

fn flood(bytes: usize) -> io::Result<()> {
    let chunk = [b'x'; 4096];
    let mut out = io::stdout().lock();
    let mut err = io::stderr().lock();
    let mut remaining = bytes;
    while remaining > 0 {
        let n = remaining.min(chunk.len());
        out.write_all(&chunk[..n])?;
        err.write_all(&chunk[..n])?;
        remaining -= n;
    }
    out.flush()?;
    err.flush()
}

fn main() -> io::Result<()> {
    let args = Args::parse();

    if let Some(text) = &args.stdout {
        print!("{text}");
        io::stdout().flush()?;
    }
    if let Some(text) = &args.stderr {
        eprint!("{text}");
        io::stderr().flush()?;
    }
    if let Some(bytes) = args.flood {
        flood(bytes)?;
    }

    let mut ctx = AssertContext::new();
    ctx.on_assert(|_| {
        println!("{LISTENER_NOTICE}");
        let _ = io::stdout().flush();
    });

    if args.assert_simple {
        mputf_assert!(ctx, false);
    } else if args.assert_line {
        mputf_assert_line!(ctx, false);
    } else if args.assert_message {
        mputf_assert_msg!(ctx, false, "{ASSERT_MESSAGE}");
    } else if args.pass {
        return Ok(());
    } else if args.hang {
        loop {
            std::thread::sleep(Duration::from_secs(1));
        }
    } else if args.panic {
        panic!("binding_test_app asked to panic");
    } else if let Some(code) = args.exit_code {
        process::exit(code);
    }

    eprintln!(
        "usage: binding_test_app [--assert-simple|--assert-line|--assert-message|--pass|--hang|--panic|--exit-code N] \
         [--stdout TEXT] [--stderr TEXT] [--flood BYTES]"
    );
    process::exit(-1)
}
