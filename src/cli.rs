//! # CLI Module / 命令行模块
//!
//! Builds the `mputf` command line and dispatches to the run command.
//!
//! 构建 `mputf` 命令行并分派到运行命令。

use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::{env, path::PathBuf};

use crate::{infra::logging, infra::t, init_locale};

pub mod commands;

/// Default path of the suite configuration.
pub const DEFAULT_CONFIG: &str = "config.xml";
/// Default path of the JUnit report.
pub const DEFAULT_OUTPUT: &str = "testResults.xml";

/// Options of one `mputf` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub config: PathBuf,
    pub output: PathBuf,
    pub verbosity: u8,
}

/// Pre-parses the command line arguments to find the language setting.
/// This allows i18n to be initialized before the full CLI is built, so the
/// help text is already localized.
/// It looks for `--lang <VALUE>` or `--lang=<VALUE>`.
fn pre_parse_language<I: IntoIterator<Item = String>>(args: I) -> Option<String> {
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if arg == "--lang" {
            return args.next();
        }
        if let Some(lang) = arg.strip_prefix("--lang=") {
            return Some(lang.to_string());
        }
    }
    None
}

pub fn build_cli(locale: &str) -> Command {
    Command::new("mputf")
        .version(env!("CARGO_PKG_VERSION"))
        .about(t!("cli_about", locale = locale).to_string())
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help(t!("arg_config", locale = locale).to_string())
                .value_name("CONFIG")
                .default_value(DEFAULT_CONFIG)
                .value_parser(clap::value_parser!(PathBuf))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("outputFile")
                .short('o')
                .long("outputFile")
                .help(t!("arg_output", locale = locale).to_string())
                .value_name("OUTPUT_FILE")
                .default_value(DEFAULT_OUTPUT)
                .value_parser(clap::value_parser!(PathBuf))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("lang")
                .long("lang")
                .help(t!("arg_lang", locale = locale).to_string())
                .value_name("LANGUAGE")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help(t!("arg_verbose", locale = locale).to_string())
                .action(ArgAction::Count),
        )
}

/// Extracts [`RunOptions`] from parsed matches.
pub fn run_options(matches: &ArgMatches) -> RunOptions {
    RunOptions {
        config: matches
            .get_one::<PathBuf>("config")
            .cloned()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG)),
        output: matches
            .get_one::<PathBuf>("outputFile")
            .cloned()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)),
        verbosity: matches.get_count("verbose"),
    }
}

pub async fn run() -> Result<()> {
    // Pre-parse language and initialize i18n first.
    let locale = init_locale(pre_parse_language(env::args().skip(1)).as_deref());

    let matches = build_cli(&locale).get_matches();
    let options = run_options(&matches);
    logging::init(options.verbosity);

    commands::run::execute(options, &locale).await
}
