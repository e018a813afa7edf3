//! # Command-Line Interface Module / 命令行接口模块
//!
//! Builds the `clap` command tree with localized help texts and dispatches to
//! the `run` and `init` commands. Running without a subcommand is the same as
//! `run` with all defaults.
//!
//! 构建带有本地化帮助文本的 `clap` 命令树，并分发到 `run` 和 `init` 命令。
//! 不带子命令运行等同于使用全部默认值的 `run`。

pub mod commands;

use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::{env, path::PathBuf};

use crate::infra::t;
use commands::run::RunArgs;

/// Pre-parses the command line arguments to find the language setting.
/// This allows i18n to be initialized before the full CLI is built.
/// It looks for `--lang <VALUE>` or `--lang=<VALUE>`.
fn pre_parse_language() -> Option<String> {
    let args: Vec<String> = env::args().collect();
    if let Some(pos) = args.iter().position(|arg| arg == "--lang") {
        return args.get(pos + 1).cloned();
    }
    args.iter()
        .find_map(|arg| arg.strip_prefix("--lang=").map(str::to_string))
}

fn run_args() -> Vec<Arg> {
    vec![
        Arg::new("config")
            .short('c')
            .long("config")
            .help(t!("cli.arg_config").to_string())
            .value_name("CONFIG")
            .value_parser(clap::value_parser!(PathBuf))
            .action(ArgAction::Set),
        Arg::new("project-dir")
            .long("project-dir")
            .help(t!("cli.arg_project_dir").to_string())
            .value_name("PROJECT_DIR")
            .default_value(".")
            .value_parser(clap::value_parser!(PathBuf))
            .action(ArgAction::Set),
        Arg::new("strict")
            .long("strict")
            .help(t!("cli.arg_strict").to_string())
            .action(ArgAction::SetTrue),
        Arg::new("case")
            .long("case")
            .help(t!("cli.arg_case").to_string())
            .value_name("CASE")
            .action(ArgAction::Append),
        Arg::new("total-runners")
            .long("total-runners")
            .help(t!("cli.arg_total_runners").to_string())
            .value_name("TOTAL_RUNNERS")
            .value_parser(clap::value_parser!(usize))
            .action(ArgAction::Set)
            .requires("runner-index"),
        Arg::new("runner-index")
            .long("runner-index")
            .help(t!("cli.arg_runner_index").to_string())
            .value_name("RUNNER_INDEX")
            .value_parser(clap::value_parser!(usize))
            .action(ArgAction::Set)
            .requires("total-runners"),
        Arg::new("html")
            .long("html")
            .help(t!("cli.arg_html").to_string())
            .value_name("HTML")
            .value_parser(clap::value_parser!(PathBuf))
            .action(ArgAction::Set),
        Arg::new("json")
            .long("json")
            .help(t!("cli.arg_json").to_string())
            .value_name("JSON")
            .value_parser(clap::value_parser!(PathBuf))
            .action(ArgAction::Set),
    ]
}

/// Builds the command tree. Help texts use the locale that is currently set.
pub fn build_cli() -> Command {
    Command::new("build-matrix")
        .version(env!("CARGO_PKG_VERSION"))
        .about(t!("cli.about").to_string())
        .arg(
            Arg::new("lang")
                .long("lang")
                .help(t!("cli.arg_lang").to_string())
                .value_name("LANGUAGE")
                .global(true)
                .action(ArgAction::Set),
        )
        .args(run_args())
        .subcommand(
            Command::new("run")
                .about(t!("cli.cmd_run_about").to_string())
                .args(run_args()),
        )
        .subcommand(
            Command::new("init")
                .about(t!("cli.cmd_init_about").to_string())
                .arg(
                    Arg::new("non-interactive")
                        .long("non-interactive")
                        .help(t!("cli.arg_non_interactive").to_string())
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("force")
                        .long("force")
                        .help(t!("cli.arg_force").to_string())
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("project-dir")
                        .long("project-dir")
                        .help(t!("cli.arg_project_dir").to_string())
                        .value_name("PROJECT_DIR")
                        .default_value(".")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                ),
        )
}

/// Extracts the `run` arguments from either the `run` subcommand or the top level.
pub fn run_args_from_matches(matches: &ArgMatches, lang: Option<String>) -> RunArgs {
    RunArgs {
        config: matches.get_one::<PathBuf>("config").cloned(),
        project_dir: matches
            .get_one::<PathBuf>("project-dir")
            .cloned()
            .unwrap_or_else(|| PathBuf::from(".")),
        strict: matches.get_flag("strict"),
        cases: matches
            .get_many::<String>("case")
            .map(|values| values.cloned().collect())
            .unwrap_or_default(),
        total_runners: matches.get_one::<usize>("total-runners").copied(),
        runner_index: matches.get_one::<usize>("runner-index").copied(),
        html: matches.get_one::<PathBuf>("html").cloned(),
        json: matches.get_one::<PathBuf>("json").cloned(),
        lang,
    }
}

pub async fn run() -> Result<()> {
    // Pre-parse language and initialize i18n first.
    let requested = pre_parse_language();
    crate::init(requested.as_deref());

    let matches = build_cli().get_matches();

    match matches.subcommand() {
        Some(("run", run_matches)) => {
            commands::run::execute(run_args_from_matches(run_matches, requested)).await?;
        }
        Some(("init", init_matches)) => {
            let non_interactive = init_matches.get_flag("non-interactive");
            let force = init_matches.get_flag("force");
            let project_dir = init_matches
                .get_one::<PathBuf>("project-dir")
                .cloned()
                .unwrap_or_else(|| PathBuf::from("."));
            commands::init::execute(&project_dir, non_interactive, force)?;
        }
        _ => {
            commands::run::execute(run_args_from_matches(&matches, requested)).await?;
        }
    }
    Ok(())
}
