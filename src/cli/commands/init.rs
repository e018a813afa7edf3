//! # Init Command Module / 初始化命令模块
//!
//! This module implements the `init` command, which writes a
//! `BuildMatrix.toml` into the project directory, either with the defaults or
//! through a short interactive wizard.
//!
//! 此模块实现了 `init` 命令，向项目目录写入 `BuildMatrix.toml`，
//! 可以使用默认值，也可以通过简短的交互式向导。

use anyhow::{Context, Result};
use colored::*;
use dialoguer::{theme::ColorfulTheme, Confirm, Input};
use std::{fs, path::Path};

use crate::core::config::{MatrixConfig, DEFAULT_CONFIG_FILE};
use crate::infra::t;

const CONFIG_HEADER: &str = "# Build matrix configuration / 构建矩阵配置\n\
# Every key is optional; removing one restores its default.\n\n";

/// Executes the init command.
///
/// # Arguments
/// * `project_dir` - Directory that receives `BuildMatrix.toml`
/// * `non_interactive` - Write the defaults without prompting
/// * `force` - Overwrite an existing file without asking
pub fn execute(project_dir: &Path, non_interactive: bool, force: bool) -> Result<()> {
    let output = project_dir.join(DEFAULT_CONFIG_FILE);

    if output.exists() && !force {
        let overwrite = !non_interactive
            && Confirm::with_theme(&ColorfulTheme::default())
                .with_prompt(t!("init.confirm_overwrite", path = output.display()).to_string())
                .default(false)
                .interact()
                .context(t!("init.prompt_failed").to_string())?;
        if !overwrite {
            println!("{}", t!("init.file_exists", path = output.display()).red());
            println!("{}", t!("init.use_force").yellow());
            return Ok(());
        }
    }

    let config = if non_interactive {
        MatrixConfig::default()
    } else {
        prompt_for_config()?
    };

    write_config(&output, &config)?;

    println!(
        "\n{} {}",
        "✔".green(),
        t!("init.success", path = output.display()).bold()
    );
    println!("{}", t!("init.next_steps"));
    Ok(())
}

/// Serializes `config` with a short header and writes it to `output`.
pub fn write_config(output: &Path, config: &MatrixConfig) -> Result<()> {
    let body = toml::to_string_pretty(config).context(t!("init.serialize_failed").to_string())?;

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).with_context(|| {
                t!("init.create_parent_dir_failed", path = parent.display()).to_string()
            })?;
        }
    }

    fs::write(output, format!("{CONFIG_HEADER}{body}"))
        .with_context(|| t!("init.write_failed", path = output.display()).to_string())
}

fn prompt_for_config() -> Result<MatrixConfig> {
    let theme = ColorfulTheme::default();
    let defaults = MatrixConfig::default();

    println!("\n{}", t!("init.wizard_welcome").bold().cyan());
    println!("{}\n", t!("init.wizard_description"));

    let strict = Confirm::with_theme(&theme)
        .with_prompt(t!("init.prompt_strict").to_string())
        .default(defaults.strict)
        .interact()
        .context(t!("init.prompt_failed").to_string())?;

    let build_dir: String = Input::with_theme(&theme)
        .with_prompt(t!("init.prompt_build_dir").to_string())
        .default(defaults.build_dir.clone())
        .interact_text()
        .context(t!("init.prompt_failed").to_string())?;

    let log_file: String = Input::with_theme(&theme)
        .with_prompt(t!("init.prompt_log_file").to_string())
        .default(defaults.log_file.clone())
        .interact_text()
        .context(t!("init.prompt_failed").to_string())?;

    let timeout: String = Input::with_theme(&theme)
        .with_prompt(t!("init.prompt_timeout").to_string())
        .allow_empty(true)
        .validate_with(|input: &String| -> std::result::Result<(), String> {
            if input.trim().is_empty() || input.trim().parse::<u64>().is_ok() {
                Ok(())
            } else {
                Err(t!("init.invalid_timeout").to_string())
            }
        })
        .interact_text()
        .context(t!("init.prompt_failed").to_string())?;

    let mut config = MatrixConfig {
        strict,
        build_dir,
        log_file,
        ..defaults
    };
    config.test_run.timeout_secs = timeout.trim().parse::<u64>().ok();
    config.validate()?;
    Ok(config)
}
