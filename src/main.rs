//! Chrome Vipers recruitment terminal.
//!
//! `init` seeds the config and catalog files, `check` validates them, and
//! `run` starts the interactive session against the Gemini backend.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use recruiter::core::session::Session;
use recruiter::core::types::Failure;
use recruiter::exit_codes;
use recruiter::io::catalog::{DEFAULT_QUESTIONS, DEFAULT_ROLES, load_catalog};
use recruiter::io::config::{RecruiterConfig, load_config, write_config};
use recruiter::io::gemini::GeminiGateway;
use recruiter::logging;
use recruiter::term::Terminal;

#[derive(Parser)]
#[command(
    name = "recruiter",
    version,
    about = "Chrome Vipers recruitment terminal"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write `recruiter.toml` and the default catalog files if missing.
    Init {
        /// Overwrite existing files.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate config and catalog.
    Check {
        /// Path to the config file.
        #[arg(long, default_value = "recruiter.toml")]
        config: PathBuf,
    },
    /// Run the interactive recruitment session.
    Run {
        /// Path to the config file.
        #[arg(long, default_value = "recruiter.toml")]
        config: PathBuf,
        /// Skip typing and spinner delays.
        #[arg(long)]
        no_fx: bool,
    },
}

fn main() {
    logging::init();
    let cli = Cli::parse();
    let code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            exit_codes::INVALID
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Command::Init { force } => cmd_init(force),
        Command::Check { config } => cmd_check(&config),
        Command::Run { config, no_fx } => cmd_run(&config, no_fx),
    }
}

fn cmd_init(force: bool) -> Result<i32> {
    let config = RecruiterConfig::default();
    let config_path = Path::new("recruiter.toml");
    if force || !config_path.exists() {
        write_config(config_path, &config)?;
    }

    write_if_missing_or_force(&config.roles_path, DEFAULT_ROLES, force)?;
    write_if_missing_or_force(&config.questions_path, DEFAULT_QUESTIONS, force)?;
    Ok(exit_codes::OK)
}

fn cmd_check(config_path: &Path) -> Result<i32> {
    let config = load_config(config_path)?;
    let catalog = load_catalog(&config.roles_path, &config.questions_path)?;
    println!(
        "ok: {} roles, {} questions",
        catalog.roles.len(),
        catalog.questions.len()
    );
    Ok(exit_codes::OK)
}

/// Load everything, then hand over to the terminal. Bootstrap problems are
/// rendered as the themed failure and exit `INVALID`; there is nothing a
/// restart could reload differently.
fn cmd_run(config_path: &Path, no_fx: bool) -> Result<i32> {
    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(err) => return bootstrap_failed(&err),
    };
    let catalog = match load_catalog(&config.roles_path, &config.questions_path) {
        Ok(catalog) => catalog,
        Err(err) => return bootstrap_failed(&err),
    };
    let gateway = match GeminiGateway::from_env(&config.model.endpoint, &config.api_key_env) {
        Ok(gateway) => gateway,
        Err(err) => return bootstrap_failed(&err),
    };

    Terminal::new(&config, &catalog, &gateway, !no_fx).run()
}

/// Run the failure through the state machine so even the pre-flow error
/// path ends in a well-formed failed session.
fn bootstrap_failed(err: &anyhow::Error) -> Result<i32> {
    let mut session = Session::new();
    session.fail_bootstrap(Failure::bootstrap(&format!("{err:#}")))?;
    let failure = session.failure().context("bootstrap failure not recorded")?;
    println!("{}", failure.message);
    Ok(exit_codes::INVALID)
}

fn write_if_missing_or_force(path: &Path, contents: &str, force: bool) -> Result<()> {
    if !force && path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_init() {
        let cli = Cli::parse_from(["recruiter", "init"]);
        assert!(matches!(cli.command, Command::Init { force: false }));
    }

    #[test]
    fn parse_init_force() {
        let cli = Cli::parse_from(["recruiter", "init", "--force"]);
        assert!(matches!(cli.command, Command::Init { force: true }));
    }

    #[test]
    fn parse_run_flags() {
        let cli = Cli::parse_from(["recruiter", "run", "--no-fx", "--config", "custom.toml"]);
        let Command::Run { config, no_fx } = cli.command else {
            panic!("expected run");
        };
        assert!(no_fx);
        assert_eq!(config, PathBuf::from("custom.toml"));
    }

    #[test]
    fn check_defaults_to_recruiter_toml() {
        let cli = Cli::parse_from(["recruiter", "check"]);
        let Command::Check { config } = cli.command else {
            panic!("expected check");
        };
        assert_eq!(config, PathBuf::from("recruiter.toml"));
    }
}
