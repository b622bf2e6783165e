mod cli_args;
mod commands;
mod output;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use colored::*;
use log;
use std::path::Path;
use std::process;

use cli_args::{Cli, Commands, FilterGroup, ProjectConfigOpts};
use srcreport_core::{AppError, Config};

fn main() {
    let cli_args = Cli::parse();

    setup_logging(cli_args.quiet, cli_args.verbose);

    let quiet = cli_args.quiet;

    log::debug!("CLI args parsed: {:?}", cli_args);

    let exit_code = match run_app(cli_args, quiet) {
        Ok(_) => {
            log::info!("Application finished successfully.");
            0
        }
        Err(e) => {
            let exit_code = exit_code_for(&e);
            eprintln!("{}", error_message(&e));
            exit_code
        }
    };
    log::debug!("Exiting with code {}", exit_code);
    process::exit(exit_code);
}

/// Exit status for a failed run, keyed on the core error under any context.
fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<AppError>() {
        Some(AppError::Config(_)) => 1,
        Some(AppError::ConfigRead { .. }) => 1,
        Some(AppError::TomlParse(_)) => 1,
        Some(AppError::YamlError(_)) => 1,
        Some(AppError::InvalidArgument(_)) => 1,
        Some(AppError::PatternCompile { .. }) => 2,
        Some(AppError::Traversal(_)) => 3,
        Some(AppError::Io(_)) => 3,
        Some(AppError::FileRead { .. }) => 4,
        Some(AppError::Decode { .. }) => 4,
        Some(AppError::OutputWrite { .. }) => 5,
        Some(_) => 1,
        None => 1,
    }
}

fn error_message(err: &anyhow::Error) -> String {
    let stage = err.downcast_ref::<AppError>().map_or("run", AppError::stage);
    format!(
        "{} {} {:#}",
        "Error:".red().bold(),
        format!("[{stage}]").dimmed(),
        err
    )
}

fn setup_logging(quiet: bool, verbose: u8) {
    let log_level = if quiet {
        log::LevelFilter::Off
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();
    log::trace!("Logger initialized with level: {:?}", log_level);
}

fn run_app(cli: Cli, quiet: bool) -> Result<()> {
    match cli.command {
        None => {
            Cli::command().print_help()?;
        }
        Some(Commands::Generate(args)) => {
            log::debug!("Executing 'generate' command...");
            commands::generate::handle_generate_command(args, quiet)?;
        }
        Some(Commands::Debug(args)) => {
            log::debug!("Executing 'debug' command...");
            commands::debug::handle_debug_command(args)?;
        }
    }
    Ok(())
}

/// Loads the config file for `project_root` (if any) and applies the CLI
/// project options and extra filter patterns on top of it.
pub fn load_config_for_command(
    project_root: &Path,
    project_opts: &ProjectConfigOpts,
    filters: &FilterGroup,
) -> Result<Config> {
    let config_path = Config::resolve_config_path(
        project_root,
        project_opts.config_file.as_deref(),
        project_opts.no_config_file,
    )
    .context("Failed to resolve configuration path")?;

    let mut config = match &config_path {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(name) = &project_opts.project_name {
        config.general.project_name = Some(name.clone());
    }
    // CLI patterns come after the config file's, which come after the defaults.
    config.filters.include.extend(filters.include.iter().cloned());
    config.filters.exclude.extend(filters.exclude.iter().cloned());

    config.general.project_name = Some(config.get_effective_project_name(project_root));
    log::trace!("Effective config: {:?}", config);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::io;
    use std::path::PathBuf;

    fn wrapped(err: AppError) -> anyhow::Error {
        Err::<(), _>(err)
            .context("Failed to run command")
            .unwrap_err()
    }

    fn io_error() -> io::Error {
        io::Error::new(io::ErrorKind::Other, "boom")
    }

    #[test]
    fn exit_codes_follow_failing_stage() {
        let cases = vec![
            (AppError::Config("bad".into()), 1),
            (
                AppError::ConfigRead {
                    path: PathBuf::from("cfgdir.toml"),
                    source: io_error(),
                },
                1,
            ),
            (AppError::TomlParse("bad".into()), 1),
            (AppError::InvalidArgument("bad".into()), 1),
            (compile_error(), 2),
            (AppError::Traversal("denied".into()), 3),
            (AppError::Io(io_error()), 3),
            (
                AppError::FileRead {
                    path: PathBuf::from("a.py"),
                    source: io_error(),
                },
                4,
            ),
            (
                AppError::Decode {
                    path: PathBuf::from("a.py"),
                },
                4,
            ),
            (
                AppError::OutputWrite {
                    path: PathBuf::from("Report_x.fodt"),
                    message: "disk full".into(),
                },
                5,
            ),
        ];
        for (err, expected) in cases {
            let label = err.to_string();
            assert_eq!(exit_code_for(&wrapped(err)), expected, "{label}");
        }
        assert_eq!(exit_code_for(&anyhow!("not a core error")), 1);
    }

    #[test]
    fn error_message_names_stage() {
        colored::control::set_override(false);
        let err = wrapped(AppError::ConfigRead {
            path: PathBuf::from("cfgdir.toml"),
            source: io_error(),
        });
        let message = error_message(&err);
        assert!(message.starts_with("Error: [configuration] Failed to run command"));
        assert_eq!(message.matches("boom").count(), 1);

        let err = wrapped(compile_error());
        assert!(error_message(&err).starts_with("Error: [compile]"));
    }

    fn compile_error() -> AppError {
        srcreport_core::compile_patterns(&["(unbalanced"]).unwrap_err()
    }
}
