use crate::cli_args::DebugArgs;
use crate::load_config_for_command;
use crate::output::{print_heading, print_path_list, print_structured};
use anyhow::{Context, Result};
use log;
use serde::Serialize;
use srcreport_core::{self as core, Config, SelectionPolicy};
use std::path::PathBuf;

#[derive(Debug, Serialize)]
struct DebugInfo<'a> {
    effective_config: &'a Config,
    project_root: PathBuf,
    report_path: PathBuf,
    include_patterns: Vec<String>,
    exclude_patterns: Vec<String>,
    selected_files: Vec<String>,
}

pub fn handle_debug_command(args: DebugArgs) -> Result<()> {
    let project_root = Config::determine_project_root(args.project_config.project_root.as_ref())
        .context("Failed to determine project root")?;
    log::info!("Project root determined: {}", project_root.display());

    let config = load_config_for_command(&project_root, &args.project_config, &args.filters)
        .context("Failed to load configuration for debug command")?;

    let policy = SelectionPolicy::with_extras(&config.filters.include, &config.filters.exclude)
        .context("Failed to compile selection patterns")?;
    log::debug!("Debug: Selecting files...");
    let files = core::select_files(&project_root, &policy)
        .context("Failed to gather file list for debug")?;

    let debug_data = DebugInfo {
        effective_config: &config,
        report_path: config.report_path(&project_root)?,
        project_root,
        include_patterns: policy.include().sources(),
        exclude_patterns: policy.exclude().sources(),
        selected_files: files.into_iter().map(|f| f.display_path).collect(),
    };

    match args.format.as_deref() {
        Some(format) => print_structured(&debug_data, format),
        None => print_debug_info_pretty(&debug_data),
    }
}

fn print_debug_info_pretty(debug_info: &DebugInfo) -> Result<()> {
    print_heading("Effective Configuration");
    let config_toml = toml::to_string_pretty(debug_info.effective_config)
        .context("Failed to serialize effective config to TOML")?;
    println!("{}", config_toml);

    print_heading("Paths");
    println!("Project root: {}", debug_info.project_root.display());
    println!("Report:       {}", debug_info.report_path.display());

    print_path_list("Include Patterns", &debug_info.include_patterns);
    print_path_list("Exclude Patterns", &debug_info.exclude_patterns);
    print_path_list(
        &format!("Selected Files ({})", debug_info.selected_files.len()),
        &debug_info.selected_files,
    );
    Ok(())
}
