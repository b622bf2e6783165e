use crate::cli_args::GenerateArgs;
use crate::load_config_for_command;
use anyhow::{Context, Result};
use colored::Colorize;
use log;
use srcreport_core::{self as core, Config, ReadErrorPolicy, SelectionPolicy};
use std::io::{self, Write};

pub fn handle_generate_command(args: GenerateArgs, quiet: bool) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    run_generate(args, quiet, &mut handle)
}

/// Prints the file count, then each path as it is rendered, then where the
/// report went.
fn run_generate<W: Write>(args: GenerateArgs, quiet: bool, out: &mut W) -> Result<()> {
    let project_root = Config::determine_project_root(args.project_config.project_root.as_ref())
        .context("Failed to determine project root")?;
    log::info!("Project root determined: {}", project_root.display());

    let mut config = load_config_for_command(&project_root, &args.project_config, &args.filters)
        .context("Failed to load configuration")?;
    if let Some(dir) = &args.output_dir {
        config.output.dir = Some(dir.clone());
    }
    if args.abort_on_unreadable {
        config.read.on_error = ReadErrorPolicy::Abort;
    }
    if args.skip_unreadable {
        config.read.on_error = ReadErrorPolicy::Skip;
    }

    // Compile everything before touching the filesystem.
    let policy = SelectionPolicy::with_extras(&config.filters.include, &config.filters.exclude)
        .context("Failed to compile selection patterns")?;
    let report_path = config.report_path(&project_root)?;

    log::debug!("Selecting files...");
    let files = core::select_files(&project_root, &policy)
        .with_context(|| format!("Failed to scan {}", project_root.display()))?;
    writeln!(out, "{} files found", files.len()).context("Failed to write to stdout")?;

    let title = config.get_effective_project_name(&project_root);
    let mut console_error = None;
    let summary = core::write_report(
        &report_path,
        &title,
        &config.style,
        &files,
        config.read.on_error,
        |file| {
            if console_error.is_none() {
                console_error = writeln!(out, "{}", file.display_path).err();
            }
        },
    )
    .context("Failed to write report")?;
    if let Some(e) = console_error {
        return Err(e).context("Failed to write to stdout");
    }

    if !summary.skipped.is_empty() && !quiet {
        eprintln!(
            "\n{}",
            "Warning: Some files could not be read as text and were skipped:".yellow()
        );
        for path in &summary.skipped {
            eprintln!(" - {}", path);
        }
    }
    if !quiet {
        writeln!(
            out,
            "{} Report saved to: {}",
            "Done.".green(),
            summary.path.display().to_string().blue()
        )
        .context("Failed to write to stdout")?;
    }
    out.flush().context("Failed to flush stdout")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli_args::{FilterGroup, ProjectConfigOpts};
    use std::fs;

    fn args(root: &std::path::Path, output_dir: &std::path::Path, include: &[&str]) -> GenerateArgs {
        GenerateArgs {
            project_config: ProjectConfigOpts {
                project_root: Some(root.to_path_buf()),
                no_config_file: true,
                ..Default::default()
            },
            filters: FilterGroup {
                include: include.iter().map(|s| s.to_string()).collect(),
                exclude: Vec::new(),
            },
            output_dir: Some(output_dir.to_path_buf()),
            abort_on_unreadable: false,
            skip_unreadable: false,
        }
    }

    fn project() -> tempfile::TempDir {
        let dir = tempfile::Builder::new().prefix("srcreport").tempdir().unwrap();
        for file in ["src/app.py", "readme.md", "node_modules/lib.js"] {
            let path = dir.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "x = 1\n").unwrap();
        }
        dir
    }

    #[test]
    fn console_lists_count_then_sorted_paths_then_location() {
        colored::control::set_override(false);
        let root = project();
        let out_dir = tempfile::tempdir().unwrap();

        let mut console = Vec::new();
        run_generate(args(root.path(), out_dir.path(), &[]), false, &mut console).unwrap();

        let report = fs::canonicalize(root.path())
            .unwrap()
            .file_name()
            .map(|n| format!("Report_{}.fodt", n.to_string_lossy()))
            .unwrap();
        let report_path = out_dir.path().join(&report);
        assert!(report_path.exists());

        let text = String::from_utf8(console).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "2 files found",
                "./readme.md",
                "./src/app.py",
                format!("Done. Report saved to: {}", report_path.display()).as_str(),
            ]
        );
    }

    #[test]
    fn bad_pattern_fails_before_report_is_created() {
        let root = project();
        let out_dir = tempfile::tempdir().unwrap();

        let mut console = Vec::new();
        let err = run_generate(
            args(root.path(), out_dir.path(), &["(unbalanced"]),
            false,
            &mut console,
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<srcreport_core::AppError>(),
            Some(srcreport_core::AppError::PatternCompile { .. })
        ));
        assert!(console.is_empty());
        assert_eq!(fs::read_dir(out_dir.path()).unwrap().count(), 0);
    }
}
