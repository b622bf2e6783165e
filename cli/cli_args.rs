use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Args, Debug, Clone, Default)]
pub struct ProjectConfigOpts {
    #[arg(
        long,
        help = "Specify the directory to scan (default: current dir).",
        help_heading = "Project Setup",
        value_name = "PATH"
    )]
    pub project_root: Option<PathBuf>,

    #[arg(
        long,
        help = "Specify path/filename of the TOML config file (default: .srcreport/srcreport.toml).",
        value_name = "CONFIG_FILE",
        conflicts_with = "no_config_file",
        help_heading = "Project Setup"
    )]
    pub config_file: Option<String>,

    #[arg(
        long,
        help = "Disable loading any TOML config file.",
        conflicts_with = "config_file",
        help_heading = "Project Setup"
    )]
    pub no_config_file: bool,

    #[arg(
        long,
        help = "Specify the project name used in the report filename (overrides config/dir name).",
        value_name = "NAME",
        help_heading = "Project Setup"
    )]
    pub project_name: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterGroup {
    #[arg(short = 'i', long = "include", value_name = "PATTERN", action = clap::ArgAction::Append, help = "Add a regex include pattern (matched case-insensitively from the start of the path).", help_heading = "File Selection")]
    pub include: Vec<String>,
    #[arg(short = 'e', long = "exclude", value_name = "PATTERN", action = clap::ArgAction::Append, help = "Add a regex exclude pattern (exclusion always wins).", help_heading = "File Selection")]
    pub exclude: Vec<String>,
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Render a project's text files into a single document.",
    long_about = "srcreport walks a project directory, selects text files by regex pattern \nand renders them into one OpenDocument text report, one section per file.",
    help_template = "{about-section}\nUsage: {usage}\n\n{all-args}{after-help}",
    after_help = "EXAMPLES:\n  srcreport generate\n  srcreport generate -i '.*\\.rs$' -e '.*target'\n  srcreport debug -f json",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true, help = "Increase message verbosity (-v, -vv).")]
    pub verbose: u8,

    #[arg(
        short,
        long,
        global = true,
        help = "Silence informational messages and warnings."
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    #[command(
        visible_alias = "g",
        visible_alias = "gen",
        about = "Select files and write the report."
    )]
    Generate(GenerateArgs),

    #[command(
        visible_alias = "d",
        about = "Show effective configuration, patterns and selected files."
    )]
    Debug(DebugArgs),
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,
    #[clap(flatten)]
    pub filters: FilterGroup,

    #[arg(
        short = 'o',
        long,
        value_name = "DIR",
        help = "Directory to write the report into (default: current dir).",
        help_heading = "Output Control"
    )]
    pub output_dir: Option<PathBuf>,

    #[arg(
        long,
        help = "Abort on the first file that cannot be read as UTF-8 text.",
        overrides_with = "skip_unreadable",
        help_heading = "Output Control"
    )]
    pub abort_on_unreadable: bool,

    #[arg(
        long,
        help = "Skip files that cannot be read as UTF-8 text [default].",
        overrides_with = "abort_on_unreadable",
        help_heading = "Output Control"
    )]
    pub skip_unreadable: bool,
}

#[derive(Args, Debug, Clone)]
pub struct DebugArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,
    #[clap(flatten)]
    pub filters: FilterGroup,

    #[arg(short = 'f', long, help = "Print structured output instead of text.", value_name = "FORMAT", value_parser = ["json", "yaml"])]
    pub format: Option<String>,
}
