use crate::error::{AppError, Result};
use crate::source::ReadErrorPolicy;
use log;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_DIR: &str = ".srcreport";
pub const DEFAULT_CONFIG_FILENAME: &str = "srcreport.toml";
pub const DEFAULT_FILENAME_PREFIX: &str = "Report_";
pub const DEFAULT_EXTENSION: &str = "fodt";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub filters: FiltersConfig,
    #[serde(default)]
    pub read: ReadConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub style: StyleConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    #[serde(default)]
    pub project_name: Option<String>,
}

/// Extra patterns appended to the built-in include/exclude sets.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct FiltersConfig {
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ReadConfig {
    #[serde(default)]
    pub on_error: ReadErrorPolicy,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default)]
    pub dir: Option<PathBuf>,
    #[serde(default = "default_filename_prefix")]
    pub filename_prefix: String,
    #[serde(default = "default_extension")]
    pub extension: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct StyleConfig {
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default = "default_heading_size")]
    pub heading_size: String,
    #[serde(default = "default_code_size")]
    pub code_size: String,
}

fn default_filename_prefix() -> String {
    DEFAULT_FILENAME_PREFIX.to_string()
}
fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}
fn default_font_family() -> String {
    "Courier New".to_string()
}
fn default_heading_size() -> String {
    "14pt".to_string()
}
fn default_code_size() -> String {
    "12pt".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: None,
            filename_prefix: default_filename_prefix(),
            extension: default_extension(),
        }
    }
}
impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            font_family: default_font_family(),
            heading_size: default_heading_size(),
            code_size: default_code_size(),
        }
    }
}

impl Config {
    pub fn determine_project_root(cli_project_root: Option<&PathBuf>) -> Result<PathBuf> {
        let path_to_resolve = match cli_project_root {
            Some(p) => PathBuf::from(shellexpand::tilde(&p.to_string_lossy()).as_ref()),
            None => env::current_dir().map_err(AppError::Io)?,
        };

        path_to_resolve.canonicalize().map_err(|e| {
            AppError::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to canonicalize project root '{}': {}",
                    path_to_resolve.display(),
                    e
                ),
            ))
        })
    }

    /// Picks the config file: `--config-file` as a path, or as a name inside
    /// `.srcreport/` (`.toml` optional); otherwise `.srcreport/srcreport.toml`
    /// when present.
    pub fn resolve_config_path(
        project_root: &Path,
        requested: Option<&str>,
        disabled: bool,
    ) -> Result<Option<PathBuf>> {
        if disabled {
            log::debug!("Config file loading disabled via CLI flag.");
            return Ok(None);
        }
        let config_dir = project_root.join(DEFAULT_CONFIG_DIR);

        let Some(requested) = requested else {
            let default_path = config_dir.join(DEFAULT_CONFIG_FILENAME);
            log::debug!(
                "Default config {} present: {}",
                default_path.display(),
                default_path.exists()
            );
            return Ok(default_path.exists().then_some(default_path));
        };

        let given = PathBuf::from(shellexpand::tilde(requested).as_ref());
        let mut candidates = vec![given.clone(), config_dir.join(&given)];
        if given.extension().is_none() {
            candidates.push(given.with_extension("toml"));
            candidates.push(config_dir.join(&given).with_extension("toml"));
        }
        match candidates.iter().find(|c| c.exists()) {
            Some(found) => {
                log::debug!("Using config file: {}", found.display());
                Ok(Some(found.clone()))
            }
            None => Err(AppError::Config(format!(
                "Config file '{}' not found (looked in current dir and {})",
                requested,
                config_dir.display()
            ))),
        }
    }

    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        log::info!("Loading configuration from: {}", config_path.display());
        let toml_content = fs::read_to_string(config_path).map_err(|e| AppError::ConfigRead {
            path: config_path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&toml_content).map_err(|e| match e {
            AppError::TomlParse(msg) => AppError::TomlParse(format!(
                "Error parsing config file '{}': {}. Check TOML syntax and structure.",
                config_path.display(),
                msg
            )),
            other => other,
        })
    }

    pub fn from_toml_str(toml_content: &str) -> Result<Self> {
        toml::from_str::<Config>(toml_content).map_err(|e| AppError::TomlParse(e.to_string()))
    }

    pub fn get_effective_project_name(&self, project_root: &Path) -> String {
        self.general.project_name.clone().unwrap_or_else(|| {
            project_root
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "UnknownProject".to_string())
        })
    }

    /// `<dir>/<prefix><project name>.<extension>`; `dir` defaults to the
    /// current working directory.
    pub fn report_path(&self, project_root: &Path) -> Result<PathBuf> {
        let dir = match &self.output.dir {
            Some(dir) => PathBuf::from(shellexpand::tilde(&dir.to_string_lossy()).as_ref()),
            None => env::current_dir().map_err(AppError::Io)?,
        };
        let extension = self.output.extension.trim_start_matches('.');
        let filename = format!(
            "{}{}.{}",
            self.output.filename_prefix,
            self.get_effective_project_name(project_root),
            extension
        );
        Ok(dir.join(filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.read.on_error, ReadErrorPolicy::Skip);
        assert_eq!(config.style.font_family, "Courier New");
    }

    #[test]
    fn parses_all_sections() {
        let config = Config::from_toml_str(
            r#"
            [general]
            project_name = "demo"

            [filters]
            include = ['.*\.rs$']
            exclude = ['.*vendor']

            [read]
            on_error = "abort"

            [output]
            dir = "/tmp/out"
            filename_prefix = "Listing_"
            extension = "xml"

            [style]
            code_size = "10pt"
            "#,
        )
        .unwrap();
        assert_eq!(config.general.project_name.as_deref(), Some("demo"));
        assert_eq!(config.filters.include, vec![r".*\.rs$"]);
        assert_eq!(config.filters.exclude, vec![".*vendor"]);
        assert_eq!(config.read.on_error, ReadErrorPolicy::Abort);
        assert_eq!(config.style.code_size, "10pt");
        assert_eq!(config.style.heading_size, "14pt");
        assert_eq!(
            config.report_path(Path::new("/x/y/project")).unwrap(),
            PathBuf::from("/tmp/out/Listing_demo.xml")
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Config::from_toml_str("[filters]\nincludes = []\n").unwrap_err();
        assert!(matches!(err, AppError::TomlParse(_)));
    }

    #[test]
    fn report_name_comes_from_last_root_component() {
        let mut config = Config::default();
        config.output.dir = Some(PathBuf::from("/reports"));
        assert_eq!(
            config.report_path(Path::new("/x/y/project")).unwrap(),
            PathBuf::from("/reports/Report_project.fodt")
        );
    }

    #[test]
    fn resolves_default_and_named_config_files() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        assert_eq!(Config::resolve_config_path(root, None, false).unwrap(), None);

        let config_dir = root.join(DEFAULT_CONFIG_DIR);
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(config_dir.join(DEFAULT_CONFIG_FILENAME), "").unwrap();
        fs::write(config_dir.join("strict.toml"), "[read]\non_error = \"abort\"\n").unwrap();

        assert_eq!(
            Config::resolve_config_path(root, None, false).unwrap(),
            Some(config_dir.join(DEFAULT_CONFIG_FILENAME))
        );
        let named = Config::resolve_config_path(root, Some("strict"), false)
            .unwrap()
            .unwrap();
        assert_eq!(named, config_dir.join("strict.toml"));
        assert_eq!(
            Config::load_from_path(&named).unwrap().read.on_error,
            ReadErrorPolicy::Abort
        );
        assert_eq!(Config::resolve_config_path(root, None, true).unwrap(), None);
        assert!(Config::resolve_config_path(root, Some("missing"), false).is_err());

        let explicit = root.join("elsewhere.toml");
        fs::write(&explicit, "").unwrap();
        assert_eq!(
            Config::resolve_config_path(root, explicit.to_str(), false).unwrap(),
            Some(explicit)
        );
    }

    #[test]
    fn unreadable_config_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let not_a_file = dir.path().join("cfgdir.toml");
        fs::create_dir(&not_a_file).unwrap();
        let err = Config::load_from_path(&not_a_file).unwrap_err();
        assert!(matches!(err, AppError::ConfigRead { .. }));
        assert_eq!(err.stage(), "configuration");
    }
}
