use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Config Read Error: Path '{path}'")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML Parsing Error: {0}")]
    TomlParse(String),

    #[cfg(feature = "serde_support")]
    #[error("JSON Serialization Error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    #[error("YAML Parsing/Serialization Error: {0}")]
    YamlError(#[from] serde_yml::Error),

    #[error("Pattern Compile Error: Pattern \"{pattern}\" is not a valid regular expression")]
    PatternCompile {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Traversal Error: {0}")]
    Traversal(String),

    #[error("Filesystem Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File Read Error: Path '{path}'")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File Decode Error: Path '{path}' is not valid UTF-8 text")]
    Decode { path: PathBuf },

    #[error("Output Write Error: Path '{path}', Error: {message}")]
    OutputWrite { path: PathBuf, message: String },

    #[error("Invalid Argument: {0}")]
    InvalidArgument(String),
}

impl From<ignore::Error> for AppError {
    fn from(err: ignore::Error) -> Self {
        AppError::Traversal(err.to_string())
    }
}

impl AppError {
    /// Short name of the pipeline stage that produced the error.
    pub fn stage(&self) -> &'static str {
        match self {
            AppError::Config(_)
            | AppError::ConfigRead { .. }
            | AppError::TomlParse(_)
            | AppError::YamlError(_)
            | AppError::InvalidArgument(_) => "configuration",
            #[cfg(feature = "serde_support")]
            AppError::JsonSerialize(_) => "configuration",
            AppError::PatternCompile { .. } => "compile",
            AppError::Traversal(_) | AppError::Io(_) => "traversal",
            AppError::FileRead { .. } | AppError::Decode { .. } => "read",
            AppError::OutputWrite { .. } => "write",
        }
    }
}
