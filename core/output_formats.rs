use crate::error::{AppError, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct DefaultPatterns {
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

static DEFAULT_PATTERNS: Lazy<DefaultPatterns> = Lazy::new(|| {
    let yaml_content = include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../data/default_patterns.yaml"
    ));
    serde_yml::from_str(yaml_content).expect("Failed to parse embedded data/default_patterns.yaml")
});

/// Built-in include/exclude pattern strings, in declaration order.
pub fn default_patterns() -> &'static DefaultPatterns {
    &DEFAULT_PATTERNS
}

#[cfg(feature = "serde_support")]
pub fn serialize_to_json<T: Serialize>(data: &T, pretty: bool) -> Result<String, AppError> {
    if pretty {
        serde_json::to_string_pretty(data).map_err(AppError::JsonSerialize)
    } else {
        serde_json::to_string(data).map_err(AppError::JsonSerialize)
    }
}

pub fn serialize_to_yaml<T: Serialize>(data: &T) -> Result<String> {
    serde_yml::to_string(data).map_err(AppError::YamlError)
}
