use crate::error::{AppError, Result};
use crate::selector::SelectedFile;
use log;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// What to do when a selected file cannot be read as UTF-8 text.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReadErrorPolicy {
    /// Log a warning and leave the file out of the report.
    #[default]
    Skip,
    /// Stop the run with the read error.
    Abort,
}

#[derive(Debug, Clone)]
pub struct SourceFile {
    pub display_path: String,
    pub content: String,
}

pub fn read_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| AppError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    String::from_utf8(bytes).map_err(|_| AppError::Decode {
        path: path.to_path_buf(),
    })
}

/// Reads one selected file. `Ok(None)` means it was skipped under
/// [`ReadErrorPolicy::Skip`].
pub fn read_source(file: &SelectedFile, policy: ReadErrorPolicy) -> Result<Option<SourceFile>> {
    match read_text(&file.path) {
        Ok(content) => Ok(Some(SourceFile {
            display_path: file.display_path.clone(),
            content,
        })),
        Err(e) => match policy {
            ReadErrorPolicy::Skip => {
                match std::error::Error::source(&e) {
                    Some(cause) => log::warn!("Skipping {}: {}: {}", file.display_path, e, cause),
                    None => log::warn!("Skipping {}: {}", file.display_path, e),
                }
                Ok(None)
            }
            ReadErrorPolicy::Abort => Err(e),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selected(path: &Path) -> SelectedFile {
        SelectedFile {
            path: path.to_path_buf(),
            display_path: "./file".to_string(),
        }
    }

    #[test]
    fn reads_utf8_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, "hello\n").unwrap();
        let source = read_source(&selected(&path), ReadErrorPolicy::Abort)
            .unwrap()
            .unwrap();
        assert_eq!(source.content, "hello\n");
        assert_eq!(source.display_path, "./file");
    }

    #[test]
    fn binary_file_is_skipped_or_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.txt");
        fs::write(&path, [0xffu8, 0xfe, 0x00, 0x80]).unwrap();

        assert!(read_source(&selected(&path), ReadErrorPolicy::Skip)
            .unwrap()
            .is_none());
        let err = read_source(&selected(&path), ReadErrorPolicy::Abort).unwrap_err();
        assert!(matches!(err, AppError::Decode { .. }));
    }

    #[test]
    fn missing_file_reports_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.txt");
        let err = read_source(&selected(&path), ReadErrorPolicy::Abort).unwrap_err();
        assert!(matches!(err, AppError::FileRead { .. }));
    }
}
