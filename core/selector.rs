use crate::error::{AppError, Result};
use crate::patterns::{PatternSet, compile_patterns, default_exclude_set, default_include_set};
use ignore::WalkBuilder;
use log;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Include and exclude pattern sets applied to every candidate path.
#[derive(Debug, Clone)]
pub struct SelectionPolicy {
    include: PatternSet,
    exclude: PatternSet,
}

/// Outcome of testing one path against a [`SelectionPolicy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Selected,
    Excluded(String),
    NotIncluded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub display_path: String,
}

impl SelectionPolicy {
    pub fn new(include: PatternSet, exclude: PatternSet) -> Self {
        Self { include, exclude }
    }

    pub fn defaults() -> Result<Self> {
        Ok(Self::new(default_include_set()?, default_exclude_set()?))
    }

    /// Built-in defaults with the extra patterns appended to each set.
    pub fn with_extras<S: AsRef<str>>(extra_include: &[S], extra_exclude: &[S]) -> Result<Self> {
        let mut policy = Self::defaults()?;
        policy.include.extend(compile_patterns(extra_include)?);
        policy.exclude.extend(compile_patterns(extra_exclude)?);
        log::debug!(
            "Selection policy: {} include, {} exclude patterns",
            policy.include.len(),
            policy.exclude.len()
        );
        Ok(policy)
    }

    pub fn include(&self) -> &PatternSet {
        &self.include
    }

    pub fn exclude(&self) -> &PatternSet {
        &self.exclude
    }

    pub fn classify(&self, path: &str) -> Selection {
        if let Some(pattern) = self.exclude.first_match(path) {
            return Selection::Excluded(pattern.as_str().to_string());
        }
        if self.include.any_match(path) {
            Selection::Selected
        } else {
            Selection::NotIncluded
        }
    }

    pub fn is_selected(&self, path: &str) -> bool {
        self.classify(path) == Selection::Selected
    }
}

/// Walks `root`, following symbolic links, and returns every regular file
/// accepted by `policy`, sorted by path string and deduplicated.
///
/// Unreadable entries and symlink loops are logged and skipped.
pub fn select_files(root: &Path, policy: &SelectionPolicy) -> Result<Vec<SelectedFile>> {
    if !root.is_dir() {
        return Err(AppError::InvalidArgument(format!(
            "Project root '{}' is not a directory",
            root.display()
        )));
    }

    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(true)
        .build();

    log::info!("Walking project directory: {}", root.display());
    let mut selected = Vec::<PathBuf>::new();
    let mut visited = 0usize;
    for entry_result in walker {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Skipping unreadable entry: {}", AppError::from(e));
                continue;
            }
        };
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        visited += 1;

        let path = entry.path();
        let path_str = path.to_string_lossy();
        match policy.classify(&path_str) {
            Selection::Selected => {
                log::trace!("Including: {}", path_str);
                selected.push(path.to_path_buf());
            }
            Selection::Excluded(pattern) => {
                log::trace!("Excluded by \"{}\": {}", pattern, path_str);
            }
            Selection::NotIncluded => {
                log::trace!("Not matched by any include pattern: {}", path_str);
            }
        }
    }
    log::info!(
        "Directory walk complete. Selected {} of {} files.",
        selected.len(),
        visited
    );

    selected.sort_unstable_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
    selected.dedup();

    Ok(selected
        .into_iter()
        .map(|path| {
            let display_path = display_path(&path, root);
            SelectedFile { path, display_path }
        })
        .collect())
}

/// Compiles the extra patterns, then selects. A bad pattern fails before
/// the walk starts.
pub fn gather_files<S: AsRef<str>>(
    root: &Path,
    extra_include: &[S],
    extra_exclude: &[S],
) -> Result<Vec<SelectedFile>> {
    let policy = SelectionPolicy::with_extras(extra_include, extra_exclude)?;
    select_files(root, &policy)
}

/// Root-relative form of `path`, prefixed with `./`.
pub fn display_path(path: &Path, root: &Path) -> String {
    match pathdiff::diff_paths(path, root) {
        Some(relative) if relative.is_relative() => {
            Path::new(".").join(relative).to_string_lossy().into_owned()
        }
        _ => path.to_string_lossy().into_owned(),
    }
}
