use crate::error::{AppError, Result};
use crate::output_formats::default_patterns;
use log;
use regex::{Regex, RegexBuilder};
use std::fmt;

/// A case-insensitive regular expression anchored at the start of a path.
///
/// The pattern does not need to consume the whole path: `.*\.py` accepts
/// `/src/app.py` and also `/src/app.pyc`.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self> {
        let regex = RegexBuilder::new(source)
            .case_insensitive(true)
            .build()
            .map_err(|e| AppError::PatternCompile {
                pattern: source.to_string(),
                source: e,
            })?;
        Ok(Self { regex })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn matches(&self, path: &str) -> bool {
        // Leftmost semantics: if any match starts at 0, the first one found does.
        self.regex.find(path).is_some_and(|m| m.start() == 0)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered patterns combined with logical OR.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
}

impl PatternSet {
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.iter()
    }

    pub fn sources(&self) -> Vec<String> {
        self.patterns.iter().map(|p| p.as_str().to_string()).collect()
    }

    /// Appends `other` after the existing patterns.
    pub fn extend(&mut self, other: PatternSet) {
        self.patterns.extend(other.patterns);
    }

    pub fn first_match(&self, path: &str) -> Option<&Pattern> {
        self.patterns.iter().find(|p| p.matches(path))
    }

    pub fn any_match(&self, path: &str) -> bool {
        self.first_match(path).is_some()
    }
}

/// Compiles every pattern in input order, failing on the first invalid one.
pub fn compile_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<PatternSet> {
    let mut compiled = Vec::with_capacity(patterns.len());
    for raw in patterns {
        let raw = raw.as_ref();
        match Pattern::new(raw) {
            Ok(pattern) => {
                log::trace!("Compiled pattern: {}", raw);
                compiled.push(pattern);
            }
            Err(e) => {
                log::error!("Invalid pattern \"{}\"", raw);
                return Err(e);
            }
        }
    }
    Ok(PatternSet { patterns: compiled })
}

pub fn default_include_set() -> Result<PatternSet> {
    compile_patterns(&default_patterns().include)
}

pub fn default_exclude_set() -> Result<PatternSet> {
    compile_patterns(&default_patterns().exclude)
}
