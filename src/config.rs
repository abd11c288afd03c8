use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::ProcessError;
use crate::year::YearExtractor;

pub const DEFAULT_SUMMARY_FILE: &str = "processing_summary.md";

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub years: YearsConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct YearsConfig {
    pub builtin_mappings: bool,
    /// Filenames that must never receive a year.
    pub no_year: Vec<String>,
    pub mappings: BTreeMap<String, i32>,
}

impl Default for YearsConfig {
    fn default() -> Self {
        Self {
            builtin_mappings: true,
            no_year: Vec::new(),
            mappings: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputConfig {
    pub summary_file: String,
    pub json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            summary_file: DEFAULT_SUMMARY_FILE.to_string(),
            json: false,
        }
    }
}

impl Config {
    pub fn from_toml(path: &Path, content: &str) -> Result<Self, ProcessError> {
        toml::from_str(content).map_err(|source| ProcessError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ProcessError> {
        let content = std::fs::read_to_string(path).map_err(|source| ProcessError::Io {
            path: PathBuf::from(path),
            source,
        })?;
        Self::from_toml(path, &content)
    }

    /// Defaults when `path` is `None`; a missing file is an error.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ProcessError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn year_extractor(&self) -> YearExtractor {
        let mut extractor = if self.years.builtin_mappings {
            YearExtractor::with_builtin_mappings()
        } else {
            YearExtractor::new()
        };
        for filename in &self.years.no_year {
            extractor.add_mapping(filename, None);
        }
        for (filename, year) in &self.years.mappings {
            extractor.add_mapping(filename, Some(*year));
        }
        extractor
    }
}
