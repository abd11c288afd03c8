use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::card::dates::{expand_two_digit_year, is_valid_year};
use crate::error::ProcessError;

static FOUR_DIGIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}").expect("valid four-digit year regex"));

static TRAILING_TWO_DIGIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{2}$").expect("valid trailing two-digit regex"));

static TWO_DIGIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{2}").expect("valid two-digit regex"));

const BUILTIN_MAPPINGS: [(&str, Option<i32>); 8] = [
    ("primera01.md", Some(2001)),
    ("navidad01.md", Some(2001)),
    ("pelea01.md", Some(2001)),
    ("muybien01.md", Some(2001)),
    ("elnumero01.md", Some(2001)),
    ("enuspecial01.md", Some(2001)),
    ("verano01.md", Some(2001)),
    ("noseporque.md", None),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearSource {
    Manual,
    Pattern,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedYear {
    pub year: i32,
    pub source: YearSource,
}

/// Strips `.zst` and then `.md` (case-insensitive) from a filename.
pub fn document_stem(filename: &str) -> &str {
    let mut stem = filename;
    for suffix in [".zst", ".md"] {
        let len = stem.len();
        if len >= suffix.len()
            && stem.is_char_boundary(len - suffix.len())
            && stem[len - suffix.len()..].eq_ignore_ascii_case(suffix)
        {
            stem = &stem[..len - suffix.len()];
        }
    }
    stem
}

fn mapping_key(filename: &str) -> String {
    format!("{}.md", document_stem(filename).to_lowercase())
}

/// Filename to calendar year, manual table first, then filename patterns.
#[derive(Debug, Clone, Default)]
pub struct YearExtractor {
    mappings: BTreeMap<String, Option<i32>>,
}

impl YearExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtin_mappings() -> Self {
        let mut extractor = Self::new();
        for (filename, year) in BUILTIN_MAPPINGS {
            extractor.add_mapping(filename, year);
        }
        extractor
    }

    /// `None` marks a filename that must never receive a year.
    pub fn add_mapping(&mut self, filename: &str, year: Option<i32>) {
        self.mappings.insert(mapping_key(filename), year);
    }

    /// Parses a `FILENAME=YEAR` pair.
    pub fn parse_mapping(pair: &str) -> Result<(String, i32), ProcessError> {
        let (filename, year) = pair
            .split_once('=')
            .ok_or_else(|| ProcessError::Mapping(pair.to_string()))?;
        let filename = filename.trim();
        let year: i32 = year
            .trim()
            .parse()
            .map_err(|_| ProcessError::Mapping(pair.to_string()))?;

        if filename.is_empty() || !is_valid_year(year) {
            return Err(ProcessError::Mapping(pair.to_string()));
        }
        Ok((filename.to_string(), year))
    }

    pub fn resolve(&self, filename: &str) -> Option<ResolvedYear> {
        if let Some(mapped) = self.mappings.get(&mapping_key(filename)) {
            return mapped.map(|year| ResolvedYear {
                year,
                source: YearSource::Manual,
            });
        }

        let stem = document_stem(filename).to_lowercase();
        let candidates = [
            FOUR_DIGIT_RE
                .find(&stem)
                .and_then(|found| found.as_str().parse::<i32>().ok()),
            TRAILING_TWO_DIGIT_RE
                .find(&stem)
                .and_then(|found| found.as_str().parse::<u32>().ok())
                .map(expand_two_digit_year),
            TWO_DIGIT_RE
                .find_iter(&stem)
                .last()
                .and_then(|found| found.as_str().parse::<u32>().ok())
                .map(expand_two_digit_year),
        ];

        candidates
            .into_iter()
            .flatten()
            .find(|year| is_valid_year(*year))
            .map(|year| ResolvedYear {
                year,
                source: YearSource::Pattern,
            })
    }
}
