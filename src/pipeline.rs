use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::aggregate::build_bundle;
use crate::card;
use crate::error::{Diagnostics, ProcessError};
use crate::markdown;
use crate::observer::Observer;
use crate::reader::read_document;
use crate::types::{DocumentFailure, SeriesFile, YearBundle};
use crate::year::{YearExtractor, document_stem};

/// Result of processing a set of documents.
#[derive(Debug, Default)]
pub struct ProcessingRun {
    /// One bundle per year, ascending.
    pub bundles: Vec<YearBundle>,
    /// Filenames that received no year.
    pub unassigned: Vec<String>,
}

/// Documents grouped by resolved year, before any parsing.
#[derive(Debug, Default)]
pub struct YearPlan {
    pub years: BTreeMap<i32, Vec<PathBuf>>,
    pub unassigned: Vec<String>,
}

pub fn filename_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Parses one document's text into a SeriesFile. Never fails: recognition
/// misses end up in the file's diagnostics.
pub fn process_text(path: &Path, text: &str, year: i32) -> SeriesFile {
    let filename = filename_of(path);
    let document = markdown::parse(text);
    let series_name = document.series_name(document_stem(&filename));

    let mut diagnostics = Diagnostics::default();
    let mut events = card::segment(document.body_lines(), &mut diagnostics);
    for event in &mut events {
        event.series = series_name.clone();
        event.source = filename.clone();
    }
    if events.is_empty() {
        diagnostics.push(None, "no dated events recognized");
    }

    SeriesFile {
        path: path.to_path_buf(),
        filename,
        year,
        series_name,
        metadata: document.metadata,
        events,
        diagnostics,
    }
}

pub fn process_document(path: &Path, year: i32) -> Result<SeriesFile, ProcessError> {
    let text = read_document(path)?;
    Ok(process_text(path, &text, year))
}

/// Resolves a year for every path. Paths keep their input order within a year.
pub fn plan_years(
    paths: &[PathBuf],
    extractor: &YearExtractor,
    observer: &mut dyn Observer,
) -> YearPlan {
    let mut plan = YearPlan::default();
    for path in paths {
        let filename = filename_of(path);
        match extractor.resolve(&filename) {
            Some(resolved) => {
                observer.year_resolved(&filename, resolved);
                plan.years
                    .entry(resolved.year)
                    .or_default()
                    .push(path.clone());
            }
            None => {
                observer.document_skipped(&filename);
                plan.unassigned.push(filename);
            }
        }
    }
    plan
}

/// Parses every document of one year, then sorts and renders once all are in.
pub fn process_year(year: i32, paths: &[PathBuf], observer: &mut dyn Observer) -> YearBundle {
    let mut series_files = Vec::new();
    let mut failures = Vec::new();

    for path in paths {
        match process_document(path, year) {
            Ok(file) => {
                observer.document_parsed(&file);
                series_files.push(file);
            }
            Err(err) => {
                let failure = DocumentFailure {
                    path: path.clone(),
                    filename: filename_of(path),
                    reason: err.to_string(),
                };
                observer.document_failed(&failure);
                failures.push(failure);
            }
        }
    }

    let bundle = build_bundle(year, series_files, failures);
    observer.year_completed(&bundle);
    bundle
}

pub fn process_documents(
    paths: &[PathBuf],
    extractor: &YearExtractor,
    observer: &mut dyn Observer,
) -> ProcessingRun {
    let plan = plan_years(paths, extractor, observer);
    let bundles = plan
        .years
        .iter()
        .map(|(year, paths)| process_year(*year, paths, observer))
        .collect();

    ProcessingRun {
        bundles,
        unassigned: plan.unassigned,
    }
}
