use tracing::{debug, info, warn};

use crate::types::{DocumentFailure, SeriesFile, YearBundle};
use crate::year::{ResolvedYear, YearSource};

/// Progress callbacks from the processing pipeline.
pub trait Observer {
    fn year_resolved(&mut self, filename: &str, resolved: ResolvedYear);
    /// A document that received no year and is left out of every bundle.
    fn document_skipped(&mut self, filename: &str);
    fn document_parsed(&mut self, file: &SeriesFile);
    fn document_failed(&mut self, failure: &DocumentFailure);
    fn year_completed(&mut self, bundle: &YearBundle);
}

/// Forwards pipeline progress to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn year_resolved(&mut self, filename: &str, resolved: ResolvedYear) {
        match resolved.source {
            YearSource::Manual => info!(filename, year = resolved.year, "used manual year mapping"),
            YearSource::Pattern => debug!(filename, year = resolved.year, "parsed year from filename"),
        }
    }

    fn document_skipped(&mut self, filename: &str) {
        warn!(filename, "no year for document, skipping");
    }

    fn document_parsed(&mut self, file: &SeriesFile) {
        info!(
            filename = %file.filename,
            series = %file.series_name,
            events = file.events.len(),
            matches = file.match_count(),
            "parsed document"
        );
        for diagnostic in file.diagnostics.iter() {
            debug!(
                filename = %file.filename,
                line = diagnostic.line,
                "{}",
                diagnostic.message
            );
        }
    }

    fn document_failed(&mut self, failure: &DocumentFailure) {
        warn!(filename = %failure.filename, reason = %failure.reason, "document failed");
    }

    fn year_completed(&mut self, bundle: &YearBundle) {
        info!(
            year = bundle.year,
            series = bundle.series_files.len(),
            events = bundle.event_count(),
            failed = bundle.failures.len(),
            "year complete"
        );
    }
}

/// Discards every callback.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl Observer for NullObserver {
    fn year_resolved(&mut self, _: &str, _: ResolvedYear) {}
    fn document_skipped(&mut self, _: &str) {}
    fn document_parsed(&mut self, _: &SeriesFile) {}
    fn document_failed(&mut self, _: &DocumentFailure) {}
    fn year_completed(&mut self, _: &YearBundle) {}
}
