use crate::card::format_events;
use crate::types::{DocumentFailure, Event, SeriesFile, YearBundle};
use crate::year::document_stem;

pub const REPORT_TITLE: &str = "# Wrestling Results Processing Summary";

/// All events of `files`, stable-sorted by date. Undated events sort first.
pub fn chronological_events(files: &[SeriesFile]) -> Vec<&Event> {
    let mut events: Vec<&Event> = files.iter().flat_map(|file| file.events.iter()).collect();
    events.sort_by_key(|event| event.date);
    events
}

fn series_key(event: &Event) -> &str {
    if event.series.is_empty() {
        document_stem(&event.source)
    } else {
        &event.series
    }
}

/// Groups sorted events by series, in order of each series' first appearance.
pub fn group_by_series<'a>(events: &[&'a Event]) -> Vec<(&'a str, Vec<&'a Event>)> {
    let mut groups: Vec<(&'a str, Vec<&'a Event>)> = Vec::new();
    for &event in events {
        let key = series_key(event);
        match groups.iter_mut().find(|(series, _)| *series == key) {
            Some((_, members)) => members.push(event),
            None => groups.push((key, vec![event])),
        }
    }
    groups
}

pub fn render_year(year: i32, files: &[SeriesFile]) -> String {
    let mut lines = vec![
        format!("# {year} Season"),
        String::new(),
        format!("Combined wrestling results for {year}"),
        String::new(),
    ];

    let events = chronological_events(files);
    for (series, members) in group_by_series(&events) {
        lines.push(format!("## {series}"));
        lines.push(String::new());
        lines.extend(format_events(members));
        if lines.last().is_some_and(|line| !line.is_empty()) {
            lines.push(String::new());
        }
    }

    let mut rendered = lines.join("\n");
    rendered.truncate(rendered.trim_end().len());
    rendered.push('\n');
    rendered
}

/// Sorts contributing files by filename and renders the year document.
pub fn build_bundle(
    year: i32,
    mut series_files: Vec<SeriesFile>,
    failures: Vec<DocumentFailure>,
) -> YearBundle {
    series_files.sort_by(|left, right| left.filename.cmp(&right.filename));
    let rendered = render_year(year, &series_files);
    YearBundle {
        year,
        series_files,
        failures,
        rendered,
    }
}

/// Human-readable run summary in markdown.
pub fn render_report(bundles: &[YearBundle], unassigned: &[String]) -> String {
    let parsed: usize = bundles.iter().map(|bundle| bundle.series_files.len()).sum();
    let failed: usize = bundles.iter().map(|bundle| bundle.failures.len()).sum();

    let mut lines = vec![
        REPORT_TITLE.to_string(),
        String::new(),
        format!("**Total Years Processed:** {}", bundles.len()),
        format!("**Total Files Processed:** {parsed}"),
        format!("**Files Failed:** {failed}"),
        format!("**Files Without Year:** {}", unassigned.len()),
        String::new(),
    ];

    let mut ordered: Vec<&YearBundle> = bundles.iter().collect();
    ordered.sort_by_key(|bundle| bundle.year);

    for bundle in ordered {
        lines.push(format!("## {}", bundle.year));
        lines.push(String::new());
        if bundle.series_files.is_empty() {
            lines.push("**Output File:** none".to_string());
        } else {
            lines.push(format!("**Output File:** {}", bundle.output_filename()));
        }
        lines.push(format!("**Series Count:** {}", bundle.series_files.len()));
        lines.push(format!("**Event Count:** {}", bundle.event_count()));
        lines.push(String::new());

        for file in &bundle.series_files {
            let mut line = format!(
                "- **{}** ({}) - {} events, {} matches",
                file.series_name,
                file.filename,
                file.events.len(),
                file.match_count()
            );
            if !file.diagnostics.is_empty() {
                line.push_str(&format!(", {} diagnostics", file.diagnostics.len()));
            }
            lines.push(line);
        }
        for failure in &bundle.failures {
            lines.push(format!("- ({}) - failed: {}", failure.filename, failure.reason));
        }
        lines.push(String::new());
    }

    if !unassigned.is_empty() {
        lines.push("## Files Without Year".to_string());
        lines.push(String::new());
        lines.extend(unassigned.iter().map(|filename| format!("- {filename}")));
        lines.push(String::new());
    }

    lines.join("\n")
}
