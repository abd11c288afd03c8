use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::{Diagnostics, ProcessError};
use crate::types::{Event, YearBundle};

#[derive(Serialize)]
struct YearRecord<'a> {
    year: i32,
    series: Vec<SeriesRecord<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    failures: Vec<FailureRecord<'a>>,
}

#[derive(Serialize)]
struct SeriesRecord<'a> {
    filename: &'a str,
    series_name: &'a str,
    #[serde(skip_serializing_if = "is_empty_map")]
    metadata: &'a BTreeMap<String, String>,
    events: &'a [Event],
    diagnostics: &'a Diagnostics,
}

#[derive(Serialize)]
struct FailureRecord<'a> {
    filename: &'a str,
    reason: &'a str,
}

fn is_empty_map(map: &&BTreeMap<String, String>) -> bool {
    map.is_empty()
}

/// Pretty-printed JSON record set for one year.
pub fn bundle_to_json(bundle: &YearBundle) -> Result<String, ProcessError> {
    let record = YearRecord {
        year: bundle.year,
        series: bundle
            .series_files
            .iter()
            .map(|file| SeriesRecord {
                filename: &file.filename,
                series_name: &file.series_name,
                metadata: &file.metadata,
                events: &file.events,
                diagnostics: &file.diagnostics,
            })
            .collect(),
        failures: bundle
            .failures
            .iter()
            .map(|failure| FailureRecord {
                filename: &failure.filename,
                reason: &failure.reason,
            })
            .collect(),
    };

    serde_json::to_string_pretty(&record).map_err(|source| ProcessError::Json {
        year: bundle.year,
        source,
    })
}

pub fn json_filename(year: i32) -> String {
    format!("{year}_season.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::build_bundle;
    use crate::pipeline::process_text;
    use serde_json::Value;
    use std::path::Path;

    #[test]
    fn test_json_shape() {
        let text = "\
November 25th, 2001 Shizuoka, Twin Messe Shizuoka - 1580 Attendance
① Singles Match
Alice vs Bob
(10:32 Pinfall)
";
        let file = process_text(Path::new("primera01.md"), text, 2001);
        let bundle = build_bundle(2001, vec![file], Vec::new());

        let value: Value = serde_json::from_str(&bundle_to_json(&bundle).unwrap()).unwrap();

        assert_eq!(value["year"], 2001);
        let series = &value["series"][0];
        assert_eq!(series["filename"], "primera01.md");
        assert_eq!(series["series_name"], "primera01");
        assert!(series.get("metadata").is_none());
        assert!(value.get("failures").is_none());

        let event = &series["events"][0];
        assert_eq!(event["date"], "2001-11-25");
        assert_eq!(event["city"], "Shizuoka");
        assert_eq!(event["attendance"], 1580);

        let bout = &event["matches"][0];
        assert_eq!(bout["number"], 1);
        assert_eq!(bout["participants"][1], "Bob");
        assert_eq!(bout["outcomes"]["Alice"], "winner");
        assert_eq!(bout["outcomes"]["Bob"], "loser");
        assert_eq!(bout["time"], "10:32");
    }

    #[test]
    fn test_json_filename() {
        assert_eq!(json_filename(2001), "2001_season.json");
    }
}
