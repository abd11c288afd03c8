use chrono::NaiveDate;
use serde::Serialize;
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::Diagnostics;

/// Participant names in card order, duplicates removed.
pub type Participants = SmallVec<[String; 8]>;

/// Pattern family a date was recognized by. Each family carries a fixed
/// confidence weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFamily {
    /// `November 25th, 2001`
    MonthFull,
    /// `2001-11-25`
    YmdDash,
    /// `Nov 25, 2001`
    MonthAbbrev,
    /// `11/25/2001`
    MdySlash,
    /// `11-25-2001`, `11.25.2001`
    MdyDashOrDot,
    /// `11/25/01`, `11-25-01`
    MdyShortYear,
}

impl DateFamily {
    pub const fn confidence(self) -> f64 {
        match self {
            Self::MonthFull => 0.95,
            Self::YmdDash => 0.90,
            Self::MonthAbbrev => 0.90,
            Self::MdySlash => 0.85,
            Self::MdyDashOrDot => 0.80,
            Self::MdyShortYear => 0.60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateCandidate {
    pub date: NaiveDate,
    /// Exact substring of the source line the date was parsed from.
    pub original_text: String,
    pub confidence: f64,
    pub family: DateFamily,
    /// Byte offset of `original_text` within the scanned line.
    pub offset: usize,
    pub line: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Winner,
    Loser,
    Draw,
    NoContest,
}

impl Outcome {
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::Winner => "⭕️",
            Self::Loser => "❌",
            Self::Draw => "△",
            Self::NoContest => "▲",
        }
    }
}

/// One bout within an event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    /// Card position, 1-based.
    pub number: u32,
    pub match_type: String,
    pub participants: Participants,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish: Option<String>,
    /// Unannotated participants have no entry.
    pub outcomes: BTreeMap<String, Outcome>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl Match {
    pub fn outcome_of(&self, participant: &str) -> Option<Outcome> {
        self.outcomes.get(participant).copied()
    }
}

/// One wrestling show. Matches are in card order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub date: Option<NaiveDate>,
    pub venue: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendance: Option<u32>,
    pub matches: Vec<Match>,
    /// Series display name of the originating document.
    pub series: String,
    /// Filename of the originating document.
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl Event {
    pub fn new(date: Option<NaiveDate>, line: Option<usize>) -> Self {
        Self {
            date,
            venue: String::new(),
            city: None,
            attendance: None,
            matches: Vec::new(),
            series: String::new(),
            source: String::new(),
            line,
        }
    }
}

/// One parsed input document and the events it yielded.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesFile {
    pub path: PathBuf,
    pub filename: String,
    pub year: i32,
    pub series_name: String,
    pub metadata: BTreeMap<String, String>,
    pub events: Vec<Event>,
    pub diagnostics: Diagnostics,
}

impl SeriesFile {
    pub fn match_count(&self) -> usize {
        self.events.iter().map(|event| event.matches.len()).sum()
    }
}

/// A document that could not be read or parsed.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentFailure {
    pub path: PathBuf,
    pub filename: String,
    pub reason: String,
}

/// Rendered output for one calendar year.
#[derive(Debug, Clone, Serialize)]
pub struct YearBundle {
    pub year: i32,
    /// Filename sort order.
    pub series_files: Vec<SeriesFile>,
    pub failures: Vec<DocumentFailure>,
    #[serde(skip)]
    pub rendered: String,
}

impl YearBundle {
    pub fn output_filename(&self) -> String {
        format!("{}_season.md", self.year)
    }

    pub fn event_count(&self) -> usize {
        self.series_files.iter().map(|file| file.events.len()).sum()
    }
}
