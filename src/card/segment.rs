use regex::Regex;
use std::sync::LazyLock;

use super::dates::{self, most_confident};
use super::matches::{is_match_start, parse_match};
use crate::error::Diagnostics;
use crate::markdown::SourceLine;
use crate::types::{DateCandidate, Event};

static TRAILING_ATTENDANCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[\s\-–—,|(]*\b(\d{1,3}(?:,\d{3})+|\d+)\s*(?:attendance|attendees|spectators)\s*\)?\s*$")
        .expect("valid trailing attendance regex")
});

static LABELED_ATTENDANCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[\s\-–—,|(]*\battendance\s*[:\-]?\s*(\d{1,3}(?:,\d{3})+|\d+)\s*\)?")
        .expect("valid labeled attendance regex")
});

static ATTENDANCE_KEYWORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\battendance\b").expect("valid attendance keyword regex"));

static ATTENDANCE_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^attendance\s*[:\-]?\s*(\d{1,3}(?:,\d{3})+|\d+)$")
        .expect("valid attendance line regex")
});

static DIVIDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:—{2,}|–{2,}|-{3,}|\*{3,}|_{3,}|={3,})$").expect("valid divider regex")
});

fn parse_attendance(digits: &str) -> Option<u32> {
    digits.replace(',', "").parse().ok()
}

fn trim_separators(text: &str) -> &str {
    text.trim_matches(|c: char| {
        c.is_whitespace() || matches!(c, '-' | '–' | '—' | ',' | '|' | '*' | ':' | ';')
    })
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits on the first comma into `(city, venue)`; no comma means venue only.
pub fn split_location(text: &str) -> (Option<String>, String) {
    let text = trim_separators(text);
    match text.split_once(',') {
        Some((city, venue)) => {
            let city = trim_separators(city);
            let venue = trim_separators(venue);
            match (city.is_empty(), venue.is_empty()) {
                (false, false) => (Some(collapse_whitespace(city)), collapse_whitespace(venue)),
                (true, _) => (None, collapse_whitespace(venue)),
                (false, true) => (None, collapse_whitespace(city)),
            }
        }
        None => (None, collapse_whitespace(text)),
    }
}

/// Removes an attendance figure (or a bare "attendance" keyword) from `text`.
fn take_attendance(text: &str) -> (String, Option<u32>) {
    for regex in [&*TRAILING_ATTENDANCE_RE, &*LABELED_ATTENDANCE_RE] {
        if let Some(caps) = regex.captures(text) {
            let (Some(whole), Some(digits)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let attendance = parse_attendance(digits.as_str());
            let mut rest = String::with_capacity(text.len());
            rest.push_str(&text[..whole.start()]);
            rest.push(' ');
            rest.push_str(&text[whole.end()..]);
            return (rest, attendance);
        }
    }

    (
        ATTENDANCE_KEYWORD_RE.replace_all(text, " ").into_owned(),
        None,
    )
}

/// Builds an Event from a date line: the date substring and any attendance
/// figure are removed, the remainder becomes city and venue.
pub fn event_from_date_line(text: &str, candidate: &DateCandidate) -> Event {
    let mut remainder = text.to_string();
    let end = candidate.offset + candidate.original_text.len();
    if text.get(candidate.offset..end) == Some(candidate.original_text.as_str()) {
        remainder.replace_range(candidate.offset..end, " ");
    } else {
        remainder = remainder.replacen(&candidate.original_text, " ", 1);
    }

    let (remainder, attendance) = take_attendance(&remainder);
    let (city, venue) = split_location(&remainder);

    let mut event = Event::new(Some(candidate.date), candidate.line);
    event.city = city;
    event.venue = venue;
    event.attendance = attendance;
    event
}

/// Event for a line that carries a recognizable date, if any.
pub fn parse_event_header(text: &str, line: Option<usize>) -> Option<Event> {
    let candidates = dates::recognize(text, line);
    most_confident(&candidates).map(|candidate| event_from_date_line(text, candidate))
}

pub fn is_divider(text: &str) -> bool {
    DIVIDER_RE.is_match(text.trim())
}

struct Segmenter<'d> {
    events: Vec<Event>,
    current: Option<Event>,
    /// Lines of the open match block with their source line numbers.
    block: Vec<(usize, String)>,
    in_card: bool,
    diagnostics: &'d mut Diagnostics,
}

impl<'d> Segmenter<'d> {
    fn new(diagnostics: &'d mut Diagnostics) -> Self {
        Self {
            events: Vec::new(),
            current: None,
            block: Vec::new(),
            in_card: false,
            diagnostics,
        }
    }

    fn flush_block(&mut self) {
        if self.block.is_empty() {
            return;
        }
        let block = std::mem::take(&mut self.block);
        let Some(event) = self.current.as_mut() else {
            return;
        };

        let number = event.matches.len() as u32 + 1;
        let texts: Vec<&str> = block.iter().map(|(_, text)| text.as_str()).collect();
        match parse_match(&texts, number) {
            Some(parsed) => event.matches.push(parsed),
            None => {
                let (line, text) = &block[0];
                self.diagnostics.push(
                    Some(*line),
                    format!("dropped match block without participants: {text}"),
                );
            }
        }
    }

    fn flush_event(&mut self) {
        self.flush_block();
        if let Some(event) = self.current.take() {
            self.events.push(event);
        }
        self.in_card = false;
    }

    fn continue_header(&mut self, text: &str) {
        let Some(event) = self.current.as_mut() else {
            return;
        };

        if let Some(caps) = ATTENDANCE_LINE_RE.captures(text) {
            if event.attendance.is_none() {
                event.attendance = caps.get(1).and_then(|digits| parse_attendance(digits.as_str()));
            }
        } else if event.venue.is_empty() {
            let (city, venue) = split_location(text);
            event.city = city;
            event.venue = venue;
        }
    }

    fn feed(&mut self, line: &SourceLine) {
        let text = line.text.trim();

        if let Some(event) = parse_event_header(text, Some(line.number)) {
            self.flush_event();
            self.current = Some(event);
            return;
        }

        if self.current.is_none() {
            return;
        }

        if is_divider(text) {
            self.flush_block();
        } else if is_match_start(text) {
            self.flush_block();
            self.block.push((line.number, text.to_string()));
            self.in_card = true;
        } else if !self.block.is_empty() {
            self.block.push((line.number, text.to_string()));
        } else if !self.in_card {
            self.continue_header(text);
        }
    }

    fn finish(mut self) -> Vec<Event> {
        self.flush_event();
        self.events
    }
}

/// Partitions the body lines of one document into Events.
///
/// A line with a valid date opens a new Event. Lines before the first one are
/// ignored. Match blocks that yield no participants are dropped and recorded
/// in `diagnostics`.
pub fn segment<'a>(
    lines: impl IntoIterator<Item = &'a SourceLine>,
    diagnostics: &mut Diagnostics,
) -> Vec<Event> {
    let mut segmenter = Segmenter::new(diagnostics);
    for line in lines {
        segmenter.feed(line);
    }
    segmenter.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown;
    use crate::types::Outcome;
    use chrono::NaiveDate;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn segment_text(text: &str) -> (Vec<Event>, Diagnostics) {
        let document = markdown::parse(text);
        let mut diagnostics = Diagnostics::default();
        let events = segment(document.body_lines(), &mut diagnostics);
        (events, diagnostics)
    }

    #[test]
    fn test_header_with_city_venue_and_trailing_attendance() {
        let event = parse_event_header(
            "November 25th, 2001 Shizuoka, Twin Messe Shizuoka - 1580 Attendance",
            Some(1),
        )
        .unwrap();

        assert_eq!(event.date, Some(ymd(2001, 11, 25)));
        assert_eq!(event.city.as_deref(), Some("Shizuoka"));
        assert_eq!(event.venue, "Twin Messe Shizuoka");
        assert_eq!(event.attendance, Some(1580));
        assert_eq!(event.line, Some(1));
    }

    #[test]
    fn test_header_without_comma_is_venue_only() {
        let event =
            parse_event_header("4/26/2001 Gifu Industrial Hall 1050 Attendance", None).unwrap();

        assert_eq!(event.date, Some(ymd(2001, 4, 26)));
        assert_eq!(event.venue, "Gifu Industrial Hall");
        assert_eq!(event.attendance, Some(1050));
        assert_eq!(event.city, None);
    }

    #[test]
    fn test_header_attendance_variants() {
        let event =
            parse_event_header("2001-05-12 Tokyo, Korakuen Hall (Attendance: 2,100)", None).unwrap();
        assert_eq!(event.attendance, Some(2100));
        assert_eq!(event.city.as_deref(), Some("Tokyo"));
        assert_eq!(event.venue, "Korakuen Hall");

        let event = parse_event_header("May 3rd, 2001 Osaka Prefectural Gym - attendance", None)
            .unwrap();
        assert_eq!(event.attendance, None);
        assert_eq!(event.city, None);
        assert_eq!(event.venue, "Osaka Prefectural Gym");

        assert!(parse_event_header("Alice vs Bob", None).is_none());
    }

    #[test]
    fn test_header_parenthesized_trailing_attendance() {
        let event =
            parse_event_header("4/26/2001 Gifu Industrial Hall (1,050 attendance)", None).unwrap();
        assert_eq!(event.attendance, Some(1050));
        assert_eq!(event.city, None);
        assert_eq!(event.venue, "Gifu Industrial Hall");

        let event = parse_event_header("2001-05-12 Tokyo, Korakuen Hall (2100 Spectators) ", None)
            .unwrap();
        assert_eq!(event.attendance, Some(2100));
        assert_eq!(event.city.as_deref(), Some("Tokyo"));
        assert_eq!(event.venue, "Korakuen Hall");
    }

    #[test]
    fn test_events_and_matches_in_card_order() {
        let text = "\
Intro text before any date
November 25th, 2001 Shizuoka, Twin Messe Shizuoka - 1580 Attendance
① Singles Match
Alice vs Bob
(10:32 Pinfall)
② Tag Team Match
Carol & Dan vs Erin & Frank
(12:00 Lariat)
4/26/2001 Gifu Industrial Hall 1050 Attendance
① Alice vs Carol
";
        let (events, diagnostics) = segment_text(text);

        assert!(diagnostics.is_empty());
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].matches.len(), 2);
        assert_eq!(events[0].matches[0].number, 1);
        assert_eq!(events[0].matches[1].number, 2);
        assert_eq!(events[0].matches[1].match_type, "Tag Team Match");
        assert_eq!(events[0].line, Some(2));
        assert_eq!(events[1].date, Some(ymd(2001, 4, 26)));
        assert_eq!(events[1].matches[0].outcome_of("Alice"), Some(Outcome::Winner));
    }

    #[test]
    fn test_dropped_block_does_not_advance_numbering() {
        let text = "\
2001-05-12 Korakuen Hall
① Singles Match
(10:00 Pinfall)
② Singles Match
Alice vs Bob
";
        let (events, diagnostics) = segment_text(text);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].matches.len(), 1);
        assert_eq!(events[0].matches[0].number, 1);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics.iter().next().unwrap().line, Some(2));
    }

    #[test]
    fn test_continuation_lines_fill_header() {
        let text = "\
November 25th, 2001
Shizuoka, Twin Messe Shizuoka
Attendance: 1580
① Singles Match
Alice⭕️
vs
Bob❌
(10:32 Pinfall)
";
        let (events, _) = segment_text(text);
        let event = &events[0];

        assert_eq!(event.city.as_deref(), Some("Shizuoka"));
        assert_eq!(event.venue, "Twin Messe Shizuoka");
        assert_eq!(event.attendance, Some(1580));
        assert_eq!(event.matches[0].participants.as_slice(), ["Alice", "Bob"]);
    }

    #[test]
    fn test_divider_closes_block() {
        let text = "\
2001-05-12 Korakuen Hall
① Singles Match
Alice vs Bob
——
Stray commentary after the card
";
        let (events, _) = segment_text(text);

        assert_eq!(events[0].matches.len(), 1);
        assert_eq!(events[0].matches[0].participants.len(), 2);
        assert!(is_divider("———"));
        assert!(is_divider("***"));
        assert!(!is_divider("--"));
    }

    #[test]
    fn test_event_without_matches_is_kept() {
        let (events, _) = segment_text("3/10/2001 Sapporo, Nakajima Center\n");
        assert_eq!(events.len(), 1);
        assert!(events[0].matches.is_empty());
    }

    #[test]
    fn test_split_location() {
        assert_eq!(
            split_location(" Tokyo, Korakuen Hall "),
            (Some("Tokyo".to_string()), "Korakuen Hall".to_string())
        );
        assert_eq!(split_location("Korakuen Hall"), (None, "Korakuen Hall".to_string()));
        assert_eq!(split_location("Tokyo,"), (None, "Tokyo".to_string()));
        assert_eq!(split_location(""), (None, String::new()));
    }
}
