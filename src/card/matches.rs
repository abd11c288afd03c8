use regex::{Captures, Regex};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;
use std::sync::LazyLock;
use tracing::debug;

use super::resolve;
use crate::types::{Match, Outcome, Participants};

/// Leading card-position marker: circled number, `3.`, `3)`, `#3`, `3rd Match:`.
static POSITION_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:[\x{2460}-\x{2473}\x{24EA}]|\d{1,2}(?:st|nd|rd|th)\s+match\b\s*[:.\-]?|\d{1,2}\s*[.)]|#\d{1,2}\b)\s*",
    )
    .expect("valid position marker regex")
});

/// Elimination falls (❶..❿) and championship notes (⭐︎, ★, ☆).
static NOTE_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[\x{2776}-\x{277F}\x{2B50}\x{2605}\x{2606}]").expect("valid note line regex")
});

static TRAILING_PAREN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([^()]*)\)\s*$").expect("valid trailing paren regex"));

static SCORE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*\(\s*\d+\s*-\s*\d+\s*\)\s+(\S)").expect("valid inline score regex")
});

static CHAMPION_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*\((?:c|champion|challenger)\)").expect("valid champion tag regex")
});

static VS_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:vs\.?|versus)$").expect("valid vs line regex"));

static VS_EDGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:vs\.?|versus)\s+|\s+(?:vs\.?|versus)\s*$").expect("valid vs edge regex")
});

static VS_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+(?:vs\.?|versus)\s+").expect("valid vs split regex"));

static NAME_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*[&,]\s*|\s+and\s+").expect("valid name split regex"));

static BRACKET_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*\[\s*([WL])\s*\]\s*$").expect("valid bracket marker regex")
});

static GLYPH_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*(\x{2B55}|\x{274C}|\x{25B3}|\x{25B2})\x{FE0F}?\s*$")
        .expect("valid glyph marker regex")
});

static RESULT_ONLY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:no\s+contest|time\s+limit\s+draw|double\s+count\s*out|double\s+pinfall|double\s+disqualification|disqualification|count\s*out|submission|pinfall|draw)$",
    )
    .expect("valid result-only regex")
});

static LABEL_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bmatch$").expect("valid label suffix regex"));

static CAPITALIZED_RUN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\p{Lu}[\p{L}\p{N}'.\-]*(?:\s+\p{Lu}[\p{L}\p{N}'.\-]*)*")
        .expect("valid capitalized run regex")
});

enum Label {
    Fixed(&'static str),
    /// Expanded with the phrase's capture groups.
    Template(&'static str),
}

struct MatchTypePhrase {
    regex: Regex,
    label: Label,
}

impl MatchTypePhrase {
    fn new(pattern: &str, label: Label) -> Self {
        Self {
            regex: Regex::new(pattern).expect("valid match type regex"),
            label,
        }
    }

    fn render(&self, caps: &Captures<'_>) -> String {
        match self.label {
            Label::Fixed(label) => label.to_string(),
            Label::Template(template) => {
                let mut label = String::new();
                caps.expand(template, &mut label);
                label
            }
        }
    }
}

// First hit wins, so the more specific phrases come first.
static MATCH_TYPE_PHRASES: LazyLock<Vec<MatchTypePhrase>> = LazyLock::new(|| {
    vec![
        MatchTypePhrase::new(r"(?i)\bsingles?\s+match\b", Label::Fixed("Singles Match")),
        MatchTypePhrase::new(
            r"(?i)\b(\d{1,2})[\s-]*man\s+tag(?:\s+team)?(?:\s+match)?\b",
            Label::Template("${1}-Man Tag Match"),
        ),
        MatchTypePhrase::new(r"(?i)\btag\s+team\s+match\b", Label::Fixed("Tag Team Match")),
        MatchTypePhrase::new(r"(?i)\btag\s+match\b", Label::Fixed("Tag Team Match")),
        MatchTypePhrase::new(r"(?i)\bbattle\s+royale?\b", Label::Fixed("Battle Royal")),
        MatchTypePhrase::new(
            r"(?i)\b(?:championship|title)\s+match\b",
            Label::Fixed("Championship Match"),
        ),
        MatchTypePhrase::new(
            r"(?i)\belimination\s+match\b",
            Label::Fixed("Elimination Match"),
        ),
        MatchTypePhrase::new(r"(?i)\bhardcore\s+match\b", Label::Fixed("Hardcore Match")),
        MatchTypePhrase::new(r"(?i)\bladder\s+match\b", Label::Fixed("Ladder Match")),
        MatchTypePhrase::new(
            r"(?i)\bsteel\s+cage\s+match\b",
            Label::Fixed("Steel Cage Match"),
        ),
        MatchTypePhrase::new(r"(?i)\bcage\s+match\b", Label::Fixed("Cage Match")),
        MatchTypePhrase::new(r"(?i)\bhandicap\s+match\b", Label::Fixed("Handicap Match")),
        MatchTypePhrase::new(
            r"(?i)\b(?:three|3)[\s-]*way(?:\s+match)?\b",
            Label::Fixed("Three Way Match"),
        ),
        MatchTypePhrase::new(
            r"(?i)\b(?:four|4)[\s-]*way(?:\s+match)?\b",
            Label::Fixed("Four Way Match"),
        ),
        MatchTypePhrase::new(r"(?i)\bstreet\s+fight(?:\s+match)?\b", Label::Fixed("Street Fight")),
    ]
});

/// Label and byte span of the first match-type phrase found in `text`.
pub fn classify_phrase(text: &str) -> Option<(String, Range<usize>)> {
    MATCH_TYPE_PHRASES.iter().find_map(|phrase| {
        let caps = phrase.regex.captures(text)?;
        let span = caps.get(0)?.range();
        Some((phrase.render(&caps), span))
    })
}

pub fn has_position_marker(text: &str) -> bool {
    POSITION_MARKER_RE.is_match(text)
}

/// True when `text` opens a new match block.
pub fn is_match_start(text: &str) -> bool {
    has_position_marker(text) || classify_phrase(text).is_some()
}

pub fn strip_position_marker(text: &str) -> &str {
    match POSITION_MARKER_RE.find(text) {
        Some(found) => &text[found.end()..],
        None => text,
    }
}

/// Label used when no phrase names the match type.
pub fn label_for_count(count: usize) -> String {
    match count {
        0..=2 => "Singles Match".to_string(),
        3..=4 => "Tag Team Match".to_string(),
        5..=8 => format!("{count}-Man Tag Match"),
        _ => "Battle Royal".to_string(),
    }
}

/// Distinct capitalized word runs across the participant names.
pub fn count_participant_tokens(names: &[String]) -> usize {
    let runs: BTreeSet<&str> = names
        .iter()
        .flat_map(|name| CAPITALIZED_RUN_RE.find_iter(name))
        .map(|found| found.as_str())
        .collect();
    runs.len()
}

/// Splits a trailing `(...)` off `line` into elapsed time and finish.
///
/// A first token containing `:` is the time; anything after it is the finish.
/// Otherwise the whole segment is the finish.
fn take_metadata(line: &mut String) -> (Option<String>, Option<String>) {
    let Some(caps) = TRAILING_PAREN_RE.captures(line) else {
        return (None, None);
    };
    let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
        return (None, None);
    };

    let inner = inner.as_str().trim().to_string();
    let start = whole.start();
    line.truncate(start);
    let trimmed_len = line.trim_end().len();
    line.truncate(trimmed_len);

    if inner.is_empty() {
        return (None, None);
    }

    let (first, rest) = match inner.split_once(char::is_whitespace) {
        Some((first, rest)) => (first, rest.trim()),
        None => (inner.as_str(), ""),
    };

    if first.contains(':') {
        let finish = if rest.is_empty() {
            None
        } else {
            Some(rest.to_string())
        };
        (Some(first.to_string()), finish)
    } else {
        (None, Some(inner.clone()))
    }
}

fn normalize_line(line: &str) -> String {
    let line = SCORE_RE.replace_all(line, " vs $1");
    let line = CHAMPION_TAG_RE.replace_all(&line, "");
    line.trim().to_string()
}

fn split_marker(piece: &str) -> (String, Option<Outcome>) {
    let mut name = piece.trim().to_string();
    let mut marker = None;

    if let Some(caps) = GLYPH_MARKER_RE.captures(&name) {
        marker = match caps.get(1).map(|glyph| glyph.as_str()) {
            Some("\u{2B55}") => Some(Outcome::Winner),
            Some("\u{274C}") => Some(Outcome::Loser),
            Some("\u{25B3}") => Some(Outcome::Draw),
            Some("\u{25B2}") => Some(Outcome::NoContest),
            _ => None,
        };
        if let Some(whole) = caps.get(0) {
            name.truncate(whole.start());
        }
    }

    if let Some(caps) = BRACKET_MARKER_RE.captures(&name) {
        let tagged = caps.get(1).map(|tag| tag.as_str().eq_ignore_ascii_case("w"));
        marker = marker.or(match tagged {
            Some(true) => Some(Outcome::Winner),
            Some(false) => Some(Outcome::Loser),
            None => None,
        });
        if let Some(whole) = caps.get(0) {
            name.truncate(whole.start());
        }
    }

    let name = name
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, ':' | ';' | '-' | '–' | '—'))
        .to_string();
    (name, marker)
}

/// Participant names in first-seen order, plus any per-name markers.
pub fn extract_participants(lines: &[String]) -> (Participants, BTreeMap<String, Outcome>) {
    let mut participants = Participants::new();
    let mut markers = BTreeMap::new();

    for line in lines {
        let line = line.trim();
        if line.is_empty() || VS_LINE_RE.is_match(line) {
            continue;
        }

        let line = VS_EDGE_RE.replace_all(line, "");
        for side in VS_SPLIT_RE.split(&line) {
            for piece in NAME_SPLIT_RE.split(side) {
                let (name, marker) = split_marker(piece);
                if name.is_empty() || RESULT_ONLY_RE.is_match(&name) {
                    continue;
                }

                if let Some(marker) = marker {
                    markers.entry(name.clone()).or_insert(marker);
                }
                if !participants.contains(&name) {
                    participants.push(name);
                }
            }
        }
    }

    (participants, markers)
}

/// Parses one match block: the match-start line followed by its body lines.
///
/// Returns `None` when no participants can be extracted.
pub fn parse_match<S: AsRef<str>>(block: &[S], number: u32) -> Option<Match> {
    let (first, rest) = block.split_first()?;

    let mut header = normalize_line(strip_position_marker(first.as_ref()));
    let mut lines: Vec<String> = Vec::new();
    let mut notes: Vec<String> = Vec::new();
    for line in rest {
        let line = line.as_ref().trim();
        if line.is_empty() {
            continue;
        }
        if NOTE_LINE_RE.is_match(line) {
            notes.push(line.to_string());
        } else {
            lines.push(normalize_line(line));
        }
    }

    let (time, finish) = match lines.last_mut() {
        Some(last) => {
            let metadata = take_metadata(last);
            if last.is_empty() {
                lines.pop();
            }
            metadata
        }
        None => take_metadata(&mut header),
    };

    let mut label = None;
    let mut remainder = header.clone();
    if let Some((phrase_label, span)) = classify_phrase(&header) {
        label = Some(phrase_label);
        remainder = format!("{} {}", &header[..span.start], &header[span.end..]);
    }
    let remainder = remainder
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, ':' | '-' | '–' | '—'))
        .to_string();

    if label.is_none() && LABEL_SUFFIX_RE.is_match(&remainder) && !VS_SPLIT_RE.is_match(&remainder)
    {
        label = Some(remainder.clone());
    } else if !remainder.is_empty()
        && !RESULT_ONLY_RE.is_match(&remainder)
        && (label.is_none() || lines.is_empty())
    {
        lines.insert(0, remainder);
    }

    let (participants, markers) = extract_participants(&lines);
    if participants.is_empty() {
        return None;
    }

    let match_type =
        label.unwrap_or_else(|| label_for_count(count_participant_tokens(&participants)));

    let raw_text = block
        .iter()
        .map(|line| line.as_ref())
        .collect::<Vec<_>>()
        .join("\n");
    let resolution = resolve::resolve(&raw_text, &participants, &markers);
    debug!(
        number,
        tier = ?resolution.tier,
        participants = participants.len(),
        "resolved match outcomes"
    );

    Some(Match {
        number,
        match_type,
        participants,
        time,
        finish,
        outcomes: resolution.outcomes,
        notes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(match_: &Match) -> Vec<&str> {
        match_.participants.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_singles_with_time_and_finish() {
        let block = ["① Singles Match", "Alice vs Bob", "(10:32 Pinfall)"];
        let parsed = parse_match(&block, 1).unwrap();

        assert_eq!(parsed.number, 1);
        assert_eq!(parsed.match_type, "Singles Match");
        assert_eq!(names(&parsed), ["Alice", "Bob"]);
        assert_eq!(parsed.time.as_deref(), Some("10:32"));
        assert_eq!(parsed.finish.as_deref(), Some("Pinfall"));
        assert_eq!(parsed.outcome_of("Alice"), Some(Outcome::Winner));
        assert_eq!(parsed.outcome_of("Bob"), Some(Outcome::Loser));
    }

    #[test]
    fn test_numeric_man_tag_template() {
        let (label, span) = classify_phrase("⑤ 8-man tag match").unwrap();
        assert_eq!(label, "8-Man Tag Match");
        assert_eq!(&"⑤ 8-man tag match"[span], "8-man tag match");

        let (label, _) = classify_phrase("6 Man Tag Team Match").unwrap();
        assert_eq!(label, "6-Man Tag Match");
    }

    #[test]
    fn test_phrase_table_order() {
        assert_eq!(classify_phrase("Steel Cage Match").unwrap().0, "Steel Cage Match");
        assert_eq!(classify_phrase("Cage Match").unwrap().0, "Cage Match");
        assert_eq!(classify_phrase("Battle Royale").unwrap().0, "Battle Royal");
        assert_eq!(classify_phrase("IWGP Title Match").unwrap().0, "Championship Match");
        assert!(classify_phrase("Alice vs Bob").is_none());
    }

    #[test]
    fn test_match_start_recognition() {
        assert!(is_match_start("① Singles Match"));
        assert!(is_match_start("⑫ Alice vs Bob"));
        assert!(is_match_start("3. Alice vs Bob"));
        assert!(is_match_start("4) Alice vs Bob"));
        assert!(is_match_start("#2 Alice vs Bob"));
        assert!(is_match_start("Tag Team Match"));
        assert!(is_match_start("BATTLE ROYAL"));
        assert!(!is_match_start("Alice vs Bob"));
        assert!(!is_match_start("(10:32 Pinfall)"));
        assert!(!is_match_start("vs"));
    }

    #[test]
    fn test_count_fallback_labels() {
        assert_eq!(label_for_count(1), "Singles Match");
        assert_eq!(label_for_count(2), "Singles Match");
        assert_eq!(label_for_count(4), "Tag Team Match");
        assert_eq!(label_for_count(6), "6-Man Tag Match");
        assert_eq!(label_for_count(8), "8-Man Tag Match");
        assert_eq!(label_for_count(9), "Battle Royal");

        let parsed = parse_match(&["③ Alice & Bob & Carol vs Dan & Erin & Frank"], 3).unwrap();
        assert_eq!(parsed.match_type, "6-Man Tag Match");

        let parsed = parse_match(&["② Alice & Bob vs Carol & Dan (12:00 Lariat)"], 2).unwrap();
        assert_eq!(parsed.match_type, "Tag Team Match");
        assert_eq!(parsed.time.as_deref(), Some("12:00"));
        assert_eq!(parsed.finish.as_deref(), Some("Lariat"));
    }

    #[test]
    fn test_capitalized_runs_are_distinct() {
        let runs = vec![
            "Dragon Kid".to_string(),
            "BxB Hulk".to_string(),
            "Dragon Kid".to_string(),
        ];
        assert_eq!(count_participant_tokens(&runs), 2);
    }

    #[test]
    fn test_metadata_without_colon_is_finish() {
        let parsed = parse_match(&["① Singles Match", "Alice vs Bob", "(Countout)"], 1).unwrap();
        assert_eq!(parsed.time, None);
        assert_eq!(parsed.finish.as_deref(), Some("Countout"));

        let parsed = parse_match(&["① Singles Match", "Alice vs Bob (7:01)"], 1).unwrap();
        assert_eq!(parsed.time.as_deref(), Some("7:01"));
        assert_eq!(parsed.finish, None);
    }

    #[test]
    fn test_bracket_markers_are_explicit() {
        let block = ["② Tag Team Match", "Alice & Bob [L] vs Carol [W] & Dan"];
        let parsed = parse_match(&block, 2).unwrap();

        assert_eq!(names(&parsed), ["Alice", "Bob", "Carol", "Dan"]);
        assert_eq!(parsed.outcome_of("Carol"), Some(Outcome::Winner));
        assert_eq!(parsed.outcome_of("Bob"), Some(Outcome::Loser));
        assert_eq!(parsed.outcome_of("Alice"), None);
        assert_eq!(parsed.outcome_of("Dan"), None);
    }

    #[test]
    fn test_canonical_shape_reparses() {
        let block = [
            "① Tag Team Match",
            "Dragon Kid⭕️",
            "Genki Horiguchi",
            "vs",
            "Darkness Dragon",
            "Yasushi Kanda❌",
            "(16:45 Ultra Hurricanrana)",
        ];
        let parsed = parse_match(&block, 1).unwrap();

        assert_eq!(
            names(&parsed),
            ["Dragon Kid", "Genki Horiguchi", "Darkness Dragon", "Yasushi Kanda"]
        );
        assert_eq!(parsed.outcome_of("Dragon Kid"), Some(Outcome::Winner));
        assert_eq!(parsed.outcome_of("Yasushi Kanda"), Some(Outcome::Loser));
        assert_eq!(parsed.outcome_of("Genki Horiguchi"), None);
        assert_eq!(parsed.time.as_deref(), Some("16:45"));
        assert_eq!(parsed.finish.as_deref(), Some("Ultra Hurricanrana"));
    }

    #[test]
    fn test_result_only_header_is_not_a_participant() {
        let parsed = parse_match(&["③ No Contest", "Alice vs Bob"], 3).unwrap();

        assert_eq!(parsed.match_type, "Singles Match");
        assert_eq!(names(&parsed), ["Alice", "Bob"]);
        assert_eq!(parsed.outcome_of("Alice"), Some(Outcome::NoContest));
        assert_eq!(parsed.outcome_of("Bob"), Some(Outcome::NoContest));
    }

    #[test]
    fn test_descriptive_header_with_phrase_is_dropped_when_body_follows() {
        let block = [
            "⑥ C-MAX vs. M2K Elimination Match",
            "SUWA",
            "CIMA",
            "vs",
            "Yasushi Kanda",
            "Masaaki Mochizuki",
            "❶❌Masaaki (14:27 La Magistral) Fuji⭕️",
        ];
        let parsed = parse_match(&block, 6).unwrap();

        assert_eq!(parsed.match_type, "Elimination Match");
        assert_eq!(names(&parsed), ["SUWA", "CIMA", "Yasushi Kanda", "Masaaki Mochizuki"]);
        assert_eq!(parsed.notes, ["❶❌Masaaki (14:27 La Magistral) Fuji⭕️"]);
        assert_eq!(parsed.time, None);
    }

    #[test]
    fn test_unknown_label_ending_in_match_is_kept() {
        let parsed = parse_match(&["④ Lumberjack Match", "Alice vs Bob"], 4).unwrap();
        assert_eq!(parsed.match_type, "Lumberjack Match");
    }

    #[test]
    fn test_score_and_champion_tags() {
        let parsed = parse_match(&["① Team Alpha (3-2) Team Beta"], 1).unwrap();
        assert_eq!(names(&parsed), ["Team Alpha", "Team Beta"]);

        let parsed = parse_match(&["① Singles Match", "Alice (c) vs Bob"], 1).unwrap();
        assert_eq!(names(&parsed), ["Alice", "Bob"]);
    }

    #[test]
    fn test_duplicates_removed_in_first_seen_order() {
        let parsed = parse_match(&["① Alice and Bob vs Carol, Alice"], 1).unwrap();
        assert_eq!(names(&parsed), ["Alice", "Bob", "Carol"]);
    }

    #[test]
    fn test_block_without_participants_is_dropped() {
        assert!(parse_match(&["① Singles Match"], 1).is_none());
        assert!(parse_match(&["① Singles Match", "(10:00 Pinfall)"], 1).is_none());
        assert!(parse_match(&["② No Contest"], 2).is_none());
        assert!(parse_match::<&str>(&[], 1).is_none());
    }
}
