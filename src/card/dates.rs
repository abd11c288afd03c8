use chrono::{Datelike, NaiveDate};
use regex::{Captures, Regex};
use std::sync::LazyLock;

use crate::types::{DateCandidate, DateFamily};

pub const MIN_VALID_YEAR: i32 = 1990;
pub const MAX_VALID_YEAR: i32 = 2030;

const MONTH_FULL_RE: &str = r"(?i)(january|february|march|april|may|june|july|august|september|october|november|december)\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})";
const MONTH_ABBREV_RE: &str = r"(?i)(jan|feb|mar|apr|may|jun|jul|aug|sept|sep|oct|nov|dec)\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})";

#[derive(Clone, Copy)]
enum FieldOrder {
    YearMonthDay,
    MonthDayYear,
    MonthNameDayYear,
}

struct DatePattern {
    family: DateFamily,
    order: FieldOrder,
    regex: Regex,
}

impl DatePattern {
    fn new(family: DateFamily, order: FieldOrder, pattern: &str) -> Self {
        Self {
            family,
            order,
            regex: Regex::new(pattern).expect("valid date pattern regex"),
        }
    }

    fn parse(&self, caps: &Captures<'_>) -> Option<NaiveDate> {
        let (year, month, day) = match self.order {
            FieldOrder::YearMonthDay => (
                capture_number(caps, 1)?,
                capture_number(caps, 2)?,
                capture_number(caps, 3)?,
            ),
            FieldOrder::MonthDayYear => (
                capture_number(caps, 3)?,
                capture_number(caps, 1)?,
                capture_number(caps, 2)?,
            ),
            FieldOrder::MonthNameDayYear => (
                capture_number(caps, 3)?,
                month_from_name(caps.get(1)?.as_str())?,
                capture_number(caps, 2)?,
            ),
        };

        let year = if self.family == DateFamily::MdyShortYear {
            expand_two_digit_year(year)
        } else {
            i32::try_from(year).ok()?
        };

        NaiveDate::from_ymd_opt(year, month, day)
    }

    /// A match must not run into further digits on either side, and a month
    /// name must not continue a Latin word. Any other neighbour is accepted.
    fn is_isolated(&self, text: &str, start: usize, end: usize) -> bool {
        let before = text[..start].chars().next_back();
        let after = text[end..].chars().next();

        let leading_ok = match self.order {
            FieldOrder::MonthNameDayYear => !before.is_some_and(|c| c.is_ascii_alphanumeric()),
            FieldOrder::YearMonthDay | FieldOrder::MonthDayYear => {
                !before.is_some_and(|c| c.is_ascii_digit())
            }
        };
        leading_ok && !after.is_some_and(|c| c.is_ascii_digit())
    }
}

// Highest confidence first. Matches are digit-bounded in `recognize`, so a
// short-year pattern never lands inside a four-digit year.
static DATE_PATTERNS: LazyLock<Vec<DatePattern>> = LazyLock::new(|| {
    vec![
        DatePattern::new(
            DateFamily::MonthFull,
            FieldOrder::MonthNameDayYear,
            MONTH_FULL_RE,
        ),
        DatePattern::new(
            DateFamily::YmdDash,
            FieldOrder::YearMonthDay,
            r"(\d{4})-(\d{1,2})-(\d{1,2})",
        ),
        DatePattern::new(
            DateFamily::MonthAbbrev,
            FieldOrder::MonthNameDayYear,
            MONTH_ABBREV_RE,
        ),
        DatePattern::new(
            DateFamily::MdySlash,
            FieldOrder::MonthDayYear,
            r"(\d{1,2})/(\d{1,2})/(\d{4})",
        ),
        DatePattern::new(
            DateFamily::MdyDashOrDot,
            FieldOrder::MonthDayYear,
            r"(\d{1,2})-(\d{1,2})-(\d{4})",
        ),
        DatePattern::new(
            DateFamily::MdyDashOrDot,
            FieldOrder::MonthDayYear,
            r"(\d{1,2})\.(\d{1,2})\.(\d{4})",
        ),
        DatePattern::new(
            DateFamily::MdyShortYear,
            FieldOrder::MonthDayYear,
            r"(\d{1,2})/(\d{1,2})/(\d{2})",
        ),
        DatePattern::new(
            DateFamily::MdyShortYear,
            FieldOrder::MonthDayYear,
            r"(\d{1,2})-(\d{1,2})-(\d{2})",
        ),
    ]
});

fn capture_number(caps: &Captures<'_>, idx: usize) -> Option<u32> {
    caps.get(idx)?.as_str().parse().ok()
}

fn month_from_name(name: &str) -> Option<u32> {
    let prefix: String = name.chars().take(3).collect::<String>().to_lowercase();
    let month = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

/// 00-29 maps to 2000-2029, 30-99 to 1930-1999.
pub fn expand_two_digit_year(year: u32) -> i32 {
    let year = (year % 100) as i32;
    if year < 30 { 2000 + year } else { 1900 + year }
}

pub fn is_valid_year(year: i32) -> bool {
    (MIN_VALID_YEAR..=MAX_VALID_YEAR).contains(&year)
}

/// Scans one line for calendar dates.
///
/// Candidates outside the valid year window are dropped, the remaining ones
/// are deduplicated by calendar day (highest confidence wins) and returned
/// sorted by confidence, descending. Ties keep source order.
pub fn recognize(text: &str, line: Option<usize>) -> Vec<DateCandidate> {
    let mut found: Vec<DateCandidate> = Vec::new();

    for pattern in DATE_PATTERNS.iter() {
        for caps in pattern.regex.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            if !pattern.is_isolated(text, whole.start(), whole.end()) {
                continue;
            }
            let Some(date) = pattern.parse(&caps) else {
                continue;
            };
            if !is_valid_year(date.year()) {
                continue;
            }

            found.push(DateCandidate {
                date,
                original_text: whole.as_str().to_string(),
                confidence: pattern.family.confidence(),
                family: pattern.family,
                offset: whole.start(),
                line,
            });
        }
    }

    let mut unique = dedup_by_day(found);
    unique.sort_by(|left, right| {
        right
            .confidence
            .total_cmp(&left.confidence)
            .then_with(|| left.offset.cmp(&right.offset))
    });
    unique
}

fn dedup_by_day(candidates: Vec<DateCandidate>) -> Vec<DateCandidate> {
    let mut unique: Vec<DateCandidate> = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        match unique.iter_mut().find(|kept| kept.date == candidate.date) {
            Some(kept) => {
                if candidate.confidence > kept.confidence {
                    *kept = candidate;
                }
            }
            None => unique.push(candidate),
        }
    }

    unique
}

/// Earliest calendar day; the first one wins on equal dates.
pub fn earliest(candidates: &[DateCandidate]) -> Option<&DateCandidate> {
    candidates.iter().min_by_key(|candidate| candidate.date)
}

/// Highest confidence; the first one wins on equal confidence.
pub fn most_confident(candidates: &[DateCandidate]) -> Option<&DateCandidate> {
    candidates.iter().reduce(|best, candidate| {
        if candidate.confidence > best.confidence {
            candidate
        } else {
            best
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_full_month_name_with_ordinal() {
        let text = "November 25th, 2001 Shizuoka, Twin Messe Shizuoka - 1580 Attendance";
        let found = recognize(text, Some(3));

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].date, ymd(2001, 11, 25));
        assert_eq!(found[0].original_text, "November 25th, 2001");
        assert_eq!(found[0].confidence, 0.95);
        assert_eq!(found[0].family, DateFamily::MonthFull);
        assert_eq!(found[0].line, Some(3));
    }

    #[test]
    fn test_slash_date_does_not_leak_short_year_candidate() {
        let found = recognize("4/26/2001 Gifu Industrial Hall 1050 Attendance", None);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].date, ymd(2001, 4, 26));
        assert_eq!(found[0].original_text, "4/26/2001");
        assert_eq!(found[0].confidence, 0.85);
    }

    #[test]
    fn test_each_family_reports_its_weight() {
        let cases = [
            ("2001-05-12 Korakuen", "2001-05-12", 0.90, DateFamily::YmdDash),
            ("Sept. 5, 2003 Osaka", "Sept. 5, 2003", 0.90, DateFamily::MonthAbbrev),
            ("Dec 24 2002 Kobe", "Dec 24 2002", 0.90, DateFamily::MonthAbbrev),
            ("5-12-2001 Tokyo", "5-12-2001", 0.80, DateFamily::MdyDashOrDot),
            ("5.12.2001 Tokyo", "5.12.2001", 0.80, DateFamily::MdyDashOrDot),
            ("5/12/01 Tokyo", "5/12/01", 0.60, DateFamily::MdyShortYear),
            ("5-12-01 Tokyo", "5-12-01", 0.60, DateFamily::MdyShortYear),
        ];

        for (text, original, confidence, family) in cases {
            let found = recognize(text, None);
            assert_eq!(found.len(), 1, "{text}");
            assert_eq!(found[0].original_text, original, "{text}");
            assert_eq!(found[0].confidence, confidence, "{text}");
            assert_eq!(found[0].family, family, "{text}");
        }
    }

    #[test]
    fn test_two_digit_year_expansion() {
        assert_eq!(expand_two_digit_year(0), 2000);
        assert_eq!(expand_two_digit_year(29), 2029);
        assert_eq!(expand_two_digit_year(30), 1930);
        assert_eq!(expand_two_digit_year(99), 1999);

        let found = recognize("3/10/99", None);
        assert_eq!(found[0].date, ymd(1999, 3, 10));
    }

    #[test]
    fn test_years_outside_window_are_dropped() {
        assert!(recognize("January 1st, 1989", None).is_empty());
        assert!(recognize("2031-01-01", None).is_empty());
        assert!(recognize("6/1/45", None).is_empty());
        assert!(recognize("7/4/1776", None).is_empty());

        assert_eq!(recognize("January 1st, 1990", None).len(), 1);
        assert_eq!(recognize("12/31/2030", None).len(), 1);
    }

    #[test]
    fn test_invalid_calendar_days_are_skipped() {
        assert!(recognize("2/30/2001", None).is_empty());
        assert!(recognize("13/01/2001", None).is_empty());
    }

    #[test]
    fn test_same_day_keeps_highest_confidence() {
        // Both the full and abbreviated month patterns match "May 12th, 2001".
        let found = recognize("May 12th, 2001 (5/12/2001)", None);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].confidence, 0.95);
        assert_eq!(found[0].family, DateFamily::MonthFull);
    }

    #[test]
    fn test_distinct_days_sorted_by_confidence() {
        let found = recognize("3/10/01 then 2001-04-26", None);

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].date, ymd(2001, 4, 26));
        assert_eq!(found[1].date, ymd(2001, 3, 10));
    }

    #[test]
    fn test_earliest_and_most_confident_queries() {
        let found = recognize("April 26, 2001 and 3/10/2001 and 2001-05-01", None);
        assert_eq!(found.len(), 3);

        assert_eq!(earliest(&found).unwrap().date, ymd(2001, 3, 10));
        assert_eq!(most_confident(&found).unwrap().date, ymd(2001, 4, 26));
        assert!(earliest(&[]).is_none());
        assert!(most_confident(&[]).is_none());
    }

    #[test]
    fn test_most_confident_tie_keeps_first() {
        let found = recognize("2001-05-01 and 2001-05-02", None);
        assert_eq!(found.len(), 2);
        assert_eq!(most_confident(&found).unwrap().date, ymd(2001, 5, 1));
    }

    #[test]
    fn test_no_date_in_plain_text() {
        assert!(recognize("Alice vs Bob", None).is_empty());
        assert!(recognize("① Singles Match", None).is_empty());
        assert!(recognize("(10:32 Pinfall)", None).is_empty());
    }

    #[test]
    fn test_dates_adjacent_to_cjk_text() {
        let cases = [
            ("2001-05-12開催 後楽園ホール", ymd(2001, 5, 12), "2001-05-12"),
            ("静岡4/26/2001 Gifu", ymd(2001, 4, 26), "4/26/2001"),
            ("大阪5-12-2001開催", ymd(2001, 5, 12), "5-12-2001"),
            ("会場5.12.2001", ymd(2001, 5, 12), "5.12.2001"),
            ("5/12/01開催", ymd(2001, 5, 12), "5/12/01"),
            ("名古屋5-12-01", ymd(2001, 5, 12), "5-12-01"),
            ("November 25th, 2001年 静岡", ymd(2001, 11, 25), "November 25th, 2001"),
            ("静岡Sept. 5, 2003大阪", ymd(2003, 9, 5), "Sept. 5, 2003"),
        ];

        for (text, date, original) in cases {
            let found = recognize(text, None);
            assert_eq!(found.len(), 1, "{text}");
            assert_eq!(found[0].date, date, "{text}");
            assert_eq!(found[0].original_text, original, "{text}");
            assert_eq!(&text[found[0].offset..][..original.len()], original);
        }
    }

    #[test]
    fn test_numeric_date_adjacent_to_latin_letters() {
        let found = recognize("Show4/26/2001Gifu", None);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].date, ymd(2001, 4, 26));
        assert_eq!(found[0].offset, 4);
    }

    #[test]
    fn test_dates_running_into_digits_are_rejected() {
        assert!(recognize("12001-05-12", None).is_empty());
        assert!(recognize("4/26/20015", None).is_empty());
        assert!(recognize("Summay 5, 2001", None).is_empty());
        assert!(recognize("xmay 5, 2001", None).is_empty());
    }
}
