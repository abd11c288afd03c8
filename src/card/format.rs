use chrono::{Datelike, NaiveDate};

use crate::types::{Event, Match};

pub const EVENT_DIVIDER: &str = "——";
pub const UNKNOWN_DATE: &str = "Unknown Date";

const CIRCLED_NUMBERS: [&str; 10] = ["①", "②", "③", "④", "⑤", "⑥", "⑦", "⑧", "⑨", "⑩"];

pub fn ordinal_suffix(day: u32) -> &'static str {
    if (11..=13).contains(&(day % 100)) {
        return "th";
    }
    match day % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

/// `November 25th, 2001`
pub fn format_date(date: NaiveDate) -> String {
    format!(
        "{} {}{}, {}",
        date.format("%B"),
        date.day(),
        ordinal_suffix(date.day()),
        date.year()
    )
}

/// Circled glyph for 1 through 10, `N.` beyond.
pub fn number_glyph(number: u32) -> String {
    match number {
        1..=10 => CIRCLED_NUMBERS[(number - 1) as usize].to_string(),
        _ => format!("{number}."),
    }
}

fn participant_line(bout: &Match, name: &str) -> String {
    match bout.outcome_of(name) {
        Some(outcome) => format!("{name}{}", outcome.glyph()),
        None => name.to_string(),
    }
}

pub fn format_match(bout: &Match) -> Vec<String> {
    let mut lines = vec![format!("{} {}", number_glyph(bout.number), bout.match_type)];

    let names = &bout.participants;
    if names.len() == 1 {
        lines.push(participant_line(bout, &names[0]));
    } else if !names.is_empty() {
        let (first, second) = names.split_at(names.len() / 2);
        lines.extend(first.iter().map(|name| participant_line(bout, name)));
        lines.push("vs".to_string());
        lines.extend(second.iter().map(|name| participant_line(bout, name)));
    }

    let timing: Vec<&str> = [bout.time.as_deref(), bout.finish.as_deref()]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect();
    if !timing.is_empty() {
        lines.push(format!("({})", timing.join(" ")));
    }

    lines.extend(bout.notes.iter().cloned());
    lines
}

/// Header lines, then each match followed by a blank line.
pub fn format_event(event: &Event) -> Vec<String> {
    let mut lines = vec![match event.date {
        Some(date) => format_date(date),
        None => UNKNOWN_DATE.to_string(),
    }];

    match event.city.as_deref().filter(|city| !city.is_empty()) {
        Some(city) if !event.venue.is_empty() => lines.push(format!("{city}, {}", event.venue)),
        Some(city) => lines.push(city.to_string()),
        None if !event.venue.is_empty() => lines.push(event.venue.clone()),
        None => {}
    }

    if let Some(attendance) = event.attendance {
        lines.push(format!("Attendance: {attendance}"));
    }
    lines.push(String::new());

    for bout in &event.matches {
        lines.extend(format_match(bout));
        lines.push(String::new());
    }
    lines
}

/// Events in the given order, separated by the divider line.
pub fn format_events<'a>(events: impl IntoIterator<Item = &'a Event>) -> Vec<String> {
    let mut lines = Vec::new();
    for (idx, event) in events.into_iter().enumerate() {
        if idx > 0 {
            lines.push(EVENT_DIVIDER.to_string());
            lines.push(String::new());
        }
        lines.extend(format_event(event));
    }
    lines
}
