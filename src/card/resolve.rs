use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::types::Outcome;

static NO_CONTEST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\bno[\s-]+contest\b|\bdouble\s+count[\s-]*outs?\b|\bdouble\s+(?:disqualification|dq)\b|\bno\s+decision\b",
    )
    .expect("valid no-contest regex")
});

static DRAW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\btime[\s-]+limit\s+draw\b|\bdouble\s+pin(?:fall)?s?\b|\bdraw\b")
        .expect("valid draw regex")
});

/// Which rule produced a match's annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionTier {
    NoContest,
    Draw,
    ExplicitMarkers,
    Positional,
    Unresolved,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub tier: ResolutionTier,
    pub outcomes: BTreeMap<String, Outcome>,
}

/// Whole-match special result named anywhere in `text`, no-contest first.
pub fn special_result(text: &str) -> Option<Outcome> {
    if NO_CONTEST_RE.is_match(text) {
        Some(Outcome::NoContest)
    } else if DRAW_RE.is_match(text) {
        Some(Outcome::Draw)
    } else {
        None
    }
}

/// Assigns outcome annotations to a match's participants.
///
/// Tiers, first hit wins: no-contest keyword, draw keyword, explicit per-name
/// markers, then positional (first participant wins, last loses). Fewer than
/// two participants are never annotated.
pub fn resolve(
    raw_text: &str,
    participants: &[String],
    markers: &BTreeMap<String, Outcome>,
) -> Resolution {
    if participants.len() < 2 {
        return Resolution {
            tier: ResolutionTier::Unresolved,
            outcomes: BTreeMap::new(),
        };
    }

    if let Some(outcome) = special_result(raw_text) {
        let tier = match outcome {
            Outcome::NoContest => ResolutionTier::NoContest,
            _ => ResolutionTier::Draw,
        };
        return Resolution {
            tier,
            outcomes: participants
                .iter()
                .map(|name| (name.clone(), outcome))
                .collect(),
        };
    }

    let marked: BTreeMap<String, Outcome> = participants
        .iter()
        .filter_map(|name| markers.get(name).map(|outcome| (name.clone(), *outcome)))
        .collect();
    if !marked.is_empty() {
        return Resolution {
            tier: ResolutionTier::ExplicitMarkers,
            outcomes: marked,
        };
    }

    let mut outcomes = BTreeMap::new();
    if let (Some(first), Some(last)) = (participants.first(), participants.last()) {
        outcomes.insert(first.clone(), Outcome::Winner);
        outcomes.insert(last.clone(), Outcome::Loser);
    }
    Resolution {
        tier: ResolutionTier::Positional,
        outcomes,
    }
}
