use std::collections::BTreeSet;

use crate::model::house::House;
use crate::model::intent::{ParsedIntent, Polarity};
use crate::model::persona::SpecialSubject;

const AWARD_PHRASES: [&str; 4] = ["points to", "point to", "point for", "points for"];
const DEDUCT_PHRASES: [&str; 2] = ["points from", "point from"];
const REASON_MARKERS: [&str; 2] = [" for ", " because of "];
const UTTERANCE_MARKERS: [&str; 2] = [" says ", " say "];

/// Collapse whitespace and lowercase.
pub fn clean(message: &str) -> String {
    message
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn parse_intent(message: &str, subjects: &[SpecialSubject]) -> ParsedIntent {
    let (amount, polarity) = detect_amount_and_polarity(message);

    ParsedIntent {
        amount,
        polarity,
        houses: extract_groups(message),
        special_subject: extract_special_subject(message, subjects),
        reason: non_empty(reason_beyond_polarity(message)),
        utterance: non_empty(extract_utterance(message)),
    }
}

pub fn detect_amount_and_polarity(message: &str) -> (u64, Polarity) {
    let cleaned = clean(message);

    let words: Vec<&str> = cleaned
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
        .collect();

    // First number wins: "1 point to gryffindor ... 5 years ago" is one point.
    let amount = match words
        .iter()
        .find(|w| w.chars().all(|c| c.is_ascii_digit()))
    {
        Some(digits) => digits.parse::<u64>().unwrap_or(u64::MAX),
        None if words.contains(&"one") => 1,
        None => 0,
    };

    (amount, detect_polarity(&cleaned))
}

fn detect_polarity(cleaned: &str) -> Polarity {
    if AWARD_PHRASES.iter().any(|p| cleaned.contains(p)) {
        Polarity::Award
    } else if DEDUCT_PHRASES.iter().any(|p| cleaned.contains(p)) {
        Polarity::Deduct
    } else {
        Polarity::None
    }
}

pub fn extract_groups(message: &str) -> BTreeSet<House> {
    let cleaned = clean(message);
    let tokens: Vec<&str> = cleaned.split_whitespace().collect();

    if tokens.contains(&"everybody") {
        return House::ALL.into_iter().collect();
    }

    tokens.into_iter().filter_map(House::from_token).collect()
}

/// Only the first two words are considered, so "Prof Dumbledore awards ..."
/// still addresses Dumbledore but a mention later in the sentence does not.
pub fn extract_special_subject(message: &str, subjects: &[SpecialSubject]) -> Option<String> {
    let lowered = message.to_lowercase();
    let leading: Vec<&str> = lowered.split_whitespace().take(2).collect();

    subjects
        .iter()
        .find(|s| leading.contains(&s.key.to_lowercase().as_str()))
        .map(|s| s.key.clone())
}

pub fn extract_reason(message: &str) -> String {
    text_after_earliest(message, &REASON_MARKERS)
}

/// Like `extract_reason`, but a " for " that belongs to "point(s) for" names
/// the target house, not a reason, so it is skipped.
fn reason_beyond_polarity(message: &str) -> String {
    let mut rest = message;
    loop {
        let Some((at, len)) = earliest_marker(rest, &REASON_MARKERS) else {
            return String::new();
        };

        let before = rest[..at].to_lowercase();
        let is_polarity = rest[at..].starts_with(" for ")
            && (before.ends_with("point") || before.ends_with("points"));
        if !is_polarity {
            return rest[at + len..].to_string();
        }

        // keep the trailing space so a following " for " still matches
        rest = &rest[at + len - 1..];
    }
}

pub fn extract_utterance(message: &str) -> String {
    text_after_earliest(message, &UTTERANCE_MARKERS)
}

pub fn pluralize(n: i64) -> String {
    if n.abs() == 1 {
        format!("{} point", n)
    } else {
        format!("{} points", n)
    }
}

fn earliest_marker(message: &str, markers: &[&str]) -> Option<(usize, usize)> {
    markers
        .iter()
        .filter_map(|m| message.find(m).map(|at| (at, m.len())))
        .min_by_key(|(at, _)| *at)
}

fn text_after_earliest(message: &str, markers: &[&str]) -> String {
    earliest_marker(message, markers)
        .map(|(at, len)| message[at + len..].to_string())
        .unwrap_or_default()
}

fn non_empty(text: String) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
