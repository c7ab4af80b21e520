//! Narrow parsers for free-form model replies.
//!
//! Both parsers return a tagged [`ParseOutcome`] and never panic, so callers
//! decide the fallback: a rating defaults to 0.0, a missing theory number
//! fails the turn.

use regex::Regex;
use std::sync::OnceLock;

use case_rules::THEORY_COUNT;

/// Markers a rating reply uses to say there is no strong connection.
const NO_CONNECTION_MARKERS: [&str; 3] =
    ["no_connection", "no strong connection", "no connection"];

/// Result of parsing a reply.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome<T> {
    Parsed(T),
    Unparsable,
}

impl<T> ParseOutcome<T> {
    /// The parsed value, or `fallback`.
    pub fn unwrap_or(self, fallback: T) -> T {
        match self {
            ParseOutcome::Parsed(value) => value,
            ParseOutcome::Unparsable => fallback,
        }
    }
}

/// A parsed connection rating.
#[derive(Debug, Clone, PartialEq)]
pub enum RatingReply {
    /// The explicit "no strong connection" answer.
    NoConnection,
    Rated {
        /// Clamped to 0.0..=1.0.
        score: f32,
        reason: String,
    },
}

impl RatingReply {
    /// Score used against the threshold.
    pub fn score(&self) -> f32 {
        match self {
            RatingReply::NoConnection => 0.0,
            RatingReply::Rated { score, .. } => *score,
        }
    }

    pub fn reason(&self) -> &str {
        match self {
            RatingReply::NoConnection => "",
            RatingReply::Rated { reason, .. } => reason,
        }
    }
}

fn decimal_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d*\.\d+").expect("static decimal pattern"))
}

fn integer_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d+").expect("static integer pattern"))
}

/// Parse a rating reply: the first decimal-point numeral is the score,
/// whatever follows it (minus separators) is the reason.
pub fn parse_rating(reply: &str) -> ParseOutcome<RatingReply> {
    let lowered = reply.to_lowercase();
    if NO_CONNECTION_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
    {
        return ParseOutcome::Parsed(RatingReply::NoConnection);
    }

    let Some(found) = decimal_pattern().find(reply) else {
        return ParseOutcome::Unparsable;
    };
    let Ok(score) = found.as_str().parse::<f32>() else {
        return ParseOutcome::Unparsable;
    };

    let reason = reply[found.end()..]
        .trim_start_matches(|c: char| c.is_whitespace() || matches!(c, '|' | '-' | ':' | ','))
        .trim_start_matches("REASON:")
        .trim_start_matches("Reason:")
        .trim();

    ParseOutcome::Parsed(RatingReply::Rated {
        score: score.clamp(0.0, 1.0),
        reason: reason.to_string(),
    })
}

/// Parse the false-theory reply: the first integer in 1..=5.
pub fn parse_false_theory(reply: &str) -> ParseOutcome<u8> {
    integer_pattern()
        .find_iter(reply)
        .filter_map(|m| m.as_str().parse::<u8>().ok())
        .find(|n| (1..=THEORY_COUNT).contains(n))
        .map_or(ParseOutcome::Unparsable, ParseOutcome::Parsed)
}
