// 🔎 Search & Threshold - name matching, power cutoff, summary statistics

use crate::creature::DerivedCreature;
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::fmt;

// ============================================================================
// SEARCH PATTERN
// ============================================================================

/// Case-insensitive name matcher.
///
/// The view builds one from raw user input with [`SearchPattern::from_input`],
/// which treats the text as a regular expression and falls back to a literal
/// substring when the expression does not compile. The by-name lookup uses
/// [`SearchPattern::literal`] directly.
#[derive(Debug, Clone)]
pub enum SearchPattern {
    /// Empty input, matches every name
    Any,
    /// Unanchored, case-insensitive regular expression
    Pattern(Regex),
    /// Lowercased needle for substring matching
    Literal(String),
}

impl SearchPattern {
    pub fn from_input(input: &str) -> Self {
        if input.is_empty() {
            return SearchPattern::Any;
        }

        match RegexBuilder::new(input).case_insensitive(true).build() {
            Ok(regex) => SearchPattern::Pattern(regex),
            Err(e) => {
                log::debug!("search {:?} is not a valid pattern ({}), matching literally", input, e);
                SearchPattern::literal(input)
            }
        }
    }

    pub fn literal(input: &str) -> Self {
        if input.is_empty() {
            SearchPattern::Any
        } else {
            SearchPattern::Literal(input.to_lowercase())
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            SearchPattern::Any => true,
            SearchPattern::Pattern(regex) => regex.is_match(name),
            SearchPattern::Literal(needle) => name.to_lowercase().contains(needle.as_str()),
        }
    }

    /// True when matching by substring instead of by expression
    pub fn is_literal(&self) -> bool {
        matches!(self, SearchPattern::Literal(_))
    }
}

impl Default for SearchPattern {
    fn default() -> Self {
        SearchPattern::Any
    }
}

/// Keep the records whose name matches, in their original order
pub fn search<'a>(records: &'a [DerivedCreature], pattern: &SearchPattern) -> Vec<&'a DerivedCreature> {
    records
        .iter()
        .filter(|d| pattern.matches(&d.creature.name))
        .collect()
}

// ============================================================================
// THRESHOLD
// ============================================================================

/// Power cutoff entered by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Threshold {
    Value(i64),
    /// Input had no leading integer; nothing counts as above it
    Invalid,
}

impl Threshold {
    /// Parse the leading base-10 integer of `input`.
    ///
    /// Leading whitespace and a single sign are accepted, anything after the
    /// digits is ignored ("12abc" is 12). Input without digits is `Invalid`.
    /// Values outside i64 saturate.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim_start();
        let (negative, rest) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };

        let digit_count = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digit_count == 0 {
            return Threshold::Invalid;
        }

        let digits = &rest[..digit_count];
        let signed = if negative { format!("-{}", digits) } else { digits.to_string() };

        match signed.parse::<i64>() {
            Ok(value) => Threshold::Value(value),
            Err(_) if negative => Threshold::Value(i64::MIN),
            Err(_) => Threshold::Value(i64::MAX),
        }
    }

    /// Strict greater-than; always false for `Invalid`
    pub fn exceeded_by(&self, power: u64) -> bool {
        match self {
            Threshold::Value(limit) => i64::try_from(power).map_or(true, |p| p > *limit),
            Threshold::Invalid => false,
        }
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Threshold::Value(0)
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Threshold::Value(v) => write!(f, "{}", v),
            Threshold::Invalid => write!(f, "invalid"),
        }
    }
}

// ============================================================================
// SUMMARY
// ============================================================================

/// Live statistics over the search-filtered records.
/// Min and max ignore the threshold; only the count uses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Summary {
    pub count_above: usize,
    pub min: Option<u64>,
    pub max: Option<u64>,
}

impl Summary {
    pub fn compute(rows: &[&DerivedCreature], threshold: Threshold) -> Self {
        Self {
            count_above: rows.iter().filter(|d| threshold.exceeded_by(d.power)).count(),
            min: rows.iter().map(|d| d.power).min(),
            max: rows.iter().map(|d| d.power).max(),
        }
    }

    /// Minimum power, 0 when nothing matched
    pub fn display_min(&self) -> u64 {
        self.min.unwrap_or(0)
    }

    /// Maximum power, 0 when nothing matched
    pub fn display_max(&self) -> u64 {
        self.max.unwrap_or(0)
    }
}
