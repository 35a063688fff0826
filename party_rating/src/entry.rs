// ********* Manual entry and validation ***********

use std::collections::HashMap;
use std::error::Error;
use std::fmt::Display;

use chrono::NaiveDate;

use crate::config::{ERROR_TOKEN, MANUAL_PARTIES, OTHER_PARTY};

/// Errors raised while building an entry sheet from user input.
#[derive(PartialEq, Debug, Clone)]
pub enum EntryError {
    UnknownParty(String),
    RatingOutOfRange { party: String, rating: f64 },
}

impl Error for EntryError {}

impl Display for EntryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryError::UnknownParty(party) => {
                write!(f, "unknown party in entry sheet: {}", party)
            }
            EntryError::RatingOutOfRange { party, rating } => {
                write!(f, "rating for {} is outside [0, 100]: {}", party, rating)
            }
        }
    }
}

/// Rounds to one decimal place, the precision used everywhere a rating
/// is derived or displayed.
pub fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Outcome of deriving その他 from the manual entries.
#[derive(PartialEq, Debug, Clone, Copy)]
pub enum OtherOutcome {
    /// `round1(100 - total)` when the manual total is at most 100.
    Value(f64),
    /// The manual total already exceeds 100; その他 cannot be derived
    /// and the sheet is not exportable.
    Overflow { total: f64 },
}

/// One survey's complete entry: every manual party in entry order plus
/// the derived その他.
#[derive(PartialEq, Debug, Clone)]
pub struct EntrySheet {
    source: String,
    survey_date: NaiveDate,
    rows: Vec<(String, f64)>,
    other: OtherOutcome,
    total: f64,
}

impl EntrySheet {
    /// Validates the ratings and derives その他.
    ///
    /// Parties missing from the mapping default to 0.0, matching the
    /// entry form which pre-fills every field with 0.0. A key outside
    /// the manual party set or a rating outside [0, 100] is an error.
    pub fn build(
        source: &str,
        survey_date: NaiveDate,
        ratings: &HashMap<String, f64>,
    ) -> Result<EntrySheet, EntryError> {
        for (party, &rating) in ratings.iter() {
            if !MANUAL_PARTIES.contains(&party.as_str()) {
                return Err(EntryError::UnknownParty(party.clone()));
            }
            if !(0.0..=100.0).contains(&rating) {
                return Err(EntryError::RatingOutOfRange {
                    party: party.clone(),
                    rating,
                });
            }
        }
        let rows: Vec<(String, f64)> = MANUAL_PARTIES
            .iter()
            .map(|p| (p.to_string(), ratings.get(*p).copied().unwrap_or(0.0)))
            .collect();
        let total: f64 = rows.iter().map(|(_, r)| *r).sum();
        let other = if total > 100.0 {
            OtherOutcome::Overflow { total }
        } else {
            OtherOutcome::Value(round1(100.0 - total))
        };
        Ok(EntrySheet {
            source: source.to_string(),
            survey_date,
            rows,
            other,
            total,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn survey_date(&self) -> NaiveDate {
        self.survey_date
    }

    /// Sum of the manual entries, excluding その他.
    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn other(&self) -> OtherOutcome {
        self.other
    }

    pub fn is_exportable(&self) -> bool {
        matches!(self.other, OtherOutcome::Value(_))
    }

    /// The complete record set including その他, in entry order.
    /// `None` when the total overflows and その他 cannot be derived.
    pub fn export_rows(&self) -> Option<Vec<(String, f64)>> {
        match self.other {
            OtherOutcome::Value(v) => {
                let mut rows = self.rows.clone();
                rows.push((OTHER_PARTY.to_string(), v));
                Some(rows)
            }
            OtherOutcome::Overflow { .. } => None,
        }
    }

    /// Formatted cells for display, その他 last. An overflowed その他
    /// is shown with the error token instead of a percentage.
    pub fn display_cells(&self) -> Vec<(String, String)> {
        let mut cells: Vec<(String, String)> = self
            .rows
            .iter()
            .map(|(p, r)| (p.clone(), format!("{:.1}%", r)))
            .collect();
        let other_cell = match self.other {
            OtherOutcome::Value(v) => format!("{:.1}%", v),
            OtherOutcome::Overflow { .. } => ERROR_TOKEN.to_string(),
        };
        cells.push((OTHER_PARTY.to_string(), other_cell));
        cells
    }
}
