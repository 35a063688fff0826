mod config;
mod entry;
mod timeseries;

use log::{debug, info};

use std::collections::HashMap;

pub use crate::config::*;
pub use crate::entry::*;
pub use crate::timeseries::*;

// **** Multi-file aggregation ****

/// Mean rating for one category across every valid uploaded row.
#[derive(PartialEq, Debug, Clone)]
pub struct PartyMean {
    pub party: String,
    pub mean: f64,
    pub samples: usize,
}

/// Parses a rating cell, accepting exactly the non-negative decimal
/// numerals: ASCII digits with at most one `.`.
///
/// Everything else (signs, exponents, percent suffixes, the error
/// token, blanks) is rejected so that malformed rows from uploaded
/// files never reach a mean.
pub fn parse_rating(cell: &str) -> Option<f64> {
    if cell.is_empty() || cell == "." {
        return None;
    }
    let mut seen_dot = false;
    for c in cell.chars() {
        match c {
            '0'..='9' => {}
            '.' if !seen_dot => seen_dot = true,
            _ => return None,
        }
    }
    cell.parse::<f64>().ok()
}

/// Splits raw (category, rating-cell) rows into parsed rows and a
/// rejected-row count. Rejected rows never affect a mean or a sample
/// count.
pub fn filter_numeric_rows(rows: &[(String, String)]) -> (Vec<(String, f64)>, usize) {
    let mut valid: Vec<(String, f64)> = Vec::with_capacity(rows.len());
    let mut rejected = 0usize;
    for (party, cell) in rows.iter() {
        match parse_rating(cell) {
            Some(rating) => valid.push((party.clone(), rating)),
            None => {
                debug!(
                    "filter_numeric_rows: dropping row for {:?} with rating cell {:?}",
                    party, cell
                );
                rejected += 1;
            }
        }
    }
    (valid, rejected)
}

/// Groups rows by category and computes the arithmetic mean of each
/// group, ordered canonically. Categories outside the canonical set
/// are kept and appended after all known ones.
pub fn aggregate(rows: &[(String, f64)]) -> Vec<PartyMean> {
    info!("aggregate: processing {:?} rating rows", rows.len());
    let mut sums: HashMap<String, (f64, usize)> = HashMap::new();
    for (party, rating) in rows.iter() {
        let e = sums.entry(party.clone()).or_insert((0.0, 0));
        e.0 += rating;
        e.1 += 1;
    }
    let mut means: Vec<PartyMean> = sums
        .into_iter()
        .map(|(party, (sum, n))| PartyMean {
            mean: sum / n as f64,
            samples: n,
            party,
        })
        .collect();
    means.sort_by(|a, b| (display_rank(&a.party), &a.party).cmp(&(display_rank(&b.party), &b.party)));
    means
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(rows: &[(&str, &str)]) -> Vec<(String, String)> {
        rows.iter()
            .map(|(p, c)| (p.to_string(), c.to_string()))
            .collect()
    }

    #[test]
    fn parse_rating_accepts_decimal_numerals() {
        assert_eq!(parse_rating("30"), Some(30.0));
        assert_eq!(parse_rating("30.5"), Some(30.5));
        assert_eq!(parse_rating("0"), Some(0.0));
        assert_eq!(parse_rating("0.0"), Some(0.0));
        assert_eq!(parse_rating("100.0"), Some(100.0));
    }

    #[test]
    fn parse_rating_rejects_everything_else() {
        for cell in ["", "N/A", "エラー", "-5", "+5", "3e4", "1.2.3", "12.3%", " 30", "."] {
            assert_eq!(parse_rating(cell), None, "cell {:?}", cell);
        }
    }

    #[test]
    fn filter_reports_rejected_count() {
        let rows = raw(&[("自民党", "30.0"), ("自民党", "エラー"), ("公明党", "4.5")]);
        let (valid, rejected) = filter_numeric_rows(&rows);
        assert_eq!(rejected, 1);
        assert_eq!(
            valid,
            vec![("自民党".to_string(), 30.0), ("公明党".to_string(), 4.5)]
        );
    }

    #[test]
    fn invalid_cells_do_not_affect_the_mean() {
        // Two tables for 自民党 with ratings [30.0, "N/A", 34.0]: the
        // invalid entry is excluded from both the mean and the count.
        let rows = raw(&[("自民党", "30.0"), ("自民党", "N/A"), ("自民党", "34.0")]);
        let (valid, rejected) = filter_numeric_rows(&rows);
        assert_eq!(rejected, 1);
        let means = aggregate(&valid);
        assert_eq!(means.len(), 1);
        assert_eq!(means[0].party, "自民党");
        assert_eq!(means[0].mean, 32.0);
        assert_eq!(means[0].samples, 2);
    }

    #[test]
    fn aggregation_order_is_canonical_regardless_of_input_order() {
        let rows: Vec<(String, f64)> = vec![
            ("支持なし".to_string(), 40.0),
            ("立憲民主党".to_string(), 10.0),
            ("自民党".to_string(), 30.0),
            ("公明党".to_string(), 4.0),
        ];
        let means = aggregate(&rows);
        let order: Vec<&str> = means.iter().map(|m| m.party.as_str()).collect();
        assert_eq!(order, vec!["自民党", "公明党", "立憲民主党", "支持なし"]);
    }

    #[test]
    fn unknown_categories_are_appended_after_known_ones() {
        let rows: Vec<(String, f64)> = vec![
            ("新党B".to_string(), 2.0),
            ("支持なし".to_string(), 40.0),
            ("新党A".to_string(), 1.0),
        ];
        let means = aggregate(&rows);
        let order: Vec<&str> = means.iter().map(|m| m.party.as_str()).collect();
        assert_eq!(order, vec!["支持なし", "新党A", "新党B"]);
    }

    #[test]
    fn means_cover_multiple_groups() {
        let rows: Vec<(String, f64)> = vec![
            ("自民党".to_string(), 28.0),
            ("自民党".to_string(), 32.0),
            ("自民党".to_string(), 36.0),
            ("共産党".to_string(), 3.0),
        ];
        let means = aggregate(&rows);
        assert_eq!(means[0].mean, 32.0);
        assert_eq!(means[0].samples, 3);
        assert_eq!(means[1].party, "共産党");
        assert_eq!(means[1].samples, 1);
    }
}
