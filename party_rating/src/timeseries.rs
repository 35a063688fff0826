// ********* Time-series reshaping ***********

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::NaiveDate;
use log::debug;

use crate::config::display_rank;

/// One (date, category, rating) row from a history file.
#[derive(PartialEq, Debug, Clone)]
pub struct TrendObservation {
    pub survey_date: NaiveDate,
    pub party: String,
    pub rating: f64,
}

/// One column of the pivoted table: a category and its value for each
/// date in [`TimeSeries::dates`], `None` where the category has no
/// observation on that date.
#[derive(PartialEq, Debug, Clone)]
pub struct TrendColumn {
    pub party: String,
    pub values: Vec<Option<f64>>,
}

/// Date-indexed table, one column per selected category. Dates are in
/// ascending order; columns are in canonical display order.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct TimeSeries {
    pub dates: Vec<NaiveDate>,
    pub columns: Vec<TrendColumn>,
}

impl TimeSeries {
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty() || self.columns.is_empty()
    }

    /// Largest cell value across all columns, for the chart y-axis.
    pub fn max_value(&self) -> Option<f64> {
        self.columns
            .iter()
            .flat_map(|c| c.values.iter().flatten())
            .fold(None, |acc, &v| Some(acc.map_or(v, |a: f64| a.max(v))))
    }
}

/// Pivots raw observations into a date-indexed table restricted to the
/// selected categories.
///
/// Duplicate (date, category) rows are averaged, not overwritten.
/// Selected categories absent from the data get no column; the column
/// order is the canonical display order, not the selection order.
pub fn pivot(observations: &[TrendObservation], selection: &[String]) -> TimeSeries {
    let selected: HashSet<&str> = selection.iter().map(|s| s.as_str()).collect();

    let mut dates: BTreeSet<NaiveDate> = BTreeSet::new();
    let mut cells: HashMap<(String, NaiveDate), (f64, usize)> = HashMap::new();
    for obs in observations
        .iter()
        .filter(|o| selected.contains(o.party.as_str()))
    {
        dates.insert(obs.survey_date);
        let e = cells
            .entry((obs.party.clone(), obs.survey_date))
            .or_insert((0.0, 0));
        e.0 += obs.rating;
        e.1 += 1;
    }
    let dates: Vec<NaiveDate> = dates.into_iter().collect();

    let mut parties: Vec<String> = {
        let uniq: HashSet<&String> = cells.keys().map(|(p, _)| p).collect();
        uniq.into_iter().cloned().collect()
    };
    parties.sort_by(|a, b| (display_rank(a), a).cmp(&(display_rank(b), b)));
    debug!(
        "pivot: {:?} dates, columns in display order: {:?}",
        dates.len(),
        parties
    );

    let columns: Vec<TrendColumn> = parties
        .into_iter()
        .map(|party| {
            let values = dates
                .iter()
                .map(|d| {
                    cells
                        .get(&(party.clone(), *d))
                        .map(|(sum, n)| sum / *n as f64)
                })
                .collect();
            TrendColumn { party, values }
        })
        .collect();

    TimeSeries { dates, columns }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(date: (i32, u32, u32), party: &str, rating: f64) -> TrendObservation {
        TrendObservation {
            survey_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            party: party.to_string(),
            rating,
        }
    }

    fn sel(parties: &[&str]) -> Vec<String> {
        parties.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn duplicate_snapshots_are_averaged() {
        let ts = pivot(
            &[
                obs((2024, 1, 1), "自民党", 30.0),
                obs((2024, 1, 1), "自民党", 34.0),
            ],
            &sel(&["自民党"]),
        );
        assert_eq!(ts.dates.len(), 1);
        assert_eq!(ts.columns.len(), 1);
        assert_eq!(ts.columns[0].values, vec![Some(32.0)]);
    }

    #[test]
    fn dates_are_sorted_ascending() {
        let ts = pivot(
            &[
                obs((2024, 3, 1), "自民党", 31.0),
                obs((2024, 1, 1), "自民党", 30.0),
                obs((2024, 2, 1), "自民党", 29.0),
            ],
            &sel(&["自民党"]),
        );
        let expected: Vec<NaiveDate> = [(2024, 1, 1), (2024, 2, 1), (2024, 3, 1)]
            .iter()
            .map(|&(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
            .collect();
        assert_eq!(ts.dates, expected);
        assert_eq!(ts.columns[0].values, vec![Some(30.0), Some(29.0), Some(31.0)]);
    }

    #[test]
    fn columns_follow_display_order_not_selection_order() {
        let ts = pivot(
            &[
                obs((2024, 1, 1), "立憲民主党", 10.0),
                obs((2024, 1, 1), "自民党", 30.0),
                obs((2024, 1, 1), "公明党", 4.0),
            ],
            &sel(&["立憲民主党", "自民党", "公明党"]),
        );
        let order: Vec<&str> = ts.columns.iter().map(|c| c.party.as_str()).collect();
        assert_eq!(order, vec!["自民党", "公明党", "立憲民主党"]);
    }

    #[test]
    fn unselected_parties_are_excluded() {
        let ts = pivot(
            &[
                obs((2024, 1, 1), "自民党", 30.0),
                obs((2024, 1, 1), "共産党", 3.0),
            ],
            &sel(&["自民党"]),
        );
        assert_eq!(ts.columns.len(), 1);
        assert_eq!(ts.columns[0].party, "自民党");
        // The unselected party's dates do not leak into the index.
        assert_eq!(ts.dates.len(), 1);
    }

    #[test]
    fn missing_date_party_pairs_are_none() {
        let ts = pivot(
            &[
                obs((2024, 1, 1), "自民党", 30.0),
                obs((2024, 2, 1), "自民党", 31.0),
                obs((2024, 2, 1), "立憲民主党", 9.0),
            ],
            &sel(&["自民党", "立憲民主党"]),
        );
        let rikken = ts.columns.iter().find(|c| c.party == "立憲民主党").unwrap();
        assert_eq!(rikken.values, vec![None, Some(9.0)]);
        assert_eq!(ts.max_value(), Some(31.0));
    }

    #[test]
    fn empty_selection_yields_empty_table() {
        let ts = pivot(&[obs((2024, 1, 1), "自民党", 30.0)], &sel(&[]));
        assert!(ts.is_empty());
        assert_eq!(ts.max_value(), None);
    }
}
