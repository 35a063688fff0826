// Reading the time-series history from an Excel workbook.

use calamine::{open_workbook, DataType, Reader, Xlsx};
use chrono::{Duration, NaiveDate};
use log::debug;
use snafu::prelude::*;

use party_rating::TrendObservation;

use crate::survey::io_csv::{COL_DATE, COL_PARTY, COL_RATING};
use crate::survey::*;

fn excel_header_index(header: &[DataType], column: &str, path: &str) -> SurveyResult<usize> {
    header
        .iter()
        .position(|cell| match cell {
            DataType::String(s) => s.trim_start_matches('\u{feff}') == column,
            _ => false,
        })
        .context(MissingColumnSnafu { column, path })
}

/// Converts an Excel day serial (days since 1899-12-30) to a date.
/// Fractional parts carry the time of day and are truncated.
fn date_from_serial(serial: f64) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|base| base.checked_add_signed(Duration::days(serial as i64)))
}

/// Interprets one worksheet row. `Ok(None)` drops the row (empty or
/// non-numeric rating, no party label), mirroring the CSV reader; an
/// uninterpretable survey date cell is an error.
fn trend_row(
    row: &[DataType],
    indices: (usize, usize, usize),
    path: &str,
) -> SurveyResult<Option<TrendObservation>> {
    let (date_idx, party_idx, rating_idx) = indices;
    let rating = match row.get(rating_idx) {
        Some(DataType::Float(f)) => *f,
        Some(DataType::Int(i)) => *i as f64,
        Some(DataType::String(s)) => match party_rating::parse_rating(s) {
            Some(r) => r,
            None => return Ok(None),
        },
        // Empty or unreadable rating: drop the row.
        _ => return Ok(None),
    };
    let party = match row.get(party_idx) {
        Some(DataType::String(s)) => s.clone(),
        _ => return Ok(None),
    };
    let survey_date = match row.get(date_idx) {
        Some(DataType::String(s)) => parse_survey_date(s)?,
        // Date-formatted cells arrive as day serials.
        Some(DataType::DateTime(serial)) => match date_from_serial(*serial) {
            Some(d) => d,
            None => whatever!("survey date serial {} is out of range in {}", serial, path),
        },
        Some(DataType::Float(serial)) => match date_from_serial(*serial) {
            Some(d) => d,
            None => whatever!("survey date serial {} is out of range in {}", serial, path),
        },
        cell => whatever!("unsupported survey date cell {:?} in {}", cell, path),
    };
    Ok(Some(TrendObservation {
        survey_date,
        party,
        rating,
    }))
}

/// Reads the (date, category, rating) rows from the first worksheet.
/// The first row must be the header. Rows with an empty or non-numeric
/// rating cell are dropped, as in the CSV reader.
pub fn read_trend_rows(path: &str) -> SurveyResult<Vec<TrendObservation>> {
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let wrange = workbook
        .worksheet_range_at(0)
        .context(EmptyExcelSnafu { path })?
        .context(OpeningExcelSnafu { path })?;

    let mut iter = wrange.rows();
    let header = iter.next().context(EmptyExcelSnafu { path })?;
    debug!("header: {:?}", header);
    let date_idx = excel_header_index(header, COL_DATE, path)?;
    let party_idx = excel_header_index(header, COL_PARTY, path)?;
    let rating_idx = excel_header_index(header, COL_RATING, path)?;

    let mut rows: Vec<TrendObservation> = Vec::new();
    for row in iter {
        debug!("workbook: {:?}", row);
        if let Some(obs) = trend_row(row, (date_idx, party_idx, rating_idx), path)? {
            rows.push(obs);
        }
    }
    Ok(rows)
}
