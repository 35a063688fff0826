// Primitives for reading and writing the survey CSV files.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use snafu::prelude::*;

use party_rating::{EntrySheet, TrendObservation};

use crate::survey::*;

pub const COL_PARTY: &str = "政党";
pub const COL_RATING: &str = "支持率";
pub const COL_SOURCE: &str = "データソース";
pub const COL_DATE: &str = "調査日";

fn header_index(headers: &csv::StringRecord, column: &str, path: &str) -> SurveyResult<usize> {
    headers
        .iter()
        // The first header cell may carry the BOM of a previous export.
        .position(|h| h.trim_start_matches('\u{feff}') == column)
        .context(MissingColumnSnafu { column, path })
}

/// Reads the raw (category, rating-cell) pairs of one aggregation
/// input file. Rating cells are kept as strings; the numeric filter is
/// applied by the caller so that rejections stay observable.
pub fn read_rating_rows(path: &str) -> SurveyResult<Vec<(String, String)>> {
    let mut rdr = csv::ReaderBuilder::new()
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    let headers = rdr.headers().context(CsvOpenSnafu { path })?.clone();
    let party_idx = header_index(&headers, COL_PARTY, path)?;
    let rating_idx = header_index(&headers, COL_RATING, path)?;

    let mut rows: Vec<(String, String)> = Vec::new();
    for (idx, line_r) in rdr.records().enumerate() {
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { path })?;
        debug!("{:?} {:?}", lineno, line);
        let party = line
            .get(party_idx)
            .context(CsvLineTooShortSnafu { lineno, path })?;
        let rating = line
            .get(rating_idx)
            .context(CsvLineTooShortSnafu { lineno, path })?;
        rows.push((party.to_string(), rating.to_string()));
    }
    Ok(rows)
}

/// Reads the (date, category, rating) rows of a time-series history
/// file. Rows with an empty or non-numeric rating cell are dropped; an
/// unparseable survey date is an error.
pub fn read_trend_rows(path: &str) -> SurveyResult<Vec<TrendObservation>> {
    let mut rdr = csv::ReaderBuilder::new()
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    let headers = rdr.headers().context(CsvOpenSnafu { path })?.clone();
    let date_idx = header_index(&headers, COL_DATE, path)?;
    let party_idx = header_index(&headers, COL_PARTY, path)?;
    let rating_idx = header_index(&headers, COL_RATING, path)?;

    let mut rows: Vec<TrendObservation> = Vec::new();
    for (idx, line_r) in rdr.records().enumerate() {
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { path })?;
        let rating_cell = line
            .get(rating_idx)
            .context(CsvLineTooShortSnafu { lineno, path })?;
        let rating = match party_rating::parse_rating(rating_cell) {
            Some(r) => r,
            None => {
                debug!(
                    "read_trend_rows: {}:{} dropping row with rating cell {:?}",
                    path, lineno, rating_cell
                );
                continue;
            }
        };
        let party = line
            .get(party_idx)
            .context(CsvLineTooShortSnafu { lineno, path })?;
        let date_cell = line
            .get(date_idx)
            .context(CsvLineTooShortSnafu { lineno, path })?;
        let survey_date = parse_survey_date(date_cell.trim_start_matches('\u{feff}'))?;
        rows.push(TrendObservation {
            survey_date,
            party: party.to_string(),
            rating,
        });
    }
    Ok(rows)
}

/// Writes one entry sheet to `{out_dir}/支持率_{source}_{YYYYMMDD}.csv`
/// in UTF-8 with a BOM, one row per category. Re-exporting the same
/// survey overwrites the same file.
pub fn write_export(sheet: &EntrySheet, out_dir: &Path) -> SurveyResult<PathBuf> {
    let rows = match sheet.export_rows() {
        Some(rows) => rows,
        None => whatever!("cannot export a sheet whose ratings total exceeds 100%"),
    };
    let file_name = format!(
        "支持率_{}_{}.csv",
        sheet.source(),
        sheet.survey_date().format("%Y%m%d")
    );
    let path = out_dir.join(file_name);
    let date_cell = sheet.survey_date().format("%Y-%m-%d").to_string();

    let mut buf: Vec<u8> = vec![0xEF, 0xBB, 0xBF];
    {
        let mut wtr = csv::Writer::from_writer(&mut buf);
        wtr.write_record([COL_PARTY, COL_RATING, COL_SOURCE, COL_DATE])
            .context(CsvEncodeSnafu {})?;
        for (party, rating) in rows.iter() {
            let rating_cell = format!("{:.1}", rating);
            wtr.write_record([
                party.as_str(),
                rating_cell.as_str(),
                sheet.source(),
                date_cell.as_str(),
            ])
            .context(CsvEncodeSnafu {})?;
        }
        wtr.flush().context(ExportWriteSnafu {
            path: path.display().to_string(),
        })?;
    }
    fs::write(&path, buf).context(ExportWriteSnafu {
        path: path.display().to_string(),
    })?;
    info!("write_export: wrote {}", path.display());
    Ok(path)
}
