use log::{debug, info, warn};

use party_rating::*;
use snafu::{prelude::*, Snafu};

use chrono::NaiveDate;
use std::path::Path;

pub mod charts;
pub mod config_reader;
pub mod io_csv;
pub mod io_excel;

use crate::survey::config_reader::read_entry_sheet;

#[derive(Debug, Snafu)]
pub enum SurveyError {
    #[snafu(display("Error opening entry sheet {path}"))]
    OpeningSheet {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing entry sheet {path}"))]
    ParsingSheet {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Cannot parse survey date {value}"))]
    ParsingDate {
        source: chrono::ParseError,
        value: String,
    },
    #[snafu(display("Invalid entry sheet"))]
    InvalidSheet { source: party_rating::EntryError },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading a CSV row in {path}"))]
    CsvLineParse { source: csv::Error, path: String },
    #[snafu(display("CSV row {lineno} in {path} is too short"))]
    CsvLineTooShort { lineno: usize, path: String },
    #[snafu(display("Error encoding the export CSV"))]
    CsvEncode { source: csv::Error },
    #[snafu(display("Error writing the export file {path}"))]
    ExportWrite {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error opening Excel file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Excel file {path} has no readable worksheet"))]
    EmptyExcel { path: String },
    #[snafu(display("File {path} is missing the required column {column}"))]
    MissingColumn { column: String, path: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type SurveyResult<T> = Result<T, SurveyError>;

pub(crate) fn parse_survey_date(value: &str) -> SurveyResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").context(ParsingDateSnafu { value })
}

/// Records one survey from a JSON sheet: validates the ratings, derives
/// その他 and, when the sheet is valid, exports it to CSV.
pub fn run_entry(config_path: &str, out_dir_override: Option<&str>) -> SurveyResult<()> {
    let cfg = read_entry_sheet(config_path)?;
    info!("entry sheet: {:?}", cfg);
    let survey_date = parse_survey_date(&cfg.survey_date)?;
    let sheet =
        EntrySheet::build(&cfg.source, survey_date, &cfg.ratings).context(InvalidSheetSnafu {})?;

    println!("Survey entry: {} ({})", sheet.source(), sheet.survey_date());
    for (party, cell) in sheet.display_cells() {
        println!("  {}\t{}", party, cell);
    }
    println!("Total excluding その他: {:.1}%", sheet.total());

    match sheet.other() {
        OtherOutcome::Overflow { total } => {
            warn!("entry total {} exceeds 100%, export disabled", total);
            println!(
                "The ratings total {:.1}% exceeds 100%: その他 cannot be derived and no CSV was written.",
                total
            );
        }
        OtherOutcome::Value(_) => {
            let out_dir = out_dir_override
                .or(cfg.output_directory.as_deref())
                .unwrap_or(".");
            let path = io_csv::write_export(&sheet, Path::new(out_dir))?;
            println!("Exported to {}", path.display());
        }
    }
    Ok(())
}

/// Averages any number of previously exported CSV files per party,
/// prints the table and draws the bar chart.
pub fn run_average(input_paths: &[String], chart_path: &str) -> SurveyResult<()> {
    let mut raw_rows: Vec<(String, String)> = Vec::new();
    for path in input_paths.iter() {
        let mut rows = io_csv::read_rating_rows(path)?;
        debug!("run_average: {:?} rows from {}", rows.len(), path);
        raw_rows.append(&mut rows);
    }

    let (valid, rejected) = filter_numeric_rows(&raw_rows);
    if rejected > 0 {
        info!("run_average: dropped {} non-numeric rating rows", rejected);
    }
    let means = aggregate(&valid);
    if means.is_empty() {
        whatever!("no valid rating rows found in the input files");
    }

    println!(
        "Average ratings over {} files ({} rows, {} dropped)",
        input_paths.len(),
        valid.len(),
        rejected
    );
    for m in means.iter() {
        println!("  {}\t{:.2}%\t({} samples)", m.party, m.mean, m.samples);
    }

    charts::draw_bar_chart(&means, chart_path)?;
    println!("Chart written to {}", chart_path);
    Ok(())
}

/// Plots the rating trend of the selected parties from a CSV or Excel
/// history file.
pub fn run_time_series(input_path: &str, parties: &[String], chart_path: &str) -> SurveyResult<()> {
    let selection: Vec<String> = if parties.is_empty() {
        DEFAULT_TREND_PARTIES.iter().map(|p| p.to_string()).collect()
    } else {
        parties.to_vec()
    };

    let observations = if input_path.ends_with(".xlsx") {
        io_excel::read_trend_rows(input_path)?
    } else {
        io_csv::read_trend_rows(input_path)?
    };
    info!(
        "run_time_series: {:?} observations from {}, plotting {:?}",
        observations.len(),
        input_path,
        selection
    );

    let series = pivot(&observations, &selection);
    if series.is_empty() {
        whatever!(
            "none of the selected parties {:?} have observations in {}",
            selection,
            input_path
        );
    }

    charts::draw_line_chart(&series, chart_path)?;
    println!("Chart written to {}", chart_path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("shijiritsu-{}-{}", std::process::id(), name))
    }

    fn build_sheet(pairs: &[(&str, f64)]) -> EntrySheet {
        let ratings = pairs
            .iter()
            .map(|(p, r)| (p.to_string(), *r))
            .collect::<std::collections::HashMap<String, f64>>();
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        EntrySheet::build("NHK", date, &ratings).unwrap()
    }

    #[test]
    fn export_then_average_round_trip() {
        let dir = temp_path("round-trip");
        fs::create_dir_all(&dir).unwrap();

        let sheet = build_sheet(&[("自民党", 35.0), ("立憲民主党", 10.0)]);
        let path = io_csv::write_export(&sheet, &dir).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "支持率_NHK_20240101.csv"
        );

        // The exported file starts with a BOM and round-trips through
        // the aggregation reader.
        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[..3], &[0xEF, 0xBB, 0xBF]);

        let rows = io_csv::read_rating_rows(path.to_str().unwrap()).unwrap();
        assert_eq!(rows.len(), 13);
        let (valid, rejected) = filter_numeric_rows(&rows);
        assert_eq!(rejected, 0);
        let means = aggregate(&valid);
        assert_eq!(means[0].party, "自民党");
        assert_eq!(means[0].mean, 35.0);
        let other = means.iter().find(|m| m.party == OTHER_PARTY).unwrap();
        assert_eq!(other.mean, 55.0);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_rating_column_is_a_structural_error() {
        let path = temp_path("missing-column.csv");
        fs::write(&path, "政党,データソース\n自民党,NHK\n").unwrap();
        let res = io_csv::read_rating_rows(path.to_str().unwrap());
        match res {
            Err(SurveyError::MissingColumn { column, .. }) => assert_eq!(column, "支持率"),
            other => panic!("expected a missing-column error, got {:?}", other),
        }
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn trend_reader_drops_rows_without_ratings() {
        let path = temp_path("trend.csv");
        fs::write(
            &path,
            "調査日,政党,支持率\n2024-01-01,自民党,30.0\n2024-01-01,自民党,34.0\n2024-01-08,自民党,\n",
        )
        .unwrap();
        let observations = io_csv::read_trend_rows(path.to_str().unwrap()).unwrap();
        assert_eq!(observations.len(), 2);

        let series = pivot(&observations, &["自民党".to_string()]);
        assert_eq!(series.dates.len(), 1);
        assert_eq!(series.columns[0].values, vec![Some(32.0)]);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn trend_reader_rejects_bad_dates() {
        let path = temp_path("trend-bad-date.csv");
        fs::write(&path, "調査日,政党,支持率\nnot-a-date,自民党,30.0\n").unwrap();
        let res = io_csv::read_trend_rows(path.to_str().unwrap());
        assert!(matches!(res, Err(SurveyError::ParsingDate { .. })));
        fs::remove_file(&path).unwrap();
    }
}
