use crate::survey::*;

use log::debug;
use serde::{Deserialize, Serialize};
use snafu::prelude::*;
use std::collections::HashMap;
use std::fs;

/// One survey's worth of manual input, read from a JSON sheet.
///
/// Parties absent from `ratings` default to 0.0; the survey date uses
/// the `YYYY-MM-DD` notation.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct EntrySheetConfig {
    pub source: String,
    #[serde(rename = "surveyDate")]
    pub survey_date: String,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    pub ratings: HashMap<String, f64>,
}

pub fn read_entry_sheet(path: &str) -> SurveyResult<EntrySheetConfig> {
    let contents = fs::read_to_string(path).context(OpeningSheetSnafu { path })?;
    debug!("read content: {:?}", contents);
    let cfg: EntrySheetConfig =
        serde_json::from_str(contents.as_str()).context(ParsingSheetSnafu { path })?;
    Ok(cfg)
}
