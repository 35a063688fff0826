use clap::{Parser, Subcommand};

/// This is an approval-rating survey recording and charting program.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Command,

    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Records one survey's ratings from a JSON sheet, derives その他 and exports the result to CSV.
    Entry {
        /// (file path) The JSON sheet with the source, the survey date and the per-party ratings.
        /// See the documentation for the expected fields.
        #[clap(short, long, value_parser)]
        config: String,

        /// (directory path, optional) Where to write the exported CSV. Setting this option overrides
        /// the directory that may be specified in the sheet. Defaults to the current directory.
        #[clap(short, long, value_parser)]
        out_dir: Option<String>,
    },

    /// Averages previously exported CSV files per party and draws the bar chart.
    Average {
        /// (file path, repeated) An exported CSV file to include in the average.
        #[clap(short, long, value_parser, required = true)]
        input: Vec<String>,

        /// (file path) Where to write the bar chart.
        #[clap(long, value_parser, default_value = "average_ratings.png")]
        chart: String,
    },

    /// Plots the per-party rating trend from a CSV or Excel history file.
    TimeSeries {
        /// (file path) The history file. Excel input is detected from the `.xlsx` extension.
        #[clap(short, long, value_parser)]
        input: String,

        /// (repeated or not specified) A party to plot. If not specified, the three main
        /// parties are plotted.
        #[clap(short, long, value_parser)]
        party: Vec<String>,

        /// (file path) Where to write the line chart.
        #[clap(long, value_parser, default_value = "rating_trend.png")]
        chart: String,
    },
}
