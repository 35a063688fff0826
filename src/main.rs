use clap::Parser;
use log::warn;
use snafu::ErrorCompat;

mod args;
mod survey;

use crate::args::{Args, Command};

fn main() {
    let args = Args::parse();
    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let res = match args.command {
        Command::Entry { config, out_dir } => survey::run_entry(&config, out_dir.as_deref()),
        Command::Average { input, chart } => survey::run_average(&input, &chart),
        Command::TimeSeries {
            input,
            party,
            chart,
        } => survey::run_time_series(&input, &party, &chart),
    };

    if let Err(e) = res {
        warn!("Error occured {:?}", e);
        eprintln!("An error occured {}", e);
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}
