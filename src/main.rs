use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::{Arg, ArgAction, Command};
use tracing::{error, info};

const VERBOSE_FLAG: &str = "verbose";
const QUIET_FLAG: &str = "quiet";

fn main() -> ExitCode {
    let matches = Command::new("aoc2016")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Advent of Code 2016 solutions.")
        .arg(
            Arg::new("day")
                .required(true)
                .help("Day number")
                .value_parser(clap::value_parser!(u8)),
        )
        .arg(
            Arg::new("test")
                .long("test")
                .help("Read the example input day<N>test<M>.in instead of day<N>.in")
                .value_parser(clap::value_parser!(u8)),
        )
        .arg(
            Arg::new("input")
                .long("input")
                .help("Path to the input file")
                .conflicts_with("test")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new(QUIET_FLAG)
                .short('q')
                .long(QUIET_FLAG)
                .help("Do not print the answers")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(VERBOSE_FLAG)
                .short('v')
                .long(VERBOSE_FLAG)
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let level = if matches.get_flag(VERBOSE_FLAG) {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let day = *matches.get_one::<u8>("day").unwrap();
    let path = match (matches.get_one::<PathBuf>("input"), matches.get_one::<u8>("test")) {
        (Some(path), _) => path.clone(),
        (None, Some(test)) => PathBuf::from(format!("day{day}test{test}.in")),
        (None, None) => PathBuf::from(format!("day{day}.in")),
    };

    let time = Instant::now();
    match aoc2016::run_day(day, &path, !matches.get_flag(QUIET_FLAG)) {
        Ok(_) => {
            info!(day, elapsed = ?time.elapsed(), "solved");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(day, path = %path.display(), error = %e, "failed to solve");
            ExitCode::FAILURE
        }
    }
}
