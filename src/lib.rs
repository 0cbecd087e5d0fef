//! Advent of Code 2016 solutions: day 1 (taxicab walk), day 4 (room checksums)
//! and day 10 (balance bots).
//!
//! Every day exposes `run(path, should_print)`, which reads the puzzle input
//! and returns both answers.

use std::fmt::Display;
use std::path::Path;

pub mod day1;
pub mod day10;
pub mod day4;
pub mod error;

pub use error::{Error, Result};

/// Prints both answers in the `Part N: answer` form.
pub fn report(part1: impl Display, part2: impl Display) {
    println!("Part 1: {part1}");
    println!("Part 2: {part2}");
}

fn answers<A: Display, B: Display>((a, b): (A, B)) -> (String, String) {
    (a.to_string(), b.to_string())
}

pub fn run_day(day: u8, path: &Path, should_print: bool) -> Result<(String, String)> {
    match day {
        1 => day1::run(path, should_print).map(answers),
        4 => day4::run(path, should_print).map(answers),
        10 => day10::run(path, should_print).map(answers),
        _ => Err(Error::UnknownDay(day)),
    }
}
