//! Day 1: No Time for a Taxicab

use std::path::Path;

use rustc_hash::FxHashSet;
use tracing::{debug, info};

use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Turn {
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Heading {
    North,
    East,
    South,
    West,
}

impl Heading {
    pub fn turn(self, turn: Turn) -> Heading {
        use Heading::*;
        match (self, turn) {
            (North, Turn::Right) | (South, Turn::Left) => East,
            (East, Turn::Right) | (West, Turn::Left) => South,
            (South, Turn::Right) | (North, Turn::Left) => West,
            (West, Turn::Right) | (East, Turn::Left) => North,
        }
    }

    fn offset(self) -> (i64, i64) {
        match self {
            Heading::North => (0, 1),
            Heading::East => (1, 0),
            Heading::South => (0, -1),
            Heading::West => (-1, 0),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i64,
    pub y: i64,
}

impl Position {
    /// Blocks away from the origin along the street grid.
    pub fn distance(self) -> u64 {
        self.x.unsigned_abs() + self.y.unsigned_abs()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Step {
    pub turn: Turn,
    pub blocks: u32,
}

/// Parses `R2, L3, ...`. Errors carry the 1-based position of the step.
pub fn parse(input: &str) -> Result<Vec<Step>> {
    input
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .enumerate()
        .map(|(index, token)| {
            let bad = || Error::step(index + 1, token);
            let turn = match token.as_bytes()[0] {
                b'L' => Turn::Left,
                b'R' => Turn::Right,
                _ => return Err(bad()),
            };
            let blocks = token[1..].parse().map_err(|_| bad())?;
            Ok(Step { turn, blocks })
        })
        .collect()
}

/// Every block the walker passes through, starting at the origin facing
/// north. The origin itself is not yielded.
pub fn blocks(steps: &[Step]) -> impl Iterator<Item = Position> + '_ {
    steps
        .iter()
        .scan((Position::default(), Heading::North), |(pos, heading), step| {
            *heading = heading.turn(step.turn);
            let (dx, dy) = heading.offset();
            let start = *pos;
            let n = i64::from(step.blocks);
            *pos = Position { x: start.x + dx * n, y: start.y + dy * n };
            debug!(?heading, blocks = step.blocks, x = pos.x, y = pos.y, "walk");
            Some((1..=n).map(move |i| Position { x: start.x + dx * i, y: start.y + dy * i }))
        })
        .flatten()
}

pub fn part1(steps: &[Step]) -> u64 {
    blocks(steps).last().unwrap_or_default().distance()
}

pub fn part2(steps: &[Step]) -> Result<u64> {
    let mut seen = FxHashSet::default();
    blocks(steps).find(|&pos| !seen.insert(pos)).map(Position::distance).ok_or(Error::NoRevisit)
}

pub fn run(path: impl AsRef<Path>, should_print: bool) -> Result<(u64, u64)> {
    let input = std::fs::read_to_string(path)?;
    let steps = parse(&input)?;
    info!(steps = steps.len(), "parsed directions");
    let (part1, part2) = (part1(&steps), part2(&steps)?);
    if should_print {
        crate::report(part1, part2);
    }
    Ok((part1, part2))
}
