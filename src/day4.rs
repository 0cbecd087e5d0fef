//! Day 4: Security Through Obscurity

use std::cmp::Reverse;
use std::path::Path;
use std::sync::LazyLock;

use itertools::Itertools;
use regex::Regex;
use tracing::info;

use crate::error::{Error, Result};

static ROOM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-z-]+)-(\d+)\[([a-z]+)\]$").unwrap());

pub const STORAGE_ROOM: &str = "northpole object storage";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Room<'a> {
    pub name: &'a str,
    pub sector: u32,
    pub checksum: &'a str,
}

impl Room<'_> {
    /// The five most common letters of the name, ties broken alphabetically.
    pub fn expected_checksum(&self) -> String {
        let mut counts = [0u32; 26];
        for letter in self.name.bytes().filter(u8::is_ascii_lowercase) {
            counts[(letter - b'a') as usize] += 1;
        }
        (b'a'..=b'z')
            .zip(counts)
            .filter(|&(_, count)| count > 0)
            .sorted_by_key(|&(_, count)| Reverse(count))
            .take(5)
            .map(|(letter, _)| letter as char)
            .collect()
    }

    pub fn is_real(&self) -> bool {
        self.expected_checksum() == self.checksum
    }

    /// Rotates every letter forward by the sector id; dashes become spaces.
    pub fn decrypt(&self) -> String {
        let shift = (self.sector % 26) as u8;
        self.name
            .bytes()
            .map(|b| match b {
                b'-' => ' ',
                b => ((b - b'a' + shift) % 26 + b'a') as char,
            })
            .collect()
    }
}

/// Blank lines are skipped; anything else must be a room.
pub fn parse(input: &str) -> Result<Vec<Room<'_>>> {
    input
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .map(|(line, text)| {
            let caps = ROOM_RE.captures(text).ok_or_else(|| Error::parse(line, text))?;
            let (_, [name, sector, checksum]) = caps.extract();
            let sector = sector.parse().map_err(|_| Error::parse(line, text))?;
            Ok(Room { name, sector, checksum })
        })
        .collect()
}

pub fn part1(rooms: &[Room]) -> u64 {
    rooms.iter().filter(|room| room.is_real()).map(|room| u64::from(room.sector)).sum()
}

pub fn part2(rooms: &[Room], wanted: &str) -> Result<u32> {
    rooms
        .iter()
        .filter(|room| room.is_real())
        .find(|room| room.decrypt() == wanted)
        .map(|room| room.sector)
        .ok_or_else(|| Error::RoomNotFound(wanted.to_owned()))
}

pub fn run(path: impl AsRef<Path>, should_print: bool) -> Result<(u64, u32)> {
    let input = std::fs::read_to_string(path)?;
    let rooms = parse(&input)?;
    let real = rooms.iter().filter(|room| room.is_real()).count();
    info!(rooms = rooms.len(), real, "parsed rooms");
    let (part1, part2) = (part1(&rooms), part2(&rooms, STORAGE_ROOM)?);
    if should_print {
        crate::report(part1, part2);
    }
    Ok((part1, part2))
}
