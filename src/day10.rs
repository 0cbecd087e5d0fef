//! Day 10: Balance Bots
//!
//! Every bot holds at most two values. Once it holds two it hands the lower one
//! to its low target and the higher one to its high target, each of which is
//! either another bot or an output bin. Values keep moving until no bot holds
//! two of them.

use std::collections::VecDeque;
use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use arrayvec::ArrayVec;
use itertools::Itertools;
use regex::Regex;
use rustc_hash::FxHashMap;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

static VALUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^value (\d+) goes to bot (\d+)$").unwrap());
static WIRE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^bot (\d+) gives low to (bot|output) (\d+) and high to (bot|output) (\d+)$")
        .unwrap()
});

/// Where a bot sends one of its values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Target {
    Bot(u32),
    Output(u32),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Bot(id) => write!(f, "bot {id}"),
            Target::Output(id) => write!(f, "output {id}"),
        }
    }
}

/// `value V goes to bot B`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Assign {
    pub value: u32,
    pub bot: u32,
}

/// `bot B gives low to L and high to H`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Wire {
    pub bot: u32,
    pub low: Target,
    pub high: Target,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instruction {
    Assign(Assign),
    Wire(Wire),
}

/// Parsed input, split by instruction kind and kept in input order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Commands {
    pub assignments: Vec<Assign>,
    pub wirings: Vec<Wire>,
}

/// Classifies one line by its leading word. `line` is the 1-based line number
/// reported on failure.
///
/// Lines starting with neither `value` nor `bot` yield `Ok(None)`.
pub fn parse_line(line: usize, text: &str) -> Result<Option<Instruction>> {
    let text = text.trim();
    let number = |s: &str| s.parse::<u32>().map_err(|_| Error::parse(line, text));
    let target = |kind: &str, id: &str| -> Result<Target> {
        let id = number(id)?;
        Ok(if kind == "bot" { Target::Bot(id) } else { Target::Output(id) })
    };

    match text.split_whitespace().next() {
        Some("value") => {
            let caps = VALUE_RE.captures(text).ok_or_else(|| Error::parse(line, text))?;
            Ok(Some(Instruction::Assign(Assign {
                value: number(&caps[1])?,
                bot: number(&caps[2])?,
            })))
        }
        Some("bot") => {
            let caps = WIRE_RE.captures(text).ok_or_else(|| Error::parse(line, text))?;
            Ok(Some(Instruction::Wire(Wire {
                bot: number(&caps[1])?,
                low: target(&caps[2], &caps[3])?,
                high: target(&caps[4], &caps[5])?,
            })))
        }
        _ => Ok(None),
    }
}

pub fn parse(input: &str) -> Result<Commands> {
    let mut commands = Commands::default();
    for (index, text) in input.lines().enumerate() {
        match parse_line(index + 1, text)? {
            Some(Instruction::Assign(assign)) => commands.assignments.push(assign),
            Some(Instruction::Wire(wire)) => commands.wirings.push(wire),
            None => (),
        }
    }
    Ok(commands)
}

/// A bot's current hand and its wiring. `targets` is `None` for a bot that was
/// only ever handed values and never wired.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bot {
    held: ArrayVec<u32, 2>,
    targets: Option<(Target, Target)>,
}

impl Bot {
    pub fn held(&self) -> &[u32] {
        &self.held
    }

    /// `(low, high)` targets, if wired.
    pub fn targets(&self) -> Option<(Target, Target)> {
        self.targets
    }

    pub fn is_full(&self) -> bool {
        self.held.is_full()
    }
}

/// Every bot keyed by id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Registry {
    bots: FxHashMap<u32, Bot>,
}

impl Registry {
    /// The result does not depend on how assignments and wirings interleave.
    pub fn build(assignments: &[Assign], wirings: &[Wire]) -> Result<Registry> {
        let mut registry = Registry::default();
        for wire in wirings {
            let bot = registry.bots.entry(wire.bot).or_default();
            if let Some((low, high)) = bot.targets.replace((wire.low, wire.high)) {
                warn!(bot = wire.bot, %low, %high, "bot wired twice, keeping the later wiring");
            }
        }
        for assign in assignments {
            registry.hold(assign.bot, assign.value)?;
        }
        Ok(registry)
    }

    pub fn get(&self, id: u32) -> Option<&Bot> {
        self.bots.get(&id)
    }

    pub fn len(&self) -> usize {
        self.bots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bots.is_empty()
    }

    /// Ids of bots currently holding two values, ascending.
    pub fn ready(&self) -> impl Iterator<Item = u32> + '_ {
        self.bots.iter().filter(|(_, bot)| bot.is_full()).map(|(&id, _)| id).sorted()
    }

    fn value_count(&self) -> usize {
        self.bots.values().map(|bot| bot.held.len()).sum()
    }

    /// Hands `value` to bot `id`, creating an unwired placeholder if needed.
    /// Returns whether the bot now holds two values.
    fn hold(&mut self, id: u32, value: u32) -> Result<bool> {
        let bot = self.bots.entry(id).or_default();
        bot.held.try_push(value).map_err(|_| Error::Overfull { bot: id, value })?;
        Ok(bot.is_full())
    }
}

/// One bot comparing two values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Firing {
    pub bot: u32,
    pub low: u32,
    pub high: u32,
}

/// Append-only log of firings, in the order they happened.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct History(Vec<Firing>);

impl History {
    pub fn iter(&self) -> impl Iterator<Item = &Firing> {
        self.0.iter()
    }

    pub fn for_bot(&self, bot: u32) -> impl Iterator<Item = &Firing> {
        self.0.iter().filter(move |firing| firing.bot == bot)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OutputBins(FxHashMap<u32, u32>);

impl OutputBins {
    pub fn get(&self, id: u32) -> Option<u32> {
        self.0.get(&id).copied()
    }

    /// `(bin, value)` pairs, ascending by bin.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.0.iter().map(|(&id, &value)| (id, value)).sorted()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Order in which bots that became ready are fired.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Schedule {
    #[default]
    Fifo,
    Lifo,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// The pair of values whose comparator is reported as part 1.
    pub compare: (u32, u32),
    /// Bins whose values are multiplied for part 2.
    pub outputs: Vec<u32>,
    pub schedule: Schedule,
    /// Firing cap. Defaults to injected values times bots, which no acyclic
    /// network can reach.
    pub max_firings: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            compare: (17, 61),
            outputs: vec![0, 1, 2],
            schedule: Schedule::Fifo,
            max_firings: None,
        }
    }
}

/// Final state of a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub registry: Registry,
    pub outputs: OutputBins,
    pub history: History,
}

/// Propagation state. `ready` holds each bot once per time it filled up.
pub struct Simulation {
    registry: Registry,
    outputs: OutputBins,
    history: History,
    ready: VecDeque<u32>,
    schedule: Schedule,
    limit: usize,
}

impl Simulation {
    pub fn new(registry: Registry, schedule: Schedule, max_firings: Option<usize>) -> Simulation {
        let limit = max_firings.unwrap_or_else(|| registry.value_count() * registry.len().max(1));
        Simulation {
            ready: registry.ready().collect(),
            registry,
            outputs: OutputBins::default(),
            history: History::default(),
            schedule,
            limit,
        }
    }

    /// Fires one ready bot. Returns `false` once no bot holds two values.
    pub fn step(&mut self) -> Result<bool> {
        let next = match self.schedule {
            Schedule::Fifo => self.ready.pop_front(),
            Schedule::Lifo => self.ready.pop_back(),
        };
        let Some(id) = next else { return Ok(false) };
        if self.history.len() >= self.limit {
            return Err(Error::NonTerminating(self.limit));
        }

        let bot = self.registry.bots.get_mut(&id).ok_or(Error::UnresolvedTarget(id))?;
        let (low_target, high_target) = bot.targets.ok_or(Error::UnresolvedTarget(id))?;
        let [a, b] = bot.held[..] else {
            return Err(Error::NotReady(id));
        };
        let (low, high) = (a.min(b), a.max(b));
        bot.held.clear();

        debug!(bot = id, low, high, %low_target, %high_target, "bot fires");
        self.history.0.push(Firing { bot: id, low, high });
        self.deliver(low, low_target)?;
        self.deliver(high, high_target)?;
        Ok(true)
    }

    pub fn run(&mut self) -> Result<()> {
        while self.step()? {}
        Ok(())
    }

    pub fn finish(self) -> Outcome {
        Outcome { registry: self.registry, outputs: self.outputs, history: self.history }
    }

    fn deliver(&mut self, value: u32, target: Target) -> Result<()> {
        match target {
            Target::Bot(id) => {
                if self.registry.hold(id, value)? {
                    self.ready.push_back(id);
                }
            }
            Target::Output(id) => {
                if let Some(previous) = self.outputs.0.insert(id, value) {
                    warn!(output = id, previous, value, "output bin written twice");
                }
            }
        }
        Ok(())
    }
}

/// Runs the network until it settles.
pub fn propagate(
    registry: Registry,
    schedule: Schedule,
    max_firings: Option<usize>,
) -> Result<Outcome> {
    let mut simulation = Simulation::new(registry, schedule, max_firings);
    simulation.run()?;
    Ok(simulation.finish())
}

/// The bot that compared `a` with `b`, in either order.
pub fn find_comparator(history: &History, a: u32, b: u32) -> Result<u32> {
    let (low, high) = (a.min(b), a.max(b));
    history
        .iter()
        .find(|firing| firing.low == low && firing.high == high)
        .map(|firing| firing.bot)
        .ok_or(Error::NotFound(a, b))
}

pub fn output_product(outputs: &OutputBins, ids: &[u32]) -> Result<u64> {
    ids.iter().try_fold(1u64, |product, &id| {
        let value = outputs.get(id).ok_or(Error::MissingOutput(id))?;
        product.checked_mul(u64::from(value)).ok_or_else(|| Error::Overflow(ids.to_vec()))
    })
}

pub fn solve(input: &str, config: &Config) -> Result<(u32, u64)> {
    let commands = parse(input)?;
    let registry = Registry::build(&commands.assignments, &commands.wirings)?;
    info!(
        assignments = commands.assignments.len(),
        wirings = commands.wirings.len(),
        bots = registry.len(),
        "parsed bot network"
    );

    let outcome = propagate(registry, config.schedule, config.max_firings)?;
    info!(firings = outcome.history.len(), outputs = outcome.outputs.len(), "network settled");

    let (a, b) = config.compare;
    let comparator = find_comparator(&outcome.history, a, b)?;
    let product = output_product(&outcome.outputs, &config.outputs)?;
    Ok((comparator, product))
}

pub fn run(path: impl AsRef<Path>, should_print: bool) -> Result<(u32, u64)> {
    let input = std::fs::read_to_string(path)?;
    let (part1, part2) = solve(&input, &Config::default())?;
    if should_print {
        crate::report(part1, part2);
    }
    Ok((part1, part2))
}

#[cfg(test)]
mod tests {
    use super::*;

    const WALKTHROUGH: &str = "value 5 goes to bot 2
bot 2 gives low to bot 1 and high to bot 0
value 3 goes to bot 1
bot 1 gives low to output 1 and high to bot 0
bot 0 gives low to output 0 and high to output 2
value 2 goes to bot 2";

    /// Bots 1 and 2 are ready at the same time and both feed bot 3.
    const FORK: &str = "value 1 goes to bot 1
value 2 goes to bot 1
value 3 goes to bot 2
value 4 goes to bot 2
bot 1 gives low to output 0 and high to bot 3
bot 2 gives low to bot 3 and high to output 1
bot 3 gives low to output 2 and high to output 3";

    fn outcome(input: &str, schedule: Schedule) -> Outcome {
        let commands = parse(input).unwrap();
        let registry = Registry::build(&commands.assignments, &commands.wirings).unwrap();
        propagate(registry, schedule, None).unwrap()
    }

    #[test]
    fn parses_both_grammars() {
        let commands = parse(WALKTHROUGH).unwrap();
        assert_eq!(commands.assignments, vec![
            Assign { value: 5, bot: 2 },
            Assign { value: 3, bot: 1 },
            Assign { value: 2, bot: 2 },
        ]);
        assert_eq!(
            commands.wirings[1],
            Wire { bot: 1, low: Target::Output(1), high: Target::Bot(0) }
        );
        assert_eq!(commands.wirings.len(), 3);
    }

    #[test]
    fn every_well_formed_line_parses() {
        let ids = [0, 7, 42, 209, 1_000_000, u32::MAX];
        let kinds = [("bot", Target::Bot as fn(u32) -> Target), ("output", Target::Output)];
        for (line, (a, b)) in ids.into_iter().cartesian_product(ids).enumerate() {
            let text = format!("value {a} goes to bot {b}");
            let assign = Assign { value: a, bot: b };
            assert_eq!(parse_line(line, &text).unwrap(), Some(Instruction::Assign(assign)));

            for c in ids {
                for ((low_kind, low), (high_kind, high)) in kinds.iter().cartesian_product(&kinds) {
                    let text =
                        format!("bot {a} gives low to {low_kind} {b} and high to {high_kind} {c}");
                    let wire = Wire { bot: a, low: low(b), high: high(c) };
                    assert_eq!(parse_line(line, &text).unwrap(), Some(Instruction::Wire(wire)));
                }
            }
        }
    }

    #[test]
    fn skips_unrecognised_lines() {
        let input = "\nhello there\noutput 3 is empty\n\
                     values 4 goes to bot 1\n  value 7 goes to bot 3  ";
        let commands = parse(input).unwrap();
        assert_eq!(commands.assignments, vec![Assign { value: 7, bot: 3 }]);
        assert!(commands.wirings.is_empty());
    }

    #[test]
    fn reports_truncated_commands() {
        let err = parse("value 1 goes to bot 2\nbot 1 gives low to bot 2").unwrap_err();
        let truncated = "bot 1 gives low to bot 2";
        assert!(matches!(err, Error::Parse { line: 2, ref text } if text == truncated));

        let err = parse("value x goes to bot 2").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 1, .. }));

        let err = parse("value 99999999999 goes to bot 2").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 1, .. }));
    }

    #[test]
    fn registry_ignores_instruction_order() {
        let commands = parse(WALKTHROUGH).unwrap();
        let forward = Registry::build(&commands.assignments, &commands.wirings).unwrap();
        let assignments = commands.assignments.iter().rev().copied().collect_vec();
        let wirings = commands.wirings.iter().rev().copied().collect_vec();
        let backward = Registry::build(&assignments, &wirings).unwrap();

        for id in 0..3 {
            let (f, b) = (forward.get(id).unwrap(), backward.get(id).unwrap());
            assert_eq!(f.targets(), b.targets());
            assert_eq!(
                f.held().iter().sorted().collect_vec(),
                b.held().iter().sorted().collect_vec()
            );
        }
        assert_eq!(forward.ready().collect_vec(), vec![2]);
    }

    #[test]
    fn unwired_bot_gets_placeholder() {
        let registry = Registry::build(&[Assign { value: 4, bot: 9 }], &[]).unwrap();
        let bot = registry.get(9).unwrap();
        assert_eq!(bot.held(), &[4]);
        assert_eq!(bot.targets(), None);
    }

    #[test]
    fn walkthrough() {
        let outcome = outcome(WALKTHROUGH, Schedule::Fifo);
        let firings = outcome.history.for_bot(2).collect_vec();
        assert_eq!(firings, vec![&Firing { bot: 2, low: 2, high: 5 }]);
        assert_eq!(outcome.outputs.iter().collect_vec(), vec![(0, 3), (1, 2), (2, 5)]);
        assert!((0..3).all(|id| outcome.registry.get(id).unwrap().held().is_empty()));
    }

    #[test]
    fn queries() {
        let outcome = outcome(WALKTHROUGH, Schedule::Fifo);
        assert_eq!(find_comparator(&outcome.history, 2, 5).unwrap(), 2);
        assert_eq!(find_comparator(&outcome.history, 5, 2).unwrap(), 2);
        assert_eq!(find_comparator(&outcome.history, 3, 5).unwrap(), 0);
        let missing = find_comparator(&outcome.history, 99, 100);
        assert!(matches!(missing, Err(Error::NotFound(99, 100))));

        assert_eq!(output_product(&outcome.outputs, &[0, 1, 2]).unwrap(), 30);
        assert!(matches!(output_product(&outcome.outputs, &[0, 7]), Err(Error::MissingOutput(7))));
    }

    #[test]
    fn huge_products_are_reported() {
        let input = "value 4000000000 goes to bot 0
value 3999999999 goes to bot 0
value 4000000001 goes to bot 1
value 4000000002 goes to bot 1
bot 0 gives low to output 0 and high to output 1
bot 1 gives low to output 2 and high to output 3";
        let config = Config { compare: (3999999999, 4000000000), ..Config::default() };
        let err = solve(input, &config).unwrap_err();
        assert!(matches!(err, Error::Overflow(ref ids) if ids == &[0, 1, 2]));

        let config = Config { outputs: vec![0, 1], ..config };
        assert_eq!(solve(input, &config).unwrap(), (0, 3_999_999_999u64 * 4_000_000_000));
    }

    #[test]
    fn solve_with_config() {
        let config = Config { compare: (2, 3), ..Config::default() };
        assert_eq!(solve(WALKTHROUGH, &config).unwrap(), (1, 30));
        assert!(matches!(solve(WALKTHROUGH, &Config::default()), Err(Error::NotFound(17, 61))));
    }

    #[test]
    fn low_goes_low_regardless_of_arrival() {
        let orders = [
            "value 9 goes to bot 0\nvalue 4 goes to bot 0",
            "value 4 goes to bot 0\nvalue 9 goes to bot 0",
        ];
        for input in orders {
            let input = format!("{input}\nbot 0 gives low to output 7 and high to output 3");
            let outcome = outcome(&input, Schedule::Fifo);
            assert_eq!(outcome.outputs.get(7), Some(4));
            assert_eq!(outcome.outputs.get(3), Some(9));
        }
    }

    #[test]
    fn firing_order_does_not_matter() {
        let fifo = outcome(FORK, Schedule::Fifo);
        let lifo = outcome(FORK, Schedule::Lifo);
        assert_ne!(fifo.history, lifo.history);
        assert_eq!(
            fifo.history.iter().sorted().collect_vec(),
            lifo.history.iter().sorted().collect_vec()
        );
        assert_eq!(fifo.outputs, lifo.outputs);
        assert_eq!(fifo.outputs.iter().collect_vec(), vec![(0, 1), (1, 4), (2, 2), (3, 3)]);
        assert_eq!(find_comparator(&fifo.history, 2, 3).unwrap(), 3);

        let walk_fifo = outcome(WALKTHROUGH, Schedule::Fifo);
        let walk_lifo = outcome(WALKTHROUGH, Schedule::Lifo);
        assert_eq!(walk_fifo.outputs, walk_lifo.outputs);
    }

    #[test]
    fn unresolved_target_fails_only_when_fired() {
        let dangling = "bot 0 gives low to bot 5 and high to output 0
value 1 goes to bot 0
value 2 goes to bot 0";
        let settled = outcome(dangling, Schedule::Fifo);
        assert_eq!(settled.registry.get(5).unwrap().held(), &[1]);
        assert_eq!(settled.outputs.get(0), Some(2));

        let input = format!("{dangling}\nvalue 7 goes to bot 5");
        let commands = parse(&input).unwrap();
        let registry = Registry::build(&commands.assignments, &commands.wirings).unwrap();
        let mut simulation = Simulation::new(registry, Schedule::Fifo, None);
        assert!(simulation.step().unwrap());
        assert!(matches!(simulation.step(), Err(Error::UnresolvedTarget(5))));
    }

    #[test]
    fn half_full_bot_cannot_fire() {
        let registry = Registry::build(&[Assign { value: 4, bot: 0 }], &[]).unwrap();
        let mut simulation = Simulation::new(registry, Schedule::Fifo, None);
        simulation.ready.push_back(0);
        simulation.registry.bots.get_mut(&0).unwrap().targets =
            Some((Target::Output(0), Target::Output(1)));
        assert!(matches!(simulation.step(), Err(Error::NotReady(0))));
        assert!(simulation.finish().history.is_empty());
    }

    #[test]
    fn third_value_is_rejected() {
        let input = "value 1 goes to bot 0\nvalue 2 goes to bot 0\nvalue 3 goes to bot 0";
        let commands = parse(input).unwrap();
        let err = Registry::build(&commands.assignments, &commands.wirings).unwrap_err();
        assert!(matches!(err, Error::Overfull { bot: 0, value: 3 }));
    }

    #[test]
    fn cycles_hit_the_firing_cap() {
        let input = "bot 0 gives low to bot 1 and high to bot 1
bot 1 gives low to bot 0 and high to bot 0
value 1 goes to bot 0
value 2 goes to bot 0";
        let commands = parse(input).unwrap();
        let registry = Registry::build(&commands.assignments, &commands.wirings).unwrap();
        let capped = propagate(registry.clone(), Schedule::Fifo, None);
        assert!(matches!(capped, Err(Error::NonTerminating(4))));
        let capped = propagate(registry, Schedule::Lifo, Some(10));
        assert!(matches!(capped, Err(Error::NonTerminating(10))));
    }
}
