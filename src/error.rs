//! Errors shared by all of the puzzle solvers

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse line {line}: {text:?}")]
    Parse { line: usize, text: String },
    #[error("cannot parse step {index}: {text:?}")]
    Step { index: usize, text: String },
    #[error("bot {0} has no wiring instruction")]
    UnresolvedTarget(u32),
    #[error("bot {bot} already holds two values, cannot take {value}")]
    Overfull { bot: u32, value: u32 },
    #[error("bot {0} was fired without holding two values")]
    NotReady(u32),
    #[error("no bot ever compared {0} with {1}")]
    NotFound(u32, u32),
    #[error("output bin {0} never received a value")]
    MissingOutput(u32),
    #[error("product of output bins {0:?} does not fit in 64 bits")]
    Overflow(Vec<u32>),
    #[error("propagation did not settle within {0} firings")]
    NonTerminating(usize),
    #[error("no position was visited twice")]
    NoRevisit,
    #[error("no real room is named {0:?}")]
    RoomNotFound(String),
    #[error("day {0} is not solved here")]
    UnknownDay(u8),
}

impl Error {
    pub(crate) fn parse(line: usize, text: &str) -> Self {
        Error::Parse {
            line,
            text: text.to_owned(),
        }
    }

    pub(crate) fn step(index: usize, text: &str) -> Self {
        Error::Step {
            index,
            text: text.to_owned(),
        }
    }
}
