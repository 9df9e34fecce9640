//! Simulation core for an endless, rule-relaxed chess animation.
//!
//! Pieces wander an 8×8 grid, capture each other, promote, and restart
//! indefinitely. The engine decides *what* happens and *when*: every move is
//! reported as an event carrying an abstract start delay and duration, and a
//! renderer schedules the visuals on its own.
//!
//! - [`core`] - grid model, pieces, movement policies and the availability test
//! - [`engine`] - turn scheduler, game sessions, intro path generator and the
//!   multi-board simulation
pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// Coordinates that do not name a cell of the 8×8 board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("position ({x}, {y}) is outside the board")]
pub struct OutOfBoundsError {
    x: i16,
    y: i16,
}

impl OutOfBoundsError {
    #[must_use]
    pub const fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }
}

/// A piece was placed onto a cell that already holds one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("cell {position} is already occupied")]
pub struct CellOccupiedError {
    position: Position,
}

impl CellOccupiedError {
    #[must_use]
    pub const fn new(position: Position) -> Self {
        Self { position }
    }
}

/// A configured `[min, max]` range with `min > max`.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid {name} range: min {min} is greater than max {max}")]
pub struct InvalidRangeError {
    name: &'static str,
    min: String,
    max: String,
}

impl InvalidRangeError {
    pub(crate) fn new(name: &'static str, min: impl ToString, max: impl ToString) -> Self {
        Self {
            name,
            min: min.to_string(),
            max: max.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParseSeedError {
    #[display("invalid seed: expected 32 hex characters, got {_0}")]
    InvalidLength(#[error(not(source))] usize),
    #[display("invalid seed: {_0} is not a hex string")]
    InvalidHex(#[error(not(source))] String),
}
