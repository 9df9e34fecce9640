//! Turn scheduling, sessions and event reporting.
//!
//! This module drives the [`core`](crate::core) data model through endless
//! random games:
//!
//! - [`RandomWalkScheduler`] - one random move per step for the side to move
//! - [`GameSession`] - a board playing from the starting layout until the game ends
//! - [`Simulation`] - several boards taking turns, reshuffled every round
//! - [`PathGenerator`] - disjoint decorative lines for the intro
//! - [`EventSink`] - receives moves, captures and phase changes with their timings
//!
//! # Session Flow
//!
//! 1. Old trails fade out (if any), then the pieces fade in
//! 2. White moves first; each step picks a random movable piece and destination
//! 3. The clock advances by the move duration plus the inter-step gap
//! 4. The session ends when a king is captured, the side to move is stuck,
//!    or the step ceiling is reached
//! 5. The pieces fade out and the next session starts at the final delay
//!
//! # Example
//!
//! ```
//! use rerematch_engine::{EventLog, GameSession, SessionConfig};
//!
//! let mut session = GameSession::new(SessionConfig::default());
//! let mut log = EventLog::default();
//! let summary = session.play(0, &mut log);
//!
//! println!("{} moves, {}", summary.steps, summary.end);
//! ```

pub use self::{
    event::*, game_session::*, path_generator::*, scheduler::*, simulation::*, timing::*,
};

mod event;
mod game_session;
mod path_generator;
mod scheduler;
mod simulation;
mod timing;
