use rand::{Rng as _, SeedableRng as _, seq::IndexedRandom as _};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::{Grid, PieceId, PieceKind};

use super::{
    event::{CaptureEvent, EventSink, MoveEvent},
    timing::{InclusiveRange, SessionConfig, SimulationSeed},
};

/// Why a session stopped.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::IsVariant,
)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// A king was captured.
    #[display("king captured")]
    KingCaptured,
    /// No piece of the side to move had a legal destination.
    #[display("no movable piece")]
    NoMovablePiece,
    /// The session reached its step ceiling.
    #[display("step ceiling reached")]
    StepCeiling,
}

/// Scheduler state across and within steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum SchedulerState {
    /// Picking a piece of the side to move.
    Selecting,
    /// Choosing and applying one of the picked piece's candidates.
    Resolving,
    /// The last step produced a move; the game goes on.
    Continuing,
    /// The game is over; no further moves until [`RandomWalkScheduler::reset`].
    Ended(EndReason),
}

/// Result of one [`RandomWalkScheduler::step`].
#[derive(Debug, Clone, PartialEq, Eq, derive_more::IsVariant)]
pub enum StepOutcome {
    Continuing(MoveEvent),
    Ended(EndReason),
}

/// Plays one random move per step for the side to move.
///
/// A step draws a move duration, then tries the side's pieces in uniformly
/// random order. Each piece is tried at most once per step; the first piece
/// with any candidate moves to one of them, chosen uniformly. A step thus
/// terminates after at most as many attempts as the side has pieces.
///
/// # Example
///
/// ```
/// use rerematch_engine::{GameSession, RandomWalkScheduler, SessionConfig, StepOutcome};
///
/// let mut grid = GameSession::initial_grid(0);
/// let mut scheduler = RandomWalkScheduler::new(&SessionConfig::default());
///
/// let outcome = scheduler.step(&mut grid, ());
/// assert!(matches!(outcome, StepOutcome::Continuing(_)));
/// ```
#[derive(Debug, Clone)]
pub struct RandomWalkScheduler {
    rng: Pcg32,
    speed: InclusiveRange<u64>,
    inter_step_gap: u64,
    state: SchedulerState,
}

impl RandomWalkScheduler {
    #[must_use]
    pub fn new(config: &SessionConfig) -> Self {
        Self::with_seed(config, rand::rng().random())
    }

    #[must_use]
    pub fn with_seed(config: &SessionConfig, seed: SimulationSeed) -> Self {
        Self {
            rng: Pcg32::from_seed(seed.to_bytes()),
            speed: config.speed,
            inter_step_gap: config.inter_step_gap,
            state: SchedulerState::Selecting,
        }
    }

    #[must_use]
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Makes the scheduler usable again after the game ended.
    pub fn reset(&mut self) {
        self.state = SchedulerState::Selecting;
    }

    /// Plays one move for the side to move.
    ///
    /// On success the clock advances by the move duration plus the
    /// inter-step gap and the turn passes to the other side. Capturing a
    /// king, or finding no movable piece, ends the game; once ended, every
    /// further call returns the same [`StepOutcome::Ended`] without touching
    /// the grid.
    pub fn step<S>(&mut self, grid: &mut Grid, mut sink: S) -> StepOutcome
    where
        S: EventSink,
    {
        if let SchedulerState::Ended(reason) = self.state {
            return StepOutcome::Ended(reason);
        }

        let duration = self.speed.sample(&mut self.rng);
        let mut pool: Vec<PieceId> = grid.pieces_of(grid.to_move()).map(|p| p.id()).collect();

        loop {
            self.state = SchedulerState::Selecting;
            if pool.is_empty() {
                debug!(color = %grid.to_move(), "no movable piece");
                self.state = SchedulerState::Ended(EndReason::NoMovablePiece);
                return StepOutcome::Ended(EndReason::NoMovablePiece);
            }

            let id = pool.swap_remove(self.rng.random_range(0..pool.len()));
            let Some(&piece) = grid.piece(id) else {
                continue;
            };
            let policy = piece.kind().policy();
            let candidates = policy.candidates(&piece, grid);
            let Some(&candidate) = candidates.choose(&mut self.rng) else {
                trace!(kind = %piece.kind(), position = %piece.position(), "piece has no candidate");
                continue;
            };

            self.state = SchedulerState::Resolving;
            let start_delay = grid.clock();
            let path = policy.trail(piece.position(), &candidate).to_vec();
            let applied = grid.apply_move(id, &candidate);
            grid.advance_clock(duration + self.inter_step_gap);
            grid.toggle_turn();

            if let Some(captured) = applied.captured {
                sink.on_capture(&CaptureEvent {
                    captured_kind: captured.kind(),
                    color: captured.color(),
                    position: captured.position(),
                    at_delay: start_delay,
                    duration,
                });
            }

            let event = MoveEvent {
                piece: id,
                kind: piece.kind(),
                color: piece.color(),
                path,
                start_delay,
                duration,
                promoted_to: applied.promoted.map(|p| p.kind()),
                captured: applied.captured.map(|p| p.kind()),
            };
            debug!(
                color = %event.color,
                kind = %event.kind,
                from = %applied.from,
                to = %candidate.position(),
                delay = start_delay,
                "piece moved"
            );
            sink.on_move(&event);

            if applied.captured.is_some_and(|p| p.kind() == PieceKind::King) {
                self.state = SchedulerState::Ended(EndReason::KingCaptured);
                return StepOutcome::Ended(EndReason::KingCaptured);
            }

            self.state = SchedulerState::Continuing;
            return StepOutcome::Continuing(event);
        }
    }
}
