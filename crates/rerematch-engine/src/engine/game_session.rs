use rand::Rng as _;
use serde::Serialize;
use tracing::{debug, info};

use crate::core::{Grid, PieceColor, PieceKind, Position};

use super::{
    event::{EventSink, SessionPhase},
    scheduler::{EndReason, RandomWalkScheduler, StepOutcome},
    timing::{SessionConfig, SimulationSeed},
};

/// Outcome of one playthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    /// Number of moves played.
    pub steps: usize,
    pub end: EndReason,
    /// Clock value at which the next session on this board may start.
    pub final_delay: u64,
    pub captures: usize,
    pub promotions: usize,
}

/// One board playing repeated games from the standard 32-piece setup.
///
/// Each call to [`play`](Self::play) resets the board, fades the pieces in,
/// runs the random walk until a king falls, the side to move is stuck, or the
/// step ceiling is hit, and fades the pieces out.
///
/// # Example
///
/// ```
/// use rerematch_engine::{GameSession, SessionConfig};
///
/// let mut session = GameSession::new(SessionConfig::default());
/// let first = session.play(0, ());
/// let second = session.play(first.final_delay, ());
///
/// assert!(second.final_delay > first.final_delay);
/// assert!(second.steps <= SessionConfig::default().step_ceiling);
/// ```
#[derive(Debug, Clone)]
pub struct GameSession {
    config: SessionConfig,
    grid: Grid,
    scheduler: RandomWalkScheduler,
    steps: usize,
    trails_on_board: bool,
}

impl GameSession {
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self::with_seed(config, rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed for a reproducible run.
    #[must_use]
    pub fn with_seed(config: SessionConfig, seed: SimulationSeed) -> Self {
        Self {
            scheduler: RandomWalkScheduler::with_seed(&config, seed),
            config,
            grid: Self::initial_grid(0),
            steps: 0,
            trails_on_board: false,
        }
    }

    /// A grid holding the standard starting layout, white to move.
    ///
    /// Black occupies ranks 0 (back rank) and 1 (pawns), white ranks 6 and 7.
    #[must_use]
    pub fn initial_grid(base_delay: u64) -> Grid {
        let mut grid = Grid::new(base_delay);
        for color in [PieceColor::Black, PieceColor::White] {
            let pawns = [PieceKind::Pawn; 8].map(|kind| (kind, color.pawn_rank()));
            let back = PieceKind::BACK_RANK.map(|kind| (kind, color.home_rank()));
            for rank in [pawns, back] {
                for (x, (kind, y)) in (0..).zip(rank) {
                    let placed = grid.spawn(kind, color, Position::new(x, y));
                    debug_assert!(placed.is_ok(), "starting layout overlaps");
                }
            }
        }
        grid
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub fn scheduler(&self) -> &RandomWalkScheduler {
        &self.scheduler
    }

    /// Moves played since the last reset.
    #[must_use]
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Records that trails are drawn on this board (e.g. by the intro), so
    /// the next session fades them out first.
    pub fn mark_trails_present(&mut self) {
        self.trails_on_board = true;
    }

    /// Discards the current game and restores the starting layout.
    pub fn reset(&mut self, base_delay: u64) {
        self.grid = Self::initial_grid(base_delay);
        self.scheduler.reset();
        self.steps = 0;
    }

    /// Plays one move, honoring the step ceiling.
    pub fn step<S>(&mut self, sink: S) -> StepOutcome
    where
        S: EventSink,
    {
        if self.steps >= self.config.step_ceiling {
            return StepOutcome::Ended(EndReason::StepCeiling);
        }
        let outcome = self.scheduler.step(&mut self.grid, sink);
        if matches!(
            outcome,
            StepOutcome::Continuing(_) | StepOutcome::Ended(EndReason::KingCaptured)
        ) {
            self.steps += 1;
        }
        outcome
    }

    /// Plays a full session starting at `base_delay`.
    ///
    /// Returns the summary; `final_delay` is when the next session may begin.
    pub fn play<S>(&mut self, base_delay: u64, mut sink: S) -> SessionSummary
    where
        S: EventSink,
    {
        let reveal = self.config.reveal;
        let mut start = base_delay;
        if self.trails_on_board {
            sink.on_phase(&SessionPhase::TrailsFade {
                earliest_delay: base_delay,
                latest_delay: base_delay + reveal.fade_previous_max_delay,
                duration: reveal.fade_previous_duration,
            });
            start += reveal.fade_previous_max_delay + reveal.fade_previous_duration;
        }

        let show_delay = start + reveal.show_lead;
        sink.on_phase(&SessionPhase::PiecesShown {
            delay: show_delay,
            duration: reveal.show_duration,
        });
        self.reset(show_delay + reveal.show_duration);

        let mut captures = 0;
        let mut promotions = 0;
        let end = loop {
            match self.step(&mut sink) {
                StepOutcome::Continuing(event) => {
                    captures += usize::from(event.captured.is_some());
                    promotions += usize::from(event.promoted_to.is_some());
                }
                StepOutcome::Ended(reason) => {
                    if reason.is_king_captured() {
                        captures += 1;
                    }
                    break reason;
                }
            }
        };

        let final_delay = self.grid.clock();
        sink.on_phase(&SessionPhase::PiecesErased {
            delay: final_delay,
            duration: reveal.erase_duration,
        });
        sink.on_game_end(final_delay, end);
        self.trails_on_board = self.trails_on_board || self.steps > 0;

        info!(
            steps = self.steps,
            end = %end,
            captures,
            promotions,
            final_delay,
            "session finished"
        );
        debug!(board = %self.grid, "final position");
        SessionSummary {
            steps: self.steps,
            end,
            final_delay,
            captures,
            promotions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EventLog;

    fn session(n: u8, config: SessionConfig) -> GameSession {
        GameSession::with_seed(config, SimulationSeed::from_bytes([n; 16]))
    }

    #[test]
    fn test_initial_layout() {
        let grid = GameSession::initial_grid(0);
        assert_eq!(grid.pieces().len(), 32);
        assert_eq!(grid.pieces_of(PieceColor::White).count(), 16);
        for x in 0..8 {
            for (color, rank) in [(PieceColor::Black, 1), (PieceColor::White, 6)] {
                let pawn = grid.get(Position::new(x, rank)).unwrap();
                assert_eq!((pawn.kind(), pawn.color()), (PieceKind::Pawn, color));
            }
            let black = grid.get(Position::new(x, 0)).unwrap();
            let white = grid.get(Position::new(x, 7)).unwrap();
            assert_eq!(black.kind(), PieceKind::BACK_RANK[usize::from(x)]);
            assert_eq!(white.kind(), PieceKind::BACK_RANK[usize::from(x)]);
        }
        for y in 2..6 {
            for x in 0..8 {
                assert!(grid.is_free(Position::new(x, y)));
            }
        }
        assert_eq!(grid.to_move(), PieceColor::White);
        assert_eq!(
            grid.to_string(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR"
        );
    }

    #[test]
    fn test_step_ceiling_ends_round() {
        let config = SessionConfig {
            step_ceiling: 3,
            ..SessionConfig::default()
        };
        let mut log = EventLog::default();
        let summary = session(0, config).play(0, &mut log);
        // Three opening moves can never capture a king.
        assert_eq!(summary.steps, 3);
        assert_eq!(summary.end, EndReason::StepCeiling);
        assert_eq!(log.moves().count(), 3);
    }

    #[test]
    fn test_moves_alternate_and_delays_do_not_overlap() {
        for n in 0..10 {
            let mut log = EventLog::default();
            let summary = session(n, SessionConfig::default()).play(0, &mut log);
            let moves: Vec<_> = log.moves().collect();
            assert_eq!(moves.len(), summary.steps);
            for (i, pair) in moves.windows(2).enumerate() {
                assert_ne!(pair[0].color, pair[1].color, "move {i} and {} same side", i + 1);
                assert!(pair[1].start_delay >= pair[0].start_delay + pair[0].duration);
            }
            if let Some(first) = moves.first() {
                assert_eq!(first.color, PieceColor::White);
            }
            if let Some(last) = moves.last() {
                assert_eq!(summary.final_delay, last.start_delay + last.duration);
            }
        }
    }

    #[test]
    fn test_reveal_timing() {
        let config = SessionConfig {
            step_ceiling: 1,
            ..SessionConfig::default()
        };
        let mut session = session(1, config);

        let mut log = EventLog::default();
        session.play(1000, &mut log);
        let first = log.moves().next().unwrap();
        // No trails yet: 100 lead + 400 fade-in.
        assert_eq!(first.start_delay, 1500);

        let mut log = EventLog::default();
        session.play(5000, &mut log);
        let first = log.moves().next().unwrap();
        // Previous trails fade first: 1000 window + 500 fade.
        assert_eq!(first.start_delay, 5000 + 1500 + 500);
    }

    #[test]
    fn test_play_resets_previous_game() {
        let mut session = session(2, SessionConfig::default());
        let summary = session.play(0, ());
        assert!(summary.steps > 0);

        session.reset(0);
        let fresh = GameSession::initial_grid(0);
        let layout = |grid: &Grid| -> Vec<_> {
            grid.occupancy()
                .map(|(pos, piece)| (pos, piece.kind(), piece.color()))
                .collect()
        };
        assert_eq!(layout(session.grid()), layout(&fresh));
        assert_eq!(session.steps(), 0);
        assert!(session.scheduler().state().is_selecting());
    }
}
