use serde::Serialize;

use crate::core::{PieceColor, PieceId, PieceKind, Position};

use super::{path_generator::IntroLines, scheduler::EndReason};

/// A successful move, as handed to the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveEvent {
    pub piece: PieceId,
    pub kind: PieceKind,
    pub color: PieceColor,
    /// Cells the trail passes through, origin first.
    pub path: Vec<Position>,
    pub start_delay: u64,
    pub duration: u64,
    /// Kind of the piece that replaced the mover on arrival (pawn promotion).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promoted_to: Option<PieceKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captured: Option<PieceKind>,
}

/// A piece leaving the board by capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CaptureEvent {
    pub captured_kind: PieceKind,
    /// Color of the captured piece.
    pub color: PieceColor,
    pub position: Position,
    pub at_delay: u64,
    pub duration: u64,
}

/// Board-level transitions around a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum SessionPhase {
    /// Trails of the previous session fade out, each starting within the window.
    TrailsFade {
        earliest_delay: u64,
        latest_delay: u64,
        duration: u64,
    },
    /// Pieces fade in before the first move.
    PiecesShown { delay: u64, duration: u64 },
    /// Pieces fade out after the last move.
    PiecesErased { delay: u64, duration: u64 },
}

/// Consumer of the simulation's event stream.
///
/// Every method defaults to doing nothing, so a sink implements only what it
/// renders. `()` is the sink that ignores everything.
pub trait EventSink {
    /// Subsequent events belong to board `index` (multi-board simulations only).
    fn on_board(&mut self, _index: usize) {}

    fn on_move(&mut self, _event: &MoveEvent) {}

    fn on_capture(&mut self, _event: &CaptureEvent) {}

    fn on_phase(&mut self, _phase: &SessionPhase) {}

    /// The session is over; a reset should be scheduled after `final_delay`.
    fn on_game_end(&mut self, _final_delay: u64, _reason: EndReason) {}

    fn on_lines_generated(&mut self, _lines: &IntroLines) {}
}

impl EventSink for () {}

impl<S> EventSink for &mut S
where
    S: EventSink + ?Sized,
{
    fn on_board(&mut self, index: usize) {
        (**self).on_board(index);
    }

    fn on_move(&mut self, event: &MoveEvent) {
        (**self).on_move(event);
    }

    fn on_capture(&mut self, event: &CaptureEvent) {
        (**self).on_capture(event);
    }

    fn on_phase(&mut self, phase: &SessionPhase) {
        (**self).on_phase(phase);
    }

    fn on_game_end(&mut self, final_delay: u64, reason: EndReason) {
        (**self).on_game_end(final_delay, reason);
    }

    fn on_lines_generated(&mut self, lines: &IntroLines) {
        (**self).on_lines_generated(lines);
    }
}

/// One entry of an [`EventLog`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    Board { index: usize },
    Move(MoveEvent),
    Capture(CaptureEvent),
    Phase(SessionPhase),
    GameEnd { final_delay: u64, reason: EndReason },
    Lines(IntroLines),
}

/// A sink that keeps every event in order.
///
/// # Example
///
/// ```
/// use rerematch_engine::{EventLog, GameSession, SessionConfig};
///
/// let mut log = EventLog::default();
/// let summary = GameSession::new(SessionConfig::default()).play(0, &mut log);
///
/// assert_eq!(log.moves().count(), summary.steps);
/// ```
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn moves(&self) -> impl Iterator<Item = &MoveEvent> + '_ {
        self.events.iter().filter_map(|event| match event {
            Event::Move(event) => Some(event),
            _ => None,
        })
    }

    pub fn captures(&self) -> impl Iterator<Item = &CaptureEvent> + '_ {
        self.events.iter().filter_map(|event| match event {
            Event::Capture(event) => Some(event),
            _ => None,
        })
    }

    fn appender(&mut self) -> EventFn<impl FnMut(Event) + '_> {
        EventFn(|event| self.events.push(event))
    }
}

/// A sink that hands every event, as an owned [`Event`], to a closure.
///
/// # Example
///
/// ```
/// use rerematch_engine::{EventFn, GameSession, SessionConfig};
///
/// let mut count = 0;
/// GameSession::new(SessionConfig::default()).play(0, EventFn(|_| count += 1));
/// assert!(count >= 3);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct EventFn<F>(pub F);

impl<F> EventSink for EventFn<F>
where
    F: FnMut(Event),
{
    fn on_board(&mut self, index: usize) {
        (self.0)(Event::Board { index });
    }

    fn on_move(&mut self, event: &MoveEvent) {
        (self.0)(Event::Move(event.clone()));
    }

    fn on_capture(&mut self, event: &CaptureEvent) {
        (self.0)(Event::Capture(*event));
    }

    fn on_phase(&mut self, phase: &SessionPhase) {
        (self.0)(Event::Phase(*phase));
    }

    fn on_game_end(&mut self, final_delay: u64, reason: EndReason) {
        (self.0)(Event::GameEnd {
            final_delay,
            reason,
        });
    }

    fn on_lines_generated(&mut self, lines: &IntroLines) {
        (self.0)(Event::Lines(lines.clone()));
    }
}

impl EventSink for EventLog {
    fn on_board(&mut self, index: usize) {
        self.appender().on_board(index);
    }

    fn on_move(&mut self, event: &MoveEvent) {
        self.appender().on_move(event);
    }

    fn on_capture(&mut self, event: &CaptureEvent) {
        self.appender().on_capture(event);
    }

    fn on_phase(&mut self, phase: &SessionPhase) {
        self.appender().on_phase(phase);
    }

    fn on_game_end(&mut self, final_delay: u64, reason: EndReason) {
        self.appender().on_game_end(final_delay, reason);
    }

    fn on_lines_generated(&mut self, lines: &IntroLines) {
        self.appender().on_lines_generated(lines);
    }
}
