use std::fmt;

use tracing::debug;

use crate::CellOccupiedError;

use super::{
    movement::Candidate,
    piece::{Piece, PieceColor, PieceId, PieceKind},
    position::{BOARD_SIZE, Position},
};

/// Board state of one playthrough.
///
/// Owns the occupancy table, the collection of living pieces (in insertion
/// order), the side to move, and the virtual clock.
///
/// # Invariants
///
/// - At most one piece occupies a cell
/// - A living piece's recorded position is the cell that refers to it
/// - The clock never decreases
///
/// # Example
///
/// ```
/// use rerematch_engine::{Grid, PieceColor, PieceKind, Position};
///
/// let mut grid = Grid::new(0);
/// let rook = grid.spawn(PieceKind::Rook, PieceColor::White, Position::new(0, 0)).unwrap();
///
/// assert!(!grid.is_free(Position::new(0, 0)));
/// assert_eq!(grid.get(Position::new(0, 0)).map(|p| p.id()), Some(rook));
/// ```
#[derive(Debug, Clone)]
pub struct Grid {
    cells: [Option<PieceId>; BOARD_SIZE * BOARD_SIZE],
    pieces: Vec<Piece>,
    next_id: u32,
    to_move: PieceColor,
    clock: u64,
}

/// Result of [`Grid::apply_move`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedMove {
    pub mover: Piece,
    pub from: Position,
    pub captured: Option<Piece>,
    pub promoted: Option<Piece>,
}

impl Grid {
    /// Creates an empty board with white to move and the clock at `base_delay`.
    #[must_use]
    pub fn new(base_delay: u64) -> Self {
        Self {
            cells: [None; BOARD_SIZE * BOARD_SIZE],
            pieces: Vec::with_capacity(32),
            next_id: 0,
            to_move: PieceColor::White,
            clock: base_delay,
        }
    }

    /// Creates a new piece at `position`.
    pub fn spawn(
        &mut self,
        kind: PieceKind,
        color: PieceColor,
        position: Position,
    ) -> Result<PieceId, CellOccupiedError> {
        if !self.is_free(position) {
            return Err(CellOccupiedError::new(position));
        }
        let id = PieceId::new(self.next_id);
        self.next_id += 1;
        self.put(Piece::new(id, kind, color, position));
        Ok(id)
    }

    /// Places `piece` on its recorded cell and into the collection.
    ///
    /// The caller must make sure the cell is empty.
    pub fn put(&mut self, piece: Piece) {
        let cell = &mut self.cells[piece.position().index()];
        debug_assert!(cell.is_none(), "cell {} is occupied", piece.position());
        *cell = Some(piece.id());
        self.pieces.push(piece);
    }

    /// Lifts the occupant of `position` off the board, if any.
    pub fn clear(&mut self, position: Position) -> Option<Piece> {
        let id = self.cells[position.index()].take()?;
        let index = self.index_of(id)?;
        Some(self.pieces.remove(index))
    }

    #[must_use]
    pub fn get(&self, position: Position) -> Option<&Piece> {
        let id = self.cells[position.index()]?;
        self.piece(id)
    }

    #[must_use]
    pub fn is_free(&self, position: Position) -> bool {
        self.cells[position.index()].is_none()
    }

    /// The piece at `position` if it belongs to the opponent of `color`.
    #[must_use]
    pub fn opponent_at(&self, position: Position, color: PieceColor) -> Option<&Piece> {
        self.get(position).filter(|piece| piece.color() != color)
    }

    /// Removes a piece from the board and the collection.
    ///
    /// Does nothing if the piece is not on the board.
    pub fn remove_piece(&mut self, id: PieceId) -> Option<Piece> {
        let index = self.index_of(id)?;
        let piece = self.pieces.remove(index);
        let cell = &mut self.cells[piece.position().index()];
        if *cell == Some(id) {
            *cell = None;
        }
        Some(piece)
    }

    #[must_use]
    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.iter().find(|piece| piece.id() == id)
    }

    #[must_use]
    pub fn contains(&self, id: PieceId) -> bool {
        self.index_of(id).is_some()
    }

    fn index_of(&self, id: PieceId) -> Option<usize> {
        self.pieces.iter().position(|piece| piece.id() == id)
    }

    /// Living pieces in insertion order.
    #[must_use]
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn pieces_of(&self, color: PieceColor) -> impl Iterator<Item = &Piece> + '_ {
        self.pieces.iter().filter(move |piece| piece.color() == color)
    }

    /// Occupied cells in row-major order, rank 0 first.
    pub fn occupancy(&self) -> impl Iterator<Item = (Position, &Piece)> + '_ {
        Position::all()
            .filter_map(|pos| self.get(pos).map(|piece| (pos, piece)))
    }

    #[must_use]
    pub const fn to_move(&self) -> PieceColor {
        self.to_move
    }

    pub const fn toggle_turn(&mut self) {
        self.to_move = self.to_move.opponent();
    }

    #[must_use]
    pub const fn clock(&self) -> u64 {
        self.clock
    }

    pub const fn advance_clock(&mut self, amount: u64) {
        self.clock += amount;
    }

    /// Moves a piece to a candidate destination.
    ///
    /// Removes the captured piece, if any, and replaces a pawn reaching its
    /// last rank by a freshly created queen of the same color on the same cell.
    /// The turn and clock are left untouched.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not on the board.
    pub fn apply_move(&mut self, id: PieceId, candidate: &Candidate) -> AppliedMove {
        let mut mover = *self.piece(id).expect("moving piece should be on the board");
        let from = mover.position();
        let to = candidate.position();

        let captured = candidate.capture().and_then(|captured| self.remove_piece(captured));
        debug_assert!(self.is_free(to) || self.get(to).is_some_and(|p| p.id() == id));

        self.cells[from.index()] = None;
        mover.set_position(to);
        self.cells[to.index()] = Some(id);
        if let Some(index) = self.index_of(id) {
            self.pieces[index] = mover;
        }

        let promoted = mover
            .kind()
            .policy()
            .on_reached_terminal_rank(&mover)
            .map(|kind| self.promote(id, kind));

        AppliedMove {
            mover,
            from,
            captured,
            promoted,
        }
    }

    /// Replaces a piece by a new piece of `kind`, same color and cell.
    fn promote(&mut self, id: PieceId, kind: PieceKind) -> Piece {
        let old = self
            .remove_piece(id)
            .expect("promoted piece should be on the board");
        let new_id = PieceId::new(self.next_id);
        self.next_id += 1;
        let piece = Piece::new(new_id, kind, old.color(), old.position());
        self.put(piece);
        debug!(
            color = %old.color(),
            position = %old.position(),
            from = %old.kind(),
            to = %kind,
            "piece promoted"
        );
        piece
    }
}

/// Piece placement in FEN style, rank 0 first: `rnbqkbnr/pppppppp/8/...`.
///
/// White pieces are upper case, black lower case, and digits count empty cells.
impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (y, row) in self.cells.chunks(BOARD_SIZE).enumerate() {
            if y > 0 {
                f.write_str("/")?;
            }
            let mut empty = 0;
            for cell in row {
                let Some(piece) = cell.and_then(|id| self.piece(id)) else {
                    empty += 1;
                    continue;
                };
                if empty > 0 {
                    write!(f, "{empty}")?;
                    empty = 0;
                }
                let letter = piece.kind().as_char();
                match piece.color() {
                    PieceColor::White => write!(f, "{letter}")?,
                    PieceColor::Black => write!(f, "{}", letter.to_ascii_lowercase())?,
                }
            }
            if empty > 0 {
                write!(f, "{empty}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_rejects_occupied_cell() {
        let mut grid = Grid::new(0);
        let pos = Position::new(2, 2);
        grid.spawn(PieceKind::Bishop, PieceColor::White, pos).unwrap();
        assert!(grid.spawn(PieceKind::Rook, PieceColor::Black, pos).is_err());
        assert_eq!(grid.pieces().len(), 1);
    }

    #[test]
    fn test_opponent_at() {
        let mut grid = Grid::new(0);
        let pos = Position::new(5, 5);
        grid.spawn(PieceKind::Knight, PieceColor::Black, pos).unwrap();
        assert!(grid.opponent_at(pos, PieceColor::White).is_some());
        assert!(grid.opponent_at(pos, PieceColor::Black).is_none());
        assert!(grid.opponent_at(Position::new(5, 4), PieceColor::White).is_none());
    }

    #[test]
    fn test_remove_piece_is_idempotent() {
        let mut grid = Grid::new(0);
        let pos = Position::new(1, 1);
        let id = grid.spawn(PieceKind::Pawn, PieceColor::Black, pos).unwrap();
        assert!(grid.remove_piece(id).is_some());
        assert!(grid.is_free(pos));
        assert!(!grid.contains(id));
        assert!(grid.remove_piece(id).is_none());
    }

    #[test]
    fn test_display_places_pieces_by_rank() {
        let mut grid = Grid::new(0);
        assert_eq!(grid.to_string(), "8/8/8/8/8/8/8/8");
        grid.spawn(PieceKind::King, PieceColor::Black, Position::new(4, 0))
            .unwrap();
        grid.spawn(PieceKind::Knight, PieceColor::White, Position::new(0, 7))
            .unwrap();
        grid.spawn(PieceKind::Pawn, PieceColor::White, Position::new(7, 7))
            .unwrap();
        assert_eq!(grid.to_string(), "4k3/8/8/8/8/8/8/N6P");
    }

    #[test]
    fn test_occupancy_is_row_major() {
        let mut grid = Grid::new(0);
        for (x, y) in [(0, 1), (1, 0), (7, 0)] {
            grid.spawn(PieceKind::Rook, PieceColor::White, Position::new(x, y))
                .unwrap();
        }
        let cells: Vec<_> = grid.occupancy().map(|(pos, _)| pos).collect();
        assert_eq!(
            cells,
            [Position::new(1, 0), Position::new(7, 0), Position::new(0, 1)]
        );
    }

    #[test]
    fn test_clear_returns_occupant() {
        let mut grid = Grid::new(0);
        let pos = Position::new(6, 0);
        let id = grid.spawn(PieceKind::Knight, PieceColor::Black, pos).unwrap();
        assert_eq!(grid.clear(pos).map(|p| p.id()), Some(id));
        assert!(grid.clear(pos).is_none());
        assert!(grid.pieces().is_empty());
    }

    #[test]
    fn test_apply_move_captures() {
        let mut grid = Grid::new(0);
        let rook = grid
            .spawn(PieceKind::Rook, PieceColor::White, Position::new(0, 0))
            .unwrap();
        let victim = grid
            .spawn(PieceKind::Knight, PieceColor::Black, Position::new(0, 4))
            .unwrap();

        let applied = grid.apply_move(rook, &Candidate::capturing(Position::new(0, 4), victim));

        assert_eq!(applied.from, Position::new(0, 0));
        assert_eq!(applied.captured.map(|p| p.kind()), Some(PieceKind::Knight));
        assert!(applied.promoted.is_none());
        assert!(grid.is_free(Position::new(0, 0)));
        assert_eq!(grid.get(Position::new(0, 4)).map(|p| p.id()), Some(rook));
        assert_eq!(grid.pieces().len(), 1);
    }

    #[test]
    fn test_apply_move_promotes_pawn() {
        let mut grid = Grid::new(0);
        let pawn = grid
            .spawn(PieceKind::Pawn, PieceColor::White, Position::new(3, 1))
            .unwrap();

        let applied = grid.apply_move(pawn, &Candidate::new(Position::new(3, 0)));

        let queen = applied.promoted.expect("pawn should promote");
        assert_eq!(queen.kind(), PieceKind::Queen);
        assert_eq!(queen.color(), PieceColor::White);
        assert_eq!(queen.position(), Position::new(3, 0));
        assert_ne!(queen.id(), pawn);
        assert!(!grid.contains(pawn));
        assert_eq!(grid.get(Position::new(3, 0)), Some(&queen));
        assert_eq!(grid.pieces().len(), 1);
    }

    #[test]
    fn test_turn_and_clock() {
        let mut grid = Grid::new(250);
        assert_eq!(grid.to_move(), PieceColor::White);
        grid.toggle_turn();
        assert_eq!(grid.to_move(), PieceColor::Black);
        grid.advance_clock(100);
        assert_eq!(grid.clock(), 350);
    }
}
