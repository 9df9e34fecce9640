use arrayvec::ArrayVec;
use serde::Serialize;

use super::{
    availability::{self, Availability},
    grid::Grid,
    piece::{Piece, PieceId, PieceKind},
    position::{BOARD_SIZE, Offset, Position},
};

/// Upper bound on candidates for any piece (a queen in the centre reaches 27 cells).
pub const MAX_CANDIDATES: usize = 27;

pub type Candidates = ArrayVec<Candidate, MAX_CANDIDATES>;

/// Ordered cells a move's trail passes through, origin first.
pub type Trail = ArrayVec<Position, 3>;

/// A provisionally legal destination for a piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Candidate {
    position: Position,
    capture: Option<PieceId>,
    elbow: Option<Position>,
}

impl Candidate {
    #[must_use]
    pub const fn new(position: Position) -> Self {
        Self {
            position,
            capture: None,
            elbow: None,
        }
    }

    #[must_use]
    pub const fn capturing(position: Position, captured: PieceId) -> Self {
        Self {
            position,
            capture: Some(captured),
            elbow: None,
        }
    }

    #[must_use]
    const fn with_elbow(mut self, elbow: Position) -> Self {
        self.elbow = Some(elbow);
        self
    }

    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// The opposing piece standing on the destination, if any.
    #[must_use]
    pub const fn capture(&self) -> Option<PieceId> {
        self.capture
    }

    /// Corner cell of a knight's L-shaped trail.
    #[must_use]
    pub const fn elbow(&self) -> Option<Position> {
        self.elbow
    }
}

/// Movement rules of one piece kind.
///
/// The grid is always passed in explicitly; policies hold no board state.
pub trait MovementPolicy: Sync {
    /// Every destination `piece` may move to on `grid`.
    ///
    /// All returned positions are on the board. Captures are flagged with the
    /// captured piece's id.
    fn candidates(&self, piece: &Piece, grid: &Grid) -> Candidates;

    /// Path drawn for a move from `from` to `candidate`.
    fn trail(&self, from: Position, candidate: &Candidate) -> Trail {
        let mut trail = Trail::new();
        trail.push(from);
        trail.extend(candidate.elbow);
        trail.push(candidate.position);
        trail
    }

    /// Kind the piece turns into once it stands on its last rank.
    fn on_reached_terminal_rank(&self, _piece: &Piece) -> Option<PieceKind> {
        None
    }
}

impl PieceKind {
    /// Movement policy for this kind.
    #[must_use]
    pub fn policy(self) -> &'static dyn MovementPolicy {
        match self {
            PieceKind::Pawn => &Pawn,
            PieceKind::Knight => &Knight,
            PieceKind::Bishop => &Bishop,
            PieceKind::Rook => &Rook,
            PieceKind::Queen => &Queen,
            PieceKind::King => &King,
        }
    }
}

#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
const FULL_RANGE: i8 = BOARD_SIZE as i8 - 1;

const ORTHOGONAL: [Offset; 4] = [
    Offset::new(1, 0),
    Offset::new(-1, 0),
    Offset::new(0, 1),
    Offset::new(0, -1),
];

const DIAGONAL: [Offset; 4] = [
    Offset::new(1, 1),
    Offset::new(-1, -1),
    Offset::new(1, -1),
    Offset::new(-1, 1),
];

const ALL_DIRECTIONS: [Offset; 8] = [
    ORTHOGONAL[0],
    ORTHOGONAL[1],
    ORTHOGONAL[2],
    ORTHOGONAL[3],
    DIAGONAL[0],
    DIAGONAL[1],
    DIAGONAL[2],
    DIAGONAL[3],
];

/// Builds a generic offset matrix: every cell along `directions` up to `range` steps.
const fn ray_matrix<const N: usize>(directions: &[Offset], range: i8) -> [Offset; N] {
    let mut matrix = [Offset::ZERO; N];
    let mut i = 0;
    let mut d = 0;
    while d < directions.len() {
        let mut step = 1;
        while step <= range {
            matrix[i] = directions[d].scaled(step);
            i += 1;
            step += 1;
        }
        d += 1;
    }
    assert!(i == N);
    matrix
}

pub const BISHOP_MATRIX: [Offset; 28] = ray_matrix(&DIAGONAL, FULL_RANGE);
pub const ROOK_MATRIX: [Offset; 28] = ray_matrix(&ORTHOGONAL, FULL_RANGE);
pub const QUEEN_MATRIX: [Offset; 56] = ray_matrix(&ALL_DIRECTIONS, FULL_RANGE);
pub const KING_MATRIX: [Offset; 8] = ray_matrix(&ALL_DIRECTIONS, 1);

/// Knight jump: landing offset plus the diagonal corner its trail bends at.
#[derive(Debug, Clone, Copy)]
struct KnightJump {
    landing: Offset,
    elbow: Offset,
}

const fn jump(dx: i8, dy: i8) -> KnightJump {
    KnightJump {
        landing: Offset::new(dx, dy),
        elbow: Offset::new(dx.signum(), dy.signum()),
    }
}

const KNIGHT_MATRIX: [KnightJump; 8] = [
    jump(-1, -2),
    jump(1, -2),
    jump(-1, 2),
    jump(1, 2),
    jump(-2, -1),
    jump(-2, 1),
    jump(2, -1),
    jump(2, 1),
];

/// Translates `matrix` to the piece's square and keeps the cells the
/// availability test accepts.
fn sliding_candidates(matrix: &[Offset], piece: &Piece, grid: &Grid) -> Candidates {
    let from = piece.position();
    matrix
        .iter()
        .filter_map(|&offset| from.offset(offset))
        .filter_map(
            |to| match availability::evaluate(grid, from, piece.color(), to) {
                Availability::Free => Some(Candidate::new(to)),
                Availability::Capture(id) => Some(Candidate::capturing(to, id)),
                Availability::Blocked => None,
            },
        )
        .collect()
}

/// Forward step onto an empty cell, double step from the starting rank,
/// and capture-only forward diagonals. Promotes to a queen on the last rank.
#[derive(Debug, Clone, Copy)]
pub struct Pawn;

impl MovementPolicy for Pawn {
    fn candidates(&self, piece: &Piece, grid: &Grid) -> Candidates {
        let mut candidates = Candidates::new();
        let from = piece.position();
        let forward = piece.color().forward();

        let single = from.offset(Offset::new(0, forward));
        if let Some(to) = single.filter(|&to| grid.is_free(to)) {
            candidates.push(Candidate::new(to));
        }

        for side in [-1, 1] {
            let Some(to) = from.offset(Offset::new(side, forward)) else {
                continue;
            };
            if let Some(target) = grid.opponent_at(to, piece.color()) {
                candidates.push(Candidate::capturing(to, target.id()));
            }
        }

        if from.y() == usize::from(piece.color().pawn_rank()) {
            let double = from.offset(Offset::new(0, forward * 2));
            if let (Some(single), Some(double)) = (single, double)
                && grid.is_free(single)
                && grid.is_free(double)
            {
                candidates.push(Candidate::new(double));
            }
        }

        candidates
    }

    fn on_reached_terminal_rank(&self, piece: &Piece) -> Option<PieceKind> {
        (piece.position().y() == usize::from(piece.color().promotion_rank()))
            .then_some(PieceKind::Queen)
    }
}

/// L-shaped jumps; only the landing cell matters.
#[derive(Debug, Clone, Copy)]
pub struct Knight;

impl MovementPolicy for Knight {
    fn candidates(&self, piece: &Piece, grid: &Grid) -> Candidates {
        let from = piece.position();
        KNIGHT_MATRIX
            .iter()
            .filter_map(|jump| {
                let to = from.offset(jump.landing)?;
                let elbow = from.offset(jump.elbow)?;
                let candidate = match grid.get(to) {
                    None => Candidate::new(to),
                    Some(target) if target.color() != piece.color() => {
                        Candidate::capturing(to, target.id())
                    }
                    Some(_) => return None,
                };
                Some(candidate.with_elbow(elbow))
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Bishop;

impl MovementPolicy for Bishop {
    fn candidates(&self, piece: &Piece, grid: &Grid) -> Candidates {
        sliding_candidates(&BISHOP_MATRIX, piece, grid)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Rook;

impl MovementPolicy for Rook {
    fn candidates(&self, piece: &Piece, grid: &Grid) -> Candidates {
        sliding_candidates(&ROOK_MATRIX, piece, grid)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Queen;

impl MovementPolicy for Queen {
    fn candidates(&self, piece: &Piece, grid: &Grid) -> Candidates {
        sliding_candidates(&QUEEN_MATRIX, piece, grid)
    }
}

/// Queen movement restricted to adjacent cells.
#[derive(Debug, Clone, Copy)]
pub struct King;

impl MovementPolicy for King {
    fn candidates(&self, piece: &Piece, grid: &Grid) -> Candidates {
        sliding_candidates(&KING_MATRIX, piece, grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PieceColor;

    fn destinations(candidates: &Candidates) -> Vec<Position> {
        let mut positions: Vec<_> = candidates.iter().map(Candidate::position).collect();
        positions.sort_unstable();
        positions
    }

    fn spawn(grid: &mut Grid, kind: PieceKind, color: PieceColor, x: u8, y: u8) -> Piece {
        let id = grid.spawn(kind, color, Position::new(x, y)).unwrap();
        *grid.piece(id).unwrap()
    }

    #[test]
    fn test_matrix_sizes() {
        assert!(BISHOP_MATRIX.iter().all(|o| o.dx().abs() == o.dy().abs()));
        assert!(ROOK_MATRIX.iter().all(|o| o.dx() == 0 || o.dy() == 0));
        assert!(KING_MATRIX.iter().all(|o| o.dx().abs() <= 1 && o.dy().abs() <= 1));
        assert!(QUEEN_MATRIX.iter().all(|o| o.is_ray()));
    }

    #[test]
    fn test_queen_in_centre_of_empty_board() {
        let mut grid = Grid::new(0);
        let queen = spawn(&mut grid, PieceKind::Queen, PieceColor::White, 3, 3);
        let candidates = Queen.candidates(&queen, &grid);
        assert_eq!(candidates.len(), MAX_CANDIDATES);
        assert!(candidates.iter().all(|c| c.capture().is_none()));
    }

    #[test]
    fn test_rook_stops_before_own_piece() {
        let mut grid = Grid::new(0);
        let rook = spawn(&mut grid, PieceKind::Rook, PieceColor::White, 0, 0);
        spawn(&mut grid, PieceKind::Pawn, PieceColor::White, 0, 3);
        let positions = destinations(&Rook.candidates(&rook, &grid));
        assert!(positions.contains(&Position::new(0, 1)));
        assert!(positions.contains(&Position::new(0, 2)));
        for y in 3..8 {
            assert!(!positions.contains(&Position::new(0, y)), "(0, {y}) is behind the blocker");
        }
    }

    #[test]
    fn test_rook_captures_first_enemy_only() {
        let mut grid = Grid::new(0);
        let rook = spawn(&mut grid, PieceKind::Rook, PieceColor::White, 0, 0);
        let enemy = spawn(&mut grid, PieceKind::Pawn, PieceColor::Black, 0, 3);
        let candidates = Rook.candidates(&rook, &grid);
        let capture = candidates
            .iter()
            .find(|c| c.position() == Position::new(0, 3))
            .expect("blocker should be capturable");
        assert_eq!(capture.capture(), Some(enemy.id()));
        for y in 4..8 {
            assert!(candidates.iter().all(|c| c.position() != Position::new(0, y)));
        }
    }

    #[test]
    fn test_king_reaches_adjacent_cells_only() {
        let mut grid = Grid::new(0);
        let king = spawn(&mut grid, PieceKind::King, PieceColor::Black, 0, 0);
        assert_eq!(
            destinations(&King.candidates(&king, &grid)),
            vec![Position::new(0, 1), Position::new(1, 0), Position::new(1, 1)]
        );
    }

    #[test]
    fn test_knight_on_edge() {
        let mut grid = Grid::new(0);
        let knight = spawn(&mut grid, PieceKind::Knight, PieceColor::Black, 1, 0);
        assert_eq!(
            destinations(&Knight.candidates(&knight, &grid)),
            vec![Position::new(0, 2), Position::new(2, 2), Position::new(3, 1)]
        );
    }

    #[test]
    fn test_knight_jumps_over_pieces_and_trail_bends() {
        let mut grid = Grid::new(0);
        let knight = spawn(&mut grid, PieceKind::Knight, PieceColor::White, 4, 4);
        for (x, y) in [(3, 3), (4, 3), (5, 3), (3, 4), (5, 4), (3, 5), (4, 5), (5, 5)] {
            spawn(&mut grid, PieceKind::Pawn, PieceColor::White, x, y);
        }
        spawn(&mut grid, PieceKind::Pawn, PieceColor::White, 5, 2);
        let enemy = spawn(&mut grid, PieceKind::Bishop, PieceColor::Black, 6, 5);

        let candidates = Knight.candidates(&knight, &grid);
        assert_eq!(candidates.len(), 7, "only the own-piece landing is excluded");
        let capture = candidates
            .iter()
            .find(|c| c.position() == Position::new(6, 5))
            .unwrap();
        assert_eq!(capture.capture(), Some(enemy.id()));
        assert_eq!(
            Knight.trail(knight.position(), capture).as_slice(),
            &[Position::new(4, 4), Position::new(5, 5), Position::new(6, 5)]
        );
    }

    #[test]
    fn test_pawn_double_step_only_from_starting_rank() {
        let mut grid = Grid::new(0);
        let pawn = spawn(&mut grid, PieceKind::Pawn, PieceColor::White, 4, 6);
        assert_eq!(
            destinations(&Pawn.candidates(&pawn, &grid)),
            vec![Position::new(4, 4), Position::new(4, 5)]
        );

        let mut grid = Grid::new(0);
        let pawn = spawn(&mut grid, PieceKind::Pawn, PieceColor::White, 4, 5);
        assert_eq!(
            destinations(&Pawn.candidates(&pawn, &grid)),
            vec![Position::new(4, 4)]
        );
    }

    #[test]
    fn test_pawn_double_step_needs_both_cells_free() {
        let mut grid = Grid::new(0);
        let pawn = spawn(&mut grid, PieceKind::Pawn, PieceColor::Black, 2, 1);
        spawn(&mut grid, PieceKind::Knight, PieceColor::White, 2, 3);
        assert_eq!(
            destinations(&Pawn.candidates(&pawn, &grid)),
            vec![Position::new(2, 2)]
        );

        spawn(&mut grid, PieceKind::Knight, PieceColor::White, 2, 2);
        assert!(Pawn.candidates(&pawn, &grid).is_empty());
    }

    #[test]
    fn test_pawn_diagonals_capture_only() {
        let mut grid = Grid::new(0);
        let pawn = spawn(&mut grid, PieceKind::Pawn, PieceColor::White, 4, 6);
        let enemy = spawn(&mut grid, PieceKind::Knight, PieceColor::Black, 3, 5);
        spawn(&mut grid, PieceKind::Knight, PieceColor::White, 5, 5);

        let candidates = Pawn.candidates(&pawn, &grid);
        let capture = candidates
            .iter()
            .find(|c| c.position() == Position::new(3, 5))
            .expect("diagonal enemy should be capturable");
        assert_eq!(capture.capture(), Some(enemy.id()));
        assert!(candidates.iter().all(|c| c.position() != Position::new(5, 5)));
    }

    #[test]
    fn test_pawn_promotes_on_last_rank_only() {
        let mut grid = Grid::new(0);
        let white = spawn(&mut grid, PieceKind::Pawn, PieceColor::White, 0, 0);
        let black = spawn(&mut grid, PieceKind::Pawn, PieceColor::Black, 7, 7);
        let midway = spawn(&mut grid, PieceKind::Pawn, PieceColor::White, 3, 3);
        assert_eq!(Pawn.on_reached_terminal_rank(&white), Some(PieceKind::Queen));
        assert_eq!(Pawn.on_reached_terminal_rank(&black), Some(PieceKind::Queen));
        assert_eq!(Pawn.on_reached_terminal_rank(&midway), None);
        assert_eq!(Queen.on_reached_terminal_rank(&white), None);
    }

    #[test]
    fn test_candidates_are_on_board_for_every_kind_and_square() {
        for kind in PieceKind::BACK_RANK.into_iter().chain([PieceKind::Pawn]) {
            for pos in Position::all() {
                let mut grid = Grid::new(0);
                let id = grid.spawn(kind, PieceColor::Black, pos).unwrap();
                let piece = *grid.piece(id).unwrap();
                for candidate in kind.policy().candidates(&piece, &grid) {
                    let to = candidate.position();
                    assert!(to.x() < BOARD_SIZE && to.y() < BOARD_SIZE);
                    assert_ne!(to, pos, "{kind} at {pos} may not stay in place");
                }
            }
        }
    }
}
