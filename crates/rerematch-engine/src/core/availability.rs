use super::{
    grid::Grid,
    piece::{PieceColor, PieceId},
    position::Position,
};

/// Verdict on a sliding piece's candidate destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum Availability {
    /// Path and destination are empty.
    Free,
    /// Path is empty and the destination holds an opposing piece.
    Capture(PieceId),
    /// A piece stands between origin and destination, or the destination
    /// holds a piece of the mover's own color.
    Blocked,
}

/// Decides whether a sliding piece (bishop, rook, queen, king) can reach `to`.
///
/// Walks the ray from `from` toward `to` one cell at a time; the first
/// occupied intermediate cell blocks the move. The destination itself is
/// judged separately: empty is free, an opposing piece is a capture, and an
/// own piece blocks.
///
/// The mover's own cell (`from`) is never inspected, so the board may still
/// hold the mover there.
#[must_use]
pub fn evaluate(grid: &Grid, from: Position, color: PieceColor, to: Position) -> Availability {
    let offset = from.offset_to(to);
    debug_assert!(offset.is_ray(), "{from} -> {to} is not a straight line");

    let step = offset.signum();
    let mut cursor = from.offset(step);
    while let Some(cell) = cursor {
        if cell == to {
            break;
        }
        if !grid.is_free(cell) {
            return Availability::Blocked;
        }
        cursor = cell.offset(step);
    }

    match grid.get(to) {
        None => Availability::Free,
        Some(piece) if piece.color() != color => Availability::Capture(piece.id()),
        Some(_) => Availability::Blocked,
    }
}
