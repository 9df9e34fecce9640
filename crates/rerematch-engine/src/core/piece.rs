use serde::{Deserialize, Serialize};

use super::position::Position;

/// Side a piece plays for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum PieceColor {
    #[display("white")]
    White,
    #[display("black")]
    Black,
}

impl PieceColor {
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            PieceColor::White => PieceColor::Black,
            PieceColor::Black => PieceColor::White,
        }
    }

    /// Rank direction a pawn of this color advances in.
    ///
    /// White starts at the bottom of the board and moves toward rank 0.
    #[must_use]
    pub const fn forward(self) -> i8 {
        match self {
            PieceColor::White => -1,
            PieceColor::Black => 1,
        }
    }

    /// Rank holding the rooks, knights, bishops, queen and king at setup.
    #[must_use]
    pub const fn home_rank(self) -> u8 {
        match self {
            PieceColor::White => 7,
            PieceColor::Black => 0,
        }
    }

    /// Rank the pawns start on; the only rank allowing a double step.
    #[must_use]
    pub const fn pawn_rank(self) -> u8 {
        match self {
            PieceColor::White => 6,
            PieceColor::Black => 1,
        }
    }

    /// Farthest rank, where a pawn promotes.
    #[must_use]
    pub const fn promotion_rank(self) -> u8 {
        self.opponent().home_rank()
    }
}

/// Kind of piece, selecting its movement policy.
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
#[repr(u8)]
pub enum PieceKind {
    #[display("pawn")]
    Pawn = 0,
    #[display("knight")]
    Knight = 1,
    #[display("bishop")]
    Bishop = 2,
    #[display("rook")]
    Rook = 3,
    #[display("queen")]
    Queen = 4,
    #[display("king")]
    King = 5,
}

impl PieceKind {
    /// Standard back-rank order, file 0 to file 7.
    pub const BACK_RANK: [Self; 8] = [
        PieceKind::Rook,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Queen,
        PieceKind::King,
        PieceKind::Bishop,
        PieceKind::Knight,
        PieceKind::Rook,
    ];

    /// Letter used in board diagrams; white pieces are upper case.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::Pawn => 'P',
            PieceKind::Knight => 'N',
            PieceKind::Bishop => 'B',
            PieceKind::Rook => 'R',
            PieceKind::Queen => 'Q',
            PieceKind::King => 'K',
        }
    }
}

/// Stable handle of a piece within one [`Grid`](super::grid::Grid).
///
/// Ids are never reused inside a playthrough, so a promoted queen gets a
/// fresh id rather than inheriting the pawn's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PieceId(u32);

impl PieceId {
    pub(crate) const fn new(raw: u32) -> Self {
        Self(raw)
    }
}

/// A piece standing on the board.
///
/// Pieces live only inside a [`Grid`](super::grid::Grid): a captured piece is
/// dropped from the grid's collection, so every `Piece` reachable through the
/// grid is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Piece {
    id: PieceId,
    kind: PieceKind,
    color: PieceColor,
    position: Position,
}

impl Piece {
    pub(crate) const fn new(
        id: PieceId,
        kind: PieceKind,
        color: PieceColor,
        position: Position,
    ) -> Self {
        Self {
            id,
            kind,
            color,
            position,
        }
    }

    #[must_use]
    pub const fn id(&self) -> PieceId {
        self.id
    }

    #[must_use]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub const fn color(&self) -> PieceColor {
        self.color
    }

    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    pub(crate) const fn set_position(&mut self, position: Position) {
        self.position = position;
    }
}
