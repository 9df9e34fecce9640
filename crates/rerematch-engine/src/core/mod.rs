//! Board data model and movement rules.
//!
//! - [`Grid`] - occupancy table, living pieces, side to move and virtual clock
//! - [`Piece`], [`PieceKind`], [`PieceColor`] - the pieces themselves
//! - [`MovementPolicy`] - per-kind candidate generation
//! - [`availability::evaluate`] - obstruction test for sliding pieces
pub use self::{grid::*, movement::*, piece::*, position::*};

pub mod availability;
pub(crate) mod grid;
pub(crate) mod movement;
pub(crate) mod piece;
pub(crate) mod position;
