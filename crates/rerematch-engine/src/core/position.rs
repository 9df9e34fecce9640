use std::fmt;

use serde::{Deserialize, Serialize};

use crate::OutOfBoundsError;

/// Number of cells along each side of the board.
pub const BOARD_SIZE: usize = 8;

#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
const BOARD_SIZE_I16: i16 = BOARD_SIZE as i16;

/// A cell of the 8×8 board.
///
/// Both coordinates are always in `[0, 7]`; anything else is rejected at
/// construction, so a `Position` never needs a separate bounds check.
///
/// # Coordinate System
///
/// - `x` is the file (column), increasing rightward
/// - `y` is the rank (row), increasing downward
/// - Black starts on ranks 0–1, white on ranks 6–7
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "RawPosition", into = "RawPosition")]
pub struct Position {
    x: u8,
    y: u8,
}

#[derive(Serialize, Deserialize)]
struct RawPosition {
    x: i16,
    y: i16,
}

impl TryFrom<RawPosition> for Position {
    type Error = OutOfBoundsError;

    fn try_from(raw: RawPosition) -> Result<Self, Self::Error> {
        Self::try_new(raw.x, raw.y)
    }
}

impl From<Position> for RawPosition {
    fn from(pos: Position) -> Self {
        Self {
            x: pos.x.into(),
            y: pos.y.into(),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Position {
    /// Creates a position, panicking on out-of-board coordinates.
    ///
    /// Intended for constants and literals; use [`Self::try_new`] for computed values.
    #[must_use]
    pub const fn new(x: u8, y: u8) -> Self {
        assert!((x as usize) < BOARD_SIZE);
        assert!((y as usize) < BOARD_SIZE);
        Self { x, y }
    }

    pub fn try_new(x: i16, y: i16) -> Result<Self, OutOfBoundsError> {
        if !Self::is_in_bounds(x, y) {
            return Err(OutOfBoundsError::new(x, y));
        }
        #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let (x, y) = (x as u8, y as u8);
        Ok(Self { x, y })
    }

    /// Returns `true` iff both coordinates are in `[0, 7]`.
    #[must_use]
    pub const fn is_in_bounds(x: i16, y: i16) -> bool {
        0 <= x && x < BOARD_SIZE_I16 && 0 <= y && y < BOARD_SIZE_I16
    }

    #[must_use]
    pub fn x(self) -> usize {
        usize::from(self.x)
    }

    #[must_use]
    pub fn y(self) -> usize {
        usize::from(self.y)
    }

    /// Row-major index into a 64-cell table.
    #[must_use]
    pub fn index(self) -> usize {
        self.y() * BOARD_SIZE + self.x()
    }

    /// Translates the position, returning `None` when the result leaves the board.
    #[must_use]
    pub fn offset(self, offset: Offset) -> Option<Self> {
        let x = i16::from(self.x) + i16::from(offset.dx);
        let y = i16::from(self.y) + i16::from(offset.dy);
        Self::try_new(x, y).ok()
    }

    /// The offset that takes `self` to `other`.
    #[must_use]
    #[expect(clippy::cast_possible_wrap)]
    pub fn offset_to(self, other: Self) -> Offset {
        Offset::new(other.x as i8 - self.x as i8, other.y as i8 - self.y as i8)
    }

    /// All 64 cells, rank by rank, in [`Self::index`] order.
    pub fn all() -> impl Iterator<Item = Self> {
        #[expect(clippy::cast_possible_truncation)]
        const SIZE: u8 = BOARD_SIZE as u8;
        (0..SIZE).flat_map(|y| (0..SIZE).map(move |x| Self::new(x, y)))
    }
}

/// A relative displacement between two cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Offset {
    dx: i8,
    dy: i8,
}

impl Offset {
    pub const ZERO: Self = Self::new(0, 0);

    #[must_use]
    pub const fn new(dx: i8, dy: i8) -> Self {
        Self { dx, dy }
    }

    #[must_use]
    pub const fn dx(self) -> i8 {
        self.dx
    }

    #[must_use]
    pub const fn dy(self) -> i8 {
        self.dy
    }

    /// Unit step in the direction of this offset (each component in `-1..=1`).
    #[must_use]
    pub const fn signum(self) -> Self {
        Self::new(self.dx.signum(), self.dy.signum())
    }

    #[must_use]
    pub const fn scaled(self, factor: i8) -> Self {
        Self::new(self.dx * factor, self.dy * factor)
    }

    /// `true` for horizontal, vertical and diagonal displacements.
    #[must_use]
    pub const fn is_ray(self) -> bool {
        (self.dx != 0 || self.dy != 0)
            && (self.dx == 0 || self.dy == 0 || self.dx.abs() == self.dy.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_new_rejects_out_of_board() {
        assert!(Position::try_new(0, 0).is_ok());
        assert!(Position::try_new(7, 7).is_ok());
        assert!(Position::try_new(-1, 0).is_err());
        assert!(Position::try_new(0, 8).is_err());
        assert!(Position::try_new(8, 3).is_err());
    }

    #[test]
    fn test_offset_stays_on_board() {
        let pos = Position::new(1, 0);
        assert_eq!(pos.offset(Offset::new(1, 2)), Some(Position::new(2, 2)));
        assert_eq!(pos.offset(Offset::new(-1, 2)), Some(Position::new(0, 2)));
        assert_eq!(pos.offset(Offset::new(-2, 1)), None);
        assert_eq!(pos.offset(Offset::new(0, -1)), None);
    }

    #[test]
    fn test_offset_to_and_signum() {
        let from = Position::new(2, 5);
        let to = Position::new(6, 1);
        let offset = from.offset_to(to);
        assert_eq!(offset, Offset::new(4, -4));
        assert_eq!(offset.signum(), Offset::new(1, -1));
        assert!(offset.is_ray());
        assert!(!Offset::new(1, 2).is_ray());
        assert!(!Offset::ZERO.is_ray());
    }

    #[test]
    fn test_all_cells_in_index_order() {
        let indices: Vec<_> = Position::all().map(Position::index).collect();
        assert_eq!(indices, (0..BOARD_SIZE * BOARD_SIZE).collect::<Vec<_>>());
        assert_eq!(Position::all().nth(1), Some(Position::new(1, 0)));
    }

    #[test]
    fn test_serde_rejects_out_of_board() {
        let pos: Position = serde_json::from_str(r#"{"x":3,"y":4}"#).unwrap();
        assert_eq!(pos, Position::new(3, 4));
        assert_eq!(serde_json::to_string(&pos).unwrap(), r#"{"x":3,"y":4}"#);

        let result: Result<Position, _> = serde_json::from_str(r#"{"x":3,"y":9}"#);
        assert!(result.is_err());
    }
}
