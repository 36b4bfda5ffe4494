//! Move representation.

use crate::{Color, Piece, Square};
use std::fmt;

/// A chess move: which piece of which color moves from where to where.
///
/// A move does not carry the captured piece or a score; both are derived by
/// querying the position at generation or ordering time. Equality is
/// structural over all four fields.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub piece: Piece,
    pub color: Color,
    pub from: Square,
    pub to: Square,
}

impl Move {
    /// Creates a new move.
    #[inline]
    pub const fn new(piece: Piece, color: Color, from: Square, to: Square) -> Self {
        Move {
            piece,
            color,
            from,
            to,
        }
    }

    /// Returns the coordinate notation for this move (e.g., "e2e4").
    pub fn to_uci(self) -> String {
        format!("{}{}", self.from, self.to)
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({} {} {})", self.color, self.piece, self.to_uci())
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uci())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    #[test]
    fn move_uci() {
        let m = Move::new(Piece::Pawn, Color::White, sq("e2"), sq("e4"));
        assert_eq!(m.to_uci(), "e2e4");
        assert_eq!(format!("{}", m), "e2e4");
    }

    #[test]
    fn move_structural_equality() {
        let a = Move::new(Piece::Knight, Color::White, sq("g1"), sq("f3"));
        let b = Move::new(Piece::Knight, Color::White, sq("g1"), sq("f3"));
        let c = Move::new(Piece::Knight, Color::Black, sq("g1"), sq("f3"));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
