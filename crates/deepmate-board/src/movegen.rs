//! Pseudo-legal move generation.
//!
//! Generated moves obey piece movement rules but are never filtered for
//! king safety; see the crate docs for how the search layer compensates.

use crate::attacks::{
    bishop_attacks, king_attacks, knight_attacks, pawn_attacks, queen_attacks, rook_attacks,
};
use crate::Position;
use deepmate_core::{Color, Move, Piece, Square};

const FILLER: Move = Move::new(
    Piece::Pawn,
    Color::White,
    Square::new(0, 0),
    Square::new(0, 0),
);

/// A list of moves with a fixed maximum capacity.
///
/// Chess positions have at most 218 legal moves, so a fixed-size array
/// avoids heap allocations during move generation.
#[derive(Clone)]
pub struct MoveList {
    moves: [Move; Self::MAX_MOVES],
    len: usize,
}

impl MoveList {
    /// Maximum number of moves in any chess position.
    pub const MAX_MOVES: usize = 256;

    /// Creates an empty move list.
    #[inline]
    pub const fn new() -> Self {
        MoveList {
            moves: [FILLER; Self::MAX_MOVES],
            len: 0,
        }
    }

    /// Adds a move to the list.
    #[inline]
    pub fn push(&mut self, m: Move) {
        debug_assert!(self.len < Self::MAX_MOVES);
        self.moves[self.len] = m;
        self.len += 1;
    }

    /// Returns the number of moves.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the list is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns a slice of the moves.
    #[inline]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.len]
    }

    /// Returns a mutable slice of the moves, for in-place ordering.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [Move] {
        &mut self.moves[..self.len]
    }

    /// Returns an iterator over the moves.
    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.as_slice().iter()
    }

    /// Retains only moves for which the predicate returns true.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&Move) -> bool,
    {
        let mut write = 0;
        for read in 0..self.len {
            if f(&self.moves[read]) {
                self.moves[write] = self.moves[read];
                write += 1;
            }
        }
        self.len = write;
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Index<usize> for MoveList {
    type Output = Move;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        debug_assert!(index < self.len);
        &self.moves[index]
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl std::fmt::Debug for MoveList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

/// Generates all pseudo-legal moves for the given color.
pub fn generate_moves(position: &Position, color: Color) -> MoveList {
    let mut moves = MoveList::new();

    generate_pawn_moves(position, color, &mut moves);
    generate_piece_moves(position, color, Piece::Knight, &mut moves);
    generate_piece_moves(position, color, Piece::Bishop, &mut moves);
    generate_piece_moves(position, color, Piece::Rook, &mut moves);
    generate_piece_moves(position, color, Piece::Queen, &mut moves);
    generate_piece_moves(position, color, Piece::King, &mut moves);

    moves
}

/// Generates pseudo-legal moves that land on an opponent piece.
pub fn capture_moves(position: &Position, color: Color) -> MoveList {
    let mut moves = generate_moves(position, color);
    let theirs = position.occupancy(color.opposite());
    moves.retain(|m| theirs.contains(m.to));
    moves
}

fn generate_pawn_moves(position: &Position, color: Color, moves: &mut MoveList) {
    let empty = !position.occupied();
    let theirs = position.occupancy(color.opposite());
    let forward: i8 = match color {
        Color::White => 8,
        Color::Black => -8,
    };

    for from in position.pieces(color, Piece::Pawn) {
        let push = from.index() as i8 + forward;
        if (0..64).contains(&push) {
            let push_sq = Square::from_index(push as u8).unwrap();
            if empty.contains(push_sq) {
                moves.push(Move::new(Piece::Pawn, color, from, push_sq));

                if from.rank() == color.pawn_start_rank() {
                    let double_sq = Square::from_index((push + forward) as u8).unwrap();
                    if empty.contains(double_sq) {
                        moves.push(Move::new(Piece::Pawn, color, from, double_sq));
                    }
                }
            }
        }

        for to in pawn_attacks(from, color) & theirs {
            moves.push(Move::new(Piece::Pawn, color, from, to));
        }
    }
}

fn generate_piece_moves(position: &Position, color: Color, piece: Piece, moves: &mut MoveList) {
    let own = position.occupancy(color);
    let occupied = position.occupied();

    for from in position.pieces(color, piece) {
        let attacks = match piece {
            Piece::Knight => knight_attacks(from),
            Piece::Bishop => bishop_attacks(from, occupied),
            Piece::Rook => rook_attacks(from, occupied),
            Piece::Queen => queen_attacks(from, occupied),
            Piece::King => king_attacks(from),
            Piece::Pawn => unreachable!("pawn moves are generated separately"),
        };
        for to in attacks & !own {
            moves.push(Move::new(piece, color, from, to));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    #[test]
    fn startpos_has_twenty_moves() {
        let pos = Position::initial();
        assert_eq!(generate_moves(&pos, Color::White).len(), 20);
        assert_eq!(generate_moves(&pos, Color::Black).len(), 20);
    }

    #[test]
    fn startpos_has_no_captures() {
        let pos = Position::initial();
        assert!(capture_moves(&pos, Color::White).is_empty());
    }

    #[test]
    fn knight_moves_from_start() {
        let pos = Position::initial();
        let moves = generate_moves(&pos, Color::White);
        let knight_moves: Vec<_> = moves
            .iter()
            .filter(|m| m.piece == Piece::Knight)
            .collect();
        assert_eq!(knight_moves.len(), 4);
    }

    #[test]
    fn capture_moves_only_hit_opponents() {
        let pos = Position::from_fen("8/8/8/3p4/8/8/3R4/3K4 w - - 0 1").unwrap();
        let captures = capture_moves(&pos, Color::White);
        assert_eq!(captures.len(), 1);
        assert_eq!(captures[0].to, sq("d5"));
        assert_eq!(captures[0].piece, Piece::Rook);
    }

    #[test]
    fn moves_may_leave_king_attackable() {
        // The white rook on e2 is pinned against its king, but move
        // generation does not know about pins.
        let pos = Position::from_fen("4r3/8/8/8/8/8/4R3/4K3 w - - 0 1").unwrap();
        let moves = generate_moves(&pos, Color::White);
        assert!(moves
            .iter()
            .any(|m| m.piece == Piece::Rook && m.to == sq("a2")));
    }

    #[test]
    fn king_capture_is_generated() {
        // No check rules: capturing the king is an ordinary move here.
        let pos = Position::from_fen("8/8/8/8/8/8/4k3/4K3 w - - 0 1").unwrap();
        let moves = generate_moves(&pos, Color::White);
        assert!(moves
            .iter()
            .any(|m| m.piece == Piece::King && m.to == sq("e2")));
    }

    #[test]
    fn move_list_retain() {
        let pos = Position::initial();
        let mut moves = generate_moves(&pos, Color::White);
        moves.retain(|m| m.piece == Piece::Pawn);
        assert_eq!(moves.len(), 16);
    }

    proptest! {
        /// Applying any generated move keeps the board consistent: the
        /// mover's piece count is unchanged, the opponent loses at most one
        /// piece, and the twelve piece boards stay pairwise disjoint.
        #[test]
        fn applying_generated_moves_preserves_consistency(choices in prop::collection::vec(0usize..256, 1..30)) {
            let mut pos = Position::initial();
            for choice in choices {
                let color = pos.side_to_move;
                let moves = generate_moves(&pos, color);
                if moves.is_empty() {
                    break;
                }
                let mv = moves[choice % moves.len()];

                let before_own = pos.occupancy(color).count();
                let before_theirs = pos.occupancy(color.opposite()).count();
                let next = pos.apply_move(&mv);

                prop_assert_eq!(next.occupancy(color).count(), before_own);
                let lost = before_theirs - next.occupancy(color.opposite()).count();
                prop_assert!(lost <= 1);
                prop_assert_eq!(next.side_to_move, color.opposite());

                // Disjointness: if any square were set on two boards, the
                // per-board counts would sum past the occupancy count.
                let mut total = 0;
                for c in [Color::White, Color::Black] {
                    for p in Piece::ALL {
                        total += next.pieces(c, p).count();
                    }
                }
                prop_assert_eq!(total, next.occupied().count());

                pos = next;
            }
        }

        /// Every generated move starts on a square holding the moving piece
        /// and never lands on a friendly piece.
        #[test]
        fn generated_moves_are_well_formed(choices in prop::collection::vec(0usize..256, 1..20)) {
            let mut pos = Position::initial();
            for choice in choices {
                let color = pos.side_to_move;
                let moves = generate_moves(&pos, color);
                if moves.is_empty() {
                    break;
                }
                for m in &moves {
                    prop_assert!(pos.pieces(color, m.piece).contains(m.from));
                    prop_assert!(!pos.occupancy(color).contains(m.to));
                }
                pos = pos.apply_move(&moves[choice % moves.len()]);
            }
        }
    }
}
