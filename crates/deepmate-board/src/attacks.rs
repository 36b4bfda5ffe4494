//! Attack-set computation for all piece types.
//!
//! Knight, king, and pawn attacks come from 64-entry tables precomputed at
//! compile time. Sliding pieces use the classical ray sweep: a precomputed
//! ray per (direction, square) is cut off at the first occupied square, and
//! the blocker square itself stays in the set (the move generator decides
//! whether it is a capture). Wrap guards are baked into the tables, so a
//! west-going ray never leaks from file a to file h.

use crate::Bitboard;
use deepmate_core::{Color, Square};

/// The eight compass directions a sliding piece can travel.
#[derive(Clone, Copy)]
enum Direction {
    North = 0,
    South = 1,
    East = 2,
    West = 3,
    NorthEast = 4,
    NorthWest = 5,
    SouthEast = 6,
    SouthWest = 7,
}

impl Direction {
    const ORTHOGONAL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    const DIAGONAL: [Direction; 4] = [
        Direction::NorthEast,
        Direction::NorthWest,
        Direction::SouthEast,
        Direction::SouthWest,
    ];

    /// (rank step, file step) for ray walking.
    const fn deltas(self) -> (i8, i8) {
        match self {
            Direction::North => (1, 0),
            Direction::South => (-1, 0),
            Direction::East => (0, 1),
            Direction::West => (0, -1),
            Direction::NorthEast => (1, 1),
            Direction::NorthWest => (1, -1),
            Direction::SouthEast => (-1, 1),
            Direction::SouthWest => (-1, -1),
        }
    }

    /// True if the ray runs toward increasing square indices, so the
    /// nearest blocker is the lowest set bit rather than the highest.
    const fn ascending(self) -> bool {
        matches!(
            self,
            Direction::North | Direction::East | Direction::NorthEast | Direction::NorthWest
        )
    }
}

/// Rays per direction and origin square, wrap-guarded, origin excluded.
const RAYS: [[Bitboard; 64]; 8] = compute_rays();

/// Precomputed knight jump table.
const KNIGHT_ATTACKS: [Bitboard; 64] = compute_knight_attacks();

/// Precomputed king step table.
const KING_ATTACKS: [Bitboard; 64] = compute_king_attacks();

/// Precomputed pawn capture table, indexed [color][square].
const PAWN_ATTACKS: [[Bitboard; 64]; 2] = compute_pawn_attacks();

/// Returns knight attacks from the given square.
#[inline]
pub fn knight_attacks(sq: Square) -> Bitboard {
    KNIGHT_ATTACKS[sq.index() as usize]
}

/// Returns king attacks from the given square.
#[inline]
pub fn king_attacks(sq: Square) -> Bitboard {
    KING_ATTACKS[sq.index() as usize]
}

/// Returns the squares a pawn of the given color attacks from `sq`.
#[inline]
pub fn pawn_attacks(sq: Square, color: Color) -> Bitboard {
    PAWN_ATTACKS[color.index()][sq.index() as usize]
}

/// Returns bishop attacks from `sq` given the occupied-square set.
pub fn bishop_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    sliding_attacks(sq, occupied, &Direction::DIAGONAL)
}

/// Returns rook attacks from `sq` given the occupied-square set.
pub fn rook_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    sliding_attacks(sq, occupied, &Direction::ORTHOGONAL)
}

/// Returns queen attacks from `sq` given the occupied-square set.
pub fn queen_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    bishop_attacks(sq, occupied) | rook_attacks(sq, occupied)
}

fn sliding_attacks(sq: Square, occupied: Bitboard, directions: &[Direction; 4]) -> Bitboard {
    let mut attacks = Bitboard::EMPTY;
    for &dir in directions {
        let ray = RAYS[dir as usize][sq.index() as usize];
        attacks |= ray;

        let blockers = ray & occupied;
        let first = if dir.ascending() {
            blockers.lsb()
        } else {
            blockers.msb()
        };
        if let Some(blocker) = first {
            // Everything beyond the first blocker is shadowed.
            attacks &= !RAYS[dir as usize][blocker.index() as usize];
        }
    }
    attacks
}

const fn compute_rays() -> [[Bitboard; 64]; 8] {
    let mut rays = [[Bitboard::EMPTY; 64]; 8];
    let deltas = [
        (1i8, 0i8),
        (-1, 0),
        (0, 1),
        (0, -1),
        (1, 1),
        (1, -1),
        (-1, 1),
        (-1, -1),
    ];

    let mut dir = 0;
    while dir < 8 {
        let (dr, df) = (deltas[dir].0, deltas[dir].1);
        let mut sq = 0u8;
        while sq < 64 {
            let mut rank = (sq / 8) as i8 + dr;
            let mut file = (sq % 8) as i8 + df;
            let mut bits = 0u64;
            while rank >= 0 && rank < 8 && file >= 0 && file < 8 {
                bits |= 1u64 << (rank * 8 + file);
                rank += dr;
                file += df;
            }
            rays[dir][sq as usize] = Bitboard(bits);
            sq += 1;
        }
        dir += 1;
    }
    rays
}

const fn compute_knight_attacks() -> [Bitboard; 64] {
    let jumps = [
        (2i8, 1i8),
        (2, -1),
        (-2, 1),
        (-2, -1),
        (1, 2),
        (1, -2),
        (-1, 2),
        (-1, -2),
    ];
    let mut attacks = [Bitboard::EMPTY; 64];
    let mut sq = 0u8;
    while sq < 64 {
        let rank = (sq / 8) as i8;
        let file = (sq % 8) as i8;
        let mut bits = 0u64;
        let mut j = 0;
        while j < 8 {
            let r = rank + jumps[j].0;
            let f = file + jumps[j].1;
            if r >= 0 && r < 8 && f >= 0 && f < 8 {
                bits |= 1u64 << (r * 8 + f);
            }
            j += 1;
        }
        attacks[sq as usize] = Bitboard(bits);
        sq += 1;
    }
    attacks
}

const fn compute_king_attacks() -> [Bitboard; 64] {
    let steps = [
        (1i8, 0i8),
        (-1, 0),
        (0, 1),
        (0, -1),
        (1, 1),
        (1, -1),
        (-1, 1),
        (-1, -1),
    ];
    let mut attacks = [Bitboard::EMPTY; 64];
    let mut sq = 0u8;
    while sq < 64 {
        let rank = (sq / 8) as i8;
        let file = (sq % 8) as i8;
        let mut bits = 0u64;
        let mut s = 0;
        while s < 8 {
            let r = rank + steps[s].0;
            let f = file + steps[s].1;
            if r >= 0 && r < 8 && f >= 0 && f < 8 {
                bits |= 1u64 << (r * 8 + f);
            }
            s += 1;
        }
        attacks[sq as usize] = Bitboard(bits);
        sq += 1;
    }
    attacks
}

const fn compute_pawn_attacks() -> [[Bitboard; 64]; 2] {
    let mut attacks = [[Bitboard::EMPTY; 64]; 2];
    let mut sq = 0u8;
    while sq < 64 {
        let rank = sq / 8;
        let file = sq % 8;

        // White pawns capture toward rank 8.
        let mut white = 0u64;
        if rank < 7 && file < 7 {
            white |= 1u64 << (sq + 9);
        }
        if rank < 7 && file > 0 {
            white |= 1u64 << (sq + 7);
        }
        attacks[0][sq as usize] = Bitboard(white);

        // Black pawns capture toward rank 1.
        let mut black = 0u64;
        if rank > 0 && file < 7 {
            black |= 1u64 << (sq - 7);
        }
        if rank > 0 && file > 0 {
            black |= 1u64 << (sq - 9);
        }
        attacks[1][sq as usize] = Bitboard(black);

        sq += 1;
    }
    attacks
}
