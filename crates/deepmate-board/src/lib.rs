//! Bitboard position representation and pseudo-legal move generation.
//!
//! A position is twelve 64-bit piece bitboards (one per color and piece
//! type) plus two occupancy aggregates derived from them on construction.
//! Positions are immutable: applying a move produces a new position.
//!
//! Move generation is *pseudo-legal only*: generated moves obey piece
//! movement rules but are never filtered for leaving the mover's own king
//! attackable. The search layer compensates by refusing to stand in a
//! position where the opponent can capture the king, so correctness depends
//! on searching at least one ply deep. Castling, en passant, and promotion
//! are not modeled at this layer.

mod attacks;
mod bitboard;
mod movegen;
mod position;

pub use attacks::{
    bishop_attacks, king_attacks, knight_attacks, pawn_attacks, queen_attacks, rook_attacks,
};
pub use bitboard::Bitboard;
pub use movegen::{capture_moves, generate_moves, MoveList};
pub use position::{ExternalBoard, Position};
