//! Core types for the deepmate chess engine.
//!
//! This crate provides the fundamental types shared across the engine:
//! - [`Color`] and [`Piece`] for piece identity
//! - [`Square`] for board coordinates
//! - [`Move`] for move representation
//! - [`ParsedFen`] for FEN position parsing

mod color;
mod fen;
mod mov;
mod piece;
mod square;

pub use color::Color;
pub use fen::{FenError, ParsedFen};
pub use mov::Move;
pub use piece::Piece;
pub use square::Square;
