//! Opening book support for the early game.
//!
//! An [`OpeningBook`] stores known opening lines as a trie of SAN move
//! tokens and can suggest a continuation for a given move history. The
//! [`OpeningOracle`] wraps a book with the per-game state a player needs:
//! it keeps consulting the book every ply until the game first leaves
//! known theory, then stays silent for the rest of the game.

mod book;
mod opening;
mod oracle;

pub use book::{BookError, OpeningBook};
pub use opening::Opening;
pub use oracle::OpeningOracle;
