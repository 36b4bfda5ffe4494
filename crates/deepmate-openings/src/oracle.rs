use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::book::OpeningBook;

/// Per-game opening state wrapped around a shared [`OpeningBook`].
///
/// The oracle consults the book on every ply while the game is still in
/// known theory. The first time the move history falls outside the book
/// the oracle switches off for good: once a game has left theory there
/// is no position from which it can re-enter a line from its start.
#[derive(Debug)]
pub struct OpeningOracle {
    book: OpeningBook,
    rng: StdRng,
    in_book: bool,
}

impl OpeningOracle {
    pub fn new(book: OpeningBook) -> Self {
        OpeningOracle {
            book,
            rng: StdRng::from_os_rng(),
            in_book: true,
        }
    }

    /// Builds an oracle over the compiled-in book.
    pub fn with_builtin() -> Self {
        Self::new(OpeningBook::builtin())
    }

    /// Builds an oracle whose random choices are reproducible.
    pub fn seeded(book: OpeningBook, seed: u64) -> Self {
        OpeningOracle {
            book,
            rng: StdRng::seed_from_u64(seed),
            in_book: true,
        }
    }

    /// Whether the game is still inside known theory.
    pub fn in_book(&self) -> bool {
        self.in_book
    }

    /// Suggests a book move for the game so far, or `None` once the game
    /// has left theory. The first miss latches the oracle off.
    pub fn suggest_move<S: AsRef<str>>(&mut self, history: &[S]) -> Option<String> {
        if !self.in_book {
            return None;
        }
        match self.book.suggest(history, &mut self.rng) {
            Some(san) => Some(san),
            None => {
                tracing::info!("left opening theory after {} plies", history.len());
                self.in_book = false;
                None
            }
        }
    }
}

impl Default for OpeningOracle {
    fn default() -> Self {
        Self::with_builtin()
    }
}
