//! History heuristic for quiet-move ordering.

use deepmate_core::{Piece, Square};

/// Accumulated ordering weights for quiet moves, indexed by moving piece
/// type and destination square.
///
/// Entries grow by depth squared whenever a quiet move causes a cutoff, so
/// moves that refuted lines near the root are tried earlier in later
/// iterations. The table is purely a heuristic: it influences move order,
/// never the search result.
pub struct HistoryTable {
    table: [[i32; 64]; 6],
}

impl HistoryTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        HistoryTable {
            table: [[0; 64]; 6],
        }
    }

    /// Returns the accumulated weight for moving this piece type to this
    /// square.
    #[inline]
    pub fn score(&self, piece: Piece, to: Square) -> i32 {
        self.table[piece.index()][to.index() as usize]
    }

    /// Rewards a quiet move that caused a cutoff at the given depth.
    pub fn record_cutoff(&mut self, piece: Piece, to: Square, depth: i32) {
        self.table[piece.index()][to.index() as usize] += depth * depth;
    }

    /// Resets all weights to zero.
    pub fn clear(&mut self) {
        self.table = [[0; 64]; 6];
    }
}

impl Default for HistoryTable {
    fn default() -> Self {
        Self::new()
    }
}
