//! Immutable bitboard position.

use crate::attacks::{
    bishop_attacks, king_attacks, knight_attacks, queen_attacks, rook_attacks,
};
use crate::Bitboard;
use deepmate_core::{Color, FenError, Move, ParsedFen, Piece, Square};

/// An 8x8 mailbox board, indexed `[rank][file]`. Adapter input for callers
/// that keep pieces in an object grid rather than bitboards.
pub type ExternalBoard = [[Option<(Piece, Color)>; 8]; 8];

const INIT_BOARDS: [[Bitboard; 6]; 2] = [
    [
        Bitboard(0x0000_0000_0000_FF00), // white pawns
        Bitboard(0x0000_0000_0000_0042), // white knights
        Bitboard(0x0000_0000_0000_0024), // white bishops
        Bitboard(0x0000_0000_0000_0081), // white rooks
        Bitboard(0x0000_0000_0000_0008), // white queen
        Bitboard(0x0000_0000_0000_0010), // white king
    ],
    [
        Bitboard(0x00FF_0000_0000_0000), // black pawns
        Bitboard(0x4200_0000_0000_0000), // black knights
        Bitboard(0x2400_0000_0000_0000), // black bishops
        Bitboard(0x8100_0000_0000_0000), // black rooks
        Bitboard(0x0800_0000_0000_0000), // black queen
        Bitboard(0x1000_0000_0000_0000), // black king
    ],
];

/// A chess position: twelve piece bitboards plus derived occupancy.
///
/// Positions are immutable. [`Position::apply_move`] and
/// [`Position::null_move`] return new positions, and the occupancy
/// aggregates are recomputed from the piece boards on every construction, so
/// they can never drift out of sync.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Position {
    boards: [[Bitboard; 6]; 2],
    occupancy: [Bitboard; 2],
    /// The side to move next.
    pub side_to_move: Color,
    /// Fullmove number, starting at 1 and incrementing after Black's move.
    pub move_number: u32,
}

impl Position {
    fn new(boards: [[Bitboard; 6]; 2], side_to_move: Color, move_number: u32) -> Self {
        let occupancy = [
            Self::union(&boards[Color::White.index()]),
            Self::union(&boards[Color::Black.index()]),
        ];
        Position {
            boards,
            occupancy,
            side_to_move,
            move_number,
        }
    }

    fn union(boards: &[Bitboard; 6]) -> Bitboard {
        boards[0] | boards[1] | boards[2] | boards[3] | boards[4] | boards[5]
    }

    /// The standard starting position, White to move.
    pub fn initial() -> Self {
        Position::new(INIT_BOARDS, Color::White, 1)
    }

    /// The squares a piece type of the given color starts the game on.
    pub const fn initial_squares(color: Color, piece: Piece) -> Bitboard {
        INIT_BOARDS[color.index()][piece.index()]
    }

    /// Builds a position from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let parsed = ParsedFen::parse(fen)?;
        let mut boards = [[Bitboard::EMPTY; 6]; 2];
        for (sq, piece, color) in &parsed.placement {
            boards[color.index()][piece.index()].set(*sq);
        }
        Ok(Position::new(
            boards,
            parsed.side_to_move,
            parsed.fullmove_number,
        ))
    }

    /// Renders the position as a FEN string.
    ///
    /// Castling rights, en passant, and the halfmove clock are not modeled,
    /// so those fields are emitted as "- - 0".
    pub fn to_fen(&self) -> String {
        let mut placement = String::new();
        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                match self.piece_at(Square::new(file, rank)) {
                    Some((piece, color)) => {
                        if empty > 0 {
                            placement.push(char::from_digit(empty, 10).unwrap());
                            empty = 0;
                        }
                        placement.push(piece.to_fen_char(color));
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                placement.push(char::from_digit(empty, 10).unwrap());
            }
            if rank > 0 {
                placement.push('/');
            }
        }

        let side = match self.side_to_move {
            Color::White => 'w',
            Color::Black => 'b',
        };
        format!("{} {} - - 0 {}", placement, side, self.move_number)
    }

    /// Builds a position from an 8x8 mailbox grid.
    pub fn from_board(board: &ExternalBoard, side_to_move: Color, move_number: u32) -> Self {
        let mut boards = [[Bitboard::EMPTY; 6]; 2];
        for (rank, row) in board.iter().enumerate() {
            for (file, cell) in row.iter().enumerate() {
                if let Some((piece, color)) = cell {
                    boards[color.index()][piece.index()].set(Square::new(file as u8, rank as u8));
                }
            }
        }
        Position::new(boards, side_to_move, move_number)
    }

    /// Returns the bitboard for one (color, piece) pair.
    #[inline]
    pub fn pieces(&self, color: Color, piece: Piece) -> Bitboard {
        self.boards[color.index()][piece.index()]
    }

    /// Returns all squares occupied by the given color.
    #[inline]
    pub fn occupancy(&self, color: Color) -> Bitboard {
        self.occupancy[color.index()]
    }

    /// Returns all occupied squares.
    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.occupancy[0] | self.occupancy[1]
    }

    /// Returns the piece standing on a square, if any.
    pub fn piece_at(&self, sq: Square) -> Option<(Piece, Color)> {
        for piece in Piece::ALL {
            for color in [Color::White, Color::Black] {
                if self.pieces(color, piece).contains(sq) {
                    return Some((piece, color));
                }
            }
        }
        None
    }

    /// Returns true if the move lands on an opponent piece.
    #[inline]
    pub fn is_capture(&self, mv: &Move) -> bool {
        self.occupancy(mv.color.opposite()).contains(mv.to)
    }

    /// Applies a move, returning the successor position.
    ///
    /// The destination square is cleared across all opponent boards, so a
    /// capture needs no separate handling. Panics if the origin square does
    /// not hold the moving piece.
    pub fn apply_move(&self, mv: &Move) -> Position {
        let mut boards = self.boards;
        let mover = &mut boards[mv.color.index()][mv.piece.index()];
        assert!(
            mover.contains(mv.from),
            "no {} {} on {}",
            mv.color,
            mv.piece,
            mv.from
        );
        mover.clear(mv.from);
        mover.set(mv.to);

        let opponent = mv.color.opposite();
        if self.occupancy(opponent).contains(mv.to) {
            for board in &mut boards[opponent.index()] {
                board.clear(mv.to);
            }
        }

        let move_number = match mv.color {
            Color::White => self.move_number,
            Color::Black => self.move_number + 1,
        };
        Position::new(boards, mv.color.opposite(), move_number)
    }

    /// Returns the same position with only the side to move flipped.
    /// Used to probe what the opponent could do if given a free move.
    pub fn null_move(&self) -> Position {
        Position::new(self.boards, self.side_to_move.opposite(), self.move_number)
    }

    /// Returns the destination squares of all pseudo-legal moves by one
    /// (color, piece) pair. Pawn targets include pushes as well as captures.
    pub fn move_targets(&self, color: Color, piece: Piece) -> Bitboard {
        let own = self.occupancy(color);
        let occupied = self.occupied();
        match piece {
            Piece::Pawn => self.pawn_targets(color),
            Piece::Knight => {
                let mut targets = Bitboard::EMPTY;
                for sq in self.pieces(color, Piece::Knight) {
                    targets |= knight_attacks(sq);
                }
                targets & !own
            }
            Piece::Bishop => {
                let mut targets = Bitboard::EMPTY;
                for sq in self.pieces(color, Piece::Bishop) {
                    targets |= bishop_attacks(sq, occupied);
                }
                targets & !own
            }
            Piece::Rook => {
                let mut targets = Bitboard::EMPTY;
                for sq in self.pieces(color, Piece::Rook) {
                    targets |= rook_attacks(sq, occupied);
                }
                targets & !own
            }
            Piece::Queen => {
                let mut targets = Bitboard::EMPTY;
                for sq in self.pieces(color, Piece::Queen) {
                    targets |= queen_attacks(sq, occupied);
                }
                targets & !own
            }
            Piece::King => {
                let mut targets = Bitboard::EMPTY;
                for sq in self.pieces(color, Piece::King) {
                    targets |= king_attacks(sq);
                }
                targets & !own
            }
        }
    }

    fn pawn_targets(&self, color: Color) -> Bitboard {
        let pawns = self.pieces(color, Piece::Pawn);
        let empty = !self.occupied();
        let theirs = self.occupancy(color.opposite());

        match color {
            Color::White => {
                let single = pawns.north() & empty;
                let double = (single & Bitboard::RANKS[2]).north() & empty;
                let captures = (pawns.north_west() | pawns.north_east()) & theirs;
                single | double | captures
            }
            Color::Black => {
                let single = pawns.south() & empty;
                let double = (single & Bitboard::RANKS[5]).south() & empty;
                let captures = (pawns.south_west() | pawns.south_east()) & theirs;
                single | double | captures
            }
        }
    }

    /// Returns the union of [`Position::move_targets`] over all piece types.
    pub fn all_targets(&self, color: Color) -> Bitboard {
        let mut targets = Bitboard::EMPTY;
        for piece in Piece::ALL {
            targets |= self.move_targets(color, piece);
        }
        targets
    }

    /// Endgame: 20 or fewer pieces remain in total.
    #[inline]
    pub fn is_endgame(&self) -> bool {
        self.occupied().count() <= 20
    }

    /// Midgame or later: 28 or fewer pieces remain in total.
    #[inline]
    pub fn is_midgame(&self) -> bool {
        self.occupied().count() <= 28
    }

    /// Returns true if the given color is under immediate tactical pressure.
    ///
    /// A threatened king or queen qualifies on its own. Otherwise threats are
    /// weighted, starting at 2, and the threshold is 3: one threatened minor
    /// or rook tips it over.
    pub fn is_tactical(&self, color: Color) -> bool {
        let threats = self.all_targets(color.opposite());

        if (threats & self.pieces(color, Piece::King)).is_not_empty() {
            return true;
        }
        if (threats & self.pieces(color, Piece::Queen)).is_not_empty() {
            return true;
        }

        let mut attacked = 2;
        attacked += (threats & self.pieces(color, Piece::Knight)).count();
        if attacked >= 3 {
            return true;
        }
        attacked += (threats & self.pieces(color, Piece::Bishop)).count();
        if attacked >= 3 {
            return true;
        }
        attacked += (threats & self.pieces(color, Piece::Rook)).count();
        attacked >= 3
    }
}

impl std::fmt::Debug for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Position ({} to move, move {})", self.side_to_move, self.move_number)?;
        for rank in (0..8).rev() {
            for file in 0..8 {
                let c = match self.piece_at(Square::new(file, rank)) {
                    Some((piece, color)) => piece.to_fen_char(color),
                    None => '.',
                };
                write!(f, "{} ", c)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    #[test]
    fn initial_position_layout() {
        let pos = Position::initial();
        assert_eq!(pos.occupied().count(), 32);
        assert_eq!(pos.side_to_move, Color::White);
        assert_eq!(pos.move_number, 1);
        assert_eq!(pos.piece_at(sq("e1")), Some((Piece::King, Color::White)));
        assert_eq!(pos.piece_at(sq("d8")), Some((Piece::Queen, Color::Black)));
        assert_eq!(pos.piece_at(sq("e4")), None);
        assert_eq!(pos.pieces(Color::White, Piece::Pawn).count(), 8);
    }

    #[test]
    fn fen_round_trip() {
        let pos = Position::initial();
        assert_eq!(
            pos.to_fen(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w - - 0 1"
        );
        let back = Position::from_fen(&pos.to_fen()).unwrap();
        assert_eq!(back, pos);
    }

    #[test]
    fn from_fen_partial_position() {
        let pos = Position::from_fen("8/8/8/3k4/8/3K4/8/8 w - - 0 40").unwrap();
        assert_eq!(pos.occupied().count(), 2);
        assert_eq!(pos.piece_at(sq("d3")), Some((Piece::King, Color::White)));
        assert_eq!(pos.move_number, 40);
    }

    #[test]
    fn apply_move_quiet() {
        let pos = Position::initial();
        let mv = Move::new(Piece::Pawn, Color::White, sq("e2"), sq("e4"));
        let next = pos.apply_move(&mv);

        assert_eq!(next.piece_at(sq("e4")), Some((Piece::Pawn, Color::White)));
        assert_eq!(next.piece_at(sq("e2")), None);
        assert_eq!(next.side_to_move, Color::Black);
        assert_eq!(next.move_number, 1);
        assert_eq!(next.occupied().count(), 32);
        // The original is untouched.
        assert_eq!(pos.piece_at(sq("e2")), Some((Piece::Pawn, Color::White)));
    }

    #[test]
    fn apply_move_capture_clears_target() {
        let pos = Position::from_fen("8/8/8/3p4/8/8/8/3R4 w - - 0 1").unwrap();
        let mv = Move::new(Piece::Rook, Color::White, sq("d1"), sq("d5"));
        let next = pos.apply_move(&mv);

        assert_eq!(next.piece_at(sq("d5")), Some((Piece::Rook, Color::White)));
        assert_eq!(next.occupancy(Color::Black).count(), 0);
        assert_eq!(next.occupied().count(), 1);
    }

    #[test]
    fn move_number_increments_after_black() {
        let pos = Position::initial();
        let next = pos.apply_move(&Move::new(Piece::Pawn, Color::White, sq("e2"), sq("e4")));
        assert_eq!(next.move_number, 1);
        let next = next.apply_move(&Move::new(Piece::Pawn, Color::Black, sq("e7"), sq("e5")));
        assert_eq!(next.move_number, 2);
    }

    #[test]
    #[should_panic]
    fn apply_move_rejects_empty_origin() {
        let pos = Position::initial();
        let mv = Move::new(Piece::Pawn, Color::White, sq("e4"), sq("e5"));
        pos.apply_move(&mv);
    }

    #[test]
    fn null_move_flips_side_only() {
        let pos = Position::initial();
        let flipped = pos.null_move();
        assert_eq!(flipped.side_to_move, Color::Black);
        assert_eq!(flipped.occupied(), pos.occupied());
        assert_eq!(flipped.move_number, pos.move_number);
    }

    #[test]
    fn from_board_adapter() {
        let mut grid: ExternalBoard = [[None; 8]; 8];
        grid[0][4] = Some((Piece::King, Color::White));
        grid[7][4] = Some((Piece::King, Color::Black));
        grid[3][3] = Some((Piece::Queen, Color::White));

        let pos = Position::from_board(&grid, Color::Black, 12);
        assert_eq!(pos.piece_at(sq("e1")), Some((Piece::King, Color::White)));
        assert_eq!(pos.piece_at(sq("e8")), Some((Piece::King, Color::Black)));
        assert_eq!(pos.piece_at(sq("d4")), Some((Piece::Queen, Color::White)));
        assert_eq!(pos.side_to_move, Color::Black);
        assert_eq!(pos.move_number, 12);
    }

    #[test]
    fn pawn_targets_from_start() {
        let pos = Position::initial();
        let targets = pos.move_targets(Color::White, Piece::Pawn);
        // Each of the 8 pawns can push one or two squares.
        assert_eq!(targets.count(), 16);
        assert!(targets.contains(sq("e3")));
        assert!(targets.contains(sq("e4")));
        assert!(!targets.contains(sq("e5")));
    }

    #[test]
    fn double_push_blocked_by_intervening_piece() {
        let pos = Position::from_fen("8/8/8/8/8/4n3/4P3/8 w - - 0 1").unwrap();
        let targets = pos.move_targets(Color::White, Piece::Pawn);
        // The knight on e3 blocks both the single and the double push.
        assert!(targets.is_empty());
    }

    #[test]
    fn pawn_captures_respect_file_edges() {
        let pos = Position::from_fen("8/8/8/8/7p/8/P7/8 b - - 0 1").unwrap();
        // The black h4 pawn must not wrap around to capture on a3.
        let targets = pos.move_targets(Color::Black, Piece::Pawn);
        assert!(targets.contains(sq("h3")));
        assert!(!targets.contains(sq("a3")));
    }

    #[test]
    fn phase_predicates() {
        let start = Position::initial();
        assert!(!start.is_endgame());
        assert!(!start.is_midgame());

        let sparse = Position::from_fen("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1").unwrap();
        assert!(sparse.is_endgame());
        assert!(sparse.is_midgame());
    }

    #[test]
    fn tactical_when_king_threatened() {
        // Black rook on e8 stares down the white king on e1.
        let pos = Position::from_fen("4r3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert!(pos.is_tactical(Color::White));
        assert!(!pos.is_tactical(Color::Black));
    }

    #[test]
    fn tactical_when_queen_threatened() {
        let pos = Position::from_fen("4r3/8/8/8/8/8/8/4Q3 w - - 0 1").unwrap();
        assert!(pos.is_tactical(Color::White));
    }

    #[test]
    fn single_minor_threat_is_tactical() {
        // One threatened knight reaches the weighted threshold.
        let pos = Position::from_fen("8/8/8/3r4/8/8/3N4/8 w - - 0 1").unwrap();
        assert!(pos.is_tactical(Color::White));
    }

    #[test]
    fn startpos_is_not_tactical() {
        let pos = Position::initial();
        assert!(!pos.is_tactical(Color::White));
        assert!(!pos.is_tactical(Color::Black));
    }

    #[test]
    fn is_capture_checks_destination() {
        let pos = Position::from_fen("8/8/8/3p4/8/8/8/3R4 w - - 0 1").unwrap();
        let capture = Move::new(Piece::Rook, Color::White, sq("d1"), sq("d5"));
        let quiet = Move::new(Piece::Rook, Color::White, sq("d1"), sq("d4"));
        assert!(pos.is_capture(&capture));
        assert!(!pos.is_capture(&quiet));
    }
}
