//! Evaluation terms and the master combining function.

use deepmate_board::{king_attacks, pawn_attacks, Bitboard, Position};
use deepmate_core::{Color, Move, Piece, Square};

const PAWN_VALUE: i32 = 100;
const KNIGHT_VALUE: i32 = 320;
const BISHOP_VALUE: i32 = 330;
const ROOK_VALUE: i32 = 500;
const QUEEN_VALUE: i32 = 1200;

/// Value of a king's presence on the board. Large enough to dominate any
/// realistic material imbalance, so losing the king always dominates the
/// evaluation.
pub const KING_VALUE: i32 = 5000;

const DOUBLED_PAWN_PENALTY: i32 = -15;
const ISOLATED_PAWN_PENALTY: i32 = -25;
const PASSED_PAWN_BONUS: i32 = 40;

const KNIGHT_MOBILITY_VALUE: i32 = 3;
const BISHOP_MOBILITY_VALUE: i32 = 3;
const ROOK_MOBILITY_VALUE: i32 = 5;
const QUEEN_MOBILITY_VALUE: i32 = 5;
const BISHOP_PAIR_VALUE: i32 = 60;
const KNIGHT_OUTPOST_VALUE: i32 = 40;

const DEVELOPMENT_VALUE: i32 = 40;
const KNIGHT_EDGE_PENALTY: i32 = -10;
const CENTER_CONTROL_VALUE: i32 = 20;
const EXTENDED_CONTROL_VALUE: i32 = 10;
const PAWN_SHIELD_BONUS: i32 = 20;
const OPEN_KING_ZONE_PENALTY: i32 = -10;
const ROOK_OPEN_FILE_BONUS: i32 = 30;

// d4, e4, d5, e5
const CENTER_MASK: Bitboard = Bitboard(0x0000_0018_1800_0000);
// d3, e3, d6, e6
const EXTENDED_CENTER_MASK: Bitboard = Bitboard(0x0000_1800_0018_0000);

/// Exchange value of a piece. Kings count zero; their worth is handled by
/// [`king_presence`], not material.
#[inline]
pub const fn piece_value(piece: Piece) -> i32 {
    match piece {
        Piece::Pawn => PAWN_VALUE,
        Piece::Knight => KNIGHT_VALUE,
        Piece::Bishop => BISHOP_VALUE,
        Piece::Rook => ROOK_VALUE,
        Piece::Queen => QUEEN_VALUE,
        Piece::King => 0,
    }
}

/// Material balance, white minus black, kings excluded.
pub fn material(pos: &Position) -> i32 {
    let side = |color: Color| -> i32 {
        Piece::ALL
            .iter()
            .map(|&p| pos.pieces(color, p).count() as i32 * piece_value(p))
            .sum()
    };
    side(Color::White) - side(Color::Black)
}

/// The terminal-state sentinel: a huge swing when a side's king is gone.
pub fn king_presence(pos: &Position) -> i32 {
    let mut score = 0;
    if pos.pieces(Color::White, Piece::King).is_empty() {
        score -= KING_VALUE;
    }
    if pos.pieces(Color::Black, Piece::King).is_empty() {
        score += KING_VALUE;
    }
    score
}

/// Doubled, isolated, and passed pawns, white minus black.
pub fn pawn_structure(pos: &Position) -> i32 {
    let white = pos.pieces(Color::White, Piece::Pawn);
    let black = pos.pieces(Color::Black, Piece::Pawn);
    sided_pawn_structure(white, black, Color::White)
        - sided_pawn_structure(black, white, Color::Black)
}

fn sided_pawn_structure(pawns: Bitboard, enemy_pawns: Bitboard, color: Color) -> i32 {
    let mut score = 0;

    for file in 0..8 {
        let in_file = pawns & Bitboard::FILES[file];
        if in_file.is_empty() {
            continue;
        }

        if in_file.count() > 1 {
            score += DOUBLED_PAWN_PENALTY * (in_file.count() as i32 - 1);
        }

        if (pawns & adjacent_files(file)).is_empty() {
            score += ISOLATED_PAWN_PENALTY;
        }
    }

    for pawn in pawns {
        if (enemy_pawns & front_span(pawn, color)).is_empty() {
            score += PASSED_PAWN_BONUS;
        }
    }

    score
}

fn adjacent_files(file: usize) -> Bitboard {
    let mut mask = Bitboard::EMPTY;
    if file > 0 {
        mask |= Bitboard::FILES[file - 1];
    }
    if file < 7 {
        mask |= Bitboard::FILES[file + 1];
    }
    mask
}

/// Squares an enemy pawn would have to stand on to stop this pawn: the
/// pawn's own file and both adjacent files, ranks strictly ahead of it.
fn front_span(pawn: Square, color: Color) -> Bitboard {
    let file = pawn.file() as usize;
    let files = Bitboard::FILES[file] | adjacent_files(file);
    let ahead = match color {
        Color::White => {
            if pawn.rank() == 7 {
                Bitboard::EMPTY
            } else {
                Bitboard(!0u64 << ((pawn.rank() as u64 + 1) * 8))
            }
        }
        Color::Black => {
            if pawn.rank() == 0 {
                Bitboard::EMPTY
            } else {
                Bitboard((1u64 << (pawn.rank() as u64 * 8)) - 1)
            }
        }
    };
    files & ahead
}

/// Bonus for each knight and bishop no longer on its starting square.
pub fn piece_development(pos: &Position) -> i32 {
    let side = |color: Color| -> i32 {
        let mut developed = 0;
        for piece in [Piece::Knight, Piece::Bishop] {
            let moved = Position::initial_squares(color, piece) & !pos.pieces(color, piece);
            developed += moved.count() as i32;
        }
        developed * DEVELOPMENT_VALUE
    };
    side(Color::White) - side(Color::Black)
}

/// Control of the four center squares and the four squares behind them,
/// measured over pawn, knight, bishop, and queen target boards.
pub fn center_control(pos: &Position) -> i32 {
    let side = |color: Color| -> (i32, i32) {
        let attacked = pos.move_targets(color, Piece::Pawn)
            | pos.move_targets(color, Piece::Knight)
            | pos.move_targets(color, Piece::Bishop)
            | pos.move_targets(color, Piece::Queen);
        (
            (attacked & CENTER_MASK).count() as i32,
            (attacked & EXTENDED_CENTER_MASK).count() as i32,
        )
    };

    let (w_center, w_extended) = side(Color::White);
    let (b_center, b_extended) = side(Color::Black);
    (w_center - b_center) * CENTER_CONTROL_VALUE
        + (w_extended - b_extended) * EXTENDED_CONTROL_VALUE
}

/// Pawn shield in front of each king, minus open squares around it.
pub fn king_safety(pos: &Position) -> i32 {
    sided_king_safety(pos, Color::White) - sided_king_safety(pos, Color::Black)
}

fn sided_king_safety(pos: &Position, color: Color) -> i32 {
    let king = match pos.pieces(color, Piece::King).lsb() {
        Some(sq) => sq,
        None => return 0,
    };

    let king_bit = Bitboard::from_square(king);
    let shield_squares = match color {
        Color::White => king_bit.north() | king_bit.north_west() | king_bit.north_east(),
        Color::Black => king_bit.south() | king_bit.south_west() | king_bit.south_east(),
    };
    let shield = (pos.pieces(color, Piece::Pawn) & shield_squares).count() as i32;

    let open = (king_attacks(king) & !pos.occupancy(color)).count() as i32;

    shield * PAWN_SHIELD_BONUS + open * OPEN_KING_ZONE_PENALTY
}

/// Bonus per rook on a file holding no pawns of either color.
pub fn rook_open_files(pos: &Position) -> i32 {
    let all_pawns =
        pos.pieces(Color::White, Piece::Pawn) | pos.pieces(Color::Black, Piece::Pawn);

    let mut score = 0;
    for file in Bitboard::FILES {
        if (all_pawns & file).is_empty() {
            score += (pos.pieces(Color::White, Piece::Rook) & file).count() as i32
                * ROOK_OPEN_FILE_BONUS;
            score -= (pos.pieces(Color::Black, Piece::Rook) & file).count() as i32
                * ROOK_OPEN_FILE_BONUS;
        }
    }
    score
}

/// Weighted move-target counts. Knights and bishops always count; rooks and
/// queens only outside the endgame, where heavy-piece mobility says little.
pub fn mobility(pos: &Position) -> i32 {
    let side = |color: Color| -> i32 {
        let mut m = pos.move_targets(color, Piece::Knight).count() as i32
            * KNIGHT_MOBILITY_VALUE
            + pos.move_targets(color, Piece::Bishop).count() as i32 * BISHOP_MOBILITY_VALUE;
        if !pos.is_endgame() {
            m += pos.move_targets(color, Piece::Rook).count() as i32 * ROOK_MOBILITY_VALUE
                + pos.move_targets(color, Piece::Queen).count() as i32 * QUEEN_MOBILITY_VALUE;
        }
        m
    };
    side(Color::White) - side(Color::Black)
}

/// Bonus for holding both bishops.
pub fn bishop_pairs(pos: &Position) -> i32 {
    let mut score = 0;
    if pos.pieces(Color::White, Piece::Bishop).count() >= 2 {
        score += BISHOP_PAIR_VALUE;
    }
    if pos.pieces(Color::Black, Piece::Bishop).count() >= 2 {
        score -= BISHOP_PAIR_VALUE;
    }
    score
}

/// Knights on advanced ranks that no enemy pawn currently attacks.
/// Not scored in the endgame.
pub fn knight_outposts(pos: &Position) -> i32 {
    if pos.is_endgame() {
        return 0;
    }

    let side = |color: Color| -> i32 {
        let enemy_pawn_attacks = pawn_attack_set(pos, color.opposite());
        let advanced = match color {
            Color::White => {
                Bitboard::RANKS[4] | Bitboard::RANKS[5] | Bitboard::RANKS[6]
            }
            Color::Black => {
                Bitboard::RANKS[1] | Bitboard::RANKS[2] | Bitboard::RANKS[3]
            }
        };
        let outposts = advanced & !enemy_pawn_attacks;
        (pos.pieces(color, Piece::Knight) & outposts).count() as i32 * KNIGHT_OUTPOST_VALUE
    };
    side(Color::White) - side(Color::Black)
}

fn pawn_attack_set(pos: &Position, color: Color) -> Bitboard {
    let mut attacks = Bitboard::EMPTY;
    for pawn in pos.pieces(color, Piece::Pawn) {
        attacks |= pawn_attacks(pawn, color);
    }
    attacks
}

/// Penalty per knight on the A or H file.
pub fn knight_on_edge(pos: &Position) -> i32 {
    let edges = Bitboard::FILE_A | Bitboard::FILE_H;
    let white = (pos.pieces(Color::White, Piece::Knight) & edges).count() as i32;
    let black = (pos.pieces(Color::Black, Piece::Knight) & edges).count() as i32;
    (white - black) * KNIGHT_EDGE_PENALTY
}

/// The master evaluation: material weighted to 80%, plus positional terms,
/// plus king presence and safety. White-positive.
pub fn evaluate(pos: &Position) -> i32 {
    let positional = pawn_structure(pos)
        + piece_development(pos)
        + center_control(pos)
        + rook_open_files(pos)
        + mobility(pos)
        + knight_on_edge(pos)
        + bishop_pairs(pos)
        + knight_outposts(pos);
    let king = king_presence(pos) + king_safety(pos);
    material(pos) * 80 / 100 + positional + king
}

/// Capture-ordering heuristic: most valuable victim, least valuable
/// aggressor. Higher is a more promising capture. Quiet moves score
/// negative (zero victim minus the aggressor's own value).
pub fn mvv_lva(mv: &Move, pos: &Position) -> i32 {
    let victim = match pos.piece_at(mv.to) {
        Some((piece, _)) => piece_value(piece),
        None => 0,
    };
    victim - piece_value(mv.piece)
}
