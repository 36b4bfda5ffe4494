//! Static position evaluation.
//!
//! All scores are white-positive centipawns: positive favors White,
//! negative favors Black. The search layer is responsible for orienting
//! scores toward whichever side it is maximizing for.
//!
//! There is no checkmate detection here. A missing king scores as a
//! [`KING_VALUE`]-sized swing, which is the terminal-state sentinel the
//! search relies on.

mod score;

pub use score::{
    bishop_pairs, center_control, evaluate, king_presence, king_safety, knight_on_edge,
    knight_outposts, material, mobility, mvv_lva, pawn_structure, piece_development, piece_value,
    rook_open_files, KING_VALUE,
};
