//! The search engine: iterative deepening, alpha-beta, null-move pruning,
//! critical-move extensions, and quiescence.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use deepmate_board::{capture_moves, generate_moves, MoveList, Position};
use deepmate_core::{Color, Move, Piece};
use deepmate_eval::{evaluate, mvv_lva, KING_VALUE};

use crate::history::HistoryTable;
use crate::time::TimeControl;

/// Aspiration window half-width in centipawns.
const ASPIRATION_WINDOW: i32 = 100;

/// Quiescence recursion cap; capture chains cannot run longer than the
/// piece count anyway, this just bounds pathological positions.
const MAX_QUIESCENCE_DEPTH: u32 = 16;

/// Cumulative critical-move extension budget per line. Mutual checks can
/// chain indefinitely (two bare kings shadowing each other already qualify),
/// and an uncapped extension keeps the depth from ever decreasing along
/// such a line.
const MAX_EXTENSIONS: u32 = 3;

/// Signal that the time budget expired mid-search.
///
/// Cancellation is normal control flow, not an error: a cancelled frame has
/// no usable score, and every caller must propagate the signal instead of
/// mistaking a half-finished search for a completed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

/// Outcome of a search: the deepest fully completed iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult {
    /// Score oriented for the side that moved at the root (positive is good
    /// for the mover).
    pub score: i32,
    /// The best move found, or `None` if not even the first iteration
    /// completed within the budget.
    pub best: Option<Move>,
    /// Depth of the completed iteration the result came from.
    pub depth: u32,
}

/// Alpha-beta searcher with a history table that persists across
/// `find_best_move` calls within one game.
pub struct SearchEngine {
    history: HistoryTable,
    cancel: Arc<AtomicBool>,
}

impl SearchEngine {
    pub fn new() -> Self {
        SearchEngine {
            history: HistoryTable::new(),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The shared cancellation flag. Exposed so callers can abort a search
    /// from outside the time budget.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Searches the position for the side to move, deepening iteratively
    /// from depth 2 until `max_depth` or until the budget expires.
    ///
    /// Each depth is first searched in an aspiration window around the
    /// previous iteration's score and re-searched full-width when the score
    /// lands on or outside the window. A depth interrupted by the timer is
    /// discarded entirely; the previous completed depth's result is
    /// returned untouched.
    pub fn find_best_move(
        &mut self,
        pos: &Position,
        max_depth: u32,
        budget: Duration,
    ) -> SearchResult {
        let root = pos.side_to_move;
        let timer = TimeControl::start(budget, Arc::clone(&self.cancel));

        let mut best = SearchResult {
            score: 0,
            best: None,
            depth: 0,
        };

        for depth in 2..=max_depth {
            let started = Instant::now();
            let (alpha, beta) = match best.best {
                Some(_) => (
                    best.score.saturating_sub(ASPIRATION_WINDOW),
                    best.score.saturating_add(ASPIRATION_WINDOW),
                ),
                None => (i32::MIN + 1, i32::MAX),
            };

            let mut result = self.minimax(pos, depth as i32, alpha, beta, true, root, 0);
            if let Ok((score, _)) = result {
                if score <= alpha || score >= beta {
                    tracing::debug!(
                        "depth {}: score {} fell outside aspiration window [{}, {}], re-searching",
                        depth,
                        score,
                        alpha,
                        beta
                    );
                    result = self.minimax(pos, depth as i32, i32::MIN + 1, i32::MAX, true, root, 0);
                }
            }

            match result {
                Ok((score, Some(mv))) => {
                    tracing::debug!(
                        "depth {} completed in {:?}: {} scoring {}",
                        depth,
                        started.elapsed(),
                        mv,
                        score
                    );
                    best = SearchResult {
                        score,
                        best: Some(mv),
                        depth,
                    };
                }
                Ok((_, None)) => break,
                Err(Cancelled) => {
                    tracing::debug!("depth {} cancelled after {:?}", depth, started.elapsed());
                    break;
                }
            }
        }

        timer.stop();
        self.cancel.store(false, Ordering::Relaxed);
        best
    }

    #[inline]
    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    fn minimax(
        &mut self,
        pos: &Position,
        depth: i32,
        mut alpha: i32,
        mut beta: i32,
        maximizing: bool,
        root: Color,
        extensions: u32,
    ) -> Result<(i32, Option<Move>), Cancelled> {
        if depth <= 0 {
            return self
                .quiescence(pos, alpha, beta, maximizing, root, 0)
                .map(|score| (score, None));
        }
        if self.cancelled() {
            return Err(Cancelled);
        }

        let color = if maximizing { root } else { root.opposite() };

        // Verified null-move pruning: probe what happens if the mover
        // passes. Disabled in endgames (zugzwang) and tactical positions.
        if depth >= 4 && !pos.is_endgame() && !pos.is_tactical(color) {
            let passed = pos.null_move();
            let (null_score, _) =
                self.minimax(&passed, depth - 4, alpha, beta, !maximizing, root, extensions)?;

            let fails = if maximizing {
                null_score >= beta
            } else {
                null_score <= alpha
            };
            if fails {
                // Verify with a reduced search of the real position before
                // trusting the cutoff.
                let (verification, _) =
                    self.minimax(pos, depth - 4, alpha, beta, maximizing, root, extensions)?;
                let confirmed = if maximizing {
                    verification >= beta
                } else {
                    verification <= alpha
                };
                if confirmed {
                    return Ok((null_score, None));
                }
            }
        }

        let mut moves = generate_moves(pos, color);
        self.order_moves(&mut moves, pos);

        let opponent_king = pos.pieces(color.opposite(), Piece::King);
        let mut best_score = if maximizing { i32::MIN } else { i32::MAX };
        let mut best_move = None;

        for mv in &moves {
            // King-capture sentinel: being able to take the opponent king
            // means the previous mover left it en prise, so this node is a
            // terminal win for the side to move. No recursion; the parent
            // sees a score it can never accept.
            if opponent_king.contains(mv.to) {
                let score = if maximizing { KING_VALUE } else { -KING_VALUE };
                return Ok((score, Some(*mv)));
            }

            let next = pos.apply_move(mv);
            let extension: u32 = if extensions < MAX_EXTENSIONS && is_critical(&next, color) {
                1
            } else {
                0
            };
            let (score, _) = self.minimax(
                &next,
                depth - 1 + extension as i32,
                alpha,
                beta,
                !maximizing,
                root,
                extensions + extension,
            )?;

            let cutoff = if maximizing {
                score >= beta
            } else {
                score <= alpha
            };
            if cutoff && !pos.is_capture(mv) {
                self.history.record_cutoff(mv.piece, mv.to, depth);
            }

            if maximizing {
                if score > best_score {
                    best_score = score;
                    best_move = Some(*mv);
                }
                alpha = alpha.max(score);
            } else {
                if score < best_score {
                    best_score = score;
                    best_move = Some(*mv);
                }
                beta = beta.min(score);
            }
            if beta <= alpha {
                break;
            }
        }

        Ok((best_score, best_move))
    }

    /// Resolves capture sequences past the nominal depth limit so leaf
    /// evaluations are never taken mid-exchange.
    fn quiescence(
        &mut self,
        pos: &Position,
        mut alpha: i32,
        mut beta: i32,
        maximizing: bool,
        root: Color,
        qdepth: u32,
    ) -> Result<i32, Cancelled> {
        if self.cancelled() {
            return Err(Cancelled);
        }

        let stand_pat = root.sign() * evaluate(pos);
        if maximizing {
            if stand_pat >= beta {
                return Ok(beta);
            }
            alpha = alpha.max(stand_pat);
        } else {
            if stand_pat <= alpha {
                return Ok(alpha);
            }
            beta = beta.min(stand_pat);
        }

        if qdepth >= MAX_QUIESCENCE_DEPTH {
            return Ok(if maximizing { alpha } else { beta });
        }

        let color = if maximizing { root } else { root.opposite() };
        let mut captures = capture_moves(pos, color);
        captures
            .as_mut_slice()
            .sort_by_key(|m| -mvv_lva(m, pos));

        for mv in &captures {
            let next = pos.apply_move(mv);
            let score = self.quiescence(&next, alpha, beta, !maximizing, root, qdepth + 1)?;

            if maximizing {
                if score >= beta {
                    return Ok(beta);
                }
                alpha = alpha.max(score);
            } else {
                if score <= alpha {
                    return Ok(alpha);
                }
                beta = beta.min(score);
            }
        }

        Ok(if maximizing { alpha } else { beta })
    }

    /// Captures first by descending MVV-LVA, then quiet moves by descending
    /// history weight.
    fn order_moves(&self, moves: &mut MoveList, pos: &Position) {
        moves.as_mut_slice().sort_by_key(|m| {
            if pos.is_capture(m) {
                (0, -mvv_lva(m, pos))
            } else {
                (1, -self.history.score(m.piece, m.to))
            }
        });
    }
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// A move is critical when, after it lands, the mover's pseudo-legal
/// targets include the opponent king square. This is the proxy for "this
/// move delivers check" in a model without a check detector.
fn is_critical(after: &Position, mover: Color) -> bool {
    let king = after.pieces(mover.opposite(), Piece::King);
    (after.all_targets(mover) & king).is_not_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use deepmate_core::Square;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn pos(fen: &str) -> Position {
        Position::from_fen(fen).unwrap()
    }

    /// Full-width reference search: same recursion shape as `minimax`
    /// (skip rule, extensions, quiescence leaves) but no pruning, no move
    /// ordering, no null-move probe.
    fn full_width(
        engine: &mut SearchEngine,
        pos: &Position,
        depth: i32,
        maximizing: bool,
        root: Color,
        extensions: u32,
    ) -> (i32, Option<Move>) {
        if depth <= 0 {
            let score = engine
                .quiescence(pos, i32::MIN + 1, i32::MAX, maximizing, root, 0)
                .unwrap();
            return (score, None);
        }

        let color = if maximizing { root } else { root.opposite() };
        let moves = generate_moves(pos, color);
        let opponent_king = pos.pieces(color.opposite(), Piece::King);

        let mut best_score = if maximizing { i32::MIN } else { i32::MAX };
        let mut best_move = None;
        for mv in &moves {
            if opponent_king.contains(mv.to) {
                let score = if maximizing { KING_VALUE } else { -KING_VALUE };
                return (score, Some(*mv));
            }
            let next = pos.apply_move(mv);
            let extension: u32 = if extensions < MAX_EXTENSIONS && is_critical(&next, color) {
                1
            } else {
                0
            };
            let (score, _) = full_width(
                engine,
                &next,
                depth - 1 + extension as i32,
                !maximizing,
                root,
                extensions + extension,
            );
            if (maximizing && score > best_score) || (!maximizing && score < best_score) {
                best_score = score;
                best_move = Some(*mv);
            }
        }
        (best_score, best_move)
    }

    #[test]
    fn pruned_search_matches_full_width() {
        // Black queen hangs on d5; the rook capture wins by a wide margin,
        // so pruning and ordering cannot change the answer.
        let p = pos("4k3/8/8/3q4/8/8/8/3RK3 w - - 0 1");
        let root = p.side_to_move;

        let mut engine = SearchEngine::new();
        let (pruned_score, pruned_move) = engine
            .minimax(&p, 3, i32::MIN + 1, i32::MAX, true, root, 0)
            .unwrap();

        let mut reference = SearchEngine::new();
        let (full_score, full_move) = full_width(&mut reference, &p, 3, true, root, 0);

        assert_eq!(pruned_score, full_score);
        assert_eq!(pruned_move, full_move);
        assert_eq!(pruned_move.map(|m| m.to), Some(sq("d5")));
    }

    #[test]
    fn quiescence_returns_stand_pat_without_captures() {
        // No capture exists anywhere, so quiescence must stop immediately.
        let p = pos("4k3/8/8/8/8/8/8/4K3 w - - 0 1");
        let mut engine = SearchEngine::new();
        let score = engine
            .quiescence(&p, i32::MIN + 1, i32::MAX, true, Color::White, 0)
            .unwrap();
        assert_eq!(score, evaluate(&p));
    }

    #[test]
    fn quiescence_resolves_hanging_pieces() {
        // White to move can win the queen; stand-pat alone would miss it.
        let p = pos("4k3/8/8/3q4/8/8/8/3RK3 w - - 0 1");
        let mut engine = SearchEngine::new();
        let score = engine
            .quiescence(&p, i32::MIN + 1, i32::MAX, true, Color::White, 0)
            .unwrap();
        assert!(score > evaluate(&p));
    }

    #[test]
    fn fools_mate_found_in_one_ply() {
        // After 1.f3 e5 2.g4, Qh4 mates. The queen move is critical (it
        // attacks the king), and a 1-ply search lands near the king value.
        let p = pos("rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq - 0 2");
        let qh4 = Move::new(Piece::Queen, Color::Black, sq("d8"), sq("h4"));

        let after = p.apply_move(&qh4);
        assert!(is_critical(&after, Color::Black));

        let mut engine = SearchEngine::new();
        let (score, best) = engine
            .minimax(&p, 1, i32::MIN + 1, i32::MAX, true, Color::Black, 0)
            .unwrap();
        assert_eq!(best, Some(qh4));
        assert!(score > 4000, "score was {}", score);
    }

    #[test]
    fn preset_cancel_flag_yields_no_result() {
        let mut engine = SearchEngine::new();
        engine.cancel_flag().store(true, Ordering::Relaxed);

        let result = engine.find_best_move(&Position::initial(), 6, Duration::from_secs(30));
        assert_eq!(result.best, None);
        assert_eq!(result.depth, 0);

        // The flag is cleared on return, so the next search runs normally.
        let result = engine.find_best_move(&Position::initial(), 3, Duration::from_secs(30));
        assert!(result.best.is_some());
        assert_eq!(result.depth, 3);
    }

    #[test]
    fn cancellation_propagates_through_minimax() {
        let mut engine = SearchEngine::new();
        engine.cancel_flag().store(true, Ordering::Relaxed);
        let outcome = engine.minimax(
            &Position::initial(),
            4,
            i32::MIN + 1,
            i32::MAX,
            true,
            Color::White,
            0,
        );
        assert_eq!(outcome, Err(Cancelled));
    }

    #[test]
    fn timeout_returns_last_completed_depth_untouched() {
        // A cancellation arriving mid-iteration must fall back to the last
        // completed depth exactly: re-searching to that depth with no time
        // pressure reproduces the same move and score.
        let p = Position::initial();
        let mut engine = SearchEngine::new();
        let interrupted = engine.find_best_move(&p, 64, Duration::from_millis(150));
        let completed = interrupted.depth;
        assert!(completed >= 2, "depth 2 should finish within the budget");
        assert!(completed < 64, "the deeper iteration should be cut off");

        let mut reference = SearchEngine::new();
        let full = reference.find_best_move(&p, completed, Duration::from_secs(600));
        assert_eq!(full.depth, completed);
        assert_eq!(full.best, interrupted.best);
        assert_eq!(full.score, interrupted.score);
    }

    #[test]
    fn king_chase_extensions_are_bounded() {
        // With the kings one step apart, every adjacency-keeping king move
        // is critical, so an uncapped extension chain would hold the depth
        // constant forever. The extension budget forces termination with no
        // timer involved.
        let p = pos("8/8/8/8/3k4/8/3K4/8 w - - 0 1");
        let mut engine = SearchEngine::new();
        let outcome = engine.minimax(&p, 3, i32::MIN + 1, i32::MAX, true, Color::White, 0);
        assert!(outcome.is_ok());
    }

    #[test]
    fn search_respects_its_budget() {
        let mut engine = SearchEngine::new();
        let started = Instant::now();
        engine.find_best_move(&Position::initial(), 50, Duration::from_millis(200));
        // Generous margin: one node between flag checks is cheap.
        assert!(started.elapsed() < Duration::from_secs(10));
        assert!(!engine.cancelled());
    }

    #[test]
    fn finds_free_queen_capture() {
        let p = pos("4k3/8/8/3q4/8/8/8/3RK3 w - - 0 1");
        let mut engine = SearchEngine::new();
        let result = engine.find_best_move(&p, 3, Duration::from_secs(30));
        let best = result.best.expect("search should produce a move");
        assert_eq!(best.to, sq("d5"));
        assert_eq!(best.piece, Piece::Rook);
        assert!(result.score > 0);
    }

    #[test]
    fn black_root_scores_are_oriented_for_black() {
        // Black is a queen up; a black-to-move search should report a
        // positive score for the mover.
        let p = pos("3qk3/8/8/8/8/8/8/4K3 b - - 0 1");
        let mut engine = SearchEngine::new();
        let result = engine.find_best_move(&p, 2, Duration::from_secs(30));
        assert!(result.best.is_some());
        assert!(result.score > 0, "score was {}", result.score);
    }

    #[test]
    fn avoids_leaving_king_en_prise() {
        // The e2 pawn is pinned: capturing the d3 knight opens the e-file
        // and loses the king to the rook. The free knight must be refused.
        let p = pos("4r1k1/8/8/8/8/3n4/4P3/4K3 w - - 0 1");
        let exd3 = Move::new(Piece::Pawn, Color::White, sq("e2"), sq("d3"));
        assert!(p.is_capture(&exd3));

        let mut engine = SearchEngine::new();
        let result = engine.find_best_move(&p, 3, Duration::from_secs(30));
        let best = result.best.expect("search should produce a move");
        assert_ne!(best, exd3, "search grabbed the poisoned knight");
    }
}
