// Iterative-deepening minimax with alpha-beta pruning over make/unmake.
// White maximizes, Black minimizes; scores are always White-relative
// centipawns. Timeouts travel as a control value through every frame, and
// each frame unmakes its move before propagating, so the position is
// always restored when the signal escapes.

use std::time::{Duration, Instant};

use crate::board::{Color, Move, PieceKind, Position, Square};
use crate::search::eval::{self, material_points, DRAW_SCORE, MATE_SCORE};
use crate::search::see::see;
use crate::search::tt::{Entry, Tt};
use crate::search::zobrist;

const INFINITY: i32 = 1_000_000;
const QUIESCENCE_MAX_PLY: u32 = 8;
const QUIESCENCE_SEE_FLOOR: i32 = -50;
const WINNING_CAPTURE_SEE: i32 = 100;
const MAX_KILLER_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy)]
pub struct SearchParams {
    pub depth: u32,
    pub movetime: Option<Duration>,
    pub use_tt: bool,
    pub use_nullmove: bool,
    pub use_lmr: bool,
    pub use_killers: bool,
    pub order_moves: bool,
}

impl Default for SearchParams {
    fn default() -> Self {
        SearchParams {
            depth: 4,
            movetime: None,
            use_tt: true,
            use_nullmove: true,
            use_lmr: true,
            use_killers: true,
            order_moves: true,
        }
    }
}

impl SearchParams {
    pub fn with_depth(depth: u32) -> SearchParams {
        SearchParams { depth, ..Default::default() }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    pub best_move: Option<Move>,
    pub score_cp: i32,
    pub depth: u32,
    pub nodes: u64,
}

/// Internal timeout signal; always converted to "use the last completed
/// depth" before `search` returns.
struct Interrupted;

type Control<T> = Result<T, Interrupted>;

pub struct Searcher {
    tt: Tt,
    killers: Vec<[Option<Move>; 2]>,
    nodes: u64,
    deadline: Option<Instant>,
    params: SearchParams,
}

impl Default for Searcher {
    fn default() -> Self {
        Searcher {
            tt: Tt::default(),
            killers: vec![[None; 2]; MAX_KILLER_DEPTH],
            nodes: 0,
            deadline: None,
            params: SearchParams::default(),
        }
    }
}

impl Searcher {
    pub fn set_tt_capacity_mb(&mut self, mb: usize) {
        self.tt = Tt::with_capacity_mb(mb);
    }

    /// Iterative deepening driver. Runs complete passes for depth
    /// 1..=max; a timeout aborts only the depth in flight, and the last
    /// fully completed depth wins.
    pub fn search(&mut self, pos: &mut Position, params: SearchParams) -> SearchOutcome {
        self.params = params;
        self.nodes = 0;
        self.tt.clear();
        self.killers = vec![[None; 2]; MAX_KILLER_DEPTH];
        self.deadline = params.movetime.map(|d| Instant::now() + d);

        let mut best = SearchOutcome::default();
        for depth in 1..=params.depth.max(1) {
            self.tt.bump_generation();
            match self.root(pos, depth) {
                Ok(result) => {
                    let terminal = result.best_move.is_none();
                    let mate = result.score_cp.abs() >= MATE_SCORE - MAX_KILLER_DEPTH as i32;
                    best = result;
                    log::debug!(
                        "depth {depth}: score {} cp, move {:?}",
                        best.score_cp,
                        best.best_move.map(|m| m.to_string())
                    );
                    if terminal || mate {
                        break;
                    }
                }
                Err(Interrupted) => {
                    log::debug!("timeout at depth {depth}, keeping depth {}", best.depth);
                    break;
                }
            }
            if self.past_deadline() {
                break;
            }
        }
        best.nodes = self.nodes;

        // Fallback discipline: with legal moves on the board, never
        // return empty-handed.
        if best.best_move.is_none() {
            best.best_move = fallback_move(pos);
        }
        best
    }

    fn root(&mut self, pos: &mut Position, depth: u32) -> Control<SearchOutcome> {
        let color = pos.side_to_move;
        let maximizing = color == Color::White;

        let mut moves = pos.legal_moves();
        if moves.is_empty() {
            let score = if pos.is_in_check(color) {
                if maximizing { -MATE_SCORE } else { MATE_SCORE }
            } else {
                DRAW_SCORE
            };
            return Ok(SearchOutcome { best_move: None, score_cp: score, depth, nodes: self.nodes });
        }
        if self.params.order_moves {
            self.order_moves(pos, &mut moves, depth);
        }
        self.hoist_tt_move(pos, &mut moves);

        let mut alpha = -INFINITY;
        let mut beta = INFINITY;
        let mut best_move = None;
        let mut best_score = if maximizing { -INFINITY } else { INFINITY };

        for mv in moves {
            let undo = pos.make(&mv);
            let result = self.minimax(pos, depth - 1, alpha, beta, !maximizing, true, 1);
            pos.unmake(&mv, undo);
            let score = result?;
            if maximizing {
                if score > best_score {
                    best_score = score;
                    best_move = Some(mv);
                }
                alpha = alpha.max(best_score);
            } else {
                if score < best_score {
                    best_score = score;
                    best_move = Some(mv);
                }
                beta = beta.min(best_score);
            }
        }

        if self.params.use_tt {
            let key = zobrist::compute(pos);
            self.tt.put(Entry { key, depth, score: best_score, best: best_move, gen: 0 });
        }
        Ok(SearchOutcome { best_move, score_cp: best_score, depth, nodes: self.nodes })
    }

    fn minimax(
        &mut self,
        pos: &mut Position,
        depth: u32,
        mut alpha: i32,
        mut beta: i32,
        maximizing: bool,
        allow_null: bool,
        ply: u32,
    ) -> Control<i32> {
        self.check_deadline()?;
        self.nodes += 1;

        let key = zobrist::compute(pos);
        if self.params.use_tt {
            // A stored score is trusted whenever its depth covers the
            // request; entries carry no bound type.
            if let Some(e) = self.tt.get(key) {
                if e.depth >= depth {
                    return Ok(e.score);
                }
            }
        }

        if depth == 0 {
            return self.quiescence(pos, alpha, beta, maximizing, 0);
        }

        let color = if maximizing { Color::White } else { Color::Black };
        let in_check = pos.is_in_check(color);

        // Null-move pruning: skip our turn; if the reduced search still
        // busts the bound the node is pruned. Off in check, near-endgame
        // (zugzwang) and for one recursion after use.
        if allow_null
            && self.params.use_nullmove
            && depth >= 3
            && !in_check
            && !is_endgame(pos)
        {
            let stand = eval::evaluate(pos);
            let promising = if maximizing { stand >= beta } else { stand <= alpha };
            if promising {
                let undo = pos.make_null();
                let result = if maximizing {
                    self.minimax(pos, depth - 3, beta - 1, beta, false, false, ply + 1)
                } else {
                    self.minimax(pos, depth - 3, alpha, alpha + 1, true, false, ply + 1)
                };
                pos.unmake_null(undo);
                let null_score = result?;
                if maximizing && null_score >= beta {
                    return Ok(beta);
                }
                if !maximizing && null_score <= alpha {
                    return Ok(alpha);
                }
            }
        }

        let mut moves = pos.legal_moves();
        if moves.is_empty() {
            // Mate-distance adjustment keeps faster mates more attractive.
            let score = if in_check {
                let mate = MATE_SCORE - ply as i32;
                if maximizing { -mate } else { mate }
            } else {
                DRAW_SCORE
            };
            if self.params.use_tt {
                self.tt.put(Entry { key, depth, score, best: None, gen: 0 });
            }
            return Ok(score);
        }
        if self.params.order_moves {
            self.order_moves(pos, &mut moves, depth);
        }
        self.hoist_tt_move(pos, &mut moves);

        let mut best = if maximizing { -INFINITY } else { INFINITY };
        let mut best_move = None;

        for (idx, mv) in moves.iter().enumerate() {
            let reduction = if self.params.use_lmr {
                self.lmr_reduction(pos, mv, idx, depth)
            } else {
                0
            };

            let undo = pos.make(mv);
            let mut result =
                self.minimax(pos, depth.saturating_sub(1 + reduction), alpha, beta, !maximizing, true, ply + 1);
            if reduction > 0 {
                // The reduced probe threatens the bound: re-search at
                // full depth before trusting it.
                let threatens = match &result {
                    Ok(score) => {
                        if maximizing { *score > alpha } else { *score < beta }
                    }
                    Err(_) => false,
                };
                if threatens {
                    result = self.minimax(pos, depth - 1, alpha, beta, !maximizing, true, ply + 1);
                }
            }
            pos.unmake(mv, undo);
            let score = result?;

            if maximizing {
                if score > best {
                    best = score;
                    best_move = Some(*mv);
                }
                if best > alpha {
                    alpha = best;
                }
            } else {
                if score < best {
                    best = score;
                    best_move = Some(*mv);
                }
                if best < beta {
                    beta = best;
                }
            }
            if alpha >= beta {
                if self.params.use_killers && !mv.is_capture() {
                    self.store_killer(depth, *mv);
                }
                break;
            }
        }

        if self.params.use_tt {
            self.tt.put(Entry { key, depth, score: best, best: best_move, gen: 0 });
        }
        Ok(best)
    }

    /// Capture-only search past the horizon. Stand-pat first, then
    /// best-SEE-first captures to a hard ply cap, discarding clearly
    /// losing captures beyond the first ply.
    fn quiescence(
        &mut self,
        pos: &mut Position,
        mut alpha: i32,
        mut beta: i32,
        maximizing: bool,
        qply: u32,
    ) -> Control<i32> {
        self.check_deadline()?;
        self.nodes += 1;

        let stand = eval::evaluate(pos);
        if maximizing {
            if stand >= beta {
                return Ok(beta);
            }
            if stand > alpha {
                alpha = stand;
            }
        } else {
            if stand <= alpha {
                return Ok(alpha);
            }
            if stand < beta {
                beta = stand;
            }
        }
        if qply >= QUIESCENCE_MAX_PLY {
            return Ok(stand);
        }

        let mut captures: Vec<(i32, Move)> = pos
            .legal_moves()
            .into_iter()
            .filter(|m| m.is_capture())
            .map(|m| (see(pos, &m), m))
            .collect();
        captures.sort_by_key(|&(gain, _)| -gain);

        for (gain, mv) in captures {
            if qply >= 1 && gain < QUIESCENCE_SEE_FLOOR {
                continue;
            }
            let undo = pos.make(&mv);
            let result = self.quiescence(pos, alpha, beta, !maximizing, qply + 1);
            pos.unmake(&mv, undo);
            let score = result?;
            if maximizing {
                if score >= beta {
                    return Ok(beta);
                }
                if score > alpha {
                    alpha = score;
                }
            } else {
                if score <= alpha {
                    return Ok(alpha);
                }
                if score < beta {
                    beta = score;
                }
            }
        }
        Ok(if maximizing { alpha } else { beta })
    }

    /// Bucketed ordering: winning captures, checks, equal captures, quiet
    /// moves by heuristic score, losing captures last.
    fn order_moves(&mut self, pos: &mut Position, moves: &mut Vec<Move>, depth: u32) {
        let mut scored: Vec<(u8, i32, Move)> = Vec::with_capacity(moves.len());
        for mv in moves.drain(..) {
            let entry = if mv.is_capture() {
                let gain = see(pos, &mv);
                if gain > WINNING_CAPTURE_SEE {
                    (0, gain, mv)
                } else if gain >= 0 {
                    (2, gain, mv)
                } else {
                    (4, gain, mv)
                }
            } else if pos.gives_check(&mv) {
                (1, 0, mv)
            } else {
                (3, self.quiet_score(pos, &mv, depth), mv)
            };
            scored.push(entry);
        }
        scored.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));
        moves.extend(scored.into_iter().map(|(_, _, m)| m));
    }

    fn quiet_score(&self, pos: &Position, mv: &Move, depth: u32) -> i32 {
        let mut score = 0;
        if is_center(mv.to) {
            score += 10;
        }
        if let Some(piece) = pos.at(mv.from) {
            match piece.kind {
                PieceKind::King if (mv.to.col - mv.from.col).abs() == 2 => score += 50,
                PieceKind::Knight | PieceKind::Bishop if !piece.moved => score += 15,
                PieceKind::Pawn if (2..=5).contains(&mv.to.col) => score += 5,
                _ => {}
            }
            if attacked_by_enemy_pawn(pos, mv.to, piece.color) {
                score -= 20;
            }
        }
        if self.params.use_killers {
            score += self.killer_bonus(depth, mv);
        }
        score
    }

    fn hoist_tt_move(&mut self, pos: &Position, moves: &mut Vec<Move>) {
        if !self.params.use_tt {
            return;
        }
        if let Some(entry) = self.tt.get(zobrist::compute(pos)) {
            if let Some(ttm) = entry.best {
                if let Some(i) = moves.iter().position(|&m| m == ttm) {
                    let mv = moves.remove(i);
                    moves.insert(0, mv);
                }
            }
        }
    }

    fn lmr_reduction(&mut self, pos: &mut Position, mv: &Move, idx: usize, depth: u32) -> u32 {
        if idx < 4 || depth < 3 {
            return 0;
        }
        if mv.is_capture() || mv.is_promotion() {
            return 0;
        }
        if let Some(piece) = pos.at(mv.from) {
            if matches!(piece.kind, PieceKind::Queen | PieceKind::King) {
                return 0;
            }
        }
        if pos.gives_check(mv) {
            return 0;
        }
        if idx < 8 {
            1
        } else if idx < 16 {
            2
        } else {
            (depth / 2).min(3)
        }
    }

    fn store_killer(&mut self, depth: u32, mv: Move) {
        let d = depth as usize;
        if d >= self.killers.len() {
            return;
        }
        let slot = &mut self.killers[d];
        if slot[0] == Some(mv) {
            return;
        }
        slot[1] = slot[0];
        slot[0] = Some(mv);
    }

    fn killer_bonus(&self, depth: u32, mv: &Move) -> i32 {
        let d = depth as usize;
        if d >= self.killers.len() {
            return 0;
        }
        if self.killers[d][0] == Some(*mv) {
            50
        } else if self.killers[d][1] == Some(*mv) {
            30
        } else {
            0
        }
    }

    fn check_deadline(&self) -> Control<()> {
        if self.past_deadline() {
            return Err(Interrupted);
        }
        Ok(())
    }

    fn past_deadline(&self) -> bool {
        matches!(self.deadline, Some(dl) if Instant::now() >= dl)
    }

    /// Quiescence value with a full window; test and diagnostic hook.
    pub fn qsearch_eval_cp(&mut self, pos: &mut Position) -> i32 {
        let side = pos.side_to_move;
        self.quiescence(pos, -INFINITY, INFINITY, side == Color::White, 0)
            .unwrap_or_else(|_| eval::evaluate(pos))
    }

    pub fn tt_probe(&self, pos: &Position) -> Option<(u32, i32)> {
        self.tt.get(zobrist::compute(pos)).map(|e| (e.depth, e.score))
    }

    pub fn nodes(&self) -> u64 {
        self.nodes
    }
}

/// Convenience wrapper over a fresh `Searcher`.
pub fn search(pos: &mut Position, depth: u32, movetime: Option<Duration>) -> SearchOutcome {
    let mut searcher = Searcher::default();
    let params = SearchParams { depth, movetime, ..Default::default() };
    searcher.search(pos, params)
}

/// Cheap move selector for the no-completed-depth case: captures, then
/// central moves, then moves that dodge enemy pawns, then anything legal.
pub fn fallback_move(pos: &mut Position) -> Option<Move> {
    let color = pos.side_to_move;
    let moves = pos.legal_moves();
    moves
        .iter()
        .find(|m| m.is_capture())
        .or_else(|| moves.iter().find(|m| is_center(m.to)))
        .or_else(|| moves.iter().find(|m| !attacked_by_enemy_pawn(pos, m.to, color)))
        .copied()
        .or_else(|| moves.first().copied())
}

fn is_endgame(pos: &Position) -> bool {
    material_points(pos, Color::White) <= 13 && material_points(pos, Color::Black) <= 13
}

fn is_center(sq: Square) -> bool {
    (2..=5).contains(&sq.row) && (2..=5).contains(&sq.col)
}

fn attacked_by_enemy_pawn(pos: &Position, sq: Square, color: Color) -> bool {
    let enemy = color.opposite();
    // Enemy pawns attack along their own advance direction.
    let from_row = sq.row - enemy.pawn_dir();
    for dc in [-1, 1] {
        let col = sq.col + dc;
        if Square::in_range(from_row, col) {
            if let Some(p) = pos.at(Square::new(from_row, col)) {
                if p.kind == PieceKind::Pawn && p.color == enemy {
                    return true;
                }
            }
        }
    }
    false
}
