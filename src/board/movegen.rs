// Move generation: per-kind pseudo-legal moves dispatched over the piece
// enum, a shared geometric attack primitive, and a make/test/unmake
// legality filter. Promotions expand to the four kinds in a fixed order.

use crate::board::{CastlingRights, Color, Move, Outcome, Piece, PieceKind, Position, Square};

const KNIGHT_OFFSETS: [(i8, i8); 8] =
    [(-2, 1), (-1, 2), (1, 2), (2, 1), (2, -1), (1, -2), (-1, -2), (-2, -1)];
const KING_OFFSETS: [(i8, i8); 8] =
    [(-1, -1), (-1, 0), (-1, 1), (0, -1), (0, 1), (1, -1), (1, 0), (1, 1)];
const BISHOP_DIRS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
const ROOK_DIRS: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Promotion kinds in generation order.
pub const PROMOTION_KINDS: [PieceKind; 4] =
    [PieceKind::Queen, PieceKind::Rook, PieceKind::Bishop, PieceKind::Knight];

impl Position {
    /// All legal moves for the side to move. The board is borrowed mutably
    /// for the make/test/unmake legality filter but is always restored.
    pub fn legal_moves(&mut self) -> Vec<Move> {
        let color = self.side_to_move;
        let pseudo = self.pseudo_legal_moves(color, true);
        let mut legal = Vec::with_capacity(pseudo.len());
        for mv in pseudo {
            let undo = self.make(&mv);
            if !self.is_in_check(color) {
                legal.push(mv);
            }
            self.unmake(&mv, undo);
        }
        legal
    }

    /// Pseudo-legal moves for `color`. `include_castling` is false when
    /// called from attack scans, keeping check detection non-recursive.
    pub fn pseudo_legal_moves(&self, color: Color, include_castling: bool) -> Vec<Move> {
        let mut moves = Vec::with_capacity(48);
        for from in self.squares_of(color) {
            let piece = self.at(from).expect("squares_of returned empty square");
            match piece.kind {
                PieceKind::Pawn => self.pawn_moves(from, piece, &mut moves),
                PieceKind::Knight => self.step_moves(from, piece, &KNIGHT_OFFSETS, &mut moves),
                PieceKind::Bishop => self.slide_moves(from, piece, &BISHOP_DIRS, &mut moves),
                PieceKind::Rook => self.slide_moves(from, piece, &ROOK_DIRS, &mut moves),
                PieceKind::Queen => {
                    self.slide_moves(from, piece, &BISHOP_DIRS, &mut moves);
                    self.slide_moves(from, piece, &ROOK_DIRS, &mut moves);
                }
                PieceKind::King => {
                    self.step_moves(from, piece, &KING_OFFSETS, &mut moves);
                    if include_castling {
                        self.castling_moves(from, piece, &mut moves);
                    }
                }
            }
        }
        moves
    }

    fn pawn_moves(&self, from: Square, piece: Piece, moves: &mut Vec<Move>) {
        let color = piece.color;
        let dir = color.pawn_dir();
        let promo_row = color.promotion_row();
        let one = from.row + dir;

        let push = |mv_to: Square, captured: Option<Piece>, moves: &mut Vec<Move>| {
            if mv_to.row == promo_row {
                for kind in PROMOTION_KINDS {
                    moves.push(Move::promoting(from, mv_to, captured, kind));
                }
            } else {
                moves.push(Move::new(from, mv_to, captured));
            }
        };

        // Forward advances into empty squares.
        if Square::in_range(one, from.col) {
            let ahead = Square::new(one, from.col);
            if self.is_empty_at(ahead) {
                push(ahead, None, moves);
                if from.row == color.pawn_start_row() {
                    let two = Square::new(from.row + 2 * dir, from.col);
                    if self.is_empty_at(two) {
                        moves.push(Move::new(from, two, None));
                    }
                }
            }
        }

        // Diagonal captures, including en passant onto the target square.
        for dc in [-1, 1] {
            let (r, c) = (one, from.col + dc);
            if !Square::in_range(r, c) {
                continue;
            }
            let to = Square::new(r, c);
            if self.has_enemy_at(to, color) {
                push(to, self.at(to), moves);
            } else if self.en_passant == Some(to) {
                let victim_at = Square::new(from.row, to.col);
                if let Some(victim) = self.at(victim_at) {
                    if victim.kind == PieceKind::Pawn && victim.color != color {
                        moves.push(Move::new(from, to, Some(victim)));
                    }
                }
            }
        }
    }

    fn step_moves(&self, from: Square, piece: Piece, offsets: &[(i8, i8)], moves: &mut Vec<Move>) {
        for &(dr, dc) in offsets {
            let (r, c) = (from.row + dr, from.col + dc);
            if !Square::in_range(r, c) {
                continue;
            }
            let to = Square::new(r, c);
            match self.at(to) {
                None => moves.push(Move::new(from, to, None)),
                Some(p) if p.color != piece.color => moves.push(Move::new(from, to, Some(p))),
                Some(_) => {}
            }
        }
    }

    fn slide_moves(&self, from: Square, piece: Piece, dirs: &[(i8, i8)], moves: &mut Vec<Move>) {
        for &(dr, dc) in dirs {
            let (mut r, mut c) = (from.row + dr, from.col + dc);
            while Square::in_range(r, c) {
                let to = Square::new(r, c);
                match self.at(to) {
                    None => moves.push(Move::new(from, to, None)),
                    Some(p) if p.color != piece.color => {
                        moves.push(Move::new(from, to, Some(p)));
                        break;
                    }
                    Some(_) => break,
                }
                r += dr;
                c += dc;
            }
        }
    }

    fn castling_moves(&self, from: Square, piece: Piece, moves: &mut Vec<Move>) {
        let color = piece.color;
        let back = color.back_row();
        if piece.moved || from != Square::new(back, 4) {
            return;
        }
        let enemy = color.opposite();
        if self.is_square_attacked(from, enemy) {
            return;
        }

        let unmoved_rook = |col: i8| {
            matches!(self.at(Square::new(back, col)),
                Some(p) if p.kind == PieceKind::Rook && p.color == color && !p.moved)
        };

        if self.castling.has(CastlingRights::king_side(color))
            && unmoved_rook(7)
            && [5, 6].iter().all(|&c| self.is_empty_at(Square::new(back, c)))
            && ![5, 6].iter().any(|&c| self.is_square_attacked(Square::new(back, c), enemy))
        {
            moves.push(Move::new(from, Square::new(back, 6), None));
        }

        if self.castling.has(CastlingRights::queen_side(color))
            && unmoved_rook(0)
            && [1, 2, 3].iter().all(|&c| self.is_empty_at(Square::new(back, c)))
            && ![2, 3].iter().any(|&c| self.is_square_attacked(Square::new(back, c), enemy))
        {
            moves.push(Move::new(from, Square::new(back, 2), None));
        }
    }

    /// Does the piece on `from` attack `target`? Pure geometry plus
    /// path-clear checks; shared by check detection, castling gates and
    /// static exchange evaluation.
    pub fn attacks_square(&self, from: Square, target: Square) -> bool {
        if from == target {
            return false;
        }
        let Some(piece) = self.at(from) else { return false };
        let dr = target.row - from.row;
        let dc = target.col - from.col;
        match piece.kind {
            PieceKind::Pawn => dr == piece.color.pawn_dir() && dc.abs() == 1,
            PieceKind::Knight => {
                (dr.abs() == 2 && dc.abs() == 1) || (dr.abs() == 1 && dc.abs() == 2)
            }
            PieceKind::Bishop => dr.abs() == dc.abs() && self.ray_clear(from, target),
            PieceKind::Rook => (dr == 0 || dc == 0) && self.ray_clear(from, target),
            PieceKind::Queen => {
                (dr.abs() == dc.abs() || dr == 0 || dc == 0) && self.ray_clear(from, target)
            }
            PieceKind::King => dr.abs() <= 1 && dc.abs() <= 1,
        }
    }

    /// Are the squares strictly between `from` and `to` empty? `from` and
    /// `to` must share a rank, file or diagonal.
    fn ray_clear(&self, from: Square, to: Square) -> bool {
        let dr = (to.row - from.row).signum();
        let dc = (to.col - from.col).signum();
        let (mut r, mut c) = (from.row + dr, from.col + dc);
        while (r, c) != (to.row, to.col) {
            if !self.is_empty_at(Square::new(r, c)) {
                return false;
            }
            r += dr;
            c += dc;
        }
        true
    }

    pub fn is_square_attacked(&self, target: Square, by: Color) -> bool {
        for from in self.squares_of(by) {
            if self.attacks_square(from, target) {
                return true;
            }
        }
        false
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        match self.king_square(color) {
            Some(king) => self.is_square_attacked(king, color.opposite()),
            None => false,
        }
    }

    /// Would this move give check to the opponent?
    pub fn gives_check(&mut self, mv: &Move) -> bool {
        let mover = self.at(mv.from).map(|p| p.color).unwrap_or(self.side_to_move);
        let undo = self.make(mv);
        let check = self.is_in_check(mover.opposite());
        self.unmake(mv, undo);
        check
    }

    /// Terminal state for the side to move, or `None` while moves remain.
    /// Checkmate and stalemate are mutually exclusive by construction.
    pub fn outcome(&mut self) -> Option<Outcome> {
        if !self.legal_moves().is_empty() {
            return None;
        }
        if self.is_in_check(self.side_to_move) {
            Some(Outcome::Checkmate(self.side_to_move.opposite()))
        } else {
            Some(Outcome::Stalemate)
        }
    }

    pub fn is_checkmate(&mut self) -> bool {
        matches!(self.outcome(), Some(Outcome::Checkmate(_)))
    }

    pub fn is_stalemate(&mut self) -> bool {
        matches!(self.outcome(), Some(Outcome::Stalemate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startpos_has_twenty_moves() {
        let mut pos = Position::startpos();
        assert_eq!(pos.legal_moves().len(), 20);
    }

    #[test]
    fn promotion_expands_to_four_kinds_in_order() {
        let mut pos = Position::from_fen("8/P7/8/8/8/8/8/k2K4 w - - 0 1").unwrap();
        let moves: Vec<Move> = pos
            .legal_moves()
            .into_iter()
            .filter(|m| m.from == Square::from_algebraic("a7").unwrap())
            .collect();
        let kinds: Vec<PieceKind> = moves.iter().filter_map(|m| m.promotion).collect();
        assert_eq!(kinds, PROMOTION_KINDS);
    }

    #[test]
    fn en_passant_capture_removes_passed_pawn() {
        let mut pos =
            Position::from_fen("rnbqkbnr/ppp1pppp/8/8/3pP3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 2")
                .unwrap();
        let ep = pos
            .legal_moves()
            .into_iter()
            .find(|m| m.to == Square::from_algebraic("e3").unwrap() && m.is_capture())
            .expect("en passant capture must be generated");
        let undo = pos.make(&ep);
        assert!(pos.is_empty_at(Square::from_algebraic("e4").unwrap()));
        pos.unmake(&ep, undo);
        assert!(!pos.is_empty_at(Square::from_algebraic("e4").unwrap()));
    }

    #[test]
    fn castling_through_attacked_square_is_rejected() {
        // Black rook on f8 covers f1; white may not castle king-side.
        let mut pos = Position::from_fen("5rk1/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        let castles: Vec<String> =
            pos.legal_moves().iter().filter(|m| {
                m.from == Square::from_algebraic("e1").unwrap()
                    && (m.to.col - m.from.col).abs() == 2
            }).map(|m| m.to_string()).collect();
        assert_eq!(castles, vec!["e1c1".to_string()]);
    }

    #[test]
    fn pinned_piece_may_not_expose_king() {
        // Bishop on e2 is pinned against the king by the rook on e8.
        let mut pos = Position::from_fen("4r2k/8/8/8/8/8/4B3/4K3 w - - 0 1").unwrap();
        let from = Square::from_algebraic("e2").unwrap();
        assert!(pos.legal_moves().iter().all(|m| m.from != from));
    }
}
