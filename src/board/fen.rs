// FEN codec. Parsing is strict: all six fields must be present and
// well-formed, and a failed parse never yields a partially-built position.

use crate::board::{CastlingRights, Color, Piece, PieceKind, Position, Square};
use crate::error::EngineError;

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

impl Position {
    pub fn from_fen(fen: &str) -> Result<Position, EngineError> {
        let bad = |msg: &str| EngineError::InvalidFen(format!("{msg}: {fen}"));

        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.len() != 6 {
            return Err(bad("expected 6 fields"));
        }

        let mut pos = Position::empty();

        // 1. Piece placement, rank 8 down to rank 1.
        let rows: Vec<&str> = parts[0].split('/').collect();
        if rows.len() != 8 {
            return Err(bad("expected 8 ranks"));
        }
        for (row, rank) in rows.iter().enumerate() {
            let mut col: i8 = 0;
            for ch in rank.chars() {
                if let Some(skip) = ch.to_digit(10) {
                    col += skip as i8;
                } else {
                    let (kind, color) =
                        PieceKind::from_fen_char(ch).ok_or_else(|| bad("bad piece char"))?;
                    if col >= 8 {
                        return Err(bad("rank overflow"));
                    }
                    pos.set(Square::new(row as i8, col), Some(Piece::new(kind, color)));
                    col += 1;
                }
            }
            if col != 8 {
                return Err(bad("rank does not cover 8 files"));
            }
        }

        // 2. Side to move.
        pos.side_to_move = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            _ => return Err(bad("bad side-to-move field")),
        };

        // 3. Castling rights.
        let mut castling = CastlingRights::none();
        if parts[2] != "-" {
            for ch in parts[2].chars() {
                match ch {
                    'K' => castling.set(CastlingRights::WHITE_KING),
                    'Q' => castling.set(CastlingRights::WHITE_QUEEN),
                    'k' => castling.set(CastlingRights::BLACK_KING),
                    'q' => castling.set(CastlingRights::BLACK_QUEEN),
                    _ => return Err(bad("bad castling field")),
                }
            }
        }
        pos.castling = castling;

        // 4. En-passant target.
        pos.en_passant = match parts[3] {
            "-" => None,
            s => Some(Square::from_algebraic(s).ok_or_else(|| bad("bad en-passant field"))?),
        };

        // 5./6. Clocks.
        pos.halfmove_clock = parts[4].parse().map_err(|_| bad("bad halfmove clock"))?;
        pos.fullmove_number = parts[5].parse().map_err(|_| bad("bad fullmove number"))?;

        for color in [Color::White, Color::Black] {
            if pos.squares_of(color).iter().filter(|&&sq| {
                matches!(pos.at(sq), Some(p) if p.kind == PieceKind::King)
            }).count() != 1
            {
                return Err(bad("expected exactly one king per color"));
            }
        }

        pos.sync_moved_flags();
        Ok(pos)
    }

    pub fn to_fen(&self) -> String {
        let mut out = String::with_capacity(90);
        for row in 0..8 {
            if row > 0 {
                out.push('/');
            }
            let mut empty = 0;
            for col in 0..8 {
                match self.at(Square::new(row, col)) {
                    None => empty += 1,
                    Some(p) => {
                        if empty > 0 {
                            out.push_str(&empty.to_string());
                            empty = 0;
                        }
                        out.push(p.kind.fen_char(p.color));
                    }
                }
            }
            if empty > 0 {
                out.push_str(&empty.to_string());
            }
        }
        out.push(' ');
        out.push(if self.side_to_move == Color::White { 'w' } else { 'b' });
        out.push(' ');
        out.push_str(&self.castling.to_string());
        out.push(' ');
        match self.en_passant {
            Some(sq) => out.push_str(&sq.to_string()),
            None => out.push('-'),
        }
        out.push_str(&format!(" {} {}", self.halfmove_clock, self.fullmove_number));
        out
    }

    /// Derive moved-flags from the loaded fields. A castling right implies
    /// the king and matching rook are unmoved; pawns off their start rank
    /// have necessarily moved.
    fn sync_moved_flags(&mut self) {
        for row in 0..8 {
            for col in 0..8 {
                let sq = Square::new(row, col);
                let Some(mut piece) = self.at(sq) else { continue };
                piece.moved = match piece.kind {
                    PieceKind::Pawn => row != piece.color.pawn_start_row(),
                    PieceKind::King => {
                        let home = Square::new(piece.color.back_row(), 4);
                        sq != home
                            || !(self.castling.has(CastlingRights::king_side(piece.color))
                                || self.castling.has(CastlingRights::queen_side(piece.color)))
                    }
                    PieceKind::Rook => {
                        let back = piece.color.back_row();
                        if sq == Square::new(back, 7) {
                            !self.castling.has(CastlingRights::king_side(piece.color))
                        } else if sq == Square::new(back, 0) {
                            !self.castling.has(CastlingRights::queen_side(piece.color))
                        } else {
                            true
                        }
                    }
                    _ => false,
                };
                self.set(sq, Some(piece));
            }
        }
    }
}
