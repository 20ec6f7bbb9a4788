// Mailbox board model: 8x8 grid of optional pieces plus the game-state
// fields FEN carries. Row 0 is rank 8, row 7 is rank 1.
pub mod fen;
pub mod movegen;

use std::fmt;
use std::str::FromStr;

use crate::error::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Row delta of a pawn advance for this color.
    pub fn pawn_dir(self) -> i8 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    pub fn back_row(self) -> i8 {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }

    pub fn pawn_start_row(self) -> i8 {
        match self {
            Color::White => 6,
            Color::Black => 1,
        }
    }

    pub fn promotion_row(self) -> i8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    pub const fn value_cp(self) -> i32 {
        match self {
            PieceKind::Pawn => 100,
            PieceKind::Knight => 320,
            PieceKind::Bishop => 330,
            PieceKind::Rook => 500,
            PieceKind::Queen => 900,
            PieceKind::King => 20_000,
        }
    }

    pub fn fen_char(self, color: Color) -> char {
        let c = match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        };
        if color == Color::White {
            c.to_ascii_uppercase()
        } else {
            c
        }
    }

    pub fn from_fen_char(c: char) -> Option<(PieceKind, Color)> {
        let kind = match c.to_ascii_lowercase() {
            'p' => PieceKind::Pawn,
            'n' => PieceKind::Knight,
            'b' => PieceKind::Bishop,
            'r' => PieceKind::Rook,
            'q' => PieceKind::Queen,
            'k' => PieceKind::King,
            _ => return None,
        };
        let color = if c.is_ascii_uppercase() { Color::White } else { Color::Black };
        Some((kind, color))
    }

    /// Promotion letter in coordinate notation (`q`, `r`, `b`, `n`).
    pub fn promo_char(self) -> Option<char> {
        match self {
            PieceKind::Queen => Some('q'),
            PieceKind::Rook => Some('r'),
            PieceKind::Bishop => Some('b'),
            PieceKind::Knight => Some('n'),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
    /// True once the piece has moved; gates castling.
    pub moved: bool,
}

impl Piece {
    pub fn new(kind: PieceKind, color: Color) -> Piece {
        Piece { kind, color, moved: false }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Square {
    pub row: i8,
    pub col: i8,
}

impl Square {
    pub fn new(row: i8, col: i8) -> Square {
        debug_assert!(Square::in_range(row, col));
        Square { row, col }
    }

    pub fn in_range(row: i8, col: i8) -> bool {
        (0..8).contains(&row) && (0..8).contains(&col)
    }

    /// Parse algebraic form like `e4`.
    pub fn from_algebraic(s: &str) -> Option<Square> {
        let b = s.as_bytes();
        if b.len() != 2 || !(b'a'..=b'h').contains(&b[0]) || !(b'1'..=b'8').contains(&b[1]) {
            return None;
        }
        let col = (b[0] - b'a') as i8;
        let row = 7 - (b[1] - b'1') as i8;
        Some(Square { row, col })
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = (b'a' + self.col as u8) as char;
        let rank = 8 - self.row;
        write!(f, "{}{}", file, rank)
    }
}

/// Castling-rights set, one bit per side/wing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const WHITE_KING: u8 = 1;
    pub const WHITE_QUEEN: u8 = 2;
    pub const BLACK_KING: u8 = 4;
    pub const BLACK_QUEEN: u8 = 8;

    pub fn all() -> CastlingRights {
        CastlingRights(0b1111)
    }

    pub fn none() -> CastlingRights {
        CastlingRights(0)
    }

    pub fn has(self, bit: u8) -> bool {
        self.0 & bit != 0
    }

    pub fn clear(&mut self, bit: u8) {
        self.0 &= !bit;
    }

    pub fn set(&mut self, bit: u8) {
        self.0 |= bit;
    }

    pub fn king_side(color: Color) -> u8 {
        match color {
            Color::White => Self::WHITE_KING,
            Color::Black => Self::BLACK_KING,
        }
    }

    pub fn queen_side(color: Color) -> u8 {
        match color {
            Color::White => Self::WHITE_QUEEN,
            Color::Black => Self::BLACK_QUEEN,
        }
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "-");
        }
        if self.has(Self::WHITE_KING) {
            write!(f, "K")?;
        }
        if self.has(Self::WHITE_QUEEN) {
            write!(f, "Q")?;
        }
        if self.has(Self::BLACK_KING) {
            write!(f, "k")?;
        }
        if self.has(Self::BLACK_QUEEN) {
            write!(f, "q")?;
        }
        Ok(())
    }
}

/// A move in coordinate form. `captured` snapshots the piece this move
/// removes (for en passant that piece does not sit on `to`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub captured: Option<Piece>,
    pub promotion: Option<PieceKind>,
}

impl Move {
    pub fn new(from: Square, to: Square, captured: Option<Piece>) -> Move {
        Move { from, to, captured, promotion: None }
    }

    pub fn promoting(from: Square, to: Square, captured: Option<Piece>, kind: PieceKind) -> Move {
        Move { from, to, captured, promotion: Some(kind) }
    }

    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    pub fn is_promotion(&self) -> bool {
        self.promotion.is_some()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(p) = self.promotion.and_then(|k| k.promo_char()) {
            write!(f, "{}", p)?;
        }
        Ok(())
    }
}

/// Coordinate-notation request: source, destination, optional promotion.
/// Resolved against the legal-move list by `Position::find_move`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveRequest {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

impl FromStr for MoveRequest {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<MoveRequest, EngineError> {
        let bad = || EngineError::InvalidMoveText(s.to_string());
        if !s.is_ascii() || (s.len() != 4 && s.len() != 5) {
            return Err(bad());
        }
        let from = Square::from_algebraic(&s[0..2]).ok_or_else(bad)?;
        let to = Square::from_algebraic(&s[2..4]).ok_or_else(bad)?;
        let promotion = match s.as_bytes().get(4) {
            None => None,
            Some(b'q') => Some(PieceKind::Queen),
            Some(b'r') => Some(PieceKind::Rook),
            Some(b'b') => Some(PieceKind::Bishop),
            Some(b'n') => Some(PieceKind::Knight),
            Some(_) => return Err(bad()),
        };
        Ok(MoveRequest { from, to, promotion })
    }
}

/// Rook relocation performed by a castling move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RookHop {
    pub from: Square,
    pub to: Square,
    pub had_moved: bool,
}

/// Everything needed to restore a position to its exact pre-move state.
#[derive(Clone, Copy, Debug)]
pub struct Undo {
    pub captured: Option<Piece>,
    /// Where the captured piece actually stood (differs from `to` for
    /// en passant).
    pub captured_at: Option<Square>,
    pub rook_hop: Option<RookHop>,
    pub mover_had_moved: bool,
    pub was_promotion: bool,
    pub prev_castling: CastlingRights,
    pub prev_en_passant: Option<Square>,
    pub prev_halfmove_clock: u32,
    pub prev_fullmove_number: u32,
    pub prev_side_to_move: Color,
    pub prev_last_move: Option<Move>,
}

/// Undo record for a null move (side swap only).
#[derive(Clone, Copy, Debug)]
pub struct NullUndo {
    pub prev_en_passant: Option<Square>,
    pub prev_side_to_move: Color,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The side to move is mated; the winner is recorded.
    Checkmate(Color),
    Stalemate,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    grid: [[Option<Piece>; 8]; 8],
    pub side_to_move: Color,
    pub castling: CastlingRights,
    pub en_passant: Option<Square>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
    pub last_move: Option<Move>,
}

impl Position {
    pub fn empty() -> Position {
        Position {
            grid: [[None; 8]; 8],
            side_to_move: Color::White,
            castling: CastlingRights::none(),
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            last_move: None,
        }
    }

    /// Standard start layout.
    pub fn startpos() -> Position {
        let mut pos = Position::empty();
        pos.castling = CastlingRights::all();
        for color in [Color::White, Color::Black] {
            let back = color.back_row();
            let pawns = color.pawn_start_row();
            for col in 0..8 {
                pos.set(Square::new(pawns, col), Some(Piece::new(PieceKind::Pawn, color)));
            }
            let order = [
                PieceKind::Rook,
                PieceKind::Knight,
                PieceKind::Bishop,
                PieceKind::Queen,
                PieceKind::King,
                PieceKind::Bishop,
                PieceKind::Knight,
                PieceKind::Rook,
            ];
            for (col, kind) in order.into_iter().enumerate() {
                pos.set(Square::new(back, col as i8), Some(Piece::new(kind, color)));
            }
        }
        pos
    }

    pub fn at(&self, sq: Square) -> Option<Piece> {
        self.grid[sq.row as usize][sq.col as usize]
    }

    pub fn set(&mut self, sq: Square, piece: Option<Piece>) {
        self.grid[sq.row as usize][sq.col as usize] = piece;
    }

    pub fn is_empty_at(&self, sq: Square) -> bool {
        self.at(sq).is_none()
    }

    pub fn has_enemy_at(&self, sq: Square, color: Color) -> bool {
        matches!(self.at(sq), Some(p) if p.color != color)
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        for row in 0..8 {
            for col in 0..8 {
                let sq = Square::new(row, col);
                if let Some(p) = self.at(sq) {
                    if p.kind == PieceKind::King && p.color == color {
                        return Some(sq);
                    }
                }
            }
        }
        None
    }

    pub fn squares_of(&self, color: Color) -> Vec<Square> {
        let mut out = Vec::with_capacity(16);
        for row in 0..8 {
            for col in 0..8 {
                let sq = Square::new(row, col);
                if matches!(self.at(sq), Some(p) if p.color == color) {
                    out.push(sq);
                }
            }
        }
        out
    }

    /// Apply a move in place and return the record that `unmake` needs.
    ///
    /// Callers inside search must pair every `make` with exactly one
    /// `unmake` before their frame returns.
    pub fn make(&mut self, mv: &Move) -> Undo {
        let mut undo = Undo {
            captured: None,
            captured_at: None,
            rook_hop: None,
            mover_had_moved: false,
            was_promotion: mv.promotion.is_some(),
            prev_castling: self.castling,
            prev_en_passant: self.en_passant,
            prev_halfmove_clock: self.halfmove_clock,
            prev_fullmove_number: self.fullmove_number,
            prev_side_to_move: self.side_to_move,
            prev_last_move: self.last_move,
        };

        let mut piece = self.at(mv.from).expect("make: no piece on source square");
        undo.mover_had_moved = piece.moved;
        let color = piece.color;

        // Locate the captured piece; for en passant it sits on the
        // passed-over square, not the destination.
        if let Some(target) = self.at(mv.to) {
            undo.captured = Some(target);
            undo.captured_at = Some(mv.to);
        } else if piece.kind == PieceKind::Pawn && mv.from.col != mv.to.col {
            let ep_at = Square::new(mv.from.row, mv.to.col);
            undo.captured = self.at(ep_at);
            undo.captured_at = Some(ep_at);
            self.set(ep_at, None);
        }

        debug_assert_eq!(
            undo.captured.map(|p| (p.kind, p.color)),
            mv.captured.map(|p| (p.kind, p.color)),
            "make: captured snapshot does not match the board"
        );

        // Move the piece, overwriting any captured occupant.
        self.set(mv.from, None);
        piece.moved = true;
        if let Some(kind) = mv.promotion {
            piece.kind = kind;
        }
        self.set(mv.to, Some(piece));

        // Castling: the king moved two files, bring the rook across.
        if piece.kind == PieceKind::King && (mv.to.col - mv.from.col).abs() == 2 {
            let (rook_from_col, rook_to_col) = if mv.to.col > mv.from.col { (7, 5) } else { (0, 3) };
            let rook_from = Square::new(mv.from.row, rook_from_col);
            let rook_to = Square::new(mv.from.row, rook_to_col);
            if let Some(mut rook) = self.at(rook_from) {
                undo.rook_hop = Some(RookHop { from: rook_from, to: rook_to, had_moved: rook.moved });
                rook.moved = true;
                self.set(rook_from, None);
                self.set(rook_to, Some(rook));
            }
        }

        self.update_castling_rights(mv, color, undo.captured, undo.captured_at);

        // En-passant target exists only immediately after a double push.
        self.en_passant = if piece.kind == PieceKind::Pawn && (mv.to.row - mv.from.row).abs() == 2 {
            Some(Square::new((mv.from.row + mv.to.row) / 2, mv.from.col))
        } else {
            None
        };

        if piece.kind == PieceKind::Pawn || undo.captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if color == Color::Black {
            self.fullmove_number += 1;
        }
        self.side_to_move = color.opposite();
        self.last_move = Some(*mv);

        undo
    }

    /// Exact inverse of `make`.
    pub fn unmake(&mut self, mv: &Move, undo: Undo) {
        self.castling = undo.prev_castling;
        self.en_passant = undo.prev_en_passant;
        self.halfmove_clock = undo.prev_halfmove_clock;
        self.fullmove_number = undo.prev_fullmove_number;
        self.side_to_move = undo.prev_side_to_move;
        self.last_move = undo.prev_last_move;

        let mut piece = self.at(mv.to).expect("unmake: no piece on destination square");
        if undo.was_promotion {
            piece.kind = PieceKind::Pawn;
        }
        piece.moved = undo.mover_had_moved;
        self.set(mv.to, None);
        self.set(mv.from, Some(piece));

        if let (Some(captured), Some(at)) = (undo.captured, undo.captured_at) {
            self.set(at, Some(captured));
        }

        if let Some(hop) = undo.rook_hop {
            let mut rook = self.at(hop.to).expect("unmake: castling rook missing");
            rook.moved = hop.had_moved;
            self.set(hop.to, None);
            self.set(hop.from, Some(rook));
        }
    }

    /// Skip the turn; used by null-move pruning only.
    pub fn make_null(&mut self) -> NullUndo {
        let undo = NullUndo {
            prev_en_passant: self.en_passant,
            prev_side_to_move: self.side_to_move,
        };
        self.en_passant = None;
        self.side_to_move = self.side_to_move.opposite();
        undo
    }

    pub fn unmake_null(&mut self, undo: NullUndo) {
        self.en_passant = undo.prev_en_passant;
        self.side_to_move = undo.prev_side_to_move;
    }

    fn update_castling_rights(
        &mut self,
        mv: &Move,
        color: Color,
        captured: Option<Piece>,
        captured_at: Option<Square>,
    ) {
        let moved = self.at(mv.to).expect("piece just placed");
        match moved.kind {
            PieceKind::King => {
                self.castling.clear(CastlingRights::king_side(color));
                self.castling.clear(CastlingRights::queen_side(color));
            }
            PieceKind::Rook => {
                if mv.from.row == color.back_row() {
                    if mv.from.col == 7 {
                        self.castling.clear(CastlingRights::king_side(color));
                    } else if mv.from.col == 0 {
                        self.castling.clear(CastlingRights::queen_side(color));
                    }
                }
            }
            // Promotion lands here with the promoted kind; the pawn's
            // departure never affects rights.
            _ => {}
        }

        // Capturing a rook on its home corner strips the enemy right.
        if let (Some(p), Some(at)) = (captured, captured_at) {
            if p.kind == PieceKind::Rook && at.row == p.color.back_row() {
                if at.col == 7 {
                    self.castling.clear(CastlingRights::king_side(p.color));
                } else if at.col == 0 {
                    self.castling.clear(CastlingRights::queen_side(p.color));
                }
            }
        }
    }

    /// Resolve a coordinate-notation request against the legal-move list.
    pub fn find_move(&mut self, req: MoveRequest) -> Option<Move> {
        self.legal_moves()
            .into_iter()
            .find(|m| m.from == req.from && m.to == req.to && m.promotion == req.promotion)
    }

    /// Permanently play a move. Rejects anything outside the legal list
    /// and leaves the position untouched on error.
    pub fn apply(&mut self, req: MoveRequest) -> Result<Move, EngineError> {
        match self.find_move(req) {
            Some(mv) => {
                self.make(&mv);
                Ok(mv)
            }
            None => Err(EngineError::IllegalMove {
                from: req.from.to_string(),
                to: req.to.to_string(),
            }),
        }
    }

    /// Non-pawn, non-king piece count; drives phase classification.
    pub fn minor_major_count(&self) -> u32 {
        let mut n = 0;
        for row in 0..8 {
            for col in 0..8 {
                if let Some(p) = self.at(Square::new(row, col)) {
                    if p.kind != PieceKind::Pawn && p.kind != PieceKind::King {
                        n += 1;
                    }
                }
            }
        }
        n
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..8 {
            write!(f, "{} ", 8 - row)?;
            for col in 0..8 {
                match self.at(Square::new(row, col)) {
                    Some(p) => write!(f, "{} ", p.kind.fen_char(p.color))?,
                    None => write!(f, ". ")?,
                }
            }
            writeln!(f)?;
        }
        write!(f, "  a b c d e f g h")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_algebraic_round_trip() {
        let sq = Square::from_algebraic("e4").unwrap();
        assert_eq!(sq, Square::new(4, 4));
        assert_eq!(sq.to_string(), "e4");
        assert_eq!(Square::from_algebraic("a1").unwrap(), Square::new(7, 0));
        assert_eq!(Square::from_algebraic("h8").unwrap(), Square::new(0, 7));
        assert!(Square::from_algebraic("i9").is_none());
    }

    #[test]
    fn move_request_parsing() {
        let r: MoveRequest = "e2e4".parse().unwrap();
        assert_eq!(r.from.to_string(), "e2");
        assert_eq!(r.to.to_string(), "e4");
        assert_eq!(r.promotion, None);
        let r: MoveRequest = "a7a8q".parse().unwrap();
        assert_eq!(r.promotion, Some(PieceKind::Queen));
        assert!("e2e9".parse::<MoveRequest>().is_err());
        assert!("e2e4x".parse::<MoveRequest>().is_err());
    }

    #[test]
    fn startpos_has_one_king_per_side() {
        let pos = Position::startpos();
        assert_eq!(pos.king_square(Color::White), Some(Square::new(7, 4)));
        assert_eq!(pos.king_square(Color::Black), Some(Square::new(0, 4)));
        assert_eq!(pos.side_to_move, Color::White);
        assert_eq!(pos.castling, CastlingRights::all());
    }
}
