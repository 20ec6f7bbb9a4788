// Static evaluation in centipawns, always from White's perspective.
// Composite of material, piece-square tables, king safety, pawn structure
// and opening principles, gated by a piece-count game phase.

use crate::board::{Color, PieceKind, Position, Square};

pub const MATE_SCORE: i32 = 20_000;
pub const DRAW_SCORE: i32 = 0;

const BISHOP_PAIR_BONUS: i32 = 30;
const CLOSED_KNIGHT_BONUS: i32 = 10;
const DOUBLED_PAWN_PENALTY: i32 = -25;
const ISOLATED_PAWN_PENALTY: i32 = -20;
const BACKWARD_PAWN_PENALTY: i32 = -15;
const CONNECTED_PAWN_BONUS: i32 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GamePhase {
    Opening,
    Middlegame,
    Endgame,
}

/// Piece-count classifier: non-pawn, non-king pieces remaining.
pub fn game_phase(pos: &Position) -> GamePhase {
    match pos.minor_major_count() {
        0..=6 => GamePhase::Endgame,
        7..=12 => GamePhase::Middlegame,
        _ => GamePhase::Opening,
    }
}

// Piece-square tables, White's orientation (row 0 = rank 8). Mirrored by
// row for Black.
#[rustfmt::skip]
const PAWN_TABLE: [[i32; 8]; 8] = [
    [  0,   0,   0,   0,   0,   0,   0,   0],
    [ 78,  83,  86,  73, 102,  82,  85,  90],
    [  7,  29,  21,  44,  40,  31,  44,   7],
    [-17,  16,  -2,  15,  14,   0,  15, -13],
    [-26,   3,  10,   9,   6,   1,   0, -23],
    [-22,   9,   5, -11, -10,  -2,   3, -19],
    [  5,  10,  10, -20, -20,  10,  10,   5],
    [  0,   0,   0,   0,   0,   0,   0,   0],
];

#[rustfmt::skip]
const KNIGHT_TABLE: [[i32; 8]; 8] = [
    [-50, -40, -30, -30, -30, -30, -40, -50],
    [-40, -20,   0,   0,   5,   0, -20, -40],
    [-30,   0,  10,  15,  15,  10,   0, -30],
    [-30,   5,  15,  20,  20,  15,   5, -30],
    [-30,   0,  15,  20,  20,  15,   0, -30],
    [-30,   5,  10,  15,  15,  10,   5, -30],
    [-40, -20,   0,   5,   5,   0, -20, -40],
    [-50, -40, -30, -30, -30, -30, -40, -50],
];

#[rustfmt::skip]
const BISHOP_TABLE: [[i32; 8]; 8] = [
    [-30, -40, -40, -35, -35, -40, -40, -30],
    [-40, -20, -10, -10, -10, -10, -20, -40],
    [-40, -10,   0,   0,   0,   0, -10, -40],
    [-35, -10,  10,  15,  15,  10, -10, -35],
    [-35, -10,  10,  15,  15,  10, -10, -35],
    [-40, -10,   0,  10,  10,   0, -10, -40],
    [-40, -20, -10, -10, -10, -10, -20, -40],
    [-30, -40, -40, -35, -35, -40, -40, -30],
];

#[rustfmt::skip]
const ROOK_TABLE: [[i32; 8]; 8] = [
    [ 35,  29,  33,   4,  37,  33,  56,  50],
    [ 55,  29,  56,  67,  55,  62,  34,  60],
    [ 19,  35,  28,  33,  45,  27,  25,  15],
    [  0,   5,  16,  13,  18,  -4,  -9,  -6],
    [-28, -35, -16, -21, -13, -29, -46, -30],
    [-42, -28, -42, -25, -25, -35, -26, -46],
    [-53, -38, -31, -26, -29, -43, -44, -53],
    [-30, -24, -18,   5,  -2, -18, -31, -32],
];

#[rustfmt::skip]
const QUEEN_TABLE: [[i32; 8]; 8] = [
    [-20, -15, -10,  -5,  -5, -10, -15, -20],
    [-15, -10,  -5,   0,   0,  -5, -10, -15],
    [-10,  -5,   5,   8,   8,   5,  -5, -10],
    [ -5,   0,   8,  10,  10,   8,   0,  -5],
    [ -5,   0,   8,  10,  10,   8,   0,  -5],
    [-10,  -5,   5,   8,   8,   5,  -5, -10],
    [-15, -10,  -5,   0,   0,  -5, -10, -15],
    [-20, -15, -10,  -5,  -5, -10, -15, -20],
];

#[rustfmt::skip]
const KING_MIDDLEGAME_TABLE: [[i32; 8]; 8] = [
    [-80, -70, -70, -70, -70, -70, -70, -80],
    [-70, -60, -60, -60, -60, -60, -60, -70],
    [-60, -50, -50, -50, -50, -50, -50, -60],
    [-50, -40, -40, -40, -40, -40, -40, -50],
    [-40, -30, -30, -30, -30, -30, -30, -40],
    [-30, -20, -20, -20, -20, -20, -20, -30],
    [ 10,  15,   5,  -5,  -5,   5,  15,  10],
    [ 20,  30,  10,   0,   0,  10,  30,  20],
];

#[rustfmt::skip]
const KING_ENDGAME_TABLE: [[i32; 8]; 8] = [
    [-74, -35, -18, -18, -11,  15,   4, -17],
    [-12,  17,  14,  17,  17,  38,  23,  11],
    [ 10,  17,  23,  15,  20,  45,  44,  13],
    [ -8,  22,  24,  27,  26,  33,  26,   3],
    [-18,  -4,  21,  24,  27,  23,   9, -11],
    [-19,  -3,  11,  21,  23,  16,   7,  -9],
    [-27, -11,   4,  13,  14,   4,  -5, -17],
    [-53, -34, -21, -11, -28, -14, -24, -43],
];

/// Composite evaluation:
/// material + 0.5*positional + 0.3*king safety (outside the endgame)
/// + 0.3*pawn structure, plus opening principles in the opening.
pub fn evaluate(pos: &Position) -> i32 {
    let phase = game_phase(pos);
    let mut score = material(pos);
    score += positional(pos, phase) / 2;
    if phase != GamePhase::Endgame {
        score += king_safety(pos, phase) * 3 / 10;
    }
    score += pawn_structure(pos) * 3 / 10;
    if phase == GamePhase::Opening && pos.fullmove_number <= 10 {
        score += opening_principles(pos);
    }
    score
}

pub fn material(pos: &Position) -> i32 {
    let mut score = 0;
    let mut bishops = [0i32; 2];
    let mut knights = [0i32; 2];
    let mut pawns = [0i32; 2];

    for (_, piece) in pieces(pos) {
        if piece.kind == PieceKind::King {
            continue;
        }
        let side = if piece.color == Color::White { 0 } else { 1 };
        match piece.kind {
            PieceKind::Bishop => bishops[side] += 1,
            PieceKind::Knight => knights[side] += 1,
            PieceKind::Pawn => pawns[side] += 1,
            _ => {}
        }
        let v = piece.kind.value_cp();
        score += if piece.color == Color::White { v } else { -v };
    }

    if bishops[0] >= 2 {
        score += BISHOP_PAIR_BONUS;
    }
    if bishops[1] >= 2 {
        score -= BISHOP_PAIR_BONUS;
    }
    // Knights gain in closed positions.
    if pawns[0] + pawns[1] >= 12 {
        score += (knights[0] - knights[1]) * CLOSED_KNIGHT_BONUS;
    }
    score
}

pub fn positional(pos: &Position, phase: GamePhase) -> i32 {
    let mut score = 0;
    for (sq, piece) in pieces(pos) {
        let v = piece_square_value(piece.kind, piece.color, sq, phase);
        score += if piece.color == Color::White { v } else { -v };
    }
    score
}

fn piece_square_value(kind: PieceKind, color: Color, sq: Square, phase: GamePhase) -> i32 {
    let row = if color == Color::White { sq.row } else { 7 - sq.row } as usize;
    let col = sq.col as usize;
    match kind {
        PieceKind::Pawn => PAWN_TABLE[row][col],
        PieceKind::Knight => KNIGHT_TABLE[row][col],
        PieceKind::Bishop => BISHOP_TABLE[row][col],
        PieceKind::Rook => ROOK_TABLE[row][col],
        PieceKind::Queen => QUEEN_TABLE[row][col],
        PieceKind::King => {
            if phase == GamePhase::Endgame {
                KING_ENDGAME_TABLE[row][col]
            } else {
                KING_MIDDLEGAME_TABLE[row][col]
            }
        }
    }
}

pub fn king_safety(pos: &Position, phase: GamePhase) -> i32 {
    // Doubled multiplier to stay in integers: opening 2.0, middlegame
    // 3.0, endgame 0.5.
    let mult2 = match phase {
        GamePhase::Opening => 4,
        GamePhase::Middlegame => 6,
        GamePhase::Endgame => 1,
    };
    let mut score = 0;
    for color in [Color::White, Color::Black] {
        if let Some(king) = pos.king_square(color) {
            let s = king_safety_for(pos, king, color, phase) * mult2 / 2;
            score += if color == Color::White { s } else { -s };
        }
    }
    score
}

fn king_safety_for(pos: &Position, king: Square, color: Color, phase: GamePhase) -> i32 {
    let mut score = 0;
    let endgame = phase == GamePhase::Endgame;

    if !endgame {
        // A centralized king is a liability before the endgame.
        if (2..=5).contains(&king.row) && (2..=5).contains(&king.col) {
            score -= 100;
        }
        match color {
            Color::White if king.row < 6 => score -= (6 - king.row) as i32 * 30,
            Color::Black if king.row > 1 => score -= (king.row - 1) as i32 * 30,
            _ => {}
        }
    }

    // Pawn shield on the two ranks in front of the king.
    let dir = color.pawn_dir();
    let mut shield = 0;
    for (i, shield_row) in [king.row + dir, king.row + 2 * dir].into_iter().enumerate() {
        for col in king.col - 1..=king.col + 1 {
            if !Square::in_range(shield_row, col) {
                continue;
            }
            if own_pawn_at(pos, Square::new(shield_row, col), color) {
                score += if i == 0 { 25 } else { 15 };
                shield += 1;
            }
        }
    }
    if !endgame && shield == 0 {
        score -= 80;
    }

    // Open files around the king.
    if !endgame {
        let mut open = 0;
        for col in king.col - 1..=king.col + 1 {
            if !(0..8).contains(&col) {
                continue;
            }
            let has_own_pawn =
                (0..8).any(|row| own_pawn_at(pos, Square::new(row, col), color));
            if !has_own_pawn {
                open += 1;
            }
        }
        score -= open * 25;

        // Castled-king squares.
        let back = color.back_row();
        if king == Square::new(back, 6) || king == Square::new(back, 2) {
            score += 40;
        }
    }

    score
}

pub fn pawn_structure(pos: &Position) -> i32 {
    let mut score = 0;
    for color in [Color::White, Color::Black] {
        let s = pawn_structure_for(pos, color);
        score += if color == Color::White { s } else { -s };
    }
    score
}

fn pawn_structure_for(pos: &Position, color: Color) -> i32 {
    let pawns: Vec<Square> = pos
        .squares_of(color)
        .into_iter()
        .filter(|&sq| matches!(pos.at(sq), Some(p) if p.kind == PieceKind::Pawn))
        .collect();

    let mut per_file = [0u8; 8];
    for sq in &pawns {
        per_file[sq.col as usize] += 1;
    }

    let mut score = 0;
    for &sq in &pawns {
        if per_file[sq.col as usize] > 1 {
            score += DOUBLED_PAWN_PENALTY;
        }

        let adjacent_files: Vec<i8> = [sq.col - 1, sq.col + 1]
            .into_iter()
            .filter(|&c| (0..8).contains(&c))
            .collect();
        let has_neighbour = adjacent_files.iter().any(|&c| per_file[c as usize] > 0);
        if !has_neighbour {
            score += ISOLATED_PAWN_PENALTY;
        } else if is_backward(&pawns, sq, color, &adjacent_files) {
            score += BACKWARD_PAWN_PENALTY;
        }

        if is_passed(pos, sq, color) {
            let steps = (sq.row - color.promotion_row()).abs() as i32;
            score += 20 + (7 - steps) * 10;
        }

        let connected = [(1, -1), (1, 1), (-1, -1), (-1, 1)]
            .into_iter()
            .any(|(dr, dc)| pawns.contains(&Square { row: sq.row + dr, col: sq.col + dc }));
        if connected {
            score += CONNECTED_PAWN_BONUS;
        }
    }
    score
}

/// Backward: every friendly pawn on an adjacent file is already ahead,
/// so this one can no longer be defended by a pawn.
fn is_backward(pawns: &[Square], sq: Square, color: Color, adjacent_files: &[i8]) -> bool {
    let ahead = |other: Square| match color {
        Color::White => other.row < sq.row,
        Color::Black => other.row > sq.row,
    };
    pawns
        .iter()
        .filter(|p| adjacent_files.contains(&p.col))
        .all(|&p| ahead(p))
}

fn is_passed(pos: &Position, sq: Square, color: Color) -> bool {
    let dir = color.pawn_dir();
    for col in sq.col - 1..=sq.col + 1 {
        if !(0..8).contains(&col) {
            continue;
        }
        let mut row = sq.row + dir;
        while (0..8).contains(&row) {
            if let Some(p) = pos.at(Square::new(row, col)) {
                if p.kind == PieceKind::Pawn && p.color != color {
                    return false;
                }
            }
            row += dir;
        }
    }
    true
}

/// Opening-principle heuristic, applied for the first ten full moves:
/// early queen sorties, undeveloped minors, rim knights and wing pawn
/// pushes all move the score.
pub fn opening_principles(pos: &Position) -> i32 {
    let earliness = (11 - pos.fullmove_number.min(10)) as i32;
    let mut score = 0;
    for (sq, piece) in pieces(pos) {
        let back = piece.color.back_row();
        let sign = if piece.color == Color::White { 1 } else { -1 };
        match piece.kind {
            PieceKind::Queen => {
                if sq.row != back {
                    score -= sign * 6 * earliness;
                }
            }
            PieceKind::Knight => {
                if sq.row != back {
                    score += sign * 8;
                }
                if sq.col == 0 || sq.col == 7 {
                    score -= sign * 15;
                }
            }
            PieceKind::Bishop => {
                if sq.row != back {
                    score += sign * 8;
                }
            }
            PieceKind::Pawn => {
                let wing = sq.col <= 1 || sq.col >= 6;
                if wing && sq.row != piece.color.pawn_start_row() {
                    score -= sign * 10;
                }
            }
            _ => {}
        }
    }
    score
}

/// Diagnostic breakdown; not used on the search fast path.
#[derive(Clone, Copy, Debug, Default)]
pub struct EvalBreakdown {
    pub material: i32,
    pub positional: i32,
    pub king_safety: i32,
    pub pawn_structure: i32,
    pub opening: i32,
    pub mobility: i32,
    pub total: i32,
}

pub fn eval_components(pos: &Position) -> EvalBreakdown {
    let phase = game_phase(pos);
    let mut b = EvalBreakdown {
        material: material(pos),
        positional: positional(pos, phase),
        king_safety: king_safety(pos, phase),
        pawn_structure: pawn_structure(pos),
        ..Default::default()
    };
    if phase == GamePhase::Opening && pos.fullmove_number <= 10 {
        b.opening = opening_principles(pos);
    }
    // Pseudo-legal mobility differential, 4cp per move.
    let white = pos.pseudo_legal_moves(Color::White, false).len() as i32;
    let black = pos.pseudo_legal_moves(Color::Black, false).len() as i32;
    b.mobility = (white - black) * 4;
    b.total = evaluate(pos);
    b
}

fn own_pawn_at(pos: &Position, sq: Square, color: Color) -> bool {
    matches!(pos.at(sq), Some(p) if p.kind == PieceKind::Pawn && p.color == color)
}

fn pieces(pos: &Position) -> Vec<(Square, crate::board::Piece)> {
    let mut out = Vec::with_capacity(32);
    for row in 0..8 {
        for col in 0..8 {
            let sq = Square::new(row, col);
            if let Some(p) = pos.at(sq) {
                out.push((sq, p));
            }
        }
    }
    out
}

/// Material points per side (pawn 1, minor 3, rook 5, queen 9); the
/// null-move endgame gate.
pub fn material_points(pos: &Position, color: Color) -> i32 {
    let mut total = 0;
    for (_, p) in pieces(pos) {
        if p.color != color {
            continue;
        }
        total += match p.kind {
            PieceKind::Pawn => 1,
            PieceKind::Knight | PieceKind::Bishop => 3,
            PieceKind::Rook => 5,
            PieceKind::Queen => 9,
            PieceKind::King => 0,
        };
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startpos_is_balanced() {
        let pos = Position::startpos();
        assert_eq!(evaluate(&pos), 0);
        assert_eq!(material(&pos), 0);
    }

    #[test]
    fn extra_queen_dominates() {
        let pos = Position::from_fen("k7/8/8/8/8/8/8/KQ6 w - - 0 1").unwrap();
        assert!(evaluate(&pos) > 800);
    }

    #[test]
    fn phase_classification() {
        assert_eq!(game_phase(&Position::startpos()), GamePhase::Opening);
        let endgame = Position::from_fen("k7/8/8/8/8/8/8/KR6 w - - 0 1").unwrap();
        assert_eq!(game_phase(&endgame), GamePhase::Endgame);
    }

    #[test]
    fn doubled_pawns_are_penalized() {
        let doubled = Position::from_fen("k7/8/8/8/8/3P4/3P4/K7 w - - 20 40").unwrap();
        let healthy = Position::from_fen("k7/8/8/8/8/8/2PP4/K7 w - - 20 40").unwrap();
        assert!(pawn_structure(&doubled) < pawn_structure(&healthy));
    }

    #[test]
    fn passed_pawn_bonus_grows_with_advance() {
        let far = Position::from_fen("k7/8/8/8/8/8/3P4/K7 w - - 20 40").unwrap();
        let near = Position::from_fen("k7/3P4/8/8/8/8/8/K7 w - - 20 40").unwrap();
        assert!(pawn_structure(&near) > pawn_structure(&far));
    }

    #[test]
    fn early_queen_sortie_is_penalized() {
        // Same material, queen out on move 2 vs at home.
        let out = Position::from_fen(
            "rnbqkbnr/pppppppp/8/8/4Q3/8/PPPPPPPP/RNB1KBNR w KQkq - 4 3",
        )
        .unwrap();
        let home = Position::from_fen(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 4 3",
        )
        .unwrap();
        assert!(opening_principles(&out) < opening_principles(&home));
    }

    #[test]
    fn material_points_counts_per_side() {
        let pos = Position::startpos();
        assert_eq!(material_points(&pos, Color::White), 8 + 6 + 6 + 10 + 9);
        assert_eq!(material_points(&pos, Color::Black), 39);
    }
}
