// Static exchange evaluation: material outcome of the full recapture
// sequence on one square, no search. Each side recaptures with its
// cheapest remaining attacker; a king only recaptures once the other
// side has no attacker left.

use crate::board::{Color, Move, PieceKind, Position, Square};

const KING_VALUE: i32 = PieceKind::King.value_cp();

/// Net material of the exchange started by `mv`, in centipawns, positive
/// favoring the initiating side. Non-captures score 0.
pub fn see(pos: &Position, mv: &Move) -> i32 {
    let Some(captured) = mv.captured else { return 0 };
    let Some(mover) = pos.at(mv.from) else { return 0 };

    let mut white = attackers_on(pos, mv.to, Color::White, mv.from);
    let mut black = attackers_on(pos, mv.to, Color::Black, mv.from);

    // Balance tracked from White's perspective.
    let initiator = mover.color;
    let mut balance = if initiator == Color::White {
        captured.kind.value_cp()
    } else {
        -captured.kind.value_cp()
    };
    let mut on_square = mover.kind.value_cp();
    let mut turn = initiator.opposite();

    loop {
        let (list, other_has) = match turn {
            Color::White => (&mut white, !black.is_empty()),
            Color::Black => (&mut black, !white.is_empty()),
        };
        let Some(&next) = list.first() else { break };
        if next == KING_VALUE && other_has {
            // Recapturing with the king would leave it attacked.
            break;
        }
        list.remove(0);
        match turn {
            Color::White => balance += on_square,
            Color::Black => balance -= on_square,
        }
        on_square = next;
        turn = turn.opposite();
    }

    if initiator == Color::White {
        balance
    } else {
        -balance
    }
}

/// Piece values of `color`'s attackers of `target`, cheapest first,
/// excluding the piece on `skip`.
fn attackers_on(pos: &Position, target: Square, color: Color, skip: Square) -> Vec<i32> {
    let mut values: Vec<i32> = pos
        .squares_of(color)
        .into_iter()
        .filter(|&sq| sq != skip && pos.attacks_square(sq, target))
        .map(|sq| pos.at(sq).expect("attacker square occupied").kind.value_cp())
        .collect();
    values.sort_unstable();
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::MoveRequest;

    fn capture(pos: &mut Position, text: &str) -> Move {
        let req: MoveRequest = text.parse().unwrap();
        pos.find_move(req).expect("capture must be legal")
    }

    #[test]
    fn pawn_takes_undefended_queen() {
        let mut pos = Position::from_fen("7k/8/3q4/4P3/8/8/8/7K w - - 0 1").unwrap();
        let mv = capture(&mut pos, "e5d6");
        assert_eq!(see(&pos, &mv), 900);
    }

    #[test]
    fn queen_takes_defended_pawn_loses_material() {
        // d6 pawn is guarded by the c7 pawn: Qxd6 cxd6 nets -800.
        let mut pos = Position::from_fen("7k/2p5/3p4/8/8/3Q4/8/7K w - - 0 1").unwrap();
        let mv = capture(&mut pos, "d3d6");
        assert_eq!(see(&pos, &mv), 100 - 900);
    }

    #[test]
    fn even_trade_is_zero() {
        let mut pos = Position::from_fen("7k/2p5/3p4/8/8/3R4/8/7K w - - 0 1").unwrap();
        let mv = capture(&mut pos, "d3d6");
        assert_eq!(see(&pos, &mv), 100 - 500);

        // Undefended pawn: clean gain.
        let mut pos = Position::from_fen("7k/8/3p4/8/8/3R4/8/7K w - - 0 1").unwrap();
        let mv = capture(&mut pos, "d3d6");
        assert_eq!(see(&pos, &mv), 100);
    }

    #[test]
    fn king_does_not_recapture_into_attack() {
        // Rook takes pawn next to the black king, but a white bishop also
        // covers the square: Kxd6 is excluded, so the exchange stays +100.
        let mut pos = Position::from_fen("8/2k5/3p4/8/8/6B1/3R4/7K w - - 0 1").unwrap();
        let mv = capture(&mut pos, "d2d6");
        assert_eq!(see(&pos, &mv), 100);
    }

    #[test]
    fn non_capture_scores_zero() {
        let mut pos = Position::startpos();
        let mv = pos
            .legal_moves()
            .into_iter()
            .find(|m| !m.is_capture())
            .unwrap();
        assert_eq!(see(&pos, &mv), 0);
    }
}
