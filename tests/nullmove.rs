use ponder::board::Position;
use ponder::search::alphabeta::{SearchParams, Searcher};

// Symmetric heavy-piece position behind pawn walls: both sides hold
// 18 material points, keeping the zugzwang gate open, while the narrow
// branching keeps a depth-4 comparison cheap.
const MIDGAME_FEN: &str = "qk1r4/pppp4/8/8/8/8/PPPP4/QK1R4 w - - 0 1";

#[test]
fn nullmove_reduces_nodes_midgame() {
    let mut pos = Position::from_fen(MIDGAME_FEN).unwrap();
    let mut s1 = Searcher::default();
    let base = SearchParams { depth: 4, use_nullmove: false, ..Default::default() };
    let r1 = s1.search(&mut pos, base);

    let mut s2 = Searcher::default();
    let with_null = SearchParams { use_nullmove: true, ..base };
    let r2 = s2.search(&mut pos, with_null);

    assert!(
        (r2.score_cp - r1.score_cp).abs() <= 100,
        "nullmove changed score too much: {} vs {}",
        r2.score_cp,
        r1.score_cp
    );
    assert!(
        r2.nodes <= r1.nodes,
        "nullmove did not reduce nodes: {} vs {}",
        r2.nodes,
        r1.nodes
    );
}

#[test]
fn nullmove_disabled_in_check() {
    // Black is in check from the rook; the pruning gate must not fire.
    let mut pos = Position::from_fen("k7/8/8/8/8/8/8/R3K3 b - - 0 1").unwrap();
    let mut s1 = Searcher::default();
    let base = SearchParams { depth: 3, use_nullmove: false, ..Default::default() };
    let r1 = s1.search(&mut pos, base);

    let mut s2 = Searcher::default();
    let with_null = SearchParams { use_nullmove: true, ..base };
    let r2 = s2.search(&mut pos, with_null);
    assert_eq!(r2.score_cp, r1.score_cp, "nullmove in check should not change score");
    assert_eq!(r2.best_move.map(|m| m.to_string()), r1.best_move.map(|m| m.to_string()));
}

#[test]
fn nullmove_never_selects_an_illegal_move() {
    let mut pos = Position::from_fen(MIDGAME_FEN).unwrap();
    let mut s = Searcher::default();
    let params = SearchParams { depth: 4, ..Default::default() };
    let best = s.search(&mut pos, params).best_move.unwrap();
    assert!(pos.legal_moves().contains(&best));
}
