use ponder::board::Position;
use ponder::search::alphabeta::{search, SearchParams, Searcher};
use ponder::search::eval;

#[test]
fn search_returns_legal_move_startpos() {
    let mut pos = Position::startpos();
    let outcome = search(&mut pos, 1, None);
    let best = outcome.best_move.expect("no move found at depth 1");
    assert!(pos.legal_moves().contains(&best));
    assert_eq!(outcome.depth, 1);
}

#[test]
fn deeper_search_still_returns_a_legal_move() {
    let mut pos =
        Position::from_fen("r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 2 3")
            .unwrap();
    let outcome = search(&mut pos, 3, None);
    let best = outcome.best_move.expect("expected a best move");
    assert!(pos.legal_moves().contains(&best));
    assert_eq!(outcome.depth, 3);
    assert!(outcome.nodes > 0);
}

#[test]
fn search_prefers_winning_queen_capture() {
    // Bishop takes an undefended queen.
    let mut pos = Position::from_fen("4k3/8/8/8/5Q2/8/8/2b4K b - - 0 1").unwrap();
    let outcome = search(&mut pos, 1, None);
    assert_eq!(outcome.best_move.unwrap().to_string(), "c1f4");
}

#[test]
fn scores_are_white_relative_for_both_sides() {
    // Same material edge viewed from either side to move.
    let mut white_up = Position::from_fen("4k3/8/8/8/8/8/8/QK6 w - - 0 1").unwrap();
    let outcome = search(&mut white_up, 2, None);
    assert!(outcome.score_cp > 500, "white advantage must be positive: {}", outcome.score_cp);

    let mut black_up = Position::from_fen("qk6/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    let outcome = search(&mut black_up, 2, None);
    assert!(outcome.score_cp < -500, "black advantage must be negative: {}", outcome.score_cp);
}

#[test]
fn checkmated_position_reports_terminal_score() {
    // Fool's mate: White to move, already mated.
    let mut pos =
        Position::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
            .unwrap();
    let mut s = Searcher::default();
    let outcome = s.search(&mut pos, SearchParams::with_depth(2));
    assert!(outcome.best_move.is_none());
    assert_eq!(outcome.score_cp, -eval::MATE_SCORE);
}

#[test]
fn stalemate_scores_zero() {
    let mut pos = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
    let mut s = Searcher::default();
    let outcome = s.search(&mut pos, SearchParams::with_depth(2));
    assert!(outcome.best_move.is_none());
    assert_eq!(outcome.score_cp, 0);
}

#[test]
fn search_restores_the_position() {
    let mut pos =
        Position::from_fen("r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 2 3")
            .unwrap();
    let before = pos.clone();
    search(&mut pos, 3, None);
    assert_eq!(pos, before);
}
