use ponder::board::Position;
use ponder::search::alphabeta::{SearchParams, Searcher};
use std::time::{Duration, Instant};

#[test]
fn movetime_returns_quickly_with_move() {
    let mut pos = Position::startpos();
    let mut searcher = Searcher::default();
    let params = SearchParams {
        depth: 10, // far deeper than the budget allows
        movetime: Some(Duration::from_millis(50)),
        ..Default::default()
    };
    let t0 = Instant::now();
    let outcome = searcher.search(&mut pos, params);
    let elapsed = t0.elapsed();
    assert!(outcome.best_move.is_some(), "no bestmove under movetime");
    // Cooperative polling may overshoot by one node, not by seconds.
    assert!(elapsed < Duration::from_millis(2000), "search exceeded time: {elapsed:?}");
}

#[test]
fn timeout_keeps_last_completed_depth() {
    let mut pos = Position::startpos();
    let mut searcher = Searcher::default();
    let params = SearchParams {
        depth: 10,
        movetime: Some(Duration::from_millis(200)),
        ..Default::default()
    };
    let outcome = searcher.search(&mut pos, params);
    assert!(outcome.best_move.is_some());
    assert!(outcome.depth >= 1, "at least depth 1 must complete");
    assert!(outcome.depth < 10, "depth 10 cannot complete in 200ms here");
}

#[test]
fn interrupted_search_restores_the_position() {
    let mut pos =
        Position::from_fen("r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 2 3")
            .unwrap();
    let before = pos.clone();
    let mut searcher = Searcher::default();
    let params = SearchParams {
        depth: 12,
        movetime: Some(Duration::from_millis(30)),
        ..Default::default()
    };
    searcher.search(&mut pos, params);
    assert_eq!(pos, before, "every made move must be unmade when the timeout unwinds");
}
