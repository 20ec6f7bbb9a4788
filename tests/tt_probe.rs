use ponder::board::Position;
use ponder::search::alphabeta::{SearchParams, Searcher};

#[test]
fn root_entry_stored_at_search_depth() {
    let mut pos = Position::startpos();
    let mut s = Searcher::default();
    let params = SearchParams { depth: 3, ..Default::default() };
    let outcome = s.search(&mut pos, params);
    let (depth, score) = s.tt_probe(&pos).expect("root entry missing after search");
    assert!(depth >= 3, "expected stored depth >= 3, got {depth}");
    assert_eq!(score, outcome.score_cp, "root entry carries the final score");
}

#[test]
fn tt_reduces_nodes_on_transposing_lines() {
    // Pawn-race structure where different move orders transpose heavily.
    let fen = "qk1r4/pppp4/8/8/8/8/PPPP4/QK1R4 w - - 0 1";

    let mut s1 = Searcher::default();
    let mut pos = Position::from_fen(fen).unwrap();
    let without = SearchParams { depth: 3, use_tt: false, ..Default::default() };
    let r1 = s1.search(&mut pos, without);

    let mut s2 = Searcher::default();
    let with = SearchParams { use_tt: true, ..without };
    let r2 = s2.search(&mut pos, with);

    assert!(
        r2.nodes < r1.nodes,
        "memoized search should visit fewer nodes: {} vs {}",
        r2.nodes,
        r1.nodes
    );
}

#[test]
fn tt_is_reset_between_invocations() {
    let mut pos = Position::startpos();
    let mut s = Searcher::default();
    s.search(&mut pos, SearchParams::with_depth(3));
    assert!(s.tt_probe(&pos).is_some());

    // A fresh invocation starts from an empty table; after a depth-1
    // search the stored root depth must be 1, not a stale 3.
    s.search(&mut pos, SearchParams::with_depth(1));
    let (depth, _) = s.tt_probe(&pos).unwrap();
    assert_eq!(depth, 1);
}
