use ponder::board::Position;
use ponder::search::alphabeta::Searcher;
use ponder::search::eval;

#[test]
fn qsearch_sees_the_hanging_queen() {
    // Black to move wins the white queen with Bc1xf4; the stand-pat
    // score misses it, quiescence must not.
    let mut pos = Position::from_fen("4k3/8/8/8/5Q2/8/8/2b4K b - - 0 1").unwrap();
    let mut s = Searcher::default();
    let stand = eval::evaluate(&pos);
    let qs = s.qsearch_eval_cp(&mut pos);
    assert!(
        qs < stand,
        "black to move should improve (lower) the white-relative score: qs {qs} vs stand {stand}"
    );
    assert!(qs < stand - 500, "capturing the queen is worth most of her value");
}

#[test]
fn qsearch_equals_standpat_without_captures() {
    let mut pos = Position::from_fen("k7/8/8/8/8/8/8/7K w - - 0 1").unwrap();
    let mut s = Searcher::default();
    let stand = eval::evaluate(&pos);
    assert_eq!(s.qsearch_eval_cp(&mut pos), stand);
}

#[test]
fn qsearch_does_not_lose_material_to_a_guarded_pawn() {
    // White's only capture is Qxd6 met by cxd6; stand pat must win.
    let mut pos = Position::from_fen("7k/2p5/3p4/8/8/3Q4/8/7K w - - 0 1").unwrap();
    let mut s = Searcher::default();
    let stand = eval::evaluate(&pos);
    let qs = s.qsearch_eval_cp(&mut pos);
    assert!(qs >= stand, "qsearch may stand pat instead of losing the queen");
}

#[test]
fn qsearch_leaves_position_untouched() {
    let mut pos =
        Position::from_fen("r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1")
            .unwrap();
    let before = pos.clone();
    let mut s = Searcher::default();
    s.qsearch_eval_cp(&mut pos);
    assert_eq!(pos, before);
}
