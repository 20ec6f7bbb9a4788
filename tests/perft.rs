use ponder::board::Position;
use ponder::perft::{perft, perft_divide};

#[test]
fn perft_startpos_small_depths() {
    let mut pos = Position::startpos();
    assert_eq!(perft(&mut pos, 1), 20);
    assert_eq!(perft(&mut pos, 2), 400);
    assert_eq!(perft(&mut pos, 3), 8902);
}

#[test]
fn perft_startpos_depth_4() {
    let mut pos = Position::startpos();
    assert_eq!(perft(&mut pos, 4), 197_281);
}

#[test]
#[ignore = "slow; run with --ignored"]
fn perft_startpos_depth_5() {
    let mut pos = Position::startpos();
    assert_eq!(perft(&mut pos, 5), 4_865_609);
}

#[test]
fn perft_castling_stress_position() {
    let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
    let mut pos = Position::from_fen(fen).unwrap();
    assert_eq!(perft(&mut pos, 1), 26);
    assert_eq!(perft(&mut pos, 2), 568);
    assert_eq!(perft(&mut pos, 3), 13_744);
}

#[test]
fn perft_en_passant_position() {
    let fen = "rnbqkbnr/pppp1ppp/8/4p3/3P4/8/PPP2PPP/RNBQKBNR b KQkq d3 0 2";
    let mut pos = Position::from_fen(fen).unwrap();
    assert_eq!(perft(&mut pos, 2), 1137);
}

#[test]
fn perft_leaves_position_untouched() {
    let mut pos = Position::startpos();
    let before = pos.clone();
    perft(&mut pos, 3);
    assert_eq!(pos, before);
}

#[test]
fn perft_divide_sums_to_perft() {
    let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
    let mut pos = Position::from_fen(fen).unwrap();
    let (rows, total) = perft_divide(&mut pos, 2);
    assert_eq!(rows.len(), 26);
    assert_eq!(total, 568);
    assert_eq!(rows.iter().map(|(_, n)| n).sum::<u64>(), total);
}
