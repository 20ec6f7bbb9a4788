pub mod alphabeta;
pub mod eval;
pub mod see;
pub mod tt;
pub mod zobrist;
