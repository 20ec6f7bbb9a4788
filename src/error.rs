use thiserror::Error;

/// Errors surfaced by the engine core.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Malformed FEN text; nothing is mutated on failure.
    #[error("invalid FEN: {0}")]
    InvalidFen(String),

    /// Move text that is not coordinate notation.
    #[error("invalid move text: {0}")]
    InvalidMoveText(String),

    /// The requested move is not in the legal-move list.
    #[error("illegal move: {from}{to}")]
    IllegalMove { from: String, to: String },
}
