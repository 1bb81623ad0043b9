//! Error types for position validation, FEN import, game play and notation.

use crate::piece::PieceKind;
use crate::square::Square;

/// Structural problems found by [`Position::validate`](crate::Position::validate).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PositionError {
    /// A side does not have exactly one king.
    #[error("expected 1 king for {color}, found {count}")]
    InvalidKingCount {
        color: &'static str,
        count: u32,
    },
    /// Two (color, kind) bitboards claim the same square.
    #[error("overlapping piece bitboards")]
    OverlappingPieces,
    /// A pawn stands on the first or eighth rank.
    #[error("pawns found on back rank")]
    PawnsOnBackRank,
}

/// Reasons a FEN string is rejected. The previous game state is never touched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FenError {
    #[error("expected 6 FEN fields, found {found}")]
    WrongFieldCount { found: usize },

    #[error("expected 8 ranks in piece placement, found {found}")]
    WrongRankCount { found: usize },

    /// `rank_index` counts from the top of the board (0 = rank 8).
    #[error("rank {rank_index} describes {length} squares, expected 8")]
    BadRankLength { rank_index: usize, length: usize },

    #[error("invalid piece character: '{character}'")]
    InvalidPieceChar { character: char },

    #[error("invalid active color: \"{found}\"")]
    InvalidColor { found: String },

    #[error("invalid castling field: \"{found}\"")]
    InvalidCastling { found: String },

    #[error("invalid en passant square: \"{found}\"")]
    InvalidEnPassant { found: String },

    #[error("invalid {field}: \"{found}\"")]
    InvalidMoveCounter { field: &'static str, found: String },

    #[error("invalid position: {source}")]
    InvalidPosition {
        #[from]
        source: PositionError,
    },
}

/// Rejected interactions with a [`GameState`](crate::GameState). None of them change state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("no piece of the side to move on {square}")]
    InvalidSelection { square: Square },

    #[error("no piece is selected")]
    NoSelection,

    #[error("invalid move: {from}{to} is not available")]
    IllegalDestination { from: Square, to: Square },

    #[error("a promotion choice is pending on {square}")]
    PromotionPending { square: Square },

    #[error("no promotion is pending")]
    NotAwaitingPromotion,

    #[error("cannot promote to {kind:?}")]
    InvalidPromotion { kind: PieceKind },

    #[error("the game is over")]
    GameOver,
}

/// Failures reading SAN, PGN or coordinate notation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotationError {
    /// The token matches no recognised move grammar.
    #[error("malformed move token \"{token}\"")]
    Malformed { token: String },

    #[error("no legal move matches \"{token}\"")]
    NoSuchMove { token: String },

    #[error("\"{token}\" matches more than one legal move")]
    Ambiguous { token: String },

    #[error("malformed PGN header: {line}")]
    Header { line: String },

    /// A movetext token failed; `position` is its 1-based ordinal among move tokens.
    #[error("PGN move {position} (\"{token}\"): {source}")]
    AtToken {
        position: usize,
        token: String,
        #[source]
        source: Box<NotationError>,
    },

    #[error(transparent)]
    Fen(#[from] FenError),

    #[error(transparent)]
    Game(#[from] GameError),
}
