//! Core chess rules: bitboard position, move generation, legality and the
//! game state machine, with FEN, SAN and PGN support.

mod bitboard;
mod castle_rights;
mod chess_move;
mod color;
mod error;
mod game;
pub mod movegen;
pub mod notation;
pub mod perft;
mod piece;
mod position;
pub mod rules;
mod square;

#[cfg(test)]
mod tests;

pub use bitboard::Bitboard;
pub use castle_rights::{CastleRights, CastleSide};
pub use chess_move::{CoordinateMove, Move, MoveFlags, MoveRecord};
pub use color::Color;
pub use error::{FenError, GameError, NotationError, PositionError};
pub use game::{GameState, GameStatus, MoveOutcome, Phase, RenderFrame};
pub use notation::STARTING_FEN;
pub use piece::{Piece, PieceKind};
pub use position::{Position, PrettyPosition};
pub use square::Square;
