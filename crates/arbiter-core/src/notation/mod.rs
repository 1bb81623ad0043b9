//! Text notations: FEN, SAN and PGN.

mod fen;
pub mod pgn;
pub mod san;

pub use fen::STARTING_FEN;
pub use pgn::{PgnGame, SEVEN_TAG_ROSTER, read_pgn, write_pgn};
pub use san::{parse_san, to_san};
