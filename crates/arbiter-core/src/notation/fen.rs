//! FEN import and export for [`GameState`].

use std::fmt;
use std::str::FromStr;

use crate::castle_rights::CastleRights;
use crate::color::Color;
use crate::error::FenError;
use crate::game::GameState;
use crate::movegen::en_passant_victim;
use crate::piece::{Piece, PieceKind};
use crate::position::Position;
use crate::square::Square;

/// The FEN string for the standard starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

fn parse_placement(field: &str) -> Result<Position, FenError> {
    let ranks: Vec<&str> = field.split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::WrongRankCount { found: ranks.len() });
    }

    let mut position = Position::empty();
    for (rank_index, rank_str) in ranks.iter().enumerate() {
        // FEN lists rank 8 first
        let rank = 7 - rank_index as u8;
        let mut file: usize = 0;

        for c in rank_str.chars() {
            if let Some(digit) = c.to_digit(10) {
                if !(1..=8).contains(&digit) {
                    return Err(FenError::InvalidPieceChar { character: c });
                }
                file += digit as usize;
                continue;
            }
            let piece = Piece::from_fen_char(c).ok_or(FenError::InvalidPieceChar { character: c })?;
            let sq = u8::try_from(file)
                .ok()
                .and_then(|f| Square::from_coords(f, rank))
                .ok_or(FenError::BadRankLength {
                    rank_index,
                    length: file + 1,
                })?;
            position.put(sq, piece);
            file += 1;
        }

        if file != 8 {
            return Err(FenError::BadRankLength { rank_index, length: file });
        }
    }
    Ok(position)
}

fn parse_en_passant(field: &str, turn: Color, position: &Position) -> Result<Option<Square>, FenError> {
    if field == "-" {
        return Ok(None);
    }
    let invalid = || FenError::InvalidEnPassant { found: field.to_string() };
    let target = Square::from_algebraic(field).ok_or_else(invalid)?;

    // the target sits behind a pawn of the side that just moved
    let expected_rank = match turn {
        Color::White => 5,
        Color::Black => 2,
    };
    let pushed = turn.flip();
    let victim = en_passant_victim(target, turn).ok_or_else(invalid)?;
    if target.rank() != expected_rank
        || position.piece_at(target).is_some()
        || position.piece_at(victim) != Some(Piece::new(pushed, PieceKind::Pawn))
    {
        return Err(invalid());
    }
    Ok(Some(target))
}

fn parse_counter(field: &str, name: &'static str, minimum: u32) -> Result<u32, FenError> {
    field
        .parse::<u32>()
        .ok()
        .filter(|&n| n >= minimum)
        .ok_or_else(|| FenError::InvalidMoveCounter {
            field: name,
            found: field.to_string(),
        })
}

impl FromStr for GameState {
    type Err = FenError;

    fn from_str(fen: &str) -> Result<GameState, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        let [placement, color, castling, en_passant, halfmove, fullmove] = fields[..] else {
            return Err(FenError::WrongFieldCount { found: fields.len() });
        };

        let position = parse_placement(placement)?;
        let turn = match color {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::InvalidColor { found: other.to_string() }),
        };
        let castling = CastleRights::from_fen(castling)?;
        let en_passant = parse_en_passant(en_passant, turn, &position)?;
        let halfmove = parse_counter(halfmove, "halfmove clock", 0)?;
        let fullmove = parse_counter(fullmove, "fullmove number", 1)?;

        GameState::from_parts(position, turn, castling, en_passant, halfmove, fullmove)
    }
}

/// Writes the piece-placement field.
struct Placement<'a>(&'a Position);

impl fmt::Display for Placement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0u8..8).rev() {
            let mut empty = 0u8;
            for file in 0u8..8 {
                match Square::from_coords(file, rank).and_then(|sq| self.0.piece_at(sq)) {
                    Some(piece) => {
                        if empty > 0 {
                            write!(f, "{empty}")?;
                            empty = 0;
                        }
                        write!(f, "{}", piece.fen_char())?;
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                write!(f, "{empty}")?;
            }
            if rank > 0 {
                f.write_str("/")?;
            }
        }
        Ok(())
    }
}

impl GameState {
    /// The six-field FEN of the current state.
    pub fn to_fen(&self) -> String {
        self.to_string()
    }
}

/// Formats as FEN.
impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", Placement(self.position()), self.turn(), self.castling())?;
        match self.en_passant() {
            Some(sq) => write!(f, " {sq}")?,
            None => f.write_str(" -")?,
        }
        write!(f, " {} {}", self.halfmove_clock(), self.fullmove_number())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PositionError;
    use crate::game::GameStatus;

    #[test]
    fn starting_fen_matches_new_game() {
        let game: GameState = STARTING_FEN.parse().unwrap();
        assert_eq!(game, GameState::new());
        assert_eq!(GameState::new().to_fen(), STARTING_FEN);
    }

    #[test]
    fn roundtrip_reference_positions() {
        for fen in [
            STARTING_FEN,
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
        ] {
            let game: GameState = fen.parse().unwrap();
            assert_eq!(game.to_fen(), fen);
        }
    }

    #[test]
    fn en_passant_field_parsed() {
        let game: GameState = "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3"
            .parse()
            .unwrap();
        assert_eq!(game.en_passant(), Some(Square::F6));
    }

    #[test]
    fn wrong_field_count() {
        let err = "8/8/8/8/8/8/8/8 w - -".parse::<GameState>().unwrap_err();
        assert_eq!(err, FenError::WrongFieldCount { found: 4 });
    }

    #[test]
    fn wrong_rank_count_and_length() {
        let err = "8/8/8/8/8/8/8 w - - 0 1".parse::<GameState>().unwrap_err();
        assert_eq!(err, FenError::WrongRankCount { found: 7 });
        let err = "rnbqkbnr/ppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
            .parse::<GameState>()
            .unwrap_err();
        assert_eq!(err, FenError::BadRankLength { rank_index: 1, length: 7 });
        let err = "rnbqkbnrr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
            .parse::<GameState>()
            .unwrap_err();
        assert_eq!(err, FenError::BadRankLength { rank_index: 0, length: 9 });
    }

    #[test]
    fn bad_symbols() {
        let err = "rnbqkbnr/ppppxppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
            .parse::<GameState>()
            .unwrap_err();
        assert_eq!(err, FenError::InvalidPieceChar { character: 'x' });
        let err = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1"
            .parse::<GameState>()
            .unwrap_err();
        assert_eq!(err, FenError::InvalidColor { found: "x".to_string() });
        assert!(matches!(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQxq - 0 1".parse::<GameState>(),
            Err(FenError::InvalidCastling { .. })
        ));
    }

    #[test]
    fn en_passant_must_sit_behind_a_pushed_pawn() {
        for field in ["e4", "e6", "z9"] {
            let fen = format!("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq {field} 0 1");
            assert!(
                matches!(fen.parse::<GameState>(), Err(FenError::InvalidEnPassant { .. })),
                "{field}"
            );
        }
    }

    #[test]
    fn counters_validated() {
        let err = "4k3/8/8/8/8/8/8/4K3 w - - 0 0".parse::<GameState>().unwrap_err();
        assert_eq!(
            err,
            FenError::InvalidMoveCounter { field: "fullmove number", found: "0".to_string() }
        );
        assert!("4k3/8/8/8/8/8/8/4K3 w - - -1 1".parse::<GameState>().is_err());
    }

    #[test]
    fn king_count_enforced() {
        let err = "4k3/8/8/8/8/8/8/4KK2 w - - 0 1".parse::<GameState>().unwrap_err();
        assert_eq!(
            err,
            FenError::InvalidPosition {
                source: PositionError::InvalidKingCount { color: "white", count: 2 }
            }
        );
    }

    #[test]
    fn import_computes_status() {
        let game: GameState = "7k/5Q2/6K1/8/8/8/8/8 b - - 0 1".parse().unwrap();
        assert_eq!(game.status(), GameStatus::Stalemate);
        let game: GameState = "R6k/6pp/8/8/8/8/8/6K1 b - - 0 1".parse().unwrap();
        assert_eq!(game.status(), GameStatus::Checkmate { winner: Color::White });
        assert!(game.in_check());
    }
}
