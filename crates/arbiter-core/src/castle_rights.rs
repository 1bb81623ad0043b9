//! Castling rights (a 4-bit WK/WQ/BK/BQ set) and castling geometry.

use std::fmt;

use crate::bitboard::Bitboard;
use crate::color::Color;
use crate::error::FenError;
use crate::square::Square;

/// Direction of a castle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastleSide {
    KingSide,
    QueenSide,
}

impl CastleSide {
    pub const ALL: [CastleSide; 2] = [CastleSide::KingSide, CastleSide::QueenSide];

    /// The king's home square for `color`.
    pub const fn king_home(color: Color) -> Square {
        match color {
            Color::White => Square::E1,
            Color::Black => Square::E8,
        }
    }

    /// Square the king lands on.
    pub const fn king_target(self, color: Color) -> Square {
        match (self, color) {
            (CastleSide::KingSide, Color::White) => Square::G1,
            (CastleSide::QueenSide, Color::White) => Square::C1,
            (CastleSide::KingSide, Color::Black) => Square::G8,
            (CastleSide::QueenSide, Color::Black) => Square::C8,
        }
    }

    /// Square the king crosses, which must not be attacked.
    pub const fn king_path(self, color: Color) -> Square {
        match (self, color) {
            (CastleSide::KingSide, Color::White) => Square::F1,
            (CastleSide::QueenSide, Color::White) => Square::D1,
            (CastleSide::KingSide, Color::Black) => Square::F8,
            (CastleSide::QueenSide, Color::Black) => Square::D8,
        }
    }

    /// Corner the castling rook starts on.
    pub const fn rook_home(self, color: Color) -> Square {
        match (self, color) {
            (CastleSide::KingSide, Color::White) => Square::H1,
            (CastleSide::QueenSide, Color::White) => Square::A1,
            (CastleSide::KingSide, Color::Black) => Square::H8,
            (CastleSide::QueenSide, Color::Black) => Square::A8,
        }
    }

    /// Square the rook lands on; always the king's path square.
    pub const fn rook_target(self, color: Color) -> Square {
        self.king_path(color)
    }

    /// Squares strictly between king and rook, all of which must be empty.
    pub const fn between(self, color: Color) -> Bitboard {
        let rank_shift = color.back_rank() * 8;
        let bits: u64 = match self {
            CastleSide::KingSide => 0b0110_0000,  // f, g
            CastleSide::QueenSide => 0b0000_1110, // b, c, d
        };
        Bitboard::new(bits << rank_shift)
    }

    /// Which side a king move from its home square to `to` castles towards.
    pub fn from_king_move(color: Color, from: Square, to: Square) -> Option<CastleSide> {
        if from != CastleSide::king_home(color) {
            return None;
        }
        CastleSide::ALL
            .into_iter()
            .find(|side| side.king_target(color) == to)
    }
}

/// Castling rights: bit 0 = WK, 1 = WQ, 2 = BK, 3 = BQ.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CastleRights(u8);

impl CastleRights {
    /// No castling rights.
    pub const NONE: CastleRights = CastleRights(0);
    /// All four castling rights.
    pub const ALL: CastleRights = CastleRights(0b1111);
    /// White may castle kingside.
    pub const WHITE_KING: CastleRights = CastleRights(0b0001);
    /// White may castle queenside.
    pub const WHITE_QUEEN: CastleRights = CastleRights(0b0010);
    /// Black may castle kingside.
    pub const BLACK_KING: CastleRights = CastleRights(0b0100);
    /// Black may castle queenside.
    pub const BLACK_QUEEN: CastleRights = CastleRights(0b1000);
    /// Both White rights.
    pub const WHITE_BOTH: CastleRights = CastleRights(0b0011);
    /// Both Black rights.
    pub const BLACK_BOTH: CastleRights = CastleRights(0b1100);

    /// Build from raw bits; anything above bit 3 is dropped.
    #[inline]
    pub const fn new(bits: u8) -> CastleRights {
        CastleRights(bits & 0b1111)
    }

    /// Return the raw bits.
    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether no rights remain.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether every right in `other` is held.
    #[inline]
    pub const fn contains(self, other: CastleRights) -> bool {
        self.0 & other.0 == other.0
    }

    /// Add the rights in `other`.
    #[inline]
    pub const fn insert(self, other: CastleRights) -> CastleRights {
        CastleRights(self.0 | other.0)
    }

    /// Drop the rights in `other`.
    #[inline]
    pub const fn remove(self, other: CastleRights) -> CastleRights {
        CastleRights(self.0 & !other.0)
    }

    /// The single right for `color` castling towards `side`.
    pub const fn flag(color: Color, side: CastleSide) -> CastleRights {
        match (color, side) {
            (Color::White, CastleSide::KingSide) => Self::WHITE_KING,
            (Color::White, CastleSide::QueenSide) => Self::WHITE_QUEEN,
            (Color::Black, CastleSide::KingSide) => Self::BLACK_KING,
            (Color::Black, CastleSide::QueenSide) => Self::BLACK_QUEEN,
        }
    }

    /// Whether `color` may still castle towards `side`.
    #[inline]
    pub const fn has(self, color: Color, side: CastleSide) -> bool {
        self.contains(Self::flag(color, side))
    }

    /// Rights that are lost for good once a move starts or ends on `sq`.
    ///
    /// Covers the king leaving home, a rook leaving its corner, and a rook
    /// being captured on its corner.
    pub const fn revoked_by(sq: Square) -> CastleRights {
        match sq.index() {
            4 => Self::WHITE_BOTH,
            0 => Self::WHITE_QUEEN,
            7 => Self::WHITE_KING,
            60 => Self::BLACK_BOTH,
            56 => Self::BLACK_QUEEN,
            63 => Self::BLACK_KING,
            _ => Self::NONE,
        }
    }

    /// Parse the FEN castling field (`"KQkq"`, `"Kq"`, `"-"`, ...).
    pub fn from_fen(s: &str) -> Result<CastleRights, FenError> {
        if s == "-" {
            return Ok(CastleRights::NONE);
        }
        if s.is_empty() {
            return Err(FenError::InvalidCastling { found: String::new() });
        }
        s.chars().try_fold(CastleRights::NONE, |rights, c| {
            let flag = match c {
                'K' => Self::WHITE_KING,
                'Q' => Self::WHITE_QUEEN,
                'k' => Self::BLACK_KING,
                'q' => Self::BLACK_QUEEN,
                _ => return Err(FenError::InvalidCastling { found: s.to_string() }),
            };
            Ok(rights.insert(flag))
        })
    }

    /// FEN castling field, letters in `KQkq` order or `-`.
    pub fn to_fen(self) -> String {
        if self.is_empty() {
            return "-".to_string();
        }
        [
            (Self::WHITE_KING, 'K'),
            (Self::WHITE_QUEEN, 'Q'),
            (Self::BLACK_KING, 'k'),
            (Self::BLACK_QUEEN, 'q'),
        ]
        .into_iter()
        .filter(|(flag, _)| self.contains(*flag))
        .map(|(_, c)| c)
        .collect()
    }
}

impl fmt::Display for CastleRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_fen())
    }
}

impl fmt::Debug for CastleRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CastleRights({})", self.to_fen())
    }
}
