//! Moves, move flags and the records kept for applied moves.

use std::fmt;
use std::str::FromStr;

use crate::castle_rights::CastleSide;
use crate::error::NotationError;
use crate::piece::PieceKind;
use crate::square::Square;

/// What kind of special move a [`Move`] is, as a small bit set.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MoveFlags(u8);

impl MoveFlags {
    pub const QUIET: MoveFlags = MoveFlags(0);
    pub const CAPTURE: MoveFlags = MoveFlags(1 << 0);
    pub const EN_PASSANT: MoveFlags = MoveFlags(1 << 1);
    pub const CASTLE_KINGSIDE: MoveFlags = MoveFlags(1 << 2);
    pub const CASTLE_QUEENSIDE: MoveFlags = MoveFlags(1 << 3);
    pub const DOUBLE_PUSH: MoveFlags = MoveFlags(1 << 4);

    #[inline]
    pub const fn contains(self, other: MoveFlags) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub const fn with(self, other: MoveFlags) -> MoveFlags {
        MoveFlags(self.0 | other.0)
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl fmt::Debug for MoveFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (MoveFlags::CAPTURE, "capture"),
            (MoveFlags::EN_PASSANT, "en_passant"),
            (MoveFlags::CASTLE_KINGSIDE, "castle_kingside"),
            (MoveFlags::CASTLE_QUEENSIDE, "castle_queenside"),
            (MoveFlags::DOUBLE_PUSH, "double_push"),
        ];
        let set: Vec<&str> = names
            .into_iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| name)
            .collect();
        write!(f, "MoveFlags({})", set.join(" | "))
    }
}

/// A fully described move: origin, destination, the moving kind, an optional
/// promotion kind and its flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub piece: PieceKind,
    pub promotion: Option<PieceKind>,
    pub flags: MoveFlags,
}

impl Move {
    pub const fn new(from: Square, to: Square, piece: PieceKind) -> Move {
        Move {
            from,
            to,
            piece,
            promotion: None,
            flags: MoveFlags::QUIET,
        }
    }

    pub const fn with_flags(self, flags: MoveFlags) -> Move {
        Move {
            flags: self.flags.with(flags),
            ..self
        }
    }

    pub const fn with_promotion(self, kind: PieceKind) -> Move {
        Move {
            promotion: Some(kind),
            ..self
        }
    }

    /// Captures include en passant.
    #[inline]
    pub const fn is_capture(&self) -> bool {
        self.flags.contains(MoveFlags::CAPTURE)
    }

    #[inline]
    pub const fn is_en_passant(&self) -> bool {
        self.flags.contains(MoveFlags::EN_PASSANT)
    }

    #[inline]
    pub const fn is_double_push(&self) -> bool {
        self.flags.contains(MoveFlags::DOUBLE_PUSH)
    }

    pub const fn castle_side(&self) -> Option<CastleSide> {
        if self.flags.contains(MoveFlags::CASTLE_KINGSIDE) {
            Some(CastleSide::KingSide)
        } else if self.flags.contains(MoveFlags::CASTLE_QUEENSIDE) {
            Some(CastleSide::QueenSide)
        } else {
            None
        }
    }

    #[inline]
    pub const fn is_castle(&self) -> bool {
        self.castle_side().is_some()
    }

    /// Coordinate notation, e.g. `e2e4` or `e7e8q`.
    pub fn to_coordinate(&self) -> String {
        self.to_string()
    }

    /// Whether this move matches a parsed coordinate triple.
    pub fn matches(&self, coordinate: &CoordinateMove) -> bool {
        self.from == coordinate.from && self.to == coordinate.to && self.promotion == coordinate.promotion
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(kind) = self.promotion {
            write!(f, "{}", kind.fen_char())?;
        }
        Ok(())
    }
}

/// A move as written in coordinate notation, before it is matched against
/// the legal moves of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

impl FromStr for CoordinateMove {
    type Err = NotationError;

    /// Parse `e2e4`, `e7e8q`. The promotion letter is case-insensitive.
    fn from_str(s: &str) -> Result<CoordinateMove, NotationError> {
        let malformed = || NotationError::Malformed { token: s.to_string() };
        if !s.is_ascii() || !(4..=5).contains(&s.len()) {
            return Err(malformed());
        }
        let from = Square::from_algebraic(&s[0..2]).ok_or_else(malformed)?;
        let to = Square::from_algebraic(&s[2..4]).ok_or_else(malformed)?;
        let promotion = match s[4..].chars().next() {
            None => None,
            Some(c) => Some(
                PieceKind::from_fen_char(c)
                    .filter(|kind| kind.is_promotion_target())
                    .ok_or_else(malformed)?,
            ),
        };
        Ok(CoordinateMove { from, to, promotion })
    }
}

/// A move that has been applied, with the notation and check state computed
/// right after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    pub mv: Move,
    pub san: String,
    pub check: bool,
    pub mate: bool,
}
