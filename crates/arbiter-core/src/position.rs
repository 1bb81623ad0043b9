//! Piece placement as a 2×6 matrix of bitboards, indexed `[color][kind]`.

use std::fmt;

use crate::bitboard::Bitboard;
use crate::color::Color;
use crate::error::PositionError;
use crate::piece::{Piece, PieceKind};
use crate::square::Square;

/// Where every piece stands. Side to move and the other game fields live in
/// [`GameState`](crate::GameState); this type is only the board.
///
/// `Position` is `Copy`, so detectors try hypothetical moves on a scratch
/// copy and the authoritative value is never seen half-updated.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    boards: [[Bitboard; PieceKind::COUNT]; Color::COUNT],
}

impl Position {
    /// A board with no pieces at all.
    pub const fn empty() -> Position {
        Position {
            boards: [[Bitboard::EMPTY; PieceKind::COUNT]; Color::COUNT],
        }
    }

    /// The standard initial array.
    pub fn starting() -> Position {
        let back_rank = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        let mut position = Position::empty();
        for color in Color::ALL {
            let home = color.back_rank();
            let pawn_rank = if color == Color::White { 1 } else { 6 };
            for (file, kind) in (0u8..).zip(back_rank) {
                if let Some(sq) = Square::from_coords(file, home) {
                    position.put(sq, Piece::new(color, kind));
                }
                if let Some(sq) = Square::from_coords(file, pawn_rank) {
                    position.put(sq, Piece::new(color, PieceKind::Pawn));
                }
            }
        }
        position
    }

    /// The raw matrix, for rendering.
    #[inline]
    pub fn boards(&self) -> &[[Bitboard; PieceKind::COUNT]; Color::COUNT] {
        &self.boards
    }

    /// Squares holding a `color` piece of `kind`.
    #[inline]
    pub fn pieces(&self, color: Color, kind: PieceKind) -> Bitboard {
        self.boards[color.index()][kind.index()]
    }

    /// Every square holding a piece of `color`. Derived on each call.
    pub fn occupancy_of(&self, color: Color) -> Bitboard {
        self.boards[color.index()]
            .iter()
            .fold(Bitboard::EMPTY, |acc, &bb| acc | bb)
    }

    /// Every occupied square. Derived on each call.
    pub fn occupancy_all(&self) -> Bitboard {
        self.occupancy_of(Color::White) | self.occupancy_of(Color::Black)
    }

    /// The piece on `sq`, if any.
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        Color::ALL.into_iter().find_map(|color| {
            PieceKind::ALL
                .into_iter()
                .find(|&kind| self.pieces(color, kind).contains(sq))
                .map(|kind| Piece::new(color, kind))
        })
    }

    /// Colour of the piece on `sq`, if any.
    #[inline]
    pub fn color_at(&self, sq: Square) -> Option<Color> {
        self.piece_at(sq).map(|piece| piece.color)
    }

    /// The king of `color`, or `None` on a board that has none.
    #[inline]
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces(color, PieceKind::King).lsb()
    }

    /// Total pieces across all twelve bitboards.
    pub fn population(&self) -> u32 {
        self.boards.iter().flatten().map(|bb| bb.count()).sum()
    }

    /// Place `piece` on `sq`, replacing whatever stood there.
    pub fn put(&mut self, sq: Square, piece: Piece) {
        self.clear(sq);
        let board = &mut self.boards[piece.color.index()][piece.kind.index()];
        *board = board.with(sq);
    }

    /// Take the piece off `sq`, returning it.
    pub fn remove(&mut self, sq: Square) -> Option<Piece> {
        let piece = self.piece_at(sq)?;
        let board = &mut self.boards[piece.color.index()][piece.kind.index()];
        *board = board.without(sq);
        Some(piece)
    }

    /// Move `piece` from `from` to `to`: clear the origin, set the destination,
    /// and clear the destination on all six opponent bitboards.
    pub fn relocate(&mut self, from: Square, to: Square, piece: Piece) {
        let own = &mut self.boards[piece.color.index()][piece.kind.index()];
        *own = own.without(from).with(to);
        for board in self.boards[piece.color.flip().index()].iter_mut() {
            *board = board.without(to);
        }
    }

    fn clear(&mut self, sq: Square) {
        for board in self.boards.iter_mut().flatten() {
            *board = board.without(sq);
        }
    }

    /// Check the invariants a position must hold before play starts on it.
    pub fn validate(&self) -> Result<(), PositionError> {
        for color in Color::ALL {
            let count = self.pieces(color, PieceKind::King).count();
            if count != 1 {
                return Err(PositionError::InvalidKingCount { color: color.name(), count });
            }
        }

        let all: Vec<Bitboard> = self.boards.iter().flatten().copied().collect();
        for (i, a) in all.iter().enumerate() {
            if all[i + 1..].iter().any(|b| (*a & *b).is_nonempty()) {
                return Err(PositionError::OverlappingPieces);
            }
        }

        let pawns = self.pieces(Color::White, PieceKind::Pawn) | self.pieces(Color::Black, PieceKind::Pawn);
        if (pawns & (Bitboard::RANK_1 | Bitboard::RANK_8)).is_nonempty() {
            return Err(PositionError::PawnsOnBackRank);
        }
        Ok(())
    }

    /// A printable 8x8 diagram, rank 8 at the top.
    pub fn pretty(&self) -> PrettyPosition<'_> {
        PrettyPosition(self)
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::starting()
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Position(\n{}\n)", self.pretty())
    }
}

/// Diagram wrapper returned by [`Position::pretty`].
pub struct PrettyPosition<'a>(&'a Position);

impl fmt::Display for PrettyPosition<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0u8..8).rev() {
            write!(f, "{}  ", rank + 1)?;
            let row: Vec<String> = (0u8..8)
                .map(|file| {
                    Square::from_coords(file, rank)
                        .and_then(|sq| self.0.piece_at(sq))
                        .map_or('.', Piece::fen_char)
                        .to_string()
                })
                .collect();
            writeln!(f, "{}", row.join(" "))?;
        }
        write!(f, "   a b c d e f g h")
    }
}
