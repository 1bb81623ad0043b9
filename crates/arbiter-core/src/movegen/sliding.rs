//! Ray casting for rooks, bishops and queens.

use crate::bitboard::Bitboard;
use crate::color::Color;
use crate::piece::PieceKind;
use crate::position::Position;
use crate::square::Square;

/// One of the eight compass directions a slider can travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

const fn union(a: Bitboard, b: Bitboard) -> Bitboard {
    Bitboard::new(a.bits() | b.bits())
}

impl Direction {
    pub const ORTHOGONAL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    pub const DIAGONAL: [Direction; 4] = [
        Direction::NorthEast,
        Direction::NorthWest,
        Direction::SouthEast,
        Direction::SouthWest,
    ];

    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
        Direction::NorthEast,
        Direction::NorthWest,
        Direction::SouthEast,
        Direction::SouthWest,
    ];

    /// Square-index change of one step.
    #[inline]
    pub const fn delta(self) -> i8 {
        match self {
            Direction::North => 8,
            Direction::South => -8,
            Direction::East => 1,
            Direction::West => -1,
            Direction::NorthEast => 9,
            Direction::NorthWest => 7,
            Direction::SouthEast => -7,
            Direction::SouthWest => -9,
        }
    }

    /// Squares that would fall off the board (or wrap) when stepping this way.
    pub const fn edge(self) -> Bitboard {
        match self {
            Direction::North => Bitboard::RANK_8,
            Direction::South => Bitboard::RANK_1,
            Direction::East => Bitboard::FILE_H,
            Direction::West => Bitboard::FILE_A,
            Direction::NorthEast => union(Bitboard::RANK_8, Bitboard::FILE_H),
            Direction::NorthWest => union(Bitboard::RANK_8, Bitboard::FILE_A),
            Direction::SouthEast => union(Bitboard::RANK_1, Bitboard::FILE_H),
            Direction::SouthWest => union(Bitboard::RANK_1, Bitboard::FILE_A),
        }
    }

    /// Shift every member one step, dropping those on this direction's edge first.
    #[inline]
    pub const fn shift(self, bb: Bitboard) -> Bitboard {
        let guarded = bb.bits() & !self.edge().bits();
        let delta = self.delta();
        if delta > 0 {
            Bitboard::new(guarded << delta)
        } else {
            Bitboard::new(guarded >> -delta)
        }
    }

    /// The neighbouring square this way, if there is one.
    #[inline]
    pub const fn step(self, sq: Square) -> Option<Square> {
        self.shift(sq.bitboard()).lsb()
    }

    /// Directions `kind` slides along; empty for non-sliders.
    pub const fn for_kind(kind: PieceKind) -> &'static [Direction] {
        match kind {
            PieceKind::Rook => &Direction::ORTHOGONAL,
            PieceKind::Bishop => &Direction::DIAGONAL,
            PieceKind::Queen => &Direction::ALL,
            PieceKind::Pawn | PieceKind::Knight | PieceKind::King => &[],
        }
    }
}

/// Squares a slider of `color` on `from` reaches in one direction.
///
/// The walk stops before a piece of `color` and stops after (including) a
/// piece of the other color.
pub fn ray(position: &Position, from: Square, direction: Direction, color: Color) -> Bitboard {
    let friendly = position.occupancy_of(color);
    let enemy = position.occupancy_of(color.flip());
    let mut reached = Bitboard::EMPTY;
    let mut cursor = direction.shift(from.bitboard());
    while cursor.is_nonempty() {
        if (cursor & friendly).is_nonempty() {
            break;
        }
        reached |= cursor;
        if (cursor & enemy).is_nonempty() {
            break;
        }
        cursor = direction.shift(cursor);
    }
    reached
}

/// Union of the rays a `kind` slider of `color` casts from `from`.
pub fn slider_moves(position: &Position, from: Square, color: Color, kind: PieceKind) -> Bitboard {
    Direction::for_kind(kind)
        .iter()
        .fold(Bitboard::EMPTY, |acc, &dir| acc | ray(position, from, dir, color))
}

#[inline]
pub fn rook_moves(position: &Position, from: Square, color: Color) -> Bitboard {
    slider_moves(position, from, color, PieceKind::Rook)
}

#[inline]
pub fn bishop_moves(position: &Position, from: Square, color: Color) -> Bitboard {
    slider_moves(position, from, color, PieceKind::Bishop)
}

#[inline]
pub fn queen_moves(position: &Position, from: Square, color: Color) -> Bitboard {
    rook_moves(position, from, color) | bishop_moves(position, from, color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::Piece;

    fn place(pieces: &[(Square, Color, PieceKind)]) -> Position {
        let mut pos = Position::empty();
        for &(sq, color, kind) in pieces {
            pos.put(sq, Piece::new(color, kind));
        }
        pos
    }

    #[test]
    fn shift_never_wraps() {
        assert_eq!(Direction::East.shift(Square::H4.bitboard()), Bitboard::EMPTY);
        assert_eq!(Direction::West.shift(Square::A4.bitboard()), Bitboard::EMPTY);
        assert_eq!(Direction::North.shift(Square::C8.bitboard()), Bitboard::EMPTY);
        assert_eq!(Direction::SouthWest.shift(Square::A5.bitboard()), Bitboard::EMPTY);
        assert_eq!(Direction::NorthEast.step(Square::E4), Some(Square::F5));
        assert_eq!(Direction::SouthEast.step(Square::E4), Some(Square::F3));
    }

    #[test]
    fn rook_on_empty_board_sees_fourteen() {
        let pos = place(&[(Square::D4, Color::White, PieceKind::Rook)]);
        assert_eq!(rook_moves(&pos, Square::D4, Color::White).count(), 14);
        assert_eq!(bishop_moves(&pos, Square::D4, Color::White).count(), 13);
        assert_eq!(queen_moves(&pos, Square::D4, Color::White).count(), 27);
    }

    #[test]
    fn ray_stops_before_friend_and_on_enemy() {
        let pos = place(&[
            (Square::A1, Color::White, PieceKind::Rook),
            (Square::A4, Color::White, PieceKind::Pawn),
            (Square::D1, Color::Black, PieceKind::Knight),
        ]);
        let north = ray(&pos, Square::A1, Direction::North, Color::White);
        assert_eq!(north, Bitboard::from_squares([Square::A2, Square::A3]));
        let east = ray(&pos, Square::A1, Direction::East, Color::White);
        assert_eq!(east, Bitboard::from_squares([Square::B1, Square::C1, Square::D1]));
    }

    #[test]
    fn non_sliders_have_no_directions() {
        assert!(Direction::for_kind(PieceKind::Knight).is_empty());
        assert_eq!(Direction::for_kind(PieceKind::Queen).len(), 8);
    }
}
