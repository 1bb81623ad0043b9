//! Pawn pushes, captures and en passant.

use crate::bitboard::Bitboard;
use crate::color::Color;
use crate::position::Position;
use crate::square::Square;

use super::sliding::Direction;

const fn forward(color: Color) -> Direction {
    match color {
        Color::White => Direction::North,
        Color::Black => Direction::South,
    }
}

const fn capture_directions(color: Color) -> [Direction; 2] {
    match color {
        Color::White => [Direction::NorthWest, Direction::NorthEast],
        Color::Black => [Direction::SouthWest, Direction::SouthEast],
    }
}

/// Both diagonal squares a `color` pawn on `sq` attacks, whatever stands there.
pub fn attacker_mask(sq: Square, color: Color) -> Bitboard {
    let [left, right] = capture_directions(color);
    let origin = sq.bitboard();
    left.shift(origin) | right.shift(origin)
}

/// Pseudo-legal pawn destinations: pushes onto empty squares, the double
/// push from the start rank, and diagonal captures onto an enemy piece or the
/// en passant target.
pub fn pawn_moves(
    position: &Position,
    from: Square,
    color: Color,
    en_passant: Option<Square>,
) -> Bitboard {
    let empty = !position.occupancy_all();
    let step = forward(color);

    let single = step.shift(from.bitboard()) & empty;
    let double = if color.pawn_start_rank().contains(from) {
        step.shift(single) & empty
    } else {
        Bitboard::EMPTY
    };

    let mut targets = position.occupancy_of(color.flip());
    if let Some(ep) = en_passant {
        targets = targets.with(ep);
    }
    single | double | (attacker_mask(from, color) & targets)
}

/// Square of the pawn an en passant capture onto `target` removes.
pub fn en_passant_victim(target: Square, mover: Color) -> Option<Square> {
    target.offset(-mover.forward())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::{Piece, PieceKind};

    #[test]
    fn start_rank_pushes() {
        let pos = Position::starting();
        let moves = pawn_moves(&pos, Square::E2, Color::White, None);
        assert_eq!(moves, Bitboard::from_squares([Square::E3, Square::E4]));
        let moves = pawn_moves(&pos, Square::D7, Color::Black, None);
        assert_eq!(moves, Bitboard::from_squares([Square::D6, Square::D5]));
    }

    #[test]
    fn blocked_intermediate_square_stops_double_push() {
        let mut pos = Position::starting();
        pos.put(Square::E3, Piece::new(Color::Black, PieceKind::Knight));
        let moves = pawn_moves(&pos, Square::E2, Color::White, None);
        assert!(moves.is_empty());
        // d2 can now capture on e3
        assert!(pawn_moves(&pos, Square::D2, Color::White, None).contains(Square::E3));
    }

    #[test]
    fn attacker_mask_ignores_occupancy_and_edges() {
        assert_eq!(
            attacker_mask(Square::A2, Color::White),
            Square::B3.bitboard()
        );
        assert_eq!(
            attacker_mask(Square::E5, Color::Black),
            Bitboard::from_squares([Square::D4, Square::F4])
        );
        assert!(attacker_mask(Square::H7, Color::White).contains(Square::G8));
    }

    #[test]
    fn en_passant_target_is_a_capture_square() {
        let mut pos = Position::empty();
        pos.put(Square::E5, Piece::new(Color::White, PieceKind::Pawn));
        pos.put(Square::D5, Piece::new(Color::Black, PieceKind::Pawn));
        let moves = pawn_moves(&pos, Square::E5, Color::White, Some(Square::D6));
        assert_eq!(moves, Bitboard::from_squares([Square::E6, Square::D6]));
        assert_eq!(en_passant_victim(Square::D6, Color::White), Some(Square::D5));
        assert_eq!(en_passant_victim(Square::E3, Color::Black), Some(Square::E4));
    }
}
