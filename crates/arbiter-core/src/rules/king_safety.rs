//! Legal king destinations.

use tracing::trace;

use crate::bitboard::Bitboard;
use crate::color::Color;
use crate::movegen::king_moves;
use crate::piece::{Piece, PieceKind};
use crate::position::Position;
use crate::square::Square;

use super::check::{attacked_by, is_in_check};

/// King steps from `from` that do not end in check.
///
/// The king is lifted off the board before attacks are computed, so a slider
/// checking along a line also covers the square behind the king. Captures are
/// then played out on a scratch copy: a defended piece cannot be taken.
pub fn king_safe_moves(position: &Position, from: Square, color: Color) -> Bitboard {
    let king = Piece::new(color, PieceKind::King);
    let raw = king_moves(position, from, color);

    let mut lifted = *position;
    lifted.remove(from);
    let mut safe = raw & !attacked_by(&lifted, color.flip());

    for to in safe & position.occupancy_of(color.flip()) {
        let mut scratch = *position;
        scratch.relocate(from, to, king);
        if is_in_check(&scratch, color) {
            trace!(%from, %to, "king capture rejected: target is defended");
            safe = safe.without(to);
        }
    }
    safe
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(pieces: &[(Square, Color, PieceKind)]) -> Position {
        let mut pos = Position::empty();
        for &(sq, color, kind) in pieces {
            pos.put(sq, Piece::new(color, kind));
        }
        pos
    }

    #[test]
    fn king_cannot_retreat_along_checking_line() {
        let pos = place(&[
            (Square::E4, Color::White, PieceKind::King),
            (Square::E8, Color::Black, PieceKind::Rook),
            (Square::A8, Color::Black, PieceKind::King),
        ]);
        let safe = king_safe_moves(&pos, Square::E4, Color::White);
        assert!(!safe.contains(Square::E3));
        assert!(!safe.contains(Square::E5));
        assert!(safe.contains(Square::D3));
        assert!(safe.contains(Square::F5));
    }

    #[test]
    fn king_cannot_capture_defended_piece() {
        let pos = place(&[
            (Square::E1, Color::White, PieceKind::King),
            (Square::E2, Color::Black, PieceKind::Queen),
            (Square::E8, Color::Black, PieceKind::Rook),
            (Square::A8, Color::Black, PieceKind::King),
        ]);
        let safe = king_safe_moves(&pos, Square::E1, Color::White);
        assert!(!safe.contains(Square::E2));
        // every other neighbour is covered by the queen
        assert!(safe.is_empty());
    }

    #[test]
    fn king_may_capture_undefended_piece() {
        let pos = place(&[
            (Square::E1, Color::White, PieceKind::King),
            (Square::E2, Color::Black, PieceKind::Queen),
            (Square::A8, Color::Black, PieceKind::King),
        ]);
        assert_eq!(king_safe_moves(&pos, Square::E1, Color::White), Square::E2.bitboard());
    }

    #[test]
    fn kings_keep_their_distance() {
        let pos = place(&[
            (Square::E4, Color::White, PieceKind::King),
            (Square::E6, Color::Black, PieceKind::King),
        ]);
        let safe = king_safe_moves(&pos, Square::E4, Color::White);
        for sq in [Square::D5, Square::E5, Square::F5] {
            assert!(!safe.contains(sq), "{sq}");
        }
        assert_eq!(safe.count(), 5);
    }
}
