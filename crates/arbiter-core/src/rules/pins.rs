//! Absolute pin detection.

use tracing::trace;

use crate::bitboard::Bitboard;
use crate::piece::PieceKind;
use crate::position::Position;
use crate::square::Square;

use super::check::{checking_line, is_in_check};

const PINNING_KINDS: [PieceKind; 3] = [PieceKind::Bishop, PieceKind::Rook, PieceKind::Queen];

/// A piece held in place by an enemy slider lined up with its king.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pin {
    /// The pinning slider.
    pub attacker: Square,
    /// Squares the pinned piece may still move to: the attacker and the
    /// squares between it and the king.
    pub restriction: Bitboard,
}

/// Whether the piece on `from` is absolutely pinned to its own king.
///
/// Assumes the king is not already in check; while it is, legality comes from
/// [`defender_moves`](super::defender_moves) instead. If more than one
/// slider would reach the king the restriction is empty.
pub fn find_pin(position: &Position, from: Square) -> Option<Pin> {
    let piece = position.piece_at(from)?;
    if piece.kind == PieceKind::King {
        return None;
    }
    let king = position.king_square(piece.color)?;

    let mut scratch = *position;
    scratch.remove(from);
    if !is_in_check(&scratch, piece.color) {
        return None;
    }

    let them = piece.color.flip();
    let mut lines = PINNING_KINDS
        .into_iter()
        .flat_map(|kind| scratch.pieces(them, kind))
        .filter_map(|attacker| checking_line(&scratch, attacker, king).map(|between| (attacker, between)));

    let (attacker, between) = lines.next()?;
    // `from` is empty on the scratch copy, so the line runs through it
    let restriction = if lines.next().is_some() {
        Bitboard::EMPTY
    } else {
        attacker.bitboard() | between.without(from)
    };
    trace!(%from, %attacker, "piece is pinned");
    Some(Pin { attacker, restriction })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::piece::Piece;

    fn place(pieces: &[(Square, Color, PieceKind)]) -> Position {
        let mut pos = Position::empty();
        for &(sq, color, kind) in pieces {
            pos.put(sq, Piece::new(color, kind));
        }
        pos
    }

    #[test]
    fn bishop_pinned_on_file() {
        let pos = place(&[
            (Square::E1, Color::White, PieceKind::King),
            (Square::D2, Color::White, PieceKind::Bishop),
            (Square::A5, Color::Black, PieceKind::Queen),
            (Square::H8, Color::Black, PieceKind::King),
        ]);
        let pin = find_pin(&pos, Square::D2).unwrap();
        assert_eq!(pin.attacker, Square::A5);
        assert_eq!(
            pin.restriction,
            Bitboard::from_squares([Square::A5, Square::B4, Square::C3])
        );
    }

    #[test]
    fn restriction_excludes_pinned_square() {
        let pos = place(&[
            (Square::E1, Color::White, PieceKind::King),
            (Square::E4, Color::White, PieceKind::Rook),
            (Square::E8, Color::Black, PieceKind::Rook),
            (Square::H8, Color::Black, PieceKind::King),
        ]);
        let pin = find_pin(&pos, Square::E4).unwrap();
        assert!(!pin.restriction.contains(Square::E4));
        assert_eq!(
            pin.restriction,
            Bitboard::from_squares([Square::E2, Square::E3, Square::E5, Square::E6, Square::E7, Square::E8])
        );
    }

    #[test]
    fn two_blockers_means_no_pin() {
        let pos = place(&[
            (Square::E1, Color::White, PieceKind::King),
            (Square::E2, Color::White, PieceKind::Knight),
            (Square::E3, Color::White, PieceKind::Pawn),
            (Square::E8, Color::Black, PieceKind::Rook),
            (Square::H8, Color::Black, PieceKind::King),
        ]);
        assert_eq!(find_pin(&pos, Square::E2), None);
        assert_eq!(find_pin(&pos, Square::E3), None);
    }

    #[test]
    fn friendly_slider_behind_does_not_pin() {
        let pos = place(&[
            (Square::E1, Color::White, PieceKind::King),
            (Square::E4, Color::Black, PieceKind::Knight),
            (Square::E8, Color::Black, PieceKind::Rook),
            (Square::H8, Color::Black, PieceKind::King),
        ]);
        assert_eq!(find_pin(&pos, Square::E4), None);
    }

    #[test]
    fn king_is_never_pinned() {
        let pos = Position::starting();
        assert_eq!(find_pin(&pos, Square::E1), None);
        assert_eq!(find_pin(&pos, Square::E2), None);
    }
}
