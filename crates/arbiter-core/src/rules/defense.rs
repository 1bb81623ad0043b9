//! Replies available while the side to move is in check.

use tracing::trace;

use crate::bitboard::Bitboard;
use crate::movegen::{en_passant_victim, pseudo_legal};
use crate::piece::PieceKind;
use crate::position::Position;
use crate::square::Square;

use super::check::{checkers, checking_line};
use super::king_safety::king_safe_moves;
use super::leaves_king_safe;

/// Legal destinations of the piece on `from` while its king is in check.
///
/// Under double check only the king may move. Under single check other
/// pieces may capture the checker or step between it and the king; an en
/// passant capture of a checking pawn counts as capturing it. Every candidate
/// is then played out on a scratch copy, so a blocker that is itself pinned
/// along another line is not offered.
pub fn defender_moves(position: &Position, from: Square, en_passant: Option<Square>) -> Bitboard {
    let Some(piece) = position.piece_at(from) else {
        return Bitboard::EMPTY;
    };
    if piece.kind == PieceKind::King {
        return king_safe_moves(position, from, piece.color);
    }
    let Some(king) = position.king_square(piece.color) else {
        return Bitboard::EMPTY;
    };

    let attackers = checkers(position, piece.color);
    let Some(checker) = attackers.single() else {
        trace!(%from, checkers = attackers.count(), "multiple checkers: only the king may move");
        return Bitboard::EMPTY;
    };

    let block = checking_line(position, checker, king).unwrap_or(Bitboard::EMPTY);
    let pseudo = pseudo_legal(position, from, piece, en_passant);
    let mut candidates = pseudo & (checker.bitboard() | block);

    if piece.kind == PieceKind::Pawn
        && let Some(target) = en_passant
        && pseudo.contains(target)
        && en_passant_victim(target, piece.color) == Some(checker)
    {
        candidates = candidates.with(target);
    }

    candidates
        .filter(|&to| leaves_king_safe(position, from, to, en_passant))
        .fold(Bitboard::EMPTY, Bitboard::with)
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
    fn block_or_capture_a_rook_check() {
        let pos = place(&[
            (Square::E1, Color::White, PieceKind::King),
            (Square::E8, Color::Black, PieceKind::Rook),
            (Square::A4, Color::White, PieceKind::Rook),
            (Square::B5, Color::White, PieceKind::Bishop),
            (Square::H8, Color::Black, PieceKind::King),
        ]);
        assert_eq!(defender_moves(&pos, Square::A4, None), Square::E4.bitboard());
        assert_eq!(
            defender_moves(&pos, Square::B5, None),
            Bitboard::from_squares([Square::E8, Square::E2])
        );
    }

    #[test]
    fn knight_check_cannot_be_blocked() {
        let pos = place(&[
            (Square::E1, Color::White, PieceKind::King),
            (Square::F3, Color::Black, PieceKind::Knight),
            (Square::F1, Color::White, PieceKind::Bishop),
            (Square::D1, Color::White, PieceKind::Queen),
            (Square::H8, Color::Black, PieceKind::King),
        ]);
        assert_eq!(defender_moves(&pos, Square::D1, None), Square::F3.bitboard());
        assert!(defender_moves(&pos, Square::F1, None).is_empty());
    }

    #[test]
    fn double_check_freezes_everything_but_the_king() {
        let pos = place(&[
            (Square::E1, Color::White, PieceKind::King),
            (Square::E8, Color::Black, PieceKind::Rook),
            (Square::F3, Color::Black, PieceKind::Knight),
            (Square::D1, Color::White, PieceKind::Queen),
            (Square::H8, Color::Black, PieceKind::King),
        ]);
        assert!(defender_moves(&pos, Square::D1, None).is_empty());
        assert!(defender_moves(&pos, Square::E1, None).is_nonempty());
    }

    #[test]
    fn en_passant_removes_checking_pawn() {
        // black just played d7-d5 giving check to the king on e4
        let pos = place(&[
            (Square::E4, Color::White, PieceKind::King),
            (Square::D5, Color::Black, PieceKind::Pawn),
            (Square::E5, Color::White, PieceKind::Pawn),
            (Square::H8, Color::Black, PieceKind::King),
        ]);
        let moves = defender_moves(&pos, Square::E5, Some(Square::D6));
        assert_eq!(moves, Square::D6.bitboard());
    }

    #[test]
    fn pinned_blocker_is_not_offered() {
        // the d2 knight reaches the e-file on e4 but is pinned by the a5 queen
        let pos = place(&[
            (Square::E1, Color::White, PieceKind::King),
            (Square::E8, Color::Black, PieceKind::Rook),
            (Square::D2, Color::White, PieceKind::Knight),
            (Square::A5, Color::Black, PieceKind::Queen),
            (Square::H8, Color::Black, PieceKind::King),
        ]);
        assert!(pseudo_legal(&pos, Square::D2, Piece::new(Color::White, PieceKind::Knight), None)
            .contains(Square::E4));
        assert!(defender_moves(&pos, Square::D2, None).is_empty());
    }
}
