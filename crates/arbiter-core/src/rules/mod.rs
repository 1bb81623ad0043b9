//! Legality: check, pins, king safety, check replies and castling.

mod castling;
mod check;
mod defense;
mod king_safety;
mod pins;

pub use castling::{can_castle, castling_moves};
pub use check::{attacked_by, checkers, checking_line, is_in_check, is_square_attacked};
pub use defense::defender_moves;
pub use king_safety::king_safe_moves;
pub use pins::{Pin, find_pin};

use crate::movegen::en_passant_victim;
use crate::piece::PieceKind;
use crate::position::Position;
use crate::square::Square;

/// Play the piece on `from` to `to` on a scratch copy and report whether its
/// own king is out of check afterwards. Removes the captured pawn when `to`
/// is the en passant target.
pub fn leaves_king_safe(
    position: &Position,
    from: Square,
    to: Square,
    en_passant: Option<Square>,
) -> bool {
    let Some(piece) = position.piece_at(from) else {
        return false;
    };
    let mut scratch = *position;
    if piece.kind == PieceKind::Pawn
        && en_passant == Some(to)
        && position.piece_at(to).is_none()
        && let Some(victim) = en_passant_victim(to, piece.color)
    {
        scratch.remove(victim);
    }
    scratch.relocate(from, to, piece);
    !is_in_check(&scratch, piece.color)
}
