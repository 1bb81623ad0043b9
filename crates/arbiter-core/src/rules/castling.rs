//! Castling availability.

use tracing::trace;

use crate::bitboard::Bitboard;
use crate::castle_rights::{CastleRights, CastleSide};
use crate::color::Color;
use crate::piece::PieceKind;
use crate::position::Position;

use super::check::{is_in_check, is_square_attacked};

/// Whether `color` may castle towards `side` right now.
pub fn can_castle(position: &Position, color: Color, rights: CastleRights, side: CastleSide) -> bool {
    if !rights.has(color, side) {
        return false;
    }
    let king_home = CastleSide::king_home(color);
    if !position.pieces(color, PieceKind::King).contains(king_home)
        || !position.pieces(color, PieceKind::Rook).contains(side.rook_home(color))
    {
        return false;
    }
    if (position.occupancy_all() & side.between(color)).is_nonempty() {
        return false;
    }
    if is_in_check(position, color) {
        trace!(?side, "castling refused: king in check");
        return false;
    }
    let them = color.flip();
    let crossed = [side.king_path(color), side.king_target(color)];
    if crossed.into_iter().any(|sq| is_square_attacked(position, sq, them)) {
        trace!(?side, "castling refused: path attacked");
        return false;
    }
    true
}

/// King destinations for every castle currently available to `color`.
pub fn castling_moves(position: &Position, color: Color, rights: CastleRights) -> Bitboard {
    CastleSide::ALL
        .into_iter()
        .filter(|&side| can_castle(position, color, rights, side))
        .fold(Bitboard::EMPTY, |acc, side| acc.with(side.king_target(color)))
}
