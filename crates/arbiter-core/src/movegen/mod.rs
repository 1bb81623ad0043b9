//! Pseudo-legal move generation: where each piece could go, ignoring king safety.

mod pawn;
mod sliding;
mod step;

pub use pawn::{attacker_mask, en_passant_victim, pawn_moves};
pub use sliding::{bishop_moves, queen_moves, ray, rook_moves, slider_moves, Direction};
pub use step::{king_moves, king_reach, knight_moves, knight_reach};

use crate::bitboard::Bitboard;
use crate::piece::{Piece, PieceKind};
use crate::position::Position;
use crate::square::Square;

/// Squares `piece` on `from` attacks. Pawns attack diagonally whether or not
/// anything stands there; every other kind attacks exactly where it can move.
pub fn attack_mask(position: &Position, from: Square, piece: Piece) -> Bitboard {
    let Piece { color, kind } = piece;
    match kind {
        PieceKind::Pawn => attacker_mask(from, color),
        PieceKind::Knight => knight_moves(position, from, color),
        PieceKind::Bishop => bishop_moves(position, from, color),
        PieceKind::Rook => rook_moves(position, from, color),
        PieceKind::Queen => queen_moves(position, from, color),
        PieceKind::King => king_moves(position, from, color),
    }
}

/// Pseudo-legal destinations of `piece` on `from`. Castling is not included.
pub fn pseudo_legal(
    position: &Position,
    from: Square,
    piece: Piece,
    en_passant: Option<Square>,
) -> Bitboard {
    match piece.kind {
        PieceKind::Pawn => pawn_moves(position, from, piece.color, en_passant),
        PieceKind::Knight | PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen | PieceKind::King => {
            attack_mask(position, from, piece)
        }
    }
}
