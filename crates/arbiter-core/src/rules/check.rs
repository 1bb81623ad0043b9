//! Attack and check detection.

use tracing::trace;

use crate::bitboard::Bitboard;
use crate::color::Color;
use crate::movegen::{Direction, attack_mask, attacker_mask, king_reach, knight_reach, ray};
use crate::piece::{Piece, PieceKind};
use crate::position::Position;
use crate::square::Square;

/// Union of the attack masks of every `color` piece.
pub fn attacked_by(position: &Position, color: Color) -> Bitboard {
    let mut attacked = Bitboard::EMPTY;
    for kind in PieceKind::ALL {
        let piece = Piece::new(color, kind);
        for sq in position.pieces(color, kind) {
            attacked |= attack_mask(position, sq, piece);
        }
    }
    attacked
}

/// Whether any `by` piece attacks `sq`.
///
/// Works outward from `sq`: a ray cast as the defending side stops on the
/// first piece, and that piece is an attacker only if it belongs to `by`.
pub fn is_square_attacked(position: &Position, sq: Square, by: Color) -> bool {
    let pieces = |kind| position.pieces(by, kind);

    if (knight_reach(sq) & pieces(PieceKind::Knight)).is_nonempty() {
        return true;
    }
    if (king_reach(sq) & pieces(PieceKind::King)).is_nonempty() {
        return true;
    }
    if (attacker_mask(sq, by.flip()) & pieces(PieceKind::Pawn)).is_nonempty() {
        return true;
    }

    let queens = pieces(PieceKind::Queen);
    let lines = [
        (Direction::ORTHOGONAL, pieces(PieceKind::Rook) | queens),
        (Direction::DIAGONAL, pieces(PieceKind::Bishop) | queens),
    ];
    lines.into_iter().any(|(directions, sliders)| {
        sliders.is_nonempty()
            && directions
                .into_iter()
                .any(|dir| (ray(position, sq, dir, by.flip()) & sliders).is_nonempty())
    })
}

/// Whether the `color` king is attacked. A board without that king is never in check.
pub fn is_in_check(position: &Position, color: Color) -> bool {
    position
        .king_square(color)
        .is_some_and(|king| is_square_attacked(position, king, color.flip()))
}

/// Every opponent piece whose attack mask contains the `color` king's square.
pub fn checkers(position: &Position, color: Color) -> Bitboard {
    let Some(king) = position.king_square(color) else {
        return Bitboard::EMPTY;
    };
    let them = color.flip();
    let mut found = Bitboard::EMPTY;
    for kind in PieceKind::ALL {
        let piece = Piece::new(them, kind);
        for sq in position.pieces(them, kind) {
            if attack_mask(position, sq, piece).contains(king) {
                found = found.with(sq);
            }
        }
    }
    if found.is_nonempty() {
        trace!(king = %king, checkers = found.count(), "king in check");
    }
    found
}

/// For a slider on `attacker` whose ray lands on `target`, the squares
/// strictly between the two. `None` for non-sliders and for sliders that do
/// not reach.
pub fn checking_line(position: &Position, attacker: Square, target: Square) -> Option<Bitboard> {
    let piece = position.piece_at(attacker)?;
    Direction::for_kind(piece.kind)
        .iter()
        .map(|&dir| ray(position, attacker, dir, piece.color))
        .find(|reached| reached.contains(target))
        .map(|reached| reached.without(target))
}
