//! Knight and king moves from fixed index offsets.

use crate::bitboard::Bitboard;
use crate::color::Color;
use crate::position::Position;
use crate::square::Square;

const KNIGHT_OFFSETS: [i8; 8] = [17, 15, 10, 6, -6, -10, -15, -17];
const KING_OFFSETS: [i8; 8] = [9, 8, 7, 1, -1, -7, -8, -9];

// A real step never changes file by more than this; anything larger wrapped.
const KNIGHT_MAX_FILE_DELTA: u8 = 2;
const KING_MAX_FILE_DELTA: u8 = 1;

fn reach(from: Square, offsets: &[i8], max_file_delta: u8) -> Bitboard {
    offsets
        .iter()
        .filter_map(|&delta| from.offset(delta))
        .filter(|&to| from.file_distance(to) <= max_file_delta)
        .fold(Bitboard::EMPTY, Bitboard::with)
}

/// Every square a knight on `from` jumps to on an empty board.
#[inline]
pub fn knight_reach(from: Square) -> Bitboard {
    reach(from, &KNIGHT_OFFSETS, KNIGHT_MAX_FILE_DELTA)
}

/// Every square adjacent to `from`.
#[inline]
pub fn king_reach(from: Square) -> Bitboard {
    reach(from, &KING_OFFSETS, KING_MAX_FILE_DELTA)
}

/// Knight destinations, minus squares held by `color`.
pub fn knight_moves(position: &Position, from: Square, color: Color) -> Bitboard {
    knight_reach(from) & !position.occupancy_of(color)
}

/// Raw king destinations, minus squares held by `color`. Safety is not checked here.
pub fn king_moves(position: &Position, from: Square, color: Color) -> Bitboard {
    king_reach(from) & !position.occupancy_of(color)
}
