//! Perft: leaf counts of the legal move tree, for checking move generation.

use crate::game::GameState;

/// Count the leaf nodes `depth` plies below `game`.
///
/// Depth 0 returns 1. Depth 1 returns the number of legal moves without
/// playing them.
pub fn perft(game: &GameState, depth: usize) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = game.legal_moves();
    if depth == 1 {
        return moves.len() as u64;
    }

    moves
        .into_iter()
        .map(|mv| {
            let mut child = game.clone();
            child.make(mv);
            perft(&child, depth - 1)
        })
        .sum()
}

/// Per-move leaf counts, sorted by coordinate notation.
pub fn divide(game: &GameState, depth: usize) -> Vec<(String, u64)> {
    let mut results: Vec<(String, u64)> = game
        .legal_moves()
        .into_iter()
        .map(|mv| {
            let mut child = game.clone();
            child.make(mv);
            (mv.to_coordinate(), perft(&child, depth.saturating_sub(1)))
        })
        .collect();
    results.sort_by(|a, b| a.0.cmp(&b.0));
    results
}
