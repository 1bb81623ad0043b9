//! Standard Algebraic Notation: rendering applied moves and parsing typed ones.
//!
//! Rendering follows the usual scoresheet form: piece letter, the smallest
//! disambiguation that works (file, then rank, then both), `x` for captures,
//! the origin file on pawn captures, `=Q` for promotions, `O-O`/`O-O-O`, and a
//! `+` or `#` suffix.

use crate::castle_rights::CastleSide;
use crate::chess_move::Move;
use crate::error::NotationError;
use crate::game::{GameState, GameStatus};
use crate::piece::PieceKind;
use crate::square::Square;

/// SAN for a legal `mv` in `game`, without the check suffix.
pub fn san_body(game: &GameState, mv: &Move) -> String {
    match mv.castle_side() {
        Some(CastleSide::KingSide) => return "O-O".to_string(),
        Some(CastleSide::QueenSide) => return "O-O-O".to_string(),
        None => {}
    }

    let mut san = String::new();
    match mv.piece.san_letter() {
        Some(letter) => {
            san.push(letter);
            san.push_str(&disambiguation(game, mv));
        }
        None if mv.is_capture() => san.push(mv.from.file_char()),
        None => {}
    }
    if mv.is_capture() {
        san.push('x');
    }
    san.push_str(&mv.to.to_string());
    if let Some(kind) = mv.promotion.and_then(PieceKind::san_letter) {
        san.push('=');
        san.push(kind);
    }
    san
}

/// Full SAN for a legal `mv` in `game`, check or mate suffix included.
pub fn to_san(game: &GameState, mv: &Move) -> String {
    let body = san_body(game, mv);
    let mut after = game.clone();
    after.make(*mv);
    let suffix = match after.status() {
        GameStatus::Checkmate { .. } => "#",
        _ if after.in_check() => "+",
        _ => "",
    };
    format!("{body}{suffix}")
}

fn disambiguation(game: &GameState, mv: &Move) -> String {
    let rivals: Vec<Square> = game
        .position()
        .pieces(game.turn(), mv.piece)
        .without(mv.from)
        .filter(|&sq| game.moves_from(sq).contains(mv.to))
        .collect();
    if rivals.is_empty() {
        return String::new();
    }
    let shares_file = rivals.iter().any(|sq| sq.file() == mv.from.file());
    let shares_rank = rivals.iter().any(|sq| sq.rank() == mv.from.rank());
    match (shares_file, shares_rank) {
        (false, _) => mv.from.file_char().to_string(),
        (true, false) => mv.from.rank_char().to_string(),
        (true, true) => mv.from.to_string(),
    }
}

/// The pieces of a SAN token once annotations are stripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SanPattern {
    Castle(CastleSide),
    Piece {
        kind: PieceKind,
        file: Option<u8>,
        rank: Option<u8>,
        to: Square,
        promotion: Option<PieceKind>,
    },
}

fn parse_pattern(token: &str) -> Option<SanPattern> {
    let core = token.trim_end_matches(['+', '#', '!', '?']);
    match core {
        "O-O" | "0-0" => return Some(SanPattern::Castle(CastleSide::KingSide)),
        "O-O-O" | "0-0-0" => return Some(SanPattern::Castle(CastleSide::QueenSide)),
        _ => {}
    }
    if !core.is_ascii() {
        return None;
    }

    let (kind, rest) = match core.chars().next().and_then(PieceKind::from_san_letter) {
        Some(kind) => (kind, &core[1..]),
        None => (PieceKind::Pawn, core),
    };

    // promotion: "e8=Q" or "e8Q"
    let (rest, promotion) = match rest.as_bytes() {
        [.., b'=', letter] => (&rest[..rest.len() - 2], Some(PieceKind::from_san_letter(*letter as char)?)),
        [.., b'1'..=b'8', letter] if letter.is_ascii_uppercase() => {
            (&rest[..rest.len() - 1], Some(PieceKind::from_san_letter(*letter as char)?))
        }
        _ => (rest, None),
    };
    if promotion.is_some_and(|p| !p.is_promotion_target()) || (promotion.is_some() && kind != PieceKind::Pawn) {
        return None;
    }

    if rest.len() < 2 {
        return None;
    }
    let to = Square::from_algebraic(&rest[rest.len() - 2..])?;
    let prefix = rest[..rest.len() - 2].strip_suffix('x').unwrap_or(&rest[..rest.len() - 2]);

    let (file, rank) = match prefix.as_bytes() {
        [] => (None, None),
        [f @ b'a'..=b'h'] => (Some(f - b'a'), None),
        [r @ b'1'..=b'8'] => (None, Some(r - b'1')),
        [f @ b'a'..=b'h', r @ b'1'..=b'8'] => (Some(f - b'a'), Some(r - b'1')),
        _ => return None,
    };
    Some(SanPattern::Piece { kind, file, rank, to, promotion })
}

/// Find the legal move `token` names in `game`.
///
/// Trailing `+`, `#`, `!` and `?` are ignored, as is a missing or superfluous
/// `x`. Castling accepts both letter O and digit zero.
pub fn parse_san(game: &GameState, token: &str) -> Result<Move, NotationError> {
    let pattern = parse_pattern(token).ok_or_else(|| NotationError::Malformed { token: token.to_string() })?;

    let mut matches = game.legal_moves().into_iter().filter(|mv| match pattern {
        SanPattern::Castle(side) => mv.castle_side() == Some(side),
        SanPattern::Piece { kind, file, rank, to, promotion } => {
            mv.piece == kind
                && mv.to == to
                && mv.promotion == promotion
                && !mv.is_castle()
                && file.is_none_or(|f| mv.from.file() == f)
                && rank.is_none_or(|r| mv.from.rank() == r)
        }
    });

    let found = matches.next().ok_or_else(|| NotationError::NoSuchMove { token: token.to_string() })?;
    if matches.next().is_some() {
        return Err(NotationError::Ambiguous { token: token.to_string() });
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(fen: &str) -> GameState {
        fen.parse().unwrap()
    }

    fn san_of(game: &GameState, coordinate: &str) -> String {
        let mv = game
            .legal_moves()
            .into_iter()
            .find(|mv| mv.to_coordinate() == coordinate)
            .unwrap();
        to_san(game, &mv)
    }

    #[test]
    fn opening_moves() {
        let game = GameState::new();
        assert_eq!(san_of(&game, "e2e4"), "e4");
        assert_eq!(san_of(&game, "g1f3"), "Nf3");
    }

    #[test]
    fn file_then_rank_then_both() {
        // knights on b1 and f1 both reach d2
        let g = game("4k3/8/8/8/8/8/8/1N2KN2 w - - 0 1");
        assert_eq!(san_of(&g, "b1d2"), "Nbd2");
        // rooks on a1 and a5 share a file
        let g = game("4k3/8/8/R7/8/8/8/R3K3 w - - 0 1");
        assert_eq!(san_of(&g, "a1a3"), "R1a3");
        // queens on a1, a3 and c1 all reach b2
        let g = game("4k3/8/8/8/8/Q7/8/Q1Q1K3 w - - 0 1");
        assert_eq!(san_of(&g, "a1b2"), "Qa1b2");
    }

    #[test]
    fn captures_promotions_and_castling() {
        let g = game("r3k2r/1P6/8/3p4/4P3/8/8/R3K2R w KQkq - 0 1");
        assert_eq!(san_of(&g, "e4d5"), "exd5");
        assert_eq!(san_of(&g, "b7a8q"), "bxa8=Q+");
        assert_eq!(san_of(&g, "b7b8n"), "b8=N");
        assert_eq!(san_of(&g, "e1g1"), "O-O");
        assert_eq!(san_of(&g, "e1c1"), "O-O-O");
        assert_eq!(san_of(&g, "a1a8"), "Rxa8+");
    }

    #[test]
    fn mate_suffix() {
        let g = game("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1");
        assert_eq!(san_of(&g, "a1a8"), "Ra8#");
    }

    #[test]
    fn parse_roundtrips_rendered_san() {
        let g = game("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
        for mv in g.legal_moves() {
            let san = to_san(&g, &mv);
            assert_eq!(parse_san(&g, &san), Ok(mv), "{san}");
        }
    }

    #[test]
    fn parse_tolerates_annotations() {
        let g = GameState::new();
        let mv = parse_san(&g, "Nf3!?").unwrap();
        assert_eq!(mv.to_coordinate(), "g1f3");
        assert_eq!(parse_san(&g, "e4!").unwrap().to_coordinate(), "e2e4");
    }

    #[test]
    fn parse_errors() {
        let g = game("4k3/8/8/8/8/8/8/1N2KN2 w - - 0 1");
        assert_eq!(
            parse_san(&g, "Nd2"),
            Err(NotationError::Ambiguous { token: "Nd2".to_string() })
        );
        assert_eq!(
            parse_san(&g, "Qd2"),
            Err(NotationError::NoSuchMove { token: "Qd2".to_string() })
        );
        for bad in ["", "Zz9", "N", "e9", "Nbbd2", "e8=K"] {
            assert_eq!(
                parse_san(&g, bad),
                Err(NotationError::Malformed { token: bad.to_string() }),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn parse_promotion_forms() {
        let g = game("4k3/1P6/8/8/8/8/8/4K3 w - - 0 1");
        assert_eq!(parse_san(&g, "b8=Q").unwrap().promotion, Some(PieceKind::Queen));
        assert_eq!(parse_san(&g, "b8N").unwrap().promotion, Some(PieceKind::Knight));
        assert!(matches!(parse_san(&g, "b8"), Err(NotationError::NoSuchMove { .. })));
    }
}
