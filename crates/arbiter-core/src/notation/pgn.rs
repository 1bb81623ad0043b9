//! PGN export and import.
//!
//! Export writes the Seven Tag Roster (plus `SetUp`/`FEN` when the game did
//! not start from the initial array), numbered SAN movetext and a result.
//! Import reads tags, drops move numbers, comments, variations and NAGs, and
//! replays each SAN token. It stops at the first token that is not a move or
//! names no legal move, reporting which move token it was.

use std::collections::BTreeMap;

use tracing::debug;

use crate::color::Color;
use crate::error::NotationError;
use crate::game::GameState;

use super::fen::STARTING_FEN;

/// Tag names every PGN game carries, in export order.
pub const SEVEN_TAG_ROSTER: [&str; 7] = ["Event", "Site", "Date", "Round", "White", "Black", "Result"];

const MAX_LINE: usize = 79;

/// A parsed PGN game: its tags and the state after replaying every move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgnGame {
    pub tags: BTreeMap<String, String>,
    pub game: GameState,
    pub result: String,
}

fn default_tag(name: &str) -> &'static str {
    match name {
        "Date" => "????.??.??",
        _ => "?",
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Render `game` as PGN. `tags` override the roster defaults and any extra
/// tags are written after the roster in name order. The `Result` tag always
/// reflects the game status.
pub fn write_pgn(game: &GameState, tags: &BTreeMap<String, String>) -> String {
    let result = game.status().result_token();
    let mut out = String::new();

    for name in SEVEN_TAG_ROSTER {
        let value = match name {
            "Result" => result,
            _ => tags.get(name).map_or(default_tag(name), String::as_str),
        };
        out.push_str(&format!("[{name} \"{}\"]\n", escape(value)));
    }
    if game.start_fen() != STARTING_FEN {
        out.push_str("[SetUp \"1\"]\n");
        out.push_str(&format!("[FEN \"{}\"]\n", escape(game.start_fen())));
    }
    for (name, value) in tags {
        if SEVEN_TAG_ROSTER.contains(&name.as_str()) || name == "SetUp" || name == "FEN" {
            continue;
        }
        out.push_str(&format!("[{name} \"{}\"]\n", escape(value)));
    }
    out.push('\n');

    let mut words = movetext(game);
    words.push(result.to_string());
    out.push_str(&wrap(&words));
    out.push('\n');
    out
}

/// Numbered SAN words for the game's history.
fn movetext(game: &GameState) -> Vec<String> {
    let history = game.history();
    // walk back from the current turn to the colour and number the game began with
    let plies = history.len() as u32;
    let mover_first = if plies % 2 == 0 { game.turn() } else { game.turn().flip() };
    let black_moves = match mover_first {
        Color::White => plies / 2,
        Color::Black => plies.div_ceil(2),
    };
    let mut number = game.fullmove_number().saturating_sub(black_moves).max(1);
    let mut mover = mover_first;

    let mut words = Vec::with_capacity(history.len() * 3 / 2 + 1);
    for (ply, record) in history.iter().enumerate() {
        match mover {
            Color::White => words.push(format!("{number}.")),
            Color::Black if ply == 0 => words.push(format!("{number}...")),
            Color::Black => {}
        }
        words.push(record.san.clone());
        if mover == Color::Black {
            number += 1;
        }
        mover = mover.flip();
    }
    words
}

fn wrap(words: &[String]) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();
    for word in words {
        if !line.is_empty() && line.len() + 1 + word.len() > MAX_LINE {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    lines.push(line);
    lines.join("\n")
}

fn parse_tag(line: &str) -> Result<(String, String), NotationError> {
    let bad = || NotationError::Header { line: line.to_string() };
    let inner = line
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(bad)?
        .trim();
    let (name, value) = inner.split_once(char::is_whitespace).ok_or_else(bad)?;
    let value = value
        .trim()
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or_else(bad)?;
    if name.is_empty() {
        return Err(bad());
    }
    let value = value.replace("\\\"", "\"").replace("\\\\", "\\");
    Ok((name.to_string(), value))
}

/// Drop `{...}` comments, `;` comments to end of line and nested `(...)`
/// variations from movetext.
fn strip_commentary(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_brace = false;
    let mut in_line_comment = false;
    let mut depth = 0usize;

    for ch in text.chars() {
        if in_line_comment {
            if ch == '\n' {
                in_line_comment = false;
                out.push(' ');
            }
            continue;
        }
        if in_brace {
            if ch == '}' {
                in_brace = false;
                out.push(' ');
            }
            continue;
        }
        match ch {
            '{' => in_brace = true,
            ';' => in_line_comment = true,
            '(' => depth += 1,
            ')' => {
                depth = depth.saturating_sub(1);
                out.push(' ');
            }
            _ if depth > 0 => {}
            _ => out.push(ch),
        }
    }
    out
}

fn is_result(token: &str) -> bool {
    matches!(token, "1-0" | "0-1" | "1/2-1/2" | "*")
}

/// Strip a leading move number (`12.`, `12...`, `12.e4`) from `token`.
fn strip_move_number(token: &str) -> &str {
    let digits = token.bytes().take_while(u8::is_ascii_digit).count();
    if digits > 0 && token[digits..].starts_with('.') {
        token[digits..].trim_start_matches('.')
    } else {
        token
    }
}

/// Read one PGN game.
pub fn read_pgn(text: &str) -> Result<PgnGame, NotationError> {
    let mut tags = BTreeMap::new();
    let mut movetext = String::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with('[') && movetext.trim().is_empty() {
            let (name, value) = parse_tag(trimmed)?;
            tags.insert(name, value);
        } else {
            movetext.push_str(line);
            movetext.push('\n');
        }
    }

    let mut game = match tags.get("FEN") {
        Some(fen) => fen.parse::<GameState>()?,
        None => GameState::new(),
    };

    let mut result = None;
    let mut position = 0;
    for raw in strip_commentary(&movetext).split_whitespace() {
        if is_result(raw) {
            result = Some(raw.to_string());
            break;
        }
        let token = strip_move_number(raw);
        if token.is_empty() || token.starts_with('$') || token.chars().all(|c| matches!(c, '!' | '?')) {
            continue;
        }
        position += 1;
        game.play_san(token).map_err(|source| NotationError::AtToken {
            position,
            token: token.to_string(),
            source: Box::new(source),
        })?;
    }

    let result = result
        .or_else(|| tags.get("Result").cloned())
        .unwrap_or_else(|| "*".to_string());
    debug!(moves = position, %result, "PGN imported");
    Ok(PgnGame { tags, game, result })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameStatus;

    #[test]
    fn export_roster_and_movetext() {
        let mut game = GameState::new();
        for san in ["e4", "e5", "Nf3", "Nc6"] {
            game.play_san(san).unwrap();
        }
        let mut tags = BTreeMap::new();
        tags.insert("White".to_string(), "Alice".to_string());
        tags.insert("Annotator".to_string(), "arbiter".to_string());
        let pgn = write_pgn(&game, &tags);
        let expected = "[Event \"?\"]\n[Site \"?\"]\n[Date \"????.??.??\"]\n[Round \"?\"]\n\
                        [White \"Alice\"]\n[Black \"?\"]\n[Result \"*\"]\n[Annotator \"arbiter\"]\n\n\
                        1. e4 e5 2. Nf3 Nc6 *\n";
        assert_eq!(pgn, expected);
    }

    #[test]
    fn export_from_position_numbers_black_first() {
        let mut game: GameState = "4k3/8/8/8/8/8/4p3/4K3 b - - 0 12".parse().unwrap();
        game.play_san("Kd7").unwrap();
        game.play_san("Kxe2").unwrap();
        let pgn = write_pgn(&game, &BTreeMap::new());
        assert!(pgn.contains("[SetUp \"1\"]\n[FEN \"4k3/8/8/8/8/8/4p3/4K3 b - - 0 12\"]\n"));
        assert!(pgn.ends_with("12... Kd7 13. Kxe2 *\n"), "{pgn}");
    }

    #[test]
    fn long_movetext_wraps() {
        let mut game = GameState::new();
        for _ in 0..10 {
            for san in ["Nf3", "Nf6", "Ng1", "Ng8"] {
                game.play_san(san).unwrap();
            }
        }
        let pgn = write_pgn(&game, &BTreeMap::new());
        assert!(pgn.lines().all(|line| line.len() <= MAX_LINE));
    }

    #[test]
    fn import_skips_commentary() {
        let pgn = r#"[Event "Casual"]
[White "A"]
[Black "B"]
[Result "0-1"]

1. f3 {weak} e5 2. g4?? $4 (2. e4 Nf6) Qh4# ; mate
0-1
"#;
        let parsed = read_pgn(pgn).unwrap();
        assert_eq!(parsed.tags.get("Event").map(String::as_str), Some("Casual"));
        assert_eq!(parsed.result, "0-1");
        assert_eq!(parsed.game.history().len(), 4);
        assert_eq!(parsed.game.status(), GameStatus::Checkmate { winner: Color::Black });
    }

    #[test]
    fn import_from_fen_tag() {
        let pgn = "[SetUp \"1\"]\n[FEN \"4k3/8/8/8/8/8/4p3/4K3 b - - 0 12\"]\n\n12... Kd7 13. Kxe2 *\n";
        let parsed = read_pgn(pgn).unwrap();
        assert_eq!(parsed.game.fullmove_number(), 13);
        assert_eq!(parsed.game.turn(), Color::Black);
    }

    #[test]
    fn import_stops_at_bad_token() {
        let err = read_pgn("1. e4 e5 2. Nf3 Zz9 3. Bb5 *").unwrap_err();
        match err {
            NotationError::AtToken { position, token, source } => {
                assert_eq!(position, 4);
                assert_eq!(token, "Zz9");
                assert_eq!(*source, NotationError::Malformed { token: "Zz9".to_string() });
            }
            other => panic!("unexpected error {other:?}"),
        }
        let err = read_pgn("1. e4 e5 2. Ke3 *").unwrap_err();
        assert!(matches!(err, NotationError::AtToken { position: 3, .. }));
    }

    #[test]
    fn roundtrip_through_export() {
        let mut game = GameState::new();
        for san in ["d4", "d5", "c4", "dxc4", "e4", "b5", "a4", "c6", "axb5", "cxb5", "Qf3"] {
            game.play_san(san).unwrap();
        }
        let parsed = read_pgn(&write_pgn(&game, &BTreeMap::new())).unwrap();
        assert_eq!(parsed.game.to_fen(), game.to_fen());
        assert_eq!(parsed.game.history(), game.history());
    }

    #[test]
    fn bad_header() {
        assert!(matches!(read_pgn("[Event Casual]\n1. e4 *"), Err(NotationError::Header { .. })));
    }
}
