//! Protocol command parsing.

use arbiter_core::{CoordinateMove, GameState, PieceKind, Square};

use crate::error::CliError;

/// What `move` was given: a destination for the selected piece, or a full
/// move in coordinate notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveInput {
    To(Square),
    Coordinate(CoordinateMove),
}

/// A session option changed with `set <name> <value>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOption {
    AutoQueen(bool),
    ShowBoard(bool),
    EchoSan(bool),
}

/// A parsed protocol command.
#[derive(Debug)]
pub enum Command {
    /// `new` -- start over from the initial position.
    New,
    /// `position` -- replace the game with a set-up position and optional moves.
    Position(Box<GameState>),
    /// `select <sq>` -- pick up a piece and list its destinations.
    Select(Square),
    /// `cancel` -- drop the selection or a pending promotion.
    Cancel,
    /// `move <sq>|<coord>`.
    Move(MoveInput),
    /// `promote <q|r|b|n>` -- finish a pending promotion.
    Promote(PieceKind),
    /// `san <token>`.
    San(String),
    /// `bestmove <coord>` -- a move suggested by an external engine.
    BestMove(CoordinateMove),
    /// `moves` -- every legal move for the side to move.
    Moves,
    /// `fen` -- print the current FEN.
    Fen,
    /// `pgn` -- print the game so far as PGN.
    Pgn,
    /// `loadpgn <pgn>` -- replace the game with one read from PGN text.
    LoadPgn(String),
    /// `board` -- print the board.
    Board,
    /// `frame` -- print the rendering masks.
    Frame,
    /// `status` -- print whose turn it is, check, mate or stalemate.
    Status,
    /// `set <option> <value>`.
    Set(SessionOption),
    /// `quit` -- end the session.
    Quit,
}

/// Parse a single line of input into a [`Command`]. Blank lines give `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, CliError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some((&name, args)) = tokens.split_first() else {
        return Ok(None);
    };

    let command = match name {
        "new" => Command::New,
        "position" => parse_position(args)?,
        "select" => Command::Select(parse_square(first(args, "select")?)?),
        "cancel" => Command::Cancel,
        "move" => Command::Move(parse_move_input(first(args, "move")?)?),
        "promote" => Command::Promote(parse_promotion(first(args, "promote")?)?),
        "san" => Command::San(first(args, "san")?.to_string()),
        "bestmove" => Command::BestMove(first(args, "bestmove")?.parse()?),
        "moves" => Command::Moves,
        "fen" => Command::Fen,
        "pgn" => Command::Pgn,
        "loadpgn" => parse_loadpgn(line)?,
        "board" => Command::Board,
        "frame" => Command::Frame,
        "status" => Command::Status,
        "set" => Command::Set(parse_option(args)?),
        "quit" => Command::Quit,
        other => {
            return Err(CliError::UnknownCommand {
                command: other.to_string(),
            });
        }
    };
    Ok(Some(command))
}

fn first<'a>(args: &[&'a str], command: &'static str) -> Result<&'a str, CliError> {
    args.first().copied().ok_or(CliError::MissingArgument { command })
}

fn parse_square(text: &str) -> Result<Square, CliError> {
    Square::from_algebraic(text).ok_or_else(|| CliError::InvalidValue {
        name: "square".to_string(),
        value: text.to_string(),
    })
}

fn parse_move_input(text: &str) -> Result<MoveInput, CliError> {
    if text.len() == 2 {
        parse_square(text).map(MoveInput::To)
    } else {
        Ok(MoveInput::Coordinate(text.parse()?))
    }
}

fn parse_promotion(text: &str) -> Result<PieceKind, CliError> {
    let mut chars = text.chars();
    let kind = match (chars.next(), chars.next()) {
        (Some(c), None) => PieceKind::from_fen_char(c).filter(|kind| kind.is_promotion_target()),
        _ => None,
    };
    kind.ok_or_else(|| CliError::InvalidValue {
        name: "promote".to_string(),
        value: text.to_string(),
    })
}

/// Parse the `position` command arguments.
///
/// Supports:
/// - `position startpos [moves e2e4 e7e5 ...]`
/// - `position fen <fen-string> [moves e2e4 e7e5 ...]`
fn parse_position(tokens: &[&str]) -> Result<Command, CliError> {
    let (mut game, rest) = match tokens.first() {
        Some(&"startpos") => (GameState::new(), &tokens[1..]),
        Some(&"fen") => {
            // FEN is 6 space-separated fields
            if tokens.len() < 7 {
                return Err(CliError::MissingArgument { command: "position fen" });
            }
            let game: GameState = tokens[1..7].join(" ").parse()?;
            (game, &tokens[7..])
        }
        Some(other) => {
            return Err(CliError::InvalidValue {
                name: "position".to_string(),
                value: other.to_string(),
            });
        }
        None => return Err(CliError::MissingArgument { command: "position" }),
    };

    // Apply moves if present: "moves e2e4 e7e5 ..."
    if let Some((&"moves", moves)) = rest.split_first() {
        for text in moves {
            game.play_coordinate(text)?;
        }
    }

    Ok(Command::Position(Box::new(game)))
}

/// Everything after the `loadpgn` keyword, so the PGN keeps its spacing.
fn parse_loadpgn(line: &str) -> Result<Command, CliError> {
    let text = line
        .trim_start()
        .strip_prefix("loadpgn")
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .ok_or(CliError::MissingArgument { command: "loadpgn" })?;
    // one-line PGN separates tag pairs with spaces; put each on its own line
    Ok(Command::LoadPgn(text.replace("] [", "]\n[").replace("] ", "]\n\n")))
}

fn parse_option(tokens: &[&str]) -> Result<SessionOption, CliError> {
    let name = first(tokens, "set")?;
    let value = tokens
        .get(1)
        .copied()
        .ok_or(CliError::MissingArgument { command: "set" })?;
    let flag = match value {
        "on" | "true" | "1" => true,
        "off" | "false" | "0" => false,
        _ => {
            return Err(CliError::InvalidValue {
                name: name.to_string(),
                value: value.to_string(),
            });
        }
    };
    match name {
        "auto_queen" => Ok(SessionOption::AutoQueen(flag)),
        "show_board" => Ok(SessionOption::ShowBoard(flag)),
        "echo_san" => Ok(SessionOption::EchoSan(flag)),
        _ => Err(CliError::UnknownOption { name: name.to_string() }),
    }
}
