//! The protocol loop: one command per line in, plain-text replies out.

use std::collections::BTreeMap;
use std::io::{BufRead, Write};

use tracing::{debug, info, warn};

use arbiter_core::notation::{read_pgn, write_pgn};
use arbiter_core::{
    Bitboard, CoordinateMove, GameError, GameState, GameStatus, MoveOutcome, MoveRecord, PieceKind,
};

use crate::command::{Command, MoveInput, SessionOption, parse_command};
use crate::error::CliError;

/// Configuration knobs adjustable via `set`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Finish promotions with a queen instead of waiting for `promote`.
    pub auto_queen: bool,
    /// Print the board after every applied move.
    pub show_board: bool,
    /// Print the SAN of every applied move.
    pub echo_san: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            auto_queen: false,
            show_board: false,
            echo_san: true,
        }
    }
}

/// A game driven by text commands read from `input`, replying on `output`.
pub struct Session<R, W> {
    game: GameState,
    tags: BTreeMap<String, String>,
    config: SessionConfig,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Session<R, W> {
    /// Create a session on the starting position.
    pub fn new(input: R, output: W) -> Self {
        Self::with_config(input, output, SessionConfig::default())
    }

    /// Create a session on the starting position with explicit options.
    pub fn with_config(input: R, output: W, config: SessionConfig) -> Self {
        Self {
            game: GameState::new(),
            tags: BTreeMap::new(),
            config,
            input,
            output,
        }
    }

    /// The game being played.
    pub fn game(&self) -> &GameState {
        &self.game
    }

    /// Current session options.
    pub fn config(&self) -> SessionConfig {
        self.config
    }

    /// Hand back the output sink, e.g. to inspect what was written.
    pub fn into_output(self) -> W {
        self.output
    }

    /// Read and execute commands until `quit` or end of input.
    ///
    /// A rejected command is reported on the output and the loop carries on;
    /// only I/O failures end the session early.
    pub fn run(&mut self) -> Result<(), CliError> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                break;
            }
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            debug!(cmd = %trimmed, "received command");

            match parse_command(trimmed) {
                Ok(Some(Command::Quit)) => break,
                Ok(Some(command)) => {
                    if let Err(e) = self.execute(command) {
                        self.report(e)?;
                    }
                }
                Ok(None) => {}
                Err(e) => self.report(e)?,
            }
            self.output.flush()?;
        }

        info!("session closed");
        Ok(())
    }

    fn report(&mut self, error: CliError) -> Result<(), CliError> {
        if let CliError::Io { source } = error {
            return Err(CliError::Io { source });
        }
        warn!(error = %error, "command rejected");
        if error.is_invalid_move() {
            writeln!(self.output, "invalid move")?;
        } else {
            writeln!(self.output, "error: {error}")?;
        }
        Ok(())
    }

    /// Execute one parsed command.
    pub fn execute(&mut self, command: Command) -> Result<(), CliError> {
        match command {
            Command::New => {
                self.game.reset();
                self.tags.clear();
            }
            Command::Position(game) => {
                self.game = *game;
                self.tags.clear();
                info!(fen = %self.game.to_fen(), "position set");
            }
            Command::Select(square) => {
                let available = self.game.select(square)?;
                writeln!(self.output, "{}", squares(available))?;
            }
            Command::Cancel => self.game.cancel_selection(),
            Command::Move(MoveInput::To(to)) => {
                let outcome = self.game.apply_move(to)?;
                self.handle_outcome(outcome, None)?;
            }
            Command::Move(MoveInput::Coordinate(mv)) => self.play_coordinate(mv)?,
            Command::BestMove(mv) => {
                info!(mv = %format_coordinate(&mv), "engine move");
                self.play_coordinate(mv)?;
            }
            Command::Promote(kind) => {
                let record = self.game.choose_promotion(kind)?;
                self.announce(&record)?;
            }
            Command::San(token) => {
                let record = self.game.play_san(&token)?;
                self.announce(&record)?;
            }
            Command::Moves => {
                let mut moves: Vec<String> = self.game.legal_moves().iter().map(|mv| mv.to_coordinate()).collect();
                moves.sort();
                writeln!(self.output, "{}", moves.join(" "))?;
            }
            Command::Fen => writeln!(self.output, "{}", self.game.to_fen())?,
            Command::Pgn => write!(self.output, "{}", write_pgn(&self.game, &self.tags))?,
            Command::LoadPgn(text) => {
                let parsed = read_pgn(&text)?;
                self.game = parsed.game;
                self.tags = parsed.tags;
                writeln!(self.output, "loaded {} moves", self.game.history().len())?;
            }
            Command::Board => writeln!(self.output, "{}", self.game.position().pretty())?,
            Command::Frame => {
                let frame = self.game.frame();
                writeln!(self.output, "available {}", squares(frame.available))?;
                writeln!(self.output, "check {}", squares(frame.in_check))?;
                writeln!(self.output, "last {}", squares(frame.last_move))?;
            }
            Command::Status => writeln!(self.output, "{}", status_line(&self.game))?,
            Command::Set(option) => self.set_option(option),
            Command::Quit => {}
        }
        Ok(())
    }

    /// Play a coordinate move through the same select-then-move path a user
    /// takes. A promoting move without a letter waits for `promote`.
    fn play_coordinate(&mut self, mv: CoordinateMove) -> Result<(), CliError> {
        // a promotion letter must name a promoting move
        if mv.promotion.is_some() && !self.game.legal_moves().iter().any(|legal| legal.matches(&mv)) {
            return Err(GameError::IllegalDestination { from: mv.from, to: mv.to }.into());
        }
        self.game.select(mv.from)?;
        match self.game.apply_move(mv.to) {
            Ok(outcome) => self.handle_outcome(outcome, mv.promotion),
            Err(e) => {
                self.game.cancel_selection();
                Err(e.into())
            }
        }
    }

    fn handle_outcome(&mut self, outcome: MoveOutcome, promotion: Option<PieceKind>) -> Result<(), CliError> {
        match outcome {
            MoveOutcome::Applied(record) => self.announce(&record),
            MoveOutcome::PromotionPending { to, .. } => {
                let choice = promotion.or(self.config.auto_queen.then_some(PieceKind::Queen));
                match choice {
                    Some(kind) => {
                        let record = self.game.choose_promotion(kind)?;
                        self.announce(&record)
                    }
                    None => {
                        writeln!(self.output, "promote {to}: q r b n")?;
                        Ok(())
                    }
                }
            }
        }
    }

    fn announce(&mut self, record: &MoveRecord) -> Result<(), CliError> {
        if self.config.echo_san {
            writeln!(self.output, "{}", record.san)?;
        }
        if self.config.show_board {
            writeln!(self.output, "{}", self.game.position().pretty())?;
        }
        if self.game.status().is_over() {
            writeln!(self.output, "{}", status_line(&self.game))?;
        }
        Ok(())
    }

    fn set_option(&mut self, option: SessionOption) {
        match option {
            SessionOption::AutoQueen(on) => self.config.auto_queen = on,
            SessionOption::ShowBoard(on) => self.config.show_board = on,
            SessionOption::EchoSan(on) => self.config.echo_san = on,
        }
        debug!(config = ?self.config, "option changed");
    }
}

fn format_coordinate(mv: &CoordinateMove) -> String {
    let promotion = mv.promotion.map(PieceKind::fen_char).map(String::from).unwrap_or_default();
    format!("{}{}{promotion}", mv.from, mv.to)
}

/// Space-separated square names, or `-` for an empty set.
fn squares(mask: Bitboard) -> String {
    if mask.is_empty() {
        return "-".to_string();
    }
    mask.map(|sq| sq.to_string()).collect::<Vec<_>>().join(" ")
}

fn status_line(game: &GameState) -> String {
    match game.status() {
        GameStatus::Checkmate { winner } => format!("checkmate, {} wins {}", winner.name(), game.status().result_token()),
        GameStatus::Stalemate => format!("stalemate {}", game.status().result_token()),
        GameStatus::InProgress if game.in_check() => format!("{} to move, in check", game.turn().name()),
        GameStatus::InProgress => format!("{} to move", game.turn().name()),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use arbiter_core::{Color, Phase};

    use super::*;

    fn run(script: &str) -> (GameState, String) {
        run_with(script, SessionConfig::default())
    }

    fn run_with(script: &str, config: SessionConfig) -> (GameState, String) {
        let mut session = Session::with_config(Cursor::new(script.as_bytes().to_vec()), Vec::new(), config);
        session.run().unwrap();
        let game = session.game().clone();
        let output = String::from_utf8(session.into_output()).unwrap();
        (game, output)
    }

    #[test]
    fn select_then_move() {
        let (game, output) = run("select e2\nmove e4\nfen\n");
        assert_eq!(output, "e3 e4\ne4\nrnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1\n");
        assert_eq!(game.turn(), Color::Black);
    }

    #[test]
    fn illegal_destination_prints_invalid_move() {
        let (game, output) = run("select e2\nmove e5\nmove e2e5\n");
        assert_eq!(output, "e3 e4\ninvalid move\ninvalid move\n");
        assert_eq!(game.history().len(), 0);
        // a rejected coordinate move drops the selection it made
        assert_eq!(game.phase(), Phase::Idle);
    }

    #[test]
    fn errors_do_not_end_the_session() {
        let (game, output) = run("jump\nselect e7\nmove e2e4\n");
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "error: unknown command: jump");
        assert_eq!(lines[1], "error: no piece of the side to move on e7");
        assert_eq!(lines[2], "e4");
        assert_eq!(game.history().len(), 1);
    }

    #[test]
    fn quit_stops_reading() {
        let (game, _) = run("move e2e4\nquit\nmove e7e5\n");
        assert_eq!(game.history().len(), 1);
    }

    #[test]
    fn promotion_waits_for_choice() {
        let script = "position fen 4k3/1P6/8/8/8/8/8/4K3 w - - 0 1\nmove b7b8\npromote n\nfen\n";
        let (game, output) = run(script);
        assert_eq!(output, "promote b8: q r b n\nb8=N\n1N2k3/8/8/8/8/8/8/4K3 b - - 0 1\n");
        assert_eq!(game.history()[0].mv.promotion, Some(PieceKind::Knight));
    }

    #[test]
    fn promotion_letter_on_ordinary_move_is_rejected() {
        let (game, output) = run("move e2e4q\nbestmove g1f3n\nfen\n");
        assert_eq!(
            output,
            "invalid move\ninvalid move\nrnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1\n"
        );
        assert_eq!(game.history().len(), 0);
        assert_eq!(game.phase(), Phase::Idle);
    }

    #[test]
    fn auto_queen_finishes_promotion() {
        let script = "set auto_queen on\nposition fen 4k3/1P6/8/8/8/8/8/4K3 w - - 0 1\nselect b7\nmove b8\n";
        let (game, output) = run(script);
        assert!(output.ends_with("b8=Q+\n"), "{output}");
        assert_eq!(game.history()[0].mv.promotion, Some(PieceKind::Queen));
    }

    #[test]
    fn bestmove_uses_the_user_path() {
        let (game, output) = run("bestmove g1f3\nsan e5\nstatus\n");
        assert_eq!(output, "Nf3\ne5\nwhite to move\n");
        assert_eq!(game.history().len(), 2);
    }

    #[test]
    fn mate_is_announced() {
        let (game, output) = run("san f3\nsan e5\nsan g4\nsan Qh4#\nsan a3\n");
        assert!(output.contains("Qh4#\ncheckmate, black wins 0-1\n"), "{output}");
        assert!(output.ends_with("invalid move\n"), "{output}");
        assert_eq!(game.status(), GameStatus::Checkmate { winner: Color::Black });
    }

    #[test]
    fn echo_off_and_frame() {
        let config = SessionConfig { echo_san: false, ..SessionConfig::default() };
        let (_, output) = run_with("move e2e4\nselect g8\nframe\n", config);
        assert_eq!(output, "f6 h6\navailable f6 h6\ncheck -\nlast e2 e4\n");
    }

    #[test]
    fn pgn_round_trip_through_session() {
        let (_, exported) = run("san e4\nsan e5\nset echo_san off\npgn\n");
        let movetext = exported.lines().last().unwrap();
        assert_eq!(movetext, "1. e4 e5 *");

        let (game, output) = run("loadpgn [Event \"Casual\"] 1. e4 e5 2. Nf3 *\npgn\n");
        assert!(output.starts_with("loaded 3 moves\n[Event \"Casual\"]\n"), "{output}");
        assert_eq!(game.history().len(), 3);
    }

    #[test]
    fn new_resets_the_game() {
        let (game, output) = run("san d4\nnew\nmoves\n");
        assert_eq!(game.history().len(), 0);
        assert_eq!(output.lines().last().unwrap().split(' ').count(), 20);
    }
}
