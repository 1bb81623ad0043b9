//! The game state machine: selection, legal-move queries and move application.

use tracing::{debug, info};

use crate::bitboard::Bitboard;
use crate::castle_rights::{CastleRights, CastleSide};
use crate::chess_move::{CoordinateMove, Move, MoveFlags, MoveRecord};
use crate::color::Color;
use crate::error::{FenError, GameError, NotationError};
use crate::movegen::{Direction, en_passant_victim, pseudo_legal};
use crate::notation::{STARTING_FEN, san};
use crate::piece::{Piece, PieceKind};
use crate::position::Position;
use crate::rules::{
    castling_moves, defender_moves, find_pin, is_in_check, king_safe_moves, leaves_king_safe,
};
use crate::square::Square;

/// Where the player is in the select-then-move interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    PieceSelected { from: Square, piece: Piece },
    /// A pawn move to the last rank is waiting for its promotion kind.
    AwaitingPromotion { from: Square, to: Square },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    InProgress,
    Checkmate { winner: Color },
    Stalemate,
}

impl GameStatus {
    #[inline]
    pub const fn is_over(self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }

    /// PGN result token.
    pub const fn result_token(self) -> &'static str {
        match self {
            GameStatus::InProgress => "*",
            GameStatus::Checkmate { winner: Color::White } => "1-0",
            GameStatus::Checkmate { winner: Color::Black } => "0-1",
            GameStatus::Stalemate => "1/2-1/2",
        }
    }
}

/// Result of [`GameState::apply_move`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    Applied(MoveRecord),
    /// The move is held until [`GameState::choose_promotion`] is called.
    PromotionPending { from: Square, to: Square },
}

/// Everything a renderer needs to draw the board after a query or a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderFrame {
    pub boards: [[Bitboard; PieceKind::COUNT]; Color::COUNT],
    pub available: Bitboard,
    /// The checked king's square, or empty.
    pub in_check: Bitboard,
    pub last_move: Bitboard,
}

/// A game in progress. Owned by one caller; every mutation goes through
/// `&mut self`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    position: Position,
    turn: Color,
    castling: CastleRights,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
    last_move: Option<(Square, Square)>,
    phase: Phase,
    status: GameStatus,
    in_check: bool,
    history: Vec<MoveRecord>,
    start_fen: String,
}

impl GameState {
    /// A new game from the standard initial position.
    pub fn new() -> GameState {
        GameState {
            position: Position::starting(),
            turn: Color::White,
            castling: CastleRights::ALL,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            last_move: None,
            phase: Phase::Idle,
            status: GameStatus::InProgress,
            in_check: false,
            history: Vec::new(),
            start_fen: STARTING_FEN.to_string(),
        }
    }

    /// Assemble an imported state. Validates the position and computes the
    /// check and end-of-game status straight away.
    pub(crate) fn from_parts(
        position: Position,
        turn: Color,
        castling: CastleRights,
        en_passant: Option<Square>,
        halfmove_clock: u32,
        fullmove_number: u32,
    ) -> Result<GameState, FenError> {
        position.validate()?;
        let mut game = GameState {
            position,
            turn,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
            last_move: None,
            phase: Phase::Idle,
            status: GameStatus::InProgress,
            in_check: false,
            history: Vec::new(),
            start_fen: String::new(),
        };
        game.refresh_status();
        game.start_fen = game.to_fen();
        Ok(game)
    }

    /// Back to the initial position, dropping history and selection.
    pub fn reset(&mut self) {
        *self = GameState::new();
        info!("game reset");
    }

    /// Replace this game with one imported from FEN. On error nothing changes.
    pub fn load_fen(&mut self, fen: &str) -> Result<(), FenError> {
        let game: GameState = fen.parse()?;
        *self = game;
        info!(fen, status = ?self.status, "position imported");
        Ok(())
    }

    /// Current piece placement.
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Side to move.
    pub fn turn(&self) -> Color {
        self.turn
    }

    /// Castling rights still held by either side.
    pub fn castling(&self) -> CastleRights {
        self.castling
    }

    /// Square a pawn may capture onto en passant this ply, if any.
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    /// Plies since the last capture or pawn move.
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    /// Starts at 1 and increments after each Black move.
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// Origin and destination of the most recent move.
    pub fn last_move(&self) -> Option<(Square, Square)> {
        self.last_move
    }

    /// Where the select-then-move interaction stands.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// In progress, checkmate or stalemate.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Whether the side to move is in check.
    pub fn in_check(&self) -> bool {
        self.in_check
    }

    /// Every applied move in order, with its SAN.
    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    /// FEN of the position this game started from.
    pub fn start_fen(&self) -> &str {
        &self.start_fen
    }

    fn ensure_in_progress(&self) -> Result<(), GameError> {
        if self.status.is_over() {
            Err(GameError::GameOver)
        } else {
            Ok(())
        }
    }

    /// Select the side-to-move piece on `square` and return where it may go.
    /// Selecting again while a piece is selected switches the selection.
    pub fn select(&mut self, square: Square) -> Result<Bitboard, GameError> {
        self.ensure_in_progress()?;
        if let Phase::AwaitingPromotion { to, .. } = self.phase {
            return Err(GameError::PromotionPending { square: to });
        }
        let piece = self
            .position
            .piece_at(square)
            .filter(|piece| piece.color == self.turn)
            .ok_or(GameError::InvalidSelection { square })?;
        self.phase = Phase::PieceSelected { from: square, piece };
        let available = self.moves_from(square);
        debug!(%square, ?piece, moves = available.count(), "piece selected");
        Ok(available)
    }

    /// Drop the current selection, or a pending promotion, without moving.
    pub fn cancel_selection(&mut self) {
        self.phase = Phase::Idle;
    }

    /// Destinations of the selected piece; empty when nothing is selected.
    pub fn available_moves(&self) -> Bitboard {
        match self.phase {
            Phase::PieceSelected { from, .. } => self.moves_from(from),
            Phase::Idle | Phase::AwaitingPromotion { .. } => Bitboard::EMPTY,
        }
    }

    /// Legal destinations of the piece on `from`, without touching the
    /// selection. Empty for empty squares, opponent pieces and finished games.
    pub fn moves_from(&self, from: Square) -> Bitboard {
        if self.status.is_over() {
            return Bitboard::EMPTY;
        }
        match self.position.piece_at(from) {
            Some(piece) if piece.color == self.turn => self.destinations(from, piece),
            _ => Bitboard::EMPTY,
        }
    }

    fn destinations(&self, from: Square, piece: Piece) -> Bitboard {
        let position = &self.position;
        if self.in_check {
            return defender_moves(position, from, self.en_passant);
        }
        if piece.kind == PieceKind::King {
            return king_safe_moves(position, from, piece.color)
                | castling_moves(position, piece.color, self.castling);
        }

        let mut mask = pseudo_legal(position, from, piece, self.en_passant);
        if let Some(pin) = find_pin(position, from) {
            mask &= pin.restriction;
        }
        if piece.kind == PieceKind::Pawn
            && let Some(target) = self.en_passant
            && mask.contains(target)
            && !leaves_king_safe(position, from, target, self.en_passant)
        {
            mask = mask.without(target);
        }
        mask
    }

    /// Every legal move for the side to move. Promotions appear once per kind.
    pub fn legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::new();
        if self.status.is_over() {
            return moves;
        }
        for from in self.position.occupancy_of(self.turn) {
            let Some(piece) = self.position.piece_at(from) else {
                continue;
            };
            for to in self.destinations(from, piece) {
                let mv = self.describe(from, to, piece.kind);
                if self.is_promotion(piece.kind, to) {
                    moves.extend(PieceKind::PROMOTIONS.map(|kind| mv.with_promotion(kind)));
                } else {
                    moves.push(mv);
                }
            }
        }
        moves
    }

    fn has_legal_move(&self) -> bool {
        self.position
            .occupancy_of(self.turn)
            .filter_map(|from| self.position.piece_at(from).map(|piece| (from, piece)))
            .any(|(from, piece)| self.destinations(from, piece).is_nonempty())
    }

    fn is_promotion(&self, kind: PieceKind, to: Square) -> bool {
        kind == PieceKind::Pawn && self.turn.promotion_rank().contains(to)
    }

    /// Build the full [`Move`] for a destination the caller already knows is legal.
    fn describe(&self, from: Square, to: Square, kind: PieceKind) -> Move {
        let mut flags = MoveFlags::QUIET;
        if self.position.occupancy_of(self.turn.flip()).contains(to) {
            flags = flags.with(MoveFlags::CAPTURE);
        }
        match kind {
            PieceKind::Pawn if self.en_passant == Some(to) && self.position.piece_at(to).is_none() => {
                flags = flags.with(MoveFlags::CAPTURE).with(MoveFlags::EN_PASSANT);
            }
            PieceKind::Pawn if from.rank().abs_diff(to.rank()) == 2 => {
                flags = flags.with(MoveFlags::DOUBLE_PUSH);
            }
            PieceKind::King => match CastleSide::from_king_move(self.turn, from, to) {
                Some(CastleSide::KingSide) => flags = flags.with(MoveFlags::CASTLE_KINGSIDE),
                Some(CastleSide::QueenSide) => flags = flags.with(MoveFlags::CASTLE_QUEENSIDE),
                None => {}
            },
            _ => {}
        }
        Move::new(from, to, kind).with_flags(flags)
    }

    /// Move the selected piece to `to`. A pawn reaching the last rank waits
    /// in [`Phase::AwaitingPromotion`]; anything else is applied at once.
    pub fn apply_move(&mut self, to: Square) -> Result<MoveOutcome, GameError> {
        self.ensure_in_progress()?;
        let (from, piece) = match self.phase {
            Phase::PieceSelected { from, piece } => (from, piece),
            Phase::AwaitingPromotion { to, .. } => return Err(GameError::PromotionPending { square: to }),
            Phase::Idle => return Err(GameError::NoSelection),
        };
        if !self.moves_from(from).contains(to) {
            debug!(%from, %to, "destination rejected");
            return Err(GameError::IllegalDestination { from, to });
        }
        if self.is_promotion(piece.kind, to) {
            self.phase = Phase::AwaitingPromotion { from, to };
            debug!(%from, %to, "awaiting promotion choice");
            return Ok(MoveOutcome::PromotionPending { from, to });
        }
        let mv = self.describe(from, to, piece.kind);
        Ok(MoveOutcome::Applied(self.finalize(mv)))
    }

    /// Complete a pending promotion as `kind` (knight, bishop, rook or queen).
    pub fn choose_promotion(&mut self, kind: PieceKind) -> Result<MoveRecord, GameError> {
        let Phase::AwaitingPromotion { from, to } = self.phase else {
            return Err(GameError::NotAwaitingPromotion);
        };
        if !kind.is_promotion_target() {
            return Err(GameError::InvalidPromotion { kind });
        }
        let mv = self.describe(from, to, PieceKind::Pawn).with_promotion(kind);
        Ok(self.finalize(mv))
    }

    /// Apply a complete move, e.g. one suggested by an engine. It must match a
    /// legal move by origin, destination and promotion kind.
    pub fn play(&mut self, mv: Move) -> Result<MoveRecord, GameError> {
        self.ensure_in_progress()?;
        if let Phase::AwaitingPromotion { to, .. } = self.phase {
            return Err(GameError::PromotionPending { square: to });
        }
        let legal = self
            .legal_moves()
            .into_iter()
            .find(|m| m.from == mv.from && m.to == mv.to && m.promotion == mv.promotion)
            .ok_or(GameError::IllegalDestination { from: mv.from, to: mv.to })?;
        Ok(self.finalize(legal))
    }

    /// Apply a move written in coordinate notation (`e2e4`, `e7e8q`).
    pub fn play_coordinate(&mut self, text: &str) -> Result<MoveRecord, NotationError> {
        let coordinate: CoordinateMove = text.parse()?;
        let mv = self
            .legal_moves()
            .into_iter()
            .find(|m| m.matches(&coordinate))
            .ok_or(GameError::IllegalDestination {
                from: coordinate.from,
                to: coordinate.to,
            })?;
        Ok(self.play(mv)?)
    }

    /// Apply a move written in SAN (`Nf3`, `exd6`, `O-O`, `e8=Q+`).
    pub fn play_san(&mut self, token: &str) -> Result<MoveRecord, NotationError> {
        let mv = san::parse_san(self, token)?;
        Ok(self.play(mv)?)
    }

    fn finalize(&mut self, mv: Move) -> MoveRecord {
        let body = san::san_body(self, &mv);
        self.make(mv);
        let mate = matches!(self.status, GameStatus::Checkmate { .. });
        let suffix = if mate {
            "#"
        } else if self.in_check {
            "+"
        } else {
            ""
        };
        let record = MoveRecord {
            mv,
            san: format!("{body}{suffix}"),
            check: self.in_check,
            mate,
        };
        debug!(mv = %mv, san = %record.san, "move applied");
        if self.status.is_over() {
            info!(status = ?self.status, "game over");
        }
        self.history.push(record.clone());
        record
    }

    /// Apply a legal move without recording it. Perft and SAN suffixes use
    /// this directly.
    pub(crate) fn make(&mut self, mv: Move) {
        let us = self.turn;
        let them = us.flip();
        let piece = Piece::new(us, mv.piece);

        if mv.is_en_passant()
            && let Some(victim) = en_passant_victim(mv.to, us)
        {
            self.position.remove(victim);
        }
        self.position.relocate(mv.from, mv.to, piece);
        if let Some(kind) = mv.promotion {
            self.position.put(mv.to, Piece::new(us, kind));
        }
        if let Some(side) = mv.castle_side() {
            let rook = Piece::new(us, PieceKind::Rook);
            self.position.relocate(side.rook_home(us), side.rook_target(us), rook);
        }

        self.castling = self
            .castling
            .remove(CastleRights::revoked_by(mv.from))
            .remove(CastleRights::revoked_by(mv.to));

        self.en_passant = None;
        if mv.is_double_push() {
            let enemy_pawns = self.position.pieces(them, PieceKind::Pawn);
            let beside = [Direction::West, Direction::East]
                .into_iter()
                .filter_map(|dir| dir.step(mv.to))
                .any(|sq| enemy_pawns.contains(sq));
            if beside {
                self.en_passant = mv.from.offset(us.forward());
            }
        }

        if mv.piece == PieceKind::Pawn || mv.is_capture() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        }
        if us == Color::Black {
            self.fullmove_number = self.fullmove_number.saturating_add(1);
        }

        self.turn = them;
        self.last_move = Some((mv.from, mv.to));
        self.phase = Phase::Idle;
        self.refresh_status();
    }

    fn refresh_status(&mut self) {
        self.in_check = is_in_check(&self.position, self.turn);
        self.status = GameStatus::InProgress;
        if !self.has_legal_move() {
            self.status = if self.in_check {
                GameStatus::Checkmate { winner: self.turn.flip() }
            } else {
                GameStatus::Stalemate
            };
        }
    }

    /// Snapshot for the renderer.
    pub fn frame(&self) -> RenderFrame {
        let in_check = if self.in_check {
            self.position.pieces(self.turn, PieceKind::King)
        } else {
            Bitboard::EMPTY
        };
        let last_move = self
            .last_move
            .map_or(Bitboard::EMPTY, |(from, to)| from.bitboard() | to.bitboard());
        RenderFrame {
            boards: *self.position.boards(),
            available: self.available_moves(),
            in_check,
            last_move,
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        GameState::new()
    }
}
