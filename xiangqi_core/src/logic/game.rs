use crate::engine::config::Difficulty;
use crate::engine::search::AlphaBetaEngine;
use crate::engine::{Move, SearchError};
use crate::logic::board::{Board, Color, Position};
use crate::logic::draw;
use crate::logic::generator::MoveGenerator;
use crate::logic::history::GameHistory;
use crate::logic::rules::{is_in_check, is_valid_move, MoveError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Playing,
    RedWin,
    BlackWin,
    Draw,
}

impl GameStatus {
    pub const fn win_for(color: Color) -> Self {
        match color {
            Color::Red => Self::RedWin,
            Color::Black => Self::BlackWin,
        }
    }

    pub const fn is_over(self) -> bool {
        !matches!(self, Self::Playing)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameMode {
    /// The human plays RED, the engine BLACK.
    #[default]
    PlayerVsAi,
    AiVsAi,
}

/// The human side in `GameMode::PlayerVsAi`.
pub const HUMAN_COLOR: Color = Color::Red;

#[derive(Debug, Clone)]
pub struct GameState {
    pub board: Board,
    pub turn: Color,
    pub status: GameStatus,
    pub mode: GameMode,
    pub difficulty: Difficulty,
    pub history: GameHistory,
    generator: MoveGenerator,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    #[must_use]
    pub fn new() -> Self {
        Self::with_board(Board::new(), Color::Red)
    }

    /// A game starting from an arbitrary position. The status reflects that
    /// position immediately.
    #[must_use]
    pub fn with_board(board: Board, turn: Color) -> Self {
        let mut game = Self {
            board,
            turn,
            status: GameStatus::Playing,
            mode: GameMode::default(),
            difficulty: Difficulty::default(),
            history: GameHistory::new(),
            generator: MoveGenerator::new(),
        };
        game.update_status();
        game
    }

    /// Resets to the starting position with the given settings.
    pub fn new_game(&mut self, mode: GameMode, difficulty: Difficulty) {
        self.board = Board::new();
        self.turn = Color::Red;
        self.history.clear();
        self.mode = mode;
        self.difficulty = difficulty;
        self.update_status();
        log::info!("new game: {mode:?}, difficulty {difficulty}");
    }

    pub fn is_player_turn(&self) -> bool {
        self.mode == GameMode::PlayerVsAi && self.turn == HUMAN_COLOR && !self.status.is_over()
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        self.generator.generate_legal_moves(&self.board, self.turn)
    }

    pub fn is_in_check(&self) -> bool {
        is_in_check(&self.board, self.turn)
    }

    /// Validates and plays `from -> to` for the side to move.
    pub fn make_move_at(&mut self, from: Position, to: Position) -> Result<Move, MoveError> {
        if self.status.is_over() {
            return Err(MoveError::GameOver);
        }
        let mv = is_valid_move(&self.board, from, to, self.turn)?;
        self.apply(mv);
        Ok(mv)
    }

    /// Plays a move produced elsewhere (for example by the engine). Only its
    /// squares are trusted; piece snapshots are taken from the board.
    pub fn make_move(&mut self, mv: Move) -> Result<Move, MoveError> {
        self.make_move_at(mv.from, mv.to)
    }

    fn apply(&mut self, mv: Move) {
        self.generator.make_move(&mut self.board, &mv);
        self.history.push(mv, self.board.hash());
        self.turn = self.turn.opposite();
        self.update_status();
        log::debug!("{} played {mv}, status {:?}", mv.piece.color, self.status);
    }

    /// Takes back the last ply, or the last two when that returns the move to
    /// the human in player-vs-AI mode. Returns the number of plies undone.
    pub fn undo(&mut self) -> usize {
        let mut undone = 0;
        while undone < 2 && self.undo_ply() {
            undone += 1;
            if self.mode != GameMode::PlayerVsAi || self.turn == HUMAN_COLOR {
                break;
            }
        }
        undone
    }

    fn undo_ply(&mut self) -> bool {
        let Some(entry) = self.history.pop() else {
            return false;
        };
        self.generator.undo_move(&mut self.board, &entry.mv);

        let scanned = self.board.recompute_hash();
        if self.board.hash() != scanned {
            log::warn!(
                "hash drift after undo ({:#010x} != {scanned:#010x}), resynchronizing",
                self.board.hash()
            );
            self.board.refresh_hash();
        }

        self.turn = entry.mv.piece.color;
        self.status = GameStatus::Playing;
        true
    }

    /// Asks `engine` for a move for the side to move at the game's difficulty.
    /// The move is not played.
    pub fn request_ai_move(&self, engine: &mut AlphaBetaEngine) -> Result<Move, SearchError> {
        if self.status.is_over() {
            if !self.generator.has_legal_moves(&self.board, self.turn) {
                return Err(SearchError::NoLegalMoves(self.turn));
            }
            return Err(SearchError::GameOver);
        }
        engine.find_best_move(&self.board, self.turn, &self.difficulty.config())
    }

    fn update_status(&mut self) {
        let has_moves = self.generator.has_legal_moves(&self.board, self.turn);
        self.status = if !has_moves && is_in_check(&self.board, self.turn) {
            GameStatus::win_for(self.turn.opposite())
        } else if !has_moves || draw::is_draw(&self.history) {
            GameStatus::Draw
        } else {
            GameStatus::Playing
        };
        if self.status.is_over() {
            log::info!("game over: {:?}", self.status);
        }
    }
}
