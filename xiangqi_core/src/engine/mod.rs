use crate::engine::config::DifficultyConfig;
use crate::logic::board::{Board, Color, Piece, Position};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub mod config;
pub mod eval;
pub mod ordering;
pub mod search;
pub mod tt;
pub mod zobrist;


/// Score of a side that has no legal move left.
pub const CHECKMATE_SCORE: i32 = 100_000;
/// Bound used for full search windows.
pub const INFINITY_SCORE: i32 = 999_999;

/// A move together with snapshots of the moving piece (as it stood before the
/// move) and the captured piece, if any. The snapshots make undo exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub from: Position,
    pub to: Position,
    pub piece: Piece,
    pub captured: Option<Piece>,
}

impl Move {
    pub const fn new(from: Position, to: Position, piece: Piece, captured: Option<Piece>) -> Self {
        Self {
            from,
            to,
            piece,
            captured,
        }
    }

    /// Builds the move `from -> to` from the current contents of `board`.
    pub fn from_board(board: &Board, from: Position, to: Position) -> Option<Self> {
        let piece = board.get_piece(from)?;
        Some(Self::new(from, to, piece, board.get_piece(to)))
    }

    pub const fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    /// Same origin and destination, regardless of piece snapshots.
    pub fn same_squares(&self, other: &Self) -> bool {
        self.from == other.from && self.to == other.to
    }
}

/// Parses the squares of a move written as `h7e7` or `h7 e7`.
pub fn parse_move_squares(text: &str) -> Option<(Position, Position)> {
    let compact: String = text.split_whitespace().collect();
    if compact.len() != 4 {
        return None;
    }
    let from = compact.get(..2)?.parse().ok()?;
    let to = compact.get(2..)?.parse().ok()?;
    Some((from, to))
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    pub depth: u8,
    pub nodes: u64,
    pub score: i32,
    pub time_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("{0} has no legal moves")]
    NoLegalMoves(Color),
    #[error("the game is already over")]
    GameOver,
}

pub trait Evaluator {
    /// Static score of `board` from the point of view of `color`.
    fn evaluate(&self, board: &Board, color: Color) -> i32;
}

pub trait Searcher {
    fn search(
        &mut self,
        board: &Board,
        color: Color,
        difficulty: &DifficultyConfig,
    ) -> Result<(Move, SearchStats), SearchError>;
}
