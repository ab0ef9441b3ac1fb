use crate::engine::zobrist::ZobristKeys;
use crate::logic::eval_constants::{get_piece_value, VAL_PAWN_CROSSED};
use crate::logic::rules;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const BOARD_WIDTH: i8 = 9;
pub const BOARD_HEIGHT: i8 = 10;
pub const SQUARE_COUNT: usize = 90;

const FILES: [char; 9] = ['a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    Red,
    Black,
}

impl Color {
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Red => Self::Black,
            Self::Black => Self::Red,
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Self::Red => 0,
            Self::Black => 1,
        }
    }

    /// Row step of a pawn moving forward. RED starts at the bottom (rows 5-9).
    pub const fn forward(self) -> i8 {
        match self {
            Self::Red => -1,
            Self::Black => 1,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Red => f.write_str("RED"),
            Self::Black => f.write_str("BLACK"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceType {
    King = 0,
    Advisor = 1,
    Elephant = 2,
    Knight = 3,
    Rook = 4,
    Cannon = 5,
    Pawn = 6,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown piece type: {0}")]
pub struct UnknownPieceType(pub String);

impl PieceType {
    pub const ALL: [Self; 7] = [
        Self::King,
        Self::Advisor,
        Self::Elephant,
        Self::Knight,
        Self::Rook,
        Self::Cannon,
        Self::Pawn,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::King => "KING",
            Self::Advisor => "ADVISOR",
            Self::Elephant => "ELEPHANT",
            Self::Knight => "KNIGHT",
            Self::Rook => "ROOK",
            Self::Cannon => "CANNON",
            Self::Pawn => "PAWN",
        }
    }

    const fn fen_char(self) -> char {
        match self {
            Self::King => 'k',
            Self::Advisor => 'a',
            Self::Elephant => 'b',
            Self::Knight => 'n',
            Self::Rook => 'r',
            Self::Cannon => 'c',
            Self::Pawn => 'p',
        }
    }

    const fn from_fen_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'k' => Some(Self::King),
            'a' => Some(Self::Advisor),
            'b' | 'e' => Some(Self::Elephant),
            'n' | 'h' => Some(Self::Knight),
            'r' => Some(Self::Rook),
            'c' => Some(Self::Cannon),
            'p' => Some(Self::Pawn),
            _ => None,
        }
    }
}

impl FromStr for PieceType {
    type Err = UnknownPieceType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|pt| pt.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownPieceType(s.to_string()))
    }
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A board intersection. `x` is the file (0-8, left to right), `y` the rank
/// (0-9, BLACK's back rank at the top).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i8,
    pub y: i8,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid square notation: {0}")]
pub struct ParsePositionError(pub String);

impl Position {
    #[must_use]
    pub const fn new(x: i8, y: i8) -> Self {
        Self { x, y }
    }

    pub const fn is_valid(self) -> bool {
        self.x >= 0 && self.x < BOARD_WIDTH && self.y >= 0 && self.y < BOARD_HEIGHT
    }

    /// Mailbox index (`y * 9 + x`), `None` when off the board.
    #[allow(clippy::cast_sign_loss)]
    pub const fn index(self) -> Option<usize> {
        if self.is_valid() {
            Some(self.y as usize * BOARD_WIDTH as usize + self.x as usize)
        } else {
            None
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    #[must_use]
    pub const fn from_index(sq: usize) -> Self {
        Self {
            x: (sq % BOARD_WIDTH as usize) as i8,
            y: (sq / BOARD_WIDTH as usize) as i8,
        }
    }

    #[must_use]
    pub const fn offset(self, dx: i8, dy: i8) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Every square of the board, row by row.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..SQUARE_COUNT).map(Self::from_index)
    }
}

impl fmt::Display for Position {
    #[allow(clippy::cast_sign_loss)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match FILES.get(self.x as usize) {
            Some(file) if self.is_valid() => write!(f, "{file}{}", self.y),
            _ => write!(f, "({},{})", self.x, self.y),
        }
    }
}

impl FromStr for Position {
    type Err = ParsePositionError;

    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParsePositionError(s.to_string());
        let mut chars = s.chars();
        let (Some(file), Some(rank), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(err());
        };
        let x = FILES
            .iter()
            .position(|&f| f == file.to_ascii_lowercase())
            .ok_or_else(err)?;
        let y = rank.to_digit(10).ok_or_else(err)?;
        Ok(Self::new(x as i8, y as i8))
    }
}

/// A piece together with the square it stands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub color: Color,
    pub piece_type: PieceType,
    pub position: Position,
}

impl Piece {
    #[must_use]
    pub const fn new(color: Color, piece_type: PieceType, position: Position) -> Self {
        Self {
            color,
            piece_type,
            position,
        }
    }

    /// Copy of this piece standing on `position`.
    #[must_use]
    pub const fn at(self, position: Position) -> Self {
        Self { position, ..self }
    }

    pub const fn has_crossed_river(&self) -> bool {
        match self.color {
            Color::Red => self.position.y < 5,
            Color::Black => self.position.y > 4,
        }
    }

    pub const fn material_value(&self) -> i32 {
        if matches!(self.piece_type, PieceType::Pawn) && self.has_crossed_river() {
            VAL_PAWN_CROSSED
        } else {
            get_piece_value(self.piece_type)
        }
    }

    pub fn can_move_to(&self, board: &Board, to: Position) -> bool {
        rules::can_move_to(board, self, to)
    }

    const fn fen_char(&self) -> char {
        let c = self.piece_type.fen_char();
        match self.color {
            Color::Red => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenError {
    #[error("expected 10 ranks, found {0}")]
    RankCount(usize),
    #[error("rank {rank} describes {width} files instead of 9")]
    RankWidth { rank: usize, width: usize },
    #[error("invalid piece letter '{0}'")]
    InvalidPiece(char),
    #[error("invalid side to move '{0}'")]
    InvalidTurn(String),
}

/// Dense 10x9 grid with a cached king location per side and an incrementally
/// maintained 32-bit Zobrist hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    grid: [Option<Piece>; SQUARE_COUNT],
    red_king: Option<Position>,
    black_king: Option<Position>,
    hash: u32,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Standard starting position.
    #[must_use]
    pub fn new() -> Self {
        let mut board = Self::empty();
        board.setup_initial_position();
        board
    }

    #[must_use]
    pub const fn empty() -> Self {
        Self {
            grid: [None; SQUARE_COUNT],
            red_king: None,
            black_king: None,
            hash: 0,
        }
    }

    fn setup_initial_position(&mut self) {
        // Black (top, rows 0-3)
        self.setup_pieces(Color::Black, 0, 2, 3);

        // Red (bottom, rows 9-6)
        self.setup_pieces(Color::Red, 9, 7, 6);
    }

    fn setup_pieces(&mut self, color: Color, back_row: i8, cannon_row: i8, pawn_row: i8) {
        let back = [
            PieceType::Rook,
            PieceType::Knight,
            PieceType::Elephant,
            PieceType::Advisor,
            PieceType::King,
            PieceType::Advisor,
            PieceType::Elephant,
            PieceType::Knight,
            PieceType::Rook,
        ];

        for (x, pt) in (0..BOARD_WIDTH).zip(back) {
            self.place(color, pt, Position::new(x, back_row));
        }

        self.place(color, PieceType::Cannon, Position::new(1, cannon_row));
        self.place(color, PieceType::Cannon, Position::new(7, cannon_row));

        for x in (0..BOARD_WIDTH).step_by(2) {
            self.place(color, PieceType::Pawn, Position::new(x, pawn_row));
        }
    }

    /// Shorthand for `set_piece(pos, Some(Piece::new(color, piece_type, pos)))`.
    pub fn place(&mut self, color: Color, piece_type: PieceType, pos: Position) {
        self.set_piece(pos, Some(Piece::new(color, piece_type, pos)));
    }

    pub fn get_piece(&self, pos: Position) -> Option<Piece> {
        pos.index().and_then(|sq| self.grid.get(sq).copied().flatten())
    }

    pub fn is_occupied(&self, pos: Position) -> bool {
        self.get_piece(pos).is_some()
    }

    /// Places `piece` (or clears the square for `None`), toggling the hash
    /// contribution of whatever was removed and whatever was placed. The stored
    /// piece is repositioned onto `pos`. Off-board positions are ignored.
    pub fn set_piece(&mut self, pos: Position, piece: Option<Piece>) {
        let Some(slot) = pos.index().and_then(|sq| self.grid.get_mut(sq)) else {
            return;
        };
        let keys = ZobristKeys::get();

        if let Some(old) = slot.take() {
            self.hash ^= keys.piece_key(old.piece_type, old.color, pos);
            if old.piece_type == PieceType::King {
                let cached = match old.color {
                    Color::Red => &mut self.red_king,
                    Color::Black => &mut self.black_king,
                };
                if *cached == Some(pos) {
                    *cached = None;
                }
            }
        }

        if let Some(new) = piece {
            let new = new.at(pos);
            self.hash ^= keys.piece_key(new.piece_type, new.color, pos);
            if new.piece_type == PieceType::King {
                match new.color {
                    Color::Red => self.red_king = Some(pos),
                    Color::Black => self.black_king = Some(pos),
                }
            }
            *slot = Some(new);
        }
    }

    pub const fn king_position(&self, color: Color) -> Option<Position> {
        match color {
            Color::Red => self.red_king,
            Color::Black => self.black_king,
        }
    }

    /// Occupied squares in row-major order.
    pub fn pieces(&self) -> impl Iterator<Item = Piece> + '_ {
        self.grid.iter().flatten().copied()
    }

    pub fn all_pieces(&self) -> Vec<Piece> {
        self.pieces().collect()
    }

    pub fn pieces_by_color(&self, color: Color) -> Vec<Piece> {
        self.pieces().filter(|p| p.color == color).collect()
    }

    pub const fn hash(&self) -> u32 {
        self.hash
    }

    /// Overwrites the hash verbatim. Used when rebuilding a board from a
    /// snapshot whose sender is trusted to keep hash and pieces consistent.
    pub fn set_hash(&mut self, hash: u32) {
        self.hash = hash;
    }

    /// Hash computed by scanning the whole grid.
    pub fn recompute_hash(&self) -> u32 {
        let keys = ZobristKeys::get();
        self.pieces().fold(0, |hash, p| {
            hash ^ keys.piece_key(p.piece_type, p.color, p.position)
        })
    }

    /// Resets the incremental hash to the scanned value.
    pub fn refresh_hash(&mut self) {
        self.hash = self.recompute_hash();
    }

    pub fn to_fen_string(&self, turn: Color) -> String {
        let mut fen = String::new();
        for y in 0..BOARD_HEIGHT {
            let mut empty_count = 0;
            for x in 0..BOARD_WIDTH {
                if let Some(piece) = self.get_piece(Position::new(x, y)) {
                    if empty_count > 0 {
                        fen.push_str(&empty_count.to_string());
                        empty_count = 0;
                    }
                    fen.push(piece.fen_char());
                } else {
                    empty_count += 1;
                }
            }
            if empty_count > 0 {
                fen.push_str(&empty_count.to_string());
            }
            if y < BOARD_HEIGHT - 1 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(if turn == Color::Red { 'w' } else { 'b' });
        fen
    }

    /// Parses the placement and side-to-move fields of a Xiangqi FEN string.
    /// A missing side-to-move field means RED.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn from_fen(fen: &str) -> Result<(Self, Color), FenError> {
        let mut fields = fen.split_whitespace();
        let placement = fields.next().unwrap_or_default();
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != BOARD_HEIGHT as usize {
            return Err(FenError::RankCount(ranks.len()));
        }

        let mut board = Self::empty();
        for (y, rank) in ranks.iter().enumerate() {
            let mut x = 0usize;
            for c in rank.chars() {
                if let Some(skip) = c.to_digit(10) {
                    x += skip as usize;
                    continue;
                }
                let pt = PieceType::from_fen_char(c).ok_or(FenError::InvalidPiece(c))?;
                let color = if c.is_ascii_uppercase() {
                    Color::Red
                } else {
                    Color::Black
                };
                if x < BOARD_WIDTH as usize {
                    board.place(color, pt, Position::new(x as i8, y as i8));
                }
                x += 1;
            }
            if x != BOARD_WIDTH as usize {
                return Err(FenError::RankWidth { rank: y, width: x });
            }
        }

        let turn = match fields.next() {
            None | Some("w" | "r") => Color::Red,
            Some("b") => Color::Black,
            Some(other) => return Err(FenError::InvalidTurn(other.to_string())),
        };

        Ok((board, turn))
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  ")?;
        for file in FILES {
            write!(f, " {file}")?;
        }
        writeln!(f)?;
        for y in 0..BOARD_HEIGHT {
            write!(f, "{y} ")?;
            for x in 0..BOARD_WIDTH {
                let c = self
                    .get_piece(Position::new(x, y))
                    .map_or('.', |p| p.fen_char());
                write!(f, " {c}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START_FEN: &str = "rnbakabnr/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C5C1/9/RNBAKABNR w";

    #[test]
    fn test_initial_setup() {
        let board = Board::new();
        let piece = board.get_piece(Position::new(4, 9)).unwrap();
        assert_eq!(piece.piece_type, PieceType::King);
        assert_eq!(piece.color, Color::Red);

        let piece = board.get_piece(Position::new(4, 0)).unwrap();
        assert_eq!(piece.piece_type, PieceType::King);
        assert_eq!(piece.color, Color::Black);

        assert_eq!(board.all_pieces().len(), 32);
        assert_eq!(board.pieces_by_color(Color::Red).len(), 16);
        assert_eq!(board.king_position(Color::Red), Some(Position::new(4, 9)));
        assert_eq!(board.king_position(Color::Black), Some(Position::new(4, 0)));
    }

    #[test]
    fn test_fen_generation() {
        let board = Board::new();
        assert_eq!(board.to_fen_string(Color::Red), START_FEN);
    }

    #[test]
    fn test_fen_parse_roundtrip_start() {
        let (board, turn) = Board::from_fen(START_FEN).unwrap();
        assert_eq!(turn, Color::Red);
        assert_eq!(board, Board::new());
    }

    #[test]
    fn test_fen_rejects_bad_input() {
        assert_eq!(Board::from_fen("9/9 w"), Err(FenError::RankCount(2)));
        assert!(matches!(
            Board::from_fen("rnbakabnr/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C5C1/9/RNBAKABN w"),
            Err(FenError::RankWidth { rank: 9, width: 8 })
        ));
        assert_eq!(
            Board::from_fen("rnbakabnx/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C5C1/9/RNBAKABNR w"),
            Err(FenError::InvalidPiece('x'))
        );
    }

    #[test]
    fn test_set_piece_hash_matches_scan() {
        let mut board = Board::new();
        assert_eq!(board.hash(), board.recompute_hash());

        // Overwrite one piece with another (two toggles).
        board.place(Color::Red, PieceType::Rook, Position::new(0, 0));
        assert_eq!(board.hash(), board.recompute_hash());

        // Clearing an empty square changes nothing.
        let before = board.hash();
        board.set_piece(Position::new(4, 4), None);
        assert_eq!(board.hash(), before);

        board.set_piece(Position::new(1, 7), None);
        assert_eq!(board.hash(), board.recompute_hash());
    }

    #[test]
    fn test_set_piece_out_of_bounds_is_noop() {
        let mut board = Board::new();
        let before = board.clone();
        board.place(Color::Red, PieceType::Rook, Position::new(9, 0));
        board.set_piece(Position::new(-1, 3), None);
        assert_eq!(board, before);
    }

    #[test]
    fn test_king_cache_follows_placements() {
        let mut board = Board::empty();
        board.place(Color::Red, PieceType::King, Position::new(4, 9));
        assert_eq!(board.king_position(Color::Red), Some(Position::new(4, 9)));

        board.set_piece(Position::new(4, 9), None);
        assert_eq!(board.king_position(Color::Red), None);

        board.place(Color::Black, PieceType::King, Position::new(3, 0));
        board.place(Color::Red, PieceType::Rook, Position::new(3, 0));
        assert_eq!(board.king_position(Color::Black), None);
    }

    #[test]
    fn test_clone_is_independent() {
        let original = Board::new();
        let mut copy = original.clone();
        copy.set_piece(Position::new(4, 9), None);
        copy.place(Color::Red, PieceType::King, Position::new(3, 8));

        assert_eq!(original.hash(), Board::new().hash());
        assert_eq!(original.king_position(Color::Red), Some(Position::new(4, 9)));
        assert_ne!(copy.hash(), original.hash());
    }

    #[test]
    fn test_stored_piece_takes_square_position() {
        let mut board = Board::empty();
        let stray = Piece::new(Color::Black, PieceType::Knight, Position::new(0, 0));
        board.set_piece(Position::new(2, 2), Some(stray));
        assert_eq!(
            board.get_piece(Position::new(2, 2)).map(|p| p.position),
            Some(Position::new(2, 2))
        );
    }

    #[test]
    fn test_position_notation() {
        assert_eq!(Position::new(4, 9).to_string(), "e9");
        assert_eq!("h7".parse::<Position>(), Ok(Position::new(7, 7)));
        assert!("z1".parse::<Position>().is_err());
        assert!("e10".parse::<Position>().is_err());
    }

    #[test]
    fn test_piece_type_from_str() {
        assert_eq!("KNIGHT".parse::<PieceType>(), Ok(PieceType::Knight));
        assert_eq!(
            "QUEEN".parse::<PieceType>(),
            Err(UnknownPieceType("QUEEN".to_string()))
        );
    }

    #[test]
    fn test_pawn_value_after_river() {
        let home = Piece::new(Color::Red, PieceType::Pawn, Position::new(0, 6));
        let crossed = home.at(Position::new(0, 4));
        assert!(!home.has_crossed_river());
        assert!(crossed.has_crossed_river());
        assert!(crossed.material_value() > home.material_value());
    }
}
