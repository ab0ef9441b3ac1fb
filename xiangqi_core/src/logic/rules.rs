use crate::engine::Move;
use crate::logic::board::{Board, Color, Piece, PieceType, Position};
use crate::logic::generator::MoveGenerator;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("square is off the board")]
    OutOfBounds,
    #[error("no piece on the source square")]
    NoPieceAtSource,
    #[error("piece belongs to the side not on move")]
    NotYourTurn,
    #[error("piece cannot move in that pattern")]
    InvalidMovePattern,
    #[error("path is blocked")]
    BlockedPath,
    #[error("target square holds a friendly piece")]
    TargetOccupiedByFriendly,
    #[error("piece must stay inside its palace")]
    PalaceRestriction,
    #[error("elephant cannot cross the river")]
    RiverRestriction,
    #[error("move leaves the king in check")]
    SelfCheck,
    #[error("move leaves the two kings facing each other")]
    FlyingGeneral,
    #[error("the game is already over")]
    GameOver,
}

/// Full validation of `from -> to` for the side `turn`: movement pattern,
/// then a simulated move to reject self-check and facing kings. Returns the
/// move as it would be applied.
pub fn is_valid_move(
    board: &Board,
    from: Position,
    to: Position,
    turn: Color,
) -> Result<Move, MoveError> {
    if !from.is_valid() || !to.is_valid() {
        return Err(MoveError::OutOfBounds);
    }
    let piece = board.get_piece(from).ok_or(MoveError::NoPieceAtSource)?;
    if piece.color != turn {
        return Err(MoveError::NotYourTurn);
    }

    validate_piece_move(board, &piece, to)?;

    let mv = Move::new(from, to, piece, board.get_piece(to));
    let mut next_board = board.clone();
    MoveGenerator::new().make_move(&mut next_board, &mv);

    let Some(king) = next_board.king_position(turn) else {
        return Err(MoveError::SelfCheck);
    };
    if is_square_attacked(&next_board, king, turn.opposite()) {
        return Err(MoveError::SelfCheck);
    }
    if is_flying_general(&next_board) {
        return Err(MoveError::FlyingGeneral);
    }

    Ok(mv)
}

/// Movement rule of a single piece, ignoring whether its own king ends up
/// exposed.
pub fn can_move_to(board: &Board, piece: &Piece, to: Position) -> bool {
    validate_piece_move(board, piece, to).is_ok()
}

pub fn validate_piece_move(board: &Board, piece: &Piece, to: Position) -> Result<(), MoveError> {
    if !to.is_valid() {
        return Err(MoveError::OutOfBounds);
    }
    let from = piece.position;
    if from == to {
        return Err(MoveError::InvalidMovePattern);
    }
    if board.get_piece(to).is_some_and(|target| target.color == piece.color) {
        return Err(MoveError::TargetOccupiedByFriendly);
    }

    match piece.piece_type {
        PieceType::King => validate_king(piece.color, from, to),
        PieceType::Advisor => validate_advisor(piece.color, from, to),
        PieceType::Elephant => validate_elephant(board, piece.color, from, to),
        PieceType::Knight => validate_knight(board, from, to),
        PieceType::Rook => validate_rook(board, from, to),
        PieceType::Cannon => validate_cannon(board, from, to),
        PieceType::Pawn => validate_pawn(piece, to),
    }
}

fn validate_king(color: Color, from: Position, to: Position) -> Result<(), MoveError> {
    let (dx, dy) = ((to.x - from.x).abs(), (to.y - from.y).abs());
    if dx + dy != 1 {
        return Err(MoveError::InvalidMovePattern);
    }
    if !is_in_palace(color, to) {
        return Err(MoveError::PalaceRestriction);
    }
    Ok(())
}

fn validate_advisor(color: Color, from: Position, to: Position) -> Result<(), MoveError> {
    let (dx, dy) = ((to.x - from.x).abs(), (to.y - from.y).abs());
    if dx != 1 || dy != 1 {
        return Err(MoveError::InvalidMovePattern);
    }
    if !is_in_palace(color, to) {
        return Err(MoveError::PalaceRestriction);
    }
    Ok(())
}

fn validate_elephant(
    board: &Board,
    color: Color,
    from: Position,
    to: Position,
) -> Result<(), MoveError> {
    let (dx, dy) = (to.x - from.x, to.y - from.y);
    if dx.abs() != 2 || dy.abs() != 2 {
        return Err(MoveError::InvalidMovePattern);
    }
    if !is_on_own_side(color, to) {
        return Err(MoveError::RiverRestriction);
    }
    // Elephant eye
    if board.is_occupied(from.offset(dx / 2, dy / 2)) {
        return Err(MoveError::BlockedPath);
    }
    Ok(())
}

fn validate_knight(board: &Board, from: Position, to: Position) -> Result<(), MoveError> {
    let (dx, dy) = (to.x - from.x, to.y - from.y);
    let leg = match (dx.abs(), dy.abs()) {
        (2, 1) => from.offset(dx / 2, 0),
        (1, 2) => from.offset(0, dy / 2),
        _ => return Err(MoveError::InvalidMovePattern),
    };
    if board.is_occupied(leg) {
        return Err(MoveError::BlockedPath);
    }
    Ok(())
}

fn validate_rook(board: &Board, from: Position, to: Position) -> Result<(), MoveError> {
    if from.x != to.x && from.y != to.y {
        return Err(MoveError::InvalidMovePattern);
    }
    if count_obstacles(board, from, to) > 0 {
        return Err(MoveError::BlockedPath);
    }
    Ok(())
}

fn validate_cannon(board: &Board, from: Position, to: Position) -> Result<(), MoveError> {
    if from.x != to.x && from.y != to.y {
        return Err(MoveError::InvalidMovePattern);
    }
    // Friendly targets were rejected earlier, so an occupied target is a capture.
    let screens_needed = usize::from(board.is_occupied(to));
    if count_obstacles(board, from, to) != screens_needed {
        return Err(MoveError::BlockedPath);
    }
    Ok(())
}

fn validate_pawn(piece: &Piece, to: Position) -> Result<(), MoveError> {
    let from = piece.position;
    let (dx, dy) = (to.x - from.x, to.y - from.y);
    let forward = piece.color.forward();

    if dx == 0 && dy == forward {
        return Ok(());
    }
    if dy == 0 && dx.abs() == 1 && piece.has_crossed_river() {
        return Ok(());
    }
    Err(MoveError::InvalidMovePattern)
}

pub const fn is_in_palace(color: Color, pos: Position) -> bool {
    if pos.x < 3 || pos.x > 5 {
        return false;
    }
    match color {
        Color::Red => pos.y >= 7 && pos.y <= 9,
        Color::Black => pos.y >= 0 && pos.y <= 2,
    }
}

pub const fn is_on_own_side(color: Color, pos: Position) -> bool {
    match color {
        Color::Red => pos.y >= 5,
        Color::Black => pos.y <= 4,
    }
}

/// Number of pieces strictly between two squares on the same rank or file.
pub fn count_obstacles(board: &Board, from: Position, to: Position) -> usize {
    let step_x = (to.x - from.x).signum();
    let step_y = (to.y - from.y).signum();
    let mut count = 0;
    let mut cur = from.offset(step_x, step_y);
    while cur != to && cur.is_valid() {
        if board.is_occupied(cur) {
            count += 1;
        }
        cur = cur.offset(step_x, step_y);
    }
    count
}

/// The two kings share a file with nothing between them.
pub fn is_flying_general(board: &Board) -> bool {
    let (Some(red), Some(black)) = (
        board.king_position(Color::Red),
        board.king_position(Color::Black),
    ) else {
        return false;
    };
    red.x == black.x && count_obstacles(board, red, black) == 0
}

/// Whether any piece of `by` could move onto `pos` under its movement rule.
pub fn is_square_attacked(board: &Board, pos: Position, by: Color) -> bool {
    board
        .pieces()
        .filter(|p| p.color == by)
        .any(|p| p.can_move_to(board, pos))
}

/// The king of `color` is attacked, or the kings face each other. A board
/// without that king is never in check.
pub fn is_in_check(board: &Board, color: Color) -> bool {
    let Some(king) = board.king_position(color) else {
        return false;
    };
    is_square_attacked(board, king, color.opposite()) || is_flying_general(board)
}

pub fn is_checkmate(board: &Board, color: Color) -> bool {
    is_in_check(board, color) && !MoveGenerator::new().has_legal_moves(board, color)
}

pub fn is_stalemate(board: &Board, color: Color) -> bool {
    !is_in_check(board, color) && !MoveGenerator::new().has_legal_moves(board, color)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(pieces: &[(Color, PieceType, (i8, i8))]) -> Board {
        let mut board = Board::empty();
        for &(color, pt, (x, y)) in pieces {
            board.place(color, pt, Position::new(x, y));
        }
        board
    }

    fn piece_at(board: &Board, x: i8, y: i8) -> Piece {
        board.get_piece(Position::new(x, y)).unwrap()
    }

    #[test]
    fn test_king_confined_to_palace() {
        let board = board_with(&[(Color::Red, PieceType::King, (3, 7))]);
        let king = piece_at(&board, 3, 7);
        assert!(king.can_move_to(&board, Position::new(4, 7)));
        assert!(king.can_move_to(&board, Position::new(3, 8)));
        assert_eq!(
            validate_piece_move(&board, &king, Position::new(2, 7)),
            Err(MoveError::PalaceRestriction)
        );
        assert_eq!(
            validate_piece_move(&board, &king, Position::new(4, 8)),
            Err(MoveError::InvalidMovePattern)
        );
    }

    #[test]
    fn test_advisor_diagonal_in_palace() {
        let board = board_with(&[(Color::Black, PieceType::Advisor, (4, 1))]);
        let advisor = piece_at(&board, 4, 1);
        for (x, y) in [(3, 0), (5, 0), (3, 2), (5, 2)] {
            assert!(advisor.can_move_to(&board, Position::new(x, y)));
        }
        assert!(!advisor.can_move_to(&board, Position::new(4, 2)));

        let board = board_with(&[(Color::Black, PieceType::Advisor, (5, 2))]);
        let advisor = piece_at(&board, 5, 2);
        assert_eq!(
            validate_piece_move(&board, &advisor, Position::new(6, 3)),
            Err(MoveError::PalaceRestriction)
        );
    }

    #[test]
    fn test_elephant_eye_and_river() {
        let mut board = board_with(&[(Color::Red, PieceType::Elephant, (2, 5))]);
        let elephant = piece_at(&board, 2, 5);
        assert!(elephant.can_move_to(&board, Position::new(4, 7)));
        assert_eq!(
            validate_piece_move(&board, &elephant, Position::new(4, 3)),
            Err(MoveError::RiverRestriction)
        );

        board.place(Color::Black, PieceType::Pawn, Position::new(3, 6));
        assert_eq!(
            validate_piece_move(&board, &elephant, Position::new(4, 7)),
            Err(MoveError::BlockedPath)
        );
    }

    #[test]
    fn test_knight_leg_block() {
        let mut board = board_with(&[(Color::Red, PieceType::Knight, (4, 5))]);
        let knight = piece_at(&board, 4, 5);
        assert!(knight.can_move_to(&board, Position::new(5, 3)));
        assert!(knight.can_move_to(&board, Position::new(6, 4)));

        // Leg for vertical jumps upward
        board.place(Color::Red, PieceType::Pawn, Position::new(4, 4));
        assert_eq!(
            validate_piece_move(&board, &knight, Position::new(5, 3)),
            Err(MoveError::BlockedPath)
        );
        assert!(knight.can_move_to(&board, Position::new(6, 4)));
    }

    #[test]
    fn test_rook_path() {
        let board = board_with(&[
            (Color::Red, PieceType::Rook, (0, 9)),
            (Color::Black, PieceType::Pawn, (0, 5)),
        ]);
        let rook = piece_at(&board, 0, 9);
        assert!(rook.can_move_to(&board, Position::new(0, 5)));
        assert!(rook.can_move_to(&board, Position::new(8, 9)));
        assert_eq!(
            validate_piece_move(&board, &rook, Position::new(0, 4)),
            Err(MoveError::BlockedPath)
        );
        assert_eq!(
            validate_piece_move(&board, &rook, Position::new(1, 8)),
            Err(MoveError::InvalidMovePattern)
        );
    }

    #[test]
    fn test_cannon_needs_exactly_one_screen_to_capture() {
        let mut board = board_with(&[
            (Color::Red, PieceType::Cannon, (1, 7)),
            (Color::Black, PieceType::Knight, (1, 0)),
        ]);
        let cannon = piece_at(&board, 1, 7);
        assert!(!cannon.can_move_to(&board, Position::new(1, 0)));

        board.place(Color::Black, PieceType::Cannon, Position::new(1, 2));
        assert!(cannon.can_move_to(&board, Position::new(1, 0)));
        assert!(!cannon.can_move_to(&board, Position::new(1, 1)));

        board.place(Color::Red, PieceType::Pawn, Position::new(1, 4));
        assert!(!cannon.can_move_to(&board, Position::new(1, 0)));
    }

    #[test]
    fn test_pawn_moves_sideways_only_after_river() {
        let board = board_with(&[
            (Color::Red, PieceType::Pawn, (4, 6)),
            (Color::Black, PieceType::Pawn, (2, 5)),
        ]);
        let red = piece_at(&board, 4, 6);
        assert!(red.can_move_to(&board, Position::new(4, 5)));
        assert!(!red.can_move_to(&board, Position::new(3, 6)));
        assert!(!red.can_move_to(&board, Position::new(4, 7)));

        let black = piece_at(&board, 2, 5);
        assert!(black.can_move_to(&board, Position::new(2, 6)));
        assert!(black.can_move_to(&board, Position::new(1, 5)));
        assert!(!black.can_move_to(&board, Position::new(2, 4)));
    }

    #[test]
    fn test_flying_general() {
        let mut board = board_with(&[
            (Color::Red, PieceType::King, (4, 9)),
            (Color::Black, PieceType::King, (4, 0)),
        ]);
        assert!(is_flying_general(&board));
        assert!(is_in_check(&board, Color::Red));
        assert!(is_in_check(&board, Color::Black));

        board.place(Color::Red, PieceType::Pawn, Position::new(4, 6));
        assert!(!is_flying_general(&board));
        assert!(!is_in_check(&board, Color::Red));
    }

    #[test]
    fn test_missing_king_is_not_in_check() {
        let board = board_with(&[(Color::Black, PieceType::Rook, (4, 0))]);
        assert!(!is_in_check(&board, Color::Red));
    }

    #[test]
    fn test_is_valid_move_rejects_self_check() {
        // Rook pinned on the king's file by a black rook.
        let board = board_with(&[
            (Color::Red, PieceType::King, (4, 9)),
            (Color::Red, PieceType::Rook, (4, 7)),
            (Color::Black, PieceType::Rook, (4, 2)),
            (Color::Black, PieceType::King, (3, 0)),
        ]);
        assert_eq!(
            is_valid_move(&board, Position::new(4, 7), Position::new(0, 7), Color::Red),
            Err(MoveError::SelfCheck)
        );
        assert!(is_valid_move(&board, Position::new(4, 7), Position::new(4, 2), Color::Red).is_ok());
        assert_eq!(
            is_valid_move(&board, Position::new(4, 2), Position::new(4, 3), Color::Red),
            Err(MoveError::NotYourTurn)
        );
        assert_eq!(
            is_valid_move(&board, Position::new(5, 5), Position::new(5, 4), Color::Red),
            Err(MoveError::NoPieceAtSource)
        );
    }

    #[test]
    fn test_is_valid_move_rejects_flying_general() {
        let board = board_with(&[
            (Color::Red, PieceType::King, (4, 9)),
            (Color::Red, PieceType::Pawn, (4, 6)),
            (Color::Black, PieceType::King, (4, 0)),
        ]);
        assert_eq!(
            is_valid_move(&board, Position::new(4, 6), Position::new(4, 5), Color::Red),
            Ok(Move::new(
                Position::new(4, 6),
                Position::new(4, 5),
                piece_at(&board, 4, 6),
                None
            ))
        );
        // Red king steps aside; kings no longer share a file.
        assert!(is_valid_move(&board, Position::new(4, 9), Position::new(3, 9), Color::Red).is_ok());

        let board = board_with(&[
            (Color::Red, PieceType::King, (3, 9)),
            (Color::Black, PieceType::King, (4, 0)),
        ]);
        assert_eq!(
            is_valid_move(&board, Position::new(3, 9), Position::new(4, 9), Color::Red),
            Err(MoveError::FlyingGeneral)
        );
    }

    #[test]
    fn test_pawn_screen_pin_counts_as_flying_general() {
        // Moving the only blocker sideways exposes the kings.
        let board = board_with(&[
            (Color::Red, PieceType::King, (4, 9)),
            (Color::Red, PieceType::Pawn, (4, 3)),
            (Color::Black, PieceType::King, (4, 0)),
        ]);
        assert_eq!(
            is_valid_move(&board, Position::new(4, 3), Position::new(3, 3), Color::Red),
            Err(MoveError::FlyingGeneral)
        );
    }
}
