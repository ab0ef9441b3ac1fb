use crate::engine::Move;
use crate::logic::board::{Board, Color, Piece, Position};
use crate::logic::rules::{is_flying_general, is_square_attacked};

/// Legal move generation by full board scan: every piece of the side is tried
/// against every square, and each candidate is played on a scratch board to
/// reject moves that expose the own king.
#[derive(Debug, Default, Clone, Copy)]
pub struct MoveGenerator;

impl MoveGenerator {
    pub const fn new() -> Self {
        Self
    }

    pub fn generate_legal_moves(&self, board: &Board, color: Color) -> Vec<Move> {
        let mut moves = Vec::with_capacity(64);
        let mut scratch = board.clone();
        for piece in board.pieces().filter(|p| p.color == color) {
            for mv in Self::pseudo_legal_moves(board, piece) {
                if self.is_legal_on(&mut scratch, &mv) {
                    moves.push(mv);
                }
            }
        }
        moves
    }

    /// Legal moves that capture something.
    pub fn generate_capture_moves(&self, board: &Board, color: Color) -> Vec<Move> {
        let mut moves = self.generate_legal_moves(board, color);
        moves.retain(Move::is_capture);
        moves
    }

    /// Stops at the first legal move found.
    pub fn has_legal_moves(&self, board: &Board, color: Color) -> bool {
        let mut scratch = board.clone();
        board
            .pieces()
            .filter(|p| p.color == color)
            .flat_map(|piece| Self::pseudo_legal_moves(board, piece))
            .any(|mv| self.is_legal_on(&mut scratch, &mv))
    }

    /// `mv` obeys the piece's movement rule and does not leave its own king
    /// attacked or facing the other king.
    pub fn is_legal_move(&self, board: &Board, mv: &Move) -> bool {
        if board.get_piece(mv.from) != Some(mv.piece) || !mv.piece.can_move_to(board, mv.to) {
            return false;
        }
        let mut scratch = board.clone();
        self.is_legal_on(&mut scratch, mv)
    }

    pub fn make_move(&self, board: &mut Board, mv: &Move) {
        board.set_piece(mv.from, None);
        board.set_piece(mv.to, Some(mv.piece));
    }

    pub fn undo_move(&self, board: &mut Board, mv: &Move) {
        board.set_piece(mv.to, mv.captured);
        board.set_piece(mv.from, Some(mv.piece));
    }

    fn pseudo_legal_moves(board: &Board, piece: Piece) -> impl Iterator<Item = Move> + '_ {
        Position::all()
            .filter(move |&to| piece.can_move_to(board, to))
            .map(move |to| Move::new(piece.position, to, piece, board.get_piece(to)))
    }

    /// Plays `mv` on `scratch`, inspects the result and takes it back, leaving
    /// `scratch` as it was. A side without a king has no legal moves.
    fn is_legal_on(&self, scratch: &mut Board, mv: &Move) -> bool {
        let color = mv.piece.color;
        self.make_move(scratch, mv);
        let legal = scratch.king_position(color).is_some_and(|king| {
            !is_square_attacked(scratch, king, color.opposite()) && !is_flying_general(scratch)
        });
        self.undo_move(scratch, mv);
        legal
    }
}
