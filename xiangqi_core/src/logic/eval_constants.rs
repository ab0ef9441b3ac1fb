use crate::logic::board::{Color, PieceType, Position};

// Material values
pub const VAL_KING: i32 = 10000;
pub const VAL_ROOK: i32 = 1200;
pub const VAL_CANNON: i32 = 650;
pub const VAL_KNIGHT: i32 = 600;
pub const VAL_ADVISOR: i32 = 250;
pub const VAL_ELEPHANT: i32 = 250;
pub const VAL_PAWN: i32 = 100;
pub const VAL_PAWN_CROSSED: i32 = 200;

// Piece-square tables, indexed [rank][file] where rank 0 is the owner's back
// rank and rank 9 the opponent's. Both sides read the same table.

#[rustfmt::skip]
pub const PST_PAWN: [[i32; 9]; 10] = [
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,  -2,   0,   4,   0,  -2,   0,   0], // Start row
    [  2,   0,   8,   0,   8,   0,   8,   0,   2], // Own river bank
    [ 10,  18,  22,  35,  40,  35,  22,  18,  10], // Crossed
    [ 20,  27,  30,  40,  42,  40,  30,  27,  20],
    [ 20,  30,  45,  55,  55,  55,  45,  30,  20],
    [ 20,  30,  50,  65,  70,  65,  50,  30,  20],
    [  0,   3,   6,   9,  12,   9,   6,   3,   0], // Opponent back rank
];

#[rustfmt::skip]
pub const PST_KNIGHT: [[i32; 9]; 10] = [
    [  0, -10,   0,   0,   0,   0,   0, -10,   0],
    [  0,   5,  15,   5,   5,   5,  15,   5,   0],
    [  5,   5,  10,  10,  10,  10,  10,   5,   5],
    [  5,  10,  15,  20,  20,  20,  15,  10,   5],
    [  5,  10,  15,  20,  20,  20,  15,  10,   5],
    [  5,  10,  20,  25,  25,  25,  20,  10,   5],
    [  5,  10,  20,  25,  25,  25,  20,  10,   5],
    [  5,  10,  10,  15,  15,  15,  10,  10,   5],
    [  0,   5,   5,  10,  15,  10,   5,   5,   0],
    [  0, -10,   0,   0,   0,   0,   0, -10,   0],
];

#[rustfmt::skip]
pub const PST_ROOK: [[i32; 9]; 10] = [
    [ -5,   5,   0,  10,   0,  10,   0,   5,  -5],
    [  0,  10,   0,  10,   0,  10,   0,  10,   0],
    [  0,   5,   0,  10,  10,  10,   0,   5,   0],
    [  0,   5,   5,  10,  10,  10,   5,   5,   0],
    [  5,  10,  10,  15,  15,  15,  10,  10,   5],
    [  5,  10,  10,  15,  15,  15,  10,  10,   5],
    [  5,  10,  10,  15,  15,  15,  10,  10,   5],
    [ 10,  15,  15,  20,  20,  20,  15,  15,  10],
    [ 10,  20,  20,  20,  20,  20,  20,  20,  10], // Controls the opponent palace rank
    [  5,  10,  10,  15,  15,  15,  10,  10,   5],
];

#[rustfmt::skip]
pub const PST_CANNON: [[i32; 9]; 10] = [
    [  0,   0,   5,   5,   5,   5,   5,   0,   0],
    [  0,   5,   0,   0,   0,   0,   0,   5,   0],
    [  5,   5,   5,  10,  15,  10,   5,   5,   5], // Cannon row
    [  0,   0,   0,   0,   5,   0,   0,   0,   0],
    [  0,   0,   0,   0,   5,   0,   0,   0,   0],
    [  0,   5,   0,   0,   5,   0,   0,   5,   0],
    [  0,   0,   0,   0,   5,   0,   0,   0,   0],
    [ 10,  10,  10,  10,  15,  10,  10,  10,  10],
    [ 10,  10,  10,  10,  10,  10,  10,  10,  10],
    [  0,   0,   0,   5,  10,   5,   0,   0,   0],
];

pub const fn get_piece_value(pt: PieceType) -> i32 {
    match pt {
        PieceType::King => VAL_KING,
        PieceType::Advisor => VAL_ADVISOR,
        PieceType::Elephant => VAL_ELEPHANT,
        PieceType::Knight => VAL_KNIGHT,
        PieceType::Rook => VAL_ROOK,
        PieceType::Cannon => VAL_CANNON,
        PieceType::Pawn => VAL_PAWN,
    }
}

/// Positional bonus for `pt` of `color` standing on `pos`.
#[allow(clippy::cast_sign_loss)]
pub fn get_pst_value(pt: PieceType, color: Color, pos: Position) -> i32 {
    if !pos.is_valid() {
        return 0;
    }
    let rank = match color {
        Color::Red => (9 - pos.y) as usize,
        Color::Black => pos.y as usize,
    };
    let file = pos.x as usize;

    let table = match pt {
        PieceType::Pawn => &PST_PAWN,
        PieceType::Knight => &PST_KNIGHT,
        PieceType::Rook => &PST_ROOK,
        PieceType::Cannon => &PST_CANNON,
        PieceType::King | PieceType::Advisor | PieceType::Elephant => return 0,
    };
    table
        .get(rank)
        .and_then(|row| row.get(file))
        .copied()
        .unwrap_or(0)
}
