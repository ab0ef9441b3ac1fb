use crate::logic::board::{Color, PieceType, Position, SQUARE_COUNT};
use std::sync::OnceLock;

// 7 piece types * 2 colors * 90 squares
const NUM_PIECE_TYPES: usize = 7;
const NUM_COLORS: usize = 2;
const TABLE_SIZE: usize = NUM_PIECE_TYPES * NUM_COLORS * SQUARE_COUNT;

const ZOBRIST_SEED: u64 = 123_456_789;

/// One random 32-bit key per (piece type, color, square). Generated once from
/// a fixed seed so hashes are reproducible across runs and threads.
pub struct ZobristKeys {
    piece_keys: [u32; TABLE_SIZE],
}

// Simple XorShift RNG for deterministic keys
struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    const fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}

static KEYS: OnceLock<ZobristKeys> = OnceLock::new();

impl ZobristKeys {
    #[allow(clippy::cast_possible_truncation)]
    fn generate() -> Self {
        let mut rng = XorShift64::new(ZOBRIST_SEED);
        let mut piece_keys = [0; TABLE_SIZE];
        for key in &mut piece_keys {
            // High half has better mixing than the low half.
            *key = (rng.next() >> 32) as u32;
        }
        Self { piece_keys }
    }

    /// Process-wide key table.
    pub fn get() -> &'static Self {
        KEYS.get_or_init(Self::generate)
    }

    /// Key for a piece on `pos`; zero for off-board squares.
    pub fn piece_key(&self, piece_type: PieceType, color: Color, pos: Position) -> u32 {
        pos.index()
            .map(|sq| (piece_type.index() * NUM_COLORS + color.index()) * SQUARE_COUNT + sq)
            .and_then(|idx| self.piece_keys.get(idx))
            .copied()
            .unwrap_or(0)
    }
}
