use crate::engine::config::EngineConfig;
use crate::engine::Move;
use crate::logic::board::SQUARE_COUNT;
use std::cmp::Reverse;
use std::sync::Arc;

const MAX_KILLER_DEPTH: usize = 64;

/// Killer and history heuristics plus the scoring that sorts moves with them.
/// Both tables live across searches until `clear` is called.
pub struct MoveOrdering {
    config: Arc<EngineConfig>,
    killer_moves: [[Option<Move>; 2]; MAX_KILLER_DEPTH],
    history_table: Box<[[i32; SQUARE_COUNT]]>,
}

impl MoveOrdering {
    pub fn new(config: Arc<EngineConfig>) -> Self {
        Self {
            config,
            killer_moves: [[None; 2]; MAX_KILLER_DEPTH],
            history_table: vec![[0; SQUARE_COUNT]; SQUARE_COUNT].into_boxed_slice(),
        }
    }

    pub fn update_config(&mut self, config: Arc<EngineConfig>) {
        self.config = config;
    }

    /// Sorts `moves` best-first. Equal scores keep generation order.
    pub fn order_moves(&self, moves: &mut [Move], depth: u8, tt_move: Option<&Move>) {
        moves.sort_by_cached_key(|mv| Reverse(self.score_move(mv, depth, tt_move)));
    }

    pub fn score_move(&self, mv: &Move, depth: u8, tt_move: Option<&Move>) -> i32 {
        if tt_move.is_some_and(|tt| tt.same_squares(mv)) {
            return self.config.score_hash_move;
        }

        let mut score = 0;
        if mv.is_capture() {
            score += self.config.score_capture_base + self.mvv_lva(mv);
        }
        if self.is_killer(mv, depth) {
            score += self.config.score_killer_move;
        }
        score + self.history_score(mv).min(self.config.score_history_max)
    }

    /// Most valuable victim, least valuable attacker.
    pub fn mvv_lva(&self, mv: &Move) -> i32 {
        mv.captured.map_or(0, |victim| {
            self.config.piece_type_value(victim.piece_type) * 100
                - self.config.piece_type_value(mv.piece.piece_type)
        })
    }

    /// Remembers a quiet move that caused a cutoff at `depth`. Newest first,
    /// two per depth, no duplicates.
    pub fn add_killer(&mut self, mv: &Move, depth: u8) {
        if mv.is_capture() {
            return;
        }
        if let Some(killers) = self.killer_moves.get_mut(usize::from(depth)) {
            if killers.iter().flatten().any(|k| k.same_squares(mv)) {
                return;
            }
            killers[1] = killers[0];
            killers[0] = Some(*mv);
        }
    }

    pub fn is_killer(&self, mv: &Move, depth: u8) -> bool {
        self.killer_moves
            .get(usize::from(depth))
            .is_some_and(|killers| killers.iter().flatten().any(|k| k.same_squares(mv)))
    }

    pub fn killers(&self, depth: u8) -> [Option<Move>; 2] {
        self.killer_moves
            .get(usize::from(depth))
            .copied()
            .unwrap_or([None; 2])
    }

    pub fn update_history(&mut self, mv: &Move, depth: u8) {
        if let Some(slot) = self.history_slot_mut(mv) {
            let bonus = i32::from(depth) * i32::from(depth);
            *slot = slot.saturating_add(bonus);
        }
    }

    pub fn history_score(&self, mv: &Move) -> i32 {
        match (mv.from.index(), mv.to.index()) {
            (Some(from), Some(to)) => self
                .history_table
                .get(from)
                .and_then(|row| row.get(to))
                .copied()
                .unwrap_or(0),
            _ => 0,
        }
    }

    fn history_slot_mut(&mut self, mv: &Move) -> Option<&mut i32> {
        let (from, to) = (mv.from.index()?, mv.to.index()?);
        self.history_table.get_mut(from)?.get_mut(to)
    }

    pub fn clear(&mut self) {
        self.killer_moves = [[None; 2]; MAX_KILLER_DEPTH];
        for row in self.history_table.iter_mut() {
            row.fill(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::board::{Color, Piece, PieceType, Position};

    fn ordering() -> MoveOrdering {
        MoveOrdering::new(Arc::new(EngineConfig::default()))
    }

    fn quiet(from: (i8, i8), to: (i8, i8)) -> Move {
        let from = Position::new(from.0, from.1);
        Move::new(
            from,
            Position::new(to.0, to.1),
            Piece::new(Color::Red, PieceType::Rook, from),
            None,
        )
    }

    fn capture(attacker: PieceType, victim: PieceType) -> Move {
        let from = Position::new(0, 5);
        let to = Position::new(0, 2);
        Move::new(
            from,
            to,
            Piece::new(Color::Red, attacker, from),
            Some(Piece::new(Color::Black, victim, to)),
        )
    }

    #[test]
    fn test_mvv_lva_prefers_valuable_victims() {
        let order = ordering();
        let pawn_takes_rook = capture(PieceType::Pawn, PieceType::Rook);
        let rook_takes_rook = capture(PieceType::Rook, PieceType::Rook);
        let rook_takes_pawn = capture(PieceType::Rook, PieceType::Pawn);
        assert_eq!(order.mvv_lva(&pawn_takes_rook), 1200 * 100 - 100);
        assert!(order.mvv_lva(&pawn_takes_rook) > order.mvv_lva(&rook_takes_rook));
        assert!(order.mvv_lva(&rook_takes_rook) > order.mvv_lva(&rook_takes_pawn));
    }

    #[test]
    fn test_hash_move_first_then_captures_then_killers() {
        let mut order = ordering();
        let killer = quiet((0, 9), (0, 8));
        let plain = quiet((8, 9), (8, 8));
        let tt_move = quiet((8, 9), (8, 7));
        let cap = capture(PieceType::Rook, PieceType::Pawn);
        order.add_killer(&killer, 3);

        let mut moves = vec![plain, killer, cap, tt_move];
        order.order_moves(&mut moves, 3, Some(&tt_move));
        assert_eq!(moves, vec![tt_move, cap, killer, plain]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_scores() {
        let order = ordering();
        let a = quiet((0, 9), (0, 8));
        let b = quiet((0, 9), (0, 7));
        let c = quiet((8, 9), (8, 8));
        let mut moves = vec![a, b, c];
        order.order_moves(&mut moves, 1, None);
        assert_eq!(moves, vec![a, b, c]);
    }

    #[test]
    fn test_killers_skip_captures_and_duplicates() {
        let mut order = ordering();
        let first = quiet((0, 9), (0, 8));
        let second = quiet((8, 9), (8, 8));
        let third = quiet((8, 9), (8, 7));

        order.add_killer(&capture(PieceType::Rook, PieceType::Pawn), 2);
        assert_eq!(order.killers(2), [None, None]);

        order.add_killer(&first, 2);
        order.add_killer(&first, 2);
        assert_eq!(order.killers(2), [Some(first), None]);

        order.add_killer(&second, 2);
        order.add_killer(&third, 2);
        assert_eq!(order.killers(2), [Some(third), Some(second)]);
        assert!(!order.is_killer(&first, 2));
        assert!(!order.is_killer(&third, 1));
    }

    #[test]
    fn test_history_grows_by_depth_squared_and_is_capped() {
        let mut order = ordering();
        let mv = quiet((0, 9), (0, 8));
        order.update_history(&mv, 3);
        order.update_history(&mv, 2);
        assert_eq!(order.history_score(&mv), 13);
        assert_eq!(order.score_move(&mv, 5, None), 13);

        for _ in 0..20_000 {
            order.update_history(&mv, 10);
        }
        assert_eq!(order.score_move(&mv, 5, None), 400_000);

        order.clear();
        assert_eq!(order.history_score(&mv), 0);
    }
}
