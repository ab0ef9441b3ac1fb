use crate::engine::config::EngineConfig;
use crate::engine::Evaluator;
use crate::logic::board::{Board, Color};
use crate::logic::eval_constants::get_pst_value;
use std::sync::Arc;

/// Material plus a scaled piece-square bonus.
pub struct SimpleEvaluator {
    config: Arc<EngineConfig>,
    positional_percent: i32,
}

impl SimpleEvaluator {
    pub fn new(config: Arc<EngineConfig>) -> Self {
        let positional_percent = config.positional_weight_percent;
        Self {
            config,
            positional_percent,
        }
    }

    /// Keeps only `accuracy` (0.0-1.0) of the positional term. Weaker levels
    /// see the board mostly as material.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    #[must_use]
    pub fn with_accuracy(mut self, accuracy: f32) -> Self {
        let accuracy = accuracy.clamp(0.0, 1.0);
        self.positional_percent =
            (self.config.positional_weight_percent as f32 * accuracy).round() as i32;
        self
    }

    pub const fn positional_percent(&self) -> i32 {
        self.positional_percent
    }
}

impl Evaluator for SimpleEvaluator {
    fn evaluate(&self, board: &Board, color: Color) -> i32 {
        let red_score: i32 = board
            .pieces()
            .map(|piece| {
                let positional =
                    get_pst_value(piece.piece_type, piece.color, piece.position)
                        * self.positional_percent
                        / 100;
                let value = self.config.piece_value(&piece) + positional;
                match piece.color {
                    Color::Red => value,
                    Color::Black => -value,
                }
            })
            .sum();

        match color {
            Color::Red => red_score,
            Color::Black => -red_score,
        }
    }
}
