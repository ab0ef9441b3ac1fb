use crate::engine::CHECKMATE_SCORE;
use crate::logic::board::{Piece, PieceType};
use crate::logic::eval_constants::{
    VAL_ADVISOR, VAL_CANNON, VAL_ELEPHANT, VAL_KING, VAL_KNIGHT, VAL_PAWN, VAL_PAWN_CROSSED,
    VAL_ROOK,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // Evaluation Parameters
    pub val_pawn: i32,
    pub val_pawn_crossed: i32,
    pub val_advisor: i32,
    pub val_elephant: i32,
    pub val_knight: i32,
    pub val_cannon: i32,
    pub val_rook: i32,
    pub val_king: i32,
    pub positional_weight_percent: i32,

    // Search Parameters
    pub score_hash_move: i32,
    pub score_capture_base: i32,
    pub score_killer_move: i32,
    pub score_history_max: i32,
    pub quiescence_depth: u8,
    pub tt_capacity: usize,
    pub mate_score: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            val_pawn: VAL_PAWN,
            val_pawn_crossed: VAL_PAWN_CROSSED,
            val_advisor: VAL_ADVISOR,
            val_elephant: VAL_ELEPHANT,
            val_knight: VAL_KNIGHT,
            val_cannon: VAL_CANNON,
            val_rook: VAL_ROOK,
            val_king: VAL_KING,
            positional_weight_percent: 20,

            score_hash_move: 10_000_000,
            score_capture_base: 1_000_000,
            score_killer_move: 500_000,
            score_history_max: 400_000,
            quiescence_depth: 4,
            tt_capacity: 1_000_000,
            mate_score: CHECKMATE_SCORE,
        }
    }
}

#[derive(Deserialize)]
struct EngineConfigJson {
    val_pawn: Option<f32>,
    val_pawn_crossed: Option<f32>,
    val_advisor: Option<f32>,
    val_elephant: Option<f32>,
    val_knight: Option<f32>,
    val_cannon: Option<f32>,
    val_rook: Option<f32>,
    val_king: Option<f32>,
    positional_weight_percent: Option<i32>,

    score_hash_move: Option<f32>,
    score_capture_base: Option<f32>,
    score_killer_move: Option<f32>,
    score_history_max: Option<f32>,
    quiescence_depth: Option<u8>,
    tt_capacity: Option<usize>,
    mate_score: Option<i32>,
}

impl EngineConfig {
    /// Reads a tuning file where piece values and ordering bonuses are
    /// multipliers of the defaults and the remaining fields are absolute.
    pub fn load_from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        let json_config: EngineConfigJson = serde_json::from_str(json_str)?;
        let default = Self::default();

        Ok(Self {
            val_pawn: apply_scale(default.val_pawn, json_config.val_pawn),
            val_pawn_crossed: apply_scale(default.val_pawn_crossed, json_config.val_pawn_crossed),
            val_advisor: apply_scale(default.val_advisor, json_config.val_advisor),
            val_elephant: apply_scale(default.val_elephant, json_config.val_elephant),
            val_knight: apply_scale(default.val_knight, json_config.val_knight),
            val_cannon: apply_scale(default.val_cannon, json_config.val_cannon),
            val_rook: apply_scale(default.val_rook, json_config.val_rook),
            val_king: apply_scale(default.val_king, json_config.val_king),
            positional_weight_percent: json_config
                .positional_weight_percent
                .unwrap_or(default.positional_weight_percent),

            score_hash_move: apply_scale(default.score_hash_move, json_config.score_hash_move),
            score_capture_base: apply_scale(
                default.score_capture_base,
                json_config.score_capture_base,
            ),
            score_killer_move: apply_scale(
                default.score_killer_move,
                json_config.score_killer_move,
            ),
            score_history_max: apply_scale(
                default.score_history_max,
                json_config.score_history_max,
            ),
            quiescence_depth: json_config
                .quiescence_depth
                .unwrap_or(default.quiescence_depth),
            tt_capacity: json_config.tt_capacity.unwrap_or(default.tt_capacity),
            mate_score: json_config.mate_score.unwrap_or(default.mate_score),
        })
    }

    pub const fn piece_type_value(&self, pt: PieceType) -> i32 {
        match pt {
            PieceType::King => self.val_king,
            PieceType::Advisor => self.val_advisor,
            PieceType::Elephant => self.val_elephant,
            PieceType::Knight => self.val_knight,
            PieceType::Rook => self.val_rook,
            PieceType::Cannon => self.val_cannon,
            PieceType::Pawn => self.val_pawn,
        }
    }

    /// Material value including the bonus of a pawn past the river.
    pub const fn piece_value(&self, piece: &Piece) -> i32 {
        if matches!(piece.piece_type, PieceType::Pawn) && piece.has_crossed_river() {
            self.val_pawn_crossed
        } else {
            self.piece_type_value(piece.piece_type)
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn apply_scale(default_val: i32, scale: Option<f32>) -> i32 {
    scale.map_or(default_val, |s| (default_val as f32 * s) as i32)
}

/// Per-search knobs chosen by a difficulty level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyConfig {
    pub search_depth: u8,
    pub use_transposition_table: bool,
    pub use_move_ordering: bool,
    /// Fraction of the positional term kept by the evaluator (0.0-1.0).
    pub evaluation_accuracy: f32,
    /// Probability of playing one of the first few legal moves at random.
    pub randomness: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown difficulty: {0}")]
pub struct UnknownDifficulty(pub String);

impl Difficulty {
    pub const ALL: [Self; 3] = [Self::Easy, Self::Medium, Self::Hard];

    pub const fn config(self) -> DifficultyConfig {
        match self {
            Self::Easy => DifficultyConfig {
                search_depth: 2,
                use_transposition_table: false,
                use_move_ordering: false,
                evaluation_accuracy: 0.7,
                randomness: 0.3,
            },
            Self::Medium => DifficultyConfig {
                search_depth: 3,
                use_transposition_table: true,
                use_move_ordering: true,
                evaluation_accuracy: 0.9,
                randomness: 0.1,
            },
            Self::Hard => DifficultyConfig {
                search_depth: 4,
                use_transposition_table: true,
                use_move_ordering: true,
                evaluation_accuracy: 1.0,
                randomness: 0.0,
            },
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "EASY",
            Self::Medium => "MEDIUM",
            Self::Hard => "HARD",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = UnknownDifficulty;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownDifficulty(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::board::{Color, Position};

    #[test]
    fn test_load_config_default() {
        let json = "{}";
        let config = EngineConfig::load_from_json(json).unwrap();
        assert_eq!(config.val_pawn, VAL_PAWN);
        assert_eq!(config.score_hash_move, 10_000_000);
        assert_eq!(config.tt_capacity, 1_000_000);
    }

    #[test]
    fn test_load_config_scaled() {
        let json = r#"{
            "val_knight": 1.5,
            "score_hash_move": 0.5
        }"#;
        let config = EngineConfig::load_from_json(json).unwrap();
        assert_eq!(config.val_knight, 900);
        assert_eq!(config.score_hash_move, 5_000_000);
        assert_eq!(config.val_rook, VAL_ROOK);
    }

    #[test]
    fn test_load_config_absolute_fields() {
        let json = r#"{
            "quiescence_depth": 2,
            "tt_capacity": 5000,
            "positional_weight_percent": 0
        }"#;
        let config = EngineConfig::load_from_json(json).unwrap();
        assert_eq!(config.quiescence_depth, 2);
        assert_eq!(config.tt_capacity, 5000);
        assert_eq!(config.positional_weight_percent, 0);
    }

    #[test]
    fn test_load_config_invalid_json() {
        let result = EngineConfig::load_from_json("{ invalid json }");
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_absolute_config() {
        let json = r#"{
            "val_pawn": 123,
            "val_king": 9999
        }"#;

        let config: EngineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.val_pawn, 123);
        assert_eq!(config.val_king, 9999);
        assert_eq!(config.val_rook, VAL_ROOK);
    }

    #[test]
    fn test_piece_value_counts_crossed_pawn() {
        let config = EngineConfig::default();
        let pawn = Piece::new(Color::Black, PieceType::Pawn, Position::new(4, 3));
        assert_eq!(config.piece_value(&pawn), VAL_PAWN);
        assert_eq!(
            config.piece_value(&pawn.at(Position::new(4, 5))),
            VAL_PAWN_CROSSED
        );
    }

    #[test]
    fn test_difficulty_levels() {
        let easy = Difficulty::Easy.config();
        assert_eq!(easy.search_depth, 2);
        assert!(!easy.use_transposition_table);
        assert!(!easy.use_move_ordering);

        let hard = Difficulty::Hard.config();
        assert_eq!(hard.search_depth, 4);
        assert!(hard.randomness.abs() < f32::EPSILON);

        assert_eq!(Difficulty::default(), Difficulty::Medium);
        assert_eq!("hard".parse::<Difficulty>(), Ok(Difficulty::Hard));
        assert!("expert".parse::<Difficulty>().is_err());
    }
}
