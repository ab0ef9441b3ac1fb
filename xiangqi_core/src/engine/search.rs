use crate::engine::config::{DifficultyConfig, EngineConfig};
use crate::engine::eval::SimpleEvaluator;
use crate::engine::ordering::MoveOrdering;
use crate::engine::tt::{TTFlag, TranspositionTable};
use crate::engine::{Evaluator, Move, SearchError, SearchStats, Searcher, INFINITY_SCORE};
use crate::logic::board::{Board, Color};
use crate::logic::generator::MoveGenerator;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

/// Candidates for a randomized move: the first few legal moves in
/// generation order.
const RANDOM_MOVE_POOL: usize = 3;

/// Iterative-deepening negamax with alpha-beta pruning, a capture-only
/// quiescence search, an optional transposition table and optional
/// killer/history move ordering.
pub struct AlphaBetaEngine {
    config: Arc<EngineConfig>,
    evaluator: SimpleEvaluator,
    generator: MoveGenerator,
    tt: TranspositionTable,
    ordering: MoveOrdering,
    rng: StdRng,
    nodes_searched: u64,
    use_tt: bool,
    use_ordering: bool,
}

impl AlphaBetaEngine {
    pub fn new(config: Arc<EngineConfig>) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Engine whose randomized move choices are reproducible.
    pub fn with_seed(config: Arc<EngineConfig>, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: Arc<EngineConfig>, rng: StdRng) -> Self {
        Self {
            evaluator: SimpleEvaluator::new(config.clone()),
            generator: MoveGenerator::new(),
            tt: TranspositionTable::new(config.tt_capacity),
            ordering: MoveOrdering::new(config.clone()),
            config,
            rng,
            nodes_searched: 0,
            use_tt: true,
            use_ordering: true,
        }
    }

    pub fn update_config(&mut self, config: Arc<EngineConfig>) {
        if config.tt_capacity != self.config.tt_capacity {
            self.tt = TranspositionTable::new(config.tt_capacity);
        }
        self.evaluator = SimpleEvaluator::new(config.clone());
        self.ordering.update_config(config.clone());
        self.config = config;
    }

    /// Drops the transposition table and the killer/history tables.
    pub fn clear_caches(&mut self) {
        self.tt.clear();
        self.ordering.clear();
    }

    pub const fn tt(&self) -> &TranspositionTable {
        &self.tt
    }

    pub const fn nodes_searched(&self) -> u64 {
        self.nodes_searched
    }

    pub fn find_best_move(
        &mut self,
        board: &Board,
        color: Color,
        difficulty: &DifficultyConfig,
    ) -> Result<Move, SearchError> {
        self.search(board, color, difficulty).map(|(mv, _)| mv)
    }

    fn now() -> f64 {
        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            if let Some(window) = web_sys::window() {
                return window.performance().map(|p| p.now()).unwrap_or(0.0);
            }
            let global = js_sys::global();
            if let Ok(worker) = global.dyn_into::<web_sys::WorkerGlobalScope>() {
                return worker.performance().map(|p| p.now()).unwrap_or(0.0);
            }
            0.0
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            use std::time::{SystemTime, UNIX_EPOCH};
            let since_the_epoch = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default();
            #[allow(clippy::cast_precision_loss)]
            let time_ms = (since_the_epoch.as_secs() as f64).mul_add(
                1000.0,
                f64::from(since_the_epoch.subsec_nanos()) / 1_000_000.0,
            );
            time_ms
        }
    }

    /// Searches every root move to `depth` with a full window. The result is
    /// recorded in the transposition table as the root's exact score.
    fn search_root(
        &mut self,
        board: &mut Board,
        moves: &[Move],
        depth: u8,
        color: Color,
    ) -> Option<(Move, i32)> {
        let hash = board.hash();
        let mut alpha = -INFINITY_SCORE;
        let beta = INFINITY_SCORE;
        let mut best: Option<(Move, i32)> = None;

        for mv in moves {
            self.generator.make_move(board, mv);
            let score = -self.alpha_beta(board, depth - 1, -beta, -alpha, color.opposite());
            self.generator.undo_move(board, mv);

            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((*mv, score));
            }
            alpha = alpha.max(score);
        }

        if self.use_tt {
            if let Some((mv, score)) = best {
                self.tt.store(hash, Some(mv), score, depth, TTFlag::Exact);
            }
        }
        best
    }

    fn alpha_beta(
        &mut self,
        board: &mut Board,
        depth: u8,
        mut alpha: i32,
        beta: i32,
        color: Color,
    ) -> i32 {
        self.nodes_searched += 1;
        let hash = board.hash();
        let alpha_orig = alpha;

        if self.use_tt {
            if let Some(score) = self.tt.lookup(hash, depth, alpha, beta) {
                return score;
            }
        }

        if depth == 0 {
            let q_depth = self.config.quiescence_depth;
            return self.quiescence(board, alpha, beta, color, q_depth);
        }

        let mut moves = self.generator.generate_legal_moves(board, color);
        if moves.is_empty() {
            // Checkmate and stalemate alike: the side to move has lost the search.
            return -self.config.mate_score;
        }

        if self.use_ordering {
            let tt_move = if self.use_tt {
                self.tt.get_move(hash)
            } else {
                None
            };
            self.ordering.order_moves(&mut moves, depth, tt_move.as_ref());
        }

        let mut best_score = -INFINITY_SCORE;
        let mut best_move = None;

        for mv in moves {
            self.generator.make_move(board, &mv);
            let score = -self.alpha_beta(board, depth - 1, -beta, -alpha, color.opposite());
            self.generator.undo_move(board, &mv);

            if score > best_score {
                best_score = score;
                best_move = Some(mv);
            }
            if score > alpha {
                alpha = score;
            }
            if alpha >= beta {
                self.ordering.add_killer(&mv, depth);
                self.ordering.update_history(&mv, depth);
                break;
            }
        }

        if self.use_tt {
            let flag = if best_score <= alpha_orig {
                TTFlag::UpperBound
            } else if best_score >= beta {
                TTFlag::LowerBound
            } else {
                TTFlag::Exact
            };
            self.tt.store(hash, best_move, best_score, depth, flag);
        }

        best_score
    }

    fn quiescence(
        &mut self,
        board: &mut Board,
        mut alpha: i32,
        beta: i32,
        color: Color,
        depth_left: u8,
    ) -> i32 {
        self.nodes_searched += 1;

        let stand_pat = self.evaluator.evaluate(board, color);
        if stand_pat >= beta {
            return beta;
        }
        if alpha < stand_pat {
            alpha = stand_pat;
        }
        if depth_left == 0 {
            return alpha;
        }

        let mut captures = self.generator.generate_capture_moves(board, color);
        if self.use_ordering {
            captures.sort_by_cached_key(|mv| std::cmp::Reverse(self.ordering.mvv_lva(mv)));
        }

        for mv in captures {
            self.generator.make_move(board, &mv);
            let score = -self.quiescence(board, -beta, -alpha, color.opposite(), depth_left - 1);
            self.generator.undo_move(board, &mv);

            if score >= beta {
                return beta;
            }
            if score > alpha {
                alpha = score;
            }
        }

        alpha
    }

    fn random_root_move(&mut self, moves: &[Move], randomness: f32) -> Option<Move> {
        if randomness <= 0.0 || self.rng.gen::<f32>() >= randomness {
            return None;
        }
        let pool = moves.get(..moves.len().min(RANDOM_MOVE_POOL))?;
        pool.choose(&mut self.rng).copied()
    }
}

impl Searcher for AlphaBetaEngine {
    fn search(
        &mut self,
        board: &Board,
        color: Color,
        difficulty: &DifficultyConfig,
    ) -> Result<(Move, SearchStats), SearchError> {
        let start_time = Self::now();
        self.nodes_searched = 0;
        self.use_tt = difficulty.use_transposition_table;
        self.use_ordering = difficulty.use_move_ordering;
        self.evaluator = SimpleEvaluator::new(self.config.clone())
            .with_accuracy(difficulty.evaluation_accuracy);

        let root_moves = self.generator.generate_legal_moves(board, color);
        let Some(&first_move) = root_moves.first() else {
            log::warn!("search requested for {color} without legal moves");
            return Err(SearchError::NoLegalMoves(color));
        };

        if root_moves.len() == 1 {
            log::debug!("only legal move {first_move}, skipping search");
            return Ok((first_move, SearchStats::default()));
        }

        if let Some(mv) = self.random_root_move(&root_moves, difficulty.randomness) {
            log::debug!("playing random move {mv}");
            return Ok((mv, SearchStats::default()));
        }

        let mut board = board.clone();
        let max_depth = difficulty.search_depth.max(1);
        let mut best_move = first_move;
        let mut best_score = -INFINITY_SCORE;
        let mut completed_depth = 0;

        for depth in 1..=max_depth {
            let mut ordered = root_moves.clone();
            if self.use_ordering {
                let tt_move = if self.use_tt {
                    self.tt.get_move(board.hash())
                } else {
                    None
                };
                self.ordering
                    .order_moves(&mut ordered, depth, tt_move.as_ref());
            }

            if let Some((mv, score)) = self.search_root(&mut board, &ordered, depth, color) {
                best_move = mv;
                best_score = score;
                completed_depth = depth;
            }
            log::debug!(
                "depth {depth}: best {best_move} score {best_score} nodes {}",
                self.nodes_searched
            );

            if best_score > self.config.mate_score - 100 {
                log::debug!("forced win found at depth {depth}");
                break;
            }
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let time_ms = (Self::now() - start_time).max(0.0) as u64;
        let stats = SearchStats {
            depth: completed_depth,
            nodes: self.nodes_searched,
            score: best_score,
            time_ms,
        };
        log::info!(
            "{color} plays {best_move} (depth {}, score {}, {} nodes, {} ms)",
            stats.depth,
            stats.score,
            stats.nodes,
            stats.time_ms
        );
        Ok((best_move, stats))
    }
}
