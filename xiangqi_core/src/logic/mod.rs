pub mod board;
pub mod draw;
pub mod eval_constants;
pub mod game;
pub mod generator;
pub mod history;
pub mod rules;
