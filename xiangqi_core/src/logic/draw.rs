use crate::logic::history::GameHistory;

/// Plies without a capture after which the game is drawn.
pub const NO_CAPTURE_DRAW_PLIES: usize = 120;
/// Occurrences of the same position that draw the game.
pub const REPETITION_DRAW_COUNT: usize = 3;

/// Trailing plies since the last capture (the whole history if none).
pub fn plies_since_capture(history: &GameHistory) -> usize {
    history
        .moves()
        .rev()
        .take_while(|mv| !mv.is_capture())
        .count()
}

pub fn is_draw_by_move_count(history: &GameHistory) -> bool {
    plies_since_capture(history) >= NO_CAPTURE_DRAW_PLIES
}

/// How often the latest recorded hash appears in the history.
pub fn repetition_count(history: &GameHistory) -> usize {
    history
        .last_hash()
        .map_or(0, |last| history.hashes().filter(|&h| h == last).count())
}

pub fn is_draw_by_repetition(history: &GameHistory) -> bool {
    repetition_count(history) >= REPETITION_DRAW_COUNT
}

pub fn is_draw(history: &GameHistory) -> bool {
    if is_draw_by_move_count(history) {
        log::debug!("draw: {NO_CAPTURE_DRAW_PLIES} plies without a capture");
        return true;
    }
    if is_draw_by_repetition(history) {
        log::debug!("draw: position repeated {REPETITION_DRAW_COUNT} times");
        return true;
    }
    false
}
