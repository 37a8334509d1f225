use crate::quiz::bank::QuestionBank;
use crate::quiz::random::{shuffle, SeededSequence};
use crate::quiz::{Level, Question, LEVELS};

pub const QUESTIONS_PER_LEVEL: usize = 10;

/// "Alice", "ALICE" and " alice " all seed the same ordering. A byte order
/// mark counts as surrounding whitespace.
pub fn normalize_username(username: &str) -> String {
    username
        .trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
        .to_lowercase()
}

/// Picks up to ten questions per level for `username`, grouped in level order.
///
/// One generator is shared across all four levels, so a level's ordering
/// depends on how many draws the previous levels consumed. A level whose pool
/// holds fewer than ten questions contributes all of them and nothing more.
pub fn select_questions(username: &str, bank: &QuestionBank) -> Vec<Question> {
    let mut random = SeededSequence::new(&normalize_username(username));

    let mut selected = Vec::with_capacity(QUESTIONS_PER_LEVEL * LEVELS.len());
    for level in LEVELS {
        let pool = bank.pool(level);
        let shuffled = shuffle(&pool, &mut random);
        selected.extend(shuffled.into_iter().take(QUESTIONS_PER_LEVEL));
    }
    selected
}

pub fn filter_by_level(selection: &[Question], level: Level) -> Vec<Question> {
    selection
        .iter()
        .filter(|q| q.level == level)
        .cloned()
        .collect()
}
