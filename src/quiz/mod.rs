pub mod ai_helper;
pub mod bank;
pub mod proficiency;
pub mod random;
pub mod scorer;
pub mod selector;

use std::collections::HashMap;
use std::fmt;

use scorer::ScoreReport;
use selector::filter_by_level;

/// Question id -> index of the chosen option.
pub type AnswerMap = HashMap<String, u8>;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Level {
    #[default]
    Basic,
    Intermediate,
    Advanced,
    UpperAdvanced,
}

/// Iteration order for everything level-grouped: selection, scoring, reports.
pub const LEVELS: [Level; 4] = [
    Level::Basic,
    Level::Intermediate,
    Level::Advanced,
    Level::UpperAdvanced,
];

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Basic => "basic",
            Level::Intermediate => "intermediate",
            Level::Advanced => "advanced",
            Level::UpperAdvanced => "upper-advanced",
        }
    }

    /// Parses an exact wire name; anything else, padded or capitalised
    /// variants included, is `None`.
    pub fn parse(name: &str) -> Option<Level> {
        LEVELS.into_iter().find(|l| l.as_str() == name)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Level::Basic => "Basic Level",
            Level::Intermediate => "Intermediate Level",
            Level::Advanced => "Advanced Level",
            Level::UpperAdvanced => "Upper-Advanced Level",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Level::Basic => "Foundation grammar concepts and simple sentence structures",
            Level::Intermediate => {
                "More complex grammar including conditionals and reported speech"
            }
            Level::Advanced => "Sophisticated structures, subjunctive mood, and formal usage",
            Level::UpperAdvanced => "Nuanced grammar, rare constructions, and academic English",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub question: String,
    pub options: [String; 3],
    pub correct_answer: u8,
    pub explanation: String,
    pub level: Level,
}

impl Question {
    pub fn new(
        id: impl Into<String>,
        question: impl Into<String>,
        options: [&str; 3],
        correct_answer: u8,
        explanation: impl Into<String>,
        level: Level,
    ) -> Self {
        Self {
            id: id.into(),
            question: question.into(),
            options: options.map(str::to_string),
            correct_answer,
            explanation: explanation.into(),
            level,
        }
    }

    pub fn correct_option(&self) -> &str {
        &self.options[usize::from(self.correct_answer)]
    }
}

/// One user's pass through a selection, kept in dialogue storage between
/// messages.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Quiz {
    pub username: String,
    pub questions: Vec<Question>,
    pub current_question: usize,
    pub answers: AnswerMap,
}

impl Quiz {
    pub fn new(username: String, questions: Vec<Question>) -> Self {
        Self {
            username,
            questions,
            current_question: 0,
            answers: AnswerMap::new(),
        }
    }

    pub fn current(&self) -> Option<&Question> {
        self.questions.get(self.current_question)
    }

    /// True when the current question is the first of its level.
    pub fn starts_level(&self) -> bool {
        match self.current_question {
            0 => !self.questions.is_empty(),
            n => match (self.questions.get(n - 1), self.questions.get(n)) {
                (Some(prev), Some(cur)) => prev.level != cur.level,
                _ => false,
            },
        }
    }

    pub fn level_size(&self, level: Level) -> usize {
        filter_by_level(&self.questions, level).len()
    }

    /// Records `choice` for the current question and moves on.
    pub fn record_answer(&mut self, choice: u8) {
        if let Some(question) = self.questions.get(self.current_question) {
            self.answers.insert(question.id.clone(), choice);
            self.current_question += 1;
        }
    }

    pub fn is_finished(&self) -> bool {
        self.current_question >= self.questions.len()
    }

    pub fn report(&self) -> ScoreReport {
        scorer::score(&self.questions, &self.answers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_wire_names_round_trip_through_serde() {
        for level in LEVELS {
            let json = serde_json::to_string(&level).unwrap();
            assert_eq!(json, format!("\"{}\"", level.as_str()));
            assert_eq!(Level::parse(level.as_str()), Some(level));
        }
        assert_eq!(Level::parse("expert"), None);
        assert_eq!(Level::parse(" basic "), None);
        assert_eq!(Level::parse("Basic"), None);
    }

    #[test]
    fn question_serializes_with_camel_case_answer_index() {
        let q = Question::new("b1", "She ___ home.", ["go", "went", "goes"], 1, "Past.", Level::Basic);
        let value = serde_json::to_value(&q).unwrap();
        assert_eq!(value["correctAnswer"], 1);
        assert_eq!(value["level"], "basic");
        assert_eq!(q.correct_option(), "went");
    }

    fn two_level_quiz() -> Quiz {
        Quiz::new(
            "alice".to_string(),
            vec![
                Question::new("b1", "?", ["a", "b", "c"], 0, "", Level::Basic),
                Question::new("b2", "?", ["a", "b", "c"], 1, "", Level::Basic),
                Question::new("i1", "?", ["a", "b", "c"], 2, "", Level::Intermediate),
            ],
        )
    }

    #[test]
    fn quiz_walks_through_levels() {
        let mut quiz = two_level_quiz();
        assert!(quiz.starts_level());
        assert_eq!(quiz.level_size(Level::Basic), 2);

        quiz.record_answer(0);
        assert!(!quiz.starts_level());
        quiz.record_answer(2);
        assert!(quiz.starts_level());
        assert_eq!(quiz.current().map(|q| q.id.as_str()), Some("i1"));

        quiz.record_answer(2);
        assert!(quiz.is_finished());
        assert!(quiz.current().is_none());

        let report = quiz.report();
        assert_eq!(report.total, 2);
        assert_eq!(report.incorrect[0].question.id, "b2");
        assert_eq!(report.incorrect[0].user_answer, Some(2));
    }

    #[test]
    fn answers_past_the_end_are_ignored() {
        let mut quiz = two_level_quiz();
        for _ in 0..5 {
            quiz.record_answer(0);
        }
        assert_eq!(quiz.answers.len(), 3);
        assert_eq!(quiz.current_question, 3);
    }

    #[test]
    fn empty_quiz_is_finished_immediately() {
        let quiz = Quiz::new("nobody".to_string(), Vec::new());
        assert!(quiz.is_finished());
        assert!(!quiz.starts_level());
    }
}
