use std::collections::BTreeMap;

use crate::quiz::{AnswerMap, Level, Question, LEVELS};

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct IncorrectAnswer {
    pub question: Question,
    /// `None` when the question was never answered.
    pub user_answer: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ScoreReport {
    pub total: usize,
    pub question_count: usize,
    pub level_scores: BTreeMap<Level, usize>,
    pub incorrect: Vec<IncorrectAnswer>,
}

impl ScoreReport {
    /// Share of correct answers, rounded to a whole percent.
    pub fn percentage(&self) -> u32 {
        if self.question_count == 0 {
            return 0;
        }
        (self.total as f64 / self.question_count as f64 * 100.0).round() as u32
    }
}

pub fn score(selection: &[Question], answers: &AnswerMap) -> ScoreReport {
    let mut level_scores: BTreeMap<Level, usize> = LEVELS.into_iter().map(|l| (l, 0)).collect();
    let mut incorrect = Vec::new();

    for question in selection {
        let user_answer = answers.get(&question.id).copied();
        if user_answer == Some(question.correct_answer) {
            *level_scores.entry(question.level).or_insert(0) += 1;
        } else {
            incorrect.push(IncorrectAnswer {
                question: question.clone(),
                user_answer,
            });
        }
    }

    ScoreReport {
        total: level_scores.values().sum(),
        question_count: selection.len(),
        level_scores,
        incorrect,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::bank::QuestionBank;
    use crate::quiz::proficiency::{classify, Proficiency};
    use crate::quiz::selector::select_questions;
    use std::collections::HashSet;

    fn one_per_level() -> Vec<Question> {
        vec![
            Question::new("b", "?", ["a", "b", "c"], 0, "basic why", Level::Basic),
            Question::new("i", "?", ["a", "b", "c"], 1, "inter why", Level::Intermediate),
            Question::new("a", "?", ["a", "b", "c"], 2, "adv why", Level::Advanced),
            Question::new("u", "?", ["a", "b", "c"], 1, "upper why", Level::UpperAdvanced),
        ]
    }

    fn all_correct(questions: &[Question]) -> AnswerMap {
        questions
            .iter()
            .map(|q| (q.id.clone(), q.correct_answer))
            .collect()
    }

    #[test]
    fn all_correct_answers_score_one_per_level() {
        let questions = one_per_level();
        let report = score(&questions, &all_correct(&questions));
        assert_eq!(report.total, 4);
        assert!(report.level_scores.values().all(|s| *s == 1));
        assert!(report.incorrect.is_empty());
        assert_eq!(report.percentage(), 100);
    }

    #[test]
    fn a_flipped_answer_costs_one_point() {
        let questions = one_per_level();
        let mut answers = all_correct(&questions);
        answers.insert("a".to_string(), 0);

        let report = score(&questions, &answers);
        assert_eq!(report.total, 3);
        assert_eq!(report.level_scores[&Level::Advanced], 0);
        assert_eq!(report.incorrect.len(), 1);
        assert_eq!(report.incorrect[0].question.id, "a");
        assert_eq!(report.incorrect[0].user_answer, Some(0));
    }

    #[test]
    fn unanswered_questions_are_wrong() {
        let questions = one_per_level();
        let mut answers = all_correct(&questions);
        answers.remove("i");

        let report = score(&questions, &answers);
        assert_eq!(report.total, 3);
        assert_eq!(report.incorrect[0].question.id, "i");
        assert_eq!(report.incorrect[0].user_answer, None);
    }

    #[test]
    fn incorrect_list_keeps_question_order() {
        let questions = one_per_level();
        let report = score(&questions, &AnswerMap::new());
        let order: Vec<&str> = report.incorrect.iter().map(|i| i.question.id.as_str()).collect();
        assert_eq!(order, ["b", "i", "a", "u"]);
        assert_eq!(report.total + report.incorrect.len(), questions.len());
        assert_eq!(report.level_scores.len(), 4);
        assert_eq!(report.percentage(), 0);
    }

    #[test]
    fn empty_selection_scores_zero() {
        let report = score(&[], &AnswerMap::new());
        assert_eq!(report.total, 0);
        assert_eq!(report.question_count, 0);
        assert_eq!(report.percentage(), 0);
    }

    #[test]
    fn percentage_rounds_to_whole_numbers() {
        let questions = one_per_level();
        let mut answers = all_correct(&questions);
        answers.remove("u");
        // 3 of 4
        assert_eq!(score(&questions, &answers).percentage(), 75);
    }

    #[test]
    fn testuser_answering_everything_correctly_is_proficient() {
        let bank = QuestionBank::standard();
        let selection = select_questions("testuser", &bank);
        assert_eq!(selection.len(), 40);
        let unique: HashSet<&str> = selection.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(unique.len(), 40);

        let report = score(&selection, &all_correct(&selection));
        assert_eq!(report.total, 40);
        assert!(report.incorrect.is_empty());
        assert!(report.level_scores.values().all(|s| *s == 10));

        let tier = classify(report.total);
        assert_eq!(tier, Proficiency::Proficient);
        assert_eq!(tier.label(), "Proficient");
    }
}
