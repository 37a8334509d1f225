use std::sync::{Arc, Mutex};

use log::{debug, info};
use teloxide::{
    dispatching::dialogue::ErasedStorage,
    prelude::*,
    types::{KeyboardButton, KeyboardMarkup, KeyboardRemove},
};

use crate::quiz::bank::QuestionBank;
use crate::quiz::proficiency::classify;
use crate::quiz::scorer::ScoreReport;
use crate::quiz::selector::select_questions;
use crate::quiz::{Question, Quiz, LEVELS};
use crate::store::{Category, QuestionStore};

pub type QuizDialogue = Dialogue<State, ErasedStorage<State>>;
pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[derive(Clone, Default, serde::Serialize, serde::Deserialize)]
pub enum State {
    #[default]
    Start,
    ReceiveFullName,
    ReceiveCategory {
        username: String,
    },
    Assessment {
        category: Category,
        quiz: Quiz,
    },
}

/// Telegram rejects messages above 4096 characters.
const MAX_MESSAGE_LEN: usize = 4000;
const OPTION_LETTERS: [char; 3] = ['A', 'B', 'C'];

const GREETING_TEXT: &str = "Hi! I'm a grammar assessment bot. You'll answer 40 multiple-choice questions across four levels and get a detailed report at the end. What's your name?";
const ENGLISH_CHOICE: &str = "English grammar";
const INTERVIEW_CHOICE: &str = "Interview";

pub async fn start(bot: Bot, dialogue: QuizDialogue, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, GREETING_TEXT)
        .reply_markup(KeyboardRemove::new())
        .await?;

    dialogue.update(State::ReceiveFullName).await?;
    Ok(())
}

pub async fn receive_full_name(bot: Bot, dialogue: QuizDialogue, msg: Message) -> HandlerResult {
    let username = match msg.text().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => {
            bot.send_message(msg.chat.id, "Please enter your name (as text)")
                .await?;
            return Ok(());
        }
    };

    bot.send_message(msg.chat.id, format!("Nice to meet you, {}!", username))
        .await?;
    bot.send_message(msg.chat.id, "Which assessment would you like to take?")
        .reply_markup(category_keyboard())
        .await?;

    dialogue.update(State::ReceiveCategory { username }).await?;
    Ok(())
}

pub async fn receive_category(
    bot: Bot,
    dialogue: QuizDialogue,
    username: String,
    msg: Message,
    store: Arc<Mutex<QuestionStore>>,
    standard: Arc<QuestionBank>,
) -> HandlerResult {
    let Some(category) = msg.text().and_then(category_from_choice) else {
        bot.send_message(msg.chat.id, "Please choose one of the options")
            .reply_markup(category_keyboard())
            .await?;
        return Ok(());
    };

    let bank = {
        let store = store.lock().map_err(|_| "question store lock poisoned")?;
        store.resolve_bank(category, &standard)
    };
    if bank.is_empty() {
        bot.send_message(
            msg.chat.id,
            "There are no questions available for this assessment yet. Please try the other one.",
        )
        .reply_markup(category_keyboard())
        .await?;
        return Ok(());
    }
    let questions = select_questions(&username, &bank);

    info!(
        "Starting {} assessment for {:?} with {} questions",
        category,
        username,
        questions.len()
    );
    let quiz = Quiz::new(username, questions);

    bot.send_message(
        msg.chat.id,
        format!("Great! Let's begin. {} questions ahead.", quiz.questions.len()),
    )
    .await?;
    ask_current_question(&bot, msg.chat.id, &quiz).await?;

    dialogue
        .update(State::Assessment { category, quiz })
        .await?;
    Ok(())
}

pub async fn assessment(
    bot: Bot,
    dialogue: QuizDialogue,
    (category, quiz): (Category, Quiz),
    msg: Message,
) -> HandlerResult {
    let mut quiz = quiz;

    let choice = match (quiz.current(), msg.text()) {
        (Some(question), Some(text)) => parse_answer(question, text),
        _ => None,
    };

    if let Some(choice) = choice {
        quiz.record_answer(choice);
    } else if let Some(question) = quiz.current() {
        bot.send_message(msg.chat.id, "Please pick A, B or C")
            .reply_markup(options_keyboard(question))
            .await?;
        return Ok(());
    }

    if quiz.is_finished() {
        let report = quiz.report();
        debug!(
            "{:?} finished the {} assessment with {}/{} ({})",
            quiz.username,
            category,
            report.total,
            report.question_count,
            classify(report.total).category()
        );

        for chunk in split_message(&render_report(&quiz, &report), MAX_MESSAGE_LEN) {
            bot.send_message(msg.chat.id, chunk)
                .reply_markup(KeyboardRemove::new())
                .await?;
        }
        bot.send_message(msg.chat.id, "Would you like to take another assessment?")
            .reply_markup(category_keyboard())
            .await?;

        dialogue
            .update(State::ReceiveCategory {
                username: quiz.username,
            })
            .await?;
        return Ok(());
    }

    ask_current_question(&bot, msg.chat.id, &quiz).await?;
    dialogue.update(State::Assessment { category, quiz }).await?;
    Ok(())
}

async fn ask_current_question(bot: &Bot, chat_id: ChatId, quiz: &Quiz) -> HandlerResult {
    let Some(question) = quiz.current() else {
        return Ok(());
    };

    if quiz.starts_level() {
        bot.send_message(
            chat_id,
            format!(
                "{}\n{}\n{} questions",
                question.level.title(),
                question.level.description(),
                quiz.level_size(question.level)
            ),
        )
        .await?;
    }

    bot.send_message(
        chat_id,
        render_question(quiz.current_question, quiz.questions.len(), question),
    )
    .reply_markup(options_keyboard(question))
    .await?;
    Ok(())
}

fn category_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![
        KeyboardButton::new(ENGLISH_CHOICE),
        KeyboardButton::new(INTERVIEW_CHOICE),
    ]])
}

fn category_from_choice(text: &str) -> Option<Category> {
    match text.trim() {
        ENGLISH_CHOICE => Some(Category::English),
        INTERVIEW_CHOICE => Some(Category::Interview),
        other => Category::parse(other),
    }
}

fn options_keyboard(question: &Question) -> KeyboardMarkup {
    KeyboardMarkup::new(
        question
            .options
            .iter()
            .enumerate()
            .map(|(i, option)| vec![KeyboardButton::new(option_label(i, option))])
            .collect::<Vec<_>>(),
    )
}

fn option_label(index: usize, option: &str) -> String {
    format!("{}. {}", OPTION_LETTERS[index], option)
}

/// Accepts a keyboard label ("B. went"), the bare option text, a letter or a
/// 1-based number.
pub fn parse_answer(question: &Question, text: &str) -> Option<u8> {
    let text = text.trim();
    let options = question.options.iter().enumerate();

    let by_label = options
        .clone()
        .find(|(i, option)| text == option_label(*i, option));
    let by_text = || options.clone().find(|(_, option)| text == option.trim());
    let by_position = || {
        options.clone().find(|(i, _)| {
            text.eq_ignore_ascii_case(&OPTION_LETTERS[*i].to_string()) || text == (i + 1).to_string()
        })
    };

    by_label
        .or_else(by_text)
        .or_else(by_position)
        .map(|(i, _)| i as u8)
}

fn render_question(position: usize, total: usize, question: &Question) -> String {
    let mut text = format!(
        "Question {} of {} ({})\n\n{}\n",
        position + 1,
        total,
        question.level.title(),
        question.question
    );
    for (i, option) in question.options.iter().enumerate() {
        text.push('\n');
        text.push_str(&option_label(i, option));
    }
    text
}

pub fn render_report(quiz: &Quiz, report: &ScoreReport) -> String {
    let tier = classify(report.total);
    let mut text = format!(
        "Well done, {}!\n\nScore: {}/{} ({}%)\n{}: {}\n",
        quiz.username,
        report.total,
        report.question_count,
        report.percentage(),
        tier,
        tier.description()
    );

    text.push_str("\nBy level:\n");
    for level in LEVELS {
        let size = quiz.level_size(level);
        if size == 0 {
            continue;
        }
        let correct = report.level_scores.get(&level).copied().unwrap_or_default();
        text.push_str(&format!("{}: {}/{}\n", level.title(), correct, size));
    }

    if report.incorrect.is_empty() {
        text.push_str("\nNo mistakes. Excellent work!");
        return text;
    }

    text.push_str("\nQuestions to review:\n");
    for (n, missed) in report.incorrect.iter().enumerate() {
        let question = &missed.question;
        let given = missed
            .user_answer
            .and_then(|i| question.options.get(usize::from(i)))
            .map(String::as_str)
            .unwrap_or("no answer");
        text.push_str(&format!(
            "\n{}. {}\nYour answer: {}\nCorrect answer: {}\n{}\n",
            n + 1,
            question.question,
            given,
            question.correct_option(),
            question.explanation
        ));
    }
    text
}

/// Splits on line boundaries so each chunk stays under `limit` bytes.
/// A single line longer than `limit` is cut on a char boundary.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in text.split_inclusive('\n') {
        if current.len() + line.len() > limit && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
        }
        let mut rest = line;
        while rest.len() > limit {
            let mut cut = limit;
            while !rest.is_char_boundary(cut) {
                cut -= 1;
            }
            chunks.push(rest[..cut].to_string());
            rest = &rest[cut..];
        }
        current.push_str(rest);
    }
    if !current.trim().is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::bank::QuestionBank;
    use crate::quiz::{AnswerMap, Level};

    fn went() -> Question {
        Question::new(
            "b1",
            "She ___ to the store yesterday.",
            ["go", "went", "goes"],
            1,
            "\"Went\" is the past tense of \"go.\"",
            Level::Basic,
        )
    }

    #[test]
    fn answers_are_parsed_from_labels_text_letters_and_numbers() {
        let q = went();
        assert_eq!(parse_answer(&q, "B. went"), Some(1));
        assert_eq!(parse_answer(&q, "goes"), Some(2));
        assert_eq!(parse_answer(&q, "a"), Some(0));
        assert_eq!(parse_answer(&q, " C "), Some(2));
        assert_eq!(parse_answer(&q, "2"), Some(1));
        assert_eq!(parse_answer(&q, "maybe"), None);
        assert_eq!(parse_answer(&q, "4"), None);
    }

    #[test]
    fn option_text_wins_over_letters() {
        let q = Question::new("b3", "I have ___ apple.", ["the", "an", "a"], 1, "", Level::Basic);
        assert_eq!(parse_answer(&q, "a"), Some(2));
        assert_eq!(parse_answer(&q, "A. the"), Some(0));
    }

    #[test]
    fn question_text_lists_lettered_options() {
        let text = render_question(0, 40, &went());
        assert!(text.starts_with("Question 1 of 40 (Basic Level)"));
        assert!(text.ends_with("A. go\nB. went\nC. goes"));
    }

    #[test]
    fn report_lists_levels_and_missed_questions() {
        let mut quiz = Quiz::new(
            "Alice".to_string(),
            vec![
                went(),
                Question::new("i1", "If I ___ rich", ["am", "were", "was"], 1, "Second conditional.", Level::Intermediate),
            ],
        );
        quiz.answers.insert("b1".to_string(), 1);

        let report = quiz.report();
        let text = render_report(&quiz, &report);
        assert!(text.starts_with("Well done, Alice!"));
        assert!(text.contains("Score: 1/2 (50%)"));
        assert!(text.contains("Basic: Foundation level with room for growth"));
        assert!(text.contains("Basic Level: 1/1"));
        assert!(text.contains("Intermediate Level: 0/1"));
        assert!(!text.contains("Advanced Level"));
        assert!(text.contains("Your answer: no answer"));
        assert!(text.contains("Correct answer: were"));
        assert!(text.contains("Second conditional."));
    }

    #[test]
    fn perfect_report_has_no_review_section() {
        let bank = QuestionBank::standard();
        let quiz = Quiz::new("testuser".to_string(), select_questions("testuser", &bank));
        let answers: AnswerMap = quiz
            .questions
            .iter()
            .map(|q| (q.id.clone(), q.correct_answer))
            .collect();
        let report = crate::quiz::scorer::score(&quiz.questions, &answers);

        let text = render_report(&quiz, &report);
        assert!(text.contains("Score: 40/40 (100%)"));
        assert!(text.contains("Proficient: Exceptional command of English grammar"));
        assert!(text.contains("Upper-Advanced Level: 10/10"));
        assert!(text.ends_with("No mistakes. Excellent work!"));
    }

    #[test]
    fn long_reports_are_split_on_line_boundaries() {
        let text = "line\n".repeat(1000);
        let chunks = split_message(&text, 100);
        assert!(chunks.iter().all(|c| c.len() <= 100));
        assert!(chunks.iter().all(|c| c.ends_with('\n')));
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn overlong_lines_are_cut_on_char_boundaries() {
        let text = "é".repeat(30);
        let chunks = split_message(&text, 7);
        assert!(chunks.iter().all(|c| c.len() <= 7));
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn category_buttons_and_names_are_recognised() {
        assert_eq!(category_from_choice("English grammar"), Some(Category::English));
        assert_eq!(category_from_choice("Interview"), Some(Category::Interview));
        assert_eq!(category_from_choice("english"), Some(Category::English));
        assert_eq!(category_from_choice("history"), None);
    }
}
