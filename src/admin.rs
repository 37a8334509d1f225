use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use log::{error, info, warn};
use teloxide::{prelude::*, types::ChatAction, utils::command::BotCommands};

use crate::config::Config;
use crate::dialogue::HandlerResult;
use crate::import::{ImportPipeline, ImportSource};
use crate::quiz::bank::QuestionBank;
use crate::quiz::selector::QUESTIONS_PER_LEVEL;
use crate::quiz::Level;
use crate::store::{ActiveQuestions, Category, QuestionStore};

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Operator commands:")]
pub enum AdminCommand {
    #[command(description = "show this text.")]
    Help,
    #[command(description = "import questions from a URL or pasted text, e.g. /import interview https://...")]
    Import(String),
    #[command(description = "switch a category to imported questions, e.g. /custom english on")]
    Custom(String),
    #[command(description = "show which questions a category uses, e.g. /questions english")]
    Questions(String),
}

pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: AdminCommand,
    config: Arc<Config>,
    store: Arc<Mutex<QuestionStore>>,
    pipeline: Arc<ImportPipeline>,
    standard: Arc<QuestionBank>,
) -> HandlerResult {
    if !config.is_admin(msg.chat.id) {
        warn!("Refused operator command from chat {}", msg.chat.id);
        bot.send_message(msg.chat.id, "This command is only available to operators")
            .await?;
        return Ok(());
    }

    let reply = match cmd {
        AdminCommand::Help => AdminCommand::descriptions().to_string(),
        AdminCommand::Import(argument) => {
            // Best effort, the import works without it
            let _ = bot.send_chat_action(msg.chat.id, ChatAction::Typing).await;
            import(&argument, &store, &pipeline).await
        }
        AdminCommand::Custom(argument) => toggle_custom(&argument, &store)?,
        AdminCommand::Questions(argument) => describe_questions(&argument, &store, &standard)?,
    };

    bot.send_message(msg.chat.id, reply).await?;
    Ok(())
}

async fn import(argument: &str, store: &Mutex<QuestionStore>, pipeline: &ImportPipeline) -> String {
    let (category, source) = split_category(argument);
    if source.is_empty() {
        return "Usage: /import [english|interview] <url or text>".to_string();
    }

    let questions = match pipeline.run(ImportSource::from_argument(source)).await {
        Ok(questions) => questions,
        Err(e) => {
            error!("Import failed: {}", e);
            return format!("Import failed: {}", e);
        }
    };
    if questions.is_empty() {
        return "No valid questions were found in that content".to_string();
    }

    let saved = {
        let mut store = match store.lock() {
            Ok(store) => store,
            Err(_) => return "Question store is unavailable".to_string(),
        };
        store.save_questions(category, &questions, true)
    };

    match saved {
        Ok(count) => {
            info!("Operator imported {} questions into {}", count, category);
            let bank = QuestionBank::new(questions);
            format!(
                "Saved {} questions as the {} set.\n{}",
                count,
                category,
                level_breakdown(&bank.level_counts())
            )
        }
        Err(e) => {
            error!("Saving imported questions failed: {}", e);
            format!("Saving failed: {}", e)
        }
    }
}

/// An optional leading category name, then the rest. Defaults to english.
fn split_category(argument: &str) -> (Category, &str) {
    let argument = argument.trim();
    match argument.split_once(char::is_whitespace) {
        Some((first, rest)) => match Category::parse(first) {
            Some(category) => (category, rest.trim()),
            None => (Category::English, argument),
        },
        None => match Category::parse(argument) {
            Some(category) => (category, ""),
            None => (Category::English, argument),
        },
    }
}

fn toggle_custom(argument: &str, store: &Mutex<QuestionStore>) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
    let mut words = argument.split_whitespace();
    let category = words.next().and_then(Category::parse);
    let enabled = match words.next() {
        Some("on") => Some(true),
        Some("off") => Some(false),
        _ => None,
    };
    let (Some(category), Some(enabled)) = (category, enabled) else {
        return Ok("Usage: /custom <english|interview> <on|off>".to_string());
    };

    store
        .lock()
        .map_err(|_| "question store lock poisoned")?
        .set_use_custom(category, enabled)?;

    Ok(format!(
        "The {} assessment now uses {} questions",
        category,
        if enabled { "imported" } else { "default" }
    ))
}

fn describe_questions(
    argument: &str,
    store: &Mutex<QuestionStore>,
    standard: &QuestionBank,
) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
    let category = if argument.trim().is_empty() {
        Category::English
    } else {
        match Category::parse(argument) {
            Some(category) => category,
            None => return Ok("Usage: /questions <english|interview>".to_string()),
        }
    };

    let store = store.lock().map_err(|_| "question store lock poisoned")?;
    let (source, bank) = match store.active_questions(category) {
        ActiveQuestions::Custom(questions) => (
            format!("{} imported questions", questions.len()),
            QuestionBank::new(questions),
        ),
        ActiveQuestions::Default { reason } => (reason.to_string(), standard.clone()),
    };

    Ok(format!(
        "The {} assessment: {}.\n{}",
        category,
        source,
        level_breakdown(&bank.level_counts())
    ))
}

/// Per-level counts, flagging levels that cannot fill a full round.
fn level_breakdown(counts: &BTreeMap<Level, usize>) -> String {
    counts
        .iter()
        .map(|(level, count)| {
            if *count < QUESTIONS_PER_LEVEL {
                format!(
                    "{}: {} (sessions will get only {} at this level)",
                    level.title(),
                    count,
                    count
                )
            } else {
                format!("{}: {}", level.title(), count)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
