use std::path::PathBuf;

use teloxide::types::ChatId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("invalid chat id in ADMIN_CHAT_IDS: {0}")]
    InvalidChatId(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub chatgpt_api_key: String,
    pub firecrawl_api_key: Option<String>,
    pub admin_chat_ids: Vec<ChatId>,
    pub dialogue_db_path: String,
    pub question_store_path: PathBuf,
}

impl Config {
    /// Reads settings from the process environment. `.env` is expected to be
    /// loaded already.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let chatgpt_api_key =
            non_empty("CHATGPT_API_KEY").ok_or(ConfigError::Missing("CHATGPT_API_KEY"))?;

        let admin_chat_ids = match non_empty("ADMIN_CHAT_IDS") {
            Some(raw) => parse_chat_ids(&raw)?,
            None => Vec::new(),
        };

        Ok(Self {
            chatgpt_api_key,
            firecrawl_api_key: non_empty("FIRECRAWL_API_KEY"),
            admin_chat_ids,
            dialogue_db_path: non_empty("DIALOGUE_DB_PATH").unwrap_or_else(|| "db.sqlite".to_string()),
            question_store_path: non_empty("QUESTION_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("questions.json")),
        })
    }

    pub fn is_admin(&self, chat_id: ChatId) -> bool {
        self.admin_chat_ids.contains(&chat_id)
    }
}

fn parse_chat_ids(raw: &str) -> Result<Vec<ChatId>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map(ChatId)
                .map_err(|_| ConfigError::InvalidChatId(s.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_the_api_key_is_set() {
        let config = Config::from_lookup(lookup(&[("CHATGPT_API_KEY", "sk-test")])).unwrap();
        assert_eq!(config.chatgpt_api_key, "sk-test");
        assert!(config.firecrawl_api_key.is_none());
        assert!(config.admin_chat_ids.is_empty());
        assert_eq!(config.dialogue_db_path, "db.sqlite");
        assert_eq!(config.question_store_path, PathBuf::from("questions.json"));
    }

    #[test]
    fn missing_api_key_is_an_error() {
        let err = Config::from_lookup(lookup(&[("CHATGPT_API_KEY", "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("CHATGPT_API_KEY")));
    }

    #[test]
    fn admin_ids_are_parsed_and_checked() {
        let config = Config::from_lookup(lookup(&[
            ("CHATGPT_API_KEY", "sk-test"),
            ("ADMIN_CHAT_IDS", "12345, -100200300,"),
        ]))
        .unwrap();
        assert_eq!(config.admin_chat_ids, vec![ChatId(12345), ChatId(-100200300)]);
        assert!(config.is_admin(ChatId(12345)));
        assert!(!config.is_admin(ChatId(1)));
    }

    #[test]
    fn garbage_admin_id_is_rejected() {
        let err = Config::from_lookup(lookup(&[
            ("CHATGPT_API_KEY", "sk-test"),
            ("ADMIN_CHAT_IDS", "12,abc"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidChatId(ref id) if id == "abc"));
    }
}
