use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, info, warn};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde_json::Value;
use thiserror::Error;

use crate::quiz::ai_helper::{clean_reply, QuizHelper};
use crate::quiz::{Level, Question};

const FIRECRAWL_SCRAPE_URL: &str = "https://api.firecrawl.dev/v1/scrape";
const FALLBACK_EXPLANATION: &str = "No explanation provided.";

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("failed to fetch content: {0}")]
    Fetch(String),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("no content provided or extracted")]
    NoContent,
    #[error("question extraction failed: {0}")]
    Ai(#[from] chatgpt::err::Error),
    #[error("no response from the extraction model")]
    EmptyReply,
    #[error("failed to parse extracted questions: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportSource {
    Url(String),
    Text(String),
}

impl ImportSource {
    /// A lone http(s) link is fetched, anything else is treated as pasted text.
    pub fn from_argument(argument: &str) -> Self {
        let trimmed = argument.trim();
        let is_link = (trimmed.starts_with("http://") || trimmed.starts_with("https://"))
            && !trimmed.contains(char::is_whitespace)
            && reqwest::Url::parse(trimmed).is_ok();
        if is_link {
            ImportSource::Url(trimmed.to_string())
        } else {
            ImportSource::Text(trimmed.to_string())
        }
    }
}

pub struct ImportPipeline {
    client: reqwest::Client,
    helper: Arc<QuizHelper>,
    firecrawl_api_key: Option<String>,
}

impl ImportPipeline {
    pub fn new(client: reqwest::Client, helper: Arc<QuizHelper>, firecrawl_api_key: Option<String>) -> Self {
        Self {
            client,
            helper,
            firecrawl_api_key,
        }
    }

    /// Source -> content -> model reply -> validated questions with fresh ids.
    pub async fn run(&self, source: ImportSource) -> Result<Vec<Question>, ImportError> {
        let content = match source {
            ImportSource::Text(text) => text,
            ImportSource::Url(url) => self.fetch(&url).await?,
        };
        if content.trim().is_empty() {
            return Err(ImportError::NoContent);
        }

        let reply = self.helper.extract_questions(&content).await?;
        if reply.trim().is_empty() {
            return Err(ImportError::EmptyReply);
        }

        let questions = validate_extracted(&reply, unix_millis())?;
        info!("Extracted {} valid questions", questions.len());
        Ok(questions)
    }

    async fn fetch(&self, url: &str) -> Result<String, ImportError> {
        match &self.firecrawl_api_key {
            Some(key) => self.scrape(url, key).await,
            None => {
                debug!("Fetching URL: {}", url);
                let response = self.client.get(url).send().await?;
                if !response.status().is_success() {
                    return Err(ImportError::Fetch(format!("{} returned {}", url, response.status())));
                }
                Ok(response.text().await?)
            }
        }
    }

    async fn scrape(&self, url: &str, api_key: &str) -> Result<String, ImportError> {
        debug!("Scraping URL: {}", url);
        let response = self
            .client
            .post(FIRECRAWL_SCRAPE_URL)
            .bearer_auth(api_key)
            .json(&serde_json::json!({
                "url": url,
                "formats": ["markdown"],
                "onlyMainContent": true,
            }))
            .send()
            .await?;

        let status = response.status();
        let body: ScrapeResponse = response.json().await?;
        if !status.is_success() {
            return Err(ImportError::Fetch(
                body.error.unwrap_or_else(|| "Failed to scrape URL".to_string()),
            ));
        }

        let markdown = body.data.and_then(|d| d.markdown).or(body.markdown);
        debug!("Scraped content length: {:?}", markdown.as_ref().map(String::len));
        markdown.ok_or(ImportError::NoContent)
    }
}

#[derive(Debug, Default, serde::Deserialize)]
struct ScrapeResponse {
    #[serde(default)]
    data: Option<ScrapeData>,
    #[serde(default)]
    markdown: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Default, serde::Deserialize)]
struct ScrapeData {
    #[serde(default)]
    markdown: Option<String>,
}

#[derive(Debug, Default, serde::Deserialize)]
struct Extraction {
    #[serde(default)]
    questions: Vec<Value>,
}

/// Parses a model reply and keeps only well-formed items.
///
/// Items need non-empty text, exactly three string options and a whole
/// number answer index in 0..=2. Unknown levels fall back to intermediate. Ids are
/// `imported_{stamp}_{index}_{suffix}`, indexed over the accepted items.
pub fn validate_extracted(reply: &str, stamp: u64) -> Result<Vec<Question>, ImportError> {
    let extraction: Extraction = serde_json::from_str(clean_reply(reply))?;

    let mut questions = Vec::new();
    for (position, item) in extraction.questions.iter().enumerate() {
        match to_question(item) {
            Some(mut question) => {
                question.id = format!("imported_{}_{}_{}", stamp, questions.len(), random_suffix());
                questions.push(question);
            }
            None => warn!("Dropping malformed extracted question #{}", position),
        }
    }
    Ok(questions)
}

fn to_question(item: &Value) -> Option<Question> {
    let text = item.get("question")?.as_str()?.trim();
    if text.is_empty() {
        return None;
    }

    let options = item.get("options")?.as_array()?;
    if options.len() != 3 {
        return None;
    }
    let options: Vec<String> = options
        .iter()
        .map(|o| o.as_str().map(str::to_string))
        .collect::<Option<_>>()?;
    let options: [String; 3] = options.try_into().ok()?;

    let correct_answer = answer_index(item.get("correctAnswer")?)?;

    let explanation = item
        .get("explanation")
        .and_then(Value::as_str)
        .filter(|e| !e.trim().is_empty())
        .unwrap_or(FALLBACK_EXPLANATION);

    let level = item
        .get("level")
        .and_then(Value::as_str)
        .and_then(Level::parse)
        .unwrap_or(Level::Intermediate);

    Some(Question {
        id: String::new(),
        question: text.to_string(),
        options,
        correct_answer,
        explanation: explanation.to_string(),
        level,
    })
}

/// Any JSON number naming option 0, 1 or 2, so `1.0` counts as `1`.
fn answer_index(value: &Value) -> Option<u8> {
    let n = value.as_f64()?;
    if n.fract() != 0.0 || !(0.0..=2.0).contains(&n) {
        return None;
    }
    Some(n as u8)
}

fn random_suffix() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect::<String>()
        .to_lowercase()
}

pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
