use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};
use thiserror::Error;

use crate::import::unix_millis;
use crate::quiz::bank::QuestionBank;
use crate::quiz::{Level, Question};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("no questions provided")]
    NoQuestions,
    #[error("question store i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error("question store is corrupt: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    English,
    Interview,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::English, Category::Interview];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::English => "english",
            Category::Interview => "interview",
        }
    }

    pub fn parse(name: &str) -> Option<Category> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StoredQuestion {
    pub id: u64,
    pub question: String,
    pub options: [String; 3],
    pub correct_answer: u8,
    pub explanation: String,
    pub difficulty: Level,
    pub is_active: bool,
    pub created_at: u64,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct CategoryRecord {
    #[serde(default)]
    use_custom_questions: bool,
    #[serde(default)]
    questions: Vec<StoredQuestion>,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct StoreDocument {
    #[serde(default)]
    next_id: u64,
    #[serde(default)]
    categories: BTreeMap<String, CategoryRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActiveQuestions {
    Default { reason: &'static str },
    Custom(Vec<Question>),
}

/// Imported question sets and the per-category switch between them and the
/// standard catalogue, persisted as one JSON document.
pub struct QuestionStore {
    path: PathBuf,
    document: StoreDocument,
}

impl QuestionStore {
    /// Opens the store at `path`. A missing file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let document = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => StoreDocument::default(),
            Err(e) => return Err(e.into()),
        };
        debug!("Opened question store at {}", path.display());
        Ok(Self { path, document })
    }

    /// Inserts `questions` as active and switches the category to them.
    /// With `replace_existing`, previously active questions are retired first.
    pub fn save_questions(
        &mut self,
        category: Category,
        questions: &[Question],
        replace_existing: bool,
    ) -> Result<usize, StoreError> {
        if questions.is_empty() {
            return Err(StoreError::NoQuestions);
        }

        let created_at = unix_millis();
        let mut document = self.document.clone();
        let mut next_id = document.next_id;
        let record = document
            .categories
            .entry(category.as_str().to_string())
            .or_default();

        if replace_existing {
            for stored in record.questions.iter_mut().filter(|q| q.is_active) {
                stored.is_active = false;
            }
        }

        for question in questions {
            next_id += 1;
            record.questions.push(StoredQuestion {
                id: next_id,
                question: question.question.clone(),
                options: question.options.clone(),
                correct_answer: question.correct_answer,
                explanation: question.explanation.clone(),
                difficulty: question.level,
                is_active: true,
                created_at,
            });
        }
        record.use_custom_questions = true;
        document.next_id = next_id;

        self.commit(document)?;
        info!("Saved {} questions for category {}", questions.len(), category);
        Ok(questions.len())
    }

    pub fn set_use_custom(&mut self, category: Category, enabled: bool) -> Result<(), StoreError> {
        let mut document = self.document.clone();
        document
            .categories
            .entry(category.as_str().to_string())
            .or_default()
            .use_custom_questions = enabled;
        self.commit(document)
    }

    pub fn active_questions(&self, category: Category) -> ActiveQuestions {
        let Some(record) = self.document.categories.get(category.as_str()) else {
            return ActiveQuestions::Default {
                reason: "Using default question bank",
            };
        };
        if !record.use_custom_questions {
            return ActiveQuestions::Default {
                reason: "Using default question bank",
            };
        }

        let mut active: Vec<&StoredQuestion> =
            record.questions.iter().filter(|q| q.is_active).collect();
        if active.is_empty() {
            return ActiveQuestions::Default {
                reason: "No custom questions found, using default",
            };
        }
        active.sort_by_key(|q| (q.created_at, q.id));

        ActiveQuestions::Custom(
            active
                .into_iter()
                .map(|q| Question {
                    id: format!("custom_{}", q.id),
                    question: q.question.clone(),
                    options: q.options.clone(),
                    correct_answer: q.correct_answer,
                    explanation: q.explanation.clone(),
                    level: q.difficulty,
                })
                .collect(),
        )
    }

    /// The bank a new session in `category` should draw from.
    pub fn resolve_bank(&self, category: Category, standard: &QuestionBank) -> QuestionBank {
        match self.active_questions(category) {
            ActiveQuestions::Custom(questions) => QuestionBank::new(questions),
            ActiveQuestions::Default { .. } => standard.clone(),
        }
    }

    /// Writes `document` and only then makes it the in-memory state, so a
    /// failed write leaves the store as it was.
    fn commit(&mut self, document: StoreDocument) -> Result<(), StoreError> {
        let raw = serde_json::to_string_pretty(&document)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &self.path)?;
        self.document = document;
        Ok(())
    }
}
