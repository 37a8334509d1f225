use chatgpt::prelude::*;
use chatgpt::types::CompletionResponse;
use log::debug;

/// Longest slice of source material handed to the model.
pub const MAX_CONTENT_CHARS: usize = 15_000;

const EXTRACTION_PROMPT: &str = r#"You are an expert at extracting quiz/assessment questions from educational content.
Extract questions with EXACTLY 3 answer options each. Determine the correct answer and provide an explanation.
Assign difficulty levels based on complexity: basic, intermediate, advanced, or upper-advanced.

IMPORTANT: Return ONLY valid JSON, no markdown formatting, no code blocks.

Return a JSON object with this exact structure:
{
  "questions": [
    {
      "question": "The question text with a blank shown as ___",
      "options": ["option1", "option2", "option3"],
      "correctAnswer": 0,
      "explanation": "Brief explanation why this is correct",
      "level": "basic"
    }
  ]
}

Notes:
- correctAnswer is the index (0, 1, or 2) of the correct option
- Extract as many valid questions as possible from the content
- If content has questions with more than 3 options, pick the 3 most relevant (including the correct answer)
- If content has questions with fewer than 3 options, generate plausible distractors
- Ensure questions are clear and self-contained"#;

pub struct QuizHelper {
    chat_gpt: ChatGPT,
}

impl QuizHelper {
    pub fn new(chat_gpt: ChatGPT) -> Self {
        Self { chat_gpt }
    }

    /// Asks the model to turn free-form material into question JSON and
    /// returns its raw reply.
    pub async fn extract_questions(&self, content: &str) -> Result<String> {
        let content = truncate_content(content);
        debug!("Extracting questions from {} characters", content.chars().count());

        let mut conversation = self.chat_gpt.new_conversation_directed(EXTRACTION_PROMPT);
        let prompt = format!(
            "Extract all quiz/assessment questions from this content:\n\n{}",
            content
        );

        let response: CompletionResponse = conversation.send_message(prompt).await?;
        let content = response.message().clone().content;

        debug!("Completion: {:?}", content.chars().take(500).collect::<String>());

        Ok(content)
    }
}

pub fn truncate_content(content: &str) -> &str {
    match content.char_indices().nth(MAX_CONTENT_CHARS) {
        Some((cut, _)) => &content[..cut],
        None => content,
    }
}

/// Strips the markdown code fence models like to wrap JSON in.
pub fn clean_reply(reply: &str) -> &str {
    let mut cleaned = reply.trim();
    if let Some(rest) = cleaned.strip_prefix("```json") {
        cleaned = rest;
    } else if let Some(rest) = cleaned.strip_prefix("```") {
        cleaned = rest;
    }
    if let Some(rest) = cleaned.strip_suffix("```") {
        cleaned = rest;
    }
    cleaned.trim()
}
