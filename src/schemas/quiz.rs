use serde::{Deserialize, Serialize};
use validator::Validate;

/// Generation parameters inferred once from a teacher's request. They are
/// stored by the caller and passed back verbatim when the teacher confirms
/// quiz creation, so a confirmation never re-extracts from the message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerationParameters {
    pub subject: String,
    pub topic: String,
    pub class_level: String,
    #[serde(alias = "numQuestions")]
    #[validate(range(min = 1, message = "question_count must be positive"))]
    pub question_count: u32,
    #[validate(range(min = 1, message = "marks_per_question must be positive"))]
    pub marks_per_question: u32,
    pub total_marks: u32,
    #[serde(alias = "duration")]
    #[validate(range(min = 1, message = "duration_minutes must be positive"))]
    pub duration_minutes: u32,
}

/// Whether a resolved correct answer came from an explicit signal (inline
/// marker or answer key) or fell back to the parser default. Kept on MCQ and
/// True/False entries so the authoring UI can flag questions for review
/// before publishing; the default itself is unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerConfidence {
    Resolved,
    Defaulted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrueFalseAnswer {
    True,
    False,
}

impl TrueFalseAnswer {
    /// Option index as rendered by the quiz UI: True first, False second.
    pub fn option_index(self) -> u32 {
        match self {
            TrueFalseAnswer::True => 0,
            TrueFalseAnswer::False => 1,
        }
    }
}

/// One extracted question. The tag and field names round-trip as the quiz
/// documents the hosting application already stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ParsedQuestion {
    #[serde(rename = "mcq", rename_all = "camelCase")]
    Mcq {
        question: String,
        options: [String; 4],
        /// Index into `options`, 0..=3.
        correct_answer: u32,
        points: u32,
        confidence: AnswerConfidence,
    },
    #[serde(rename = "true-false", rename_all = "camelCase")]
    TrueFalse {
        question: String,
        correct_answer: TrueFalseAnswer,
        points: u32,
        confidence: AnswerConfidence,
    },
    #[serde(rename = "fill-blank", rename_all = "camelCase")]
    FillBlank { question: String, correct_answer: String, points: u32 },
    #[serde(rename = "short-answer", rename_all = "camelCase")]
    ShortAnswer { question: String, expected_answer: String, points: u32 },
}

impl ParsedQuestion {
    pub fn question(&self) -> &str {
        match self {
            ParsedQuestion::Mcq { question, .. }
            | ParsedQuestion::TrueFalse { question, .. }
            | ParsedQuestion::FillBlank { question, .. }
            | ParsedQuestion::ShortAnswer { question, .. } => question,
        }
    }

    pub fn points(&self) -> u32 {
        match self {
            ParsedQuestion::Mcq { points, .. }
            | ParsedQuestion::TrueFalse { points, .. }
            | ParsedQuestion::FillBlank { points, .. }
            | ParsedQuestion::ShortAnswer { points, .. } => *points,
        }
    }
}

/// A finalized quiz, immutable once handed off to the authoring UI and the
/// persistence collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub title: String,
    pub subject: String,
    pub topic: String,
    pub description: String,
    pub total_marks: u32,
    #[serde(rename = "duration")]
    pub duration_minutes: u32,
    #[validate(length(min = 1, max = 10, message = "quiz must contain between 1 and 10 questions"))]
    pub questions: Vec<ParsedQuestion>,
}
