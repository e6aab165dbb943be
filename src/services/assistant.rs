use std::sync::LazyLock;

use regex::Regex;
use validator::Validate;

use crate::schemas::quiz::{GenerationParameters, Quiz};
use crate::schemas::TeacherContext;
use crate::services::generation::{GenerationError, TextGenerator};
use crate::services::params;
use crate::services::parser::{self, NoQuestionsParsed};
use crate::services::prompt;

static RESPONSE_MARKS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\((\d+)\s*marks?\)").expect("response marks pattern"));

static NUMBERED_LINE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\d+\.\s+").expect("numbered line pattern"));

/// How the assistant should route a teacher message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeacherIntent {
    /// The teacher confirmed the previously generated quiz.
    Confirmation,
    /// The message asks for a quiz to be generated.
    QuizRequest,
    /// Anything else: answer as a general teaching assistant.
    General,
}

pub fn classify_intent(message: &str) -> TeacherIntent {
    let trimmed = message.trim();
    let lower = trimmed.to_lowercase();

    if trimmed == "1" || lower.contains("assign") || lower.contains("auto-create") {
        return TeacherIntent::Confirmation;
    }
    if lower.contains("quiz") || lower.contains("test") || lower.contains("create") {
        return TeacherIntent::QuizRequest;
    }
    TeacherIntent::General
}

/// Outcome of one quiz-generation exchange. The caller must keep
/// `parameters` and pass them back on confirmation; they are never
/// re-derived from the message, which avoids extraction drift between
/// request and confirmation.
#[derive(Debug, Clone)]
pub struct QuizGeneration {
    pub parameters: GenerationParameters,
    pub response: String,
}

/// Handle a quiz request end to end up to the draft boundary: extract
/// parameters, build the prompt, await the generator once. Generation
/// failures propagate untouched; there is no retry here.
pub async fn generate_quiz_response(
    generator: &dyn TextGenerator,
    teacher: &TeacherContext,
    instruction: &str,
) -> Result<QuizGeneration, GenerationError> {
    let parameters = params::extract_parameters(instruction, &teacher.class_label);

    tracing::info!(
        subject = %parameters.subject,
        topic = %parameters.topic,
        question_count = parameters.question_count,
        total_marks = parameters.total_marks,
        duration_minutes = parameters.duration_minutes,
        "Requesting quiz generation"
    );

    let quiz_prompt = prompt::build_quiz_prompt(&parameters);
    let response = generator.generate(&quiz_prompt).await?;

    Ok(QuizGeneration { parameters, response })
}

/// Non-quiz messages go through the same generator with the plain
/// teaching-assistant prompt.
pub async fn answer_general(
    generator: &dyn TextGenerator,
    teacher: &TeacherContext,
    message: &str,
) -> Result<String, GenerationError> {
    generator.generate(&prompt::build_assist_prompt(teacher, message)).await
}

/// A quiz draft plus the parameters that produced it, handed to the
/// authoring UI for review. Nothing is persisted until the teacher
/// explicitly confirms the draft.
#[derive(Debug, Clone)]
pub struct QuizDraft {
    pub quiz: Quiz,
    pub parameters: GenerationParameters,
}

/// Turn a stored generation exchange into a reviewable draft. When the
/// stored parameters are missing or fail validation (lost UI state), they
/// are recovered from the response text instead.
pub fn build_draft(
    parameters: Option<&GenerationParameters>,
    response: &str,
    teacher: &TeacherContext,
) -> Result<QuizDraft, NoQuestionsParsed> {
    let parameters = match parameters {
        Some(stored) if stored.validate().is_ok() => stored.clone(),
        Some(stored) => {
            tracing::warn!(
                subject = %stored.subject,
                topic = %stored.topic,
                "Stored quiz parameters are invalid; recovering from response"
            );
            recover_parameters(response)
        }
        None => {
            tracing::warn!("Quiz parameters were not stored; recovering from response");
            recover_parameters(response)
        }
    };

    let questions = parser::parse_questions(response, parameters.marks_per_question)?;

    let quiz = Quiz {
        title: format!("{} - {}", parameters.topic, parameters.subject),
        subject: parameters.subject.clone(),
        topic: parameters.topic.clone(),
        description: format!(
            "This quiz on {} for {} contains {} questions worth {} marks each (Total: {} marks). All questions and answers are pre-configured and ready to publish.",
            parameters.topic,
            teacher.class_label,
            questions.len(),
            parameters.marks_per_question,
            parameters.total_marks
        ),
        total_marks: parameters.total_marks,
        duration_minutes: parameters.duration_minutes,
        questions,
    };

    Ok(QuizDraft { quiz, parameters })
}

/// Rebuild usable parameters from the generated response itself: marks come
/// from the first "(N marks)" annotation, the question count from the
/// numbered lines, and the remaining fields fall back to their documented
/// defaults.
pub fn recover_parameters(response: &str) -> GenerationParameters {
    let marks_per_question = RESPONSE_MARKS_PATTERN
        .captures(response)
        .and_then(|captures| captures[1].parse::<u32>().ok())
        .filter(|marks| *marks >= 1)
        .unwrap_or(params::DEFAULT_MARKS_PER_QUESTION);
    let question_count = (NUMBERED_LINE_PATTERN.find_iter(response).count() as u32).max(1);

    GenerationParameters {
        subject: params::DEFAULT_SUBJECT.to_string(),
        topic: params::DEFAULT_TOPIC.to_string(),
        class_level: params::DEFAULT_CLASS_LEVEL.to_string(),
        question_count,
        marks_per_question,
        total_marks: question_count * marks_per_question,
        duration_minutes: 15,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct StubGenerator {
        response: &'static str,
    }

    #[async_trait]
    impl TextGenerator for StubGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            Ok(self.response.to_string())
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl TextGenerator for FailingGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            Err(GenerationError::Network("connection refused".to_string()))
        }
    }

    fn teacher() -> TeacherContext {
        TeacherContext { name: "Mr. Iyer".to_string(), class_label: "Class 10A".to_string() }
    }

    const STUB_RESPONSE: &str = "**QUIZ: Trigonometry - Class 10**\n\n\
1. What is sin(90°) equal to exactly? (2 marks)\nA) 0\nB) 1 ✓\nC) -1\nD) 0.5\n\n\
2. The value of tan(45°) is _____. (2 marks)\n\n\
--- ANSWER KEY ---\n1. B\n2. 1\n";

    #[test]
    fn intent_classification_matches_the_assistant_flow() {
        assert_eq!(classify_intent("1"), TeacherIntent::Confirmation);
        assert_eq!(classify_intent(" 1 "), TeacherIntent::Confirmation);
        assert_eq!(classify_intent("please assign it"), TeacherIntent::Confirmation);
        assert_eq!(classify_intent("Create a quiz on Trigonometry"), TeacherIntent::QuizRequest);
        assert_eq!(classify_intent("set a class test tomorrow"), TeacherIntent::QuizRequest);
        assert_eq!(classify_intent("how do I explain fractions?"), TeacherIntent::General);
    }

    #[tokio::test]
    async fn quiz_generation_extracts_parameters_and_returns_the_response() {
        let generator = StubGenerator { response: STUB_RESPONSE };
        let exchange = generate_quiz_response(
            &generator,
            &teacher(),
            "Create a quiz on Trigonometry, 5 questions, 2 marks each",
        )
        .await
        .expect("generation");

        assert_eq!(exchange.parameters.topic, "Trigonometry");
        assert_eq!(exchange.parameters.question_count, 5);
        assert!(exchange.response.contains("ANSWER KEY"));
    }

    #[tokio::test]
    async fn generation_failures_propagate_without_retry() {
        let result = generate_quiz_response(&FailingGenerator, &teacher(), "quiz on algebra").await;
        assert!(matches!(result, Err(GenerationError::Network(_))));
    }

    #[test]
    fn draft_uses_stored_parameters_verbatim() {
        let parameters = params::extract_parameters(
            "Create a quiz on Trigonometry, 5 questions, 2 marks each",
            "Class 10A",
        );
        let draft =
            build_draft(Some(&parameters), STUB_RESPONSE, &teacher()).expect("draft");

        assert_eq!(draft.quiz.title, "Trigonometry - Mathematics");
        assert_eq!(draft.quiz.total_marks, 10);
        assert_eq!(draft.quiz.duration_minutes, 20);
        assert_eq!(draft.quiz.questions.len(), 2);
        assert!(draft.quiz.description.contains("Class 10A"));
        assert_eq!(draft.parameters, parameters);
    }

    #[test]
    fn draft_recovers_parameters_when_none_are_stored() {
        let draft = build_draft(None, STUB_RESPONSE, &teacher()).expect("draft");

        assert_eq!(draft.parameters.subject, params::DEFAULT_SUBJECT);
        assert_eq!(draft.parameters.marks_per_question, 2);
        assert_eq!(draft.parameters.question_count, 4);
        assert_eq!(draft.parameters.duration_minutes, 15);
    }

    #[test]
    fn draft_recovers_parameters_when_stored_ones_are_invalid() {
        let mut parameters = params::extract_parameters("quiz on algebra", "Class 9");
        parameters.question_count = 0;

        let draft = build_draft(Some(&parameters), STUB_RESPONSE, &teacher()).expect("draft");
        assert_eq!(draft.parameters.subject, params::DEFAULT_SUBJECT);
    }

    #[test]
    fn unparseable_response_surfaces_no_questions_error() {
        let result = build_draft(None, "Sorry, I cannot help with that.", &teacher());
        assert!(result.is_err());
    }
}
