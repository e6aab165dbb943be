use async_trait::async_trait;

use vidya_quiz_rust::schemas::quiz::ParsedQuestion;
use vidya_quiz_rust::schemas::submission::{ScoreResult, SubmissionAnswer};
use vidya_quiz_rust::schemas::TeacherContext;
use vidya_quiz_rust::services::assistant::{self, TeacherIntent};
use vidya_quiz_rust::services::generation::{GenerationError, TextGenerator};
use vidya_quiz_rust::services::scoring;

const MODEL_RESPONSE: &str = "**QUIZ: Photosynthesis - Class 10**\n\n\
1. Which organelle carries out photosynthesis? (2 marks)\n\
A) Mitochondria\n\
B) Chloroplast ✓\n\
C) Nucleus\n\
D) Ribosome\n\n\
2. Photosynthesis releases carbon dioxide into the air. True or False? (2 marks)\n\n\
3. The pigment that captures light energy is called _____. (2 marks)\n\n\
4. Which of these is a raw material for photosynthesis? (2 marks)\n\
A) Oxygen\n\
B) Glucose\n\
C) Water\n\
D) Starch\n\n\
5. Explain how sunlight intensity affects the rate of photosynthesis. (2 marks)\n\n\
--- ANSWER KEY ---\n\
1. B\n\
2. False\n\
3. Chlorophyll\n\
4. C\n\
5. Higher intensity increases the rate until another factor becomes limiting.\n\n\
--- EXPLANATIONS ---\n\
1. Chloroplasts contain the chlorophyll needed for the light reactions.\n\
2. Photosynthesis consumes carbon dioxide and releases oxygen.\n\
3. Chlorophyll absorbs red and blue light most strongly.\n\
4. Water is split during the light-dependent reactions.\n\
5. Light is one of the limiting factors of photosynthesis.\n";

struct CannedGenerator;

#[async_trait]
impl TextGenerator for CannedGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        Ok(MODEL_RESPONSE.to_string())
    }
}

fn teacher() -> TeacherContext {
    TeacherContext { name: "Mrs. Sharma".to_string(), class_label: "Class 10A".to_string() }
}

#[tokio::test]
async fn teacher_message_to_scored_submission() {
    let instruction = "Create a quiz on Photosynthesis, 5 questions, 2 marks each";
    assert_eq!(assistant::classify_intent(instruction), TeacherIntent::QuizRequest);

    let exchange = assistant::generate_quiz_response(&CannedGenerator, &teacher(), instruction)
        .await
        .expect("generation");
    assert_eq!(exchange.parameters.subject, "Biology");
    assert_eq!(exchange.parameters.topic, "Photosynthesis");
    assert_eq!(exchange.parameters.total_marks, 10);

    // The teacher confirms; the stored parameters are reused, not re-derived.
    assert_eq!(assistant::classify_intent("1"), TeacherIntent::Confirmation);
    let draft = assistant::build_draft(Some(&exchange.parameters), &exchange.response, &teacher())
        .expect("draft");

    assert_eq!(draft.quiz.title, "Photosynthesis - Biology");
    assert_eq!(draft.quiz.questions.len(), 5);
    assert!(matches!(draft.quiz.questions[0], ParsedQuestion::Mcq { correct_answer: 1, .. }));
    assert!(matches!(draft.quiz.questions[3], ParsedQuestion::Mcq { correct_answer: 2, .. }));

    // A student answers everything correctly, with sloppy casing on the
    // fill-in-the-blank entry.
    let answers = vec![
        SubmissionAnswer::Selected(1),
        SubmissionAnswer::Selected(1),
        SubmissionAnswer::Text("chlorophyll ".to_string()),
        SubmissionAnswer::Selected(2),
        SubmissionAnswer::Text("More light means faster photosynthesis.".to_string()),
    ];

    let result = scoring::score_submission(&draft.quiz, &answers);

    // 8 of 10: the short-answer question is held for manual review.
    assert_eq!(result, ScoreResult { score: 8, total_marks: 10 });

    // Scoring the same submission again is a no-op change-wise.
    assert_eq!(scoring::score_submission(&draft.quiz, &answers), result);
}

#[tokio::test]
async fn overlong_quizzes_are_capped_at_ten_questions() {
    struct LongGenerator;

    #[async_trait]
    impl TextGenerator for LongGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            let mut response = String::from("**QUIZ: Algebra - Class 10**\n\n");
            for ordinal in 1..=12 {
                response.push_str(&format!(
                    "{ordinal}. Simplify the expression number {ordinal} shown on the board, filling _____. (2 marks)\n\n"
                ));
            }
            Ok(response)
        }
    }

    let exchange = assistant::generate_quiz_response(
        &LongGenerator,
        &teacher(),
        "Create an algebra quiz with 12 questions",
    )
    .await
    .expect("generation");

    let draft = assistant::build_draft(Some(&exchange.parameters), &exchange.response, &teacher())
        .expect("draft");
    assert_eq!(draft.quiz.questions.len(), 10);
}
