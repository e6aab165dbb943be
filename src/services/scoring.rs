use crate::schemas::quiz::{ParsedQuestion, Quiz};
use crate::schemas::submission::{ScoreResult, SubmissionAnswer};

/// Score a student's answers against a finalized quiz. Pure and total: a
/// missing or mistyped answer simply earns nothing, and short-answer
/// questions are left un-scored for manual review.
pub fn score_submission(quiz: &Quiz, answers: &[SubmissionAnswer]) -> ScoreResult {
    let mut score = 0;

    for (index, question) in quiz.questions.iter().enumerate() {
        let answer = answers.get(index);

        match question {
            ParsedQuestion::Mcq { correct_answer, points, .. } => {
                if matches!(answer, Some(SubmissionAnswer::Selected(selected)) if selected == correct_answer)
                {
                    score += points;
                }
            }
            ParsedQuestion::TrueFalse { correct_answer, points, .. } => {
                if matches!(answer, Some(SubmissionAnswer::Selected(selected)) if *selected == correct_answer.option_index())
                {
                    score += points;
                }
            }
            ParsedQuestion::FillBlank { correct_answer, points, .. } => {
                if let Some(SubmissionAnswer::Text(submitted)) = answer {
                    if normalize(submitted) == normalize(correct_answer) {
                        score += points;
                    }
                }
            }
            // Never auto-scored; the grading collaborator reviews these.
            ParsedQuestion::ShortAnswer { .. } => {}
        }
    }

    ScoreResult { score, total_marks: quiz.total_marks }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::quiz::{AnswerConfidence, TrueFalseAnswer};

    fn sample_quiz() -> Quiz {
        Quiz {
            title: "Photosynthesis - Biology".to_string(),
            subject: "Biology".to_string(),
            topic: "Photosynthesis".to_string(),
            description: "Sample quiz".to_string(),
            total_marks: 8,
            duration_minutes: 16,
            questions: vec![
                ParsedQuestion::Mcq {
                    question: "What gas do plants absorb?".to_string(),
                    options: ["Oxygen", "Carbon dioxide", "Nitrogen", "Hydrogen"]
                        .map(String::from),
                    correct_answer: 1,
                    points: 2,
                    confidence: AnswerConfidence::Resolved,
                },
                ParsedQuestion::TrueFalse {
                    question: "Photosynthesis can occur without sunlight.".to_string(),
                    correct_answer: TrueFalseAnswer::False,
                    points: 2,
                    confidence: AnswerConfidence::Resolved,
                },
                ParsedQuestion::FillBlank {
                    question: "The green pigment in leaves is called _____.".to_string(),
                    correct_answer: "Chlorophyll".to_string(),
                    points: 2,
                },
                ParsedQuestion::ShortAnswer {
                    question: "Explain why photosynthesis matters.".to_string(),
                    expected_answer: "It produces oxygen and food.".to_string(),
                    points: 2,
                },
            ],
        }
    }

    fn correct_answers() -> Vec<SubmissionAnswer> {
        vec![
            SubmissionAnswer::Selected(1),
            SubmissionAnswer::Selected(1),
            SubmissionAnswer::Text("Chlorophyll".to_string()),
            SubmissionAnswer::Text("Anything the student writes".to_string()),
        ]
    }

    #[test]
    fn copying_correct_values_scores_everything_but_short_answers() {
        let quiz = sample_quiz();
        let result = score_submission(&quiz, &correct_answers());

        // 6 of 8: the short-answer points never contribute.
        assert_eq!(result, ScoreResult { score: 6, total_marks: 8 });
    }

    #[test]
    fn fill_blank_comparison_ignores_case_and_surrounding_whitespace() {
        let quiz = sample_quiz();
        let mut answers = correct_answers();
        answers[2] = SubmissionAnswer::Text("mitochondria ".to_string());
        assert_eq!(score_submission(&quiz, &answers).score, 4);

        answers[2] = SubmissionAnswer::Text("chlorophyll ".to_string());
        assert_eq!(score_submission(&quiz, &answers).score, 6);
    }

    #[test]
    fn scoring_is_idempotent() {
        let quiz = sample_quiz();
        let answers = correct_answers();
        let first = score_submission(&quiz, &answers);
        let second = score_submission(&quiz, &answers);
        assert_eq!(first, second);
    }

    #[test]
    fn wrong_or_mistyped_answers_earn_nothing() {
        let quiz = sample_quiz();
        let answers = vec![
            SubmissionAnswer::Text("Carbon dioxide".to_string()),
            SubmissionAnswer::Selected(0),
            SubmissionAnswer::unanswered(),
            SubmissionAnswer::unanswered(),
        ];
        assert_eq!(score_submission(&quiz, &answers).score, 0);
    }

    #[test]
    fn short_submissions_only_score_the_answered_prefix() {
        let quiz = sample_quiz();
        let answers = vec![SubmissionAnswer::Selected(1)];
        assert_eq!(score_submission(&quiz, &answers).score, 2);
    }

    #[test]
    fn true_false_maps_false_to_second_option() {
        assert_eq!(TrueFalseAnswer::True.option_index(), 0);
        assert_eq!(TrueFalseAnswer::False.option_index(), 1);
    }
}
