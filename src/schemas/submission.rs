use serde::{Deserialize, Serialize};

/// One entry per question, ordinal-aligned with `Quiz::questions`. Untagged
/// so a stored answers array round-trips as the original mixed
/// number-or-string form: option indices for MCQ and True/False, free text
/// for fill-in-the-blank and short answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubmissionAnswer {
    Selected(u32),
    Text(String),
}

impl SubmissionAnswer {
    /// The UI initializes every slot to an empty string before the student
    /// touches it.
    pub fn unanswered() -> Self {
        SubmissionAnswer::Text(String::new())
    }
}

/// Derived score, handed to the submission-persistence collaborator together
/// with the answers it was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    pub score: u32,
    pub total_marks: u32,
}
