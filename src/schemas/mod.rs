use serde::{Deserialize, Serialize};

pub mod quiz;
pub mod submission;

/// Teacher identity the hosting UI passes alongside each assistant message.
/// `class_label` is the display label (e.g. "Class 10A"); the numeric class
/// level is inferred from it during parameter extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeacherContext {
    #[serde(alias = "teacherName")]
    pub name: String,
    #[serde(alias = "teacherClass")]
    pub class_label: String,
}
