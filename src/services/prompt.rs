use crate::schemas::quiz::GenerationParameters;
use crate::schemas::TeacherContext;
use crate::services::parser::{ANSWER_KEY_MARKER, EXPLANATIONS_MARKER};

/// Difficulty tiers as fixed percentages of the question count.
fn easy_count(question_count: u32) -> u32 {
    (question_count as f64 * 0.3).ceil() as u32
}

fn medium_count(question_count: u32) -> u32 {
    (question_count as f64 * 0.4).ceil() as u32
}

fn hard_count(question_count: u32) -> u32 {
    (question_count as f64 * 0.3).floor() as u32
}

/// Type mix: half MCQ, a fifth each True/False and fill-blank, the remainder
/// (at least one) short answer.
fn mcq_count(question_count: u32) -> u32 {
    (question_count as f64 * 0.5).ceil() as u32
}

fn true_false_count(question_count: u32) -> u32 {
    (question_count as f64 * 0.2).ceil() as u32
}

fn fill_blank_count(question_count: u32) -> u32 {
    (question_count as f64 * 0.2).ceil() as u32
}

fn short_answer_count(question_count: u32) -> u32 {
    ((question_count as f64 * 0.1).floor() as u32).max(1)
}

/// Deterministic instruction template for quiz generation. Pure formatting:
/// every piece of structure the response parser depends on (title line,
/// per-question mark annotations, the answer-key and explanations markers)
/// is spelled out here.
pub fn build_quiz_prompt(params: &GenerationParameters) -> String {
    format!(
        r#"**Role:** Act as an expert educational content creator and a subject matter expert in {subject}. You specialize in designing effective quizzes for students in the Indian education system (CBSE/ICSE curriculum).

**Primary Task:** Generate a high-quality quiz based on the following detailed specifications.

**[Core Quiz Parameters]**
* **Topic:** "{topic}"
* **Class Level:** {class_level}
* **Subject:** {subject}
* **Language:** English
* **Marks per Question:** {marks} marks
* **Total Marks:** {total_marks} marks

**[Quiz Structure and Content]**
* **Total Number of Questions:** {count}
* **Marks Distribution:** Each question worth {marks} marks (Total: {total_marks} marks)
* **Difficulty Progression:** The quiz must follow a clear difficulty curve:
    * **Easy (Recall-based):** First {easy} questions should be simple, testing basic definitions and facts.
    * **Medium (Understanding & Application):** The next {medium} questions should require students to apply concepts or explain processes.
    * **Hard (Analysis & Evaluation):** The final {hard} questions should be challenging, requiring analysis, problem-solving, or evaluating scenarios (High Order Thinking Skills - HOTS).
* **Question Types:** Include a balanced mix of:
    * {mcq} Multiple Choice Questions (MCQs) with 4 distinct options (A, B, C, D).
    * {true_false} True or False questions.
    * {fill_blank} Fill-in-the-Blank questions.
    * {short_answer} Short Answer Questions (requiring a 1-2 sentence answer).
* **IMPORTANT:** All questions MUST be specifically about "{topic}" in {subject}. Do NOT create generic {subject} questions.

**[Formatting and Output Requirements]**
1.  **Quiz Title:**
    * Start with: "**QUIZ: {topic} - Class {class_level}**"

2.  **Quiz Section:**
    * Present all {count} questions clearly numbered from 1 to {count}.
    * Each question should show "({marks} marks)" after the question text.
    * For MCQs, ensure only one option is correct and the others (distractors) are plausible but incorrect.
    * Mark the correct answer with ✓ symbol.
    * The question text should be unambiguous and appropriate for the specified class level.

3.  **Answer Key Section:**
    * After the quiz, provide a separate section titled "{answer_key_marker}".
    * List the correct answer for each question (e.g., 1. B, 2. True, 3. Mitochondria).

4.  **Explanations Section:**
    * Following the answer key, provide another section titled "{explanations_marker}".
    * For EACH question, provide a brief (1-2 sentence) explanation for why the correct answer is right. This is crucial for learning.

**[Important Instructions]**
- Generate EXACTLY {count} questions (no more, no less)
- Each question must be worth EXACTLY {marks} marks
- Ensure questions are aligned with CBSE/ICSE curriculum for Class {class_level}
- Focus SPECIFICALLY on {topic} chapter/topic - NOT generic {subject}
- Use clear, grammatically correct language
- Make sure MCQ options are well-distributed and plausible
- Include real-world applications where relevant
- Maintain Indian educational context and examples
- CRITICAL: Do NOT create "General Knowledge" questions - stick to "{topic}"

Begin generating the quiz now based on all the above specifications."#,
        subject = params.subject,
        topic = params.topic,
        class_level = params.class_level,
        marks = params.marks_per_question,
        total_marks = params.total_marks,
        count = params.question_count,
        easy = easy_count(params.question_count),
        medium = medium_count(params.question_count),
        hard = hard_count(params.question_count),
        mcq = mcq_count(params.question_count),
        true_false = true_false_count(params.question_count),
        fill_blank = fill_blank_count(params.question_count),
        short_answer = short_answer_count(params.question_count),
        answer_key_marker = ANSWER_KEY_MARKER,
        explanations_marker = EXPLANATIONS_MARKER,
    )
}

/// Prompt for non-quiz messages: plain teaching assistance in the teacher's
/// own context.
pub fn build_assist_prompt(teacher: &TeacherContext, message: &str) -> String {
    format!(
        "You are an AI assistant helping a teacher named {name} who teaches {class_label}.\nBe helpful, professional, and provide practical teaching advice.\n\nTeacher's question: {message}",
        name = teacher.name,
        class_label = teacher.class_label,
        message = message,
    )
}
