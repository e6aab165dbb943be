use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::schemas::quiz::{AnswerConfidence, ParsedQuestion, TrueFalseAnswer};

pub const ANSWER_KEY_MARKER: &str = "--- ANSWER KEY ---";
pub const EXPLANATIONS_MARKER: &str = "--- EXPLANATIONS ---";
const ANSWER_KEY_FALLBACK_MARKER: &str = "ANSWER KEY";

/// Hard cap applied by the assembler, not by upstream stages.
pub const MAX_QUIZ_QUESTIONS: usize = 10;

const MAX_MCQ_OPTIONS: usize = 4;

/// Anything at or below this length is a misparsed fragment, not a question.
const MIN_QUESTION_TEXT_LEN: usize = 10;

const INLINE_MARKER_GLYPHS: [char; 2] = ['✓', '✔'];

const FALLBACK_EXPECTED_ANSWER: &str = "Students should provide a detailed explanation.";

/// The only error the parsing pipeline raises: every block was malformed or
/// the body held no numbered questions at all.
#[derive(Debug, Error)]
#[error("no questions could be parsed from the generated response; retry with a clearer topic")]
pub struct NoQuestionsParsed;

static BLOCK_START_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\d+\.\s+").expect("block start pattern"));

static ORDINAL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.").expect("ordinal pattern"));

static KEY_LINE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.\s*(.+)").expect("key line pattern"));

static QUESTION_LINE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s+").expect("question line pattern"));

static MARKS_ANNOTATION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\(\d+\s*marks?\)").expect("marks annotation pattern"));

static OPTION_LINE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^([a-d])[).]\s+(.+)").expect("option line pattern"));

/// The three zones of a generated response. `explanations` is carried for
/// completeness; the pipeline itself never consumes it.
#[derive(Debug, Clone, Copy)]
pub struct ResponseSections<'a> {
    pub body: &'a str,
    pub answer_key: &'a str,
    pub explanations: &'a str,
}

/// Split a raw response into quiz body, answer key, and explanations. Falls
/// back to the bare "ANSWER KEY" substring when the decorated marker is
/// missing; with no marker at all, the whole text is the body.
pub fn split_sections(response: &str) -> ResponseSections<'_> {
    let (body, rest) = match response.split_once(ANSWER_KEY_MARKER) {
        Some((body, rest)) => (body, rest),
        None => match response.split_once(ANSWER_KEY_FALLBACK_MARKER) {
            Some((body, rest)) => (body, rest),
            None => (response, ""),
        },
    };

    let (answer_key, explanations) = match rest.split_once(EXPLANATIONS_MARKER) {
        Some((answer_key, explanations)) => (answer_key, explanations),
        None => (rest, ""),
    };

    ResponseSections { body, answer_key, explanations }
}

/// Index the answer-key zone by question ordinal. Lines that do not start
/// with `<digits>.` are ignored without error.
pub fn index_answer_key(answer_key: &str) -> HashMap<u32, String> {
    let mut map = HashMap::new();

    for line in answer_key.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some(captures) = KEY_LINE_PATTERN.captures(line) else { continue };
        let Ok(ordinal) = captures[1].parse::<u32>() else { continue };
        map.insert(ordinal, captures[2].trim().to_string());
    }

    map
}

/// A contiguous run of text belonging to one numbered question.
#[derive(Debug, Clone, Copy)]
pub struct QuestionBlock<'a> {
    pub ordinal: u32,
    pub text: &'a str,
}

/// Split the quiz body at every line that starts a numbered question. The
/// delimiter stays with its block; preamble text before the first question
/// (the title line) is dropped, as are blocks too short to be real.
pub fn split_question_blocks(body: &str) -> Vec<QuestionBlock<'_>> {
    let starts: Vec<usize> = BLOCK_START_PATTERN.find_iter(body).map(|found| found.start()).collect();

    let mut blocks = Vec::with_capacity(starts.len());
    for (index, &start) in starts.iter().enumerate() {
        let end = starts.get(index + 1).copied().unwrap_or(body.len());
        let text = body[start..end].trim();
        if text.len() < MIN_QUESTION_TEXT_LEN {
            continue;
        }
        let Some(captures) = ORDINAL_PATTERN.captures(text) else { continue };
        let Ok(ordinal) = captures[1].parse::<u32>() else { continue };
        blocks.push(QuestionBlock { ordinal, text });
    }

    blocks
}

/// Classify one block and extract its fields, consulting the answer key by
/// ordinal. Returns `None` for malformed blocks (no usable question text,
/// or an MCQ with fewer than four options); those are dropped silently.
pub fn classify_block(
    block: &QuestionBlock<'_>,
    answer_key: &HashMap<u32, String>,
    marks_per_question: u32,
) -> Option<ParsedQuestion> {
    let key_entry = answer_key.get(&block.ordinal).map(String::as_str);
    let lines: Vec<&str> =
        block.text.lines().map(str::trim).filter(|line| !line.is_empty()).collect();

    let question = question_text(&lines)?;

    let lower = block.text.to_lowercase();
    let has_options = lines.iter().any(|line| OPTION_LINE_PATTERN.is_match(line));
    let has_true_false = lower.contains("true") && lower.contains("false");
    let has_fill_blank = block.text.contains("____");

    // First match wins. A block carrying both an option list and the words
    // "true"/"false" lands in the True/False arm; that ambiguity is part of
    // the established heuristic and changing it would re-grade existing
    // content.
    if has_options && !has_true_false {
        extract_mcq(&lines, key_entry, question, marks_per_question)
    } else if has_true_false {
        Some(extract_true_false(&lower, key_entry, question, marks_per_question))
    } else if has_fill_blank {
        Some(ParsedQuestion::FillBlank {
            question,
            correct_answer: key_entry.unwrap_or("").to_string(),
            points: marks_per_question,
        })
    } else {
        Some(ParsedQuestion::ShortAnswer {
            question,
            expected_answer: key_entry.unwrap_or(FALLBACK_EXPECTED_ANSWER).to_string(),
            points: marks_per_question,
        })
    }
}

/// Order accepted questions by printed ordinal and enforce the quiz-level
/// cap. An empty result is a hard stop: a quiz with zero questions has no
/// valid product.
pub fn assemble_questions(
    mut parsed: Vec<(u32, ParsedQuestion)>,
) -> Result<Vec<ParsedQuestion>, NoQuestionsParsed> {
    parsed.sort_by_key(|(ordinal, _)| *ordinal);
    parsed.truncate(MAX_QUIZ_QUESTIONS);

    if parsed.is_empty() {
        return Err(NoQuestionsParsed);
    }

    Ok(parsed.into_iter().map(|(_, question)| question).collect())
}

/// The full response pipeline: segment, index the answer key, split blocks,
/// classify each block, assemble.
pub fn parse_questions(
    response: &str,
    marks_per_question: u32,
) -> Result<Vec<ParsedQuestion>, NoQuestionsParsed> {
    let sections = split_sections(response);
    let answer_key = index_answer_key(sections.answer_key);
    let blocks = split_question_blocks(sections.body);

    tracing::debug!(
        blocks = blocks.len(),
        key_entries = answer_key.len(),
        "Parsing generated quiz response"
    );

    let parsed: Vec<(u32, ParsedQuestion)> = blocks
        .iter()
        .filter_map(|block| {
            classify_block(block, &answer_key, marks_per_question)
                .map(|question| (block.ordinal, question))
        })
        .collect();

    let questions = assemble_questions(parsed)?;
    tracing::debug!(questions = questions.len(), "Parsed quiz questions");

    Ok(questions)
}

/// The question statement: the first line that is either the numbered line
/// itself or carries a "(N marks)" annotation, stripped of both. Candidates
/// at or under the length floor are skipped and scanning continues.
fn question_text(lines: &[&str]) -> Option<String> {
    for line in lines {
        if QUESTION_LINE_PATTERN.is_match(line) || line.contains("marks)") {
            let stripped = QUESTION_LINE_PATTERN.replace(line, "");
            let cleaned = MARKS_ANNOTATION_PATTERN.replace_all(&stripped, "").trim().to_string();
            if cleaned.len() > MIN_QUESTION_TEXT_LEN {
                return Some(cleaned);
            }
        }
    }
    None
}

fn extract_mcq(
    lines: &[&str],
    key_entry: Option<&str>,
    question: String,
    points: u32,
) -> Option<ParsedQuestion> {
    let mut options: Vec<String> = Vec::new();
    let mut inline_index: Option<usize> = None;
    let mut key_index: Option<usize> = None;

    for line in lines {
        let Some(captures) = OPTION_LINE_PATTERN.captures(line) else { continue };
        let letter = captures[1].chars().next().unwrap_or_default();
        let text = captures[2].replace(INLINE_MARKER_GLYPHS, "").trim().to_string();

        let index = options.len();
        options.push(text);
        if index >= MAX_MCQ_OPTIONS {
            // Resolution only considers the four options that are kept.
            continue;
        }

        if line.contains(INLINE_MARKER_GLYPHS) {
            inline_index = Some(index);
        }
        if key_entry.is_some_and(|key| key_matches_letter(key, letter)) {
            key_index = Some(index);
        }
    }

    if options.len() < MAX_MCQ_OPTIONS {
        return None;
    }
    options.truncate(MAX_MCQ_OPTIONS);
    let options: [String; 4] = options.try_into().ok()?;

    // An inline marker wins over the answer key; with neither, index 0.
    let (correct_answer, confidence) = match inline_index.or(key_index) {
        Some(index) => (index as u32, AnswerConfidence::Resolved),
        None => (0, AnswerConfidence::Defaulted),
    };

    Some(ParsedQuestion::Mcq { question, options, correct_answer, points, confidence })
}

fn key_matches_letter(key: &str, letter: char) -> bool {
    key.trim().chars().next().is_some_and(|first| first.eq_ignore_ascii_case(&letter))
}

fn extract_true_false(
    lower_block: &str,
    key_entry: Option<&str>,
    question: String,
    points: u32,
) -> ParsedQuestion {
    let (correct_answer, confidence) = match key_entry {
        Some(key) => {
            let value = if key.to_lowercase().contains("false") {
                TrueFalseAnswer::False
            } else {
                TrueFalseAnswer::True
            };
            (value, AnswerConfidence::Resolved)
        }
        None if lower_block.contains("false ✓") || lower_block.contains("false ✔") => {
            (TrueFalseAnswer::False, AnswerConfidence::Resolved)
        }
        None => (TrueFalseAnswer::True, AnswerConfidence::Defaulted),
    };

    ParsedQuestion::TrueFalse { question, correct_answer, points, confidence }
}
