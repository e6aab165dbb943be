use std::sync::LazyLock;

use regex::Regex;

use crate::schemas::quiz::GenerationParameters;

pub const DEFAULT_SUBJECT: &str = "General Studies";
pub const DEFAULT_TOPIC: &str = "General Knowledge";
pub const DEFAULT_CLASS_LEVEL: &str = "10";
pub const DEFAULT_QUESTION_COUNT: u32 = 10;
pub const DEFAULT_MARKS_PER_QUESTION: u32 = 2;

/// Fixed substitution table for misspellings teachers actually type. A
/// deterministic pass, not general spell-checking.
const SPELLING_FIXES: &[(&str, &str)] = &[
    ("chpter", "chapter"),
    ("chater", "chapter"),
    ("chaptre", "chapter"),
    ("subjct", "subject"),
    ("sbject", "subject"),
    ("qustion", "question"),
    ("questin", "question"),
    ("queston", "question"),
    ("minuts", "minutes"),
    ("minuets", "minutes"),
    ("miuntes", "minutes"),
];

/// Ordered subject rules: the first rule with a matching keyword wins, so
/// the order is a tie-break policy, not a parallel search.
const SUBJECT_RULES: &[(&str, &[&str])] = &[
    ("Mathematics", &["math", "trigono", "algebra", "geometry"]),
    ("Physics", &["physics", "force", "motion", "energy"]),
    ("Chemistry", &["chemistry", "reaction", "element", "compound"]),
    ("Biology", &["biology", "bio ", "cell", "organism", "plant", "respir", "digest", "photo"]),
    ("History", &["history", "freedom", "struggle", "war"]),
    ("Geography", &["geography", "climate", "earth", "map"]),
    ("English", &["english", "grammar", "literature"]),
    ("Science", &["science"]),
];

/// Curriculum topic names matched by substring, tried after the positional
/// "chapter ..." / "on ..." patterns. First hit wins.
const TOPIC_SUBSTRINGS: &[(&str, &str)] = &[
    ("trigono", "Trigonometry"),
    ("algebra", "Algebra"),
    ("geometry", "Geometry"),
    ("calculus", "Calculus"),
    ("probability", "Probability"),
    ("statistics", "Statistics"),
    ("motion", "Motion"),
    ("force", "Force and Laws of Motion"),
    ("energy", "Energy"),
    ("electric", "Electricity"),
    ("magnet", "Magnetism"),
    ("light", "Light"),
    ("respir", "Respiration"),
    ("digest", "Digestion"),
    ("photo", "Photosynthesis"),
    ("cell", "Cell Biology"),
    ("inherit", "Heredity and Genetics"),
    ("genetic", "Heredity and Genetics"),
    ("evolut", "Evolution"),
    ("reproduc", "Reproduction"),
    ("excret", "Excretion"),
    ("nervous", "Nervous System"),
    ("circulat", "Circulatory System"),
    ("blood", "Circulatory System"),
    ("acid", "Acids, Bases and Salts"),
    ("base", "Acids, Bases and Salts"),
    ("reaction", "Chemical Reactions"),
    ("periodic", "Periodic Table"),
    ("carbon", "Carbon and its Compounds"),
    ("metal", "Metals and Non-metals"),
];

/// Last-resort flat vocabulary scan.
const TOPIC_KEYWORDS: &[&str] = &[
    "respiration",
    "digestion",
    "photosynthesis",
    "heredity",
    "genetics",
    "evolution",
    "reproduction",
    "excretion",
    "nervous",
    "circulation",
    "trigonometry",
    "algebra",
    "geometry",
    "calculus",
    "probability",
    "motion",
    "force",
    "energy",
    "electricity",
    "magnetism",
    "light",
    "acids",
    "bases",
    "salts",
    "reactions",
    "periodic",
    "carbon",
    "metals",
];

static CHAPTER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"chapter\s+([a-z\s,\-']+?)(?:\s+make|\s+set|\s+of|\s+for|\s+class|\s+\d|\.|\s*$)")
        .expect("chapter pattern")
});

static SUBJECT_CHAPTER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"subject\s+\w+\s+chapter\s+([a-z\s,\-']+?)(?:\s+make|\s+set|\s+of|\s+for|\s+class|\s+\d|\.|\s*$)",
    )
    .expect("subject chapter pattern")
});

static ON_ABOUT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:on|about)\s+([a-z\s,\-']+?)(?:\s+for|\s+class|\s+make|\s+set|\.|\s*$)")
        .expect("on/about pattern")
});

static QUESTION_COUNT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*(?:question|ques|q)").expect("question count pattern"));

static MARKS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:each\s+of\s+)?(\d+)\s*marks?").expect("marks pattern"));

static DURATION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*(?:minutes?|mins?|min)").expect("duration pattern"));

static DIGIT_RUN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("digit run pattern"));

/// Infer quiz generation parameters from a teacher's free-text instruction
/// and the teacher-context class label. Every field has a deterministic
/// default, so this function cannot fail.
pub fn extract_parameters(instruction: &str, class_label: &str) -> GenerationParameters {
    let normalized = normalize_instruction(instruction);

    let subject = infer_subject(&normalized);
    let topic = infer_topic(&normalized, subject);

    let question_count = capture_u32(&QUESTION_COUNT_PATTERN, &normalized)
        .filter(|count| *count >= 1)
        .unwrap_or(DEFAULT_QUESTION_COUNT);
    let marks_per_question = capture_u32(&MARKS_PATTERN, &normalized)
        .filter(|marks| *marks >= 1)
        .unwrap_or(DEFAULT_MARKS_PER_QUESTION);
    let total_marks = question_count * marks_per_question;
    let duration_minutes = capture_u32(&DURATION_PATTERN, &normalized)
        .filter(|minutes| *minutes >= 1)
        .unwrap_or_else(|| (total_marks * 2).clamp(15, 120));

    GenerationParameters {
        subject: subject.to_string(),
        topic,
        class_level: class_level_from_label(class_label),
        question_count,
        marks_per_question,
        total_marks,
        duration_minutes,
    }
}

/// First digit run in the class label (e.g. "Class 10A" -> "10").
pub fn class_level_from_label(class_label: &str) -> String {
    DIGIT_RUN_PATTERN
        .find(class_label)
        .map(|found| found.as_str().to_string())
        .unwrap_or_else(|| DEFAULT_CLASS_LEVEL.to_string())
}

fn normalize_instruction(instruction: &str) -> String {
    let mut normalized = instruction.to_lowercase();
    for (typo, fix) in SPELLING_FIXES {
        normalized = normalized.replace(typo, fix);
    }
    normalized
}

fn infer_subject(normalized: &str) -> &'static str {
    SUBJECT_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| normalized.contains(keyword)))
        .map(|(subject, _)| *subject)
        .unwrap_or(DEFAULT_SUBJECT)
}

/// The topic priority chain: positional patterns first, then the curriculum
/// tables, then the subject name, then the generic fallback. Evaluated in
/// order until one extractor succeeds.
fn infer_topic(normalized: &str, subject: &str) -> String {
    let extractors: &[fn(&str) -> Option<String>] = &[
        topic_from_chapter_phrase,
        topic_from_subject_chapter_phrase,
        topic_from_on_about_phrase,
        topic_from_known_substrings,
        topic_from_keyword_scan,
    ];

    if let Some(raw) = extractors.iter().find_map(|extract| extract(normalized)) {
        return tidy_topic(&raw);
    }

    if subject != DEFAULT_SUBJECT {
        return subject.to_string();
    }

    DEFAULT_TOPIC.to_string()
}

fn topic_from_chapter_phrase(normalized: &str) -> Option<String> {
    capture_trimmed(&CHAPTER_PATTERN, normalized)
}

fn topic_from_subject_chapter_phrase(normalized: &str) -> Option<String> {
    capture_trimmed(&SUBJECT_CHAPTER_PATTERN, normalized)
}

fn topic_from_on_about_phrase(normalized: &str) -> Option<String> {
    capture_trimmed(&ON_ABOUT_PATTERN, normalized)
}

fn topic_from_known_substrings(normalized: &str) -> Option<String> {
    TOPIC_SUBSTRINGS
        .iter()
        .find(|(needle, _)| normalized.contains(needle))
        .map(|(_, topic)| topic.to_string())
}

fn topic_from_keyword_scan(normalized: &str) -> Option<String> {
    TOPIC_KEYWORDS
        .iter()
        .find(|keyword| normalized.contains(*keyword))
        .map(|keyword| keyword.to_string())
}

/// Collapse whitespace and title-case the extracted phrase. Phrases carrying
/// "and" keep their original casing so connective words stay lowercase.
fn tidy_topic(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.contains("and") {
        return collapsed;
    }
    title_case(&collapsed)
}

fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn capture_trimmed(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .map(|captures| captures[1].trim().to_string())
        .filter(|value| !value.is_empty())
}

fn capture_u32(pattern: &Regex, text: &str) -> Option<u32> {
    pattern.captures(text).and_then(|captures| captures[1].parse::<u32>().ok())
}
