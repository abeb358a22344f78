/*!
 * Scene heading detection.
 *
 * A line is tested against an ordered list of detectors; the first one that
 * recognizes the line as a heading decides its id and header text:
 *
 * 1. `DuplicatedNumber` - "INT. HOUSE - NIGHT 11 11", a PDF extraction
 *    artifact where the scene number is printed twice.
 * 2. `Keyword` - lines starting with a scene or location marker
 *    ("SCENE", "INT.", "EXT.", "I/E." and their Vietnamese forms).
 * 3. `CatchAll` - any fully uppercase line containing a digit.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

// @const: Heading followed by the same scene number twice at end of line
static DUPLICATED_NUMBER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.*?)\s+([0-9]+[A-Z]?)\s+([0-9]+[A-Z]?)\s*$").unwrap()
});

// @const: Scene/location markers that open a heading
static KEYWORD_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:CẢNH|SCENE|PHÂN ĐOẠN|INT\.|EXT\.|NỘI\.|NGOẠI\.|I/E\.|BỐI CẢNH)").unwrap()
});

// @const: Trailing scene number, e.g. "23" or "35A"
static TRAILING_ID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+[A-Z]*)\s*$").unwrap()
});

// @const: Any decimal digit, the same class the id patterns use
static DIGIT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d").unwrap()
});

// @const: Uppercase word with digits glued to it ("NIGHT23")
static STUCK_DIGITS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([A-ZĂÂĐÊÔƠƯÁÀẢÃẠÉÈẺẼẸÍÌỈĨỊÓÒỎÕỌÚÙỦŨỤÝỲỶỸỴ]+)(\d+)").unwrap()
});

/// Which detector recognized a heading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderLayer {
    /// Scene number duplicated at the end of the line
    DuplicatedNumber,
    /// Line opens with a scene/location keyword
    Keyword,
    /// Uppercase line containing a digit; heuristic, may misfire on action lines
    CatchAll,
}

impl fmt::Display for HeaderLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderLayer::DuplicatedNumber => write!(f, "duplicated_number"),
            HeaderLayer::Keyword => write!(f, "keyword"),
            HeaderLayer::CatchAll => write!(f, "catch_all"),
        }
    }
}

/// A recognized scene heading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMatch {
    /// Detector that fired
    pub layer: HeaderLayer,
    /// Scene number read from the line, if any
    pub scene_id: Option<String>,
    /// Heading text with the scene number removed
    pub header: String,
}

impl HeaderMatch {
    fn new(layer: HeaderLayer, scene_id: Option<String>, header: String) -> Self {
        Self { layer, scene_id, header }
    }
}

/// A single heading detector: returns a match or `None` to defer to the next one
pub type HeaderDetector = fn(&str) -> Option<HeaderMatch>;

/// Detectors in priority order
pub const DETECTORS: [HeaderDetector; 3] = [
    detect_duplicated_number,
    detect_keyword_heading,
    detect_uppercase_heading,
];

/// Classify a trimmed line, returning the first detector match
pub fn detect_header(line: &str) -> Option<HeaderMatch> {
    DETECTORS.iter().find_map(|detect| detect(line))
}

/// "INT. WAREHOUSE - NIGHT 11 11" -> id "11", header "INT. WAREHOUSE - NIGHT"
pub fn detect_duplicated_number(line: &str) -> Option<HeaderMatch> {
    let caps = DUPLICATED_NUMBER_REGEX.captures(line)?;
    let first = caps.get(2)?.as_str();
    let second = caps.get(3)?.as_str();

    // Both tokens are whole words, so byte equality is the duplicate check
    if first != second {
        return None;
    }

    let header = caps.get(1).map_or("", |m| m.as_str()).trim().to_string();
    Some(HeaderMatch::new(HeaderLayer::DuplicatedNumber, Some(first.to_string()), header))
}

/// Keyword-anchored headings such as "SCENE 12" or "EXT. BEACH - DAY 5A"
pub fn detect_keyword_heading(line: &str) -> Option<HeaderMatch> {
    if !KEYWORD_REGEX.is_match(line) {
        return None;
    }

    let (scene_id, header) = match split_trailing_id(line) {
        Some((head, id)) => {
            let unstuck = STUCK_DIGITS_REGEX.replace_all(head, "$1");
            let normalized = unstuck.split_whitespace().collect::<Vec<_>>().join(" ");
            (Some(id.to_string()), normalized)
        }
        None => (None, line.to_string()),
    };

    Some(HeaderMatch::new(HeaderLayer::Keyword, scene_id, header))
}

/// Fully uppercase lines with at least one digit, e.g. "WAREHOUSE 9"
pub fn detect_uppercase_heading(line: &str) -> Option<HeaderMatch> {
    if !is_all_uppercase(line) || !DIGIT_REGEX.is_match(line) {
        return None;
    }

    let (scene_id, header) = match split_trailing_id(line) {
        Some((head, id)) => (Some(id.to_string()), head.to_string()),
        None => (None, line.to_string()),
    };

    Some(HeaderMatch::new(HeaderLayer::CatchAll, scene_id, header))
}

// Splits "EXT. BEACH - DAY 5A" into ("EXT. BEACH - DAY", "5A")
fn split_trailing_id(line: &str) -> Option<(&str, &str)> {
    let caps = TRAILING_ID_REGEX.captures(line)?;
    let whole = caps.get(0)?;
    let id = caps.get(1)?.as_str();
    Some((line[..whole.start()].trim(), id))
}

// At least one cased character and no lowercase ones
fn is_all_uppercase(line: &str) -> bool {
    let mut has_cased = false;
    for c in line.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            has_cased = true;
        }
    }
    has_cased
}
