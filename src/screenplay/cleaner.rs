// @module: Line-level cleanup of text extracted from PDF pages

use once_cell::sync::Lazy;
use regex::Regex;

// @const: Line made only of decimal digits; `\d` is Unicode Nd, so "½" and "Ⅳ" do not count
static PAGE_NUMBER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d+$").unwrap()
});

/// Returns the trimmed lines of `raw_text` that survive artifact filtering.
///
/// Dropped lines: blank lines, bare page numbers ("12") and "Page 12" style
/// footers. Order is preserved and no line is split or merged.
pub fn clean_lines(raw_text: &str) -> Vec<&str> {
    raw_text
        .split('\n')
        .map(str::trim)
        .filter(|line| !is_artifact(line))
        .collect()
}

/// Newline-joined form of [`clean_lines`], ready for segmentation
pub fn clean_text(raw_text: &str) -> String {
    clean_lines(raw_text).join("\n")
}

// @checks: Line carries no screenplay text
fn is_artifact(line: &str) -> bool {
    line.is_empty() || is_page_number(line) || is_page_footer(line)
}

fn is_page_number(line: &str) -> bool {
    PAGE_NUMBER_REGEX.is_match(line)
}

// "Page 12", "PAGE iv" - exactly two words, the first being "page"
fn is_page_footer(line: &str) -> bool {
    line.to_lowercase().starts_with("page ") && line.split_whitespace().count() == 2
}
