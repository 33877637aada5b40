//! JD section parser — splits raw job text into responsibilities, requirements,
//! nice-to-haves, languages and general lines.
//!
//! A line belongs to exactly one section: the one opened by the most recent
//! heading, or `general` before any heading appears. Heading lines themselves
//! are discarded, bullets and numbering are stripped.

use once_cell::sync::Lazy;
use regex::Regex;

/// Headings longer than this are treated as content.
const MAX_HEADING_CHARS: usize = 80;
/// Lines taken from the whole text when no usable sections exist.
const FALLBACK_LINE_LIMIT: usize = 28;

static BULLET_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-*•]\s+").unwrap());
static NUMBER_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+[.)]\s+").unwrap());
static TRAILING_PUNCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[:\-]+$").unwrap());

static RESPONSIBILITIES_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"responsibilit|what you('|’)ll do|duties|scope").unwrap());
static REQUIREMENTS_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"requirements|must[- ]?have|required|qualifications|you have").unwrap()
});
static NICE_TO_HAVE_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"nice to have|preferred|bonus|good to have|plus").unwrap());
static LANGUAGES_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"languages|tech stack|tooling|tools").unwrap());

/// Named JD section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionName {
    Responsibilities,
    Requirements,
    NiceToHave,
    Languages,
    General,
}

/// Job text split into its sections, in original line order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedJD {
    pub responsibilities: Vec<String>,
    pub requirements: Vec<String>,
    pub nice_to_have: Vec<String>,
    pub languages: Vec<String>,
    pub general: Vec<String>,
}

impl ParsedJD {
    fn section_mut(&mut self, name: SectionName) -> &mut Vec<String> {
        match name {
            SectionName::Responsibilities => &mut self.responsibilities,
            SectionName::Requirements => &mut self.requirements,
            SectionName::NiceToHave => &mut self.nice_to_have,
            SectionName::Languages => &mut self.languages,
            SectionName::General => &mut self.general,
        }
    }

    /// True when any heading-delimited section received at least one line.
    pub fn has_sections(&self) -> bool {
        !self.responsibilities.is_empty()
            || !self.requirements.is_empty()
            || !self.nice_to_have.is_empty()
            || !self.languages.is_empty()
    }

    /// Rebuilds canonical job text. Parsing the result yields an identical `ParsedJD`.
    pub fn to_text(&self) -> String {
        let mut out: Vec<String> = self.general.iter().map(|l| format!("- {l}")).collect();

        let labeled = [
            ("Responsibilities:", &self.responsibilities),
            ("Requirements:", &self.requirements),
            ("Nice to have:", &self.nice_to_have),
            ("Languages:", &self.languages),
        ];
        for (heading, lines) in labeled {
            if lines.is_empty() {
                continue;
            }
            out.push(heading.to_string());
            out.extend(lines.iter().map(|l| format!("- {l}")));
        }

        out.join("\n")
    }
}

fn is_list_item(line: &str) -> bool {
    BULLET_PREFIX.is_match(line) || NUMBER_PREFIX.is_match(line)
}

/// Returns the section a heading line opens, or `None` for content lines.
///
/// Bulleted or numbered lines are always content.
pub fn detect_section_heading(line: &str) -> Option<SectionName> {
    let trimmed = line.trim();
    if is_list_item(trimmed) {
        return None;
    }

    let lower = trimmed.to_lowercase();
    let lower = TRAILING_PUNCT.replace(&lower, "");
    let lower = lower.trim();
    if lower.chars().count() > MAX_HEADING_CHARS {
        return None;
    }

    if RESPONSIBILITIES_HEADING.is_match(lower) {
        Some(SectionName::Responsibilities)
    } else if REQUIREMENTS_HEADING.is_match(lower) {
        Some(SectionName::Requirements)
    } else if NICE_TO_HAVE_HEADING.is_match(lower) {
        Some(SectionName::NiceToHave)
    } else if LANGUAGES_HEADING.is_match(lower) {
        Some(SectionName::Languages)
    } else {
        None
    }
}

/// Strips leading bullet markers and numbering until none remain.
pub fn clean_line(line: &str) -> String {
    let mut current = line.trim().to_string();
    loop {
        let without_bullet = BULLET_PREFIX.replace(&current, "");
        let stripped = NUMBER_PREFIX.replace(&without_bullet, "").trim().to_string();
        if stripped == current {
            return current;
        }
        current = stripped;
    }
}

pub fn split_into_sections(jd_text: &str) -> ParsedJD {
    let mut parsed = ParsedJD::default();
    let mut current = SectionName::General;

    for raw in jd_text.lines() {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(section) = detect_section_heading(trimmed) {
            current = section;
            continue;
        }

        let cleaned = clean_line(trimmed);
        if !cleaned.is_empty() {
            parsed.section_mut(current).push(cleaned);
        }
    }

    parsed
}

/// First cleaned content lines of the whole text, used when sections are missing.
pub fn extract_lines(jd_text: &str) -> Vec<String> {
    jd_text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && detect_section_heading(line).is_none())
        .map(clean_line)
        .filter(|line| !line.is_empty())
        .take(FALLBACK_LINE_LIMIT)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECTIONED_JD: &str = "Position: AI Consultant\n\
        Company: Financial Services\n\
        \n\
        Responsibilities:\n\
        - Provide AI strategy consulting\n\
        - Design RAG systems for tax and finance workflows\n\
        \n\
        Requirements:\n\
        1. Experience with RAG and vector search\n\
        2) Python and LLM experience\n\
        \n\
        Nice to have:\n\
        * Program governance experience\n\
        Languages:\n\
        • English";

    #[test]
    fn test_split_assigns_lines_to_sections() {
        let parsed = split_into_sections(SECTIONED_JD);
        assert_eq!(
            parsed.general,
            vec!["Position: AI Consultant", "Company: Financial Services"]
        );
        assert_eq!(parsed.responsibilities.len(), 2);
        assert_eq!(
            parsed.requirements,
            vec!["Experience with RAG and vector search", "Python and LLM experience"]
        );
        assert_eq!(parsed.nice_to_have, vec!["Program governance experience"]);
        assert_eq!(parsed.languages, vec!["English"]);
        assert!(parsed.has_sections());
    }

    #[test]
    fn test_heading_variants() {
        assert_eq!(
            detect_section_heading("What you'll do"),
            Some(SectionName::Responsibilities)
        );
        assert_eq!(
            detect_section_heading("Must-have skills:"),
            Some(SectionName::Requirements)
        );
        assert_eq!(
            detect_section_heading("Bonus points --"),
            Some(SectionName::NiceToHave)
        );
        assert_eq!(
            detect_section_heading("Tech stack"),
            Some(SectionName::Languages)
        );
        assert_eq!(detect_section_heading("Location: Tokyo"), None);
    }

    #[test]
    fn test_bullets_and_long_lines_are_never_headings() {
        assert_eq!(detect_section_heading("- Requirements gathering with clients"), None);
        assert_eq!(detect_section_heading("3. Preferred vendors"), None);
        let long = format!("Responsibilities {}", "x".repeat(80));
        assert_eq!(detect_section_heading(&long), None);
    }

    #[test]
    fn test_unsectioned_text_goes_to_general() {
        let parsed = split_into_sections("Looking for an AI consultant.\nRemote friendly.");
        assert!(!parsed.has_sections());
        assert_eq!(parsed.general.len(), 2);
    }

    #[test]
    fn test_parse_is_idempotent() {
        let once = split_into_sections(SECTIONED_JD);
        let twice = split_into_sections(&once.to_text());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_parse_is_idempotent_for_awkward_lines() {
        let jd = "- - nested bullet\nscope\n-tools\n1. - numbered bullet\nplain line";
        let once = split_into_sections(jd);
        assert_eq!(split_into_sections(&once.to_text()), once);
    }

    #[test]
    fn test_clean_line_strips_stacked_markers() {
        assert_eq!(clean_line("- 1. 2) Build pipelines"), "Build pipelines");
        assert_eq!(clean_line("-dash without space"), "-dash without space");
    }

    #[test]
    fn test_extract_lines_skips_headings_and_caps() {
        let mut text = String::from("Requirements:\n");
        for i in 0..40 {
            text.push_str(&format!("- item {i}\n"));
        }
        let lines = extract_lines(&text);
        assert_eq!(lines.len(), 28);
        assert_eq!(lines[0], "item 0");
    }
}
