//! Text normalization and term matching shared by every scoring stage.
//!
//! All comparisons happen on normalized text: lowercase ASCII alphanumerics
//! separated by single spaces. Matching is therefore deterministic and
//! independent of punctuation or bullet styles in the job text.

/// Tokens ignored by `tokenize`. Short, generic words that carry no signal.
const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "with", "that", "this", "from", "have", "your", "will", "you", "our",
    "are", "has", "into", "using", "about", "years", "year", "plus", "team", "role", "work",
    "experience",
];

/// Interchangeable phrasings. A term in a group matches text containing any member.
pub const SYNONYM_GROUPS: &[&[&str]] = &[
    &["change management", "adoption", "enablement", "training"],
    &["prompt engineering", "llm prompting", "prompt design"],
    &["agentic workflows", "agents", "ai orchestration"],
    &["digital transformation", "dx", "modernization"],
];

/// Lowercases, replaces every non-alphanumeric ASCII character with a space,
/// and collapses whitespace.
pub fn normalize(input: &str) -> String {
    let mapped: String = input
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                ' '
            }
        })
        .collect();

    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalized tokens of at least three characters, stop words removed.
pub fn tokenize(input: &str) -> Vec<String> {
    normalize(input)
        .split(' ')
        .filter(|token| token.len() >= 3 && !STOP_WORDS.contains(token))
        .map(str::to_string)
        .collect()
}

fn synonym_group(term: &str) -> Option<&'static [&'static str]> {
    SYNONYM_GROUPS
        .iter()
        .copied()
        .find(|group| group.contains(&term))
}

/// Exact phrase test on normalized inputs, no synonym expansion.
///
/// Multi-word phrases match as substrings; single words must equal a whole token,
/// so `ai` never matches inside `said`.
pub fn contains_phrase(normalized_text: &str, phrase: &str) -> bool {
    if normalized_text.is_empty() || phrase.is_empty() {
        return false;
    }

    if phrase.contains(' ') {
        normalized_text.contains(phrase)
    } else {
        normalized_text.split(' ').any(|token| token == phrase)
    }
}

/// Term test on normalized inputs with synonym expansion.
pub fn contains_term(normalized_text: &str, normalized_term: &str) -> bool {
    if normalized_text.is_empty() || normalized_term.is_empty() {
        return false;
    }

    match synonym_group(normalized_term) {
        Some(group) => group
            .iter()
            .any(|candidate| contains_phrase(normalized_text, candidate)),
        None => contains_phrase(normalized_text, normalized_term),
    }
}

/// Shortens `value` to at most `max_chars` characters, marking the cut with `...`.
pub fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let kept: String = value.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{kept}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_punctuation_and_case() {
        assert_eq!(normalize("  DR/BCP -- Delivery!  "), "dr bcp delivery");
        assert_eq!(normalize("E-commerce"), "e commerce");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_normalize_drops_non_ascii() {
        assert_eq!(normalize("Café • Tokyo"), "caf tokyo");
    }

    #[test]
    fn test_tokenize_drops_short_and_stop_words() {
        let tokens = tokenize("The team will build AI tools for our clients");
        assert_eq!(tokens, vec!["build", "tools", "clients"]);
    }

    #[test]
    fn test_single_word_requires_whole_token() {
        assert!(!contains_term("she said hello", "ai"));
        assert!(contains_term("applied ai consulting", "ai"));
    }

    #[test]
    fn test_multi_word_uses_substring() {
        assert!(contains_term("strong prompt engineering skills", "prompt engineering"));
        assert!(!contains_term("prompt and engineering", "prompt engineering"));
    }

    #[test]
    fn test_synonym_group_expands_term() {
        assert!(contains_term("drive user adoption of new tools", "change management"));
        assert!(contains_term("led change management", "training"));
        assert!(!contains_phrase("drive user adoption", "change management"));
    }

    #[test]
    fn test_empty_inputs_never_match() {
        assert!(!contains_term("", "python"));
        assert!(!contains_term("python", ""));
    }

    #[test]
    fn test_truncate_marks_cut() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 8), "abcde...");
    }
}
