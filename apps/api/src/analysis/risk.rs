//! Risk & constraint evaluator — compares job constraints (location,
//! languages, fluency, capacity, contract type) against profile constraints.
//!
//! Hard gates cap the final score; soft flags only deduct from this
//! dimension. Multiple caps compose via `min`.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::analysis::text::{contains_phrase, normalize};
use crate::config::AnalyzerConfig;
use crate::models::profile::Constraints;

pub const SPOKEN_LANGUAGES: &[&str] = &[
    "english", "japanese", "spanish", "french", "german", "mandarin", "cantonese", "korean",
];

static ONSITE_REQUIRED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(onsite only|on-site only|on site only|fully onsite|fully on-site|must be located|relocat(e|ion) required|5 days (in|on)[- ]?(office|site)|in office five days|in-office|no remote)",
    )
    .unwrap()
});

static JAPANESE_FLUENCY_REQUIRED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(\b(native|fluent|fluency|advanced)\b[^\n]{0,24}\bjapanese\b|\bjapanese\b[^\n]{0,24}\b(native|fluent|fluency|advanced)\b|jlpt\s*n1|japanese\s*n1)",
    )
    .unwrap()
});

/// Profile language entry signalling fluent Japanese. "Business" does not qualify.
static FLUENT_SIGNAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(fluent|fluency|native|bilingual|n1|advanced)\b").unwrap());

/// Matches only when the whole job text is a capacity line.
static CAPACITY_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*capacity\s*:\s*(part-time|part time|full-time|full time|contract)\s*$")
        .unwrap()
});

static CONTRACT_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(contract only|contract-only|short term contract|no full time)").unwrap());

static REMOTE_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(remote only|remote-only|fully remote|100% remote)").unwrap());

static PROFILE_ONSITE_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(onsite only|on site only|no remote)").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskKind {
    JapaneseFluency,
    OnsiteRequired,
    LanguageMismatch,
    ContractOnly,
    LocationMismatch,
    ContractAvailability,
    AvailabilityMismatch,
}

impl RiskKind {
    pub fn code(self) -> &'static str {
        match self {
            RiskKind::JapaneseFluency => "JAPANESE_FLUENCY",
            RiskKind::OnsiteRequired => "ONSITE_REQUIRED",
            RiskKind::LanguageMismatch => "LANGUAGE_MISMATCH",
            RiskKind::ContractOnly => "CONTRACT_ONLY",
            RiskKind::LocationMismatch => "LOCATION_MISMATCH",
            RiskKind::ContractAvailability => "CONTRACT_AVAILABILITY",
            RiskKind::AvailabilityMismatch => "AVAILABILITY_MISMATCH",
        }
    }
}

/// A flagged constraint conflict. Rendered as `"CODE: message"` at the boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskFlag {
    pub kind: RiskKind,
    pub message: String,
}

impl fmt::Display for RiskFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.code(), self.message)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RiskEvaluation {
    pub score: u32,
    pub notes: String,
    pub flags: Vec<RiskFlag>,
    pub hard_cap: Option<u32>,
}

impl RiskEvaluation {
    pub fn has_hard_gate(&self) -> bool {
        self.hard_cap.is_some()
    }
}

struct RiskAccumulator {
    penalty: u32,
    flags: Vec<RiskFlag>,
    hard_cap: Option<u32>,
}

impl RiskAccumulator {
    fn flag(&mut self, kind: RiskKind, message: String, penalty: u32) {
        let flag = RiskFlag { kind, message };
        if !self.flags.contains(&flag) {
            self.flags.push(flag);
            self.penalty += penalty;
        }
    }

    fn gate(&mut self, kind: RiskKind, message: String, cap: u32) {
        self.flag(kind, message, 2);
        self.hard_cap = Some(self.hard_cap.map_or(cap, |c| c.min(cap)));
    }
}

/// Languages from the fixed list that appear in the job text.
pub fn detect_language_requirements(normalized_jd: &str) -> Vec<&'static str> {
    SPOKEN_LANGUAGES
        .iter()
        .copied()
        .filter(|lang| contains_phrase(normalized_jd, lang))
        .collect()
}

fn availability_covers(normalized_availability: &str, capacity: &str) -> bool {
    let wanted = normalize(capacity);
    contains_phrase(normalized_availability, &wanted)
}

pub fn evaluate_risk(
    jd_text: &str,
    constraints: &Constraints,
    weight: u32,
    config: &AnalyzerConfig,
) -> RiskEvaluation {
    let normalized_jd = normalize(jd_text);
    let location = normalize(&constraints.location);
    let availability = normalize(&constraints.availability);
    let profile_languages: Vec<String> = constraints.languages.iter().map(|l| normalize(l)).collect();

    let mut acc = RiskAccumulator {
        penalty: 0,
        flags: Vec::new(),
        hard_cap: None,
    };

    // Onsite vs remote/hybrid preference
    let prefers_remote = contains_phrase(&location, "remote") || contains_phrase(&location, "hybrid");
    if ONSITE_REQUIRED.is_match(jd_text) && prefers_remote {
        acc.gate(
            RiskKind::OnsiteRequired,
            format!(
                "Job appears onsite-required but profile location preference suggests remote/hybrid. Score capped at {}.",
                config.onsite_hard_cap
            ),
            config.onsite_hard_cap,
        );
    }

    // Spoken languages
    let required_languages = detect_language_requirements(&normalized_jd);
    for &language in &required_languages {
        let covered = profile_languages
            .iter()
            .any(|entry| contains_phrase(entry, language));
        if !covered {
            acc.flag(
                RiskKind::LanguageMismatch,
                format!("No evidence found for required language: {language}."),
                2,
            );
        }
    }

    // Japanese fluency
    let profile_fluent_japanese = profile_languages
        .iter()
        .any(|entry| contains_phrase(entry, "japanese") && FLUENT_SIGNAL.is_match(entry));
    if JAPANESE_FLUENCY_REQUIRED.is_match(jd_text) && !profile_fluent_japanese {
        acc.gate(
            RiskKind::JapaneseFluency,
            format!(
                "Job requires fluent or native Japanese, but profile does not show fluent Japanese. Score capped at {}.",
                config.japanese_hard_cap
            ),
            config.japanese_hard_cap,
        );
    } else if required_languages.contains(&"japanese")
        && !profile_languages
            .iter()
            .any(|entry| contains_phrase(entry, "japanese"))
    {
        // Any-level mention with no Japanese entry. Already charged via LANGUAGE_MISMATCH.
        acc.flag(
            RiskKind::JapaneseFluency,
            "No evidence found for required Japanese language skills in profile.".to_string(),
            0,
        );
    }

    // Capacity
    if let Some(caps) = CAPACITY_LINE.captures(jd_text) {
        let capacity = caps[1].to_lowercase();
        if !availability_covers(&availability, &capacity) {
            let kind = if capacity == "contract" {
                RiskKind::ContractAvailability
            } else {
                RiskKind::AvailabilityMismatch
            };
            acc.flag(
                kind,
                format!("Job capacity is {capacity}, which the profile availability does not mention."),
                1,
            );
        }
    }

    if CONTRACT_ONLY.is_match(jd_text) && availability_covers(&availability, "full-time") {
        acc.flag(
            RiskKind::ContractOnly,
            "Availability may not align (job appears contract-only).".to_string(),
            1,
        );
    }

    if REMOTE_ONLY.is_match(jd_text) && PROFILE_ONSITE_ONLY.is_match(&location) {
        acc.flag(
            RiskKind::LocationMismatch,
            "Job is remote-only but profile location indicates onsite-only.".to_string(),
            1,
        );
    }

    let score = weight.saturating_sub(acc.penalty);
    let notes = if acc.flags.is_empty() {
        "No explicit constraint conflicts detected.".to_string()
    } else {
        format!("Risk flags identified: {}.", acc.flags.len())
    };

    RiskEvaluation {
        score,
        notes,
        flags: acc.flags,
        hard_cap: acc.hard_cap,
    }
}
