//! JD interpreter — maps parsed JD sections to concept clusters, domain
//! signals and language requirements.
//!
//! Default: `KeywordInterpreter` (pure-Rust, deterministic, no network).
//! Optional: `LlmInterpreter` (Claude), validated against the cluster
//! allow-list and domain vocabulary before anything leaves this module.
//!
//! `AppState` holds an `Arc<dyn Interpreter>`, chosen at startup via config.
//! The output is reported as `ai_metadata` and never feeds the score.

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::analysis::concepts::{allowed_cluster_ids, is_allowed_cluster, ClusterSection, CLUSTERS};
use crate::analysis::domain::{domain_terms_in, DOMAIN_TERMS};
use crate::analysis::prompts::INTERPRET_PROMPT_TEMPLATE;
use crate::analysis::risk::{detect_language_requirements, SPOKEN_LANGUAGES};
use crate::analysis::sections::ParsedJD;
use crate::analysis::text::{contains_phrase, normalize, truncate};
use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, NO_FABRICATION_INSTRUCTION};
use crate::llm_client::LlmClient;

const DETERMINISTIC_MODEL: &str = "deterministic";
const MAX_AI_RISK_FLAGS: usize = 10;
const MAX_AI_RISK_FLAG_CHARS: usize = 200;

// ────────────────────────────────────────────────────────────────────────────
// Output data model (shared across interpreter backends)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterTargets {
    pub required: Vec<String>,
    pub nice_to_have: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainSignal {
    pub matched: bool,
    pub terms: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterpreterOutput {
    pub cluster_targets: ClusterTargets,
    pub domain_signal: DomainSignal,
    pub language_requirements: Vec<String>,
    pub risk_flags: Vec<String>,
    pub ai_used: bool,
    pub ai_model: String,
    /// Why the deterministic path ran instead of the configured backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

impl InterpreterOutput {
    fn with_fallback(mut self, reason: String) -> Self {
        self.fallback_reason = Some(reason);
        self
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Implement this to swap interpretation backends without touching callers.
/// Implementations never fail: errors degrade to `interpret_deterministic`.
#[async_trait]
pub trait Interpreter: Send + Sync {
    fn name(&self) -> &str;

    async fn interpret(&self, parsed: &ParsedJD) -> InterpreterOutput;
}

/// Runs an interpreter under a latency budget, falling back on timeout.
pub async fn interpret_bounded(
    interpreter: &dyn Interpreter,
    parsed: &ParsedJD,
    budget: Duration,
) -> InterpreterOutput {
    match tokio::time::timeout(budget, interpreter.interpret(parsed)).await {
        Ok(output) => output,
        Err(_) => {
            warn!(
                "Interpreter '{}' exceeded {}ms budget, using deterministic fallback",
                interpreter.name(),
                budget.as_millis()
            );
            interpret_deterministic(parsed).with_fallback(format!(
                "{} timed out after {}ms",
                interpreter.name(),
                budget.as_millis()
            ))
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// KeywordInterpreter — default implementation
// ────────────────────────────────────────────────────────────────────────────

pub struct KeywordInterpreter;

#[async_trait]
impl Interpreter for KeywordInterpreter {
    fn name(&self) -> &str {
        DETERMINISTIC_MODEL
    }

    async fn interpret(&self, parsed: &ParsedJD) -> InterpreterOutput {
        interpret_deterministic(parsed)
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Keyword matching over the parsed sections.
///
/// A cluster is `required` when one of its terms appears outside the
/// nice-to-have section, otherwise `nice_to_have` when it appears there.
pub fn interpret_deterministic(parsed: &ParsedJD) -> InterpreterOutput {
    let core_text = normalize(
        &[
            parsed.responsibilities.as_slice(),
            parsed.requirements.as_slice(),
            parsed.general.as_slice(),
        ]
        .concat()
        .join(" "),
    );
    let nice_text = normalize(&parsed.nice_to_have.join(" "));
    let all_text = format!("{core_text} {nice_text}");

    let mut targets = ClusterTargets::default();
    for cluster in CLUSTERS {
        let hit = |text: &str| cluster.terms.iter().any(|t| contains_phrase(text, t));
        if hit(&core_text) {
            targets.required.push(cluster.id.to_string());
        } else if hit(&nice_text) && cluster.sections.contains(&ClusterSection::NiceToHave) {
            targets.nice_to_have.push(cluster.id.to_string());
        }
    }

    let terms: Vec<String> = domain_terms_in(&all_text)
        .into_iter()
        .map(str::to_string)
        .collect();

    let languages_text = normalize(&format!("{all_text} {}", parsed.languages.join(" ")));
    let languages = detect_language_requirements(&languages_text)
        .into_iter()
        .map(capitalize)
        .collect();

    InterpreterOutput {
        cluster_targets: targets,
        domain_signal: DomainSignal {
            matched: !terms.is_empty(),
            terms,
        },
        language_requirements: languages,
        risk_flags: vec![],
        ai_used: false,
        ai_model: DETERMINISTIC_MODEL.to_string(),
        fallback_reason: None,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// LlmInterpreter — Claude-backed implementation
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmInterpreter {
    llm: LlmClient,
}

impl LlmInterpreter {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Interpreter for LlmInterpreter {
    fn name(&self) -> &str {
        self.llm.model()
    }

    async fn interpret(&self, parsed: &ParsedJD) -> InterpreterOutput {
        let prompt = build_interpretation_prompt(parsed);
        match self.llm.call_json::<Value>(&prompt, JSON_ONLY_SYSTEM).await {
            Ok(raw) => {
                debug!("AI interpretation received from {}", self.llm.model());
                validate_ai_output(&raw, self.llm.model())
            }
            Err(e) => {
                warn!("AI interpretation failed, using deterministic fallback: {e}");
                interpret_deterministic(parsed).with_fallback(format!("AI error: {e}"))
            }
        }
    }
}

/// Sectioned JD text for the prompt, capped per section.
pub fn prepare_jd_text(parsed: &ParsedJD) -> String {
    let sections: [(&str, &[String], usize); 5] = [
        ("=== RESPONSIBILITIES ===", &parsed.responsibilities, 20),
        ("=== REQUIREMENTS (MUST-HAVES) ===", &parsed.requirements, 15),
        ("=== NICE-TO-HAVES ===", &parsed.nice_to_have, 10),
        ("=== LANGUAGES ===", &parsed.languages, usize::MAX),
        ("=== GENERAL ===", &parsed.general, 10),
    ];

    let mut parts: Vec<String> = Vec::new();
    for (heading, lines, limit) in sections {
        if lines.is_empty() {
            continue;
        }
        parts.push(heading.to_string());
        parts.extend(lines.iter().take(limit).cloned());
    }
    parts.join("\n\n")
}

pub fn build_interpretation_prompt(parsed: &ParsedJD) -> String {
    INTERPRET_PROMPT_TEMPLATE
        .replace("{jd_text}", &prepare_jd_text(parsed))
        .replace("{allowed_ids}", &allowed_cluster_ids().join(", "))
        .replace("{domain_terms}", &DOMAIN_TERMS.join(", "))
        .replace("{no_fabrication}", NO_FABRICATION_INSTRUCTION)
}

/// String items of a JSON array, skipping non-strings and anything URL-like.
fn string_items(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty() && !s.contains("://"))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn allowed_clusters(value: Option<&Value>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    string_items(value)
        .into_iter()
        .filter(|id| is_allowed_cluster(id) && seen.insert(id.clone()))
        .collect()
}

/// Filters raw model output down to the allowed vocabularies.
pub fn validate_ai_output(raw: &Value, model: &str) -> InterpreterOutput {
    let targets = raw.get("cluster_targets");
    let domain = raw.get("domain_signal");

    let mut terms: Vec<String> = Vec::new();
    for term in string_items(domain.and_then(|d| d.get("terms"))) {
        let normalized = normalize(&term);
        if DOMAIN_TERMS.contains(&normalized.as_str()) && !terms.contains(&normalized) {
            terms.push(normalized);
        }
    }

    let mut languages: Vec<String> = Vec::new();
    for language in string_items(raw.get("language_requirements")) {
        let normalized = normalize(&language);
        if SPOKEN_LANGUAGES.contains(&normalized.as_str()) {
            let label = capitalize(&normalized);
            if !languages.contains(&label) {
                languages.push(label);
            }
        }
    }

    let risk_flags = string_items(raw.get("risk_flags"))
        .into_iter()
        .take(MAX_AI_RISK_FLAGS)
        .map(|flag| truncate(&flag, MAX_AI_RISK_FLAG_CHARS))
        .collect();

    InterpreterOutput {
        cluster_targets: ClusterTargets {
            required: allowed_clusters(targets.and_then(|t| t.get("required"))),
            nice_to_have: allowed_clusters(targets.and_then(|t| t.get("nice_to_have"))),
        },
        domain_signal: DomainSignal {
            matched: domain
                .and_then(|d| d.get("matched"))
                .and_then(Value::as_bool)
                .unwrap_or(false),
            terms,
        },
        language_requirements: languages,
        risk_flags,
        ai_used: true,
        ai_model: model.to_string(),
        fallback_reason: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::sections::split_into_sections;
    use serde_json::json;

    const AI_JD: &str = "Position: AI Consultant\n\
        Responsibilities:\n\
        - Run prompt engineering workshops\n\
        - Build RAG pipelines for the beauty division\n\
        Nice to have:\n\
        - Steering committee exposure\n\
        Languages:\n\
        - English and Japanese";

    struct SlowInterpreter;

    #[async_trait]
    impl Interpreter for SlowInterpreter {
        fn name(&self) -> &str {
            "slow"
        }

        async fn interpret(&self, _parsed: &ParsedJD) -> InterpreterOutput {
            tokio::time::sleep(Duration::from_secs(10)).await;
            InterpreterOutput {
                ai_used: true,
                ai_model: "slow".to_string(),
                ..InterpreterOutput::default()
            }
        }
    }

    #[test]
    fn test_deterministic_clusters_domain_and_languages() {
        let parsed = split_into_sections(AI_JD);
        let output = interpret_deterministic(&parsed);

        assert!(output
            .cluster_targets
            .required
            .contains(&"prompt_engineering".to_string()));
        assert!(output
            .cluster_targets
            .required
            .contains(&"llm_foundations".to_string()));
        assert_eq!(
            output.cluster_targets.nice_to_have,
            vec!["governance_delivery".to_string()]
        );
        assert_eq!(output.domain_signal.terms, vec!["beauty".to_string()]);
        assert!(output.domain_signal.matched);
        assert_eq!(
            output.language_requirements,
            vec!["English".to_string(), "Japanese".to_string()]
        );
        assert!(!output.ai_used);
        assert_eq!(output.ai_model, "deterministic");
    }

    #[test]
    fn test_validate_filters_unknown_clusters_terms_and_urls() {
        let raw = json!({
            "cluster_targets": {
                "required": ["prompt_engineering", "blockchain", "prompt_engineering", 42],
                "nice_to_have": "llm_foundations"
            },
            "domain_signal": {"matched": true, "terms": ["Beauty", "quantum", "https://evil.example"]},
            "language_requirements": ["japanese", "Klingon"],
            "risk_flags": ["Onsite in Tokyo", "see https://example.com/jobs"]
        });

        let output = validate_ai_output(&raw, "claude-sonnet-4-5");
        assert_eq!(
            output.cluster_targets.required,
            vec!["prompt_engineering".to_string()]
        );
        assert!(output.cluster_targets.nice_to_have.is_empty());
        assert_eq!(output.domain_signal.terms, vec!["beauty".to_string()]);
        assert!(output.domain_signal.matched);
        assert_eq!(output.language_requirements, vec!["Japanese".to_string()]);
        assert_eq!(output.risk_flags, vec!["Onsite in Tokyo".to_string()]);
        assert!(output.ai_used);
        assert_eq!(output.ai_model, "claude-sonnet-4-5");
    }

    #[test]
    fn test_validate_tolerates_garbage() {
        let output = validate_ai_output(&json!("not an object"), "m");
        assert!(output.cluster_targets.required.is_empty());
        assert!(!output.domain_signal.matched);
        assert!(output.risk_flags.is_empty());
    }

    #[test]
    fn test_prompt_lists_allowed_ids_and_sections() {
        let parsed = split_into_sections(AI_JD);
        let prompt = build_interpretation_prompt(&parsed);
        assert!(prompt.contains("agentic_workflows, change_enablement"));
        assert!(prompt.contains("=== RESPONSIBILITIES ==="));
        assert!(prompt.contains("Run prompt engineering workshops"));
        assert!(!prompt.contains("{jd_text}"));
    }

    #[test]
    fn test_prepare_caps_section_lines() {
        let parsed = ParsedJD {
            responsibilities: (0..30).map(|i| format!("duty {i}")).collect(),
            ..ParsedJD::default()
        };
        let text = prepare_jd_text(&parsed);
        assert!(text.contains("duty 19"));
        assert!(!text.contains("duty 20"));
    }

    #[tokio::test]
    async fn test_keyword_interpreter_matches_deterministic() {
        let parsed = split_into_sections(AI_JD);
        let output = KeywordInterpreter.interpret(&parsed).await;
        assert_eq!(output, interpret_deterministic(&parsed));
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_interpretation_falls_back_on_timeout() {
        let parsed = split_into_sections(AI_JD);
        let output = interpret_bounded(&SlowInterpreter, &parsed, Duration::from_secs(3)).await;
        assert!(!output.ai_used);
        assert_eq!(output.ai_model, "deterministic");
        assert_eq!(
            output.fallback_reason.as_deref(),
            Some("slow timed out after 3000ms")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_interpretation_passes_through_fast_result() {
        let parsed = split_into_sections(AI_JD);
        let output = interpret_bounded(&SlowInterpreter, &parsed, Duration::from_secs(30)).await;
        assert!(output.ai_used);
        assert_eq!(output.ai_model, "slow");
    }
}
