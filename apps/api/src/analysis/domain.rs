//! Domain classifier — assigns a coarse industry/discipline label to job text
//! and project text, and decides which label pairs may share evidence.
//!
//! Compatibility is an explicit allow-list plus an explicit deny-list; any
//! other pair of distinct known domains is incompatible. Unknown (`None`) is
//! always compatible.

use crate::analysis::text::{contains_phrase, normalize};
use crate::models::profile::Project;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    AiLlm,
    SoftwareEngineering,
    ConsumerRetail,
    Finance,
    Legal,
    Healthcare,
    ItInfrastructure,
    Enterprise,
    Tech,
}

impl Domain {
    pub fn as_str(self) -> &'static str {
        match self {
            Domain::AiLlm => "ai_llm",
            Domain::SoftwareEngineering => "software_engineering",
            Domain::ConsumerRetail => "consumer_retail",
            Domain::Finance => "finance",
            Domain::Legal => "legal",
            Domain::Healthcare => "healthcare",
            Domain::ItInfrastructure => "it_infrastructure",
            Domain::Enterprise => "enterprise",
            Domain::Tech => "tech",
        }
    }
}

/// Checked in order; the first domain with a keyword hit wins.
/// Specific domains precede the catch-all `Tech`.
const DOMAIN_KEYWORDS: &[(Domain, &[&str])] = &[
    (
        Domain::AiLlm,
        &[
            "llm", "llms", "large language model", "large language models", "generative ai",
            "genai", "gen ai", "prompt engineering", "prompt design", "rag",
            "retrieval augmented", "vector search", "embeddings", "machine learning", "agentic",
            "ai agents", "ai strategy", "ai enablement", "artificial intelligence", "ai",
        ],
    ),
    (
        Domain::SoftwareEngineering,
        &[
            "software engineer", "software engineering", "software developer",
            "software development", "java", "golang", "microservices", "web application",
            "web applications", "rest api", "rest apis", "sql", "database", "databases",
            "backend", "frontend", "full stack", "kubernetes", "docker", "ci cd",
        ],
    ),
    (
        Domain::ConsumerRetail,
        &[
            "cosmetics", "beauty", "skincare", "makeup", "fragrance", "fashion", "apparel",
            "luxury", "jewelry", "footwear", "retail", "consumer goods", "cpg", "fmcg",
            "personal care",
        ],
    ),
    (
        Domain::Finance,
        &[
            "finance", "financial", "fintech", "banking", "bank", "accounting", "tax", "audit",
            "insurance", "investment", "trading",
        ],
    ),
    (
        Domain::Legal,
        &["legal", "law firm", "litigation", "paralegal", "attorney", "counsel"],
    ),
    (
        Domain::Healthcare,
        &[
            "healthcare", "health care", "clinical", "hospital", "patient", "pharma",
            "pharmaceutical", "medical",
        ],
    ),
    (
        Domain::ItInfrastructure,
        &[
            "infrastructure", "dr bcp", "disaster recovery", "data center", "datacenter",
            "servers", "windows server", "network operations", "it operations",
        ],
    ),
    (
        Domain::Enterprise,
        &[
            "enterprise", "change management", "digital transformation", "transformation",
            "program management", "program governance", "governance", "pmo",
            "stakeholder management", "consulting", "operating model",
        ],
    ),
    (
        Domain::Tech,
        &[
            "python", "typescript", "javascript", "api", "apis", "cloud", "aws", "azure", "gcp",
            "automation", "integration", "data pipelines", "devops", "saas", "technology",
            "tech", "software",
        ],
    ),
];

const COMPATIBLE_PAIRS: &[(Domain, Domain)] = &[
    (Domain::Finance, Domain::Tech),
    (Domain::Finance, Domain::Enterprise),
    (Domain::Finance, Domain::AiLlm),
    (Domain::Tech, Domain::Enterprise),
    (Domain::Tech, Domain::AiLlm),
    (Domain::Enterprise, Domain::AiLlm),
    (Domain::SoftwareEngineering, Domain::Tech),
    (Domain::SoftwareEngineering, Domain::ItInfrastructure),
    (Domain::ItInfrastructure, Domain::Tech),
    (Domain::ItInfrastructure, Domain::Enterprise),
    (Domain::Legal, Domain::Finance),
    (Domain::Legal, Domain::Enterprise),
    (Domain::Healthcare, Domain::Enterprise),
];

/// Prompt and retrieval work is not software engineering for scoring purposes.
const INCOMPATIBLE_PAIRS: &[(Domain, Domain)] = &[(Domain::AiLlm, Domain::SoftwareEngineering)];

/// Industry terms that must be shared between a job line and its evidence.
/// Also the only terms counted for domain fit.
pub const DOMAIN_TERMS: &[&str] = &[
    "cosmetics", "beauty", "skincare", "makeup", "fragrance", "consumer goods", "cpg", "retail",
    "ecommerce", "e commerce", "fmcg", "fashion", "luxury", "personal care", "wellness",
    "apparel", "jewelry", "footwear", "finance", "financial", "banking", "insurance", "tax",
    "accounting", "legal", "healthcare", "clinical", "pharmaceutical",
];

/// Transferable soft skills. Only count as evidence when domains align.
pub const GENERIC_SKILL_PHRASES: &[&str] = &[
    "communication", "leadership", "stakeholder management", "stakeholder", "agile",
    "relationship building", "relationships", "teamwork", "collaboration", "problem solving",
    "presentation", "change management", "project management", "program management",
    "cross functional", "interpersonal", "customer service", "organizational",
];

/// Classifies free text. `None` when no dictionary keyword appears.
pub fn extract_domain(text: &str) -> Option<Domain> {
    let normalized = normalize(text);
    DOMAIN_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| contains_phrase(&normalized, kw)))
        .map(|(domain, _)| *domain)
}

fn listed(pairs: &[(Domain, Domain)], a: Domain, b: Domain) -> bool {
    pairs
        .iter()
        .any(|&(x, y)| (x == a && y == b) || (x == b && y == a))
}

pub fn domains_compatible(a: Option<Domain>, b: Option<Domain>) -> bool {
    let (Some(a), Some(b)) = (a, b) else {
        return true;
    };
    if a == b || listed(COMPATIBLE_PAIRS, a, b) {
        return true;
    }
    if listed(INCOMPATIBLE_PAIRS, a, b) {
        return false;
    }
    false
}

/// Curated domain terms present in normalized text, in dictionary order.
pub fn domain_terms_in(normalized_text: &str) -> Vec<&'static str> {
    DOMAIN_TERMS
        .iter()
        .copied()
        .filter(|term| contains_phrase(normalized_text, term))
        .collect()
}

pub fn has_generic_skill_phrase(normalized_text: &str) -> bool {
    GENERIC_SKILL_PHRASES
        .iter()
        .any(|phrase| contains_phrase(normalized_text, phrase))
}

/// Job-level domain signal, computed once per analysis and shared by every
/// section evaluation and by domain fit.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainContext {
    pub job_domain: Option<Domain>,
    pub job_terms: Vec<&'static str>,
    /// Share of projects whose domain is compatible with the job's. 1.0 when unknown.
    pub compatibility_ratio: f64,
}

impl DomainContext {
    pub fn build(jd_text: &str, project_domains: &[Option<Domain>]) -> Self {
        let job_domain = extract_domain(jd_text);
        let job_terms = domain_terms_in(&normalize(jd_text));

        let compatibility_ratio = match job_domain {
            Some(_) if !project_domains.is_empty() => {
                let compatible = project_domains
                    .iter()
                    .filter(|d| domains_compatible(job_domain, **d))
                    .count();
                compatible as f64 / project_domains.len() as f64
            }
            _ => 1.0,
        };

        Self {
            job_domain,
            job_terms,
            compatibility_ratio,
        }
    }
}

/// All searchable text of a project joined with spaces (not normalized).
pub fn project_text(project: &Project) -> String {
    let mut parts: Vec<&str> = vec![project.name.as_str(), project.summary.as_str()];
    parts.extend(project.tags.iter().map(String::as_str));
    parts.extend(project.capability_tags.iter().map(String::as_str));
    parts.extend(project.stack.iter().map(String::as_str));
    parts.extend(project.outcomes.iter().map(String::as_str));
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_specific_domain_wins_over_tech() {
        assert_eq!(
            extract_domain("Python engineer building RAG pipelines"),
            Some(Domain::AiLlm)
        );
        assert_eq!(
            extract_domain("Java microservices on AWS"),
            Some(Domain::SoftwareEngineering)
        );
        assert_eq!(extract_domain("Python automation scripts"), Some(Domain::Tech));
    }

    #[test]
    fn test_unknown_domain() {
        assert_eq!(extract_domain("Friendly people wanted"), None);
        assert_eq!(extract_domain(""), None);
    }

    #[test]
    fn test_ai_keyword_needs_whole_word() {
        assert_eq!(extract_domain("She said the chair was comfortable"), None);
    }

    #[test]
    fn test_consumer_retail() {
        assert_eq!(
            extract_domain("Retail Cosmetics Sales Associate"),
            Some(Domain::ConsumerRetail)
        );
    }

    #[test]
    fn test_compatibility_is_symmetric() {
        let all = [
            Domain::AiLlm,
            Domain::SoftwareEngineering,
            Domain::ConsumerRetail,
            Domain::Finance,
            Domain::Legal,
            Domain::Healthcare,
            Domain::ItInfrastructure,
            Domain::Enterprise,
            Domain::Tech,
        ];
        for a in all {
            for b in all {
                assert_eq!(
                    domains_compatible(Some(a), Some(b)),
                    domains_compatible(Some(b), Some(a)),
                    "{a:?} vs {b:?}"
                );
            }
        }
    }

    #[test]
    fn test_compatibility_rules() {
        assert!(domains_compatible(None, Some(Domain::Legal)));
        assert!(domains_compatible(Some(Domain::Tech), None));
        assert!(domains_compatible(Some(Domain::Legal), Some(Domain::Legal)));
        assert!(domains_compatible(Some(Domain::Finance), Some(Domain::AiLlm)));
        assert!(!domains_compatible(
            Some(Domain::AiLlm),
            Some(Domain::SoftwareEngineering)
        ));
        assert!(!domains_compatible(
            Some(Domain::ConsumerRetail),
            Some(Domain::Tech)
        ));
    }

    #[test]
    fn test_domain_terms_and_generic_phrases() {
        let text = normalize("Luxury beauty brand, e-commerce channel");
        assert_eq!(
            domain_terms_in(&text),
            vec!["beauty", "e commerce", "luxury"]
        );
        assert!(has_generic_skill_phrase("strong communication skills"));
        assert!(!has_generic_skill_phrase("python automation"));
    }

    #[test]
    fn test_context_ratio() {
        let ctx = DomainContext::build(
            "Prompt engineering lead",
            &[Some(Domain::AiLlm), Some(Domain::SoftwareEngineering)],
        );
        assert_eq!(ctx.job_domain, Some(Domain::AiLlm));
        assert!((ctx.compatibility_ratio - 0.5).abs() < f64::EPSILON);

        let unknown = DomainContext::build("Friendly people wanted", &[Some(Domain::Tech)]);
        assert!((unknown.compatibility_ratio - 1.0).abs() < f64::EPSILON);
    }
}
