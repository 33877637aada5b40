use serde::{Deserialize, Serialize};

use crate::analysis::interpreter::InterpreterOutput;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Confidence::Low => "Low",
            Confidence::Medium => "Medium",
            Confidence::High => "High",
        };
        f.write_str(label)
    }
}

/// A JD requirement backed by a cited profile evidence URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strength {
    pub area: String,
    pub evidence_title: String,
    pub evidence_url: String,
    pub rationale: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gap {
    pub area: String,
    pub why_it_matters: String,
    pub mitigation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubricItem {
    pub category: String,
    pub score: u32,
    pub weight: u32,
    pub notes: String,
}

/// Intermediate signals behind the final score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisDebug {
    /// Evidence-linked matches dropped because their URL was not a profile evidence URL.
    pub discarded_matches: u32,
    pub sections_found: bool,
    pub job_domain: Option<String>,
    pub domain_compatibility_ratio: f64,
    pub raw_score: u32,
    pub length_factor: f64,
    pub niche_cap_applied: bool,
    pub hard_cap: Option<u32>,
    /// Confidence from strength-area breadth alone, before calibration.
    pub strength_confidence: Confidence,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub request_id: String,
    pub score: u32, // 0 – 100
    pub confidence: Confidence,
    pub fit_summary: String,
    pub strengths: Vec<Strength>, // ≤ 8
    pub gaps: Vec<Gap>,           // ≤ 8
    pub risk_flags: Vec<String>,
    pub rubric_breakdown: Vec<RubricItem>, // always 6, fixed order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<AnalysisDebug>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_metadata: Option<InterpreterOutput>,
}
