//! Aggregator — combines the six rubric dimensions into the final response.
//!
//! Pipeline: sum → clamp → short-text dampening → niche-domain cap → hard cap.
//! Strengths are only emitted for matches whose evidence URL belongs to the
//! profile; anything else is counted in `debug.discarded_matches`.

use std::collections::{BTreeSet, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::analysis::concepts::cluster_for_line;
use crate::analysis::interpreter::InterpreterOutput;
use crate::analysis::risk::{evaluate_risk, RiskFlag};
use crate::analysis::rubric::{evaluate_delivery_credibility, evaluate_domain_fit, RubricWeights};
use crate::analysis::section_eval::{evaluate_section, MatchContext, SectionEval};
use crate::analysis::sections::{detect_section_heading, extract_lines, split_into_sections};
use crate::analysis::text::truncate;
use crate::config::AnalyzerConfig;
use crate::models::analysis::{AnalysisDebug, AnalyzeResponse, Confidence, Gap, RubricItem, Strength};
use crate::models::profile::Profile;

const MAX_STRENGTHS: usize = 8;
const MAX_GAPS: usize = 8;
const GAPS_PER_AREA: usize = 2;

// Short-text dampening: texts under FULL_LENGTH chars scale linearly from
// MIN_FACTOR at FLOOR_LENGTH up to 1.0.
const FULL_LENGTH: usize = 150;
const FLOOR_LENGTH: f64 = 50.0;
const MIN_FACTOR: f64 = 0.4;

const NICHE_CAP: u32 = 85;

// Confidence thresholds. Calibrated by hand against the regression JDs; revisit
// once there is labelled outcome data.
const LOW_SCORE_CEILING: u32 = 40;
const HIGH_MUST_COVERAGE: f64 = 0.7;
const HIGH_DISTINCT_URLS: usize = 3;
const HIGH_DOMAIN_FIT_SHARE: f64 = 0.5;

static NICHE_DOMAIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(tax|finance|legal|insurance|banking|accounting)\b").unwrap()
});

/// Line prefixes that label job metadata rather than state a requirement.
const METADATA_LABELS: &[&str] = &[
    "capacity",
    "location",
    "languages",
    "language",
    "availability",
    "work arrangement",
    "employment type",
    "position",
    "company",
    "job title",
    "title",
    "salary",
    "compensation",
];

// ────────────────────────────────────────────────────────────────────────────
// Entry point
// ────────────────────────────────────────────────────────────────────────────

/// Scores `jd_text` against `profile`. Pure and deterministic: identical
/// inputs always produce identical output.
pub fn analyze(
    jd_text: &str,
    profile: &Profile,
    request_id: &str,
    config: &AnalyzerConfig,
    ai: Option<&InterpreterOutput>,
) -> AnalyzeResponse {
    let weights = RubricWeights::default();
    let parsed = split_into_sections(jd_text);
    let sections_found = parsed.has_sections();
    let fallback_lines = extract_lines(jd_text);
    let ctx = MatchContext::build(jd_text, profile);

    let responsibility_lines = if parsed.responsibilities.is_empty() {
        &fallback_lines
    } else {
        &parsed.responsibilities
    };
    let must_have_lines = if parsed.requirements.is_empty() {
        &fallback_lines
    } else {
        &parsed.requirements
    };

    let responsibilities = evaluate_section(
        responsibility_lines,
        weights.responsibilities,
        "Responsibilities",
        &ctx,
    );
    let must_haves = evaluate_section(must_have_lines, weights.must_haves, "Must-haves", &ctx);
    let nice_to_haves = if parsed.nice_to_have.is_empty() {
        SectionEval {
            score: (weights.nice_to_haves as f64 * 0.5).round() as u32,
            ..SectionEval::empty(
                "No explicit nice-to-have section found; assigned neutral midpoint.".to_string(),
            )
        }
    } else {
        evaluate_section(
            &parsed.nice_to_have,
            weights.nice_to_haves,
            "Nice-to-haves",
            &ctx,
        )
    };
    let domain_fit = evaluate_domain_fit(&ctx, weights.domain_fit);
    let delivery = evaluate_delivery_credibility(
        &[&responsibilities, &must_haves, &nice_to_haves],
        weights.delivery_credibility,
    );
    let risk = evaluate_risk(
        jd_text,
        &profile.constraints,
        weights.risk_constraints,
        config,
    );

    let rubric_breakdown = vec![
        rubric_item("Responsibilities match", &responsibilities, weights.responsibilities),
        rubric_item("Must-haves", &must_haves, weights.must_haves),
        rubric_item("Nice-to-haves", &nice_to_haves, weights.nice_to_haves),
        rubric_item("Domain fit", &domain_fit, weights.domain_fit),
        rubric_item("Delivery credibility", &delivery, weights.delivery_credibility),
        RubricItem {
            category: "Risk/constraints alignment".to_string(),
            score: risk.score,
            weight: weights.risk_constraints,
            notes: risk.notes.clone(),
        },
    ];

    // Score pipeline
    let raw_score = rubric_breakdown
        .iter()
        .map(|item| item.score)
        .sum::<u32>()
        .min(weights.total());
    let length_factor = length_factor(jd_text);
    let mut score = (raw_score as f64 * length_factor).round() as u32;

    let niche_cap_applied = NICHE_DOMAIN.is_match(jd_text)
        && domain_fit.score >= weights.domain_fit
        && score > NICHE_CAP;
    if niche_cap_applied {
        score = NICHE_CAP;
    }
    if let Some(cap) = risk.hard_cap {
        score = score.min(cap);
    }

    // Evidence-backed output
    let evidence_urls = profile.evidence_url_set();
    let (strengths, discarded_matches) = collect_strengths(
        &[
            ("Responsibilities", &responsibilities),
            ("Must-haves", &must_haves),
            ("Nice-to-haves", &nice_to_haves),
            ("Domain fit", &domain_fit),
        ],
        &evidence_urls,
    );

    let mut gaps = collect_gaps(&[
        ("Responsibilities", &responsibilities),
        ("Must-haves", &must_haves),
        ("Nice-to-haves", &nice_to_haves),
    ]);
    if strengths.is_empty() {
        gaps.insert(
            0,
            Gap {
                area: "Evidence coverage".to_string(),
                why_it_matters: "No portfolio evidence links were matched to the JD text, so fit claims cannot be substantiated.".to_string(),
                mitigation: "Add project evidence URLs to the profile or provide richer project outcomes and tags.".to_string(),
            },
        );
        gaps.truncate(MAX_GAPS);
    }

    let confidence = calibrate_confidence(&ConfidenceSignals {
        sections_found,
        hard_gate: risk.has_hard_gate(),
        score,
        must_have_coverage: must_haves.coverage(),
        distinct_evidence_urls: strengths
            .iter()
            .map(|s| s.evidence_url.as_str())
            .collect::<BTreeSet<_>>()
            .len(),
        domain_fit_share: domain_fit.score as f64 / weights.domain_fit.max(1) as f64,
    });

    let risk_flags: Vec<String> = risk.flags.iter().map(RiskFlag::to_string).collect();
    let fit_summary = build_fit_summary(score, confidence, strengths.len(), gaps.len(), &risk_flags);

    AnalyzeResponse {
        request_id: request_id.to_string(),
        score,
        confidence,
        fit_summary,
        debug: Some(AnalysisDebug {
            discarded_matches,
            sections_found,
            job_domain: ctx.domain.job_domain.map(|d| d.as_str().to_string()),
            domain_compatibility_ratio: ctx.domain.compatibility_ratio,
            raw_score,
            length_factor,
            niche_cap_applied,
            hard_cap: risk.hard_cap,
            strength_confidence: calculate_confidence(&strengths),
        }),
        strengths,
        gaps,
        risk_flags,
        rubric_breakdown,
        ai_metadata: ai.cloned(),
    }
}

fn rubric_item(category: &str, eval: &SectionEval<'_>, weight: u32) -> RubricItem {
    RubricItem {
        category: category.to_string(),
        score: eval.score,
        weight,
        notes: eval.notes.clone(),
    }
}

/// Multiplier for short job texts; 1.0 at or above 150 characters.
pub fn length_factor(jd_text: &str) -> f64 {
    let len = jd_text.trim().chars().count();
    if len >= FULL_LENGTH {
        return 1.0;
    }
    let span = FULL_LENGTH as f64 - FLOOR_LENGTH;
    (MIN_FACTOR + (len as f64 - FLOOR_LENGTH) / span * (1.0 - MIN_FACTOR)).clamp(MIN_FACTOR, 1.0)
}

// ────────────────────────────────────────────────────────────────────────────
// Strengths and gaps
// ────────────────────────────────────────────────────────────────────────────

/// One strength per (area, project), citing the project's first evidence URL.
/// Returns the strengths and the number of matches dropped for lacking a
/// profile evidence URL.
pub fn collect_strengths(
    evals: &[(&str, &SectionEval<'_>)],
    evidence_urls: &HashSet<&str>,
) -> (Vec<Strength>, u32) {
    let mut strengths = Vec::new();
    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    let mut discarded = 0;

    for &(area, eval) in evals {
        for (line, project) in eval.evidenced() {
            let Some(evidence) = project
                .primary_evidence()
                .filter(|e| evidence_urls.contains(e.url))
            else {
                discarded += 1;
                continue;
            };

            if !seen.insert((area, project.name.as_str())) {
                continue;
            }

            let label = evidence.label.unwrap_or(project.name.as_str());
            let mut rationale = format!("Matched \"{}\" to {label} evidence", truncate(line, 90));
            if let Some(cluster) = cluster_for_line(line) {
                rationale.push_str(&format!(" ({} capability)", cluster.label));
            }
            rationale.push('.');
            if let Some(snippet) = evidence.snippet.filter(|s| !s.trim().is_empty()) {
                rationale.push_str(&format!(" Evidence: {}", truncate(snippet.trim(), 160)));
            }

            strengths.push(Strength {
                area: area.to_string(),
                evidence_title: project.name.clone(),
                evidence_url: evidence.url.to_string(),
                rationale,
            });
        }
    }

    strengths.truncate(MAX_STRENGTHS);
    (strengths, discarded)
}

/// Section labels and job metadata that landed in a section as content.
pub fn is_heading_like(line: &str) -> bool {
    let trimmed = line.trim();
    if detect_section_heading(trimmed).is_some() {
        return true;
    }

    let lower = trimmed.to_lowercase();
    let labelled = METADATA_LABELS.iter().any(|label| {
        lower
            .strip_prefix(label)
            .map(|rest| rest.trim_start().starts_with(':'))
            .unwrap_or(false)
    });

    labelled || (trimmed.ends_with(':') && trimmed.chars().count() <= 40)
}

pub fn collect_gaps(evals: &[(&str, &SectionEval<'_>)]) -> Vec<Gap> {
    let mut gaps = Vec::new();

    for &(area, eval) in evals {
        for missed in eval
            .misses
            .iter()
            .filter(|line| !is_heading_like(line))
            .take(GAPS_PER_AREA)
        {
            gaps.push(Gap {
                area: area.to_string(),
                why_it_matters: format!("No evidence found for: \"{}\".", truncate(missed, 120)),
                mitigation: "Add a project with measurable outcomes and an evidence URL, or document related evidence in the profile.".to_string(),
            });
        }
    }

    gaps.truncate(MAX_GAPS);
    gaps
}

// ────────────────────────────────────────────────────────────────────────────
// Confidence
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceSignals {
    pub sections_found: bool,
    pub hard_gate: bool,
    pub score: u32,
    pub must_have_coverage: f64,
    pub distinct_evidence_urls: usize,
    /// Domain fit score as a share of its weight.
    pub domain_fit_share: f64,
}

pub fn calibrate_confidence(signals: &ConfidenceSignals) -> Confidence {
    if !signals.sections_found || signals.hard_gate || signals.score <= LOW_SCORE_CEILING {
        return Confidence::Low;
    }
    if signals.must_have_coverage >= HIGH_MUST_COVERAGE
        && signals.distinct_evidence_urls >= HIGH_DISTINCT_URLS
        && signals.domain_fit_share >= HIGH_DOMAIN_FIT_SHARE
    {
        return Confidence::High;
    }
    if signals.distinct_evidence_urls >= 1 {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

/// Strengths-only confidence: distinct strength areas ≥3 High, ≥1 Medium.
pub fn calculate_confidence(strengths: &[Strength]) -> Confidence {
    let areas: BTreeSet<&str> = strengths.iter().map(|s| s.area.as_str()).collect();
    match areas.len() {
        0 => Confidence::Low,
        1 | 2 => Confidence::Medium,
        _ => Confidence::High,
    }
}

fn build_fit_summary(
    score: u32,
    confidence: Confidence,
    strength_count: usize,
    gap_count: usize,
    risk_flags: &[String],
) -> String {
    let risk_snippet = if risk_flags.is_empty() {
        "No major constraints risk was detected from JD text.".to_string()
    } else {
        format!(
            "{} risk flag(s) need review before application.",
            risk_flags.len()
        )
    };

    format!(
        "Compatibility score {score}/100 ({confidence} confidence). Evidence-backed strengths: {strength_count}. Gaps or unknowns: {gap_count}. {risk_snippet}"
    )
}
