//! Rubric weights plus the two secondary evaluators: domain fit and delivery credibility.

use std::collections::BTreeSet;

use crate::analysis::section_eval::{LineMatch, MatchContext, SectionEval};
use crate::analysis::text::contains_phrase;

/// Maximum points per rubric dimension. Sums to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RubricWeights {
    pub responsibilities: u32,
    pub must_haves: u32,
    pub nice_to_haves: u32,
    pub domain_fit: u32,
    pub delivery_credibility: u32,
    pub risk_constraints: u32,
}

impl Default for RubricWeights {
    fn default() -> Self {
        Self {
            responsibilities: 30,
            must_haves: 30,
            nice_to_haves: 10,
            domain_fit: 10,
            delivery_credibility: 15,
            risk_constraints: 5,
        }
    }
}

impl RubricWeights {
    pub fn total(&self) -> u32 {
        self.responsibilities
            + self.must_haves
            + self.nice_to_haves
            + self.domain_fit
            + self.delivery_credibility
            + self.risk_constraints
    }
}

/// Counts curated industry terms in the job that an evidenced project also names.
pub fn evaluate_domain_fit<'a>(ctx: &MatchContext<'a>, weight: u32) -> SectionEval<'a> {
    let mut matches = Vec::new();
    let mut matched_terms: Vec<&str> = Vec::new();

    for term in &ctx.domain.job_terms {
        let project = ctx
            .index
            .iter()
            .filter(|entry| entry.has_evidence())
            .find(|entry| contains_phrase(&entry.text, term))
            .map(|entry| entry.project);

        if let Some(project) = project {
            matched_terms.push(term);
            matches.push(LineMatch {
                line: format!("Domain signal: {term}"),
                evidence_project: Some(project),
            });
        }
    }

    let count = matched_terms.len() as u32;
    let score = if count > 0 {
        (count * 3 + 1).min(weight)
    } else {
        0
    };

    let (notes, misses) = if count > 0 {
        (
            format!(
                "Matched domain terms with evidence: {}.",
                matched_terms.join(", ")
            ),
            vec![],
        )
    } else {
        (
            "No domain-specific overlap found in profile evidence.".to_string(),
            vec!["No evidence found for JD domain alignment.".to_string()],
        )
    };

    SectionEval {
        score,
        notes,
        matches,
        misses,
    }
}

/// Rewards breadth: distinct evidenced projects across the section evaluations.
pub fn evaluate_delivery_credibility<'a>(
    section_evals: &[&SectionEval<'a>],
    weight: u32,
) -> SectionEval<'a> {
    let projects: BTreeSet<&str> = section_evals
        .iter()
        .flat_map(|eval| eval.evidenced())
        .map(|(_, project)| project.name.as_str())
        .collect();

    let count = projects.len() as u32;
    let score = (count * 5).min(weight);

    let (notes, misses) = if count > 0 {
        (
            format!("Evidence spans {count} project(s), indicating delivery track record."),
            vec![],
        )
    } else {
        (
            "No evidence-linked project matches; delivery credibility is unproven for this JD."
                .to_string(),
            vec!["No evidence found for delivery credibility.".to_string()],
        )
    };

    SectionEval {
        score,
        notes,
        matches: vec![],
        misses,
    }
}
