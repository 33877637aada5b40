//! Section evaluator — scores one JD section by how many of its lines are
//! backed by an evidenced project.
//!
//! Per line:
//! 1. Pick the best evidenced project by term overlap (2 points per matched
//!    multi-word term, 1 per single word, first project wins ties), falling
//!    back to the skill evidence map.
//! 2. Reject the match when the line leans on a generic soft skill and the
//!    project's domain is incompatible with the job's.
//! 3. Reject the match when the line names industry terms the project never mentions.
//!
//! Score is `round(weight × coverage)`, reduced by up to half when only part of
//! the profile is domain-compatible with the job.

use crate::analysis::domain::{
    domain_terms_in, domains_compatible, has_generic_skill_phrase, DomainContext,
};
use crate::analysis::profile_index::{
    build_project_index, build_skill_evidence_map, ProjectIndex, SkillEvidenceMap,
};
use crate::analysis::text::{contains_phrase, contains_term, normalize};
use crate::models::profile::{Profile, Project};

/// Lines considered per section.
const MAX_SECTION_LINES: usize = 24;
/// Maximum score reduction when no project is domain-compatible.
const DOMAIN_PENALTY: f64 = 0.5;

/// Everything derived from (job text, profile) that line matching needs.
pub struct MatchContext<'a> {
    pub index: Vec<ProjectIndex<'a>>,
    pub skills: SkillEvidenceMap<'a>,
    pub domain: DomainContext,
}

impl<'a> MatchContext<'a> {
    pub fn build(jd_text: &str, profile: &'a Profile) -> Self {
        let index = build_project_index(profile);
        let skills = build_skill_evidence_map(profile, &index);
        let project_domains: Vec<_> = index.iter().map(|entry| entry.domain).collect();
        let domain = DomainContext::build(jd_text, &project_domains);
        Self {
            index,
            skills,
            domain,
        }
    }

    fn entry_for(&self, project: &Project) -> Option<&ProjectIndex<'a>> {
        self.index
            .iter()
            .find(|entry| std::ptr::eq(entry.project, project))
    }
}

#[derive(Debug, Clone)]
pub struct LineMatch<'a> {
    pub line: String,
    pub evidence_project: Option<&'a Project>,
}

#[derive(Debug, Clone)]
pub struct SectionEval<'a> {
    pub score: u32,
    pub notes: String,
    pub matches: Vec<LineMatch<'a>>,
    pub misses: Vec<String>,
}

impl<'a> SectionEval<'a> {
    pub fn empty(notes: String) -> Self {
        Self {
            score: 0,
            notes,
            matches: vec![],
            misses: vec![],
        }
    }

    pub fn evidenced(&self) -> impl Iterator<Item = (&str, &'a Project)> + '_ {
        self.matches
            .iter()
            .filter_map(|m| m.evidence_project.map(|p| (m.line.as_str(), p)))
    }

    /// Share of evaluated lines with evidence. 0.0 when nothing was evaluated.
    pub fn coverage(&self) -> f64 {
        if self.matches.is_empty() {
            return 0.0;
        }
        self.evidenced().count() as f64 / self.matches.len() as f64
    }
}

/// Best evidenced project for a normalized line.
pub fn find_best_evidence<'c, 'a>(
    normalized_line: &str,
    ctx: &'c MatchContext<'a>,
) -> Option<&'c ProjectIndex<'a>> {
    if normalized_line.is_empty() {
        return None;
    }

    let mut best: Option<&ProjectIndex<'a>> = None;
    let mut best_score = 0;

    for entry in ctx.index.iter().filter(|e| e.has_evidence()) {
        let score: u32 = entry
            .terms
            .iter()
            .filter(|term| contains_term(normalized_line, term))
            .map(|term| if term.contains(' ') { 2 } else { 1 })
            .sum();

        if score > best_score {
            best_score = score;
            best = Some(entry);
        }
    }

    if best.is_some() {
        return best;
    }

    ctx.skills
        .lookup(normalized_line)
        .and_then(|project| ctx.entry_for(project))
}

fn passes_domain_gates(normalized_line: &str, entry: &ProjectIndex<'_>, ctx: &MatchContext<'_>) -> bool {
    let job_domain = ctx.domain.job_domain;
    if has_generic_skill_phrase(normalized_line)
        && job_domain.is_some()
        && !domains_compatible(job_domain, entry.domain)
    {
        return false;
    }

    let line_terms = domain_terms_in(normalized_line);
    if !line_terms.is_empty()
        && !line_terms
            .iter()
            .any(|term| contains_phrase(&entry.text, term))
    {
        return false;
    }

    true
}

pub fn evaluate_section<'a>(
    lines: &[String],
    weight: u32,
    label: &str,
    ctx: &MatchContext<'a>,
) -> SectionEval<'a> {
    let sanitized: Vec<&str> = lines
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .take(MAX_SECTION_LINES)
        .collect();

    if sanitized.is_empty() {
        return SectionEval::empty(format!("{label} section not found."));
    }

    let mut matches = Vec::with_capacity(sanitized.len());
    let mut misses = Vec::new();

    for line in &sanitized {
        let normalized = normalize(line);
        let project = find_best_evidence(&normalized, ctx)
            .filter(|entry| passes_domain_gates(&normalized, entry, ctx))
            .map(|entry| entry.project);

        if project.is_none() {
            misses.push(line.to_string());
        }
        matches.push(LineMatch {
            line: line.to_string(),
            evidence_project: project,
        });
    }

    let mut eval = SectionEval {
        score: 0,
        notes: String::new(),
        matches,
        misses,
    };

    let mut score = (weight as f64 * eval.coverage()).round();
    let ratio = ctx.domain.compatibility_ratio;
    if ratio > 0.0 && ratio < 1.0 {
        score = (score * (1.0 - DOMAIN_PENALTY * (1.0 - ratio))).round();
    }
    eval.score = (score as u32).min(weight);

    let evidenced = eval.evidenced().count();
    eval.notes = format!(
        "{evidenced}/{} {} items have direct portfolio evidence.",
        sanitized.len(),
        label.to_lowercase()
    );
    if ratio > 0.0 && ratio < 1.0 {
        eval.notes.push_str(&format!(
            " Reduced for partial domain alignment ({:.0}% of projects compatible).",
            ratio * 100.0
        ));
    }

    eval
}
