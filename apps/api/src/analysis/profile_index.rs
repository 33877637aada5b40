//! Profile indexer — searchable term sets per project and the skill → project
//! evidence map. Rebuilt on every analysis; the profile itself is never mutated.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::analysis::domain::{extract_domain, project_text, Domain};
use crate::analysis::text::{contains_term, normalize, tokenize};
use crate::models::profile::{Profile, Project};

/// Evidence pages that describe overall career history.
static CAREER_HISTORY_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)/(work-history|career-history|career|experience)/?$").unwrap()
});

#[derive(Debug, Clone)]
pub struct ProjectIndex<'a> {
    pub project: &'a Project,
    /// Whole-field normalizations (≥3 chars) and tokens (≥4 chars), deduplicated.
    pub terms: Vec<String>,
    /// Normalized concatenation of every searchable field.
    pub text: String,
    pub domain: Option<Domain>,
}

impl ProjectIndex<'_> {
    pub fn has_evidence(&self) -> bool {
        self.project.has_evidence()
    }
}

fn push_unique(terms: &mut Vec<String>, term: String) {
    if !terms.contains(&term) {
        terms.push(term);
    }
}

fn project_fields(project: &Project) -> impl Iterator<Item = &str> {
    std::iter::once(project.name.as_str())
        .chain(std::iter::once(project.summary.as_str()))
        .chain(project.tags.iter().map(String::as_str))
        .chain(project.capability_tags.iter().map(String::as_str))
        .chain(project.stack.iter().map(String::as_str))
        .chain(project.outcomes.iter().map(String::as_str))
}

pub fn build_project_index(profile: &Profile) -> Vec<ProjectIndex<'_>> {
    profile
        .projects
        .iter()
        .map(|project| {
            let mut terms = Vec::new();
            for field in project_fields(project) {
                let whole = normalize(field);
                if whole.len() >= 3 {
                    push_unique(&mut terms, whole);
                }
                for token in tokenize(field) {
                    if token.len() >= 4 {
                        push_unique(&mut terms, token);
                    }
                }
            }

            let raw_text = project_text(project);
            ProjectIndex {
                project,
                terms,
                text: normalize(&raw_text),
                domain: extract_domain(&raw_text),
            }
        })
        .collect()
}

/// Skill terms mapped to the project that evidences them, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct SkillEvidenceMap<'a> {
    entries: Vec<(String, &'a Project)>,
}

impl<'a> SkillEvidenceMap<'a> {
    fn insert_if_absent(&mut self, term: String, project: &'a Project) {
        if !self.entries.iter().any(|(t, _)| *t == term) {
            self.entries.push((term, project));
        }
    }

    /// First skill term found in the normalized text.
    pub fn lookup(&self, normalized_text: &str) -> Option<&'a Project> {
        self.entries
            .iter()
            .find(|(term, _)| contains_term(normalized_text, term))
            .map(|(_, project)| *project)
    }
}

fn find_project_for_skill<'a>(skill: &str, index: &[ProjectIndex<'a>]) -> Option<&'a Project> {
    index
        .iter()
        .filter(|entry| entry.has_evidence())
        .find(|entry| {
            entry
                .terms
                .iter()
                .any(|term| contains_term(term, skill) || contains_term(skill, term))
        })
        .map(|entry| entry.project)
}

/// Career-history evidence first, otherwise the first evidenced project.
fn find_fallback_project<'a>(index: &[ProjectIndex<'a>]) -> Option<&'a Project> {
    index
        .iter()
        .find(|entry| {
            entry
                .project
                .evidence
                .entries()
                .iter()
                .any(|e| CAREER_HISTORY_URL.is_match(e.url.trim()))
        })
        .or_else(|| index.iter().find(|entry| entry.has_evidence()))
        .map(|entry| entry.project)
}

pub fn build_skill_evidence_map<'a>(
    profile: &Profile,
    index: &[ProjectIndex<'a>],
) -> SkillEvidenceMap<'a> {
    let mut map = SkillEvidenceMap::default();
    let fallback = find_fallback_project(index);

    for skill in &profile.skills {
        let normalized = normalize(skill);
        if normalized.is_empty() {
            continue;
        }

        let Some(project) = find_project_for_skill(&normalized, index).or(fallback) else {
            continue;
        };

        map.insert_if_absent(normalized, project);
        for token in tokenize(skill) {
            if token.len() >= 4 {
                map.insert_if_absent(token, project);
            }
        }
    }

    map
}
