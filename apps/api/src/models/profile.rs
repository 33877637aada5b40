//! Candidate profile — skills, evidence-backed projects and work constraints.
//!
//! Loaded once at startup and shared read-only. Ingestion validates structure
//! first so a malformed file fails with a message naming the offending field.

use std::collections::HashSet;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Invalid profile data: {0}")]
    Invalid(&'static str),

    #[error("Invalid profile data: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Profile {
    pub skills: Vec<String>,
    pub projects: Vec<Project>,
    pub constraints: Constraints,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Constraints {
    pub location: String,
    pub languages: Vec<String>,
    pub availability: String,
}

/// A structured evidence link with optional display metadata.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EvidenceItem {
    pub url: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
}

/// Evidence attached to a project: legacy bare URLs or structured items.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectEvidence {
    Urls(Vec<String>),
    Items(Vec<EvidenceItem>),
}

/// Borrowed view over either evidence shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvidenceRef<'a> {
    pub url: &'a str,
    pub label: Option<&'a str>,
    pub snippet: Option<&'a str>,
}

impl ProjectEvidence {
    /// Canonical accessor. Callers never branch on the evidence shape.
    pub fn entries(&self) -> Vec<EvidenceRef<'_>> {
        match self {
            ProjectEvidence::Urls(urls) => urls
                .iter()
                .map(|url| EvidenceRef {
                    url,
                    label: None,
                    snippet: None,
                })
                .collect(),
            ProjectEvidence::Items(items) => items
                .iter()
                .map(|item| EvidenceRef {
                    url: &item.url,
                    label: item.label.as_deref(),
                    snippet: item.snippet.as_deref(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawProject")]
pub struct Project {
    pub name: String,
    pub summary: String,
    pub tags: Vec<String>,
    /// Capability labels such as "prompt engineering"; searchable like tags.
    pub capability_tags: Vec<String>,
    pub stack: Vec<String>,
    pub outcomes: Vec<String>,
    pub evidence: ProjectEvidence,
}

#[derive(Deserialize)]
struct RawProject {
    name: String,
    #[serde(default)]
    summary: String,
    tags: Vec<String>,
    #[serde(default)]
    capability_tags: Vec<String>,
    stack: Vec<String>,
    outcomes: Vec<String>,
    #[serde(default)]
    evidence_urls: Option<Vec<String>>,
    #[serde(default)]
    evidence: Option<Vec<EvidenceItem>>,
}

impl TryFrom<RawProject> for Project {
    type Error = String;

    fn try_from(raw: RawProject) -> Result<Self, Self::Error> {
        // Structured evidence wins when both shapes are present.
        let evidence = match (raw.evidence, raw.evidence_urls) {
            (Some(items), _) => ProjectEvidence::Items(items),
            (None, Some(urls)) => ProjectEvidence::Urls(urls),
            (None, None) => {
                return Err(format!("project '{}' has no evidence list", raw.name));
            }
        };

        Ok(Project {
            name: raw.name,
            summary: raw.summary,
            tags: raw.tags,
            capability_tags: raw.capability_tags,
            stack: raw.stack,
            outcomes: raw.outcomes,
            evidence,
        })
    }
}

impl Project {
    /// First evidence entry with a non-blank URL.
    pub fn primary_evidence(&self) -> Option<EvidenceRef<'_>> {
        self.evidence
            .entries()
            .into_iter()
            .find(|entry| !entry.url.trim().is_empty())
    }

    pub fn has_evidence(&self) -> bool {
        self.primary_evidence().is_some()
    }
}

impl Profile {
    /// Every non-blank evidence URL in the profile. Strengths may only cite these.
    pub fn evidence_url_set(&self) -> HashSet<&str> {
        self.projects
            .iter()
            .flat_map(|p| p.evidence.entries())
            .map(|entry| entry.url)
            .filter(|url| !url.trim().is_empty())
            .collect()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Ingestion
// ────────────────────────────────────────────────────────────────────────────

fn is_array(value: &Value, key: &str) -> bool {
    value.get(key).map(Value::is_array).unwrap_or(false)
}

/// Checks profile structure field by field, then deserializes it.
pub fn parse_and_validate_profile(input: Value) -> Result<Profile, ProfileError> {
    if !input.is_object() {
        return Err(ProfileError::Invalid("expected object"));
    }
    if !is_array(&input, "skills") {
        return Err(ProfileError::Invalid("skills must be an array"));
    }
    let Some(projects) = input.get("projects").and_then(Value::as_array) else {
        return Err(ProfileError::Invalid("projects must be an array"));
    };
    let Some(constraints) = input.get("constraints").filter(|c| c.is_object()) else {
        return Err(ProfileError::Invalid("constraints must be an object"));
    };
    if !constraints.get("location").map(Value::is_string).unwrap_or(false) {
        return Err(ProfileError::Invalid("constraints.location must be a string"));
    }
    if !is_array(constraints, "languages") {
        return Err(ProfileError::Invalid("constraints.languages must be an array"));
    }
    if !constraints.get("availability").map(Value::is_string).unwrap_or(false) {
        return Err(ProfileError::Invalid("constraints.availability must be a string"));
    }

    for project in projects {
        if !project.is_object() {
            return Err(ProfileError::Invalid("project must be an object"));
        }
        if !project.get("name").map(Value::is_string).unwrap_or(false) {
            return Err(ProfileError::Invalid("project.name must be a string"));
        }
        if !is_array(project, "tags") || !is_array(project, "outcomes") || !is_array(project, "stack")
        {
            return Err(ProfileError::Invalid(
                "project tags/outcomes/stack must be arrays",
            ));
        }
        if !is_array(project, "evidence_urls") && !is_array(project, "evidence") {
            return Err(ProfileError::Invalid(
                "project.evidence_urls or project.evidence must be an array",
            ));
        }
    }

    Ok(serde_json::from_value(input)?)
}

/// Reads and validates the profile file. Any failure is fatal at startup.
pub fn load_profile(path: &Path) -> anyhow::Result<Profile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read profile at {}", path.display()))?;
    let value: Value = serde_json::from_str(&raw)
        .with_context(|| format!("Profile at {} is not valid JSON", path.display()))?;
    let profile = parse_and_validate_profile(value)?;
    Ok(profile)
}
