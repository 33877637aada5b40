//! Concept clusters — fixed capability vocabularies used to label strengths,
//! drive the keyword interpreter and bound what an AI interpreter may return.

use crate::analysis::text::{contains_phrase, normalize};

/// Rubric sections a cluster applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterSection {
    MustHaves,
    Responsibilities,
    NiceToHave,
}

#[derive(Debug, Clone, Copy)]
pub struct ConceptCluster {
    pub id: &'static str,
    pub label: &'static str,
    /// Normalized terms.
    pub terms: &'static [&'static str],
    pub weight: u32,
    pub sections: &'static [ClusterSection],
}

use self::ClusterSection::{MustHaves, NiceToHave, Responsibilities};

pub const CLUSTERS: &[ConceptCluster] = &[
    ConceptCluster {
        id: "prompt_engineering",
        label: "Prompt Engineering",
        terms: &[
            "prompt engineering",
            "prompt design",
            "llm prompting",
            "prompt optimization",
            "prompt crafting",
            "prompt strategies",
        ],
        weight: 3,
        sections: &[MustHaves, Responsibilities],
    },
    ConceptCluster {
        id: "agentic_workflows",
        label: "Agentic Workflows",
        terms: &[
            "agentic workflows",
            "ai agents",
            "ai orchestration",
            "agent systems",
            "multi agent",
            "autonomous agents",
            "agent architecture",
        ],
        weight: 3,
        sections: &[MustHaves, Responsibilities],
    },
    ConceptCluster {
        id: "change_enablement",
        label: "Change Enablement",
        terms: &[
            "change management",
            "adoption",
            "enablement",
            "change leadership",
            "organizational change",
            "transformation",
            "digital transformation",
        ],
        weight: 3,
        sections: &[MustHaves, Responsibilities],
    },
    ConceptCluster {
        id: "workshops_training",
        label: "Workshops and Training",
        terms: &[
            "workshops",
            "training",
            "coaching",
            "mentorship",
            "enablement",
            "knowledge sharing",
            "upskilling",
            "teaching non technical",
            "de mystifying ai",
        ],
        weight: 2,
        sections: &[MustHaves, Responsibilities, NiceToHave],
    },
    ConceptCluster {
        id: "python_integrations",
        label: "Python & Integrations",
        terms: &[
            "python",
            "python integration",
            "api integration",
            "automation",
            "scripting",
            "backend development",
            "data pipelines",
        ],
        weight: 2,
        sections: &[MustHaves, Responsibilities, NiceToHave],
    },
    ConceptCluster {
        id: "llm_foundations",
        label: "LLM Foundations",
        terms: &[
            "llm",
            "large language models",
            "rag",
            "retrieval augmented",
            "vector search",
            "embeddings",
            "llm application architecture",
            "generative ai",
        ],
        weight: 2,
        sections: &[MustHaves, Responsibilities, NiceToHave],
    },
    ConceptCluster {
        id: "stakeholder_management",
        label: "Stakeholder Management",
        terms: &[
            "stakeholder management",
            "cross functional",
            "vendor coordination",
            "client communication",
            "executive presence",
            "reporting",
        ],
        weight: 2,
        sections: &[MustHaves, Responsibilities],
    },
    ConceptCluster {
        id: "governance_delivery",
        label: "Governance and Delivery",
        terms: &[
            "governance",
            "delivery",
            "program management",
            "pmo",
            "steering",
            "risk management",
            "compliance",
        ],
        weight: 2,
        sections: &[MustHaves, Responsibilities, NiceToHave],
    },
];

pub fn is_allowed_cluster(id: &str) -> bool {
    CLUSTERS.iter().any(|c| c.id == id)
}

/// Allowed cluster IDs, sorted.
pub fn allowed_cluster_ids() -> Vec<&'static str> {
    let mut ids: Vec<&'static str> = CLUSTERS.iter().map(|c| c.id).collect();
    ids.sort_unstable();
    ids
}

/// First cluster (by weight, then declaration order) with a term in `text`.
pub fn cluster_for_line(text: &str) -> Option<&'static ConceptCluster> {
    let normalized = normalize(text);
    let mut best: Option<&'static ConceptCluster> = None;
    for cluster in CLUSTERS {
        if !cluster
            .terms
            .iter()
            .any(|term| contains_phrase(&normalized, term))
        {
            continue;
        }
        if best.map(|b| cluster.weight > b.weight).unwrap_or(true) {
            best = Some(cluster);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_ids_are_unique_and_allowed() {
        let mut ids = allowed_cluster_ids();
        ids.dedup();
        assert_eq!(ids.len(), CLUSTERS.len());
        assert!(is_allowed_cluster("llm_foundations"));
        assert!(!is_allowed_cluster("blockchain"));
    }

    #[test]
    fn test_terms_are_normalized() {
        for cluster in CLUSTERS {
            for term in cluster.terms {
                assert_eq!(normalize(term), *term, "{}", cluster.id);
            }
        }
    }

    #[test]
    fn test_cluster_for_line_prefers_heavier_cluster() {
        // "enablement" hits change_enablement (3) and workshops_training (2).
        let cluster = cluster_for_line("Drive AI enablement across regions").unwrap();
        assert_eq!(cluster.id, "change_enablement");

        let cluster = cluster_for_line("Build RAG pipelines").unwrap();
        assert_eq!(cluster.id, "llm_foundations");

        assert!(cluster_for_line("Sell handbags").is_none());
    }
}
