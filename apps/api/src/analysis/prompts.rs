// Prompt templates for JD interpretation.
// All LLM calls go through llm_client — no direct API calls here.

/// Placeholders: {jd_text}, {allowed_ids}, {domain_terms}, {no_fabrication}
pub const INTERPRET_PROMPT_TEMPLATE: &str = r#"You are a job-description analysis assistant. Extract structured information from this job description.

=== JOB DESCRIPTION ===
{jd_text}

=== INSTRUCTIONS ===
Return ONLY valid JSON matching this shape:
{
  "cluster_targets": {
    "required": ["cluster_id"],
    "nice_to_have": ["cluster_id"]
  },
  "domain_signal": {
    "matched": true,
    "terms": ["domain_term"]
  },
  "language_requirements": ["English"],
  "risk_flags": ["short constraint description"]
}

Rules:
- cluster ids must be from: {allowed_ids}
- Only include clusters the job text actually asks for
- domain terms must be from: {domain_terms}
- risk_flags covers language, location and contract constraints only
{no_fabrication}"#;
