// Job-fit analysis
// Implements: section parsing, evidence matching, domain gating, risk gates,
// rubric aggregation and the optional interpretation pass.
// All LLM calls go through llm_client — no direct Anthropic SDK calls here.

pub mod aggregate;
pub mod concepts;
pub mod domain;
pub mod handlers;
pub mod interpreter;
pub mod profile_index;
pub mod prompts;
pub mod risk;
pub mod rubric;
pub mod section_eval;
pub mod sections;
pub mod text;
