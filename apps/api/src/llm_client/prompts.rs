// Cross-cutting prompt fragments. Feature prompts live next to their feature.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Instruction appended to every prompt that reads candidate-facing text.
pub const NO_FABRICATION_INSTRUCTION: &str = "\
    CRITICAL: Only report what the job text states. \
    Do NOT include project names, company names, or URLs. \
    Do NOT invent years, metrics, or skills.";
