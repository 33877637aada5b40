use std::sync::Arc;

use crate::analysis::interpreter::Interpreter;
use crate::config::Config;
use crate::models::profile::Profile;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Candidate profile, validated once at startup and read-only afterwards.
    pub profile: Arc<Profile>,
    pub config: Config,
    /// Pluggable interpreter. Default: KeywordInterpreter; LlmInterpreter when AI is active.
    pub interpreter: Arc<dyn Interpreter>,
}
