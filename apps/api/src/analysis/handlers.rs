//! Axum route handlers for the Analysis API.

use axum::{extract::State, Json};
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use crate::analysis::aggregate::analyze;
use crate::analysis::interpreter::interpret_bounded;
use crate::analysis::sections::split_into_sections;
use crate::errors::AppError;
use crate::models::analysis::AnalyzeResponse;
use crate::state::AppState;

/// Extracts `jd_text` from a raw request body.
pub fn validate_analyze_body(body: &Value, max_chars: usize) -> Result<String, AppError> {
    let Some(object) = body.as_object() else {
        return Err(AppError::Validation(
            "JSON body must be an object".to_string(),
        ));
    };

    let Some(jd_text) = object.get("jd_text").and_then(Value::as_str) else {
        return Err(AppError::Validation(
            "Field jd_text must be a string".to_string(),
        ));
    };

    if jd_text.trim().is_empty() {
        return Err(AppError::Validation(
            "Field jd_text cannot be empty".to_string(),
        ));
    }

    if jd_text.chars().count() > max_chars {
        return Err(AppError::Validation(format!(
            "Field jd_text exceeds max length of {max_chars} characters"
        )));
    }

    Ok(jd_text.to_string())
}

/// POST /analyze
///
/// Scores the job text against the loaded profile. The interpretation pass
/// runs under the configured budget and only feeds `ai_metadata`.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let jd_text = validate_analyze_body(&body, state.config.analyzer.max_jd_chars)?;
    let request_id = Uuid::new_v4().to_string();

    let parsed = split_into_sections(&jd_text);
    debug!(request_id = %request_id, "Parsed job text:\n{}", parsed.to_text());
    let interpretation = if state.config.ai.enabled {
        Some(interpret_bounded(state.interpreter.as_ref(), &parsed, state.config.ai.timeout).await)
    } else {
        None
    };

    let profile = state.profile.clone();
    let analyzer = state.config.analyzer.clone();
    let response = tokio::task::spawn_blocking(move || {
        analyze(
            &jd_text,
            &profile,
            &request_id,
            &analyzer,
            interpretation.as_ref(),
        )
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("analysis task failed: {e}")))?;

    info!(
        request_id = %response.request_id,
        score = response.score,
        confidence = %response.confidence,
        strengths = response.strengths.len(),
        gaps = response.gaps.len(),
        "Analysis complete"
    );

    Ok(Json(response))
}
