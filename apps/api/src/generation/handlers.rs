//! Axum route handlers for the Posts API.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::generation::compose::{brief_from_form, FormInput};
use crate::generation::orchestrator::{ExecutionMode, PostBrief};
use crate::generation::tone::{DEFAULT_TONE, SINGLE_LABEL};
use crate::history::{HistoryEntry, HistoryInputs};
use crate::models::{BatchResult, GenerationResult, LengthBucket};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    #[default]
    Single,
    MultiTone,
    MultiVariant,
}

fn default_language() -> String {
    "English".to_string()
}

#[derive(Debug, Deserialize)]
pub struct GeneratePostRequest {
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub custom_prompt: Option<String>,
    #[serde(default)]
    pub document_text: Option<String>,
    #[serde(default)]
    pub length: LengthBucket,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub mode: GenerationMode,
    /// Multi-job modes only. Sequential is the rate-limit-friendly default.
    #[serde(default)]
    pub parallel: bool,
}

#[derive(Debug, Deserialize)]
pub struct CustomToneRequest {
    pub tone: String,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub custom_prompt: Option<String>,
    #[serde(default)]
    pub document_text: Option<String>,
    #[serde(default)]
    pub length: LengthBucket,
    #[serde(default = "default_language")]
    pub language: String,
}

/// A result the user chose to keep, typically one entry of a multi-job batch.
#[derive(Debug, Deserialize)]
pub struct RecordHistoryRequest {
    pub result: GenerationResult,
    pub inputs: HistoryInputs,
}

#[derive(Debug, Serialize)]
pub struct GeneratePostResponse {
    pub mode: GenerationMode,
    pub results: BatchResult,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/posts/generate
///
/// Single mode returns one result keyed "Professional" and records it in
/// history. Multi modes return three keyed results; failed jobs are included.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(request): Json<GeneratePostRequest>,
) -> Result<Json<GeneratePostResponse>, AppError> {
    let form = FormInput {
        topic: request.topic.as_deref(),
        custom_prompt: request.custom_prompt.as_deref(),
        document_text: request.document_text.as_deref(),
    };
    let brief = brief_from_form(form, request.length, &request.language);
    let execution = if request.parallel {
        ExecutionMode::Parallel
    } else {
        ExecutionMode::Sequential
    };
    info!(
        "Generating posts: mode={:?} length={:?} language={}",
        request.mode, brief.length, brief.language
    );

    let results = match request.mode {
        GenerationMode::Single => {
            let result = state.orchestrator.generate_single(&brief).await;
            record_history(&state, request_inputs(&brief, form, DEFAULT_TONE), &result).await;
            let mut batch = BatchResult::new();
            batch.insert(SINGLE_LABEL.to_string(), result);
            batch
        }
        GenerationMode::MultiTone => {
            state
                .orchestrator
                .generate_multi_tone(&brief, execution)
                .await
        }
        GenerationMode::MultiVariant => {
            state
                .orchestrator
                .generate_multi_variant(&brief, execution)
                .await
        }
    };

    Ok(Json(GeneratePostResponse {
        mode: request.mode,
        results,
    }))
}

/// POST /api/v1/posts/custom-tone
pub async fn handle_custom_tone(
    State(state): State<AppState>,
    Json(request): Json<CustomToneRequest>,
) -> Result<Json<GenerationResult>, AppError> {
    let tone = request.tone.trim();
    if tone.is_empty() {
        return Err(AppError::Validation("tone cannot be empty".to_string()));
    }

    let form = FormInput {
        topic: request.topic.as_deref(),
        custom_prompt: request.custom_prompt.as_deref(),
        document_text: request.document_text.as_deref(),
    };
    let brief = brief_from_form(form, request.length, &request.language);
    info!("Generating custom-tone post: tone={tone}");

    let result = state.orchestrator.generate_custom_tone(&brief, tone).await;
    record_history(&state, request_inputs(&brief, form, tone), &result).await;

    Ok(Json(result))
}

/// GET /api/v1/posts/history
pub async fn handle_list_history(State(state): State<AppState>) -> Json<Vec<HistoryEntry>> {
    Json(state.history.list().await)
}

/// POST /api/v1/posts/history
///
/// Records a result picked from a multi-tone or multi-variant batch.
pub async fn handle_record_history(
    State(state): State<AppState>,
    Json(request): Json<RecordHistoryRequest>,
) -> Result<(StatusCode, Json<HistoryEntry>), AppError> {
    if request.result.failed {
        return Err(AppError::Validation(
            "failed results cannot be saved to history".to_string(),
        ));
    }
    if request.result.post_text.trim().is_empty() {
        return Err(AppError::Validation("post cannot be empty".to_string()));
    }

    let entry = HistoryEntry::new(request.result, request.inputs);
    info!("Recording chosen post in history: label={}", entry.result.variant_label);
    state.history.push(entry.clone()).await;

    Ok((StatusCode::CREATED, Json(entry)))
}

/// DELETE /api/v1/posts/history
pub async fn handle_clear_history(State(state): State<AppState>) -> StatusCode {
    state.history.clear().await;
    StatusCode::NO_CONTENT
}

fn request_inputs(brief: &PostBrief, form: FormInput<'_>, tone: &str) -> HistoryInputs {
    HistoryInputs {
        prompt: brief.topic.clone(),
        topic: form.topic.map(str::to_string),
        custom_prompt: brief.custom_instruction.clone(),
        length: brief.length,
        language: brief.language.clone(),
        tone: tone.to_string(),
        used_document: form.document_text.is_some_and(|d| !d.trim().is_empty()),
    }
}

async fn record_history(state: &AppState, inputs: HistoryInputs, result: &GenerationResult) {
    if result.failed {
        return;
    }
    state
        .history
        .push(HistoryEntry::new(result.clone(), inputs))
        .await;
}
