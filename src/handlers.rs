use crate::backend_models::SubmissionReceipt;
use crate::config::Config;
use crate::errors::{AppError, ResultExt};
use crate::kyc_client::KycApiClient;
use crate::models::{
    ContentKind, CustomerPatch, ImageFile, SessionSnapshot, SlotId, SlotSnapshot,
};
use crate::onboarding::OnboardingWizard;
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Client for the KYC backend, shared by every session.
    pub client: KycApiClient,
    /// Open wizard sessions. Idle sessions expire after `SESSION_TTL_SECS`.
    pub sessions: Cache<Uuid, OnboardingWizard>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, AppError> {
        let client = KycApiClient::new(&config).context("Failed to initialize KYC client")?;
        let sessions = Cache::builder()
            .time_to_idle(Duration::from_secs(config.session_ttl_secs))
            .max_capacity(config.max_sessions)
            .build();

        Ok(Self {
            config,
            client,
            sessions,
        })
    }

    async fn wizard(&self, id: Uuid) -> Result<OnboardingWizard, AppError> {
        self.sessions
            .get(&id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("session {} does not exist", id)))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCreated {
    pub session_id: Uuid,
    pub session: SessionSnapshot,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentKindRequest {
    #[serde(default)]
    pub content_kind: ContentKind,
}

#[derive(Debug, Deserialize)]
pub struct AttachTextRequest {
    pub text: String,
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "kyc-onboarding",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// POST /api/v1/onboarding/sessions
///
/// Opens a new wizard on the customer information step.
pub async fn create_session(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<SessionCreated>) {
    let session_id = Uuid::new_v4();
    let wizard = OnboardingWizard::new(state.client.clone());
    let session = wizard.snapshot().await;
    state.sessions.insert(session_id, wizard).await;

    tracing::info!("Opened onboarding session {}", session_id);
    (
        StatusCode::CREATED,
        Json(SessionCreated {
            session_id,
            session,
        }),
    )
}

/// GET /api/v1/onboarding/sessions/:id
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let wizard = state.wizard(id).await?;
    Ok(Json(wizard.snapshot().await))
}

/// DELETE /api/v1/onboarding/sessions/:id
///
/// Cancels the wizard. Calls still in flight finish against a discarded session.
pub async fn close_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let wizard = state
        .sessions
        .remove(&id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("session {} does not exist", id)))?;
    wizard.close().await;

    tracing::info!("Closed onboarding session {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/v1/onboarding/sessions/:id/customer
pub async fn update_customer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(patch): Json<CustomerPatch>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let wizard = state.wizard(id).await?;
    Ok(Json(wizard.update_customer(patch).await))
}

/// POST /api/v1/onboarding/sessions/:id/advance
pub async fn advance(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let wizard = state.wizard(id).await?;
    wizard.advance().await?;
    Ok(Json(wizard.snapshot().await))
}

/// POST /api/v1/onboarding/sessions/:id/retreat
pub async fn retreat(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let wizard = state.wizard(id).await?;
    wizard.retreat().await?;
    Ok(Json(wizard.snapshot().await))
}

/// POST /api/v1/onboarding/sessions/:id/documents
///
/// Adds an empty supporting document slot.
pub async fn add_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<ContentKindRequest>,
) -> Result<(StatusCode, Json<SlotSnapshot>), AppError> {
    let wizard = state.wizard(id).await?;
    let slot = wizard.add_supporting_document(request.content_kind).await;
    Ok((StatusCode::CREATED, Json(wizard.document(slot).await?)))
}

/// DELETE /api/v1/onboarding/sessions/:id/documents/:slot
pub async fn remove_document(
    State(state): State<Arc<AppState>>,
    Path((id, slot)): Path<(Uuid, SlotId)>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let wizard = state.wizard(id).await?;
    wizard.remove_supporting_document(slot).await?;
    Ok(Json(wizard.snapshot().await))
}

/// PUT /api/v1/onboarding/sessions/:id/documents/:slot/kind
pub async fn set_content_kind(
    State(state): State<Arc<AppState>>,
    Path((id, slot)): Path<(Uuid, SlotId)>,
    Json(request): Json<ContentKindRequest>,
) -> Result<Json<SlotSnapshot>, AppError> {
    let wizard = state.wizard(id).await?;
    wizard.set_content_kind(slot, request.content_kind).await?;
    Ok(Json(wizard.document(slot).await?))
}

/// POST /api/v1/onboarding/sessions/:id/documents/:slot/file
///
/// Attaches the multipart `file` field to the slot, then uploads and analyzes it.
pub async fn attach_file(
    State(state): State<Arc<AppState>>,
    Path((id, slot)): Path<(Uuid, SlotId)>,
    multipart: Multipart,
) -> Result<Json<SlotSnapshot>, AppError> {
    let wizard = state.wizard(id).await?;
    let file = read_file_field(multipart).await?;
    Ok(Json(wizard.attach_image(slot, file).await?))
}

/// PUT /api/v1/onboarding/sessions/:id/documents/:slot/text
pub async fn attach_text(
    State(state): State<Arc<AppState>>,
    Path((id, slot)): Path<(Uuid, SlotId)>,
    Json(request): Json<AttachTextRequest>,
) -> Result<Json<SlotSnapshot>, AppError> {
    let wizard = state.wizard(id).await?;
    Ok(Json(wizard.attach_text(slot, request.text).await?))
}

/// POST /api/v1/onboarding/sessions/:id/documents/:slot/verify
pub async fn verify_document(
    State(state): State<Arc<AppState>>,
    Path((id, slot)): Path<(Uuid, SlotId)>,
) -> Result<Json<SlotSnapshot>, AppError> {
    let wizard = state.wizard(id).await?;
    Ok(Json(wizard.verify(slot).await?))
}

/// POST /api/v1/onboarding/sessions/:id/submit
///
/// On success the customer exists in the backend and the session is gone.
pub async fn submit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SubmissionReceipt>, AppError> {
    let wizard = state.wizard(id).await?;
    let receipt = wizard.submit().await?;
    state.sessions.invalidate(&id).await;

    tracing::info!(
        "Session {} submitted with {} document(s)",
        id,
        receipt.documents_submitted
    );
    Ok(Json(receipt))
}

async fn read_file_field(mut multipart: Multipart) -> Result<ImageFile, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read file: {}", e)))?;
        if bytes.is_empty() {
            return Err(AppError::BadRequest(format!("{} is empty", file_name)));
        }

        let file = ImageFile::new(file_name, bytes.to_vec());
        return Ok(match content_type {
            Some(content_type) => file.with_content_type(content_type),
            None => file,
        });
    }

    Err(AppError::BadRequest(
        "multipart field 'file' is required".to_string(),
    ))
}
