//! Async handle over one wizard session.
//!
//! State changes happen under the session mutex; remote calls run with the lock
//! released and their results are applied afterwards, tagged so that results
//! for a removed, re-attached or reset slot are dropped.

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::backend_models::SubmissionReceipt;
use crate::errors::AppError;
use crate::kyc_client::KycApiClient;
use crate::messages::SUBMISSION_FAILED;
use crate::models::{
    ContentKind, CustomerField, CustomerPatch, ImageFile, SessionSnapshot, SlotId, SlotSnapshot,
    WizardStep,
};
use crate::wizard::{
    AnalysisRequest, AttachmentRound, VerificationOutcome, VerificationPlan, VerificationRequest,
    VerificationRound, WizardSession,
};

#[derive(Clone)]
pub struct OnboardingWizard {
    session: Arc<Mutex<WizardSession>>,
    client: KycApiClient,
}

impl OnboardingWizard {
    pub fn new(client: KycApiClient) -> Self {
        Self {
            session: Arc::new(Mutex::new(WizardSession::new())),
            client,
        }
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.session.lock().await.snapshot()
    }

    pub async fn set_field(&self, field: CustomerField, value: impl Into<String>) {
        self.session.lock().await.set_field(field, value);
    }

    /// Applies every field present in `patch`.
    pub async fn update_customer(&self, patch: CustomerPatch) -> SessionSnapshot {
        let mut session = self.session.lock().await;
        for (field, value) in patch.into_fields() {
            session.set_field(field, value);
        }
        session.snapshot()
    }

    pub async fn advance(&self) -> Result<WizardStep, AppError> {
        self.session.lock().await.advance()
    }

    pub async fn retreat(&self) -> Result<WizardStep, AppError> {
        self.session.lock().await.retreat()
    }

    pub async fn add_supporting_document(&self, kind: ContentKind) -> SlotId {
        self.session.lock().await.add_supporting(kind)
    }

    pub async fn remove_supporting_document(&self, id: SlotId) -> Result<(), AppError> {
        self.session.lock().await.remove_supporting(id)
    }

    pub async fn set_content_kind(&self, id: SlotId, kind: ContentKind) -> Result<(), AppError> {
        self.session.lock().await.set_content_kind(id, kind)
    }

    /// Attaches an image to slot `id`, uploads it and runs quality analysis.
    ///
    /// Remote failures end up in the slot state; only structural errors are returned.
    pub async fn attach_image(&self, id: SlotId, file: ImageFile) -> Result<SlotSnapshot, AppError> {
        let round = self.session.lock().await.begin_image(id, file)?;
        self.run_attachment(round).await;
        self.document(id).await
    }

    /// Attaches text to slot `id`. Blank text clears the slot without any remote call.
    pub async fn attach_text(&self, id: SlotId, text: String) -> Result<SlotSnapshot, AppError> {
        let round = self.session.lock().await.begin_text(id, text)?;
        if let Some(round) = round {
            self.run_attachment(round).await;
        }
        self.document(id).await
    }

    async fn run_attachment(&self, round: AttachmentRound) {
        let result = match &round.request {
            AnalysisRequest::Image(file) => match self.client.upload_object(file).await {
                Ok(reference) => {
                    if !self.session.lock().await.record_upload(round.tag, reference) {
                        return;
                    }
                    self.client.analyze_image(file).await
                }
                Err(e) => Err(e),
            },
            AnalysisRequest::Text(text) => self.client.analyze_text(text).await,
        };

        let mut session = self.session.lock().await;
        match result {
            Ok(analysis) => {
                session.finish_analysis(round.tag, analysis);
            }
            Err(e) => {
                tracing::warn!("Document {} analysis failed: {}", round.tag.slot, e);
                session.fail_analysis(round.tag, round.failure_message());
            }
        }
    }

    /// Verifies slot `id` and returns its resulting state.
    pub async fn verify(&self, id: SlotId) -> Result<SlotSnapshot, AppError> {
        let plan = self.session.lock().await.begin_verification(id)?;
        if let VerificationPlan::Remote(round) = plan {
            let outcome = self.run_verification(&round).await;
            self.session
                .lock()
                .await
                .finish_verification(&round, outcome);
        }
        self.document(id).await
    }

    async fn run_verification(&self, round: &VerificationRound) -> VerificationOutcome {
        let result = match &round.request {
            VerificationRequest::IdentityAttributes(request) => {
                self.client.verify_identity(request).await
            }
            VerificationRequest::FaceMatch {
                reference,
                candidate,
            } => self.client.verify_face_match(reference, candidate).await,
        };

        match result {
            Ok(true) => VerificationOutcome::Verified,
            Ok(false) => VerificationOutcome::NotVerified,
            Err(e) => {
                tracing::error!("Document {} verification failed: {}", round.tag.slot, e);
                VerificationOutcome::Failed
            }
        }
    }

    /// Creates the customer with its documents. On success the session is
    /// cleared; on failure it is kept so the operator can retry.
    pub async fn submit(&self) -> Result<SubmissionReceipt, AppError> {
        let (epoch, payload) = {
            let mut session = self.session.lock().await;
            let payload = session.begin_submission()?;
            (session.epoch(), payload)
        };

        let result = self.client.create_customer_with_documents(&payload).await;
        self.session
            .lock()
            .await
            .finish_submission(epoch, result.is_ok());

        match result {
            Ok(created) => Ok(SubmissionReceipt {
                documents_submitted: payload.documents.len(),
                created,
            }),
            Err(e) => {
                tracing::error!("Customer creation failed: {}", e);
                Err(AppError::SubmissionFailed(SUBMISSION_FAILED.to_string()))
            }
        }
    }

    /// Discards all state; anything still in flight is ignored when it lands.
    pub async fn close(&self) {
        self.session.lock().await.reset();
    }

    pub async fn document(&self, id: SlotId) -> Result<SlotSnapshot, AppError> {
        self.session
            .lock()
            .await
            .slot(id)
            .map(|slot| slot.snapshot())
            .ok_or_else(|| AppError::NotFound(format!("document {} does not exist", id)))
    }
}
