//! Wizard session: customer draft, identity slot, supporting slots and the step
//! controller that gates navigation between them.
//!
//! The session is plain synchronous state. Remote work is described by the
//! `*Round` values returned from `begin_*` methods and applied back through the
//! matching `finish_*` method. Each round carries a [`RoundTag`]; results for a
//! session epoch or slot generation that has since moved on are dropped.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use uuid::Uuid;

use crate::backend_models::{CreationPayload, VerifyUserRequest};
use crate::errors::AppError;
use crate::form::FieldStore;
use crate::messages;
use crate::models::{
    Analysis, ContentKind, CustomerField, DocumentKind, ImageFile, KycStatus, SessionSnapshot,
    SlotId, WizardStep, IDENTITY_SLOT,
};
use crate::slot::DocumentSlot;
use crate::submission;

/// Identifies the session epoch and slot generation a remote round was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundTag {
    pub epoch: u64,
    pub slot: SlotId,
    pub generation: u64,
}

#[derive(Debug, Clone)]
pub enum AnalysisRequest {
    /// Upload, then image analysis.
    Image(ImageFile),
    /// Text analysis only.
    Text(String),
}

#[derive(Debug, Clone)]
pub struct AttachmentRound {
    pub tag: RoundTag,
    pub request: AnalysisRequest,
}

impl AttachmentRound {
    /// Issue text recorded when the round fails.
    pub fn failure_message(&self) -> &'static str {
        match (&self.request, self.tag.slot) {
            (AnalysisRequest::Image(_), IDENTITY_SLOT) => messages::IDENTITY_IMAGE_UNPROCESSABLE,
            (AnalysisRequest::Image(_), _) => messages::IMAGE_UNPROCESSABLE,
            (AnalysisRequest::Text(_), _) => messages::TEXT_UNPROCESSABLE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationKind {
    IdentityDocument,
    SupportingImage,
    SupportingText,
}

impl VerificationKind {
    fn message(&self, outcome: VerificationOutcome) -> &'static str {
        use VerificationOutcome::*;
        match (self, outcome) {
            (VerificationKind::IdentityDocument, Verified) => messages::IDENTITY_VERIFIED,
            (VerificationKind::IdentityDocument, NotVerified) => messages::IDENTITY_MISMATCH,
            (VerificationKind::IdentityDocument, Failed) => messages::IDENTITY_ERROR,
            (VerificationKind::SupportingImage, Verified) => messages::FACE_MATCH_VERIFIED,
            (VerificationKind::SupportingImage, NotVerified) => messages::FACE_MATCH_FAILED,
            (VerificationKind::SupportingImage, Failed) => messages::FACE_MATCH_ERROR,
            (VerificationKind::SupportingText, Verified) => messages::TEXT_VERIFIED,
            (VerificationKind::SupportingText, NotVerified) => messages::TEXT_MISMATCH,
            (VerificationKind::SupportingText, Failed) => messages::TEXT_ERROR,
        }
    }
}

#[derive(Debug, Clone)]
pub enum VerificationRequest {
    /// Customer identity attributes checked against a document (image or text).
    IdentityAttributes(VerifyUserRequest),
    /// Face comparison between the identity image and a supporting image.
    FaceMatch {
        reference: ImageFile,
        candidate: ImageFile,
    },
}

#[derive(Debug, Clone)]
pub struct VerificationRound {
    pub tag: RoundTag,
    pub kind: VerificationKind,
    /// Identity slot generation when the round was issued.
    pub identity_generation: u64,
    pub request: VerificationRequest,
}

/// What `begin_verification` decided.
#[derive(Debug, Clone)]
pub enum VerificationPlan {
    /// Prerequisites missing; the slot was rejected locally.
    RejectedLocally,
    /// A remote call is needed.
    Remote(VerificationRound),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// The backend confirmed the document.
    Verified,
    /// The backend answered, but not with a match.
    NotVerified,
    /// Transport or server failure.
    Failed,
}

#[derive(Debug, Clone)]
pub struct WizardSession {
    epoch: u64,
    form: FieldStore,
    identity: DocumentSlot,
    supporting: Vec<DocumentSlot>,
    step: WizardStep,
    submitting: bool,
    next_slot_id: SlotId,
}

impl Default for WizardSession {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardSession {
    pub fn new() -> Self {
        Self::with_epoch(0)
    }

    fn with_epoch(epoch: u64) -> Self {
        Self {
            epoch,
            form: FieldStore::new(),
            identity: DocumentSlot::identity(),
            supporting: Vec::new(),
            step: WizardStep::CustomerInformation,
            submitting: false,
            next_slot_id: IDENTITY_SLOT + 1,
        }
    }

    /// Discards everything; rounds still in flight become stale.
    pub fn reset(&mut self) {
        *self = Self::with_epoch(self.epoch + 1);
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn form(&self) -> &FieldStore {
        &self.form
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn identity(&self) -> &DocumentSlot {
        &self.identity
    }

    pub fn supporting(&self) -> &[DocumentSlot] {
        &self.supporting
    }

    pub fn set_field(&mut self, field: CustomerField, value: impl Into<String>) {
        self.form.set(field, value);
    }

    pub fn slot(&self, id: SlotId) -> Option<&DocumentSlot> {
        if id == IDENTITY_SLOT {
            return Some(&self.identity);
        }
        self.supporting.iter().find(|s| s.id() == id)
    }

    fn slot_mut(&mut self, id: SlotId) -> Option<&mut DocumentSlot> {
        if id == IDENTITY_SLOT {
            return Some(&mut self.identity);
        }
        self.supporting.iter_mut().find(|s| s.id() == id)
    }

    fn require_slot(&mut self, id: SlotId) -> Result<&mut DocumentSlot, AppError> {
        self.slot_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("document {} does not exist", id)))
    }

    /// Slot a finished round should be applied to, if the round is still relevant.
    fn round_target(&mut self, tag: RoundTag) -> Option<&mut DocumentSlot> {
        if tag.epoch != self.epoch {
            tracing::debug!(
                "Discarding result for document {} from closed session epoch {}",
                tag.slot,
                tag.epoch
            );
            return None;
        }
        let slot = self.slot_mut(tag.slot);
        if slot.is_none() {
            tracing::debug!("Discarding result for removed document {}", tag.slot);
        }
        slot
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            current_step: self.step.index(),
            step: self.step,
            customer: self.form.draft().clone(),
            field_errors: self.form.errors(),
            identity_document: self.identity.snapshot(),
            supporting_documents: self.supporting.iter().map(|s| s.snapshot()).collect(),
            submitting: self.submitting,
        }
    }

    // ---- step controller ----

    /// Moves to the next step if the current one is complete.
    pub fn advance(&mut self) -> Result<WizardStep, AppError> {
        match self.step {
            WizardStep::CustomerInformation => self.form.validate_required()?,
            WizardStep::IdentityDocument => {
                if !self.identity.is_verified() {
                    return Err(AppError::VerificationIncomplete(
                        messages::VERIFY_IDENTITY_BEFORE_PROCEEDING.to_string(),
                    ));
                }
            }
            WizardStep::SupportingDocuments => {}
        }

        let next = self.step.next().ok_or_else(|| {
            AppError::BadRequest("already on the last step; submit the wizard instead".to_string())
        })?;
        self.step = next;
        tracing::debug!("Wizard advanced to step {}", next.index());
        Ok(next)
    }

    /// Moves back one step. Field and document state is kept.
    pub fn retreat(&mut self) -> Result<WizardStep, AppError> {
        let previous = self
            .step
            .previous()
            .ok_or_else(|| AppError::BadRequest("already on the first step".to_string()))?;
        self.step = previous;
        Ok(previous)
    }

    // ---- supporting documents ----

    pub fn add_supporting(&mut self, kind: ContentKind) -> SlotId {
        let id = self.next_slot_id;
        self.next_slot_id += 1;
        self.supporting.push(DocumentSlot::supporting(id, kind));
        id
    }

    pub fn remove_supporting(&mut self, id: SlotId) -> Result<(), AppError> {
        if id == IDENTITY_SLOT {
            return Err(AppError::BadRequest(
                "the identity document cannot be removed".to_string(),
            ));
        }
        let before = self.supporting.len();
        self.supporting.retain(|s| s.id() != id);
        if self.supporting.len() == before {
            return Err(AppError::NotFound(format!("document {} does not exist", id)));
        }
        Ok(())
    }

    pub fn set_content_kind(&mut self, id: SlotId, kind: ContentKind) -> Result<(), AppError> {
        self.require_slot(id)?.set_content_kind(kind)?;
        Ok(())
    }

    // ---- attachment rounds ----

    pub fn begin_image(&mut self, id: SlotId, file: ImageFile) -> Result<AttachmentRound, AppError> {
        let epoch = self.epoch;
        let generation = self.require_slot(id)?.begin_image(file.clone())?;
        Ok(AttachmentRound {
            tag: RoundTag {
                epoch,
                slot: id,
                generation,
            },
            request: AnalysisRequest::Image(file),
        })
    }

    /// Starts a text attachment; `None` means the text was blank and no analysis is needed.
    pub fn begin_text(
        &mut self,
        id: SlotId,
        text: String,
    ) -> Result<Option<AttachmentRound>, AppError> {
        let epoch = self.epoch;
        let generation = self.require_slot(id)?.begin_text(text.clone())?;
        Ok(generation.map(|generation| AttachmentRound {
            tag: RoundTag {
                epoch,
                slot: id,
                generation,
            },
            request: AnalysisRequest::Text(text),
        }))
    }

    pub fn record_upload(&mut self, tag: RoundTag, reference: String) -> bool {
        self.round_target(tag)
            .is_some_and(|slot| slot.record_upload(tag.generation, reference))
    }

    pub fn finish_analysis(&mut self, tag: RoundTag, analysis: Analysis) -> bool {
        self.round_target(tag)
            .is_some_and(|slot| slot.finish_analysis(tag.generation, analysis))
    }

    pub fn fail_analysis(&mut self, tag: RoundTag, message: &str) -> bool {
        self.round_target(tag)
            .is_some_and(|slot| slot.fail_analysis(tag.generation, message))
    }

    // ---- verification rounds ----

    /// Checks prerequisites for verifying `id` and either rejects the slot locally
    /// or describes the remote call to make.
    pub fn begin_verification(&mut self, id: SlotId) -> Result<VerificationPlan, AppError> {
        let slot = self
            .slot(id)
            .ok_or_else(|| AppError::NotFound(format!("document {} does not exist", id)))?;
        slot.ensure_idle()?;

        let prepared = match (slot.document_kind(), slot.content_kind()) {
            (DocumentKind::Identity, _) => self.prepare_identity_check(),
            (DocumentKind::Supporting, _) if !self.identity.is_verified() => {
                Err(messages::VERIFY_IDENTITY_FIRST)
            }
            (DocumentKind::Supporting, ContentKind::Image) => self.prepare_face_match(slot),
            (DocumentKind::Supporting, ContentKind::Text) => self.prepare_text_check(slot),
        };

        let (kind, request) = match prepared {
            Ok(prepared) => prepared,
            Err(message) => {
                tracing::info!("Document {} rejected locally: {}", id, message);
                self.require_slot(id)?.reject(message)?;
                return Ok(VerificationPlan::RejectedLocally);
            }
        };

        let epoch = self.epoch;
        let identity_generation = self.identity.generation();
        let generation = self.require_slot(id)?.begin_verification()?;
        Ok(VerificationPlan::Remote(VerificationRound {
            tag: RoundTag {
                epoch,
                slot: id,
                generation,
            },
            kind,
            identity_generation,
            request,
        }))
    }

    fn prepare_identity_check(
        &self,
    ) -> Result<(VerificationKind, VerificationRequest), &'static str> {
        let file = self
            .identity
            .content()
            .image()
            .ok_or(messages::IDENTITY_PREREQUISITES_MISSING)?;
        let request = self
            .identity_attributes(STANDARD.encode(&file.bytes))
            .ok_or(messages::IDENTITY_PREREQUISITES_MISSING)?;
        if self.identity.stored_reference().is_none() {
            return Err(messages::IDENTITY_NOT_UPLOADED);
        }
        Ok((
            VerificationKind::IdentityDocument,
            VerificationRequest::IdentityAttributes(request),
        ))
    }

    fn prepare_face_match(
        &self,
        slot: &DocumentSlot,
    ) -> Result<(VerificationKind, VerificationRequest), &'static str> {
        let reference = self
            .identity
            .content()
            .image()
            .ok_or(messages::IDENTITY_IMAGE_MISSING)?;
        let candidate = slot
            .content()
            .image()
            .filter(|_| slot.stored_reference().is_some())
            .ok_or(messages::SUPPORTING_IMAGE_MISSING)?;
        Ok((
            VerificationKind::SupportingImage,
            VerificationRequest::FaceMatch {
                reference: reference.clone(),
                candidate: candidate.clone(),
            },
        ))
    }

    fn prepare_text_check(
        &self,
        slot: &DocumentSlot,
    ) -> Result<(VerificationKind, VerificationRequest), &'static str> {
        let text = slot
            .content()
            .text()
            .filter(|t| !t.trim().is_empty())
            .ok_or(messages::TEXT_PREREQUISITES_MISSING)?;
        let request = self
            .identity_attributes(STANDARD.encode(text.as_bytes()))
            .ok_or(messages::TEXT_PREREQUISITES_MISSING)?;
        Ok((
            VerificationKind::SupportingText,
            VerificationRequest::IdentityAttributes(request),
        ))
    }

    /// Identity verification body, or `None` when name, id number or a parseable
    /// date of birth is missing.
    fn identity_attributes(&self, document_base64: String) -> Option<VerifyUserRequest> {
        let draft = self.form.draft();
        if !draft.has_identity_fields() {
            return None;
        }
        let birth_date = draft.birth_date()?;

        Some(VerifyUserRequest {
            id: format!("temp-{}", Uuid::new_v4()),
            full_name: draft.full_name.trim().to_string(),
            id_number: draft.id_number.trim().to_string(),
            date_of_birth: birth_date.format("%Y/%m/%d").to_string(),
            document_image_base64: document_base64,
            address: draft.address.clone(),
            phone_number: draft.phone.clone(),
            kyc_status: KycStatus::Pending,
        })
    }

    /// Applies a verification result. Returns false when the result was stale.
    pub fn finish_verification(
        &mut self,
        round: &VerificationRound,
        outcome: VerificationOutcome,
    ) -> bool {
        let identity_verified = self.identity.is_verified();
        let identity_generation = self.identity.generation();
        let Some(slot) = self.round_target(round.tag) else {
            return false;
        };

        if round.kind != VerificationKind::IdentityDocument {
            let gate = if !identity_verified {
                Some(messages::VERIFY_IDENTITY_FIRST)
            } else if identity_generation != round.identity_generation {
                Some(messages::IDENTITY_CHANGED)
            } else {
                None
            };
            if let Some(message) = gate {
                tracing::warn!(
                    "Document {} verification result dropped: identity document no longer matches",
                    round.tag.slot
                );
                return slot.finish_verification(round.tag.generation, false, message);
            }
        }

        let verified = outcome == VerificationOutcome::Verified;
        slot.finish_verification(round.tag.generation, verified, round.kind.message(outcome))
    }

    // ---- submission ----

    /// Builds the creation payload and marks the session as submitting.
    pub fn begin_submission(&mut self) -> Result<CreationPayload, AppError> {
        if self.submitting {
            return Err(AppError::Busy("a submission is already in progress".to_string()));
        }
        let payload = submission::build_payload(self)?;
        self.submitting = true;
        Ok(payload)
    }

    /// Clears the session after a successful submission, or re-enables submission
    /// after a failed one.
    pub fn finish_submission(&mut self, epoch: u64, succeeded: bool) {
        if epoch != self.epoch {
            tracing::debug!("Ignoring submission result for closed session epoch {}", epoch);
            return;
        }
        if succeeded {
            self.reset();
        } else {
            self.submitting = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{QualityScore, VerificationState};

    fn filled_session() -> WizardSession {
        let mut session = WizardSession::new();
        session.set_field(CustomerField::FullName, "Jane Doe");
        session.set_field(CustomerField::Phone, "555-1111");
        session.set_field(CustomerField::DateOfBirth, "1990-01-01");
        session.set_field(CustomerField::IdNumber, "ID123");
        session.set_field(CustomerField::Address, "1 Main St");
        session
    }

    fn image(name: &str) -> ImageFile {
        ImageFile::new(name, b"jpeg-bytes".to_vec())
    }

    fn verify_identity(session: &mut WizardSession) {
        let round = session.begin_image(IDENTITY_SLOT, image("cin.jpg")).unwrap();
        session.record_upload(round.tag, "obj-42".to_string());
        session.finish_analysis(round.tag, Analysis::scored(Some(85.0), vec![]));

        let VerificationPlan::Remote(round) = session.begin_verification(IDENTITY_SLOT).unwrap()
        else {
            panic!("expected a remote verification round");
        };
        assert!(session.finish_verification(&round, VerificationOutcome::Verified));
    }

    #[test]
    fn test_advance_blocked_on_each_missing_field() {
        for field in CustomerField::REQUIRED {
            let mut session = filled_session();
            session.set_field(field, "");

            match session.advance() {
                Err(AppError::Validation(fields)) => {
                    assert_eq!(fields, vec![field.as_str().to_string()])
                }
                other => panic!("expected validation error for {}, got {:?}", field, other),
            }
            assert_eq!(session.step(), WizardStep::CustomerInformation);
        }
    }

    #[test]
    fn test_advance_from_identity_step_requires_verification() {
        let mut session = filled_session();
        session.advance().unwrap();

        assert!(matches!(
            session.advance(),
            Err(AppError::VerificationIncomplete(_))
        ));

        let round = session.begin_image(IDENTITY_SLOT, image("cin.jpg")).unwrap();
        session.record_upload(round.tag, "obj-42".to_string());
        session.finish_analysis(round.tag, Analysis::scored(Some(85.0), vec![]));
        assert!(session.advance().is_err());
        assert_eq!(session.step(), WizardStep::IdentityDocument);

        let VerificationPlan::Remote(round) = session.begin_verification(IDENTITY_SLOT).unwrap()
        else {
            panic!("expected a remote verification round");
        };
        assert_eq!(
            session.identity().verification_state(),
            VerificationState::Pending
        );
        assert!(session.advance().is_err());

        session.finish_verification(&round, VerificationOutcome::NotVerified);
        assert!(session.advance().is_err());

        verify_identity(&mut session);
        assert_eq!(session.advance().unwrap(), WizardStep::SupportingDocuments);
        assert!(matches!(session.advance(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_retreat_keeps_state() {
        let mut session = filled_session();
        session.advance().unwrap();
        verify_identity(&mut session);

        assert_eq!(session.retreat().unwrap(), WizardStep::CustomerInformation);
        assert!(session.retreat().is_err());
        assert_eq!(session.form().value(CustomerField::FullName), "Jane Doe");
        assert!(session.identity().is_verified());

        session.advance().unwrap();
        assert_eq!(session.advance().unwrap(), WizardStep::SupportingDocuments);
    }

    #[test]
    fn test_identity_verification_needs_customer_fields() {
        let mut session = WizardSession::new();
        let round = session.begin_image(IDENTITY_SLOT, image("cin.jpg")).unwrap();
        session.fail_analysis(round.tag, round.failure_message());

        let plan = session.begin_verification(IDENTITY_SLOT).unwrap();
        assert!(matches!(plan, VerificationPlan::RejectedLocally));
        assert_eq!(
            session.identity().verification_message(),
            Some(messages::IDENTITY_PREREQUISITES_MISSING)
        );
    }

    #[test]
    fn test_identity_without_stored_reference_rejected_locally() {
        let mut session = filled_session();
        let round = session.begin_image(IDENTITY_SLOT, image("cin.jpg")).unwrap();
        session.fail_analysis(round.tag, round.failure_message());

        let plan = session.begin_verification(IDENTITY_SLOT).unwrap();
        assert!(matches!(plan, VerificationPlan::RejectedLocally));
        assert_eq!(
            session.identity().verification_message(),
            Some(messages::IDENTITY_NOT_UPLOADED)
        );
        assert!(session.advance().is_ok());
        assert!(matches!(
            session.advance(),
            Err(AppError::VerificationIncomplete(_))
        ));
    }

    #[test]
    fn test_identity_request_fields() {
        let mut session = filled_session();
        let round = session.begin_image(IDENTITY_SLOT, image("cin.jpg")).unwrap();
        session.record_upload(round.tag, "obj-42".to_string());
        session.finish_analysis(round.tag, Analysis::default());

        let VerificationPlan::Remote(round) = session.begin_verification(IDENTITY_SLOT).unwrap()
        else {
            panic!("expected a remote verification round");
        };
        let VerificationRequest::IdentityAttributes(request) = round.request else {
            panic!("expected identity attributes request");
        };
        assert_eq!(request.full_name, "Jane Doe");
        assert_eq!(request.date_of_birth, "1990/01/01");
        assert_eq!(request.document_image_base64, STANDARD.encode(b"jpeg-bytes"));
        assert_eq!(request.kyc_status, KycStatus::Pending);
    }

    #[test]
    fn test_supporting_verification_gated_on_identity() {
        let mut session = filled_session();
        let id = session.add_supporting(ContentKind::Image);
        let round = session.begin_image(id, image("selfie.jpg")).unwrap();
        session.record_upload(round.tag, "obj-7".to_string());
        session.finish_analysis(round.tag, Analysis::scored(Some(60.0), vec![]));

        let plan = session.begin_verification(id).unwrap();
        assert!(matches!(plan, VerificationPlan::RejectedLocally));
        let slot = session.slot(id).unwrap();
        assert_eq!(slot.verification_state(), VerificationState::Rejected);
        assert_eq!(slot.verification_message(), Some(messages::VERIFY_IDENTITY_FIRST));
    }

    #[test]
    fn test_face_match_requires_uploaded_candidate() {
        let mut session = filled_session();
        verify_identity(&mut session);
        let id = session.add_supporting(ContentKind::Image);
        let round = session.begin_image(id, image("selfie.jpg")).unwrap();
        session.fail_analysis(round.tag, round.failure_message());

        assert!(matches!(
            session.begin_verification(id).unwrap(),
            VerificationPlan::RejectedLocally
        ));
        assert_eq!(
            session.slot(id).unwrap().verification_message(),
            Some(messages::SUPPORTING_IMAGE_MISSING)
        );
    }

    #[test]
    fn test_identity_change_invalidates_supporting_result() {
        let mut session = filled_session();
        verify_identity(&mut session);
        let id = session.add_supporting(ContentKind::Text);
        let round = session.begin_text(id, "Payslip for Jane Doe".to_string()).unwrap().unwrap();
        session.finish_analysis(round.tag, Analysis::scored(Some(90.0), vec![]));

        let VerificationPlan::Remote(round) = session.begin_verification(id).unwrap() else {
            panic!("expected a remote verification round");
        };
        assert_eq!(round.kind, VerificationKind::SupportingText);

        // Identity re-attached while the text check is in flight.
        session.begin_image(IDENTITY_SLOT, image("cin-new.jpg")).unwrap();

        assert!(session.finish_verification(&round, VerificationOutcome::Verified));
        let slot = session.slot(id).unwrap();
        assert_eq!(slot.verification_state(), VerificationState::Rejected);
        assert_eq!(slot.verification_message(), Some(messages::VERIFY_IDENTITY_FIRST));
    }

    #[test]
    fn test_removed_slot_result_is_discarded() {
        let mut session = filled_session();
        let id = session.add_supporting(ContentKind::Image);
        let round = session.begin_image(id, image("a.jpg")).unwrap();
        session.remove_supporting(id).unwrap();

        assert!(!session.record_upload(round.tag, "obj-a".to_string()));
        assert!(session.slot(id).is_none());
        assert!(session.remove_supporting(id).is_err());
        assert!(session.remove_supporting(IDENTITY_SLOT).is_err());

        // Ids are never reused.
        assert_ne!(session.add_supporting(ContentKind::Image), id);
    }

    #[test]
    fn test_reset_discards_in_flight_rounds() {
        let mut session = filled_session();
        let round = session.begin_image(IDENTITY_SLOT, image("cin.jpg")).unwrap();
        session.reset();

        assert!(!session.finish_analysis(round.tag, Analysis::scored(Some(99.0), vec![])));
        assert_eq!(session.identity().quality_score(), QualityScore::Unset);
        assert_eq!(session.form().value(CustomerField::FullName), "");
        assert_eq!(session.epoch(), 1);
    }

    #[test]
    fn test_submission_flags() {
        let mut session = filled_session();
        assert!(matches!(
            session.begin_submission(),
            Err(AppError::VerificationIncomplete(_))
        ));

        verify_identity(&mut session);
        session.begin_submission().unwrap();
        assert!(session.is_submitting());
        assert!(matches!(session.begin_submission(), Err(AppError::Busy(_))));

        let epoch = session.epoch();
        session.finish_submission(epoch, false);
        assert!(!session.is_submitting());
        assert!(session.identity().is_verified());

        session.begin_submission().unwrap();
        session.finish_submission(epoch, true);
        assert!(!session.identity().is_verified());
        assert_eq!(session.step(), WizardStep::CustomerInformation);
    }
}
