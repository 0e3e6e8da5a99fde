//! Assembly of the combined customer + documents creation payload.

use chrono::{NaiveTime, TimeZone, Utc};

use crate::backend_models::{CreationPayload, CustomerPayload, DocumentPayload, DocumentType};
use crate::errors::AppError;
use crate::messages;
use crate::models::{CustomerDraft, CustomerField};
use crate::slot::DocumentSlot;
use crate::wizard::WizardSession;

/// Builds the creation payload from the session.
///
/// The identity document must be verified. Every document, identity included,
/// is sent only when it carries a stored reference or text.
pub fn build_payload(session: &WizardSession) -> Result<CreationPayload, AppError> {
    if !session.identity().is_verified() {
        return Err(AppError::VerificationIncomplete(
            messages::VERIFY_IDENTITY_BEFORE_PROCEEDING.to_string(),
        ));
    }

    let customer = customer_payload(session.form().draft())?;

    let documents = std::iter::once((session.identity(), DocumentType::Identity))
        .chain(
            session
                .supporting()
                .iter()
                .map(|slot| (slot, DocumentType::Supporting)),
        )
        .filter(|(slot, _)| slot.has_submittable_content())
        .map(|(slot, document_type)| document_payload(slot, document_type))
        .collect();

    Ok(CreationPayload {
        customer,
        documents,
    })
}

fn customer_payload(draft: &CustomerDraft) -> Result<CustomerPayload, AppError> {
    let birth_date = draft.birth_date().ok_or_else(|| {
        AppError::Validation(vec![CustomerField::DateOfBirth.as_str().to_string()])
    })?;
    let dob = Utc
        .from_utc_datetime(&birth_date.and_time(NaiveTime::MIN))
        .to_rfc3339_opts(chrono::SecondsFormat::Secs, true);

    Ok(CustomerPayload {
        full_name: draft.full_name.trim().to_string(),
        phone: draft.phone.trim().to_string(),
        dob,
        id_number: draft.id_number.trim().to_string(),
        address: draft.address.trim().to_string(),
        kyc_status: draft.kyc_status,
    })
}

fn document_payload(slot: &DocumentSlot, document_type: DocumentType) -> DocumentPayload {
    let analysis = slot.phase().analysis().cloned().unwrap_or_default();

    DocumentPayload {
        file_url: slot.stored_reference().map(str::to_string),
        content: slot
            .content()
            .text()
            .filter(|t| !t.trim().is_empty())
            .map(str::to_string),
        quality_score: analysis.score.value(),
        issues: analysis.issues_summary(),
        file_name: slot.file_name(),
        file_type: slot.content_kind(),
        document_type,
    }
}
