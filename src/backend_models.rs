//! Wire types exchanged with the KYC backend.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{ContentKind, KycStatus};

/// Response of `POST /api/upload`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub file_url: String,
}

/// Response of `POST /api/image-analysis`.
///
/// The endpoint answers 200 with an `error` field when the analyzer itself fails.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAnalysisResponse {
    #[serde(default)]
    pub quality_score: Option<f64>,
    #[serde(default)]
    pub issues: Option<Vec<String>>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of `POST /api/text-analysis`.
#[derive(Debug, Clone, Serialize)]
pub struct TextAnalysisRequest<'a> {
    pub text: &'a str,
}

/// Response of `POST /api/text-analysis`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextAnalysisResponse {
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub issues: Option<Vec<String>>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of `POST /api/v1/verify-user`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyUserRequest {
    /// Throwaway id; the backend DTO requires one.
    pub id: String,
    pub full_name: String,
    pub id_number: String,
    /// `YYYY/MM/DD`
    pub date_of_birth: String,
    /// Base64 image bytes, or base64 UTF-8 text for text documents.
    pub document_image_base64: String,
    pub address: String,
    pub phone_number: String,
    pub kyc_status: KycStatus,
}

/// Response of `POST /api/v1/verify-user`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyUserResponse {
    #[serde(default)]
    pub kyc_status: Option<String>,
}

impl VerifyUserResponse {
    pub fn is_verified(&self) -> bool {
        self.kyc_status.as_deref() == Some("VERIFIED")
    }
}

/// Response of `POST /api/verify_face_match`.
#[derive(Debug, Clone, Deserialize)]
pub struct FaceMatchResponse {
    #[serde(default)]
    pub verified: Option<bool>,
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub error: Option<String>,
}

// ============ Combined creation ============

/// Body of `POST /api/customers-with-documents`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreationPayload {
    pub customer: CustomerPayload,
    pub documents: Vec<DocumentPayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPayload {
    pub full_name: String,
    pub phone: String,
    /// Date of birth as an ISO-8601 instant.
    pub dob: String,
    pub id_number: String,
    pub address: String,
    pub kyc_status: KycStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
    Identity,
    Supporting,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPayload {
    /// Stored object reference returned by the upload endpoint.
    pub file_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub quality_score: Option<f64>,
    pub issues: String,
    pub file_name: Option<String>,
    pub file_type: ContentKind,
    pub document_type: DocumentType,
}

/// What the caller gets back after a successful submission.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub documents_submitted: usize,
    /// Whatever the creation endpoint returned (created customer, ids...).
    pub created: Value,
}
