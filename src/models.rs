use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============ Customer ============

/// Customer fields collected on the first wizard step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CustomerField {
    FullName,
    Phone,
    DateOfBirth,
    IdNumber,
    Address,
}

impl CustomerField {
    /// Fields that must be filled before leaving the first step.
    pub const REQUIRED: [CustomerField; 5] = [
        CustomerField::FullName,
        CustomerField::Phone,
        CustomerField::DateOfBirth,
        CustomerField::IdNumber,
        CustomerField::Address,
    ];

    /// Wire name of the field (camelCase).
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerField::FullName => "fullName",
            CustomerField::Phone => "phone",
            CustomerField::DateOfBirth => "dateOfBirth",
            CustomerField::IdNumber => "idNumber",
            CustomerField::Address => "address",
        }
    }

    /// Human label used in validation messages.
    pub fn label(&self) -> &'static str {
        match self {
            CustomerField::FullName => "Full Name",
            CustomerField::Phone => "Phone",
            CustomerField::DateOfBirth => "Date of Birth",
            CustomerField::IdNumber => "ID Number",
            CustomerField::Address => "Address",
        }
    }
}

impl fmt::Display for CustomerField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// KYC status carried by the customer record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KycStatus {
    #[default]
    Pending,
    Verified,
    Rejected,
}

/// Customer identity being entered in the wizard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDraft {
    pub full_name: String,
    pub phone: String,
    pub date_of_birth: String,
    pub id_number: String,
    pub address: String,
    #[serde(default)]
    pub kyc_status: KycStatus,
}

impl CustomerDraft {
    pub fn get(&self, field: CustomerField) -> &str {
        match field {
            CustomerField::FullName => &self.full_name,
            CustomerField::Phone => &self.phone,
            CustomerField::DateOfBirth => &self.date_of_birth,
            CustomerField::IdNumber => &self.id_number,
            CustomerField::Address => &self.address,
        }
    }

    pub fn set(&mut self, field: CustomerField, value: impl Into<String>) {
        let value = value.into();
        match field {
            CustomerField::FullName => self.full_name = value,
            CustomerField::Phone => self.phone = value,
            CustomerField::DateOfBirth => self.date_of_birth = value,
            CustomerField::IdNumber => self.id_number = value,
            CustomerField::Address => self.address = value,
        }
    }

    /// Parses the date of birth.
    ///
    /// Accepts `YYYY-MM-DD`, `YYYY/MM/DD` and RFC 3339 timestamps (the date part is kept).
    pub fn birth_date(&self) -> Option<NaiveDate> {
        parse_birth_date(&self.date_of_birth)
    }

    /// True when the fields sent for identity verification are all present.
    pub fn has_identity_fields(&self) -> bool {
        !self.full_name.trim().is_empty()
            && !self.id_number.trim().is_empty()
            && !self.date_of_birth.trim().is_empty()
    }
}

pub fn parse_birth_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y/%m/%d"))
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

/// Partial customer update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPatch {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<String>,
    pub id_number: Option<String>,
    pub address: Option<String>,
}

impl CustomerPatch {
    /// The fields present in the patch, in declaration order.
    pub fn into_fields(self) -> Vec<(CustomerField, String)> {
        [
            (CustomerField::FullName, self.full_name),
            (CustomerField::Phone, self.phone),
            (CustomerField::DateOfBirth, self.date_of_birth),
            (CustomerField::IdNumber, self.id_number),
            (CustomerField::Address, self.address),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| (field, v)))
        .collect()
    }
}

// ============ Documents ============

/// Stable slot identifier within one wizard session.
pub type SlotId = u32;

/// Slot id of the mandatory identity document.
pub const IDENTITY_SLOT: SlotId = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentKind {
    Identity,
    Supporting,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentKind {
    #[default]
    Image,
    Text,
}

/// An uploaded image kept in memory for analysis and verification calls.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

impl fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Raw content attached to a slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SlotContent {
    #[default]
    Empty,
    Image(ImageFile),
    Text(String),
}

impl SlotContent {
    pub fn image(&self) -> Option<&ImageFile> {
        match self {
            SlotContent::Image(file) => Some(file),
            _ => None,
        }
    }

    /// Text content, if any was typed (may be blank).
    pub fn text(&self) -> Option<&str> {
        match self {
            SlotContent::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn has_text(&self) -> bool {
        self.text().is_some_and(|t| !t.trim().is_empty())
    }
}

/// Quality score reported by the analysis endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum QualityScore {
    #[default]
    Unset,
    Analyzing,
    Score(f64),
    Error,
}

impl QualityScore {
    pub fn value(&self) -> Option<f64> {
        match self {
            QualityScore::Score(score) => Some(*score),
            _ => None,
        }
    }

    /// Display form shown to operators; `None` when unset.
    pub fn label(&self) -> Option<String> {
        match self {
            QualityScore::Unset => None,
            QualityScore::Analyzing => Some("Analyzing...".to_string()),
            QualityScore::Score(score) => Some(score.to_string()),
            QualityScore::Error => Some("Error".to_string()),
        }
    }
}

/// Result of an upload/analysis round for one slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Analysis {
    pub score: QualityScore,
    pub issues: Vec<String>,
}

impl Analysis {
    pub fn scored(score: Option<f64>, issues: Vec<String>) -> Self {
        Self {
            score: score.map(QualityScore::Score).unwrap_or_default(),
            issues,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            score: QualityScore::Error,
            issues: vec![message.into()],
        }
    }

    /// Issues joined for the backend's single issues column.
    pub fn issues_summary(&self) -> String {
        if self.issues.is_empty() {
            "No issues found.".to_string()
        } else {
            self.issues.join(", ")
        }
    }
}

/// Flattened verification status of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationState {
    NotApplicable,
    Pending,
    Verified,
    Rejected,
}

// ============ Wizard ============

/// The three wizard steps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WizardStep {
    #[default]
    CustomerInformation,
    IdentityDocument,
    SupportingDocuments,
}

impl WizardStep {
    pub fn index(&self) -> u8 {
        match self {
            WizardStep::CustomerInformation => 0,
            WizardStep::IdentityDocument => 1,
            WizardStep::SupportingDocuments => 2,
        }
    }

    pub fn next(&self) -> Option<WizardStep> {
        match self {
            WizardStep::CustomerInformation => Some(WizardStep::IdentityDocument),
            WizardStep::IdentityDocument => Some(WizardStep::SupportingDocuments),
            WizardStep::SupportingDocuments => None,
        }
    }

    pub fn previous(&self) -> Option<WizardStep> {
        match self {
            WizardStep::CustomerInformation => None,
            WizardStep::IdentityDocument => Some(WizardStep::CustomerInformation),
            WizardStep::SupportingDocuments => Some(WizardStep::IdentityDocument),
        }
    }
}

// ============ Snapshots ============

/// Read-only view of a slot, as returned to operators.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotSnapshot {
    pub id: SlotId,
    pub document_kind: DocumentKind,
    pub content_kind: ContentKind,
    pub phase: &'static str,
    pub file_name: Option<String>,
    pub stored_reference: Option<String>,
    pub content: Option<String>,
    pub quality_score: Option<String>,
    pub detected_issues: Vec<String>,
    pub verification_state: VerificationState,
    pub verification_message: Option<String>,
}

/// Read-only view of a whole wizard session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub current_step: u8,
    pub step: WizardStep,
    pub customer: CustomerDraft,
    pub field_errors: Vec<FieldError>,
    pub identity_document: SlotSnapshot,
    pub supporting_documents: Vec<SlotSnapshot>,
    pub submitting: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub field: CustomerField,
    pub message: String,
}
