//! Operator-facing messages recorded on slots and returned by the wizard.

pub const VERIFY_IDENTITY_BEFORE_PROCEEDING: &str =
    "Please verify the identity document before proceeding.";
pub const IDENTITY_PREREQUISITES_MISSING: &str =
    "Please provide customer information (Full Name, ID Number, Date of Birth) and upload the identity document first.";
pub const IDENTITY_VERIFIED: &str = "Identity document verified successfully.";
pub const IDENTITY_MISMATCH: &str = "Identity verification failed. Mismatch or issues found.";
pub const IDENTITY_ERROR: &str = "An error occurred during identity verification.";
pub const IDENTITY_NOT_UPLOADED: &str =
    "The identity document was not uploaded. Please attach it again before verifying.";

pub const VERIFY_IDENTITY_FIRST: &str =
    "The identity document must be verified before verifying supporting documents.";
pub const IDENTITY_CHANGED: &str =
    "The identity document changed during verification. Please verify again.";

pub const IDENTITY_IMAGE_MISSING: &str = "Identity document not uploaded for comparison.";
pub const SUPPORTING_IMAGE_MISSING: &str =
    "Supporting image not uploaded for verification.";
pub const FACE_MATCH_VERIFIED: &str = "Face match successfully verified.";
pub const FACE_MATCH_FAILED: &str = "Face match failed. No match found or issues.";
pub const FACE_MATCH_ERROR: &str = "An error occurred during face match verification.";

pub const TEXT_PREREQUISITES_MISSING: &str = "Customer info or document content is missing.";
pub const TEXT_VERIFIED: &str = "Text document verified successfully.";
pub const TEXT_MISMATCH: &str = "Text verification failed. Mismatch or issues found.";
pub const TEXT_ERROR: &str = "An error occurred during text verification.";

pub const IDENTITY_IMAGE_UNPROCESSABLE: &str = "Could not process identity document image.";
pub const IMAGE_UNPROCESSABLE: &str = "Could not process image.";
pub const TEXT_UNPROCESSABLE: &str = "Could not process text.";

pub const SUBMISSION_FAILED: &str = "Failed to create customer and documents. Please try again.";
