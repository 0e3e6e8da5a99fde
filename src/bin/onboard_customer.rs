//! Runs one customer onboarding end-to-end from a JSON manifest.
//!
//! ```text
//! onboard_customer manifest.json
//! ```
//!
//! The manifest names the customer fields, the identity document image and any
//! supporting documents (`{ "image": path }` or `{ "text": "..." }`). Relative
//! paths are resolved against the manifest's directory.

use kyc_onboarding::config::Config;
use kyc_onboarding::kyc_client::KycApiClient;
use kyc_onboarding::models::{
    ContentKind, CustomerPatch, ImageFile, SlotSnapshot, VerificationState, IDENTITY_SLOT,
};
use kyc_onboarding::onboarding::OnboardingWizard;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Manifest {
    customer: CustomerPatch,
    identity_document: PathBuf,
    #[serde(default)]
    supporting_documents: Vec<SupportingDocument>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SupportingDocument {
    Image { image: PathBuf },
    Text { text: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let manifest_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .ok_or_else(|| anyhow::anyhow!("usage: onboard_customer <manifest.json>"))?;
    let base_dir = manifest_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    let raw = tokio::fs::read_to_string(&manifest_path).await?;
    let manifest: Manifest = serde_json::from_str(&raw)
        .map_err(|e| anyhow::anyhow!("invalid manifest {}: {}", manifest_path.display(), e))?;

    let config = Config::from_env()?;
    let wizard = OnboardingWizard::new(KycApiClient::new(&config)?);

    wizard.update_customer(manifest.customer).await;
    wizard.advance().await?;

    let identity = read_image(&base_dir, &manifest.identity_document).await?;
    report("identity analysis", &wizard.attach_image(IDENTITY_SLOT, identity).await?);
    let identity = wizard.verify(IDENTITY_SLOT).await?;
    report("identity verification", &identity);
    wizard.advance().await?;

    for document in manifest.supporting_documents {
        let slot = match document {
            SupportingDocument::Image { image } => {
                let id = wizard.add_supporting_document(ContentKind::Image).await;
                let file = read_image(&base_dir, &image).await?;
                wizard.attach_image(id, file).await?;
                id
            }
            SupportingDocument::Text { text } => {
                let id = wizard.add_supporting_document(ContentKind::Text).await;
                wizard.attach_text(id, text).await?;
                id
            }
        };

        let outcome = wizard.verify(slot).await?;
        report("supporting verification", &outcome);
        if outcome.verification_state != VerificationState::Verified {
            tracing::warn!("Supporting document {} was not verified", slot);
        }
    }

    let receipt = wizard.submit().await?;
    println!(
        "Customer created with {} document(s): {}",
        receipt.documents_submitted, receipt.created
    );

    Ok(())
}

async fn read_image(base_dir: &Path, path: &Path) -> anyhow::Result<ImageFile> {
    let full_path = base_dir.join(path);
    let bytes = tokio::fs::read(&full_path)
        .await
        .map_err(|e| anyhow::anyhow!("cannot read {}: {}", full_path.display(), e))?;
    let file_name = full_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());

    Ok(ImageFile::new(file_name, bytes))
}

fn report(stage: &str, slot: &SlotSnapshot) {
    println!(
        "[document {}] {}: {:?} score={} issues={} {}",
        slot.id,
        stage,
        slot.verification_state,
        slot.quality_score.as_deref().unwrap_or("-"),
        if slot.detected_issues.is_empty() {
            "none".to_string()
        } else {
            slot.detected_issues.join(", ")
        },
        slot.verification_message.as_deref().unwrap_or("")
    );
}
