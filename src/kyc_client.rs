use crate::backend_models::{
    CreationPayload, FaceMatchResponse, ImageAnalysisResponse, TextAnalysisRequest,
    TextAnalysisResponse, UploadResponse, VerifyUserRequest, VerifyUserResponse,
};
use crate::circuit_breaker::{create_backend_circuit_breaker, BackendCircuitBreaker};
use crate::config::Config;
use crate::errors::{AppError, ResultExt};
use crate::models::{Analysis, ImageFile};
use failsafe::futures::CircuitBreaker as _;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;

/// Client for the KYC backend: object upload, quality analysis, identity and
/// face-match verification, and the combined customer creation call.
///
/// Every call goes through a shared circuit breaker. Clones share the
/// connection pool and the breaker state.
#[derive(Clone)]
pub struct KycApiClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    breaker: BackendCircuitBreaker,
}

impl KycApiClient {
    /// Creates a new `KycApiClient`.
    ///
    /// No request timeout is set unless `KYC_HTTP_TIMEOUT_SECS` is configured.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.http_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(|e| {
            AppError::InternalError(format!("Failed to create KYC API client: {}", e))
        })?;

        Ok(Self {
            client,
            base_url: config.kyc_api_base_url.trim_end_matches('/').to_string(),
            token: config.kyc_api_token.clone(),
            breaker: create_backend_circuit_breaker(),
        })
    }

    /// Stores a file and returns its object reference.
    pub async fn upload_object(&self, file: &ImageFile) -> Result<String, AppError> {
        tracing::info!("Uploading {} ({} bytes)", file.file_name, file.bytes.len());

        self.guarded("upload", async {
            let form = Form::new().part("file", file_part(file)?);
            let response = self
                .post("/api/upload")
                .multipart(form)
                .send()
                .await
                .context("Upload request failed")?;
            let uploaded: UploadResponse = read_json(response, "upload").await?;

            tracing::debug!("Stored {} as {}", file.file_name, uploaded.file_url);
            Ok::<_, AppError>(uploaded.file_url)
        })
        .await
    }

    /// Scores image quality. An `error` body is a failed call.
    pub async fn analyze_image(&self, file: &ImageFile) -> Result<Analysis, AppError> {
        self.guarded("image analysis", async {
            let form = Form::new().part("file", file_part(file)?);
            let response = self
                .post("/api/image-analysis")
                .multipart(form)
                .send()
                .await
                .context("Image analysis request failed")?;
            let analysis: ImageAnalysisResponse = read_json(response, "image analysis").await?;

            if let Some(error) = analysis.error {
                return Err(AppError::ExternalApiError(format!(
                    "Image analysis failed: {}",
                    error
                )));
            }
            Ok::<_, AppError>(Analysis::scored(
                analysis.quality_score,
                analysis.issues.unwrap_or_default(),
            ))
        })
        .await
    }

    pub async fn analyze_text(&self, text: &str) -> Result<Analysis, AppError> {
        self.guarded("text analysis", async {
            let response = self
                .post("/api/text-analysis")
                .json(&TextAnalysisRequest { text })
                .send()
                .await
                .context("Text analysis request failed")?;
            let analysis: TextAnalysisResponse = read_json(response, "text analysis").await?;

            if let Some(error) = analysis.error {
                return Err(AppError::ExternalApiError(format!(
                    "Text analysis failed: {}",
                    error
                )));
            }
            Ok::<_, AppError>(Analysis::scored(
                analysis.score,
                analysis.issues.unwrap_or_default(),
            ))
        })
        .await
    }

    /// Checks customer identity attributes against a document.
    ///
    /// Returns `true` only for a `VERIFIED` status; any other status is a
    /// successful call with a negative answer.
    pub async fn verify_identity(&self, request: &VerifyUserRequest) -> Result<bool, AppError> {
        tracing::info!("Verifying identity attributes for request {}", request.id);

        self.guarded("identity verification", async {
            let response = self
                .post("/api/v1/verify-user")
                .json(request)
                .send()
                .await
                .context("Identity verification request failed")?;
            let verdict: VerifyUserResponse = read_json(response, "identity verification").await?;

            tracing::info!(
                "Identity verification for {} returned {}",
                request.id,
                verdict.kyc_status.as_deref().unwrap_or("no status")
            );
            Ok::<_, AppError>(verdict.is_verified())
        })
        .await
    }

    /// Compares the face on `reference` with the one on `candidate`.
    pub async fn verify_face_match(
        &self,
        reference: &ImageFile,
        candidate: &ImageFile,
    ) -> Result<bool, AppError> {
        tracing::info!(
            "Face match {} against {}",
            candidate.file_name,
            reference.file_name
        );

        self.guarded("face match", async {
            let form = Form::new()
                .part("img1", file_part(reference)?)
                .part("img2", file_part(candidate)?);
            let response = self
                .post("/api/verify_face_match")
                .multipart(form)
                .send()
                .await
                .context("Face match request failed")?;
            let body = read_text(response, "face match").await?;
            let verdict = parse_face_match(&body)?;

            if let Some(error) = verdict.error {
                return Err(AppError::ExternalApiError(format!(
                    "Face match failed: {}",
                    error
                )));
            }
            if let Some(distance) = verdict.distance {
                tracing::debug!("Face match distance {}", distance);
            }
            Ok::<_, AppError>(verdict.verified.unwrap_or(false))
        })
        .await
    }

    /// Creates the customer and all of its documents in one call.
    pub async fn create_customer_with_documents(
        &self,
        payload: &CreationPayload,
    ) -> Result<serde_json::Value, AppError> {
        tracing::info!(
            "Creating customer {} with {} document(s)",
            payload.customer.full_name,
            payload.documents.len()
        );

        self.guarded("customer creation", async {
            let response = self
                .post("/api/customers-with-documents")
                .json(payload)
                .send()
                .await
                .context("Customer creation request failed")?;
            let created: serde_json::Value = read_json(response, "customer creation").await?;

            tracing::info!("✓ Customer {} created", payload.customer.full_name);
            Ok::<_, AppError>(created)
        })
        .await
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        let request = self.client.post(format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Runs `call` through the circuit breaker.
    async fn guarded<T, F>(&self, operation: &str, call: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        match self.breaker.call_with(is_backend_failure, call).await {
            Ok(value) => Ok(value),
            Err(failsafe::Error::Inner(e)) => Err(e),
            Err(failsafe::Error::Rejected) => {
                tracing::warn!("KYC backend circuit open, skipping {}", operation);
                Err(AppError::ExternalApiError(format!(
                    "KYC backend unavailable, {} not attempted",
                    operation
                )))
            }
        }
    }
}

/// Breaker policy: only transport and server failures count.
fn is_backend_failure(err: &AppError) -> bool {
    matches!(err.root(), AppError::ExternalApiError(_))
}

fn file_part(file: &ImageFile) -> Result<Part, AppError> {
    let part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
    match &file.content_type {
        Some(content_type) => part.mime_str(content_type).map_err(|e| {
            AppError::BadRequest(format!(
                "Invalid content type {} for {}: {}",
                content_type, file.file_name, e
            ))
        }),
        None => Ok(part),
    }
}

async fn read_text(response: reqwest::Response, what: &str) -> Result<String, AppError> {
    let status = response.status();
    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(AppError::ExternalApiError(format!(
            "KYC {} returned {}: {}",
            what, status, error_text
        )));
    }

    response
        .text()
        .await
        .with_context(|| format!("Failed to read KYC {} response", what))
}

async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
    what: &str,
) -> Result<T, AppError> {
    let body = read_text(response, what).await?;
    serde_json::from_str(&body).map_err(|e| {
        AppError::ExternalApiError(format!("Failed to parse KYC {} response: {}", what, e))
    })
}

/// The face-match service sometimes answers with its JSON wrapped in a JSON string.
fn parse_face_match(body: &str) -> Result<FaceMatchResponse, AppError> {
    let parse_error = |e: serde_json::Error| {
        AppError::ExternalApiError(format!("Failed to parse face match response: {}", e))
    };

    match serde_json::from_str::<serde_json::Value>(body).map_err(parse_error)? {
        serde_json::Value::String(inner) => serde_json::from_str(&inner).map_err(parse_error),
        value => serde_json::from_value(value).map_err(parse_error),
    }
}
