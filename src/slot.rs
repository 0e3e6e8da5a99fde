//! Document slot state machine.
//!
//! A slot moves `Unfilled -> Analyzing -> Analyzed -> Verifying -> Verified | Rejected`.
//! Re-attaching content from any settled phase starts over at `Analyzing`.
//!
//! Every asynchronous round (upload + analysis, or verification) is started by a
//! `begin_*` call that bumps the slot generation and returns it. The matching
//! `finish_*` call applies the result only if the generation still matches and the
//! slot is still in the phase the round started; otherwise the result is stale
//! and dropped.

use crate::errors::AppError;
use crate::models::{
    Analysis, ContentKind, DocumentKind, ImageFile, QualityScore, SlotContent, SlotId,
    SlotSnapshot, VerificationState, IDENTITY_SLOT,
};

#[derive(Debug, Clone, PartialEq)]
pub enum SlotPhase {
    Unfilled,
    Analyzing,
    Analyzed(Analysis),
    Verifying(Analysis),
    Verified { analysis: Analysis, message: String },
    Rejected { analysis: Analysis, message: String },
}

impl SlotPhase {
    pub fn name(&self) -> &'static str {
        match self {
            SlotPhase::Unfilled => "UNFILLED",
            SlotPhase::Analyzing => "ANALYZING",
            SlotPhase::Analyzed(_) => "ANALYZED",
            SlotPhase::Verifying(_) => "VERIFYING",
            SlotPhase::Verified { .. } => "VERIFIED",
            SlotPhase::Rejected { .. } => "REJECTED",
        }
    }

    pub fn analysis(&self) -> Option<&Analysis> {
        match self {
            SlotPhase::Unfilled | SlotPhase::Analyzing => None,
            SlotPhase::Analyzed(analysis) | SlotPhase::Verifying(analysis) => Some(analysis),
            SlotPhase::Verified { analysis, .. } | SlotPhase::Rejected { analysis, .. } => {
                Some(analysis)
            }
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, SlotPhase::Analyzing | SlotPhase::Verifying(_))
    }
}

#[derive(Debug, Clone)]
pub struct DocumentSlot {
    id: SlotId,
    document_kind: DocumentKind,
    content_kind: ContentKind,
    content: SlotContent,
    stored_reference: Option<String>,
    phase: SlotPhase,
    generation: u64,
}

impl DocumentSlot {
    /// The mandatory identity document slot. Always holds an image.
    pub fn identity() -> Self {
        Self::new(IDENTITY_SLOT, DocumentKind::Identity, ContentKind::Image)
    }

    pub fn supporting(id: SlotId, content_kind: ContentKind) -> Self {
        Self::new(id, DocumentKind::Supporting, content_kind)
    }

    fn new(id: SlotId, document_kind: DocumentKind, content_kind: ContentKind) -> Self {
        Self {
            id,
            document_kind,
            content_kind,
            content: SlotContent::Empty,
            stored_reference: None,
            phase: SlotPhase::Unfilled,
            generation: 0,
        }
    }

    pub fn id(&self) -> SlotId {
        self.id
    }

    pub fn document_kind(&self) -> DocumentKind {
        self.document_kind
    }

    pub fn content_kind(&self) -> ContentKind {
        self.content_kind
    }

    pub fn content(&self) -> &SlotContent {
        &self.content
    }

    pub fn stored_reference(&self) -> Option<&str> {
        self.stored_reference.as_deref()
    }

    pub fn phase(&self) -> &SlotPhase {
        &self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_busy(&self) -> bool {
        self.phase.is_busy()
    }

    pub fn verification_state(&self) -> VerificationState {
        match self.phase {
            SlotPhase::Unfilled | SlotPhase::Analyzing | SlotPhase::Analyzed(_) => {
                VerificationState::NotApplicable
            }
            SlotPhase::Verifying(_) => VerificationState::Pending,
            SlotPhase::Verified { .. } => VerificationState::Verified,
            SlotPhase::Rejected { .. } => VerificationState::Rejected,
        }
    }

    pub fn is_verified(&self) -> bool {
        self.verification_state() == VerificationState::Verified
    }

    pub fn quality_score(&self) -> QualityScore {
        match &self.phase {
            SlotPhase::Analyzing => QualityScore::Analyzing,
            phase => phase.analysis().map(|a| a.score).unwrap_or_default(),
        }
    }

    pub fn detected_issues(&self) -> &[String] {
        self.phase
            .analysis()
            .map(|a| a.issues.as_slice())
            .unwrap_or(&[])
    }

    pub fn verification_message(&self) -> Option<&str> {
        match &self.phase {
            SlotPhase::Verified { message, .. } | SlotPhase::Rejected { message, .. } => {
                Some(message)
            }
            _ => None,
        }
    }

    pub fn file_name(&self) -> Option<String> {
        match &self.content {
            SlotContent::Empty => None,
            SlotContent::Image(file) => Some(file.file_name.clone()),
            SlotContent::Text(_) => Some(format!("Text Document {}", self.id)),
        }
    }

    /// True when the slot holds something worth submitting.
    pub fn has_submittable_content(&self) -> bool {
        self.stored_reference.is_some() || self.content.has_text()
    }

    pub fn snapshot(&self) -> SlotSnapshot {
        SlotSnapshot {
            id: self.id,
            document_kind: self.document_kind,
            content_kind: self.content_kind,
            phase: self.phase.name(),
            file_name: self.file_name(),
            stored_reference: self.stored_reference.clone(),
            content: self.content.text().map(str::to_string),
            quality_score: self.quality_score().label(),
            detected_issues: self.detected_issues().to_vec(),
            verification_state: self.verification_state(),
            verification_message: self.verification_message().map(str::to_string),
        }
    }

    pub fn ensure_idle(&self) -> Result<(), AppError> {
        if self.is_busy() {
            return Err(AppError::Busy(format!(
                "document {} is still {}",
                self.id,
                self.phase.name().to_lowercase()
            )));
        }
        Ok(())
    }

    fn current_analysis(&self) -> Analysis {
        self.phase.analysis().cloned().unwrap_or_default()
    }

    fn is_current(&self, generation: u64, round: &str) -> bool {
        if generation != self.generation {
            tracing::debug!(
                "Discarding stale {} result for document {} (generation {}, current {})",
                round,
                self.id,
                generation,
                self.generation
            );
            return false;
        }
        true
    }

    // ---- attachment round ----

    /// Starts a new image attachment: resets verification, analysis and stored reference.
    pub fn begin_image(&mut self, file: ImageFile) -> Result<u64, AppError> {
        self.ensure_idle()?;
        if self.content_kind != ContentKind::Image {
            return Err(AppError::BadRequest(format!(
                "document {} holds text; switch its content kind to IMAGE first",
                self.id
            )));
        }

        self.content = SlotContent::Image(file);
        self.stored_reference = None;
        self.phase = SlotPhase::Analyzing;
        self.generation += 1;
        Ok(self.generation)
    }

    /// Starts a new text attachment.
    ///
    /// Returns `None` when the text is blank: the slot goes back to `Unfilled` and
    /// no analysis is needed.
    pub fn begin_text(&mut self, text: String) -> Result<Option<u64>, AppError> {
        self.ensure_idle()?;
        if self.content_kind != ContentKind::Text {
            return Err(AppError::BadRequest(format!(
                "document {} holds an image; switch its content kind to TEXT first",
                self.id
            )));
        }

        let blank = text.trim().is_empty();
        self.content = SlotContent::Text(text);
        self.stored_reference = None;
        self.generation += 1;

        if blank {
            self.phase = SlotPhase::Unfilled;
            Ok(None)
        } else {
            self.phase = SlotPhase::Analyzing;
            Ok(Some(self.generation))
        }
    }

    pub fn record_upload(&mut self, generation: u64, reference: String) -> bool {
        if !self.is_current(generation, "upload") || self.phase != SlotPhase::Analyzing {
            return false;
        }
        self.stored_reference = Some(reference);
        true
    }

    pub fn finish_analysis(&mut self, generation: u64, analysis: Analysis) -> bool {
        if !self.is_current(generation, "analysis") || self.phase != SlotPhase::Analyzing {
            return false;
        }
        self.phase = SlotPhase::Analyzed(analysis);
        true
    }

    /// Marks the attachment round as failed and forgets any stored reference.
    pub fn fail_analysis(&mut self, generation: u64, message: impl Into<String>) -> bool {
        if !self.is_current(generation, "analysis") || self.phase != SlotPhase::Analyzing {
            return false;
        }
        self.stored_reference = None;
        self.phase = SlotPhase::Analyzed(Analysis::failed(message));
        true
    }

    /// Switches between image and text content, clearing everything the slot held.
    ///
    /// Allowed while a round is in flight; the round's result becomes stale.
    pub fn set_content_kind(&mut self, kind: ContentKind) -> Result<bool, AppError> {
        if self.document_kind == DocumentKind::Identity && kind != ContentKind::Image {
            return Err(AppError::BadRequest(
                "the identity document must be an image".to_string(),
            ));
        }
        if kind == self.content_kind {
            return Ok(false);
        }

        self.content_kind = kind;
        self.content = SlotContent::Empty;
        self.stored_reference = None;
        self.phase = SlotPhase::Unfilled;
        self.generation += 1;
        Ok(true)
    }

    // ---- verification round ----

    pub fn begin_verification(&mut self) -> Result<u64, AppError> {
        self.ensure_idle()?;
        self.phase = SlotPhase::Verifying(self.current_analysis());
        self.generation += 1;
        Ok(self.generation)
    }

    /// Rejects the slot without any remote call (missing prerequisites).
    pub fn reject(&mut self, message: impl Into<String>) -> Result<(), AppError> {
        self.ensure_idle()?;
        self.phase = SlotPhase::Rejected {
            analysis: self.current_analysis(),
            message: message.into(),
        };
        Ok(())
    }

    pub fn finish_verification(
        &mut self,
        generation: u64,
        verified: bool,
        message: impl Into<String>,
    ) -> bool {
        if !self.is_current(generation, "verification") {
            return false;
        }
        let SlotPhase::Verifying(analysis) = &self.phase else {
            return false;
        };

        let analysis = analysis.clone();
        let message = message.into();
        self.phase = if verified {
            SlotPhase::Verified { analysis, message }
        } else {
            SlotPhase::Rejected { analysis, message }
        };
        true
    }
}
