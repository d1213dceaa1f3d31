//! Run requests and the validated run they turn into

use crate::adapters::redaction::RedactionEngineKind;
use crate::config::ObscuraConfig;
use crate::core::reorganize::ReorganizeOrder;
use crate::domain::{derive_provider_id, ObscuraError, ProviderId, Result, SecretKey, SiteId};
use secrecy::ExposeSecret;
use std::path::PathBuf;

/// Caller-supplied options of one run, before validation
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub site_id: String,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub threads: usize,

    /// Key to reuse; a fresh one is generated when `None`
    pub secret: Option<String>,

    /// Redact with Tesseract
    pub ocr: bool,

    /// Redact with PaddleOCR
    pub paddle_ocr: bool,

    pub metadata_anonymize: bool,
    pub hierarchical: bool,
    pub clinical_hash: bool,
    pub reorganize_order: ReorganizeOrder,
    pub scratch_dir: Option<PathBuf>,
}

impl RunRequest {
    /// Seeds a request from configuration
    pub fn from_config(site_id: impl Into<String>, config: &ObscuraConfig) -> Self {
        let pipeline = &config.pipeline;
        Self {
            site_id: site_id.into(),
            input_dir: pipeline.input_dir.clone(),
            output_dir: pipeline.output_dir.clone(),
            threads: pipeline.threads,
            secret: pipeline
                .secret_key
                .as_ref()
                .map(|k| k.expose_secret().as_ref().to_string()),
            ocr: config.redaction.engine == Some(RedactionEngineKind::Tesseract),
            paddle_ocr: config.redaction.engine == Some(RedactionEngineKind::Paddle),
            metadata_anonymize: pipeline.metadata_anonymize,
            hierarchical: pipeline.hierarchical,
            clinical_hash: pipeline.clinical_hash,
            reorganize_order: pipeline.reorganize_order,
            scratch_dir: pipeline.scratch_dir.clone(),
        }
    }
}

/// A validated run: everything the orchestrator needs, including the one
/// [`SecretKey`] every stage shares
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub site_id: SiteId,
    pub provider_id: ProviderId,
    pub secret_key: SecretKey,
    pub threads: usize,
    pub redaction: Option<RedactionEngineKind>,
    pub metadata_anonymize: bool,
    pub hierarchical: bool,
    pub clinical_hash: bool,
    pub reorganize_order: ReorganizeOrder,
    pub scratch_dir: Option<PathBuf>,
}

impl PipelineRun {
    /// Validates `request` and fixes the run's key material
    ///
    /// Nothing is touched on disk and no process is started.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if both redaction engines are
    /// requested, the site identifier is empty, the thread count is zero, or
    /// a supplied secret key is invalid.
    pub fn from_request(request: RunRequest) -> Result<Self> {
        let redaction = match (request.ocr, request.paddle_ocr) {
            (true, true) => {
                return Err(ObscuraError::Configuration(
                    "Cannot use both PaddleOCR and Tesseract OCR: choose one redaction engine"
                        .to_string(),
                ))
            }
            (true, false) => Some(RedactionEngineKind::Tesseract),
            (false, true) => Some(RedactionEngineKind::Paddle),
            (false, false) => None,
        };

        let site_id = SiteId::new(request.site_id).map_err(ObscuraError::Configuration)?;

        if request.threads == 0 {
            return Err(ObscuraError::Configuration(
                "Thread count must be at least 1".to_string(),
            ));
        }

        let secret_key = match request.secret.as_deref() {
            Some(candidate) => SecretKey::parse(candidate)?,
            None => SecretKey::generate(),
        };

        Ok(Self {
            input_dir: request.input_dir,
            output_dir: request.output_dir,
            provider_id: derive_provider_id(&site_id),
            site_id,
            secret_key,
            threads: request.threads,
            redaction,
            metadata_anonymize: request.metadata_anonymize,
            hierarchical: request.hierarchical,
            clinical_hash: request.clinical_hash,
            reorganize_order: request.reorganize_order,
            scratch_dir: request.scratch_dir,
        })
    }

    /// Whether the anonymized output gets the Patient/Study/Series layout
    pub fn reorganizes(&self) -> bool {
        self.metadata_anonymize && self.hierarchical
    }
}
