//! Image generation handler for the Gemini image MCP server.
//!
//! This module provides the `GenerateHandler` struct and parameter types for
//! generating images from text prompts and persisting them locally.

use std::path::PathBuf;
use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::Error;
use crate::gemini::ImageGenerator;
use crate::storage::ArtifactStore;

/// Image generation parameters.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct GenerateImageParams {
    /// Text prompt describing the image to generate.
    pub prompt: String,
}

/// Validation error details.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// The field that failed validation.
    pub field: String,
    /// Description of the validation failure.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl GenerateImageParams {
    /// Validate the parameters.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        // Validate prompt is not empty
        if self.prompt.trim().is_empty() {
            errors.push(ValidationError {
                field: "prompt".to_string(),
                message: "Prompt cannot be empty".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Result of a generate-image call.
///
/// An empty vendor result is a distinct outcome, not an error: the caller
/// gets an explanation instead of file paths.
#[derive(Debug)]
pub enum GenerateImageResult {
    /// Paths of the stored artifacts, one per generated image
    Saved(Vec<PathBuf>),
    /// The backend produced no image; `reason` carries its explanation
    Empty { reason: Option<String> },
}

/// Image generation handler.
///
/// Orchestrates one tool call: validate the prompt, ask the backend for
/// images, persist each one, and report the stored paths.
pub struct GenerateHandler {
    client: Arc<dyn ImageGenerator>,
    store: ArtifactStore,
}

impl GenerateHandler {
    /// Create a new handler over an image backend and an artifact store.
    pub fn new(client: Arc<dyn ImageGenerator>, store: ArtifactStore) -> Self {
        Self { client, store }
    }

    /// The store this handler writes artifacts through.
    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Generate images from a text prompt and save them locally.
    ///
    /// # Returns
    /// * `Ok(GenerateImageResult::Saved)` - Paths of the saved files
    /// * `Ok(GenerateImageResult::Empty)` - The backend returned no image
    /// * `Err(Error)` - If validation fails, the API call fails, or a file
    ///   write fails. Files written before a failing write are kept.
    #[instrument(level = "info", name = "generate_image", skip(self, params))]
    pub async fn generate_image(
        &self,
        params: GenerateImageParams,
    ) -> Result<GenerateImageResult, Error> {
        // Validate parameters before any network traffic
        params.validate().map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            Error::validation(messages.join("; "))
        })?;

        let output = self.client.generate(&params.prompt).await?;

        if output.images.is_empty() {
            info!("Backend returned no images");
            return Ok(GenerateImageResult::Empty {
                reason: output.feedback,
            });
        }

        let mut paths = Vec::with_capacity(output.images.len());
        for image in &output.images {
            let path = self.store.save(&image.bytes, &image.mime_type).await?;
            paths.push(path);
        }

        info!(count = paths.len(), "Stored generated images");
        Ok(GenerateImageResult::Saved(paths))
    }
}
