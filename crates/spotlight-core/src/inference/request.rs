//! Request types for image-understanding calls.

use crate::error::InputError;
use base64::Engine;

/// Base64-encoded JPEG ready to send to an image-understanding API.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageInput {
    /// Base64-encoded image bytes, no whitespace
    pub data: String,
    /// MIME type sent in the data URL
    pub media_type: String,
}

impl ImageInput {
    /// Encode raw JPEG bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            media_type: "image/jpeg".to_string(),
        }
    }

    /// Accept an already-encoded JPEG.
    ///
    /// Whitespace (line wrapping from other encoders) is stripped and the
    /// remainder must decode as standard base64.
    pub fn from_base64(data: &str) -> Result<Self, InputError> {
        let clean: String = data.split_whitespace().collect();
        base64::engine::general_purpose::STANDARD
            .decode(&clean)
            .map_err(|e| InputError::InvalidPayload(e.to_string()))?;
        Ok(Self {
            data: clean,
            media_type: "image/jpeg".to_string(),
        })
    }

    /// Return a data URL suitable for OpenAI-style APIs.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

/// One image-understanding request, built per call and dropped afterwards.
///
/// The fallback list never contains the primary model and never repeats an
/// id, so `candidates()` is always duplicate-free.
#[derive(Debug, Clone)]
pub struct InferenceRequest {
    image: ImageInput,
    prompt: String,
    primary_model: String,
    fallback_models: Vec<String>,
}

impl InferenceRequest {
    pub fn new(
        image: ImageInput,
        prompt: impl Into<String>,
        primary_model: impl Into<String>,
        fallback_models: &[String],
    ) -> Result<Self, InputError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(InputError::EmptyPrompt);
        }
        let primary_model = primary_model.into();
        if primary_model.trim().is_empty() {
            return Err(InputError::MissingConfig {
                setting: "Image model id",
                env_var: "GEMINI_MODEL_ID",
            });
        }

        let mut deduped: Vec<String> = Vec::with_capacity(fallback_models.len());
        for model in fallback_models {
            if *model != primary_model && !deduped.contains(model) {
                deduped.push(model.clone());
            }
        }

        Ok(Self {
            image,
            prompt,
            primary_model,
            fallback_models: deduped,
        })
    }

    pub fn image(&self) -> &ImageInput {
        &self.image
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn primary_model(&self) -> &str {
        &self.primary_model
    }

    pub fn fallback_models(&self) -> &[String] {
        &self.fallback_models
    }

    /// Models in the order they are tried: primary first, then fallbacks.
    pub fn candidates(&self) -> Vec<&str> {
        std::iter::once(self.primary_model.as_str())
            .chain(self.fallback_models.iter().map(String::as_str))
            .collect()
    }
}
