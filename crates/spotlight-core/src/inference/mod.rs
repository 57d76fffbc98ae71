//! Image-understanding inference with model fallback.
//!
//! `ResilientClient` walks an ordered list of model ids over a `ChatTransport`
//! (OpenRouter by default), falling through to the next model only on rate
//! limits or transport failures. Responses are normalized to canonical text
//! by `extract`, and pixel coordinates are pulled out of that text by
//! `coordinates`.

pub(crate) mod client;
pub(crate) mod coordinates;
pub(crate) mod extract;
pub(crate) mod openrouter;
pub(crate) mod outcome;
pub(crate) mod request;
pub(crate) mod transport;

pub use client::ResilientClient;
pub use coordinates::{extract_coordinates, Coordinates};
pub use extract::{
    error_message, error_message_or_body, extract_canonical_text, extract_description,
    ResponseShape, VIDEO_TEXT_FIELDS,
};
pub use openrouter::{normalize_chat_completion, OpenRouterTransport};
pub use outcome::{
    FailureKind, InferenceAttempt, InferenceFailure, InferenceOutcome, InferenceSuccess,
};
pub use request::{ImageInput, InferenceRequest};
pub use transport::{parse_body, ChatTransport, TransportError, TransportResponse};
