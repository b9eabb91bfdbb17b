//! Request and wire types for the extraction boundary

use base64::Engine;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::CandidateRecord;

/// Base64-encoded image attached to an extraction request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageAttachment {
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    /// Base64-encoded bytes
    pub data: String,
}

impl ImageAttachment {
    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.to_string(),
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
        }
    }
}

/// One extraction call: the user's notes plus call-scoped context
///
/// `knowledge` is the serialized directive string from the knowledge base,
/// rebuilt from the latest ledger snapshot at call time. `today` anchors
/// relative date phrases ("yesterday") in the input.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    pub raw_text: String,
    pub images: Vec<ImageAttachment>,
    pub knowledge: String,
    pub today: NaiveDate,
}

impl ExtractionRequest {
    pub fn new(raw_text: impl Into<String>, today: NaiveDate) -> Self {
        Self {
            raw_text: raw_text.into(),
            images: Vec::new(),
            knowledge: String::new(),
            today,
        }
    }

    pub fn with_knowledge(mut self, knowledge: impl Into<String>) -> Self {
        self.knowledge = knowledge.into();
        self
    }

    pub fn with_image(mut self, image: ImageAttachment) -> Self {
        self.images.push(image);
        self
    }

    /// Text may be empty only when at least one attachment is present
    pub fn validate(&self) -> Result<()> {
        if self.raw_text.trim().is_empty() && self.images.is_empty() {
            return Err(Error::InvalidInput(
                "Please type some notes or attach a file first".into(),
            ));
        }
        Ok(())
    }
}

/// Proxy request body for `POST /api/extract`
#[derive(Debug, Serialize, Deserialize)]
pub struct ExtractRequestBody {
    #[serde(rename = "rawText")]
    pub raw_text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<ImageAttachment>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub knowledge: String,
}

/// Proxy success envelope: `{ "expenses": [...] }`
#[derive(Debug, Serialize, Deserialize)]
pub struct ExtractResponseBody {
    pub expenses: Vec<CandidateRecord>,
}

/// Proxy failure body: `{ "error": "..." }`
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
