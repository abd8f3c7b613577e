//! Inscription request domain — what the caller asks to inscribe.

pub mod mime;
pub mod validate;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::network::Network;

pub use validate::{validate_request, MAX_INLINE_FILE_SIZE, MAX_URL_FILE_SIZE};

// ─── InscriptionMode ─────────────────────────────────────────────────────────

/// Job type requested from the inscription service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InscriptionMode {
    File,
    Upload,
    Hashinal,
    HashinalCollection,
}

impl InscriptionMode {
    pub const ALL: [InscriptionMode; 4] = [
        InscriptionMode::File,
        InscriptionMode::Upload,
        InscriptionMode::Hashinal,
        InscriptionMode::HashinalCollection,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Upload => "upload",
            Self::Hashinal => "hashinal",
            Self::HashinalCollection => "hashinal-collection",
        }
    }
}

impl std::fmt::Display for InscriptionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for InscriptionMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = Self::ALL.iter().map(|m| m.as_str()).collect();
                ValidationError::new(format!(
                    "Invalid mode: {}. Must be one of: {}",
                    s,
                    valid.join(", ")
                ))
            })
    }
}

// ─── FileInput ───────────────────────────────────────────────────────────────

/// The content to inscribe: a remote locator or an inline base64 payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FileInput {
    #[serde(rename = "url")]
    Url {
        url: String,
        #[serde(rename = "fileName", skip_serializing_if = "Option::is_none")]
        file_name: Option<String>,
        #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
    },
    #[serde(rename = "base64")]
    Inline {
        base64: String,
        #[serde(rename = "fileName")]
        file_name: String,
        #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
    },
}

impl FileInput {
    pub fn url(url: impl Into<String>) -> Self {
        FileInput::Url {
            url: url.into(),
            file_name: None,
            mime_type: None,
        }
    }

    pub fn inline(base64: impl Into<String>, file_name: impl Into<String>) -> Self {
        FileInput::Inline {
            base64: base64.into(),
            file_name: file_name.into(),
            mime_type: None,
        }
    }

    /// Set the declared media type.
    pub fn with_mime_type(mut self, mime: impl Into<String>) -> Self {
        match &mut self {
            FileInput::Url { mime_type, .. } | FileInput::Inline { mime_type, .. } => {
                *mime_type = Some(mime.into());
            }
        }
        self
    }

    pub fn declared_mime_type(&self) -> Option<&str> {
        match self {
            FileInput::Url { mime_type, .. } | FileInput::Inline { mime_type, .. } => {
                mime_type.as_deref()
            }
        }
    }
}

// ─── InscriptionRequest ──────────────────────────────────────────────────────

/// A request to inscribe one file (or one hashinal) for a holder account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InscriptionRequest {
    pub file: FileInput,
    pub holder_id: String,
    pub mode: InscriptionMode,
    /// Overrides the client's configured network when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<Network>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_standard: Option<String>,
    #[serde(rename = "onlyJSONCollection", skip_serializing_if = "Option::is_none")]
    pub only_json_collection: Option<bool>,
    #[serde(rename = "jsonFileURL", skip_serializing_if = "Option::is_none")]
    pub json_file_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata_object: Option<Map<String, Value>>,
}

impl InscriptionRequest {
    pub fn new(file: FileInput, holder_id: impl Into<String>, mode: InscriptionMode) -> Self {
        Self {
            file,
            holder_id: holder_id.into(),
            mode,
            network: None,
            ttl: None,
            creator: None,
            description: None,
            file_standard: None,
            only_json_collection: None,
            json_file_url: None,
            metadata_object: None,
        }
    }

    pub fn network(mut self, network: Network) -> Self {
        self.network = Some(network);
        self
    }

    pub fn creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = Some(creator.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn file_standard(mut self, standard: impl Into<String>) -> Self {
        self.file_standard = Some(standard.into());
        self
    }

    pub fn only_json_collection(mut self, only: bool) -> Self {
        self.only_json_collection = Some(only);
        self
    }

    pub fn json_file_url(mut self, url: impl Into<String>) -> Self {
        self.json_file_url = Some(url.into());
        self
    }

    pub fn metadata_object(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata_object = Some(metadata);
        self
    }

    pub fn is_only_json_collection(&self) -> bool {
        self.only_json_collection.unwrap_or(false)
    }
}
