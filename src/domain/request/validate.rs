//! Request validation. Every rule must hold before a request is submitted.

use super::mime;
use super::{FileInput, InscriptionMode, InscriptionRequest};
use crate::error::ValidationError;

/// Inline payloads are limited to 2 MiB after decoding.
pub const MAX_INLINE_FILE_SIZE: usize = 2 * 1024 * 1024;

/// Files referenced by URL are limited to 100 MiB.
pub const MAX_URL_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Check a request, failing on the first violated rule.
pub fn validate_request(request: &InscriptionRequest) -> Result<(), ValidationError> {
    if request.holder_id.trim().is_empty() {
        return Err(ValidationError::new("holderId is required"));
    }

    if request.mode == InscriptionMode::Hashinal
        && request.json_file_url.is_none()
        && request.metadata_object.is_none()
    {
        return Err(ValidationError::new(
            "Hashinal mode requires either jsonFileURL or metadataObject",
        ));
    }

    if request.is_only_json_collection() && request.mode != InscriptionMode::HashinalCollection {
        return Err(ValidationError::new(
            "onlyJSONCollection can only be used with hashinal-collection mode",
        ));
    }

    validate_file_input(&request.file)
}

pub fn validate_file_input(file: &FileInput) -> Result<(), ValidationError> {
    match file {
        FileInput::Inline { base64, file_name, .. } => {
            if base64.is_empty() {
                return Err(ValidationError::new("Base64 data is required"));
            }

            if mime::estimated_decoded_len(base64) > MAX_INLINE_FILE_SIZE {
                return Err(ValidationError::new(format!(
                    "File size exceeds maximum limit of {}MB",
                    MAX_INLINE_FILE_SIZE / 1024 / 1024
                )));
            }

            let resolved = match file.declared_mime_type() {
                Some(declared) => declared,
                None => mime::mime_from_file_name(file_name)?,
            };
            if !mime::is_supported_mime(resolved) {
                return Err(ValidationError::new(
                    "File must have one of the supported MIME types",
                ));
            }
            Ok(())
        }
        FileInput::Url { url, .. } => {
            if url.trim().is_empty() {
                return Err(ValidationError::new("URL is required"));
            }
            Ok(())
        }
    }
}
