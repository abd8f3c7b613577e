//! HTTP submission strategy — `POST /inscriptions/start-inscription`.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::job::wire::{StartInscriptionBody, StartInscriptionFile};
use crate::domain::job::{JobSnapshot, PendingTransaction};
use crate::domain::request::mime::{
    detect_inline_mime, essence, mime_from_file_name, normalize_mime_type, OCTET_STREAM,
};
use crate::domain::request::{validate_request, FileInput, InscriptionRequest, MAX_URL_FILE_SIZE};
use crate::error::{HttpError, SdkError, ValidationError};
use crate::http::InscriptionHttp;
use crate::logging::Logger;
use crate::network::Network;
use crate::transport::{SubmissionChannel, TransportKind};

pub struct HttpSubmission {
    http: InscriptionHttp,
    network: Network,
    logger: Arc<dyn Logger>,
}

impl std::fmt::Debug for HttpSubmission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSubmission")
            .field("http", &self.http)
            .field("network", &self.network)
            .finish_non_exhaustive()
    }
}

impl HttpSubmission {
    pub fn new(http: InscriptionHttp, network: Network, logger: Arc<dyn Logger>) -> Self {
        Self {
            http,
            network,
            logger,
        }
    }

    /// Validate, resolve file metadata, and start the job.
    ///
    /// Returns the service's raw response, which carries the job id in
    /// `tx_id` and the unsigned transaction in `transactionBytes`.
    pub async fn start(&self, request: &InscriptionRequest) -> Result<JobSnapshot, SdkError> {
        if let Err(e) = validate_request(request) {
            self.logger.warn(&format!("Invalid inscription request: {}", e));
            return Err(e.into());
        }

        let file = match &request.file {
            FileInput::Url { url, .. } => {
                let metadata = self.file_metadata(url).await?;
                if metadata.size > MAX_URL_FILE_SIZE {
                    return Err(ValidationError::new(format!(
                        "File size exceeds maximum URL file limit of {}MB",
                        MAX_URL_FILE_SIZE / 1024 / 1024
                    ))
                    .into());
                }
                StartInscriptionFile::Url {
                    file_url: url.clone(),
                }
            }
            FileInput::Inline { base64, file_name, .. } => StartInscriptionFile::Inline {
                file_base64: base64.clone(),
                file_name: file_name.clone(),
                file_mime_type: resolve_inline_mime(
                    base64,
                    file_name,
                    request.file.declared_mime_type(),
                ),
            },
        };

        if let Some(json_url) = &request.json_file_url {
            let metadata = self.file_metadata(json_url).await?;
            if essence(&metadata.mime_type) != "application/json" {
                return Err(
                    ValidationError::new("JSON file must be of type application/json").into(),
                );
            }
        }

        let body = start_body(request, request.network.unwrap_or(self.network), file);
        self.logger.debug(&format!(
            "Starting {} inscription for {}",
            body.mode, body.holder_id
        ));

        self.http
            .start_inscription(&body)
            .await
            .map_err(submission_error)
    }

    async fn file_metadata(
        &self,
        url: &str,
    ) -> Result<crate::http::FileMetadata, SdkError> {
        self.http.file_metadata(url).await.map_err(|e| {
            self.logger
                .error(&format!("Error fetching file metadata for {}: {}", url, e));
            SdkError::from(ValidationError::new("Unable to fetch file metadata"))
        })
    }
}

#[async_trait]
impl SubmissionChannel for HttpSubmission {
    fn kind(&self) -> TransportKind {
        TransportKind::Http
    }

    async fn submit(&self, request: &InscriptionRequest) -> Result<PendingTransaction, SdkError> {
        let response = self.start(request).await?;
        pending_from_response(response, &*self.logger)
    }
}

pub(crate) fn pending_from_response(
    response: JobSnapshot,
    logger: &dyn Logger,
) -> Result<PendingTransaction, SdkError> {
    let transaction_bytes = match response.transaction_bytes.as_deref() {
        Some(bytes) if !bytes.is_empty() => bytes.to_string(),
        _ => {
            logger.error("No transaction bytes returned from inscription request");
            return Err(SdkError::Submission(
                "No transaction bytes returned from inscription request".into(),
            ));
        }
    };
    let job_id = [&response.tx_id, &response.id]
        .into_iter()
        .flatten()
        .find(|id| !id.is_empty())
        .cloned()
        .ok_or_else(|| SdkError::Submission("No job ID returned from inscription request".into()))?;

    Ok(PendingTransaction {
        job_id,
        transaction_bytes,
    })
}

/// Media type sent for an inline payload: data-URI prefix, then magic bytes,
/// then the declared type, then the file extension.
pub(crate) fn resolve_inline_mime(payload: &str, file_name: &str, declared: Option<&str>) -> String {
    let detected = detect_inline_mime(payload)
        .or_else(|| declared.filter(|m| !m.is_empty()))
        .or_else(|| mime_from_file_name(file_name).ok())
        .unwrap_or(OCTET_STREAM);
    normalize_mime_type(detected).to_string()
}

fn start_body(
    request: &InscriptionRequest,
    network: Network,
    file: StartInscriptionFile,
) -> StartInscriptionBody {
    StartInscriptionBody {
        holder_id: request.holder_id.clone(),
        mode: request.mode.as_str().to_string(),
        network: network.as_str().to_string(),
        only_json_collection: u8::from(request.is_only_json_collection()),
        creator: request.creator.clone(),
        description: request.description.clone(),
        file_standard: request.file_standard.clone(),
        metadata_object: request.metadata_object.clone(),
        json_file_url: request.json_file_url.clone(),
        ttl: request.ttl,
        file,
    }
}

/// Service rejections become submission errors carrying the server's
/// message; transient failures keep their HTTP classification.
fn submission_error(error: HttpError) -> SdkError {
    if error.is_transient() {
        return SdkError::Http(error);
    }
    match error {
        HttpError::BadRequest(message) | HttpError::NotFound(message) if !message.is_empty() => {
            SdkError::Submission(message)
        }
        other => SdkError::Submission(format!("Failed to start inscription: {}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::request::InscriptionMode;
    use crate::logging::testing::RecordingLogger;
    use std::time::Duration;

    const PNG_1X1: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    fn submission(server: &mockito::ServerGuard) -> HttpSubmission {
        let http = InscriptionHttp::new(&server.url(), "key", Duration::from_secs(5)).unwrap();
        HttpSubmission::new(http, Network::Testnet, Arc::new(RecordingLogger::default()))
    }

    #[test]
    fn test_resolve_inline_mime_order() {
        assert_eq!(resolve_inline_mime(PNG_1X1, "a.bin", Some("text/plain")), "image/png");
        assert_eq!(
            resolve_inline_mime("data:image/gif;base64,AAAA", "a.png", None),
            "image/gif"
        );
        assert_eq!(resolve_inline_mime("AAAA", "a.txt", Some("text/plain")), "text/plain");
        assert_eq!(resolve_inline_mime("AAAA", "a.json", None), "application/json");
        assert_eq!(resolve_inline_mime("AAAA", "noext", None), OCTET_STREAM);
        assert_eq!(
            resolve_inline_mime("data:image/vnd.microsoft.icon;base64,AAAA", "a.ico", None),
            "image/x-icon"
        );
    }

    #[tokio::test]
    async fn test_submit_inline_png() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/inscriptions/start-inscription")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "holderId": "0.0.123",
                "mode": "file",
                "network": "testnet",
                "onlyJSONCollection": 0,
                "fileName": "pixel.png",
                "fileMimeType": "image/png",
            })))
            .with_status(200)
            .with_body(r#"{"tx_id":"0.0.123@1.2","transactionBytes":"AQID","status":"pending"}"#)
            .create_async()
            .await;

        let request = InscriptionRequest::new(
            FileInput::inline(PNG_1X1, "pixel.png"),
            "0.0.123",
            InscriptionMode::File,
        );
        let pending = submission(&server).submit(&request).await.unwrap();

        assert_eq!(pending.job_id, "0.0.123@1.2");
        assert_eq!(pending.transaction_bytes, "AQID");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_invalid_request_sends_nothing() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/inscriptions/start-inscription")
            .expect(0)
            .create_async()
            .await;

        let request = InscriptionRequest::new(
            FileInput::inline(PNG_1X1, "pixel.png"),
            "  ",
            InscriptionMode::File,
        );
        let err = submission(&server).submit(&request).await.unwrap_err();
        assert!(err.is_validation());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_url_file_over_limit() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("HEAD", "/big.mp4")
            .with_status(200)
            .with_header("content-type", "video/mp4")
            .with_header("content-length", &(MAX_URL_FILE_SIZE + 1).to_string())
            .create_async()
            .await;

        let request = InscriptionRequest::new(
            FileInput::url(format!("{}/big.mp4", server.url())),
            "0.0.1",
            InscriptionMode::File,
        );
        let err = submission(&server).submit(&request).await.unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("maximum URL file limit of 100MB"));
    }

    #[tokio::test]
    async fn test_unreachable_metadata_is_validation_error() {
        let mut server = mockito::Server::new_async().await;
        server.mock("HEAD", "/gone.png").with_status(404).create_async().await;

        let request = InscriptionRequest::new(
            FileInput::url(format!("{}/gone.png", server.url())),
            "0.0.1",
            InscriptionMode::File,
        );
        let err = submission(&server).submit(&request).await.unwrap_err();
        assert_eq!(err.to_string(), "Validation error: Unable to fetch file metadata");
    }

    #[tokio::test]
    async fn test_json_file_content_type() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("HEAD", "/meta.json")
            .with_status(200)
            .with_header("content-type", "text/plain")
            .create_async()
            .await;
        server
            .mock("HEAD", "/ok.json")
            .with_status(200)
            .with_header("content-type", "application/json; charset=utf-8")
            .create_async()
            .await;
        server
            .mock("POST", "/inscriptions/start-inscription")
            .with_status(200)
            .with_body(r#"{"tx_id":"j","transactionBytes":"AQID"}"#)
            .create_async()
            .await;

        let sub = submission(&server);
        let bad = InscriptionRequest::new(FileInput::inline(PNG_1X1, "a.png"), "0.0.1", InscriptionMode::Hashinal)
            .json_file_url(format!("{}/meta.json", server.url()));
        let err = sub.submit(&bad).await.unwrap_err();
        assert!(err.to_string().contains("JSON file must be of type application/json"));

        let good = InscriptionRequest::new(FileInput::inline(PNG_1X1, "a.png"), "0.0.1", InscriptionMode::Hashinal)
            .json_file_url(format!("{}/ok.json", server.url()));
        assert!(sub.submit(&good).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_transaction_bytes() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/inscriptions/start-inscription")
            .with_status(200)
            .with_body(r#"{"tx_id":"j","status":"pending"}"#)
            .create_async()
            .await;

        let request = InscriptionRequest::new(FileInput::inline(PNG_1X1, "a.png"), "0.0.1", InscriptionMode::File);
        let err = submission(&server).submit(&request).await.unwrap_err();
        assert!(matches!(err, SdkError::Submission(ref m) if m.contains("No transaction bytes")));
        assert!(!err.is_validation());
    }

    #[tokio::test]
    async fn test_server_rejection_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/inscriptions/start-inscription")
            .with_status(400)
            .with_body(r#"{"message":"Holder account not found"}"#)
            .create_async()
            .await;

        let request = InscriptionRequest::new(FileInput::inline(PNG_1X1, "a.png"), "0.0.1", InscriptionMode::File);
        let err = submission(&server).submit(&request).await.unwrap_err();
        assert!(matches!(err, SdkError::Submission(ref m) if m == "Holder account not found"));
    }
}
