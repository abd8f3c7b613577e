//! Wire types returned by the inscription service.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Raw job snapshot from `GET /inscriptions/retrieve-inscription` and
/// `POST /inscriptions/start-inscription`.
///
/// Every field is optional on the wire; the service fills them in as the job
/// progresses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobSnapshot {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub tx_id: Option<String>,
    #[serde(default)]
    pub topic_id: Option<String>,
    #[serde(default, rename = "jsonTopicId")]
    pub json_topic_id: Option<String>,
    #[serde(default, rename = "registryTopicId")]
    pub registry_topic_id: Option<String>,
    #[serde(default)]
    pub messages: Option<u64>,
    #[serde(default, rename = "maxMessages")]
    pub max_messages: Option<u64>,
    #[serde(default, rename = "confirmedMessages")]
    pub confirmed_messages: Option<u64>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(
        default,
        rename = "fileStandard",
        deserialize_with = "string_or_number"
    )]
    pub file_standard: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default, rename = "transactionId")]
    pub transaction_id: Option<String>,
    #[serde(default, rename = "transactionBytes")]
    pub transaction_bytes: Option<String>,
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default, rename = "jsonHash")]
    pub json_hash: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "jsonName")]
    pub json_name: Option<String>,
    #[serde(default, rename = "fileUrl")]
    pub file_url: Option<String>,
    #[serde(default, rename = "jsonFileUrl")]
    pub json_file_url: Option<String>,
    /// Fields this SDK does not model.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Some deployments send `fileStandard` as a number.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Body of `POST /inscriptions/start-inscription`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartInscriptionBody {
    pub holder_id: String,
    pub mode: String,
    pub network: String,
    #[serde(rename = "onlyJSONCollection")]
    pub only_json_collection: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_standard: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata_object: Option<Map<String, Value>>,
    #[serde(rename = "jsonFileURL", skip_serializing_if = "Option::is_none")]
    pub json_file_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u64>,
    #[serde(flatten)]
    pub file: StartInscriptionFile,
}

/// File part of the start-inscription body.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum StartInscriptionFile {
    Url {
        #[serde(rename = "fileURL")]
        file_url: String,
    },
    Inline {
        #[serde(rename = "fileBase64")]
        file_base64: String,
        #[serde(rename = "fileName")]
        file_name: String,
        #[serde(rename = "fileMimeType")]
        file_mime_type: String,
    },
}

/// Response of `GET /inscriptions/websocket-servers`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebSocketServersResponse {
    #[serde(default)]
    pub servers: Vec<WebSocketServer>,
    #[serde(default)]
    pub recommended: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebSocketServer {
    pub url: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl WebSocketServersResponse {
    /// The recommended server, else the first active one.
    pub fn pick(&self) -> Option<String> {
        if let Some(recommended) = self.recommended.as_ref().filter(|u| !u.is_empty()) {
            return Some(recommended.clone());
        }
        self.servers
            .iter()
            .find(|s| s.status.as_deref() == Some("active"))
            .map(|s| s.url.clone())
    }
}

/// Query parameters of `GET /inscriptions/numbers`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InscriptionNumbersParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ht_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sn: Option<u64>,
    #[serde(rename = "inscriptionNumber", skip_serializing_if = "Option::is_none")]
    pub inscription_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortOrder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub random: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InscriptionJson {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub creator: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default, rename = "type")]
    pub media_type: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
    #[serde(default)]
    pub format: String,
}

/// One entry of `GET /inscriptions/numbers`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InscriptionNumberDetails {
    pub sn: u64,
    pub t_id: String,
    #[serde(default)]
    pub account_id: Option<u64>,
    #[serde(default)]
    pub created_timestamp: Option<String>,
    #[serde(default)]
    pub treasury_account_id: Option<String>,
    #[serde(default)]
    pub ht_id: Option<u64>,
    #[serde(default)]
    pub image: Option<String>,
    pub inscription_number: u64,
    #[serde(default)]
    pub json: Option<InscriptionJson>,
    #[serde(default)]
    pub mimetype: Option<String>,
    #[serde(default)]
    pub op: Option<String>,
    #[serde(default)]
    pub p: Option<String>,
}

/// Response of `GET /inscriptions/holder-inscriptions`.
///
/// Entries are job snapshots; their exact shape varies by mode.
pub type HolderInscriptionsResponse = Vec<JobSnapshot>;
