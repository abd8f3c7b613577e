//! Mirror node account lookup, used to resolve the key type of raw keys.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::error::HttpError;
use crate::ledger::KeyType;
use crate::network::Network;

#[derive(Debug, Clone, Deserialize)]
pub struct MirrorAccountKey {
    #[serde(rename = "_type")]
    pub key_type: String,
    #[serde(default)]
    pub key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MirrorAccount {
    #[serde(default)]
    pub account: Option<String>,
    #[serde(default)]
    pub key: Option<MirrorAccountKey>,
}

#[derive(Debug, Clone)]
pub struct MirrorNode {
    base_url: String,
    client: Client,
}

impl MirrorNode {
    pub fn new(base_url: &str) -> Result<Self, HttpError> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn for_network(network: Network) -> Result<Self, HttpError> {
        Self::new(network.mirror_node_url())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /api/v1/accounts/{id}`.
    pub async fn account(&self, account_id: &str) -> Result<MirrorAccount, HttpError> {
        let url = format!(
            "{}/api/v1/accounts/{}",
            self.base_url,
            urlencoding::encode(account_id)
        );
        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                404 => HttpError::NotFound(format!("account {account_id}")),
                400..=499 => HttpError::BadRequest(body),
                code => HttpError::ServerError { status: code, body },
            });
        }
        Ok(resp.json().await?)
    }

    /// Key algorithm registered for `account_id`, if the mirror node knows it.
    pub async fn account_key_type(&self, account_id: &str) -> Result<Option<KeyType>, HttpError> {
        let account = self.account(account_id).await?;
        Ok(account
            .key
            .and_then(|k| KeyType::from_mirror_type(&k.key_type)))
    }
}
