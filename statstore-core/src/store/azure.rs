//! REST client for an Azure-style table service.
//!
//! Requests are authenticated with SharedKeyLite: an HMAC-SHA256 signature
//! over the request date and the canonicalized resource, keyed by the
//! account's shared key. The client carries no retry or timeout policy of its
//! own; transport semantics are whatever the underlying HTTP stack provides.

use crate::error::{Result, SinkError};
use crate::snapshot::Record;
use crate::store::{InsertResponse, TableInit, TableStore};
use async_trait::async_trait;
use base64::prelude::*;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::StatusCode;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Table service protocol version this client speaks.
const MS_VERSION: &str = "2019-02-02";

/// Client for the table service of one storage account.
#[derive(Debug)]
pub struct AzureTableClient {
    http: reqwest::Client,
    account: String,
    key: Vec<u8>,
    base_url: String,
}

impl AzureTableClient {
    /// Build a client for `account`, authenticating with its base64-encoded
    /// shared `access_key`. `endpoint` overrides the public endpoint derived
    /// from the account name.
    pub fn new(account: &str, access_key: &str, endpoint: Option<&str>) -> Result<Self> {
        let key = BASE64_STANDARD
            .decode(access_key)
            .map_err(|e| SinkError::InvalidKey { reason: e.to_string() })?;

        let base_url = match endpoint {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}.table.core.windows.net", account),
        };

        Ok(Self { http: reqwest::Client::new(), account: account.to_string(), key, base_url })
    }

    /// RFC 1123 date for the `x-ms-date` header.
    fn request_date() -> String {
        Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string()
    }

    /// SharedKeyLite authorization header value for `resource`.
    ///
    /// The string-to-sign is `"{date}\n/{account}/{resource}"`.
    fn authorization(&self, date: &str, resource: &str) -> String {
        let string_to_sign = format!("{}\n/{}/{}", date, self.account, resource);
        let mut mac =
            HmacSha256::new_from_slice(&self.key).expect("hmac accepts keys of any length");
        mac.update(string_to_sign.as_bytes());
        let signature = BASE64_STANDARD.encode(mac.finalize().into_bytes());
        format!("SharedKeyLite {}:{}", self.account, signature)
    }

    async fn post(&self, resource: &str, body: &serde_json::Value) -> Result<reqwest::Response> {
        let date = Self::request_date();
        self.http
            .post(format!("{}/{}", self.base_url, resource))
            .header("x-ms-date", &date)
            .header("x-ms-version", MS_VERSION)
            .header("Accept", "application/json;odata=nometadata")
            .header("Authorization", self.authorization(&date, resource))
            .json(body)
            .send()
            .await
            .map_err(SinkError::Transport)
    }
}

#[async_trait]
impl TableStore for AzureTableClient {
    async fn ensure_table(&self, table: &str) -> Result<TableInit> {
        let body = serde_json::json!({ "TableName": table });
        let response = self.post("Tables", &body).await?;
        let status = response.status();

        match status {
            StatusCode::CREATED | StatusCode::NO_CONTENT => Ok(TableInit::Created),
            StatusCode::CONFLICT => Ok(TableInit::AlreadyExists),
            _ if status.is_success() => {
                let body = response.text().await.unwrap_or_default();
                Ok(TableInit::Unrecognized { status: status.as_u16(), body })
            }
            _ => {
                let body = response.text().await.unwrap_or_default();
                Err(SinkError::TableInit {
                    table: table.to_string(),
                    reason: format!("HTTP {}: {}", status.as_u16(), body),
                })
            }
        }
    }

    async fn insert(&self, table: &str, record: &Record) -> Result<InsertResponse> {
        let body = serde_json::to_value(record)?;
        let response = self.post(table, &body).await?;
        let status = response.status();

        if status == StatusCode::CREATED || status == StatusCode::NO_CONTENT {
            return Ok(InsertResponse {
                is_successful: true,
                status: status.as_u16(),
                body: String::new(),
            });
        }

        let body = response.text().await.unwrap_or_default();
        Ok(InsertResponse { is_successful: false, status: status.as_u16(), body })
    }
}
