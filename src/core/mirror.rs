use crate::domain::model::{parse_address, AccountInfo, EntityId, Links, StorageEntry, TokenInfo};
use crate::utils::error::{Result, ToolkitError};
use ethers::types::Address;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashSet;

/// 每頁最多筆數 (mirror node 上限)
pub const PAGE_LIMIT: u32 = 100;

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    links: Option<Links>,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

/// Mirror node REST client。所有請求依序執行，非 200 立即失敗，不重試
#[derive(Debug, Clone)]
pub struct MirrorNodeClient {
    base_url: String,
    client: Client,
}

impl MirrorNodeClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `links.next` 為相對路徑時接在 base URL 之後，絕對 URL 直接使用
    fn url_for(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else if endpoint.starts_with('/') {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}/{}", self.base_url, endpoint)
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        tracing::debug!("📡 GET {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(ToolkitError::MirrorNodeError {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
                body,
            });
        }

        let value: Value = response.json().await?;
        serde_json::from_value(value).map_err(|e| ToolkitError::MirrorNodeResponseError {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    /// 取得所有分頁並累積 `field` 陣列，直到 `links.next` 為 null
    pub async fn fetch_endpoint(&self, endpoint: &str, field: &str) -> Result<Vec<Value>> {
        let mut data = Vec::new();
        let mut visited = HashSet::new();
        let mut next = Some(self.url_for(endpoint));
        let mut pages = 0usize;

        while let Some(url) = next.take() {
            if !visited.insert(url.clone()) {
                return Err(ToolkitError::MirrorNodeResponseError {
                    url,
                    message: "pagination cursor points to a page that was already fetched".to_string(),
                });
            }

            let mut page: Page = self.get_json(&url).await?;
            match page.fields.remove(field) {
                Some(Value::Array(items)) => data.extend(items),
                Some(other) => {
                    return Err(ToolkitError::MirrorNodeResponseError {
                        url,
                        message: format!("field `{}` is not an array (got {})", field, type_name(&other)),
                    })
                }
                None => {
                    return Err(ToolkitError::MirrorNodeResponseError {
                        url,
                        message: format!("field `{}` is missing", field),
                    })
                }
            }
            pages += 1;

            next = page
                .links
                .and_then(|links| links.next)
                .map(|cursor| self.url_for(&cursor));
        }

        tracing::debug!("📄 Fetched {} `{}` entries across {} page(s)", data.len(), field, pages);
        Ok(data)
    }

    async fn fetch_typed<T: DeserializeOwned>(&self, endpoint: &str, field: &str) -> Result<Vec<T>> {
        self.fetch_endpoint(endpoint, field)
            .await?
            .into_iter()
            .map(|item| {
                serde_json::from_value(item).map_err(|e| ToolkitError::MirrorNodeResponseError {
                    url: self.url_for(endpoint),
                    message: format!("invalid `{}` entry: {}", field, e),
                })
            })
            .collect()
    }

    pub async fn fetch_contract_state(&self, contract_id_or_address: &str) -> Result<Vec<StorageEntry>> {
        let endpoint = format!(
            "/api/v1/contracts/{}/state?limit={}",
            contract_id_or_address.trim(),
            PAGE_LIMIT
        );
        self.fetch_typed(&endpoint, "state").await
    }

    pub async fn fetch_account(&self, id_or_alias_or_evm_address: &str) -> Result<AccountInfo> {
        let url = self.url_for(&format!("/api/v1/accounts/{}", id_or_alias_or_evm_address.trim()));
        self.get_json(&url).await
    }

    pub async fn fetch_token(&self, id_or_evm_address: &str) -> Result<TokenInfo> {
        let url = self.url_for(&format!("/api/v1/tokens/{}", id_or_evm_address.trim()));
        self.get_json(&url).await
    }

    /// 帳戶的 EVM 地址；沒有 ECDSA alias 時使用 long-zero 地址
    pub async fn resolve_evm_address(&self, id_or_alias_or_evm_address: &str) -> Result<Address> {
        let account = self.fetch_account(id_or_alias_or_evm_address).await?;
        match account.evm_address.as_deref() {
            Some(address) if !address.is_empty() => parse_address(address),
            _ => Ok(account.account.parse::<EntityId>()?.to_evm_address()),
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
