//! Steam store `appdetails` client.

use std::future::Future;
use std::pin::Pin;

use dlcpwn_model::{DlcInfo, MetadataProvider};
use serde_json::Value;
use tracing::debug;

use crate::StoreError;
use crate::cache::JsonCache;

const DEFAULT_BASE_URL: &str = "https://store.steampowered.com";

/// Steam store metadata client.
pub struct SteamStore {
    http: reqwest::Client,
    base_url: String,
    cache: JsonCache,
}

impl SteamStore {
    pub fn new(http: reqwest::Client, cache: JsonCache) -> Self {
        Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            cache,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    /// Returns the store `data` object for an app, from cache when present.
    pub async fn app_details(&self, app_id: &str) -> Result<Value, StoreError> {
        if let Some(data) = self.cache.load(app_id) {
            return Ok(data);
        }

        let url = format!("{}/api/appdetails", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[("appids", app_id)])
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(StoreError::Api {
                status: status.as_u16(),
            });
        }

        let body: Value = serde_json::from_slice(&resp.bytes().await?)?;
        let data = extract_app_data(&body, app_id)
            .ok_or_else(|| StoreError::NotFound(app_id.to_string()))?;
        self.cache.store(app_id, &data);
        Ok(data)
    }
}

/// Picks `<id>.data` out of an `appdetails` response when `success` is true.
fn extract_app_data(body: &Value, app_id: &str) -> Option<Value> {
    let entry = body.get(app_id)?;
    if entry.get("success").and_then(Value::as_bool) != Some(true) {
        return None;
    }
    entry.get("data").filter(|d| !d.is_null()).cloned()
}

/// Returns the positive DLC ids listed in an app's store data.
///
/// Ids may be numbers or numeric strings; anything else is skipped.
pub fn dlc_ids(details: &Value) -> Vec<String> {
    let Some(list) = details.get("dlc").and_then(Value::as_array) else {
        return Vec::new();
    };
    list.iter()
        .filter_map(|v| match v {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse::<u64>().ok(),
            _ => None,
        })
        .filter(|id| *id > 0)
        .map(|id| id.to_string())
        .collect()
}

/// Builds a [`DlcInfo`] from a DLC's store data. `None` when it has no name.
pub fn dlc_info(dlc_id: &str, details: &Value) -> Option<DlcInfo> {
    let name = details.get("name").and_then(Value::as_str)?.trim();
    if name.is_empty() {
        return None;
    }
    let parent_id = details
        .get("fullgame")
        .and_then(|g| g.get("appid"))
        .and_then(|id| match id {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });
    Some(DlcInfo {
        id: dlc_id.to_string(),
        name: name.to_string(),
        parent_id,
    })
}

impl MetadataProvider for SteamStore {
    fn resolve<'a>(
        &'a self,
        dlc_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<DlcInfo>> + Send + 'a>> {
        Box::pin(async move {
            match self.app_details(dlc_id).await {
                Ok(details) => dlc_info(dlc_id, &details),
                Err(e) => {
                    debug!(dlc_id, error = %e, "dlc lookup failed");
                    None
                }
            }
        })
    }
}
