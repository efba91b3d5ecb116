//! Epic Games Store GraphQL catalog client.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

use dlcpwn_model::{DlcInfo, MetadataProvider};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::StoreError;
use crate::cache::JsonCache;

const DEFAULT_ENDPOINT: &str = "https://graphql.epicgames.com/graphql";

/// Everything but ASCII alphanumerics and `-_.~/` is escaped.
const NAMESPACE_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

const SEARCH_OFFERS_QUERY: &str = r#"query searchOffers($namespace: String!) {
    Catalog {
        searchStore(category: "*", namespace: $namespace) {
            elements {
                id
                title
                developer
                items { id }
                catalogNs { mappings(pageType: "productHome") { pageSlug } }
            }
        }
    }
}"#;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    data: SearchData,
}

#[derive(Debug, Deserialize)]
struct SearchData {
    #[serde(rename = "Catalog")]
    catalog: Catalog,
}

#[derive(Debug, Deserialize)]
struct Catalog {
    #[serde(rename = "searchStore")]
    search_store: SearchStore,
}

#[derive(Debug, Deserialize)]
struct SearchStore {
    #[serde(default)]
    elements: Vec<Element>,
}

#[derive(Debug, Deserialize)]
struct Element {
    #[serde(default)]
    title: String,
    #[serde(default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    id: String,
}

/// Epic catalog client.
///
/// Entries listed by [`query_catalog`](Self::query_catalog) are remembered so
/// later [`resolve`](MetadataProvider::resolve) calls can answer offline.
pub struct EpicStore {
    http: reqwest::Client,
    endpoint: String,
    cache: JsonCache,
    known: Mutex<HashMap<String, DlcInfo>>,
}

impl EpicStore {
    pub fn new(http: reqwest::Client, cache: JsonCache) -> Self {
        Self {
            http,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            cache,
            known: Mutex::new(HashMap::new()),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_endpoint(mut self, url: String) -> Self {
        self.endpoint = url;
        self
    }

    /// Lists the catalog items published under `namespace`.
    ///
    /// Returns an empty list when neither the cache nor the network can
    /// answer.
    pub async fn query_catalog(&self, namespace: &str) -> Vec<DlcInfo> {
        let key = format!("epic_{namespace}");
        let cached = self.cache.load(&key).and_then(|cached| {
            match parse_search_offers(&cached, namespace) {
                Ok(entries) => Some(entries),
                Err(e) => {
                    warn!(namespace, error = %e, "discarding unusable epic cache entry");
                    self.cache.remove(&key);
                    None
                }
            }
        });

        let entries = match cached {
            Some(entries) => entries,
            None => {
                let fresh = match self.search_offers(namespace).await {
                    Ok(fresh) => fresh,
                    Err(e) => {
                        warn!(namespace, error = %e, "epic catalog query failed");
                        return Vec::new();
                    }
                };
                match parse_search_offers(&fresh, namespace) {
                    Ok(entries) => {
                        self.cache.store(&key, &fresh);
                        entries
                    }
                    Err(e) => {
                        warn!(namespace, error = %e, "unexpected epic catalog response");
                        return Vec::new();
                    }
                }
            }
        };
        info!(namespace, count = entries.len(), "epic catalog items");

        if let Ok(mut known) = self.known.lock() {
            for entry in &entries {
                known.insert(entry.id.clone(), entry.clone());
            }
        }
        entries
    }

    async fn search_offers(&self, namespace: &str) -> Result<Value, StoreError> {
        let encoded = utf8_percent_encode(namespace, NAMESPACE_ESCAPE).to_string();
        let payload = json!({
            "query": SEARCH_OFFERS_QUERY,
            "variables": { "namespace": encoded },
        });

        let resp = self.http.post(&self.endpoint).json(&payload).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(StoreError::Api {
                status: status.as_u16(),
            });
        }
        Ok(serde_json::from_slice(&resp.bytes().await?)?)
    }
}

/// Flattens a `searchOffers` response into one entry per catalog item.
fn parse_search_offers(response: &Value, namespace: &str) -> Result<Vec<DlcInfo>, StoreError> {
    let parsed = SearchResponse::deserialize(response)?;
    Ok(parsed
        .data
        .catalog
        .search_store
        .elements
        .into_iter()
        .flat_map(|element| {
            let title = element.title;
            element.items.into_iter().map(move |item| DlcInfo {
                id: item.id,
                name: title.clone(),
                parent_id: Some(namespace.to_string()),
            })
        })
        .collect())
}

impl MetadataProvider for EpicStore {
    fn resolve<'a>(
        &'a self,
        dlc_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<DlcInfo>> + Send + 'a>> {
        Box::pin(async move { self.known.lock().ok()?.get(dlc_id).cloned() })
    }
}
