//! Collaborator traits consumed by the patch engine and the shell.

use std::future::Future;
use std::pin::Pin;

use crate::types::{DlcInfo, Game};

/// Enumerates installed games for one storefront.
///
/// Discovery failures are not errors: an unreachable library yields an
/// empty list.
pub trait GameCatalog: Send + Sync {
    /// Returns every installed game this catalog can find.
    fn get_games(&self) -> Pin<Box<dyn Future<Output = Vec<Game>> + Send + '_>>;
}

/// Resolves DLC identifiers to human-readable metadata.
///
/// Implementations are read-through caches; `None` covers every failure
/// (unknown id, network error, malformed response).
pub trait MetadataProvider: Send + Sync {
    fn resolve<'a>(
        &'a self,
        dlc_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<DlcInfo>> + Send + 'a>>;
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    struct FixedProvider(HashMap<String, String>);

    impl MetadataProvider for FixedProvider {
        fn resolve<'a>(
            &'a self,
            dlc_id: &'a str,
        ) -> Pin<Box<dyn Future<Output = Option<DlcInfo>> + Send + 'a>> {
            Box::pin(async move {
                self.0.get(dlc_id).map(|name| DlcInfo {
                    id: dlc_id.to_string(),
                    name: name.clone(),
                    parent_id: None,
                })
            })
        }
    }

    #[tokio::test]
    async fn provider_is_object_safe() {
        let provider: Box<dyn MetadataProvider> = Box::new(FixedProvider(HashMap::from([(
            "100".to_string(),
            "Soundtrack".to_string(),
        )])));

        let info = provider.resolve("100").await.unwrap();
        assert_eq!(info.name, "Soundtrack");
        assert!(provider.resolve("200").await.is_none());
    }
}
