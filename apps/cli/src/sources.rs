//! DLC listings per storefront.

use std::future::Future;
use std::pin::Pin;

use dlcpwn_model::{DlcInfo, Game, MetadataProvider};
use dlcpwn_store::{EpicStore, SteamStore};
use tracing::warn;

/// Lists the DLCs available for a game.
pub trait DlcSource: Send + Sync {
    /// Returns `None` when the storefront could not be queried.
    fn list_dlcs<'a>(
        &'a self,
        game: &'a Game,
    ) -> Pin<Box<dyn Future<Output = Option<Vec<DlcInfo>>> + Send + 'a>>;
}

impl DlcSource for SteamStore {
    /// DLCs whose own store page cannot be resolved are left out.
    fn list_dlcs<'a>(
        &'a self,
        game: &'a Game,
    ) -> Pin<Box<dyn Future<Output = Option<Vec<DlcInfo>>> + Send + 'a>> {
        Box::pin(async move {
            let details = match self.app_details(&game.id).await {
                Ok(details) => details,
                Err(e) => {
                    warn!(app_id = %game.id, error = %e, "failed to fetch game details");
                    return None;
                }
            };

            let mut dlcs = Vec::new();
            for id in dlcpwn_store::steam::dlc_ids(&details) {
                if let Some(info) = self.resolve(&id).await {
                    dlcs.push(info);
                }
            }
            Some(dlcs)
        })
    }
}

impl DlcSource for EpicStore {
    fn list_dlcs<'a>(
        &'a self,
        game: &'a Game,
    ) -> Pin<Box<dyn Future<Output = Option<Vec<DlcInfo>>> + Send + 'a>> {
        Box::pin(async move { Some(self.query_catalog(&game.id).await) })
    }
}
