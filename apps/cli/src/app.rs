//! Wires catalogs, metadata stores and patch engines into the shell.

use std::io::BufReader;
use std::sync::Arc;
use std::time::Duration;

use dlcpwn_epic::EpicLibrary;
use dlcpwn_patch::PatchEngine;
use dlcpwn_steam::{Paths, SteamLibrary};
use dlcpwn_store::{EpicStore, JsonCache, SteamStore};

use crate::config::Config;
use crate::shell::{self, Console, Storefront};

/// Builds both storefronts from `config` and runs the shell on stdio.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let storefronts = storefronts(&config)?;
    tracing::debug!(
        payload_dir = %config.payload_dir.display(),
        cache_dir = %config.cache_dir.display(),
        "storefronts ready"
    );

    let mut console = Console::new(BufReader::new(std::io::stdin()), std::io::stdout());
    shell::run(&mut console, &storefronts).await?;
    Ok(())
}

fn storefronts(config: &Config) -> anyhow::Result<Vec<Storefront>> {
    let http = dlcpwn_store::http_client(Duration::from_secs(config.request_timeout_secs))?;
    let cache = JsonCache::new(&config.cache_dir);

    let cream = PatchEngine::cream(&config.payload_dir);
    let cream_files = cream.variant().binary_names();
    let steam_catalog = match &config.steam_path {
        Some(path) => SteamLibrary::new(Some(Paths::with_base(path.clone())), cream_files),
        None => SteamLibrary::detect(cream_files),
    };
    let steam_store = Arc::new(SteamStore::new(http.clone(), cache.clone()));

    let scream = PatchEngine::scream(&config.payload_dir);
    let scream_files = scream.variant().binary_names();
    let epic_catalog = match &config.epic_manifests_path {
        Some(path) => EpicLibrary::new(Some(path.clone()), scream_files),
        None => EpicLibrary::detect(scream_files),
    };
    let epic_store = Arc::new(EpicStore::new(http, cache));

    Ok(vec![
        Storefront {
            catalog: Box::new(steam_catalog),
            dlcs: steam_store.clone(),
            provider: steam_store,
            engine: cream,
            direct_install: false,
        },
        Storefront {
            catalog: Box::new(epic_catalog),
            dlcs: epic_store.clone(),
            provider: epic_store,
            engine: scream,
            direct_install: true,
        },
    ])
}
