//! Interactive menus.
//!
//! Menus return a [`Flow`] so quitting unwinds through every caller instead
//! of exiting the process from deep inside a menu.

use std::collections::BTreeSet;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use colored::{ColoredString, Colorize};
use dlcpwn_model::{DlcInfo, Game, GameCatalog, MetadataProvider};
use dlcpwn_patch::{PatchEngine, Settings};
use tracing::error;

use crate::sources::DlcSource;

/// Where control goes after a menu returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Return to the previous menu.
    Back,
    /// An operation ran; return to the game list.
    Done,
    Quit,
}

/// Everything the shell needs for one storefront.
pub struct Storefront {
    pub catalog: Box<dyn GameCatalog>,
    pub dlcs: Arc<dyn DlcSource>,
    pub provider: Arc<dyn MetadataProvider>,
    pub engine: PatchEngine,
    /// Offer install straight from the DLC menu.
    pub direct_install: bool,
}

/// Line-based operator input and coloured output.
pub struct Console<R, W> {
    input: R,
    out: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, out: W) -> Self {
        Self { input, out }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.out
    }

    /// Reads one trimmed, lower-cased answer. `None` at end of input.
    fn prompt(&mut self, text: &str) -> io::Result<Option<String>> {
        write!(self.out, "\n{}: ", text.cyan())?;
        self.out.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_lowercase()))
    }

    fn pause(&mut self) -> io::Result<()> {
        self.prompt("Press Enter to continue").map(|_| ())
    }

    fn success(&mut self, msg: &str) -> io::Result<()> {
        writeln!(self.out, "{}", msg.green())
    }

    fn failure(&mut self, msg: &str) -> io::Result<()> {
        writeln!(self.out, "{}", msg.red())
    }

    fn invalid(&mut self) -> io::Result<()> {
        writeln!(self.out, "{}", "Invalid choice".red())
    }
}

/// Runs the game list until the operator quits or input ends.
pub async fn run<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    storefronts: &[Storefront],
) -> io::Result<()> {
    let mut games = Vec::new();
    for (i, storefront) in storefronts.iter().enumerate() {
        games.extend(storefront.catalog.get_games().await.into_iter().map(|g| (i, g)));
    }
    if games.is_empty() {
        writeln!(console.out, "{}", "No games found.".yellow())?;
        return Ok(());
    }

    loop {
        writeln!(console.out, "\n{}", "=== Installed games ===".bold())?;
        for (n, (i, game)) in games.iter().enumerate() {
            let status = game_status(&storefronts[*i].engine, game);
            writeln!(
                console.out,
                "{}. [{}] {} ({}: {}){}",
                n + 1,
                game.platform,
                game.name.white(),
                game.platform.id_label(),
                game.id,
                status
            )?;
        }
        writeln!(console.out, "q. Quit")?;

        let Some(choice) = console.prompt("Select a game")? else {
            return Ok(());
        };
        if choice == "q" {
            return Ok(());
        }

        let picked = choice
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|n| games.get(n));
        let Some((i, game)) = picked else {
            console.invalid()?;
            continue;
        };
        if !game.is_supported() {
            console.failure(&format!(
                "{} is not supported: no {} binaries found under {}",
                game.name,
                storefronts[*i].engine.variant().name(),
                game.install_dir.display()
            ))?;
            continue;
        }

        if game_menu(console, &storefronts[*i], game).await? == Flow::Quit {
            return Ok(());
        }
    }
}

fn game_status(engine: &PatchEngine, game: &Game) -> ColoredString {
    match game.api_dir.as_deref() {
        None => " - Not Supported".red(),
        Some(dir) if engine.is_interrupted(dir) => " - Interrupted".yellow(),
        Some(dir) if engine.is_installed(dir) => " - Installed".green(),
        Some(_) => "".normal(),
    }
}

async fn game_menu<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    storefront: &Storefront,
    game: &Game,
) -> io::Result<Flow> {
    let Some(dir) = game.api_dir.as_deref() else {
        return Ok(Flow::Back);
    };
    let engine = &storefront.engine;

    let installed = engine.is_installed(dir) || engine.is_interrupted(dir);

    writeln!(console.out, "\n{} {}", "Fetching DLCs for".cyan(), game.name.white())?;
    let dlcs = match storefront.dlcs.list_dlcs(game).await {
        Some(dlcs) if !dlcs.is_empty() => dlcs,
        fetched => {
            if fetched.is_none() {
                console.failure("Failed to fetch game details")?;
            } else {
                writeln!(console.out, "{}", "No DLCs found for this game".yellow())?;
            }
            if installed {
                return uninstall_menu(console, engine, game);
            }
            console.pause()?;
            return Ok(Flow::Back);
        }
    };

    let (mut selected, mut settings) = if installed {
        let saved = engine.read_settings(dir);
        (saved.dlcs, saved.settings)
    } else {
        (BTreeSet::new(), engine.variant().default_settings())
    };

    loop {
        print_dlcs(console, game, &dlcs, &selected)?;
        writeln!(console.out, "\nEnter numbers separated by spaces to toggle")?;
        writeln!(console.out, "a. Toggle all")?;
        if installed {
            writeln!(console.out, "r. Reconfigure")?;
            writeln!(console.out, "u. Uninstall {}", engine.variant().name())?;
        } else if storefront.direct_install {
            writeln!(console.out, "i. Install {}", engine.variant().name())?;
            writeln!(console.out, "s. Settings")?;
        } else {
            writeln!(console.out, "n. Next")?;
        }
        writeln!(console.out, "b. Back")?;
        writeln!(console.out, "q. Quit")?;

        let Some(choice) = console.prompt("Choice")? else {
            return Ok(Flow::Quit);
        };
        let flow = match choice.as_str() {
            "q" => return Ok(Flow::Quit),
            "b" => return Ok(Flow::Back),
            "a" => {
                toggle_all(&dlcs, &mut selected);
                continue;
            }
            "u" if installed => {
                uninstall(console, engine, game)?;
                return Ok(Flow::Done);
            }
            "i" if !installed && storefront.direct_install => {
                apply(console, storefront, game, &selected, &settings, false).await?;
                return Ok(Flow::Done);
            }
            "r" | "n" | "s" if choice_opens_settings(&choice, installed, storefront) => {
                settings_menu(console, storefront, game, &selected, &mut settings, installed).await?
            }
            other => {
                match parse_indices(other, dlcs.len()) {
                    Some(indices) => {
                        for i in indices {
                            let id = &dlcs[i].id;
                            if !selected.remove(id) {
                                selected.insert(id.clone());
                            }
                        }
                    }
                    None => console.invalid()?,
                }
                continue;
            }
        };
        if flow != Flow::Back {
            return Ok(flow);
        }
    }
}

/// Menu for an installed game without a DLC list; only uninstall is offered.
fn uninstall_menu<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    engine: &PatchEngine,
    game: &Game,
) -> io::Result<Flow> {
    loop {
        writeln!(console.out, "u. Uninstall {}", engine.variant().name())?;
        writeln!(console.out, "b. Back")?;
        writeln!(console.out, "q. Quit")?;

        let Some(choice) = console.prompt("Choice")? else {
            return Ok(Flow::Quit);
        };
        match choice.as_str() {
            "u" => {
                uninstall(console, engine, game)?;
                return Ok(Flow::Done);
            }
            "b" => return Ok(Flow::Back),
            "q" => return Ok(Flow::Quit),
            _ => console.invalid()?,
        }
    }
}

fn choice_opens_settings(choice: &str, installed: bool, storefront: &Storefront) -> bool {
    match choice {
        "r" => installed,
        "n" => !installed && !storefront.direct_install,
        "s" => !installed && storefront.direct_install,
        _ => false,
    }
}

fn print_dlcs<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    game: &Game,
    dlcs: &[DlcInfo],
    selected: &BTreeSet<String>,
) -> io::Result<()> {
    writeln!(console.out, "\n{} {}", "=== DLCs for".bold(), game.name.bold())?;
    for (n, dlc) in dlcs.iter().enumerate() {
        let mark = if selected.contains(&dlc.id) {
            "x".green()
        } else {
            " ".normal()
        };
        writeln!(console.out, "{}. [{}] {} ({})", n + 1, mark, dlc.name, dlc.id)?;
    }
    let count = dlcs.iter().filter(|d| selected.contains(&d.id)).count();
    writeln!(console.out, "Selected: {count}/{}", dlcs.len())
}

/// Selects every listed DLC, or clears them all if all are already selected.
fn toggle_all(dlcs: &[DlcInfo], selected: &mut BTreeSet<String>) {
    if dlcs.iter().all(|d| selected.contains(&d.id)) {
        for dlc in dlcs {
            selected.remove(&dlc.id);
        }
    } else {
        selected.extend(dlcs.iter().map(|d| d.id.clone()));
    }
}

/// Parses space-separated 1-based indices into 0-based ones.
///
/// Returns `None` if any token is not a number in `1..=len`.
fn parse_indices(input: &str, len: usize) -> Option<Vec<usize>> {
    let indices: Vec<usize> = input
        .split_whitespace()
        .map(|tok| match tok.parse::<usize>() {
            Ok(n) if (1..=len).contains(&n) => Some(n - 1),
            _ => None,
        })
        .collect::<Option<_>>()?;
    (!indices.is_empty()).then_some(indices)
}

async fn settings_menu<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    storefront: &Storefront,
    game: &Game,
    selected: &BTreeSet<String>,
    settings: &mut Settings,
    installed: bool,
) -> io::Result<Flow> {
    let name = storefront.engine.variant().name();
    loop {
        writeln!(console.out, "\n{}", format!("=== {name} settings ===").bold())?;
        for (n, (toggle, value)) in settings.iter().enumerate() {
            let mark = if value { "x".green() } else { " ".normal() };
            writeln!(console.out, "{}. [{}] {}", n + 1, mark, toggle.label)?;
        }
        if installed {
            writeln!(console.out, "i. Apply changes")?;
        } else {
            writeln!(console.out, "i. Install {name}")?;
        }
        writeln!(console.out, "b. Back")?;
        writeln!(console.out, "q. Quit")?;

        let Some(choice) = console.prompt("Choice")? else {
            return Ok(Flow::Quit);
        };
        match choice.as_str() {
            "q" => return Ok(Flow::Quit),
            "b" => return Ok(Flow::Back),
            "i" => {
                apply(console, storefront, game, selected, settings, installed).await?;
                return Ok(Flow::Done);
            }
            other => {
                let flipped = other
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .is_some_and(|i| settings.flip(i));
                if !flipped {
                    console.invalid()?;
                }
            }
        }
    }
}

/// Installs, or rewrites the payload when already installed.
async fn apply<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    storefront: &Storefront,
    game: &Game,
    selected: &BTreeSet<String>,
    settings: &Settings,
    installed: bool,
) -> io::Result<()> {
    let engine = &storefront.engine;
    let name = engine.variant().name();
    let provider = storefront.provider.as_ref();

    writeln!(console.out, "\n{} {} {}", "Applying".cyan(), name, "...".cyan())?;
    let result = if installed {
        engine
            .update(game, selected, settings, provider)
            .await
            .map(|count| format!("{name} configuration updated ({count} DLCs)"))
    } else {
        engine
            .install(game, selected, settings, provider)
            .await
            .map(|report| {
                format!(
                    "{name} installed in {} ({}; {} DLCs)",
                    report.dir.display(),
                    report.swapped.join(", "),
                    report.dlc_count
                )
            })
    };

    match result {
        Ok(msg) => console.success(&msg)?,
        Err(e) => {
            error!(game = %game.name, error = %e, "operation failed");
            console.failure(&format!("Error: {e}"))?;
        }
    }
    console.pause()
}

fn uninstall<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    engine: &PatchEngine,
    game: &Game,
) -> io::Result<()> {
    let name = engine.variant().name();
    match engine.uninstall(game) {
        Ok(restored) if restored.is_empty() => {
            console.success(&format!("{name} leftovers removed"))?;
        }
        Ok(restored) => {
            console.success(&format!(
                "{name} uninstalled, restored {}",
                restored.join(", ")
            ))?;
        }
        Err(e) => {
            error!(game = %game.name, error = %e, "uninstall failed");
            console.failure(&format!("Error: {e}"))?;
        }
    }
    console.pause()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dlcpwn_model::Platform;
    use std::future::Future;
    use std::io::Cursor;
    use std::path::{Path, PathBuf};
    use std::pin::Pin;
    use tempfile::TempDir;

    struct MockCatalog(Vec<Game>);

    impl GameCatalog for MockCatalog {
        fn get_games(&self) -> Pin<Box<dyn Future<Output = Vec<Game>> + Send + '_>> {
            Box::pin(async move { self.0.clone() })
        }
    }

    /// Serves a fixed DLC list, or a failed lookup when `None`.
    struct MockStore(Option<Vec<DlcInfo>>);

    impl DlcSource for MockStore {
        fn list_dlcs<'a>(
            &'a self,
            _game: &'a Game,
        ) -> Pin<Box<dyn Future<Output = Option<Vec<DlcInfo>>> + Send + 'a>> {
            Box::pin(async move { self.0.clone() })
        }
    }

    impl MetadataProvider for MockStore {
        fn resolve<'a>(
            &'a self,
            dlc_id: &'a str,
        ) -> Pin<Box<dyn Future<Output = Option<DlcInfo>> + Send + 'a>> {
            Box::pin(async move {
                self.0
                    .as_ref()?
                    .iter()
                    .find(|d| d.id == dlc_id)
                    .cloned()
            })
        }
    }

    fn dlc(id: &str, name: &str) -> DlcInfo {
        DlcInfo {
            id: id.into(),
            name: name.into(),
            parent_id: None,
        }
    }

    fn game(platform: Platform, api_dir: Option<PathBuf>) -> Game {
        Game {
            id: "480".into(),
            name: "Spacewar".into(),
            platform,
            install_dir: PathBuf::from("/games/Spacewar"),
            api_dir,
            branch: None,
        }
    }

    /// API dir with one live binary plus payloads for both shims.
    fn setup(tmp: &TempDir, live: &str) -> (PathBuf, PathBuf) {
        let api = tmp.path().join("game");
        std::fs::create_dir_all(&api).unwrap();
        std::fs::write(api.join(live), b"original").unwrap();

        let payloads = tmp.path().join("payloads");
        for (sub, names) in [
            ("cream_api", ["steam_api.dll", "steam_api64.dll"]),
            ("scream_api", ["EOSSDK-Win32-Shipping.dll", "EOSSDK-Win64-Shipping.dll"]),
        ] {
            std::fs::create_dir_all(payloads.join(sub)).unwrap();
            for name in names {
                std::fs::write(payloads.join(sub).join(name), b"shim").unwrap();
            }
        }
        (api, payloads)
    }

    fn storefront(
        games: Vec<Game>,
        dlcs: Option<Vec<DlcInfo>>,
        engine: PatchEngine,
        direct_install: bool,
    ) -> Storefront {
        let store = Arc::new(MockStore(dlcs));
        Storefront {
            catalog: Box::new(MockCatalog(games)),
            dlcs: store.clone(),
            provider: store,
            engine,
            direct_install,
        }
    }

    async fn drive(storefronts: &[Storefront], script: &str) -> String {
        colored::control::set_override(false);
        let mut console = Console::new(Cursor::new(script.as_bytes().to_vec()), Vec::new());
        run(&mut console, storefronts).await.unwrap();
        String::from_utf8(console.into_output()).unwrap()
    }

    #[test]
    fn parse_indices_accepts_only_valid_lists() {
        assert_eq!(parse_indices("1 3", 3), Some(vec![0, 2]));
        assert_eq!(parse_indices("  2  ", 3), Some(vec![1]));
        assert_eq!(parse_indices("0", 3), None);
        assert_eq!(parse_indices("4", 3), None);
        assert_eq!(parse_indices("1 x", 3), None);
        assert_eq!(parse_indices("", 3), None);
    }

    #[test]
    fn toggle_all_selects_then_clears() {
        let dlcs = vec![dlc("1", "A"), dlc("2", "B")];
        let mut selected = BTreeSet::from(["1".to_string()]);
        toggle_all(&dlcs, &mut selected);
        assert_eq!(selected.len(), 2);
        toggle_all(&dlcs, &mut selected);
        assert!(selected.is_empty());
    }

    #[tokio::test]
    async fn steam_install_through_settings_menu() {
        let tmp = TempDir::new().unwrap();
        let (api, payloads) = setup(&tmp, "steam_api64.dll");
        let storefronts = vec![storefront(
            vec![game(Platform::Steam, Some(api.clone()))],
            Some(vec![dlc("100", "Soundtrack"), dlc("200", "Artbook")]),
            PatchEngine::cream(&payloads),
            false,
        )];

        // game 1, toggle dlc 1, next, toggle extra protection, install, continue, quit
        let out = drive(&storefronts, "1\n1\nn\n1\ni\n\nq\n").await;

        assert!(out.contains("CreamAPI installed in"), "{out}");
        assert!(out.contains("Spacewar (AppID: 480) - Installed"), "{out}");
        assert_eq!(std::fs::read(api.join("steam_api64_o.dll")).unwrap(), b"original");

        let ini = std::fs::read_to_string(api.join("cream_api.ini")).unwrap();
        assert!(ini.contains("extraprotection = true"));
        assert!(ini.ends_with("[dlc]\n100 = Soundtrack"));
    }

    #[tokio::test]
    async fn installed_game_can_be_uninstalled() {
        let tmp = TempDir::new().unwrap();
        let (api, payloads) = setup(&tmp, "steam_api.dll");
        let engine = PatchEngine::cream(&payloads);
        let g = game(Platform::Steam, Some(api.clone()));
        let provider = MockStore(Some(vec![dlc("100", "Soundtrack")]));
        engine
            .install(
                &g,
                &BTreeSet::from(["100".to_string()]),
                &engine.variant().default_settings(),
                &provider,
            )
            .await
            .unwrap();

        let storefronts = vec![storefront(
            vec![g],
            Some(vec![dlc("100", "Soundtrack")]),
            engine,
            false,
        )];
        let out = drive(&storefronts, "1\nu\n\nq\n").await;

        assert!(out.contains("1. [x] Soundtrack (100)"), "{out}");
        assert!(out.contains("CreamAPI uninstalled, restored 32-bit"), "{out}");
        assert!(!api.join("steam_api_o.dll").exists());
        assert!(!api.join("cream_api.ini").exists());
        assert_eq!(std::fs::read(api.join("steam_api.dll")).unwrap(), b"original");
    }

    #[tokio::test]
    async fn installed_game_uninstalls_without_dlc_list() {
        for (label, listing) in [("failed lookup", None), ("empty list", Some(Vec::new()))] {
            let tmp = TempDir::new().unwrap();
            let (api, payloads) = setup(&tmp, "steam_api64.dll");
            let engine = PatchEngine::cream(&payloads);
            let g = game(Platform::Steam, Some(api.clone()));
            engine
                .install(
                    &g,
                    &BTreeSet::from(["100".to_string()]),
                    &engine.variant().default_settings(),
                    &MockStore(Some(vec![dlc("100", "Soundtrack")])),
                )
                .await
                .unwrap();

            let storefronts = vec![storefront(vec![g], listing, engine, false)];
            let out = drive(&storefronts, "1\nu\n\nq\n").await;

            assert!(out.contains("u. Uninstall CreamAPI"), "{label}: {out}");
            assert!(out.contains("CreamAPI uninstalled"), "{label}: {out}");
            assert!(!api.join("steam_api64_o.dll").exists(), "{label}");
            assert!(!api.join("cream_api.ini").exists(), "{label}");
            assert_eq!(std::fs::read(api.join("steam_api64.dll")).unwrap(), b"original");
        }
    }

    #[tokio::test]
    async fn epic_installs_directly() {
        let tmp = TempDir::new().unwrap();
        let (api, payloads) = setup(&tmp, "EOSSDK-Win64-Shipping.dll");
        let storefronts = vec![storefront(
            vec![game(Platform::Epic, Some(api.clone()))],
            Some(vec![dlc("item-a", "Pack A"), dlc("item-b", "Pack B")]),
            PatchEngine::scream(&payloads),
            true,
        )];

        let out = drive(&storefronts, "1\na\ni\n\nq\n").await;

        assert!(out.contains("ScreamAPI installed in"), "{out}");
        let json = std::fs::read_to_string(api.join("ScreamAPI.json")).unwrap();
        assert!(json.contains("\"item-a\"") && json.contains("\"item-b\""));
    }

    #[tokio::test]
    async fn unsupported_and_failed_lookups_are_reported() {
        let tmp = TempDir::new().unwrap();
        let (api, payloads) = setup(&tmp, "steam_api.dll");
        let mut unsupported = game(Platform::Steam, None);
        unsupported.name = "Broken".into();
        let storefronts = vec![storefront(
            vec![unsupported, game(Platform::Steam, Some(api.clone()))],
            None,
            PatchEngine::cream(&payloads),
            false,
        )];

        let out = drive(&storefronts, "1\n2\n\n9\nq\n").await;

        assert!(out.contains("Broken (AppID: 480) - Not Supported"), "{out}");
        assert!(out.contains("Broken is not supported"), "{out}");
        assert!(out.contains("Failed to fetch game details"), "{out}");
        assert!(out.contains("Invalid choice"), "{out}");
        assert!(!api.join("steam_api_o.dll").exists());
    }

    #[tokio::test]
    async fn quit_from_a_submenu_ends_the_shell() {
        let tmp = TempDir::new().unwrap();
        let (api, payloads) = setup(&tmp, "steam_api.dll");
        let storefronts = vec![storefront(
            vec![game(Platform::Steam, Some(api))],
            Some(vec![dlc("100", "Soundtrack")]),
            PatchEngine::cream(&payloads),
            false,
        )];

        // Quitting from the settings menu must not fall back to the game list.
        let out = drive(&storefronts, "1\nn\nq\n1\n").await;
        assert_eq!(out.matches("=== Installed games ===").count(), 1, "{out}");
    }

    #[tokio::test]
    async fn end_of_input_quits() {
        let storefronts = vec![storefront(
            vec![game(Platform::Steam, Some(Path::new("/nonexistent").to_path_buf()))],
            Some(Vec::new()),
            PatchEngine::cream(Path::new("/nonexistent")),
            false,
        )];
        let out = drive(&storefronts, "").await;
        assert!(out.contains("Select a game"));
    }
}
