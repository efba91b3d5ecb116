//! Install, update and uninstall of a patch variant in a game's API directory.
//!
//! # Install
//!
//! 1. **Check** journal, backups, live binaries and shims; nothing is touched
//!    if any check fails.
//! 2. **Stage** the payload and shim copies next to their final paths.
//! 3. **Journal** the slots about to be swapped.
//! 4. **Commit** per slot: live to backup, staged shim to live; then the
//!    staged payload into place and the journal is removed.
//!
//! A failed commit is rolled back in-process. If the rollback fails too,
//! the journal stays behind and [`PatchEngine::uninstall`] repairs the
//! directory from it.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use dlcpwn_file_ops::{copy_preserving, remove_if_exists, staging_path, write_atomic};
use dlcpwn_model::{Game, MetadataProvider};
use tracing::{debug, error, info, warn};

use crate::cream::CreamApi;
use crate::error::PatchError;
use crate::journal::Journal;
use crate::scream::ScreamApi;
use crate::variant::{BinarySlot, DlcEntry, PatchVariant, SavedConfig, Settings};

/// Outcome of a successful install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub dir: PathBuf,
    /// Labels of the slots that now hold the shim.
    pub swapped: Vec<&'static str>,
    /// DLC entries written to the payload.
    pub dlc_count: usize,
}

/// A completed commit step, undone in reverse on failure.
#[derive(Debug, Clone, Copy)]
enum Step {
    BackedUp(&'static BinarySlot),
    Swapped(&'static BinarySlot),
}

/// Applies one [`PatchVariant`] using shims from a payload directory.
pub struct PatchEngine {
    variant: Box<dyn PatchVariant>,
    shim_dir: PathBuf,
}

impl PatchEngine {
    /// Creates an engine reading shims from `<payload_dir>/<variant subdir>`.
    pub fn new(variant: impl PatchVariant + 'static, payload_dir: &Path) -> Self {
        let shim_dir = payload_dir.join(variant.payload_subdir());
        Self {
            variant: Box::new(variant),
            shim_dir,
        }
    }

    pub fn cream(payload_dir: &Path) -> Self {
        Self::new(CreamApi, payload_dir)
    }

    pub fn scream(payload_dir: &Path) -> Self {
        Self::new(ScreamApi, payload_dir)
    }

    pub fn variant(&self) -> &dyn PatchVariant {
        self.variant.as_ref()
    }

    pub fn shim_dir(&self) -> &Path {
        &self.shim_dir
    }

    /// Returns true if any backup binary exists in `dir`.
    pub fn is_installed(&self, dir: &Path) -> bool {
        self.variant
            .slots()
            .iter()
            .any(|slot| dir.join(slot.backup()).is_file())
    }

    /// Returns true if an install in `dir` was cut short.
    pub fn is_interrupted(&self, dir: &Path) -> bool {
        Journal::exists(dir)
    }

    /// Reads the settings and DLC selection from the payload in `dir`.
    ///
    /// Returns defaults when there is no payload.
    pub fn read_settings(&self, dir: &Path) -> SavedConfig {
        let path = dir.join(self.variant.config_file_name());
        match fs::read_to_string(&path) {
            Ok(content) => self.variant.parse_payload(&content),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "no readable payload, using defaults");
                SavedConfig {
                    settings: self.variant.default_settings(),
                    dlcs: BTreeSet::new(),
                }
            }
        }
    }

    /// Generates the payload for `selection`.
    ///
    /// For variants that need DLC names, each id is resolved through
    /// `provider` and ids without a name are dropped.
    pub async fn build_payload(
        &self,
        game_id: &str,
        selection: &BTreeSet<String>,
        settings: &Settings,
        provider: &dyn MetadataProvider,
    ) -> Result<(String, usize), PatchError> {
        let mut entries = Vec::with_capacity(selection.len());
        for id in selection {
            if !self.variant.wants_dlc_names() {
                entries.push(DlcEntry {
                    id: id.clone(),
                    name: None,
                });
                continue;
            }
            match provider.resolve(id).await {
                Some(info) if !info.name.is_empty() => entries.push(DlcEntry {
                    id: id.clone(),
                    name: Some(info.name),
                }),
                _ => debug!(dlc_id = %id, "dropping dlc without a name"),
            }
        }
        let payload = self.variant.render_payload(game_id, &entries, settings)?;
        Ok((payload, entries.len()))
    }

    /// Backs up the live binaries, swaps in the shims and writes the payload.
    pub async fn install(
        &self,
        game: &Game,
        selection: &BTreeSet<String>,
        settings: &Settings,
        provider: &dyn MetadataProvider,
    ) -> Result<InstallReport, PatchError> {
        let dir = api_dir(game)?;
        if Journal::exists(dir) {
            return Err(PatchError::InterruptedInstall(dir.to_path_buf()));
        }
        if self.is_installed(dir) {
            return Err(PatchError::AlreadyInstalled(dir.to_path_buf()));
        }

        let present: Vec<&'static BinarySlot> = self
            .variant
            .slots()
            .iter()
            .filter(|slot| dir.join(slot.live).is_file())
            .collect();
        if present.is_empty() {
            return Err(PatchError::NoTargetBinaries(dir.to_path_buf()));
        }
        for slot in &present {
            let shim = self.shim_dir.join(slot.live);
            if !shim.is_file() {
                return Err(PatchError::MissingPatchBinary(shim));
            }
        }

        let (payload, dlc_count) = self
            .build_payload(&game.id, selection, settings, provider)
            .await?;

        if let Err(e) = self.stage(dir, &present, &payload) {
            self.discard_staged(dir);
            return Err(e);
        }

        let journal = Journal {
            slots: present.iter().map(|s| s.live.to_string()).collect(),
        };
        if let Err(e) = journal.write(dir) {
            self.discard_staged(dir);
            return Err(e);
        }

        self.commit(dir, &present)?;
        if let Err(e) = Journal::remove(dir) {
            warn!(dir = %dir.display(), error = %e, "install complete but journal not removed");
        }

        info!(
            variant = self.variant.name(),
            game = %game.name,
            dir = %dir.display(),
            dlcs = dlc_count,
            "installed"
        );
        Ok(InstallReport {
            dir: dir.to_path_buf(),
            swapped: present.iter().map(|s| s.label).collect(),
            dlc_count,
        })
    }

    /// Rewrites the payload of an installed patch. Binaries are untouched.
    pub async fn update(
        &self,
        game: &Game,
        selection: &BTreeSet<String>,
        settings: &Settings,
        provider: &dyn MetadataProvider,
    ) -> Result<usize, PatchError> {
        let dir = api_dir(game)?;
        if Journal::exists(dir) {
            return Err(PatchError::InterruptedInstall(dir.to_path_buf()));
        }
        if !self.is_installed(dir) {
            return Err(PatchError::NotInstalled(dir.to_path_buf()));
        }

        let (payload, dlc_count) = self
            .build_payload(&game.id, selection, settings, provider)
            .await?;
        write_atomic(&dir.join(self.variant.config_file_name()), payload.as_bytes())?;

        info!(variant = self.variant.name(), game = %game.name, dlcs = dlc_count, "payload updated");
        Ok(dlc_count)
    }

    /// Restores the original binaries and removes the payload.
    ///
    /// Also repairs a directory left behind by an interrupted install.
    /// Returns the labels of the restored slots.
    pub fn uninstall(&self, game: &Game) -> Result<Vec<&'static str>, PatchError> {
        let dir = api_dir(game)?;
        let interrupted = Journal::exists(dir);
        if !interrupted && !self.is_installed(dir) {
            return Err(PatchError::NotInstalled(dir.to_path_buf()));
        }
        if interrupted {
            let slots = Journal::load(dir).map(|j| j.slots).unwrap_or_default();
            warn!(dir = %dir.display(), ?slots, "repairing interrupted install");
        }

        remove_if_exists(&dir.join(self.variant.config_file_name()))?;

        let mut restored = Vec::new();
        for slot in self.variant.slots() {
            let backup = dir.join(slot.backup());
            if !backup.is_file() {
                continue;
            }
            let live = dir.join(slot.live);
            remove_if_exists(&live)?;
            fs::rename(&backup, &live)?;
            restored.push(slot.label);
        }

        self.discard_staged(dir);
        Journal::remove(dir)?;

        info!(variant = self.variant.name(), game = %game.name, "uninstalled");
        Ok(restored)
    }

    fn stage(
        &self,
        dir: &Path,
        present: &[&'static BinarySlot],
        payload: &str,
    ) -> Result<(), PatchError> {
        let config = dir.join(self.variant.config_file_name());
        fs::write(staging_path(&config), payload)?;
        for slot in present {
            copy_preserving(
                &self.shim_dir.join(slot.live),
                &staging_path(&dir.join(slot.live)),
            )?;
        }
        Ok(())
    }

    fn commit(&self, dir: &Path, present: &[&'static BinarySlot]) -> Result<(), PatchError> {
        let mut done = Vec::with_capacity(present.len() * 2);
        let Err(e) = self.apply(dir, present, &mut done) else {
            return Ok(());
        };

        error!(dir = %dir.display(), error = %e, "install failed, rolling back");
        match rollback(dir, &done) {
            Ok(()) => {
                self.discard_staged(dir);
                if let Err(e) = Journal::remove(dir) {
                    warn!(dir = %dir.display(), error = %e, "failed to remove journal");
                }
            }
            Err(rb) => {
                error!(dir = %dir.display(), error = %rb, "rollback failed, journal kept for repair");
            }
        }
        Err(e)
    }

    fn apply(
        &self,
        dir: &Path,
        present: &[&'static BinarySlot],
        done: &mut Vec<Step>,
    ) -> Result<(), PatchError> {
        for &slot in present {
            let live = dir.join(slot.live);
            fs::rename(&live, dir.join(slot.backup()))?;
            done.push(Step::BackedUp(slot));
            fs::rename(staging_path(&live), &live)?;
            done.push(Step::Swapped(slot));
            debug!(slot = slot.label, "swapped");
        }
        let config = dir.join(self.variant.config_file_name());
        fs::rename(staging_path(&config), &config)?;
        Ok(())
    }

    fn discard_staged(&self, dir: &Path) {
        let config = dir.join(self.variant.config_file_name());
        let staged = self
            .variant
            .slots()
            .iter()
            .map(|slot| staging_path(&dir.join(slot.live)))
            .chain(std::iter::once(staging_path(&config)));
        for path in staged {
            if let Err(e) = remove_if_exists(&path) {
                warn!(path = %path.display(), error = %e, "failed to remove staged file");
            }
        }
    }
}

fn rollback(dir: &Path, done: &[Step]) -> std::io::Result<()> {
    for step in done.iter().rev() {
        match *step {
            Step::Swapped(slot) => {
                remove_if_exists(&dir.join(slot.live))?;
            }
            Step::BackedUp(slot) => {
                fs::rename(dir.join(slot.backup()), dir.join(slot.live))?;
            }
        }
    }
    Ok(())
}

fn api_dir(game: &Game) -> Result<&Path, PatchError> {
    game.api_dir
        .as_deref()
        .ok_or_else(|| PatchError::DirectoryNotFound(game.install_dir.clone()))
}
