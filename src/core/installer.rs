//! Install orchestration
//!
//! Ties platform resolution, storage checks, the download engine, and
//! config generation into one state machine per software: check existing →
//! confirm update → check storage → download/extract on a worker thread →
//! post-install configuration. The initiating context never blocks on the
//! network; everything user-visible flows through the FIFO progress
//! channel, drained by the caller on its own cadence.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::core::artifact::{ReleaseArtifact, ReleaseCatalog, SoftwareId};
use crate::core::download::{CancelFlag, Downloader, ProgressMessage};
use crate::core::nodeconf;
use crate::core::paths::Paths;
use crate::core::platform::PlatformTag;
use crate::core::storage::{self, InstallStrategy, MIN_INSTALL_GB};
use crate::error::{MelaninError, Result};

/// Installation state, derived from the filesystem on every query and
/// never cached. Directory presence implies the pinned catalog version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallState {
    NotInstalled,
    Installed,
}

/// Derive the install state for a software by inspecting its directory.
/// All callers share this one derivation rule.
pub fn inspect(paths: &Paths, software: SoftwareId) -> InstallState {
    if paths.install_dir(software).exists() {
        InstallState::Installed
    } else {
        InstallState::NotInstalled
    }
}

/// Terminal outcome of a background install run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    Completed,
    Cancelled,
    Failed,
}

/// What `begin_install` decided to do.
#[derive(Debug)]
pub enum InstallLaunch {
    /// An installation already exists and the update was declined; nothing
    /// was written and dependent operations stay available.
    AlreadyInstalled,
    /// A worker thread is downloading; drain `InstallHandle::messages`.
    Started(InstallHandle),
}

/// Handle to an in-flight install run.
#[derive(Debug)]
pub struct InstallHandle {
    pub messages: Receiver<ProgressMessage>,
    pub cancel: CancelFlag,
    worker: JoinHandle<InstallOutcome>,
}

impl InstallHandle {
    /// Wait for the worker to finish. The message channel is closed by the
    /// time this returns.
    pub fn wait(self) -> InstallOutcome {
        match self.worker.join() {
            Ok(outcome) => outcome,
            Err(_) => InstallOutcome::Failed,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }
}

/// One busy bit per software: at most one live install attempt per
/// SoftwareId, while different software install independently.
#[derive(Debug, Default)]
struct InFlight {
    bitcoin: AtomicBool,
    whive: AtomicBool,
}

impl InFlight {
    fn flag(&self, software: SoftwareId) -> &AtomicBool {
        match software {
            SoftwareId::Bitcoin => &self.bitcoin,
            SoftwareId::Whive => &self.whive,
        }
    }

    fn try_acquire(&self, software: SoftwareId) -> bool {
        self.flag(software)
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    fn release(&self, software: SoftwareId) {
        self.flag(software).store(false, Ordering::SeqCst);
    }
}

pub struct Orchestrator {
    paths: Paths,
    catalog: ReleaseCatalog,
    platform: PlatformTag,
    in_flight: Arc<InFlight>,
}

impl Orchestrator {
    pub fn new(paths: Paths, catalog: ReleaseCatalog, platform: PlatformTag) -> Self {
        Orchestrator {
            paths,
            catalog,
            platform,
            in_flight: Arc::new(InFlight::default()),
        }
    }

    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    pub fn catalog(&self) -> &ReleaseCatalog {
        &self.catalog
    }

    pub fn platform(&self) -> PlatformTag {
        self.platform
    }

    pub fn inspect(&self, software: SoftwareId) -> InstallState {
        inspect(&self.paths, software)
    }

    /// Run the pre-download part of the state machine and, if everything
    /// gates through, hand the download to a worker thread.
    ///
    /// `confirm_update` is consulted only when an installation already
    /// exists; declining routes straight back without touching the
    /// filesystem. An insufficient-space verdict is returned as an error
    /// before any thread is spawned.
    pub fn begin_install(
        &self,
        software: SoftwareId,
        confirm_update: impl FnOnce() -> bool,
    ) -> Result<InstallLaunch> {
        let free_bytes = storage::free_space(self.paths.home()).unwrap_or(0);
        self.start(software, free_bytes, confirm_update)
    }

    fn start(
        &self,
        software: SoftwareId,
        free_bytes: u64,
        confirm_update: impl FnOnce() -> bool,
    ) -> Result<InstallLaunch> {
        if !self.in_flight.try_acquire(software) {
            return Err(MelaninError::AlreadyInstalling {
                software: software.display_name().to_string(),
            });
        }
        // Release on every early return below; the worker releases the
        // flag itself once spawned.
        let launch = self.start_acquired(software, free_bytes, confirm_update);
        match &launch {
            Ok(InstallLaunch::Started(_)) => {}
            _ => self.in_flight.release(software),
        }
        launch
    }

    fn start_acquired(
        &self,
        software: SoftwareId,
        free_bytes: u64,
        confirm_update: impl FnOnce() -> bool,
    ) -> Result<InstallLaunch> {
        if self.inspect(software) == InstallState::Installed && !confirm_update() {
            log::info!("Keeping existing {} installation", software.key());
            return Ok(InstallLaunch::AlreadyInstalled);
        }

        let free_gb = storage::to_gb(free_bytes);
        let strategy = storage::classify(free_bytes, software);
        if strategy == InstallStrategy::Insufficient {
            return Err(MelaninError::InsufficientSpace {
                available_gb: free_gb,
                required_gb: MIN_INSTALL_GB,
            });
        }

        let artifact = self.catalog.artifact_for(software, self.platform);
        let (tx, rx) = mpsc::channel();
        let cancel = CancelFlag::new();

        let detected = match (software, strategy) {
            (SoftwareId::Bitcoin, InstallStrategy::Full) => format!(
                "Detected {free_gb:.2} GB free space. Installing full node support."
            ),
            (SoftwareId::Bitcoin, _) => format!(
                "Detected {free_gb:.2} GB free space. Installing with pruned mode support."
            ),
            (SoftwareId::Whive, _) => {
                format!("Detected {free_gb:.2} GB free space. Installing Whive Core.")
            }
        };
        let _ = tx.send(ProgressMessage::info(detected));

        let worker = self.spawn_worker(software, artifact, tx, cancel.clone());
        Ok(InstallLaunch::Started(InstallHandle {
            messages: rx,
            cancel,
            worker,
        }))
    }

    fn spawn_worker(
        &self,
        software: SoftwareId,
        artifact: ReleaseArtifact,
        tx: Sender<ProgressMessage>,
        cancel: CancelFlag,
    ) -> JoinHandle<InstallOutcome> {
        let paths = self.paths.clone();
        let platform = self.platform;
        let in_flight = Arc::clone(&self.in_flight);

        std::thread::spawn(move || {
            let outcome = run_install(&paths, platform, software, &artifact, &tx, &cancel);
            in_flight.release(software);
            outcome
        })
    }
}

fn run_install(
    paths: &Paths,
    platform: PlatformTag,
    software: SoftwareId,
    artifact: &ReleaseArtifact,
    tx: &Sender<ProgressMessage>,
    cancel: &CancelFlag,
) -> InstallOutcome {
    let _ = tx.send(ProgressMessage::info(format!(
        "Downloading {} for {}...",
        software.key(),
        platform.describe()
    )));

    let downloader = match Downloader::new() {
        Ok(d) => d,
        Err(e) => {
            let _ = tx.send(ProgressMessage::error(format!(
                "Failed to install {}: {e}",
                software.display_name()
            )));
            return InstallOutcome::Failed;
        }
    };

    let dest = paths.install_dir(software);
    match downloader.install(artifact, &dest, tx, cancel) {
        Ok(()) => {
            if software == SoftwareId::Bitcoin {
                write_default_configs(paths, platform, tx);
            }
            InstallOutcome::Completed
        }
        Err(MelaninError::Cancelled) => InstallOutcome::Cancelled,
        Err(_) => InstallOutcome::Failed,
    }
}

/// Post-install configuration for Bitcoin: both network-mode variants are
/// written when absent, so `run` never has to generate one later. Existing
/// files are the user's and are left untouched.
fn write_default_configs(paths: &Paths, platform: PlatformTag, tx: &Sender<ProgressMessage>) {
    for pruned in [false, true] {
        let conf_path = paths.bitcoin_conf_path(pruned);
        if conf_path.exists() {
            continue;
        }
        match nodeconf::write_node_config(&conf_path, pruned, platform) {
            Ok(()) => {
                let _ = tx.send(ProgressMessage::info(format!(
                    "Created bitcoin.conf at {}",
                    conf_path.display()
                )));
            }
            Err(e) => {
                let _ = tx.send(ProgressMessage::error(format!(
                    "Failed to write {}: {e}",
                    conf_path.display()
                )));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::platform::PlatformTag;
    use std::path::Path;

    const GB: u64 = 1_000_000_000;

    fn orchestrator(home: &Path) -> Orchestrator {
        Orchestrator::new(
            Paths::with_home(home.to_path_buf()),
            ReleaseCatalog::default(),
            PlatformTag::LinuxX86_64,
        )
    }

    fn snapshot(dir: &Path) -> Vec<std::path::PathBuf> {
        let mut entries: Vec<_> = walk(dir);
        entries.sort();
        entries
    }

    fn walk(dir: &Path) -> Vec<std::path::PathBuf> {
        let mut out = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    out.extend(walk(&path));
                }
                out.push(path);
            }
        }
        out
    }

    #[test]
    fn test_inspect_derives_from_directory_presence() {
        let tmp = tempfile::tempdir().unwrap();
        let orch = orchestrator(tmp.path());

        assert_eq!(orch.inspect(SoftwareId::Bitcoin), InstallState::NotInstalled);
        std::fs::create_dir_all(tmp.path().join("bitcoin-core")).unwrap();
        assert_eq!(orch.inspect(SoftwareId::Bitcoin), InstallState::Installed);
        // Independent per software.
        assert_eq!(orch.inspect(SoftwareId::Whive), InstallState::NotInstalled);
    }

    #[test]
    fn test_declined_update_writes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let orch = orchestrator(tmp.path());
        std::fs::create_dir_all(tmp.path().join("bitcoin-core/bitcoin-28.2/bin")).unwrap();

        let before = snapshot(tmp.path());
        let launch = orch
            .start(SoftwareId::Bitcoin, 700 * GB, || false)
            .unwrap();

        assert!(matches!(launch, InstallLaunch::AlreadyInstalled));
        assert_eq!(snapshot(tmp.path()), before);
        // A later install attempt is not blocked.
        assert!(orch.in_flight.try_acquire(SoftwareId::Bitcoin));
    }

    #[test]
    fn test_confirm_callback_skipped_when_not_installed() {
        let tmp = tempfile::tempdir().unwrap();
        let orch = orchestrator(tmp.path());

        // 5 GB: rejected at the storage gate, so the callback must not have
        // been consulted (nothing is installed yet).
        let err = orch
            .start(SoftwareId::Bitcoin, 5 * GB, || {
                panic!("confirm_update consulted with no existing install")
            })
            .unwrap_err();
        assert!(matches!(err, MelaninError::InsufficientSpace { .. }));
    }

    #[test]
    fn test_insufficient_space_rejected_before_worker() {
        let tmp = tempfile::tempdir().unwrap();
        let orch = orchestrator(tmp.path());

        let err = orch.start(SoftwareId::Whive, 5 * GB, || true).unwrap_err();
        match err {
            MelaninError::InsufficientSpace {
                available_gb,
                required_gb,
            } => {
                assert!(available_gb < 6.0);
                assert_eq!(required_gb, MIN_INSTALL_GB);
            }
            other => panic!("unexpected error: {other}"),
        }
        // No worker ran: the home directory is untouched and the busy bit
        // was released.
        assert!(snapshot(tmp.path()).is_empty());
        assert!(orch.in_flight.try_acquire(SoftwareId::Whive));
    }

    #[test]
    fn test_second_install_of_same_software_refused() {
        let tmp = tempfile::tempdir().unwrap();
        let orch = orchestrator(tmp.path());

        assert!(orch.in_flight.try_acquire(SoftwareId::Bitcoin));
        let err = orch
            .start(SoftwareId::Bitcoin, 700 * GB, || true)
            .unwrap_err();
        assert!(matches!(err, MelaninError::AlreadyInstalling { .. }));

        // A different software is independent.
        assert!(orch.in_flight.try_acquire(SoftwareId::Whive));
        orch.in_flight.release(SoftwareId::Bitcoin);
        orch.in_flight.release(SoftwareId::Whive);
    }

    #[test]
    fn test_write_default_configs_preserves_existing() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = Paths::with_home(tmp.path().to_path_buf());
        let (tx, rx) = mpsc::channel();

        let mainnet = paths.bitcoin_conf_path(false);
        std::fs::create_dir_all(mainnet.parent().unwrap()).unwrap();
        std::fs::write(&mainnet, "daemon=0\n").unwrap();

        write_default_configs(&paths, PlatformTag::MacOsArm64, &tx);

        // Existing mainnet file untouched, pruned variant created.
        assert_eq!(std::fs::read_to_string(&mainnet).unwrap(), "daemon=0\n");
        let pruned = std::fs::read_to_string(paths.bitcoin_conf_path(true)).unwrap();
        assert!(pruned.contains("prune=550"));
        assert!(pruned.contains("dbcache=800"));
        assert!(pruned.contains("par=4"));

        let texts: Vec<String> = rx.try_iter().map(|m| m.text).collect();
        assert_eq!(texts.len(), 1);
        assert!(texts[0].contains("pruned"));
    }
}
