//! Download & extract engine
//!
//! Streams a release artifact to a temporary file inside the destination,
//! reporting whole-percent progress and honoring cooperative cancellation,
//! then unpacks the archive and marks the payload executable.
//!
//! Cancellation is polled between chunks and after completion; it cannot
//! interrupt an in-flight network read, and no transfer timeout is applied,
//! so a stalled download blocks its worker thread until data flows again.

use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use tar::Archive;
use zip::ZipArchive;

use crate::core::artifact::{ArchiveFormat, ReleaseArtifact, SoftwareId};
use crate::core::discovery;
use crate::error::{MelaninError, Result};
use crate::utils::fs as fs_utils;

const CHUNK_SIZE: usize = 64 * 1024;

/// Severity tag attached to a progress message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

/// One line of user-visible progress, queued by the worker and drained by
/// the caller. Ordering within a single install run is FIFO.
#[derive(Debug, Clone)]
pub struct ProgressMessage {
    pub text: String,
    pub severity: Severity,
}

impl ProgressMessage {
    pub fn info<S: Into<String>>(text: S) -> Self {
        ProgressMessage {
            text: text.into(),
            severity: Severity::Info,
        }
    }

    pub fn success<S: Into<String>>(text: S) -> Self {
        ProgressMessage {
            text: text.into(),
            severity: Severity::Success,
        }
    }

    pub fn error<S: Into<String>>(text: S) -> Self {
        ProgressMessage {
            text: text.into(),
            severity: Severity::Error,
        }
    }
}

/// Shared cancellation flag, set by the caller and polled by the engine.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Progress messages are best-effort: a dropped receiver must not abort a
/// download that is otherwise healthy.
fn send(progress: &Sender<ProgressMessage>, message: ProgressMessage) {
    let _ = progress.send(message);
}

pub struct Downloader {
    client: reqwest::blocking::Client,
}

impl Downloader {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("melanin-click/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Downloader { client })
    }

    /// Download and unpack `artifact` into `dest`.
    ///
    /// On success the destination holds the extracted tree with executable
    /// bits set and the temporary archive removed. On cancellation or
    /// failure the temporary archive is removed, an error-severity message
    /// is emitted, and the error is returned; whatever the extraction
    /// already wrote stays on disk (re-running the install overwrites it).
    pub fn install(
        &self,
        artifact: &ReleaseArtifact,
        dest: &Path,
        progress: &Sender<ProgressMessage>,
        cancel: &CancelFlag,
    ) -> Result<()> {
        let software = artifact.software;
        let temp_path = dest.join(format!("{}{}", software.key(), artifact.format.extension()));

        let result = self.run_install(artifact, dest, &temp_path, progress, cancel);

        if let Err(ref e) = result {
            if temp_path.exists() {
                let _ = std::fs::remove_file(&temp_path);
            }
            match e {
                MelaninError::Cancelled => {
                    log::info!("{} install cancelled", software.key());
                    send(progress, ProgressMessage::error("Installation cancelled."));
                }
                _ => {
                    log::error!("{} install failed: {e}", software.key());
                    send(
                        progress,
                        ProgressMessage::error(format!(
                            "Failed to install {}: {e}",
                            software.display_name()
                        )),
                    );
                }
            }
        }
        result
    }

    fn run_install(
        &self,
        artifact: &ReleaseArtifact,
        dest: &Path,
        temp_path: &Path,
        progress: &Sender<ProgressMessage>,
        cancel: &CancelFlag,
    ) -> Result<()> {
        let software = artifact.software;
        fs_utils::ensure_dir_exists(dest)?;

        if cancel.is_cancelled() {
            return Err(MelaninError::Cancelled);
        }

        self.download_to_file(&artifact.url, temp_path, progress, cancel)
            .map_err(|e| match e {
                MelaninError::Cancelled => MelaninError::Cancelled,
                other => {
                    log::error!("Download of {} failed: {other}", artifact.url);
                    MelaninError::DownloadError {
                        url: artifact.url.clone(),
                    }
                }
            })?;

        // Checked again after completion: a flag set during the last chunk
        // must still stop the install before anything becomes executable.
        if cancel.is_cancelled() {
            return Err(MelaninError::Cancelled);
        }

        send(
            progress,
            ProgressMessage::info(format!("Extracting {}...", software.key())),
        );
        self.extract_archive(temp_path, artifact.format, dest)
            .map_err(|_| MelaninError::ExtractionError {
                path: temp_path.to_path_buf(),
            })?;

        std::fs::remove_file(temp_path)?;

        mark_binaries_executable(dest, software);

        send(
            progress,
            ProgressMessage::success(format!(
                "{} {} installed successfully!",
                software.display_name(),
                artifact.version
            )),
        );
        Ok(())
    }

    fn download_to_file(
        &self,
        url: &str,
        dest: &Path,
        progress: &Sender<ProgressMessage>,
        cancel: &CancelFlag,
    ) -> Result<()> {
        log::info!("Downloading {url}");
        let mut response = self.client.get(url).send()?.error_for_status()?;
        let total_bytes = response.content_length();

        let mut file = File::create(dest)?;
        let mut buf = [0u8; CHUNK_SIZE];
        let mut downloaded: u64 = 0;
        let mut last_percent: Option<u64> = None;

        loop {
            let n = response.read(&mut buf)?;
            if n == 0 {
                break;
            }
            file.write_all(&buf[..n])?;
            downloaded += n as u64;

            if cancel.is_cancelled() {
                return Err(MelaninError::Cancelled);
            }

            // Percentage updates only when the server declared a length.
            if let Some(total) = total_bytes {
                if total > 0 {
                    let percent = downloaded * 100 / total;
                    if last_percent != Some(percent) {
                        last_percent = Some(percent);
                        send(
                            progress,
                            ProgressMessage::info(format!("Downloading: {percent}%")),
                        );
                    }
                }
            }
        }

        file.flush()?;
        Ok(())
    }

    pub fn extract_archive(
        &self,
        archive_path: &Path,
        format: ArchiveFormat,
        destination: &Path,
    ) -> Result<()> {
        log::info!("Extracting {archive_path:?} to {destination:?}");
        std::fs::create_dir_all(destination)?;

        match format {
            ArchiveFormat::TarGz => self.extract_tar_gz(archive_path, destination),
            ArchiveFormat::Zip => self.extract_zip(archive_path, destination),
        }
    }

    fn extract_tar_gz(&self, archive_path: &Path, destination: &Path) -> Result<()> {
        let file = File::open(archive_path)?;
        let decoder = GzDecoder::new(file);
        let mut archive = Archive::new(decoder);
        archive.unpack(destination)?;
        Ok(())
    }

    fn extract_zip(&self, archive_path: &Path, destination: &Path) -> Result<()> {
        let file = File::open(archive_path)?;
        let mut archive =
            ZipArchive::new(file).map_err(|_| MelaninError::ExtractionError {
                path: archive_path.to_path_buf(),
            })?;

        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|_| MelaninError::ExtractionError {
                    path: archive_path.to_path_buf(),
                })?;
            let outpath = match file.enclosed_name() {
                Some(path) => destination.join(path),
                None => continue,
            };

            if file.name().ends_with('/') {
                std::fs::create_dir_all(&outpath)?;
            } else {
                if let Some(p) = outpath.parent() {
                    if !p.exists() {
                        std::fs::create_dir_all(p)?;
                    }
                }
                let mut outfile = File::create(&outpath)?;
                std::io::copy(&mut file, &mut outfile)?;
            }

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Some(mode) = file.unix_mode() {
                    std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode))?;
                }
            }
        }
        Ok(())
    }
}

/// Mark non-library files in the discovered bin directory as runnable.
/// Library payloads (`.dll`, `.exe.config`) are left alone; on Windows the
/// chmod itself is a no-op.
fn mark_binaries_executable(dest: &Path, software: SoftwareId) {
    let Some(bin_dir) = discovery::find_bin_dir(dest, software) else {
        log::warn!("No bin directory found under {dest:?} after extraction");
        return;
    };

    let entries: Vec<PathBuf> = match std::fs::read_dir(&bin_dir) {
        Ok(entries) => entries.filter_map(|e| e.ok().map(|e| e.path())).collect(),
        Err(e) => {
            log::warn!("Could not read {bin_dir:?}: {e}");
            return;
        }
    };

    for path in entries {
        if !path.is_file() {
            continue;
        }
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        if name.ends_with(".dll") || name.ends_with(".exe.config") {
            continue;
        }
        if let Err(e) = fs_utils::make_executable(&path) {
            log::warn!("Could not set executable bit on {path:?}: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::artifact::{ReleaseCatalog, SoftwareId};
    use crate::core::platform::PlatformTag;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::sync::mpsc;

    fn tar_gz_fixture(dir: &Path, archive_name: &str) -> PathBuf {
        // Payload tree mirroring a release: {id}-{v}/bin/{id}-qt
        let payload = dir.join("payload");
        let bin = payload.join("bitcoin-28.2").join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        std::fs::write(bin.join("bitcoin-qt"), b"#!/bin/sh\n").unwrap();
        std::fs::write(bin.join("bitcoin-cli"), b"#!/bin/sh\n").unwrap();

        let archive_path = dir.join(archive_name);
        let file = File::create(&archive_path).unwrap();
        let encoder = GzEncoder::new(file, Compression::default());
        let mut builder = tar::Builder::new(encoder);
        builder
            .append_dir_all("bitcoin-28.2", payload.join("bitcoin-28.2"))
            .unwrap();
        builder.into_inner().unwrap().finish().unwrap();
        archive_path
    }

    #[test]
    fn test_extract_tar_gz_roundtrip() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = tar_gz_fixture(tmp.path(), "bitcoin.tar.gz");
        let dest = tmp.path().join("out");

        let downloader = Downloader::new().unwrap();
        downloader
            .extract_archive(&archive, ArchiveFormat::TarGz, &dest)
            .unwrap();

        assert!(dest.join("bitcoin-28.2/bin/bitcoin-qt").is_file());
        assert!(dest.join("bitcoin-28.2/bin/bitcoin-cli").is_file());
    }

    #[test]
    fn test_extract_zip_roundtrip() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = tmp.path().join("whive.zip");

        let file = File::create(&archive).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        writer.add_directory("whive/bin/", options).unwrap();
        writer.start_file("whive/bin/whive-qt.exe", options).unwrap();
        writer.write_all(b"mz").unwrap();
        writer.finish().unwrap();

        let dest = tmp.path().join("out");
        let downloader = Downloader::new().unwrap();
        downloader
            .extract_archive(&archive, ArchiveFormat::Zip, &dest)
            .unwrap();

        assert!(dest.join("whive/bin/whive-qt.exe").is_file());
    }

    #[test]
    fn test_corrupt_archive_reports_extraction_error() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = tmp.path().join("junk.tar.gz");
        std::fs::write(&archive, b"not an archive").unwrap();

        let downloader = Downloader::new().unwrap();
        let err = downloader
            .extract_archive(&archive, ArchiveFormat::Zip, &tmp.path().join("out"))
            .unwrap_err();
        assert!(matches!(err, MelaninError::ExtractionError { .. }));
    }

    #[test]
    fn test_cancel_before_start_leaves_no_residue() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("bitcoin-core");
        let catalog = ReleaseCatalog::default();
        let artifact = catalog.artifact_for(SoftwareId::Bitcoin, PlatformTag::LinuxX86_64);

        let cancel = CancelFlag::new();
        cancel.cancel();
        let (tx, rx) = mpsc::channel();

        let downloader = Downloader::new().unwrap();
        let err = downloader.install(&artifact, &dest, &tx, &cancel).unwrap_err();
        assert!(matches!(err, MelaninError::Cancelled));

        // Destination exists but holds neither a temp archive nor payload.
        let residue: Vec<_> = std::fs::read_dir(&dest).unwrap().collect();
        assert!(residue.is_empty());

        // The cancellation message is the only one emitted, at error severity.
        let messages: Vec<ProgressMessage> = rx.try_iter().collect();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].severity, Severity::Error);
        assert!(messages[0].text.contains("cancelled"));
    }

    #[cfg(unix)]
    #[test]
    fn test_executable_bits_after_marking() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let bin = tmp.path().join("bitcoin-28.2").join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        let qt = bin.join("bitcoin-qt");
        std::fs::write(&qt, b"").unwrap();
        std::fs::set_permissions(&qt, std::fs::Permissions::from_mode(0o644)).unwrap();

        mark_binaries_executable(tmp.path(), SoftwareId::Bitcoin);

        let mode = std::fs::metadata(&qt).unwrap().permissions().mode();
        assert_ne!(mode & 0o111, 0);
    }
}
