//! Remote source archive download and update checks.
//!
//! One versioned archive fetched over HTTPS from the GitHub API and
//! extracted with its single top-level directory stripped. Downloads are
//! never retried; a failure aborts the installation path that needed the
//! archive, while removal-only flows never get here.

use std::fs;
use std::io::{self, Cursor};
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use tracing::debug;

use crate::catalog::{PACKAGE_VERSION, REPO_API_URL};
use crate::version;

#[derive(Debug, Deserialize)]
struct ReleaseInfo {
    tag_name: String,
}

/// Downloads release metadata and source archives for the skills repo.
#[derive(Debug, Clone)]
pub struct ArchiveFetcher {
    client: reqwest::Client,
}

impl ArchiveFetcher {
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(format!("titools/{PACKAGE_VERSION}"))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }

    /// Latest release tag published on GitHub.
    pub async fn latest_version(&self) -> anyhow::Result<String> {
        let url = format!("{REPO_API_URL}/releases/latest");
        let response = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github.v3+json")
            .send()
            .await
            .with_context(|| format!("Failed to fetch release info from {url}"))?;

        if !response.status().is_success() {
            anyhow::bail!(
                "Failed to fetch release info: HTTP {} from {url}",
                response.status()
            );
        }

        let release: ReleaseInfo = response
            .json()
            .await
            .context("Failed to parse release info response")?;
        Ok(release.tag_name)
    }

    /// Whether a release newer than `current` exists.
    ///
    /// A failed check means "no update", so offline hosts degrade to the
    /// already-up-to-date path instead of erroring.
    pub async fn check_for_update(&self, current: &str) -> bool {
        match self.latest_version().await {
            Ok(latest) => version::is_newer(&latest, current),
            Err(err) => {
                debug!(%err, "update check failed, assuming up to date");
                false
            }
        }
    }

    /// Download the source archive for `reference` and extract it into
    /// `dest_dir` with the top-level directory stripped.
    pub async fn download_archive(&self, dest_dir: &Path, reference: &str) -> anyhow::Result<()> {
        let url = format!("{REPO_API_URL}/zipball/{reference}");
        let response = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github.v3+json")
            .send()
            .await
            .with_context(|| format!("Failed to download archive from {url}"))?;

        if !response.status().is_success() {
            anyhow::bail!(
                "Failed to download archive: HTTP {} from {url}",
                response.status()
            );
        }

        let bytes = response
            .bytes()
            .await
            .context("Failed to read archive body")?;
        extract_stripped(&bytes, dest_dir)
    }
}

/// Extract a zip archive into `dest`, dropping the single top-level
/// directory every GitHub archive wraps its contents in.
pub fn extract_stripped(bytes: &[u8], dest: &Path) -> anyhow::Result<()> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).context("Failed to open source archive")?;

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .with_context(|| format!("Failed to read archive entry {index}"))?;
        // enclosed_name rejects entries that would escape dest
        let Some(raw) = entry.enclosed_name() else {
            continue;
        };
        let stripped: std::path::PathBuf = raw.components().skip(1).collect();
        if stripped.as_os_str().is_empty() {
            continue;
        }

        let out = dest.join(stripped);
        if entry.is_dir() {
            fs::create_dir_all(&out)
                .with_context(|| format!("Failed to create {}", out.display()))?;
        } else {
            if let Some(parent) = out.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            let mut file = fs::File::create(&out)
                .with_context(|| format!("Failed to create {}", out.display()))?;
            io::copy(&mut entry, &mut file)
                .with_context(|| format!("Failed to extract {}", out.display()))?;
        }
    }

    Ok(())
}
