//! Zip archive extraction.

use async_trait::async_trait;
use pyembed_core::{ArtifactLocation, Extractor, Failure};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use uuid::Uuid;

use crate::Result;

/// Extracts zip archives into fresh directories under a scratch root.
#[derive(Debug, Clone)]
pub struct ZipExtractor {
    temp_root: PathBuf,
}

impl ZipExtractor {
    /// Create an extractor writing into `temp_root`.
    #[must_use]
    pub fn new(temp_root: PathBuf) -> Self {
        Self { temp_root }
    }

    /// Extract `archive` into a new directory and return it.
    ///
    /// Entries whose names would escape the destination are skipped. On
    /// failure the partially written directory is removed.
    pub fn extract_to_new_dir(&self, archive: &Path) -> Result<PathBuf> {
        let dest = self.temp_root.join(Uuid::new_v4().to_string());
        std::fs::create_dir_all(&dest)?;

        if let Err(e) = unpack(archive, &dest) {
            let _ = std::fs::remove_dir_all(&dest);
            return Err(e);
        }

        debug!(?archive, ?dest, "Extracted archive");
        Ok(dest)
    }
}

#[async_trait]
impl Extractor for ZipExtractor {
    async fn extract(
        &self,
        archive: &ArtifactLocation,
    ) -> std::result::Result<ArtifactLocation, Failure> {
        let extractor = self.clone();
        let archive = archive.as_path().to_path_buf();

        let dest = tokio::task::spawn_blocking(move || extractor.extract_to_new_dir(&archive))
            .await
            .map_err(crate::Error::from)??;
        Ok(dest.into())
    }
}

fn unpack(archive: &Path, dest: &Path) -> Result<()> {
    let mut zip = zip::ZipArchive::new(File::open(archive)?)?;

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;

        let Some(relative) = entry.enclosed_name() else {
            trace!(name = entry.name(), "Skipping entry outside the archive root");
            continue;
        };
        let outpath = dest.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&outpath)?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&outpath)?;
        std::io::copy(&mut entry, &mut out)?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode))?;
        }
    }
    Ok(())
}
