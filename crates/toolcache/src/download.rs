//! HTTP archive downloader.

use async_trait::async_trait;
use pyembed_core::{ArtifactLocation, Downloader, Failure};
use reqwest::Client;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

use crate::{Error, Result};

/// User agent sent with every request.
pub const USER_AGENT: &str = "pyembed";

/// Downloads archives over HTTP(S) into a scratch directory.
///
/// Each download lands in its own uniquely named file under the scratch
/// root; nothing is cleaned up afterwards.
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    client: Client,
    temp_root: PathBuf,
}

impl HttpDownloader {
    /// Create a downloader writing into `temp_root`.
    ///
    /// A rustls crypto provider must already be installed for the process.
    pub fn new(temp_root: PathBuf) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(Error::Client)?;
        Ok(Self::with_client(client, temp_root))
    }

    /// Create a downloader around an existing client.
    #[must_use]
    pub fn with_client(client: Client, temp_root: PathBuf) -> Self {
        Self { client, temp_root }
    }

    /// The scratch directory downloads are written to.
    #[must_use]
    pub fn temp_root(&self) -> &Path {
        &self.temp_root
    }

    async fn fetch(&self, url: &str) -> Result<PathBuf> {
        debug!(%url, "Downloading archive");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::http(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus(status.as_u16()));
        }

        let bytes = response.bytes().await.map_err(|e| Error::http(url, e))?;

        tokio::fs::create_dir_all(&self.temp_root).await?;
        let dest = self.temp_root.join(Uuid::new_v4().to_string());
        tokio::fs::write(&dest, &bytes).await?;

        debug!(%url, ?dest, size = bytes.len(), "Downloaded archive");
        Ok(dest)
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    async fn download(&self, url: &str) -> std::result::Result<ArtifactLocation, Failure> {
        Ok(self.fetch(url).await?.into())
    }
}
