use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use crate::config::{RegistryConfig, TaskSource};
use crate::Task;

/// Name of the digest manifest inside an artifacts directory
pub const MANIFEST_FILE: &str = "manifest.json";
/// Directory under the artifacts dir that holds downloads until the whole set verifies
pub const STAGING_DIR: &str = ".staging";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Artifact not found: {0}")]
    NotFound(String),
    #[error("Download error: {0}")]
    DownloadError(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Malformed manifest: {0}")]
    Manifest(#[from] serde_json::Error),
    #[error("Manifest does not list required artifacts: {0:?}")]
    IncompleteManifest(Vec<String>),
    #[error("Invalid artifact path: {0}")]
    InvalidPath(String),
    #[error("Hash mismatch: expected {expected}, got {actual} for {file}")]
    HashMismatch {
        file: String,
        expected: String,
        actual: String,
    },
}

/// SHA-256 digests of an artifact set, keyed by `/`-separated relative path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub files: BTreeMap<String, String>,
}

impl Manifest {
    /// Relative paths of every artifact the registry needs
    pub fn required_files() -> Vec<String> {
        Task::ALL
            .iter()
            .flat_map(|&task| TaskSource::relative_paths(task))
            .collect()
    }

    /// Required artifacts with no digest in this manifest
    pub fn missing_required(&self) -> Vec<String> {
        Self::required_files()
            .into_iter()
            .filter(|f| !self.files.contains_key(f))
            .collect()
    }
}

/// Lowercase hex SHA-256 of `bytes`
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Local directory holding the artifact set, with digest checks and an
/// optional fetch from a remote base URL.
#[derive(Clone, Debug)]
pub struct ArtifactStore {
    artifacts_dir: PathBuf,
    fetch_lock: Arc<Mutex<()>>,
}

impl ArtifactStore {
    /// Creates a new ArtifactStore with the default artifacts directory
    pub fn new_default() -> io::Result<Self> {
        Self::new(Self::get_default_artifacts_dir())
    }

    /// Returns the default artifacts directory path
    pub fn get_default_artifacts_dir() -> PathBuf {
        // 1. Check environment variable
        if let Ok(path) = env::var("LAMMAH_ARTIFACTS") {
            return PathBuf::from(path);
        }

        // 2. Use platform-specific cache directory
        if let Some(cache_dir) = dirs::cache_dir() {
            return cache_dir.join("lammah").join("artifacts");
        }

        // 3. Fallback to user's home directory
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(".cache").join("lammah").join("artifacts");
        }

        // 4. If all else fails, use system temp directory
        env::temp_dir().join("lammah").join("artifacts")
    }

    pub fn new<P: AsRef<Path>>(artifacts_dir: P) -> io::Result<Self> {
        let artifacts_dir = artifacts_dir.as_ref().to_path_buf();
        fs::create_dir_all(&artifacts_dir)?;
        Ok(Self {
            artifacts_dir,
            fetch_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn artifacts_dir(&self) -> &Path {
        &self.artifacts_dir
    }

    /// The registry table for the standard layout under this store
    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig::from_artifacts_dir(&self.artifacts_dir)
    }

    /// Resolves a manifest path inside the store, refusing anything that
    /// could escape the artifacts directory
    pub fn artifact_path(&self, relative: &str) -> Result<PathBuf, StoreError> {
        let rel = Path::new(relative);
        let plain = !relative.is_empty()
            && rel
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !plain {
            return Err(StoreError::InvalidPath(relative.to_string()));
        }
        Ok(self.artifacts_dir.join(rel))
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.artifacts_dir.join(MANIFEST_FILE)
    }

    /// True when every required artifact file exists
    pub fn is_complete(&self) -> bool {
        let missing: Vec<String> = Manifest::required_files()
            .into_iter()
            .filter(|f| !self.artifacts_dir.join(f).exists())
            .collect();
        if !missing.is_empty() {
            log::info!("Artifacts missing under {:?}: {:?}", self.artifacts_dir, missing);
        }
        missing.is_empty()
    }

    /// Reads the local manifest, `None` when there is none
    pub fn read_manifest(&self) -> Result<Option<Manifest>, StoreError> {
        let path = self.manifest_path();
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path)?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    fn verify_file(&self, path: &Path, expected_hash: &str) -> Result<bool, StoreError> {
        let bytes = fs::read(path)?;
        let hash = sha256_hex(&bytes);
        log::debug!("Verifying {:?}: {} bytes, hash {}", path, bytes.len(), hash);
        Ok(hash.eq_ignore_ascii_case(expected_hash))
    }

    /// Checks every file listed in the local manifest against its digest.
    ///
    /// Returns `Ok(false)` on the first mismatch or missing file.
    ///
    /// # Errors
    /// - `NotFound` if there is no manifest
    /// - `IncompleteManifest` if it does not list every required artifact
    pub fn verify_artifacts(&self) -> Result<bool, StoreError> {
        let manifest = self
            .read_manifest()?
            .ok_or_else(|| StoreError::NotFound(self.manifest_path().display().to_string()))?;
        let missing = manifest.missing_required();
        if !missing.is_empty() {
            return Err(StoreError::IncompleteManifest(missing));
        }

        for (file, expected) in &manifest.files {
            let path = self.artifact_path(file)?;
            if !path.exists() {
                log::warn!("Artifact {} listed in manifest does not exist", file);
                return Ok(false);
            }
            if !self.verify_file(&path, expected)? {
                log::warn!("Artifact {} does not match its manifest digest", file);
                return Ok(false);
            }
        }

        log::info!("Verified {} artifacts under {:?}", manifest.files.len(), self.artifacts_dir);
        Ok(true)
    }

    async fn download_and_verify_file(
        &self,
        url: &str,
        path: &Path,
        expected_hash: &str,
        file: &str,
    ) -> Result<(), StoreError> {
        log::info!("Downloading {} from {}", file, url);
        let response = reqwest::get(url).await?.error_for_status()?;
        let bytes = response.bytes().await?;

        let hash = sha256_hex(&bytes);
        if !hash.eq_ignore_ascii_case(expected_hash) {
            log::error!("{} hash mismatch: expected {}, got {}", file, expected_hash, hash);
            return Err(StoreError::HashMismatch {
                file: file.to_string(),
                expected: expected_hash.to_string(),
                actual: hash,
            });
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, &bytes)?;
        log::info!("{} downloaded and verified ({} bytes)", file, bytes.len());
        Ok(())
    }

    /// Fetches the artifact set published under `base_url`.
    ///
    /// Downloads `<base_url>/manifest.json`, then every file it lists that is
    /// absent locally or fails its digest. Downloads land in [`STAGING_DIR`]
    /// and are moved into place only after every digest matches, so a failed
    /// fetch leaves the local set as it was. The manifest is written last.
    pub async fn fetch(&self, base_url: &str) -> Result<Manifest, StoreError> {
        let _lock = self.fetch_lock.lock().await;
        let staging = self.artifacts_dir.join(STAGING_DIR);
        if staging.exists() {
            fs::remove_dir_all(&staging)?;
        }

        let result = self.fetch_staged(base_url, &staging).await;
        if staging.exists() {
            if let Err(e) = fs::remove_dir_all(&staging) {
                log::warn!("Could not remove {}: {}", staging.display(), e);
            }
        }
        result
    }

    async fn fetch_staged(&self, base_url: &str, staging: &Path) -> Result<Manifest, StoreError> {
        let base = base_url.trim_end_matches('/');

        let manifest_url = format!("{}/{}", base, MANIFEST_FILE);
        log::info!("Fetching artifact manifest from {}", manifest_url);
        let manifest: Manifest = reqwest::get(&manifest_url)
            .await?
            .error_for_status()?
            .json()
            .await?;

        let missing = manifest.missing_required();
        if !missing.is_empty() {
            return Err(StoreError::IncompleteManifest(missing));
        }

        let mut staged = Vec::new();
        for (file, expected) in &manifest.files {
            let path = self.artifact_path(file)?;
            if path.exists() && self.verify_file(&path, expected)? {
                log::info!("{} already present and verified", file);
                continue;
            }
            let url = format!("{}/{}", base, file);
            let staged_path = staging.join(file);
            self.download_and_verify_file(&url, &staged_path, expected, file).await?;
            staged.push((staged_path, path));
        }

        for (from, to) in &staged {
            if let Some(parent) = to.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::rename(from, to)?;
        }
        fs::write(self.manifest_path(), serde_json::to_vec_pretty(&manifest)?)?;
        log::info!("Installed {} artifact file(s)", staged.len());
        Ok(manifest)
    }

    /// Removes the required artifacts and the manifest, if present
    pub fn remove_artifacts(&self) -> Result<(), StoreError> {
        for file in Manifest::required_files() {
            let path = self.artifacts_dir.join(&file);
            if path.exists() {
                fs::remove_file(&path)?;
            }
        }
        let manifest = self.manifest_path();
        if manifest.exists() {
            fs::remove_file(manifest)?;
        }
        Ok(())
    }

    /// Makes sure a usable artifact set is on disk.
    ///
    /// A complete local set is accepted as is, after a digest check when a
    /// manifest is present. An incomplete or failing set is re-fetched from
    /// `base_url` when one is given and reported as missing otherwise.
    pub async fn ensure_artifacts(&self, base_url: Option<&str>) -> Result<(), StoreError> {
        if self.is_complete() {
            let verified = match self.read_manifest()? {
                Some(_) => self.verify_artifacts()?,
                None => true,
            };
            if verified {
                return Ok(());
            }
            log::warn!("Local artifacts failed verification");
        }

        match base_url {
            Some(url) => {
                self.fetch(url).await?;
                Ok(())
            }
            None => Err(StoreError::NotFound(format!(
                "complete artifact set under {:?}",
                self.artifacts_dir
            ))),
        }
    }
}
