use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

pub const DEFAULT_BASE_URL: &str = "https://api.tradier.com/v1/markets";
pub const API_KEY_ENV: &str = "TRADIER_API_KEY";
pub const BASE_URL_ENV: &str = "TRADIER_BASE_URL";
pub const API_KEY_FILE: &str = ".api_key";

/// Credentials and endpoint for the market-data API.
#[derive(Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: String,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl ApiConfig {
    /// Use the explicit key (flag or env var) when given, otherwise the first
    /// `.api_key` file found in the working directory or next to the binary.
    pub fn resolve(base_url: &str, api_key: Option<String>) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            bail!("API base URL is empty. Set --base-url or {BASE_URL_ENV}.");
        }

        let api_key = match api_key.map(|k| k.trim().to_string()) {
            Some(k) if !k.is_empty() => k,
            _ => {
                let path = api_key_candidates()
                    .into_iter()
                    .find(|p| p.is_file())
                    .ok_or_else(|| {
                        anyhow::anyhow!(
                            "No API key. Set {API_KEY_ENV}, pass --api-key, \
                             or create a {API_KEY_FILE} file in the working directory."
                        )
                    })?;
                read_api_key(&path)?
            }
        };

        Ok(ApiConfig { base_url, api_key })
    }
}

fn api_key_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from(API_KEY_FILE)];
    if let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        candidates.push(dir.join(API_KEY_FILE));
    }
    candidates
}

/// Read a key file, trimming surrounding whitespace. An empty file is an error.
pub fn read_api_key(path: &Path) -> Result<String> {
    let key = std::fs::read_to_string(path)
        .with_context(|| format!("reading API key file {}", path.display()))?;
    let key = key.trim();
    if key.is_empty() {
        bail!("API key file {} is empty", path.display());
    }
    Ok(key.to_string())
}
