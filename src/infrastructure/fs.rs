use crate::domain::gateway::{GatewayConfig, GatewayConfigFile};
use crate::domain::ports::ConfigSource;
use crate::error::{HubError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

const CONFIG_DIR: &str = "config";
const CONFIG_EXTENSION: &str = "json";

/// Reads gateway configuration files from `<root>/<module folder>/config/`.
///
/// Every `*.json` file in that directory describes one gateway; the file stem
/// is the gateway identifier. Files are returned sorted by name so the
/// registration order does not depend on directory iteration order.
#[derive(Debug, Clone)]
pub struct FsConfigSource {
    root: PathBuf,
}

impl FsConfigSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn config_dir(&self, folder: &str) -> PathBuf {
        self.root.join(folder).join(CONFIG_DIR)
    }

    async fn read_config(path: &Path) -> Result<GatewayConfig> {
        let raw = tokio::fs::read(path).await?;
        serde_json::from_slice(&raw).map_err(|e| HubError::ConfigError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl ConfigSource for FsConfigSource {
    async fn load(&self, folder: &str) -> Result<Vec<GatewayConfigFile>> {
        let dir = self.config_dir(folder);
        let mut entries = tokio::fs::read_dir(&dir).await.map_err(|e| HubError::ConfigError {
            path: dir.clone(),
            reason: e.to_string(),
        })?;

        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some(CONFIG_EXTENSION) {
                paths.push(path);
            } else {
                debug!(path = %path.display(), "ignoring non-configuration file");
            }
        }
        paths.sort();

        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            let gateway = path
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| HubError::ConfigError {
                    path: path.clone(),
                    reason: "file name is not valid UTF-8".to_string(),
                })?
                .to_string();
            let config = Self::read_config(&path).await?;
            files.push(GatewayConfigFile::new(gateway, config));
        }
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_loads_sorted_json_files() {
        let dir = tempdir().unwrap();
        let config_dir = dir.path().join("Stripe").join("config");
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(
            config_dir.join("stripe_connect.json"),
            r#"{"name": "StripeConnect"}"#,
        )
        .unwrap();
        fs::write(
            config_dir.join("stripe.json"),
            r#"{"name": "Stripe", "events": {"invoice.paid": "jobs.InvoicePaid"}}"#,
        )
        .unwrap();
        fs::write(config_dir.join("README.md"), "notes").unwrap();

        let source = FsConfigSource::new(dir.path());
        let files = source.load("Stripe").await.unwrap();

        let gateways: Vec<&str> = files.iter().map(|f| f.gateway.as_str()).collect();
        assert_eq!(gateways, vec!["stripe", "stripe_connect"]);
        assert_eq!(files[0].config.events["invoice.paid"], "jobs.InvoicePaid");
        assert_eq!(files[1].namespace(), "payment_stripe_connect");
    }

    #[tokio::test]
    async fn test_null_events_and_numeric_flag_load() {
        let dir = tempdir().unwrap();
        let config_dir = dir.path().join("Cash").join("config");
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(
            config_dir.join("cash.json"),
            r#"{"name": "Cash", "events": null, "manage_remote_product": 1}"#,
        )
        .unwrap();

        let files = FsConfigSource::new(dir.path()).load("Cash").await.unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].config.events.is_empty());
        assert!(files[0].config.manage_remote_product);
    }

    #[tokio::test]
    async fn test_missing_directory_is_an_error() {
        let dir = tempdir().unwrap();
        let source = FsConfigSource::new(dir.path());
        assert!(matches!(
            source.load("Nowhere").await,
            Err(HubError::ConfigError { .. })
        ));
    }

    #[tokio::test]
    async fn test_malformed_file_names_path() {
        let dir = tempdir().unwrap();
        let config_dir = dir.path().join("Broken").join("config");
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(config_dir.join("broken.json"), "{ not json").unwrap();

        let source = FsConfigSource::new(dir.path());
        let err = source.load("Broken").await.unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }
}
