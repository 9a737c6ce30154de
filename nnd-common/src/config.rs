//! User configuration
//!
//! # Config file
//! The configuration lives in a `config.json` file next to the executable (or wherever
//! `--config` points to). A missing file is created with the defaults below:
//!
//! ```json
//! {
//!       "version": 1.6,
//!       "proxies": true,
//!       "checkForUpdates": true,
//!       "oneTimeDownload": true,
//!       "advancedMode": false,
//!       "ai_training": false,
//!       "user_credentials": {
//!             "e621": { "apiUser": "", "apiKey": "" },
//!             "e6ai": { "apiUser": "", "apiKey": "" },
//!             "e926": { "apiUser": "", "apiKey": "" },
//!             "furbooru": { "apiKey": "" }
//!       },
//!       "blacklisted_tags": ["example1", "example2"],
//!       "blacklisted_formats": ["example1", "example2"]
//! }
//! ```
//!
//! Files written by an older version are moved to `old_config.json` and replaced by fresh
//! defaults, unless `advancedMode` is on.
use std::{
    collections::BTreeMap,
    io,
    path::{Path, PathBuf},
};

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs::{read_to_string, remove_file, rename, write};

use crate::Site;

/// Version written into new config files.
pub const CONFIG_VERSION: f64 = 1.6;

/// Name the outdated config file is moved to.
pub const BACKUP_FILE_NAME: &str = "old_config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to access config file {path}: {source}")]
    Io { path: String, source: io::Error },

    #[error("Failed to encode config file: {source}")]
    Encode {
        #[from]
        source: serde_json::Error,
    },

    #[error("Credentials for {site} are incomplete: both apiUser and apiKey must be set")]
    IncompleteCredentials { site: Site },
}

/// Login data sent along with the requests of a job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Credentials {
    pub user: String,
    pub key: String,
}

/// One entry of the `user_credentials` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteCredentials {
    #[serde(rename = "apiUser", default, skip_serializing_if = "Option::is_none")]
    pub api_user: Option<String>,
    #[serde(rename = "apiKey", default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl SiteCredentials {
    fn pair(user: &str, key: &str) -> Self {
        Self {
            api_user: Some(user.to_string()),
            api_key: Some(key.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub version: f64,
    pub proxies: bool,
    #[serde(rename = "checkForUpdates")]
    pub check_for_updates: bool,
    /// Enables the seen-id store.
    #[serde(rename = "oneTimeDownload")]
    pub one_time_download: bool,
    #[serde(rename = "advancedMode")]
    pub advanced_mode: bool,
    /// Enables the AI-training metadata export.
    pub ai_training: bool,
    pub user_credentials: BTreeMap<String, SiteCredentials>,
    pub blacklisted_tags: Vec<String>,
    pub blacklisted_formats: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut user_credentials = BTreeMap::new();
        for site in [Site::E621, Site::E6ai, Site::E926] {
            user_credentials.insert(site.name().to_string(), SiteCredentials::pair("", ""));
        }
        user_credentials.insert(
            Site::Furbooru.name().to_string(),
            SiteCredentials {
                api_user: None,
                api_key: Some(String::new()),
            },
        );

        let placeholders = vec!["example1".to_string(), "example2".to_string()];

        Self {
            version: CONFIG_VERSION,
            proxies: true,
            check_for_updates: true,
            one_time_download: true,
            advanced_mode: false,
            ai_training: false,
            user_credentials,
            blacklisted_tags: placeholders.clone(),
            blacklisted_formats: placeholders,
        }
    }
}

impl AppConfig {
    /// Reads the config file at `path`.
    ///
    /// * Missing file: defaults are written and returned.
    /// * Invalid JSON: the error is logged, defaults are written and returned.
    /// * Outdated version without `advancedMode`: the file is backed up as
    ///   [`BACKUP_FILE_NAME`] in the same directory and replaced by defaults.
    pub async fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!("Creating config file at {}", path.display());
            let config = Self::default();
            config.save(path).await?;
            return Ok(config);
        }

        let raw = read_to_string(path).await.map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let config = match serde_json::from_str::<Self>(&raw) {
            Ok(config) => config,
            Err(error) => {
                warn!(
                    "Failed to parse {}: {}. Creating new default config.",
                    path.display(),
                    error
                );
                let config = Self::default();
                config.save(path).await?;
                return Ok(config);
            }
        };

        if config.advanced_mode || config.version >= CONFIG_VERSION {
            debug!("Config file decoded");
            return Ok(config);
        }

        let backup = Self::backup_path(path);
        warn!(
            "You are using an outdated config version! Old one is backed up to {}. Please reconfigure the new one.",
            backup.display()
        );

        if backup.exists() {
            remove_file(&backup).await.map_err(|source| ConfigError::Io {
                path: backup.display().to_string(),
                source,
            })?;
        }
        rename(path, &backup)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.display().to_string(),
                source,
            })?;

        let config = Self::default();
        config.save(path).await?;
        Ok(config)
    }

    /// Writes the config as JSON, indented like the files the tool always produced.
    pub async fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"      ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;

        write(path, buf).await.map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    fn backup_path(path: &Path) -> PathBuf {
        path.with_file_name(BACKUP_FILE_NAME)
    }

    /// Looks up the login data for `site`.
    ///
    /// e6 sites need both `apiUser` and `apiKey`; an entry with only one of them is an error.
    /// Furbooru only uses `apiKey`. Empty entries mean anonymous access.
    pub fn credentials(&self, site: Site) -> Result<Option<Credentials>, ConfigError> {
        let entry = self
            .user_credentials
            .get(site.name())
            .cloned()
            .unwrap_or_default();

        let user = entry.api_user.unwrap_or_default().trim().to_string();
        let key = entry.api_key.unwrap_or_default().trim().to_string();

        match site {
            Site::E621 | Site::E6ai | Site::E926 => match (user.is_empty(), key.is_empty()) {
                (true, true) => {
                    warn!("No credentials set for {site}, using anonymous access");
                    Ok(None)
                }
                (false, false) => Ok(Some(Credentials { user, key })),
                _ => Err(ConfigError::IncompleteCredentials { site }),
            },
            Site::Furbooru => {
                if key.is_empty() {
                    warn!("No API key set for {site}, using anonymous access");
                    return Ok(None);
                }
                Ok(Some(Credentials {
                    user: String::new(),
                    key,
                }))
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod test {
    use super::{AppConfig, ConfigError, Credentials, SiteCredentials, BACKUP_FILE_NAME};
    use crate::Site;

    #[tokio::test]
    async fn missing_file_creates_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = AppConfig::load_or_create(&path).await.unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(path.exists());

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"oneTimeDownload\": true"));
        assert!(raw.contains("\n      \"version\""));
        assert!(raw.contains("\"apiUser\""));
    }

    #[tokio::test]
    async fn reads_existing_file_with_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"version": 1.6, "oneTimeDownload": false, "blacklisted_tags": ["gore"]}"#,
        )
        .unwrap();

        let config = AppConfig::load_or_create(&path).await.unwrap();
        assert!(!config.one_time_download);
        assert_eq!(config.blacklisted_tags, vec!["gore"]);
        assert!(config.proxies);
    }

    #[tokio::test]
    async fn outdated_file_is_backed_up() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let old = r#"{"version": 1.2, "blacklisted_tags": ["mine"]}"#;
        std::fs::write(&path, old).unwrap();
        std::fs::write(dir.path().join(BACKUP_FILE_NAME), "older").unwrap();

        let config = AppConfig::load_or_create(&path).await.unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(
            std::fs::read_to_string(dir.path().join(BACKUP_FILE_NAME)).unwrap(),
            old
        );
    }

    #[tokio::test]
    async fn advanced_mode_keeps_outdated_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"version": 1.0, "advancedMode": true}"#).unwrap();

        let config = AppConfig::load_or_create(&path).await.unwrap();
        assert!(config.advanced_mode);
        assert!(!dir.path().join(BACKUP_FILE_NAME).exists());
    }

    #[tokio::test]
    async fn invalid_json_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let config = AppConfig::load_or_create(&path).await.unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn credential_lookup() {
        let mut config = AppConfig::default();
        assert_eq!(config.credentials(Site::E621).unwrap(), None);
        assert_eq!(config.credentials(Site::Rule34).unwrap(), None);

        config
            .user_credentials
            .insert("e621".into(), SiteCredentials::pair("wolf", "secret"));
        assert_eq!(
            config.credentials(Site::E621).unwrap(),
            Some(Credentials {
                user: "wolf".into(),
                key: "secret".into()
            })
        );

        config
            .user_credentials
            .insert("e6ai".into(), SiteCredentials::pair("wolf", ""));
        assert!(matches!(
            config.credentials(Site::E6ai),
            Err(ConfigError::IncompleteCredentials { site: Site::E6ai })
        ));

        config.user_credentials.insert(
            "furbooru".into(),
            SiteCredentials {
                api_user: None,
                api_key: Some("abc".into()),
            },
        );
        assert_eq!(
            config.credentials(Site::Furbooru).unwrap().map(|c| c.key),
            Some("abc".to_string())
        );
    }
}
