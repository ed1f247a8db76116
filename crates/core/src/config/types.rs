use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub repository: RepositoryConfig,
    pub manifest_service: ManifestServiceConfig,
    #[serde(default)]
    pub reports: ReportsConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration (SQLite file backing the token cache and job store)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("expresso.db")
}

/// Content repository (DAM) access configuration.
///
/// The repository host itself is not configured here: it arrives with each
/// asset event (`repo:repositoryId`). Only the credentials live in config.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RepositoryConfig {
    pub credentials: CredentialsConfig,
    /// When set, skip the token exchange and use this bearer token as-is.
    #[serde(default)]
    pub static_token: Option<String>,
}

/// Document-processing (manifest extraction) service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ManifestServiceConfig {
    /// Manifest submission endpoint
    #[serde(default = "default_manifest_endpoint")]
    pub endpoint: String,
    pub credentials: CredentialsConfig,
    /// Org id header value; required for completion-event delivery
    #[serde(default)]
    pub org_id: Option<String>,
}

fn default_manifest_endpoint() -> String {
    "https://image.adobe.io/pie/psdService/documentManifest".to_string()
}

/// OAuth client-credentials exchange inputs
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CredentialsConfig {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub scopes: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
}

fn default_token_url() -> String {
    "https://ims-na1.adobelogin.com/ims/token/v3".to_string()
}

/// Audit report log configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReportsConfig {
    /// Persist every generated report to the report store
    #[serde(default)]
    pub enabled: bool,
    /// Directory the report JSON blobs are written under
    #[serde(default = "default_reports_dir")]
    pub dir: PathBuf,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: default_reports_dir(),
        }
    }
}

fn default_reports_dir() -> PathBuf {
    PathBuf::from("asset-report")
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub repository: SanitizedRepositoryConfig,
    pub manifest_service: SanitizedManifestServiceConfig,
    pub reports: ReportsConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedRepositoryConfig {
    pub credentials: SanitizedCredentialsConfig,
    pub static_token_configured: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedManifestServiceConfig {
    pub endpoint: String,
    pub credentials: SanitizedCredentialsConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,
}

/// Sanitized credentials (secret hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedCredentialsConfig {
    pub client_id: String,
    pub client_secret_configured: bool,
    pub token_url: String,
}

impl From<&CredentialsConfig> for SanitizedCredentialsConfig {
    fn from(c: &CredentialsConfig) -> Self {
        Self {
            client_id: c.client_id.clone(),
            client_secret_configured: !c.client_secret.is_empty(),
            token_url: c.token_url.clone(),
        }
    }
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            database: config.database.clone(),
            repository: SanitizedRepositoryConfig {
                credentials: (&config.repository.credentials).into(),
                static_token_configured: config.repository.static_token.is_some(),
            },
            manifest_service: SanitizedManifestServiceConfig {
                endpoint: config.manifest_service.endpoint.clone(),
                credentials: (&config.manifest_service.credentials).into(),
                org_id: config.manifest_service.org_id.clone(),
            },
            reports: config.reports.clone(),
        }
    }
}
