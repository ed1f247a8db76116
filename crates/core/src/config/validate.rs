use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Credentials are present for both external services
/// - Manifest endpoint is an http(s) URL
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    // Repository credentials: either a static token or a full exchange config
    if config.repository.static_token.is_none() {
        let creds = &config.repository.credentials;
        if creds.client_id.is_empty() || creds.client_secret.is_empty() {
            return Err(ConfigError::ValidationError(
                "repository.credentials requires client_id and client_secret".to_string(),
            ));
        }
    }

    let creds = &config.manifest_service.credentials;
    if creds.client_id.is_empty() || creds.client_secret.is_empty() {
        return Err(ConfigError::ValidationError(
            "manifest_service.credentials requires client_id and client_secret".to_string(),
        ));
    }

    if !config.manifest_service.endpoint.starts_with("http") {
        return Err(ConfigError::ValidationError(format!(
            "manifest_service.endpoint is not a URL: {}",
            config.manifest_service.endpoint
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        CredentialsConfig, DatabaseConfig, ManifestServiceConfig, ReportsConfig, RepositoryConfig,
        ServerConfig,
    };
    use std::net::IpAddr;

    fn creds() -> CredentialsConfig {
        CredentialsConfig {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            scopes: String::new(),
            token_url: "https://issuer.example/token".to_string(),
        }
    }

    fn valid_config() -> Config {
        Config {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            repository: RepositoryConfig {
                credentials: creds(),
                static_token: None,
            },
            manifest_service: ManifestServiceConfig {
                endpoint: "https://image.example/documentManifest".to_string(),
                credentials: creds(),
                org_id: None,
            },
            reports: ReportsConfig::default(),
        }
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = valid_config();
        config.server = ServerConfig {
            host: "0.0.0.0".parse::<IpAddr>().unwrap(),
            port: 0,
        };
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_missing_repository_secret_fails() {
        let mut config = valid_config();
        config.repository.credentials.client_secret = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_static_token_skips_exchange_credentials() {
        let mut config = valid_config();
        config.repository.credentials.client_secret = String::new();
        config.repository.static_token = Some("token".to_string());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_bad_endpoint_fails() {
        let mut config = valid_config();
        config.manifest_service.endpoint = "not-a-url".to_string();
        assert!(validate_config(&config).is_err());
    }
}
