use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("EXPRESSO_").split("_"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL: &str = r#"
[repository.credentials]
client_id = "repo-id"
client_secret = "repo-secret"

[manifest_service.credentials]
client_id = "manifest-id"
client_secret = "manifest-secret"
"#;

    #[test]
    fn test_load_config_from_str_valid() {
        let config = load_config_from_str(MINIMAL).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.repository.credentials.client_id, "repo-id");
        assert!(config
            .manifest_service
            .endpoint
            .contains("documentManifest"));
    }

    #[test]
    fn test_load_config_from_str_missing_credentials() {
        let result = load_config_from_str("[server]\nport = 9000\n");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "{}\n[server]\nport = 3000", MINIMAL).unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.server.port, 3000);
    }
}
