use crate::config::types::Config;
use crate::error::{AgentError, Result};
use log::{debug, trace};
use std::path::Path;

impl Config {
    /// Load configuration from a JSON file. A missing or unparsable file is fatal.
    pub async fn try_load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());
        let content = tokio::fs::read_to_string(path).await.map_err(|source| AgentError::ConfigRead { path: path.to_owned(), source })?;
        let mut config = Self::from_json(&content).map_err(|source| AgentError::ConfigParse { path: path.to_owned(), source })?;
        config.path = path.to_owned();
        trace!("Loaded config: {:#?}", config);
        Ok(config)
    }

    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<Config>(content)
    }
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let json = serde_json::to_string_pretty(self).map_err(|_| std::fmt::Error)?;
        writeln!(f, "{}", json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[tokio::test]
    async fn test_load_full_config() {
        let json = r#"{
            "hosts_file": "/tmp/hosts",
            "tcp": [{ "listen": "127.0.0.1:3306", "expose": "db.example.com", "pass": "10.0.0.5:3306" }],
            "http": [{
                "listen": "127.0.0.1:8080",
                "proxy": [
                    { "expose": "api.example.com", "location": "/api", "pass": "127.0.0.1:9001" },
                    { "expose": "api.example.com", "location": "!/public", "pass": "127.0.0.1:9002" }
                ]
            }]
        }"#;
        let file = create_temp_config(json);
        let config = Config::try_load(file.path()).await.unwrap();

        assert_eq!(config.get_path(), file.path());
        assert_eq!(config.get_hosts_file().unwrap().to_str(), Some("/tmp/hosts"));
        assert_eq!(config.get_tcp().len(), 1);
        assert_eq!(config.get_tcp()[0].pass, "10.0.0.5:3306");
        assert_eq!(config.get_http().len(), 1);
        assert_eq!(config.get_http()[0].proxy.len(), 2);
        assert_eq!(config.get_http()[0].proxy[1].location, "!/public");
    }

    #[tokio::test]
    async fn test_missing_sections_default_to_empty() {
        let file = create_temp_config("{}");
        let config = Config::try_load(file.path()).await.unwrap();
        assert!(config.get_tcp().is_empty());
        assert!(config.get_http().is_empty());
        assert!(config.get_hosts_file().is_none());
    }

    #[tokio::test]
    async fn test_non_string_fields_become_empty() {
        let file = create_temp_config(r#"{ "tcp": [{ "listen": 8080, "expose": null, "pass": "127.0.0.1:1" }] }"#);
        let config = Config::try_load(file.path()).await.unwrap();
        assert_eq!(config.get_tcp()[0].listen, "");
        assert_eq!(config.get_tcp()[0].expose, "");
    }

    #[tokio::test]
    async fn test_unreadable_and_malformed_configs() {
        let err = Config::try_load("/definitely/not/here/hostpass.json").await.unwrap_err();
        assert!(matches!(err, AgentError::ConfigRead { .. }));

        let file = create_temp_config("{ \"tcp\": [ ");
        let err = Config::try_load(file.path()).await.unwrap_err();
        assert!(matches!(err, AgentError::ConfigParse { .. }));
    }
}
