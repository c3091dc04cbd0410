use log::warn;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip)]
    pub(crate) path: PathBuf,
    // Overrides the platform hosts file location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) hosts_file: Option<PathBuf>,
    // Raw TCP tunnels
    #[serde(default)]
    pub(crate) tcp: Vec<TcpAgentConfig>,
    // HTTP/CONNECT proxies with path routing
    #[serde(default)]
    pub(crate) http: Vec<HttpAgentConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TcpAgentConfig {
    #[serde(deserialize_with = "string_or_default", default)]
    pub listen: String,

    #[serde(deserialize_with = "string_or_default", default)]
    pub expose: String,

    #[serde(deserialize_with = "string_or_default", default)]
    pub pass: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpAgentConfig {
    #[serde(deserialize_with = "string_or_default", default)]
    pub listen: String,

    #[serde(default)]
    pub proxy: Vec<HttpProxyConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpProxyConfig {
    #[serde(deserialize_with = "string_or_default", default)]
    pub expose: String,

    #[serde(deserialize_with = "string_or_default", default)]
    pub pass: String,

    // Regular expression over the request target, `!` prefix inverts it
    #[serde(deserialize_with = "string_or_default", default)]
    pub location: String,
}

impl Config {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), ..Self::default() }
    }

    pub fn get_path(&self) -> &PathBuf {
        &self.path
    }

    pub fn get_hosts_file(&self) -> Option<&PathBuf> {
        self.hosts_file.as_ref()
    }

    pub fn set_hosts_file(&mut self, path: PathBuf) {
        self.hosts_file = Some(path);
    }

    pub fn get_tcp(&self) -> &[TcpAgentConfig] {
        &self.tcp
    }

    pub fn get_http(&self) -> &[HttpAgentConfig] {
        &self.http
    }

    pub fn add_tcp(&mut self, listen: impl Into<String>, expose: impl Into<String>, pass: impl Into<String>) {
        self.tcp.push(TcpAgentConfig { listen: listen.into(), expose: expose.into(), pass: pass.into() });
    }

    pub fn add_http(&mut self, listen: impl Into<String>, proxy: Vec<HttpProxyConfig>) {
        self.http.push(HttpAgentConfig { listen: listen.into(), proxy });
    }
}

impl HttpProxyConfig {
    pub fn new(expose: impl Into<String>, location: impl Into<String>, pass: impl Into<String>) -> Self {
        Self { expose: expose.into(), pass: pass.into(), location: location.into() }
    }
}

// Forgiving string: non-string values fall back to empty and are rejected later by validation.
fn string_or_default<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Null => Ok(String::new()),
        other => {
            warn!("Expected a string but found {}, using empty value", other);
            Ok(String::new())
        }
    }
}
