use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Startup and lifecycle failures. Every variant is fatal for the process.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Failed to read config '{path}': {source}")]
    ConfigRead { path: PathBuf, source: io::Error },

    #[error("Failed to parse config '{path}': {source}")]
    ConfigParse { path: PathBuf, source: serde_json::Error },

    #[error("Invalid config: {0}")]
    ConfigInvalid(String),

    #[error("Invalid location pattern '{pattern}': {source}")]
    InvalidPattern { pattern: String, source: regex::Error },

    #[error("{kind} listen address must not be empty")]
    EmptyListenAddress { kind: &'static str },

    #[error("Failed to listen on {addr}: {source}")]
    Listen { addr: String, source: io::Error },

    #[error("Hosts file error on {path}: {source}")]
    Hosts { path: PathBuf, source: io::Error },

    #[error("Failed to restore hosts file {hosts} from {backup}: {source}")]
    Restore { hosts: PathBuf, backup: PathBuf, source: io::Error },

    #[error("Failed to install termination signal handler: {0}")]
    Signal(io::Error),
}

impl AgentError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::ConfigInvalid(message.into())
    }
}

/// Failures scoped to a single client connection. Logged, never propagated past the relay.
#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("Failed to read request: {0}")]
    Read(io::Error),

    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Missing Host header on the second request line")]
    MissingHost,

    #[error("Failed to connect to backend {addr}: {source}")]
    Dial { addr: String, source: io::Error },

    #[error("Failed to write to {peer}: {source}")]
    Write { peer: &'static str, source: io::Error },

    #[error("Relay I/O error: {0}")]
    Relay(io::Error),
}

pub type Result<T> = std::result::Result<T, AgentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AgentError::EmptyListenAddress { kind: "TCP" };
        assert_eq!(err.to_string(), "TCP listen address must not be empty");

        let err = AgentError::invalid("pass must be host:port");
        assert!(err.to_string().contains("pass must be host:port"));

        let err = ConnectionError::Dial { addr: "127.0.0.1:1".to_string(), source: io::Error::new(io::ErrorKind::ConnectionRefused, "refused") };
        assert!(err.to_string().contains("127.0.0.1:1"));
    }

    #[test]
    fn test_restore_error_names_both_paths() {
        let err = AgentError::Restore {
            hosts: PathBuf::from("/etc/hosts"),
            backup: PathBuf::from("/etc/hostsbak"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        let message = err.to_string();
        assert!(message.contains("/etc/hosts"));
        assert!(message.contains("/etc/hostsbak"));
    }
}
