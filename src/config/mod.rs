// Configuration module
//
// This module contains all configuration-related functionality split into focused submodules:
// - types: Raw JSON configuration structures
// - loader: Configuration file loading
// - rules: Normalized forwarding rules and route entries
// - validator: Validation and normalization of the raw config into rules

pub mod loader;
pub mod rules;
pub mod types;
pub mod validator;

pub use rules::{ForwardingRule, HttpRule, RouteEntry, TcpRule};
pub use types::{Config, HttpAgentConfig, HttpProxyConfig, TcpAgentConfig};
