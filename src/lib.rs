//! # hostpass
//!
//! Points a public hostname at loopback through the hosts file and forwards the
//! resulting connections to a developer-chosen backend.
//!
//! - [`hosts`]: one-time backup, append-only domain injection, restore on shutdown
//! - [`proxy`]: raw TCP tunnel and minimal HTTP/CONNECT proxy with pattern routing
//! - [`agent`]: registers each rule's domains, then starts its forwarder
//! - [`config`]: JSON rule loading and validation
//!
//! ```ignore
//! let config = Config::try_load("hostpass.json").await?;
//! let agent = Agent::new(config.to_rules()?, HostsPaths::system());
//! agent.run().await?;
//! ```

pub mod agent;
pub mod config;
pub mod error;
pub mod hosts;
pub mod proxy;
pub mod shutdown;
pub mod utils;

pub use agent::{Agent, RunningAgent};
pub use config::{Config, ForwardingRule};
pub use error::{AgentError, ConnectionError, Result};
pub use hosts::HostsPaths;
pub use shutdown::Shutdown;
