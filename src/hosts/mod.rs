// Hosts module
//
// This module owns every change made to the machine's hosts file:
// - paths: Platform hosts file location and the derived backup path
// - domain_set: Domain-to-loopback mappings and their line format
// - manager: Backup, append and restore lifecycle

pub mod domain_set;
pub mod manager;
pub mod paths;

pub use domain_set::{HostsDomainSet, LOOPBACK_IP};
pub use manager::{HostsManager, restore_from_backup};
pub use paths::HostsPaths;
