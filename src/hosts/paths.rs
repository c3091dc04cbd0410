use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Suffix appended to the hosts file name to form the backup path, e.g. `/etc/hostsbak`.
pub const BACKUP_SUFFIX: &str = "bak";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostsPaths {
    hosts: PathBuf,
    backup: PathBuf,
}

impl HostsPaths {
    pub fn new(hosts: impl Into<PathBuf>) -> Self {
        let hosts = hosts.into();
        let backup = derive_backup_path(&hosts);
        Self { hosts, backup }
    }

    /// Paths for the hosts file of the running platform.
    pub fn system() -> Self {
        Self::new(system_hosts_path())
    }

    pub fn hosts(&self) -> &Path {
        &self.hosts
    }

    pub fn backup(&self) -> &Path {
        &self.backup
    }

    /// Scratch file the backup is staged in before being renamed into place.
    pub(crate) fn staging(&self) -> PathBuf {
        let mut name = self.backup.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

fn derive_backup_path(hosts: &Path) -> PathBuf {
    let mut name: OsString = hosts.file_name().map(|n| n.to_owned()).unwrap_or_else(|| OsString::from("hosts"));
    name.push(BACKUP_SUFFIX);
    hosts.with_file_name(name)
}

#[cfg(windows)]
pub fn system_hosts_path() -> PathBuf {
    let root = std::env::var_os("SystemRoot").unwrap_or_else(|| OsString::from(r"C:\Windows"));
    PathBuf::from(root).join("System32").join("drivers").join("etc").join("hosts")
}

#[cfg(not(windows))]
pub fn system_hosts_path() -> PathBuf {
    PathBuf::from("/etc/hosts")
}
