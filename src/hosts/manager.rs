use crate::error::{AgentError, Result};
use crate::hosts::domain_set::HostsDomainSet;
use crate::hosts::paths::HostsPaths;
use crate::shutdown::{Shutdown, TerminationSignals};
use log::{debug, error, info, warn};
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};

/// Lifecycle context for the hosts file: one backup per run, append-only injection,
/// and a restore that runs on shutdown or, failing that, when the manager is dropped.
///
/// Mutating operations take `&mut self`; registrations are expected to happen sequentially
/// from the orchestrator before any forwarder starts.
pub struct HostsManager {
    paths: HostsPaths,
    shutdown: Shutdown,
    // Termination watcher already spawned
    watching: bool,
    // A backup exists that this run is responsible for restoring
    restore_pending: bool,
}

impl HostsManager {
    pub fn new(paths: HostsPaths, shutdown: Shutdown) -> Self {
        Self { paths, shutdown, watching: false, restore_pending: false }
    }

    pub fn has_backup(&self) -> bool {
        self.paths.backup().exists()
    }

    /// Register domains for one rule: watch for termination, back up, then append.
    pub fn run(&mut self, domains: &HostsDomainSet) -> Result<()> {
        self.watch_termination_once()?;
        self.ensure_backup();
        self.append_domains(domains)
    }

    /// Install the interrupt/terminate handlers and spawn their watcher the first time this is
    /// called; later calls are no-ops. The handlers are live once this returns.
    /// Must be called from within a tokio runtime.
    pub fn watch_termination_once(&mut self) -> Result<()> {
        if self.watching {
            debug!("Termination watcher already running");
            return Ok(());
        }
        let signals = TerminationSignals::install()?;
        self.watching = true;
        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            signals.recv().await;
            shutdown.trigger();
        });
        debug!("Termination watcher started");
        Ok(())
    }

    /// Copy the hosts file to the backup path unless a backup already exists.
    /// Returns whether a backup is in place afterwards. Failures are logged, not returned.
    pub fn ensure_backup(&mut self) -> bool {
        if self.has_backup() {
            debug!("Already backed up hosts file: {}", self.paths.backup().display());
            self.restore_pending = true;
            return true;
        }
        info!("Backing up hosts from: {} => {}", self.paths.hosts().display(), self.paths.backup().display());
        match self.copy_to_backup() {
            Ok(bytes) => {
                debug!("Backed up {} bytes of {}", bytes, self.paths.hosts().display());
                self.restore_pending = true;
                true
            }
            Err(e) => {
                error!("Failed to back up hosts file {}: {}. The hosts file will NOT be restored on exit", self.paths.hosts().display(), e);
                false
            }
        }
    }

    // Stage then rename so a failed copy never leaves a partial file that looks like a backup.
    fn copy_to_backup(&self) -> std::io::Result<u64> {
        let staging = self.paths.staging();
        let result = fs::copy(self.paths.hosts(), &staging).and_then(|bytes| fs::rename(&staging, self.paths.backup()).map(|_| bytes));
        if result.is_err() {
            let _ = fs::remove_file(&staging);
        }
        result
    }

    /// Append a blank separator line and one line per IP to the hosts file.
    pub fn append_domains(&self, domains: &HostsDomainSet) -> Result<()> {
        if domains.is_empty() {
            warn!("No domains to add to {}", self.paths.hosts().display());
            return Ok(());
        }
        info!("Adding [{}] to <{}>", domains.domains().collect::<Vec<_>>().join(", "), self.paths.hosts().display());
        let hosts_error = |source| AgentError::Hosts { path: self.paths.hosts().to_owned(), source };

        let file = OpenOptions::new().create(true).append(true).open(self.paths.hosts()).map_err(hosts_error)?;
        let mut writer = BufWriter::new(file);
        writeln!(writer).map_err(hosts_error)?;
        for line in domains.lines() {
            debug!("Hosts line: {}", line);
            writeln!(writer, "{}", line).map_err(hosts_error)?;
        }
        writer.flush().map_err(hosts_error)?;
        Ok(())
    }

    /// Put the backup back over the live hosts file. Skipped with a warning if there is no backup.
    pub fn restore(&mut self) -> Result<()> {
        self.restore_pending = false;
        restore_from_backup(&self.paths).map(|_| ())
    }
}

impl Drop for HostsManager {
    fn drop(&mut self) {
        if !self.restore_pending {
            return;
        }
        warn!("Hosts file still redirected while shutting down, restoring");
        if let Err(e) = self.restore() {
            error!("{}", e);
        }
    }
}

/// Rename the backup over the hosts file. Returns `false` when there was no backup to restore.
pub fn restore_from_backup(paths: &HostsPaths) -> Result<bool> {
    if !paths.backup().exists() {
        warn!("No hosts backup at {}, nothing to restore", paths.backup().display());
        return Ok(false);
    }
    info!("Reset origin hosts {} => {}", paths.backup().display(), paths.hosts().display());
    fs::rename(paths.backup(), paths.hosts()).map_err(|source| AgentError::Restore {
        hosts: paths.hosts().to_owned(),
        backup: paths.backup().to_owned(),
        source,
    })?;
    Ok(true)
}
