use crate::config::rules::ForwardingRule;
use crate::error::{AgentError, Result};
use crate::hosts::{HostsDomainSet, HostsManager, HostsPaths};
use crate::proxy::Forwarder;
use crate::shutdown::Shutdown;
use log::{debug, info, warn};
use std::net::SocketAddr;
use tokio::task::JoinHandle;

/// Registers each rule's domains in the hosts file, then starts its forwarder.
pub struct Agent {
    rules: Vec<ForwardingRule>,
    hosts: HostsPaths,
    shutdown: Shutdown,
}

/// Every forwarder bound and serving; dropping it without [`RunningAgent::wait`] still restores the hosts file.
pub struct RunningAgent {
    hosts: HostsManager,
    shutdown: Shutdown,
    forwarders: Vec<JoinHandle<()>>,
    local_addrs: Vec<SocketAddr>,
}

impl Agent {
    pub fn new(rules: Vec<ForwardingRule>, hosts: HostsPaths) -> Self {
        Self { rules, hosts, shutdown: Shutdown::new() }
    }

    /// Handle that stops the agent as if a termination signal had arrived.
    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    pub async fn run(self) -> Result<()> {
        self.start().await?.wait().await
    }

    /// Register and bind every rule in order. A rule's listener is only bound after its
    /// domains are in the hosts file. Any error aborts startup and restores the hosts file.
    pub async fn start(self) -> Result<RunningAgent> {
        let mut running = RunningAgent {
            hosts: HostsManager::new(self.hosts, self.shutdown.clone()),
            shutdown: self.shutdown,
            forwarders: Vec::with_capacity(self.rules.len()),
            local_addrs: Vec::with_capacity(self.rules.len()),
        };

        for rule in &self.rules {
            if let Err(e) = running.activate(rule).await {
                running.shutdown.trigger();
                return Err(e);
            }
        }

        if self.rules.is_empty() {
            warn!("No forwarding rules configured, waiting for termination");
        }
        Ok(running)
    }
}

impl RunningAgent {
    async fn activate(&mut self, rule: &ForwardingRule) -> Result<()> {
        debug!("Registering {} rule on {}", rule.kind(), rule.listen());
        let domains = HostsDomainSet::loopback(rule.exposed_domains());
        self.hosts.run(&domains)?;

        let forwarder = Forwarder::bind(rule).await?;
        let addr = forwarder.local_addr().map_err(|source| AgentError::Listen { addr: rule.listen().to_string(), source })?;
        self.local_addrs.push(addr);
        self.forwarders.push(tokio::spawn(forwarder.serve(self.shutdown.subscribe())));

        match rule {
            ForwardingRule::Tcp(tcp) => info!("TCP forwarding rule created.\t({} => {})", tcp.expose, tcp.backend),
            ForwardingRule::Http(http) => {
                for route in &http.routes {
                    info!("Http forwarding rule created.\t({} [{}] => {})", route.expose, route.location(), route.backend);
                }
            }
        }
        Ok(())
    }

    /// Bound listener addresses, in rule order.
    pub fn local_addrs(&self) -> &[SocketAddr] {
        &self.local_addrs
    }

    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Block until shutdown, stop the accept loops, then restore the hosts file.
    /// In-flight relays are not drained.
    pub async fn wait(mut self) -> Result<()> {
        if !self.shutdown.is_triggered() {
            info!("Forwarding {} rule(s), press Ctrl+C to stop", self.forwarders.len());
        }
        self.shutdown.subscribe().recv().await;
        info!("Shutting down");
        for forwarder in self.forwarders.drain(..) {
            if let Err(e) = forwarder.await {
                warn!("Forwarder task ended abnormally: {}", e);
            }
        }
        debug!("All forwarders stopped");
        self.hosts.restore()
    }
}
