// Proxy module
//
// This module contains the forwarding engine split into focused submodules:
// - tcp_forwarder: Raw TCP tunnel to a fixed backend
// - http_forwarder: Minimal HTTP/CONNECT proxy with pattern routing
// - request_head: Single-read request line and Host parsing
// - router: Backend selection from the ordered route table
// - relay: Bidirectional byte copy shared by both forwarders

pub mod http_forwarder;
pub mod relay;
pub mod request_head;
pub mod router;
pub mod tcp_forwarder;

pub use http_forwarder::HttpForwarder;
pub use tcp_forwarder::TcpForwarder;

use crate::config::rules::ForwardingRule;
use crate::error::{AgentError, ConnectionError, Result};
use crate::shutdown::ShutdownSignal;
use crate::utils::validation::is_empty_or_whitespace;
use log::{debug, error, info};
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};

/// A bound listener for one forwarding rule, ready to serve.
pub enum Forwarder {
    Tcp(TcpForwarder),
    Http(HttpForwarder),
}

impl Forwarder {
    pub async fn bind(rule: &ForwardingRule) -> Result<Self> {
        match rule {
            ForwardingRule::Tcp(rule) => Ok(Forwarder::Tcp(TcpForwarder::bind(rule).await?)),
            ForwardingRule::Http(rule) => Ok(Forwarder::Http(HttpForwarder::bind(rule).await?)),
        }
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        match self {
            Forwarder::Tcp(forwarder) => forwarder.local_addr(),
            Forwarder::Http(forwarder) => forwarder.local_addr(),
        }
    }

    /// Accept connections until shutdown is signalled.
    pub async fn serve(self, shutdown: ShutdownSignal) {
        match self {
            Forwarder::Tcp(forwarder) => forwarder.serve(shutdown).await,
            Forwarder::Http(forwarder) => forwarder.serve(shutdown).await,
        }
    }
}

pub(crate) async fn bind_listener(kind: &'static str, addr: &str) -> Result<TcpListener> {
    if is_empty_or_whitespace(addr) {
        return Err(AgentError::EmptyListenAddress { kind });
    }
    TcpListener::bind(addr).await.map_err(|source| AgentError::Listen { addr: addr.to_string(), source })
}

/// Spawn one task per accepted connection. Connection failures are logged and never stop the loop.
pub(crate) async fn accept_loop<F, Fut>(listener: TcpListener, mut shutdown: ShutdownSignal, kind: &'static str, handler: F)
where
    F: Fn(TcpStream, SocketAddr) -> Fut,
    Fut: Future<Output = std::result::Result<(), ConnectionError>> + Send + 'static,
{
    loop {
        tokio::select! {
            _ = shutdown.recv() => {
                info!("{} forwarder stopped accepting", kind);
                break;
            }
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    debug!("{} connection accepted from {}", kind, peer);
                    let connection = handler(stream, peer);
                    tokio::spawn(async move {
                        if let Err(e) = connection.await {
                            error!("{} connection from {} dropped: {}", kind, peer, e);
                        }
                    });
                }
                Err(e) => {
                    error!("{} accept error: {}", kind, e);
                    tokio::time::sleep(Duration::from_millis(200)).await;
                }
            }
        }
    }
}
