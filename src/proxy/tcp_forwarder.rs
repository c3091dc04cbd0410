use crate::config::rules::TcpRule;
use crate::error::{ConnectionError, Result};
use crate::proxy::relay::relay;
use crate::proxy::{accept_loop, bind_listener};
use crate::shutdown::ShutdownSignal;
use log::{debug, info};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};

/// Relays every accepted connection byte-for-byte to one fixed backend.
pub struct TcpForwarder {
    listener: TcpListener,
    backend: Arc<str>,
    expose: String,
}

impl TcpForwarder {
    pub async fn bind(rule: &TcpRule) -> Result<Self> {
        let listener = bind_listener("TCP", &rule.listen).await?;
        Ok(Self { listener, backend: Arc::from(rule.backend.as_str()), expose: rule.expose.clone() })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub async fn serve(self, shutdown: ShutdownSignal) {
        let addr = self.local_addr().map(|a| a.to_string()).unwrap_or_else(|_| "?".to_string());
        info!("TCP forwarder listening on {} ({} => {})", addr, self.expose, self.backend);
        let backend = self.backend;
        accept_loop(self.listener, shutdown, "TCP", move |inbound, peer| forward_connection(inbound, peer, backend.clone())).await;
    }
}

async fn forward_connection(inbound: TcpStream, peer: SocketAddr, backend: Arc<str>) -> std::result::Result<(), ConnectionError> {
    let outbound = TcpStream::connect(&*backend).await.map_err(|source| ConnectionError::Dial { addr: backend.to_string(), source })?;
    debug!("TCP tunnel open {} -> {}", peer, backend);
    let end = relay(inbound, outbound).await?;
    debug!("TCP tunnel closed {} -> {}: {:?}", peer, backend, end);
    Ok(())
}
