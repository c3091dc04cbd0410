use crate::config::rules::{HttpRule, RouteEntry};
use crate::error::{ConnectionError, Result};
use crate::proxy::relay::relay;
use crate::proxy::request_head::{REQUEST_HEAD_BUFFER_SIZE, RequestHead};
use crate::proxy::router::{Resolution, resolve_backend};
use crate::proxy::{accept_loop, bind_listener};
use crate::shutdown::ShutdownSignal;
use log::{debug, info};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Literal reply sent to a CONNECT request once the backend is reachable.
pub const CONNECT_ESTABLISHED: &[u8] = b"HTTP/1.1 200 Connection established\r\n\r\n";

/// Minimal HTTP/CONNECT proxy that picks a backend from its route table.
pub struct HttpForwarder {
    listener: TcpListener,
    routes: Arc<[RouteEntry]>,
}

impl HttpForwarder {
    pub async fn bind(rule: &HttpRule) -> Result<Self> {
        let listener = bind_listener("HTTP", &rule.listen).await?;
        Ok(Self { listener, routes: Arc::from(rule.routes.as_slice()) })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub async fn serve(self, shutdown: ShutdownSignal) {
        let addr = self.local_addr().map(|a| a.to_string()).unwrap_or_else(|_| "?".to_string());
        info!("HTTP forwarder listening on {} with {} route(s)", addr, self.routes.len());
        let routes = self.routes;
        accept_loop(self.listener, shutdown, "HTTP", move |client, peer| handle_client(client, peer, routes.clone())).await;
    }
}

async fn handle_client(mut client: TcpStream, peer: SocketAddr, routes: Arc<[RouteEntry]>) -> std::result::Result<(), ConnectionError> {
    // A single read: the request line and Host must both be in here.
    let mut buf = [0u8; REQUEST_HEAD_BUFFER_SIZE];
    let read = client.read(&mut buf).await.map_err(ConnectionError::Read)?;
    if read == 0 {
        return Err(ConnectionError::MalformedRequest("connection closed before any request bytes".to_string()));
    }
    let prefix = &buf[..read];

    let head = RequestHead::parse(prefix)?;
    let resolution = resolve_backend(&routes, &head);
    let backend_addr = resolution.backend();
    match &resolution {
        Resolution::Routed { backend, expose, location } => {
            info!("{} {} {} (Host: {}) via {} [{}] => {}", peer, head.method, head.target, head.host, expose, location, backend)
        }
        Resolution::Fallthrough { backend } => debug!("{} {} {} (Host: {}) => {}", peer, head.method, head.target, head.host, backend),
    }

    let mut backend = TcpStream::connect(backend_addr).await.map_err(|source| ConnectionError::Dial { addr: backend_addr.to_string(), source })?;

    if head.is_connect() {
        client.write_all(CONNECT_ESTABLISHED).await.map_err(|source| ConnectionError::Write { peer: "client", source })?;
    } else {
        backend.write_all(prefix).await.map_err(|source| ConnectionError::Write { peer: "backend", source })?;
    }

    let end = relay(client, backend).await?;
    debug!("{} relay to {} closed: {:?}", peer, backend_addr, end);
    Ok(())
}
