use crate::error::ConnectionError;
use log::trace;
use tokio::io;
use tokio::net::TcpStream;

/// Which copy loop finished first, and how many bytes it carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayEnd {
    ClientClosed { bytes: u64 },
    BackendClosed { bytes: u64 },
}

/// Copy bytes both ways until either direction hits EOF or an error, then close both sockets.
pub async fn relay(client: TcpStream, backend: TcpStream) -> Result<RelayEnd, ConnectionError> {
    let (mut client_read, mut client_write) = client.into_split();
    let (mut backend_read, mut backend_write) = backend.into_split();

    let upstream = io::copy(&mut client_read, &mut backend_write);
    let downstream = io::copy(&mut backend_read, &mut client_write);

    // The losing copy is dropped here, and every half goes out of scope on return.
    let end = tokio::select! {
        res = upstream => RelayEnd::ClientClosed { bytes: res.map_err(ConnectionError::Relay)? },
        res = downstream => RelayEnd::BackendClosed { bytes: res.map_err(ConnectionError::Relay)? },
    };
    trace!("Relay finished: {:?}", end);
    Ok(end)
}
