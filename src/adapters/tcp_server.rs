//! Plain TCP command listener.
//!
//! Implements [`ListenerPort`]: a single-client passive socket on the
//! command port.  `std::net` is backed by lwIP on ESP-IDF, so the same code
//! runs on the device and on the host.
//!
//! ## Connection model
//!
//! 1. [`TcpCommandServer::bind`] binds `0.0.0.0:<port>` in non-blocking mode.
//! 2. [`poll_client`](ListenerPort::poll_client) accepts any pending
//!    connection.  A newcomer replaces the current client, whose socket is
//!    dropped.
//! 3. The active client is returned only when it has unread data
//!    (checked with a non-blocking `peek`).
//! 4. EOF or a socket error drops the client and the listener goes idle.

use core::fmt;
use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};

use log::{debug, info, warn};

use crate::app::ports::{ClientPort, ListenerFactory, ListenerPort};

// ───────────────────────────────────────────────────────────────
// Error type
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerError {
    /// The socket could not be bound (network stack down, port in use).
    Bind,
    /// Non-blocking mode could not be set.
    Configure,
}

impl fmt::Display for ListenerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bind => write!(f, "TCP bind failed"),
            Self::Configure => write!(f, "failed to set non-blocking mode"),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Client
// ───────────────────────────────────────────────────────────────

/// The connected client.
pub struct TcpClient {
    stream: TcpStream,
    peer: SocketAddr,
    closed: bool,
}

impl TcpClient {
    fn new(stream: TcpStream, peer: SocketAddr) -> Self {
        Self {
            stream,
            peer,
            closed: false,
        }
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Non-blocking readiness check.  Marks the client closed on EOF.
    fn has_data(&mut self) -> bool {
        let mut probe = [0u8; 1];
        match self.stream.peek(&mut probe) {
            Ok(0) => {
                self.closed = true;
                false
            }
            Ok(_) => true,
            Err(ref e) if e.kind() == ErrorKind::WouldBlock => false,
            Err(e) => {
                debug!("TCP: peek error from {}: {}", self.peer, e);
                self.closed = true;
                false
            }
        }
    }
}

impl ClientPort for TcpClient {
    fn read_byte(&mut self) -> Option<u8> {
        let mut buf = [0u8; 1];
        match self.stream.read(&mut buf) {
            Ok(1) => Some(buf[0]),
            Ok(_) => {
                self.closed = true;
                None
            }
            Err(ref e) if e.kind() == ErrorKind::WouldBlock => None,
            Err(e) => {
                debug!("TCP: read error from {}: {}", self.peer, e);
                self.closed = true;
                None
            }
        }
    }

    fn write_byte(&mut self, value: u8) {
        match self.stream.write(&[value]) {
            Ok(_) => {}
            Err(ref e) if e.kind() == ErrorKind::WouldBlock => {
                warn!("TCP: send buffer full, reply {:#04x} dropped", value);
            }
            Err(e) => {
                debug!("TCP: write error to {}: {}", self.peer, e);
                self.closed = true;
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Server
// ───────────────────────────────────────────────────────────────

pub struct TcpCommandServer {
    listener: TcpListener,
    client: Option<TcpClient>,
}

impl TcpCommandServer {
    /// Bind `0.0.0.0:<port>`.  Port `0` lets the OS pick (host tests; use
    /// [`local_addr`](Self::local_addr) to discover it).
    pub fn bind(port: u16) -> Result<Self, ListenerError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = TcpListener::bind(addr).map_err(|e| {
            warn!("TCP: bind {} failed: {}", addr, e);
            ListenerError::Bind
        })?;
        listener
            .set_nonblocking(true)
            .map_err(|_| ListenerError::Configure)?;

        info!("TCP: listening on port {}", port);
        Ok(Self {
            listener,
            client: None,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ListenerError> {
        self.listener.local_addr().map_err(|_| ListenerError::Bind)
    }

    pub fn is_connected(&self) -> bool {
        self.client.is_some()
    }

    pub fn peer(&self) -> Option<SocketAddr> {
        self.client.as_ref().map(TcpClient::peer)
    }

    /// Drop the active client, if any.
    pub fn disconnect(&mut self) {
        if let Some(client) = self.client.take() {
            info!("TCP: client {} disconnected", client.peer);
        }
    }

    fn accept_pending(&mut self) {
        match self.listener.accept() {
            Ok((stream, peer)) => {
                if let Err(e) = stream.set_nonblocking(true) {
                    warn!("TCP: failed to set non-blocking on {}: {}", peer, e);
                    return;
                }
                if let Some(old) = self.client.replace(TcpClient::new(stream, peer)) {
                    info!("TCP: client {} replaced by {}", old.peer, peer);
                } else {
                    info!("TCP: client connected from {}", peer);
                }
            }
            Err(ref e) if e.kind() == ErrorKind::WouldBlock => {}
            Err(e) => warn!("TCP: accept error: {}", e),
        }
    }
}

impl ListenerPort for TcpCommandServer {
    type Client = TcpClient;

    fn poll_client(&mut self) -> Option<&mut TcpClient> {
        self.accept_pending();

        if self.client.as_ref().is_some_and(|c| c.closed) {
            self.disconnect();
        }

        let ready = self.client.as_mut().is_some_and(TcpClient::has_data);
        if !ready {
            if self.client.as_ref().is_some_and(|c| c.closed) {
                self.disconnect();
            }
            return None;
        }
        self.client.as_mut()
    }
}

/// Bootstrap hook that binds a [`TcpCommandServer`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpListenerFactory;

impl ListenerFactory for TcpListenerFactory {
    type Listener = TcpCommandServer;

    fn start(self, port: u16) -> Result<TcpCommandServer, ListenerError> {
        TcpCommandServer::bind(port)
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
