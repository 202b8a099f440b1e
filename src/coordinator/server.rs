use std::net::SocketAddr;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;

use super::memory::InMemoryCoordinator;
use super::protocol::{Reply, Request};
use crate::error::CoordinatorError;

const ACCEPT_ERROR_PAUSE: Duration = Duration::from_millis(10);

/// Minimal coordination service for one test run.
///
/// Hosts an [`InMemoryCoordinator`] behind the line protocol. Runs an accept
/// loop on its own task; [`close`](Self::close) cancels it and waits for the
/// loop and every open connection to finish.
pub struct CoordinatorServer {
    address: SocketAddr,
    store: InMemoryCoordinator,
    token: CancellationToken,
    accept: Mutex<Option<JoinHandle<()>>>,
}

impl CoordinatorServer {
    /// Binds `addr` and starts serving. Use port 0 for an ephemeral port.
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn bind(addr: impl ToSocketAddrs) -> Result<Self, CoordinatorError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| CoordinatorError::Connect {
                address: "<bind>".to_string(),
                source,
            })?;
        let address = listener.local_addr()?;
        let store = InMemoryCoordinator::new();
        let token = CancellationToken::new();

        let handle = tokio::spawn(accept_loop(listener, store.clone(), token.clone()));
        Ok(Self {
            address,
            store,
            token,
            accept: Mutex::new(Some(handle)),
        })
    }

    /// Returns the bound address as `host:port`, ready for
    /// [`InterruptConfig::coordinator_address`](crate::InterruptConfig::coordinator_address).
    pub fn address(&self) -> String {
        self.address.to_string()
    }

    /// Returns the bound socket address.
    pub fn local_addr(&self) -> SocketAddr {
        self.address
    }

    /// Posts an abort for `group` without going through the network.
    pub fn post_abort(&self, group: &str) {
        self.store.abort(group);
    }

    /// Returns `true` if `group` was aborted.
    pub fn is_aborted(&self, group: &str) -> bool {
        self.store.contains(group)
    }

    /// Stops accepting, closes open connections and waits for all of it to finish.
    ///
    /// Idempotent.
    pub async fn close(&self) {
        self.token.cancel();
        let handle = self
            .accept
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(h) = handle {
            let _ = h.await;
        }
    }
}

impl Drop for CoordinatorServer {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

async fn accept_loop(listener: TcpListener, store: InMemoryCoordinator, token: CancellationToken) {
    let mut conns = JoinSet::new();
    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            res = listener.accept() => match res {
                Ok((stream, _peer)) => {
                    conns.spawn(serve(stream, store.clone(), token.clone()));
                }
                Err(_) => {
                    if !pause_after_accept_error(&token).await {
                        break;
                    }
                }
            },
            Some(_) = conns.join_next(), if !conns.is_empty() => {}
        }
    }
    conns.shutdown().await;
}

/// Waits out a transient accept failure (EMFILE, aborted handshake) so the loop
/// does not spin. Returns `false` if the server was closed meanwhile.
async fn pause_after_accept_error(token: &CancellationToken) -> bool {
    tokio::select! {
        _ = token.cancelled() => false,
        _ = tokio::time::sleep(ACCEPT_ERROR_PAUSE) => true,
    }
}

async fn serve(stream: TcpStream, store: InMemoryCoordinator, token: CancellationToken) {
    let (read, mut write) = stream.into_split();
    let mut lines = BufReader::new(read).lines();
    loop {
        let line = tokio::select! {
            _ = token.cancelled() => break,
            line = lines.next_line() => line,
        };
        let reply = match line {
            Ok(Some(line)) => handle(&store, &line),
            Ok(None) | Err(_) => break,
        };
        if write.write_all(reply.encode().as_bytes()).await.is_err() {
            break;
        }
    }
}

fn handle(store: &InMemoryCoordinator, line: &str) -> Reply {
    match Request::parse(line) {
        Ok(Request::Status { group }) if store.contains(&group) => Reply::Aborted,
        Ok(Request::Status { .. }) => Reply::Running,
        Ok(Request::Abort { group }) => {
            store.abort(&group);
            Reply::Ok
        }
        Err(reason) => Reply::Err(reason),
    }
}
