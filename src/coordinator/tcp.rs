use std::net::SocketAddr;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpStream, lookup_host};

use super::Coordinator;
use super::protocol::{Reply, Request};
use crate::error::CoordinatorError;

/// Client for a [`CoordinatorServer`](super::CoordinatorServer).
///
/// Opens one short-lived connection per request, so a server restart or a
/// dropped connection only costs the request in flight. Construction never
/// touches the network; a bad address surfaces on the first request.
#[derive(Clone, Debug)]
pub struct TcpCoordinator {
    address: String,
}

impl TcpCoordinator {
    /// Creates a client for `address` (`host:port`).
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }

    /// Returns the configured address.
    pub fn address(&self) -> &str {
        &self.address
    }

    async fn resolve(&self) -> Result<Vec<SocketAddr>, CoordinatorError> {
        let invalid = |reason: String| CoordinatorError::InvalidAddress {
            address: self.address.clone(),
            reason,
        };
        let addrs: Vec<SocketAddr> = lookup_host(self.address.as_str())
            .await
            .map_err(|e| invalid(e.to_string()))?
            .collect();
        if addrs.is_empty() {
            return Err(invalid("no addresses resolved".to_string()));
        }
        Ok(addrs)
    }

    async fn call(&self, req: Request) -> Result<Reply, CoordinatorError> {
        let addrs = self.resolve().await?;
        let stream = connect_any(&self.address, addrs).await?;

        let (read, mut write) = stream.into_split();
        write.write_all(req.encode().as_bytes()).await?;
        write.flush().await?;

        let mut line = String::new();
        let n = BufReader::new(read).read_line(&mut line).await?;
        if n == 0 {
            return Err(CoordinatorError::Protocol {
                reply: "<connection closed>".to_string(),
            });
        }
        Reply::parse(&line)
    }
}

#[async_trait]
impl Coordinator for TcpCoordinator {
    async fn is_aborted(&self, group: &str) -> Result<bool, CoordinatorError> {
        let req = Request::Status {
            group: group.to_string(),
        };
        match self.call(req).await? {
            Reply::Aborted => Ok(true),
            Reply::Running => Ok(false),
            other => Err(unexpected(other)),
        }
    }

    async fn post_abort(&self, group: &str) -> Result<(), CoordinatorError> {
        let req = Request::Abort {
            group: group.to_string(),
        };
        match self.call(req).await? {
            Reply::Ok => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    fn name(&self) -> &'static str {
        "tcp"
    }
}

/// Dials `addrs` in resolver order and returns the first stream that connects.
///
/// A name like `localhost` may resolve to `::1` before `127.0.0.1`; a server
/// bound to only one family must still be reachable.
async fn connect_any(
    address: &str,
    addrs: impl IntoIterator<Item = SocketAddr>,
) -> Result<TcpStream, CoordinatorError> {
    let mut last = None;
    for addr in addrs {
        match TcpStream::connect(addr).await {
            Ok(stream) => return Ok(stream),
            Err(e) => last = Some(e),
        }
    }
    Err(match last {
        Some(source) => CoordinatorError::Connect {
            address: address.to_string(),
            source,
        },
        None => CoordinatorError::InvalidAddress {
            address: address.to_string(),
            reason: "no addresses resolved".to_string(),
        },
    })
}

fn unexpected(reply: Reply) -> CoordinatorError {
    CoordinatorError::Protocol {
        reply: reply.encode().trim_end().to_string(),
    }
}
