//! HTTP block-list server.
//!
//! One listening socket is bound and a fixed pool of workers all accept from
//! it. Each worker serves one connection at a time, start to finish, before
//! accepting the next. The kernel hands every queued connection to exactly
//! one waiting `accept`, so the workers need no coordination of their own.

pub mod handler;
pub mod http;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::net::{TcpListener, TcpSocket};
use tracing::{Instrument, error, info, info_span, warn};

use crate::catalog::Catalog;
use crate::error::{Error, Result};

pub use handler::{Outcome, handle_connection};

/// Number of connections served concurrently.
pub const WORKERS: usize = 10;

/// Connections the OS queues while every worker is busy. Further connect
/// attempts are refused by the kernel.
pub const ACCEPT_BACKLOG: u32 = 5;

/// Configuration for the block-list server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., 0.0.0.0:8080)
    pub bind_addr: SocketAddr,
    /// Longest a client may take to send its request. `None` waits forever.
    pub read_timeout: Option<Duration>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            read_timeout: None,
        }
    }
}

/// A bound server, ready to start its workers.
pub struct Server {
    listener: TcpListener,
    read_timeout: Option<Duration>,
}

impl Server {
    /// Bind the shared listening socket.
    pub async fn bind(config: &ServerConfig) -> Result<Self> {
        let addr = config.bind_addr;
        let listener = listen(addr).map_err(|source| Error::Bind { addr, source })?;

        Ok(Self {
            listener,
            read_timeout: config.read_timeout,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Start [`WORKERS`] workers on the listener and run until they exit.
    ///
    /// Workers only stop if they panic, so in practice this never returns.
    pub async fn run(self, catalog: Arc<Catalog>) {
        let listener = Arc::new(self.listener);

        let workers = (0..WORKERS).map(|id| {
            let worker = Worker {
                listener: listener.clone(),
                catalog: catalog.clone(),
                read_timeout: self.read_timeout,
            };
            tokio::spawn(worker.run().instrument(info_span!("worker", id = id + 1)))
        });

        for result in join_all(workers).await {
            if let Err(e) = result {
                error!(error = %e, "worker terminated");
            }
        }
    }
}

fn listen(addr: SocketAddr) -> io::Result<TcpListener> {
    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    socket.set_reuseaddr(true)?;
    socket.bind(addr)?;
    socket.listen(ACCEPT_BACKLOG)
}

struct Worker {
    listener: Arc<TcpListener>,
    catalog: Arc<Catalog>,
    read_timeout: Option<Duration>,
}

impl Worker {
    async fn run(self) {
        info!("starting http worker");
        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    handle_connection(stream, peer, &self.catalog, self.read_timeout).await;
                }
                Err(e) => {
                    warn!(error = %e, "accept failed");
                }
            }
        }
    }
}
