//! Per-connection request handling.
//!
//! A connection carries exactly one request. The head is read, the path is
//! resolved into a [`Selector`], and either an error response or the default
//! hosts followed by the combined block list is written back. Failures stay
//! inside this module: nothing here can take down the worker.

use std::io;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use super::http::{self, Method, RequestError, RequestHead, StatusCode};
use crate::catalog::Catalog;
use crate::combine::combine_lists;
use crate::selector::{Selector, SelectorError};

/// How a connection ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The block list was written in full.
    Served,
    /// An error response with this status was written.
    Rejected(StatusCode),
    /// The client sent no request, or took too long to send it.
    NoRequest,
    /// The connection broke while the response was being written.
    Disconnected,
}

/// Serve one connection to completion.
pub async fn handle_connection<S>(
    stream: S,
    peer: SocketAddr,
    catalog: &Catalog,
    read_timeout: Option<Duration>,
) -> Outcome
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut stream = BufReader::new(stream);

    let outcome = match read_head(&mut stream, read_timeout).await {
        Ok(head) => {
            let outcome = respond(&mut stream, &head, catalog)
                .await
                .unwrap_or_else(connection_fault);
            info!(client = %peer, request = %head.request_line, ?outcome, "request complete");
            outcome
        }
        Err(err) => reject_request(&mut stream, peer, err).await,
    };

    let _ = stream.shutdown().await;
    outcome
}

async fn read_head<S>(
    stream: &mut BufReader<S>,
    read_timeout: Option<Duration>,
) -> Result<RequestHead, RequestError>
where
    S: AsyncRead + Unpin,
{
    match read_timeout {
        Some(limit) => tokio::time::timeout(limit, http::read_request_head(stream))
            .await
            .unwrap_or(Err(RequestError::TimedOut)),
        None => http::read_request_head(stream).await,
    }
}

async fn respond<W>(writer: &mut W, head: &RequestHead, catalog: &Catalog) -> io::Result<Outcome>
where
    W: AsyncWrite + Unpin,
{
    match &head.method {
        Method::Get => serve_block_list(writer, &head.path, catalog).await,
        Method::Other(method) => {
            let status = StatusCode::NotImplemented;
            http::write_error(writer, status, &format!("unsupported method ({method})")).await?;
            Ok(Outcome::Rejected(status))
        }
    }
}

async fn serve_block_list<W>(writer: &mut W, path: &str, catalog: &Catalog) -> io::Result<Outcome>
where
    W: AsyncWrite + Unpin,
{
    let selector = match Selector::resolve(path, catalog.lists()) {
        Ok(selector) => selector,
        Err(err) => {
            match &err {
                SelectorError::Malformed => warn!(path, "invalid request to endpoint"),
                SelectorError::UnknownListId(id) => {
                    warn!(path, id = %id, "invalid list id in request")
                }
            }
            let status = StatusCode::NotFound;
            http::write_error(writer, status, &err.to_string()).await?;
            return Ok(Outcome::Rejected(status));
        }
    };

    info!(path, "handling request");

    // The default hosts go out before the list is built so the client gets
    // a usable prefix straight away.
    writer
        .write_all(http::response_head(StatusCode::Ok, None).as_bytes())
        .await?;
    writer.write_all(catalog.default_hosts().as_bytes()).await?;
    writer.flush().await?;

    let start = Instant::now();
    let block_list = combine_lists(catalog.lists(), &selector);
    debug!(
        combination = %selector,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "block list generated"
    );

    writer.write_all(block_list.as_bytes()).await?;
    writer.flush().await?;

    Ok(Outcome::Served)
}

async fn reject_request<W>(writer: &mut W, peer: SocketAddr, err: RequestError) -> Outcome
where
    W: AsyncWrite + Unpin,
{
    let Some(status) = err.status() else {
        return match err {
            RequestError::Io(e) => connection_fault(e),
            RequestError::TimedOut => {
                info!(client = %peer, "timed out waiting for request");
                Outcome::NoRequest
            }
            _ => {
                debug!(client = %peer, "connection closed without a request");
                Outcome::NoRequest
            }
        };
    };

    warn!(client = %peer, error = %err, "malformed request");
    match http::write_error(writer, status, &err.to_string()).await {
        Ok(()) => Outcome::Rejected(status),
        Err(e) => connection_fault(e),
    }
}

fn connection_fault(err: io::Error) -> Outcome {
    match err.kind() {
        io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::BrokenPipe => info!(error = %err, "client went away"),
        _ => warn!(error = %err, "connection error"),
    }
    Outcome::Disconnected
}
