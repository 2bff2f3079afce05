// ────────────────────────────────
// src/server/builder.rs
// ────────────────────────────────
use crate::server::listener::bind_tcp;
use anyhow::{Context, Result};
use hyper::{server::conn::Http, Body, Request, Response};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};

/// Pause after a failed accept so persistent errors (e.g. EMFILE) do not spin the loop.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);
use tower::Service;

/// Builder pattern so `main.rs` can inject its request handler.
pub struct ServerBuilder<H> {
    addr: SocketAddr,
    handler: Option<H>,
}

impl<H> ServerBuilder<H>
where
    H: Service<Request<Body>, Response = Response<Body>> + Send + Clone + 'static,
    H::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    H::Future: Send + 'static,
{
    pub fn new(addr: SocketAddr) -> Self {
        Self { addr, handler: None }
    }

    /// Inject the request handler (usually wraps `proxy::Proxy`).
    pub fn with_handler(mut self, handler: H) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Bind the TCP socket without accepting yet, so callers can read the real port.
    pub async fn bind(self) -> Result<BoundServer<H>> {
        let handler = self
            .handler
            .context("handler must be set via with_handler()")?;
        let listener = bind_tcp(self.addr).await?;

        Ok(BoundServer { listener, handler })
    }
}

pub struct BoundServer<H> {
    listener: TcpListener,
    handler: H,
}

impl<H> BoundServer<H>
where
    H: Service<Request<Body>, Response = Response<Body>> + Send + Clone + 'static,
    H::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    H::Future: Send + 'static,
{
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub async fn serve(self) -> Result<()> {
        tracing::info!("HTTP server listening on {}", self.local_addr()?);

        loop {
            let (stream, peer) = accept_next(&self.listener).await;
            let svc = self.handler.clone();

            // One Tokio task per connection.
            tokio::spawn(async move {
                let mut http = Http::new();
                http.http1_only(true);
                if let Err(err) = http.serve_connection(stream, svc).await {
                    tracing::warn!(%peer, %err, "connection error");
                }
            });
        }
    }
}

/// Accept the next connection, backing off and retrying on errors.
async fn accept_next(listener: &TcpListener) -> (TcpStream, SocketAddr) {
    loop {
        match listener.accept().await {
            Ok(accepted) => return accepted,
            Err(err) => {
                tracing::warn!(%err, "failed to accept connection");
                tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
            }
        }
    }
}
