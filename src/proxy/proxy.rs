// ────────────────────────────────
// src/proxy/proxy.rs
// Forwards each inbound request to the next backend and relays the reply.
// ────────────────────────────────

use crate::config::BackendErrorPolicy;
use crate::load_balancer::LoadBalancer;
use hyper::client::HttpConnector;
use hyper::header::{HeaderValue, ALLOW, CONTENT_TYPE};
use hyper::{Body, Client, Method, Request, Response, StatusCode};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct Proxy {
    balancer: Arc<dyn LoadBalancer>,
    client: Client<HttpConnector>,
    on_backend_error: BackendErrorPolicy,
}

impl Proxy {
    pub fn new(balancer: Arc<dyn LoadBalancer>, on_backend_error: BackendErrorPolicy) -> Self {
        // One fresh connection per forwarded request; nothing is kept idle.
        let client = Client::builder().pool_max_idle_per_host(0).build_http();

        Self {
            balancer,
            client,
            on_backend_error,
        }
    }

    pub async fn handle(&self, req: Request<Body>) -> Result<Response<Body>, ProxyError> {
        if req.method() != Method::GET && req.method() != Method::POST {
            debug!(method = %req.method(), uri = %req.uri(), "rejecting unsupported method");
            return Ok(method_not_allowed());
        }

        match self.forward(req).await {
            Ok(response) => Ok(response),
            Err(err) => match self.on_backend_error {
                BackendErrorPolicy::Reset => Err(err),
                BackendErrorPolicy::BadGateway => {
                    warn!(%err, "answering with error response");
                    Ok(err.into())
                }
            },
        }
    }

    async fn forward(&self, req: Request<Body>) -> Result<Response<Body>, ProxyError> {
        let (parts, body) = req.into_parts();
        let body = hyper::body::to_bytes(body)
            .await
            .map_err(ProxyError::InboundBody)?;

        let backend = self.balancer.take_next();
        let uri = backend.target_uri(parts.uri.path_and_query())?;

        debug!(
            backend = %backend,
            method = %parts.method,
            %uri,
            body_len = body.len(),
            "forwarding request"
        );

        // Headers go out exactly as they came in.
        let mut outbound = Request::new(Body::from(body));
        *outbound.method_mut() = parts.method;
        *outbound.uri_mut() = uri;
        *outbound.headers_mut() = parts.headers;

        let backend_error = |source: hyper::Error| ProxyError::Backend {
            backend: backend.id.clone(),
            source,
        };

        let response = self.client.request(outbound).await.map_err(backend_error)?;
        let (parts, body) = response.into_parts();
        let body = hyper::body::to_bytes(body).await.map_err(backend_error)?;

        debug!(backend = %backend, status = parts.status.as_u16(), body_len = body.len(), "relaying response");

        Ok(Response::from_parts(parts, Body::from(body)))
    }
}

fn method_not_allowed() -> Response<Body> {
    let mut response = Response::new(Body::from("Method Not Allowed"));
    *response.status_mut() = StatusCode::METHOD_NOT_ALLOWED;
    response
        .headers_mut()
        .insert(ALLOW, HeaderValue::from_static("GET, POST"));
    response
}

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("failed to read inbound request body: {0}")]
    InboundBody(#[source] hyper::Error),

    #[error("invalid target uri {0}")]
    InvalidTarget(String),

    #[error("backend {backend} failed: {source}")]
    Backend {
        backend: String,
        #[source]
        source: hyper::Error,
    },
}

impl From<ProxyError> for Response<Body> {
    fn from(err: ProxyError) -> Self {
        let (status, message) = match err {
            ProxyError::InboundBody(_) => (StatusCode::BAD_REQUEST, "Bad request"),
            ProxyError::InvalidTarget(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Invalid backend target"),
            ProxyError::Backend { .. } => (StatusCode::BAD_GATEWAY, "Bad gateway"),
        };

        let mut response = Response::new(Body::from(message));
        *response.status_mut() = status;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        response
    }
}
