// src/server/handler.rs
use hyper::{Body, Request, Response};
use std::sync::Arc;
use tower::Service;
use tracing::Instrument;
use uuid::Uuid;

use crate::proxy::Proxy;

#[derive(Clone)]
pub struct RequestHandler {
    proxy: Arc<Proxy>,
}

impl RequestHandler {
    pub fn new(proxy: Arc<Proxy>) -> Self {
        Self { proxy }
    }
}

impl Service<Request<Body>> for RequestHandler {
    type Response = Response<Body>;
    type Error = Box<dyn std::error::Error + Send + Sync>;
    type Future = futures::future::BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let proxy = self.proxy.clone();
        let span = tracing::info_span!(
            "request",
            id = %Uuid::new_v4(),
            method = %req.method(),
            uri = %req.uri()
        );

        Box::pin(
            async move {
                // An Err here makes hyper drop the connection without a response.
                proxy.handle(req).await.map_err(|e| {
                    tracing::error!(%e, "proxy error");
                    Box::new(e) as Box<dyn std::error::Error + Send + Sync>
                })
            }
            .instrument(span),
        )
    }
}
