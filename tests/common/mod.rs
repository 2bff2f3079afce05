// tests/common/mod.rs
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Client, Method, Request, Response, Server};
use rotation_balancer::config::BackendErrorPolicy;
use rotation_balancer::load_balancer::RoundRobinBalancer;
use rotation_balancer::proxy::{Backend, Proxy};
use rotation_balancer::server::{RequestHandler, ServerBuilder};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

/// Stub backend: GET answers `server {index}`, POST answers `{body} {index}`.
pub async fn spawn_stub(index: usize) -> SocketAddr {
    let make_svc = make_service_fn(move |_conn| async move {
        Ok::<_, Infallible>(service_fn(move |req| stub_reply(req, index)))
    });

    let server = Server::bind(&SocketAddr::from(([127, 0, 0, 1], 0))).serve(make_svc);
    let addr = server.local_addr();
    tokio::spawn(server);
    addr
}

async fn stub_reply(req: Request<Body>, index: usize) -> Result<Response<Body>, Infallible> {
    let method = req.method().clone();
    let body = hyper::body::to_bytes(req.into_body())
        .await
        .unwrap_or_default();

    let text = if method == Method::POST {
        format!("{} {}", String::from_utf8_lossy(&body), index)
    } else {
        format!("server {index}")
    };

    Ok(Response::builder()
        .header("Content-Type", "text/plain")
        .header("X-Received-Bytes", body.len().to_string())
        .body(Body::from(text))
        .unwrap())
}

pub async fn spawn_stubs(count: usize) -> Vec<String> {
    let mut addresses = Vec::with_capacity(count);
    for index in 0..count {
        addresses.push(format!("http://{}", spawn_stub(index).await));
    }
    addresses
}

/// An address nothing listens on.
pub fn dead_address() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    format!("http://{}", listener.local_addr().unwrap())
}

pub async fn spawn_balancer(
    addresses: &[String],
    policy: BackendErrorPolicy,
) -> (SocketAddr, Arc<RoundRobinBalancer>) {
    let backends = addresses
        .iter()
        .map(|a| Backend::parse(a).unwrap())
        .collect();
    let balancer = Arc::new(RoundRobinBalancer::new(backends).unwrap());
    let proxy = Arc::new(Proxy::new(balancer.clone(), policy));

    let server = ServerBuilder::new(SocketAddr::from(([127, 0, 0, 1], 0)))
        .with_handler(RequestHandler::new(proxy))
        .bind()
        .await
        .unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.serve());

    (addr, balancer)
}

pub async fn get_text(addr: SocketAddr, path: &str) -> String {
    let response = Client::new()
        .get(format!("http://{addr}{path}").parse().unwrap())
        .await
        .unwrap();
    body_text(response).await
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
