//
// src/proxy/mod.rs
//
mod backend;
mod proxy;

pub use backend::Backend;
pub use proxy::{Proxy, ProxyError};
