//! Client core for SharePoint list CRUD over the REST API.
//!
//! # Overview
//! `ListClient` builds `HttpRequest` values and parses `HttpResponse` values
//! without touching the network (host-does-IO pattern). `Session` runs the
//! full call flow on top of it: entity-type lookup, request digest, one
//! request, one parsed response.
//!
//! # Design
//! - `ListClient` is stateless; it holds only the site URL.
//! - Network and digest access sit behind the `Transport` and `TokenSource`
//!   traits, so every step can be driven from tests.
//! - Items are untyped JSON objects; the list schema belongs to the server.
//! - A non-2xx status is the only error raised here. It keeps the raw body.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod session;
pub mod token;
pub mod transport;
pub mod types;

pub use cache::MetadataCache;
pub use client::{encode_component, ListClient};
pub use config::ClientConfig;
pub use error::{ApiError, Operation};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use session::Session;
pub use token::{ContextInfoToken, EnvToken, StaticToken, TokenSource};
pub use transport::{ReqwestTransport, Transport};
pub use types::{ContextInfo, EntityType, Fields, ItemId};
