//! Client core for the product catalog API.
//!
//! # Overview
//! Every call goes through `ApiClient`: it builds an `HttpRequest`, attaches
//! the cached bearer token, hands the request to a `Transport`, and folds
//! whatever happens into an `ApiResponse` envelope. Callers always get an
//! envelope back; only an unknown method name is rejected up front with
//! `DispatchError`.
//!
//! # Design
//! - The session lives in a `SessionStore` injected at construction, over a
//!   pluggable `Storage` backend. A 401 from the server evicts it.
//! - The transport is a trait so tests can script responses and faults;
//!   `UreqTransport` is the live implementation.
//! - DTOs are defined independently from the server crate; integration
//!   tests catch schema drift.

pub mod account;
pub mod cache;
pub mod catalog;
pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod http;
mod lenient;
pub mod session;
pub mod storage;
pub mod transport;
pub mod types;

pub use account::AccountService;
pub use cache::TokenCache;
pub use catalog::CatalogService;
pub use client::{ApiClient, Body};
pub use config::ClientConfig;
pub use envelope::{ApiResponse, Untyped};
pub use error::{AccountError, DispatchError, StoreError, TransportError};
pub use http::{Content, HttpMethod, HttpRequest, HttpResponse};
pub use session::{Session, SessionStore, USER_KEY};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use transport::{Transport, UreqTransport};
pub use types::{CreateProduct, Login, Product, ProductImage, Register, UpdateProduct};
