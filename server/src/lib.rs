//! REST API for the product catalog.
//!
//! All routes live under `/api` and answer with an `Envelope`. Account
//! routes are public; product routes require `Authorization: bearer <token>`
//! with a token issued by `account/authenticate`.

pub mod account;
pub mod auth;
pub mod config;
pub mod envelope;
pub mod error;
pub mod models;
pub mod products;
pub mod repository;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;

pub use auth::{CurrentUser, TokenRegistry};
pub use config::ServerConfig;
pub use envelope::Envelope;
pub use error::ApiError;
pub use models::{AuthenticatedUser, Product, ProductImage, User};
pub use repository::{InMemoryRepository, ProductRepository, Repository, UserRepository};

#[derive(Clone)]
pub struct AppState {
    pub products: Arc<dyn ProductRepository>,
    pub users: Arc<dyn UserRepository>,
    pub tokens: TokenRegistry,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            products: Arc::new(InMemoryRepository::<Product>::new()),
            users: Arc::new(InMemoryRepository::<User>::new()),
            tokens: TokenRegistry::new(config.session_ttl),
        }
    }
}

/// Router over fresh in-memory state with the default configuration.
pub fn app() -> Router {
    router(AppState::new(&ServerConfig::default()))
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/account/register", post(account::register))
        .route("/account/authenticate", post(account::authenticate))
        .route("/products", get(products::list).post(products::create))
        .route(
            "/products/{id}",
            get(products::get).put(products::update).delete(products::delete),
        )
        .route("/products/{id}/image", post(products::upload_image));
    Router::new().nest("/api", api).with_state(state)
}

pub async fn run(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, router(state)).await
}
