//! Generic data access plus the few entity-specific queries handlers need.
//!
//! # Design
//! Handlers see repositories only through the `Repository` family of
//! traits, so the in-memory store can be replaced by a database-backed one
//! without touching routes. Uniqueness checks are plain existence queries
//! against the store; no side index is kept.

use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Product, User};

pub trait Entity: Clone + Send + Sync + 'static {
    fn id(&self) -> Uuid;
}

#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> Option<E>;

    /// Entities in insertion order; `page` is 1-based.
    async fn list_paged(&self, page: u32, size: u32) -> Vec<E>;

    async fn add(&self, entity: E) -> E;

    /// Replace a stored entity. `None` if its id is unknown.
    async fn update(&self, entity: E) -> Option<E>;

    async fn delete(&self, id: Uuid) -> Option<E>;
}

#[async_trait]
pub trait ProductRepository: Repository<Product> {
    /// True iff no stored product carries `barcode`.
    ///
    /// Advisory only: the check and a following `add` take the lock
    /// separately, so two concurrent creates with the same barcode can both
    /// pass.
    async fn is_unique_barcode(&self, barcode: &str) -> bool;
}

#[async_trait]
pub trait UserRepository: Repository<User> {
    async fn find_by_email(&self, email: &str) -> Option<User>;

    /// Emails compare case-insensitively.
    async fn is_unique_email(&self, email: &str) -> bool;
}

/// Insertion-ordered store shared by every clone.
pub struct InMemoryRepository<E> {
    rows: Arc<RwLock<IndexMap<Uuid, E>>>,
}

impl<E> Clone for InMemoryRepository<E> {
    fn clone(&self) -> Self {
        Self {
            rows: Arc::clone(&self.rows),
        }
    }
}

impl<E> Default for InMemoryRepository<E> {
    fn default() -> Self {
        Self {
            rows: Arc::new(RwLock::new(IndexMap::new())),
        }
    }
}

impl<E: Entity> InMemoryRepository<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn all<F>(&self, predicate: F) -> bool
    where
        F: Fn(&E) -> bool + Send,
    {
        self.rows.read().await.values().all(predicate)
    }

    pub async fn find<F>(&self, predicate: F) -> Option<E>
    where
        F: Fn(&E) -> bool + Send,
    {
        self.rows.read().await.values().find(|e| predicate(e)).cloned()
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for InMemoryRepository<E> {
    async fn get_by_id(&self, id: Uuid) -> Option<E> {
        self.rows.read().await.get(&id).cloned()
    }

    async fn list_paged(&self, page: u32, size: u32) -> Vec<E> {
        let skip = page.saturating_sub(1) as usize * size as usize;
        self.rows
            .read()
            .await
            .values()
            .skip(skip)
            .take(size as usize)
            .cloned()
            .collect()
    }

    async fn add(&self, entity: E) -> E {
        self.rows.write().await.insert(entity.id(), entity.clone());
        entity
    }

    async fn update(&self, entity: E) -> Option<E> {
        let mut rows = self.rows.write().await;
        let slot = rows.get_mut(&entity.id())?;
        *slot = entity.clone();
        Some(entity)
    }

    async fn delete(&self, id: Uuid) -> Option<E> {
        self.rows.write().await.shift_remove(&id)
    }
}

#[async_trait]
impl ProductRepository for InMemoryRepository<Product> {
    async fn is_unique_barcode(&self, barcode: &str) -> bool {
        self.all(|p| p.barcode != barcode).await
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository<User> {
    async fn find_by_email(&self, email: &str) -> Option<User> {
        self.find(|u| u.email.eq_ignore_ascii_case(email)).await
    }

    async fn is_unique_email(&self, email: &str) -> bool {
        self.all(|u| !u.email.eq_ignore_ascii_case(email)).await
    }
}
