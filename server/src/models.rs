//! Stored entities and the request payloads that create them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repository::Entity;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    pub content_type: String,
    pub size: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub barcode: String,
    pub description: String,
    pub rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ProductImage>,
}

impl Entity for Product {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// A registered account. Never serialised: the password hash stays here.
#[derive(Clone, Debug)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
}

impl Entity for User {
    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProduct {
    pub name: String,
    pub barcode: String,
    #[serde(default)]
    pub description: String,
    pub rate: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub barcode: Option<String>,
    pub description: Option<String>,
    pub rate: Option<f64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Register {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct Authenticate {
    pub email: String,
    pub password: String,
}

/// What `account/authenticate` hands back: the user plus a bearer token.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub token: String,
}

/// Query string of `GET /api/products`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    #[serde(default = "default_page_number")]
    pub page_number: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page_number() -> u32 {
    1
}

fn default_page_size() -> u32 {
    10
}

pub const MAX_PAGE_SIZE: u32 = 100;

impl PageQuery {
    /// Page number at least 1, size within `1..=MAX_PAGE_SIZE`.
    pub fn normalized(&self) -> (u32, u32) {
        (self.page_number.max(1), self.page_size.clamp(1, MAX_PAGE_SIZE))
    }
}
