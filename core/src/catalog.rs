//! Product catalog calls. Each returns the server's envelope untouched.

use uuid::Uuid;

use crate::client::ApiClient;
use crate::envelope::ApiResponse;
use crate::http::Content;
use crate::types::{CreateProduct, Product, UpdateProduct};

#[derive(Clone)]
pub struct CatalogService {
    client: ApiClient,
}

impl CatalogService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// One page of products; `page` is 1-based.
    pub fn list_products(&self, page: u32, size: u32) -> ApiResponse<Vec<Product>> {
        self.client
            .get(&format!("products?pageNumber={page}&pageSize={size}"))
    }

    pub fn get_product(&self, id: Uuid) -> ApiResponse<Product> {
        self.client.get(&format!("products/{id}"))
    }

    pub fn create_product(&self, input: &CreateProduct) -> ApiResponse<Product> {
        self.client.post("products", input)
    }

    pub fn update_product(&self, id: Uuid, input: &UpdateProduct) -> ApiResponse<Product> {
        self.client.put(&format!("products/{id}"), input)
    }

    /// Returns the id of the removed product.
    pub fn delete_product(&self, id: Uuid) -> ApiResponse<Uuid> {
        self.client.delete(&format!("products/{id}"))
    }

    pub fn upload_image(&self, id: Uuid, image: Content) -> ApiResponse<Product> {
        self.client.upload(&format!("products/{id}/image"), image)
    }
}
