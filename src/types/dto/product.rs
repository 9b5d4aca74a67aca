use poem_openapi::Object;

use crate::types::db::product;
use crate::types::dto::common::{format_timestamp, PageMeta};

/// Response model representing a product
#[derive(Object, Debug)]
pub struct ProductResponse {
    pub id: String,

    pub title: String,

    pub description: String,

    /// Image reference (URL)
    pub image: String,

    /// Price in the smallest currency unit
    pub price: i64,

    /// Timestamp when the product was created (ISO 8601 format)
    pub created_at: String,

    /// Timestamp of the last update (ISO 8601 format)
    pub updated_at: String,
}

impl From<product::Model> for ProductResponse {
    fn from(model: product::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            image: model.image,
            price: model.price,
            created_at: format_timestamp(model.created_at),
            updated_at: format_timestamp(model.updated_at),
        }
    }
}

/// Paginated product listing
#[derive(Object, Debug)]
pub struct ProductListResponse {
    pub data: Vec<ProductResponse>,
    pub meta: PageMeta,
}

/// Request model for creating a product
#[derive(Object, Debug)]
pub struct CreateProductRequest {
    #[oai(validator(min_length = 1, max_length = 200))]
    pub title: String,

    #[oai(validator(min_length = 1))]
    pub description: String,

    #[oai(validator(min_length = 1))]
    pub image: String,

    /// Price in the smallest currency unit; must not be negative
    pub price: i64,
}

/// Request model for updating a product
#[derive(Object, Debug)]
pub struct UpdateProductRequest {
    #[oai(validator(min_length = 1, max_length = 200))]
    pub title: Option<String>,

    #[oai(validator(min_length = 1))]
    pub description: Option<String>,

    #[oai(validator(min_length = 1))]
    pub image: Option<String>,

    pub price: Option<i64>,
}
