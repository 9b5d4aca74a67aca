use std::sync::Arc;

use poem_openapi::{
    param::{Path, Query},
    payload::Json,
    ApiResponse, OpenApi, Tags,
};

use crate::api::auth::SessionAuth;
use crate::api::helpers;
use crate::errors::ApiError;
use crate::services::permission_gate::{require, Access};
use crate::services::{sanitize, AuthGate};
use crate::stores::product_store::ProductChanges;
use crate::stores::{paginate::clamp_page, ProductStore};
use crate::types::dto::common::DeletedResponse;
use crate::types::dto::product::{
    CreateProductRequest, ProductListResponse, ProductResponse, UpdateProductRequest,
};

/// API tags for product catalog endpoints
#[derive(Tags)]
enum ProductTags {
    /// Product catalog management
    Products,
}

#[derive(ApiResponse, Debug)]
pub enum ProductCreated {
    /// Product created
    #[oai(status = 201)]
    Created(Json<ProductResponse>),
}

#[derive(ApiResponse, Debug)]
pub enum ProductUpdated {
    /// Product updated
    #[oai(status = 202)]
    Accepted(Json<ProductResponse>),
}

/// Product catalog API endpoints, gated by the `products` permission tag
pub struct ProductsApi {
    auth_gate: Arc<AuthGate>,
    product_store: Arc<ProductStore>,
}

impl ProductsApi {
    pub fn new(auth_gate: Arc<AuthGate>, product_store: Arc<ProductStore>) -> Self {
        Self {
            auth_gate,
            product_store,
        }
    }
}

#[OpenApi]
impl ProductsApi {
    /// Get a paginated list of products, searchable by title or description
    #[oai(path = "/products", method = "get", tag = "ProductTags::Products")]
    async fn list(
        &self,
        auth: SessionAuth,
        page: Query<Option<u64>>,
        search: Query<Option<String>>,
    ) -> Result<Json<ProductListResponse>, ApiError> {
        let current = self.auth_gate.authenticate(&auth.0.key).await?;
        require(&current, Access::Read, "products")?;

        let page = clamp_page(page.0);
        let term = search
            .0
            .map(|s| sanitize::strip_html(&s))
            .filter(|s| !s.is_empty());

        let result = self.product_store.paginate(page, term.as_deref()).await?;

        if let Some(term) = &term {
            if result.data.is_empty() {
                return Err(ApiError::not_found(format!(
                    "No {} matching your search criteria.",
                    term
                )));
            }
        }

        Ok(Json(ProductListResponse {
            data: result.data.into_iter().map(ProductResponse::from).collect(),
            meta: result.meta.into(),
        }))
    }

    /// Create a product
    #[oai(path = "/products", method = "post", tag = "ProductTags::Products")]
    async fn create(
        &self,
        auth: SessionAuth,
        body: Json<CreateProductRequest>,
    ) -> Result<ProductCreated, ApiError> {
        let current = self.auth_gate.authenticate(&auth.0.key).await?;
        require(&current, Access::Write, "products")?;

        if body.price < 0 {
            return Err(ApiError::field("price", "Price must not be negative"));
        }

        let product = self
            .product_store
            .create(
                body.title.clone(),
                body.description.clone(),
                body.image.clone(),
                body.price,
            )
            .await?;

        Ok(ProductCreated::Created(Json(product.into())))
    }

    /// Get a product by ID
    #[oai(path = "/products/:id", method = "get", tag = "ProductTags::Products")]
    async fn get(
        &self,
        auth: SessionAuth,
        id: Path<String>,
    ) -> Result<Json<ProductResponse>, ApiError> {
        let current = self.auth_gate.authenticate(&auth.0.key).await?;
        require(&current, Access::Read, "products")?;

        helpers::require_uuid(&id.0)?;

        let product = self
            .product_store
            .find_by_id(&id.0)
            .await?
            .ok_or_else(|| ApiError::not_found("Product not found"))?;

        Ok(Json(product.into()))
    }

    /// Update a product by ID
    #[oai(path = "/products/:id", method = "put", tag = "ProductTags::Products")]
    async fn update(
        &self,
        auth: SessionAuth,
        id: Path<String>,
        body: Json<UpdateProductRequest>,
    ) -> Result<ProductUpdated, ApiError> {
        let current = self.auth_gate.authenticate(&auth.0.key).await?;
        require(&current, Access::Write, "products")?;

        helpers::require_uuid(&id.0)?;

        if body.price.is_some_and(|price| price < 0) {
            return Err(ApiError::field("price", "Price must not be negative"));
        }

        let product = self
            .product_store
            .update(
                &id.0,
                ProductChanges {
                    title: body.title.clone(),
                    description: body.description.clone(),
                    image: body.image.clone(),
                    price: body.price,
                },
            )
            .await?;

        Ok(ProductUpdated::Accepted(Json(product.into())))
    }

    /// Delete a product by ID
    #[oai(
        path = "/products/:id",
        method = "delete",
        tag = "ProductTags::Products"
    )]
    async fn delete(
        &self,
        auth: SessionAuth,
        id: Path<String>,
    ) -> Result<DeletedResponse, ApiError> {
        let current = self.auth_gate.authenticate(&auth.0.key).await?;
        require(&current, Access::Write, "products")?;

        helpers::require_uuid(&id.0)?;

        if !self.product_store.delete(&id.0).await? {
            return Err(ApiError::not_found("Product not found"));
        }

        Ok(DeletedResponse::NoContent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::TokenService;
    use crate::stores::{NewUser, RoleStore, UserStore};
    use migration::{Migrator, MigratorTrait};
    use poem_openapi::auth::ApiKey;
    use sea_orm::Database;

    const TEST_SECRET: &str = "test-secret-key-minimum-32-characters-long";

    struct Fixture {
        role_store: Arc<RoleStore>,
        user_store: Arc<UserStore>,
        token_service: Arc<TokenService>,
        api: ProductsApi,
    }

    async fn setup() -> Fixture {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to create test database");
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        let user_store = Arc::new(UserStore::new(db.clone()));
        let role_store = Arc::new(RoleStore::new(db.clone()));
        let product_store = Arc::new(ProductStore::new(db));
        let token_service = Arc::new(TokenService::new(TEST_SECRET.to_string()));
        let auth_gate = Arc::new(AuthGate::new(user_store.clone(), token_service.clone()));
        let api = ProductsApi::new(auth_gate, product_store);

        Fixture {
            role_store,
            user_store,
            token_service,
            api,
        }
    }

    impl Fixture {
        async fn login_with(&self, tags: &[&str]) -> SessionAuth {
            let mut permission_ids = Vec::new();
            for tag in tags {
                let existing = self
                    .role_store
                    .permissions()
                    .await
                    .unwrap()
                    .into_iter()
                    .find(|p| p.name == *tag);
                let id = match existing {
                    Some(p) => p.id,
                    None => self.role_store.create_permission(tag).await.unwrap().id,
                };
                permission_ids.push(id);
            }
            let role = self
                .role_store
                .create("Operator".to_string(), permission_ids)
                .await
                .unwrap();

            let suffix = uuid::Uuid::new_v4();
            let user = self
                .user_store
                .create(NewUser {
                    full_name: "Operator".to_string(),
                    username: format!("op-{}", suffix),
                    email: format!("op-{}@example.com", suffix),
                    password_hash: "hash".to_string(),
                    role_id: Some(role.role.id.clone()),
                })
                .await
                .unwrap();

            let token = self.token_service.issue(&user.id, false).unwrap().token;
            SessionAuth(ApiKey { key: token })
        }

        fn create_request(&self, title: &str) -> Json<CreateProductRequest> {
            Json(CreateProductRequest {
                title: title.to_string(),
                description: format!("{} description", title),
                image: "https://img.example.com/p.png".to_string(),
                price: 1999,
            })
        }
    }

    #[tokio::test]
    async fn test_full_crud_lifecycle() {
        let fixture = setup().await;

        let editor = fixture.login_with(&["edit_products"]).await;
        let ProductCreated::Created(created) = fixture
            .api
            .create(editor, fixture.create_request("Lamp"))
            .await
            .unwrap();
        assert_eq!(created.0.price, 1999);

        let editor = fixture.login_with(&["edit_products"]).await;
        let ProductUpdated::Accepted(updated) = fixture
            .api
            .update(
                editor,
                Path(created.0.id.clone()),
                Json(UpdateProductRequest {
                    title: None,
                    description: None,
                    image: None,
                    price: Some(1499),
                }),
            )
            .await
            .unwrap();
        assert_eq!(updated.0.price, 1499);
        assert_eq!(updated.0.title, "Lamp");

        let editor = fixture.login_with(&["edit_products"]).await;
        fixture
            .api
            .delete(editor, Path(created.0.id.clone()))
            .await
            .unwrap();

        let viewer = fixture.login_with(&["view_products"]).await;
        let result = fixture.api.get(viewer, Path(created.0.id.clone())).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_view_permission_cannot_create() {
        let fixture = setup().await;
        let viewer = fixture.login_with(&["view_products"]).await;

        let result = fixture
            .api
            .create(viewer, fixture.create_request("Nope"))
            .await;

        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_negative_price_is_validation_error() {
        let fixture = setup().await;
        let editor = fixture.login_with(&["edit_products"]).await;

        let mut request = fixture.create_request("Broken");
        request.0.price = -1;

        let result = fixture.api.create(editor, request).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn test_search_without_matches_is_404() {
        let fixture = setup().await;

        let editor = fixture.login_with(&["edit_products", "view_products"]).await;
        fixture
            .api
            .create(editor, fixture.create_request("Lamp"))
            .await
            .unwrap();

        let viewer = fixture.login_with(&["view_products"]).await;
        let result = fixture
            .api
            .list(viewer, Query(None), Query(Some("typewriter".to_string())))
            .await;

        match result {
            Err(ApiError::NotFound(json)) => {
                assert!(json.0.message.contains("typewriter"));
            }
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_search_returns_unfiltered_list() {
        let fixture = setup().await;

        let viewer = fixture.login_with(&["view_products"]).await;
        let listed = fixture
            .api
            .list(viewer, Query(None), Query(Some("".to_string())))
            .await
            .unwrap();

        assert_eq!(listed.0.meta.total, 0);
    }
}
