use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::errors::ApiError;
use crate::stores::paginate::{contains_ci, paginate, Page};
use crate::types::db::product::{self, Entity as Product};

/// Partial update for a product; only `Some` fields are written
#[derive(Debug, Default)]
pub struct ProductChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub price: Option<i64>,
}

/// ProductStore manages the product catalog
pub struct ProductStore {
    db: DatabaseConnection,
}

impl ProductStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        title: String,
        description: String,
        image: String,
        price: i64,
    ) -> Result<product::Model, ApiError> {
        let now = Utc::now().timestamp();

        let model = product::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            title: Set(title),
            description: Set(description),
            image: Set(image),
            price: Set(price),
            created_at: Set(now),
            updated_at: Set(now),
        };

        model.insert(&self.db).await.map_err(ApiError::database)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<product::Model>, ApiError> {
        Product::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(ApiError::database)
    }

    pub async fn update(
        &self,
        id: &str,
        changes: ProductChanges,
    ) -> Result<product::Model, ApiError> {
        let current = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Product not found"))?;

        let mut active: product::ActiveModel = current.into();

        if let Some(title) = changes.title {
            active.title = Set(title);
        }
        if let Some(description) = changes.description {
            active.description = Set(description);
        }
        if let Some(image) = changes.image {
            active.image = Set(image);
        }
        if let Some(price) = changes.price {
            active.price = Set(price);
        }
        active.updated_at = Set(Utc::now().timestamp());

        active.update(&self.db).await.map_err(ApiError::database)
    }

    /// Delete a product by id; returns false when no such product existed
    pub async fn delete(&self, id: &str) -> Result<bool, ApiError> {
        let result = Product::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(ApiError::database)?;

        Ok(result.rows_affected > 0)
    }

    /// One fixed-size page of products, optionally filtered by a
    /// case-insensitive substring match on title or description
    pub async fn paginate(
        &self,
        page: u64,
        search: Option<&str>,
    ) -> Result<Page<product::Model>, ApiError> {
        let mut select = Product::find()
            .order_by_asc(product::Column::CreatedAt)
            .order_by_asc(product::Column::Id);

        if let Some(term) = search {
            select = select.filter(
                Condition::any()
                    .add(contains_ci(product::Column::Title, term))
                    .add(contains_ci(product::Column::Description, term)),
            );
        }

        paginate(&self.db, select, page)
            .await
            .map_err(ApiError::database)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::PAGE_SIZE;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    async fn setup() -> ProductStore {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to create test database");
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        ProductStore::new(db)
    }

    async fn seed(store: &ProductStore, count: usize) {
        for n in 1..=count {
            store
                .create(
                    format!("Product {}", n),
                    format!("Description for product {}", n),
                    format!("https://img.example.com/{}.png", n),
                    (n as i64) * 100,
                )
                .await
                .expect("Failed to seed product");
        }
    }

    #[tokio::test]
    async fn test_pagination_windows_of_25_items() {
        let store = setup().await;
        seed(&store, 25).await;

        let first = store.paginate(1, None).await.unwrap();
        assert_eq!(first.data.len(), PAGE_SIZE as usize);
        assert_eq!(first.meta.total, 25);
        assert_eq!(first.meta.page, 1);
        assert_eq!(first.meta.last_page, 3);

        let last = store.paginate(3, None).await.unwrap();
        assert_eq!(last.data.len(), 5);
        assert_eq!(last.meta.page, 3);
        assert_eq!(last.meta.last_page, 3);

        // Windows must not overlap
        let second = store.paginate(2, None).await.unwrap();
        assert!(first
            .data
            .iter()
            .all(|p| second.data.iter().all(|q| q.id != p.id)));
    }

    #[tokio::test]
    async fn test_search_matches_title_and_description_case_insensitively() {
        let store = setup().await;
        store
            .create(
                "Ergonomic Chair".to_string(),
                "A chair for long days".to_string(),
                "https://img.example.com/chair.png".to_string(),
                19900,
            )
            .await
            .unwrap();
        store
            .create(
                "Standing Desk".to_string(),
                "Pairs well with an ergonomic chair".to_string(),
                "https://img.example.com/desk.png".to_string(),
                49900,
            )
            .await
            .unwrap();

        let page = store.paginate(1, Some("ERGONOMIC")).await.unwrap();
        assert_eq!(page.meta.total, 2);

        let page = store.paginate(1, Some("desk")).await.unwrap();
        assert_eq!(page.meta.total, 1);

        let page = store.paginate(1, Some("typewriter")).await.unwrap();
        assert_eq!(page.meta.total, 0);
    }

    #[tokio::test]
    async fn test_update_touches_updated_at_only_on_change() {
        let store = setup().await;
        let product = store
            .create(
                "Lamp".to_string(),
                "Desk lamp".to_string(),
                "https://img.example.com/lamp.png".to_string(),
                2500,
            )
            .await
            .unwrap();

        let updated = store
            .update(
                &product.id,
                ProductChanges {
                    price: Some(1999),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.price, 1999);
        assert_eq!(updated.title, "Lamp");
    }

    #[tokio::test]
    async fn test_delete_missing_product_returns_false() {
        let store = setup().await;

        assert!(!store.delete("no-such-id").await.unwrap());
    }
}
