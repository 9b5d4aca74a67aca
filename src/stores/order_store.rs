use std::collections::BTreeMap;

use chrono::{Local, TimeZone, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, FromQueryResult,
    LoaderTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::errors::ApiError;
use crate::stores::paginate::{contains_ci, paginate, Page};
use crate::types::db::order::{self, Entity as Order};
use crate::types::db::order_item;

/// Line item input for a new order
#[derive(Debug)]
pub struct NewOrderItem {
    pub product_title: String,
    pub price: i64,
    pub quantity: i32,
}

/// An order with its owned line items.
///
/// `total` is derived (Σ price × quantity), never stored.
#[derive(Debug, Clone)]
pub struct OrderWithItems {
    pub order: order::Model,
    pub items: Vec<order_item::Model>,
}

impl OrderWithItems {
    pub fn total(&self) -> i64 {
        self.items
            .iter()
            .map(|item| item.price * item.quantity as i64)
            .sum()
    }
}

/// Flattened export row: one line per order item, carrying its order's
/// identity columns
#[derive(Debug, FromQueryResult)]
pub struct ExportRow {
    pub order_id: String,
    pub name: String,
    pub email: String,
    pub product_title: String,
    pub price: i64,
    pub quantity: i32,
}

/// One chart bucket: revenue summed over a single calendar day
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyRevenue {
    pub date: String,
    pub sum: i64,
}

/// OrderStore manages orders, their line items, and the reporting reads
pub struct OrderStore {
    db: DatabaseConnection,
}

impl OrderStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create an order together with its items (single transaction)
    pub async fn create(
        &self,
        name: String,
        email: String,
        items: Vec<NewOrderItem>,
    ) -> Result<OrderWithItems, ApiError> {
        self.create_at(name, email, items, Utc::now().timestamp())
            .await
    }

    /// Create an order with an explicit creation timestamp (seeder and
    /// chart tests need orders spread over several days)
    pub async fn create_at(
        &self,
        name: String,
        email: String,
        items: Vec<NewOrderItem>,
        created_at: i64,
    ) -> Result<OrderWithItems, ApiError> {
        let txn = self.db.begin().await.map_err(ApiError::database)?;

        let order = order::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            name: Set(name),
            email: Set(email),
            created_at: Set(created_at),
        };
        let order = order.insert(&txn).await.map_err(ApiError::database)?;

        let mut stored_items = Vec::with_capacity(items.len());
        for item in items {
            let model = order_item::ActiveModel {
                id: Set(Uuid::new_v4().to_string()),
                order_id: Set(order.id.clone()),
                product_title: Set(item.product_title),
                price: Set(item.price),
                quantity: Set(item.quantity),
            };
            stored_items.push(model.insert(&txn).await.map_err(ApiError::database)?);
        }

        txn.commit().await.map_err(ApiError::database)?;

        Ok(OrderWithItems {
            order,
            items: stored_items,
        })
    }

    /// Delete an order and its items together (exclusive ownership)
    pub async fn delete(&self, id: &str) -> Result<bool, ApiError> {
        let txn = self.db.begin().await.map_err(ApiError::database)?;

        order_item::Entity::delete_many()
            .filter(order_item::Column::OrderId.eq(id))
            .exec(&txn)
            .await
            .map_err(ApiError::database)?;

        let result = Order::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(ApiError::database)?;

        txn.commit().await.map_err(ApiError::database)?;

        Ok(result.rows_affected > 0)
    }

    /// One fixed-size page of orders with items loaded.
    ///
    /// The search term matches the customer name, the customer email, or
    /// any contained item's product title (hence the join + DISTINCT).
    pub async fn paginate(
        &self,
        page: u64,
        search: Option<&str>,
    ) -> Result<Page<OrderWithItems>, ApiError> {
        let mut select = Order::find()
            .order_by_asc(order::Column::CreatedAt)
            .order_by_asc(order::Column::Id);

        if let Some(term) = search {
            select = select
                .left_join(order_item::Entity)
                .filter(
                    Condition::any()
                        .add(contains_ci((order::Entity, order::Column::Name), term))
                        .add(contains_ci((order::Entity, order::Column::Email), term))
                        .add(contains_ci(
                            (order_item::Entity, order_item::Column::ProductTitle),
                            term,
                        )),
                )
                .distinct();
        }

        let page = paginate(&self.db, select, page)
            .await
            .map_err(ApiError::database)?;

        let items = page
            .data
            .load_many(order_item::Entity, &self.db)
            .await
            .map_err(ApiError::database)?;

        let data = page
            .data
            .into_iter()
            .zip(items)
            .map(|(order, items)| OrderWithItems { order, items })
            .collect();

        Ok(Page {
            data,
            meta: page.meta,
        })
    }

    /// Join orders with their items and flatten to one row per item, in a
    /// fixed column order for the CSV export
    pub async fn export_rows(&self) -> Result<Vec<ExportRow>, ApiError> {
        Order::find()
            .select_only()
            .column_as(order::Column::Id, "order_id")
            .column(order::Column::Name)
            .column(order::Column::Email)
            .column(order_item::Column::ProductTitle)
            .column(order_item::Column::Price)
            .column(order_item::Column::Quantity)
            .inner_join(order_item::Entity)
            .order_by_asc(order::Column::CreatedAt)
            .order_by_asc(order::Column::Id)
            .into_model::<ExportRow>()
            .all(&self.db)
            .await
            .map_err(ApiError::database)
    }

    /// Revenue per calendar day (server-local date truncation), ascending.
    ///
    /// Dates are bucketed in Rust rather than SQL so the truncation follows
    /// the server timezone regardless of the storage engine.
    pub async fn daily_revenue(&self) -> Result<Vec<DailyRevenue>, ApiError> {
        #[derive(FromQueryResult)]
        struct RevenueRow {
            created_at: i64,
            price: i64,
            quantity: i32,
        }

        let rows = Order::find()
            .select_only()
            .column(order::Column::CreatedAt)
            .column(order_item::Column::Price)
            .column(order_item::Column::Quantity)
            .inner_join(order_item::Entity)
            .into_model::<RevenueRow>()
            .all(&self.db)
            .await
            .map_err(ApiError::database)?;

        // BTreeMap keeps the YYYY-MM-DD keys in ascending order
        let mut buckets: BTreeMap<String, i64> = BTreeMap::new();
        for row in rows {
            let Some(day) = Local.timestamp_opt(row.created_at, 0).single() else {
                continue;
            };
            *buckets.entry(day.format("%Y-%m-%d").to_string()).or_default() +=
                row.price * row.quantity as i64;
        }

        Ok(buckets
            .into_iter()
            .map(|(date, sum)| DailyRevenue { date, sum })
            .collect())
    }
}
