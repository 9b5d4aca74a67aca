use poem_openapi::Object;

use crate::stores::order_store::DailyRevenue;
use crate::stores::OrderWithItems;
use crate::types::db::order_item;
use crate::types::dto::common::{format_timestamp, PageMeta};

/// Response model for a single order line item
#[derive(Object, Debug)]
pub struct OrderItemResponse {
    pub id: String,

    /// Product title snapshot taken at ordering time
    pub product_title: String,

    /// Unit price in the smallest currency unit
    pub price: i64,

    pub quantity: i32,
}

impl From<order_item::Model> for OrderItemResponse {
    fn from(model: order_item::Model) -> Self {
        Self {
            id: model.id,
            product_title: model.product_title,
            price: model.price,
            quantity: model.quantity,
        }
    }
}

/// Response model representing an order with its items
#[derive(Object, Debug)]
pub struct OrderResponse {
    pub id: String,

    /// Customer name
    pub name: String,

    /// Customer email
    pub email: String,

    /// Derived order total (Σ price × quantity), never stored
    pub total: i64,

    /// Timestamp when the order was placed (ISO 8601 format)
    pub created_at: String,

    pub order_items: Vec<OrderItemResponse>,
}

impl From<OrderWithItems> for OrderResponse {
    fn from(value: OrderWithItems) -> Self {
        let total = value.total();

        Self {
            id: value.order.id,
            name: value.order.name,
            email: value.order.email,
            total,
            created_at: format_timestamp(value.order.created_at),
            order_items: value
                .items
                .into_iter()
                .map(OrderItemResponse::from)
                .collect(),
        }
    }
}

/// Paginated order listing
#[derive(Object, Debug)]
pub struct OrderListResponse {
    pub data: Vec<OrderResponse>,
    pub meta: PageMeta,
}

/// One chart bucket: revenue summed over a single day
#[derive(Object, Debug)]
pub struct ChartPoint {
    /// Calendar day (YYYY-MM-DD, server-local)
    pub date: String,

    /// Total revenue for the day in the smallest currency unit
    pub sum: i64,
}

impl From<DailyRevenue> for ChartPoint {
    fn from(value: DailyRevenue) -> Self {
        Self {
            date: value.date,
            sum: value.sum,
        }
    }
}
