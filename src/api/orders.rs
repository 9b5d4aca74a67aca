use std::sync::Arc;

use poem_openapi::{
    param::Query,
    payload::{Json, PlainText},
    ApiResponse, OpenApi, Tags,
};

use crate::api::auth::SessionAuth;
use crate::errors::ApiError;
use crate::services::permission_gate::{require, Access};
use crate::services::{sanitize, AuthGate};
use crate::stores::{paginate::clamp_page, OrderStore};
use crate::types::dto::order::{ChartPoint, OrderListResponse, OrderResponse};

/// API tags for order and reporting endpoints
#[derive(Tags)]
enum OrderTags {
    /// Orders and reporting
    Orders,
}

/// CSV download response
#[derive(ApiResponse, Debug)]
pub enum ExportResponse {
    /// CSV attachment with one row per order item
    #[oai(status = 200, content_type = "text/csv")]
    Csv(
        PlainText<String>,
        #[oai(header = "Content-Disposition")] String,
    ),
}

/// Order listing and reporting endpoints, gated by the `orders` tag.
///
/// Export is a mutating-verb route (POST), so it requires `edit_orders`
/// even though it only reads.
pub struct OrdersApi {
    auth_gate: Arc<AuthGate>,
    order_store: Arc<OrderStore>,
}

impl OrdersApi {
    pub fn new(auth_gate: Arc<AuthGate>, order_store: Arc<OrderStore>) -> Self {
        Self {
            auth_gate,
            order_store,
        }
    }
}

#[OpenApi]
impl OrdersApi {
    /// Get a paginated list of orders, searchable by customer name, email
    /// or any contained item's product title
    #[oai(path = "/orders", method = "get", tag = "OrderTags::Orders")]
    async fn list(
        &self,
        auth: SessionAuth,
        page: Query<Option<u64>>,
        search: Query<Option<String>>,
    ) -> Result<Json<OrderListResponse>, ApiError> {
        let current = self.auth_gate.authenticate(&auth.0.key).await?;
        require(&current, Access::Read, "orders")?;

        let page = clamp_page(page.0);
        let term = search
            .0
            .map(|s| sanitize::strip_html(&s))
            .filter(|s| !s.is_empty());

        let result = self.order_store.paginate(page, term.as_deref()).await?;

        if let Some(term) = &term {
            if result.data.is_empty() {
                return Err(ApiError::not_found(format!(
                    "No {} matching your search criteria.",
                    term
                )));
            }
        }

        Ok(Json(OrderListResponse {
            data: result.data.into_iter().map(OrderResponse::from).collect(),
            meta: result.meta.into(),
        }))
    }

    /// Export all orders as a CSV attachment, one row per order item
    #[oai(path = "/export", method = "post", tag = "OrderTags::Orders")]
    async fn export(&self, auth: SessionAuth) -> Result<ExportResponse, ApiError> {
        let current = self.auth_gate.authenticate(&auth.0.key).await?;
        require(&current, Access::Write, "orders")?;

        let rows = self.order_store.export_rows().await?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(["ID", "Name", "Email", "Product Title", "Price", "Quantity"])
            .map_err(|e| ApiError::internal_error(format!("CSV error: {}", e)))?;

        for row in rows {
            writer
                .write_record([
                    row.order_id.as_str(),
                    row.name.as_str(),
                    row.email.as_str(),
                    row.product_title.as_str(),
                    &row.price.to_string(),
                    &row.quantity.to_string(),
                ])
                .map_err(|e| ApiError::internal_error(format!("CSV error: {}", e)))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| ApiError::internal_error(format!("CSV error: {}", e)))?;
        let csv = String::from_utf8(bytes)
            .map_err(|e| ApiError::internal_error(format!("CSV error: {}", e)))?;

        Ok(ExportResponse::Csv(
            PlainText(csv),
            "attachment; filename=\"orders.csv\"".to_string(),
        ))
    }

    /// Revenue per day for the dashboard chart, ascending by date
    #[oai(path = "/chart", method = "get", tag = "OrderTags::Orders")]
    async fn chart(&self, auth: SessionAuth) -> Result<Json<Vec<ChartPoint>>, ApiError> {
        let current = self.auth_gate.authenticate(&auth.0.key).await?;
        require(&current, Access::Read, "orders")?;

        let revenue = self.order_store.daily_revenue().await?;

        Ok(Json(revenue.into_iter().map(ChartPoint::from).collect()))
    }
}
