//! Order Model

use serde::{Deserialize, Serialize};

/// Order entity. `items` is an opaque JSON array owned by the frontend
/// (menu name, qty, notes per element).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub customer_name: String,
    pub total_amount: f64,
    pub status: String,
    pub items: Option<serde_json::Value>,
    pub order_type: Option<String>,
    pub payment_method: Option<String>,
    pub created_at: i64,
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OrderCreate {
    pub customer_name: String,
    pub total_amount: f64,
    pub status: Option<String>,
    pub items: Option<serde_json::Value>,
    pub order_type: Option<String>,
    pub payment_method: Option<String>,
}

/// Status update payload for `PATCH /orders/:id/status`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderStatusUpdate {
    pub status: String,
}
