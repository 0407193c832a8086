//! Transaction Model
//!
//! A settled payment recorded by the POS. `paymentMethod` is 'Cash' or
//! 'QRIS', `orderType` is 'Take away' or 'Here'.

use serde::{Deserialize, Serialize};

/// Transaction entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: i64,
    pub amount: f64,
    pub payment_method: String,
    pub order_type: String,
    pub items: serde_json::Value,
    pub subtotal: f64,
    pub tax: f64,
    pub cashier_name: Option<String>,
    pub created_at: i64,
}

/// Create transaction payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TransactionCreate {
    pub amount: f64,
    pub payment_method: String,
    pub order_type: String,
    pub items: serde_json::Value,
    pub subtotal: f64,
    pub tax: f64,
    pub cashier_name: Option<String>,
}

/// Income summary for the financial dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionStats {
    pub total_income: f64,
    pub total_count: i64,
    pub cash_income: f64,
    pub qris_income: f64,
    pub cash_count: i64,
    pub qris_count: i64,
}
