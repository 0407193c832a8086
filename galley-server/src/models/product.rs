//! Product Model
//!
//! A product is a raw stock-tracked ingredient consumed by recipes and
//! menus. Stock and quantities are f64 so fractional units (kg, liters)
//! debit cleanly.

use serde::{Deserialize, Serialize};

/// Product entity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub stock: f64,
    pub min_stock: f64,
    pub unit: String,
    pub image: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreate {
    pub name: String,
    pub category: String,
    pub price: f64,
    pub stock: f64,
    pub min_stock: f64,
    pub unit: String,
    pub image: Option<String>,
}

/// Update product payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<f64>,
    pub min_stock: Option<f64>,
    pub unit: Option<String>,
    pub image: Option<String>,
}

/// One card in the stock statistics summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatCard {
    pub label: String,
    pub value: i64,
    pub icon: String,
    pub color: String,
}

/// Low-stock entry in the statistics payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LowStockItem {
    pub id: i64,
    pub name: String,
    pub stock: f64,
    pub min_stock: f64,
    pub unit: String,
    pub image: Option<String>,
}

/// Stock statistics for the inventory dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductStats {
    pub summary: Vec<StatCard>,
    pub low_stock_items: Vec<LowStockItem>,
}
