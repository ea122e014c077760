use serde::{Deserialize, Serialize};

/// A single inventory record. Every field except `id` is nullable; the store
/// assigns `id` on insert and it never changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Item {
    pub id: i64,
    pub name: Option<String>,
    pub weight: Option<f64>,
    pub price: Option<f64>,
    /// Free-form date text, stored as sent.
    pub expiry: Option<String>,
    pub qty: Option<i64>,
}

// ── Request payloads ─────────────────────────────────────────────────────────

/// Body of both create and update requests. Missing keys decode to `None` and
/// are written as NULL, so an update always replaces the whole record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ItemPayload {
    pub name: Option<String>,
    pub weight: Option<f64>,
    pub price: Option<f64>,
    pub expiry: Option<String>,
    pub qty: Option<i64>,
}
