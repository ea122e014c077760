use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::SqliteConnection;

use crate::error::{AppError, AppResult};
use crate::models::{Item, ItemPayload};

// ── Pool & schema ─────────────────────────────────────────────────────────────

/// Open the pool, creating the database file on first run.
pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Create the `items` table if it does not exist yet. Safe to run on every start.
pub async fn ensure_schema(pool: &SqlitePool) -> AppResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS items (
            id     INTEGER PRIMARY KEY AUTOINCREMENT,
            name   TEXT,
            weight REAL,
            price  REAL,
            expiry TEXT,
            qty    INTEGER
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

// ── Items ─────────────────────────────────────────────────────────────────────

pub async fn fetch_all_items(conn: &mut SqliteConnection) -> AppResult<Vec<Item>> {
    let items = sqlx::query_as::<_, Item>(
        "SELECT id, name, weight, price, expiry, qty FROM items ORDER BY id DESC",
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(items)
}

pub async fn fetch_item_by_id(conn: &mut SqliteConnection, id: i64) -> AppResult<Option<Item>> {
    let item = sqlx::query_as::<_, Item>(
        "SELECT id, name, weight, price, expiry, qty FROM items WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(item)
}

pub async fn insert_item(conn: &mut SqliteConnection, payload: &ItemPayload) -> AppResult<Item> {
    let result = sqlx::query(
        "INSERT INTO items (name, weight, price, expiry, qty) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&payload.name)
    .bind(payload.weight)
    .bind(payload.price)
    .bind(&payload.expiry)
    .bind(payload.qty)
    .execute(&mut *conn)
    .await?;

    let id = result.last_insert_rowid();
    fetch_item_by_id(conn, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Item {} not found", id)))
}

/// Overwrite every field of an existing item; absent payload fields become NULL.
pub async fn update_item(
    conn: &mut SqliteConnection,
    id: i64,
    payload: &ItemPayload,
) -> AppResult<Item> {
    let result = sqlx::query(
        r#"
        UPDATE items
        SET name   = ?,
            weight = ?,
            price  = ?,
            expiry = ?,
            qty    = ?
        WHERE id = ?
        "#,
    )
    .bind(&payload.name)
    .bind(payload.weight)
    .bind(payload.price)
    .bind(&payload.expiry)
    .bind(payload.qty)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Item {} not found", id)));
    }

    fetch_item_by_id(conn, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Item {} not found", id)))
}

/// Returns whether a row was actually removed.
pub async fn delete_item(conn: &mut SqliteConnection, id: i64) -> AppResult<bool> {
    let result = sqlx::query("DELETE FROM items WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Single-connection in-memory pool: every checkout sees the same database.
    pub(crate) async fn memory_pool() -> SqlitePool {
        let options = SqliteConnectOptions::from_str("sqlite::memory:").unwrap();
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .unwrap();
        ensure_schema(&pool).await.unwrap();
        pool
    }

    fn apple() -> ItemPayload {
        ItemPayload {
            name: Some("Apple".to_string()),
            weight: Some(0.2),
            price: Some(1.5),
            expiry: Some("2025-01-01".to_string()),
            qty: Some(10),
        }
    }

    #[tokio::test]
    async fn ensure_schema_is_idempotent() {
        let pool = memory_pool().await;
        ensure_schema(&pool).await.unwrap();
        ensure_schema(&pool).await.unwrap();
    }

    #[tokio::test]
    async fn insert_returns_stored_fields_and_id() {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let item = insert_item(&mut conn, &apple()).await.unwrap();
        assert_eq!(item.name.as_deref(), Some("Apple"));
        assert_eq!(item.weight, Some(0.2));
        assert_eq!(item.price, Some(1.5));
        assert_eq!(item.expiry.as_deref(), Some("2025-01-01"));
        assert_eq!(item.qty, Some(10));
        assert!(item.id > 0);
    }

    #[tokio::test]
    async fn empty_payload_stores_all_nulls() {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let item = insert_item(&mut conn, &ItemPayload::default()).await.unwrap();
        assert_eq!(
            item,
            Item {
                id: item.id,
                name: None,
                weight: None,
                price: None,
                expiry: None,
                qty: None,
            }
        );
    }

    #[tokio::test]
    async fn list_is_ordered_newest_first() {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        for _ in 0..3 {
            insert_item(&mut conn, &apple()).await.unwrap();
        }
        let ids: Vec<i64> = fetch_all_items(&mut conn)
            .await
            .unwrap()
            .iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(ids.len(), 3);
        assert!(ids.windows(2).all(|w| w[0] > w[1]), "ids not descending: {:?}", ids);
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let first = insert_item(&mut conn, &apple()).await.unwrap();
        assert!(delete_item(&mut conn, first.id).await.unwrap());
        let second = insert_item(&mut conn, &apple()).await.unwrap();
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn update_replaces_every_field() {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let created = insert_item(&mut conn, &apple()).await.unwrap();
        let patch = ItemPayload {
            name: Some("Green Apple".to_string()),
            qty: Some(3),
            ..Default::default()
        };
        let updated = update_item(&mut conn, created.id, &patch).await.unwrap();
        assert_eq!(
            updated,
            Item {
                id: created.id,
                name: Some("Green Apple".to_string()),
                weight: None,
                price: None,
                expiry: None,
                qty: Some(3),
            }
        );
        assert_eq!(
            fetch_item_by_id(&mut conn, created.id).await.unwrap(),
            Some(updated)
        );
    }

    #[tokio::test]
    async fn update_missing_item_is_not_found() {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let err = update_item(&mut conn, 42, &apple()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(fetch_all_items(&mut conn).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_reports_whether_a_row_went_away() {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let item = insert_item(&mut conn, &apple()).await.unwrap();
        assert!(delete_item(&mut conn, item.id).await.unwrap());
        assert!(!delete_item(&mut conn, item.id).await.unwrap());
        assert_eq!(fetch_item_by_id(&mut conn, item.id).await.unwrap(), None);
    }
}
