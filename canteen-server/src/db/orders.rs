//! Order store: transactional lifecycle operations and code generation
//!
//! All multi-step mutations (stock decrement + order insert) run inside one
//! transaction; dropping an uncommitted `tx` rolls back, so an early `?`
//! return leaves product quantities untouched. Notification is never
//! triggered from this layer — callers notify after commit.

use chrono::{DateTime, Utc};
use rand::Rng;
use shared::error::AppError;
use shared::order::{NewOrder, Order, OrderItem, OrderStatus};
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::{ServiceError, ServiceResult};

/// Pickup-code alphabet: digits 1-9, no zero
const CODE_ALPHABET: &[u8] = b"123456789";
/// Initial code length (9^3 = 729 combinations)
const CODE_LEN: usize = 3;
/// Collision samples tolerated per length before escalating to a longer code
const MAX_SAMPLES_PER_LEN: usize = 32;

const ORDER_COLUMNS: &str =
    "id, user_id, user_name, code, items, price, comment, status, timestamp";

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    user_id: i64,
    user_name: String,
    code: String,
    items: serde_json::Value,
    price: i64,
    comment: Option<String>,
    status: String,
    timestamp: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = ServiceError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status: OrderStatus = row.status.parse().map_err(AppError::internal)?;
        let items: Vec<OrderItem> = serde_json::from_value(row.items)?;
        Ok(Order {
            id: row.id,
            user_id: row.user_id,
            user_name: row.user_name,
            code: row.code,
            items,
            price: row.price,
            comment: row.comment,
            status,
            timestamp: row.timestamp,
        })
    }
}

/// Create an order: validate the user and every line item, decrement stock,
/// generate a unique pickup code and insert — all in one transaction.
pub async fn create_order(pool: &PgPool, req: &NewOrder) -> ServiceResult<Order> {
    let mut tx = pool.begin().await?;

    let user: Option<(String,)> = sqlx::query_as("SELECT name FROM users WHERE id = $1")
        .bind(req.user_id)
        .fetch_optional(&mut *tx)
        .await?;
    let Some((user_name,)) = user else {
        return Err(AppError::user_not_found(req.user_id).into());
    };

    for item in &req.items {
        // Row lock so two concurrent orders can't both pass the stock check
        let product: Option<(String, i64)> =
            sqlx::query_as("SELECT name, quantity FROM products WHERE id = $1 FOR UPDATE")
                .bind(item.product_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some((name, available)) = product else {
            return Err(AppError::product_not_found(item.product_id).into());
        };
        if available < item.quantity {
            return Err(AppError::insufficient_stock(&name, available, item.quantity).into());
        }

        sqlx::query("UPDATE products SET quantity = quantity - $1 WHERE id = $2")
            .bind(item.quantity)
            .bind(item.product_id)
            .execute(&mut *tx)
            .await?;
    }

    let code = generate_unique_code(&mut tx).await?;
    let items_json = serde_json::to_value(&req.items)?;

    let (id, timestamp): (i64, DateTime<Utc>) = sqlx::query_as(
        r#"
        INSERT INTO orders (user_id, user_name, code, items, price, comment, status)
        VALUES ($1, $2, $3, $4, $5, $6, 'pending')
        RETURNING id, timestamp
        "#,
    )
    .bind(req.user_id)
    .bind(&user_name)
    .bind(&code)
    .bind(&items_json)
    .bind(req.price)
    .bind(&req.comment)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(Order {
        id,
        user_id: req.user_id,
        user_name,
        code,
        items: req.items.clone(),
        price: req.price,
        comment: Some(req.comment.clone()),
        status: OrderStatus::Pending,
        timestamp,
    })
}

/// Write a new status unconditionally (no transition table — any enum value
/// is accepted from any prior state) and return the updated order.
pub async fn update_status(
    pool: &PgPool,
    order_id: i64,
    status: OrderStatus,
) -> ServiceResult<Order> {
    let row: Option<OrderRow> = sqlx::query_as(&format!(
        "UPDATE orders SET status = $1 WHERE id = $2 RETURNING {ORDER_COLUMNS}"
    ))
    .bind(status.as_str())
    .bind(order_id)
    .fetch_optional(pool)
    .await?;

    row.ok_or_else(|| ServiceError::from(AppError::order_not_found(order_id)))?
        .try_into()
}

/// Delete an order; no notification side effect.
pub async fn delete_order(pool: &PgPool, order_id: i64) -> ServiceResult<()> {
    let deleted: Option<(i64,)> = sqlx::query_as("DELETE FROM orders WHERE id = $1 RETURNING id")
        .bind(order_id)
        .fetch_optional(pool)
        .await?;

    match deleted {
        Some(_) => Ok(()),
        None => Err(AppError::order_not_found(order_id).into()),
    }
}

/// Orders that are not yet settled (`paid`/`cancelled` excluded).
pub async fn list_active(pool: &PgPool) -> ServiceResult<Vec<Order>> {
    let rows: Vec<OrderRow> = sqlx::query_as(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE status NOT IN ('paid', 'cancelled')"
    ))
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(Order::try_from).collect()
}

/// All orders for one user, oldest first.
pub async fn list_for_user(pool: &PgPool, user_id: i64) -> ServiceResult<Vec<Order>> {
    let rows: Vec<OrderRow> = sqlx::query_as(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY timestamp ASC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(Order::try_from).collect()
}

/// Every order on record (manual broadcast trigger).
pub async fn list_all(pool: &PgPool) -> ServiceResult<Vec<Order>> {
    let rows: Vec<OrderRow> =
        sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM orders"))
            .fetch_all(pool)
            .await?;

    rows.into_iter().map(Order::try_from).collect()
}

/// Generate a collision-free pickup code inside the creation transaction.
///
/// Samples codes of the current length and checks them against the store;
/// after `MAX_SAMPLES_PER_LEN` collisions the length grows by one, so
/// generation always terminates even with a crowded code space. The UNIQUE
/// constraint on `orders.code` remains the authoritative guard against a
/// concurrent insert winning the same code.
async fn generate_unique_code(tx: &mut Transaction<'_, Postgres>) -> ServiceResult<String> {
    let mut len = CODE_LEN;
    loop {
        for _ in 0..MAX_SAMPLES_PER_LEN {
            let code = sample_code(len);
            let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM orders WHERE code = $1")
                .bind(&code)
                .fetch_optional(&mut **tx)
                .await?;
            if exists.is_none() {
                return Ok(code);
            }
        }
        len += 1;
        tracing::warn!(len, "Order code space crowded, escalating code length");
    }
}

fn sample_code(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}
