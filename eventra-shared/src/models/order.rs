/// Order, order-item, and payment models
///
/// Orders reference the event, its organizer, and the buyer; items break the
/// order down per ticket type; payments record provider attempts against an
/// order. Amounts are minor currency units. No gateway reconciliation logic
/// lives here; these are records of what happened.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "order_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Paid,
    Expired,
    Canceled,
    Refunded,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Order {
    pub id: i64,
    pub event_id: i64,
    pub organizer_id: i64,
    pub buyer_user_id: i64,
    /// Opaque human-facing reference, unique
    pub order_code: String,
    pub status: OrderStatus,
    pub currency: String,
    pub subtotal: i64,
    pub discount_total: i64,
    pub fee_total: i64,
    pub grand_total: i64,
    pub expires_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrder {
    pub event_id: i64,
    pub organizer_id: i64,
    pub buyer_user_id: i64,
    pub currency: String,
    pub subtotal: i64,
    pub discount_total: i64,
    pub fee_total: i64,
    pub grand_total: i64,
    pub expires_at: Option<DateTime<Utc>>,
}

const ORDER_COLUMNS: &str = "id, event_id, organizer_id, buyer_user_id, order_code, status, \
     currency, subtotal, discount_total, fee_total, grand_total, expires_at, paid_at, \
     created_at, updated_at";

/// Generates a fresh order reference, e.g. `ORD-6f1a2b...`
pub fn generate_order_code() -> String {
    format!("ORD-{}", Uuid::new_v4().simple())
}

impl Order {
    /// Inserts a pending order with a freshly generated order code
    pub async fn create(pool: &PgPool, data: CreateOrder) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Order>(&format!(
            r#"
            INSERT INTO orders (event_id, organizer_id, buyer_user_id, order_code, currency,
                                subtotal, discount_total, fee_total, grand_total, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {ORDER_COLUMNS}
            "#,
        ))
        .bind(data.event_id)
        .bind(data.organizer_id)
        .bind(data.buyer_user_id)
        .bind(generate_order_code())
        .bind(&data.currency)
        .bind(data.subtotal)
        .bind(data.discount_total)
        .bind(data.fee_total)
        .bind(data.grand_total)
        .bind(data.expires_at)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_code(pool: &PgPool, order_code: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE order_code = $1"
        ))
        .bind(order_code)
        .fetch_optional(pool)
        .await
    }

    pub async fn list_by_buyer(pool: &PgPool, buyer_user_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Order>(&format!(
            r#"
            SELECT {ORDER_COLUMNS} FROM orders
            WHERE buyer_user_id = $1
            ORDER BY created_at DESC
            "#,
        ))
        .bind(buyer_user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn list_by_organizer(
        pool: &PgPool,
        organizer_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Order>(&format!(
            r#"
            SELECT {ORDER_COLUMNS} FROM orders
            WHERE organizer_id = $1
            ORDER BY created_at DESC
            "#,
        ))
        .bind(organizer_id)
        .fetch_all(pool)
        .await
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub ticket_type_id: i64,
    pub qty: i32,
    pub unit_price: i64,
    pub subtotal: i64,
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    pub async fn create(
        pool: &PgPool,
        order_id: i64,
        ticket_type_id: i64,
        qty: i32,
        unit_price: i64,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, OrderItem>(
            r#"
            INSERT INTO order_items (order_id, ticket_type_id, qty, unit_price, subtotal)
            VALUES ($1, $2, $3, $4, $3::BIGINT * $4)
            RETURNING id, order_id, ticket_type_id, qty, unit_price, subtotal, created_at
            "#,
        )
        .bind(order_id)
        .bind(ticket_type_id)
        .bind(qty)
        .bind(unit_price)
        .fetch_one(pool)
        .await
    }

    pub async fn list_by_order(pool: &PgPool, order_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT id, order_id, ticket_type_id, qty, unit_price, subtotal, created_at
            FROM order_items
            WHERE order_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(order_id)
        .fetch_all(pool)
        .await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Initiated,
    Pending,
    Paid,
    Failed,
    Expired,
    Refunded,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Payment {
    pub id: i64,
    pub order_id: i64,
    pub provider: String,
    pub method: String,
    pub amount: i64,
    pub status: PaymentStatus,
    /// Provider-side reference, when one exists
    pub payment_ref: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    /// Raw provider callback, kept verbatim for audit
    pub provider_payload: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const PAYMENT_COLUMNS: &str = "id, order_id, provider, method, amount, status, payment_ref, \
     paid_at, provider_payload, created_at, updated_at";

impl Payment {
    pub async fn create(
        pool: &PgPool,
        order_id: i64,
        provider: &str,
        method: &str,
        amount: i64,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Payment>(&format!(
            r#"
            INSERT INTO payments (order_id, provider, method, amount)
            VALUES ($1, $2, $3, $4)
            RETURNING {PAYMENT_COLUMNS}
            "#,
        ))
        .bind(order_id)
        .bind(provider)
        .bind(method)
        .bind(amount)
        .fetch_one(pool)
        .await
    }

    pub async fn list_by_order(pool: &PgPool, order_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Payment>(&format!(
            r#"
            SELECT {PAYMENT_COLUMNS} FROM payments
            WHERE order_id = $1
            ORDER BY created_at ASC
            "#,
        ))
        .bind(order_id)
        .fetch_all(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_code_shape() {
        let code = generate_order_code();
        assert!(code.starts_with("ORD-"));
        assert_eq!(code.len(), 4 + 32);
        assert!(code[4..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_order_codes_are_unique() {
        assert_ne!(generate_order_code(), generate_order_code());
    }
}
