/// Payout models
///
/// A payout settles an organizer's paid orders for a period; payout lines
/// tie the settled amount back to individual orders. Amounts are minor
/// currency units.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payout_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PayoutStatus {
    Pending,
    Processing,
    Paid,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Payout {
    pub id: i64,
    pub organizer_id: i64,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub gross_amount: i64,
    pub fee_amount: i64,
    pub net_amount: i64,
    pub status: PayoutStatus,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

const PAYOUT_COLUMNS: &str = "id, organizer_id, period_start, period_end, gross_amount, \
     fee_amount, net_amount, status, paid_at, created_at";

impl Payout {
    pub async fn create(
        pool: &PgPool,
        organizer_id: i64,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
        gross_amount: i64,
        fee_amount: i64,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Payout>(&format!(
            r#"
            INSERT INTO payouts (organizer_id, period_start, period_end,
                                 gross_amount, fee_amount, net_amount)
            VALUES ($1, $2, $3, $4, $5, $4 - $5)
            RETURNING {PAYOUT_COLUMNS}
            "#,
        ))
        .bind(organizer_id)
        .bind(period_start)
        .bind(period_end)
        .bind(gross_amount)
        .bind(fee_amount)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Payout>(&format!(
            "SELECT {PAYOUT_COLUMNS} FROM payouts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn list_by_organizer(
        pool: &PgPool,
        organizer_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Payout>(&format!(
            r#"
            SELECT {PAYOUT_COLUMNS} FROM payouts
            WHERE organizer_id = $1
            ORDER BY period_start DESC
            "#,
        ))
        .bind(organizer_id)
        .fetch_all(pool)
        .await
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PayoutLine {
    pub id: i64,
    pub payout_id: i64,
    pub order_id: i64,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

impl PayoutLine {
    pub async fn create(
        pool: &PgPool,
        payout_id: i64,
        order_id: i64,
        amount: i64,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, PayoutLine>(
            r#"
            INSERT INTO payout_lines (payout_id, order_id, amount)
            VALUES ($1, $2, $3)
            RETURNING id, payout_id, order_id, amount, created_at
            "#,
        )
        .bind(payout_id)
        .bind(order_id)
        .bind(amount)
        .fetch_one(pool)
        .await
    }

    pub async fn list_by_payout(pool: &PgPool, payout_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, PayoutLine>(
            r#"
            SELECT id, payout_id, order_id, amount, created_at
            FROM payout_lines
            WHERE payout_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(payout_id)
        .fetch_all(pool)
        .await
    }
}
