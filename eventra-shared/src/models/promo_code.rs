/// Promo code model
///
/// Discount codes scoped to an organizer, optionally narrowed to a single
/// event. Value is either a percentage or a fixed amount in minor units,
/// depending on `kind`. Redemption accounting (`used_count` vs `quota`) is
/// recorded here; enforcement happens in the order flow.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "promo_code_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PromoCodeKind {
    /// `value` is a percentage of the subtotal
    Percent,
    /// `value` is a fixed amount in minor units
    Amount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "promo_code_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PromoCodeStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PromoCode {
    pub id: i64,
    pub organizer_id: i64,
    /// When set, the code applies to this event only
    pub event_id: Option<i64>,
    /// Globally unique redemption string
    pub code: String,
    pub kind: PromoCodeKind,
    pub value: i64,
    /// Unlimited when absent
    pub quota: Option<i32>,
    pub used_count: i32,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub status: PromoCodeStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePromoCode {
    pub organizer_id: i64,
    pub event_id: Option<i64>,
    pub code: String,
    pub kind: PromoCodeKind,
    pub value: i64,
    pub quota: Option<i32>,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
}

const PROMO_COLUMNS: &str = "id, organizer_id, event_id, code, kind, value, quota, used_count, \
     valid_from, valid_until, status, created_at";

impl PromoCode {
    pub async fn create(pool: &PgPool, data: CreatePromoCode) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, PromoCode>(&format!(
            r#"
            INSERT INTO promo_codes (organizer_id, event_id, code, kind, value, quota,
                                     valid_from, valid_until)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {PROMO_COLUMNS}
            "#,
        ))
        .bind(data.organizer_id)
        .bind(data.event_id)
        .bind(&data.code)
        .bind(data.kind)
        .bind(data.value)
        .bind(data.quota)
        .bind(data.valid_from)
        .bind(data.valid_until)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_code(pool: &PgPool, code: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, PromoCode>(&format!(
            "SELECT {PROMO_COLUMNS} FROM promo_codes WHERE code = $1"
        ))
        .bind(code)
        .fetch_optional(pool)
        .await
    }

    pub async fn list_by_organizer(
        pool: &PgPool,
        organizer_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, PromoCode>(&format!(
            r#"
            SELECT {PROMO_COLUMNS} FROM promo_codes
            WHERE organizer_id = $1
            ORDER BY created_at DESC
            "#,
        ))
        .bind(organizer_id)
        .fetch_all(pool)
        .await
    }
}
