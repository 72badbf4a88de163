/// Event and ticket-type models
///
/// Events belong to an organizer; ticket types belong to an event. Monetary
/// amounts are stored as minor currency units (e.g. cents) in BIGINT
/// columns. These are declarative records: publishing workflow, inventory
/// allocation, and sales logic live elsewhere.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Publication lifecycle of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "event_visibility", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EventVisibility {
    Draft,
    Submitted,
    Approved,
    Published,
    Rejected,
    Ended,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Event {
    pub id: i64,
    pub organizer_id: i64,
    /// User who created the event
    pub created_by: i64,
    pub title: String,
    /// Globally unique
    pub slug: String,
    pub description: Option<String>,
    pub venue_name: Option<String>,
    pub venue_address: Option<String>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub visibility: EventVisibility,
    pub is_free: bool,
    /// ISO 4217 code
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEvent {
    pub organizer_id: i64,
    pub created_by: i64,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub venue_name: Option<String>,
    pub venue_address: Option<String>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub is_free: bool,
    pub currency: String,
}

const EVENT_COLUMNS: &str = "id, organizer_id, created_by, title, slug, description, \
     venue_name, venue_address, start_at, end_at, visibility, is_free, currency, \
     created_at, updated_at";

impl Event {
    pub async fn create(pool: &PgPool, data: CreateEvent) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Event>(&format!(
            r#"
            INSERT INTO events (organizer_id, created_by, title, slug, description,
                                venue_name, venue_address, start_at, end_at, is_free, currency)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {EVENT_COLUMNS}
            "#,
        ))
        .bind(data.organizer_id)
        .bind(data.created_by)
        .bind(&data.title)
        .bind(&data.slug)
        .bind(&data.description)
        .bind(&data.venue_name)
        .bind(&data.venue_address)
        .bind(data.start_at)
        .bind(data.end_at)
        .bind(data.is_free)
        .bind(&data.currency)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn list_by_organizer(
        pool: &PgPool,
        organizer_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Event>(&format!(
            r#"
            SELECT {EVENT_COLUMNS} FROM events
            WHERE organizer_id = $1
            ORDER BY start_at ASC
            "#,
        ))
        .bind(organizer_id)
        .fetch_all(pool)
        .await
    }

    pub async fn set_visibility(
        pool: &PgPool,
        id: i64,
        visibility: EventVisibility,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Event>(&format!(
            r#"
            UPDATE events SET visibility = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {EVENT_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(visibility)
        .fetch_optional(pool)
        .await
    }
}

/// Sale status of a ticket type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "ticket_type_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TicketTypeStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TicketType {
    pub id: i64,
    pub event_id: i64,
    pub name: String,
    /// Minor currency units
    pub price: i64,
    pub quota: i32,
    pub sold_count: i32,
    pub sale_start_at: DateTime<Utc>,
    pub sale_end_at: DateTime<Utc>,
    pub max_per_order: i32,
    pub status: TicketTypeStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTicketType {
    pub event_id: i64,
    pub name: String,
    pub price: i64,
    pub quota: i32,
    pub sale_start_at: DateTime<Utc>,
    pub sale_end_at: DateTime<Utc>,
    pub max_per_order: i32,
}

const TICKET_TYPE_COLUMNS: &str = "id, event_id, name, price, quota, sold_count, \
     sale_start_at, sale_end_at, max_per_order, status, created_at, updated_at";

impl TicketType {
    pub async fn create(pool: &PgPool, data: CreateTicketType) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, TicketType>(&format!(
            r#"
            INSERT INTO ticket_types (event_id, name, price, quota,
                                      sale_start_at, sale_end_at, max_per_order)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {TICKET_TYPE_COLUMNS}
            "#,
        ))
        .bind(data.event_id)
        .bind(&data.name)
        .bind(data.price)
        .bind(data.quota)
        .bind(data.sale_start_at)
        .bind(data.sale_end_at)
        .bind(data.max_per_order)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, TicketType>(&format!(
            "SELECT {TICKET_TYPE_COLUMNS} FROM ticket_types WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn list_by_event(pool: &PgPool, event_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, TicketType>(&format!(
            r#"
            SELECT {TICKET_TYPE_COLUMNS} FROM ticket_types
            WHERE event_id = $1
            ORDER BY price ASC
            "#,
        ))
        .bind(event_id)
        .fetch_all(pool)
        .await
    }
}
