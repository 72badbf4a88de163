/// Ticket and check-in models
///
/// One ticket per seat sold, hanging off an order item. Check-ins are an
/// append-only audit log of gate scans, successful or not.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "ticket_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Issued,
    CheckedIn,
    Void,
    Refunded,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Ticket {
    pub id: i64,
    pub order_item_id: i64,
    /// Human-facing reference, unique
    pub ticket_code: String,
    /// Opaque scan token embedded in the QR image, unique
    pub qr_token: String,
    pub attendee_name: Option<String>,
    pub attendee_email: Option<String>,
    pub status: TicketStatus,
    pub issued_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

const TICKET_COLUMNS: &str = "id, order_item_id, ticket_code, qr_token, attendee_name, \
     attendee_email, status, issued_at, created_at";

/// Generates a fresh ticket reference, e.g. `TKT-9c4e...`
pub fn generate_ticket_code() -> String {
    format!("TKT-{}", Uuid::new_v4().simple())
}

/// Generates a fresh opaque scan token for the QR image
pub fn generate_qr_token() -> String {
    Uuid::new_v4().simple().to_string()
}

impl Ticket {
    /// Issues a ticket with freshly generated code and scan token
    pub async fn create(pool: &PgPool, order_item_id: i64) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Ticket>(&format!(
            r#"
            INSERT INTO tickets (order_item_id, ticket_code, qr_token, issued_at)
            VALUES ($1, $2, $3, NOW())
            RETURNING {TICKET_COLUMNS}
            "#,
        ))
        .bind(order_item_id)
        .bind(generate_ticket_code())
        .bind(generate_qr_token())
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_qr_token(
        pool: &PgPool,
        qr_token: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Ticket>(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets WHERE qr_token = $1"
        ))
        .bind(qr_token)
        .fetch_optional(pool)
        .await
    }

    pub async fn list_by_order_item(
        pool: &PgPool,
        order_item_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Ticket>(&format!(
            r#"
            SELECT {TICKET_COLUMNS} FROM tickets
            WHERE order_item_id = $1
            ORDER BY id ASC
            "#,
        ))
        .bind(order_item_id)
        .fetch_all(pool)
        .await
    }

    pub async fn set_status(
        pool: &PgPool,
        id: i64,
        status: TicketStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Ticket>(&format!(
            r#"
            UPDATE tickets SET status = $2
            WHERE id = $1
            RETURNING {TICKET_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(pool)
        .await
    }
}

/// Outcome of a gate scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "checkin_result", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CheckinResult {
    Ok,
    Duplicate,
    Invalid,
    Blocked,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Checkin {
    pub id: i64,
    pub ticket_id: i64,
    /// Gate staff member who scanned
    pub gate_user_id: i64,
    pub scanned_at: DateTime<Utc>,
    pub result: CheckinResult,
    pub device_id: Option<String>,
    pub meta: Option<serde_json::Value>,
}

impl Checkin {
    pub async fn record(
        pool: &PgPool,
        ticket_id: i64,
        gate_user_id: i64,
        result: CheckinResult,
        device_id: Option<&str>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Checkin>(
            r#"
            INSERT INTO checkins (ticket_id, gate_user_id, result, device_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, ticket_id, gate_user_id, scanned_at, result, device_id, meta
            "#,
        )
        .bind(ticket_id)
        .bind(gate_user_id)
        .bind(result)
        .bind(device_id)
        .fetch_one(pool)
        .await
    }

    pub async fn list_by_ticket(pool: &PgPool, ticket_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Checkin>(
            r#"
            SELECT id, ticket_id, gate_user_id, scanned_at, result, device_id, meta
            FROM checkins
            WHERE ticket_id = $1
            ORDER BY scanned_at ASC
            "#,
        )
        .bind(ticket_id)
        .fetch_all(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_code_shape() {
        let code = generate_ticket_code();
        assert!(code.starts_with("TKT-"));
        assert_eq!(code.len(), 4 + 32);
    }

    #[test]
    fn test_qr_tokens_are_opaque_and_unique() {
        let token = generate_qr_token();
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_qr_token());
    }
}
