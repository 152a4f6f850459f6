use chrono::NaiveDateTime;
use sqlx::{FromRow, PgPool};

/// Ticket joined with its session, show, dome, and reservation context.
#[derive(Debug, Clone, FromRow)]
pub struct TicketRow {
    pub id: i64,
    pub row: i32,
    pub seat: i32,
    pub show_session_id: i64,
    pub show_title: String,
    pub show_time: NaiveDateTime,
    pub dome_name: String,
    pub reservation_id: i64,
    pub reservation_created_at: NaiveDateTime,
    pub user_id: i64,
}

const SELECT_TICKET: &str = r#"SELECT tk.id, tk."row", tk.seat,
            ss.id AS show_session_id, a.title AS show_title, ss.show_time,
            d.name AS dome_name,
            r.id AS reservation_id, r.created_at AS reservation_created_at,
            r.user_id
     FROM tickets tk
     JOIN show_sessions ss ON ss.id = tk.show_session_id
     JOIN astronomy_shows a ON a.id = ss.astronomy_show_id
     JOIN planetarium_domes d ON d.id = ss.planetarium_dome_id
     JOIN reservations r ON r.id = tk.reservation_id"#;

impl TicketRow {
    pub fn reservation_label(&self) -> String {
        self.reservation_created_at
            .format("%Y-%m-%d, %H:%M:%S")
            .to_string()
    }

    /// Only the caller's own tickets, ordered by (row, seat), optionally
    /// narrowed by a case-insensitive show-title substring.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: i64,
        show_title: Option<&str>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            r#"{SELECT_TICKET}
             WHERE r.user_id = $1
               AND ($2::text IS NULL OR a.title ILIKE '%' || $2 || '%')
             ORDER BY tk."row", tk.seat"#
        );
        sqlx::query_as::<_, Self>(&query)
            .bind(user_id)
            .bind(show_title)
            .fetch_all(pool)
            .await
    }

    pub async fn get_for_user(
        pool: &PgPool,
        id: i64,
        user_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("{SELECT_TICKET} WHERE tk.id = $1 AND r.user_id = $2");
        sqlx::query_as::<_, Self>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete_for_user(
        pool: &PgPool,
        id: i64,
        user_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM tickets
             WHERE id = $1
               AND reservation_id IN (SELECT id FROM reservations WHERE user_id = $2)",
        )
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
