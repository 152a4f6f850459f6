use chrono::NaiveDateTime;
use sqlx::{FromRow, PgPool};

/// Fully joined session row with the live seat-availability aggregate.
///
/// `tickets_available` is computed at query time as
/// `rows * seats_in_row - COUNT(tickets)` so it can never go stale across
/// requests that create or delete tickets.
#[derive(Debug, Clone, FromRow)]
pub struct ShowSessionRow {
    pub id: i64,
    pub show_time: NaiveDateTime,
    pub astronomy_show_id: i64,
    pub show_title: String,
    pub show_description: String,
    pub show_theme: Option<String>,
    pub dome_id: i64,
    pub dome_name: String,
    pub dome_rows: i32,
    pub dome_seats_in_row: i32,
    pub tickets_available: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionOrdering {
    ShowTimeAsc,
    #[default]
    ShowTimeDesc,
}

const SELECT_SESSION: &str = "SELECT ss.id, ss.show_time,
            a.id AS astronomy_show_id, a.title AS show_title,
            a.description AS show_description, t.name AS show_theme,
            d.id AS dome_id, d.name AS dome_name,
            d.rows AS dome_rows, d.seats_in_row AS dome_seats_in_row,
            (d.rows * d.seats_in_row)::BIGINT - COUNT(tk.id) AS tickets_available
     FROM show_sessions ss
     JOIN astronomy_shows a ON a.id = ss.astronomy_show_id
     LEFT JOIN show_themes t ON t.id = a.show_theme_id
     JOIN planetarium_domes d ON d.id = ss.planetarium_dome_id
     LEFT JOIN tickets tk ON tk.show_session_id = ss.id";

const GROUP_SESSION: &str = "GROUP BY ss.id, a.id, t.name, d.id";

impl ShowSessionRow {
    pub fn dome_capacity(&self) -> i64 {
        self.dome_rows as i64 * self.dome_seats_in_row as i64
    }

    pub async fn list(
        pool: &PgPool,
        ordering: SessionOrdering,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let direction = match ordering {
            SessionOrdering::ShowTimeAsc => "ASC",
            SessionOrdering::ShowTimeDesc => "DESC",
        };
        let query = format!("{SELECT_SESSION} {GROUP_SESSION} ORDER BY ss.show_time {direction}");
        sqlx::query_as::<_, Self>(&query).fetch_all(pool).await
    }

    pub async fn get(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("{SELECT_SESSION} WHERE ss.id = $1 {GROUP_SESSION}");
        sqlx::query_as::<_, Self>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Earliest session with `show_time >= now`, or None when nothing is
    /// scheduled ahead.
    pub async fn nearest(pool: &PgPool) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "{SELECT_SESSION}
             WHERE ss.show_time >= NOW()
             {GROUP_SESSION}
             ORDER BY ss.show_time ASC
             LIMIT 1"
        );
        sqlx::query_as::<_, Self>(&query).fetch_optional(pool).await
    }

    pub async fn insert(
        pool: &PgPool,
        astronomy_show_id: i64,
        planetarium_dome_id: i64,
        show_time: NaiveDateTime,
    ) -> Result<Self, sqlx::Error> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO show_sessions (astronomy_show_id, planetarium_dome_id, show_time)
             VALUES ($1, $2, $3)
             RETURNING id",
        )
        .bind(astronomy_show_id)
        .bind(planetarium_dome_id)
        .bind(show_time)
        .fetch_one(pool)
        .await?;

        let row = Self::get(pool, id).await?;
        row.ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn update(
        pool: &PgPool,
        id: i64,
        astronomy_show_id: i64,
        planetarium_dome_id: i64,
        show_time: NaiveDateTime,
    ) -> Result<Option<Self>, sqlx::Error> {
        let updated = sqlx::query(
            "UPDATE show_sessions
             SET astronomy_show_id = $2, planetarium_dome_id = $3, show_time = $4
             WHERE id = $1",
        )
        .bind(id)
        .bind(astronomy_show_id)
        .bind(planetarium_dome_id)
        .bind(show_time)
        .execute(pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        Self::get(pool, id).await
    }

    /// The session owns its tickets: remove them first, then the session,
    /// in one transaction.
    pub async fn delete_with_tickets(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM tickets WHERE show_session_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM show_sessions WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}
