use chrono::NaiveDateTime;
use sqlx::{FromRow, PgPool};

#[derive(Debug, Clone, FromRow)]
pub struct Reservation {
    pub id: i64,
    pub user_id: i64,
    pub created_at: NaiveDateTime,
}

impl Reservation {
    pub fn formatted_created_at(&self) -> String {
        self.created_at.format("%Y-%m-%d, %H:%M:%S").to_string()
    }

    /// Newest first; only the caller's own reservations are visible.
    pub async fn list_for_user(pool: &PgPool, user_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "SELECT id, user_id, created_at
             FROM reservations
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn get_for_user(
        pool: &PgPool,
        id: i64,
        user_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "SELECT id, user_id, created_at
             FROM reservations
             WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn insert(pool: &PgPool, user_id: i64) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO reservations (user_id)
             VALUES ($1)
             RETURNING id, user_id, created_at",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// The reservation owns its tickets: remove them first, then the
    /// reservation, in one transaction. Scoped to the owning user.
    pub async fn delete_with_tickets(
        pool: &PgPool,
        id: i64,
        user_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            "DELETE FROM tickets
             WHERE reservation_id = $1
               AND reservation_id IN (SELECT id FROM reservations WHERE user_id = $2)",
        )
        .bind(id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM reservations WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn created_at_formats_with_seconds() {
        let reservation = Reservation {
            id: 1,
            user_id: 7,
            created_at: NaiveDate::from_ymd_opt(2024, 8, 8)
                .unwrap()
                .and_hms_opt(15, 4, 5)
                .unwrap(),
        };
        assert_eq!(reservation.formatted_created_at(), "2024-08-08, 15:04:05");
    }
}
