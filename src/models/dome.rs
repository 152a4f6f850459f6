use serde::Serialize;
use sqlx::{FromRow, PgPool};

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PlanetariumDome {
    pub id: i64,
    pub name: String,
    pub rows: i32,
    pub seats_in_row: i32,
}

impl PlanetariumDome {
    /// Derived seating capacity; never stored.
    pub fn capacity(&self) -> i32 {
        self.rows * self.seats_in_row
    }

    pub async fn list(pool: &PgPool, name: Option<&str>) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "SELECT id, name, rows, seats_in_row
             FROM planetarium_domes
             WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%')
             ORDER BY id",
        )
        .bind(name)
        .fetch_all(pool)
        .await
    }

    pub async fn get(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "SELECT id, name, rows, seats_in_row FROM planetarium_domes WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn insert(
        pool: &PgPool,
        name: &str,
        rows: i32,
        seats_in_row: i32,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO planetarium_domes (name, rows, seats_in_row)
             VALUES ($1, $2, $3)
             RETURNING id, name, rows, seats_in_row",
        )
        .bind(name)
        .bind(rows)
        .bind(seats_in_row)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: i64,
        name: &str,
        rows: i32,
        seats_in_row: i32,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "UPDATE planetarium_domes
             SET name = $2, rows = $3, seats_in_row = $4
             WHERE id = $1
             RETURNING id, name, rows, seats_in_row",
        )
        .bind(id)
        .bind(name)
        .bind(rows)
        .bind(seats_in_row)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM planetarium_domes WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_is_rows_times_seats() {
        let dome = PlanetariumDome {
            id: 1,
            name: "Main dome".to_string(),
            rows: 10,
            seats_in_row: 20,
        };
        assert_eq!(dome.capacity(), 200);
    }
}
