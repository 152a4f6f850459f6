use serde::Serialize;
use sqlx::{FromRow, PgPool};

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ShowTheme {
    pub id: i64,
    pub name: String,
}

impl ShowTheme {
    pub async fn list(pool: &PgPool) -> Result<Vec<ShowTheme>, sqlx::Error> {
        sqlx::query_as::<_, ShowTheme>("SELECT id, name FROM show_themes ORDER BY id")
            .fetch_all(pool)
            .await
    }

    pub async fn get(pool: &PgPool, id: i64) -> Result<Option<ShowTheme>, sqlx::Error> {
        sqlx::query_as::<_, ShowTheme>("SELECT id, name FROM show_themes WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn insert(pool: &PgPool, name: &str) -> Result<ShowTheme, sqlx::Error> {
        sqlx::query_as::<_, ShowTheme>(
            "INSERT INTO show_themes (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: i64,
        name: &str,
    ) -> Result<Option<ShowTheme>, sqlx::Error> {
        sqlx::query_as::<_, ShowTheme>(
            "UPDATE show_themes SET name = $2 WHERE id = $1 RETURNING id, name",
        )
        .bind(id)
        .bind(name)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM show_themes WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
