use serde::Serialize;
use sqlx::{FromRow, PgPool};

/// Astronomy show joined with its optional theme name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AstronomyShowRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub show_theme_id: Option<i64>,
    pub show_theme: Option<String>,
}

#[derive(Debug, Default)]
pub struct ShowFilter {
    pub title: Option<String>,
    pub show_theme: Option<String>,
}

const SELECT_SHOW: &str = "SELECT a.id, a.title, a.description, a.show_theme_id, t.name AS show_theme
     FROM astronomy_shows a
     LEFT JOIN show_themes t ON t.id = a.show_theme_id";

impl AstronomyShowRow {
    /// Case-insensitive substring filters on title and theme name, ANDed.
    pub async fn list(pool: &PgPool, filter: &ShowFilter) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "{SELECT_SHOW}
             WHERE ($1::text IS NULL OR a.title ILIKE '%' || $1 || '%')
               AND ($2::text IS NULL OR t.name ILIKE '%' || $2 || '%')
             ORDER BY a.id"
        );
        sqlx::query_as::<_, Self>(&query)
            .bind(&filter.title)
            .bind(&filter.show_theme)
            .fetch_all(pool)
            .await
    }

    pub async fn get(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("{SELECT_SHOW} WHERE a.id = $1");
        sqlx::query_as::<_, Self>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn insert(
        pool: &PgPool,
        title: &str,
        description: &str,
        show_theme_id: Option<i64>,
    ) -> Result<Self, sqlx::Error> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO astronomy_shows (title, description, show_theme_id)
             VALUES ($1, $2, $3)
             RETURNING id",
        )
        .bind(title)
        .bind(description)
        .bind(show_theme_id)
        .fetch_one(pool)
        .await?;

        let row = Self::get(pool, id).await?;
        row.ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn update(
        pool: &PgPool,
        id: i64,
        title: &str,
        description: &str,
        show_theme_id: Option<i64>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let updated = sqlx::query(
            "UPDATE astronomy_shows
             SET title = $2, description = $3, show_theme_id = $4
             WHERE id = $1",
        )
        .bind(id)
        .bind(title)
        .bind(description)
        .bind(show_theme_id)
        .execute(pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        Self::get(pool, id).await
    }

    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM astronomy_shows WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
