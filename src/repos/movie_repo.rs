/*
 * Responsibility
 * - movies テーブル向け SQLx 操作 (CRUD)
 * - 内部 ID (movieId) を扱う。公開 ID への変換は handler 側
 */
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoError;

#[derive(Debug, Clone, FromRow)]
pub struct MovieRow {
    #[sqlx(rename = "movieId")]
    pub movie_id: i64,

    pub title: String,

    #[sqlx(rename = "releaseDate")]
    pub release_date: String,
}

pub async fn list(db: &PgPool) -> Result<Vec<MovieRow>, RepoError> {
    let rows = sqlx::query_as::<_, MovieRow>(
        r#"
        SELECT "movieId", title, "releaseDate"
        FROM movies
        ORDER BY "movieId"
        "#,
    )
    .fetch_all(db)
    .await?;

    Ok(rows)
}

pub async fn get(db: &PgPool, movie_id: i64) -> Result<Option<MovieRow>, RepoError> {
    let row = sqlx::query_as::<_, MovieRow>(
        r#"
        SELECT "movieId", title, "releaseDate"
        FROM movies
        WHERE "movieId" = $1
        "#,
    )
    .bind(movie_id)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn create(db: &PgPool, title: &str, release_date: &str) -> Result<MovieRow, RepoError> {
    let row = sqlx::query_as::<_, MovieRow>(
        r#"
        INSERT INTO movies (title, "releaseDate")
        VALUES ($1, $2)
        RETURNING "movieId", title, "releaseDate"
        "#,
    )
    .bind(title)
    .bind(release_date)
    .fetch_one(db)
    .await?;

    Ok(row)
}

pub async fn update(
    db: &PgPool,
    movie_id: i64,
    title: Option<&str>,
    release_date: Option<&str>,
) -> Result<Option<MovieRow>, RepoError> {
    // None => keep current value
    let row = sqlx::query_as::<_, MovieRow>(
        r#"
        UPDATE movies
        SET
            title = COALESCE($2, title),
            "releaseDate" = COALESCE($3, "releaseDate"),
            "updatedAt" = now()
        WHERE "movieId" = $1
        RETURNING "movieId", title, "releaseDate"
        "#,
    )
    .bind(movie_id)
    .bind(title)
    .bind(release_date)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn delete(db: &PgPool, movie_id: i64) -> Result<bool, RepoError> {
    let result = sqlx::query(
        r#"
        DELETE FROM movies
        WHERE "movieId" = $1
        "#,
    )
    .bind(movie_id)
    .execute(db)
    .await?;

    Ok(result.rows_affected() > 0)
}
