/**
 * Responsibility
 * - repo が上位に伝える意味の定義
 * - sqlx::Error は Db にまとめる (HTTP への変換は AppError 側)
 */
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("db error: {0}")]
    Db(#[from] sqlx::Error),
}
