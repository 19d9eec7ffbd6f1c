/*
 * Responsibility
 * - 未定義 route / 未対応 method を JSON の AppError で返す
 */
use crate::error::AppError;

pub async fn not_found() -> AppError {
    AppError::not_found("resource")
}

pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
