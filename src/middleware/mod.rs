/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth: route ごとの access control (protect)
 * - cors / http / security_headers: Router 全体に掛ける横断的な layer
 */
pub mod auth;
pub mod cors;
pub mod http;
pub mod security_headers;
