/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - middleware が検証して request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - 署名検証 / claims 検証 / permission チェックは middleware/services 側の責務
 */
use crate::services::auth::DecodedClaims;

/// 認証済みのリクエストに付与されるコンテキスト
///
/// - `claims` は検証済みトークンの中身 (subject / permissions など)
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub claims: DecodedClaims,
}

impl AuthCtx {
    pub fn new(claims: DecodedClaims) -> Self {
        Self { claims }
    }

    pub fn subject(&self) -> &str {
        &self.claims.subject
    }
}
