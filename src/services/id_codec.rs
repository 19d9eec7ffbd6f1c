/*
 * Responsibility
 * - movies / actors の内部 ID (BIGSERIAL) ↔ URL に出す公開 ID の変換
 * - sqids の設定 (min length / alphabet) はここに閉じ込める
 * - 公開 ID は 1 つの数値だけを表す (複数値の sqid は不正扱い)
 */
use sqids::Sqids;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdCodecError {
    #[error("SQIDS_MIN_LENGTH must be between 0 and 255, got {0}")]
    InvalidMinLength(usize),
    #[error("sqids: {0}")]
    Sqids(#[from] sqids::Error),
    #[error("id must be non-negative, got {0}")]
    NegativeId(i64),
    #[error("invalid public id")]
    Malformed,
}

#[derive(Clone, Debug)]
pub struct IdCodec {
    sqids: Sqids,
}

impl IdCodec {
    pub fn new(min_length: usize, alphabet: &str) -> Result<Self, IdCodecError> {
        let min_length =
            u8::try_from(min_length).map_err(|_| IdCodecError::InvalidMinLength(min_length))?;

        let sqids = Sqids::builder()
            .min_length(min_length)
            .alphabet(alphabet.chars().collect())
            .build()?;

        Ok(Self { sqids })
    }

    pub fn encode(&self, id: i64) -> Result<String, IdCodecError> {
        let id = u64::try_from(id).map_err(|_| IdCodecError::NegativeId(id))?;
        Ok(self.sqids.encode(&[id])?)
    }

    pub fn decode(&self, public_id: &str) -> Result<i64, IdCodecError> {
        match self.sqids.decode(public_id).as_slice() {
            [id] => {
                let id = i64::try_from(*id).map_err(|_| IdCodecError::Malformed)?;
                // Reject non-canonical spellings that happen to decode to the same number.
                if self.encode(id)? != public_id {
                    return Err(IdCodecError::Malformed);
                }
                Ok(id)
            }
            _ => Err(IdCodecError::Malformed),
        }
    }
}
