//! Row types and embedding codec for the lot case table

use sqlx::FromRow;

/// A persisted knowledge case as stored in `lot_cases`.
///
/// The metadata columns `risk_level`, `raw_text` and `objects` must keep
/// their names: the similar-case recommendation rule is derived from them.
#[derive(Debug, Clone, FromRow)]
pub struct LotCaseRow {
    pub id: String,
    /// Composite document text the embedding was computed from.
    pub document: String,
    /// f32 little-endian bytes, see [`encode_embedding`].
    pub embedding: Vec<u8>,
    pub risk_level: String,
    pub raw_text: String,
    /// Detected object labels joined with ", ".
    pub objects: String,
    pub created_at: String,
}

/// Values for a new case insert; `created_at` is set by the repository.
#[derive(Debug, Clone)]
pub struct NewLotCase {
    pub id: String,
    pub document: String,
    pub embedding: Vec<u8>,
    pub risk_level: String,
    pub raw_text: String,
    pub objects: String,
}

/// Serialize an embedding as little-endian f32 bytes for BLOB storage.
pub fn encode_embedding(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 4);
    for value in embedding {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Deserialize a BLOB back into the embedding vector.
pub fn decode_embedding(bytes: &[u8]) -> Result<Vec<f32>, String> {
    if bytes.len() % 4 != 0 {
        return Err(format!(
            "embedding blob length {} is not a multiple of 4",
            bytes.len()
        ));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedding_codec_round_trips() {
        let original = vec![0.25f32, -1.5, 3.75, 0.0, f32::MIN_POSITIVE];
        let decoded = decode_embedding(&encode_embedding(&original)).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn truncated_blob_is_rejected() {
        let mut bytes = encode_embedding(&[1.0f32, 2.0]);
        bytes.pop();
        assert!(decode_embedding(&bytes).is_err());
    }

    #[test]
    fn empty_blob_decodes_to_empty_vector() {
        assert!(decode_embedding(&[]).unwrap().is_empty());
    }
}
