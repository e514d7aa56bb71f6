use std::path::PathBuf;
use thiserror::Error;

/// Failures while turning record text back into key/value pairs.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("line {line} has no key/value separator")]
    MissingSeparator { line: usize },
    #[error("value of `{key}` is not valid base64: {source}")]
    InvalidBase64 {
        key: String,
        #[source]
        source: base64::DecodeError,
    },
    #[error("record text is not valid UTF-8")]
    InvalidUtf8,
}

/// Every way a request can fail.
///
/// Two tiers share this enum. User-facing variants (see `is_user_facing`)
/// are rendered as an "ng" envelope; the rest are integration failures
/// that the caller of `KvsService::execute` has to surface.
#[derive(Debug, Error)]
pub enum KvsError {
    // --- user-facing ---
    #[error("None `{key}` in params")]
    MissingPersonId { key: String },
    #[error("Data not found")]
    NotFound,
    #[error("None data")]
    EmptyPayload,
    #[error("Overflow data-size=`{0}`")]
    QuotaExceeded(u64),
    #[error("`{0}`'s value size is too big")]
    ValueTooLarge(String),

    // --- integration ---
    #[error("no request parameters were supplied")]
    MissingParameters,
    #[error("corrupt record at {}: {source}", .path.display())]
    CorruptRecord {
        path: PathBuf,
        #[source]
        source: CodecError,
    },
    #[error("storage path {} is occupied by the wrong file type", .0.display())]
    LayoutConflict(PathBuf),
    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl KvsError {
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            KvsError::MissingPersonId { .. }
                | KvsError::NotFound
                | KvsError::EmptyPayload
                | KvsError::QuotaExceeded(_)
                | KvsError::ValueTooLarge(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_facing_messages() {
        let missing = KvsError::MissingPersonId {
            key: "__person_id__".to_string(),
        };
        assert_eq!(missing.to_string(), "None `__person_id__` in params");
        assert_eq!(KvsError::NotFound.to_string(), "Data not found");
        assert_eq!(KvsError::EmptyPayload.to_string(), "None data");
        assert_eq!(
            KvsError::QuotaExceeded(42).to_string(),
            "Overflow data-size=`42`"
        );
        assert_eq!(
            KvsError::ValueTooLarge("bigsize".to_string()).to_string(),
            "`bigsize`'s value size is too big"
        );
    }

    #[test]
    fn test_tier_classification() {
        assert!(KvsError::NotFound.is_user_facing());
        assert!(KvsError::QuotaExceeded(1).is_user_facing());
        assert!(!KvsError::MissingParameters.is_user_facing());
        assert!(
            !KvsError::CorruptRecord {
                path: PathBuf::from("data/a/b/c/abcd.txt"),
                source: CodecError::MissingSeparator { line: 1 },
            }
            .is_user_facing()
        );
        assert!(!KvsError::Io(std::io::Error::other("disk gone")).is_user_facing());
    }
}
