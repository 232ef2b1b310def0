//! Breezemoon management service

use crate::error::{ServiceError, ServiceResult};
use async_trait::async_trait;
use bm_model::{BreezemoonDraft, BreezemoonId, BreezemoonUpdate};

/// Default content limit in characters
pub const DEFAULT_MAX_CONTENT_LEN: usize = 512;

/// Write side of breezemoons
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait BreezemoonMgmtService: Send + Sync {
    /// Add a breezemoon
    ///
    /// # Errors
    /// - `ServiceError::ContentEmpty` / `ContentTooLong` on invalid content
    /// - `ServiceError::UserNotFound` if the author is unknown
    async fn add_breezemoon(&self, draft: BreezemoonDraft) -> ServiceResult<BreezemoonId>;

    /// Replace content and user agent of an existing breezemoon
    ///
    /// # Errors
    /// - content errors as for [`Self::add_breezemoon`]
    /// - `ServiceError::NotFound` if the id is unknown
    /// - `ServiceError::NotAuthor` if the acting user did not write it
    async fn update_breezemoon(&self, update: BreezemoonUpdate) -> ServiceResult<()>;

    /// Remove a breezemoon
    ///
    /// # Errors
    /// `ServiceError::NotFound` if the id is unknown
    async fn remove_breezemoon(&self, id: BreezemoonId) -> ServiceResult<()>;
}

/// Trim content and check it against `max_len` characters
///
/// # Errors
/// - `ServiceError::ContentEmpty` if nothing is left after trimming
/// - `ServiceError::ContentTooLong` if the trimmed content is over the limit
pub fn validate_content(content: &str, max_len: usize) -> ServiceResult<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::ContentEmpty);
    }

    let actual = trimmed.chars().count();
    if actual > max_len {
        return Err(ServiceError::ContentTooLong {
            max: max_len,
            actual,
        });
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_content_trims() {
        assert_eq!(validate_content("  hi  ", 10), Ok("hi".to_string()));
    }

    #[test]
    fn validate_content_rejects_blank() {
        assert_eq!(validate_content(" \n\t ", 10), Err(ServiceError::ContentEmpty));
        assert_eq!(validate_content("", 10), Err(ServiceError::ContentEmpty));
    }

    #[test]
    fn validate_content_counts_chars_not_bytes() {
        // 4 chars, 12 bytes
        assert!(validate_content("微风明月", 4).is_ok());
        assert_eq!(
            validate_content("微风明月!", 4),
            Err(ServiceError::ContentTooLong { max: 4, actual: 5 })
        );
    }
}
