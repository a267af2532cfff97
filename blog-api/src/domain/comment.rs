use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::post::{Post, normalize_content, validate_positive_i64};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Comment {
    pub(crate) id: i64,
    pub(crate) content: String,
    pub(crate) user_id: i64,
    pub(crate) post_id: i64,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

/// A comment read together with the post it belongs to.
#[derive(Debug, Clone)]
pub(crate) struct CommentWithPost {
    pub(crate) comment: Comment,
    pub(crate) post: Option<Post>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CreateCommentRequest {
    pub(crate) post_id: i64,
    pub(crate) content: String,
}

impl CreateCommentRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        validate_positive_i64("post_id", self.post_id)?;
        Ok(Self {
            post_id: self.post_id,
            content: normalize_content(&self.content)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct UpdateCommentRequest {
    pub(crate) id: i64,
    pub(crate) post_id: i64,
    pub(crate) content: String,
}

impl UpdateCommentRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        validate_positive_i64("id", self.id)?;
        validate_positive_i64("post_id", self.post_id)?;
        Ok(Self {
            id: self.id,
            post_id: self.post_id,
            content: normalize_content(&self.content)?,
        })
    }
}

impl Comment {
    pub(crate) fn new(
        id: i64,
        content: impl Into<String>,
        user_id: i64,
        post_id: i64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        validate_positive_i64("id", id)?;
        validate_positive_i64("user_id", user_id)?;
        validate_positive_i64("post_id", post_id)?;
        let content = normalize_content(&content.into())?;

        Ok(Self {
            id,
            content,
            user_id,
            post_id,
            created_at,
            updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::{Comment, CreateCommentRequest, DomainError, UpdateCommentRequest};

    #[test]
    fn create_comment_request_trims_content() {
        let req = CreateCommentRequest {
            post_id: 3,
            content: "  nice post  ".to_string(),
        };

        let validated = req.validate().expect("must validate");
        assert_eq!(validated.content, "nice post");
        assert_eq!(validated.post_id, 3);
    }

    #[test]
    fn create_comment_request_rejects_missing_post() {
        let req = CreateCommentRequest {
            post_id: 0,
            content: "text".to_string(),
        };

        let err = req.validate().expect_err("post_id must be > 0");
        assert!(matches!(
            err,
            DomainError::Validation {
                field: "post_id",
                ..
            }
        ));
    }

    #[test]
    fn update_comment_request_rejects_blank_content() {
        let req = UpdateCommentRequest {
            id: 1,
            post_id: 2,
            content: "   ".to_string(),
        };

        assert!(req.validate().is_err());
    }

    #[test]
    fn comment_new_rejects_non_positive_post_id() {
        let now = Utc::now();
        assert!(Comment::new(1, "text", 2, 0, now, now).is_err());
    }
}
