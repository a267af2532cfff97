use std::sync::Arc;

use async_trait::async_trait;

use crate::data::pagination::{PageResult, Pagination};
use crate::domain::comment::Comment;
use crate::domain::error::DomainError;

#[derive(Debug, Clone)]
pub(crate) struct NewComment {
    pub(crate) content: String,
    pub(crate) user_id: i64,
    pub(crate) post_id: i64,
}

/// Identifies a comment that may only be touched by its author.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct OwnedComment {
    pub(crate) id: i64,
    pub(crate) owner_id: i64,
    pub(crate) post_id: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct CommentFilter {
    pub(crate) user_id: Option<i64>,
    pub(crate) post_id: Option<i64>,
}

#[async_trait]
pub(crate) trait CommentRepository: Send + Sync {
    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError>;
    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, DomainError>;
    async fn update_comment_owned(
        &self,
        target: OwnedComment,
        content: String,
    ) -> Result<Option<Comment>, DomainError>;
    async fn delete_comment_owned(&self, id: i64, owner_id: i64) -> Result<bool, DomainError>;
    async fn list_user_comments(&self, user_id: i64) -> Result<Vec<Comment>, DomainError>;
    /// Most recent comments of each post, at most `per_post` of them.
    async fn recent_comments(
        &self,
        post_ids: &[i64],
        per_post: i64,
    ) -> Result<Vec<Comment>, DomainError>;
    async fn page_comments(
        &self,
        filter: CommentFilter,
        pagination: Pagination,
    ) -> Result<PageResult<Comment>, DomainError>;
}

pub(crate) type DynCommentRepository = Arc<dyn CommentRepository>;

#[async_trait]
impl<T: CommentRepository + ?Sized> CommentRepository for Arc<T> {
    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError> {
        (**self).create_comment(input).await
    }

    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, DomainError> {
        (**self).get_comment(id).await
    }

    async fn update_comment_owned(
        &self,
        target: OwnedComment,
        content: String,
    ) -> Result<Option<Comment>, DomainError> {
        (**self).update_comment_owned(target, content).await
    }

    async fn delete_comment_owned(&self, id: i64, owner_id: i64) -> Result<bool, DomainError> {
        (**self).delete_comment_owned(id, owner_id).await
    }

    async fn list_user_comments(&self, user_id: i64) -> Result<Vec<Comment>, DomainError> {
        (**self).list_user_comments(user_id).await
    }

    async fn recent_comments(
        &self,
        post_ids: &[i64],
        per_post: i64,
    ) -> Result<Vec<Comment>, DomainError> {
        (**self).recent_comments(post_ids, per_post).await
    }

    async fn page_comments(
        &self,
        filter: CommentFilter,
        pagination: Pagination,
    ) -> Result<PageResult<Comment>, DomainError> {
        (**self).page_comments(filter, pagination).await
    }
}
